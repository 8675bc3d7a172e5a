pub mod feed_service;
pub mod follow_service;
pub mod group_service;
pub mod pagination;
pub mod post_service;
pub mod user_service;
