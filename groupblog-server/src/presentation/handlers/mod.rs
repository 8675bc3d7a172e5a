pub mod feed;
pub mod follow;
pub mod group;
pub mod post;
