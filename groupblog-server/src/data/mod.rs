pub mod comment_repository;
pub mod follow_repository;
pub mod group_repository;
#[cfg(test)]
pub mod memory;
pub mod post_repository;
pub mod user_repository;
