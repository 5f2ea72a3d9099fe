//! Repositories for database operations

pub mod catalog;
pub mod comment;
pub mod user;

pub use catalog::CatalogRepository;
pub use comment::CommentRepository;
pub use user::UserRepository;
