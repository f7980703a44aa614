//! Repositories for database operations

pub mod message;
pub mod user;

pub use message::{FEED_LIMIT, MessageRepository};
pub use user::{UserRepository, hash_password, verify_password};
