//! Warbler data models

pub mod message;
pub mod user;

pub use message::{MAX_MESSAGE_LENGTH, Message, MessageWithAuthor, NewMessage};
pub use user::{
    DEFAULT_HEADER_IMAGE_URL, DEFAULT_IMAGE_URL, NewUser, ProfileUpdate, UpdateUser, User,
    UserStats, UserSummary,
};
