//! Message model and related functionality

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Maximum length of a message, in characters
pub const MAX_MESSAGE_LENGTH: usize = 140;

/// Message entity
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, PartialEq)]
pub struct Message {
    pub id: i32,
    pub text: String,
    pub timestamp: DateTime<Utc>,
    pub user_id: i32,
}

/// Message joined with the author's display fields
#[derive(Debug, Clone, Serialize, FromRow, PartialEq)]
pub struct MessageWithAuthor {
    pub id: i32,
    pub text: String,
    pub timestamp: DateTime<Utc>,
    pub user_id: i32,
    pub username: String,
    pub image_url: String,
}

/// New message creation payload
#[derive(Debug, Clone, Deserialize)]
pub struct NewMessage {
    pub text: String,
    pub user_id: i32,
}
