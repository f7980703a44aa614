//! User model and related functionality

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Avatar shown for users who did not provide one
pub const DEFAULT_IMAGE_URL: &str = "/static/images/default-pic.png";

/// Profile banner shown for users who did not provide one
pub const DEFAULT_HEADER_IMAGE_URL: &str = "/static/images/warbler-hero.jpg";

/// User entity
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, PartialEq)]
pub struct User {
    pub id: i32,
    pub username: String,
    pub email: String,
    pub image_url: String,
    pub header_image_url: String,
    pub bio: Option<String>,
    pub location: Option<String>,
    /// Argon2 PHC string, never the plaintext
    #[serde(skip_serializing)]
    pub password: String,
}

/// Public-facing slice of a user, as shown in lists and cards
#[derive(Debug, Clone, Serialize, FromRow, PartialEq)]
pub struct UserSummary {
    pub id: i32,
    pub username: String,
    pub image_url: String,
    pub bio: Option<String>,
}

/// New user creation payload, password still in plaintext
#[derive(Debug, Clone, Deserialize)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub password: String,
    pub image_url: Option<String>,
}

/// Account update payload from the edit page
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateUser {
    pub username: String,
    pub email: String,
    pub image_url: Option<String>,
    pub header_image_url: Option<String>,
    pub bio: Option<String>,
}

/// Profile details update from the profile page
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProfileUpdate {
    pub location: Option<String>,
    pub bio: Option<String>,
    pub header_image_url: Option<String>,
}

/// Counters displayed on a profile page
#[derive(Debug, Clone, Copy, Default, Serialize, FromRow, PartialEq, Eq)]
pub struct UserStats {
    pub messages: i64,
    pub following: i64,
    pub followers: i64,
    pub likes: i64,
}
