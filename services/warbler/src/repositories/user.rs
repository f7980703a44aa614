//! User repository for database operations

use anyhow::Result;
use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier, password_hash::SaltString};
use sqlx::PgPool;
use tracing::{info, warn};

use crate::models::{
    DEFAULT_HEADER_IMAGE_URL, DEFAULT_IMAGE_URL, NewUser, ProfileUpdate, UpdateUser, User,
    UserStats, UserSummary,
};

const USER_COLUMNS: &str =
    "id, username, email, image_url, header_image_url, bio, location, password";

/// Hash a plaintext password into an argon2 PHC string
pub fn hash_password(password: &str) -> Result<String> {
    let salt = SaltString::generate(&mut rand::thread_rng());
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| anyhow::anyhow!("Failed to hash password: {}", e))?
        .to_string();
    Ok(hash)
}

/// Check a plaintext password against a stored hash
///
/// An unparsable stored hash counts as a mismatch.
pub fn verify_password(user: &User, password: &str) -> bool {
    let parsed_hash = match PasswordHash::new(&user.password) {
        Ok(hash) => hash,
        Err(e) => {
            warn!("Stored password hash for user {} is invalid: {}", user.id, e);
            return false;
        }
    };

    Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok()
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// User repository
#[derive(Clone)]
pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    /// Create a new user repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create a new user with a hashed password
    ///
    /// Duplicate usernames or emails fail with a unique violation, see
    /// [`common::error::unique_violation`].
    pub async fn signup(&self, new_user: &NewUser) -> Result<User> {
        info!("Creating new user: {}", new_user.username);

        let password_hash = hash_password(&new_user.password)?;
        let image_url = non_blank(new_user.image_url.as_deref()).unwrap_or(DEFAULT_IMAGE_URL);

        let user = sqlx::query_as::<_, User>(&format!(
            r#"
            INSERT INTO users (username, email, password, image_url)
            VALUES ($1, $2, $3, $4)
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(&new_user.username)
        .bind(&new_user.email)
        .bind(&password_hash)
        .bind(image_url)
        .fetch_one(&self.pool)
        .await?;

        Ok(user)
    }

    /// Find a user by username and verify the password
    ///
    /// Returns `None` for an unknown username or a wrong password.
    pub async fn authenticate(&self, username: &str, password: &str) -> Result<Option<User>> {
        let Some(user) = self.find_by_username(username).await? else {
            return Ok(None);
        };

        if verify_password(&user, password) {
            Ok(Some(user))
        } else {
            Ok(None)
        }
    }

    /// Find a user by username
    pub async fn find_by_username(&self, username: &str) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE username = $1"
        ))
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    /// Find a user by ID
    pub async fn find_by_id(&self, id: i32) -> Result<Option<User>> {
        let user =
            sqlx::query_as::<_, User>(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1"))
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;

        Ok(user)
    }

    /// List users, optionally filtered by a username substring
    pub async fn list(&self, search: Option<&str>) -> Result<Vec<UserSummary>> {
        let users = match non_blank(search) {
            Some(term) => {
                let pattern = format!("%{}%", escape_like(term));
                sqlx::query_as::<_, UserSummary>(
                    r#"
                    SELECT id, username, image_url, bio
                    FROM users
                    WHERE username ILIKE $1 ESCAPE '\'
                    ORDER BY username
                    "#,
                )
                .bind(pattern)
                .fetch_all(&self.pool)
                .await?
            }
            None => {
                sqlx::query_as::<_, UserSummary>(
                    "SELECT id, username, image_url, bio FROM users ORDER BY username",
                )
                .fetch_all(&self.pool)
                .await?
            }
        };

        Ok(users)
    }

    /// Users that `user_id` follows
    pub async fn following(&self, user_id: i32) -> Result<Vec<UserSummary>> {
        let users = sqlx::query_as::<_, UserSummary>(
            r#"
            SELECT u.id, u.username, u.image_url, u.bio
            FROM follows f
            JOIN users u ON u.id = f.followed_id
            WHERE f.follower_id = $1
            ORDER BY u.username
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(users)
    }

    /// Users that follow `user_id`
    pub async fn followers(&self, user_id: i32) -> Result<Vec<UserSummary>> {
        let users = sqlx::query_as::<_, UserSummary>(
            r#"
            SELECT u.id, u.username, u.image_url, u.bio
            FROM follows f
            JOIN users u ON u.id = f.follower_id
            WHERE f.followed_id = $1
            ORDER BY u.username
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(users)
    }

    /// Record that `follower_id` follows `followed_id`
    ///
    /// Returns false when the follow already existed.
    pub async fn follow(&self, follower_id: i32, followed_id: i32) -> Result<bool> {
        info!("User {} follows user {}", follower_id, followed_id);

        let result = sqlx::query(
            r#"
            INSERT INTO follows (followed_id, follower_id)
            VALUES ($1, $2)
            ON CONFLICT DO NOTHING
            "#,
        )
        .bind(followed_id)
        .bind(follower_id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Remove a follow; returns false when there was none
    pub async fn unfollow(&self, follower_id: i32, followed_id: i32) -> Result<bool> {
        info!("User {} stops following user {}", follower_id, followed_id);

        let result =
            sqlx::query("DELETE FROM follows WHERE followed_id = $1 AND follower_id = $2")
                .bind(followed_id)
                .bind(follower_id)
                .execute(&self.pool)
                .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Whether `follower_id` follows `followed_id`
    pub async fn is_following(&self, follower_id: i32, followed_id: i32) -> Result<bool> {
        let exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS (SELECT 1 FROM follows WHERE followed_id = $1 AND follower_id = $2)",
        )
        .bind(followed_id)
        .bind(follower_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(exists)
    }

    /// Message, following, follower and like counts for a profile
    pub async fn stats(&self, user_id: i32) -> Result<UserStats> {
        let stats = sqlx::query_as::<_, UserStats>(
            r#"
            SELECT
                (SELECT COUNT(*) FROM messages WHERE user_id = $1) AS messages,
                (SELECT COUNT(*) FROM follows WHERE follower_id = $1) AS following,
                (SELECT COUNT(*) FROM follows WHERE followed_id = $1) AS followers,
                (SELECT COUNT(*) FROM likes WHERE user_id = $1) AS likes
            "#,
        )
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(stats)
    }

    /// Update account details; blank image URLs fall back to the defaults
    pub async fn update(&self, id: i32, update: &UpdateUser) -> Result<User> {
        info!("Updating user {}", id);

        let image_url = non_blank(update.image_url.as_deref()).unwrap_or(DEFAULT_IMAGE_URL);
        let header_image_url =
            non_blank(update.header_image_url.as_deref()).unwrap_or(DEFAULT_HEADER_IMAGE_URL);

        let user = sqlx::query_as::<_, User>(&format!(
            r#"
            UPDATE users
            SET username = $2, email = $3, image_url = $4, header_image_url = $5, bio = $6
            WHERE id = $1
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(&update.username)
        .bind(&update.email)
        .bind(image_url)
        .bind(header_image_url)
        .bind(non_blank(update.bio.as_deref()))
        .fetch_one(&self.pool)
        .await?;

        Ok(user)
    }

    /// Update location, bio and header image
    pub async fn update_profile(&self, id: i32, update: &ProfileUpdate) -> Result<User> {
        info!("Updating profile of user {}", id);

        let header_image_url =
            non_blank(update.header_image_url.as_deref()).unwrap_or(DEFAULT_HEADER_IMAGE_URL);

        let user = sqlx::query_as::<_, User>(&format!(
            r#"
            UPDATE users
            SET location = $2, bio = $3, header_image_url = $4
            WHERE id = $1
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(non_blank(update.location.as_deref()))
        .bind(non_blank(update.bio.as_deref()))
        .bind(header_image_url)
        .fetch_one(&self.pool)
        .await?;

        Ok(user)
    }

    /// Delete a user; messages, follows and likes cascade
    pub async fn delete(&self, id: i32) -> Result<bool> {
        info!("Deleting user {}", id);

        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

fn escape_like(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len());
    for c in term.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}
