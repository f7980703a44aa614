//! Message repository for database operations

use anyhow::Result;
use sqlx::PgPool;
use tracing::info;

use crate::models::{Message, MessageWithAuthor, NewMessage};

/// Maximum number of messages shown on a feed or profile
pub const FEED_LIMIT: i64 = 100;

/// Message repository
#[derive(Clone)]
pub struct MessageRepository {
    pool: PgPool,
}

impl MessageRepository {
    /// Create a new message repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create a new message
    pub async fn create(&self, new_message: &NewMessage) -> Result<Message> {
        info!("Creating message for user {}", new_message.user_id);

        let message = sqlx::query_as::<_, Message>(
            r#"
            INSERT INTO messages (text, user_id)
            VALUES ($1, $2)
            RETURNING id, text, timestamp, user_id
            "#,
        )
        .bind(&new_message.text)
        .bind(new_message.user_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(message)
    }

    /// Find a message and its author by message ID
    pub async fn find_by_id(&self, id: i32) -> Result<Option<MessageWithAuthor>> {
        let message = sqlx::query_as::<_, MessageWithAuthor>(
            r#"
            SELECT m.id, m.text, m.timestamp, m.user_id, u.username, u.image_url
            FROM messages m
            JOIN users u ON u.id = m.user_id
            WHERE m.id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(message)
    }

    /// Delete a message; returns false when it did not exist
    pub async fn delete(&self, id: i32) -> Result<bool> {
        info!("Deleting message {}", id);

        let result = sqlx::query("DELETE FROM messages WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Newest messages written by `user_id`
    pub async fn for_user(&self, user_id: i32, limit: i64) -> Result<Vec<MessageWithAuthor>> {
        let messages = sqlx::query_as::<_, MessageWithAuthor>(
            r#"
            SELECT m.id, m.text, m.timestamp, m.user_id, u.username, u.image_url
            FROM messages m
            JOIN users u ON u.id = m.user_id
            WHERE m.user_id = $1
            ORDER BY m.timestamp DESC, m.id DESC
            LIMIT $2
            "#,
        )
        .bind(user_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(messages)
    }

    /// Newest messages from `user_id` and everyone they follow
    pub async fn home_feed(&self, user_id: i32, limit: i64) -> Result<Vec<MessageWithAuthor>> {
        let messages = sqlx::query_as::<_, MessageWithAuthor>(
            r#"
            SELECT m.id, m.text, m.timestamp, m.user_id, u.username, u.image_url
            FROM messages m
            JOIN users u ON u.id = m.user_id
            WHERE m.user_id = $1
               OR m.user_id IN (SELECT followed_id FROM follows WHERE follower_id = $1)
            ORDER BY m.timestamp DESC, m.id DESC
            LIMIT $2
            "#,
        )
        .bind(user_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(messages)
    }

    /// Like a message unless already liked
    ///
    /// Runs in a transaction that is rolled back if anything fails.
    /// Returns false when the like already existed, including when a
    /// concurrent request inserted it first.
    pub async fn like(&self, user_id: i32, message_id: i32) -> Result<bool> {
        let mut tx = self.pool.begin().await?;

        let result = sqlx::query(
            "INSERT INTO likes (user_id, message_id) VALUES ($1, $2) ON CONFLICT DO NOTHING",
        )
        .bind(user_id)
        .bind(message_id)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        let added = result.rows_affected() > 0;
        if added {
            info!("User {} liked message {}", user_id, message_id);
        }
        Ok(added)
    }

    /// Remove a like; returns false when there was none
    pub async fn unlike(&self, user_id: i32, message_id: i32) -> Result<bool> {
        let mut tx = self.pool.begin().await?;

        let result = sqlx::query("DELETE FROM likes WHERE user_id = $1 AND message_id = $2")
            .bind(user_id)
            .bind(message_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        let removed = result.rows_affected() > 0;
        if removed {
            info!("User {} unliked message {}", user_id, message_id);
        }
        Ok(removed)
    }

    /// Whether `user_id` likes `message_id`
    pub async fn is_liked(&self, user_id: i32, message_id: i32) -> Result<bool> {
        let liked = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS (SELECT 1 FROM likes WHERE user_id = $1 AND message_id = $2)",
        )
        .bind(user_id)
        .bind(message_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(liked)
    }

    /// IDs of every message `user_id` likes
    pub async fn liked_ids(&self, user_id: i32) -> Result<Vec<i32>> {
        let ids = sqlx::query_scalar::<_, i32>("SELECT message_id FROM likes WHERE user_id = $1")
            .bind(user_id)
            .fetch_all(&self.pool)
            .await?;

        Ok(ids)
    }
}
