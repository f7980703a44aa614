//! Schema management

use common::error::{DatabaseError, DatabaseResult};
use sqlx::{PgPool, migrate::Migrator};
use tracing::{info, warn};

static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

/// Apply pending migrations
pub async fn migrate(pool: &PgPool) -> DatabaseResult<()> {
    info!("Running database migrations");

    MIGRATOR
        .run(pool)
        .await
        .map_err(|e| DatabaseError::Migration(e.to_string()))?;

    info!("Database migrations applied");
    Ok(())
}

/// Drop every table and recreate the schema from scratch
pub async fn reset(pool: &PgPool) -> DatabaseResult<()> {
    warn!("Dropping all tables");

    sqlx::query("DROP TABLE IF EXISTS likes, follows, messages, users, _sqlx_migrations CASCADE")
        .execute(pool)
        .await
        .map_err(DatabaseError::Query)?;

    migrate(pool).await
}
