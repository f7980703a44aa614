//! Homepage and health check

use axum::{
    Json,
    extract::State,
    response::{IntoResponse, Response},
};
use serde_json::json;

use crate::{
    auth::CurrentUser,
    error::WebResult,
    repositories::FEED_LIMIT,
    routes::{liked_set, render},
    session::Session,
    state::AppState,
    views,
};

/// Home feed for a logged-in user, landing page otherwise
///
/// The feed holds the newest messages of the user and everyone they follow.
pub async fn homepage(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    session: Session,
) -> WebResult<Response> {
    let Some(user) = user else {
        return Ok(render(session, None, views::home_anon));
    };

    let stats = state.user_repository.stats(user.id).await?;
    let messages = state
        .message_repository
        .home_feed(user.id, FEED_LIMIT)
        .await?;
    let liked = liked_set(&state, Some(&user)).await?;

    Ok(render(session, Some(&user), |ctx| {
        views::home(ctx, &user, &stats, &messages, &liked)
    }))
}

/// Health check endpoint
pub async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    let database = common::database::health_check(&state.db_pool)
        .await
        .unwrap_or(false);

    Json(json!({
        "status": if database { "ok" } else { "degraded" },
        "service": "warbler",
        "database": database
    }))
}
