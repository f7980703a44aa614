//! Warbler HTTP routes

use std::collections::HashSet;

use axum::{
    Router,
    http::{
        HeaderMap, HeaderValue, Uri,
        header::{CACHE_CONTROL, EXPIRES, PRAGMA, REFERER},
    },
    response::{Html, IntoResponse, Response},
    routing::{get, post},
};
use tower_http::{set_header::SetResponseHeaderLayer, trace::TraceLayer};

use crate::{
    error::WebResult,
    models::User,
    session::Session,
    state::AppState,
    views::PageContext,
};

pub mod accounts;
pub mod home;
pub mod messages;
pub mod users;

/// Create the router for the web application
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(home::homepage))
        .route("/health", get(home::health_check))
        .route("/signup", get(accounts::signup_form).post(accounts::signup))
        .route("/login", get(accounts::login_form).post(accounts::login))
        .route("/logout", get(accounts::logout).post(accounts::logout))
        .route("/users", get(users::list_users))
        .route(
            "/users/profile",
            get(users::profile_form).post(users::update_profile),
        )
        .route("/users/edit", get(users::edit_form).post(users::edit_user))
        .route("/users/delete", post(users::delete_user))
        .route("/users/follow/:id", post(users::add_follow))
        .route("/users/stop-following/:id", post(users::stop_following))
        .route("/users/:id", get(users::show_user))
        .route("/users/:id/following", get(users::show_following))
        .route("/users/:id/followers", get(users::show_followers))
        .route(
            "/messages/new",
            get(messages::new_message_form).post(messages::add_message),
        )
        .route("/messages/:id", get(messages::show_message))
        .route("/messages/:id/delete", post(messages::delete_message))
        .route("/messages/:id/like", post(messages::like_message))
        .route("/messages/:id/unlike", post(messages::unlike_message))
        .layer(SetResponseHeaderLayer::overriding(
            CACHE_CONTROL,
            HeaderValue::from_static("public, max-age=0"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            PRAGMA,
            HeaderValue::from_static("no-cache"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            EXPIRES,
            HeaderValue::from_static("0"),
        ))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Render a page, draining pending flashes into it
pub(crate) fn render<F>(mut session: Session, user: Option<&User>, page: F) -> Response
where
    F: FnOnce(&PageContext<'_>) -> String,
{
    let ctx = PageContext::new(user, session.take_flashes());
    let html = page(&ctx);
    (session, Html(html)).into_response()
}

/// Ids of the messages `user` has liked, for rendering like buttons
pub(crate) async fn liked_set(state: &AppState, user: Option<&User>) -> WebResult<HashSet<i32>> {
    match user {
        Some(user) => Ok(state
            .message_repository
            .liked_ids(user.id)
            .await?
            .into_iter()
            .collect()),
        None => Ok(HashSet::new()),
    }
}

/// Local path of the referring page, or `/`
///
/// Only the path and query of the `Referer` are kept, so the redirect can
/// never leave the site.
pub(crate) fn back_target(headers: &HeaderMap) -> String {
    headers
        .get(REFERER)
        .and_then(|value| value.to_str().ok())
        .and_then(|referer| referer.parse::<Uri>().ok())
        .and_then(|uri| uri.path_and_query().map(|pq| pq.as_str().to_string()))
        .filter(|path| path.starts_with('/') && !path.starts_with("//"))
        .unwrap_or_else(|| "/".to_string())
}
