//! Request extractors resolving the logged-in user

use axum::{
    extract::FromRequestParts,
    http::request::Parts,
    response::{IntoResponse, Redirect, Response},
};
use tracing::{info, warn};

use crate::{
    error::WebError,
    models::User,
    session::{FlashCategory, Session},
    state::AppState,
};

/// Flash shown when a protected page is requested without a valid login
pub const ACCESS_UNAUTHORIZED: &str = "Access unauthorized.";

/// The logged-in user, if any
///
/// A session naming a user that no longer exists counts as anonymous.
pub struct CurrentUser(pub Option<User>);

#[axum::async_trait]
impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = WebError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let session = state.session_keys.read(parts).await;
        let Some(user_id) = session.curr_user else {
            return Ok(CurrentUser(None));
        };

        let user = state.user_repository.find_by_id(user_id).await?;
        if user.is_none() {
            warn!("Session refers to missing user {}", user_id);
        }

        Ok(CurrentUser(user))
    }
}

/// The logged-in user; anonymous requests are turned away
///
/// Rejection clears any stale user id from the session, flashes
/// [`ACCESS_UNAUTHORIZED`] and redirects home.
pub struct AuthUser(pub User);

#[axum::async_trait]
impl FromRequestParts<AppState> for AuthUser {
    type Rejection = Response;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let CurrentUser(user) = CurrentUser::from_request_parts(parts, state)
            .await
            .map_err(IntoResponse::into_response)?;

        match user {
            Some(user) => Ok(AuthUser(user)),
            None => {
                info!("Rejected anonymous request to {}", parts.uri.path());
                let mut session = Session::from_request_parts(parts, state)
                    .await
                    .unwrap_or_else(|never| match never {});
                // drop a user id that no longer resolves
                session.logout();
                Err(access_unauthorized(session))
            }
        }
    }
}

/// Flash [`ACCESS_UNAUTHORIZED`] and send the visitor home
pub fn access_unauthorized(mut session: Session) -> Response {
    session.flash(FlashCategory::Danger, ACCESS_UNAUTHORIZED);
    (session, Redirect::to("/")).into_response()
}
