//! Posting, viewing, deleting and liking messages

use axum::{
    Form,
    extract::{Path, State},
    http::HeaderMap,
    response::{IntoResponse, Redirect, Response},
};
use tracing::{error, info, warn};

use crate::{
    auth::{AuthUser, CurrentUser, access_unauthorized},
    error::{WebError, WebResult},
    forms::{FieldErrors, MessageForm},
    models::{MessageWithAuthor, NewMessage},
    routes::{back_target, render},
    session::{FlashCategory, Session},
    state::AppState,
    views,
};

const LIKE_FAILED: &str = "An error occurred. Please try again.";

async fn find_message(state: &AppState, id: i32) -> WebResult<MessageWithAuthor> {
    state
        .message_repository
        .find_by_id(id)
        .await?
        .ok_or(WebError::NotFound)
}

/// Show the new message form
pub async fn new_message_form(AuthUser(user): AuthUser, session: Session) -> Response {
    render(session, Some(&user), |ctx| {
        views::new_message(ctx, &MessageForm::default(), &FieldErrors::default())
    })
}

/// Post a message and go to the author's page
pub async fn add_message(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    session: Session,
    Form(form): Form<MessageForm>,
) -> WebResult<Response> {
    let errors = form.validate();
    if !errors.is_empty() {
        return Ok(render(session, Some(&user), |ctx| {
            views::new_message(ctx, &form, &errors)
        }));
    }

    state
        .message_repository
        .create(&NewMessage {
            text: form.text.trim().to_string(),
            user_id: user.id,
        })
        .await?;

    Ok((session, Redirect::to(&format!("/users/{}", user.id))).into_response())
}

/// Show a single message
pub async fn show_message(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    session: Session,
    Path(id): Path<i32>,
) -> WebResult<Response> {
    let message = find_message(&state, id).await?;
    let liked = match &user {
        Some(user) => state.message_repository.is_liked(user.id, message.id).await?,
        None => false,
    };

    Ok(render(session, user.as_ref(), |ctx| {
        views::message_show(ctx, &message, liked)
    }))
}

/// Delete a message owned by the logged-in user
pub async fn delete_message(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    session: Session,
    Path(id): Path<i32>,
) -> WebResult<Response> {
    let message = find_message(&state, id).await?;

    if message.user_id != user.id {
        warn!(
            "User {} tried to delete message {} owned by {}",
            user.id, message.id, message.user_id
        );
        return Ok(access_unauthorized(session));
    }

    state.message_repository.delete(message.id).await?;
    info!("User {} deleted message {}", user.id, message.id);

    Ok((session, Redirect::to(&format!("/users/{}", user.id))).into_response())
}

/// Like someone else's message, then go back
pub async fn like_message(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    mut session: Session,
    Path(id): Path<i32>,
    headers: HeaderMap,
) -> WebResult<Response> {
    let message = find_message(&state, id).await?;

    if message.user_id == user.id {
        session.flash(FlashCategory::Danger, "You cannot like your own message.");
    } else if let Err(e) = state.message_repository.like(user.id, message.id).await {
        error!("Failed to like message {}: {:#}", message.id, e);
        session.flash(FlashCategory::Danger, LIKE_FAILED);
    }

    Ok((session, Redirect::to(&back_target(&headers))).into_response())
}

/// Remove a like, then go back
pub async fn unlike_message(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    mut session: Session,
    Path(id): Path<i32>,
    headers: HeaderMap,
) -> WebResult<Response> {
    let message = find_message(&state, id).await?;

    if let Err(e) = state.message_repository.unlike(user.id, message.id).await {
        error!("Failed to unlike message {}: {:#}", message.id, e);
        session.flash(FlashCategory::Danger, LIKE_FAILED);
    }

    Ok((session, Redirect::to(&back_target(&headers))).into_response())
}
