//! User directory, profiles and follows

use axum::{
    Form,
    extract::{Path, Query, State},
    response::{IntoResponse, Redirect, Response},
};
use common::error::unique_violation;
use serde::Deserialize;
use tracing::{info, warn};

use crate::{
    auth::{AuthUser, CurrentUser},
    error::{WebError, WebResult},
    forms::{EditProfileForm, FieldErrors, ProfileForm},
    models::User,
    repositories::{FEED_LIMIT, verify_password},
    routes::{accounts::duplicate_user_message, liked_set, render},
    session::{FlashCategory, Session},
    state::AppState,
    views,
};

/// Query parameters for the user directory
#[derive(Debug, Default, Deserialize)]
pub struct SearchQuery {
    pub q: Option<String>,
}

async fn find_user(state: &AppState, id: i32) -> WebResult<User> {
    state
        .user_repository
        .find_by_id(id)
        .await?
        .ok_or(WebError::NotFound)
}

/// List users, filtered by `q` when present
pub async fn list_users(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    session: Session,
    Query(query): Query<SearchQuery>,
) -> WebResult<Response> {
    let search = query.q.as_deref().map(str::trim).filter(|q| !q.is_empty());
    let users = state.user_repository.list(search).await?;

    Ok(render(session, user.as_ref(), |ctx| {
        views::users_index(ctx, &users, search)
    }))
}

/// Profile page with the user's newest messages
pub async fn show_user(
    State(state): State<AppState>,
    CurrentUser(viewer): CurrentUser,
    session: Session,
    Path(id): Path<i32>,
) -> WebResult<Response> {
    let user = find_user(&state, id).await?;
    let stats = state.user_repository.stats(user.id).await?;
    let messages = state.message_repository.for_user(user.id, FEED_LIMIT).await?;
    let liked = liked_set(&state, viewer.as_ref()).await?;
    let is_following = match &viewer {
        Some(viewer) => state.user_repository.is_following(viewer.id, user.id).await?,
        None => false,
    };

    Ok(render(session, viewer.as_ref(), |ctx| {
        views::user_show(ctx, &user, &stats, &messages, is_following, &liked)
    }))
}

/// Users followed by `id`
pub async fn show_following(
    State(state): State<AppState>,
    AuthUser(viewer): AuthUser,
    session: Session,
    Path(id): Path<i32>,
) -> WebResult<Response> {
    let user = find_user(&state, id).await?;
    let following = state.user_repository.following(user.id).await?;

    Ok(render(session, Some(&viewer), |ctx| {
        views::user_connections(ctx, "Following", &user, &following)
    }))
}

/// Followers of `id`
pub async fn show_followers(
    State(state): State<AppState>,
    AuthUser(viewer): AuthUser,
    session: Session,
    Path(id): Path<i32>,
) -> WebResult<Response> {
    let user = find_user(&state, id).await?;
    let followers = state.user_repository.followers(user.id).await?;

    Ok(render(session, Some(&viewer), |ctx| {
        views::user_connections(ctx, "Followers", &user, &followers)
    }))
}

/// Follow another user
pub async fn add_follow(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    mut session: Session,
    Path(id): Path<i32>,
) -> WebResult<Response> {
    let following_page = format!("/users/{}/following", user.id);

    if id == user.id {
        session.flash(FlashCategory::Danger, "You cannot follow yourself.");
        return Ok((session, Redirect::to(&following_page)).into_response());
    }

    let followed = find_user(&state, id).await?;
    if state.user_repository.follow(user.id, followed.id).await? {
        info!("User {} now follows {}", user.id, followed.id);
    }

    Ok((session, Redirect::to(&following_page)).into_response())
}

/// Stop following another user
pub async fn stop_following(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    session: Session,
    Path(id): Path<i32>,
) -> WebResult<Response> {
    if state.user_repository.unfollow(user.id, id).await? {
        info!("User {} stopped following {}", user.id, id);
    }

    let following_page = format!("/users/{}/following", user.id);
    Ok((session, Redirect::to(&following_page)).into_response())
}

/// Own profile with the details form
pub async fn profile_form(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    session: Session,
) -> WebResult<Response> {
    let stats = state.user_repository.stats(user.id).await?;
    let form = ProfileForm::from_user(&user);

    Ok(render(session, Some(&user), |ctx| {
        views::profile(ctx, &user, &stats, &form, &FieldErrors::default())
    }))
}

/// Save location, bio and header image
pub async fn update_profile(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    mut session: Session,
    Form(form): Form<ProfileForm>,
) -> WebResult<Response> {
    let errors = form.validate();
    if !errors.is_empty() {
        let stats = state.user_repository.stats(user.id).await?;
        return Ok(render(session, Some(&user), |ctx| {
            views::profile(ctx, &user, &stats, &form, &errors)
        }));
    }

    state
        .user_repository
        .update_profile(user.id, &form.to_update())
        .await?;
    session.flash(FlashCategory::Success, "Profile updated successfully!");

    Ok((session, Redirect::to("/users/profile")).into_response())
}

/// Account edit form, prefilled from the stored user
pub async fn edit_form(AuthUser(user): AuthUser, session: Session) -> Response {
    let form = EditProfileForm::from_user(&user);
    render(session, Some(&user), |ctx| {
        views::edit_user(ctx, &form, &FieldErrors::default())
    })
}

/// Update account details after checking the current password
pub async fn edit_user(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    mut session: Session,
    Form(form): Form<EditProfileForm>,
) -> WebResult<Response> {
    let errors = form.validate();
    if !errors.is_empty() {
        return Ok(render(session, Some(&user), |ctx| {
            views::edit_user(ctx, &form, &errors)
        }));
    }

    if !verify_password(&user, &form.password) {
        warn!("Wrong password on profile edit for user {}", user.id);
        session.flash(FlashCategory::Danger, "Wrong password. Please try again.");
        return Ok(render(session, Some(&user), |ctx| {
            views::edit_user(ctx, &form, &errors)
        }));
    }

    match state.user_repository.update(user.id, &form.to_update()).await {
        Ok(_) => {
            session.flash(FlashCategory::Success, "Profile updated successfully!");
            Ok((session, Redirect::to("/users/profile")).into_response())
        }
        Err(e) => match unique_violation(&e) {
            Some(constraint) => {
                session.flash(FlashCategory::Danger, duplicate_user_message(&constraint));
                Ok(render(session, Some(&user), |ctx| {
                    views::edit_user(ctx, &form, &errors)
                }))
            }
            None => Err(e.into()),
        },
    }
}

/// Delete the logged-in user and everything they own
pub async fn delete_user(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    mut session: Session,
) -> WebResult<Response> {
    session.logout();
    state.user_repository.delete(user.id).await?;
    info!("User {} deleted their account", user.id);

    Ok((session, Redirect::to("/signup")).into_response())
}
