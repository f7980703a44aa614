//! Signup, login and logout

use axum::{
    Form,
    extract::State,
    response::{IntoResponse, Redirect, Response},
};
use common::error::unique_violation;
use tracing::{info, warn};

use crate::{
    auth::{AuthUser, CurrentUser},
    error::WebResult,
    forms::{FieldErrors, LoginForm, SignupForm},
    routes::render,
    session::{FlashCategory, Session},
    state::AppState,
    views,
};

/// Flash text for a violated unique constraint on `users`
pub(crate) fn duplicate_user_message(constraint: &str) -> &'static str {
    if constraint.contains("email") {
        "Email already taken"
    } else {
        "Username already taken"
    }
}

/// Show the signup form
pub async fn signup_form(CurrentUser(user): CurrentUser, session: Session) -> Response {
    render(session, user.as_ref(), |ctx| {
        views::signup(ctx, &SignupForm::default(), &FieldErrors::default())
    })
}

/// Create a new user, log them in and redirect home
///
/// Invalid input or a taken username/email re-presents the form.
pub async fn signup(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    mut session: Session,
    Form(form): Form<SignupForm>,
) -> WebResult<Response> {
    let errors = form.validate();
    if !errors.is_empty() {
        return Ok(render(session, user.as_ref(), |ctx| {
            views::signup(ctx, &form, &errors)
        }));
    }

    match state.user_repository.signup(&form.to_new_user()).await {
        Ok(new_user) => {
            info!("User {} signed up", new_user.id);
            session.login(new_user.id);
            Ok((session, Redirect::to("/")).into_response())
        }
        Err(e) => match unique_violation(&e) {
            Some(constraint) => {
                warn!("Signup rejected, constraint {} violated", constraint);
                session.flash(FlashCategory::Danger, duplicate_user_message(&constraint));
                Ok(render(session, user.as_ref(), |ctx| {
                    views::signup(ctx, &form, &errors)
                }))
            }
            None => Err(e.into()),
        },
    }
}

/// Show the login form
pub async fn login_form(CurrentUser(user): CurrentUser, session: Session) -> Response {
    render(session, user.as_ref(), |ctx| {
        views::login(ctx, &LoginForm::default(), &FieldErrors::default())
    })
}

/// Check credentials and log the user in
pub async fn login(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    mut session: Session,
    Form(form): Form<LoginForm>,
) -> WebResult<Response> {
    let errors = form.validate();
    if !errors.is_empty() {
        return Ok(render(session, user.as_ref(), |ctx| {
            views::login(ctx, &form, &errors)
        }));
    }

    info!("Login attempt for user: {}", form.username.trim());

    match state
        .user_repository
        .authenticate(form.username.trim(), &form.password)
        .await?
    {
        Some(authenticated) => {
            session.login(authenticated.id);
            session.flash(
                FlashCategory::Success,
                format!("Hello, {}!", authenticated.username),
            );
            Ok((session, Redirect::to("/")).into_response())
        }
        None => {
            session.flash(FlashCategory::Danger, "Invalid credentials.");
            Ok(render(session, user.as_ref(), |ctx| {
                views::login(ctx, &form, &errors)
            }))
        }
    }
}

/// Log out and go to the login page
pub async fn logout(AuthUser(user): AuthUser, mut session: Session) -> Response {
    info!("User {} logged out", user.id);
    session.logout();
    session.flash(
        FlashCategory::Success,
        "You've been successfully logged out!",
    );
    (session, Redirect::to("/login")).into_response()
}
