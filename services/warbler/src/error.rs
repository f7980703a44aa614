//! Custom error types for the web service

use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use thiserror::Error;
use tracing::error;

use crate::{session::SessionError, views};

/// Errors a handler can bubble up
#[derive(Error, Debug)]
pub enum WebError {
    /// Requested user or message does not exist
    #[error("Not found")]
    NotFound,

    /// Session could not be written
    #[error("Session error: {0}")]
    Session(#[from] SessionError),

    /// Database or other unexpected failure
    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl IntoResponse for WebError {
    fn into_response(self) -> Response {
        match self {
            WebError::NotFound => (StatusCode::NOT_FOUND, Html(views::not_found())).into_response(),
            other => {
                error!("Request failed: {:#}", other);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Html(views::server_error()),
                )
                    .into_response()
            }
        }
    }
}

/// Type alias for handler results
pub type WebResult<T> = Result<T, WebError>;
