//! Signed cookie sessions
//!
//! The whole session (logged-in user id under `curr_user` plus pending
//! flash messages) travels in a single HS256 token signed with
//! `SECRET_KEY`, stored in the `session` cookie. A token that fails
//! verification, for whatever reason, is an empty session.

use std::sync::Arc;

use axum::{
    extract::FromRequestParts,
    http::{HeaderValue, StatusCode, header::SET_COOKIE, request::Parts},
    response::{IntoResponse, IntoResponseParts, Response, ResponseParts},
};
use axum_extra::{TypedHeader, headers::Cookie};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, error};

use crate::state::AppState;

/// Name of the session cookie
pub const SESSION_COOKIE: &str = "session";

/// Session errors
#[derive(Error, Debug)]
pub enum SessionError {
    /// Token could not be signed
    #[error("Failed to sign session: {0}")]
    Encode(#[source] jsonwebtoken::errors::Error),

    /// Token was missing a valid signature or had expired
    #[error("Invalid session token: {0}")]
    Decode(#[source] jsonwebtoken::errors::Error),

    /// Cookie could not be turned into a header value
    #[error("Invalid session cookie header")]
    Header,
}

impl IntoResponse for SessionError {
    fn into_response(self) -> Response {
        error!("{}", self);
        (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error").into_response()
    }
}

/// Flash message category, used as a CSS class by the views
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum FlashCategory {
    Success,
    Danger,
}

impl FlashCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            FlashCategory::Success => "success",
            FlashCategory::Danger => "danger",
        }
    }
}

/// One-shot notification shown on the next rendered page
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Flash {
    pub category: FlashCategory,
    pub message: String,
}

/// Session contents
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct SessionData {
    /// Logged-in user id
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub curr_user: Option<i32>,
    /// Pending flash messages
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub flashes: Vec<Flash>,
}

impl SessionData {
    pub fn is_empty(&self) -> bool {
        self.curr_user.is_none() && self.flashes.is_empty()
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct SessionClaims {
    #[serde(flatten)]
    data: SessionData,
    iat: i64,
    exp: i64,
}

/// Signing material and lifetime for session tokens
pub struct SessionKeys {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    ttl_secs: u64,
}

impl SessionKeys {
    /// Build keys from the application secret
    pub fn new(secret: &str, ttl_secs: u64) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;

        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
            ttl_secs,
        }
    }

    /// Sign session contents into a token
    pub fn encode(&self, data: &SessionData) -> Result<String, SessionError> {
        let now = chrono::Utc::now().timestamp();
        let claims = SessionClaims {
            data: data.clone(),
            iat: now,
            exp: now + self.ttl_secs as i64,
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(SessionError::Encode)
    }

    /// Verify a token and return its contents
    pub fn decode(&self, token: &str) -> Result<SessionData, SessionError> {
        let token_data = decode::<SessionClaims>(token, &self.decoding_key, &self.validation)
            .map_err(SessionError::Decode)?;
        Ok(token_data.claims.data)
    }

    /// `Cookie` request header value carrying `data`
    pub fn cookie_header(&self, data: &SessionData) -> Result<String, SessionError> {
        Ok(format!("{}={}", SESSION_COOKIE, self.encode(data)?))
    }

    /// `Set-Cookie` response header value for `data`
    ///
    /// An empty session expires the cookie instead.
    pub fn set_cookie_header(&self, data: &SessionData) -> Result<String, SessionError> {
        if data.is_empty() {
            return Ok(format!(
                "{}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0",
                SESSION_COOKIE
            ));
        }

        Ok(format!(
            "{}={}; Path=/; HttpOnly; SameSite=Lax; Max-Age={}",
            SESSION_COOKIE,
            self.encode(data)?,
            self.ttl_secs
        ))
    }

    /// Read the session from request parts, falling back to an empty one
    pub async fn read(&self, parts: &mut Parts) -> SessionData {
        let cookies = Option::<TypedHeader<Cookie>>::from_request_parts(parts, &())
            .await
            .unwrap_or(None);

        let Some(TypedHeader(cookies)) = cookies else {
            return SessionData::default();
        };

        match cookies.get(SESSION_COOKIE) {
            Some(token) if !token.is_empty() => self.decode(token).unwrap_or_else(|e| {
                debug!("Discarding session cookie: {}", e);
                SessionData::default()
            }),
            _ => SessionData::default(),
        }
    }
}

/// Per-request session handle
///
/// Include it in a response tuple to persist changes, e.g.
/// `(session, Redirect::to("/"))`. Unchanged sessions emit no cookie.
pub struct Session {
    data: SessionData,
    keys: Arc<SessionKeys>,
    changed: bool,
}

impl Session {
    pub fn new(data: SessionData, keys: Arc<SessionKeys>) -> Self {
        Self {
            data,
            keys,
            changed: false,
        }
    }

    /// Log a user in
    pub fn login(&mut self, user_id: i32) {
        self.data.curr_user = Some(user_id);
        self.changed = true;
    }

    /// Log the current user out; pending flashes survive
    pub fn logout(&mut self) {
        if self.data.curr_user.take().is_some() {
            self.changed = true;
        }
    }

    /// Queue a flash message for the next rendered page
    pub fn flash(&mut self, category: FlashCategory, message: impl Into<String>) {
        self.data.flashes.push(Flash {
            category,
            message: message.into(),
        });
        self.changed = true;
    }

    /// Drain pending flash messages for rendering
    pub fn take_flashes(&mut self) -> Vec<Flash> {
        if !self.data.flashes.is_empty() {
            self.changed = true;
        }
        std::mem::take(&mut self.data.flashes)
    }
}

#[axum::async_trait]
impl FromRequestParts<AppState> for Session {
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let data = state.session_keys.read(parts).await;
        Ok(Session::new(data, state.session_keys.clone()))
    }
}

impl IntoResponseParts for Session {
    type Error = SessionError;

    fn into_response_parts(self, mut res: ResponseParts) -> Result<ResponseParts, Self::Error> {
        if !self.changed {
            return Ok(res);
        }

        let cookie = self.keys.set_cookie_header(&self.data)?;
        let value = HeaderValue::from_str(&cookie).map_err(|_| SessionError::Header)?;
        res.headers_mut().append(SET_COOKIE, value);
        Ok(res)
    }
}
