//! Authentication models

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::api::ErrorBody;

/// Why a request was refused by the auth layer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum AuthError {
    /// No usable Authorization header
    #[error("Missing authorization token")]
    MissingToken,
    /// Not a token we signed
    #[error("Invalid token")]
    Malformed,
    /// Signed by us, past its expiry
    #[error("Token expired")]
    Expired,
    /// Valid token for a different owner
    #[error("Not allowed to access this resource")]
    Forbidden,
}

impl AuthError {
    pub fn status(&self) -> StatusCode {
        match self {
            AuthError::Forbidden => StatusCode::FORBIDDEN,
            AuthError::MissingToken | AuthError::Malformed | AuthError::Expired => {
                StatusCode::UNAUTHORIZED
            }
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        (self.status(), Json(ErrorBody::new(self.to_string()))).into_response()
    }
}

/// Identity bound to a request after its token has been verified
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthUser {
    pub email: String,
}

impl AuthUser {
    /// Whether this identity owns resources filed under `owner`
    pub fn owns(&self, owner: &str) -> bool {
        normalize_email(owner) == self.email
    }
}

/// Signup payload
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignupRequest {
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub password: String,
}

/// Login credentials
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Returned by a successful signup or login
#[derive(Debug, Serialize, Deserialize)]
pub struct SessionResponse {
    pub email: String,
    pub token: String,
}

/// Lowercase and trim an email so lookups do not depend on how it was typed
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}
