//! Signup, login and user lookup

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use super::error::{ApiError, ApiResult, ErrorBody};
use super::server::SharedState;
use crate::auth::{
    hash_password, normalize_email, verify_password, AuthUser, LoginRequest, SessionResponse,
    SignupRequest,
};
use crate::store::{User, UserInfo};

pub const USER_NOT_FOUND: &str = "User not found";
pub const LOGIN_FAILED: &str = "Login failed";

pub async fn index() -> &'static str {
    "Tallyboard API is running"
}

pub async fn health() -> impl IntoResponse {
    Json(json!({ "status": "ok" }))
}

/// Register a user and start a session
pub async fn signup(
    State(state): State<SharedState>,
    payload: Result<Json<SignupRequest>, JsonRejection>,
) -> ApiResult<Json<SessionResponse>> {
    let Json(req) = payload?;
    let email = normalize_email(&req.email);

    if email.is_empty() || req.password.is_empty() {
        return Err(ApiError::BadRequest(
            "Email and password are required".to_string(),
        ));
    }

    if state.store.find_user(&email).await?.is_some() {
        return Err(ApiError::Conflict("Email already registered".to_string()));
    }

    let password_hash = hash_password(&req.password, state.config.auth.bcrypt_cost).await?;
    let user = User {
        email: email.clone(),
        first_name: req.first_name.trim().to_string(),
        last_name: req.last_name.trim().to_string(),
        password_hash,
    };
    // A concurrent signup for the same email loses here via the store's uniqueness check
    state.store.insert_user(&user).await?;

    let token = state.tokens.issue(&email)?;
    tracing::info!("Registered {}", email);

    Ok(Json(SessionResponse { email, token }))
}

/// Exchange credentials for a token
pub async fn login(
    State(state): State<SharedState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> ApiResult<Response> {
    let Json(req) = payload?;
    let email = normalize_email(&req.email);

    let Some(user) = state.store.find_user(&email).await? else {
        tracing::debug!("Login for unknown user {}", email);
        return Ok(login_failure(&state, USER_NOT_FOUND));
    };

    if !verify_password(&req.password, &user.password_hash).await {
        tracing::debug!("Wrong password for {}", email);
        return Ok(login_failure(&state, LOGIN_FAILED));
    }

    let token = state.tokens.issue(&user.email)?;
    Ok(Json(SessionResponse {
        email: user.email,
        token,
    })
    .into_response())
}

fn login_failure(state: &SharedState, detail: &str) -> Response {
    if state.config.auth.legacy_login_status {
        (StatusCode::OK, Json(ErrorBody::new(detail))).into_response()
    } else {
        ApiError::Unauthorized(detail.to_string()).into_response()
    }
}

/// Public profile of the authenticated owner
pub async fn get_user(
    State(state): State<SharedState>,
    user: AuthUser,
) -> ApiResult<Json<UserInfo>> {
    let record = state
        .store
        .find_user(&user.email)
        .await?
        .ok_or_else(|| ApiError::NotFound(USER_NOT_FOUND.to_string()))?;

    Ok(Json(UserInfo::from(record)))
}
