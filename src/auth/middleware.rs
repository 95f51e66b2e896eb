//! Authentication middleware and extractors
//!
//! Every owner-scoped route goes through [`require_owner`]:
//! extract the token, verify it, bind the identity, then compare it with the
//! `{email}` path segment. Missing or bad tokens are 401, a good token for
//! someone else's resource is 403.

use std::collections::HashMap;

use axum::{
    extract::{FromRequestParts, Path, Request, State},
    RequestExt,
    http::{header, request::Parts, HeaderMap},
    middleware::Next,
    response::Response,
};

use crate::api::SharedState;
use crate::auth::{AuthError, AuthUser, TokenService};

/// Path parameter naming the resource owner
pub const OWNER_PARAM: &str = "email";

/// Pull the raw token out of the Authorization header.
///
/// Clients send the token as-is. A `Bearer ` prefix is tolerated.
pub fn extract_token(headers: &HeaderMap) -> Result<&str, AuthError> {
    let value = headers
        .get(header::AUTHORIZATION)
        .ok_or(AuthError::MissingToken)?
        .to_str()
        .map_err(|_| AuthError::MissingToken)?
        .trim();

    let token = match value.strip_prefix("Bearer") {
        Some(rest) if rest.is_empty() || rest.starts_with(char::is_whitespace) => rest.trim(),
        _ => value,
    };
    if token.is_empty() {
        return Err(AuthError::MissingToken);
    }
    Ok(token)
}

/// Extract and verify the token carried by a request
pub fn authenticate(tokens: &TokenService, headers: &HeaderMap) -> Result<AuthUser, AuthError> {
    let token = extract_token(headers)?;
    let email = tokens.verify(token)?;
    Ok(AuthUser { email })
}

/// Check that an authenticated user owns the resource named in the path
pub fn authorize(user: &AuthUser, owner: Option<&str>) -> Result<(), AuthError> {
    match owner {
        Some(owner) if user.owns(owner) => Ok(()),
        _ => Err(AuthError::Forbidden),
    }
}

/// Middleware for owner-scoped routes
pub async fn require_owner(
    State(state): State<SharedState>,
    mut req: Request,
    next: Next,
) -> Result<Response, AuthError> {
    let user = authenticate(&state.tokens, req.headers()).inspect_err(|e| {
        tracing::debug!("Rejected {} {}: {}", req.method(), req.uri().path(), e);
    })?;

    // An owner segment that does not decode owns nothing
    let params = req
        .extract_parts::<Path<HashMap<String, String>>>()
        .await
        .map(|Path(params)| params)
        .unwrap_or_default();

    authorize(&user, params.get(OWNER_PARAM).map(String::as_str)).inspect_err(|_| {
        tracing::debug!(
            "{} denied access to {} {}",
            user.email,
            req.method(),
            req.uri().path()
        );
    })?;

    req.extensions_mut().insert(user);
    Ok(next.run(req).await)
}

impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthUser>()
            .cloned()
            .ok_or(AuthError::MissingToken)
    }
}
