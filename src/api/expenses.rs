//! Income/expense ledger routes

use std::collections::HashMap;

use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    http::StatusCode,
    Json,
};
use serde_json::{json, Value};
use uuid::Uuid;

use super::error::{ApiError, ApiResult};
use super::server::SharedState;
use crate::auth::AuthUser;
use crate::store::{Expense, ExpenseInput};

/// Parse the optional `limit` query parameter. It is bound as a statement
/// parameter, never spliced into SQL.
fn parse_limit(query: &HashMap<String, String>) -> ApiResult<Option<i64>> {
    let Some(raw) = query.get("limit") else {
        return Ok(None);
    };

    match raw.trim().parse::<i64>() {
        Ok(limit) if limit > 0 => Ok(Some(limit)),
        _ => Err(ApiError::BadRequest(
            "limit must be a positive integer".to_string(),
        )),
    }
}

pub async fn list_expenses(
    State(state): State<SharedState>,
    user: AuthUser,
    Query(query): Query<HashMap<String, String>>,
) -> ApiResult<Json<Vec<Expense>>> {
    let limit = parse_limit(&query)?;
    Ok(Json(state.store.list_expenses(&user.email, limit).await?))
}

pub async fn create_expense(
    State(state): State<SharedState>,
    user: AuthUser,
    payload: Result<Json<ExpenseInput>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<Expense>)> {
    let Json(input) = payload?;

    if input.title.trim().is_empty() {
        return Err(ApiError::BadRequest("Title is required".to_string()));
    }
    if input.amount_cents <= 0 {
        return Err(ApiError::BadRequest(
            "amount_cents must be positive".to_string(),
        ));
    }

    let entry = state.store.create_expense(&user.email, &input).await?;
    Ok((StatusCode::CREATED, Json(entry)))
}

pub async fn delete_expense(
    State(state): State<SharedState>,
    user: AuthUser,
    Path((_owner, id)): Path<(String, String)>,
) -> ApiResult<Json<Value>> {
    let not_found = || ApiError::NotFound("Entry not found".to_string());
    let id = Uuid::parse_str(&id).map_err(|_| not_found())?;

    if !state.store.delete_expense(&user.email, id).await? {
        return Err(not_found());
    }
    Ok(Json(json!({ "deleted": true })))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn query(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_limit_absent() {
        assert_eq!(parse_limit(&query(&[])).unwrap(), None);
    }

    #[test]
    fn test_limit_numeric() {
        assert_eq!(parse_limit(&query(&[("limit", "5")])).unwrap(), Some(5));
    }

    #[test]
    fn test_limit_rejects_non_numeric() {
        assert!(parse_limit(&query(&[("limit", "5; DROP TABLE expenses")])).is_err());
        assert!(parse_limit(&query(&[("limit", "0")])).is_err());
        assert!(parse_limit(&query(&[("limit", "-3")])).is_err());
    }
}
