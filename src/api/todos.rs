//! Todo routes

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    Json,
};
use serde_json::{json, Value};
use uuid::Uuid;

use super::error::{ApiError, ApiResult};
use super::server::SharedState;
use crate::auth::AuthUser;
use crate::store::{Todo, TodoInput};

fn validate(input: &TodoInput) -> ApiResult<()> {
    if input.title.trim().is_empty() {
        return Err(ApiError::BadRequest("Title is required".to_string()));
    }
    if !(0..=100).contains(&input.progress) {
        return Err(ApiError::BadRequest(
            "Progress must be between 0 and 100".to_string(),
        ));
    }
    Ok(())
}

fn todo_id(raw: &str) -> ApiResult<Uuid> {
    Uuid::parse_str(raw).map_err(|_| ApiError::NotFound("Todo not found".to_string()))
}

pub async fn list_todos(
    State(state): State<SharedState>,
    user: AuthUser,
) -> ApiResult<Json<Vec<Todo>>> {
    Ok(Json(state.store.list_todos(&user.email).await?))
}

pub async fn create_todo(
    State(state): State<SharedState>,
    user: AuthUser,
    payload: Result<Json<TodoInput>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<Todo>)> {
    let Json(input) = payload?;
    validate(&input)?;

    let todo = state.store.create_todo(&user.email, &input).await?;
    Ok((StatusCode::CREATED, Json(todo)))
}

pub async fn update_todo(
    State(state): State<SharedState>,
    user: AuthUser,
    Path((_owner, id)): Path<(String, String)>,
    payload: Result<Json<TodoInput>, JsonRejection>,
) -> ApiResult<Json<Todo>> {
    let id = todo_id(&id)?;
    let Json(input) = payload?;
    validate(&input)?;

    state
        .store
        .update_todo(&user.email, id, &input)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::NotFound("Todo not found".to_string()))
}

pub async fn delete_todo(
    State(state): State<SharedState>,
    user: AuthUser,
    Path((_owner, id)): Path<(String, String)>,
) -> ApiResult<Json<Value>> {
    let id = todo_id(&id)?;

    if !state.store.delete_todo(&user.email, id).await? {
        return Err(ApiError::NotFound("Todo not found".to_string()));
    }
    Ok(Json(json!({ "deleted": true })))
}
