use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use domain::{NewTodo, Todo, TodoFilter, TodoId, TodoPatch, TodoStatus};
use serde::{Deserialize, Serialize};

use crate::error::ApiError;
use crate::AppState;

type ApiResult<T> = Result<T, ApiError>;

/// パスの ID を解釈する。数値でなければ該当なしとして扱う。
fn parse_id(raw: &str) -> ApiResult<TodoId> {
    raw.parse().map_err(|_| ApiError::NotFound)
}

pub(crate) async fn health() -> impl IntoResponse {
    (StatusCode::OK, Json(HealthBody { status: "ok" }))
}

pub(crate) async fn preflight() -> StatusCode {
    StatusCode::NO_CONTENT
}

pub(crate) async fn list_todos(State(state): State<AppState>) -> ApiResult<Json<Vec<Todo>>> {
    let todos = state
        .service
        .list_all()
        .await
        .map_err(ApiError::during("Failed to fetch todos"))?;
    Ok(Json(todos))
}

pub(crate) async fn get_todo(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Todo>> {
    let todo = state
        .service
        .get_by_id(parse_id(&id)?)
        .await
        .map_err(ApiError::during("Failed to fetch todo"))?;
    Ok(Json(todo))
}

pub(crate) async fn create_todo(
    State(state): State<AppState>,
    payload: Result<Json<NewTodo>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<Todo>)> {
    let Json(input) = payload?;
    let todo = state
        .service
        .create(input)
        .await
        .map_err(ApiError::during("Failed to create todo"))?;
    Ok((StatusCode::CREATED, Json(todo)))
}

pub(crate) async fn update_todo(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<TodoPatch>, JsonRejection>,
) -> ApiResult<Json<Todo>> {
    let id = parse_id(&id)?;
    let Json(patch) = payload?;
    let todo = state
        .service
        .update(id, patch)
        .await
        .map_err(ApiError::during("Failed to update todo"))?;
    Ok(Json(todo))
}

pub(crate) async fn delete_todo(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Todo>> {
    let todo = state
        .service
        .remove(parse_id(&id)?)
        .await
        .map_err(ApiError::during("Failed to delete todo"))?;
    Ok(Json(todo))
}

/// GET /filter のクエリ。空文字は未指定と同じ扱い。
#[derive(Debug, Default, Deserialize)]
pub struct FilterParams {
    status: Option<String>,
    category: Option<String>,
}

impl TryFrom<FilterParams> for TodoFilter {
    type Error = ApiError;

    fn try_from(params: FilterParams) -> Result<Self, Self::Error> {
        let status = match params.status.filter(|s| !s.is_empty()) {
            Some(raw) => Some(
                raw.parse::<TodoStatus>()
                    .map_err(|e| ApiError::BadRequest(e.to_string()))?,
            ),
            None => None,
        };

        Ok(TodoFilter {
            status,
            category: params.category.filter(|c| !c.is_empty()),
        })
    }
}

pub(crate) async fn filter_todos(
    State(state): State<AppState>,
    params: Result<Query<FilterParams>, QueryRejection>,
) -> ApiResult<Json<Vec<Todo>>> {
    let Query(params) = params?;
    let filter = TodoFilter::try_from(params)?;
    let todos = state
        .service
        .filter(&filter)
        .await
        .map_err(ApiError::during("Failed to filter todos"))?;
    Ok(Json(todos))
}

#[derive(Debug, Serialize)]
struct HealthBody {
    status: &'static str,
}
