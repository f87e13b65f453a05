//! Todo HTTP API（axum）
//!
//! | メソッド + パス       | 操作     |
//! |-----------------------|----------|
//! | GET /todos            | 一覧     |
//! | GET /todos/:id        | 単一取得 |
//! | POST /todos           | 作成     |
//! | PUT /todos/:id        | 部分更新 |
//! | DELETE /todos/:id     | 削除     |
//! | GET /filter           | 絞り込み |

pub mod error;
pub mod middleware;
mod routes;
pub mod service;

use axum::routing::get;
use axum::Router;
use infrastructure::InMemoryRecordStore;
use std::sync::Arc;

pub use error::ApiError;
pub use service::TodoService;

/// アプリケーションの共有状態
#[derive(Clone)]
pub struct AppState {
    service: TodoService,
}

impl AppState {
    pub fn new(service: TodoService) -> Self {
        Self { service }
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new(TodoService::new(Arc::new(InMemoryRecordStore::new())))
    }
}

/// インメモリストアでルータを構築する（ローカル開発用）
pub fn app() -> Router {
    app_with_state(AppState::default())
}

/// 外部から状態を注入できる版
pub fn app_with_state(state: AppState) -> Router {
    Router::new()
        .route("/health", get(routes::health))
        .route(
            "/todos",
            get(routes::list_todos)
                .post(routes::create_todo)
                .options(routes::preflight),
        )
        .route(
            "/todos/:id",
            get(routes::get_todo)
                .put(routes::update_todo)
                .delete(routes::delete_todo)
                .options(routes::preflight),
        )
        .route(
            "/filter",
            get(routes::filter_todos).options(routes::preflight),
        )
        .layer(axum::middleware::from_fn(middleware::log_request))
        .layer(axum::middleware::map_response(middleware::add_cors_headers))
        .with_state(state)
}
