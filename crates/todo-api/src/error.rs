use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use domain::TodoError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Todo not found")]
    NotFound,

    #[error("{0}")]
    BadRequest(String),

    #[error("Concurrent modification detected")]
    Conflict,

    /// `message` はクライアントに返す固定文言、`detail` はログ専用
    #[error("{message}: {detail}")]
    Internal {
        message: &'static str,
        detail: String,
    },
}

impl ApiError {
    /// サービスのエラーを変換する。ストア障害時はクライアントに `message` のみを返す。
    pub fn during(message: &'static str) -> impl Fn(TodoError) -> ApiError {
        move |error| match error {
            TodoError::NotFound(_) => ApiError::NotFound,
            TodoError::Validation(reason) => ApiError::BadRequest(reason),
            TodoError::ConcurrentModification => ApiError::Conflict,
            TodoError::Store(detail) => ApiError::Internal { message, detail },
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::NotFound => StatusCode::NOT_FOUND,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Conflict => StatusCode::CONFLICT,
            ApiError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let message = match &self {
            ApiError::Internal { message, detail } => {
                tracing::error!(error = %detail, "{message}");
                message.to_string()
            }
            other => {
                tracing::warn!(error = %other, "Request rejected");
                other.to_string()
            }
        };

        let body = serde_json::json!({ "error": message });
        (self.status_code(), Json(body)).into_response()
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(format!("Invalid JSON body: {}", rejection.body_text()))
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::BadRequest(format!("Invalid query: {}", rejection.body_text()))
    }
}
