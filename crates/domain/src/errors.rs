use crate::todo::TodoId;
use thiserror::Error;

/// ドメイン層の入力検証エラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DomainError {
    #[error("Invalid TodoId: {0}")]
    InvalidTodoId(String),

    #[error("Invalid status: {0}")]
    InvalidStatus(String),

    #[error("Validation error: {0}")]
    Validation(String),
}

/// Todo サービスが返すエラー分類
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TodoError {
    #[error("{0}")]
    Validation(String),

    #[error("Todo not found: {0}")]
    NotFound(TodoId),

    #[error("Concurrent modification detected")]
    ConcurrentModification,

    #[error("Store error: {0}")]
    Store(String),
}

impl TodoError {
    /// 再試行で解消し得るエラーかどうか
    pub fn is_retryable(&self) -> bool {
        matches!(self, TodoError::ConcurrentModification)
    }
}

impl From<DomainError> for TodoError {
    fn from(e: DomainError) -> Self {
        match e {
            DomainError::Validation(message) => TodoError::Validation(message),
            other => TodoError::Validation(other.to_string()),
        }
    }
}
