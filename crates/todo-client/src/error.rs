use std::fmt;
use thiserror::Error;

/// クライアントが呼び出す API 操作
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    List,
    Get,
    Create,
    Update,
    Delete,
    Filter,
}

impl Operation {
    /// 失敗時に利用者へ見せる固定文言
    pub fn failure_message(&self) -> &'static str {
        match self {
            Operation::List => "Failed to fetch todos",
            Operation::Get => "Failed to fetch todo",
            Operation::Create => "Failed to create todo",
            Operation::Update => "Failed to update todo",
            Operation::Delete => "Failed to delete todo",
            Operation::Filter => "Failed to filter todos",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Operation::List => "list",
            Operation::Get => "get",
            Operation::Create => "create",
            Operation::Update => "update",
            Operation::Delete => "delete",
            Operation::Filter => "filter",
        };
        f.write_str(name)
    }
}

/// API 呼び出しの失敗
///
/// 4xx / 5xx / 通信失敗のいずれも操作ごとの固定文言にまとめる。
/// サーバが返したエラー詳細は含めない。
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("{}", .operation.failure_message())]
    Request {
        operation: Operation,
        /// 成功以外のステータスを受信した場合のみ `Some`
        status: Option<u16>,
        #[source]
        source: Option<reqwest::Error>,
    },
}

impl ClientError {
    pub(crate) fn rejected(operation: Operation, status: u16) -> Self {
        ClientError::Request {
            operation,
            status: Some(status),
            source: None,
        }
    }

    pub(crate) fn transport(operation: Operation, source: reqwest::Error) -> Self {
        ClientError::Request {
            operation,
            status: None,
            source: Some(source),
        }
    }

    pub fn operation(&self) -> Operation {
        match self {
            ClientError::Request { operation, .. } => *operation,
        }
    }

    /// サーバが返した HTTP ステータス
    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Request { status, .. } => *status,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn message_does_not_depend_on_status() {
        let not_found = ClientError::rejected(Operation::Update, 404);
        let server = ClientError::rejected(Operation::Update, 500);

        assert_eq!(not_found.to_string(), "Failed to update todo");
        assert_eq!(server.to_string(), not_found.to_string());
        assert!(not_found.is_not_found());
        assert!(!server.is_not_found());
        assert_eq!(server.status(), Some(500));
    }

    #[test]
    fn every_operation_has_its_own_message() {
        let ops = [
            Operation::List,
            Operation::Get,
            Operation::Create,
            Operation::Update,
            Operation::Delete,
            Operation::Filter,
        ];
        let mut messages: Vec<_> = ops.iter().map(|op| op.failure_message()).collect();
        messages.sort_unstable();
        messages.dedup();
        assert_eq!(messages.len(), ops.len());
    }
}
