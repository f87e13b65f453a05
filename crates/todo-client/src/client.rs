//! HTTP API の呼び出し
//!
//! 再試行・タイムアウト・キャッシュは行わない。各呼び出しはその時点のストアの状態を返す。

use crate::error::{ClientError, Operation};
use domain::{NewTodo, Todo, TodoFilter, TodoId, TodoPatch};
use reqwest::RequestBuilder;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

#[derive(Debug, Clone)]
pub struct TodoClient {
    http: reqwest::Client,
    base_url: String,
}

impl TodoClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_http_client(reqwest::Client::new(), base_url)
    }

    pub fn with_http_client(http: reqwest::Client, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { http, base_url }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub async fn list_todos(&self) -> Result<Vec<Todo>, ClientError> {
        let request = self.http.get(self.url("/todos"));
        self.send(Operation::List, request).await
    }

    pub async fn get_todo(&self, id: TodoId) -> Result<Todo, ClientError> {
        let request = self.http.get(self.todo_url(id));
        self.send(Operation::Get, request).await
    }

    /// ステータス未指定ならサーバ側の既定値が使われる
    pub async fn create_todo(&self, input: &NewTodo) -> Result<Todo, ClientError> {
        let request = self.http.post(self.url("/todos")).json(input);
        self.send(Operation::Create, request).await
    }

    pub async fn update_todo(&self, id: TodoId, patch: &TodoPatch) -> Result<Todo, ClientError> {
        let request = self.http.put(self.todo_url(id)).json(patch);
        self.send(Operation::Update, request).await
    }

    /// 削除した Todo を返す
    pub async fn delete_todo(&self, id: TodoId) -> Result<Todo, ClientError> {
        let request = self.http.delete(self.todo_url(id));
        self.send(Operation::Delete, request).await
    }

    pub async fn filter_todos(&self, filter: &TodoFilter) -> Result<Vec<Todo>, ClientError> {
        let request = self.http.get(self.url("/filter")).query(filter);
        self.send(Operation::Filter, request).await
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    fn todo_url(&self, id: TodoId) -> String {
        format!("{}/todos/{id}", self.base_url)
    }

    async fn send<T>(&self, operation: Operation, request: RequestBuilder) -> Result<T, ClientError>
    where
        T: DeserializeOwned,
    {
        let response = request.send().await.map_err(|e| {
            warn!(%operation, error = %e, "Request failed");
            ClientError::transport(operation, e)
        })?;

        let status = response.status();
        if !status.is_success() {
            warn!(%operation, status = status.as_u16(), "API returned an error status");
            return Err(ClientError::rejected(operation, status.as_u16()));
        }

        debug!(%operation, status = status.as_u16(), "Request succeeded");
        response
            .json::<T>()
            .await
            .map_err(|e| ClientError::transport(operation, e))
    }
}
