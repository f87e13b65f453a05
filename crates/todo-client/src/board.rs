//! Todo 一覧の表示状態
//!
//! サーバの応答をそのまま手元の一覧に反映する（楽観的更新はしない）。
//! エラーは直近の 1 件だけを保持し、読み込みが成功したときに消える。

use crate::client::TodoClient;
use crate::error::ClientError;
use async_trait::async_trait;
use domain::{NewTodo, Todo, TodoId, TodoPatch, TodoStatus};

/// 一覧の状態管理に必要な API 操作
#[async_trait]
pub trait TodoApi: Send + Sync {
    async fn list_todos(&self) -> Result<Vec<Todo>, ClientError>;

    async fn create_todo(&self, input: &NewTodo) -> Result<Todo, ClientError>;

    async fn update_todo(&self, id: TodoId, patch: &TodoPatch) -> Result<Todo, ClientError>;

    async fn delete_todo(&self, id: TodoId) -> Result<Todo, ClientError>;
}

#[async_trait]
impl TodoApi for TodoClient {
    async fn list_todos(&self) -> Result<Vec<Todo>, ClientError> {
        TodoClient::list_todos(self).await
    }

    async fn create_todo(&self, input: &NewTodo) -> Result<Todo, ClientError> {
        TodoClient::create_todo(self, input).await
    }

    async fn update_todo(&self, id: TodoId, patch: &TodoPatch) -> Result<Todo, ClientError> {
        TodoClient::update_todo(self, id, patch).await
    }

    async fn delete_todo(&self, id: TodoId) -> Result<Todo, ClientError> {
        TodoClient::delete_todo(self, id).await
    }
}

pub struct TodoBoard<A> {
    api: A,
    todos: Vec<Todo>,
    loading: bool,
    error: Option<String>,
}

impl<A: TodoApi> TodoBoard<A> {
    /// 初回の読み込みが終わるまで `is_loading()` は `true`
    pub fn new(api: A) -> Self {
        Self {
            api,
            todos: Vec::new(),
            loading: true,
            error: None,
        }
    }

    pub fn todos(&self) -> &[Todo] {
        &self.todos
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    pub async fn load(&mut self) -> Result<(), ClientError> {
        self.loading = true;
        let result = self.api.list_todos().await;
        self.loading = false;

        let todos = self.record(result)?;
        self.todos = todos;
        self.error = None;
        Ok(())
    }

    pub async fn refresh(&mut self) -> Result<(), ClientError> {
        self.load().await
    }

    /// 作成した Todo（サーバが採番した ID 付き）を末尾に追加する
    pub async fn create(&mut self, input: &NewTodo) -> Result<TodoId, ClientError> {
        let result = self.api.create_todo(input).await;
        let todo = self.record(result)?;
        let id = todo.id;
        self.todos.push(todo);
        Ok(id)
    }

    /// 同じ ID の Todo をサーバが返した値で置き換える
    pub async fn update(&mut self, id: TodoId, patch: &TodoPatch) -> Result<(), ClientError> {
        let result = self.api.update_todo(id, patch).await;
        let updated = self.record(result)?;
        for todo in self.todos.iter_mut().filter(|t| t.id == id) {
            *todo = updated.clone();
        }
        Ok(())
    }

    pub async fn change_status(&mut self, id: TodoId, status: TodoStatus) -> Result<(), ClientError> {
        self.update(id, &TodoPatch::status(status)).await
    }

    pub async fn delete(&mut self, id: TodoId) -> Result<(), ClientError> {
        let result = self.api.delete_todo(id).await;
        self.record(result)?;
        self.todos.retain(|t| t.id != id);
        Ok(())
    }

    fn record<T>(&mut self, result: Result<T, ClientError>) -> Result<T, ClientError> {
        result.map_err(|e| {
            self.error = Some(e.to_string());
            e
        })
    }
}
