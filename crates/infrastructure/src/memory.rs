use crate::store::{RecordStore, StoreError};
use async_trait::async_trait;
use domain::{Todo, TodoId};
use std::collections::BTreeMap;
use tokio::sync::RwLock;

/// 開発/テスト用のインメモリ実装
#[derive(Debug, Default)]
pub struct InMemoryRecordStore {
    records: RwLock<BTreeMap<TodoId, Todo>>,
}

impl InMemoryRecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_todos<I>(todos: I) -> Self
    where
        I: IntoIterator<Item = Todo>,
    {
        let records = todos.into_iter().map(|t| (t.id, t)).collect();
        Self {
            records: RwLock::new(records),
        }
    }

    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }
}

#[async_trait]
impl RecordStore for InMemoryRecordStore {
    async fn fetch_one(&self, id: TodoId) -> Result<Option<Todo>, StoreError> {
        Ok(self.records.read().await.get(&id).cloned())
    }

    async fn fetch_all(&self) -> Result<Vec<Todo>, StoreError> {
        Ok(self.records.read().await.values().cloned().collect())
    }

    async fn insert(&self, todo: &Todo) -> Result<bool, StoreError> {
        let mut records = self.records.write().await;
        if records.contains_key(&todo.id) {
            return Ok(false);
        }
        records.insert(todo.id, todo.clone());
        Ok(true)
    }

    async fn replace(&self, todo: &Todo) -> Result<bool, StoreError> {
        let mut records = self.records.write().await;
        match records.get_mut(&todo.id) {
            Some(existing) => {
                *existing = todo.clone();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn write(&self, todo: &Todo) -> Result<(), StoreError> {
        self.records.write().await.insert(todo.id, todo.clone());
        Ok(())
    }

    async fn delete(&self, id: TodoId) -> Result<Option<Todo>, StoreError> {
        Ok(self.records.write().await.remove(&id))
    }
}
