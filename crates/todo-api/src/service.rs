//! Todo の CRUD 操作
//!
//! HTTP には依存せず、レコードストアの上で ID 採番・部分更新・絞り込みを行う。
//! サービス自体はキャッシュを持たず、すべての操作がストアへ往復する。

use domain::{NewTodo, Todo, TodoError, TodoFilter, TodoId, TodoPatch};
use infrastructure::RecordStore;
use shared::RetryExecutor;
use std::sync::Arc;
use tracing::info;

#[derive(Clone)]
pub struct TodoService {
    store: Arc<dyn RecordStore>,
    retry: RetryExecutor,
}

impl TodoService {
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self {
            store,
            retry: RetryExecutor::default(),
        }
    }

    /// ID 採番の競合時に使う再試行設定を差し替える
    pub fn with_retry(mut self, retry: RetryExecutor) -> Self {
        self.retry = retry;
        self
    }

    pub async fn list_all(&self) -> Result<Vec<Todo>, TodoError> {
        Ok(self.store.fetch_all().await?)
    }

    pub async fn get_by_id(&self, id: TodoId) -> Result<Todo, TodoError> {
        self.store
            .fetch_one(id)
            .await?
            .ok_or(TodoError::NotFound(id))
    }

    /// 既存 ID の最大値 + 1 で採番して作成する。
    ///
    /// 採番と書き込みの間に他のリクエストが同じ ID を書き込んだ場合は
    /// 条件付き書き込みが失敗するので、最大値を読み直して再試行する。
    pub async fn create(&self, input: NewTodo) -> Result<Todo, TodoError> {
        input.validate()?;

        let todo = self
            .retry
            .execute(|| {
                let input = input.clone();
                async move {
                    let existing = self.store.fetch_all().await?;
                    let id = TodoId::next_after(existing.iter().map(|t| t.id));
                    let todo = input.into_todo(id)?;

                    if self.store.insert(&todo).await? {
                        Ok(todo)
                    } else {
                        Err(TodoError::ConcurrentModification)
                    }
                }
            })
            .await
            .into_result()?;

        info!(todo_id = %todo.id, "Todo created");
        Ok(todo)
    }

    /// パッチに含まれるフィールドだけを保存済みの値に上書きする。
    ///
    /// 読み出しと書き込みの間に削除された場合は復活させずに NotFound を返す。
    /// 同時更新同士は後勝ち。
    pub async fn update(&self, id: TodoId, patch: TodoPatch) -> Result<Todo, TodoError> {
        let current = self.get_by_id(id).await?;
        let merged = patch.apply(&current)?;

        if !self.store.replace(&merged).await? {
            return Err(TodoError::NotFound(id));
        }

        info!(todo_id = %id, "Todo updated");
        Ok(merged)
    }

    /// 削除し、削除した値を返す
    pub async fn remove(&self, id: TodoId) -> Result<Todo, TodoError> {
        let removed = self
            .store
            .delete(id)
            .await?
            .ok_or(TodoError::NotFound(id))?;

        info!(todo_id = %id, "Todo removed");
        Ok(removed)
    }

    pub async fn filter(&self, filter: &TodoFilter) -> Result<Vec<Todo>, TodoError> {
        let todos = self.store.fetch_all().await?;
        Ok(filter.apply(todos))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use domain::{Field, TodoStatus};
    use infrastructure::{InMemoryRecordStore, StoreError};
    use shared::RetryStrategy;

    fn todo(id: u64, title: &str) -> Todo {
        NewTodo::titled(title)
            .into_todo(TodoId::new(id).unwrap())
            .unwrap()
    }

    fn id(value: u64) -> TodoId {
        TodoId::new(value).unwrap()
    }

    fn service_with(todos: Vec<Todo>) -> (TodoService, Arc<InMemoryRecordStore>) {
        let store = Arc::new(InMemoryRecordStore::with_todos(todos));
        (TodoService::new(store.clone()), store)
    }

    #[tokio::test]
    async fn create_on_empty_store_fills_defaults() {
        let (service, _) = service_with(vec![]);

        let created = service.create(NewTodo::titled("Buy milk")).await.unwrap();

        assert_eq!(
            serde_json::to_value(&created).unwrap(),
            serde_json::json!({
                "id": 1,
                "title": "Buy milk",
                "description": "",
                "category": "general",
                "status": "in-progress"
            })
        );
    }

    #[tokio::test]
    async fn create_uses_max_id_plus_one() {
        // id 2 は削除済みの想定
        let (service, _) = service_with(vec![todo(1, "a"), todo(3, "c")]);

        let created = service.create(NewTodo::titled("X")).await.unwrap();

        assert_eq!(created.id.value(), 4);
    }

    #[tokio::test]
    async fn create_then_get_round_trips() {
        let (service, _) = service_with(vec![]);
        let input = NewTodo::titled("Plan trip")
            .with_description("book hotel")
            .with_category("personal")
            .with_status(TodoStatus::NotStarted);

        let created = service.create(input).await.unwrap();
        let fetched = service.get_by_id(created.id).await.unwrap();

        assert_eq!(fetched, created);
    }

    #[tokio::test]
    async fn create_without_title_is_validation_error() {
        let (service, store) = service_with(vec![]);

        let err = service.create(NewTodo::default()).await.unwrap_err();

        assert!(matches!(err, TodoError::Validation(_)));
        assert!(store.is_empty().await);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_creates_get_unique_ids() {
        let tasks = 32;
        let (service, store) = service_with(vec![]);
        // 競合のたびに少なくとも 1 件は書き込めるので、タスク数ぶん試せば全件成功する
        let service = service.with_retry(RetryExecutor::new(RetryStrategy {
            max_attempts: tasks as u32,
            initial_delay: std::time::Duration::from_millis(1),
            max_delay: std::time::Duration::from_millis(10),
            ..RetryStrategy::default()
        }));

        let handles: Vec<_> = (0..tasks)
            .map(|i| {
                let service = service.clone();
                tokio::spawn(async move { service.create(NewTodo::titled(format!("t{i}"))).await })
            })
            .collect();

        let mut ids = Vec::new();
        for handle in handles {
            let todo = handle.await.unwrap().unwrap();
            ids.push(todo.id.value());
        }
        ids.sort_unstable();

        assert_eq!(ids, (1..=tasks as u64).collect::<Vec<_>>());
        assert_eq!(store.len().await, tasks);
    }

    #[tokio::test]
    async fn update_merges_only_present_fields() {
        let mut original = todo(1, "Write report");
        original.description = "quarterly".into();
        original.category = "work".into();
        let (service, _) = service_with(vec![original.clone()]);

        let updated = service
            .update(id(1), TodoPatch::status(TodoStatus::Completed))
            .await
            .unwrap();

        assert_eq!(updated.status, TodoStatus::Completed);
        assert_eq!(updated.title, original.title);
        assert_eq!(updated.description, original.description);
        assert_eq!(updated.category, original.category);
        assert_eq!(service.get_by_id(id(1)).await.unwrap(), updated);
    }

    #[tokio::test]
    async fn update_missing_id_leaves_store_unchanged() {
        let (service, store) = service_with(vec![todo(1, "a")]);
        let before = store.fetch_all().await.unwrap();

        let err = service
            .update(id(5), TodoPatch::status(TodoStatus::Completed))
            .await
            .unwrap_err();

        assert_eq!(err, TodoError::NotFound(id(5)));
        assert_eq!(store.fetch_all().await.unwrap(), before);
    }

    /// 読み出し後、書き込み前に削除されたように振る舞うストア
    struct DeletedMidUpdate {
        inner: InMemoryRecordStore,
        stale: Todo,
    }

    #[async_trait::async_trait]
    impl RecordStore for DeletedMidUpdate {
        async fn fetch_one(&self, _id: TodoId) -> Result<Option<Todo>, StoreError> {
            Ok(Some(self.stale.clone()))
        }
        async fn fetch_all(&self) -> Result<Vec<Todo>, StoreError> {
            self.inner.fetch_all().await
        }
        async fn insert(&self, todo: &Todo) -> Result<bool, StoreError> {
            self.inner.insert(todo).await
        }
        async fn replace(&self, todo: &Todo) -> Result<bool, StoreError> {
            self.inner.replace(todo).await
        }
        async fn write(&self, todo: &Todo) -> Result<(), StoreError> {
            self.inner.write(todo).await
        }
        async fn delete(&self, id: TodoId) -> Result<Option<Todo>, StoreError> {
            self.inner.delete(id).await
        }
    }

    #[tokio::test]
    async fn update_does_not_resurrect_a_concurrently_deleted_todo() {
        let store = Arc::new(DeletedMidUpdate {
            inner: InMemoryRecordStore::new(),
            stale: todo(3, "gone"),
        });
        let service = TodoService::new(store.clone());

        let err = service
            .update(id(3), TodoPatch::status(TodoStatus::Completed))
            .await
            .unwrap_err();

        assert_eq!(err, TodoError::NotFound(id(3)));
        assert!(store.inner.is_empty().await);
    }

    #[tokio::test]
    async fn whitespace_title_is_a_valid_title() {
        let (service, _) = service_with(vec![todo(1, "a")]);

        let created = service.create(NewTodo::titled("   ")).await.unwrap();
        let updated = service.update(id(1), TodoPatch::title(" ")).await.unwrap();

        assert_eq!(created.title, "   ");
        assert_eq!(updated.title, " ");
    }

    #[tokio::test]
    async fn update_rejects_empty_title() {
        let (service, _) = service_with(vec![todo(1, "a")]);
        let patch = TodoPatch {
            title: Field::Value(String::new()),
            ..TodoPatch::default()
        };

        let err = service.update(id(1), patch).await.unwrap_err();

        assert!(matches!(err, TodoError::Validation(_)));
        assert_eq!(service.get_by_id(id(1)).await.unwrap().title, "a");
    }

    #[tokio::test]
    async fn remove_returns_prior_record_and_excludes_it() {
        let (service, _) = service_with(vec![todo(1, "a"), todo(2, "b")]);

        let removed = service.remove(id(2)).await.unwrap();

        assert_eq!(removed, todo(2, "b"));
        assert_eq!(
            service.get_by_id(id(2)).await.unwrap_err(),
            TodoError::NotFound(id(2))
        );
        let remaining: Vec<u64> = service
            .list_all()
            .await
            .unwrap()
            .iter()
            .map(|t| t.id.value())
            .collect();
        assert_eq!(remaining, vec![1]);
    }

    #[tokio::test]
    async fn remove_missing_id_is_not_found() {
        let (service, _) = service_with(vec![]);
        assert_eq!(
            service.remove(id(9)).await.unwrap_err(),
            TodoError::NotFound(id(9))
        );
    }

    #[tokio::test]
    async fn ids_restart_at_one_after_everything_is_removed() {
        let (service, _) = service_with(vec![todo(1, "a")]);
        service.remove(id(1)).await.unwrap();

        let created = service.create(NewTodo::titled("again")).await.unwrap();

        assert_eq!(created.id, TodoId::FIRST);
    }

    #[tokio::test]
    async fn filter_by_status_and_category() {
        let mut done = todo(1, "a");
        done.status = TodoStatus::Completed;
        done.category = "work".into();
        let mut other = todo(2, "b");
        other.category = "work".into();
        let (service, _) = service_with(vec![done.clone(), other, todo(3, "c")]);

        let by_status = service
            .filter(&TodoFilter::by_status(TodoStatus::Completed))
            .await
            .unwrap();
        let by_category = service
            .filter(&TodoFilter::by_category("work"))
            .await
            .unwrap();
        let everything = service.filter(&TodoFilter::default()).await.unwrap();

        assert_eq!(by_status, vec![done]);
        assert_eq!(by_category.len(), 2);
        assert_eq!(everything.len(), 3);
    }
}
