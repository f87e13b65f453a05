use async_trait::async_trait;
use domain::{Todo, TodoError, TodoId};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("DynamoDB error: {0}")]
    DynamoDb(String),

    #[error("Corrupt record: {0}")]
    CorruptRecord(String),
}

impl From<StoreError> for TodoError {
    fn from(e: StoreError) -> Self {
        TodoError::Store(e.to_string())
    }
}

/// Todo を保存するキーバリュー型のドキュメントストア
///
/// 1 つの名前空間（コレクション）に属するレコードを ID で読み書きする。
/// 問い合わせは ID の完全一致と全件取得のみ。
#[async_trait]
pub trait RecordStore: Send + Sync {
    async fn fetch_one(&self, id: TodoId) -> Result<Option<Todo>, StoreError>;

    async fn fetch_all(&self) -> Result<Vec<Todo>, StoreError>;

    /// 同じ ID のレコードが存在しない場合のみ書き込む。既存なら `false`。
    async fn insert(&self, todo: &Todo) -> Result<bool, StoreError>;

    /// 同じ ID のレコードが存在する場合のみ上書きする。存在しなければ `false`。
    async fn replace(&self, todo: &Todo) -> Result<bool, StoreError>;

    /// 無条件に上書きする
    async fn write(&self, todo: &Todo) -> Result<(), StoreError>;

    /// 削除して直前の値を返す。存在しなければ `None`。
    async fn delete(&self, id: TodoId) -> Result<Option<Todo>, StoreError>;
}
