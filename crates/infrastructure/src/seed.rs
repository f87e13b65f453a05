use crate::store::{RecordStore, StoreError};
use anyhow::Context;
use domain::{SeedDocument, Todo};
use std::path::Path;
use tracing::info;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeedOutcome {
    Seeded(usize),
    /// 既にデータが存在したため投入しなかった
    Skipped,
}

/// 入れ子構造の JSON ファイルを読み込み、フラットな Todo 列に展開する
pub async fn load_seed_file(path: &Path) -> anyhow::Result<Vec<Todo>> {
    let json = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("failed to read seed file {}", path.display()))?;

    let todos = SeedDocument::from_json(&json)
        .and_then(SeedDocument::flatten)
        .with_context(|| format!("failed to parse seed file {}", path.display()))?;

    Ok(todos)
}

/// コレクションが空の場合に限り一度だけ投入する
pub async fn seed_if_empty(
    store: &dyn RecordStore,
    todos: &[Todo],
) -> Result<SeedOutcome, StoreError> {
    if !store.fetch_all().await?.is_empty() {
        info!("Store already contains data. Skipping seed");
        return Ok(SeedOutcome::Skipped);
    }

    for todo in todos {
        store.write(todo).await?;
    }

    info!(count = todos.len(), "Store seeded");
    Ok(SeedOutcome::Seeded(todos.len()))
}
