//! todo-api バイナリのエントリポイント

use anyhow::Context;
use infrastructure::{
    load_seed_file, seed_if_empty, DynamoDbClient, DynamoDbRecordStore, InMemoryRecordStore,
    RecordStore,
};
use shared::{init_tracing, Config, RetryExecutor, StoreBackend};
use std::sync::Arc;
use std::time::Duration;
use todo_api::{app_with_state, AppState, TodoService};
use tracing::{error, info, warn};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing().map_err(|e| anyhow::anyhow!("failed to initialize tracing: {e}"))?;

    let config = Config::from_env()?;
    info!(
        environment = %config.environment,
        backend = ?config.store_backend,
        "Starting todo-api"
    );

    let store = build_store(&config).await;

    if let Some(path) = &config.seed_file {
        // 初期データの投入に失敗してもサーバは起動する
        match load_seed_file(path).await {
            Ok(todos) => {
                if let Err(e) = seed_if_empty(store.as_ref(), &todos).await {
                    error!(error = %e, "Failed to seed store");
                }
            }
            Err(e) => warn!(error = %format!("{e:#}"), "Seed file ignored"),
        }
    }

    let retry = RetryExecutor::exponential_backoff(
        config.retry_max_attempts,
        Duration::from_millis(config.retry_initial_delay_ms),
    );
    let service = TodoService::new(store).with_retry(retry);
    let router = app_with_state(AppState::new(service));

    let addr = config.socket_addr();
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    info!(%addr, "Server listening");

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    info!("Server stopped");
    Ok(())
}

async fn build_store(config: &Config) -> Arc<dyn RecordStore> {
    match config.store_backend {
        StoreBackend::DynamoDb => {
            let db = DynamoDbClient::new(config).await;
            info!(table = db.table_name(), namespace = %config.namespace, "Using DynamoDB store");
            Arc::new(DynamoDbRecordStore::new(db, config.namespace.clone()))
        }
        StoreBackend::Memory => {
            info!("Using in-memory store");
            Arc::new(InMemoryRecordStore::new())
        }
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
