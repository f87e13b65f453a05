use domain::TodoError;
use rand::Rng;
use std::future::Future;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, warn};

/// リトライ戦略
#[derive(Debug, Clone)]
pub struct RetryStrategy {
    /// 最大試行回数
    pub max_attempts: u32,
    /// 初期遅延時間
    pub initial_delay: Duration,
    /// 最大遅延時間
    pub max_delay: Duration,
    /// バックオフ倍率
    pub backoff_multiplier: f64,
    /// ジッター追加フラグ
    pub add_jitter: bool,
}

impl Default for RetryStrategy {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            initial_delay: Duration::from_millis(20),
            max_delay: Duration::from_secs(1),
            backoff_multiplier: 2.0,
            add_jitter: true,
        }
    }
}

/// リトライ実行結果
#[derive(Debug)]
pub enum RetryResult<T> {
    Success(T),
    MaxAttemptsReached(TodoError),
    NonRetryable(TodoError),
}

impl<T> RetryResult<T> {
    pub fn into_result(self) -> Result<T, TodoError> {
        match self {
            RetryResult::Success(value) => Ok(value),
            RetryResult::MaxAttemptsReached(error) | RetryResult::NonRetryable(error) => {
                Err(error)
            }
        }
    }
}

/// `TodoError::is_retryable` なエラーのみを再試行する実行器
#[derive(Debug, Clone, Default)]
pub struct RetryExecutor {
    strategy: RetryStrategy,
}

impl RetryExecutor {
    pub fn new(strategy: RetryStrategy) -> Self {
        Self { strategy }
    }

    /// 指数バックオフ設定でリトライ実行器を作成
    pub fn exponential_backoff(max_attempts: u32, initial_delay: Duration) -> Self {
        Self::new(RetryStrategy {
            max_attempts: max_attempts.max(1),
            initial_delay,
            ..RetryStrategy::default()
        })
    }

    pub fn max_attempts(&self) -> u32 {
        self.strategy.max_attempts
    }

    pub async fn execute<F, Fut, T>(&self, operation: F) -> RetryResult<T>
    where
        F: Fn() -> Fut,
        Fut: Future<Output = Result<T, TodoError>>,
    {
        let mut attempt = 1;

        loop {
            match operation().await {
                Ok(result) => {
                    if attempt > 1 {
                        debug!(attempt, "Operation succeeded after retry");
                    }
                    return RetryResult::Success(result);
                }
                Err(error) if !error.is_retryable() => {
                    return RetryResult::NonRetryable(error);
                }
                Err(error) if attempt >= self.strategy.max_attempts => {
                    warn!(
                        max_attempts = self.strategy.max_attempts,
                        error = %error,
                        "Max attempts reached, giving up"
                    );
                    return RetryResult::MaxAttemptsReached(error);
                }
                Err(error) => {
                    let delay = self.calculate_delay(attempt);
                    debug!(
                        attempt,
                        delay_ms = delay.as_millis() as u64,
                        error = %error,
                        "Retrying operation"
                    );
                    sleep(delay).await;
                    attempt += 1;
                }
            }
        }
    }

    fn calculate_delay(&self, attempt: u32) -> Duration {
        let multiplier = self.strategy.backoff_multiplier.powi((attempt - 1) as i32);
        let base = Duration::from_millis(
            (self.strategy.initial_delay.as_millis() as f64 * multiplier) as u64,
        );
        let delay = std::cmp::min(base, self.strategy.max_delay);

        if self.strategy.add_jitter {
            // ±25% のランダム変動
            let factor = rand::thread_rng().gen_range(0.75..=1.25);
            Duration::from_millis((delay.as_millis() as f64 * factor) as u64)
        } else {
            delay
        }
    }
}
