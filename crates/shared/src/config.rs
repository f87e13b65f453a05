use std::env;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Invalid value for {key}: {value}")]
    Invalid { key: &'static str, value: String },
}

/// 永続化先の種類
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    DynamoDb,
    Memory,
}

impl FromStr for StoreBackend {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "dynamodb" => Ok(StoreBackend::DynamoDb),
            "memory" => Ok(StoreBackend::Memory),
            _ => Err(()),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub store_backend: StoreBackend,
    pub dynamodb_table: String,
    pub dynamodb_endpoint: Option<String>,
    pub aws_region: String,
    pub namespace: String,
    pub environment: String,
    pub bind_addr: IpAddr,
    pub port: u16,
    pub seed_file: Option<PathBuf>,
    pub retry_max_attempts: u32,
    pub retry_initial_delay_ms: u64,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// 任意の取得関数から設定を組み立てる（テストでは環境変数を汚さずに使う）
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        Ok(Config {
            store_backend: parse_or(&non_empty, "STORE_BACKEND", StoreBackend::DynamoDb)?,
            dynamodb_table: non_empty("DYNAMODB_TABLE")
                .unwrap_or_else(|| "family-todo-dev".to_string()),
            dynamodb_endpoint: non_empty("DYNAMODB_ENDPOINT"),
            aws_region: non_empty("AWS_REGION").unwrap_or_else(|| "ap-northeast-1".to_string()),
            namespace: non_empty("TODO_NAMESPACE").unwrap_or_else(|| "todos".to_string()),
            environment: non_empty("ENVIRONMENT").unwrap_or_else(|| "dev".to_string()),
            bind_addr: parse_or(&non_empty, "BIND_ADDR", IpAddr::V4(Ipv4Addr::LOCALHOST))?,
            port: parse_or(&non_empty, "PORT", 3000)?,
            seed_file: non_empty("SEED_FILE").map(PathBuf::from),
            retry_max_attempts: parse_or(&non_empty, "RETRY_MAX_ATTEMPTS", 5)?,
            retry_initial_delay_ms: parse_or(&non_empty, "RETRY_INITIAL_DELAY_MS", 20)?,
        })
    }

    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.bind_addr, self.port)
    }
}

fn parse_or<T, F>(lookup: &F, key: &'static str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { key, value: raw }),
        None => Ok(default),
    }
}
