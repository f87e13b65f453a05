//! todo API のクライアント
//!
//! - [`TodoClient`]: HTTP API の各操作を呼び出す
//! - [`TodoBoard`]: 一覧の表示状態（Todo 一覧・読み込み中フラグ・直近のエラー）を保持する

pub mod board;
pub mod client;
pub mod error;

pub use board::*;
pub use client::*;
pub use error::*;
