pub mod config;
pub mod retry;
pub mod telemetry;

pub use config::*;
pub use retry::*;
pub use telemetry::*;
