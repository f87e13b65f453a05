pub mod dynamodb;
pub mod memory;
pub mod seed;
pub mod store;

pub use dynamodb::*;
pub use memory::*;
pub use seed::*;
pub use store::*;
