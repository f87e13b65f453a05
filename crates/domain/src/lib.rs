pub mod errors;
pub mod filter;
pub mod patch;
pub mod seed;
pub mod todo;

pub use errors::*;
pub use filter::*;
pub use patch::*;
pub use seed::*;
pub use todo::*;
