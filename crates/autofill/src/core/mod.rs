pub mod context;
pub mod types;

pub use context::*;
pub use types::*;
