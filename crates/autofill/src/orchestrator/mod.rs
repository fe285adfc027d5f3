pub mod fill_engine;

pub use fill_engine::*;
