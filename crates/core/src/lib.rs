pub mod config;
pub mod error;
pub mod profile;
pub mod types;

pub use config::AppConfig;
pub use error::JobfillError;
pub use profile::{NumberOrText, Profile, ProfileValue};
pub use types::*;
