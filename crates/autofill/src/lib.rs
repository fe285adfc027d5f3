//! Field detection and autofill engine.
//!
//! [`FillEngine`] walks a platform's mappings in priority order, asks the
//! detector for an element, and hands the value to the setter. Every field
//! ends in exactly one [`FieldFillResult`]; nothing here aborts a run.

pub mod core;
pub mod detection;
pub mod filling;
pub mod orchestrator;
pub mod profile_paths;

use serde::Serialize;

pub use crate::core::context::*;
pub use crate::core::types::*;
pub use crate::detection::*;
pub use crate::filling::*;
pub use crate::orchestrator::*;
pub use crate::profile_paths::ProfileView;

/// Why a single field was not filled
#[derive(Debug, Clone, PartialEq, Eq, Serialize, thiserror::Error)]
#[serde(tag = "kind", content = "detail", rename_all = "snake_case")]
pub enum FillError {
    #[error("no value in profile")]
    NoValueInProfile,

    #[error("field not found on page")]
    FieldNotFound,

    #[error("field not interactable")]
    FieldNotInteractable,

    #[error("failed to set value: {0}")]
    SetValueFailed(String),
}
