//! Declarative per-vendor field mappings.
//!
//! Datasets are immutable values: they are parsed once, validated, and handed
//! to the engine through a [`MappingRegistry`]. The engine only reads them.

pub mod mapping;
pub mod registry;
pub mod selector;
pub mod transform;

use jobfill_core::ProfileFieldPath;
use thiserror::Error;

pub use mapping::{FieldMapping, GlobalSelectors, PlatformMappingConfig};
pub use registry::MappingRegistry;
pub use selector::{FieldSelector, LabelPattern};
pub use transform::{TransformError, ValueTransform};

#[derive(Error, Debug)]
pub enum MappingError {
    #[error("failed to parse mapping dataset {source_name}: {message}")]
    Parse { source_name: String, message: String },

    #[error("invalid label regex {pattern:?}: {message}")]
    InvalidRegex { pattern: String, message: String },

    #[error("mapping for {0} declares no selectors")]
    NoSelectors(ProfileFieldPath),

    #[error("mapping for {0} has an empty primary selector")]
    EmptyPrimary(ProfileFieldPath),

    #[error("platform {0:?} is already registered")]
    DuplicatePlatform(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}
