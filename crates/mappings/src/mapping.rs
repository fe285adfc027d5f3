use std::time::Duration;

use jobfill_core::{FieldType, ProfileFieldPath};
use serde::Deserialize;

use crate::selector::FieldSelector;
use crate::transform::ValueTransform;
use crate::MappingError;

/// How one profile attribute is found and filled on a platform
#[derive(Debug, Clone, Deserialize)]
pub struct FieldMapping {
    pub path: ProfileFieldPath,
    pub selectors: Vec<FieldSelector>,
    pub field_type: FieldType,
    #[serde(default)]
    pub transform: Option<ValueTransform>,
    /// Higher fills first
    #[serde(default)]
    pub priority: i32,
    #[serde(default)]
    pub required: bool,
    /// Wait after a successful fill, for fields that trigger host-side updates
    #[serde(default)]
    pub settle_delay_ms: Option<u64>,
}

impl FieldMapping {
    pub fn new(path: ProfileFieldPath, field_type: FieldType, selector: FieldSelector) -> Self {
        Self {
            path,
            selectors: vec![selector],
            field_type,
            transform: None,
            priority: 0,
            required: false,
            settle_delay_ms: None,
        }
    }

    pub fn with_selector(mut self, selector: FieldSelector) -> Self {
        self.selectors.push(selector);
        self
    }

    pub fn with_transform(mut self, transform: ValueTransform) -> Self {
        self.transform = Some(transform);
        self
    }

    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn with_settle_delay(mut self, delay: Duration) -> Self {
        self.settle_delay_ms = Some(delay.as_millis() as u64);
        self
    }

    pub fn settle_delay(&self) -> Option<Duration> {
        self.settle_delay_ms.filter(|ms| *ms > 0).map(Duration::from_millis)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct GlobalSelectors {
    #[serde(default)]
    pub form_container: Option<String>,
    #[serde(default)]
    pub submit_button: Option<String>,
    #[serde(default)]
    pub next_button: Option<String>,
    #[serde(default)]
    pub error_container: Option<String>,
}

/// A vendor's full mapping dataset
#[derive(Debug, Clone, Deserialize)]
pub struct PlatformMappingConfig {
    pub platform: String,
    pub version: String,
    #[serde(default)]
    pub global_selectors: GlobalSelectors,
    #[serde(rename = "fields", default)]
    pub mappings: Vec<FieldMapping>,
}

impl PlatformMappingConfig {
    pub fn new(platform: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            platform: platform.into(),
            version: version.into(),
            global_selectors: GlobalSelectors::default(),
            mappings: Vec::new(),
        }
    }

    pub fn with_mapping(mut self, mapping: FieldMapping) -> Self {
        self.mappings.push(mapping);
        self
    }

    pub fn with_form_container(mut self, selector: impl Into<String>) -> Self {
        self.global_selectors.form_container = Some(selector.into());
        self
    }

    /// Parse and validate a TOML dataset. `source_name` only labels errors.
    pub fn from_toml_str(source_name: &str, content: &str) -> Result<Self, MappingError> {
        let config: PlatformMappingConfig = toml::from_str(content).map_err(|e| MappingError::Parse {
            source_name: source_name.to_string(),
            message: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), MappingError> {
        for mapping in &self.mappings {
            if mapping.selectors.is_empty() {
                return Err(MappingError::NoSelectors(mapping.path));
            }
            if mapping.selectors.iter().any(|s| s.primary.trim().is_empty()) {
                return Err(MappingError::EmptyPrimary(mapping.path));
            }
        }
        Ok(())
    }

    /// First mapping declared for `path`
    pub fn mapping_for(&self, path: ProfileFieldPath) -> Option<&FieldMapping> {
        self.mappings.iter().find(|m| m.path == path)
    }

    /// Paths in declaration order, without repeats
    pub fn supported_fields(&self) -> Vec<ProfileFieldPath> {
        let mut paths = Vec::new();
        for mapping in &self.mappings {
            if !paths.contains(&mapping.path) {
                paths.push(mapping.path);
            }
        }
        paths
    }
}
