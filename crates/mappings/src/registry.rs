use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;

use tracing::{debug, info};

use crate::mapping::PlatformMappingConfig;
use crate::MappingError;

const BUILTIN: &[(&str, &str)] = &[
    ("greenhouse.toml", include_str!("../data/greenhouse.toml")),
    ("workday.toml", include_str!("../data/workday.toml")),
];

/// Platform id to dataset. Ids are matched case-insensitively.
#[derive(Debug, Clone, Default)]
pub struct MappingRegistry {
    platforms: BTreeMap<String, Arc<PlatformMappingConfig>>,
}

impl MappingRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry preloaded with the bundled datasets
    pub fn with_builtin() -> Result<Self, MappingError> {
        let mut registry = Self::new();
        for (name, content) in BUILTIN {
            registry.register(PlatformMappingConfig::from_toml_str(name, content)?)?;
        }
        Ok(registry)
    }

    pub fn register(&mut self, config: PlatformMappingConfig) -> Result<(), MappingError> {
        let key = config.platform.to_lowercase();
        if self.platforms.contains_key(&key) {
            return Err(MappingError::DuplicatePlatform(config.platform));
        }
        debug!(
            "registered platform {} v{} ({} mappings)",
            config.platform,
            config.version,
            config.mappings.len()
        );
        self.platforms.insert(key, Arc::new(config));
        Ok(())
    }

    /// Load every `*.toml` file in `dir`, in file name order
    pub fn load_dir(&mut self, dir: impl AsRef<Path>) -> Result<usize, MappingError> {
        let dir = dir.as_ref();
        let mut files = Vec::new();
        for entry in std::fs::read_dir(dir)? {
            let path = entry?.path();
            if path.is_file() && path.extension().is_some_and(|ext| ext == "toml") {
                files.push(path);
            }
        }
        files.sort();

        for path in &files {
            let content = std::fs::read_to_string(path)?;
            let config = PlatformMappingConfig::from_toml_str(&path.display().to_string(), &content)?;
            self.register(config)?;
        }

        info!("loaded {} mapping datasets from {}", files.len(), dir.display());
        Ok(files.len())
    }

    pub fn get(&self, platform: &str) -> Option<Arc<PlatformMappingConfig>> {
        self.platforms.get(&platform.to_lowercase()).cloned()
    }

    /// Registered datasets, sorted by platform id
    pub fn platforms(&self) -> impl Iterator<Item = &PlatformMappingConfig> {
        self.platforms.values().map(|c| c.as_ref())
    }

    pub fn len(&self) -> usize {
        self.platforms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.platforms.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jobfill_core::{FieldType, ProfileFieldPath};

    #[test]
    fn test_builtin_datasets_load() {
        let registry = MappingRegistry::with_builtin().unwrap();
        assert_eq!(registry.len(), 2);

        let greenhouse = registry.get("Greenhouse").unwrap();
        assert_eq!(greenhouse.platform, "greenhouse");
        let first = greenhouse.mapping_for(ProfileFieldPath::FirstName).unwrap();
        assert_eq!(first.selectors[0].primary, "#first_name");
        assert_eq!(first.field_type, FieldType::Text);
        assert!(first.required);

        let workday = registry.get("workday").unwrap();
        assert!(workday.global_selectors.next_button.is_some());
        assert!(workday.mapping_for(ProfileFieldPath::Email).is_some());

        let ids: Vec<&str> = registry.platforms().map(|p| p.platform.as_str()).collect();
        assert_eq!(ids, vec!["greenhouse", "workday"]);
    }

    #[test]
    fn test_duplicate_platform_rejected() {
        let mut registry = MappingRegistry::new();
        registry.register(PlatformMappingConfig::new("lever", "1")).unwrap();
        let err = registry
            .register(PlatformMappingConfig::new("Lever", "2"))
            .unwrap_err();
        assert!(matches!(err, MappingError::DuplicatePlatform(id) if id == "Lever"));
    }

    #[test]
    fn test_load_dir() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("lever.toml"),
            r##"
platform = "lever"
version = "1"

[[fields]]
path = "personalInfo.fullName"
field_type = "text"

[[fields.selectors]]
primary = "input[name='name']"
"##,
        )
        .unwrap();
        std::fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

        let mut registry = MappingRegistry::new();
        assert_eq!(registry.load_dir(dir.path()).unwrap(), 1);
        let lever = registry.get("lever").unwrap();
        assert_eq!(lever.supported_fields(), vec![ProfileFieldPath::FullName]);
    }

    #[test]
    fn test_load_dir_reports_bad_file() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("broken.toml"), "platform = ").unwrap();

        let mut registry = MappingRegistry::new();
        let err = registry.load_dir(dir.path()).unwrap_err();
        assert!(matches!(err, MappingError::Parse { .. }));
    }

    #[test]
    fn test_unknown_platform() {
        let registry = MappingRegistry::with_builtin().unwrap();
        assert!(registry.get("taleo").is_none());
    }
}
