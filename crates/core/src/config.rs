use serde::Deserialize;

use crate::JobfillError;

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub engine: EngineConfig,
    pub browser: BrowserConfig,
    #[serde(default)]
    pub mappings: MappingsConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct EngineConfig {
    /// Pause between two consecutive fields of one run
    #[serde(default = "default_pacing_delay_ms")]
    pub pacing_delay_ms: u64,
    /// Restrict searches to the platform's form container when it exists
    #[serde(default)]
    pub use_form_container: bool,
}

#[derive(Debug, Deserialize, Clone)]
pub struct BrowserConfig {
    #[serde(default = "default_headless")]
    pub headless: bool,
    #[serde(default = "default_window_width")]
    pub window_width: u32,
    #[serde(default = "default_window_height")]
    pub window_height: u32,
    #[serde(default = "default_wait_for_content")]
    pub wait_for_content_seconds: u64,
    pub chrome_path: Option<String>,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct MappingsConfig {
    /// Directories scanned for additional `*.toml` platform datasets
    #[serde(default)]
    pub extra_dirs: Vec<String>,
}

fn default_pacing_delay_ms() -> u64 { 100 }
fn default_headless() -> bool { true }
fn default_window_width() -> u32 { 1920 }
fn default_window_height() -> u32 { 1080 }
fn default_wait_for_content() -> u64 { 30 }

impl AppConfig {
    pub fn from_toml_str(s: &str) -> Result<Self, JobfillError> {
        toml::from_str(s).map_err(|e| JobfillError::Config(e.to_string()))
    }

    /// Apply `JOBFILL_PACING_MS`, `JOBFILL_HEADLESS` and `CHROME_PATH` overrides
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(v) = lookup("JOBFILL_PACING_MS") {
            if let Ok(ms) = v.trim().parse::<u64>() {
                self.engine.pacing_delay_ms = ms;
            }
        }
        if let Some(v) = lookup("JOBFILL_HEADLESS") {
            self.browser.headless = v != "0" && v.to_lowercase() != "false";
        }
        if let Some(v) = lookup("CHROME_PATH") {
            if !v.is_empty() {
                self.browser.chrome_path = Some(v);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    const MINIMAL: &str = r#"
        [engine]
        [browser]
    "#;

    #[test]
    fn test_defaults_fill_missing_keys() {
        let config = AppConfig::from_toml_str(MINIMAL).unwrap();
        assert_eq!(config.engine.pacing_delay_ms, 100);
        assert!(!config.engine.use_form_container);
        assert!(config.browser.headless);
        assert_eq!(config.browser.window_width, 1920);
        assert!(config.browser.chrome_path.is_none());
        assert!(config.mappings.extra_dirs.is_empty());
    }

    #[test]
    fn test_missing_section_is_config_error() {
        let err = AppConfig::from_toml_str("[engine]\n").unwrap_err();
        assert!(matches!(err, JobfillError::Config(_)));
    }

    #[test]
    fn test_overrides() {
        let mut config = AppConfig::from_toml_str(MINIMAL).unwrap();
        let env: HashMap<&str, &str> = [
            ("JOBFILL_PACING_MS", "250"),
            ("JOBFILL_HEADLESS", "false"),
            ("CHROME_PATH", "/usr/bin/chromium"),
        ]
        .into_iter()
        .collect();

        config.apply_overrides(|key| env.get(key).map(|v| v.to_string()));

        assert_eq!(config.engine.pacing_delay_ms, 250);
        assert!(!config.browser.headless);
        assert_eq!(config.browser.chrome_path.as_deref(), Some("/usr/bin/chromium"));
    }

    #[test]
    fn test_bad_pacing_override_is_ignored() {
        let mut config = AppConfig::from_toml_str(MINIMAL).unwrap();
        config.apply_overrides(|key| (key == "JOBFILL_PACING_MS").then(|| "soon".to_string()));
        assert_eq!(config.engine.pacing_delay_ms, 100);
    }
}
