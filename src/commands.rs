pub mod fields;
pub mod fill;
pub mod preview;

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use jobfill_autofill::FillEngine;
use jobfill_core::config::AppConfig;
use jobfill_core::Profile;
use jobfill_dom::{ChromeSession, FormDocument, HtmlDocument};
use jobfill_mappings::MappingRegistry;
use tracing::info;
use url::Url;

use crate::cli::Source;

/// A document to work on, plus the browser keeping it alive when live
pub struct Page {
    pub document: Box<dyn FormDocument>,
    _session: Option<ChromeSession>,
}

pub fn load_registry(config: &AppConfig) -> Result<MappingRegistry> {
    let mut registry = MappingRegistry::with_builtin()?;
    for dir in &config.mappings.extra_dirs {
        registry
            .load_dir(dir)
            .with_context(|| format!("loading mapping datasets from {}", dir))?;
    }
    Ok(registry)
}

pub fn build_engine(config: &AppConfig) -> Result<FillEngine> {
    let registry = load_registry(config)?;
    Ok(FillEngine::new(Arc::new(registry))
        .with_pacing_delay(Duration::from_millis(config.engine.pacing_delay_ms)))
}

pub fn load_profile(path: &Path) -> Result<Profile> {
    Profile::load(path).with_context(|| format!("reading profile {}", path.display()))
}

pub async fn open_page(config: &AppConfig, source: &Source) -> Result<Page> {
    if let Some(path) = &source.html {
        let markup = std::fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?;
        info!("parsed {} ({} bytes)", path.display(), markup.len());
        return Ok(Page {
            document: Box::new(HtmlDocument::parse(&markup)),
            _session: None,
        });
    }

    let raw = source
        .url
        .as_deref()
        .context("either --url or --html is required")?;
    let url = Url::parse(raw).with_context(|| format!("invalid url {}", raw))?;

    let session = ChromeSession::launch(&config.browser)?;
    let document = session.open(url.as_str()).await?;
    Ok(Page {
        document: Box::new(document),
        _session: Some(session),
    })
}
