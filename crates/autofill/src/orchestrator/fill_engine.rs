use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::Utc;
use jobfill_core::{Profile, ProfileFieldPath};
use jobfill_dom::{ElementId, FormDocument};
use jobfill_mappings::{FieldMapping, MappingRegistry, PlatformMappingConfig};
use tracing::{debug, info, warn};

use crate::core::context::{FieldContext, FieldState};
use crate::core::types::*;
use crate::detection::field_detector::{detect_field, is_field_interactable};
use crate::filling::value_setter::set_field_value;
use crate::profile_paths::ProfileView;
use crate::FillError;

pub const DEFAULT_PACING_DELAY: Duration = Duration::from_millis(100);

#[derive(Debug, Clone, Default)]
pub struct FillOptions {
    /// Only process mappings marked required
    pub required_only: bool,
    /// Search inside the platform's form container when the page has one
    pub use_form_container: bool,
    /// Pause between fields; the engine default when unset
    pub pacing_delay: Option<Duration>,
}

/// Orchestrates detection and filling over the datasets in a registry
pub struct FillEngine {
    registry: Arc<MappingRegistry>,
    pacing_delay: Duration,
}

impl FillEngine {
    pub fn new(registry: Arc<MappingRegistry>) -> Self {
        Self {
            registry,
            pacing_delay: DEFAULT_PACING_DELAY,
        }
    }

    pub fn with_pacing_delay(mut self, pacing_delay: Duration) -> Self {
        self.pacing_delay = pacing_delay;
        self
    }

    pub fn get_platform_config(&self, platform: &str) -> Option<Arc<PlatformMappingConfig>> {
        self.registry.get(platform)
    }

    /// Paths the platform maps, empty for unknown platforms
    pub fn get_supported_fields(&self, platform: &str) -> Vec<ProfileFieldPath> {
        self.registry
            .get(platform)
            .map(|config| config.supported_fields())
            .unwrap_or_default()
    }

    /// The platform's form container in `document`, if declared and present
    pub fn form_scope<D: FormDocument + ?Sized>(
        &self,
        document: &D,
        config: &PlatformMappingConfig,
    ) -> Option<ElementId> {
        let selector = config.global_selectors.form_container.as_deref()?;
        match document.query_selector(None, selector) {
            Ok(Some(scope)) => {
                debug!("using form container {:?}", selector);
                Some(scope)
            }
            Ok(None) => {
                debug!("form container {:?} not present, using document root", selector);
                None
            }
            Err(e) => {
                warn!("form container {:?} unusable: {}", selector, e);
                None
            }
        }
    }

    /// Fill one mapping. Never fails; the outcome is in the result.
    pub async fn fill_field<D: FormDocument + ?Sized>(
        &self,
        mapping: &FieldMapping,
        profile: &Profile,
        document: &mut D,
        scope: Option<ElementId>,
    ) -> FieldFillResult {
        let view = ProfileView::new(profile);
        fill_with_view(mapping, &view, document, scope).await
    }

    pub async fn fill_all_fields<D: FormDocument + ?Sized>(
        &self,
        document: &mut D,
        platform: &str,
        profile: &Profile,
        options: &FillOptions,
    ) -> FillOperationResult {
        let started_at = Utc::now();
        let start = Instant::now();

        let Some(config) = self.registry.get(platform) else {
            warn!("no mappings registered for platform {:?}", platform);
            return FillOperationResult::from_results(platform, Vec::new(), started_at, start.elapsed());
        };

        let scope = if options.use_form_container {
            self.form_scope(&*document, &config)
        } else {
            None
        };
        let mappings = ordered_mappings(&config, options.required_only);
        let pacing = options.pacing_delay.unwrap_or(self.pacing_delay);
        let view = ProfileView::new(profile);

        info!(
            "filling {} fields on {} v{}{}",
            mappings.len(),
            config.platform,
            config.version,
            if options.required_only { " (required only)" } else { "" }
        );

        let mut results = Vec::with_capacity(mappings.len());
        for (i, mapping) in mappings.into_iter().enumerate() {
            if i > 0 && !pacing.is_zero() {
                tokio::time::sleep(pacing).await;
            }

            let result = fill_with_view(mapping, &view, document, scope).await;
            match &result.error {
                None => info!("filled {}", result.path),
                Some(FillError::NoValueInProfile) => debug!("skipped {}: no value in profile", result.path),
                Some(e) => warn!("{} not filled: {}", result.path, e),
            }
            results.push(result);
        }

        let run = FillOperationResult::from_results(&config.platform, results, started_at, start.elapsed());
        info!("{}", run.summary());
        run
    }

    /// Dry run: what `fill_all_fields` would find and write, without touching
    /// the page
    pub fn preview_fill<D: FormDocument + ?Sized>(
        &self,
        document: &D,
        platform: &str,
        profile: &Profile,
        scope: Option<ElementId>,
    ) -> Vec<PreviewEntry> {
        let Some(config) = self.registry.get(platform) else {
            warn!("no mappings registered for platform {:?}", platform);
            return Vec::new();
        };

        let view = ProfileView::new(profile);
        ordered_mappings(&config, false)
            .into_iter()
            .map(|mapping| {
                let detection = detect_field(mapping, document, scope);
                let value = view
                    .resolve(mapping.path)
                    .and_then(|raw| match &mapping.transform {
                        Some(transform) => transform.apply(&raw).ok(),
                        None => Some(raw.render()),
                    })
                    .filter(|v| !v.is_empty());

                PreviewEntry {
                    path: mapping.path,
                    found: detection.is_found(),
                    value,
                    element: detection.element,
                    confidence: detection.confidence,
                }
            })
            .collect()
    }
}

/// Descending priority; equal priorities keep declaration order
fn ordered_mappings(config: &PlatformMappingConfig, required_only: bool) -> Vec<&FieldMapping> {
    let mut mappings: Vec<&FieldMapping> = config
        .mappings
        .iter()
        .filter(|m| !required_only || m.required)
        .collect();
    mappings.sort_by(|a, b| b.priority.cmp(&a.priority));
    mappings
}

async fn fill_with_view<D: FormDocument + ?Sized>(
    mapping: &FieldMapping,
    view: &ProfileView,
    document: &mut D,
    scope: Option<ElementId>,
) -> FieldFillResult {
    let path = mapping.path;
    let mut ctx = FieldContext::new(path);

    let Some(raw) = view.resolve(path) else {
        ctx.transition(FieldState::Skipped, None);
        return FieldFillResult::skipped(path);
    };

    let value = match &mapping.transform {
        Some(transform) => match transform.apply(&raw) {
            Ok(value) => value,
            Err(e) => {
                ctx.transition(FieldState::SetFailed, Some(e.to_string()));
                return FieldFillResult::failed(path, None, None, FillError::SetValueFailed(e.to_string()));
            }
        },
        None => raw.render(),
    };
    if value.is_empty() {
        ctx.transition(FieldState::Skipped, Some("empty after transform".to_string()));
        return FieldFillResult::skipped(path);
    }

    ctx.transition(FieldState::Detecting, None);
    let detection = detect_field(mapping, &*document, scope);
    let Some(element) = detection.element else {
        ctx.transition(FieldState::NotFound, None);
        return FieldFillResult::failed(path, None, None, FillError::FieldNotFound);
    };
    ctx.transition(
        FieldState::Found,
        Some(format!(
            "{} ({})",
            detection.matched_selector.as_deref().unwrap_or_default(),
            detection.confidence
        )),
    );

    let previous_value = detection.current_value.clone();
    if !is_field_interactable(&*document, element) {
        ctx.transition(FieldState::NotInteractable, None);
        return FieldFillResult::failed(path, Some(element), previous_value, FillError::FieldNotInteractable);
    }
    ctx.transition(FieldState::Interactable, None);

    ctx.transition(FieldState::Setting, None);
    if !set_field_value(document, element, &value) {
        let reason = format!(
            "{} rejected {:?}",
            detection.detected_type.map(|t| t.as_str()).unwrap_or("element"),
            value
        );
        ctx.transition(FieldState::SetFailed, Some(reason.clone()));
        return FieldFillResult::failed(path, Some(element), previous_value, FillError::SetValueFailed(reason));
    }

    if let Some(delay) = mapping.settle_delay() {
        tokio::time::sleep(delay).await;
    }
    ctx.transition(FieldState::Success, None);
    debug!("{} done in {:?}", path, ctx.duration());

    FieldFillResult::filled(path, element, previous_value, value)
}
