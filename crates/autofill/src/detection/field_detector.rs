use std::collections::BTreeMap;

use jobfill_core::{Confidence, FieldType, ProfileFieldPath};
use jobfill_dom::{DomError, ElementId, FormDocument};
use jobfill_mappings::{FieldMapping, FieldSelector};
use tracing::debug;

use crate::core::types::FieldDetectionResult;
use crate::detection::label_matcher::matches_label;

/// Locate the element for `mapping` and score how sure we are.
///
/// Selectors are tried in declaration order, primary before fallbacks; the
/// first element found ends the search. Lookup errors count as no match.
pub fn detect_field<D: FormDocument + ?Sized>(
    mapping: &FieldMapping,
    document: &D,
    root_scope: Option<ElementId>,
) -> FieldDetectionResult {
    for selector in &mapping.selectors {
        let scope = resolve_scope(document, selector, root_scope);

        for (css, is_fallback) in selector.candidates() {
            let element = match document.query_selector(scope, css) {
                Ok(Some(element)) => element,
                Ok(None) => continue,
                Err(e) => {
                    debug!("{}: selector {:?} failed: {}", mapping.path, css, e);
                    continue;
                }
            };

            let detected_type = infer_field_type(document, element).ok();
            let label_match = matches_label(document, element, &selector.label_patterns);

            let confidence = if !is_fallback && detected_type == Some(mapping.field_type) {
                Confidence::High
            } else if is_fallback || label_match {
                Confidence::Medium
            } else {
                Confidence::Low
            };

            debug!(
                "{}: matched {:?} ({}, confidence {})",
                mapping.path,
                css,
                if is_fallback { "fallback" } else { "primary" },
                confidence
            );

            return FieldDetectionResult {
                element: Some(element),
                matched_selector: Some(css.to_string()),
                confidence,
                detected_type,
                current_value: document.current_value(element).ok(),
            };
        }
    }

    debug!("{}: no element found", mapping.path);
    FieldDetectionResult::not_found()
}

/// Detect every mapping independently. When a path is mapped twice the
/// first mapping wins.
pub fn detect_all_fields<D: FormDocument + ?Sized>(
    mappings: &[FieldMapping],
    document: &D,
    root_scope: Option<ElementId>,
) -> BTreeMap<ProfileFieldPath, FieldDetectionResult> {
    let mut results = BTreeMap::new();
    for mapping in mappings {
        results
            .entry(mapping.path)
            .or_insert_with(|| detect_field(mapping, document, root_scope));
    }
    results
}

/// Whether a user could type into or click `element` right now
pub fn is_field_interactable<D: FormDocument + ?Sized>(document: &D, element: ElementId) -> bool {
    match check_interactable(document, element) {
        Ok(interactable) => interactable,
        Err(e) => {
            debug!("interactability check failed for {:?}: {}", element, e);
            false
        }
    }
}

fn check_interactable<D: FormDocument + ?Sized>(document: &D, element: ElementId) -> Result<bool, DomError> {
    if document.computed_style(element)?.is_hidden() {
        return Ok(false);
    }
    if document.is_disabled(element)? || document.is_read_only(element)? {
        return Ok(false);
    }

    let tag = document.tag_name(element)?;
    if !matches!(tag.as_str(), "input" | "select" | "textarea") && document.bounding_box(element)?.is_empty() {
        return Ok(false);
    }

    Ok(true)
}

pub fn infer_field_type<D: FormDocument + ?Sized>(document: &D, element: ElementId) -> Result<FieldType, DomError> {
    let tag = document.tag_name(element)?;
    let input_type = document.attribute(element, "type")?;
    Ok(FieldType::infer(&tag, input_type.as_deref()))
}

/// Declared container inside the root scope, or the root scope itself when
/// none is declared or the container is absent
fn resolve_scope<D: FormDocument + ?Sized>(
    document: &D,
    selector: &FieldSelector,
    root_scope: Option<ElementId>,
) -> Option<ElementId> {
    let Some(container) = &selector.container else {
        return root_scope;
    };

    match document.query_selector(root_scope, container) {
        Ok(Some(scope)) => Some(scope),
        Ok(None) => {
            debug!("container {:?} not present, searching root scope", container);
            root_scope
        }
        Err(e) => {
            debug!("container {:?} failed: {}", container, e);
            root_scope
        }
    }
}
