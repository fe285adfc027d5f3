use jobfill_core::FieldType;
use jobfill_dom::{DomError, ElementId, EventKind, FormDocument, SelectOption};
use tracing::{debug, warn};

use crate::detection::field_detector::infer_field_type;

const TRUTHY: &[&str] = &["true", "yes", "y", "1", "on", "checked"];

/// Write `value` into `element` the way a user would, so host listeners see
/// it. Returns false when the value could not be applied; never errors.
pub fn set_field_value<D: FormDocument + ?Sized>(document: &mut D, element: ElementId, value: &str) -> bool {
    match try_set(document, element, value) {
        Ok(applied) => applied,
        Err(e) => {
            warn!("setting {:?} failed: {}", element, e);
            false
        }
    }
}

fn try_set<D: FormDocument + ?Sized>(document: &mut D, element: ElementId, value: &str) -> Result<bool, DomError> {
    let field_type = infer_field_type(&*document, element)?;
    if field_type.is_text_like() {
        return set_text(document, element, value);
    }

    match field_type {
        FieldType::Checkbox => set_checkbox(document, element, value),
        FieldType::Radio => set_radio(document, element, value),
        FieldType::Select => set_select(document, element, value),
        FieldType::File => {
            debug!("file inputs cannot be filled programmatically");
            Ok(false)
        }
        other => {
            debug!("no setter for {} fields", other);
            Ok(false)
        }
    }
}

pub fn is_truthy(value: &str) -> bool {
    let value = value.trim().to_lowercase();
    TRUTHY.contains(&value.as_str())
}

fn set_checkbox<D: FormDocument + ?Sized>(document: &mut D, element: ElementId, value: &str) -> Result<bool, DomError> {
    let target = is_truthy(value);
    if document.is_checked(element)? != target {
        document.click(element)?;
    }
    Ok(document.is_checked(element)? == target)
}

fn set_radio<D: FormDocument + ?Sized>(document: &mut D, element: ElementId, value: &str) -> Result<bool, DomError> {
    let group = match document.attribute(element, "name")?.filter(|n| !n.is_empty()) {
        Some(name) => {
            let mut group = Vec::new();
            for radio in document.query_selector_all(None, "input[type=radio]")? {
                if document.attribute(radio, "name")?.as_deref() == Some(name.as_str()) {
                    group.push(radio);
                }
            }
            group
        }
        None => vec![element],
    };

    let mut values = Vec::with_capacity(group.len());
    for radio in &group {
        values.push(document.current_value(*radio)?);
    }

    let Some(index) = best_match(value, values.iter().map(|v| [v.as_str()])) else {
        debug!("no radio in group matches {:?}", value);
        return Ok(false);
    };

    let choice = group[index];
    if !document.is_checked(choice)? {
        document.click(choice)?;
    }
    document.is_checked(choice)
}

fn set_select<D: FormDocument + ?Sized>(document: &mut D, element: ElementId, value: &str) -> Result<bool, DomError> {
    let options = document.options(element)?;
    let candidates = options
        .iter()
        .map(|o| if is_placeholder(o) { ["", ""] } else { [o.value.as_str(), o.text.as_str()] });

    let Some(index) = best_match(value, candidates) else {
        debug!("no option matches {:?}", value);
        return Ok(false);
    };

    document.select_option(element, index)?;
    document.dispatch_event(element, EventKind::Change, true)?;
    Ok(true)
}

fn set_text<D: FormDocument + ?Sized>(document: &mut D, element: ElementId, value: &str) -> Result<bool, DomError> {
    document.focus(element)?;
    document.assign_value(element, value)?;
    document.dispatch_event(element, EventKind::Input, true)?;
    document.dispatch_event(element, EventKind::Change, true)?;
    document.blur(element)?;
    Ok(true)
}

fn is_placeholder(option: &SelectOption) -> bool {
    option.value.trim().is_empty() && option.text.trim().is_empty()
}

/// Index of the first candidate with a label equal to `target`, else the
/// first whose label contains or is contained by it. Case-insensitive;
/// empty labels never match.
///
/// The exact pass runs over every candidate before any containment check,
/// so an exact label later in the list beats an earlier partial one
/// ("male" picks "Male", not a preceding "Female").
fn best_match<'a, I, L>(target: &str, mut candidates: I) -> Option<usize>
where
    I: Iterator<Item = L> + Clone,
    L: IntoIterator<Item = &'a str>,
{
    let target = target.trim().to_lowercase();
    if target.is_empty() {
        return None;
    }

    let labels = |candidate: L| -> Vec<String> {
        candidate
            .into_iter()
            .map(|l| l.trim().to_lowercase())
            .filter(|l| !l.is_empty())
            .collect()
    };

    candidates
        .clone()
        .position(|c| labels(c).iter().any(|l| *l == target))
        .or_else(|| {
            candidates.position(|c| {
                labels(c)
                    .iter()
                    .any(|l| l.contains(target.as_str()) || target.contains(l.as_str()))
            })
        })
}
