use jobfill_dom::{DomError, ElementId, FormDocument};
use jobfill_mappings::LabelPattern;
use tracing::debug;

const LABEL_ATTRIBUTES: &[&str] = &["aria-label", "placeholder", "name", "id", "data-automation-id"];

/// Label-like text around an element: its own attributes, an associated
/// `<label for=...>`, and a wrapping `<label>`
pub fn candidate_texts<D: FormDocument + ?Sized>(document: &D, element: ElementId) -> Result<Vec<String>, DomError> {
    let mut texts = Vec::new();

    for attr in LABEL_ATTRIBUTES {
        if let Some(value) = document.attribute(element, attr)? {
            if !value.trim().is_empty() {
                texts.push(value);
            }
        }
    }

    if let Some(id) = document.attribute(element, "id")?.filter(|id| !id.is_empty()) {
        // compare attributes instead of building a selector from page-controlled text
        for label in document.query_selector_all(None, "label[for]")? {
            if document.attribute(label, "for")?.as_deref() == Some(id.as_str()) {
                texts.push(document.text_content(label)?);
            }
        }
    }

    if let Some(wrapper) = document.closest(element, "label")? {
        texts.push(document.text_content(wrapper)?);
    }

    Ok(texts
        .into_iter()
        .map(|t| t.split_whitespace().collect::<Vec<_>>().join(" "))
        .filter(|t| !t.is_empty())
        .collect())
}

/// True when any pattern matches any candidate text
pub fn matches_label<D: FormDocument + ?Sized>(document: &D, element: ElementId, patterns: &[LabelPattern]) -> bool {
    if patterns.is_empty() {
        return false;
    }

    match candidate_texts(document, element) {
        Ok(texts) => texts.iter().any(|text| patterns.iter().any(|p| p.matches(text))),
        Err(e) => {
            debug!("label lookup failed for {:?}: {}", element, e);
            false
        }
    }
}
