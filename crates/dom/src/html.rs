use std::collections::{BTreeMap, HashMap};

use ego_tree::NodeId;
use scraper::{ElementRef, Html, Selector};
use serde::Serialize;

use crate::{BoundingBox, ComputedStyle, DomError, ElementId, EventKind, FormDocument, SelectOption};

/// Nominal size of a rendered element without explicit dimensions.
/// Static markup has no layout engine behind it.
const DEFAULT_WIDTH: f64 = 120.0;
const DEFAULT_HEIGHT: f64 = 24.0;

/// One synthetic event as observed by the page, with the target's state at dispatch time
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DomEvent {
    pub target: ElementId,
    pub kind: EventKind,
    pub bubbles: bool,
    pub value: String,
    pub checked: bool,
}

/// Live state of a form control, kept apart from its markup attributes
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ControlSnapshot {
    pub value: String,
    pub checked: bool,
    pub selected: Option<usize>,
}

/// In-memory document parsed from static markup.
///
/// Control state (value, checked, selection, focus) lives in an overlay the
/// way a browser keeps properties apart from attributes, and every event the
/// engine dispatches is recorded so host-page reactions can be checked.
#[derive(Debug)]
pub struct HtmlDocument {
    html: Html,
    nodes: Vec<NodeId>,
    index: HashMap<NodeId, ElementId>,
    controls: HashMap<ElementId, ControlSnapshot>,
    focused: Option<ElementId>,
    events: Vec<DomEvent>,
}

impl HtmlDocument {
    pub fn parse(markup: &str) -> Self {
        let html = Html::parse_document(markup);
        let nodes: Vec<NodeId> = html
            .tree
            .root()
            .descendants()
            .filter_map(ElementRef::wrap)
            .map(|el| el.id())
            .collect();
        let index = nodes
            .iter()
            .enumerate()
            .map(|(i, node_id)| (*node_id, ElementId(i)))
            .collect();

        let mut document = Self {
            html,
            nodes,
            index,
            controls: HashMap::new(),
            focused: None,
            events: Vec::new(),
        };
        document.controls = document.initial_controls();
        document
    }

    /// Events dispatched so far, oldest first
    pub fn events(&self) -> &[DomEvent] {
        &self.events
    }

    pub fn events_for(&self, target: ElementId) -> Vec<&DomEvent> {
        self.events.iter().filter(|e| e.target == target).collect()
    }

    pub fn clear_events(&mut self) {
        self.events.clear();
    }

    pub fn focused(&self) -> Option<ElementId> {
        self.focused
    }

    /// State of every form control, for before/after comparisons
    pub fn control_snapshot(&self) -> BTreeMap<ElementId, ControlSnapshot> {
        self.controls.iter().map(|(id, state)| (*id, state.clone())).collect()
    }

    fn initial_controls(&self) -> HashMap<ElementId, ControlSnapshot> {
        let mut controls = HashMap::new();

        for i in 0..self.nodes.len() {
            let id = ElementId(i);
            let Ok(el) = self.element_ref(id) else {
                continue;
            };
            let element = el.value();

            let state = match element.name() {
                "input" => {
                    let input_type = element.attr("type").unwrap_or("text").to_ascii_lowercase();
                    if input_type == "checkbox" || input_type == "radio" {
                        ControlSnapshot {
                            value: element.attr("value").unwrap_or("on").to_string(),
                            checked: element.attr("checked").is_some(),
                            selected: None,
                        }
                    } else {
                        ControlSnapshot {
                            value: element.attr("value").unwrap_or("").to_string(),
                            ..Default::default()
                        }
                    }
                }
                "textarea" => ControlSnapshot {
                    value: el.text().collect(),
                    ..Default::default()
                },
                "select" => {
                    let options = option_elements(el);
                    // single selects show their first option when none is marked
                    let selected = options
                        .iter()
                        .position(|o| o.value().attr("selected").is_some())
                        .or(if options.is_empty() { None } else { Some(0) });
                    ControlSnapshot {
                        selected,
                        ..Default::default()
                    }
                }
                _ => continue,
            };

            controls.insert(id, state);
        }

        controls
    }

    fn element_ref(&self, id: ElementId) -> Result<ElementRef<'_>, DomError> {
        self.nodes
            .get(id.0)
            .and_then(|node_id| self.html.tree.get(*node_id))
            .and_then(ElementRef::wrap)
            .ok_or(DomError::StaleElement(id))
    }

    fn id_of(&self, el: ElementRef<'_>) -> Option<ElementId> {
        self.index.get(&el.id()).copied()
    }

    fn select_in(&self, scope: Option<ElementId>, selector: &str) -> Result<Vec<ElementId>, DomError> {
        let parsed = parse_selector(selector)?;
        let found = match scope {
            None => self
                .html
                .select(&parsed)
                .filter_map(|el| self.id_of(el))
                .collect(),
            Some(scope) => self
                .element_ref(scope)?
                .select(&parsed)
                .filter_map(|el| self.id_of(el))
                .collect(),
        };
        Ok(found)
    }

    fn radio_group(&self, element: ElementId, name: Option<&str>) -> Vec<ElementId> {
        let Some(name) = name else {
            return vec![element];
        };

        (0..self.nodes.len())
            .map(ElementId)
            .filter(|id| {
                self.element_ref(*id)
                    .map(|el| {
                        let v = el.value();
                        v.name() == "input"
                            && v.attr("type").is_some_and(|t| t.eq_ignore_ascii_case("radio"))
                            && v.attr("name") == Some(name)
                    })
                    .unwrap_or(false)
            })
            .collect()
    }

    fn record(&mut self, target: ElementId, kind: EventKind, bubbles: bool) {
        let value = self.current_value(target).unwrap_or_default();
        let checked = self.controls.get(&target).map(|s| s.checked).unwrap_or(false);
        self.events.push(DomEvent {
            target,
            kind,
            bubbles,
            value,
            checked,
        });
    }
}

impl FormDocument for HtmlDocument {
    fn query_selector(&self, scope: Option<ElementId>, selector: &str) -> Result<Option<ElementId>, DomError> {
        Ok(self.select_in(scope, selector)?.into_iter().next())
    }

    fn query_selector_all(&self, scope: Option<ElementId>, selector: &str) -> Result<Vec<ElementId>, DomError> {
        self.select_in(scope, selector)
    }

    fn tag_name(&self, element: ElementId) -> Result<String, DomError> {
        Ok(self.element_ref(element)?.value().name().to_ascii_lowercase())
    }

    fn attribute(&self, element: ElementId, name: &str) -> Result<Option<String>, DomError> {
        Ok(self.element_ref(element)?.value().attr(name).map(String::from))
    }

    fn text_content(&self, element: ElementId) -> Result<String, DomError> {
        Ok(self.element_ref(element)?.text().collect())
    }

    fn closest(&self, element: ElementId, selector: &str) -> Result<Option<ElementId>, DomError> {
        let parsed = parse_selector(selector)?;
        let el = self.element_ref(element)?;
        Ok(self_and_ancestors(el)
            .find(|candidate| parsed.matches(candidate))
            .and_then(|found| self.id_of(found)))
    }

    fn current_value(&self, element: ElementId) -> Result<String, DomError> {
        let el = self.element_ref(element)?;
        if el.value().name() == "select" {
            let options = self.options(element)?;
            return Ok(options
                .into_iter()
                .find(|o| o.selected)
                .map(|o| o.value)
                .unwrap_or_default());
        }
        Ok(self
            .controls
            .get(&element)
            .map(|s| s.value.clone())
            .unwrap_or_default())
    }

    fn is_checked(&self, element: ElementId) -> Result<bool, DomError> {
        self.element_ref(element)?;
        Ok(self.controls.get(&element).map(|s| s.checked).unwrap_or(false))
    }

    fn options(&self, element: ElementId) -> Result<Vec<SelectOption>, DomError> {
        let el = self.element_ref(element)?;
        if el.value().name() != "select" {
            return Ok(Vec::new());
        }

        let selected = self.controls.get(&element).and_then(|s| s.selected);
        Ok(option_elements(el)
            .into_iter()
            .enumerate()
            .map(|(i, option)| {
                let text = collapse_whitespace(&option.text().collect::<String>());
                SelectOption {
                    value: option
                        .value()
                        .attr("value")
                        .map(String::from)
                        .unwrap_or_else(|| text.clone()),
                    text,
                    selected: selected == Some(i),
                }
            })
            .collect())
    }

    fn is_disabled(&self, element: ElementId) -> Result<bool, DomError> {
        Ok(self.element_ref(element)?.value().attr("disabled").is_some())
    }

    fn is_read_only(&self, element: ElementId) -> Result<bool, DomError> {
        Ok(self.element_ref(element)?.value().attr("readonly").is_some())
    }

    fn computed_style(&self, element: ElementId) -> Result<ComputedStyle, DomError> {
        let el = self.element_ref(element)?;

        let display = display_of(&el);
        // visibility is inherited, the nearest declaration wins
        let visibility = self_and_ancestors(el)
            .find_map(|e| declared(&e, "visibility"))
            .unwrap_or_else(|| "visible".to_string());

        Ok(ComputedStyle { display, visibility })
    }

    fn bounding_box(&self, element: ElementId) -> Result<BoundingBox, DomError> {
        let el = self.element_ref(element)?;

        if self_and_ancestors(el).any(|e| is_display_none(&e)) {
            return Ok(BoundingBox::default());
        }

        Ok(BoundingBox {
            x: 0.0,
            y: 0.0,
            width: declared_length(&el, "width").unwrap_or(DEFAULT_WIDTH),
            height: declared_length(&el, "height").unwrap_or(DEFAULT_HEIGHT),
        })
    }

    fn focus(&mut self, element: ElementId) -> Result<(), DomError> {
        self.element_ref(element)?;
        if self.focused == Some(element) {
            return Ok(());
        }
        if let Some(previous) = self.focused.take() {
            self.record(previous, EventKind::Blur, false);
        }
        self.focused = Some(element);
        self.record(element, EventKind::Focus, false);
        Ok(())
    }

    fn blur(&mut self, element: ElementId) -> Result<(), DomError> {
        self.element_ref(element)?;
        if self.focused == Some(element) {
            self.focused = None;
            self.record(element, EventKind::Blur, false);
        }
        Ok(())
    }

    fn click(&mut self, element: ElementId) -> Result<(), DomError> {
        let (tag, input_type, disabled, name) = {
            let el = self.element_ref(element)?;
            let v = el.value();
            (
                v.name().to_string(),
                v.attr("type").map(|t| t.to_ascii_lowercase()),
                v.attr("disabled").is_some(),
                v.attr("name").map(String::from),
            )
        };

        // disabled controls swallow activation entirely
        if disabled {
            return Ok(());
        }

        let mut changed = false;
        if tag == "input" {
            match input_type.as_deref() {
                Some("checkbox") => {
                    if let Some(state) = self.controls.get_mut(&element) {
                        state.checked = !state.checked;
                        changed = true;
                    }
                }
                Some("radio") => {
                    let already_checked = self.controls.get(&element).map(|s| s.checked).unwrap_or(false);
                    if !already_checked {
                        for peer in self.radio_group(element, name.as_deref()) {
                            if let Some(state) = self.controls.get_mut(&peer) {
                                state.checked = peer == element;
                            }
                        }
                        changed = true;
                    }
                }
                _ => {}
            }
        }

        self.record(element, EventKind::Click, true);
        if changed {
            self.record(element, EventKind::Input, true);
            self.record(element, EventKind::Change, true);
        }
        Ok(())
    }

    fn assign_value(&mut self, element: ElementId, value: &str) -> Result<(), DomError> {
        let tag = self.element_ref(element)?.value().name().to_string();

        if tag == "select" {
            let index = self.options(element)?.iter().position(|o| o.value == value);
            self.controls.entry(element).or_default().selected = index;
            return Ok(());
        }

        self.controls.entry(element).or_default().value = value.to_string();
        Ok(())
    }

    fn select_option(&mut self, element: ElementId, index: usize) -> Result<(), DomError> {
        let count = self.options(element)?.len();
        if index >= count {
            return Err(DomError::OptionOutOfRange { index });
        }
        self.controls.entry(element).or_default().selected = Some(index);
        Ok(())
    }

    fn dispatch_event(&mut self, element: ElementId, kind: EventKind, bubbles: bool) -> Result<(), DomError> {
        self.element_ref(element)?;
        self.record(element, kind, bubbles);
        Ok(())
    }
}

fn parse_selector(selector: &str) -> Result<Selector, DomError> {
    Selector::parse(selector).map_err(|_| DomError::InvalidSelector(selector.to_string()))
}

fn self_and_ancestors(el: ElementRef<'_>) -> impl Iterator<Item = ElementRef<'_>> {
    let ancestors = el.ancestors().filter_map(ElementRef::wrap);
    std::iter::once(el).chain(ancestors)
}

fn option_elements(select: ElementRef<'_>) -> Vec<ElementRef<'_>> {
    select
        .descendants()
        .filter_map(ElementRef::wrap)
        .filter(|e| e.value().name() == "option")
        .collect()
}

/// Last inline declaration of `property`, lowercased
fn declared(el: &ElementRef<'_>, property: &str) -> Option<String> {
    let style = el.value().attr("style")?;
    style
        .split(';')
        .filter_map(|declaration| declaration.split_once(':'))
        .filter(|(name, _)| name.trim().eq_ignore_ascii_case(property))
        .map(|(_, value)| value.replace("!important", "").trim().to_ascii_lowercase())
        .last()
}

fn declared_length(el: &ElementRef<'_>, property: &str) -> Option<f64> {
    declared(el, property).and_then(|v| v.trim_end_matches("px").trim().parse::<f64>().ok())
}

/// Hidden inputs are `display: none` regardless of inline style, as the
/// user-agent stylesheet marks that rule `!important`
fn display_of(el: &ElementRef<'_>) -> String {
    let hidden_input = el.value().name() == "input"
        && el
            .value()
            .attr("type")
            .is_some_and(|t| t.trim().eq_ignore_ascii_case("hidden"));
    if hidden_input {
        return "none".to_string();
    }

    declared(el, "display").unwrap_or_else(|| {
        if el.value().attr("hidden").is_some() {
            "none".to_string()
        } else {
            "block".to_string()
        }
    })
}

fn is_display_none(el: &ElementRef<'_>) -> bool {
    display_of(el) == "none"
}

fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn find(doc: &HtmlDocument, selector: &str) -> ElementId {
        doc.query_selector(None, selector).unwrap().unwrap()
    }

    #[test]
    fn test_query_respects_scope_and_document_order() {
        let doc = HtmlDocument::parse(
            r#"
            <input name="email" id="outside" />
            <form id="apply">
                <input name="email" id="inside-1" />
                <input name="email" id="inside-2" />
            </form>
            "#,
        );

        let form = find(&doc, "#apply");
        let first = doc.query_selector(None, "input[name='email']").unwrap().unwrap();
        assert_eq!(doc.attribute(first, "id").unwrap().as_deref(), Some("outside"));

        let scoped = doc.query_selector_all(Some(form), "input[name='email']").unwrap();
        assert_eq!(scoped.len(), 2);
        assert_eq!(doc.attribute(scoped[0], "id").unwrap().as_deref(), Some("inside-1"));

        assert_eq!(doc.query_selector(None, "#missing").unwrap(), None);
    }

    #[test]
    fn test_invalid_selector_is_an_error() {
        let doc = HtmlDocument::parse("<input id='a'>");
        assert_eq!(
            doc.query_selector(None, "input[[").unwrap_err(),
            DomError::InvalidSelector("input[[".to_string())
        );
    }

    #[test]
    fn test_initial_control_state() {
        let doc = HtmlDocument::parse(
            r#"
            <input id="name" value="Jane" />
            <input id="terms" type="checkbox" checked />
            <textarea id="bio">Hello</textarea>
            <select id="size"><option>S</option><option value="m" selected>Medium</option></select>
            <select id="plain"><option value="a">A</option><option value="b">B</option></select>
            "#,
        );

        assert_eq!(doc.current_value(find(&doc, "#name")).unwrap(), "Jane");
        assert!(doc.is_checked(find(&doc, "#terms")).unwrap());
        assert_eq!(doc.current_value(find(&doc, "#terms")).unwrap(), "on");
        assert_eq!(doc.current_value(find(&doc, "#bio")).unwrap(), "Hello");
        assert_eq!(doc.current_value(find(&doc, "#size")).unwrap(), "m");
        assert_eq!(doc.current_value(find(&doc, "#plain")).unwrap(), "a");

        let options = doc.options(find(&doc, "#size")).unwrap();
        assert_eq!(options[0].value, "S");
        assert_eq!(options[1].text, "Medium");
        assert!(options[1].selected);
    }

    #[test]
    fn test_assign_value_emits_no_events() {
        let mut doc = HtmlDocument::parse("<input id='city'>");
        let city = find(&doc, "#city");

        doc.assign_value(city, "Berlin").unwrap();

        assert_eq!(doc.current_value(city).unwrap(), "Berlin");
        assert_eq!(doc.attribute(city, "value").unwrap(), None);
        assert!(doc.events().is_empty());
    }

    #[test]
    fn test_checkbox_click_toggles_and_notifies() {
        let mut doc = HtmlDocument::parse("<input id='terms' type='checkbox'>");
        let terms = find(&doc, "#terms");

        doc.click(terms).unwrap();

        assert!(doc.is_checked(terms).unwrap());
        let kinds: Vec<EventKind> = doc.events().iter().map(|e| e.kind).collect();
        assert_eq!(kinds, vec![EventKind::Click, EventKind::Input, EventKind::Change]);
        assert!(doc.events().iter().all(|e| e.checked && e.bubbles));
    }

    #[test]
    fn test_radio_click_unchecks_group_peers() {
        let mut doc = HtmlDocument::parse(
            r#"
            <input type="radio" name="auth" value="yes" id="yes" checked />
            <input type="radio" name="auth" value="no" id="no" />
            <input type="radio" name="other" value="x" id="x" checked />
            "#,
        );
        let yes = find(&doc, "#yes");
        let no = find(&doc, "#no");
        let x = find(&doc, "#x");

        doc.click(no).unwrap();

        assert!(doc.is_checked(no).unwrap());
        assert!(!doc.is_checked(yes).unwrap());
        assert!(doc.is_checked(x).unwrap());

        // clicking a checked radio changes nothing
        doc.clear_events();
        doc.click(no).unwrap();
        assert_eq!(doc.events().len(), 1);
        assert_eq!(doc.events()[0].kind, EventKind::Click);
    }

    #[test]
    fn test_disabled_click_is_ignored() {
        let mut doc = HtmlDocument::parse("<input id='c' type='checkbox' disabled>");
        let c = find(&doc, "#c");
        doc.click(c).unwrap();
        assert!(!doc.is_checked(c).unwrap());
        assert!(doc.events().is_empty());
    }

    #[test]
    fn test_focus_moves_and_blurs_previous() {
        let mut doc = HtmlDocument::parse("<input id='a'><input id='b'>");
        let a = find(&doc, "#a");
        let b = find(&doc, "#b");

        doc.focus(a).unwrap();
        doc.focus(b).unwrap();
        doc.blur(b).unwrap();

        let kinds: Vec<(ElementId, EventKind)> = doc.events().iter().map(|e| (e.target, e.kind)).collect();
        assert_eq!(
            kinds,
            vec![
                (a, EventKind::Focus),
                (a, EventKind::Blur),
                (b, EventKind::Focus),
                (b, EventKind::Blur),
            ]
        );
        assert_eq!(doc.focused(), None);
    }

    #[test]
    fn test_select_option_bounds() {
        let mut doc = HtmlDocument::parse("<select id='s'><option>a</option><option>b</option></select>");
        let s = find(&doc, "#s");

        doc.select_option(s, 1).unwrap();
        assert_eq!(doc.current_value(s).unwrap(), "b");
        assert_eq!(
            doc.select_option(s, 5).unwrap_err(),
            DomError::OptionOutOfRange { index: 5 }
        );
    }

    #[test]
    fn test_computed_style_and_visibility_inheritance() {
        let doc = HtmlDocument::parse(
            r#"
            <div style="visibility: hidden">
                <input id="inherits" />
                <input id="overrides" style="visibility:visible" />
            </div>
            <input id="gone" style="display: none !important" />
            <input id="attr-hidden" hidden />
            "#,
        );

        assert!(doc.computed_style(find(&doc, "#inherits")).unwrap().is_hidden());
        assert!(!doc.computed_style(find(&doc, "#overrides")).unwrap().is_hidden());
        assert_eq!(doc.computed_style(find(&doc, "#gone")).unwrap().display, "none");
        assert!(doc.computed_style(find(&doc, "#attr-hidden")).unwrap().is_hidden());
    }

    #[test]
    fn test_hidden_input_is_display_none() {
        let doc = HtmlDocument::parse(
            r#"<input id="token" type="HIDDEN" style="display: block"><input id="shown" type="text">"#,
        );
        let token = find(&doc, "#token");

        assert_eq!(doc.computed_style(token).unwrap().display, "none");
        assert!(doc.bounding_box(token).unwrap().is_empty());
        assert_eq!(doc.computed_style(find(&doc, "#shown")).unwrap().display, "block");
    }

    #[test]
    fn test_bounding_box() {
        let doc = HtmlDocument::parse(
            r#"
            <div id="sized" style="width: 0px; height: 40px"></div>
            <div style="display:none"><span id="nested">x</span></div>
            <span id="plain">x</span>
            "#,
        );

        assert!(doc.bounding_box(find(&doc, "#sized")).unwrap().is_empty());
        assert!(doc.bounding_box(find(&doc, "#nested")).unwrap().is_empty());
        let plain = doc.bounding_box(find(&doc, "#plain")).unwrap();
        assert_eq!(plain.width, DEFAULT_WIDTH);
        assert!(!plain.is_empty());
    }

    #[test]
    fn test_closest_includes_self_and_ancestors() {
        let doc = HtmlDocument::parse("<label id='wrap'>Email <input id='email'></label>");
        let email = find(&doc, "#email");
        let wrap = find(&doc, "#wrap");

        assert_eq!(doc.closest(email, "label").unwrap(), Some(wrap));
        assert_eq!(doc.closest(wrap, "label").unwrap(), Some(wrap));
        assert_eq!(doc.closest(email, "form").unwrap(), None);
    }

    #[test]
    fn test_stale_element() {
        let doc = HtmlDocument::parse("<input>");
        let bogus = ElementId(10_000);
        assert_eq!(doc.tag_name(bogus).unwrap_err(), DomError::StaleElement(bogus));
    }
}
