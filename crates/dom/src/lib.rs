//! Document access for the autofill engine.
//!
//! The engine never talks to a page directly. Everything goes through
//! [`FormDocument`]: reads take `&self`, mutations take `&mut self`, so code
//! holding only a shared borrow cannot change the page.

pub mod browser;
pub mod html;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use browser::{ChromeDocument, ChromeSession};
pub use html::{ControlSnapshot, DomEvent, HtmlDocument};

/// Opaque handle to an element of one document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ElementId(pub usize);

/// Synthetic notifications the engine emits at host listeners
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EventKind {
    Focus,
    Blur,
    Click,
    Input,
    Change,
}

impl EventKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventKind::Focus => "focus",
            EventKind::Blur => "blur",
            EventKind::Click => "click",
            EventKind::Input => "input",
            EventKind::Change => "change",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectOption {
    pub value: String,
    pub text: String,
    pub selected: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComputedStyle {
    pub display: String,
    pub visibility: String,
}

impl ComputedStyle {
    pub fn is_hidden(&self) -> bool {
        self.display.eq_ignore_ascii_case("none") || self.visibility.eq_ignore_ascii_case("hidden")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct BoundingBox {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl BoundingBox {
    pub fn is_empty(&self) -> bool {
        self.width <= 0.0 || self.height <= 0.0
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomError {
    #[error("invalid selector: {0}")]
    InvalidSelector(String),

    #[error("element {0:?} is not part of this document")]
    StaleElement(ElementId),

    #[error("option index {index} out of range")]
    OptionOutOfRange { index: usize },

    #[error("backend error: {0}")]
    Backend(String),
}

/// A page the engine can search and mutate.
///
/// `scope: None` means the whole document. Selector searches only look at
/// descendants of the scope, in document order.
pub trait FormDocument {
    fn query_selector(&self, scope: Option<ElementId>, selector: &str) -> Result<Option<ElementId>, DomError>;

    fn query_selector_all(&self, scope: Option<ElementId>, selector: &str) -> Result<Vec<ElementId>, DomError>;

    /// Lowercase tag name
    fn tag_name(&self, element: ElementId) -> Result<String, DomError>;

    fn attribute(&self, element: ElementId, name: &str) -> Result<Option<String>, DomError>;

    fn text_content(&self, element: ElementId) -> Result<String, DomError>;

    /// The element itself or its nearest ancestor matching `selector`
    fn closest(&self, element: ElementId, selector: &str) -> Result<Option<ElementId>, DomError>;

    /// The live `value` property (not the markup attribute)
    fn current_value(&self, element: ElementId) -> Result<String, DomError>;

    fn is_checked(&self, element: ElementId) -> Result<bool, DomError>;

    fn options(&self, element: ElementId) -> Result<Vec<SelectOption>, DomError>;

    fn is_disabled(&self, element: ElementId) -> Result<bool, DomError>;

    fn is_read_only(&self, element: ElementId) -> Result<bool, DomError>;

    fn computed_style(&self, element: ElementId) -> Result<ComputedStyle, DomError>;

    fn bounding_box(&self, element: ElementId) -> Result<BoundingBox, DomError>;

    fn focus(&mut self, element: ElementId) -> Result<(), DomError>;

    fn blur(&mut self, element: ElementId) -> Result<(), DomError>;

    /// Simulated user activation, including the element's default action
    fn click(&mut self, element: ElementId) -> Result<(), DomError>;

    /// Property write without notifications
    fn assign_value(&mut self, element: ElementId, value: &str) -> Result<(), DomError>;

    /// Property write of a `<select>`'s selected index without notifications
    fn select_option(&mut self, element: ElementId, index: usize) -> Result<(), DomError>;

    fn dispatch_event(&mut self, element: ElementId, kind: EventKind, bubbles: bool) -> Result<(), DomError>;
}
