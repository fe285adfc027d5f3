use regex::{Regex, RegexBuilder};
use serde::Deserialize;

use crate::MappingError;

/// Text test applied to label-like attributes of a located element.
///
/// Patterns only raise confidence; they are never used to find elements.
#[derive(Debug, Clone, Deserialize)]
#[serde(try_from = "LabelPatternDef")]
pub enum LabelPattern {
    /// Case-insensitive substring
    Literal(String),
    /// Compiled case-insensitive
    Regex(Regex),
}

#[derive(Deserialize)]
#[serde(untagged)]
enum LabelPatternDef {
    Literal(String),
    Regex { regex: String },
}

impl TryFrom<LabelPatternDef> for LabelPattern {
    type Error = MappingError;

    fn try_from(def: LabelPatternDef) -> Result<Self, Self::Error> {
        match def {
            LabelPatternDef::Literal(text) => Ok(LabelPattern::literal(text)),
            LabelPatternDef::Regex { regex } => LabelPattern::regex(&regex),
        }
    }
}

impl LabelPattern {
    pub fn literal(text: impl Into<String>) -> Self {
        LabelPattern::Literal(text.into().to_lowercase())
    }

    pub fn regex(pattern: &str) -> Result<Self, MappingError> {
        RegexBuilder::new(pattern)
            .case_insensitive(true)
            .build()
            .map(LabelPattern::Regex)
            .map_err(|e| MappingError::InvalidRegex {
                pattern: pattern.to_string(),
                message: e.to_string(),
            })
    }

    pub fn matches(&self, candidate: &str) -> bool {
        match self {
            LabelPattern::Literal(text) => !text.is_empty() && candidate.to_lowercase().contains(text.as_str()),
            LabelPattern::Regex(re) => re.is_match(candidate),
        }
    }
}

/// One way of locating the element for a mapping
#[derive(Debug, Clone, Deserialize)]
pub struct FieldSelector {
    pub primary: String,
    #[serde(default)]
    pub fallbacks: Vec<String>,
    /// Search inside the first element matching this selector instead of the root scope
    #[serde(default)]
    pub container: Option<String>,
    #[serde(default)]
    pub label_patterns: Vec<LabelPattern>,
}

impl FieldSelector {
    pub fn new(primary: impl Into<String>) -> Self {
        Self {
            primary: primary.into(),
            fallbacks: Vec::new(),
            container: None,
            label_patterns: Vec::new(),
        }
    }

    pub fn with_fallbacks<I, S>(mut self, fallbacks: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.fallbacks.extend(fallbacks.into_iter().map(Into::into));
        self
    }

    pub fn within(mut self, container: impl Into<String>) -> Self {
        self.container = Some(container.into());
        self
    }

    pub fn with_label(mut self, pattern: LabelPattern) -> Self {
        self.label_patterns.push(pattern);
        self
    }

    /// Primary first, then fallbacks in declaration order
    pub fn candidates(&self) -> impl Iterator<Item = (&str, bool)> {
        std::iter::once((self.primary.as_str(), false))
            .chain(self.fallbacks.iter().map(|s| (s.as_str(), true)))
    }
}
