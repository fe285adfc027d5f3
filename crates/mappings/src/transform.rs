use std::fmt;
use std::sync::Arc;

use jobfill_core::ProfileValue;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;
use thiserror::Error;

static YEAR: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b(19|20)\d{2}\b").unwrap());

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("transform failed: {0}")]
pub struct TransformError(pub String);

pub type CustomTransform = Arc<dyn Fn(&ProfileValue) -> Result<String, TransformError> + Send + Sync>;

/// Pure conversion from a profile value to the string a form expects
#[derive(Clone, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueTransform {
    Uppercase,
    Lowercase,
    Trim,
    /// Keep ASCII digits and a leading `+`
    DigitsOnly,
    /// Boolean to `Yes`/`No`
    YesNo,
    /// First four-digit year found in the value
    YearOnly,
    #[serde(skip)]
    Custom(CustomTransform),
}

impl ValueTransform {
    pub fn custom<F>(f: F) -> Self
    where
        F: Fn(&ProfileValue) -> Result<String, TransformError> + Send + Sync + 'static,
    {
        ValueTransform::Custom(Arc::new(f))
    }

    pub fn apply(&self, value: &ProfileValue) -> Result<String, TransformError> {
        match self {
            ValueTransform::Uppercase => Ok(value.render().to_uppercase()),
            ValueTransform::Lowercase => Ok(value.render().to_lowercase()),
            ValueTransform::Trim => Ok(value.render().trim().to_string()),
            ValueTransform::DigitsOnly => {
                let raw = value.render();
                let trimmed = raw.trim_start();
                let mut out = String::new();
                if trimmed.starts_with('+') {
                    out.push('+');
                }
                out.extend(trimmed.chars().filter(|c| c.is_ascii_digit()));
                if out.trim_start_matches('+').is_empty() {
                    return Err(TransformError(format!("no digits in {:?}", raw)));
                }
                Ok(out)
            }
            ValueTransform::YesNo => match value {
                ProfileValue::Flag(b) => Ok(if *b { "Yes" } else { "No" }.to_string()),
                other => {
                    let text = other.render();
                    match text.trim().to_lowercase().as_str() {
                        "true" | "yes" | "y" | "1" => Ok("Yes".to_string()),
                        "false" | "no" | "n" | "0" => Ok("No".to_string()),
                        _ => Err(TransformError(format!("not a yes/no value: {:?}", text))),
                    }
                }
            },
            ValueTransform::YearOnly => {
                let text = value.render();
                YEAR.find(&text)
                    .map(|m| m.as_str().to_string())
                    .ok_or_else(|| TransformError(format!("no year in {:?}", text)))
            }
            ValueTransform::Custom(f) => f(value),
        }
    }
}

impl fmt::Debug for ValueTransform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValueTransform::Uppercase => f.write_str("Uppercase"),
            ValueTransform::Lowercase => f.write_str("Lowercase"),
            ValueTransform::Trim => f.write_str("Trim"),
            ValueTransform::DigitsOnly => f.write_str("DigitsOnly"),
            ValueTransform::YesNo => f.write_str("YesNo"),
            ValueTransform::YearOnly => f.write_str("YearOnly"),
            ValueTransform::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}
