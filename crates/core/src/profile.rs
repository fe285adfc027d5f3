use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::JobfillError;

/// Candidate profile as handed over by the storage layer.
///
/// Property names follow the storage format, not the canonical
/// `ProfileFieldPath` names used by mapping datasets.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Profile {
    pub personal: PersonalDetails,
    pub links: ProfessionalLinks,
    pub years_of_experience: Option<NumberOrText>,
    pub experience: Vec<WorkExperience>,
    pub education: Vec<Education>,
    pub skills: Vec<String>,
    pub certifications: Vec<String>,
    pub languages: Vec<String>,
    pub authorization: WorkAuthorization,
    pub self_identification: SelfIdentification,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PersonalDetails {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub preferred_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub location: Address,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Address {
    pub street: Option<String>,
    pub city: Option<String>,
    pub region: Option<String>,
    pub postal_code: Option<String>,
    pub country: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProfessionalLinks {
    pub linkedin_url: Option<String>,
    pub github_url: Option<String>,
    pub portfolio_url: Option<String>,
    pub website_url: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct WorkExperience {
    pub company: Option<String>,
    pub title: Option<String>,
    pub location: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub current: bool,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Education {
    pub institution: Option<String>,
    pub degree: Option<String>,
    pub major: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub gpa: Option<NumberOrText>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct WorkAuthorization {
    pub legally_authorized: Option<bool>,
    pub requires_sponsorship: Option<bool>,
    pub visa_status: Option<String>,
}

/// Voluntary self-identification answers (EEO questions)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SelfIdentification {
    pub gender: Option<String>,
    pub ethnicity: Option<String>,
    pub veteran_status: Option<String>,
    pub disability_status: Option<String>,
}

/// A quantity that storage may hand over as a JSON number or as free text
/// (`3.8` or `"3.8/4.0"`)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum NumberOrText {
    Number(serde_json::Number),
    Text(String),
}

impl std::fmt::Display for NumberOrText {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NumberOrText::Number(n) => f.pad(&n.to_string()),
            NumberOrText::Text(s) => f.pad(s),
        }
    }
}

/// One profile attribute, resolved and ready to be transformed or filled
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum ProfileValue {
    Text(String),
    Flag(bool),
    List(Vec<String>),
}

impl ProfileValue {
    /// String form used for filling; lists are joined with `", "`
    pub fn render(&self) -> String {
        match self {
            ProfileValue::Text(s) => s.clone(),
            ProfileValue::Flag(b) => b.to_string(),
            ProfileValue::List(items) => items
                .iter()
                .map(|s| s.trim())
                .filter(|s| !s.is_empty())
                .collect::<Vec<_>>()
                .join(", "),
        }
    }

    /// True when there is nothing to fill
    pub fn is_empty(&self) -> bool {
        match self {
            ProfileValue::Flag(_) => false,
            _ => self.render().is_empty(),
        }
    }
}

impl std::fmt::Display for ProfileValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.render())
    }
}

impl Profile {
    pub fn from_json_str(json: &str) -> Result<Self, JobfillError> {
        serde_json::from_str(json).map_err(|e| JobfillError::Profile(e.to_string()))
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, JobfillError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    /// Most recent position: the one marked current, else the first listed
    pub fn current_experience(&self) -> Option<&WorkExperience> {
        self.experience
            .iter()
            .find(|e| e.current)
            .or_else(|| self.experience.first())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_partial_profile() {
        let json = r#"{
            "personal": { "firstName": "John", "location": { "city": "Berlin" } },
            "skills": ["Rust", "SQL"],
            "authorization": { "legallyAuthorized": true }
        }"#;

        let profile = Profile::from_json_str(json).unwrap();
        assert_eq!(profile.personal.first_name.as_deref(), Some("John"));
        assert_eq!(profile.personal.location.city.as_deref(), Some("Berlin"));
        assert_eq!(profile.personal.email, None);
        assert_eq!(profile.skills, vec!["Rust", "SQL"]);
        assert_eq!(profile.authorization.legally_authorized, Some(true));
    }

    #[test]
    fn test_empty_object_is_empty_profile() {
        assert_eq!(Profile::from_json_str("{}").unwrap(), Profile::default());
    }

    #[test]
    fn test_current_experience_prefers_current_flag() {
        let mut profile = Profile::default();
        profile.experience = vec![
            WorkExperience {
                company: Some("Old Corp".to_string()),
                ..Default::default()
            },
            WorkExperience {
                company: Some("Now Inc".to_string()),
                current: true,
                ..Default::default()
            },
        ];

        let current = profile.current_experience().unwrap();
        assert_eq!(current.company.as_deref(), Some("Now Inc"));
    }

    #[test]
    fn test_profile_value_rendering() {
        assert_eq!(ProfileValue::Flag(true).render(), "true");
        assert_eq!(
            ProfileValue::List(vec!["Rust".into(), " ".into(), "Go".into()]).render(),
            "Rust, Go"
        );
        assert!(ProfileValue::Text(String::new()).is_empty());
        assert!(ProfileValue::List(vec![]).is_empty());
        assert!(!ProfileValue::Flag(false).is_empty());
        assert!(!ProfileValue::Text(" ".into()).is_empty());
    }

    #[test]
    fn test_numeric_fields_accept_numbers_and_text() {
        let profile = Profile::from_json_str(
            r#"{
                "yearsOfExperience": 2.5,
                "education": [{ "gpa": 3.8 }, { "gpa": "3.8/4.0" }]
            }"#,
        )
        .unwrap();

        assert_eq!(profile.years_of_experience.as_ref().unwrap().to_string(), "2.5");
        assert!(matches!(profile.education[0].gpa, Some(NumberOrText::Number(_))));
        assert_eq!(profile.education[0].gpa.as_ref().unwrap().to_string(), "3.8");
        assert_eq!(
            profile.education[1].gpa,
            Some(NumberOrText::Text("3.8/4.0".to_string()))
        );

        let err = Profile::from_json_str(r#"{ "yearsOfExperience": [1] }"#).unwrap_err();
        assert!(matches!(err, JobfillError::Profile(_)));
    }

    #[test]
    fn test_invalid_json_is_profile_error() {
        let err = Profile::from_json_str("{ not json").unwrap_err();
        assert!(matches!(err, JobfillError::Profile(_)));
    }
}
