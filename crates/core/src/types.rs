use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::JobfillError;

/// Kinds of form controls the engine distinguishes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    Text,
    Email,
    Tel,
    Textarea,
    Select,
    Checkbox,
    Radio,
    File,
    Hidden,
    Date,
}

impl FieldType {
    pub fn as_str(&self) -> &'static str {
        match self {
            FieldType::Text => "text",
            FieldType::Email => "email",
            FieldType::Tel => "tel",
            FieldType::Textarea => "textarea",
            FieldType::Select => "select",
            FieldType::Checkbox => "checkbox",
            FieldType::Radio => "radio",
            FieldType::File => "file",
            FieldType::Hidden => "hidden",
            FieldType::Date => "date",
        }
    }

    /// Infer the field type from a tag name and, for inputs, the `type` attribute.
    /// Anything unrecognized is treated as plain text.
    pub fn infer(tag_name: &str, input_type: Option<&str>) -> Self {
        match tag_name.to_ascii_lowercase().as_str() {
            "textarea" => FieldType::Textarea,
            "select" => FieldType::Select,
            "input" => {
                let input_type = input_type.map(|t| t.trim().to_ascii_lowercase());
                match input_type.as_deref() {
                    Some("email") => FieldType::Email,
                    Some("tel") => FieldType::Tel,
                    Some("checkbox") => FieldType::Checkbox,
                    Some("radio") => FieldType::Radio,
                    Some("file") => FieldType::File,
                    Some("hidden") => FieldType::Hidden,
                    Some("date") => FieldType::Date,
                    _ => FieldType::Text,
                }
            }
            _ => FieldType::Text,
        }
    }

    /// Controls filled by focus, assignment and input/change notifications
    pub fn is_text_like(&self) -> bool {
        matches!(
            self,
            FieldType::Text
                | FieldType::Email
                | FieldType::Tel
                | FieldType::Textarea
                | FieldType::Hidden
                | FieldType::Date
        )
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// Coarse estimate of how certain the detector is about a located element
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Confidence {
    Low,
    Medium,
    High,
}

impl fmt::Display for Confidence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Confidence::Low => f.pad("low"),
            Confidence::Medium => f.pad("medium"),
            Confidence::High => f.pad("high"),
        }
    }
}

macro_rules! profile_field_paths {
    ($($variant:ident => $path:literal),+ $(,)?) => {
        /// Canonical dot-path naming one semantic profile attribute.
        ///
        /// These names are stable across storage layouts; the autofill crate
        /// translates them to the profile's actual property names.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        pub enum ProfileFieldPath {
            $(
                #[serde(rename = $path)]
                $variant,
            )+
        }

        impl ProfileFieldPath {
            pub const ALL: &'static [ProfileFieldPath] = &[$(ProfileFieldPath::$variant,)+];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $(ProfileFieldPath::$variant => $path,)+
                }
            }
        }
    };
}

profile_field_paths! {
    FirstName => "personalInfo.firstName",
    LastName => "personalInfo.lastName",
    FullName => "personalInfo.fullName",
    PreferredName => "personalInfo.preferredName",
    Email => "personalInfo.email",
    Phone => "personalInfo.phone",
    Street => "personalInfo.address.street",
    City => "personalInfo.address.city",
    State => "personalInfo.address.state",
    ZipCode => "personalInfo.address.zipCode",
    Country => "personalInfo.address.country",
    LinkedIn => "professionalLinks.linkedin",
    GitHub => "professionalLinks.github",
    Portfolio => "professionalLinks.portfolio",
    Website => "professionalLinks.website",
    CurrentCompany => "workExperience.currentCompany",
    CurrentTitle => "workExperience.currentTitle",
    YearsOfExperience => "workExperience.yearsOfExperience",
    School => "education.school",
    Degree => "education.degree",
    FieldOfStudy => "education.fieldOfStudy",
    GraduationYear => "education.graduationYear",
    Gpa => "education.gpa",
    Skills => "skills",
    Certifications => "certifications",
    Languages => "languages",
    WorkAuthorized => "workAuthorization.authorized",
    RequiresSponsorship => "workAuthorization.requiresSponsorship",
    VisaStatus => "workAuthorization.visaStatus",
    Gender => "selfIdentification.gender",
    Ethnicity => "selfIdentification.ethnicity",
    VeteranStatus => "selfIdentification.veteranStatus",
    DisabilityStatus => "selfIdentification.disabilityStatus",
}

impl fmt::Display for ProfileFieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for ProfileFieldPath {
    type Err = JobfillError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        ProfileFieldPath::ALL
            .iter()
            .copied()
            .find(|path| path.as_str() == s)
            .ok_or_else(|| JobfillError::UnknownFieldPath(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_infer_field_type() {
        assert_eq!(FieldType::infer("input", Some("email")), FieldType::Email);
        assert_eq!(FieldType::infer("INPUT", Some(" Checkbox ")), FieldType::Checkbox);
        assert_eq!(FieldType::infer("input", None), FieldType::Text);
        assert_eq!(FieldType::infer("input", Some("number")), FieldType::Text);
        assert_eq!(FieldType::infer("select", None), FieldType::Select);
        assert_eq!(FieldType::infer("textarea", Some("email")), FieldType::Textarea);
        assert_eq!(FieldType::infer("div", None), FieldType::Text);
    }

    #[test]
    fn test_profile_field_path_round_trip_through_str() {
        for path in ProfileFieldPath::ALL {
            let parsed: ProfileFieldPath = path.as_str().parse().unwrap();
            assert_eq!(parsed, *path);
        }
        assert!("personalInfo.nickname".parse::<ProfileFieldPath>().is_err());
    }

    #[test]
    fn test_profile_field_path_serde_uses_dot_path() {
        let json = serde_json::to_string(&ProfileFieldPath::ZipCode).unwrap();
        assert_eq!(json, "\"personalInfo.address.zipCode\"");
        let back: ProfileFieldPath = serde_json::from_str("\"selfIdentification.gender\"").unwrap();
        assert_eq!(back, ProfileFieldPath::Gender);
    }

    #[test]
    fn test_confidence_ordering() {
        assert!(Confidence::High > Confidence::Medium);
        assert!(Confidence::Medium > Confidence::Low);
    }
}
