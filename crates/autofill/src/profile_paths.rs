//! Canonical field paths to profile storage properties.
//!
//! Mapping datasets speak `ProfileFieldPath`; the profile record uses its own
//! property names. The table below is the only place the two meet.

use jobfill_core::{Profile, ProfileFieldPath, ProfileValue};
use serde_json::Value;

enum Source {
    /// Dot path into the serialized profile; numeric segments index arrays
    Property(&'static str),
    /// First and last name joined
    FullName,
    /// Property of the current (or most recent) position
    CurrentExperience(&'static str),
}

fn source(path: ProfileFieldPath) -> Source {
    use ProfileFieldPath::*;
    match path {
        FirstName => Source::Property("personal.firstName"),
        LastName => Source::Property("personal.lastName"),
        FullName => Source::FullName,
        PreferredName => Source::Property("personal.preferredName"),
        Email => Source::Property("personal.email"),
        Phone => Source::Property("personal.phone"),
        Street => Source::Property("personal.location.street"),
        City => Source::Property("personal.location.city"),
        State => Source::Property("personal.location.region"),
        ZipCode => Source::Property("personal.location.postalCode"),
        Country => Source::Property("personal.location.country"),
        LinkedIn => Source::Property("links.linkedinUrl"),
        GitHub => Source::Property("links.githubUrl"),
        Portfolio => Source::Property("links.portfolioUrl"),
        Website => Source::Property("links.websiteUrl"),
        CurrentCompany => Source::CurrentExperience("company"),
        CurrentTitle => Source::CurrentExperience("title"),
        YearsOfExperience => Source::Property("yearsOfExperience"),
        School => Source::Property("education.0.institution"),
        Degree => Source::Property("education.0.degree"),
        FieldOfStudy => Source::Property("education.0.major"),
        GraduationYear => Source::Property("education.0.endDate"),
        Gpa => Source::Property("education.0.gpa"),
        Skills => Source::Property("skills"),
        Certifications => Source::Property("certifications"),
        Languages => Source::Property("languages"),
        WorkAuthorized => Source::Property("authorization.legallyAuthorized"),
        RequiresSponsorship => Source::Property("authorization.requiresSponsorship"),
        VisaStatus => Source::Property("authorization.visaStatus"),
        Gender => Source::Property("selfIdentification.gender"),
        Ethnicity => Source::Property("selfIdentification.ethnicity"),
        VeteranStatus => Source::Property("selfIdentification.veteranStatus"),
        DisabilityStatus => Source::Property("selfIdentification.disabilityStatus"),
    }
}

/// A profile prepared for path lookups
#[derive(Debug, Clone)]
pub struct ProfileView {
    root: Value,
    current_experience: Value,
}

impl ProfileView {
    pub fn new(profile: &Profile) -> Self {
        let current_experience = profile
            .current_experience()
            .and_then(|e| serde_json::to_value(e).ok())
            .unwrap_or_default();

        Self {
            root: serde_json::to_value(profile).unwrap_or_default(),
            current_experience,
        }
    }

    /// Value for `path`, or `None` when the profile has nothing usable
    pub fn resolve(&self, path: ProfileFieldPath) -> Option<ProfileValue> {
        let value = match source(path) {
            Source::Property(property) => lookup(&self.root, property).and_then(to_profile_value),
            Source::CurrentExperience(property) => {
                lookup(&self.current_experience, property).and_then(to_profile_value)
            }
            Source::FullName => {
                let parts: Vec<String> = ["personal.firstName", "personal.lastName"]
                    .iter()
                    .filter_map(|p| lookup(&self.root, p).and_then(to_profile_value))
                    .map(|v| v.render().trim().to_string())
                    .filter(|s| !s.is_empty())
                    .collect();
                Some(ProfileValue::Text(parts.join(" ")))
            }
        };

        value.filter(|v| !v.is_empty())
    }
}

fn lookup<'a>(root: &'a Value, property: &str) -> Option<&'a Value> {
    property.split('.').try_fold(root, |node, segment| match node {
        Value::Object(map) => map.get(segment),
        Value::Array(items) => segment.parse::<usize>().ok().and_then(|i| items.get(i)),
        _ => None,
    })
}

fn to_profile_value(value: &Value) -> Option<ProfileValue> {
    match value {
        Value::String(s) => Some(ProfileValue::Text(s.clone())),
        Value::Bool(b) => Some(ProfileValue::Flag(*b)),
        Value::Number(n) => Some(ProfileValue::Text(n.to_string())),
        Value::Array(items) => Some(ProfileValue::List(
            items
                .iter()
                .filter_map(|item| match item {
                    Value::String(s) => Some(s.clone()),
                    Value::Number(n) => Some(n.to_string()),
                    _ => None,
                })
                .collect(),
        )),
        Value::Null | Value::Object(_) => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Profile {
        Profile::from_json_str(
            r#"{
                "personal": {
                    "firstName": "Jane",
                    "lastName": "Doe",
                    "email": "jane@example.com",
                    "phone": "",
                    "location": { "region": "CA", "postalCode": "94107" }
                },
                "yearsOfExperience": 7,
                "experience": [
                    { "company": "Old Co", "title": "Engineer" },
                    { "company": "Current Co", "title": "Staff Engineer", "current": true }
                ],
                "education": [{ "institution": "MIT", "endDate": "2016-06-01" }],
                "skills": ["Rust", "Go"],
                "authorization": { "legallyAuthorized": true, "requiresSponsorship": false }
            }"#,
        )
        .unwrap()
    }

    #[test]
    fn test_every_path_has_a_source() {
        let view = ProfileView::new(&Profile::default());
        for path in ProfileFieldPath::ALL {
            assert_eq!(view.resolve(*path), None, "{} should be empty", path);
        }
    }

    #[test]
    fn test_remapped_properties() {
        let view = ProfileView::new(&sample());
        let text = |p| view.resolve(p).map(|v| v.render());

        assert_eq!(text(ProfileFieldPath::FirstName).as_deref(), Some("Jane"));
        assert_eq!(text(ProfileFieldPath::State).as_deref(), Some("CA"));
        assert_eq!(text(ProfileFieldPath::ZipCode).as_deref(), Some("94107"));
        assert_eq!(text(ProfileFieldPath::School).as_deref(), Some("MIT"));
        assert_eq!(text(ProfileFieldPath::GraduationYear).as_deref(), Some("2016-06-01"));
        assert_eq!(text(ProfileFieldPath::YearsOfExperience).as_deref(), Some("7"));
        assert_eq!(text(ProfileFieldPath::Skills).as_deref(), Some("Rust, Go"));
    }

    #[test]
    fn test_derived_values() {
        let view = ProfileView::new(&sample());
        assert_eq!(
            view.resolve(ProfileFieldPath::FullName),
            Some(ProfileValue::Text("Jane Doe".to_string()))
        );
        assert_eq!(
            view.resolve(ProfileFieldPath::CurrentCompany),
            Some(ProfileValue::Text("Current Co".to_string()))
        );
        assert_eq!(
            view.resolve(ProfileFieldPath::RequiresSponsorship),
            Some(ProfileValue::Flag(false))
        );
    }

    #[test]
    fn test_numeric_quantities_render_as_written() {
        let profile = Profile::from_json_str(
            r#"{ "yearsOfExperience": 2.5, "education": [{ "gpa": 3.8 }] }"#,
        )
        .unwrap();
        let view = ProfileView::new(&profile);

        assert_eq!(
            view.resolve(ProfileFieldPath::Gpa),
            Some(ProfileValue::Text("3.8".to_string()))
        );
        assert_eq!(
            view.resolve(ProfileFieldPath::YearsOfExperience),
            Some(ProfileValue::Text("2.5".to_string()))
        );
    }

    #[test]
    fn test_empty_and_missing_are_none() {
        let view = ProfileView::new(&sample());
        assert_eq!(view.resolve(ProfileFieldPath::Phone), None);
        assert_eq!(view.resolve(ProfileFieldPath::GitHub), None);
        assert_eq!(view.resolve(ProfileFieldPath::Certifications), None);
        assert_eq!(view.resolve(ProfileFieldPath::Degree), None);
    }

    #[test]
    fn test_lookup_indexes_arrays() {
        let value: Value = serde_json::json!({ "a": [{ "b": 1 }, { "b": 2 }] });
        assert_eq!(lookup(&value, "a.1.b"), Some(&Value::from(2)));
        assert_eq!(lookup(&value, "a.x.b"), None);
        assert_eq!(lookup(&value, "a.5.b"), None);
    }
}
