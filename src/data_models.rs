use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Body of `GET /api/search`.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct SearchResponse {
    pub results: Vec<FacultyResult>,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct FacultyResult {
    #[serde(default, deserialize_with = "lenient_string")]
    pub name: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub school: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub department: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub about: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub profile_url: String,
    #[serde(default, deserialize_with = "lenient_emails")]
    pub emails: Vec<String>,
    // None means the backend sent no project list at all, which is rendered
    // differently from an empty one.
    #[serde(default, deserialize_with = "lenient_projects")]
    pub projects: Option<Vec<ProjectResult>>,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct ProjectResult {
    #[serde(default, deserialize_with = "lenient_string")]
    pub project_number: String,
    #[serde(rename = "abstract", default, deserialize_with = "lenient_string")]
    pub abstract_text: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub relevant_terms: String,
    #[serde(default, deserialize_with = "lenient_opt_string")]
    pub start_date: Option<String>,
    #[serde(default, deserialize_with = "lenient_opt_string")]
    pub end_date: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub agency_ic_admin: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub activity_code: String,
}

impl SearchResponse {
    pub fn from_json(body: &str) -> serde_json::Result<SearchResponse> {
        serde_json::from_str(body)
    }
}

// The response shape is controlled by the backend, so every field decodes
// to something renderable instead of failing the whole payload.

fn lenient_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) => s,
        _ => String::new(),
    })
}

fn lenient_opt_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) => Some(s),
        _ => None,
    })
}

fn lenient_emails<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let emails = match Value::deserialize(deserializer)? {
        Value::String(s) => s.split(',').map(|e| e.trim().to_string()).collect(),
        Value::Array(items) => items
            .into_iter()
            .filter_map(|v| match v {
                Value::String(s) => Some(s.trim().to_string()),
                _ => None,
            })
            .collect(),
        _ => Vec::new(),
    };
    Ok(emails.into_iter().filter(|e: &String| !e.is_empty()).collect())
}

fn lenient_projects<'de, D>(deserializer: D) -> Result<Option<Vec<ProjectResult>>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Array(items) => Some(
            items
                .into_iter()
                .filter(Value::is_object)
                .filter_map(|v| serde_json::from_value(v).ok())
                .collect(),
        ),
        _ => None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_and_mistyped_fields_become_empty() {
        let body = r#"{"results": [{"name": "Ada", "about": 42, "school": null}]}"#;
        let response = SearchResponse::from_json(body).unwrap();
        let faculty = &response.results[0];
        assert_eq!(faculty.name, "Ada");
        assert_eq!(faculty.about, "");
        assert_eq!(faculty.school, "");
        assert_eq!(faculty.department, "");
        assert!(faculty.projects.is_none());
        assert!(faculty.emails.is_empty());
    }

    #[test]
    fn test_projects_absent_vs_empty() {
        let absent: FacultyResult = serde_json::from_str(r#"{"name": "A"}"#).unwrap();
        let empty: FacultyResult = serde_json::from_str(r#"{"name": "A", "projects": []}"#).unwrap();
        let bogus: FacultyResult =
            serde_json::from_str(r#"{"name": "A", "projects": "none"}"#).unwrap();
        assert_eq!(absent.projects, None);
        assert_eq!(empty.projects, Some(vec![]));
        assert_eq!(bogus.projects, None);
    }

    #[test]
    fn test_project_fields() {
        let body = r#"{
            "project_number": "R01GM1",
            "abstract": "Study of things",
            "relevant_terms": "<A><B>",
            "start_date": "2021-01-05",
            "end_date": null,
            "agency_ic_admin": "NIGMS",
            "activity_code": ["R01"]
        }"#;
        let project: ProjectResult = serde_json::from_str(body).unwrap();
        assert_eq!(project.abstract_text, "Study of things");
        assert_eq!(project.relevant_terms, "<A><B>");
        assert_eq!(project.start_date.as_deref(), Some("2021-01-05"));
        assert_eq!(project.end_date, None);
        assert_eq!(project.activity_code, "");
    }

    #[test]
    fn test_emails_string_or_list() {
        let from_str: FacultyResult =
            serde_json::from_str(r#"{"emails": "a@x.edu, b@x.edu,"}"#).unwrap();
        let from_list: FacultyResult =
            serde_json::from_str(r#"{"emails": ["a@x.edu", 3, " "]}"#).unwrap();
        assert_eq!(from_str.emails, vec!["a@x.edu", "b@x.edu"]);
        assert_eq!(from_list.emails, vec!["a@x.edu"]);
    }

    #[test]
    fn test_non_array_results_is_an_error() {
        assert!(SearchResponse::from_json(r#"{"results": 3}"#).is_err());
        assert!(SearchResponse::from_json("<html>").is_err());
    }
}
