//! Pure rendering of search results into display trees.
//!
//! Nothing in here touches the view environment. The summary list and the
//! detail view are plain values that the binding layer (`view`, `api`) and the
//! markup serializers (`html`, `text`) consume.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::Serialize;

use crate::data_models::{FacultyResult, ProjectResult};

pub mod html;
pub mod text;

/// `about` is cut to this many characters on summary cards only.
pub const ABOUT_SUMMARY_LIMIT: usize = 1000;
/// Abstracts longer than this collapse, in every view.
pub const ABSTRACT_LIMIT: usize = 200;
/// Term lists with at least this many terms collapse.
pub const TERMS_COLLAPSE_AT: usize = 10;

pub const ELLIPSIS: &str = "...";
pub const TERM_DELIMITER: &str = "><";
pub const TERM_SEPARATOR: &str = ", ";
pub const DATE_SEPARATOR: &str = " — ";

/// A field that is either shown as-is or folded behind a short summary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum Disclosure {
    Inline(String),
    Collapsible { summary: String, full: String },
}

impl Disclosure {
    pub fn is_collapsible(&self) -> bool {
        matches!(self, Disclosure::Collapsible { .. })
    }

    /// What is visible before the user expands anything.
    pub fn visible(&self) -> &str {
        match self {
            Disclosure::Inline(text) => text,
            Disclosure::Collapsible { summary, .. } => summary,
        }
    }

    /// What is visible once expanded.
    pub fn full(&self) -> &str {
        match self {
            Disclosure::Inline(text) => text,
            Disclosure::Collapsible { full, .. } => full,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SummaryCard {
    /// Position in the result set; the detail trigger opens this item.
    pub index: usize,
    pub name: String,
    pub school: String,
    pub department: String,
    pub about: String,
    pub profile_url: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SummaryList {
    pub cards: Vec<SummaryCard>,
}

impl SummaryList {
    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProjectBlock {
    pub project_number: String,
    pub abstract_text: Disclosure,
    pub relevant_terms: Disclosure,
    pub dates: String,
    pub agency_ic_admin: String,
    pub activity_code: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DetailView {
    pub index: usize,
    pub name: String,
    pub school: String,
    pub department: String,
    pub about: String,
    pub profile_url: String,
    pub emails: Vec<String>,
    /// `None` when the record carried no project list at all.
    pub projects: Option<Vec<ProjectBlock>>,
}

/// Cuts `text` to `limit` characters and appends an ellipsis, but only when
/// something was actually cut.
pub fn truncate(text: &str, limit: usize) -> String {
    match text.char_indices().nth(limit) {
        Some((cut, _)) => format!("{}{}", &text[..cut], ELLIPSIS),
        None => text.to_string(),
    }
}

pub fn truncate_about(about: &str) -> String {
    truncate(about, ABOUT_SUMMARY_LIMIT)
}

pub fn render_abstract(abstract_text: &str) -> Disclosure {
    if abstract_text.chars().count() > ABSTRACT_LIMIT {
        Disclosure::Collapsible {
            summary: truncate(abstract_text, ABSTRACT_LIMIT),
            full: abstract_text.to_string(),
        }
    } else {
        Disclosure::Inline(abstract_text.to_string())
    }
}

/// Splits the bracketed `"<a><b><c>"` storage form into display terms.
pub fn split_relevant_terms(raw: &str) -> Vec<String> {
    raw.split(TERM_DELIMITER)
        .map(|term| term.chars().filter(|c| *c != '<' && *c != '>').collect::<String>())
        .collect()
}

pub fn render_relevant_terms(raw: &str) -> Disclosure {
    let terms = split_relevant_terms(raw);
    let full = terms.join(TERM_SEPARATOR);
    if terms.len() < TERMS_COLLAPSE_AT {
        return Disclosure::Inline(full);
    }
    let summary = format!(
        "{}{}",
        terms[..TERMS_COLLAPSE_AT].join(TERM_SEPARATOR),
        ELLIPSIS
    );
    Disclosure::Collapsible { summary, full }
}

fn parse_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .or_else(|| DateTime::parse_from_rfc3339(raw).ok().map(|d| d.date_naive()))
        .or_else(|| {
            ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S"]
                .iter()
                .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
                .map(|d| d.date())
        })
        .or_else(|| DateTime::parse_from_rfc2822(raw).ok().map(|d| d.date_naive()))
}

/// Long-form date such as "January 5, 2021".
///
/// Absent dates render empty; dates that do not parse are shown verbatim.
pub fn format_long_date(raw: Option<&str>) -> String {
    match raw {
        None => String::new(),
        Some(raw) => match parse_date(raw) {
            Some(date) => date.format("%B %-d, %Y").to_string(),
            None => raw.to_string(),
        },
    }
}

pub fn format_date_range(start: Option<&str>, end: Option<&str>) -> String {
    format!(
        "{}{}{}",
        format_long_date(start),
        DATE_SEPARATOR,
        format_long_date(end)
    )
}

pub fn render_summary_card(index: usize, item: &FacultyResult) -> SummaryCard {
    SummaryCard {
        index,
        name: item.name.clone(),
        school: item.school.clone(),
        department: item.department.clone(),
        about: truncate_about(&item.about),
        profile_url: item.profile_url.clone(),
    }
}

/// Builds a fresh summary list. The result always replaces whatever was shown
/// before; an empty slice yields an empty list.
pub fn render_summary_list(results: &[FacultyResult]) -> SummaryList {
    SummaryList {
        cards: results
            .iter()
            .enumerate()
            .map(|(index, item)| render_summary_card(index, item))
            .collect(),
    }
}

pub fn render_project(project: &ProjectResult) -> ProjectBlock {
    ProjectBlock {
        project_number: project.project_number.clone(),
        abstract_text: render_abstract(&project.abstract_text),
        relevant_terms: render_relevant_terms(&project.relevant_terms),
        dates: format_date_range(project.start_date.as_deref(), project.end_date.as_deref()),
        agency_ic_admin: project.agency_ic_admin.clone(),
        activity_code: project.activity_code.clone(),
    }
}

pub fn render_detail_view(index: usize, item: &FacultyResult) -> DetailView {
    DetailView {
        index,
        name: item.name.clone(),
        school: item.school.clone(),
        department: item.department.clone(),
        about: item.about.clone(),
        profile_url: item.profile_url.clone(),
        emails: item.emails.clone(),
        projects: item
            .projects
            .as_ref()
            .map(|projects| projects.iter().map(render_project).collect()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_counts_chars_not_bytes() {
        let text = "é".repeat(5);
        assert_eq!(truncate(&text, 5), text);
        assert_eq!(truncate(&text, 3), "ééé...");
    }

    #[test]
    fn test_truncate_zero_limit() {
        assert_eq!(truncate("", 0), "");
        assert_eq!(truncate("a", 0), "...");
    }

    #[test]
    fn test_parse_date_forms() {
        let expected = NaiveDate::from_ymd_opt(2021, 1, 5);
        assert_eq!(parse_date("2021-01-05"), expected);
        assert_eq!(parse_date(" 2021-01-05 "), expected);
        assert_eq!(parse_date("2021-01-05T10:30:00"), expected);
        assert_eq!(parse_date("2021-01-05T10:30:00.250"), expected);
        assert_eq!(parse_date("2021-01-05T10:30:00Z"), expected);
        assert_eq!(parse_date("Tue, 05 Jan 2021 00:00:00 GMT"), expected);
        assert_eq!(parse_date("soon"), None);
    }

    #[test]
    fn test_disclosure_accessors() {
        let inline = Disclosure::Inline("x".into());
        assert!(!inline.is_collapsible());
        assert_eq!(inline.visible(), "x");
        assert_eq!(inline.full(), "x");

        let folded = Disclosure::Collapsible {
            summary: "x...".into(),
            full: "xyz".into(),
        };
        assert!(folded.is_collapsible());
        assert_eq!(folded.visible(), "x...");
        assert_eq!(folded.full(), "xyz");
    }
}
