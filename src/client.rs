use reqwest::Url;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

use crate::data_models::SearchResponse;

pub const SEARCH_PATH: &str = "api/search";

#[derive(Debug, Error)]
pub enum SearchError {
    #[error("invalid search API url {url:?}: {reason}")]
    InvalidUrl { url: String, reason: String },
    #[error("search request failed")]
    Network(#[from] reqwest::Error),
    #[error("search API returned HTTP {status} for {url}")]
    Status { status: u16, url: String },
    #[error("search API returned an unreadable body")]
    Decode(#[from] serde_json::Error),
}

/// The fields of the search form, in the order they were filled in.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchForm {
    fields: Vec<(String, String)>,
}

impl SearchForm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: &str, value: &str) -> Self {
        self.set(name, value);
        self
    }

    /// Sets `name`, replacing an earlier value for the same field.
    pub fn set(&mut self, name: &str, value: &str) {
        match self.fields.iter_mut().find(|(n, _)| n == name) {
            Some((_, v)) => *v = value.to_string(),
            None => self.fields.push((name.to_string(), value.to_string())),
        }
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn fields(&self) -> &[(String, String)] {
        &self.fields
    }

    /// Query parameters for the request: empty fields are left out entirely.
    pub fn params(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields
            .iter()
            .filter(|(_, v)| !v.is_empty())
            .map(|(n, v)| (n.as_str(), v.as_str()))
    }
}

impl From<Vec<(String, String)>> for SearchForm {
    fn from(pairs: Vec<(String, String)>) -> Self {
        let mut form = SearchForm::new();
        for (name, value) in pairs {
            form.set(&name, &value);
        }
        form
    }
}

/// Parses the API base URL. The path always ends in `/` so a prefix such as
/// `http://host/facsearch` keeps its last segment when `api/search` is joined.
pub fn parse_base_url(base: &str) -> Result<Url, SearchError> {
    let mut url = Url::parse(base).map_err(|e| SearchError::InvalidUrl {
        url: base.to_string(),
        reason: e.to_string(),
    })?;
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url)
}

/// `<base>/api/search?<non-empty form fields>`
pub fn search_url(base: &Url, form: &SearchForm) -> Result<Url, SearchError> {
    let mut url = base.join(SEARCH_PATH).map_err(|e| SearchError::InvalidUrl {
        url: base.to_string(),
        reason: e.to_string(),
    })?;
    url.set_query(None);

    let mut params = form.params().peekable();
    if params.peek().is_some() {
        url.query_pairs_mut().extend_pairs(params);
    }
    Ok(url)
}

#[derive(Debug, Clone)]
pub struct SearchClient {
    http: reqwest::Client,
    base_url: Url,
}

impl SearchClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<SearchClient, SearchError> {
        let base_url = parse_base_url(base_url)?;
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(SearchClient { http, base_url })
    }

    pub async fn search(&self, form: &SearchForm) -> Result<SearchResponse, SearchError> {
        let url = search_url(&self.base_url, form)?;
        tracing::info!("searching: {url}");

        let res = self.http.get(url.clone()).send().await?;
        let status = res.status();
        if !status.is_success() {
            return Err(SearchError::Status {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        let body = res.text().await?;
        let response = SearchResponse::from_json(&body)?;
        tracing::debug!("{} results from {url}", response.results.len());
        Ok(response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_replaces_in_place() {
        let mut form = SearchForm::new().with("school", "SEAS").with("query", "x");
        form.set("school", "SOM");
        assert_eq!(
            form.fields(),
            &[
                ("school".to_string(), "SOM".to_string()),
                ("query".to_string(), "x".to_string())
            ]
        );
        assert_eq!(form.get("school"), Some("SOM"));
        assert_eq!(form.get("limit"), None);
    }

    #[test]
    fn test_params_skip_empty_values() {
        let form = SearchForm::new()
            .with("school", "SEAS")
            .with("department", "")
            .with("query", " ");
        let params: Vec<_> = form.params().collect();
        assert_eq!(params, vec![("school", "SEAS"), ("query", " ")]);
    }

    #[test]
    fn test_bad_base_url() {
        assert!(matches!(
            parse_base_url("not a url"),
            Err(SearchError::InvalidUrl { .. })
        ));
    }
}
