use axum::{
    Json, Router,
    extract::{Query, State},
    http::StatusCode,
    routing::get,
};
use serde_json::{Value, json};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use facsearch::client::*;

mod test_helpers {
    use super::*;

    /// Query strings the fake search API has seen, in order.
    pub type Seen = Arc<Mutex<Vec<Vec<(String, String)>>>>;

    pub fn sample_body() -> Value {
        json!({
            "results": [{
                "name": "Ada Lovelace",
                "school": "SEAS",
                "department": "Computer Science",
                "about": "Works on analytical engines.",
                "emails": "ada@example.edu",
                "profile_url": "https://engineering.example.edu/ada",
                "projects": [{
                    "project_number": "R01GM000001",
                    "abstract": "Engines.",
                    "relevant_terms": "<Engines><Notes>",
                    "start_date": "Tue, 05 Jan 2021 00:00:00 GMT",
                    "end_date": "Fri, 31 Dec 2021 00:00:00 GMT",
                    "agency_ic_admin": "NIGMS",
                    "activity_code": "R01"
                }]
            }]
        })
    }

    /// Starts a fake search API on an ephemeral port and returns its base URL.
    pub async fn spawn_api(router: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{addr}")
    }

    pub async fn spawn_recording_api() -> (String, Seen) {
        let seen: Seen = Arc::new(Mutex::new(Vec::new()));
        let router = Router::new()
            .route(
                "/api/search",
                get(
                    |State(seen): State<Seen>, Query(params): Query<Vec<(String, String)>>| async move {
                        seen.lock().unwrap().push(params);
                        Json(sample_body())
                    },
                ),
            )
            .with_state(seen.clone());
        (spawn_api(router).await, seen)
    }

    pub fn client(base: &str) -> SearchClient {
        SearchClient::new(base, Duration::from_secs(5)).unwrap()
    }
}

use test_helpers::*;

#[cfg(test)]
mod url_building {
    use super::*;

    fn base() -> reqwest::Url {
        parse_base_url("http://127.0.0.1:5000").unwrap()
    }

    #[test]
    fn test_empty_department_is_omitted() {
        let form = SearchForm::new()
            .with("school", "SEAS")
            .with("department", "");
        let url = search_url(&base(), &form).unwrap();
        assert_eq!(url.as_str(), "http://127.0.0.1:5000/api/search?school=SEAS");
    }

    #[test]
    fn test_no_params_no_question_mark() {
        let form = SearchForm::new().with("school", "").with("department", "");
        let url = search_url(&base(), &form).unwrap();
        assert_eq!(url.as_str(), "http://127.0.0.1:5000/api/search");
    }

    #[test]
    fn test_values_are_encoded_in_field_order() {
        let form = SearchForm::new()
            .with("department", "Computer Science")
            .with("query", "graph & networks")
            .with("limit", "5");
        let url = search_url(&base(), &form).unwrap();
        assert_eq!(
            url.as_str(),
            "http://127.0.0.1:5000/api/search?department=Computer+Science&query=graph+%26+networks&limit=5"
        );
    }

    #[test]
    fn test_base_with_path_prefix() {
        let base = parse_base_url("http://example.edu/facsearch/").unwrap();
        let url = search_url(&base, &SearchForm::new().with("school", "SEAS")).unwrap();
        assert_eq!(url.as_str(), "http://example.edu/facsearch/api/search?school=SEAS");
    }

    #[test]
    fn test_base_prefix_without_trailing_slash() {
        let base = parse_base_url("http://example.edu/facsearch").unwrap();
        assert_eq!(base.as_str(), "http://example.edu/facsearch/");
        let url = search_url(&base, &SearchForm::new().with("school", "SEAS")).unwrap();
        assert_eq!(url.as_str(), "http://example.edu/facsearch/api/search?school=SEAS");
    }
}

#[tokio::test]
async fn test_search_sends_only_filled_fields() {
    let (base, seen) = spawn_recording_api().await;
    let form = SearchForm::new()
        .with("school", "SEAS")
        .with("department", "");

    let response = client(&base).search(&form).await.unwrap();
    assert_eq!(response.results.len(), 1);

    let seen = seen.lock().unwrap();
    assert_eq!(
        *seen,
        vec![vec![("school".to_string(), "SEAS".to_string())]]
    );
}

#[tokio::test]
async fn test_search_decodes_faculty_and_projects() {
    let (base, _) = spawn_recording_api().await;
    let response = client(&base).search(&SearchForm::new()).await.unwrap();

    let ada = &response.results[0];
    assert_eq!(ada.name, "Ada Lovelace");
    assert_eq!(ada.emails, vec!["ada@example.edu"]);
    let projects = ada.projects.as_ref().unwrap();
    assert_eq!(projects[0].abstract_text, "Engines.");
    assert_eq!(
        facsearch::render::render_project(&projects[0]).dates,
        "January 5, 2021 — December 31, 2021"
    );
}

#[tokio::test]
async fn test_non_json_body_is_a_decode_error() {
    let router = Router::new().route("/api/search", get(|| async { "<html>oops</html>" }));
    let base = spawn_api(router).await;
    let err = client(&base).search(&SearchForm::new()).await.unwrap_err();
    assert!(matches!(err, SearchError::Decode(_)), "got {err:?}");
}

#[tokio::test]
async fn test_http_error_status() {
    let router = Router::new().route(
        "/api/search",
        get(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "boom") }),
    );
    let base = spawn_api(router).await;
    let err = client(&base).search(&SearchForm::new()).await.unwrap_err();
    match err {
        SearchError::Status { status, url } => {
            assert_eq!(status, 500);
            assert!(url.ends_with("/api/search"));
        }
        other => panic!("expected status error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_unreachable_api_is_a_network_error() {
    // Bind and drop to get a port nobody is listening on.
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let err = client(&format!("http://{addr}"))
        .search(&SearchForm::new())
        .await
        .unwrap_err();
    assert!(matches!(err, SearchError::Network(_)), "got {err:?}");
}
