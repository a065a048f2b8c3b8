use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::Html,
};
use std::sync::Arc;
use std::time::Instant;

use crate::client::SearchForm;
use crate::render::html::page_html;

use super::models::{DepartmentsQuery, DepartmentsResponse};
use super::{AppState, Session};

fn render_page(state: &AppState, session: &mut Session) -> Html<String> {
    let scroll_to_top = session.view.take_scroll_to_top();
    Html(page_html(
        &session.view,
        &state.catalog,
        &session.form,
        scroll_to_top,
    ))
}

pub async fn index_handler(State(state): State<Arc<AppState>>) -> Html<String> {
    let mut session = state.session.lock().await;
    render_page(&state, &mut session)
}

pub async fn search_handler(
    State(state): State<Arc<AppState>>,
    Query(fields): Query<Vec<(String, String)>>,
) -> Html<String> {
    let start = Instant::now();
    let form = SearchForm::from(fields);

    let ticket = {
        let mut session = state.session.lock().await;
        session.form = form.clone();
        session.view.begin_search()
    };

    // Spawned so a dropped request still finishes its ticket. The lock is not
    // held across the remote call.
    let task = {
        let state = state.clone();
        tokio::spawn(async move {
            let result = state.client.search(&form).await;
            let outcome = state.session.lock().await.view.finish_search(ticket, result);
            tracing::info!(
                "search finished in {}ms: {:?}",
                start.elapsed().as_millis(),
                outcome
            );
        })
    };
    if let Err(e) = task.await {
        tracing::error!("search task failed: {e}");
        state.session.lock().await.view.abandon_search(ticket);
    }

    let mut session = state.session.lock().await;
    render_page(&state, &mut session)
}

pub async fn detail_handler(
    State(state): State<Arc<AppState>>,
    Path(index): Path<usize>,
) -> Result<Html<String>, (StatusCode, String)> {
    let mut session = state.session.lock().await;
    session
        .view
        .open_detail(index)
        .map_err(|e| (StatusCode::NOT_FOUND, e.to_string()))?;
    Ok(render_page(&state, &mut session))
}

pub async fn back_handler(State(state): State<Arc<AppState>>) -> Html<String> {
    let mut session = state.session.lock().await;
    session.view.back_to_search();
    render_page(&state, &mut session)
}

pub async fn reset_handler(State(state): State<Arc<AppState>>) -> Html<String> {
    let mut session = state.session.lock().await;
    session.view.reset();
    session.form = SearchForm::default();
    render_page(&state, &mut session)
}

pub async fn departments_handler(
    State(state): State<Arc<AppState>>,
    Query(query): Query<DepartmentsQuery>,
) -> Json<DepartmentsResponse> {
    let departments = state.catalog.departments(&query.school).to_vec();
    Json(DepartmentsResponse {
        school: query.school,
        departments,
    })
}
