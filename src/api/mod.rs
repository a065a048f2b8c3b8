use axum::{Router, routing::get};
use std::sync::Arc;
use tokio::sync::Mutex;
use tower_http::cors::{Any, CorsLayer};

use crate::catalog::Catalog;
use crate::client::{SearchClient, SearchForm};
use crate::view::ViewState;

pub mod handlers;
pub mod models;

/// The single page session: current view plus the form as last submitted.
#[derive(Debug, Default)]
pub struct Session {
    pub view: ViewState,
    pub form: SearchForm,
}

pub struct AppState {
    pub client: SearchClient,
    pub catalog: Arc<Catalog>,
    pub session: Mutex<Session>,
}

impl AppState {
    pub fn new(client: SearchClient, catalog: Arc<Catalog>) -> AppState {
        AppState {
            client,
            catalog,
            session: Mutex::new(Session::default()),
        }
    }
}

pub fn create_router(state: Arc<AppState>) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(handlers::index_handler))
        .route("/search", get(handlers::search_handler))
        .route("/detail/:index", get(handlers::detail_handler))
        .route("/back", get(handlers::back_handler))
        .route("/reset", get(handlers::reset_handler))
        .route("/api/departments", get(handlers::departments_handler))
        .with_state(state)
        .layer(cors)
}
