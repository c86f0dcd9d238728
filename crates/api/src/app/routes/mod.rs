use axum::{
    routing::{get, post},
    Router,
};

pub mod assets;
pub mod companies;
pub mod documents;
pub mod jobs;
pub mod sync;
pub mod system;

/// Router for the JSON API, mounted under `/api`.
pub fn router() -> Router {
    Router::new()
        .route(
            "/companies",
            get(companies::list_companies).post(companies::create_company),
        )
        .route("/jobs", get(jobs::list_jobs))
        .route("/documents", get(documents::list_documents))
        .route("/sync/:company_id", post(sync::start_sync))
}
