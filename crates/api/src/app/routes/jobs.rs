use std::sync::Arc;

use axum::{
    extract::{rejection::QueryRejection, Extension, Query},
    response::{IntoResponse, Response},
    Json,
};

use crate::app::services::AppServices;
use crate::app::{dto, errors};

/// `GET /api/jobs[?company_id=]`, newest first.
pub async fn list_jobs(
    Extension(services): Extension<Arc<AppServices>>,
    query: Result<Query<dto::CompanyFilter>, QueryRejection>,
) -> Response {
    let Query(filter) = match query {
        Ok(q) => q,
        Err(e) => return errors::bad_request(e.body_text()),
    };
    let company_id = match filter.parse() {
        Ok(id) => id,
        Err(res) => return res,
    };

    match services.store.list_jobs(company_id).await {
        Ok(jobs) => Json(jobs).into_response(),
        Err(e) => errors::store_error_to_response(e),
    }
}
