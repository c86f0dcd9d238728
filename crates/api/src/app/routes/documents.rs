use std::sync::Arc;

use axum::{
    extract::{rejection::QueryRejection, Extension, Query},
    response::{IntoResponse, Response},
    Json,
};

use crate::app::services::AppServices;
use crate::app::{dto, errors};

/// `GET /api/documents?company_id=`; the filter is mandatory.
pub async fn list_documents(
    Extension(services): Extension<Arc<AppServices>>,
    query: Result<Query<dto::CompanyFilter>, QueryRejection>,
) -> Response {
    let Query(filter) = match query {
        Ok(q) => q,
        Err(e) => return errors::bad_request(e.body_text()),
    };
    let company_id = match filter.parse() {
        Ok(Some(id)) => id,
        Ok(None) => return errors::bad_request("company_id is required"),
        Err(res) => return res,
    };

    match services.store.list_documents(company_id).await {
        Ok(docs) => Json(docs).into_response(),
        Err(e) => errors::store_error_to_response(e),
    }
}
