use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::Extension,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use tracing::info;

use crate::app::services::AppServices;
use crate::app::{dto, errors};

pub async fn list_companies(Extension(services): Extension<Arc<AppServices>>) -> Response {
    match services.store.list_companies().await {
        Ok(companies) => Json(companies).into_response(),
        Err(e) => errors::store_error_to_response(e),
    }
}

pub async fn create_company(
    Extension(services): Extension<Arc<AppServices>>,
    body: Bytes,
) -> Response {
    let req: dto::CreateCompanyRequest = match dto::parse_json_body(&body) {
        Ok(req) => req,
        Err(res) => return res,
    };

    let company = match req.into_new_company() {
        Ok(c) => c,
        Err(e) => return errors::domain_error_to_response(e),
    };

    match services.store.create_company(company).await {
        Ok(id) => {
            info!(company_id = %id, "company registered");
            (StatusCode::CREATED, Json(dto::CompanyCreated { id })).into_response()
        }
        Err(e) => errors::store_error_to_response(e),
    }
}
