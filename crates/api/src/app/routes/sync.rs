use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{Extension, Path},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};

use webnotas_core::JobStatus;

use crate::app::services::AppServices;
use crate::app::{dto, errors};

/// `POST /api/sync/:company_id`: queue a sync and answer before it runs.
///
/// The body carries no fields but must still be valid JSON (or empty).
pub async fn start_sync(
    Extension(services): Extension<Arc<AppServices>>,
    Path(company_id): Path<String>,
    body: Bytes,
) -> Response {
    if let Err(res) = dto::parse_json_body::<serde_json::Value>(&body) {
        return res;
    }

    let company_id = match dto::parse_company_id(&company_id) {
        Ok(id) => id,
        Err(res) => return res,
    };

    match services.engine.submit(company_id).await {
        Ok(job_id) => (
            StatusCode::ACCEPTED,
            Json(dto::SyncAccepted {
                job_id,
                status: JobStatus::Queued,
            }),
        )
            .into_response(),
        Err(e) => errors::engine_error_to_response(e),
    }
}
