use axum::body::Bytes;
use axum::response::Response;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use webnotas_core::{CompanyId, DomainResult, JobId, JobStatus, NewCompany};

use crate::app::errors;

// -------------------------
// Request DTOs
// -------------------------

/// Body of `POST /api/companies`. Every field may be absent; validation happens in
/// [`NewCompany::new`] so that a missing name and a blank one fail the same way.
#[derive(Debug, Default, Deserialize)]
pub struct CreateCompanyRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub cnpj: Option<String>,
    #[serde(default)]
    pub strategy: Option<String>,
    #[serde(default)]
    pub cert_alias: Option<String>,
}

impl CreateCompanyRequest {
    pub fn into_new_company(self) -> DomainResult<NewCompany> {
        NewCompany::new(
            self.name.as_deref().unwrap_or_default(),
            self.cnpj.as_deref().unwrap_or_default(),
            self.strategy.as_deref(),
            self.cert_alias.as_deref(),
        )
    }
}

/// `?company_id=` filter. Kept as a string so a bad value gets our own 400 body.
#[derive(Debug, Default, Deserialize)]
pub struct CompanyFilter {
    pub company_id: Option<String>,
}

impl CompanyFilter {
    /// `None` when absent or blank.
    pub fn parse(&self) -> Result<Option<CompanyId>, Response> {
        match self.company_id.as_deref().map(str::trim) {
            None | Some("") => Ok(None),
            Some(raw) => parse_company_id(raw).map(Some),
        }
    }
}

// -------------------------
// Response DTOs
// -------------------------

#[derive(Debug, Serialize)]
pub struct CompanyCreated {
    pub id: CompanyId,
}

#[derive(Debug, Serialize)]
pub struct SyncAccepted {
    pub job_id: JobId,
    pub status: JobStatus,
}

// -------------------------
// Parsing helpers
// -------------------------

/// Decode a JSON request body. An empty body reads as `{}`.
pub fn parse_json_body<T: DeserializeOwned>(body: &Bytes) -> Result<T, Response> {
    let raw: &[u8] = if body.is_empty() { b"{}" } else { body };
    serde_json::from_slice(raw).map_err(|e| {
        errors::json_error(
            axum::http::StatusCode::BAD_REQUEST,
            "invalid_json",
            format!("invalid JSON body: {e}"),
        )
    })
}

pub fn parse_company_id(raw: &str) -> Result<CompanyId, Response> {
    raw.parse::<CompanyId>().map_err(errors::domain_error_to_response)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_body_reads_as_empty_object() {
        let req: CreateCompanyRequest = parse_json_body(&Bytes::new()).unwrap();
        assert!(req.name.is_none());
        assert!(req.cnpj.is_none());
    }

    #[test]
    fn malformed_body_is_rejected() {
        let res = parse_json_body::<CreateCompanyRequest>(&Bytes::from_static(b"{\"name\":")).unwrap_err();
        assert_eq!(res.status(), axum::http::StatusCode::BAD_REQUEST);
    }

    #[test]
    fn missing_name_fails_validation() {
        let req = CreateCompanyRequest {
            cnpj: Some("12.345.678/0001-99".into()),
            ..Default::default()
        };
        assert!(req.into_new_company().is_err());
    }

    #[test]
    fn blank_filter_means_unfiltered() {
        let filter = CompanyFilter {
            company_id: Some("  ".into()),
        };
        assert_eq!(filter.parse().unwrap(), None);

        let filter = CompanyFilter {
            company_id: Some("7".into()),
        };
        assert_eq!(filter.parse().unwrap(), Some(CompanyId::new(7)));

        let filter = CompanyFilter {
            company_id: Some("seven".into()),
        };
        assert!(filter.parse().is_err());
    }
}
