//! `webnotas-core`: domain model for companies, sync jobs and documents.
//!
//! This crate contains **pure domain** types (no infrastructure concerns).
//! Persistence lives in `webnotas-infra`, transport in `webnotas-api`.

pub mod company;
pub mod document;
pub mod error;
pub mod id;
pub mod job;

pub use company::{Company, NewCompany, TaxId, DEFAULT_REGION, DEFAULT_STRATEGY};
pub use document::{Direction, Document, NewDocument};
pub use error::{DomainError, DomainResult};
pub use id::{CompanyId, DocumentId, JobId};
pub use job::{Job, JobStatus, JobUpdate};
