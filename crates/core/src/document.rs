//! Documents produced by sync workers.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::error::DomainError;
use crate::id::{CompanyId, DocumentId};

/// Whether the company received or issued the document.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Inbound,
    Outbound,
}

impl Direction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::Inbound => "inbound",
            Direction::Outbound => "outbound",
        }
    }
}

impl core::fmt::Display for Direction {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl core::str::FromStr for Direction {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "inbound" => Ok(Direction::Inbound),
            "outbound" => Ok(Direction::Outbound),
            other => Err(DomainError::validation(format!("unknown direction: {other}"))),
        }
    }
}

/// A persisted document row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub id: DocumentId,
    pub company_id: CompanyId,
    /// Fiscal document model code ("55" = NF-e, "65" = NFC-e).
    pub model: String,
    pub direction: Direction,
    /// 44-digit access key. Not enforced unique.
    pub chave: String,
    pub issue_date: NaiveDate,
    pub amount: f64,
    /// Where the document body was written.
    pub xml_path: String,
    /// Tag of the worker that produced the document.
    pub source: String,
    pub created_at: DateTime<Utc>,
}

/// A document about to be inserted.
#[derive(Debug, Clone, PartialEq)]
pub struct NewDocument {
    pub company_id: CompanyId,
    pub model: String,
    pub direction: Direction,
    pub chave: String,
    pub issue_date: NaiveDate,
    pub amount: f64,
    pub xml_path: String,
    pub source: String,
}

impl NewDocument {
    pub const KEY_LEN: usize = 44;
}
