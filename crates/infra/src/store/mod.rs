//! SQLite-backed store for companies, jobs and documents.
//!
//! ## Design
//!
//! - One embedded database file, opened through a `sqlx` connection pool
//! - `Store` is a cheap `Clone` handle, passed explicitly to whoever needs it
//! - Every single-row write is one statement, hence atomic
//! - Per-job document writes go through a [`SyncBatch`] (one transaction)
//!
//! Readers never take locks beyond SQLite's own; with WAL enabled they see the
//! last committed state while a batch is still open.
//!
//! A batch holds SQLite's single write lock from its first insert until it is
//! finished or dropped, which covers the worker's whole run including any I/O it
//! does between inserts. Every other writer (company registration, other jobs'
//! status updates) waits behind it for up to the 5 s busy timeout, so a worker
//! that talks to a slow remote provider should fetch first and insert last.

use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions, SqliteRow};
use sqlx::Row;
use tracing::debug;

use webnotas_core::{
    Company, CompanyId, Direction, Document, DocumentId, Job, JobId, JobStatus, TaxId,
};

mod batch;
mod companies;
mod documents;
mod jobs;

pub use batch::SyncBatch;

/// Most recent jobs returned when listing one company's jobs.
pub const COMPANY_JOBS_LIMIT: i64 = 20;
/// Most recent jobs returned when listing across companies.
pub const ALL_JOBS_LIMIT: i64 = 50;
/// Most recent documents returned per company.
pub const DOCUMENTS_LIMIT: i64 = 200;

const SCHEMA: [&str; 3] = [
    r#"
    CREATE TABLE IF NOT EXISTS companies (
        id          INTEGER PRIMARY KEY AUTOINCREMENT,
        name        TEXT NOT NULL,
        cnpj        TEXT NOT NULL UNIQUE,
        state       TEXT NOT NULL DEFAULT 'GO',
        strategy    TEXT NOT NULL DEFAULT 'api',
        cert_alias  TEXT,
        created_at  TEXT NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS jobs (
        id              INTEGER PRIMARY KEY AUTOINCREMENT,
        company_id      INTEGER NOT NULL,
        status          TEXT NOT NULL,
        started_at      TEXT,
        finished_at     TEXT,
        message         TEXT,
        total_documents INTEGER NOT NULL DEFAULT 0,
        FOREIGN KEY (company_id) REFERENCES companies(id)
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS documents (
        id          INTEGER PRIMARY KEY AUTOINCREMENT,
        company_id  INTEGER NOT NULL,
        model       TEXT NOT NULL,
        direction   TEXT NOT NULL,
        chave       TEXT NOT NULL,
        issue_date  TEXT NOT NULL,
        amount      REAL NOT NULL,
        xml_path    TEXT NOT NULL,
        source      TEXT NOT NULL,
        created_at  TEXT NOT NULL,
        FOREIGN KEY (company_id) REFERENCES companies(id)
    )
    "#,
];

/// Store error.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("duplicate key: {0}")]
    DuplicateKey(String),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("conflict: {0}")]
    Conflict(String),
    #[error("corrupt row: {0}")]
    Corrupt(String),
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Handle to the embedded database.
#[derive(Debug, Clone)]
pub struct Store {
    pool: SqlitePool,
}

impl Store {
    /// Open (creating if missing) the database file at `path` and apply the schema.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }

        let options = SqliteConnectOptions::new().filename(path);
        Self::connect_with(options).await
    }

    /// Open a database from a `sqlite://` URL.
    pub async fn connect(url: &str) -> Result<Self, StoreError> {
        let options = SqliteConnectOptions::from_str(url)?;
        Self::connect_with(options).await
    }

    async fn connect_with(options: SqliteConnectOptions) -> Result<Self, StoreError> {
        let options = options
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .foreign_keys(true)
            .busy_timeout(Duration::from_secs(5));

        let pool = SqlitePoolOptions::new()
            .max_connections(16)
            .connect_with(options)
            .await?;

        let store = Self { pool };
        store.migrate().await?;
        Ok(store)
    }

    /// Create the tables if they do not exist yet.
    pub async fn migrate(&self) -> Result<(), StoreError> {
        for ddl in SCHEMA {
            sqlx::query(ddl).execute(&self.pool).await?;
        }
        debug!("store schema ready");
        Ok(())
    }

    /// Close the pool, waiting for checked-out connections to be returned.
    pub async fn close(&self) {
        self.pool.close().await;
    }
}

/// Map unique/foreign key violations onto store errors.
fn classify(err: sqlx::Error, what: impl FnOnce() -> String) -> StoreError {
    match &err {
        sqlx::Error::Database(db) if db.is_unique_violation() => StoreError::DuplicateKey(what()),
        sqlx::Error::Database(db) if db.is_foreign_key_violation() => StoreError::NotFound(what()),
        _ => StoreError::Database(err),
    }
}

fn corrupt(column: &str, err: impl std::fmt::Display) -> StoreError {
    StoreError::Corrupt(format!("{column}: {err}"))
}

fn company_from_row(row: &SqliteRow) -> Result<Company, StoreError> {
    let tax_id: String = row.try_get("cnpj")?;
    Ok(Company {
        id: CompanyId::new(row.try_get("id")?),
        name: row.try_get("name")?,
        tax_id: TaxId::parse(&tax_id).map_err(|e| corrupt("cnpj", e))?,
        region: row.try_get("state")?,
        strategy: row.try_get("strategy")?,
        credential_alias: row.try_get("cert_alias")?,
        created_at: row.try_get("created_at")?,
    })
}

fn job_from_row(row: &SqliteRow) -> Result<Job, StoreError> {
    let status: String = row.try_get("status")?;
    Ok(Job {
        id: JobId::new(row.try_get("id")?),
        company_id: CompanyId::new(row.try_get("company_id")?),
        status: status.parse::<JobStatus>().map_err(|e| corrupt("status", e))?,
        started_at: row.try_get("started_at")?,
        finished_at: row.try_get("finished_at")?,
        message: row.try_get("message")?,
        total_documents: row.try_get("total_documents")?,
    })
}

fn document_from_row(row: &SqliteRow) -> Result<Document, StoreError> {
    let direction: String = row.try_get("direction")?;
    Ok(Document {
        id: DocumentId::new(row.try_get("id")?),
        company_id: CompanyId::new(row.try_get("company_id")?),
        model: row.try_get("model")?,
        direction: direction.parse::<Direction>().map_err(|e| corrupt("direction", e))?,
        chave: row.try_get("chave")?,
        issue_date: row.try_get("issue_date")?,
        amount: row.try_get("amount")?,
        xml_path: row.try_get("xml_path")?,
        source: row.try_get("source")?,
        created_at: row.try_get("created_at")?,
    })
}
