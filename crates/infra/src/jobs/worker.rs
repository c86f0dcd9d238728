//! Sync worker capability.

use async_trait::async_trait;

use webnotas_core::{Company, DocumentId, NewDocument};

use crate::store::{StoreError, SyncBatch};

/// Error raised by a sync worker.
#[derive(Debug, thiserror::Error)]
pub enum WorkerError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("store error: {0}")]
    Store(#[from] StoreError),
    #[error("provider error: {0}")]
    Provider(String),
}

/// Destination for the documents a worker produces.
#[async_trait]
pub trait DocumentSink: Send {
    async fn insert_document(&mut self, doc: NewDocument) -> Result<DocumentId, StoreError>;
}

/// Unit of work executed for one job.
///
/// Implementations fetch (or synthesize) documents for `company` and push each one into
/// `sink`. Runs must be safe to repeat; deduplication against earlier runs is not required.
#[async_trait]
pub trait SyncWorker: Send + Sync + 'static {
    /// Tag stored in each produced document's `source` column.
    fn source(&self) -> &str;

    async fn sync(&self, company: &Company, sink: &mut dyn DocumentSink) -> Result<(), WorkerError>;
}

#[async_trait]
impl DocumentSink for SyncBatch {
    async fn insert_document(&mut self, doc: NewDocument) -> Result<DocumentId, StoreError> {
        SyncBatch::insert_document(self, &doc).await
    }
}
