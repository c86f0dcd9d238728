//! Per-job write batch.
//!
//! A sync run writes all of its documents through one [`SyncBatch`] and closes it with
//! the job's terminal update, so readers see either the job still `running` with none of
//! the batch's documents, or the terminal status together with every document.

use sqlx::{Sqlite, Transaction};
use tracing::debug;

use webnotas_core::{DocumentId, JobId, JobStatus, JobUpdate, NewDocument};

use super::documents::insert_document;
use super::jobs::TRANSITION_JOB_SQL;
use super::{Store, StoreError};

/// Open transaction scoped to one job's document writes.
///
/// Dropping the batch without calling [`SyncBatch::finish`] rolls every insert back.
pub struct SyncBatch {
    tx: Transaction<'static, Sqlite>,
    job_id: JobId,
    inserted: i64,
}

impl Store {
    pub async fn begin_batch(&self, job_id: JobId) -> Result<SyncBatch, StoreError> {
        let tx = self.pool.begin().await?;
        Ok(SyncBatch {
            tx,
            job_id,
            inserted: 0,
        })
    }
}

impl SyncBatch {
    /// Number of documents inserted so far.
    pub fn inserted(&self) -> i64 {
        self.inserted
    }

    pub async fn insert_document(&mut self, doc: &NewDocument) -> Result<DocumentId, StoreError> {
        let id = insert_document(&mut *self.tx, doc).await?;
        self.inserted += 1;
        Ok(id)
    }

    /// Write the job's terminal update and commit the batch atomically.
    ///
    /// The job must still be `running`; otherwise nothing is committed.
    pub async fn finish(mut self, update: &JobUpdate) -> Result<(), StoreError> {
        let result = sqlx::query(TRANSITION_JOB_SQL)
            .bind(update.status.as_str())
            .bind(&update.message)
            .bind(update.started_at)
            .bind(update.finished_at)
            .bind(update.total_documents)
            .bind(self.job_id.get())
            .bind(JobStatus::Running.as_str())
            .execute(&mut *self.tx)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::Conflict(format!("job {} is not running", self.job_id)));
        }

        self.tx.commit().await?;
        debug!(job_id = %self.job_id, documents = self.inserted, status = %update.status, "batch committed");
        Ok(())
    }
}

impl std::fmt::Debug for SyncBatch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SyncBatch")
            .field("job_id", &self.job_id)
            .field("inserted", &self.inserted)
            .finish()
    }
}
