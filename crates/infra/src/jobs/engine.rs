//! Job engine: accepts sync submissions and drives each job to a terminal state.

use std::sync::Arc;
use std::time::Duration;

use tracing::{error, info, info_span, warn, Instrument};

use webnotas_core::{CompanyId, JobId, JobStatus, JobUpdate};

use super::worker::SyncWorker;
use crate::store::{Store, StoreError};

pub const COMPANY_NOT_FOUND_MESSAGE: &str = "Company not found";

/// Job engine configuration.
#[derive(Debug, Clone)]
pub struct JobEngineConfig {
    /// Pause between marking a job running and starting its worker
    pub start_delay: Duration,
}

impl Default for JobEngineConfig {
    fn default() -> Self {
        Self {
            start_delay: Duration::from_millis(800),
        }
    }
}

impl JobEngineConfig {
    pub fn with_start_delay(mut self, delay: Duration) -> Self {
        self.start_delay = delay;
        self
    }
}

/// Engine error.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("company not found: {0}")]
    CompanyNotFound(CompanyId),
    #[error("illegal transition for job {job_id}: {from} -> {to}")]
    InvalidTransition {
        job_id: JobId,
        from: JobStatus,
        to: JobStatus,
    },
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// In-flight view of one job, owned by the task executing it.
#[derive(Debug)]
struct JobRun {
    id: JobId,
    status: JobStatus,
}

impl JobRun {
    fn check(&self, next: JobStatus) -> Result<(), EngineError> {
        if self.status.can_transition_to(next) {
            Ok(())
        } else {
            Err(EngineError::InvalidTransition {
                job_id: self.id,
                from: self.status,
                to: next,
            })
        }
    }
}

/// Background job engine.
///
/// Every accepted submission spawns one tokio task that owns its job row until the job
/// is `done` or `error`. There is no pool and no concurrency cap.
#[derive(Clone)]
pub struct JobEngine {
    store: Store,
    worker: Arc<dyn SyncWorker>,
    config: JobEngineConfig,
}

impl std::fmt::Debug for JobEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JobEngine")
            .field("worker", &self.worker.source())
            .field("config", &self.config)
            .finish()
    }
}

impl JobEngine {
    pub fn new(store: Store, worker: Arc<dyn SyncWorker>, config: JobEngineConfig) -> Self {
        Self {
            store,
            worker,
            config,
        }
    }

    /// Queue a sync for `company_id` and start it in the background.
    ///
    /// Returns as soon as the job row exists; the caller never waits for the sync itself.
    pub async fn submit(&self, company_id: CompanyId) -> Result<JobId, EngineError> {
        if self.store.get_company(company_id).await?.is_none() {
            return Err(EngineError::CompanyNotFound(company_id));
        }

        let job_id = match self.store.create_job(company_id).await {
            Ok(id) => id,
            // Company deleted between the check and the insert.
            Err(StoreError::NotFound(_)) => return Err(EngineError::CompanyNotFound(company_id)),
            Err(e) => return Err(e.into()),
        };

        info!(job_id = %job_id, company_id = %company_id, "sync job queued");

        let engine = self.clone();
        let span = info_span!("sync_job", job_id = %job_id, company_id = %company_id);
        tokio::spawn(
            async move {
                if let Err(e) = engine.execute(job_id).await {
                    error!(job_id = %job_id, error = %e, "sync job was not run");
                }
            }
            .instrument(span),
        );

        Ok(job_id)
    }

    /// Run one queued job to a terminal state on the current task.
    ///
    /// The stored row decides: a job that is not `queued` (already claimed, finished or
    /// failed) is refused with `InvalidTransition` and nothing is written. Once the job is
    /// claimed, every failure ends up as its `error` status and the last status written
    /// is returned.
    pub async fn execute(&self, job_id: JobId) -> Result<JobStatus, EngineError> {
        let job = self
            .store
            .get_job(job_id)
            .await?
            .ok_or_else(|| StoreError::NotFound(format!("job {job_id}")))?;

        let mut run = JobRun {
            id: job_id,
            status: job.status,
        };

        match self.drive(&mut run, job.company_id).await {
            Ok(()) => Ok(run.status),
            // Never claimed: someone else owns (or owned) this job.
            Err(err @ EngineError::InvalidTransition { .. }) if run.status == job.status => Err(err),
            Err(err) => {
                warn!(job_id = %job_id, error = %err, "sync job failed");
                if !run.status.is_terminal() {
                    let update = JobUpdate::error(format!("Synchronization failed: {err}"));
                    if let Err(e) = self.transition(&mut run, &update).await {
                        error!(job_id = %job_id, error = %e, "could not record job failure");
                    }
                }
                Ok(run.status)
            }
        }
    }

    async fn drive(&self, run: &mut JobRun, company_id: CompanyId) -> Result<(), EngineError> {
        self.transition(run, &JobUpdate::running()).await?;

        if !self.config.start_delay.is_zero() {
            tokio::time::sleep(self.config.start_delay).await;
        }

        let Some(company) = self.store.get_company(company_id).await? else {
            warn!(job_id = %run.id, company_id = %company_id, "company vanished before sync");
            return self
                .transition(run, &JobUpdate::error(COMPANY_NOT_FOUND_MESSAGE))
                .await;
        };

        let mut batch = self.store.begin_batch(run.id).await?;
        let outcome = self.worker.sync(&company, &mut batch).await;

        let update = match &outcome {
            Ok(()) => JobUpdate::done(
                format!(
                    "Synchronization completed successfully ({})",
                    self.worker.source()
                ),
                batch.inserted(),
            ),
            Err(e) => {
                warn!(
                    job_id = %run.id,
                    inserted = batch.inserted(),
                    error = %e,
                    "sync worker failed; keeping documents already written"
                );
                JobUpdate::error(format!("Synchronization failed: {e}"))
            }
        };

        run.check(update.status)?;
        let documents = batch.inserted();
        batch.finish(&update).await?;
        run.status = update.status;

        info!(job_id = %run.id, status = %run.status, documents, "sync job finished");
        Ok(())
    }

    /// Write a single-row status transition, refusing edges the state machine forbids.
    ///
    /// The write is guarded on the status this run last saw, so a row changed by anyone
    /// else is left alone.
    async fn transition(&self, run: &mut JobRun, update: &JobUpdate) -> Result<(), EngineError> {
        run.check(update.status)?;
        if !self.store.transition_job(run.id, run.status, update).await? {
            let current = self
                .store
                .get_job(run.id)
                .await?
                .map_or(run.status, |job| job.status);
            return Err(EngineError::InvalidTransition {
                job_id: run.id,
                from: current,
                to: update.status,
            });
        }
        run.status = update.status;
        Ok(())
    }
}
