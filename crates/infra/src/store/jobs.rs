use tracing::debug;

use webnotas_core::{CompanyId, Job, JobId, JobStatus, JobUpdate};

use super::{classify, job_from_row, Store, StoreError, ALL_JOBS_LIMIT, COMPANY_JOBS_LIMIT};

const JOB_COLUMNS: &str =
    "id, company_id, status, started_at, finished_at, message, total_documents";

pub(super) const UPDATE_JOB_SQL: &str = r#"
    UPDATE jobs
    SET status = ?1,
        message = ?2,
        started_at = COALESCE(?3, started_at),
        finished_at = COALESCE(?4, finished_at),
        total_documents = COALESCE(?5, total_documents)
    WHERE id = ?6
"#;

/// `UPDATE_JOB_SQL` guarded on the current status (`?7`).
pub(super) const TRANSITION_JOB_SQL: &str = r#"
    UPDATE jobs
    SET status = ?1,
        message = ?2,
        started_at = COALESCE(?3, started_at),
        finished_at = COALESCE(?4, finished_at),
        total_documents = COALESCE(?5, total_documents)
    WHERE id = ?6 AND status = ?7
"#;

impl Store {
    /// Create a queued job for `company_id`.
    ///
    /// Fails with `NotFound` if the company does not exist (enforced by the foreign key,
    /// so no row is ever written for an unknown company).
    pub async fn create_job(&self, company_id: CompanyId) -> Result<JobId, StoreError> {
        let result = sqlx::query(
            r#"
            INSERT INTO jobs (company_id, status, message)
            VALUES (?1, ?2, ?3)
            "#,
        )
        .bind(company_id.get())
        .bind(JobStatus::Queued.as_str())
        .bind(JobUpdate::QUEUED_MESSAGE)
        .execute(&self.pool)
        .await
        .map_err(|e| classify(e, || format!("company {company_id}")))?;

        let id = JobId::new(result.last_insert_rowid());
        debug!(job_id = %id, company_id = %company_id, "job created");
        Ok(id)
    }

    pub async fn get_job(&self, id: JobId) -> Result<Option<Job>, StoreError> {
        let row = sqlx::query(&format!("SELECT {JOB_COLUMNS} FROM jobs WHERE id = ?1"))
            .bind(id.get())
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(job_from_row).transpose()
    }

    /// Overwrite a job's status fields.
    ///
    /// Unconditional: callers own the job row and are responsible for only
    /// issuing legal transitions.
    pub async fn update_job(&self, id: JobId, update: &JobUpdate) -> Result<(), StoreError> {
        let result = sqlx::query(UPDATE_JOB_SQL)
            .bind(update.status.as_str())
            .bind(&update.message)
            .bind(update.started_at)
            .bind(update.finished_at)
            .bind(update.total_documents)
            .bind(id.get())
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound(format!("job {id}")));
        }
        Ok(())
    }

    /// Apply `update` only if the job is currently in status `from`.
    ///
    /// Returns `false` when the row exists but is in another status, leaving it untouched.
    pub async fn transition_job(
        &self,
        id: JobId,
        from: JobStatus,
        update: &JobUpdate,
    ) -> Result<bool, StoreError> {
        let result = sqlx::query(TRANSITION_JOB_SQL)
            .bind(update.status.as_str())
            .bind(&update.message)
            .bind(update.started_at)
            .bind(update.finished_at)
            .bind(update.total_documents)
            .bind(id.get())
            .bind(from.as_str())
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 1 {
            return Ok(true);
        }
        match self.get_job(id).await? {
            Some(_) => Ok(false),
            None => Err(StoreError::NotFound(format!("job {id}"))),
        }
    }

    /// Most recent jobs, optionally for one company.
    pub async fn list_jobs(&self, company_id: Option<CompanyId>) -> Result<Vec<Job>, StoreError> {
        let rows = match company_id {
            Some(company_id) => {
                sqlx::query(&format!(
                    "SELECT {JOB_COLUMNS} FROM jobs WHERE company_id = ?1 ORDER BY id DESC LIMIT ?2"
                ))
                .bind(company_id.get())
                .bind(COMPANY_JOBS_LIMIT)
                .fetch_all(&self.pool)
                .await?
            }
            None => {
                sqlx::query(&format!(
                    "SELECT {JOB_COLUMNS} FROM jobs ORDER BY id DESC LIMIT ?1"
                ))
                .bind(ALL_JOBS_LIMIT)
                .fetch_all(&self.pool)
                .await?
            }
        };

        rows.iter().map(job_from_row).collect()
    }
}
