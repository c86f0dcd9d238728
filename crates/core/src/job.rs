//! Sync jobs and their status state machine.
//!
//! ```text
//! queued -> running -> done
//!                   \-> error
//! ```
//!
//! `done` and `error` are terminal: a job that reached either is never written again.

use core::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::DomainError;
use crate::id::{CompanyId, JobId};

/// Job execution status.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    /// Created, waiting for its background task
    Queued,
    /// Background task is executing the sync worker
    Running,
    /// Completed successfully
    Done,
    /// Failed; `message` holds the cause
    Error,
}

impl JobStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            JobStatus::Queued => "queued",
            JobStatus::Running => "running",
            JobStatus::Done => "done",
            JobStatus::Error => "error",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, JobStatus::Done | JobStatus::Error)
    }

    /// Whether `self -> next` is an edge of the state machine.
    ///
    /// A queued job may fail before it ever runs (e.g. the task could not mark it running).
    pub fn can_transition_to(&self, next: JobStatus) -> bool {
        matches!(
            (self, next),
            (JobStatus::Queued, JobStatus::Running)
                | (JobStatus::Queued, JobStatus::Error)
                | (JobStatus::Running, JobStatus::Done)
                | (JobStatus::Running, JobStatus::Error)
        )
    }
}

impl core::fmt::Display for JobStatus {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for JobStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "queued" => Ok(JobStatus::Queued),
            "running" => Ok(JobStatus::Running),
            "done" => Ok(JobStatus::Done),
            "error" => Ok(JobStatus::Error),
            other => Err(DomainError::validation(format!("unknown job status: {other}"))),
        }
    }
}

/// One execution attempt of a company's sync.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Job {
    pub id: JobId,
    pub company_id: CompanyId,
    pub status: JobStatus,
    pub started_at: Option<DateTime<Utc>>,
    pub finished_at: Option<DateTime<Utc>>,
    pub message: Option<String>,
    pub total_documents: i64,
}

/// Fields written by a single job status transition.
///
/// `None` leaves the stored column untouched.
#[derive(Debug, Clone, PartialEq)]
pub struct JobUpdate {
    pub status: JobStatus,
    pub message: String,
    pub started_at: Option<DateTime<Utc>>,
    pub finished_at: Option<DateTime<Utc>>,
    pub total_documents: Option<i64>,
}

impl JobUpdate {
    pub const QUEUED_MESSAGE: &'static str = "Waiting for execution";
    pub const RUNNING_MESSAGE: &'static str = "Starting synchronization";

    /// `queued -> running`: stamps `started_at`.
    pub fn running() -> Self {
        Self {
            status: JobStatus::Running,
            message: Self::RUNNING_MESSAGE.to_string(),
            started_at: Some(Utc::now()),
            finished_at: None,
            total_documents: None,
        }
    }

    /// `running -> done`: stamps `finished_at` and records the document total.
    pub fn done(message: impl Into<String>, total_documents: i64) -> Self {
        Self {
            status: JobStatus::Done,
            message: message.into(),
            started_at: None,
            finished_at: Some(Utc::now()),
            total_documents: Some(total_documents),
        }
    }

    /// `* -> error`: stamps `finished_at`.
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            status: JobStatus::Error,
            message: message.into(),
            started_at: None,
            finished_at: Some(Utc::now()),
            total_documents: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: [JobStatus; 4] = [
        JobStatus::Queued,
        JobStatus::Running,
        JobStatus::Done,
        JobStatus::Error,
    ];

    #[test]
    fn terminal_states_have_no_outgoing_edges() {
        for from in [JobStatus::Done, JobStatus::Error] {
            assert!(from.is_terminal());
            for to in ALL {
                assert!(!from.can_transition_to(to), "{from} -> {to} must be rejected");
            }
        }
    }

    #[test]
    fn happy_path_edges() {
        assert!(JobStatus::Queued.can_transition_to(JobStatus::Running));
        assert!(JobStatus::Running.can_transition_to(JobStatus::Done));
        assert!(JobStatus::Running.can_transition_to(JobStatus::Error));
        assert!(!JobStatus::Queued.can_transition_to(JobStatus::Done));
        assert!(!JobStatus::Running.can_transition_to(JobStatus::Queued));
    }

    #[test]
    fn status_round_trips_through_its_column_text() {
        for s in ALL {
            assert_eq!(s.as_str().parse::<JobStatus>().unwrap(), s);
        }
        assert!("finished".parse::<JobStatus>().is_err());
    }

    #[test]
    fn terminal_updates_stamp_finished_at() {
        let done = JobUpdate::done("ok", 3);
        assert_eq!(done.total_documents, Some(3));
        assert!(done.finished_at.is_some());

        let err = JobUpdate::error("boom");
        assert_eq!(err.status, JobStatus::Error);
        assert!(err.finished_at.is_some());
        assert_eq!(err.total_documents, None);
    }
}
