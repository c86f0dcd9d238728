//! Background sync jobs.
//!
//! ## Design
//!
//! - One job row per sync request, created `queued` before the request returns
//! - Each accepted job gets its own tokio task which is the only writer of its row
//! - Status only moves forward: `queued -> running -> done | error`
//! - Worker failures never reach the caller; they end the job in `error`
//! - No retries: retrying means submitting a new job
//!
//! ## Components
//!
//! - `JobEngine`: submits jobs and drives them to a terminal state
//! - `SyncWorker`: pluggable unit of work that produces documents for a company
//! - `DocumentSink`: where a worker writes its documents (normally a `SyncBatch`)
//! - `MockSyncWorker`: synthesizes random documents and their XML artifacts

pub mod engine;
pub mod mock;
pub mod worker;

pub use engine::{EngineError, JobEngine, JobEngineConfig};
pub use mock::{MockSyncWorker, MockWorkerConfig};
pub use worker::{DocumentSink, SyncWorker, WorkerError};
