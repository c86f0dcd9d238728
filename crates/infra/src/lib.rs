//! Infrastructure layer: SQLite store, background sync jobs, document workers.

pub mod jobs;
pub mod store;

pub use jobs::{JobEngine, JobEngineConfig, MockSyncWorker, MockWorkerConfig, SyncWorker};
pub use store::{Store, StoreError};
