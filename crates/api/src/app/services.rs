use std::path::PathBuf;
use std::sync::Arc;

use tracing::info;

use webnotas_infra::{
    JobEngine, JobEngineConfig, MockSyncWorker, MockWorkerConfig, Store, StoreError,
};

use crate::config::Config;

/// Everything the handlers need, shared behind an `Arc`.
#[derive(Debug, Clone)]
pub struct AppServices {
    pub store: Store,
    pub engine: JobEngine,
    pub static_dir: PathBuf,
}

impl AppServices {
    pub fn new(store: Store, engine: JobEngine, static_dir: impl Into<PathBuf>) -> Self {
        Self {
            store,
            engine,
            static_dir: static_dir.into(),
        }
    }
}

/// Open the database under the configured data dir and wire the engine to the mock worker.
pub async fn build_services(config: &Config) -> Result<AppServices, StoreError> {
    let store = Store::open(config.db_path()).await?;

    let worker = MockSyncWorker::new(MockWorkerConfig::new(config.downloads_dir()));
    let engine = JobEngine::new(
        store.clone(),
        Arc::new(worker),
        JobEngineConfig::default().with_start_delay(config.start_delay()),
    );

    info!(
        db = %config.db_path().display(),
        downloads = %config.downloads_dir().display(),
        start_delay_ms = config.start_delay_ms,
        "services ready"
    );

    Ok(AppServices::new(store, engine, &config.static_dir))
}
