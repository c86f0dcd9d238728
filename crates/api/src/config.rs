//! Server configuration from command line flags and `WEBNOTAS_*` environment variables.

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use webnotas_observability::LogFormat;

/// File name of the database inside the data directory.
pub const DB_FILE: &str = "webnotas.db";

/// Subdirectory of the data directory holding per-company XML artifacts.
pub const DOWNLOADS_DIR: &str = "downloads";

#[derive(Debug, Clone, Parser)]
#[command(name = "webnotas-api")]
#[command(about = "Company registry with background fiscal document sync")]
#[command(version)]
pub struct Config {
    /// Address to bind
    #[arg(long, default_value = "0.0.0.0", env = "WEBNOTAS_HOST")]
    pub host: String,

    /// Port to listen on
    #[arg(short, long, default_value = "8000", env = "WEBNOTAS_PORT")]
    pub port: u16,

    /// Holds the database file and downloaded artifacts
    #[arg(long, default_value = "./data", env = "WEBNOTAS_DATA_DIR")]
    pub data_dir: PathBuf,

    /// Directory served at `/` and `/static/`
    #[arg(long, default_value = "./static", env = "WEBNOTAS_STATIC_DIR")]
    pub static_dir: PathBuf,

    /// Pause between a job entering `running` and its worker starting
    #[arg(long = "start-delay-ms", default_value = "800", env = "WEBNOTAS_START_DELAY_MS")]
    pub start_delay_ms: u64,

    /// Log output: json or pretty
    #[arg(long, default_value = "json", env = "WEBNOTAS_LOG_FORMAT")]
    pub log_format: LogFormat,
}

impl Config {
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn db_path(&self) -> PathBuf {
        self.data_dir.join(DB_FILE)
    }

    pub fn downloads_dir(&self) -> PathBuf {
        self.data_dir.join(DOWNLOADS_DIR)
    }

    pub fn start_delay(&self) -> Duration {
        Duration::from_millis(self.start_delay_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_override_defaults() {
        let config = Config::try_parse_from([
            "webnotas-api",
            "--port",
            "9100",
            "--data-dir",
            "/tmp/wn",
            "--start-delay-ms",
            "0",
            "--log-format",
            "pretty",
        ])
        .unwrap();

        assert_eq!(config.port, 9100);
        assert_eq!(config.db_path(), PathBuf::from("/tmp/wn/webnotas.db"));
        assert_eq!(config.downloads_dir(), PathBuf::from("/tmp/wn/downloads"));
        assert_eq!(config.start_delay(), Duration::ZERO);
        assert_eq!(config.log_format, LogFormat::Pretty);
    }

    #[test]
    fn rejects_unknown_log_format() {
        assert!(Config::try_parse_from(["webnotas-api", "--log-format", "xml"]).is_err());
    }
}
