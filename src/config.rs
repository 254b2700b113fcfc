use std::path::PathBuf;
use std::time::Duration;

use clap::{Args, ValueEnum};
use directories::ProjectDirs;

use crate::error::AppError;
use crate::models::transcription::{Device, GenerationConfig};

const DATABASE_FILENAME: &str = "echofind.db";

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum StoreBackend {
    /// Embedded SQLite full-text index
    Sqlite,
    /// Remote Elasticsearch cluster
    Elasticsearch,
}

/// Process-wide settings, fixed at startup.
#[derive(Debug, Clone, Args)]
pub struct AppConfig {
    /// Directory tree to index
    #[arg(long = "root", env = "ECHOFIND_ROOT", default_value = "/app/documents", global = true)]
    pub root_dir: PathBuf,

    /// Name of the index documents are written to and searched in
    #[arg(long = "index", env = "ECHOFIND_INDEX", default_value = "file_index", global = true)]
    pub index_name: String,

    /// Index store backend
    #[arg(long, env = "ECHOFIND_STORE", value_enum, default_value_t = StoreBackend::Sqlite, global = true)]
    pub store: StoreBackend,

    /// Address of the Elasticsearch store
    #[arg(long, env = "ECHOFIND_STORE_URL", default_value = "http://elasticsearch:9200", global = true)]
    pub store_url: String,

    /// SQLite database file (default: platform data directory)
    #[arg(long, env = "ECHOFIND_DATABASE", global = true)]
    pub database: Option<PathBuf>,

    /// Speech recognition endpoint
    #[arg(long, env = "ECHOFIND_ENGINE_URL", default_value = "http://127.0.0.1:50000/api/v1/asr", global = true)]
    pub engine_url: String,

    /// Inference device for the speech engine: cpu, cuda or cuda:N
    #[arg(long, env = "ECHOFIND_DEVICE", default_value = "cuda:0", global = true)]
    pub device: String,

    /// HTTP request timeout in seconds
    #[arg(long = "request-timeout", env = "ECHOFIND_REQUEST_TIMEOUT", default_value_t = 60, global = true)]
    pub request_timeout_secs: u64,

    /// Per-stage timeout for voice queries in seconds
    #[arg(long = "stage-timeout", env = "ECHOFIND_STAGE_TIMEOUT", global = true)]
    pub stage_timeout_secs: Option<u64>,

    /// Maximum hits requested from the index per query
    #[arg(long, env = "ECHOFIND_MAX_RESULTS", default_value_t = 100, global = true)]
    pub max_results: usize,
}

impl AppConfig {
    pub fn device(&self) -> Result<Device, AppError> {
        self.device.parse().map_err(AppError::Config)
    }

    pub fn generation_config(&self) -> Result<GenerationConfig, AppError> {
        Ok(GenerationConfig::with_device(self.device()?))
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn stage_timeout(&self) -> Option<Duration> {
        self.stage_timeout_secs.map(Duration::from_secs)
    }

    /// Explicit `--database`, otherwise the platform data directory.
    pub fn database_path(&self) -> Result<PathBuf, AppError> {
        if let Some(path) = &self.database {
            return Ok(path.clone());
        }
        ProjectDirs::from("", "", "echofind")
            .map(|dirs| dirs.data_dir().join(DATABASE_FILENAME))
            .ok_or_else(|| {
                AppError::Config("no data directory available, pass --database".to_string())
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[derive(Parser)]
    struct TestCli {
        #[command(flatten)]
        config: AppConfig,
    }

    fn parse(args: &[&str]) -> AppConfig {
        let mut argv = vec!["echofind"];
        argv.extend_from_slice(args);
        TestCli::parse_from(argv).config
    }

    #[test]
    fn test_flags_override_defaults() {
        let config = parse(&[
            "--root",
            "/srv/docs",
            "--index",
            "docs",
            "--store",
            "elasticsearch",
            "--device",
            "cpu",
            "--stage-timeout",
            "30",
            "--database",
            "/tmp/echofind-test.db",
        ]);
        assert_eq!(config.root_dir, PathBuf::from("/srv/docs"));
        assert_eq!(config.index_name, "docs");
        assert_eq!(config.store, StoreBackend::Elasticsearch);
        assert_eq!(config.device().unwrap(), Device::Cpu);
        assert_eq!(config.stage_timeout(), Some(Duration::from_secs(30)));
        assert_eq!(
            config.database_path().unwrap(),
            PathBuf::from("/tmp/echofind-test.db")
        );
    }

    #[test]
    fn test_invalid_device_is_config_error() {
        let config = parse(&["--device", "quantum"]);
        assert!(matches!(config.device(), Err(AppError::Config(_))));
        assert!(config.generation_config().is_err());
    }

    #[test]
    fn test_generation_config_uses_device() {
        let config = parse(&["--device", "cuda:1"]);
        assert_eq!(config.generation_config().unwrap().device, Device::Cuda(1));
        assert_eq!(config.request_timeout(), Duration::from_secs(60));
    }
}
