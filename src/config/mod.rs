use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing_subscriber::EnvFilter;

/// Log filter for both binaries: `RUST_LOG` directives when set, `info`
/// otherwise, so join-drop warnings and failed report sections stay visible
/// in a default run instead of being filtered to nothing.
pub fn log_filter(directives: Option<&str>) -> EnvFilter {
    EnvFilter::new(directives.unwrap_or("info"))
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("I/O error reading config: {0}")]
    Io(#[from] std::io::Error),
    #[error("YAML error in config: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("Missing environment variable: {0}")]
    MissingEnv(String),
}

pub type Result<T> = std::result::Result<T, ConfigError>;

/// Run configuration for the analysis binary: where the two input tables
/// live and where the report artifacts go.
#[derive(Debug, Serialize, Deserialize)]
pub struct Config {
    pub assets_csv: PathBuf,
    pub personality_csv: PathBuf,
    pub regression_report: PathBuf,
    pub charts_dir: PathBuf,
}

impl Config {
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        let config: Config = serde_yaml::from_str(&contents)?;
        Ok(config)
    }
}

/// Credentials and output path for the ingestion binary. Sourced from the
/// environment at startup and never stored anywhere shared.
#[derive(Debug)]
pub struct IngestConfig {
    pub base_url: String,
    pub api_key: String,
    pub output_path: PathBuf,
}

impl IngestConfig {
    pub fn from_env() -> Result<Self> {
        let base_url = env::var("SUPABASE_URL")
            .map_err(|_| ConfigError::MissingEnv("SUPABASE_URL".to_string()))?;
        let api_key = env::var("SUPABASE_KEY")
            .map_err(|_| ConfigError::MissingEnv("SUPABASE_KEY".to_string()))?;
        let output_path = env::var("ASSETS_CSV_PATH")
            .unwrap_or_else(|_| "assets_data.csv".to_string())
            .into();

        Ok(Self {
            base_url,
            api_key,
            output_path,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_filter_defaults_to_info() {
        assert_eq!(log_filter(None).to_string(), "info");
        assert_eq!(log_filter(Some("debug")).to_string(), "debug");
    }
}
