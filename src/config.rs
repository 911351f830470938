use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Config file looked up in the current directory.
pub const CONFIG_FILE: &str = ".diff-walker.toml";

/// Env var consulted when no coverage report path is configured.
pub const COVERAGE_ENV: &str = "DIFF_WALKER_COVERAGE";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    FileRead(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Top-level configuration loaded from .diff-walker.toml.
/// All fields are optional; the tool works with zero config.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub coverage: CoverageConfig,

    #[serde(default)]
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CoverageConfig {
    /// JSON coverage report (file -> per-line hits). Falls back to DIFF_WALKER_COVERAGE.
    pub report: Option<PathBuf>,

    /// Count added lines in files absent from the report as gaps
    #[serde(default)]
    pub missing_file_is_gap: bool,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct OutputConfig {
    /// Print JSON records instead of the terminal report
    #[serde(default)]
    pub json: bool,
}

impl Config {
    /// Load configuration from .diff-walker.toml in the current directory.
    /// Returns default config if the file doesn't exist.
    pub fn load() -> Result<Config, ConfigError> {
        let path = Path::new(CONFIG_FILE);
        if path.exists() {
            Self::load_from(path)
        } else {
            Ok(Config::default())
        }
    }

    /// Load from a specific path (useful for testing).
    pub fn load_from(path: &Path) -> Result<Config, ConfigError> {
        let contents = fs::read_to_string(path)?;
        let config = toml::from_str(&contents)?;
        Ok(config)
    }

    /// Resolve the coverage report path: config file value takes precedence,
    /// falls back to the DIFF_WALKER_COVERAGE env var.
    pub fn coverage_report(&self) -> Option<PathBuf> {
        self.coverage
            .report
            .clone()
            .or_else(|| std::env::var_os(COVERAGE_ENV).map(PathBuf::from))
    }
}
