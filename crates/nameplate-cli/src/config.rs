//! TOML configuration for the CLI.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use nameplate_core::memory::layout::timing;
use nameplate_core::{DEFAULT_PROCESS_NAME, ScannerConfig};
use serde::Deserialize;
use tracing::{info, warn};

pub const DEFAULT_CONFIG_FILE: &str = "nameplate.toml";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Executable name of the game
    pub process_name: String,
    pub poll_interval_secs: u64,
    /// Directory receiving the overlay files
    pub output_dir: PathBuf,
    pub write_files: bool,
    /// 0 disables the scan deadline
    pub scan_timeout_secs: u64,
    /// Region scan workers, defaults to the number of CPUs
    pub workers: Option<usize>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            process_name: DEFAULT_PROCESS_NAME.to_string(),
            poll_interval_secs: timing::POLL_INTERVAL_SECS,
            output_dir: PathBuf::from("."),
            write_files: true,
            scan_timeout_secs: timing::SCAN_TIMEOUT_SECS,
            workers: None,
        }
    }
}

impl Config {
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        toml::from_str(&content).with_context(|| format!("Failed to parse {}", path.display()))
    }

    /// Load the file, falling back to defaults when it is missing or broken
    pub fn load_or_default(path: &Path) -> Self {
        match Self::load(path) {
            Ok(config) => {
                info!("Loaded config from {}", path.display());
                config
            }
            Err(e) => {
                warn!("Failed to load config: {:#}, using defaults", e);
                Self::default()
            }
        }
    }

    /// Poll interval, never shorter than one second
    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs.max(1))
    }

    pub fn scan_timeout(&self) -> Option<Duration> {
        (self.scan_timeout_secs > 0).then(|| Duration::from_secs(self.scan_timeout_secs))
    }

    pub fn scanner_config(&self) -> ScannerConfig {
        let builder = ScannerConfig::builder().scan_timeout(self.scan_timeout());
        match self.workers {
            Some(workers) => builder.workers(workers).build(),
            None => builder.build(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write_config(dir: &TempDir, content: &str) -> PathBuf {
        let path = dir.path().join(DEFAULT_CONFIG_FILE);
        fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.process_name, "SF30thAnniversaryCollection.exe");
        assert_eq!(config.poll_interval(), Duration::from_secs(5));
        assert_eq!(config.scan_timeout(), Some(Duration::from_secs(60)));
        assert!(config.write_files);
    }

    #[test]
    fn test_load_partial_file() {
        let dir = TempDir::new().unwrap();
        let path = write_config(
            &dir,
            r#"
output_dir = "obs"
poll_interval_secs = 2
workers = 3
"#,
        );

        let config = Config::load(&path).unwrap();
        assert_eq!(config.output_dir, PathBuf::from("obs"));
        assert_eq!(config.poll_interval(), Duration::from_secs(2));
        assert_eq!(config.workers, Some(3));
        assert_eq!(config.process_name, DEFAULT_PROCESS_NAME);
        assert_eq!(config.scanner_config().workers, 3);
    }

    #[test]
    fn test_zero_timeout_disables_deadline() {
        let dir = TempDir::new().unwrap();
        let path = write_config(&dir, "scan_timeout_secs = 0\n");

        let config = Config::load(&path).unwrap();
        assert_eq!(config.scan_timeout(), None);
        assert_eq!(config.scanner_config().scan_timeout, None);
    }

    #[test]
    fn test_zero_interval_is_clamped() {
        let config = Config {
            poll_interval_secs: 0,
            ..Config::default()
        };
        assert_eq!(config.poll_interval(), Duration::from_secs(1));
    }

    #[test]
    fn test_missing_file_falls_back_to_defaults() {
        let dir = TempDir::new().unwrap();
        let config = Config::load_or_default(&dir.path().join("missing.toml"));
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_invalid_file_falls_back_to_defaults() {
        let dir = TempDir::new().unwrap();
        let path = write_config(&dir, "poll_interval_secs = \"soon\"\n");

        assert!(Config::load(&path).is_err());
        assert_eq!(Config::load_or_default(&path), Config::default());
    }
}
