//! Binder configuration
//!
//! Loaded from YAML. A missing file yields the defaults; a present file must
//! parse and validate.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use openracing_change_detect::{
    DEFAULT_AXIS_EPSILON, DEFAULT_CANDIDATE_THRESHOLD, DEFAULT_COMMIT_THRESHOLD, DetectionTiming,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

pub const SCHEMA_VERSION: &str = "wheelbind.config/1";
const SCHEMA_PREFIX: &str = "wheelbind.config/";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BinderConfig {
    pub schema_version: String,
    pub detection: DetectionConfig,
    pub paths: PathsConfig,
}

/// Delays and thresholds for detection scans.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectionConfig {
    pub default_timeout_secs: u64,
    pub tick_interval_ms: u64,
    /// Wait after opening a single device before its baseline is taken
    pub settle_delay_ms: u64,
    /// Re-poll delay for a candidate button press
    pub confirm_delay_ms: u64,
    pub release_poll_ms: u64,
    /// Tick-to-tick change that counts as movement on one device
    pub axis_epsilon: f64,
    pub all_devices_candidate_threshold: f64,
    pub all_devices_commit_threshold: f64,
    pub device_settle_ms: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    /// JSON application state. Defaults next to the config file.
    pub state_file: Option<PathBuf>,
    /// Where `export` writes the controls file.
    pub controls_ini: Option<PathBuf>,
}

impl Default for BinderConfig {
    fn default() -> Self {
        Self {
            schema_version: SCHEMA_VERSION.to_string(),
            detection: DetectionConfig::default(),
            paths: PathsConfig::default(),
        }
    }
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self {
            default_timeout_secs: 15,
            tick_interval_ms: 50,
            settle_delay_ms: 200,
            confirm_delay_ms: 100,
            release_poll_ms: 200,
            axis_epsilon: DEFAULT_AXIS_EPSILON,
            all_devices_candidate_threshold: DEFAULT_CANDIDATE_THRESHOLD,
            all_devices_commit_threshold: DEFAULT_COMMIT_THRESHOLD,
            device_settle_ms: 50,
        }
    }
}

impl DetectionConfig {
    pub fn timing(&self) -> DetectionTiming {
        DetectionTiming {
            default_timeout: Duration::from_secs(self.default_timeout_secs),
            tick_interval: Duration::from_millis(self.tick_interval_ms),
            settle_delay: Duration::from_millis(self.settle_delay_ms),
            device_settle: Duration::from_millis(self.device_settle_ms),
            confirm_delay: Duration::from_millis(self.confirm_delay_ms),
            release_poll: Duration::from_millis(self.release_poll_ms),
            axis_epsilon: self.axis_epsilon,
            candidate_threshold: self.all_devices_candidate_threshold,
            commit_threshold: self.all_devices_commit_threshold,
        }
    }
}

impl BinderConfig {
    /// Load configuration from the default location.
    pub async fn load() -> Result<Self> {
        let path = Self::default_config_path()?;
        Self::load_from_path(&path).await
    }

    pub async fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        if !tokio::fs::try_exists(path).await.unwrap_or(false) {
            info!(path = ?path, "Config file not found, using defaults");
            return Ok(Self::default());
        }

        let content = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let config = Self::from_yaml(&content)
            .with_context(|| format!("Invalid config file: {}", path.display()))?;

        debug!(path = ?path, "Loaded config");
        Ok(config)
    }

    pub fn from_yaml(content: &str) -> Result<Self> {
        let config: BinderConfig =
            serde_yaml::from_str(content).context("Failed to parse config YAML")?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml::to_string(self).context("Failed to serialize config")
    }

    /// `<config dir>/wheelbind/config.yaml`
    pub fn default_config_path() -> Result<PathBuf> {
        let base = dirs::config_dir().context("No configuration directory for this platform")?;
        Ok(base.join("wheelbind").join("config.yaml"))
    }

    /// State file from the config, or `state.json` beside the default config.
    pub fn state_file(&self) -> Result<PathBuf> {
        match &self.paths.state_file {
            Some(path) => Ok(path.clone()),
            None => Ok(Self::default_config_path()?.with_file_name("state.json")),
        }
    }

    pub fn validate(&self) -> Result<()> {
        if !self.schema_version.starts_with(SCHEMA_PREFIX) {
            anyhow::bail!("Invalid schema version: {}", self.schema_version);
        }
        self.detection
            .timing()
            .validate()
            .context("Invalid detection settings")?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = BinderConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.detection.timing(), DetectionTiming::default());
    }

    #[test]
    fn test_partial_yaml_fills_defaults() -> Result<(), Box<dyn std::error::Error>> {
        let config = BinderConfig::from_yaml(
            "schema_version: wheelbind.config/1\ndetection:\n  tick_interval_ms: 20\n",
        )?;
        assert_eq!(config.detection.tick_interval_ms, 20);
        assert_eq!(config.detection.default_timeout_secs, 15);
        assert_eq!(config.paths, PathsConfig::default());
        Ok(())
    }

    #[test]
    fn test_rejects_bad_values() {
        for yaml in [
            "schema_version: other/1\n",
            "detection:\n  tick_interval_ms: 0\n",
            "detection:\n  default_timeout_secs: 0\n",
            "detection:\n  axis_epsilon: 1.5\n",
            "detection:\n  all_devices_candidate_threshold: 0.2\n  all_devices_commit_threshold: 0.1\n",
        ] {
            assert!(BinderConfig::from_yaml(yaml).is_err(), "{yaml}");
        }
    }

    #[test]
    fn test_default_yaml_layout() -> Result<(), Box<dyn std::error::Error>> {
        insta::assert_snapshot!(BinderConfig::default().to_yaml()?, @r"
        schema_version: wheelbind.config/1
        detection:
          default_timeout_secs: 15
          tick_interval_ms: 50
          settle_delay_ms: 200
          confirm_delay_ms: 100
          release_poll_ms: 200
          axis_epsilon: 0.001
          all_devices_candidate_threshold: 0.05
          all_devices_commit_threshold: 0.1
          device_settle_ms: 50
        paths:
          state_file: null
          controls_ini: null
        ");
        Ok(())
    }

    #[test]
    fn test_yaml_round_trip() -> Result<(), Box<dyn std::error::Error>> {
        let mut config = BinderConfig::default();
        config.paths.controls_ini = Some(PathBuf::from("/games/cfg/controls.ini"));
        let parsed = BinderConfig::from_yaml(&config.to_yaml()?)?;
        assert_eq!(parsed, config);
        Ok(())
    }

    #[tokio::test]
    async fn test_missing_file_uses_defaults() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempfile::tempdir()?;
        let config = BinderConfig::load_from_path(dir.path().join("absent.yaml")).await?;
        assert_eq!(config, BinderConfig::default());
        Ok(())
    }

    #[tokio::test]
    async fn test_state_file_override() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("config.yaml");
        tokio::fs::write(&path, "paths:\n  state_file: /tmp/wheel-state.json\n").await?;
        let config = BinderConfig::load_from_path(&path).await?;
        assert_eq!(config.state_file()?, PathBuf::from("/tmp/wheel-state.json"));
        Ok(())
    }
}
