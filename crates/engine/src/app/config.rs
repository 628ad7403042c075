use std::env;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;
use tracing::warn;

use super::bindings::BindingPreset;
use super::direction::DEFAULT_DEAD_ZONE;

pub const BINDINGS_ENV_VAR: &str = "RAYLOOP_BINDINGS";
pub const OVERLAY_ENV_VAR: &str = "RAYLOOP_OVERLAY";

const DEFAULT_SCALE: u32 = 3;
const DEFAULT_METRICS_LOG_INTERVAL_MS: u64 = 1_000;
const MAX_DEAD_ZONE: f32 = 0.95;

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoopConfig {
    pub window_title: String,
    /// Window pixels per frame pixel.
    pub scale: u32,
    pub bindings: BindingPreset,
    /// Fraction of a stick's radius treated as centred.
    pub dead_zone: f32,
    pub overlay_enabled: bool,
    pub metrics_log_interval_ms: u64,
}

impl Default for LoopConfig {
    fn default() -> Self {
        Self {
            window_title: "rayloop".to_string(),
            scale: DEFAULT_SCALE,
            bindings: BindingPreset::default(),
            dead_zone: DEFAULT_DEAD_ZONE,
            overlay_enabled: true,
            metrics_log_interval_ms: DEFAULT_METRICS_LOG_INTERVAL_MS,
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

impl LoopConfig {
    /// Reads `path` if it exists; a missing file yields the defaults.
    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        let raw = match fs::read_to_string(path) {
            Ok(raw) => raw,
            Err(error) if error.kind() == io::ErrorKind::NotFound => {
                return Ok(Self::default());
            }
            Err(source) => {
                return Err(ConfigError::Read {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };
        let config: LoopConfig =
            serde_json::from_str(&raw).map_err(|source| ConfigError::Parse {
                path: path.to_path_buf(),
                source,
            })?;
        Ok(config.normalized())
    }

    /// Applies `RAYLOOP_BINDINGS` and `RAYLOOP_OVERLAY` on top of `self`.
    pub fn with_env_overrides(self) -> Self {
        self.with_overrides(
            read_env_var(BINDINGS_ENV_VAR).as_deref(),
            read_env_var(OVERLAY_ENV_VAR).as_deref(),
        )
    }

    fn with_overrides(mut self, bindings: Option<&str>, overlay: Option<&str>) -> Self {
        if let Some(value) = bindings {
            match BindingPreset::parse(value) {
                Some(preset) => self.bindings = preset,
                None => warn!(
                    env_var = BINDINGS_ENV_VAR,
                    value,
                    "invalid binding preset; falling back to config"
                ),
            }
        }
        if let Some(value) = overlay {
            match parse_flag(value) {
                Some(enabled) => self.overlay_enabled = enabled,
                None => warn!(
                    env_var = OVERLAY_ENV_VAR,
                    value,
                    "invalid overlay flag; falling back to config"
                ),
            }
        }
        self
    }

    pub fn normalized(mut self) -> Self {
        if self.scale == 0 {
            self.scale = DEFAULT_SCALE;
        }
        if self.metrics_log_interval_ms == 0 {
            self.metrics_log_interval_ms = DEFAULT_METRICS_LOG_INTERVAL_MS;
        }
        self.dead_zone = if self.dead_zone.is_finite() {
            self.dead_zone.clamp(0.0, MAX_DEAD_ZONE)
        } else {
            DEFAULT_DEAD_ZONE
        };
        self
    }

    pub fn metrics_log_interval(&self) -> Duration {
        Duration::from_millis(self.metrics_log_interval_ms)
    }
}

fn read_env_var(name: &'static str) -> Option<String> {
    match env::var(name) {
        Ok(value) => Some(value),
        Err(env::VarError::NotPresent) => None,
        Err(error) => {
            warn!(
                env_var = name,
                error = %error,
                "unable to read env var; falling back to config"
            );
            None
        }
    }
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "on" | "yes" => Some(true),
        "0" | "false" | "off" | "no" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().expect("tempdir");
        let config =
            LoopConfig::load_or_default(&dir.path().join("rayloop.json")).expect("config");
        assert_eq!(config, LoopConfig::default());
    }

    #[test]
    fn partial_file_overrides_only_named_fields() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("rayloop.json");
        fs::write(&path, r#"{ "bindings": "single_stick", "scale": 2 }"#).expect("write");

        let config = LoopConfig::load_or_default(&path).expect("config");

        assert_eq!(config.bindings, BindingPreset::SingleStick);
        assert_eq!(config.scale, 2);
        assert!(config.overlay_enabled);
        assert_eq!(config.metrics_log_interval(), Duration::from_secs(1));
    }

    #[test]
    fn malformed_file_is_a_parse_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("rayloop.json");
        fs::write(&path, r#"{ "bindings": "triple_stick" }"#).expect("write");

        let error = LoopConfig::load_or_default(&path).expect_err("parse should fail");
        assert!(matches!(error, ConfigError::Parse { .. }));
    }

    #[test]
    fn normalization_repairs_out_of_range_values() {
        let config = LoopConfig {
            scale: 0,
            dead_zone: 3.0,
            metrics_log_interval_ms: 0,
            ..LoopConfig::default()
        }
        .normalized();

        assert_eq!(config.scale, DEFAULT_SCALE);
        assert_eq!(config.dead_zone, MAX_DEAD_ZONE);
        assert_eq!(config.metrics_log_interval_ms, DEFAULT_METRICS_LOG_INTERVAL_MS);

        let nan = LoopConfig {
            dead_zone: f32::NAN,
            ..LoopConfig::default()
        }
        .normalized();
        assert_eq!(nan.dead_zone, DEFAULT_DEAD_ZONE);
    }

    #[test]
    fn overrides_apply_valid_values_and_ignore_invalid_ones() {
        let config = LoopConfig::default().with_overrides(Some("single"), Some("off"));
        assert_eq!(config.bindings, BindingPreset::SingleStick);
        assert!(!config.overlay_enabled);

        let untouched = LoopConfig::default().with_overrides(Some("joystick"), Some("maybe"));
        assert_eq!(untouched, LoopConfig::default());
    }
}
