//! Configuration module
//!
//! TOML configuration with built-in defaults. The file is looked up at
//! the path in `STATION_CONFIG` or under the user config directory
//! (`~/.config/station-service/config.toml`); a missing file falls back
//! to defaults so the service always starts.

use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Top-level application configuration.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub station: StationConfig,
    pub dispatcher: DispatcherConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StationConfig {
    /// TTL applied to new reservations, in minutes.
    pub reservation_ttl_minutes: i64,
    /// Seed the demo network (stations S01–S05, vehicles V001–V010) at
    /// startup.
    pub seed_demo: bool,
}

impl Default for StationConfig {
    fn default() -> Self {
        Self {
            reservation_ttl_minutes: 30,
            seed_demo: true,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DispatcherConfig {
    /// Upper bound on a single actuation-channel send, in milliseconds.
    pub send_timeout_ms: u64,
}

impl Default for DispatcherConfig {
    fn default() -> Self {
        Self {
            send_timeout_ms: 500,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default `tracing` filter when `RUST_LOG` is unset.
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl AppConfig {
    /// Load configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&raw)?)
    }
}

/// Default config file location, e.g.
/// `~/.config/station-service/config.toml`.
pub fn default_config_path() -> PathBuf {
    dirs_next::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("station-service")
        .join("config.toml")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_sane() {
        let cfg = AppConfig::default();
        assert_eq!(cfg.server.port, 8080);
        assert_eq!(cfg.station.reservation_ttl_minutes, 30);
        assert!(cfg.station.seed_demo);
        assert_eq!(cfg.dispatcher.send_timeout_ms, 500);
        assert_eq!(cfg.logging.level, "info");
    }

    #[test]
    fn partial_file_keeps_defaults_for_the_rest() {
        let cfg: AppConfig = toml::from_str(
            r#"
            [server]
            port = 9090

            [station]
            reservation_ttl_minutes = 5
            "#,
        )
        .unwrap();
        assert_eq!(cfg.server.port, 9090);
        assert_eq!(cfg.server.host, "0.0.0.0");
        assert_eq!(cfg.station.reservation_ttl_minutes, 5);
        assert_eq!(cfg.dispatcher.send_timeout_ms, 500);
    }

    #[test]
    fn invalid_toml_is_a_parse_error() {
        let err = toml::from_str::<AppConfig>("server = 12").unwrap_err();
        assert!(err.to_string().contains("server"));
    }
}
