use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::{H2pError, Result};

/// Environment variable naming a directory of pre-provisioned browser builds.
pub const BROWSERS_PATH_ENV: &str = "PLAYWRIGHT_BROWSERS_PATH";

pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_HOST: &str = "0.0.0.0";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub host: String,
    pub port: u16,
    /// Directory scanned for `chromium*` builds.
    pub browsers_path: Option<PathBuf>,
    /// Explicit browser executable; skips discovery when set.
    pub chrome_path: Option<PathBuf>,
    pub timeouts: Timeouts,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Timeouts {
    #[serde(with = "humantime_serde")]
    pub navigation: Duration,
    #[serde(with = "humantime_serde")]
    pub network_idle: Duration,
    /// How long the network must stay quiet before the page counts as settled.
    #[serde(with = "humantime_serde")]
    pub idle_threshold: Duration,
    #[serde(with = "humantime_serde")]
    pub launch: Duration,
}

impl Default for Timeouts {
    fn default() -> Self {
        Self {
            navigation: Duration::from_secs(30),
            network_idle: Duration::from_secs(10),
            idle_threshold: Duration::from_millis(500),
            launch: Duration::from_secs(20),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            browsers_path: None,
            chrome_path: None,
            timeouts: Timeouts::default(),
        }
    }
}

impl Config {
    /// Load config from a TOML file, or return defaults when no path is given.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let raw = fs::read_to_string(path).map_err(|e| {
            H2pError::Config(format!("Failed to read config {}: {}", path.display(), e))
        })?;
        let cfg: Config = toml::from_str(&raw).map_err(|e| {
            H2pError::Config(format!("Invalid config ({}): {}", path.display(), e))
        })?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<()> {
        if self.port == 0 {
            return Err(H2pError::Config("port must be non-zero".to_string()));
        }
        let t = &self.timeouts;
        for (name, value) in [
            ("navigation", t.navigation),
            ("network_idle", t.network_idle),
            ("idle_threshold", t.idle_threshold),
            ("launch", t.launch),
        ] {
            if value.is_zero() {
                return Err(H2pError::Config(format!(
                    "timeouts.{name} must be greater than zero"
                )));
            }
        }
        if t.idle_threshold >= t.network_idle {
            return Err(H2pError::Config(
                "timeouts.idle_threshold must be shorter than timeouts.network_idle".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{Config, Timeouts};
    use std::io::Write;
    use std::path::PathBuf;
    use std::time::Duration;

    #[test]
    fn default_values_match_expected() {
        let cfg = Config::default();

        assert_eq!(cfg.host, "0.0.0.0");
        assert_eq!(cfg.port, 3000);
        assert!(cfg.browsers_path.is_none());
        assert!(cfg.chrome_path.is_none());
        assert_eq!(cfg.timeouts.navigation, Duration::from_secs(30));
        assert_eq!(cfg.timeouts.network_idle, Duration::from_secs(10));
        assert_eq!(cfg.timeouts.idle_threshold, Duration::from_millis(500));
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn load_without_path_returns_defaults() {
        let cfg = Config::load(None).expect("defaults");
        assert_eq!(cfg, Config::default());
    }

    #[test]
    fn load_reads_partial_toml_with_humantime_durations() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        writeln!(
            file,
            "port = 8080\nbrowsers_path = \"/opt/browsers\"\n\n[timeouts]\nnavigation = \"15s\"\nidle_threshold = \"250ms\""
        )
        .expect("write config");

        let cfg = Config::load(Some(file.path())).expect("valid config");
        assert_eq!(cfg.port, 8080);
        assert_eq!(cfg.host, "0.0.0.0");
        assert_eq!(cfg.browsers_path, Some(PathBuf::from("/opt/browsers")));
        assert_eq!(cfg.timeouts.navigation, Duration::from_secs(15));
        assert_eq!(cfg.timeouts.idle_threshold, Duration::from_millis(250));
        assert_eq!(cfg.timeouts.network_idle, Duration::from_secs(10));
    }

    #[test]
    fn load_rejects_unknown_keys() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        writeln!(file, "viewport = \"1440x900\"").expect("write config");

        let err = Config::load(Some(file.path())).unwrap_err();
        assert!(err.to_string().contains("Invalid config"), "got: {err}");
    }

    #[test]
    fn load_reports_missing_file() {
        let err = Config::load(Some(std::path::Path::new("/definitely/not/here.toml")))
            .unwrap_err();
        assert!(err.to_string().contains("Failed to read config"), "got: {err}");
    }

    #[test]
    fn validate_rejects_zero_port_and_timeouts() {
        let cfg = Config {
            port: 0,
            ..Config::default()
        };
        assert!(cfg.validate().is_err());

        let cfg = Config {
            timeouts: Timeouts {
                navigation: Duration::ZERO,
                ..Timeouts::default()
            },
            ..Config::default()
        };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn validate_rejects_idle_threshold_longer_than_idle_timeout() {
        let cfg = Config {
            timeouts: Timeouts {
                network_idle: Duration::from_millis(400),
                idle_threshold: Duration::from_millis(500),
                ..Timeouts::default()
            },
            ..Config::default()
        };
        assert!(cfg.validate().is_err());
    }
}
