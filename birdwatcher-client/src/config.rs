//! Configuration loading for the birdwatcher client.
//!
//! All fields are required unless explicitly marked optional. No defaults.

use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ClientConfig {
    /// Explicit tool path; falls back to `BIRDWATCHER_BIN`, then `PATH`.
    pub binary_path: Option<PathBuf>,
    /// etcd address, e.g. `localhost:2379`. Without it no connect prefix is sent.
    pub etcd_addr: Option<String>,
    /// Milvus root path in etcd, e.g. `by-dev`.
    pub root_path: Option<String>,
    pub auto_detect: bool,
    pub timeout_secs: u64,
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing configuration file path (use --config or BIRDWATCHER_CONFIG)")]
    MissingConfigPath,
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("Invalid config value for {field}: {reason}")]
    InvalidValue { field: &'static str, reason: String },
}

impl ClientConfig {
    pub fn load() -> Result<Self, ConfigError> {
        let path = config_path_from_args().or_else(config_path_from_env);
        let path = path.ok_or(ConfigError::MissingConfigPath)?;
        let config = Self::from_path(&path)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml(&contents)
    }

    pub fn from_toml(contents: &str) -> Result<Self, ConfigError> {
        let config: ClientConfig = toml::from_str(contents)?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.timeout_secs == 0 {
            return Err(ConfigError::InvalidValue {
                field: "timeout_secs",
                reason: "must be > 0".to_string(),
            });
        }
        if let Some(addr) = &self.etcd_addr {
            if addr.trim().is_empty() {
                return Err(ConfigError::InvalidValue {
                    field: "etcd_addr",
                    reason: "must not be empty".to_string(),
                });
            }
            if addr.contains(char::is_whitespace) || addr.contains(',') {
                return Err(ConfigError::InvalidValue {
                    field: "etcd_addr",
                    reason: "must not contain whitespace or ','".to_string(),
                });
            }
        }
        if let Some(root) = &self.root_path {
            if root.trim().is_empty() {
                return Err(ConfigError::InvalidValue {
                    field: "root_path",
                    reason: "must not be empty".to_string(),
                });
            }
        }
        if self.root_path.is_some() && self.etcd_addr.is_none() {
            return Err(ConfigError::InvalidValue {
                field: "root_path",
                reason: "requires etcd_addr".to_string(),
            });
        }
        if let Some(path) = &self.binary_path {
            if path.as_os_str().is_empty() {
                return Err(ConfigError::InvalidValue {
                    field: "binary_path",
                    reason: "must not be empty".to_string(),
                });
            }
        }
        Ok(())
    }
}

fn config_path_from_env() -> Option<PathBuf> {
    std::env::var("BIRDWATCHER_CONFIG").ok().map(PathBuf::from)
}

fn config_path_from_args() -> Option<PathBuf> {
    let mut args = std::env::args().skip(1);
    while let Some(arg) = args.next() {
        if arg == "--config" {
            return args.next().map(PathBuf::from);
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_config() -> ClientConfig {
        ClientConfig {
            binary_path: None,
            etcd_addr: Some("localhost:2379".to_string()),
            root_path: Some("by-dev".to_string()),
            auto_detect: false,
            timeout_secs: 30,
        }
    }

    #[test]
    fn test_base_config_is_valid() {
        assert!(base_config().validate().is_ok());
    }

    #[test]
    fn test_rejects_zero_timeout() {
        let mut config = base_config();
        config.timeout_secs = 0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidValue { field: "timeout_secs", .. })
        ));
    }

    #[test]
    fn test_rejects_root_path_without_address() {
        let mut config = base_config();
        config.etcd_addr = None;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidValue { field: "root_path", .. })
        ));
    }

    #[test]
    fn test_rejects_address_with_separator() {
        let mut config = base_config();
        config.etcd_addr = Some("a:2379, show session".to_string());
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_parses_toml() {
        let config = ClientConfig::from_toml(
            r#"
etcd_addr = "etcd.milvus.svc:2379"
auto_detect = true
timeout_secs = 60
"#,
        )
        .unwrap();
        assert_eq!(config.etcd_addr.as_deref(), Some("etcd.milvus.svc:2379"));
        assert!(config.auto_detect);
        assert_eq!(config.timeout_secs, 60);
        assert!(config.root_path.is_none());
    }

    #[test]
    fn test_rejects_unknown_fields() {
        let result = ClientConfig::from_toml("auto_detect = true\ntimeout_secs = 5\ncolour = \"red\"\n");
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_requires_timeout() {
        let result = ClientConfig::from_toml("auto_detect = true\n");
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }
}
