//! File configuration for the command-line client.
//!
//! The file is TOML at `$XDG_CONFIG_HOME/maimai-net/config.toml`, falling
//! back to `$HOME/.config/maimai-net/config.toml`. Every key is optional.
//! Passwords are never read from the file.

use std::env;
use std::ffi::OsString;
use std::fs;
use std::ops::RangeInclusive;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

use crate::client::{Backoff, ClientOptions, DEFAULT_MAX_RETRIES, RetryPolicy, TransportOptions};
use crate::region::{Region, RegionConfig};

const CONFIG_DIR: &str = "maimai-net";
const CONFIG_FILE: &str = "config.toml";

const MAX_RETRIES_RANGE: RangeInclusive<u32> = 0..=10;
const BACKOFF_MS_RANGE: RangeInclusive<u64> = 0..=60_000;
const TIMEOUT_SECS_RANGE: RangeInclusive<u64> = 1..=3600;

/// Errors raised while loading the config file.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file '{}': {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(
        "failed to parse config file '{}': {source}\n  Suggestion: Check the key names and value types",
        path.display()
    )]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("invalid config value for `{field}`: {value}. Expected range: {expected}")]
    OutOfRange {
        field: &'static str,
        value: u64,
        expected: String,
    },
}

/// Values read from the config file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    pub region: Option<Region>,
    pub username: Option<String>,
    pub max_retries: Option<u32>,
    /// Base delay of exponential backoff; absent or 0 retries immediately.
    pub backoff_ms: Option<u64>,
    pub connect_timeout_secs: Option<u64>,
    pub read_timeout_secs: Option<u64>,
}

impl FileConfig {
    /// Checks every value against its allowed range.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::OutOfRange`] for the first offending key.
    pub fn validate(&self) -> Result<(), ConfigError> {
        check_range("max_retries", self.max_retries.map(u64::from), &widen(&MAX_RETRIES_RANGE))?;
        check_range("backoff_ms", self.backoff_ms, &BACKOFF_MS_RANGE)?;
        check_range("connect_timeout_secs", self.connect_timeout_secs, &TIMEOUT_SECS_RANGE)?;
        check_range("read_timeout_secs", self.read_timeout_secs, &TIMEOUT_SECS_RANGE)?;
        Ok(())
    }

    /// Client options with built-in defaults for missing keys.
    #[must_use]
    pub fn client_options(&self) -> ClientOptions {
        let defaults = TransportOptions::default();
        let backoff = self
            .backoff_ms
            .filter(|ms| *ms > 0)
            .map(|ms| Backoff::from_base(Duration::from_millis(ms)));
        ClientOptions {
            region: RegionConfig::for_region(self.region.unwrap_or_default()),
            retry: RetryPolicy::new(self.max_retries.unwrap_or(DEFAULT_MAX_RETRIES), backoff),
            transport: TransportOptions {
                connect_timeout: self
                    .connect_timeout_secs
                    .map_or(defaults.connect_timeout, Duration::from_secs),
                read_timeout: self
                    .read_timeout_secs
                    .map_or(defaults.read_timeout, Duration::from_secs),
            },
        }
    }
}

fn widen(range: &RangeInclusive<u32>) -> RangeInclusive<u64> {
    u64::from(*range.start())..=u64::from(*range.end())
}

fn check_range(
    field: &'static str,
    value: Option<u64>,
    range: &RangeInclusive<u64>,
) -> Result<(), ConfigError> {
    match value {
        Some(value) if !range.contains(&value) => Err(ConfigError::OutOfRange {
            field,
            value,
            expected: format!("{}..={}", range.start(), range.end()),
        }),
        _ => Ok(()),
    }
}

/// Config file that was looked for, and what it held.
#[derive(Debug, Clone, Default)]
pub struct LoadedConfig {
    pub path: Option<PathBuf>,
    pub config: Option<FileConfig>,
}

/// Resolves the default config path.
///
/// Priority:
/// 1. `$XDG_CONFIG_HOME/maimai-net/config.toml`
/// 2. `$HOME/.config/maimai-net/config.toml`
#[must_use]
pub fn resolve_default_config_path() -> Option<PathBuf> {
    config_path_from(env_var_non_empty_os("XDG_CONFIG_HOME"), env_var_non_empty_os("HOME"))
}

fn config_path_from(xdg_config_home: Option<OsString>, home: Option<OsString>) -> Option<PathBuf> {
    if let Some(xdg_config_home) = xdg_config_home {
        return Some(PathBuf::from(xdg_config_home).join(CONFIG_DIR).join(CONFIG_FILE));
    }
    let home = home?;
    Some(PathBuf::from(home).join(".config").join(CONFIG_DIR).join(CONFIG_FILE))
}

fn env_var_non_empty_os(name: &str) -> Option<OsString> {
    env::var_os(name).filter(|value| !value.is_empty())
}

/// Loads the config from the default path if the file exists.
///
/// # Errors
///
/// See [`load_file_config`].
pub fn load_default_file_config() -> Result<LoadedConfig, ConfigError> {
    let path = resolve_default_config_path();
    let config = match path.as_deref() {
        Some(path) if path.exists() => Some(load_file_config(path)?),
        _ => None,
    };
    Ok(LoadedConfig { path, config })
}

/// Reads, parses and validates a config file.
///
/// # Errors
///
/// - [`ConfigError::Read`] when the file cannot be read.
/// - [`ConfigError::Parse`] for TOML syntax errors, unknown keys or wrong
///   value types.
/// - [`ConfigError::OutOfRange`] for values outside their range.
pub fn load_file_config(path: &Path) -> Result<FileConfig, ConfigError> {
    let raw = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let config = parse_config_str(&raw, path)?;
    debug!(path = %path.display(), "config file loaded");
    Ok(config)
}

fn parse_config_str(raw: &str, path: &Path) -> Result<FileConfig, ConfigError> {
    let config: FileConfig = toml::from_str(raw).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })?;
    config.validate()?;
    Ok(config)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use tempfile::TempDir;

    use super::*;

    #[test]
    fn test_parse_config_all_fields() {
        let config = parse_config_str(
            r#"
region = "asia"
username = "player@example.com" # login id
max_retries = 5
backoff_ms = 250
connect_timeout_secs = 5
read_timeout_secs = 60
"#,
            Path::new("config.toml"),
        )
        .unwrap();

        assert_eq!(config.region, Some(Region::Asia));
        assert_eq!(config.username.as_deref(), Some("player@example.com"));

        let options = config.client_options();
        assert_eq!(options.region.region(), Region::Asia);
        assert_eq!(options.retry.max_retries(), 5);
        assert_eq!(
            options.retry.backoff().map(|backoff| backoff.base_delay),
            Some(Duration::from_millis(250))
        );
        assert_eq!(options.transport.connect_timeout, Duration::from_secs(5));
        assert_eq!(options.transport.read_timeout, Duration::from_secs(60));
    }

    #[test]
    fn test_empty_config_uses_defaults() {
        let options = parse_config_str("", Path::new("config.toml")).unwrap().client_options();
        assert_eq!(options.region.region(), Region::Japan);
        assert_eq!(options.retry.max_retries(), DEFAULT_MAX_RETRIES);
        assert!(options.retry.backoff().is_none());
        assert_eq!(options.transport, TransportOptions::default());
    }

    #[test]
    fn test_out_of_range_values_are_rejected() {
        let err = parse_config_str("max_retries = 11", Path::new("c.toml")).unwrap_err();
        assert_eq!(
            err.to_string(),
            "invalid config value for `max_retries`: 11. Expected range: 0..=10"
        );

        let err = parse_config_str("read_timeout_secs = 0", Path::new("c.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::OutOfRange { field: "read_timeout_secs", .. }));
    }

    #[test]
    fn test_password_and_unknown_keys_are_rejected() {
        let err = parse_config_str("password = \"secret\"", Path::new("c.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }), "{err:?}");

        let err = parse_config_str("region = \"europe\"", Path::new("c.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }), "{err:?}");
    }

    #[test]
    fn test_load_file_config_reads_from_disk() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(CONFIG_FILE);
        fs::write(&path, "region = \"japan\"\nmax_retries = 0\n").unwrap();

        let config = load_file_config(&path).unwrap();
        assert_eq!(config.region, Some(Region::Japan));
        assert_eq!(config.max_retries, Some(0));

        let missing = load_file_config(&dir.path().join("missing.toml")).unwrap_err();
        assert!(matches!(missing, ConfigError::Read { .. }));
    }

    #[test]
    fn test_config_path_priority() {
        let path = config_path_from(Some("/xdg".into()), Some("/home/u".into())).unwrap();
        assert_eq!(path, PathBuf::from("/xdg/maimai-net/config.toml"));

        let path = config_path_from(None, Some("/home/u".into())).unwrap();
        assert_eq!(path, PathBuf::from("/home/u/.config/maimai-net/config.toml"));

        assert!(config_path_from(None, None).is_none());
    }
}
