//! Configuration.
//!
//! Values come from an optional TOML file (`<config dir>/icovid/config.toml`
//! unless `--config` names another) and are overridden by command line flags.
//!
//! ```toml
//! db_path = "/srv/icovid/icovid.db"
//! create_if_missing = true
//! history_days = 14
//! interval = "1h"
//!
//! [[sources]]
//! path = "/srv/icovid/sources/ukr.json"
//! region_policy = "skip"
//! ```

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::cli::GlobalArgs;
use crate::update::source::RegionPolicy;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config {}: {source}", .path.display())]
    Toml {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("invalid interval \"{value}\": {source}")]
    Interval {
        value: String,
        #[source]
        source: humantime::DurationError,
    },

    #[error("could not determine the data directory, pass --db")]
    NoDataDir,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SourceEntry {
    pub path: PathBuf,
    #[serde(default)]
    pub region_policy: RegionPolicy,
}

#[derive(Debug, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct FileConfig {
    db_path: Option<PathBuf>,
    create_if_missing: bool,
    history_days: usize,
    interval: String,
    sources: Vec<SourceEntry>,
}

impl Default for FileConfig {
    fn default() -> Self {
        FileConfig {
            db_path: None,
            create_if_missing: false,
            history_days: 14,
            interval: "1h".to_string(),
            sources: Vec::new(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub db_path: PathBuf,
    /// Answer to "create the store" when running unattended.
    pub create_if_missing: bool,
    pub history_days: usize,
    pub interval: Duration,
    pub sources: Vec<SourceEntry>,
    pub verbose: bool,
    pub color: bool,
}

fn project_dirs() -> Option<directories::ProjectDirs> {
    directories::ProjectDirs::from("", "", "icovid")
}

/// Default config path (~/.config/icovid/config.toml or platform equivalent)
pub fn default_config_path() -> Option<PathBuf> {
    project_dirs().map(|dirs| dirs.config_dir().join("config.toml"))
}

/// Default store path (~/.local/share/icovid/icovid.db or platform equivalent)
pub fn default_db_path() -> Option<PathBuf> {
    project_dirs().map(|dirs| dirs.data_dir().join("icovid.db"))
}

pub fn parse_interval(value: &str) -> Result<Duration, ConfigError> {
    humantime::parse_duration(value).map_err(|source| ConfigError::Interval {
        value: value.to_string(),
        source,
    })
}

impl Config {
    /// Load the config file named by `--config`, or the default one if it exists,
    /// then apply the global flags.
    pub fn load(args: &GlobalArgs) -> Result<Self, ConfigError> {
        let file = match (&args.config, default_config_path()) {
            (Some(path), _) => read_file_config(path)?,
            (None, Some(path)) => match read_file_config(&path) {
                Err(ConfigError::Io { source, .. }) if source.kind() == ErrorKind::NotFound => {
                    FileConfig::default()
                }
                other => other?,
            },
            (None, None) => FileConfig::default(),
        };

        Self::resolve(file, args)
    }

    /// Build a config from TOML text, then apply the global flags.
    pub fn from_toml(text: &str, args: &GlobalArgs) -> Result<Self, ConfigError> {
        let file = toml::from_str(text).map_err(|source| ConfigError::Toml {
            path: PathBuf::from("<inline>"),
            source,
        })?;
        Self::resolve(file, args)
    }

    fn resolve(file: FileConfig, args: &GlobalArgs) -> Result<Self, ConfigError> {
        let db_path = args
            .db
            .clone()
            .or(file.db_path)
            .or_else(default_db_path)
            .ok_or(ConfigError::NoDataDir)?;

        Ok(Config {
            db_path,
            create_if_missing: file.create_if_missing,
            history_days: file.history_days,
            interval: parse_interval(&file.interval)?,
            sources: file.sources,
            verbose: args.verbose,
            color: !args.no_color,
        })
    }
}

fn read_file_config(path: &Path) -> Result<FileConfig, ConfigError> {
    let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    toml::from_str(&text).map_err(|source| ConfigError::Toml {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args_with_db() -> GlobalArgs {
        GlobalArgs {
            db: Some(PathBuf::from("/tmp/icovid.db")),
            ..Default::default()
        }
    }

    #[test]
    fn empty_file_uses_defaults() {
        let config = Config::from_toml("", &args_with_db()).unwrap();
        assert_eq!(config.history_days, 14);
        assert_eq!(config.interval, Duration::from_secs(3600));
        assert!(!config.create_if_missing);
        assert!(config.sources.is_empty());
        assert!(config.color);
    }

    #[test]
    fn file_values_are_read() {
        let text = r#"
            db_path = "/srv/icovid.db"
            create_if_missing = true
            history_days = 7
            interval = "30m"

            [[sources]]
            path = "ukr.json"
            region_policy = "skip"

            [[sources]]
            path = "pol.json"
        "#;

        let config = Config::from_toml(text, &GlobalArgs::default()).unwrap();
        assert_eq!(config.db_path, PathBuf::from("/srv/icovid.db"));
        assert!(config.create_if_missing);
        assert_eq!(config.history_days, 7);
        assert_eq!(config.interval, Duration::from_secs(1800));
        assert_eq!(config.sources[0].region_policy, RegionPolicy::Skip);
        assert_eq!(config.sources[1].region_policy, RegionPolicy::Abort);
    }

    #[test]
    fn db_flag_overrides_file() {
        let config = Config::from_toml(r#"db_path = "/srv/icovid.db""#, &args_with_db()).unwrap();
        assert_eq!(config.db_path, PathBuf::from("/tmp/icovid.db"));
    }

    #[test]
    fn bad_interval_is_an_error() {
        let err = Config::from_toml(r#"interval = "soon""#, &args_with_db()).unwrap_err();
        assert!(matches!(err, ConfigError::Interval { .. }));
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let err = Config::from_toml("ftp_login = \"x\"", &args_with_db()).unwrap_err();
        assert!(matches!(err, ConfigError::Toml { .. }));
    }

    #[test]
    fn missing_explicit_config_is_an_error() {
        let args = GlobalArgs {
            config: Some(PathBuf::from("/nonexistent/icovid.toml")),
            ..args_with_db()
        };
        assert!(matches!(Config::load(&args), Err(ConfigError::Io { .. })));
    }
}
