//! Configuration management.
//!
//! Configuration is read from the first file found in this order, then
//! overridden by environment variables:
//!
//! 1. An explicit path (the `--config` flag)
//! 2. `COMPACK_CONFIG_PATH`
//! 3. The platform config dir (`~/.config/compack/config.toml` on Linux)
//!
//! | Variable | Overrides |
//! |----------|-----------|
//! | `COMPACK_DATABASE_PATH` | `database_path` |
//! | `COMPACK_PACKAGE_ROOT` | `package_root` |
//! | `COMPACK_FAIL_FAST` | `fail_fast` |
//! | `COMPACK_LOG_FORMAT` | `logging.format` |
//! | `COMPACK_LOG` | `logging.filter` |

use crate::{Error, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Environment variable naming an explicit config file.
pub const CONFIG_PATH_ENV: &str = "COMPACK_CONFIG_PATH";

/// Main configuration for compack.
#[derive(Debug, Clone)]
pub struct CompackConfig {
    /// Path to the `SQLite` component database.
    pub database_path: PathBuf,
    /// Default package directory or archive for export and import.
    pub package_root: PathBuf,
    /// Abort batch operations on the first failing entity.
    pub fail_fast: bool,
    /// Logging settings.
    pub logging: LoggingSettings,
}

/// Logging section in the config file.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LoggingSettings {
    /// Output format: `pretty` or `json`.
    pub format: Option<String>,
    /// `EnvFilter` directives, e.g. `compack=debug`.
    pub filter: Option<String>,
    /// Append log output to this file instead of stderr.
    pub file: Option<PathBuf>,
}

/// Configuration file structure (for TOML parsing).
#[derive(Debug, Deserialize, Default)]
pub struct ConfigFile {
    /// Database path.
    pub database_path: Option<String>,
    /// Package root.
    pub package_root: Option<String>,
    /// Fail-fast mode.
    pub fail_fast: Option<bool>,
    /// Logging configuration.
    pub logging: Option<LoggingSettings>,
}

impl Default for CompackConfig {
    fn default() -> Self {
        Self {
            database_path: PathBuf::from(".compack").join("components.db"),
            package_root: PathBuf::from("package"),
            fail_fast: false,
            logging: LoggingSettings::default(),
        }
    }
}

impl CompackConfig {
    /// Creates a new configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads configuration from a file path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| Error::operation("read_config_file", format!("{}: {e}", path.display())))?;
        let file: ConfigFile =
            toml::from_str(&contents).map_err(|e| Error::operation("parse_config_file", e))?;
        Ok(Self::from_config_file(file))
    }

    /// Loads configuration from an explicit path, `COMPACK_CONFIG_PATH`, or
    /// the platform config dir, then applies environment overrides.
    ///
    /// Returns defaults (with overrides) when no file is found.
    ///
    /// # Errors
    ///
    /// Returns an error if an explicitly named file cannot be read or parsed.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let named = explicit
            .map(Path::to_path_buf)
            .or_else(|| std::env::var_os(CONFIG_PATH_ENV).map(PathBuf::from));

        let mut config = match named {
            Some(path) => Self::load_from_file(&path)?,
            None => Self::load_default(),
        };
        config.apply_env_overrides(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// Loads configuration from the platform config dir.
    ///
    /// Returns default configuration if no readable config file is found.
    #[must_use]
    pub fn load_default() -> Self {
        let Some(base_dirs) = directories::BaseDirs::new() else {
            return Self::default();
        };

        let platform_config = base_dirs.config_dir().join("compack").join("config.toml");
        if platform_config.exists() {
            match Self::load_from_file(&platform_config) {
                Ok(config) => return config,
                Err(e) => tracing::warn!(
                    path = %platform_config.display(),
                    error = %e,
                    "Ignoring unreadable config file"
                ),
            }
        }

        Self::default()
    }

    /// Applies environment overrides read through `lookup`.
    pub fn apply_env_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(path) = lookup("COMPACK_DATABASE_PATH") {
            self.database_path = PathBuf::from(path);
        }
        if let Some(root) = lookup("COMPACK_PACKAGE_ROOT") {
            self.package_root = PathBuf::from(root);
        }
        if let Some(fail_fast) = lookup("COMPACK_FAIL_FAST").and_then(|v| parse_bool(&v)) {
            self.fail_fast = fail_fast;
        }
        if let Some(format) = lookup("COMPACK_LOG_FORMAT") {
            self.logging.format = Some(format);
        }
        if let Some(filter) = lookup("COMPACK_LOG") {
            self.logging.filter = Some(filter);
        }
    }

    fn from_config_file(file: ConfigFile) -> Self {
        let mut config = Self::default();

        if let Some(path) = file.database_path {
            config.database_path = PathBuf::from(path);
        }
        if let Some(root) = file.package_root {
            config.package_root = PathBuf::from(root);
        }
        if let Some(fail_fast) = file.fail_fast {
            config.fail_fast = fail_fast;
        }
        if let Some(logging) = file.logging {
            config.logging = logging;
        }

        config
    }

    /// Sets the database path.
    #[must_use]
    pub fn with_database_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.database_path = path.into();
        self
    }

    /// Sets the package root.
    #[must_use]
    pub fn with_package_root(mut self, path: impl Into<PathBuf>) -> Self {
        self.package_root = path.into();
        self
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::TempDir;
    use test_case::test_case;

    #[test]
    fn test_load_from_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            r#"
database_path = "/var/lib/compack/app.db"
fail_fast = true

[logging]
format = "json"
filter = "compack=debug"
"#,
        )
        .unwrap();

        let config = CompackConfig::load(Some(&path)).unwrap();
        assert_eq!(config.database_path, PathBuf::from("/var/lib/compack/app.db"));
        assert_eq!(config.package_root, PathBuf::from("package"));
        assert!(config.fail_fast);
        assert_eq!(config.logging.format.as_deref(), Some("json"));
    }

    #[test]
    fn test_explicit_missing_file_is_an_error() {
        let dir = TempDir::new().unwrap();
        let result = CompackConfig::load(Some(&dir.path().join("absent.toml")));
        assert!(matches!(result, Err(Error::OperationFailed { .. })));
    }

    #[test]
    fn test_env_overrides() {
        let env: HashMap<&str, &str> = HashMap::from([
            ("COMPACK_PACKAGE_ROOT", "bundle.zip"),
            ("COMPACK_FAIL_FAST", "yes"),
            ("COMPACK_LOG", "warn"),
        ]);
        let mut config = CompackConfig::default();
        config.apply_env_overrides(|key| env.get(key).map(ToString::to_string));

        assert_eq!(config.package_root, PathBuf::from("bundle.zip"));
        assert!(config.fail_fast);
        assert_eq!(config.logging.filter.as_deref(), Some("warn"));
        assert_eq!(config.database_path, CompackConfig::default().database_path);
    }

    #[test_case("true", Some(true))]
    #[test_case("OFF", Some(false))]
    #[test_case("maybe", None)]
    fn test_parse_bool(value: &str, expected: Option<bool>) {
        assert_eq!(parse_bool(value), expected);
    }
}
