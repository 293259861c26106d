//! Runtime configuration for the `dev` command-line tool.
//!
//! Everything comes from environment variables (optionally loaded from a
//! `.env` file by the binary). Unknown values fall back to defaults.

use std::env;
use std::path::{Path, PathBuf};

/// Log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

impl LogFormat {
    fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "text" => Some(Self::Text),
            "json" => Some(Self::Json),
            _ => None,
        }
    }
}

/// Settings for the CLI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CliConfig {
    /// Output format of log lines on stderr.
    pub log_format: LogFormat,
    /// Force ANSI colors on or off; `None` leaves it to the subscriber.
    pub log_ansi: Option<bool>,
    /// Directory relative key paths are resolved against.
    pub key_dir: PathBuf,
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            log_format: LogFormat::Text,
            log_ansi: None,
            key_dir: PathBuf::from("."),
        }
    }
}

impl CliConfig {
    /// Constructs the configuration from environment variables.
    ///
    /// Environment variables:
    /// - `LOG_FORMAT` - "text" or "json" (default: "text")
    /// - `LOG_ANSI` - boolean override for ANSI colors (default: unset)
    /// - `DEVSPACE_KEY_DIR` - directory for key files (default: ".")
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            log_format: env::var("LOG_FORMAT")
                .ok()
                .and_then(|v| LogFormat::parse(&v))
                .unwrap_or(defaults.log_format),
            log_ansi: env::var("LOG_ANSI").ok().and_then(|v| parse_bool(&v)),
            key_dir: env::var("DEVSPACE_KEY_DIR")
                .ok()
                .filter(|v| !v.trim().is_empty())
                .map(PathBuf::from)
                .unwrap_or(defaults.key_dir),
        }
    }

    /// Resolve a key path: absolute paths are kept, relative ones are placed
    /// under [`CliConfig::key_dir`].
    pub fn key_path(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.key_dir.join(path)
        }
    }
}

/// Parses a boolean, recognizing "true", "1", "yes", "on" and their negatives
/// (case-insensitive).
fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    // Environment variables are process-global, so tests must not run in parallel.
    static ENV_MUTEX: Mutex<()> = Mutex::new(());

    fn clear_env() {
        env::remove_var("LOG_FORMAT");
        env::remove_var("LOG_ANSI");
        env::remove_var("DEVSPACE_KEY_DIR");
    }

    #[test]
    fn test_defaults_without_env() {
        let _guard = ENV_MUTEX.lock().unwrap();
        clear_env();

        assert_eq!(CliConfig::from_env(), CliConfig::default());
    }

    #[test]
    fn test_from_env_overrides() {
        let _guard = ENV_MUTEX.lock().unwrap();
        clear_env();
        env::set_var("LOG_FORMAT", "JSON");
        env::set_var("LOG_ANSI", "off");
        env::set_var("DEVSPACE_KEY_DIR", "/tmp/keys");

        let config = CliConfig::from_env();
        assert_eq!(config.log_format, LogFormat::Json);
        assert_eq!(config.log_ansi, Some(false));
        assert_eq!(config.key_dir, PathBuf::from("/tmp/keys"));

        clear_env();
    }

    #[test]
    fn test_unknown_values_fall_back() {
        let _guard = ENV_MUTEX.lock().unwrap();
        clear_env();
        env::set_var("LOG_FORMAT", "yaml");
        env::set_var("LOG_ANSI", "maybe");
        env::set_var("DEVSPACE_KEY_DIR", "  ");

        assert_eq!(CliConfig::from_env(), CliConfig::default());

        clear_env();
    }

    #[test]
    fn test_parse_bool() {
        for v in ["true", "1", "YES", "On"] {
            assert_eq!(parse_bool(v), Some(true), "{}", v);
        }
        for v in ["false", "0", "no", "OFF"] {
            assert_eq!(parse_bool(v), Some(false), "{}", v);
        }
        assert_eq!(parse_bool(""), None);
    }

    #[test]
    fn test_key_path() {
        let config = CliConfig {
            key_dir: PathBuf::from("/keys"),
            ..Default::default()
        };
        assert_eq!(
            config.key_path(Path::new("alice.key")),
            PathBuf::from("/keys/alice.key")
        );
        assert_eq!(
            config.key_path(Path::new("/abs/bob.pub")),
            PathBuf::from("/abs/bob.pub")
        );
    }
}
