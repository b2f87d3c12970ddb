//! Layered runtime settings.
//!
//! Precedence, lowest to highest: built-in defaults, an optional TOML file,
//! `VITALWATCH_*` environment variables, then CLI flags (applied by the
//! binary after loading).

use std::path::{Path, PathBuf};

use anyhow::Result;
use config::{Config, Environment, File};
use serde::Deserialize;

/// Default backend base URL, matching the development backend.
pub const DEFAULT_API_URL: &str = "http://localhost:5000";

/// Default fleet poll interval in seconds.
pub const DEFAULT_REFRESH_SECS: u64 = 5;

/// Resolved runtime settings.
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    /// Backend base URL.
    pub api_url: String,
    /// Fleet poll interval in seconds.
    pub refresh_secs: u64,
    /// Optional tracing log file. Logging is disabled when unset.
    #[serde(default)]
    pub log_file: Option<PathBuf>,
}

impl Settings {
    /// Load settings from defaults, an optional config file, and the
    /// `VITALWATCH_` environment.
    pub fn load(config_path: Option<&Path>) -> Result<Self> {
        let mut builder = Config::builder()
            .set_default("api_url", DEFAULT_API_URL)?
            .set_default("refresh_secs", DEFAULT_REFRESH_SECS)?;

        if let Some(path) = config_path {
            builder = builder.add_source(File::from(path));
        }

        let settings = builder
            .add_source(Environment::with_prefix("VITALWATCH"))
            .build()?
            .try_deserialize()?;
        Ok(settings)
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            refresh_secs: DEFAULT_REFRESH_SECS,
            log_file: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let settings = Settings::load(None).unwrap();
        assert_eq!(settings.api_url, DEFAULT_API_URL);
        assert_eq!(settings.refresh_secs, DEFAULT_REFRESH_SECS);
        assert!(settings.log_file.is_none());
    }

    #[test]
    fn test_file_overrides_defaults() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(file, "api_url = \"http://backend:9000\"\nrefresh_secs = 30").unwrap();

        let settings = Settings::load(Some(file.path())).unwrap();
        assert_eq!(settings.api_url, "http://backend:9000");
        assert_eq!(settings.refresh_secs, 30);
    }
}
