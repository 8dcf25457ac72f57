//! Runtime configuration.
//!
//! Values come from the environment (a `.env` file is loaded by the binary
//! through `dotenvy`) and can be overridden on the command line.
//!
//! | variable                  | default                          |
//! |---------------------------|----------------------------------|
//! | `DATABASE_PATH`           | `customers.sqlite`               |
//! | `REPORT_DIR`              | directory of the executable      |
//! | `COUNTRY_CODES_URL`       | `http://country.io/iso3.json`    |
//! | `COUNTRY_NAMES_URL`       | `http://country.io/names.json`   |
//! | `ALLOW_MISSING_COUNTRIES` | `false`                          |

use std::path::PathBuf;

use crate::countries::CountrySources;
use crate::error::ConfigError;

/// Default SQLite database file.
pub const DEFAULT_DATABASE_PATH: &str = "customers.sqlite";

/// Settings for one import run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportConfig {
    /// SQLite file receiving accepted customers.
    pub database_path: PathBuf,
    /// Where error reports go. `None` means next to the executable.
    pub report_dir: Option<PathBuf>,
    /// Country code service endpoints.
    pub countries: CountrySources,
    /// Continue with no country codes when the service is down.
    pub allow_missing_countries: bool,
}

impl Default for ImportConfig {
    fn default() -> Self {
        Self {
            database_path: PathBuf::from(DEFAULT_DATABASE_PATH),
            report_dir: None,
            countries: CountrySources::default(),
            allow_missing_countries: false,
        }
    }
}

impl ImportConfig {
    /// Read configuration from process environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read configuration through an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let mut config = Self::default();

        if let Some(path) = get("DATABASE_PATH") {
            config.database_path = PathBuf::from(path);
        }
        if let Some(dir) = get("REPORT_DIR") {
            config.report_dir = Some(PathBuf::from(dir));
        }
        if let Some(url) = get("COUNTRY_CODES_URL") {
            config.countries.codes_url = url;
        }
        if let Some(url) = get("COUNTRY_NAMES_URL") {
            config.countries.names_url = url;
        }
        if let Some(flag) = get("ALLOW_MISSING_COUNTRIES") {
            config.allow_missing_countries = parse_bool("ALLOW_MISSING_COUNTRIES", &flag)?;
        }

        Ok(config)
    }

    /// Report directory, falling back to the executable's directory.
    pub fn resolved_report_dir(&self) -> Result<PathBuf, ConfigError> {
        match &self.report_dir {
            Some(dir) => Ok(dir.clone()),
            None => executable_dir(),
        }
    }
}

/// Directory containing the running executable.
pub fn executable_dir() -> Result<PathBuf, ConfigError> {
    let exe = std::env::current_exe()?;
    Ok(exe
        .parent()
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(".")))
}

fn parse_bool(key: &str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::InvalidValue {
            key: key.to_string(),
            value: value.to_string(),
            expected: "true or false",
        }),
    }
}
