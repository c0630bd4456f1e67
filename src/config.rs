/// Service configuration.
///
/// Everything that used to be a process-wide constant (API endpoint, bidding
/// area, page limit, file paths) lives here and is injected into each run.
/// Values come from, in increasing precedence:
///   1. built-in defaults
///   2. `genmon.toml` (or the file named by `GENMON_CONFIG`)
///   3. `GENMON_*` environment variables, including ones set via `.env`

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::logging::LogLevel;
use crate::model::GenmonError;

/// Nord Pool UMM message endpoint.
pub const DEFAULT_UMM_URL: &str = "https://ummapi.nordpoolgroup.com/messages";

/// EIC code of the Irish single-electricity-market bidding area.
pub const DEFAULT_AREA: &str = "10Y1001A1001A59C";

pub const DEFAULT_CONFIG_PATH: &str = "genmon.toml";

// ---------------------------------------------------------------------------
// Sections
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ApiConfig {
    pub base_url: String,
    /// Bidding area code passed as `areas`.
    pub area: String,
    /// Upper bound on returned messages, passed as `limit`.
    pub limit: u32,
    pub timeout_secs: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_UMM_URL.to_string(),
            area: DEFAULT_AREA.to_string(),
            limit: 500,
            timeout_secs: 30,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PathsConfig {
    pub registry_csv: PathBuf,
    pub output_geojson: PathBuf,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            registry_csv: PathBuf::from("data").join("generators.csv"),
            output_geojson: PathBuf::from("public").join("status.geojson"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoggingConfig {
    pub level: String,
    /// Append log entries to this file as well as the console.
    pub file: Option<String>,
    pub timestamps: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            file: None,
            timestamps: false,
        }
    }
}

impl LoggingConfig {
    pub fn min_level(&self) -> Result<LogLevel, GenmonError> {
        self.level.parse()
    }
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AppConfig {
    pub api: ApiConfig,
    pub paths: PathsConfig,
    pub logging: LoggingConfig,
}

// ---------------------------------------------------------------------------
// Loading
// ---------------------------------------------------------------------------

impl AppConfig {
    /// Loads configuration for a process run.
    ///
    /// A missing `genmon.toml` means defaults; a missing file explicitly named
    /// by `GENMON_CONFIG` is an error.
    pub fn load() -> Result<Self, GenmonError> {
        dotenv::dotenv().ok();

        let mut cfg = match env::var("GENMON_CONFIG") {
            Ok(path) => Self::from_file(Path::new(&path))?,
            Err(_) => {
                let path = Path::new(DEFAULT_CONFIG_PATH);
                if path.exists() {
                    Self::from_file(path)?
                } else {
                    Self::default()
                }
            }
        };

        cfg.apply_overrides(|key| env::var(key).ok())?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn from_file(path: &Path) -> Result<Self, GenmonError> {
        let contents = fs::read_to_string(path).map_err(|e| GenmonError::io(path, e))?;
        Self::from_toml(&contents)
    }

    pub fn from_toml(contents: &str) -> Result<Self, GenmonError> {
        toml::from_str(contents).map_err(|e| GenmonError::Config(e.to_string()))
    }

    /// Applies `GENMON_*` overrides. `lookup` is `env::var` in production and
    /// a map in tests.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<(), GenmonError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup("GENMON_UMM_URL") {
            self.api.base_url = url;
        }
        if let Some(area) = lookup("GENMON_AREA") {
            self.api.area = area;
        }
        if let Some(limit) = lookup("GENMON_LIMIT") {
            self.api.limit = limit
                .trim()
                .parse()
                .map_err(|_| GenmonError::Config(format!("GENMON_LIMIT is not a number: '{limit}'")))?;
        }
        if let Some(path) = lookup("GENMON_REGISTRY") {
            self.paths.registry_csv = PathBuf::from(path);
        }
        if let Some(path) = lookup("GENMON_OUTPUT") {
            self.paths.output_geojson = PathBuf::from(path);
        }
        if let Some(level) = lookup("GENMON_LOG_LEVEL") {
            self.logging.level = level;
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<(), GenmonError> {
        if self.api.base_url.trim().is_empty() {
            return Err(GenmonError::Config("api.base_url must not be empty".to_string()));
        }
        if self.api.area.trim().is_empty() {
            return Err(GenmonError::Config("api.area must not be empty".to_string()));
        }
        if self.api.limit == 0 {
            return Err(GenmonError::Config("api.limit must be greater than 0".to_string()));
        }
        // A zero timeout would let an unreachable endpoint hang the run.
        if self.api.timeout_secs == 0 {
            return Err(GenmonError::Config("api.timeout_secs must be greater than 0".to_string()));
        }
        self.logging.min_level()?;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
