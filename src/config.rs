//! Runtime configuration read from the environment (and `.env`, if present).

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

use crate::generators::engine::DEFAULT_WKHTMLTOPDF_BIN;
use crate::publisher::DEFAULT_EVENT_TOPIC;
use crate::schema::cache::DEFAULT_SCHEMA_CACHE_CAPACITY;

const DEFAULT_EVENT_BUFFER: usize = 100;
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{key} has invalid value '{value}': {reason}")]
    Invalid {
        key: &'static str,
        value: String,
        reason: String,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub schema_cache_capacity: usize,
    pub wkhtmltopdf_bin: PathBuf,
    pub event_topic: String,
    pub event_buffer: usize,
    pub request_timeout: Duration,
    /// JSON file with templates, versions and requests to load at startup.
    pub seed_file: Option<PathBuf>,
    /// Directory that receives rendered files.
    pub output_dir: Option<PathBuf>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            schema_cache_capacity: DEFAULT_SCHEMA_CACHE_CAPACITY,
            wkhtmltopdf_bin: PathBuf::from(DEFAULT_WKHTMLTOPDF_BIN),
            event_topic: DEFAULT_EVENT_TOPIC.to_string(),
            event_buffer: DEFAULT_EVENT_BUFFER,
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
            seed_file: None,
            output_dir: None,
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok(); // Load .env file
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let schema_cache_capacity = match get("DOCGEN_SCHEMA_CACHE_CAPACITY") {
            Some(raw) => parse_positive("DOCGEN_SCHEMA_CACHE_CAPACITY", &raw)?,
            None => defaults.schema_cache_capacity,
        };
        let event_buffer = match get("DOCGEN_EVENT_BUFFER") {
            Some(raw) => parse_positive("DOCGEN_EVENT_BUFFER", &raw)?,
            None => defaults.event_buffer,
        };
        let request_timeout = match get("DOCGEN_REQUEST_TIMEOUT_SECS") {
            Some(raw) => Duration::from_secs(parse_positive("DOCGEN_REQUEST_TIMEOUT_SECS", &raw)?),
            None => defaults.request_timeout,
        };

        Ok(Self {
            schema_cache_capacity,
            wkhtmltopdf_bin: get("DOCGEN_WKHTMLTOPDF_BIN")
                .map(PathBuf::from)
                .unwrap_or(defaults.wkhtmltopdf_bin),
            event_topic: get("DOCGEN_EVENT_TOPIC").unwrap_or(defaults.event_topic),
            event_buffer,
            request_timeout,
            seed_file: get("DOCGEN_SEED_FILE").map(PathBuf::from),
            output_dir: get("DOCGEN_OUTPUT_DIR").map(PathBuf::from),
        })
    }
}

fn parse_positive<T>(key: &'static str, raw: &str) -> Result<T, ConfigError>
where
    T: FromStr + PartialOrd + Default,
    T::Err: std::fmt::Display,
{
    let invalid = |reason: String| ConfigError::Invalid {
        key,
        value: raw.to_string(),
        reason,
    };
    let value: T = raw.trim().parse().map_err(|e: T::Err| invalid(e.to_string()))?;
    if value <= T::default() {
        return Err(invalid("must be greater than zero".to_string()));
    }
    Ok(value)
}
