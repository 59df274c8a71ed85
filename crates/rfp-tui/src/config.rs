use std::env;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};

const DEFAULT_API_URL: &str = "http://localhost:8000";
const DEFAULT_LOG_FILTER: &str = "rfp_tui=info";

#[derive(Debug, Clone)]
pub struct Config {
    pub api_url: String,
    pub request_timeout: Duration,
    pub log_file: PathBuf,
    pub log_filter: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build a config from any key lookup; empty values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let timeout_secs: u64 = get("RFP_REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|| "30".to_string())
            .parse()
            .context("RFP_REQUEST_TIMEOUT_SECS must be a whole number of seconds")?;

        let log_file = match get("RFP_LOG_FILE") {
            Some(path) => PathBuf::from(path),
            None => default_log_file()?,
        };

        Ok(Self {
            api_url: get("RFP_API_URL")
                .unwrap_or_else(|| DEFAULT_API_URL.to_string())
                .trim_end_matches('/')
                .to_string(),
            request_timeout: Duration::from_secs(timeout_secs),
            log_file,
            log_filter: get("RFP_LOG").unwrap_or_else(|| DEFAULT_LOG_FILTER.to_string()),
        })
    }
}

fn default_log_file() -> Result<PathBuf> {
    let dir = dirs::data_local_dir()
        .context("Could not find local data directory for the log file")?
        .join("rfp-tui");
    Ok(dir.join("rfp-tui.log"))
}
