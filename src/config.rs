use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::data::model::ColumnNames;

/// Looked up in the working directory at startup.
pub const CONFIG_FILE: &str = "fault-viewer.json";

const DEFAULT_ENDPOINT: &str = "https://script.google.com/macros/s/AKfycbyBjxcu3fe80RS14xvinRYN5Dx6DajsdVcrB_XG4zb2Csl2rKpGxTjoZ6piQ53VFfrnUg/exec";

/// Granularity of the fault date filter.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DateGranularity {
    #[default]
    Day,
    Minute,
}

// ---------------------------------------------------------------------------
// Application configuration
// ---------------------------------------------------------------------------

/// Viewer settings. Every field has a default, so a config file only needs
/// the keys it overrides.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Sheet endpoint (`http(s)://...`) or a local `.json` / `.csv` path.
    pub endpoint: String,
    pub poll_interval_secs: u64,
    pub request_timeout_secs: u64,
    /// Initial granularity of the date filter.
    pub date_granularity: DateGranularity,
    /// Header names used to locate the route, fault time and status columns.
    pub columns: ColumnNames,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            poll_interval_secs: 5 * 60,
            request_timeout_secs: 30,
            date_granularity: DateGranularity::Day,
            columns: ColumnNames::default(),
        }
    }
}

impl AppConfig {
    /// Read [`CONFIG_FILE`] from the working directory. A missing file means
    /// defaults; a malformed one is reported and ignored.
    pub fn load() -> Self {
        let path = Path::new(CONFIG_FILE);
        if !path.exists() {
            log::debug!("no {CONFIG_FILE}, using defaults");
            return Self::default();
        }
        match Self::load_from(path) {
            Ok(cfg) => {
                log::info!("Loaded configuration from {}", path.display());
                cfg
            }
            Err(e) => {
                log::warn!("Ignoring {}: {e:#}", path.display());
                Self::default()
            }
        }
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?;
        serde_json::from_str(&text).with_context(|| format!("parsing {}", path.display()))
    }

    /// Polling period, never shorter than one second.
    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs.max(1))
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs.max(1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults_poll_every_five_minutes() {
        let cfg = AppConfig::default();
        assert_eq!(cfg.poll_interval(), Duration::from_secs(300));
        assert_eq!(cfg.date_granularity, DateGranularity::Day);
        assert!(cfg.endpoint.starts_with("https://"));
    }

    #[test]
    fn partial_file_overrides_only_given_keys() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"endpoint": "faults.json", "date_granularity": "minute",
                "columns": {{"status": ["State"]}}}}"#
        )
        .unwrap();

        let cfg = AppConfig::load_from(file.path()).unwrap();
        assert_eq!(cfg.endpoint, "faults.json");
        assert_eq!(cfg.date_granularity, DateGranularity::Minute);
        assert_eq!(cfg.poll_interval_secs, 300);
        assert_eq!(cfg.columns.status, vec!["State".to_string()]);
        assert_eq!(cfg.columns.route, ColumnNames::default().route);
    }

    #[test]
    fn malformed_file_is_an_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "poll_interval_secs = 5").unwrap();
        assert!(AppConfig::load_from(file.path()).is_err());
    }

    #[test]
    fn zero_interval_is_clamped() {
        let cfg = AppConfig {
            poll_interval_secs: 0,
            ..Default::default()
        };
        assert_eq!(cfg.poll_interval(), Duration::from_secs(1));
    }
}
