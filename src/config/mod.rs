use crate::error::{Error, Result};
use crate::notify::NOTICE_TTL;
use crate::sync::POLL_INTERVAL;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Base URL of the task backend API.
    pub server_url: String,
    /// Seconds between synchronization rounds.
    pub poll_interval_secs: u64,
    /// How long a notice stays visible, in milliseconds.
    pub notice_ttl_ms: u64,
    /// Default platform for new tasks.
    pub platform: String,
    /// Default number of videos to analyze per task.
    pub max_videos: u32,
    /// Per-request HTTP timeout in seconds.
    pub request_timeout_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server_url: "http://127.0.0.1:8000/api".to_string(),
            poll_interval_secs: POLL_INTERVAL.as_secs(),
            notice_ttl_ms: NOTICE_TTL.as_millis() as u64,
            platform: "bilibili".to_string(),
            max_videos: 10,
            request_timeout_secs: 30,
        }
    }
}

impl Config {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }

    pub fn notice_ttl(&self) -> Duration {
        Duration::from_millis(self.notice_ttl_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn load() -> Result<Self> {
        let path = dirs::config_dir()
            .map(|d| d.join("vidwatch").join("config.toml"))
            .unwrap_or_else(|| PathBuf::from(".vidwatch/config.toml"));
        Self::load_from(&path)
    }

    /// Load from `path`, falling back to defaults if the file is absent.
    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path)?;
            toml::from_str(&content)
                .map_err(|e| Error::Config(format!("{}: {e}", path.display())))
        } else {
            Ok(Self::default())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults_match_engine_constants() {
        let config = Config::default();
        assert_eq!(config.poll_interval(), POLL_INTERVAL);
        assert_eq!(config.notice_ttl(), NOTICE_TTL);
        assert_eq!(config.platform, "bilibili");
    }

    #[test]
    fn test_partial_file_fills_in_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "server_url = \"http://10.0.0.5:9000/api\"").unwrap();
        writeln!(file, "poll_interval_secs = 5").unwrap();

        let config = Config::load_from(file.path()).unwrap();
        assert_eq!(config.server_url, "http://10.0.0.5:9000/api");
        assert_eq!(config.poll_interval(), Duration::from_secs(5));
        assert_eq!(config.max_videos, 10);
    }

    #[test]
    fn test_malformed_file_reports_config_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "poll_interval_secs = \"three\"").unwrap();

        let err = Config::load_from(file.path()).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
        assert!(err.to_string().starts_with("Configuration error"));
    }

    #[test]
    fn test_missing_file_yields_defaults() {
        let config = Config::load_from(Path::new("/nonexistent/vidwatch.toml")).unwrap();
        assert_eq!(config.server_url, Config::default().server_url);
    }
}
