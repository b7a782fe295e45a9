//! Configuration system using TOML files.
//!
//! Unlike a desktop app, this runs unattended: a missing or malformed config
//! file is fatal at startup rather than silently replaced with defaults. The
//! file location defaults to `config.toml` next to the process and can be
//! overridden with `--config` or the `POD_MINDER_CONFIG` environment variable.
//!
//! ```toml
//! output_path = "downloads"
//! download_times = ["02:00", "14:00"]
//!
//! [[feeds]]
//! url = "https://example.com/feed.xml"
//! title = "My Podcast"   # optional, overrides the feed's own title
//! count = 20             # optional, max episodes to keep
//! ```

use chrono::NaiveTime;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Root directory episodes are archived under
    pub output_path: PathBuf,

    /// Daily run times as "HH:MM" strings. Empty means the 02:00 default.
    pub download_times: Vec<String>,

    /// Feeds to archive, processed in list order
    pub feeds: Vec<FeedConfig>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            output_path: PathBuf::from("downloads"),
            download_times: Vec::new(),
            feeds: Vec::new(),
        }
    }
}

/// Configuration for a single podcast feed
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedConfig {
    /// Feed URL (required)
    pub url: String,

    /// Display title override. When absent the title from the RSS channel
    /// is used.
    #[serde(default)]
    pub title: Option<String>,

    /// Maximum number of episodes to keep. Absent means unlimited: download
    /// everything, never clean up.
    #[serde(default)]
    pub count: Option<usize>,
}

impl Config {
    /// The effective daily run times, falling back to a single 02:00 run.
    ///
    /// Only call on a validated config; [`load`] guarantees every entry
    /// parses.
    pub fn run_times(&self) -> Vec<NaiveTime> {
        let times: Vec<NaiveTime> = self
            .download_times
            .iter()
            .filter_map(|t| parse_time(t).ok())
            .collect();

        if times.is_empty() {
            vec![NaiveTime::from_hms_opt(2, 0, 0).expect("valid constant time")]
        } else {
            times
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.feeds.is_empty() {
            return Err(ConfigError::NoFeeds);
        }
        for (index, feed) in self.feeds.iter().enumerate() {
            if feed.url.trim().is_empty() {
                return Err(ConfigError::MissingFeedUrl { index });
            }
        }
        for time in &self.download_times {
            parse_time(time)?;
        }
        Ok(())
    }
}

fn parse_time(value: &str) -> Result<NaiveTime, ConfigError> {
    NaiveTime::parse_from_str(value, "%H:%M").map_err(|_| ConfigError::InvalidTime {
        value: value.to_string(),
    })
}

/// Load and validate configuration from disk. Any failure is fatal to the
/// whole process.
pub fn load(path: &Path) -> Result<Config, ConfigError> {
    let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;

    let config: Config = toml::from_str(&contents).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })?;

    config.validate()?;
    Ok(config)
}

// ============================================================================
// Error Types
// ============================================================================

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("Config contains no feeds")]
    NoFeeds,

    #[error("Feed entry {index} is missing a url")]
    MissingFeedUrl { index: usize },

    #[error("Invalid download time {value:?}, expected HH:MM")]
    InvalidTime { value: String },
}

// ============================================================================
// Tests
// ============================================================================
