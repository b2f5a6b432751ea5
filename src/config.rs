//! Configuration types for tune-dl

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::{net::SocketAddr, path::PathBuf, time::Duration};

/// Selection dialogue configuration
///
/// Used as a nested sub-config within [`Config`].
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SelectionConfig {
    /// Number of items shown per result page (default: 10)
    #[serde(default = "default_page_size")]
    pub page_size: usize,
}

impl Default for SelectionConfig {
    fn default() -> Self {
        Self {
            page_size: default_page_size(),
        }
    }
}

/// Fetch pipeline configuration (temp storage, concurrency, retry)
///
/// Used as a nested sub-config within [`Config`].
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct FetchConfig {
    /// Directory for fetched audio artifacts before delivery (default: "./tmp-audio")
    #[serde(default = "default_temp_dir")]
    pub temp_dir: PathBuf,

    /// Number of concurrent fetch workers (default: 4)
    ///
    /// Fixed pool size, independent of batch size. Items beyond the pool
    /// size wait for a free worker.
    #[serde(default = "default_worker_pool_size")]
    pub worker_pool_size: usize,

    /// Retry behavior for fetch attempts
    #[serde(flatten)]
    pub retry: RetryConfig,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            temp_dir: default_temp_dir(),
            worker_pool_size: default_worker_pool_size(),
            retry: RetryConfig::default(),
        }
    }
}

/// Media host recognition configuration
///
/// Used as a nested sub-config within [`Config`].
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct MediaConfig {
    /// Hosts a media locator may belong to; anything else is treated as
    /// "not found" and never passed to the fetcher
    #[serde(default = "default_allowed_hosts")]
    pub allowed_hosts: Vec<String>,

    /// Hosts recognized as streaming-service references requiring a
    /// metadata lookup (track/album/playlist/artist links)
    #[serde(default = "default_streaming_hosts")]
    pub streaming_hosts: Vec<String>,
}

impl Default for MediaConfig {
    fn default() -> Self {
        Self {
            allowed_hosts: default_allowed_hosts(),
            streaming_hosts: default_streaming_hosts(),
        }
    }
}

/// Liveness endpoint configuration
///
/// Used as a nested sub-config within [`Config`].
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct LivenessConfig {
    /// Whether to expose the keep-alive HTTP endpoint (default: true)
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Bind address for the liveness endpoint (default: 0.0.0.0:8080)
    #[serde(default = "default_liveness_address")]
    pub bind_address: SocketAddr,
}

impl Default for LivenessConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            bind_address: default_liveness_address(),
        }
    }
}

/// Retry configuration for fetch attempts
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Total number of attempts per item, including the first (default: 3)
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Delay before the second attempt, in milliseconds (default: 500ms)
    #[serde(default = "default_initial_delay", with = "duration_serde")]
    pub initial_delay: Duration,

    /// Maximum delay between attempts, in milliseconds (default: 10s)
    #[serde(default = "default_max_delay", with = "duration_serde")]
    pub max_delay: Duration,

    /// Multiplier for exponential backoff (default: 2.0)
    #[serde(default = "default_backoff_multiplier")]
    pub backoff_multiplier: f64,

    /// Add random jitter to delays (default: true)
    #[serde(default = "default_true")]
    pub jitter: bool,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            initial_delay: default_initial_delay(),
            max_delay: default_max_delay(),
            backoff_multiplier: 2.0,
            jitter: true,
        }
    }
}

/// Main configuration for [`TuneDownloader`](crate::TuneDownloader)
///
/// Fields are organized into logical sub-configs:
/// - [`selection`](SelectionConfig) for paging behavior
/// - [`fetch`](FetchConfig) for temp storage, concurrency and retry
/// - [`media`](MediaConfig) for host recognition
/// - [`liveness`](LivenessConfig) for the keep-alive endpoint
///
/// All sub-config fields are flattened so the JSON/TOML format stays flat.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Config {
    /// Selection dialogue settings
    #[serde(flatten)]
    pub selection: SelectionConfig,

    /// Fetch pipeline settings
    #[serde(flatten)]
    pub fetch: FetchConfig,

    /// Media host recognition settings
    #[serde(flatten)]
    pub media: MediaConfig,

    /// Liveness endpoint settings
    #[serde(flatten)]
    pub liveness: LivenessConfig,
}

impl Config {
    /// Validate settings that would break the engine's invariants
    pub fn validate(&self) -> Result<()> {
        if self.selection.page_size == 0 {
            return Err(Error::Config {
                message: "page_size must be at least 1".to_string(),
                key: Some("page_size".to_string()),
            });
        }
        if self.fetch.worker_pool_size == 0 {
            return Err(Error::Config {
                message: "worker_pool_size must be at least 1".to_string(),
                key: Some("worker_pool_size".to_string()),
            });
        }
        if self.fetch.retry.max_attempts == 0 {
            return Err(Error::Config {
                message: "max_attempts must be at least 1".to_string(),
                key: Some("max_attempts".to_string()),
            });
        }
        Ok(())
    }
}

fn default_page_size() -> usize {
    10
}

fn default_temp_dir() -> PathBuf {
    PathBuf::from("./tmp-audio")
}

fn default_worker_pool_size() -> usize {
    4
}

fn default_allowed_hosts() -> Vec<String> {
    vec![
        "youtube.com".to_string(),
        "youtu.be".to_string(),
        "music.youtube.com".to_string(),
    ]
}

fn default_streaming_hosts() -> Vec<String> {
    vec!["open.spotify.com".to_string(), "spotify.com".to_string()]
}

fn default_liveness_address() -> SocketAddr {
    "0.0.0.0:8080".parse().unwrap_or_else(|_| {
        SocketAddr::from(([0, 0, 0, 0], 8080))
    })
}

fn default_max_attempts() -> u32 {
    3
}

fn default_backoff_multiplier() -> f64 {
    2.0
}

fn default_initial_delay() -> Duration {
    Duration::from_millis(500)
}

fn default_max_delay() -> Duration {
    Duration::from_secs(10)
}

fn default_true() -> bool {
    true
}

// Duration serialization helper (milliseconds)
mod duration_serde {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u64(duration.as_millis() as u64)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let millis = u64::deserialize(deserializer)?;
        Ok(Duration::from_millis(millis))
    }
}
