//! Configuration types for image-grabber

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Default number of workers per pool, used when a caller passes zero
pub const DEFAULT_WORKER_COUNT: usize = 2;

/// Main configuration for [`ImageGrabber`](crate::ImageGrabber)
///
/// All fields have sensible defaults, so `Config::default()` works out of
/// the box. The destination directory is created on construction if it does
/// not exist; beyond that it is not validated (writability failures surface
/// as download error log lines).
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Config {
    /// Destination directory for downloaded images (default: "./downloads")
    #[serde(default = "default_download_dir")]
    pub download_dir: PathBuf,

    /// Number of workers in each pool (default: 2)
    ///
    /// Used when [`grab_images`](crate::ImageGrabber::grab_images) is called
    /// through a wrapper that does not pass an explicit count. A value of 0
    /// is substituted with [`DEFAULT_WORKER_COUNT`], not treated as an error.
    #[serde(default = "default_worker_count")]
    pub worker_count: usize,

    /// Per-request timeout for page fetches and image downloads (default: 30s)
    #[serde(default = "default_request_timeout")]
    pub request_timeout: Duration,

    /// User-Agent header sent with every request
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            download_dir: default_download_dir(),
            worker_count: default_worker_count(),
            request_timeout: default_request_timeout(),
            user_agent: default_user_agent(),
        }
    }
}

fn default_download_dir() -> PathBuf {
    PathBuf::from("./downloads")
}

fn default_worker_count() -> usize {
    DEFAULT_WORKER_COUNT
}

fn default_request_timeout() -> Duration {
    Duration::from_secs(30)
}

fn default_user_agent() -> String {
    format!("image-grabber/{}", env!("CARGO_PKG_VERSION"))
}
