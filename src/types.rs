//! Core types for image-grabber

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// URL of an HTML page to fetch and parse for an image reference
///
/// Opaque to the pipeline: it is handed to the transport collaborator as-is.
/// Each page URL supplied to [`ImageGrabber::grab_images`] is dequeued by
/// exactly one fetch-parse worker, exactly once.
///
/// [`ImageGrabber::grab_images`]: crate::ImageGrabber::grab_images
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PageUrl(pub String);

impl PageUrl {
    /// Create a new PageUrl
    pub fn new(url: impl Into<String>) -> Self {
        Self(url.into())
    }

    /// The URL as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for PageUrl {
    fn from(url: String) -> Self {
        Self(url)
    }
}

impl From<&str> for PageUrl {
    fn from(url: &str) -> Self {
        Self(url.to_string())
    }
}

impl std::fmt::Display for PageUrl {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// URL of a downloadable image resource, derived from a page's content
///
/// Produced at most once per [`PageUrl`] by a parser; consumed exactly once
/// by a download worker.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ImageUrl(pub String);

impl ImageUrl {
    /// Create a new ImageUrl
    pub fn new(url: impl Into<String>) -> Self {
        Self(url.into())
    }

    /// The URL as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Local filename for this image: the substring after the final `/`
    ///
    /// Two different URLs with the same final segment collide on disk and
    /// the last write wins; no uniqueness guarantee is made.
    pub fn file_name(&self) -> &str {
        match self.0.rfind('/') {
            Some(idx) => &self.0[idx + 1..],
            None => &self.0,
        }
    }
}

impl From<String> for ImageUrl {
    fn from(url: String) -> Self {
        Self(url)
    }
}

impl From<&str> for ImageUrl {
    fn from(url: &str) -> Self {
        Self(url.to_string())
    }
}

impl std::fmt::Display for ImageUrl {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Which worker pool a log line originated from
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PoolKind {
    /// Page fetch-and-parse pool
    FetchParse,
    /// Image download pool
    Download,
}

impl std::fmt::Display for PoolKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PoolKind::FetchParse => write!(f, "fetch-parse"),
            PoolKind::Download => write!(f, "download"),
        }
    }
}

/// A line of pipeline output
///
/// Workers never write to the output stream directly; they enqueue one of
/// these into the log queue and the sink renders it via `Display`. The total
/// order of emitted lines equals enqueue order, which is not guaranteed to
/// reflect real-world event order across different workers.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum LogMessage {
    /// A pool worker started
    WorkerRunning {
        /// The pool the worker belongs to
        pool: PoolKind,
        /// Worker number within its pool
        worker: usize,
    },

    /// The output sink started
    SinkRunning,

    /// A page fetch is about to begin
    OpeningPage {
        /// The page being opened
        url: PageUrl,
    },

    /// A parser resolved an image URL from page content
    FoundImage {
        /// The resolved image URL
        url: ImageUrl,
    },

    /// A page was parsed successfully but contained no image reference
    NoImageFound {
        /// The page that yielded nothing
        url: PageUrl,
    },

    /// A page fetch failed at the transport level
    NetworkError {
        /// The page that could not be fetched
        url: PageUrl,
        /// Description of the transport failure
        error: String,
    },

    /// Page content could not be parsed
    ParseError {
        /// The page whose content failed to parse
        url: PageUrl,
        /// Description of the parse failure
        error: String,
        /// The raw content, kept for diagnosis
        content: String,
    },

    /// An image download is about to begin
    Downloading {
        /// The image being downloaded
        url: ImageUrl,
        /// Destination file path
        dest: PathBuf,
    },

    /// An image download delivered fewer bytes than advertised
    DownloadShortContent {
        /// The image whose body was truncated
        url: ImageUrl,
        /// Description of the failure
        error: String,
    },

    /// An image download failed with a request or file I/O error
    DownloadIoError {
        /// The image that could not be downloaded
        url: ImageUrl,
        /// Description of the failure
        error: String,
    },
}

impl std::fmt::Display for LogMessage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LogMessage::WorkerRunning { pool, worker } => {
                write!(f, "{pool} worker {worker} running")
            }
            LogMessage::SinkRunning => write!(f, "log sink running"),
            LogMessage::OpeningPage { url } => write!(f, "opening page: {url}"),
            LogMessage::FoundImage { url } => write!(f, "found image: {url}"),
            LogMessage::NoImageFound { url } => write!(f, "no image found at: {url}"),
            LogMessage::NetworkError { url, error } => {
                write!(f, "network error at {url}: {error}")
            }
            LogMessage::ParseError {
                url,
                error,
                content,
            } => {
                write!(f, "parse error at {url}: {error}; content: {content}")
            }
            LogMessage::Downloading { url, dest } => {
                write!(f, "downloading {url} to {}", dest.display())
            }
            LogMessage::DownloadShortContent { url, error } => {
                write!(f, "truncated download of {url}: {error}")
            }
            LogMessage::DownloadIoError { url, error } => {
                write!(f, "could not download {url}: {error}")
            }
        }
    }
}

/// Structured outcome of one [`grab_images`](crate::ImageGrabber::grab_images) run
///
/// Counts are totals for the run across all workers. The log stream remains
/// the primary caller-visible signal; this summary is additive.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GrabSummary {
    /// Pages dequeued and fully processed (success or failure)
    pub pages_processed: u64,
    /// Image URLs resolved by parsers
    pub images_found: u64,
    /// Images successfully written to the destination directory
    pub images_downloaded: u64,
    /// Page fetches that failed at the transport level
    pub network_errors: u64,
    /// Pages whose content could not be parsed
    pub parse_errors: u64,
    /// Image downloads that failed (both error classes)
    pub download_errors: u64,
}
