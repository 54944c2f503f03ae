//! Error types for image-grabber
//!
//! This module provides the error taxonomy for the pipeline:
//! - `FetchError` for page-fetch transport failures
//! - `ParseError` for markup parsing failures
//! - `DownloadError` for image download failures, split into the
//!   truncated-content and I/O classes
//!
//! None of these are fatal to the pipeline itself. Workers degrade every
//! failure into a logged line and continue with the next item; the top-level
//! [`Error`] type only surfaces from construction and collaborator setup.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for image-grabber operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for image-grabber
///
/// Each variant includes contextual information to help diagnose issues.
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error with context about which setting is invalid
    #[error("configuration error: {message}")]
    Config {
        /// Human-readable error message describing the configuration issue
        message: String,
        /// The configuration key that caused the error (e.g., "download_dir")
        key: Option<String>,
    },

    /// Invalid URL-scanning pattern
    #[error("invalid scan pattern: {0}")]
    Pattern(#[from] regex::Error),

    /// Page fetch error
    #[error("fetch error: {0}")]
    Fetch(#[from] FetchError),

    /// Markup parse error
    #[error("parse error: {0}")]
    Parse(#[from] ParseError),

    /// Image download error
    #[error("download error: {0}")]
    Download(#[from] DownloadError),

    /// HTTP client construction error
    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Page-fetch transport errors
///
/// Raised when a page's content cannot be retrieved over the network. The
/// fetch-parse worker logs these and continues with empty content.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Request failed at the transport level (DNS, connect, timeout, body read)
    #[error("request for {url} failed: {source}")]
    Request {
        /// The page URL that could not be fetched
        url: String,
        /// The underlying transport error
        source: reqwest::Error,
    },

    /// Server answered with a non-success status code
    #[error("{url} returned status {status}")]
    Status {
        /// The page URL that was fetched
        url: String,
        /// The HTTP status code returned by the server
        status: reqwest::StatusCode,
    },
}

/// Markup parsing errors
///
/// Raised by a parser's `feed` when the page content cannot be scanned.
/// The fetch-parse worker logs the error together with the raw content
/// for diagnosis and skips the page.
#[derive(Debug, Error)]
pub enum ParseError {
    /// Content is not valid UTF-8 and cannot be scanned as markup
    #[error("content is not valid UTF-8 (valid up to byte {valid_up_to})")]
    InvalidUtf8 {
        /// Index of the first byte that is not valid UTF-8
        valid_up_to: usize,
    },
}

/// Image download errors
///
/// The two classes the pipeline distinguishes in its log output are
/// truncated content ([`ShortContent`](DownloadError::ShortContent)) and
/// everything else (request and file I/O failures). Neither stops the
/// worker or the pipeline.
#[derive(Debug, Error)]
pub enum DownloadError {
    /// Server advertised more bytes than it delivered
    #[error("short content for {url}: expected {expected} bytes, received {actual}")]
    ShortContent {
        /// The image URL whose body was truncated
        url: String,
        /// Number of bytes advertised via Content-Length
        expected: u64,
        /// Number of bytes actually received
        actual: u64,
    },

    /// Request failed at the transport level or with a non-success status
    #[error("request for {url} failed: {source}")]
    Request {
        /// The image URL that could not be downloaded
        url: String,
        /// The underlying transport error
        source: reqwest::Error,
    },

    /// Writing the downloaded content to disk failed
    #[error("could not write {path} for {url}: {source}")]
    Io {
        /// The image URL being downloaded
        url: String,
        /// The destination path that could not be written
        path: PathBuf,
        /// The underlying I/O error
        source: std::io::Error,
    },
}

impl DownloadError {
    /// Whether this is the truncated-content failure class
    ///
    /// Used by the download worker to pick the log-line category; all other
    /// variants fall into the I/O class.
    pub fn is_short_content(&self) -> bool {
        matches!(self, DownloadError::ShortContent { .. })
    }
}
