//! Byte transport over HTTP
//!
//! The pipeline depends on two primitives: fetch a page's content into
//! memory, and stream an image to a local file. Both live behind the
//! [`Transport`] trait so tests can substitute a scripted implementation;
//! [`HttpTransport`] is the stock implementation over a shared reqwest
//! client. Per-request timeouts are configured here, not in the pipeline.

use crate::config::Config;
use crate::error::{DownloadError, FetchError, Result};
use crate::types::{ImageUrl, PageUrl};
use async_trait::async_trait;
use std::path::Path;
use std::time::Duration;
use tokio::io::AsyncWriteExt;

/// Network transport consumed by the worker pools
#[async_trait]
pub trait Transport: Send + Sync {
    /// Fetch a page's raw content into memory
    ///
    /// # Errors
    ///
    /// Returns a [`FetchError`] on transport failure or a non-success
    /// status. The fetch-parse worker treats the content as empty and
    /// continues.
    async fn fetch_page(&self, url: &PageUrl) -> std::result::Result<Vec<u8>, FetchError>;

    /// Stream an image's content to `dest`, overwriting any existing file
    ///
    /// # Errors
    ///
    /// Returns [`DownloadError::ShortContent`] when the server delivered
    /// fewer bytes than it advertised, and the request/I/O variants for
    /// everything else. A failed download may leave a partial file behind.
    async fn download_image(
        &self,
        url: &ImageUrl,
        dest: &Path,
    ) -> std::result::Result<(), DownloadError>;
}

/// Stock [`Transport`] over a shared reqwest client
///
/// The client enforces the configured per-request timeout and sends the
/// configured User-Agent with every request. Cloning is cheap; the
/// underlying connection pool is shared.
#[derive(Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    /// Create a transport with the given per-request timeout and user agent
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying HTTP client cannot be constructed.
    pub fn new(timeout: Duration, user_agent: &str) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(user_agent)
            .build()?;
        Ok(Self { client })
    }

    /// Create a transport from pipeline configuration
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying HTTP client cannot be constructed.
    pub fn from_config(config: &Config) -> Result<Self> {
        Self::new(config.request_timeout, &config.user_agent)
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn fetch_page(&self, url: &PageUrl) -> std::result::Result<Vec<u8>, FetchError> {
        let response = self
            .client
            .get(url.as_str())
            .send()
            .await
            .map_err(|e| FetchError::Request {
                url: url.to_string(),
                source: e,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status,
            });
        }

        let bytes = response.bytes().await.map_err(|e| FetchError::Request {
            url: url.to_string(),
            source: e,
        })?;
        Ok(bytes.to_vec())
    }

    async fn download_image(
        &self,
        url: &ImageUrl,
        dest: &Path,
    ) -> std::result::Result<(), DownloadError> {
        let request_err = |e: reqwest::Error| DownloadError::Request {
            url: url.to_string(),
            source: e,
        };
        let io_err = |e: std::io::Error| DownloadError::Io {
            url: url.to_string(),
            path: dest.to_path_buf(),
            source: e,
        };

        let mut response = self
            .client
            .get(url.as_str())
            .send()
            .await
            .map_err(request_err)?
            .error_for_status()
            .map_err(request_err)?;

        let expected = response.content_length();

        let mut file = tokio::fs::File::create(dest).await.map_err(io_err)?;
        let mut received: u64 = 0;
        while let Some(chunk) = response.chunk().await.map_err(request_err)? {
            file.write_all(&chunk).await.map_err(io_err)?;
            received += chunk.len() as u64;
        }
        file.flush().await.map_err(io_err)?;

        // Mirror of the transport's truncated-content failure: the server
        // advertised a length it did not deliver
        if let Some(expected) = expected
            && received < expected
        {
            return Err(DownloadError::ShortContent {
                url: url.to_string(),
                expected,
                actual: received,
            });
        }

        Ok(())
    }
}
