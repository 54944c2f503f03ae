//! Shared test helpers for exercising the pipeline without a network.

use crate::config::Config;
use crate::error::{DownloadError, FetchError, ParseError};
use crate::grabber::ImageGrabber;
use crate::parser::ImageParser;
use crate::transport::Transport;
use crate::types::{ImageUrl, PageUrl};

use async_trait::async_trait;
use std::collections::HashMap;
use std::path::Path;
use std::pin::Pin;
use std::sync::{Arc, Mutex};
use std::task::{Context, Poll};
use tempfile::TempDir;

/// Scripted page response
pub(crate) enum PageResponse {
    /// Fetch succeeds with this content
    Content(Vec<u8>),
    /// Fetch fails at the transport level
    NetworkFailure,
}

/// Scripted image response
pub(crate) enum ImageResponse {
    /// Download succeeds, writing this content to the destination
    Content(Vec<u8>),
    /// Download writes a partial file and reports truncated content
    ShortContent,
    /// Download fails with an I/O error before writing anything
    IoFailure,
}

/// Scripted [`Transport`] with per-URL call logs
///
/// Unregistered URLs behave like network failures. The call logs record
/// every fetch and download attempt for exactly-once assertions.
#[derive(Default)]
pub(crate) struct MockTransport {
    pages: HashMap<String, PageResponse>,
    images: HashMap<String, ImageResponse>,
    pub(crate) fetch_log: Mutex<Vec<String>>,
    pub(crate) download_log: Mutex<Vec<String>>,
}

impl MockTransport {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn page(mut self, url: &str, content: &[u8]) -> Self {
        self.pages
            .insert(url.to_string(), PageResponse::Content(content.to_vec()));
        self
    }

    pub(crate) fn failing_page(mut self, url: &str) -> Self {
        self.pages
            .insert(url.to_string(), PageResponse::NetworkFailure);
        self
    }

    pub(crate) fn image(mut self, url: &str, content: &[u8]) -> Self {
        self.images
            .insert(url.to_string(), ImageResponse::Content(content.to_vec()));
        self
    }

    pub(crate) fn short_image(mut self, url: &str) -> Self {
        self.images
            .insert(url.to_string(), ImageResponse::ShortContent);
        self
    }

    pub(crate) fn failing_image(mut self, url: &str) -> Self {
        self.images.insert(url.to_string(), ImageResponse::IoFailure);
        self
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn fetch_page(&self, url: &PageUrl) -> Result<Vec<u8>, FetchError> {
        self.fetch_log.lock().unwrap().push(url.to_string());

        match self.pages.get(url.as_str()) {
            Some(PageResponse::Content(content)) => Ok(content.clone()),
            Some(PageResponse::NetworkFailure) | None => Err(FetchError::Status {
                url: url.to_string(),
                status: reqwest::StatusCode::SERVICE_UNAVAILABLE,
            }),
        }
    }

    async fn download_image(&self, url: &ImageUrl, dest: &Path) -> Result<(), DownloadError> {
        self.download_log.lock().unwrap().push(url.to_string());

        match self.images.get(url.as_str()) {
            Some(ImageResponse::Content(content)) => {
                tokio::fs::write(dest, content)
                    .await
                    .map_err(|e| DownloadError::Io {
                        url: url.to_string(),
                        path: dest.to_path_buf(),
                        source: e,
                    })
            }
            Some(ImageResponse::ShortContent) => {
                // Partial write, then the truncated-content report
                let _ = tokio::fs::write(dest, b"partial").await;
                Err(DownloadError::ShortContent {
                    url: url.to_string(),
                    expected: 100,
                    actual: 7,
                })
            }
            Some(ImageResponse::IoFailure) | None => Err(DownloadError::Io {
                url: url.to_string(),
                path: dest.to_path_buf(),
                source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
            }),
        }
    }
}

/// Parser that never resolves an image, for the no-match paths
pub(crate) struct NeverMatchParser;

impl ImageParser for NeverMatchParser {
    fn reset(&mut self) {}

    fn feed(&mut self, _content: &[u8]) -> Result<(), ParseError> {
        Ok(())
    }

    fn image_url(&self) -> Option<ImageUrl> {
        None
    }
}

/// AsyncWrite capturing everything into a shared buffer
///
/// Handed to the sink as the output stream; tests read the captured lines
/// after a run completes (the log queue has drained by then, so every line
/// is present).
#[derive(Clone, Default)]
pub(crate) struct CaptureWriter {
    buf: Arc<Mutex<Vec<u8>>>,
}

impl CaptureWriter {
    pub(crate) fn contents(&self) -> String {
        String::from_utf8_lossy(&self.buf.lock().unwrap()).into_owned()
    }

    pub(crate) fn lines(&self) -> Vec<String> {
        self.contents().lines().map(str::to_string).collect()
    }
}

impl tokio::io::AsyncWrite for CaptureWriter {
    fn poll_write(
        self: Pin<&mut Self>,
        _cx: &mut Context<'_>,
        buf: &[u8],
    ) -> Poll<std::io::Result<usize>> {
        self.buf.lock().unwrap().extend_from_slice(buf);
        Poll::Ready(Ok(buf.len()))
    }

    fn poll_flush(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<std::io::Result<()>> {
        Poll::Ready(Ok(()))
    }

    fn poll_shutdown(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<std::io::Result<()>> {
        Poll::Ready(Ok(()))
    }
}

/// Helper to create a test ImageGrabber over a scripted transport.
/// Returns the grabber, the tempdir (which must be kept alive), and the
/// capture handle for the log output.
pub(crate) async fn create_test_grabber(
    transport: Arc<dyn Transport>,
) -> (ImageGrabber, TempDir, CaptureWriter) {
    let temp_dir = tempfile::tempdir().unwrap();
    let config = Config {
        download_dir: temp_dir.path().join("downloads"),
        ..Default::default()
    };

    let writer = CaptureWriter::default();
    let grabber = ImageGrabber::assemble(config, transport, Box::new(writer.clone()))
        .await
        .unwrap();

    (grabber, temp_dir, writer)
}
