//! Pipeline coordinator and worker pools, organized by stage:
//! - [`fetch_parse`] - page fetch-and-parse workers (page queue → image queue)
//! - [`download`] - image download workers (image queue → files on disk)
//!
//! The [`ImageGrabber`] wires three work queues (page, image, log) to the
//! two pools and the output sink, seeds the page queue, and blocks until
//! all three queues have fully drained, in that order. Image items are only
//! produced while page items are processed, so the page queue must drain
//! before awaiting the image queue is meaningful.

mod download;
mod fetch_parse;

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
pub(crate) mod test_helpers;
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests;

use crate::config::{Config, DEFAULT_WORKER_COUNT};
use crate::error::{Error, Result};
use crate::parser::ImageParser;
use crate::queue::WorkQueue;
use crate::sink::{LogWriter, OutputSink};
use crate::transport::{HttpTransport, Transport};
use crate::types::{GrabSummary, ImageUrl, LogMessage, PageUrl};

use download::DownloadWorker;
use fetch_parse::FetchParseWorker;

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio_util::sync::CancellationToken;

/// Per-run counters shared by all workers of one `grab_images` call
#[derive(Debug, Default)]
pub(crate) struct GrabCounters {
    pub(crate) pages_processed: AtomicU64,
    pub(crate) images_found: AtomicU64,
    pub(crate) images_downloaded: AtomicU64,
    pub(crate) network_errors: AtomicU64,
    pub(crate) parse_errors: AtomicU64,
    pub(crate) download_errors: AtomicU64,
}

impl GrabCounters {
    pub(crate) fn snapshot(&self) -> GrabSummary {
        GrabSummary {
            pages_processed: self.pages_processed.load(Ordering::Relaxed),
            images_found: self.images_found.load(Ordering::Relaxed),
            images_downloaded: self.images_downloaded.load(Ordering::Relaxed),
            network_errors: self.network_errors.load(Ordering::Relaxed),
            parse_errors: self.parse_errors.load(Ordering::Relaxed),
            download_errors: self.download_errors.load(Ordering::Relaxed),
        }
    }
}

/// Main pipeline instance (cloneable - all fields are Arc-wrapped)
///
/// Construction creates the destination directory and starts the output
/// sink; [`grab_images`](Self::grab_images) runs the two worker pools over
/// a list of page URLs and returns once every consequence has been logged.
/// Worker tasks are torn down deterministically at the end of each run;
/// [`shutdown`](Self::shutdown) stops the sink and releases the output
/// stream.
#[derive(Clone)]
pub struct ImageGrabber {
    /// Configuration (wrapped in Arc for sharing across tasks)
    pub(crate) config: Arc<Config>,
    /// Byte transport shared by both pools
    pub(crate) transport: Arc<dyn Transport>,
    /// Log queue; lives for the grabber's lifetime, drained by the sink
    pub(crate) log_queue: Arc<WorkQueue<LogMessage>>,
    /// Root cancellation token; child tokens govern per-run worker tasks
    pub(crate) cancel: CancellationToken,
    /// Sink task handle, awaited on shutdown
    sink_task: Arc<tokio::sync::Mutex<Option<tokio::task::JoinHandle<()>>>>,
}

impl ImageGrabber {
    /// Create a grabber logging to standard output
    ///
    /// # Errors
    ///
    /// Returns an error if the destination directory cannot be created or
    /// the HTTP transport cannot be constructed.
    pub async fn new(config: Config) -> Result<Self> {
        Self::with_output(config, Box::new(tokio::io::stdout())).await
    }

    /// Create a grabber logging to the given stream
    ///
    /// The sink takes exclusive ownership of `writer`; no other component
    /// ever touches the stream.
    ///
    /// # Errors
    ///
    /// Returns an error if the destination directory cannot be created or
    /// the HTTP transport cannot be constructed.
    pub async fn with_output(config: Config, writer: LogWriter) -> Result<Self> {
        let transport: Arc<dyn Transport> = Arc::new(HttpTransport::from_config(&config)?);
        Self::assemble(config, transport, writer).await
    }

    /// Wire up a grabber from its parts; shared by constructors and tests
    pub(crate) async fn assemble(
        config: Config,
        transport: Arc<dyn Transport>,
        writer: LogWriter,
    ) -> Result<Self> {
        tokio::fs::create_dir_all(&config.download_dir)
            .await
            .map_err(|e| {
                Error::Io(std::io::Error::new(
                    e.kind(),
                    format!(
                        "failed to create download directory '{}': {}",
                        config.download_dir.display(),
                        e
                    ),
                ))
            })?;

        let log_queue = Arc::new(WorkQueue::new());
        let cancel = CancellationToken::new();

        let sink = OutputSink::new(Arc::clone(&log_queue), writer);
        let sink_task = tokio::spawn(sink.run(cancel.child_token()));

        Ok(Self {
            config: Arc::new(config),
            transport,
            log_queue,
            cancel,
            sink_task: Arc::new(tokio::sync::Mutex::new(Some(sink_task))),
        })
    }

    /// Resolve pages to images and download them, concurrently
    ///
    /// Seeds the page queue with `page_urls` in their given order, runs
    /// `worker_count` fetch-parse workers and `worker_count` download
    /// workers over the page and image queues, and returns only after the
    /// page, image, and log queues have all drained. Each worker gets its
    /// own parser instance from `parser_factory`; parser state is mutated
    /// per page and must never be shared.
    ///
    /// A non-positive `worker_count` is substituted with
    /// [`DEFAULT_WORKER_COUNT`], not treated as an error.
    ///
    /// Failures never surface here: every fetch, parse, and download error
    /// degrades to a log line and the responsible worker moves on. The
    /// returned [`GrabSummary`] carries the per-run counts; the log stream
    /// remains the primary signal.
    pub async fn grab_images<P, F>(
        &self,
        page_urls: impl IntoIterator<Item = PageUrl>,
        parser_factory: F,
        worker_count: usize,
    ) -> GrabSummary
    where
        P: ImageParser + Sync + 'static,
        F: Fn() -> P,
    {
        let worker_count = if worker_count == 0 {
            DEFAULT_WORKER_COUNT
        } else {
            worker_count
        };

        let page_queue: Arc<WorkQueue<PageUrl>> = Arc::new(WorkQueue::new());
        let image_queue: Arc<WorkQueue<ImageUrl>> = Arc::new(WorkQueue::new());
        let counters = Arc::new(GrabCounters::default());
        let run_cancel = self.cancel.child_token();

        tracing::info!(worker_count, "starting grab run");

        let mut workers = Vec::with_capacity(worker_count * 2);
        for number in 0..worker_count {
            let downloader = DownloadWorker {
                number,
                transport: Arc::clone(&self.transport),
                image_queue: Arc::clone(&image_queue),
                log_queue: Arc::clone(&self.log_queue),
                counters: Arc::clone(&counters),
                download_dir: self.config.download_dir.clone(),
            };
            workers.push(tokio::spawn(downloader.run(run_cancel.child_token())));

            let parser_worker = FetchParseWorker {
                number,
                transport: Arc::clone(&self.transport),
                parser: parser_factory(),
                page_queue: Arc::clone(&page_queue),
                image_queue: Arc::clone(&image_queue),
                log_queue: Arc::clone(&self.log_queue),
                counters: Arc::clone(&counters),
            };
            workers.push(tokio::spawn(parser_worker.run(run_cancel.child_token())));
        }

        for url in page_urls {
            page_queue.put(url);
        }

        // Drain order matters: image items are only produced while page
        // items are processed, and log lines while either pool works.
        // Cancellation (shutdown during a run) overrides the drain wait so
        // the call can still return.
        tokio::select! {
            _ = run_cancel.cancelled() => {
                tracing::warn!("grab run cancelled before completion");
            }
            _ = async {
                page_queue.join().await;
                image_queue.join().await;
                self.log_queue.join().await;
            } => {}
        }

        // Deterministic teardown instead of leaking daemon-style tasks
        run_cancel.cancel();
        for result in futures::future::join_all(workers).await {
            if let Err(e) = result {
                tracing::warn!(error = %e, "worker task ended abnormally");
            }
        }

        let summary = counters.snapshot();
        tracing::info!(
            pages = summary.pages_processed,
            downloaded = summary.images_downloaded,
            "grab run complete"
        );
        summary
    }

    /// Stop the output sink and release the output stream
    ///
    /// Cancels the root token (stopping any in-flight run's workers as
    /// well) and awaits the sink task. Idempotent; later calls are no-ops.
    pub async fn shutdown(&self) {
        tracing::info!("shutting down image grabber");
        self.cancel.cancel();

        let task = self.sink_task.lock().await.take();
        if let Some(task) = task {
            if let Err(e) = task.await {
                tracing::warn!(error = %e, "sink task ended abnormally");
            }
        }
    }
}
