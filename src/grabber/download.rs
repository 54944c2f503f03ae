//! Download worker: image queue in, files on disk out.

use crate::queue::WorkQueue;
use crate::transport::Transport;
use crate::types::{ImageUrl, LogMessage, PoolKind};

use super::GrabCounters;

use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::Ordering;
use tokio_util::sync::CancellationToken;

/// One worker of the download pool
pub(crate) struct DownloadWorker {
    pub(crate) number: usize,
    pub(crate) transport: Arc<dyn Transport>,
    pub(crate) image_queue: Arc<WorkQueue<ImageUrl>>,
    pub(crate) log_queue: Arc<WorkQueue<LogMessage>>,
    pub(crate) counters: Arc<GrabCounters>,
    pub(crate) download_dir: PathBuf,
}

impl DownloadWorker {
    /// Worker loop: dequeue an image, download it, mark it done, repeat
    /// until cancelled
    pub(crate) async fn run(self, cancel: CancellationToken) {
        self.log_queue.put(LogMessage::WorkerRunning {
            pool: PoolKind::Download,
            worker: self.number,
        });

        loop {
            let image_url = tokio::select! {
                _ = cancel.cancelled() => break,
                url = self.image_queue.get() => url,
            };

            self.download_image(image_url).await;
            self.image_queue.mark_done();
        }

        tracing::debug!(worker = self.number, "download worker stopped");
    }

    /// Stream one image to the destination directory
    ///
    /// The local filename is the URL's final path segment; an existing file
    /// of the same name is overwritten. No retry for any failure class;
    /// failures are terminal for this one item only.
    async fn download_image(&self, image_url: ImageUrl) {
        let dest = self.download_dir.join(image_url.file_name());
        self.log_queue.put(LogMessage::Downloading {
            url: image_url.clone(),
            dest: dest.clone(),
        });

        match self.transport.download_image(&image_url, &dest).await {
            Ok(()) => {
                self.counters
                    .images_downloaded
                    .fetch_add(1, Ordering::Relaxed);
            }
            Err(e) => {
                self.counters.download_errors.fetch_add(1, Ordering::Relaxed);
                let message = if e.is_short_content() {
                    LogMessage::DownloadShortContent {
                        url: image_url,
                        error: e.to_string(),
                    }
                } else {
                    LogMessage::DownloadIoError {
                        url: image_url,
                        error: e.to_string(),
                    }
                };
                self.log_queue.put(message);
            }
        }
    }
}
