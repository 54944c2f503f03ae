//! Fetch-and-parse worker: page queue in, image queue out.

use crate::parser::ImageParser;
use crate::queue::WorkQueue;
use crate::transport::Transport;
use crate::types::{ImageUrl, LogMessage, PageUrl, PoolKind};

use super::GrabCounters;

use std::sync::Arc;
use std::sync::atomic::Ordering;
use tokio_util::sync::CancellationToken;

/// One worker of the fetch-parse pool
///
/// Owns its parser instance exclusively; parser state is mutated per page
/// and concurrent reuse would corrupt results.
pub(crate) struct FetchParseWorker<P> {
    pub(crate) number: usize,
    pub(crate) transport: Arc<dyn Transport>,
    pub(crate) parser: P,
    pub(crate) page_queue: Arc<WorkQueue<PageUrl>>,
    pub(crate) image_queue: Arc<WorkQueue<ImageUrl>>,
    pub(crate) log_queue: Arc<WorkQueue<LogMessage>>,
    pub(crate) counters: Arc<GrabCounters>,
}

impl<P: ImageParser> FetchParseWorker<P> {
    /// Worker loop: dequeue a page, process it, mark it done, repeat until
    /// cancelled
    pub(crate) async fn run(mut self, cancel: CancellationToken) {
        self.log_queue.put(LogMessage::WorkerRunning {
            pool: PoolKind::FetchParse,
            worker: self.number,
        });

        loop {
            let page_url = tokio::select! {
                _ = cancel.cancelled() => break,
                url = self.page_queue.get() => url,
            };

            self.process_page(page_url).await;
            self.page_queue.mark_done();
        }

        tracing::debug!(worker = self.number, "fetch-parse worker stopped");
    }

    async fn process_page(&mut self, page_url: PageUrl) {
        let content = self.read_page(&page_url).await;
        if let Some(image_url) = self.find_image_url(&content, &page_url) {
            self.image_queue.put(image_url);
        }
        self.counters.pages_processed.fetch_add(1, Ordering::Relaxed);
    }

    /// Fetch the page's content; a transport failure is logged and yields
    /// empty content, which still goes through the parser
    async fn read_page(&self, page_url: &PageUrl) -> Vec<u8> {
        self.log_queue.put(LogMessage::OpeningPage {
            url: page_url.clone(),
        });

        match self.transport.fetch_page(page_url).await {
            Ok(content) => content,
            Err(e) => {
                self.counters.network_errors.fetch_add(1, Ordering::Relaxed);
                self.log_queue.put(LogMessage::NetworkError {
                    url: page_url.clone(),
                    error: e.to_string(),
                });
                Vec::new()
            }
        }
    }

    /// Run the content through this worker's parser, logging the outcome
    fn find_image_url(&mut self, content: &[u8], page_url: &PageUrl) -> Option<ImageUrl> {
        self.parser.reset();
        if let Err(e) = self.parser.feed(content) {
            self.counters.parse_errors.fetch_add(1, Ordering::Relaxed);
            self.log_queue.put(LogMessage::ParseError {
                url: page_url.clone(),
                error: e.to_string(),
                content: String::from_utf8_lossy(content).into_owned(),
            });
            return None;
        }

        match self.parser.image_url() {
            Some(image_url) => {
                self.counters.images_found.fetch_add(1, Ordering::Relaxed);
                self.log_queue.put(LogMessage::FoundImage {
                    url: image_url.clone(),
                });
                Some(image_url)
            }
            None => {
                self.log_queue.put(LogMessage::NoImageFound {
                    url: page_url.clone(),
                });
                None
            }
        }
    }
}
