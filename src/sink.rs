//! Serialized output sink for concurrently produced log messages
//!
//! Workers in both pools emit [`LogMessage`]s into a shared work queue; a
//! single sink task drains that queue and writes one line per message to the
//! output stream. The sink is the only component with access to the stream,
//! so concurrent workers can never interleave output. Lines appear in strict
//! enqueue order, which is not guaranteed to reflect real-world event order
//! across workers finishing near-simultaneously.

use crate::queue::WorkQueue;
use crate::types::LogMessage;
use std::sync::Arc;
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tokio_util::sync::CancellationToken;

/// Boxed output stream the sink owns
pub type LogWriter = Box<dyn AsyncWrite + Send + Unpin>;

/// Single consumer draining the log queue to an output stream
///
/// Constructed with exclusive ownership of the writer and consumed by
/// [`run`](Self::run), which loops until cancelled. Every dequeued message
/// is marked done even if the write fails, so `join` on the log queue can
/// always complete.
pub struct OutputSink {
    queue: Arc<WorkQueue<LogMessage>>,
    writer: LogWriter,
}

impl OutputSink {
    /// Create a sink draining `queue` into `writer`
    pub fn new(queue: Arc<WorkQueue<LogMessage>>, writer: LogWriter) -> Self {
        Self { queue, writer }
    }

    /// Create a sink draining `queue` into standard output
    pub fn stdout(queue: Arc<WorkQueue<LogMessage>>) -> Self {
        Self::new(queue, Box::new(tokio::io::stdout()))
    }

    /// Run the sink loop until `cancel` fires
    ///
    /// Announces itself through its own queue, then drains messages one at a
    /// time. Spawned as a task by the pipeline coordinator; runs for the
    /// grabber's lifetime.
    pub async fn run(mut self, cancel: CancellationToken) {
        self.queue.put(LogMessage::SinkRunning);

        loop {
            let message = tokio::select! {
                _ = cancel.cancelled() => break,
                message = self.queue.get() => message,
            };

            if let Err(e) = self.write_line(&message).await {
                tracing::warn!(error = %e, "failed to write log line");
            }
            self.queue.mark_done();
        }

        tracing::debug!("output sink stopped");
    }

    async fn write_line(&mut self, message: &LogMessage) -> std::io::Result<()> {
        let line = format!("{message}\n");
        self.writer.write_all(line.as_bytes()).await?;
        self.writer.flush().await
    }
}
