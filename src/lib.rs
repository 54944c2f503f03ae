//! # image-grabber
//!
//! Concurrent pipeline library for resolving page URLs into downloaded
//! image files.
//!
//! ## Design Philosophy
//!
//! image-grabber is designed to be:
//! - **Pipeline-first** - Two bounded worker pools (fetch-and-parse, image
//!   download) coordinated through shared work queues with drain-completion
//!   semantics
//! - **Quiet on failure** - Every fetch, parse, and download failure
//!   degrades to a serialized log line; nothing stops the pipeline
//! - **Library-first** - No CLI or UI, purely a Rust crate for embedding
//! - **Pluggable parsing** - Site support is a [`ImageParser`]
//!   implementation, one owned instance per worker
//!
//! ## Quick Start
//!
//! ```no_run
//! use image_grabber::{Config, ImageGrabber, MarkupImageParser, UrlScanner};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Scan free text for page URLs with a fixed pattern
//!     let scanner = UrlScanner::new(r"http://fatpita\.net/\?i=\d+")?;
//!     let pages = scanner.scan_text("have you seen http://fatpita.net/?i=125 ?");
//!
//!     let config = Config {
//!         download_dir: "pictures".into(),
//!         ..Default::default()
//!     };
//!     let grabber = ImageGrabber::new(config).await?;
//!
//!     // Fetch, parse, and download with 4 workers per pool
//!     let summary = grabber
//!         .grab_images(
//!             pages,
//!             || MarkupImageParser::new("http://fatpita.net/images/", "images/"),
//!             4,
//!         )
//!         .await;
//!     println!("downloaded {} images", summary.images_downloaded);
//!
//!     grabber.shutdown().await;
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]

/// Configuration types
pub mod config;
/// Error types
pub mod error;
/// Pipeline coordinator and worker pools
pub mod grabber;
/// Parser plugins resolving image URLs from page content
pub mod parser;
/// Concurrent work queue with drain-completion semantics
pub mod queue;
/// URL extraction from free text and log files
pub mod scan;
/// Serialized log output sink
pub mod sink;
/// HTTP byte transport
pub mod transport;
/// Core types and log messages
pub mod types;

// Re-export commonly used types
pub use config::{Config, DEFAULT_WORKER_COUNT};
pub use error::{DownloadError, Error, FetchError, ParseError, Result};
pub use grabber::ImageGrabber;
pub use parser::{ImageParser, MarkupImageParser};
pub use queue::WorkQueue;
pub use scan::UrlScanner;
pub use sink::{LogWriter, OutputSink};
pub use transport::{HttpTransport, Transport};
pub use types::{GrabSummary, ImageUrl, LogMessage, PageUrl, PoolKind};
