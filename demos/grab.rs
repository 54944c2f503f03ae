//! End-to-end demo: scan text for page URLs and download the images they
//! reference.
//!
//! ```bash
//! cargo run --example grab -- "check out http://fatpita.net/?i=125" pictures/
//! ```

use image_grabber::{Config, ImageGrabber, MarkupImageParser, UrlScanner};
use std::time::Instant;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let mut args = std::env::args().skip(1);
    let text = args
        .next()
        .unwrap_or_else(|| "have you seen http://fatpita.net/?i=125 ?".to_string());
    let download_dir = args.next().unwrap_or_else(|| "downloads".to_string());

    let started = Instant::now();

    let scanner = UrlScanner::new(r"http://fatpita\.net/\?i=\d+")?;
    let pages = scanner.scan_text(&text);
    println!("found {} page url(s) in input", pages.len());

    let config = Config {
        download_dir: download_dir.into(),
        ..Default::default()
    };
    let grabber = ImageGrabber::new(config).await?;

    let summary = grabber
        .grab_images(
            pages,
            || MarkupImageParser::new("http://fatpita.net/images/", "images/"),
            4,
        )
        .await;
    grabber.shutdown().await;

    println!(
        "done: {} page(s), {} image(s) downloaded, {} error(s), took {:.2}s",
        summary.pages_processed,
        summary.images_downloaded,
        summary.network_errors + summary.parse_errors + summary.download_errors,
        started.elapsed().as_secs_f64()
    );
    Ok(())
}
