use crate::grabber::test_helpers::{MockTransport, create_test_grabber};
use crate::parser::MarkupImageParser;
use crate::types::PageUrl;
use std::sync::Arc;
use std::time::Duration;

const PAGE_WITH_IMAGE: &[u8] = b"<html><img src=\"images/img.png\"></html>";

fn site_parser() -> MarkupImageParser {
    MarkupImageParser::new("http://site/images/", "images/")
}

#[tokio::test]
async fn test_shutdown_is_idempotent() {
    let transport = Arc::new(MockTransport::new());
    let (grabber, _temp_dir, _output) = create_test_grabber(transport).await;

    tokio::time::timeout(Duration::from_secs(2), grabber.shutdown())
        .await
        .expect("first shutdown should complete");
    tokio::time::timeout(Duration::from_secs(2), grabber.shutdown())
        .await
        .expect("second shutdown should be a no-op");
}

#[tokio::test]
async fn test_sequential_runs_share_the_sink() {
    let transport = Arc::new(
        MockTransport::new()
            .page("http://site/p1", PAGE_WITH_IMAGE)
            .page("http://site/p2", PAGE_WITH_IMAGE)
            .image("http://site/images/img.png", b"x"),
    );
    let (grabber, _temp_dir, output) = create_test_grabber(transport).await;

    let first = grabber
        .grab_images(vec![PageUrl::from("http://site/p1")], site_parser, 1)
        .await;
    let second = grabber
        .grab_images(vec![PageUrl::from("http://site/p2")], site_parser, 1)
        .await;

    // Counters are per run, not cumulative
    assert_eq!(first.pages_processed, 1);
    assert_eq!(second.pages_processed, 1);

    // The sink announced itself once, at construction
    let lines = output.lines();
    let sink_lines = lines.iter().filter(|l| *l == "log sink running").count();
    assert_eq!(sink_lines, 1);

    assert!(lines.iter().any(|l| l == "opening page: http://site/p1"));
    assert!(lines.iter().any(|l| l == "opening page: http://site/p2"));
}

#[tokio::test]
async fn test_grab_after_shutdown_returns_promptly() {
    let transport = Arc::new(
        MockTransport::new()
            .page("http://site/p1", PAGE_WITH_IMAGE)
            .image("http://site/images/img.png", b"x"),
    );
    let (grabber, _temp_dir, _output) = create_test_grabber(transport).await;

    grabber.shutdown().await;

    // Worker tokens descend from the cancelled root, so the run gives up
    // on draining instead of hanging
    let summary = tokio::time::timeout(
        Duration::from_secs(2),
        grabber.grab_images(vec![PageUrl::from("http://site/p1")], site_parser, 2),
    )
    .await
    .expect("a run after shutdown must not hang");

    assert!(summary.pages_processed <= 1);
}

#[tokio::test]
async fn test_shutdown_after_run_leaves_all_output_written() {
    let transport = Arc::new(
        MockTransport::new()
            .page("http://site/p1", PAGE_WITH_IMAGE)
            .image("http://site/images/img.png", b"x"),
    );
    let (grabber, _temp_dir, output) = create_test_grabber(transport).await;

    grabber
        .grab_images(vec![PageUrl::from("http://site/p1")], site_parser, 1)
        .await;
    grabber.shutdown().await;

    // grab_images returned only after the log queue drained, so shutdown
    // cannot lose lines from a completed run
    let lines = output.lines();
    assert!(lines.iter().any(|l| l == "opening page: http://site/p1"));
    assert!(
        lines
            .iter()
            .any(|l| l.starts_with("downloading http://site/images/img.png")),
    );
}
