//! URL extraction from free text and log files
//!
//! Front end to the pipeline: scan arbitrary text (an IRC log, a chat dump)
//! for page URLs with a fixed pattern, producing the list handed to
//! [`grab_images`](crate::ImageGrabber::grab_images). Duplicates are kept;
//! each occurrence triggers independent processing downstream.

use crate::error::Result;
use crate::types::PageUrl;
use regex::Regex;
use std::path::Path;

/// Fixed-pattern page URL scanner
///
/// # Examples
///
/// ```
/// use image_grabber::UrlScanner;
///
/// let scanner = UrlScanner::new(r"http://fatpita\.net/\?i=\d+").unwrap();
/// let urls = scanner.scan_text("look at http://fatpita.net/?i=42 lol");
///
/// assert_eq!(urls.len(), 1);
/// assert_eq!(urls[0].as_str(), "http://fatpita.net/?i=42");
/// ```
#[derive(Clone, Debug)]
pub struct UrlScanner {
    pattern: Regex,
}

impl UrlScanner {
    /// Create a scanner for the given pattern
    ///
    /// # Errors
    ///
    /// Returns an error if the pattern is not a valid regular expression.
    pub fn new(pattern: &str) -> Result<Self> {
        Ok(Self {
            pattern: Regex::new(pattern)?,
        })
    }

    /// Extract every pattern match from `text`, in match order
    pub fn scan_text(&self, text: &str) -> Vec<PageUrl> {
        self.pattern
            .find_iter(text)
            .map(|m| PageUrl::from(m.as_str()))
            .collect()
    }

    /// Read `path` and extract every pattern match from its contents
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read.
    pub async fn scan_file(&self, path: &Path) -> Result<Vec<PageUrl>> {
        tracing::debug!(path = %path.display(), "scanning file for page urls");
        let text = tokio::fs::read_to_string(path).await?;
        Ok(self.scan_text(&text))
    }
}

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;
    use tokio_test::assert_err;

    const PATTERN: &str = r"http://fatpita\.net/\?i=\d+";

    #[test]
    fn test_scan_text_finds_all_matches_in_order() {
        let scanner = UrlScanner::new(PATTERN).unwrap();
        let text = "first http://fatpita.net/?i=1 then http://fatpita.net/?i=2 done";

        let urls = scanner.scan_text(text);

        assert_eq!(
            urls,
            vec![
                PageUrl::from("http://fatpita.net/?i=1"),
                PageUrl::from("http://fatpita.net/?i=2"),
            ]
        );
    }

    #[test]
    fn test_scan_text_keeps_duplicates() {
        let scanner = UrlScanner::new(PATTERN).unwrap();
        let text = "http://fatpita.net/?i=7 http://fatpita.net/?i=7";

        assert_eq!(scanner.scan_text(text).len(), 2);
    }

    #[test]
    fn test_scan_text_no_matches() {
        let scanner = UrlScanner::new(PATTERN).unwrap();
        assert!(scanner.scan_text("nothing to see here").is_empty());
    }

    #[test]
    fn test_invalid_pattern_is_an_error() {
        assert!(UrlScanner::new("(unclosed").is_err());
    }

    #[tokio::test]
    async fn test_scan_file() {
        let temp = tempfile::tempdir().unwrap();
        let log_path = temp.path().join("irc.log");
        std::fs::write(
            &log_path,
            "12:01 <ada> http://fatpita.net/?i=3\n12:02 <bob> haha\n",
        )
        .unwrap();

        let scanner = UrlScanner::new(PATTERN).unwrap();
        let urls = scanner.scan_file(&log_path).await.unwrap();

        assert_eq!(urls, vec![PageUrl::from("http://fatpita.net/?i=3")]);
    }

    #[tokio::test]
    async fn test_scan_file_missing_is_an_error() {
        let scanner = UrlScanner::new(PATTERN).unwrap();
        let result = scanner.scan_file(Path::new("/nonexistent/irc.log")).await;

        tokio_test::assert_err!(result);
    }
}
