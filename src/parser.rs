//! Parser plugins for resolving image URLs from page content
//!
//! A parser is a stateful capability: reset it, feed it raw page content,
//! then ask whether an image URL was resolved. Parser instances are owned
//! exclusively by one fetch-parse worker and never shared; the pipeline
//! takes a factory and constructs one fresh instance per worker. New site
//! support means adding another implementation of [`ImageParser`], not a
//! subclass hierarchy.

use crate::error::ParseError;
use crate::types::ImageUrl;
use regex::Regex;
use std::sync::OnceLock;

/// Stateful capability for extracting zero or one image URL from page content
///
/// The fetch-parse worker drives it as `reset` → `feed` → `image_url` for
/// every page. State mutated by `feed` persists until the next `reset`, so a
/// single instance must never be used by two workers concurrently.
pub trait ImageParser: Send {
    /// Clear internal state, forgetting any previously resolved URL
    fn reset(&mut self);

    /// Scan raw page content and update internal state
    ///
    /// # Errors
    ///
    /// Returns a [`ParseError`] when the content cannot be scanned; the
    /// worker logs it together with the raw content and skips the page.
    fn feed(&mut self, content: &[u8]) -> Result<(), ParseError>;

    /// The resolved image URL, if any content fed since the last reset
    /// contained a qualifying reference
    fn image_url(&self) -> Option<ImageUrl>;
}

/// Matches the source attribute of `img` elements in markup
fn img_src_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        // Pattern is a compile-time constant; failure is unreachable
        #[allow(clippy::expect_used)]
        Regex::new(r#"(?i)<img\s[^>]*?src\s*=\s*["']?([^"'\s>]+)"#)
            .expect("img src pattern is valid")
    })
}

/// Stock parser: first `img` source with a known relative path prefix
///
/// Scans markup for `img` elements whose source attribute value begins with
/// the configured relative prefix. The first qualifying occurrence wins;
/// later ones in the same content are ignored. The matched value has the
/// prefix stripped and any trailing query string removed, and the remainder
/// is appended to the configured base URL to form the absolute image URL.
///
/// # Examples
///
/// ```
/// use image_grabber::{ImageParser, MarkupImageParser};
///
/// let mut parser = MarkupImageParser::new("http://fatpita.net/images/", "images/");
/// parser.reset();
/// parser
///     .feed(b"<html><img src=\"images/cat.png?size=big\"></html>")
///     .unwrap();
///
/// let url = parser.image_url().unwrap();
/// assert_eq!(url.as_str(), "http://fatpita.net/images/cat.png");
/// ```
#[derive(Clone, Debug)]
pub struct MarkupImageParser {
    base_url: String,
    prefix: String,
    image_path: Option<String>,
}

impl MarkupImageParser {
    /// Create a parser resolving sources under `prefix` against `base_url`
    ///
    /// # Arguments
    ///
    /// * `base_url` - Absolute URL the stripped remainder is appended to
    /// * `prefix` - Relative path prefix a source value must start with
    #[must_use]
    pub fn new(base_url: impl Into<String>, prefix: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            prefix: prefix.into(),
            image_path: None,
        }
    }
}

impl ImageParser for MarkupImageParser {
    fn reset(&mut self) {
        self.image_path = None;
    }

    fn feed(&mut self, content: &[u8]) -> Result<(), ParseError> {
        let text = std::str::from_utf8(content).map_err(|e| ParseError::InvalidUtf8 {
            valid_up_to: e.valid_up_to(),
        })?;

        // First qualifying occurrence since the last reset is honored
        if self.image_path.is_some() {
            return Ok(());
        }

        for capture in img_src_pattern().captures_iter(text) {
            let Some(src) = capture.get(1) else { continue };
            if let Some(rest) = src.as_str().strip_prefix(&self.prefix) {
                // Trailing query string carries sizing metadata, not identity
                let name = match rest.split_once('?') {
                    Some((name, _query)) => name,
                    None => rest,
                };
                self.image_path = Some(name.to_string());
                break;
            }
        }

        Ok(())
    }

    fn image_url(&self) -> Option<ImageUrl> {
        self.image_path
            .as_ref()
            .map(|path| ImageUrl::new(format!("{}{}", self.base_url, path)))
    }
}
