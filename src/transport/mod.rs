//! The storage boundary diagrams are read from.
//!
//! A [`Transport`] turns folder keys and file names into resource locators and
//! answers two questions about a locator: what are its bytes
//! ([`Transport::fetch`]) and does it exist ([`Transport::probe`]).
//!
//! - [`HttpTransport`]: a published site, probed with `HEAD` requests (or `GET`
//!   when the host refuses `HEAD`)
//! - [`DirTransport`]: a local directory tree
//! - [`MemoryTransport`]: an in-memory file map, useful for embedding and tests
//!
//! [`CachedFetcher`] puts the raw-fetch cache in front of any transport and
//! knows how to learn an image's natural dimensions.
//!
//! [`HttpTransport`]: http::HttpTransport
//! [`DirTransport`]: dir::DirTransport
//! [`MemoryTransport`]: memory::MemoryTransport
//! [`CachedFetcher`]: fetcher::CachedFetcher

pub mod dir;
pub mod fetcher;
pub mod http;
pub mod memory;

use std::io::Cursor;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

use crate::core::types::ImageSize;

#[derive(Error, Debug)]
pub enum TransportError {
    #[error("{locator} returned status {status}")]
    Status { locator: String, status: u16 },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Invalid resource path: {0}")]
    InvalidPath(String),

    #[error("Failed to decode image {locator}: {message}")]
    Image { locator: String, message: String },
}

impl TransportError {
    /// True when the resource simply does not exist
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::Status { status: 404, .. })
    }
}

/// Body and status of a fetched resource
#[derive(Debug, Clone)]
pub struct FetchResponse {
    pub status: u16,
    pub body: Arc<[u8]>,
}

impl FetchResponse {
    /// Classify a probe answer: 2xx exists, 404 does not, anything else fails.
    ///
    /// # Errors
    ///
    /// Returns `TransportError::Status` for statuses other than 2xx and 404.
    pub fn probe_outcome(locator: &str, status: u16) -> Result<bool, TransportError> {
        match status {
            200..=299 => Ok(true),
            404 => Ok(false),
            status => Err(TransportError::Status {
                locator: locator.to_string(),
                status,
            }),
        }
    }

    pub fn new(status: u16, body: impl Into<Arc<[u8]>>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    #[must_use]
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Body decoded as UTF-8, replacing invalid sequences
    #[must_use]
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    /// Body parsed as JSON
    ///
    /// # Errors
    ///
    /// Returns the `serde_json` error if the body is not valid JSON.
    pub fn json(&self) -> Result<serde_json::Value, serde_json::Error> {
        serde_json::from_slice(&self.body)
    }
}

#[async_trait]
pub trait Transport: Send + Sync {
    /// Build the locator of `file_name` inside the folder named by `folder_key`.
    ///
    /// Folder keys may contain `/` for nested categories. An empty folder key
    /// addresses the top level.
    ///
    /// # Errors
    ///
    /// Returns `TransportError::InvalidPath` if a segment cannot be addressed.
    fn locate(&self, folder_key: &str, file_name: &str) -> Result<String, TransportError>;

    /// Fetch a resource. Non-2xx responses are returned, not turned into errors.
    async fn fetch(&self, locator: &str) -> Result<FetchResponse, TransportError>;

    /// Report whether a resource exists, without reading it.
    ///
    /// # Errors
    ///
    /// A definite absence (404, missing file) is `Ok(false)`. Any other
    /// failure is an error so callers never mistake an outage for a miss.
    async fn probe(&self, locator: &str) -> Result<bool, TransportError>;
}

/// Split a folder key into path segments, rejecting ones that would escape the
/// source root.
///
/// # Errors
///
/// Returns `TransportError::InvalidPath` for `.`/`..` segments or control
/// characters.
pub fn folder_segments(folder_key: &str) -> Result<Vec<&str>, TransportError> {
    let mut segments = Vec::new();
    for segment in folder_key.split('/').filter(|s| !s.is_empty()) {
        validate_segment(segment)?;
        segments.push(segment);
    }
    Ok(segments)
}

/// Validate one path segment (a folder name or a file name).
///
/// # Errors
///
/// Returns `TransportError::InvalidPath` if the segment is a dot segment,
/// contains a backslash or contains control characters.
pub fn validate_segment(segment: &str) -> Result<(), TransportError> {
    if segment == "." || segment == ".." {
        return Err(TransportError::InvalidPath(segment.to_string()));
    }
    if segment.contains('\\') || segment.chars().any(char::is_control) {
        return Err(TransportError::InvalidPath(segment.escape_debug().to_string()));
    }
    Ok(())
}

/// Read natural width/height from encoded image bytes
///
/// # Errors
///
/// Returns `TransportError::Image` if the format is unknown or the header is
/// corrupt.
pub fn decode_image_size(locator: &str, bytes: &[u8]) -> Result<ImageSize, TransportError> {
    let to_error = |message: String| TransportError::Image {
        locator: locator.to_string(),
        message,
    };

    let (width, height) = image::ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .map_err(|e| to_error(e.to_string()))?
        .into_dimensions()
        .map_err(|e| to_error(e.to_string()))?;

    Ok(ImageSize::new(width, height))
}

/// Open a transport for a source string: `http(s)://` URLs use HTTP, anything
/// else is treated as a local directory.
///
/// # Errors
///
/// Returns an error if the URL is malformed or the HTTP client cannot be built.
pub fn open_source(
    source: &str,
    timeout: Option<Duration>,
) -> Result<Arc<dyn Transport>, TransportError> {
    if source.starts_with("http://") || source.starts_with("https://") {
        Ok(Arc::new(http::HttpTransport::new(source, timeout)?))
    } else {
        Ok(Arc::new(dir::DirTransport::new(source)))
    }
}
