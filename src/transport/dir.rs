use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tracing::debug;

use super::{folder_segments, validate_segment, FetchResponse, Transport, TransportError};

/// Reads diagrams from a local directory tree.
///
/// Missing files are reported like an HTTP 404 so callers see the same
/// outcome regardless of the source.
pub struct DirTransport {
    root: PathBuf,
}

impl DirTransport {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }
}

#[async_trait]
impl Transport for DirTransport {
    fn locate(&self, folder_key: &str, file_name: &str) -> Result<String, TransportError> {
        let mut path = self.root.clone();
        for segment in folder_segments(folder_key)? {
            path.push(segment);
        }
        validate_segment(file_name)?;
        if file_name.contains('/') {
            return Err(TransportError::InvalidPath(file_name.to_string()));
        }
        path.push(file_name);
        Ok(path.to_string_lossy().into_owned())
    }

    async fn fetch(&self, locator: &str) -> Result<FetchResponse, TransportError> {
        match tokio::fs::read(locator).await {
            Ok(bytes) => {
                debug!(locator, bytes = bytes.len(), "read");
                Ok(FetchResponse::new(200, bytes))
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(FetchResponse::new(404, Vec::new())),
            Err(e) => Err(e.into()),
        }
    }

    async fn probe(&self, locator: &str) -> Result<bool, TransportError> {
        let found = match tokio::fs::metadata(locator).await {
            Ok(metadata) => metadata.is_file(),
            Err(e) if e.kind() == ErrorKind::NotFound => false,
            Err(e) => return Err(e.into()),
        };
        debug!(locator, found, "probed");
        Ok(found)
    }
}
