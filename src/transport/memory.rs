use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{PoisonError, RwLock};

use async_trait::async_trait;

use super::{folder_segments, validate_segment, FetchResponse, Transport, TransportError};

/// An in-memory file tree keyed by `folder/file` paths.
///
/// Counts every fetch and probe so callers can observe how much I/O a
/// cached layer actually issued.
#[derive(Default)]
pub struct MemoryTransport {
    files: RwLock<HashMap<String, FetchResponse>>,
    fetches: AtomicUsize,
    probes: AtomicUsize,
}

impl MemoryTransport {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a file served with status 200
    #[must_use]
    pub fn with_file(self, path: &str, body: impl Into<Vec<u8>>) -> Self {
        self.with_response(path, 200, body)
    }

    /// Add a file served with an arbitrary status
    #[must_use]
    pub fn with_response(self, path: &str, status: u16, body: impl Into<Vec<u8>>) -> Self {
        let body: Vec<u8> = body.into();
        self.insert(path, FetchResponse::new(status, body));
        self
    }

    pub fn insert(&self, path: &str, response: FetchResponse) {
        self.files
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(path.to_string(), response);
    }

    pub fn remove(&self, path: &str) {
        self.files
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(path);
    }

    /// Number of `fetch` calls so far
    pub fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }

    /// Number of `probe` calls so far
    pub fn probe_count(&self) -> usize {
        self.probes.load(Ordering::SeqCst)
    }

    fn lookup(&self, locator: &str) -> Option<FetchResponse> {
        self.files
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(locator)
            .cloned()
    }
}

#[async_trait]
impl Transport for MemoryTransport {
    fn locate(&self, folder_key: &str, file_name: &str) -> Result<String, TransportError> {
        validate_segment(file_name)?;
        let mut segments = folder_segments(folder_key)?;
        segments.push(file_name);
        Ok(segments.join("/"))
    }

    async fn fetch(&self, locator: &str) -> Result<FetchResponse, TransportError> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        Ok(self
            .lookup(locator)
            .unwrap_or_else(|| FetchResponse::new(404, Vec::new())))
    }

    async fn probe(&self, locator: &str) -> Result<bool, TransportError> {
        self.probes.fetch_add(1, Ordering::SeqCst);
        match self.lookup(locator) {
            Some(response) => FetchResponse::probe_outcome(locator, response.status),
            None => Ok(false),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_memory_transport_counts_io() {
        let transport = MemoryTransport::new()
            .with_file("Pump/Pump.json", "{}")
            .with_response("Pump/Pump.csv", 500, "boom")
            .with_response("Pump/Pump.png", 404, "");

        let json = transport.locate("Pump", "Pump.json").unwrap();
        let csv = transport.locate("Pump/", "Pump.csv").unwrap();
        assert_eq!(json, "Pump/Pump.json");

        assert!(transport.probe(&json).await.unwrap());
        assert!(!transport.probe("Pump/Pump.png").await.unwrap());
        assert!(!transport.probe("nope").await.unwrap());
        assert!(matches!(
            transport.probe(&csv).await,
            Err(TransportError::Status { status: 500, .. })
        ));
        assert_eq!(transport.fetch(&csv).await.unwrap().status, 500);
        assert_eq!(transport.fetch("nope").await.unwrap().status, 404);

        assert_eq!(transport.probe_count(), 4);
        assert_eq!(transport.fetch_count(), 2);
    }
}
