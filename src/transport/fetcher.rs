use std::sync::Arc;
use std::time::Duration;

use tracing::debug;

use super::{decode_image_size, FetchResponse, Transport, TransportError};
use crate::cache::ContentCache;
use crate::core::types::ImageSize;

/// A transport with the raw-fetch cache in front of it.
///
/// Successful (2xx) fetches and positive probes are cached for the fetch TTL.
/// Non-2xx responses become `TransportError::Status` and, like every other
/// failure, are not cached.
pub struct CachedFetcher {
    transport: Arc<dyn Transport>,
    responses: ContentCache<FetchResponse>,
    probes: ContentCache<()>,
}

impl CachedFetcher {
    pub fn new(transport: Arc<dyn Transport>, ttl: Duration) -> Self {
        Self {
            transport,
            responses: ContentCache::new(ttl),
            probes: ContentCache::new(ttl),
        }
    }

    /// See [`Transport::locate`]
    ///
    /// # Errors
    ///
    /// Returns `TransportError::InvalidPath` if the path cannot be addressed.
    pub fn locate(&self, folder_key: &str, file_name: &str) -> Result<String, TransportError> {
        self.transport.locate(folder_key, file_name)
    }

    /// Fetch a resource through the cache
    ///
    /// # Errors
    ///
    /// Returns `TransportError::Status` for non-2xx responses, or the
    /// underlying transport error.
    pub async fn fetch(&self, locator: &str) -> Result<FetchResponse, TransportError> {
        self.responses
            .get_or_try_insert_with(locator, || async {
                let response = self.transport.fetch(locator).await?;
                if response.is_success() {
                    Ok(response)
                } else {
                    Err(TransportError::Status {
                        locator: locator.to_string(),
                        status: response.status,
                    })
                }
            })
            .await
    }

    /// Fetch a resource and decode it as UTF-8 text
    ///
    /// # Errors
    ///
    /// See [`CachedFetcher::fetch`].
    pub async fn fetch_text(&self, locator: &str) -> Result<String, TransportError> {
        Ok(self.fetch(locator).await?.text())
    }

    /// Existence check through the cache. Only positive answers are cached.
    ///
    /// # Errors
    ///
    /// Returns the transport error when existence could not be determined.
    pub async fn probe(&self, locator: &str) -> Result<bool, TransportError> {
        if self.probes.get(locator).is_some() || self.responses.get(locator).is_some() {
            debug!(locator, "probe cache hit");
            return Ok(true);
        }

        let found = self.transport.probe(locator).await?;
        if found {
            self.probes.set(locator, ());
        }
        Ok(found)
    }

    /// Natural dimensions of the image at `locator`
    ///
    /// # Errors
    ///
    /// Returns a transport error if the image cannot be fetched, or
    /// `TransportError::Image` if it cannot be decoded.
    pub async fn image_size(&self, locator: &str) -> Result<ImageSize, TransportError> {
        let response = self.fetch(locator).await?;
        decode_image_size(locator, &response.body)
    }

    /// Drop every cached response and probe
    pub fn invalidate_all(&self) {
        self.responses.invalidate_all();
        self.probes.invalidate_all();
    }
}
