use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;
use tracing::debug;
use url::Url;

use super::{folder_segments, validate_segment, FetchResponse, Transport, TransportError};

/// Reads diagrams from a published HTTP(S) site
pub struct HttpTransport {
    client: reqwest::Client,
    base: Url,
}

impl HttpTransport {
    /// Create a transport rooted at `base` (e.g. `https://example.org/diagrams`).
    ///
    /// # Errors
    ///
    /// Returns `TransportError::InvalidPath` if `base` is not an absolute URL
    /// that can carry path segments, or `TransportError::Http` if the client
    /// cannot be built.
    pub fn new(base: &str, timeout: Option<Duration>) -> Result<Self, TransportError> {
        let base = Url::parse(base).map_err(|e| TransportError::InvalidPath(format!("{base}: {e}")))?;
        if base.cannot_be_a_base() {
            return Err(TransportError::InvalidPath(base.to_string()));
        }

        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            client: builder.build()?,
            base,
        })
    }

    #[must_use]
    pub fn base(&self) -> &Url {
        &self.base
    }
}

#[async_trait]
impl Transport for HttpTransport {
    fn locate(&self, folder_key: &str, file_name: &str) -> Result<String, TransportError> {
        let segments = folder_segments(folder_key)?;
        validate_segment(file_name)?;

        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|()| TransportError::InvalidPath(self.base.to_string()))?
            .pop_if_empty()
            .extend(segments)
            .push(file_name);
        Ok(url.into())
    }

    async fn fetch(&self, locator: &str) -> Result<FetchResponse, TransportError> {
        let response = self.client.get(locator).send().await?;
        let status = response.status().as_u16();
        let body = response.bytes().await?;
        debug!(locator, status, bytes = body.len(), "fetched");
        Ok(FetchResponse::new(status, body.to_vec()))
    }

    async fn probe(&self, locator: &str) -> Result<bool, TransportError> {
        let mut status = self.client.head(locator).send().await?.status();
        if status == StatusCode::METHOD_NOT_ALLOWED {
            // Some static hosts only answer GET
            debug!(locator, "HEAD refused, probing with GET");
            status = self.client.get(locator).send().await?.status();
        }
        let found = FetchResponse::probe_outcome(locator, status.as_u16());
        debug!(locator, status = status.as_u16(), found = ?found.as_ref().ok(), "probed");
        found
    }
}
