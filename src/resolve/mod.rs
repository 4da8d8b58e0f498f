//! Locating a diagram's files from its folder name.
//!
//! Folders were published over time under several naming conventions, so the
//! base name shared by a folder's manifest, table and image has to be
//! discovered. [`naming::NamingResolver`] tries the conventions in a fixed
//! order and settles on the first one whose manifest exists.
//!
//! ## Conventions, in priority order
//!
//! 1. The folder's last path segment with underscores removed
//!    (`Fuel_Pump` -> `FuelPump`)
//! 2. The legacy base name (`data` unless configured otherwise)
//! 3. Base names configured for that specific folder

pub mod naming;

use thiserror::Error;

use crate::parsing::manifest::ManifestError;
use crate::transport::TransportError;

/// Failure outcomes of diagram resolution. None of them is fatal; the catalog
/// turns them into per-folder inclusion decisions.
#[derive(Error, Debug)]
pub enum ResolveError {
    #[error("No manifest found for folder '{0}'")]
    NotFound(String),

    #[error("Invalid manifest: {0}")]
    ManifestInvalid(#[from] ManifestError),

    #[error("Parts table for '{0}' has no usable rows")]
    TableEmpty(String),

    #[error("No decodable image for folder '{0}'")]
    ImageUnavailable(String),

    #[error("Invalid folder index: {0}")]
    IndexInvalid(#[from] serde_json::Error),

    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),
}

impl ResolveError {
    /// Stable machine-readable error code
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::NotFound(_) => "not_found",
            Self::ManifestInvalid(_) => "manifest_invalid",
            Self::TableEmpty(_) => "table_empty",
            Self::ImageUnavailable(_) => "image_unavailable",
            Self::IndexInvalid(_) => "index_invalid",
            Self::Transport(_) => "transport_error",
        }
    }

    /// True for outcomes that mean "this folder has no diagram"
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_) | Self::ManifestInvalid(_))
    }
}
