//! # diagram-catalog
//!
//! A library for browsing a catalog of annotated parts diagrams.
//!
//! Each diagram lives in its own folder, published either on a static web
//! server or in a local directory, and consists of up to three files sharing
//! a base name:
//!
//! - `<base>.json`: the manifest, marker coordinates in native image pixels
//! - `<base>.csv`: the parts table, one row per marker number
//! - `<base>.png` (or `jpg`, `jpeg`, `webp`, `gif`): the diagram image
//!
//! Folders were published under several naming conventions over time, so the
//! base name has to be discovered by probing. `diagram-catalog` resolves
//! folders, validates manifests, parses parts tables tolerantly, and projects
//! marker coordinates onto the image at whatever size it is rendered.
//!
//! ## Example
//!
//! ```rust,no_run
//! use diagram_catalog::{open_source, CatalogResolver, Settings, ValidationMode};
//!
//! # async fn demo() -> Result<(), Box<dyn std::error::Error>> {
//! let settings = Settings::default();
//! let transport = open_source("https://example.org/diagrams", settings.http_timeout())?;
//! let resolver = CatalogResolver::new(transport, &settings);
//!
//! let folders = vec!["10. Oil Lubricating System".to_string()];
//! for entry in resolver.list_catalog(&folders, ValidationMode::Strict).await {
//!     println!("{}: {} markers", entry.name, entry.marker_count);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Modules
//!
//! - [`cache`]: TTL-bounded caches for fetched content and probe results
//! - [`transport`]: HTTP, directory and in-memory sources
//! - [`resolve`]: Naming conventions and folder resolution
//! - [`parsing`]: Manifest validation and parts-table parsing
//! - [`geometry`]: Native-to-rendered coordinate projection
//! - [`catalog`]: Catalog listing and diagram loading
//! - [`config`]: TOML settings
//! - [`cli`]: Command-line interface implementation
//! - [`web`]: JSON web service

pub mod cache;
pub mod catalog;
pub mod cli;
pub mod config;
pub mod core;
pub mod geometry;
pub mod parsing;
pub mod resolve;
pub mod transport;
pub mod web;

// Re-export commonly used types for convenience
pub use catalog::diagram::Diagram;
pub use catalog::resolver::{CatalogOptions, CatalogResolver};
pub use config::Settings;
pub use core::manifest::{Coordinate, DiagramManifest};
pub use core::table::TableRow;
pub use core::types::*;
pub use geometry::projector::{MarkerPlacement, Projector};
pub use resolve::ResolveError;
pub use transport::{open_source, Transport};
