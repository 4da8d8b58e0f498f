//! The diagram catalog: which folders hold diagrams, and what each one contains.
//!
//! [`resolver::CatalogResolver`] is the entry point. It resolves folders
//! through the naming conventions in [`crate::resolve`], fetches manifests
//! and parts tables through the cached transport, and decides per folder
//! whether it belongs in the listing.
//!
//! ## Inclusion rules
//!
//! | Folder state                    | Lenient | Strict |
//! |---------------------------------|---------|--------|
//! | No manifest under any name      | skipped | skipped|
//! | Manifest with markers           | listed  | listed |
//! | Manifest with no markers        | listed  | skipped|
//! | Manifest is HTML or invalid     | listed, 0 markers | skipped |
//! | Manifest fetch fails            | skipped | skipped|
//!
//! `require_table` and `require_image` in [`resolver::CatalogOptions`] drop
//! further folders in either mode.
//!
//! ## Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use diagram_catalog::catalog::resolver::CatalogResolver;
//! use diagram_catalog::config::Settings;
//! use diagram_catalog::transport::dir::DirTransport;
//! use diagram_catalog::ValidationMode;
//!
//! # async fn demo() -> Result<(), Box<dyn std::error::Error>> {
//! let resolver = CatalogResolver::new(
//!     Arc::new(DirTransport::new("/srv/diagrams")),
//!     &Settings::default(),
//! );
//! for entry in resolver.list_discovered(ValidationMode::Strict).await? {
//!     println!("{} ({} markers)", entry.name, entry.marker_count);
//! }
//! # Ok(())
//! # }
//! ```

pub mod diagram;
pub mod ordering;
pub mod resolver;
