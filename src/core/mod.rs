//! Core data types for diagram resolution.
//!
//! - [`DiagramManifest`]/[`Coordinate`]: the JSON coordinate manifest
//! - [`TableRow`]: one row of the parts table
//! - [`ResolvedFolder`]: the outcome of naming resolution for a folder
//! - [`CatalogEntry`], [`ImageSize`], [`ValidationMode`]: listing and geometry types
//!
//! ## Folder layout
//!
//! Every diagram folder shares one base name across its files:
//!
//! | File | Content |
//! |------|---------|
//! | `<base>.json` | coordinate manifest |
//! | `<base>.csv` | parts table |
//! | `<base>.{png,jpg,jpeg,webp,gif}` | diagram image |
//!
//! Markers join to table rows on the `number` label, not on ids.
//!
//! [`DiagramManifest`]: manifest::DiagramManifest
//! [`Coordinate`]: manifest::Coordinate
//! [`TableRow`]: table::TableRow
//! [`ResolvedFolder`]: types::ResolvedFolder
//! [`CatalogEntry`]: types::CatalogEntry
//! [`ImageSize`]: types::ImageSize
//! [`ValidationMode`]: types::ValidationMode

pub mod manifest;
pub mod table;
pub mod types;
