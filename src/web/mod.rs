//! JSON web service over the diagram catalog.
//!
//! A front end calls these endpoints instead of fetching and parsing the
//! diagram files itself. Every endpoint shares one resolver, so its caches
//! serve all clients.
//!
//! ## Starting the Server
//!
//! ```text
//! # Start on default port 8080
//! diagram-catalog --source ./diagrams serve
//!
//! # Custom port and auto-open browser
//! diagram-catalog --source https://example.org/diagrams serve --port 3000 --open
//! ```
//!
//! ## API Endpoints
//!
//! - `GET /health` - Liveness check
//! - `GET /api/catalog?strict=&sort=` - Catalog of the folders in `folders.json`
//! - `GET /api/diagrams/{folder}` - Markers joined with the parts table
//! - `GET /api/markers/{folder}?width=&viewport=` - Marker placements at a rendered width
//! - `POST /api/cache/clear` - Drop every cached fetch and folder resolution
//!
//! Folder keys may contain `/` for nested categories.

pub mod server;
