use std::sync::Arc;

use futures::future::join_all;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::diagram::Diagram;
use crate::config::Settings;
use crate::core::manifest::{CoordinateId, DiagramManifest};
use crate::core::table::TableRow;
use crate::core::types::{CatalogEntry, ImageSize, ResolvedFolder, ValidationMode};
use crate::geometry::projector::{MarkerPlacement, Projector};
use crate::parsing::manifest::parse_manifest;
use crate::parsing::table::{parse_table_with, TableOptions};
use crate::resolve::naming::NamingResolver;
use crate::resolve::ResolveError;
use crate::transport::fetcher::CachedFetcher;
use crate::transport::{Transport, TransportError};

/// Top-level index of known folders
pub const FOLDERS_INDEX: &str = "folders.json";

/// Shape of `folders.json`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FoldersIndex {
    pub folders: Vec<String>,
}

/// Catalog inclusion policy
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CatalogOptions {
    /// Require at least one marker for a folder to be listed
    pub strict: bool,
    /// Drop folders whose parts table is missing or empty
    pub require_table: bool,
    /// Drop folders without an image
    pub require_image: bool,
}

impl CatalogOptions {
    #[must_use]
    pub fn mode(&self) -> ValidationMode {
        ValidationMode::from_strict(self.strict)
    }
}

/// One marker placed on the rendered image
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectedMarker {
    pub id: CoordinateId,
    pub number: String,
    #[serde(flatten)]
    pub placement: MarkerPlacement,
}

/// Marker placements for one diagram at one rendered width
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MarkerLayout {
    pub folder_key: String,
    pub native: ImageSize,
    pub rendered_width: f64,
    pub scale: f64,
    pub markers: Vec<ProjectedMarker>,
}

/// Answers "what diagrams exist" and "what does diagram X contain"
pub struct CatalogResolver {
    fetcher: Arc<CachedFetcher>,
    naming: NamingResolver,
    options: CatalogOptions,
    table_options: TableOptions,
}

impl CatalogResolver {
    pub fn new(transport: Arc<dyn Transport>, settings: &Settings) -> Self {
        let fetcher = Arc::new(CachedFetcher::new(transport, settings.cache.fetch_ttl()));
        let naming = NamingResolver::new(
            fetcher.clone(),
            settings.naming.clone(),
            settings.cache.probe_ttl(),
        );
        Self {
            fetcher,
            naming,
            options: settings.catalog.clone(),
            table_options: settings.table_options(),
        }
    }

    #[must_use]
    pub fn options(&self) -> &CatalogOptions {
        &self.options
    }

    /// Read the folder list from `folders.json`, keeping order and dropping
    /// blanks and repeats
    ///
    /// # Errors
    ///
    /// Returns `ResolveError::Transport` if the index cannot be fetched, or
    /// `ResolveError::IndexInvalid` if it is not `{ "folders": [...] }`.
    pub async fn discover_folders(&self) -> Result<Vec<String>, ResolveError> {
        let locator = self.fetcher.locate("", FOLDERS_INDEX)?;
        let text = self.fetcher.fetch_text(&locator).await?;
        let index: FoldersIndex = serde_json::from_str(&text)?;

        let mut folders: Vec<String> = Vec::with_capacity(index.folders.len());
        for folder in index.folders {
            let folder = folder.trim().to_string();
            if !folder.is_empty() && !folders.contains(&folder) {
                folders.push(folder);
            }
        }
        Ok(folders)
    }

    /// Build catalog entries for the given folders, resolving them
    /// concurrently. Entries keep the input order; folders that do not
    /// resolve are left out.
    pub async fn list_catalog(&self, folder_keys: &[String], mode: ValidationMode) -> Vec<CatalogEntry> {
        let entries: Vec<CatalogEntry> = join_all(
            folder_keys
                .iter()
                .map(|key| self.catalog_entry(key, mode)),
        )
        .await
        .into_iter()
        .flatten()
        .collect();

        info!(
            requested = folder_keys.len(),
            listed = entries.len(),
            %mode,
            "Catalog built"
        );
        entries
    }

    /// [`CatalogResolver::list_catalog`] over the folders in `folders.json`
    ///
    /// # Errors
    ///
    /// See [`CatalogResolver::discover_folders`].
    pub async fn list_discovered(&self, mode: ValidationMode) -> Result<Vec<CatalogEntry>, ResolveError> {
        let folders = self.discover_folders().await?;
        Ok(self.list_catalog(&folders, mode).await)
    }

    async fn catalog_entry(&self, folder_key: &str, mode: ValidationMode) -> Option<CatalogEntry> {
        let diagram = match self.load_diagram(folder_key, mode).await {
            Ok(diagram) => diagram,
            Err(e) if e.is_not_found() => {
                debug!(folder = folder_key, error = %e, "Folder not listed");
                return None;
            }
            Err(e) => {
                warn!(folder = folder_key, error = %e, "Folder not listed");
                return None;
            }
        };

        if self.options.require_table && diagram.table_status().is_err() {
            debug!(folder = folder_key, "Folder not listed: no table rows");
            return None;
        }
        if self.options.require_image && !diagram.folder.has_image {
            debug!(folder = folder_key, "Folder not listed: no image");
            return None;
        }

        Some(diagram.to_entry())
    }

    /// Naming resolution only
    pub async fn resolve_folder(&self, folder_key: &str) -> ResolvedFolder {
        self.naming.resolve(folder_key).await
    }

    /// Load a diagram's manifest and parts table, fetched concurrently.
    ///
    /// In lenient mode a manifest that exists but fails validation yields a
    /// diagram without markers; in strict mode it is an error. A missing or
    /// unreadable table yields an empty parts list.
    ///
    /// # Errors
    ///
    /// Returns `ResolveError::NotFound` if no naming convention matched,
    /// `ResolveError::ManifestInvalid` (strict mode), or
    /// `ResolveError::Transport` if the manifest cannot be fetched.
    pub async fn load_diagram(&self, folder_key: &str, mode: ValidationMode) -> Result<Diagram, ResolveError> {
        let folder = self.naming.resolve(folder_key).await;
        let Some(manifest_file) = folder.manifest_file() else {
            return Err(ResolveError::NotFound(folder_key.to_string()));
        };

        let manifest_locator = self.fetcher.locate(folder_key, &manifest_file)?;
        let table_locator = folder
            .table_file()
            .map(|file| self.fetcher.locate(folder_key, &file))
            .transpose()?;
        let image_url = folder
            .image_file()
            .map(|file| self.fetcher.locate(folder_key, &file))
            .transpose()?;

        let (manifest, rows) = tokio::join!(
            self.fetch_manifest(&manifest_locator, mode),
            self.fetch_rows(folder_key, table_locator.as_deref())
        );

        let manifest = match manifest {
            Ok(manifest) => Some(manifest),
            Err(ResolveError::ManifestInvalid(e)) if mode == ValidationMode::Lenient => {
                warn!(folder = folder_key, error = %e, "Manifest invalid, showing no markers");
                None
            }
            Err(e) => return Err(e),
        };

        let diagram = Diagram {
            folder,
            manifest,
            rows,
            image_url,
        };
        if let Err(e) = diagram.table_status() {
            debug!(folder = folder_key, kind = e.kind(), "{e}");
        }
        Ok(diagram)
    }

    async fn fetch_manifest(&self, locator: &str, mode: ValidationMode) -> Result<DiagramManifest, ResolveError> {
        let text = self.fetcher.fetch_text(locator).await?;
        Ok(parse_manifest(&text, mode)?)
    }

    async fn fetch_rows(&self, folder_key: &str, locator: Option<&str>) -> Vec<TableRow> {
        let Some(locator) = locator else {
            return Vec::new();
        };
        match self.fetcher.fetch_text(locator).await {
            Ok(text) => parse_table_with(&text, self.table_options),
            Err(e) => {
                warn!(folder = folder_key, error = %e, "Parts table unavailable");
                Vec::new()
            }
        }
    }

    /// Place a diagram's markers on its image rendered at `rendered_width`
    /// pixels. The image's natural size is learned by decoding it.
    ///
    /// # Errors
    ///
    /// Returns the errors of [`CatalogResolver::load_diagram`], or
    /// `ResolveError::ImageUnavailable` if the diagram has no decodable image.
    pub async fn project_markers(
        &self,
        folder_key: &str,
        rendered_width: f64,
        viewport_width: Option<f64>,
    ) -> Result<MarkerLayout, ResolveError> {
        let diagram = self.load_diagram(folder_key, ValidationMode::Lenient).await?;
        let image_unavailable = || ResolveError::ImageUnavailable(folder_key.to_string());

        let image_url = diagram.image_url.as_deref().ok_or_else(image_unavailable)?;
        let native = match self.fetcher.image_size(image_url).await {
            Ok(size) => size,
            Err(e @ TransportError::Image { .. }) => {
                warn!(folder = folder_key, error = %e, "Image not decodable");
                return Err(image_unavailable());
            }
            Err(e) => return Err(e.into()),
        };

        let mut projector = Projector::new(native).ok_or_else(image_unavailable)?;
        if let Some(viewport_width) = viewport_width {
            projector.set_viewport_width(viewport_width);
        }
        projector.observe(rendered_width);

        let markers = diagram
            .coordinates()
            .iter()
            .map(|coordinate| ProjectedMarker {
                id: coordinate.id.clone(),
                number: coordinate.number.clone(),
                placement: projector.project(coordinate),
            })
            .collect();

        Ok(MarkerLayout {
            folder_key: folder_key.to_string(),
            native,
            rendered_width: projector.rendered_width(),
            scale: projector.scale(),
            markers,
        })
    }

    /// Invalidate both the raw-fetch and the folder-probe caches
    pub fn clear_caches(&self) {
        self.fetcher.invalidate_all();
        self.naming.invalidate_all();
        info!("Caches cleared");
    }
}
