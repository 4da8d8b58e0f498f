use serde::Serialize;

use crate::core::manifest::{Coordinate, DiagramManifest};
use crate::core::table::TableRow;
use crate::core::types::{CatalogEntry, ResolvedFolder};
use crate::resolve::ResolveError;

/// Everything the detail view needs for one folder
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Diagram {
    pub folder: ResolvedFolder,

    /// `None` when the manifest exists but failed validation (lenient loads only)
    pub manifest: Option<DiagramManifest>,

    pub rows: Vec<TableRow>,

    /// Locator of the diagram image, if one was found
    pub image_url: Option<String>,
}

/// A marker together with the table row sharing its number
#[derive(Debug, Clone, Serialize)]
pub struct JoinedMarker<'a> {
    pub coordinate: &'a Coordinate,
    pub row: Option<&'a TableRow>,
}

/// Serializable detail view: markers joined with rows, plus leftover rows
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DiagramDetail<'a> {
    pub folder: &'a ResolvedFolder,
    pub image_name: Option<&'a str>,
    pub image_url: Option<&'a str>,
    pub markers: Vec<JoinedMarker<'a>>,
    pub unmatched_rows: Vec<&'a TableRow>,
    /// Error kind when the parts table has no usable rows
    pub table_status: Option<&'static str>,
}

impl Diagram {
    #[must_use]
    pub fn base_name(&self) -> &str {
        self.folder.base_name.as_deref().unwrap_or_default()
    }

    #[must_use]
    pub fn coordinates(&self) -> &[Coordinate] {
        self.manifest
            .as_ref()
            .map(|m| m.coordinates.as_slice())
            .unwrap_or_default()
    }

    #[must_use]
    pub fn marker_count(&self) -> usize {
        self.coordinates().len()
    }

    /// Join each marker with the first row whose number matches
    #[must_use]
    pub fn markers(&self) -> Vec<JoinedMarker<'_>> {
        self.coordinates()
            .iter()
            .map(|coordinate| JoinedMarker {
                coordinate,
                row: self.rows.iter().find(|r| r.number == coordinate.number),
            })
            .collect()
    }

    /// Rows with no marker on the diagram
    #[must_use]
    pub fn unmatched_rows(&self) -> Vec<&TableRow> {
        let coordinates = self.coordinates();
        self.rows
            .iter()
            .filter(|row| !coordinates.iter().any(|c| c.number == row.number))
            .collect()
    }

    /// `TableEmpty` when the parts list has no usable rows
    ///
    /// # Errors
    ///
    /// Returns `ResolveError::TableEmpty` if there are no rows.
    pub fn table_status(&self) -> Result<(), ResolveError> {
        if self.rows.is_empty() {
            Err(ResolveError::TableEmpty(self.folder.folder_key.clone()))
        } else {
            Ok(())
        }
    }

    #[must_use]
    pub fn detail(&self) -> DiagramDetail<'_> {
        DiagramDetail {
            folder: &self.folder,
            image_name: self.manifest.as_ref().map(|m| m.image_name.as_str()),
            image_url: self.image_url.as_deref(),
            markers: self.markers(),
            unmatched_rows: self.unmatched_rows(),
            table_status: self.table_status().err().map(|e| e.kind()),
        }
    }

    #[must_use]
    pub fn to_entry(&self) -> CatalogEntry {
        CatalogEntry {
            name: self.folder.display_name().to_string(),
            folder_key: self.folder.folder_key.clone(),
            base_name: self.base_name().to_string(),
            marker_count: self.marker_count(),
        }
    }
}
