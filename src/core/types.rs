use serde::{Deserialize, Serialize};

/// How strictly a manifest is validated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidationMode {
    /// Accept manifests with zero coordinates (detail view)
    #[default]
    Lenient,
    /// Require at least one coordinate (catalog listing)
    Strict,
}

impl ValidationMode {
    #[must_use]
    pub fn from_strict(strict: bool) -> Self {
        if strict {
            Self::Strict
        } else {
            Self::Lenient
        }
    }
}

impl std::fmt::Display for ValidationMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Lenient => write!(f, "lenient"),
            Self::Strict => write!(f, "strict"),
        }
    }
}

/// Outcome of naming resolution for one folder.
///
/// `base_name` is `None` when no naming convention produced a manifest. The
/// table and image flags are only meaningful when a base name was found, and
/// they always refer to files sharing that base name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedFolder {
    pub folder_key: String,
    pub base_name: Option<String>,
    pub has_manifest: bool,
    pub has_table: bool,
    pub has_image: bool,

    /// Extension of the first image file found (e.g. "png")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_extension: Option<String>,
}

impl ResolvedFolder {
    /// A folder for which no naming convention matched
    pub fn not_found(folder_key: impl Into<String>) -> Self {
        Self {
            folder_key: folder_key.into(),
            base_name: None,
            has_manifest: false,
            has_table: false,
            has_image: false,
            image_extension: None,
        }
    }

    #[must_use]
    pub fn is_found(&self) -> bool {
        self.base_name.is_some()
    }

    /// File name of the manifest, e.g. `Oil-System.json`
    #[must_use]
    pub fn manifest_file(&self) -> Option<String> {
        self.base_name.as_ref().map(|b| format!("{b}.json"))
    }

    /// File name of the parts table, if one exists
    #[must_use]
    pub fn table_file(&self) -> Option<String> {
        if !self.has_table {
            return None;
        }
        self.base_name.as_ref().map(|b| format!("{b}.csv"))
    }

    /// File name of the diagram image, if one exists
    #[must_use]
    pub fn image_file(&self) -> Option<String> {
        match (&self.base_name, &self.image_extension) {
            (Some(base), Some(ext)) if self.has_image => Some(format!("{base}.{ext}")),
            _ => None,
        }
    }

    /// Display name: the last path segment of the folder key
    #[must_use]
    pub fn display_name(&self) -> &str {
        last_segment(&self.folder_key)
    }
}

/// One row of the catalog listing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogEntry {
    pub name: String,
    pub folder_key: String,
    pub base_name: String,
    pub marker_count: usize,
}

/// Native (undistorted) pixel dimensions of a diagram image
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageSize {
    pub width: u32,
    pub height: u32,
}

impl ImageSize {
    #[must_use]
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

/// Last `/`-separated segment of a folder key, ignoring trailing separators
#[must_use]
pub fn last_segment(folder_key: &str) -> &str {
    folder_key
        .trim_end_matches('/')
        .rsplit('/')
        .next()
        .unwrap_or(folder_key)
}
