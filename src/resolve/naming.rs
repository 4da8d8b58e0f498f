use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::cache::ContentCache;
use crate::core::types::{last_segment, ResolvedFolder};
use crate::transport::fetcher::CachedFetcher;
use crate::transport::TransportError;

/// Base name used by the oldest published folders
pub const DEFAULT_LEGACY_BASE_NAME: &str = "data";

/// Image extensions, in the order they are tried
pub const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "webp", "gif"];

/// Naming conventions beyond the built-in ones
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct NamingRules {
    pub legacy_base_name: String,

    /// Extra base names to try for specific folder keys
    pub overrides: HashMap<String, Vec<String>>,
}

impl Default for NamingRules {
    fn default() -> Self {
        Self {
            legacy_base_name: DEFAULT_LEGACY_BASE_NAME.to_string(),
            overrides: HashMap::new(),
        }
    }
}

/// Everything a candidate generator may look at
pub struct NamingContext<'a> {
    pub folder_key: &'a str,
    pub rules: &'a NamingRules,
}

/// Produces base-name candidates for a folder
pub type CandidateGenerator = fn(&NamingContext<'_>) -> Vec<String>;

fn segment_without_underscores(ctx: &NamingContext<'_>) -> Vec<String> {
    vec![last_segment(ctx.folder_key).replace('_', "")]
}

fn legacy_base_name(ctx: &NamingContext<'_>) -> Vec<String> {
    vec![ctx.rules.legacy_base_name.clone()]
}

fn configured_overrides(ctx: &NamingContext<'_>) -> Vec<String> {
    let key = ctx.folder_key.trim_matches('/');
    ctx.rules
        .overrides
        .get(key)
        .or_else(|| ctx.rules.overrides.get(ctx.folder_key))
        .cloned()
        .unwrap_or_default()
}

/// Conventions in priority order
pub const CANDIDATE_GENERATORS: &[CandidateGenerator] = &[
    segment_without_underscores,
    legacy_base_name,
    configured_overrides,
];

/// All base-name candidates for a folder, in priority order, without
/// duplicates or empty names
#[must_use]
pub fn candidate_base_names(ctx: &NamingContext<'_>) -> Vec<String> {
    CANDIDATE_GENERATORS
        .iter()
        .flat_map(|generate| generate(ctx))
        .map(|name| name.trim().to_string())
        .fold(Vec::new(), |mut names, name| {
            if !name.is_empty() && !names.contains(&name) {
                names.push(name);
            }
            names
        })
}

/// Finds the base name shared by a folder's files
pub struct NamingResolver {
    fetcher: Arc<CachedFetcher>,
    rules: NamingRules,
    resolved: ContentCache<ResolvedFolder>,
}

impl NamingResolver {
    pub fn new(fetcher: Arc<CachedFetcher>, rules: NamingRules, ttl: Duration) -> Self {
        Self {
            fetcher,
            rules,
            resolved: ContentCache::new(ttl),
        }
    }

    #[must_use]
    pub fn rules(&self) -> &NamingRules {
        &self.rules
    }

    /// Resolve a folder, consulting the probe cache first.
    ///
    /// A folder without any manifest is a cached, definitive miss for the
    /// cache window, not an error. When a probe fails the best answer found
    /// is returned but not cached, so the next call probes again.
    pub async fn resolve(&self, folder_key: &str) -> ResolvedFolder {
        if let Some(folder) = self.resolved.get(folder_key) {
            debug!(folder = folder_key, "folder resolution cache hit");
            return folder;
        }

        let (folder, complete) = self.probe_folder(folder_key).await;
        if complete {
            self.resolved.set(folder_key, folder.clone());
        } else {
            debug!(folder = folder_key, "probe failed, resolution not cached");
        }
        folder
    }

    /// Drop cached folder resolutions
    pub fn invalidate_all(&self) {
        self.resolved.invalidate_all();
    }

    /// Probe every convention. The flag is false when any probe failed.
    async fn probe_folder(&self, folder_key: &str) -> (ResolvedFolder, bool) {
        let ctx = NamingContext {
            folder_key,
            rules: &self.rules,
        };

        let (base_name, manifests_complete) =
            self.first_manifest(folder_key, candidate_base_names(&ctx)).await;
        let Some(base_name) = base_name else {
            debug!(folder = folder_key, "no naming convention matched");
            return (ResolvedFolder::not_found(folder_key), manifests_complete);
        };

        let table_file = format!("{base_name}.csv");
        let (table, image) = tokio::join!(
            self.exists(folder_key, &table_file),
            self.first_image_extension(folder_key, &base_name)
        );
        let complete = manifests_complete && table.is_ok() && image.is_ok();
        let has_table = table.unwrap_or(false);
        let image_extension = image.ok().flatten();

        debug!(
            folder = folder_key,
            base = %base_name,
            has_table,
            image = ?image_extension,
            "folder resolved"
        );

        let folder = ResolvedFolder {
            folder_key: folder_key.to_string(),
            base_name: Some(base_name),
            has_manifest: true,
            has_table,
            has_image: image_extension.is_some(),
            image_extension,
        };
        (folder, complete)
    }

    /// First candidate, in declaration order, whose manifest exists.
    ///
    /// A failed probe does not stop the search; it only marks the answer as
    /// incomplete.
    async fn first_manifest(&self, folder_key: &str, candidates: Vec<String>) -> (Option<String>, bool) {
        let mut complete = true;
        for candidate in candidates {
            match self.exists(folder_key, &format!("{candidate}.json")).await {
                Ok(true) => return (Some(candidate), complete),
                Ok(false) => {}
                Err(_) => complete = false,
            }
        }
        (None, complete)
    }

    async fn first_image_extension(
        &self,
        folder_key: &str,
        base_name: &str,
    ) -> Result<Option<String>, TransportError> {
        for extension in IMAGE_EXTENSIONS {
            if self.exists(folder_key, &format!("{base_name}.{extension}")).await? {
                return Ok(Some((*extension).to_string()));
            }
        }
        Ok(None)
    }

    async fn exists(&self, folder_key: &str, file_name: &str) -> Result<bool, TransportError> {
        let locator = match self.fetcher.locate(folder_key, file_name) {
            Ok(locator) => locator,
            Err(e) => {
                warn!(folder = folder_key, file = file_name, error = %e, "Unaddressable path");
                return Ok(false);
            }
        };
        self.fetcher.probe(&locator).await.map_err(|e| {
            warn!(folder = folder_key, file = file_name, error = %e, "Probe failed");
            e
        })
    }
}
