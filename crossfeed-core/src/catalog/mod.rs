//! Read-only catalog index over the session's content items.
//!
//! The catalog collaborator hands over the full item list once at startup.
//! The index validates relational invariants up front so that everything
//! downstream (neighbor resolution, playback) can rely on ids resolving.

pub mod item;
#[cfg(any(test, feature = "test-utils"))]
pub mod test_fixtures;

use std::collections::{BTreeSet, HashMap, HashSet};
use std::path::Path;

pub use item::{ContentId, ContentItem, SeriesId};

/// Errors raised while building or querying the catalog.
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("Content item not found: {id}")]
    NotFound { id: ContentId },

    #[error("Invalid catalog: {reason}")]
    InvalidCatalog { reason: String },

    #[error("Catalog parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Catalog I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// In-memory index over an immutable list of content items.
///
/// Item order is the catalog order supplied by the collaborator and is the
/// tie-breaker for every "first match" query.
#[derive(Debug, Clone)]
pub struct CatalogIndex {
    items: Vec<ContentItem>,
    by_id: HashMap<ContentId, usize>,
    /// Item positions per series, sorted by episode number
    series: HashMap<SeriesId, Vec<usize>>,
}

impl CatalogIndex {
    /// Builds the index and validates catalog invariants.
    ///
    /// # Errors
    ///
    /// - `CatalogError::InvalidCatalog` - Duplicate ids, a series item without an
    ///   episode number, duplicate `(series, episode)` pairs, or a malformed
    ///   alternate-version ring
    pub fn new(items: Vec<ContentItem>) -> Result<Self, CatalogError> {
        let mut by_id = HashMap::with_capacity(items.len());
        let mut series: HashMap<SeriesId, Vec<usize>> = HashMap::new();
        let mut episodes_seen: HashSet<(SeriesId, u32)> = HashSet::new();

        for (position, item) in items.iter().enumerate() {
            if by_id.insert(item.id.clone(), position).is_some() {
                return Err(CatalogError::InvalidCatalog {
                    reason: format!("duplicate item id {}", item.id),
                });
            }

            if let Some(series_id) = &item.series_id {
                let episode = match item.episode_number {
                    Some(episode) if episode >= 1 => episode,
                    _ => {
                        return Err(CatalogError::InvalidCatalog {
                            reason: format!(
                                "item {} is in series {} without a valid episode number",
                                item.id, series_id
                            ),
                        });
                    }
                };

                if !episodes_seen.insert((series_id.clone(), episode)) {
                    return Err(CatalogError::InvalidCatalog {
                        reason: format!("series {series_id} has more than one episode {episode}"),
                    });
                }

                series.entry(series_id.clone()).or_default().push(position);
            }
        }

        for positions in series.values_mut() {
            positions.sort_by_key(|&position| items[position].episode_number);
        }

        let index = Self {
            items,
            by_id,
            series,
        };
        index.validate_alternate_rings()?;

        tracing::debug!(
            "Catalog indexed: {} items, {} series",
            index.items.len(),
            index.series.len()
        );

        Ok(index)
    }

    /// Parses a JSON array of items and builds the index.
    ///
    /// # Errors
    ///
    /// - `CatalogError::Parse` - Input is not a valid item array
    /// - `CatalogError::InvalidCatalog` - Items violate catalog invariants
    pub fn from_json_str(json: &str) -> Result<Self, CatalogError> {
        let items: Vec<ContentItem> = serde_json::from_str(json)?;
        Self::new(items)
    }

    /// Reads a JSON catalog file and builds the index.
    ///
    /// # Errors
    ///
    /// - `CatalogError::Io` - File could not be read
    /// - `CatalogError::Parse` - File is not a valid item array
    /// - `CatalogError::InvalidCatalog` - Items violate catalog invariants
    pub async fn load(path: &Path) -> Result<Self, CatalogError> {
        let json = tokio::fs::read_to_string(path).await?;
        let index = Self::from_json_str(&json)?;
        tracing::info!("Loaded {} catalog items from {}", index.len(), path.display());
        Ok(index)
    }

    /// Looks up an item by id.
    ///
    /// # Errors
    ///
    /// - `CatalogError::NotFound` - No item with this id exists
    pub fn find_by_id(&self, id: &ContentId) -> Result<&ContentItem, CatalogError> {
        self.by_id
            .get(id)
            .map(|&position| &self.items[position])
            .ok_or_else(|| CatalogError::NotFound { id: id.clone() })
    }

    /// Returns true if the id resolves in this catalog.
    pub fn contains(&self, id: &ContentId) -> bool {
        self.by_id.contains_key(id)
    }

    /// Items of a series in ascending episode order.
    ///
    /// The returned iterator is `Clone`, so callers can restart it. Unknown
    /// series yield an empty sequence.
    pub fn items_in_series<'a>(
        &'a self,
        series: &'a SeriesId,
    ) -> impl Iterator<Item = &'a ContentItem> + Clone + 'a {
        self.series
            .get(series)
            .map(Vec::as_slice)
            .unwrap_or_default()
            .iter()
            .map(|&position| &self.items[position])
    }

    /// Items carrying at least one of `tags`, in catalog order, skipping `exclude`.
    pub fn items_with_any_tag<'a>(
        &'a self,
        tags: &'a BTreeSet<String>,
        exclude: &'a ContentId,
    ) -> impl Iterator<Item = &'a ContentItem> + Clone + 'a {
        self.items
            .iter()
            .filter(move |item| &item.id != exclude && item.shares_any_tag(tags))
    }

    /// All items in catalog order.
    pub fn items(&self) -> &[ContentItem] {
        &self.items
    }

    /// Series ids known to the catalog, sorted.
    pub fn series_ids(&self) -> Vec<&SeriesId> {
        let mut ids: Vec<&SeriesId> = self.series.keys().collect();
        ids.sort();
        ids
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    fn validate_alternate_rings(&self) -> Result<(), CatalogError> {
        for item in &self.items {
            let Some(ring) = &item.alternate_version_ids else {
                continue;
            };

            let own_occurrences = ring.iter().filter(|id| **id == item.id).count();
            if own_occurrences != 1 {
                return Err(CatalogError::InvalidCatalog {
                    reason: format!(
                        "alternate versions of {} must contain its own id exactly once",
                        item.id
                    ),
                });
            }

            if let Some(missing) = ring.iter().find(|id| !self.contains(id)) {
                return Err(CatalogError::InvalidCatalog {
                    reason: format!(
                        "alternate versions of {} reference unknown item {missing}",
                        item.id
                    ),
                });
            }
        }
        Ok(())
    }
}
