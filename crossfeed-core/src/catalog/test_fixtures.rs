//! Test fixtures for catalog-driven tests.
//!
//! Provides a fluent item builder and the canonical small catalogs used
//! across adjacency, cache and navigation tests.

use std::collections::BTreeSet;

use chrono::{TimeZone, Utc};

use super::{CatalogIndex, ContentId, ContentItem, SeriesId};

/// Fluent builder for `ContentItem` values in tests.
#[derive(Debug, Clone)]
pub struct ItemBuilder {
    item: ContentItem,
}

impl ItemBuilder {
    /// Starts a standalone, untagged item with placeholder media URLs.
    pub fn new(id: &str) -> Self {
        Self {
            item: ContentItem {
                id: ContentId::new(id),
                title: id.to_string(),
                description: String::new(),
                series_id: None,
                episode_number: None,
                alternate_version_ids: None,
                tags: BTreeSet::new(),
                media_url: format!("https://cdn.example.com/media/{id}.mp4"),
                poster_url: format!("https://cdn.example.com/posters/{id}.jpg"),
                duration_seconds: 60.0,
                views: 0,
                likes: 0,
                created_at: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
            },
        }
    }

    pub fn series(mut self, series: &str, episode: u32) -> Self {
        self.item.series_id = Some(SeriesId::new(series));
        self.item.episode_number = Some(episode);
        self
    }

    pub fn tags(mut self, tags: &[&str]) -> Self {
        self.item.tags = tags.iter().map(|tag| tag.to_string()).collect();
        self
    }

    pub fn alternates(mut self, ids: &[&str]) -> Self {
        self.item.alternate_version_ids = Some(ids.iter().map(|id| ContentId::new(*id)).collect());
        self
    }

    pub fn duration(mut self, seconds: f64) -> Self {
        self.item.duration_seconds = seconds;
        self
    }

    pub fn media_url(mut self, url: &str) -> Self {
        self.item.media_url = url.to_string();
        self
    }

    pub fn build(self) -> ContentItem {
        self.item
    }
}

/// Series `phys` (episodes 1-3) plus standalone `Q`, all tagged `physics`.
///
/// # Panics
///
/// Panics if the fixture violates catalog invariants, which would be a bug
/// in the fixture itself.
pub fn physics_catalog() -> CatalogIndex {
    CatalogIndex::new(vec![
        ItemBuilder::new("phys-1")
            .series("phys", 1)
            .tags(&["physics"])
            .build(),
        ItemBuilder::new("phys-2")
            .series("phys", 2)
            .tags(&["physics"])
            .build(),
        ItemBuilder::new("phys-3")
            .series("phys", 3)
            .tags(&["physics"])
            .build(),
        ItemBuilder::new("Q").tags(&["physics"]).build(),
    ])
    .unwrap()
}

/// A mixed catalog exercising every lateral rule.
///
/// - `phys-1..3` series tagged `physics`
/// - `chem-1..2` series tagged `physics`, `chemistry`
/// - `alt-a`, `alt-b`, `alt-c` alternate ring tagged `ethics`
/// - `Q` standalone tagged `physics`
/// - `lonely` standalone tagged `poetry`
///
/// # Panics
///
/// Panics if the fixture violates catalog invariants.
pub fn mixed_catalog() -> CatalogIndex {
    CatalogIndex::new(vec![
        ItemBuilder::new("phys-1")
            .series("phys", 1)
            .tags(&["physics"])
            .build(),
        ItemBuilder::new("phys-2")
            .series("phys", 2)
            .tags(&["physics"])
            .build(),
        ItemBuilder::new("phys-3")
            .series("phys", 3)
            .tags(&["physics"])
            .build(),
        ItemBuilder::new("chem-2")
            .series("chem", 2)
            .tags(&["physics", "chemistry"])
            .build(),
        ItemBuilder::new("chem-1")
            .series("chem", 1)
            .tags(&["physics", "chemistry"])
            .build(),
        ItemBuilder::new("alt-a")
            .alternates(&["alt-a", "alt-b", "alt-c"])
            .tags(&["ethics"])
            .build(),
        ItemBuilder::new("alt-b")
            .alternates(&["alt-a", "alt-b", "alt-c"])
            .tags(&["ethics"])
            .build(),
        ItemBuilder::new("alt-c")
            .alternates(&["alt-a", "alt-b", "alt-c"])
            .tags(&["ethics"])
            .build(),
        ItemBuilder::new("Q").tags(&["physics"]).build(),
        ItemBuilder::new("lonely").tags(&["poetry"]).build(),
    ])
    .unwrap()
}
