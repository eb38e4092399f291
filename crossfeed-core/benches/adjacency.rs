use std::collections::BTreeSet;

use chrono::{TimeZone, Utc};
use criterion::{Criterion, criterion_group, criterion_main};
use crossfeed_core::catalog::{CatalogIndex, ContentId, ContentItem, SeriesId};
use crossfeed_core::resolve_neighbors;

const TOPICS: [&str; 8] = [
    "physics",
    "chemistry",
    "biology",
    "history",
    "ethics",
    "economics",
    "music",
    "poetry",
];

fn item(id: String, position: usize) -> ContentItem {
    let mut tags = BTreeSet::new();
    tags.insert(TOPICS[position % TOPICS.len()].to_string());
    tags.insert(TOPICS[(position / 7) % TOPICS.len()].to_string());

    ContentItem {
        media_url: format!("https://cdn.example.com/media/{id}.mp4"),
        poster_url: format!("https://cdn.example.com/posters/{id}.jpg"),
        title: id.clone(),
        id: ContentId::new(id),
        description: String::new(),
        series_id: None,
        episode_number: None,
        alternate_version_ids: None,
        tags,
        duration_seconds: 45.0,
        views: 0,
        likes: 0,
        created_at: Utc.timestamp_opt(1_700_000_000, 0).unwrap(),
    }
}

/// 500 series of 8 episodes, 500 alternate rings of 3, 1000 standalone items.
fn synthetic_catalog() -> CatalogIndex {
    let mut items = Vec::new();
    let mut position = 0;

    for series in 0..500 {
        for episode in 1..=8 {
            let mut entry = item(format!("s{series}-e{episode}"), position);
            entry.series_id = Some(SeriesId::new(format!("s{series}")));
            entry.episode_number = Some(episode);
            items.push(entry);
            position += 1;
        }
    }

    for ring in 0..500 {
        let ids: Vec<ContentId> = (0..3)
            .map(|version| ContentId::new(format!("r{ring}-v{version}")))
            .collect();
        for id in &ids {
            let mut entry = item(id.as_str().to_string(), position);
            entry.alternate_version_ids = Some(ids.clone());
            items.push(entry);
            position += 1;
        }
    }

    for standalone in 0..1000 {
        items.push(item(format!("solo-{standalone}"), position));
        position += 1;
    }

    CatalogIndex::new(items).unwrap()
}

fn bench_resolve_neighbors(c: &mut Criterion) {
    let catalog = synthetic_catalog();
    let series_item = catalog.find_by_id(&ContentId::new("s250-e4")).unwrap();
    let ring_item = catalog.find_by_id(&ContentId::new("r250-v1")).unwrap();
    let solo_item = catalog.find_by_id(&ContentId::new("solo-999")).unwrap();

    c.bench_function("resolve_neighbors_series_item", |b| {
        b.iter(|| resolve_neighbors(std::hint::black_box(series_item), &catalog));
    });
    c.bench_function("resolve_neighbors_alternate_ring", |b| {
        b.iter(|| resolve_neighbors(std::hint::black_box(ring_item), &catalog));
    });
    c.bench_function("resolve_neighbors_tag_fallback", |b| {
        b.iter(|| resolve_neighbors(std::hint::black_box(solo_item), &catalog));
    });
}

fn bench_catalog_build(c: &mut Criterion) {
    let catalog = synthetic_catalog();
    let items = catalog.items().to_vec();

    c.bench_function("catalog_index_build", |b| {
        b.iter(|| CatalogIndex::new(std::hint::black_box(items.clone())).unwrap());
    });
}

criterion_group!(benches, bench_resolve_neighbors, bench_catalog_build);
criterion_main!(benches);
