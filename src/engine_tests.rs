//! End-to-end tests over the whole pipeline: filesystem scan, catalog
//! build, snapshot swap, search, ranking, and the asset cache.

use crate::asset_cache::AssetCache;
use crate::config::{EngineConfig, RootDepth, ScanRoot};
use crate::coordinator::DiscoveryCoordinator;
use crate::provider::{merge_ranked, CatalogProvider, ResultProvider};
use crate::ranker::NoUsage;
use crate::scanner::FsScanner;
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::sync::Arc;
use tempfile::TempDir;

fn write_bundle(root: &Path, name: &str, manifest: &str) {
    let bundle = root.join(format!("{name}.app"));
    fs::create_dir_all(&bundle).unwrap();
    fs::write(bundle.join("manifest.json"), manifest).unwrap();
}

/// A root resembling a small /Applications: Safari, Terminal, Notes.
fn seeded_root() -> TempDir {
    let dir = TempDir::new().unwrap();
    write_bundle(
        dir.path(),
        "Safari",
        r#"{"identifier": "com.apple.safari", "name": "Safari",
            "description": "Browse the web", "categories": ["public.app-category.browsers"]}"#,
    );
    write_bundle(
        dir.path(),
        "Terminal",
        r#"{"identifier": "com.apple.terminal", "name": "Terminal",
            "categories": ["public.app-category.utilities"]}"#,
    );
    write_bundle(
        dir.path(),
        "Notes",
        r#"{"identifier": "com.apple.notes", "name": "Notes",
            "description": "Capture quick thoughts"}"#,
    );
    dir
}

fn coordinator_for(dir: &TempDir) -> DiscoveryCoordinator {
    let mut config = EngineConfig::default();
    config.roots = vec![ScanRoot::new(
        dir.path().to_string_lossy().to_string(),
        RootDepth::Shallow,
    )];
    let coordinator = DiscoveryCoordinator::new(Arc::new(FsScanner::new(&config)));
    coordinator.rescan_blocking();
    coordinator
}

#[test]
fn scenario_prefix_queries_find_their_apps() {
    let dir = seeded_root();
    let coordinator = coordinator_for(&dir);
    assert_eq!(coordinator.catalog().len(), 3);

    let hits = coordinator.search("safa", 5, &NoUsage);
    assert_eq!(hits[0].resource.display_name, "Safari");

    let hits = coordinator.search("term", 5, &NoUsage);
    assert_eq!(hits[0].resource.display_name, "Terminal");

    assert!(coordinator.search("zzz-nonexistent", 5, &NoUsage).is_empty());
    assert!(coordinator.search("", 5, &NoUsage).is_empty());
}

#[test]
fn scenario_usage_orders_equal_matches() {
    let dir = TempDir::new().unwrap();
    write_bundle(
        dir.path(),
        "Notes Classic",
        r#"{"identifier": "com.a.notes", "name": "Notes Classic"}"#,
    );
    write_bundle(
        dir.path(),
        "Notes Modern",
        r#"{"identifier": "com.b.notes", "name": "Notes Modern"}"#,
    );
    let coordinator = coordinator_for(&dir);

    let mut usage = HashMap::new();
    usage.insert("com.b.notes".to_string(), 100.0);

    let hits = coordinator.search("notes", 5, &usage);
    assert_eq!(hits.len(), 2);
    assert_eq!(hits[0].resource.id, "com.b.notes");
    assert_eq!(hits[1].resource.id, "com.a.notes");
}

#[test]
fn category_keywords_are_searchable() {
    let dir = seeded_root();
    let coordinator = coordinator_for(&dir);

    // "browser" comes from the browsers category expansion, not the name
    let hits = coordinator.search("browser", 5, &NoUsage);
    assert!(!hits.is_empty());
    assert_eq!(hits[0].resource.id, "com.apple.safari");
}

#[test]
fn rescan_of_unchanged_tree_yields_equivalent_catalog() {
    let dir = seeded_root();
    let coordinator = coordinator_for(&dir);
    let before = coordinator.catalog();

    coordinator.rescan_blocking();
    let after = coordinator.catalog();

    let mut ids_before: Vec<_> = before.ids().map(String::from).collect();
    let mut ids_after: Vec<_> = after.ids().map(String::from).collect();
    ids_before.sort();
    ids_after.sort();
    assert_eq!(ids_before, ids_after);

    let index_before: Vec<_> = before
        .terms()
        .map(|(t, ids)| (t.to_string(), ids.clone()))
        .collect();
    let index_after: Vec<_> = after
        .terms()
        .map(|(t, ids)| (t.to_string(), ids.clone()))
        .collect();
    assert_eq!(index_before, index_after);
}

#[test]
fn rescan_picks_up_new_bundles_and_old_snapshot_stays_valid() {
    let dir = seeded_root();
    let coordinator = coordinator_for(&dir);
    let old_snapshot = coordinator.catalog();

    write_bundle(
        dir.path(),
        "Mail",
        r#"{"identifier": "com.apple.mail", "name": "Mail"}"#,
    );
    coordinator.rescan_blocking();

    assert_eq!(coordinator.catalog().len(), 4);
    // The reader holding the pre-rescan snapshot still sees 3 resources.
    assert_eq!(old_snapshot.len(), 3);
    assert!(old_snapshot.get("com.apple.mail").is_none());
}

#[test]
fn asset_cache_follows_the_catalog_but_not_its_rebuilds() {
    let dir = seeded_root();
    let coordinator = coordinator_for(&dir);

    let cache: Arc<AssetCache<Vec<u8>>> = Arc::new(AssetCache::new(Box::new(|id: &str| {
        Some(id.as_bytes().to_vec())
    })));

    for id in ["com.apple.safari", "com.apple.notes", "com.gone.away"] {
        cache.get(id).unwrap();
    }
    assert_eq!(cache.len(), 3);

    // Rebuild does not touch the cache; eviction is opportunistic.
    coordinator.rescan_blocking();
    assert_eq!(cache.len(), 3);

    let catalog = coordinator.catalog();
    cache.retain(|id| catalog.contains(id));
    assert_eq!(cache.len(), 2);
    assert!(cache.peek("com.gone.away").is_none());
}

#[test]
fn catalog_provider_merges_with_other_domains() {
    let dir = seeded_root();
    let coordinator = coordinator_for(&dir);
    let apps = CatalogProvider::new(coordinator, Arc::new(NoUsage));

    let hits = apps.produce_scored_results("notes", 5);
    assert_eq!(hits.len(), 1);

    let merged = merge_ranked(&[&apps], "notes", 5);
    assert_eq!(merged.len(), 1);
    assert_eq!(merged[0].resource.id, "com.apple.notes");
}
