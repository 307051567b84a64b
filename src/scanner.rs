//! Concurrent filesystem discovery.
//!
//! Walks the configured roots, one worker thread per root joined before
//! the results merge, and turns bundle directories into resource
//! descriptors. Failures degrade to fewer results: a missing root is
//! skipped silently, permission errors are logged at debug (expected,
//! not actionable), and a bundle with unusable metadata is dropped.

use crate::config::{BundleConvention, EngineConfig, ScanRoot};
use crate::error::EngineError;
use crate::resource::ResourceDescriptor;
use serde::Deserialize;
use std::fs;
use std::path::Path;
use std::time::{Instant, UNIX_EPOCH};
use tracing::{debug, info, warn};

/// A source of resource descriptors. The filesystem scanner is the real
/// implementation; tests and hosts inject fakes for deterministic
/// catalogs.
pub trait Scan: Send + Sync {
    /// Produce the complete candidate set for one catalog build.
    fn scan(&self) -> Vec<ResourceDescriptor>;
}

/// Counters from one scan pass, for instrumentation.
#[derive(Debug, Clone, Copy, Default)]
pub struct ScanStats {
    pub roots_scanned: usize,
    pub roots_skipped: usize,
    pub bundles_found: usize,
    pub bundles_dropped: usize,
}

/// Manifest schema inside a bundle. Every field is optional; anything
/// missing falls back to the bundle's directory name.
#[derive(Debug, Deserialize)]
struct BundleManifest {
    identifier: Option<String>,
    name: Option<String>,
    #[serde(rename = "displayName")]
    display_name: Option<String>,
    description: Option<String>,
    #[serde(default)]
    categories: Vec<String>,
    #[serde(default)]
    keywords: Vec<String>,
}

/// Depth-limited, denylist-pruned scanner over the configured roots.
pub struct FsScanner {
    roots: Vec<ScanRoot>,
    convention: BundleConvention,
    denylist: Vec<String>,
}

impl FsScanner {
    pub fn new(config: &EngineConfig) -> Self {
        FsScanner {
            roots: config.roots.clone(),
            convention: config.convention.clone(),
            denylist: config.denylist.iter().map(|s| s.to_lowercase()).collect(),
        }
    }

    /// Scan all roots concurrently and merge the results after every
    /// worker finishes, returning the pass counters alongside. Root order
    /// does not affect the final catalog (dedup is by id, last-writer-wins
    /// on the merged set).
    pub fn scan_with_stats(&self) -> (Vec<ResourceDescriptor>, ScanStats) {
        let start = Instant::now();
        let mut stats = ScanStats::default();
        let mut descriptors = Vec::new();

        std::thread::scope(|scope| {
            let workers: Vec<_> = self
                .roots
                .iter()
                .map(|root| scope.spawn(move || self.scan_root(root)))
                .collect();

            // Join barrier: candidates merge only after all roots finish.
            for worker in workers {
                match worker.join() {
                    Ok(Some((found, dropped))) => {
                        stats.roots_scanned += 1;
                        stats.bundles_found += found.len();
                        stats.bundles_dropped += dropped;
                        descriptors.extend(found);
                    }
                    Ok(None) => stats.roots_skipped += 1,
                    Err(_) => {
                        warn!("Scan worker panicked, continuing with remaining roots");
                        stats.roots_skipped += 1;
                    }
                }
            }
        });

        info!(
            roots_scanned = stats.roots_scanned,
            roots_skipped = stats.roots_skipped,
            bundles_found = stats.bundles_found,
            bundles_dropped = stats.bundles_dropped,
            duration_ms = start.elapsed().as_millis() as u64,
            "Scan pass complete"
        );

        (descriptors, stats)
    }

    /// Walk one root. Returns None when the root does not exist
    /// (transient absence, skipped silently).
    fn scan_root(&self, root: &ScanRoot) -> Option<(Vec<ResourceDescriptor>, usize)> {
        let path = root.expanded();
        if !path.exists() {
            let err = EngineError::RootUnavailable {
                path: path.display().to_string(),
            };
            debug!(error = %err, "Skipping root");
            return None;
        }

        let mut found = Vec::new();
        let mut dropped = 0usize;
        self.walk(&path, root.depth.levels(), &mut found, &mut dropped);

        debug!(
            root = %path.display(),
            count = found.len(),
            dropped,
            "Scanned root"
        );
        Some((found, dropped))
    }

    fn walk(
        &self,
        dir: &Path,
        depth: usize,
        found: &mut Vec<ResourceDescriptor>,
        dropped: &mut usize,
    ) {
        let entries = match fs::read_dir(dir) {
            Ok(entries) => entries,
            Err(source) => {
                // Access denial is expected on protected directories.
                let err = EngineError::AccessDenied {
                    path: dir.display().to_string(),
                    source,
                };
                debug!(error = %err, "Cannot read directory, skipping");
                return;
            }
        };

        for entry in entries.flatten() {
            let path = entry.path();
            if !path.is_dir() {
                continue;
            }

            if self.is_bundle(&path) {
                match self.parse_bundle(&path) {
                    Some(descriptor) => found.push(descriptor),
                    None => *dropped += 1,
                }
                continue;
            }

            if depth > 1 && !self.is_denylisted(&path) {
                self.walk(&path, depth - 1, found, dropped);
            }
        }
    }

    fn is_bundle(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|e| e.to_str())
            .map(|e| e.eq_ignore_ascii_case(&self.convention.extension))
            .unwrap_or(false)
    }

    fn is_denylisted(&self, path: &Path) -> bool {
        let name = match path.file_name().and_then(|n| n.to_str()) {
            Some(name) => name.to_lowercase(),
            None => return true,
        };
        self.denylist.iter().any(|deny| name.contains(deny))
    }

    /// Extract a descriptor from a bundle directory. The manifest is
    /// optional; a bundle without one still yields a descriptor named
    /// after the directory. Returns None only when not even a directory
    /// name is usable (malformed resource, dropped).
    fn parse_bundle(&self, path: &Path) -> Option<ResourceDescriptor> {
        let stem = match path
            .file_stem()
            .and_then(|s| s.to_str())
            .filter(|s| !s.is_empty())
        {
            Some(stem) => stem.to_string(),
            None => {
                let err = EngineError::MalformedBundle {
                    path: path.display().to_string(),
                    reason: "unusable directory name".to_string(),
                };
                debug!(error = %err, "Dropping bundle");
                return None;
            }
        };

        let last_modified = modified_unix_secs(path);

        let manifest_path = path.join(&self.convention.manifest);
        let manifest = match fs::read(&manifest_path) {
            Ok(bytes) => match serde_json::from_slice::<BundleManifest>(&bytes)
                .map_err(EngineError::ManifestParse)
            {
                Ok(manifest) => Some(manifest),
                Err(err) => {
                    debug!(
                        bundle = %path.display(),
                        error = %err,
                        "Unreadable manifest, falling back to directory name"
                    );
                    None
                }
            },
            Err(_) => None,
        };

        let Some(manifest) = manifest else {
            return Some(ResourceDescriptor::from_location(
                &stem,
                path.to_path_buf(),
                last_modified,
            ));
        };

        let name = manifest.name.filter(|n| !n.trim().is_empty()).unwrap_or_else(|| stem.clone());
        let display_name = manifest
            .display_name
            .filter(|n| !n.trim().is_empty())
            .unwrap_or_else(|| name.clone());
        let id = manifest
            .identifier
            .filter(|i| !i.trim().is_empty())
            .unwrap_or_else(|| path.to_string_lossy().to_string());

        Some(ResourceDescriptor {
            id,
            name,
            display_name,
            location: path.to_path_buf(),
            last_modified,
            description: manifest.description.filter(|d| !d.trim().is_empty()),
            categories: manifest.categories,
            keywords: manifest.keywords,
        })
    }
}

impl Scan for FsScanner {
    fn scan(&self) -> Vec<ResourceDescriptor> {
        self.scan_with_stats().0
    }
}

/// Modification time as unix seconds, 0 when unavailable.
fn modified_unix_secs(path: &Path) -> i64 {
    path.metadata()
        .ok()
        .and_then(|m| m.modified().ok())
        .and_then(|t| t.duration_since(UNIX_EPOCH).ok())
        .map(|d| d.as_secs() as i64)
        .unwrap_or(0)
}
