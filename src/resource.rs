//! Resource values produced by discovery.
//!
//! A [`ResourceDescriptor`] is the raw output of one scan pass; the
//! catalog builder derives keywords from it and freezes it into a
//! [`Resource`]. Resources are immutable once built and replaced
//! wholesale on the next rescan. Icons are never part of the value;
//! they live in the asset cache side table keyed by id.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// A discoverable, launchable entity held in a catalog snapshot.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Resource {
    /// Stable unique identifier, e.g. a reverse-domain bundle identifier.
    /// Unique within one catalog.
    pub id: String,
    /// Short name, typically the bundle's directory stem (e.g. "Safari").
    pub name: String,
    /// Human-readable label for presentation; falls back to `name`.
    pub display_name: String,
    /// Filesystem path needed to launch/open the resource.
    pub location: PathBuf,
    /// Unix timestamp (seconds) of last modification. Informational only.
    pub last_modified: i64,
    /// Optional free text; a low-weight search signal.
    pub description: Option<String>,
    /// Deduplicated, lowercase searchable terms. Never contains empty strings.
    pub keywords: Vec<String>,
}

/// Raw per-bundle metadata extracted by the scanner, before keyword
/// derivation. One descriptor per discovered unit; malformed units are
/// dropped by the scanner and never reach the builder.
#[derive(Debug, Clone, PartialEq)]
pub struct ResourceDescriptor {
    pub id: String,
    pub name: String,
    pub display_name: String,
    pub location: PathBuf,
    pub last_modified: i64,
    pub description: Option<String>,
    /// Category metadata from the manifest (e.g. "developer-tools"),
    /// expanded into keywords at build time.
    pub categories: Vec<String>,
    /// Explicit keywords from the manifest, merged with derived ones.
    pub keywords: Vec<String>,
}

impl ResourceDescriptor {
    /// Minimal descriptor for a bundle with no readable manifest:
    /// everything falls back to the directory name and path.
    pub fn from_location(name: &str, location: PathBuf, last_modified: i64) -> Self {
        ResourceDescriptor {
            id: location.to_string_lossy().to_string(),
            name: name.to_string(),
            display_name: name.to_string(),
            location,
            last_modified,
            description: None,
            categories: Vec::new(),
            keywords: Vec::new(),
        }
    }
}
