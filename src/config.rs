//! Engine configuration.
//!
//! Hosts usually start from [`EngineConfig::default()`] and override the
//! roots; everything deserializes from JSON so hosts with a settings file
//! can feed it straight through.

use crate::error::ResultExt;
use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Default rescan interval in seconds.
pub const DEFAULT_RESCAN_INTERVAL_SECS: u64 = 300;

/// Directory-name substrings that are pruned before recursing.
pub const DEFAULT_DENYLIST: &[&str] = &[
    ".git", ".svn", ".hg", "trash", "cache", "log", "logs", "tmp", "temp",
];

/// How deep a root's traversal may recurse.
///
/// Shallow roots hold bundles directly; typical roots allow one level of
/// vendor subdirectories; nested roots are known to bury bundles deeper.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RootDepth {
    Shallow,
    Typical,
    Nested,
}

impl RootDepth {
    pub fn levels(self) -> usize {
        match self {
            RootDepth::Shallow => 1,
            RootDepth::Typical => 2,
            RootDepth::Nested => 3,
        }
    }
}

/// One location to scan for bundles.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanRoot {
    /// May contain `~`, expanded at scan time.
    pub path: String,
    #[serde(default = "default_depth")]
    pub depth: RootDepth,
}

fn default_depth() -> RootDepth {
    RootDepth::Typical
}

impl ScanRoot {
    pub fn new(path: impl Into<String>, depth: RootDepth) -> Self {
        ScanRoot {
            path: path.into(),
            depth,
        }
    }

    /// Tilde-expanded filesystem path.
    pub fn expanded(&self) -> PathBuf {
        PathBuf::from(shellexpand::tilde(&self.path).as_ref())
    }
}

/// What makes a directory entry a discoverable unit, and where its
/// metadata lives inside it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BundleConvention {
    /// Distinguished extension marking a bundle directory (without dot).
    #[serde(default = "default_extension")]
    pub extension: String,
    /// Manifest location relative to the bundle directory.
    #[serde(default = "default_manifest")]
    pub manifest: PathBuf,
}

fn default_extension() -> String {
    "app".to_string()
}

fn default_manifest() -> PathBuf {
    PathBuf::from("manifest.json")
}

impl Default for BundleConvention {
    fn default() -> Self {
        BundleConvention {
            extension: default_extension(),
            manifest: default_manifest(),
        }
    }
}

/// Full engine configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    #[serde(default = "default_roots")]
    pub roots: Vec<ScanRoot>,
    #[serde(default)]
    pub convention: BundleConvention,
    /// Directory-name substrings pruned before recursing.
    #[serde(default = "default_denylist")]
    pub denylist: Vec<String>,
    /// Seconds between automatic rescans.
    #[serde(default = "default_rescan_interval", rename = "rescanIntervalSecs")]
    pub rescan_interval_secs: u64,
}

fn default_roots() -> Vec<ScanRoot> {
    vec![
        ScanRoot::new("/Applications", RootDepth::Typical),
        ScanRoot::new("/Applications/Utilities", RootDepth::Shallow),
        ScanRoot::new("/System/Applications", RootDepth::Typical),
        ScanRoot::new("~/Applications", RootDepth::Nested),
    ]
}

fn default_denylist() -> Vec<String> {
    DEFAULT_DENYLIST.iter().map(|s| s.to_string()).collect()
}

fn default_rescan_interval() -> u64 {
    DEFAULT_RESCAN_INTERVAL_SECS
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            roots: default_roots(),
            convention: BundleConvention::default(),
            denylist: default_denylist(),
            rescan_interval_secs: default_rescan_interval(),
        }
    }
}

impl EngineConfig {
    pub fn rescan_interval(&self) -> Duration {
        Duration::from_secs(self.rescan_interval_secs)
    }

    /// Load configuration from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let bytes = fs::read(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        serde_json::from_slice(&bytes)
            .with_context(|| format!("failed to parse config file {}", path.display()))
    }

    /// Load from `path`, falling back to defaults when the file is absent
    /// or unreadable. An unreadable file is logged, never fatal.
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        if !path.exists() {
            return Self::default();
        }
        Self::load(path).warn_on_err().unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_fill_missing_fields() {
        let config: EngineConfig = serde_json::from_str("{}").unwrap();
        assert!(!config.roots.is_empty());
        assert_eq!(config.convention.extension, "app");
        assert_eq!(config.rescan_interval_secs, DEFAULT_RESCAN_INTERVAL_SECS);
    }

    #[test]
    fn roots_deserialize_with_depth() {
        let json = r#"{"roots": [{"path": "/opt/bundles", "depth": "nested"}]}"#;
        let config: EngineConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.roots.len(), 1);
        assert_eq!(config.roots[0].depth, RootDepth::Nested);
        assert_eq!(config.roots[0].depth.levels(), 3);
    }

    #[test]
    fn tilde_expansion() {
        let root = ScanRoot::new("~/Applications", RootDepth::Shallow);
        let expanded = root.expanded();
        assert!(!expanded.to_string_lossy().starts_with('~'));
    }

    #[test]
    fn depth_levels() {
        assert_eq!(RootDepth::Shallow.levels(), 1);
        assert_eq!(RootDepth::Typical.levels(), 2);
        assert_eq!(RootDepth::Nested.levels(), 3);
    }

    #[test]
    fn load_reads_config_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("engine.json");
        fs::write(
            &path,
            r#"{"roots": [{"path": "/opt/bundles"}], "rescanIntervalSecs": 60}"#,
        )
        .unwrap();

        let config = EngineConfig::load(&path).unwrap();
        assert_eq!(config.roots.len(), 1);
        assert_eq!(config.roots[0].path, "/opt/bundles");
        assert_eq!(config.rescan_interval(), Duration::from_secs(60));
    }

    #[test]
    fn load_or_default_falls_back_on_missing_file() {
        let config = EngineConfig::load_or_default("/nope/missing/engine.json");
        assert_eq!(config.rescan_interval_secs, DEFAULT_RESCAN_INTERVAL_SECS);
    }

    #[test]
    fn load_or_default_falls_back_on_corrupt_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("engine.json");
        fs::write(&path, "{not json").unwrap();
        let config = EngineConfig::load_or_default(&path);
        assert!(!config.roots.is_empty());
    }
}
