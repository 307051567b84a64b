//! launchkit - discovery, indexing, and ranking engine for a desktop
//! quick-launcher.
//!
//! The engine scans configured roots for bundle-style launchable
//! resources, builds an immutable searchable [`Catalog`] snapshot, and
//! answers free-text queries by fusing textual relevance with a
//! host-supplied usage signal. Presentation, hotkeys, settings, and the
//! actual launching all live in the host; the engine's surface is:
//!
//! - [`DiscoveryCoordinator::search`] / [`DiscoveryCoordinator::request_rescan`]
//! - [`AssetCache`] for lazily computed per-resource artifacts (icons)
//! - [`ResultProvider`] + [`merge_ranked`] for folding other result
//!   domains into one ranked list under the same scoring contract
//!
//! ```no_run
//! use launchkit::{DiscoveryCoordinator, EngineConfig, FsScanner, NoUsage};
//! use std::sync::Arc;
//!
//! let config = EngineConfig::default();
//! let coordinator = DiscoveryCoordinator::new(Arc::new(FsScanner::new(&config)));
//! coordinator.rescan_blocking();
//! let _refresh = coordinator.start_periodic(config.rescan_interval());
//!
//! for hit in coordinator.search("safari", 5, &NoUsage) {
//!     println!("{} ({:.2})", hit.resource.display_name, hit.score);
//! }
//! ```

pub mod asset_cache;
pub mod catalog;
pub mod config;
pub mod coordinator;
pub mod error;
pub mod logging;
pub mod matcher;
pub mod provider;
pub mod query;
pub mod ranker;
pub mod resource;
pub mod scanner;

#[cfg(test)]
mod engine_tests;

pub use asset_cache::{AssetCache, AssetLoader};
pub use catalog::Catalog;
pub use config::{BundleConvention, EngineConfig, RootDepth, ScanRoot};
pub use coordinator::{DiscoveryCoordinator, RefreshHandle};
pub use error::{EngineError, ResultExt};
pub use provider::{merge_ranked, CatalogProvider, ResultProvider};
pub use ranker::{NoUsage, SearchHit, UsageLookup};
pub use resource::{Resource, ResourceDescriptor};
pub use scanner::{FsScanner, Scan, ScanStats};
