//! Discovery coordination: snapshot ownership, rescan serialization, and
//! periodic refresh.
//!
//! The coordinator is the only writer of the catalog reference. Searches
//! clone the current `Arc<Catalog>` and never block on a scan in
//! progress; a finished scan swaps the reference atomically and readers
//! holding the old snapshot are unaffected. Rescan requests while a scan
//! is in flight are coalesced (ignored), never queued.

use crate::catalog::Catalog;
use crate::query;
use crate::ranker::{SearchHit, UsageLookup};
use crate::scanner::Scan;
use parking_lot::RwLock;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

struct Inner {
    scanner: Arc<dyn Scan>,
    catalog: RwLock<Arc<Catalog>>,
    scanning: AtomicBool,
}

/// Clears the scanning flag when dropped, including during unwind: a
/// panicking `Scan` implementation must never wedge future rescans.
struct ScanFlagGuard<'a>(&'a AtomicBool);

impl Drop for ScanFlagGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

impl Inner {
    /// Run one full scan-build-swap pass. Assumes the caller already
    /// holds the `scanning` flag.
    fn run_scan(&self) {
        let start = Instant::now();
        let descriptors = self.scanner.scan();

        let previous = Arc::clone(&self.catalog.read());
        if descriptors.is_empty() && !previous.is_empty() {
            // Degrade to stale-but-valid data rather than an empty catalog.
            warn!(
                previous = previous.len(),
                "Scan produced nothing, keeping previous snapshot"
            );
            return;
        }

        let next = Arc::new(Catalog::build(descriptors));
        let count = next.len();
        *self.catalog.write() = next;

        info!(
            resources = count,
            duration_ms = start.elapsed().as_millis() as u64,
            "Catalog snapshot swapped"
        );
    }
}

/// Owns the catalog snapshot and serializes rescans.
///
/// Construct one per engine and hand clones (cheap, shared state) to
/// consumers; there is deliberately no global instance.
#[derive(Clone)]
pub struct DiscoveryCoordinator {
    inner: Arc<Inner>,
}

impl DiscoveryCoordinator {
    /// Create a coordinator serving an empty catalog until the first scan.
    pub fn new(scanner: Arc<dyn Scan>) -> Self {
        DiscoveryCoordinator {
            inner: Arc::new(Inner {
                scanner,
                catalog: RwLock::new(Arc::new(Catalog::empty())),
                scanning: AtomicBool::new(false),
            }),
        }
    }

    /// The current snapshot. Callers keep it valid for as long as they
    /// hold it, even across swaps.
    pub fn catalog(&self) -> Arc<Catalog> {
        Arc::clone(&self.inner.catalog.read())
    }

    /// Fire-and-forget rescan on a background thread. Returns whether the
    /// request was accepted; `false` means a scan was already in flight
    /// and this request coalesced into it.
    pub fn request_rescan(&self) -> bool {
        if self.inner.scanning.swap(true, Ordering::SeqCst) {
            debug!("Rescan already in flight, coalescing request");
            return false;
        }

        let inner = Arc::clone(&self.inner);
        std::thread::spawn(move || {
            let _guard = ScanFlagGuard(&inner.scanning);
            inner.run_scan();
        });
        true
    }

    /// Scan synchronously on the calling thread. Same coalescing rule as
    /// [`Self::request_rescan`]; intended for startup and tests.
    pub fn rescan_blocking(&self) -> bool {
        if self.inner.scanning.swap(true, Ordering::SeqCst) {
            debug!("Rescan already in flight, coalescing request");
            return false;
        }
        let _guard = ScanFlagGuard(&self.inner.scanning);
        self.inner.run_scan();
        true
    }

    /// Whether a scan is currently in flight.
    pub fn is_scanning(&self) -> bool {
        self.inner.scanning.load(Ordering::SeqCst)
    }

    /// Search the current snapshot. Never blocks on a scan in progress.
    pub fn search(&self, query: &str, limit: usize, usage: &dyn UsageLookup) -> Vec<SearchHit> {
        query::search(&self.catalog(), usage, query, limit)
    }

    /// Start a periodic refresh thread requesting a rescan every
    /// `interval`. The returned handle stops the thread when dropped.
    pub fn start_periodic(&self, interval: Duration) -> RefreshHandle {
        let coordinator = self.clone();
        let running = Arc::new(AtomicBool::new(true));
        let flag = Arc::clone(&running);

        let handle = std::thread::spawn(move || {
            const TICK: Duration = Duration::from_millis(250);
            let mut last_scan = Instant::now();
            info!(interval_secs = interval.as_secs(), "Periodic refresh started");

            while flag.load(Ordering::SeqCst) {
                if last_scan.elapsed() >= interval {
                    coordinator.request_rescan();
                    last_scan = Instant::now();
                }
                std::thread::sleep(TICK.min(interval));
            }
            debug!("Periodic refresh stopped");
        });

        RefreshHandle {
            running,
            handle: Some(handle),
        }
    }
}

/// Lifecycle handle for the periodic refresh thread.
pub struct RefreshHandle {
    running: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
}

impl RefreshHandle {
    /// Signal the refresh thread to stop and wait for it to exit.
    pub fn stop(mut self) {
        self.shutdown();
    }

    fn shutdown(&mut self) {
        self.running.store(false, Ordering::SeqCst);
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

impl Drop for RefreshHandle {
    fn drop(&mut self) {
        self.shutdown();
    }
}
