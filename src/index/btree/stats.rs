//! B-tree statistics tracking.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use super::node::Restructure;

/// Statistics tracked by a B-tree.
///
/// Counters are atomic so that lookups, which only borrow the tree
/// immutably, can still record hits and misses. Structural counters are
/// folded in by the tree once per insert or remove, from the changes the
/// nodes report back.
///
/// # Memory Ordering
/// All operations use `Ordering::Relaxed`: counters are independent and
/// only need atomicity, not ordering against each other.
///
/// # Example
/// ```
/// use mwtree::TreeStats;
/// use std::sync::atomic::Ordering;
///
/// let stats = TreeStats::new();
/// stats.lookup_hits.fetch_add(1, Ordering::Relaxed);
/// assert_eq!(stats.lookup_hits.load(Ordering::Relaxed), 1);
/// ```
#[derive(Debug)]
pub struct TreeStats {
    /// Number of node splits, including root splits.
    pub splits: AtomicU64,

    /// Number of sibling merges, including those that emptied the root.
    pub merges: AtomicU64,

    /// Number of entry rotations between siblings.
    pub borrows: AtomicU64,

    /// Number of times the root split and the tree grew by one level.
    pub root_splits: AtomicU64,

    /// Number of times an empty internal root was replaced by its child.
    pub root_collapses: AtomicU64,

    /// Number of lookups that found their key.
    pub lookup_hits: AtomicU64,

    /// Number of lookups that did not find their key.
    pub lookup_misses: AtomicU64,
}

impl TreeStats {
    /// Create a new stats tracker with all counters at zero.
    pub fn new() -> Self {
        Self {
            splits: AtomicU64::new(0),
            merges: AtomicU64::new(0),
            borrows: AtomicU64::new(0),
            root_splits: AtomicU64::new(0),
            root_collapses: AtomicU64::new(0),
            lookup_hits: AtomicU64::new(0),
            lookup_misses: AtomicU64::new(0),
        }
    }

    /// Fold the structural changes of one operation into the counters.
    #[inline]
    pub(super) fn record_restructure(&self, changes: &Restructure) {
        self.splits.fetch_add(changes.splits, Ordering::Relaxed);
        self.merges.fetch_add(changes.merges, Ordering::Relaxed);
        self.borrows.fetch_add(changes.borrows, Ordering::Relaxed);
    }

    #[inline]
    pub(crate) fn record_root_split(&self) {
        self.root_splits.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub(crate) fn record_root_collapse(&self) {
        self.root_collapses.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub(crate) fn record_lookup(&self, hit: bool) {
        if hit {
            self.lookup_hits.fetch_add(1, Ordering::Relaxed);
        } else {
            self.lookup_misses.fetch_add(1, Ordering::Relaxed);
        }
    }

    /// Calculate lookup hit rate (0.0 to 1.0).
    pub fn hit_rate(&self) -> f64 {
        self.snapshot().hit_rate()
    }

    /// Get a snapshot of current statistics.
    ///
    /// This returns a non-atomic copy for display/logging.
    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            splits: self.splits.load(Ordering::Relaxed),
            merges: self.merges.load(Ordering::Relaxed),
            borrows: self.borrows.load(Ordering::Relaxed),
            root_splits: self.root_splits.load(Ordering::Relaxed),
            root_collapses: self.root_collapses.load(Ordering::Relaxed),
            lookup_hits: self.lookup_hits.load(Ordering::Relaxed),
            lookup_misses: self.lookup_misses.load(Ordering::Relaxed),
        }
    }

    /// Reset all counters to zero.
    pub fn reset(&self) {
        self.splits.store(0, Ordering::Relaxed);
        self.merges.store(0, Ordering::Relaxed);
        self.borrows.store(0, Ordering::Relaxed);
        self.root_splits.store(0, Ordering::Relaxed);
        self.root_collapses.store(0, Ordering::Relaxed);
        self.lookup_hits.store(0, Ordering::Relaxed);
        self.lookup_misses.store(0, Ordering::Relaxed);
    }
}

impl Default for TreeStats {
    fn default() -> Self {
        Self::new()
    }
}

/// A point-in-time snapshot of B-tree statistics.
///
/// Unlike `TreeStats`, this is a plain `Copy` value that can be compared
/// and printed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatsSnapshot {
    pub splits: u64,
    pub merges: u64,
    pub borrows: u64,
    pub root_splits: u64,
    pub root_collapses: u64,
    pub lookup_hits: u64,
    pub lookup_misses: u64,
}

impl StatsSnapshot {
    /// Calculate lookup hit rate (0.0 to 1.0).
    pub fn hit_rate(&self) -> f64 {
        let total = self.lookup_hits + self.lookup_misses;
        if total == 0 {
            0.0
        } else {
            self.lookup_hits as f64 / total as f64
        }
    }
}

impl fmt::Display for StatsSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Stats {{ splits: {}, merges: {}, borrows: {}, height: +{}/-{}, hit_rate: {:.2}% }}",
            self.splits,
            self.merges,
            self.borrows,
            self.root_splits,
            self.root_collapses,
            self.hit_rate() * 100.0
        )
    }
}
