//! # Edge Timestamps
//!
//! The last rising edge, the rising edge before it and the last falling
//! edge, in extended ticks. Written only by the capture handler.

use edgestamp_hal::Edge;
use portable_atomic::{AtomicU64, Ordering};

/// Edge timestamps sampled together
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct EdgeSnapshot {
    /// Most recent rising edge
    pub rising: u64,
    /// Rising edge before [`EdgeSnapshot::rising`]
    pub previous_rising: u64,
    /// Most recent falling edge
    pub falling: u64,
}

/// Shared edge timestamp store
#[derive(Debug)]
pub struct EdgeTimestamps {
    rising: AtomicU64,
    previous_rising: AtomicU64,
    falling: AtomicU64,
}

impl EdgeTimestamps {
    /// Create an empty store
    pub const fn new() -> Self {
        Self {
            rising: AtomicU64::new(0),
            previous_rising: AtomicU64::new(0),
            falling: AtomicU64::new(0),
        }
    }

    /// Record a captured edge
    ///
    /// A rising edge shifts the current rising timestamp into the previous
    /// slot before storing the new one.
    #[inline]
    pub fn record(&self, edge: Edge, timestamp: u64) {
        match edge {
            Edge::Rising => {
                let last = self.rising.load(Ordering::Relaxed);
                self.previous_rising.store(last, Ordering::Relaxed);
                self.rising.store(timestamp, Ordering::Relaxed);
            },
            Edge::Falling => self.falling.store(timestamp, Ordering::Relaxed),
        }
    }

    /// Read all three timestamps
    ///
    /// Consistent only when the capture handler cannot run in between.
    pub fn snapshot(&self) -> EdgeSnapshot {
        EdgeSnapshot {
            rising: self.rising.load(Ordering::Relaxed),
            previous_rising: self.previous_rising.load(Ordering::Relaxed),
            falling: self.falling.load(Ordering::Relaxed),
        }
    }

    /// Zero all timestamps
    pub fn reset(&self) {
        self.rising.store(0, Ordering::Relaxed);
        self.previous_rising.store(0, Ordering::Relaxed);
        self.falling.store(0, Ordering::Relaxed);
    }
}

impl Default for EdgeTimestamps {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rising_shifts_previous() {
        let edges = EdgeTimestamps::new();
        edges.record(Edge::Rising, 1000);
        edges.record(Edge::Falling, 1300);
        edges.record(Edge::Rising, 2000);
        assert_eq!(
            edges.snapshot(),
            EdgeSnapshot {
                rising: 2000,
                previous_rising: 1000,
                falling: 1300,
            }
        );
    }

    #[test]
    fn test_falling_leaves_rising_untouched() {
        let edges = EdgeTimestamps::new();
        edges.record(Edge::Rising, 10);
        edges.record(Edge::Falling, 20);
        edges.record(Edge::Falling, 30);
        let snapshot = edges.snapshot();
        assert_eq!(snapshot.rising, 10);
        assert_eq!(snapshot.previous_rising, 0);
        assert_eq!(snapshot.falling, 30);
    }

    #[test]
    fn test_reset() {
        let edges = EdgeTimestamps::new();
        edges.record(Edge::Rising, 10);
        edges.record(Edge::Rising, 20);
        edges.reset();
        assert_eq!(edges.snapshot(), EdgeSnapshot::default());
    }
}
