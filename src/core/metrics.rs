//! Logger metrics for observability
//!
//! Counters for events written, events dropped by failing sinks, and stack
//! walks performed to resolve callers.

use std::sync::atomic::{AtomicU64, Ordering};

/// Metrics for logger observability
///
/// # Example
///
/// ```
/// use compact_logger::LoggerMetrics;
///
/// let metrics = LoggerMetrics::new();
///
/// metrics.record_dropped();
/// metrics.record_logged();
///
/// assert_eq!(metrics.dropped_count(), 1);
/// assert_eq!(metrics.total_logged(), 1);
/// ```
#[derive(Debug)]
pub struct LoggerMetrics {
    /// Events at least one sink failed to write
    dropped_count: AtomicU64,

    /// Events every sink wrote
    total_logged: AtomicU64,

    /// Stack walks performed to resolve a caller
    caller_lookups: AtomicU64,
}

impl LoggerMetrics {
    /// Create a new metrics instance with all counters at zero
    pub const fn new() -> Self {
        Self {
            dropped_count: AtomicU64::new(0),
            total_logged: AtomicU64::new(0),
            caller_lookups: AtomicU64::new(0),
        }
    }

    #[inline]
    pub fn dropped_count(&self) -> u64 {
        self.dropped_count.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn total_logged(&self) -> u64 {
        self.total_logged.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn caller_lookups(&self) -> u64 {
        self.caller_lookups.load(Ordering::Relaxed)
    }

    /// Record a dropped event, returning the previous count
    #[inline]
    pub fn record_dropped(&self) -> u64 {
        self.dropped_count.fetch_add(1, Ordering::Relaxed)
    }

    #[inline]
    pub fn record_logged(&self) -> u64 {
        self.total_logged.fetch_add(1, Ordering::Relaxed)
    }

    #[inline]
    pub fn record_caller_lookup(&self) -> u64 {
        self.caller_lookups.fetch_add(1, Ordering::Relaxed)
    }

    /// Get drop rate as a percentage (0.0 - 100.0)
    ///
    /// Returns 0.0 if no events have been processed.
    pub fn drop_rate(&self) -> f64 {
        let dropped = self.dropped_count() as f64;
        let total = self.total_logged() as f64 + dropped;
        if total == 0.0 {
            0.0
        } else {
            (dropped / total) * 100.0
        }
    }

    pub fn reset(&self) {
        self.dropped_count.store(0, Ordering::Relaxed);
        self.total_logged.store(0, Ordering::Relaxed);
        self.caller_lookups.store(0, Ordering::Relaxed);
    }
}

impl Default for LoggerMetrics {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for LoggerMetrics {
    /// Create a snapshot of the current metrics values
    fn clone(&self) -> Self {
        Self {
            dropped_count: AtomicU64::new(self.dropped_count()),
            total_logged: AtomicU64::new(self.total_logged()),
            caller_lookups: AtomicU64::new(self.caller_lookups()),
        }
    }
}
