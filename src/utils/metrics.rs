//! Observability and Metrics
//!
//! Process-wide counters for codec activity. The frame codec updates them on
//! every encode/decode; hosts read them through [`Metrics::snapshot`] or log
//! them periodically with [`Metrics::log_metrics`].
//!
//! Uses atomic counters for thread-safe metrics collection.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;
use tracing::info;

/// Global metrics collector for codec operations
#[derive(Debug)]
pub struct Metrics {
    /// Frames written
    pub frames_encoded: AtomicU64,
    /// Frames parsed
    pub frames_decoded: AtomicU64,
    /// Bytes written, length prefixes included
    pub bytes_encoded: AtomicU64,
    /// Bytes consumed by successful decodes
    pub bytes_decoded: AtomicU64,
    /// Decode attempts that stopped at an incomplete frame
    pub incomplete_reads: AtomicU64,
    /// Fatal encode/decode failures
    pub protocol_errors: AtomicU64,
    /// Start time for uptime calculation
    start_time: Instant,
}

impl Metrics {
    /// Create a new metrics collector
    pub fn new() -> Self {
        Self {
            frames_encoded: AtomicU64::new(0),
            frames_decoded: AtomicU64::new(0),
            bytes_encoded: AtomicU64::new(0),
            bytes_decoded: AtomicU64::new(0),
            incomplete_reads: AtomicU64::new(0),
            protocol_errors: AtomicU64::new(0),
            start_time: Instant::now(),
        }
    }

    /// Record an encoded frame
    pub fn frame_encoded(&self, byte_count: u64) {
        self.frames_encoded.fetch_add(1, Ordering::Relaxed);
        self.bytes_encoded.fetch_add(byte_count, Ordering::Relaxed);
    }

    /// Record a decoded frame
    pub fn frame_decoded(&self, byte_count: u64) {
        self.frames_decoded.fetch_add(1, Ordering::Relaxed);
        self.bytes_decoded.fetch_add(byte_count, Ordering::Relaxed);
    }

    /// Record a decode attempt on an incomplete frame
    pub fn incomplete_read(&self) {
        self.incomplete_reads.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a protocol error
    pub fn protocol_error(&self) {
        self.protocol_errors.fetch_add(1, Ordering::Relaxed);
    }

    /// Get current metrics snapshot
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            frames_encoded: self.frames_encoded.load(Ordering::Relaxed),
            frames_decoded: self.frames_decoded.load(Ordering::Relaxed),
            bytes_encoded: self.bytes_encoded.load(Ordering::Relaxed),
            bytes_decoded: self.bytes_decoded.load(Ordering::Relaxed),
            incomplete_reads: self.incomplete_reads.load(Ordering::Relaxed),
            protocol_errors: self.protocol_errors.load(Ordering::Relaxed),
            uptime_seconds: self.start_time.elapsed().as_secs(),
        }
    }

    /// Log current metrics
    pub fn log_metrics(&self) {
        let snapshot = self.snapshot();
        info!(
            frames_encoded = snapshot.frames_encoded,
            frames_decoded = snapshot.frames_decoded,
            bytes_encoded = snapshot.bytes_encoded,
            bytes_decoded = snapshot.bytes_decoded,
            incomplete_reads = snapshot.incomplete_reads,
            protocol_errors = snapshot.protocol_errors,
            uptime_seconds = snapshot.uptime_seconds,
            "Codec metrics snapshot"
        );
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

/// Snapshot of metrics at a point in time
#[derive(Debug, Clone)]
pub struct MetricsSnapshot {
    pub frames_encoded: u64,
    pub frames_decoded: u64,
    pub bytes_encoded: u64,
    pub bytes_decoded: u64,
    pub incomplete_reads: u64,
    pub protocol_errors: u64,
    pub uptime_seconds: u64,
}

/// Global metrics instance (lazy static for simplicity)
static METRICS: once_cell::sync::Lazy<Metrics> = once_cell::sync::Lazy::new(Metrics::new);

/// Get the global metrics instance
pub fn global_metrics() -> &'static Metrics {
    &METRICS
}

/// Initialize metrics collection (call once at startup)
pub fn init_metrics() {
    // Force initialization
    let _ = global_metrics();
    info!("Metrics collection initialized");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counters_accumulate() {
        let metrics = Metrics::new();
        metrics.frame_encoded(8);
        metrics.frame_encoded(15);
        metrics.frame_decoded(8);
        metrics.incomplete_read();
        metrics.protocol_error();

        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.frames_encoded, 2);
        assert_eq!(snapshot.bytes_encoded, 23);
        assert_eq!(snapshot.frames_decoded, 1);
        assert_eq!(snapshot.bytes_decoded, 8);
        assert_eq!(snapshot.incomplete_reads, 1);
        assert_eq!(snapshot.protocol_errors, 1);
    }
}
