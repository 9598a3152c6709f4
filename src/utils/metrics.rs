//! Observability and Metrics
//!
//! Counters for codec activity: frames in and out, how many carried attributes the local
//! schema did not recognize, and why decodes failed.
//!
//! Uses atomic counters for thread-safe metrics collection. A codec only records into a
//! [`Metrics`] instance it was explicitly handed; [`global_metrics`] is a convenient shared one.

use crate::error::CodecError;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;
use tracing::info;

/// Metrics collector for codec operations
#[derive(Debug)]
pub struct Metrics {
    /// Frames decoded successfully
    pub frames_decoded: AtomicU64,
    /// Frames encoded successfully
    pub frames_encoded: AtomicU64,
    /// Decoded frames that carried a non-empty remainder
    pub frames_with_unknown: AtomicU64,
    /// Total remainder bytes preserved across decodes
    pub unknown_bytes: AtomicU64,
    /// Bytes consumed by successful decodes, prefixes included
    pub bytes_decoded: AtomicU64,
    /// Bytes produced by successful encodes, prefixes included
    pub bytes_encoded: AtomicU64,
    /// Failed decodes of any kind
    pub decode_errors: AtomicU64,
    /// Failed encodes of any kind
    pub encode_errors: AtomicU64,
    /// Decodes rejected for an unreadable length prefix
    pub malformed_lengths: AtomicU64,
    /// Decodes rejected by the frame size cap
    pub oversized_frames: AtomicU64,
    /// Decodes where a field read past its frame
    pub frame_overruns: AtomicU64,
    /// Decodes that ran out of input
    pub truncated_inputs: AtomicU64,
    /// Start time for uptime calculation
    start_time: Instant,
}

impl Metrics {
    /// Create a new metrics collector
    pub fn new() -> Self {
        Self {
            frames_decoded: AtomicU64::new(0),
            frames_encoded: AtomicU64::new(0),
            frames_with_unknown: AtomicU64::new(0),
            unknown_bytes: AtomicU64::new(0),
            bytes_decoded: AtomicU64::new(0),
            bytes_encoded: AtomicU64::new(0),
            decode_errors: AtomicU64::new(0),
            encode_errors: AtomicU64::new(0),
            malformed_lengths: AtomicU64::new(0),
            oversized_frames: AtomicU64::new(0),
            frame_overruns: AtomicU64::new(0),
            truncated_inputs: AtomicU64::new(0),
            start_time: Instant::now(),
        }
    }

    /// Record a decoded frame
    pub fn frame_decoded(&self, byte_count: u64, unknown_count: u64) {
        self.frames_decoded.fetch_add(1, Ordering::Relaxed);
        self.bytes_decoded.fetch_add(byte_count, Ordering::Relaxed);
        if unknown_count > 0 {
            self.frames_with_unknown.fetch_add(1, Ordering::Relaxed);
            self.unknown_bytes.fetch_add(unknown_count, Ordering::Relaxed);
        }
    }

    /// Record an encoded frame
    pub fn frame_encoded(&self, byte_count: u64) {
        self.frames_encoded.fetch_add(1, Ordering::Relaxed);
        self.bytes_encoded.fetch_add(byte_count, Ordering::Relaxed);
    }

    /// Record a failed decode, classified by cause
    pub fn decode_error(&self, error: &CodecError) {
        self.decode_errors.fetch_add(1, Ordering::Relaxed);
        let counter = match error {
            CodecError::MalformedLength(_) => &self.malformed_lengths,
            CodecError::FrameTooLarge { .. } => &self.oversized_frames,
            CodecError::FrameOverrun { .. } => &self.frame_overruns,
            CodecError::TruncatedInput { .. } => &self.truncated_inputs,
            _ => return,
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a failed encode
    pub fn encode_error(&self) {
        self.encode_errors.fetch_add(1, Ordering::Relaxed);
    }

    /// Get current metrics snapshot
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            frames_decoded: self.frames_decoded.load(Ordering::Relaxed),
            frames_encoded: self.frames_encoded.load(Ordering::Relaxed),
            frames_with_unknown: self.frames_with_unknown.load(Ordering::Relaxed),
            unknown_bytes: self.unknown_bytes.load(Ordering::Relaxed),
            bytes_decoded: self.bytes_decoded.load(Ordering::Relaxed),
            bytes_encoded: self.bytes_encoded.load(Ordering::Relaxed),
            decode_errors: self.decode_errors.load(Ordering::Relaxed),
            encode_errors: self.encode_errors.load(Ordering::Relaxed),
            malformed_lengths: self.malformed_lengths.load(Ordering::Relaxed),
            oversized_frames: self.oversized_frames.load(Ordering::Relaxed),
            frame_overruns: self.frame_overruns.load(Ordering::Relaxed),
            truncated_inputs: self.truncated_inputs.load(Ordering::Relaxed),
            uptime_seconds: self.start_time.elapsed().as_secs(),
        }
    }

    /// Log current metrics
    pub fn log_metrics(&self) {
        let snapshot = self.snapshot();
        info!(
            frames_decoded = snapshot.frames_decoded,
            frames_encoded = snapshot.frames_encoded,
            frames_with_unknown = snapshot.frames_with_unknown,
            unknown_bytes = snapshot.unknown_bytes,
            bytes_decoded = snapshot.bytes_decoded,
            bytes_encoded = snapshot.bytes_encoded,
            decode_errors = snapshot.decode_errors,
            encode_errors = snapshot.encode_errors,
            malformed_lengths = snapshot.malformed_lengths,
            oversized_frames = snapshot.oversized_frames,
            frame_overruns = snapshot.frame_overruns,
            truncated_inputs = snapshot.truncated_inputs,
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
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetricsSnapshot {
    pub frames_decoded: u64,
    pub frames_encoded: u64,
    pub frames_with_unknown: u64,
    pub unknown_bytes: u64,
    pub bytes_decoded: u64,
    pub bytes_encoded: u64,
    pub decode_errors: u64,
    pub encode_errors: u64,
    pub malformed_lengths: u64,
    pub oversized_frames: u64,
    pub frame_overruns: u64,
    pub truncated_inputs: u64,
    pub uptime_seconds: u64,
}

/// Global metrics instance (lazy static for simplicity)
static METRICS: once_cell::sync::Lazy<Metrics> = once_cell::sync::Lazy::new(Metrics::new);

/// Get the global metrics instance
pub fn global_metrics() -> &'static Metrics {
    &METRICS
}
