// crates/spine-broker/src/sink/log.rs
// ============================================================================
// Module: Spine Log Sink
// Description: JSON-line telemetry sink for audit-grade transition records.
// Purpose: Persist transition events as structured log lines.
// Dependencies: serde_json, spine-core, std
// ============================================================================

//! ## Overview
//! `LogTelemetrySink` writes one JSON object per event to the wrapped writer.
//! Write failures are counted and dropped; telemetry must never fail a state
//! transition. Events carry identifiers only, so the log stream is safe to
//! ship to external aggregation.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::io::Write;
use std::sync::Mutex;
use std::sync::atomic::AtomicU64;
use std::sync::atomic::Ordering;

use spine_core::TelemetryEvent;
use spine_core::TelemetrySink;

// ============================================================================
// SECTION: Log Sink
// ============================================================================

/// JSON-line telemetry sink.
pub struct LogTelemetrySink<W: Write + Send> {
    /// Output writer for log records.
    writer: Mutex<W>,
    /// Count of events dropped due to serialization or write failures.
    dropped: AtomicU64,
}

impl<W: Write + Send> LogTelemetrySink<W> {
    /// Creates a log sink over the provided writer.
    pub fn new(writer: W) -> Self {
        Self {
            writer: Mutex::new(writer),
            dropped: AtomicU64::new(0),
        }
    }

    /// Returns the number of events dropped so far.
    pub fn dropped(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }

    /// Records one dropped event.
    fn count_drop(&self) {
        self.dropped.fetch_add(1, Ordering::Relaxed);
    }
}

impl<W: Write + Send> TelemetrySink for LogTelemetrySink<W> {
    fn emit(&self, event: &TelemetryEvent) {
        let Ok(line) = serde_json::to_string(event) else {
            self.count_drop();
            return;
        };
        let Ok(mut writer) = self.writer.lock() else {
            self.count_drop();
            return;
        };
        if writeln!(&mut *writer, "{line}").is_err() {
            self.count_drop();
        }
    }
}
