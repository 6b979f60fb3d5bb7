// crates/spine-broker/src/sink/channel.rs
// ============================================================================
// Module: Spine Channel Sink
// Description: Channel-based telemetry sink for asynchronous consumers.
// Purpose: Forward transition events through a Tokio mpsc channel.
// Dependencies: spine-core, tokio
// ============================================================================

//! ## Overview
//! `ChannelTelemetrySink` forwards events into a `tokio::sync::mpsc` channel
//! without blocking. A full or closed channel counts the drop and returns;
//! backpressure never stalls a state transition.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::atomic::AtomicU64;
use std::sync::atomic::Ordering;

use spine_core::TelemetryEvent;
use spine_core::TelemetrySink;
use tokio::sync::mpsc::Sender;

// ============================================================================
// SECTION: Channel Sink
// ============================================================================

/// Channel-based telemetry sink.
#[derive(Debug)]
pub struct ChannelTelemetrySink {
    /// Sender used to forward events.
    sender: Sender<TelemetryEvent>,
    /// Count of events dropped due to a full or closed channel.
    dropped: AtomicU64,
}

impl ChannelTelemetrySink {
    /// Creates a channel sink over the provided sender.
    #[must_use]
    pub const fn new(sender: Sender<TelemetryEvent>) -> Self {
        Self {
            sender,
            dropped: AtomicU64::new(0),
        }
    }

    /// Returns the number of events dropped so far.
    #[must_use]
    pub fn dropped(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }
}

impl TelemetrySink for ChannelTelemetrySink {
    fn emit(&self, event: &TelemetryEvent) {
        if self.sender.try_send(event.clone()).is_err() {
            self.dropped.fetch_add(1, Ordering::Relaxed);
        }
    }
}
