// crates/spine-broker/src/sink/callback.rs
// ============================================================================
// Module: Spine Callback Sink
// Description: Callback-based telemetry sink for embedding hosts.
// Purpose: Invoke a host-provided function for each transition event.
// Dependencies: spine-core
// ============================================================================

//! ## Overview
//! `CallbackTelemetrySink` hands each event to a host-provided closure. The
//! closure owns all delivery concerns; the sink itself cannot fail.

// ============================================================================
// SECTION: Imports
// ============================================================================

use spine_core::TelemetryEvent;
use spine_core::TelemetrySink;

// ============================================================================
// SECTION: Callback Sink
// ============================================================================

/// Callback-based telemetry sink.
pub struct CallbackTelemetrySink {
    /// Host-provided event handler.
    handler: Box<dyn Fn(&TelemetryEvent) + Send + Sync>,
}

impl CallbackTelemetrySink {
    /// Creates a callback sink over the provided handler.
    pub fn new(handler: impl Fn(&TelemetryEvent) + Send + Sync + 'static) -> Self {
        Self {
            handler: Box::new(handler),
        }
    }
}

impl TelemetrySink for CallbackTelemetrySink {
    fn emit(&self, event: &TelemetryEvent) {
        (self.handler)(event);
    }
}
