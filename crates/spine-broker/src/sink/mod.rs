// crates/spine-broker/src/sink/mod.rs
// ============================================================================
// Module: Spine Telemetry Sinks
// Description: Reference telemetry sink implementations.
// Purpose: Deliver transition events to logs, channels, or callbacks.
// Dependencies: spine-core
// ============================================================================

//! ## Overview
//! Telemetry sinks implement [`spine_core::TelemetrySink`]. Delivery is
//! fire-and-forget by contract: a sink that cannot deliver counts the drop
//! and returns; it never propagates the failure into a state transition.

// ============================================================================
// SECTION: Submodules
// ============================================================================

pub mod callback;
pub mod channel;
pub mod log;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use callback::CallbackTelemetrySink;
pub use channel::ChannelTelemetrySink;
pub use log::LogTelemetrySink;
