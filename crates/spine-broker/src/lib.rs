// crates/spine-broker/src/lib.rs
// ============================================================================
// Module: Spine Broker Library
// Description: Reference narrative sources and telemetry sinks for Spine.
// Purpose: Resolve thread narratives and deliver transition telemetry.
// Dependencies: spine-core, reqwest, tokio, url
// ============================================================================

//! ## Overview
//! Spine Broker provides ready-made [`spine_core::NarrativeSource`] and
//! [`spine_core::TelemetrySink`] implementations: inline fixtures, a
//! directory-backed source, an HTTP upstream source, and log/channel/callback
//! sinks. Sinks are fire-and-forget by contract; delivery failures are
//! counted, never propagated.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod sink;
pub mod source;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use sink::CallbackTelemetrySink;
pub use sink::ChannelTelemetrySink;
pub use sink::LogTelemetrySink;
pub use source::FileNarrativeSource;
pub use source::HttpNarrativeSource;
pub use source::InlineNarrativeSource;
pub use source::MAX_NARRATIVE_BYTES;
