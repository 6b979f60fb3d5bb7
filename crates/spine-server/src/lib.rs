// crates/spine-server/src/lib.rs
// ============================================================================
// Module: Spine Server Library
// Description: HTTP API surface for the Spine decision-attestation pipeline.
// Purpose: Expose configuration and server wiring for hosting the engine.
// Dependencies: crate::{config, server}
// ============================================================================

//! ## Overview
//! The server crate hosts the Spine engine behind an HTTP API: narrative
//! load, decision submission, and proof bundle lookup. Configuration is
//! strict TOML with fail-closed parsing, and every collaborator is wired
//! explicitly at startup.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod config;
pub mod server;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use config::ConfigError;
pub use config::NarrativeSection;
pub use config::ServerConfig;
pub use config::ServerSection;
pub use config::StoreSection;
pub use config::TelemetrySection;
pub use server::AppState;
pub use server::DecisionRequest;
pub use server::ErrorBody;
pub use server::ServerError;
pub use server::SpineServer;
pub use server::build_state;
pub use server::map_spine_error;
pub use server::router;
