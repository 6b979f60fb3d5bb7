// crates/spine-core/src/interfaces/mod.rs
// ============================================================================
// Module: Spine Interfaces
// Description: Backend-agnostic interfaces for narratives, bundle storage, and telemetry.
// Purpose: Define the contract surfaces used by the Spine engine.
// Dependencies: crate::core
// ============================================================================

//! ## Overview
//! Interfaces define how Spine integrates with external systems without
//! embedding backend-specific details. The engine receives implementations by
//! construction; it never reaches for ambient singletons. Implementations
//! must be deterministic where the contract demands it and fail closed on
//! missing or invalid data.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::Arc;

use thiserror::Error;

use crate::core::AttemptId;
use crate::core::Narrative;
use crate::core::ProofBundle;
use crate::core::ProofBundleId;
use crate::core::TelemetryEvent;
use crate::core::ThreadId;

// ============================================================================
// SECTION: Narrative Source
// ============================================================================

/// Narrative fetch errors.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Backend was unreachable or refused the request.
    #[error("narrative backend unavailable: {0}")]
    Unavailable(String),
    /// Backend returned a payload that failed to parse or validate.
    #[error("narrative payload invalid: {0}")]
    Invalid(String),
}

/// Backend-agnostic narrative source.
///
/// Narrative reads are idempotent and may be retried freely.
pub trait NarrativeSource {
    /// Fetches the narrative for a thread.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError`] when the narrative cannot be loaded.
    fn fetch(&self, thread_id: &ThreadId) -> Result<Narrative, FetchError>;
}

/// Shared narrative source backed by an `Arc` trait object.
#[derive(Clone)]
pub struct SharedNarrativeSource {
    /// Inner source implementation.
    inner: Arc<dyn NarrativeSource + Send + Sync>,
}

impl SharedNarrativeSource {
    /// Wraps a narrative source in a shared, clonable wrapper.
    #[must_use]
    pub fn from_source(source: impl NarrativeSource + Send + Sync + 'static) -> Self {
        Self {
            inner: Arc::new(source),
        }
    }

    /// Wraps an existing shared source.
    #[must_use]
    pub const fn new(source: Arc<dyn NarrativeSource + Send + Sync>) -> Self {
        Self {
            inner: source,
        }
    }
}

impl NarrativeSource for SharedNarrativeSource {
    fn fetch(&self, thread_id: &ThreadId) -> Result<Narrative, FetchError> {
        self.inner.fetch(thread_id)
    }
}

// ============================================================================
// SECTION: Proof Bundle Store
// ============================================================================

/// Proof bundle store errors.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Store I/O error.
    #[error("proof bundle store io error: {0}")]
    Io(String),
    /// Store data is corrupted or fails integrity checks.
    #[error("proof bundle store corruption: {0}")]
    Corrupt(String),
    /// A different bundle was already recorded for the attempt.
    #[error("proof bundle store conflict: {0}")]
    Conflict(String),
    /// Store data is invalid.
    #[error("proof bundle store invalid data: {0}")]
    Invalid(String),
    /// Store reported an error.
    #[error("proof bundle store error: {0}")]
    Store(String),
}

/// Append-only, content-addressed proof bundle store.
///
/// No update or delete operation is exposed; attested bundles are immutable.
pub trait ProofBundleStore {
    /// Persists a bundle under its content-addressed identifier.
    ///
    /// Re-putting identical content is idempotent. The attempt identifier
    /// deduplicates retried submissions: a different bundle under an already
    /// recorded attempt is a [`StoreError::Conflict`].
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when persistence fails or integrity checks do
    /// not hold.
    fn put(
        &self,
        bundle: &ProofBundle,
        attempt_id: &AttemptId,
    ) -> Result<ProofBundleId, StoreError>;

    /// Loads a bundle by identifier.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when loading fails; an unknown identifier is
    /// `Ok(None)`, not an error.
    fn get(&self, id: &ProofBundleId) -> Result<Option<ProofBundle>, StoreError>;
}

// ============================================================================
// SECTION: Telemetry Sink
// ============================================================================

/// Fire-and-forget telemetry sink.
///
/// Sinks must never propagate failures; a dropped event is acceptable, a
/// failed state transition is not.
pub trait TelemetrySink {
    /// Records a structured transition event.
    fn emit(&self, event: &TelemetryEvent);
}

/// No-op telemetry sink.
///
/// # Invariants
/// - Events are intentionally discarded.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopTelemetry;

impl TelemetrySink for NoopTelemetry {
    fn emit(&self, _event: &TelemetryEvent) {}
}

/// Shared telemetry sink backed by an `Arc` trait object.
#[derive(Clone)]
pub struct SharedTelemetrySink {
    /// Inner sink implementation.
    inner: Arc<dyn TelemetrySink + Send + Sync>,
}

impl SharedTelemetrySink {
    /// Wraps a telemetry sink in a shared, clonable wrapper.
    #[must_use]
    pub fn from_sink(sink: impl TelemetrySink + Send + Sync + 'static) -> Self {
        Self {
            inner: Arc::new(sink),
        }
    }

    /// Wraps an existing shared sink.
    #[must_use]
    pub const fn new(sink: Arc<dyn TelemetrySink + Send + Sync>) -> Self {
        Self {
            inner: sink,
        }
    }
}

impl TelemetrySink for SharedTelemetrySink {
    fn emit(&self, event: &TelemetryEvent) {
        self.inner.emit(event);
    }
}
