// crates/spine-core/src/core/telemetry.rs
// ============================================================================
// Module: Spine Telemetry Events
// Description: Structured transition events emitted by the decision engine.
// Purpose: Provide a stable telemetry schema without transport dependencies.
// Dependencies: crate::core::{decision, identifiers}, serde
// ============================================================================

//! ## Overview
//! Telemetry is fire-and-forget: sinks receive structured transition events
//! and may drop them, but a sink failure must never fail a state transition.
//! Events carry identifiers only; evidence values and free text never appear
//! in telemetry payloads.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;

use crate::core::decision::DecisionKind;
use crate::core::identifiers::PolicySnapshotId;
use crate::core::identifiers::ProofBundleId;
use crate::core::identifiers::ThreadId;

// ============================================================================
// SECTION: Telemetry Events
// ============================================================================

/// Structured transition event emitted by the Spine engine.
///
/// # Invariants
/// - Variants and field names are stable for downstream consumers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum TelemetryEvent {
    /// A thread narrative was loaded and the thread is ready for a decision.
    SpineOpened {
        /// Thread identifier.
        thread_id: ThreadId,
        /// Policy snapshot the thread is governed under.
        policy_snapshot_id: PolicySnapshotId,
    },
    /// A decision was attested and its proof bundle persisted.
    SpineAttested {
        /// Thread identifier.
        thread_id: ThreadId,
        /// Policy snapshot the decision was bound to.
        policy_snapshot_id: PolicySnapshotId,
        /// Identifier of the persisted bundle.
        bundle_id: ProofBundleId,
        /// Kind of the attested decision.
        decision_kind: DecisionKind,
    },
    /// A persisted proof bundle was opened for audit display.
    SpineProofOpened {
        /// Identifier of the opened bundle.
        bundle_id: ProofBundleId,
        /// Thread identifier recovered from the bundle items, when present.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        thread_id: Option<ThreadId>,
        /// Policy snapshot recovered from the bundle items, when present.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        policy_snapshot_id: Option<PolicySnapshotId>,
    },
}

impl TelemetryEvent {
    /// Returns a stable label for the event.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::SpineOpened {
                ..
            } => "spine_opened",
            Self::SpineAttested {
                ..
            } => "spine_attested",
            Self::SpineProofOpened {
                ..
            } => "spine_proof_opened",
        }
    }
}
