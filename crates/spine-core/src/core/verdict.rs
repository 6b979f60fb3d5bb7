// crates/spine-core/src/core/verdict.rs
// ============================================================================
// Module: Spine Verdicts
// Description: Policy-evaluation outcomes bound to a policy snapshot.
// Purpose: Provide the read-only verdict shape consumed by the evidence compiler.
// Dependencies: crate::core::identifiers, serde
// ============================================================================

//! ## Overview
//! A verdict records the policy-evaluation outcome for one tool usage event
//! and names the exact policy snapshot it was checked against. A verdict that
//! references a different snapshot than its event is an invariant violation
//! and must never compile into evidence.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;

use crate::core::identifiers::PolicySnapshotId;
use crate::core::identifiers::RuleId;

// ============================================================================
// SECTION: Verdict Status
// ============================================================================

/// Policy-evaluation outcome classification.
///
/// # Invariants
/// - Variants are stable for serialization and contract matching.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VerdictStatus {
    /// Usage is allowed under the bound policy snapshot.
    Approved,
    /// Usage requires a human review before proceeding.
    RequiresReview,
    /// Usage is prohibited under the bound policy snapshot.
    Prohibited,
}

impl VerdictStatus {
    /// Returns a stable label for the status.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Approved => "Approved",
            Self::RequiresReview => "RequiresReview",
            Self::Prohibited => "Prohibited",
        }
    }
}

// ============================================================================
// SECTION: Verdict
// ============================================================================

/// Policy-evaluation outcome for one event.
///
/// # Invariants
/// - `policy_snapshot_id` must equal the snapshot id of the evaluated event.
/// - `reason` is prose for operators; it is content and excluded from evidence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Verdict {
    /// Outcome classification.
    pub status: VerdictStatus,
    /// Human-readable explanation. Content; excluded from evidence.
    pub reason: String,
    /// Identifier of the policy rule that produced the outcome.
    pub rule_id: RuleId,
    /// Policy snapshot the event was evaluated against.
    pub policy_snapshot_id: PolicySnapshotId,
}
