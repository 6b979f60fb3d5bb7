// crates/spine-core/src/core/decision.rs
// ============================================================================
// Module: Spine Decisions
// Description: Operator decision submissions and attestation results.
// Purpose: Provide the decision sum type with kind-valid fields enforced at compile time.
// Dependencies: crate::core::identifiers, serde, thiserror
// ============================================================================

//! ## Overview
//! A Spine decision is transient: it exists only until it produces a proof
//! bundle, after which the immutable [`SpineDecisionResult`] and bundle pair
//! replace it. Common fields (thread, snapshot binding, reviewers) are hoisted
//! onto the submission; kind-specific fields live only on their
//! [`DecisionAction`] variant, so an escalation without a target or a change
//! request without a rationale is unrepresentable rather than merely invalid.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

use crate::core::identifiers::PolicySnapshotId;
use crate::core::identifiers::ProofBundleId;
use crate::core::identifiers::ReviewerId;
use crate::core::identifiers::ThreadId;

// ============================================================================
// SECTION: Canary Configuration
// ============================================================================

/// Staged rollout parameters for a canary decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CanaryConfig {
    /// Cohort share receiving the change, in percent.
    pub cohort_percent: u8,
    /// Canary observation window in days.
    pub duration_days: u32,
}

// ============================================================================
// SECTION: Decision Actions
// ============================================================================

/// Kind-specific decision payload.
///
/// # Invariants
/// - Variants are stable for serialization and contract matching.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DecisionAction {
    /// Approve the subject, optionally under named conditions.
    Approve {
        /// Optional approval conditions. Content; excluded from evidence.
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        conditions: Vec<String>,
    },
    /// Send the subject back with a required rationale.
    RequestChanges {
        /// Rationale for the change request. Required, non-empty.
        rationale: String,
    },
    /// Start a staged canary rollout.
    StartCanary {
        /// Optional canary parameters.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        canary: Option<CanaryConfig>,
    },
    /// Escalate the subject to another identity.
    Escalate {
        /// Identity receiving the escalation.
        escalate_to: ReviewerId,
        /// Rationale for the escalation. Required, non-empty.
        rationale: String,
    },
}

/// Field-free decision kind label.
///
/// # Invariants
/// - Variants are stable for serialization and telemetry labeling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DecisionKind {
    /// Approval decision.
    Approve,
    /// Change request decision.
    RequestChanges,
    /// Canary rollout decision.
    StartCanary,
    /// Escalation decision.
    Escalate,
}

impl DecisionKind {
    /// Returns a stable label for the kind.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Approve => "approve",
            Self::RequestChanges => "request_changes",
            Self::StartCanary => "start_canary",
            Self::Escalate => "escalate",
        }
    }
}

// ============================================================================
// SECTION: Decision Submission
// ============================================================================

/// Operator decision submitted against a loaded thread.
///
/// # Invariants
/// - `policy_snapshot_id` must equal the snapshot id of the narrative facts
///   the decision was issued against.
/// - `reviewers` is non-empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpineDecision {
    /// Thread the decision applies to.
    pub thread_id: ThreadId,
    /// Policy snapshot the decision is bound to.
    pub policy_snapshot_id: PolicySnapshotId,
    /// Reviewer identities participating in the decision.
    pub reviewers: Vec<ReviewerId>,
    /// Kind-specific decision payload.
    pub action: DecisionAction,
}

impl SpineDecision {
    /// Returns the field-free kind label for this decision.
    #[must_use]
    pub const fn kind(&self) -> DecisionKind {
        match self.action {
            DecisionAction::Approve {
                ..
            } => DecisionKind::Approve,
            DecisionAction::RequestChanges {
                ..
            } => DecisionKind::RequestChanges,
            DecisionAction::StartCanary {
                ..
            } => DecisionKind::StartCanary,
            DecisionAction::Escalate {
                ..
            } => DecisionKind::Escalate,
        }
    }

    /// Validates local submission constraints.
    ///
    /// # Errors
    ///
    /// Returns [`DecisionError`] when reviewers are missing or a required
    /// rationale is empty. Validation never performs I/O.
    pub fn validate(&self) -> Result<(), DecisionError> {
        if self.reviewers.is_empty() {
            return Err(DecisionError::EmptyReviewers);
        }
        match &self.action {
            DecisionAction::RequestChanges {
                rationale,
            }
            | DecisionAction::Escalate {
                rationale,
                ..
            } => {
                if rationale.trim().is_empty() {
                    return Err(DecisionError::MissingRationale(self.kind()));
                }
            }
            DecisionAction::Approve {
                ..
            }
            | DecisionAction::StartCanary {
                ..
            } => {}
        }
        Ok(())
    }
}

// ============================================================================
// SECTION: Decision Result
// ============================================================================

/// Immutable attestation result returned after a decision is persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpineDecisionResult {
    /// Identifier of the persisted proof bundle.
    pub proof_bundle_id: ProofBundleId,
    /// Kind of the attested decision.
    pub decision_kind: DecisionKind,
    /// Policy snapshot the decision was bound to.
    pub policy_snapshot_id: PolicySnapshotId,
    /// Thread the decision applied to.
    pub thread_id: ThreadId,
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Local decision validation errors.
#[derive(Debug, Error)]
pub enum DecisionError {
    /// Reviewer set is empty.
    #[error("decision requires at least one reviewer")]
    EmptyReviewers,
    /// Required rationale is missing or blank.
    #[error("{} decision requires a non-empty rationale", .0.as_str())]
    MissingRationale(DecisionKind),
}
