// crates/spine-core/src/core/narrative.rs
// ============================================================================
// Module: Spine Narratives
// Description: Facts loaded for a thread before a decision is taken.
// Purpose: Provide the narrative shape returned by narrative sources.
// Dependencies: crate::core::{event, identifiers, verdict}, serde
// ============================================================================

//! ## Overview
//! A narrative is what an operator sees when opening a thread: the upstream
//! event, its verdict, the policy snapshot both are bound to, and the prior
//! proof bundle id when the thread was attested before. Narratives are
//! read-only inputs; Spine never writes them back.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;

use crate::core::event::ToolUsageEvent;
use crate::core::identifiers::PolicySnapshotId;
use crate::core::identifiers::ProofBundleId;
use crate::core::verdict::Verdict;

// ============================================================================
// SECTION: Narrative Facts
// ============================================================================

/// Facts loaded for a thread.
///
/// # Invariants
/// - `policy_snapshot_id` is the snapshot every subsequent decision must bind to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NarrativeFacts {
    /// Policy snapshot the thread is governed under.
    pub policy_snapshot_id: PolicySnapshotId,
    /// Tool usage event under review.
    pub event: ToolUsageEvent,
    /// Verdict issued for the event.
    pub verdict: Verdict,
    /// Optional case title for display.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub case_title: Option<String>,
}

// ============================================================================
// SECTION: Narrative
// ============================================================================

/// Narrative returned by a narrative source for one thread.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Narrative {
    /// Facts for the thread.
    pub facts: NarrativeFacts,
    /// Prior proof bundle id when the thread was attested before.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub proof_bundle_id: Option<ProofBundleId>,
}
