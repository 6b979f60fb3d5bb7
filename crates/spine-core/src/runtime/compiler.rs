// crates/spine-core/src/runtime/compiler.rs
// ============================================================================
// Module: Spine Evidence Compiler
// Description: Pure compilation of events and verdicts into proof bundles.
// Purpose: Produce deterministic, content-excluding evidence with a canonical hash.
// Dependencies: crate::core::{evidence, event, hashing, verdict}
// ============================================================================

//! ## Overview
//! The evidence compiler is a pure function: no I/O, no clock, no randomness.
//! It emits standard items in a fixed canonical order, appends caller-supplied
//! extras in lexicographic key order, and hashes the resulting item sequence.
//!
//! Canonical encoding contract: the item sequence serializes as a JSON array
//! of `{key, value}` objects canonicalized per RFC 8785 (JCS) and is hashed
//! with SHA-256; `integrity.sha256` is the lowercase hex digest. Array order
//! is significant and preserved by JCS, so the fixed ordering below is part of
//! the external contract. Downstream systems re-verify bundles by
//! recomputation; any change here is a breaking change.
//!
//! Free-text fields (`action.note`, `verdict.reason`) are content and are
//! never read. Callers must pass only inclusion-safe metadata in `extra`;
//! extra entries are appended verbatim, and key uniqueness against the
//! standard vocabulary is a caller responsibility.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;

use thiserror::Error;

use crate::core::BundleIntegrity;
use crate::core::EvidenceItem;
use crate::core::EvidenceScalar;
use crate::core::PolicySnapshotId;
use crate::core::ProofBundle;
use crate::core::ToolUsageEvent;
use crate::core::Verdict;
use crate::core::hashing::DEFAULT_HASH_ALGORITHM;
use crate::core::hashing::HashError;
use crate::core::hashing::hash_canonical_json;

// ============================================================================
// SECTION: Canonical Key Order
// ============================================================================

/// Standard evidence keys in their fixed canonical order.
///
/// Optional context keys (`enterprise_id` through `channel`) are emitted only
/// when the event carries them; their relative position is fixed regardless.
pub const STANDARD_EVIDENCE_KEYS: &[&str] = &[
    "tool_id",
    "tool_name",
    "tool_version",
    "actor_role",
    "action_type",
    "verdict_status",
    "rule_id",
    "policy_snapshot_id",
    "tenant_id",
    "enterprise_id",
    "partner_id",
    "brand",
    "region",
    "channel",
];

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Evidence compilation errors.
#[derive(Debug, Error)]
pub enum CompileError {
    /// Event and verdict reference different policy snapshots.
    #[error(
        "policy binding mismatch: event references {event_snapshot}, verdict references {verdict_snapshot}"
    )]
    PolicyBindingMismatch {
        /// Snapshot referenced by the event context.
        event_snapshot: PolicySnapshotId,
        /// Snapshot referenced by the verdict.
        verdict_snapshot: PolicySnapshotId,
    },
    /// Canonical serialization of the item sequence failed.
    #[error(transparent)]
    Canonicalization(#[from] HashError),
}

// ============================================================================
// SECTION: Compilation
// ============================================================================

/// Compiles an event and its verdict into a proof bundle.
///
/// Pure computation: identical inputs always yield an identical
/// `integrity.sha256`, and caller-supplied `extra` map ordering never affects
/// the output (entries are emitted in lexicographic key order).
///
/// # Errors
///
/// Returns [`CompileError::PolicyBindingMismatch`] when the event context and
/// verdict disagree on the policy snapshot, and
/// [`CompileError::Canonicalization`] when canonical serialization fails.
pub fn compile(
    event: &ToolUsageEvent,
    verdict: &Verdict,
    extra: &BTreeMap<String, EvidenceScalar>,
) -> Result<ProofBundle, CompileError> {
    if event.context.policy_snapshot_id != verdict.policy_snapshot_id {
        return Err(CompileError::PolicyBindingMismatch {
            event_snapshot: event.context.policy_snapshot_id.clone(),
            verdict_snapshot: verdict.policy_snapshot_id.clone(),
        });
    }

    let mut items = Vec::with_capacity(STANDARD_EVIDENCE_KEYS.len() + extra.len());
    items.push(EvidenceItem::new("tool_id", event.tool.tool_id.as_str()));
    items.push(EvidenceItem::new("tool_name", event.tool.name.as_str()));
    items.push(EvidenceItem::new("tool_version", event.tool.version.as_str()));
    items.push(EvidenceItem::new("actor_role", event.actor.role.as_str()));
    items.push(EvidenceItem::new("action_type", event.action.action_type.as_str()));
    items.push(EvidenceItem::new("verdict_status", verdict.status.as_str()));
    items.push(EvidenceItem::new("rule_id", verdict.rule_id.as_str()));
    items.push(EvidenceItem::new("policy_snapshot_id", verdict.policy_snapshot_id.as_str()));
    items.push(EvidenceItem::new("tenant_id", event.context.tenant_id.as_str()));
    if let Some(enterprise_id) = &event.context.enterprise_id {
        items.push(EvidenceItem::new("enterprise_id", enterprise_id.as_str()));
    }
    if let Some(partner_id) = &event.context.partner_id {
        items.push(EvidenceItem::new("partner_id", partner_id.as_str()));
    }
    if let Some(brand) = &event.context.brand {
        items.push(EvidenceItem::new("brand", brand.as_str()));
    }
    if let Some(region) = &event.context.region {
        items.push(EvidenceItem::new("region", region.as_str()));
    }
    if let Some(channel) = &event.context.channel {
        items.push(EvidenceItem::new("channel", channel.as_str()));
    }

    // BTreeMap iteration is already lexicographic by key.
    for (key, value) in extra {
        items.push(EvidenceItem::new(key.as_str(), value.clone()));
    }

    let digest = hash_canonical_json(DEFAULT_HASH_ALGORITHM, &items)?;
    Ok(ProofBundle {
        items,
        integrity: BundleIntegrity {
            sha256: digest.value,
        },
    })
}
