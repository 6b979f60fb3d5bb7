// crates/spine-core/tests/compiler.rs
// ============================================================================
// Module: Evidence Compiler Tests
// Description: Tests for deterministic, content-excluding evidence compilation.
// Purpose: Validate hashing determinism, key ordering, and snapshot binding.
// Dependencies: spine-core
// ============================================================================
//! ## Overview
//! Validates the evidence compiler contract: identical inputs hash
//! identically, free-text content never enters a bundle, and snapshot
//! mismatches fail closed without producing a bundle.

#![allow(
    clippy::panic,
    clippy::print_stdout,
    clippy::print_stderr,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::use_debug,
    clippy::dbg_macro,
    clippy::panic_in_result_fn,
    clippy::unwrap_in_result,
    reason = "Test-only output and panic-based assertions are permitted."
)]

use std::collections::BTreeMap;

use spine_core::ActionRecord;
use spine_core::ActorRef;
use spine_core::CompileError;
use spine_core::EventId;
use spine_core::EvidenceScalar;
use spine_core::PolicySnapshotId;
use spine_core::RuleId;
use spine_core::TenantId;
use spine_core::Timestamp;
use spine_core::ToolId;
use spine_core::ToolRef;
use spine_core::ToolUsageEvent;
use spine_core::UsageContext;
use spine_core::Verdict;
use spine_core::VerdictStatus;
use spine_core::compile;

/// Builds a representative tool usage event bound to the given snapshot.
fn sample_event(snapshot: &str) -> ToolUsageEvent {
    ToolUsageEvent {
        event_id: EventId::new("evt-1"),
        tool: ToolRef {
            tool_id: ToolId::new("claude-001"),
            name: "Claude".to_string(),
            version: "3.0.0".to_string(),
        },
        actor: ActorRef {
            role: "reviewer".to_string(),
        },
        action: ActionRecord {
            action_type: "generate".to_string(),
            note: Some("drafting confidential oncology campaign copy".to_string()),
        },
        context: UsageContext {
            tenant_id: TenantId::new("tenant-1"),
            enterprise_id: None,
            partner_id: None,
            brand: Some("ONCAVEX".to_string()),
            region: Some("Americas".to_string()),
            channel: Some("email".to_string()),
            policy_snapshot_id: PolicySnapshotId::new(snapshot),
        },
        occurred_at: Timestamp::UnixMillis(1_700_000_000_000),
    }
}

/// Builds an approval verdict bound to the given snapshot.
fn sample_verdict(snapshot: &str) -> Verdict {
    Verdict {
        status: VerdictStatus::Approved,
        reason: "tool version satisfies the active watermark rule".to_string(),
        rule_id: RuleId::new("R-PASS-01"),
        policy_snapshot_id: PolicySnapshotId::new(snapshot),
    }
}

// ============================================================================
// SECTION: Determinism
// ============================================================================

/// Compiling the same inputs twice yields identical digests.
#[test]
fn compile_is_deterministic() {
    let event = sample_event("ps-1");
    let verdict = sample_verdict("ps-1");
    let mut extra = BTreeMap::new();
    extra.insert("decided_at".to_string(), EvidenceScalar::from("unix_ms:1700000000500"));

    let first = compile(&event, &verdict, &extra).unwrap();
    let second = compile(&event, &verdict, &extra).unwrap();

    assert_eq!(first.integrity.sha256, second.integrity.sha256);
    assert_eq!(first.items, second.items);
}

/// Changing any included field changes the digest.
#[test]
fn compile_is_sensitive_to_item_changes() {
    let event = sample_event("ps-1");
    let verdict = sample_verdict("ps-1");
    let mut extra = BTreeMap::new();
    extra.insert("cohort".to_string(), EvidenceScalar::Integer(15));

    let baseline = compile(&event, &verdict, &extra).unwrap();

    let mut changed_event = event.clone();
    changed_event.tool.version = "3.0.1".to_string();
    let version_changed = compile(&changed_event, &verdict, &extra).unwrap();
    assert_ne!(baseline.integrity.sha256, version_changed.integrity.sha256);

    let mut changed_extra = extra.clone();
    changed_extra.insert("cohort".to_string(), EvidenceScalar::Integer(16));
    let extra_changed = compile(&event, &verdict, &changed_extra).unwrap();
    assert_ne!(baseline.integrity.sha256, extra_changed.integrity.sha256);
}

/// Insertion order of the extra map never affects the digest.
#[test]
fn compile_is_order_independent_for_extras() {
    let event = sample_event("ps-1");
    let verdict = sample_verdict("ps-1");

    let mut forward = BTreeMap::new();
    forward.insert("a".to_string(), EvidenceScalar::Integer(1));
    forward.insert("b".to_string(), EvidenceScalar::Integer(2));

    let mut reverse = BTreeMap::new();
    reverse.insert("b".to_string(), EvidenceScalar::Integer(2));
    reverse.insert("a".to_string(), EvidenceScalar::Integer(1));

    let first = compile(&event, &verdict, &forward).unwrap();
    let second = compile(&event, &verdict, &reverse).unwrap();

    assert_eq!(first.integrity.sha256, second.integrity.sha256);
}

// ============================================================================
// SECTION: Content Exclusion
// ============================================================================

/// Free-text fields never appear in a bundle, as key or value.
#[test]
fn compile_excludes_note_and_reason_content() {
    let event = sample_event("ps-1");
    let verdict = sample_verdict("ps-1");
    let note = event.action.note.clone().unwrap();

    let bundle = compile(&event, &verdict, &BTreeMap::new()).unwrap();

    assert!(bundle.find("note").is_none());
    assert!(bundle.find("reason").is_none());
    for item in &bundle.items {
        assert_ne!(item.key, "note");
        if let EvidenceScalar::Text(text) = &item.value {
            assert_ne!(text, &note);
            assert_ne!(text, &verdict.reason);
        }
    }
}

// ============================================================================
// SECTION: Snapshot Binding
// ============================================================================

/// Mismatched snapshot ids fail closed without producing a bundle.
#[test]
fn compile_rejects_policy_binding_mismatch() {
    let event = sample_event("ps-1");
    let verdict = sample_verdict("ps-2");

    let err = compile(&event, &verdict, &BTreeMap::new()).unwrap_err();
    assert!(matches!(err, CompileError::PolicyBindingMismatch { .. }));
}

// ============================================================================
// SECTION: Canonical Shape
// ============================================================================

/// The approve scenario yields the curated standard items and a 64-hex digest.
#[test]
fn compile_emits_standard_items_in_canonical_order() {
    let event = sample_event("ps-1");
    let verdict = sample_verdict("ps-1");

    let bundle = compile(&event, &verdict, &BTreeMap::new()).unwrap();

    let keys: Vec<&str> = bundle.items.iter().map(|item| item.key.as_str()).collect();
    assert_eq!(
        keys,
        vec![
            "tool_id",
            "tool_name",
            "tool_version",
            "actor_role",
            "action_type",
            "verdict_status",
            "rule_id",
            "policy_snapshot_id",
            "tenant_id",
            "brand",
            "region",
            "channel",
        ]
    );
    assert_eq!(bundle.find("verdict_status").and_then(EvidenceScalar::as_text), Some("Approved"));
    assert_eq!(bundle.find("rule_id").and_then(EvidenceScalar::as_text), Some("R-PASS-01"));
    assert_eq!(bundle.integrity.sha256.len(), 64);
    assert!(bundle.integrity.sha256.chars().all(|c| c.is_ascii_hexdigit()));
    assert!(bundle.verify().unwrap());
}

/// Absent optional context fields are omitted rather than emitted empty.
#[test]
fn compile_omits_absent_context_fields() {
    let mut event = sample_event("ps-1");
    event.context.brand = None;
    event.context.region = None;
    event.context.channel = None;
    let verdict = sample_verdict("ps-1");

    let bundle = compile(&event, &verdict, &BTreeMap::new()).unwrap();

    assert!(bundle.find("brand").is_none());
    assert!(bundle.find("region").is_none());
    assert!(bundle.find("channel").is_none());
    assert!(bundle.find("enterprise_id").is_none());
    assert!(bundle.find("partner_id").is_none());
}
