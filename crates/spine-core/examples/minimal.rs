// crates/spine-core/examples/minimal.rs
// ============================================================================
// Module: Spine Minimal Example
// Description: Minimal end-to-end decision attestation using in-memory adapters.
// Purpose: Demonstrate open/submit/open_proof against the in-memory store.
// Dependencies: spine-core
// ============================================================================

//! ## Overview
//! Loads a fixture narrative, submits an approve decision, and re-verifies the
//! persisted proof bundle by recomputation. Backend-agnostic and suitable for
//! quick verification.

#![allow(clippy::print_stdout, reason = "Examples report progress on stdout.")]

use std::collections::BTreeMap;

use spine_core::ActionRecord;
use spine_core::ActorRef;
use spine_core::DecisionAction;
use spine_core::EventId;
use spine_core::FetchError;
use spine_core::InMemoryProofBundleStore;
use spine_core::Narrative;
use spine_core::NarrativeFacts;
use spine_core::NarrativeSource;
use spine_core::NoopTelemetry;
use spine_core::PolicySnapshotId;
use spine_core::ReviewerId;
use spine_core::RuleId;
use spine_core::Spine;
use spine_core::SpineDecision;
use spine_core::TenantId;
use spine_core::ThreadId;
use spine_core::Timestamp;
use spine_core::ToolId;
use spine_core::ToolRef;
use spine_core::ToolUsageEvent;
use spine_core::UsageContext;
use spine_core::Verdict;
use spine_core::VerdictStatus;

/// Narrative source serving one fixture thread.
struct ExampleSource {
    /// Fixture narratives keyed by thread id.
    narratives: BTreeMap<String, Narrative>,
}

impl NarrativeSource for ExampleSource {
    fn fetch(&self, thread_id: &ThreadId) -> Result<Narrative, FetchError> {
        self.narratives
            .get(thread_id.as_str())
            .cloned()
            .ok_or_else(|| FetchError::Unavailable(format!("no narrative for {thread_id}")))
    }
}

/// Runs the minimal attestation flow.
fn main() -> Result<(), Box<dyn std::error::Error>> {
    let thread_id = ThreadId::new("thread-1");
    let narrative = Narrative {
        facts: NarrativeFacts {
            policy_snapshot_id: PolicySnapshotId::new("eps-1.3"),
            event: ToolUsageEvent {
                event_id: EventId::new("evt-1"),
                tool: ToolRef {
                    tool_id: ToolId::new("mj-001"),
                    name: "Midjourney".to_string(),
                    version: "6.1.0".to_string(),
                },
                actor: ActorRef {
                    role: "designer".to_string(),
                },
                action: ActionRecord {
                    action_type: "generate".to_string(),
                    note: Some("campaign hero image draft".to_string()),
                },
                context: UsageContext {
                    tenant_id: TenantId::new("tenant-1"),
                    enterprise_id: None,
                    partner_id: None,
                    brand: None,
                    region: Some("US".to_string()),
                    channel: Some("social".to_string()),
                    policy_snapshot_id: PolicySnapshotId::new("eps-1.3"),
                },
                occurred_at: Timestamp::UnixMillis(1_700_000_000_000),
            },
            verdict: Verdict {
                status: VerdictStatus::Approved,
                reason: "watermark parameter enabled".to_string(),
                rule_id: RuleId::new("R-PASS-01"),
                policy_snapshot_id: PolicySnapshotId::new("eps-1.3"),
            },
            case_title: Some("Watermark compliance".to_string()),
        },
        proof_bundle_id: None,
    };

    let mut narratives = BTreeMap::new();
    narratives.insert(thread_id.to_string(), narrative);
    let spine = Spine::new(
        ExampleSource {
            narratives,
        },
        InMemoryProofBundleStore::new(),
        NoopTelemetry,
    );

    spine.open_thread(&thread_id)?;
    let decision = SpineDecision {
        thread_id: thread_id.clone(),
        policy_snapshot_id: PolicySnapshotId::new("eps-1.3"),
        reviewers: vec![ReviewerId::new("compliance@enterprise.example")],
        action: DecisionAction::Approve {
            conditions: Vec::new(),
        },
    };
    let result = spine.submit_decision(&decision, Timestamp::UnixMillis(1_700_000_001_000))?;
    println!("attested {} as {}", result.thread_id, result.proof_bundle_id);

    let bundle = spine.open_proof(&result.proof_bundle_id)?;
    println!("bundle verifies: {}", bundle.verify()?);
    Ok(())
}
