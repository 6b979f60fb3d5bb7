// crates/spine-server/tests/api_flow.rs
// ============================================================================
// Module: HTTP API Flow Tests
// Description: End-to-end tests over a bound Spine server.
// Purpose: Validate the narrative/decision/bundle routes and error mapping.
// Dependencies: reqwest, spine-core, spine-server, tempfile, tokio
// ============================================================================
//! ## Overview
//! Boots a server on an ephemeral port against a directory narrative source
//! and a SQLite store, then drives the full decision flow over HTTP.

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

use std::fs;
use std::net::SocketAddr;
use std::sync::mpsc;
use std::thread;

use spine_core::ActionRecord;
use spine_core::ActorRef;
use spine_core::DecisionAction;
use spine_core::EventId;
use spine_core::Narrative;
use spine_core::NarrativeFacts;
use spine_core::PolicySnapshotId;
use spine_core::ReviewerId;
use spine_core::RuleId;
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
use spine_server::DecisionRequest;
use spine_server::NarrativeSection;
use spine_server::ServerConfig;
use spine_server::ServerSection;
use spine_server::SpineServer;
use spine_server::StoreSection;
use spine_server::TelemetrySection;

/// Builds the fixture narrative served for `thread-1`.
fn sample_narrative() -> Narrative {
    Narrative {
        facts: NarrativeFacts {
            policy_snapshot_id: PolicySnapshotId::new("ps-1"),
            event: ToolUsageEvent {
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
                    note: Some("prompt text that must stay out of evidence".to_string()),
                },
                context: UsageContext {
                    tenant_id: TenantId::new("tenant-1"),
                    enterprise_id: None,
                    partner_id: None,
                    brand: None,
                    region: Some("US".to_string()),
                    channel: None,
                    policy_snapshot_id: PolicySnapshotId::new("ps-1"),
                },
                occurred_at: Timestamp::UnixMillis(1_700_000_000_000),
            },
            verdict: Verdict {
                status: VerdictStatus::Approved,
                reason: "version satisfies the active rule".to_string(),
                rule_id: RuleId::new("R-PASS-01"),
                policy_snapshot_id: PolicySnapshotId::new("ps-1"),
            },
            case_title: None,
        },
        proof_bundle_id: None,
    }
}

/// Boots a server in a background runtime and returns its address.
fn boot_server(config: ServerConfig) -> SocketAddr {
    let (addr_tx, addr_rx) = mpsc::channel();
    thread::spawn(move || {
        let runtime = tokio::runtime::Runtime::new().unwrap();
        runtime.block_on(async move {
            let server = SpineServer::bind(&config).await.unwrap();
            addr_tx.send(server.local_addr().unwrap()).unwrap();
            let _ = server.serve().await;
        });
    });
    addr_rx.recv().unwrap()
}

/// Full flow: narrative load, decision submission, and bundle lookup.
#[test]
fn http_api_attests_a_decision_end_to_end() {
    let dir = tempfile::tempdir().unwrap();
    let narratives = dir.path().join("narratives");
    fs::create_dir(&narratives).unwrap();
    fs::write(
        narratives.join("thread-1.json"),
        serde_json::to_vec(&sample_narrative()).unwrap(),
    )
    .unwrap();

    let config = ServerConfig {
        server: ServerSection {
            bind_addr: "127.0.0.1:0".parse().unwrap(),
            max_body_bytes: 64 * 1024,
        },
        store: StoreSection {
            path: Some(dir.path().join("bundles.db")),
        },
        narrative: NarrativeSection::Dir {
            root: narratives,
        },
        telemetry: TelemetrySection {
            log_path: Some(dir.path().join("telemetry.jsonl")),
        },
    };
    let addr = boot_server(config);
    let client = reqwest::blocking::Client::new();
    let base = format!("http://{addr}");

    // Load the narrative; the thread becomes decidable.
    let response = client.get(format!("{base}/v1/threads/thread-1/narrative")).send().unwrap();
    assert_eq!(response.status().as_u16(), 200);
    let narrative: Narrative = response.json().unwrap();
    assert_eq!(narrative.facts.policy_snapshot_id.as_str(), "ps-1");

    // Submit an approve decision bound to the loaded snapshot.
    let request = DecisionRequest {
        decision: SpineDecision {
            thread_id: ThreadId::new("thread-1"),
            policy_snapshot_id: PolicySnapshotId::new("ps-1"),
            reviewers: vec![ReviewerId::new("compliance@enterprise.example")],
            action: DecisionAction::Approve {
                conditions: Vec::new(),
            },
        },
        decided_at: Timestamp::UnixMillis(1_700_000_001_000),
    };
    let response =
        client.post(format!("{base}/v1/spine/decisions")).json(&request).send().unwrap();
    assert_eq!(response.status().as_u16(), 200);
    let result: serde_json::Value = response.json().unwrap();
    assert_eq!(result["decision_kind"], "approve");
    assert_eq!(result["thread_id"], "thread-1");
    let bundle_id = result["proof_bundle_id"].as_str().unwrap().to_string();
    assert_eq!(bundle_id.len(), 64);

    // Fetch the persisted bundle and check the audit contract shape.
    let response = client.get(format!("{base}/v1/proof-bundles/{bundle_id}")).send().unwrap();
    assert_eq!(response.status().as_u16(), 200);
    let bundle: serde_json::Value = response.json().unwrap();
    assert_eq!(bundle["integrity"]["sha256"], bundle_id.as_str());
    let items = bundle["items"].as_array().unwrap();
    assert!(items.iter().any(|item| item["key"] == "verdict_status" && item["value"] == "Approved"));
    assert!(items.iter().all(|item| item["key"] != "note"));

    // Re-validation happens server-side: a blank rationale is a 422 once the
    // thread is decidable again.
    client.get(format!("{base}/v1/threads/thread-1/narrative")).send().unwrap();
    let invalid = DecisionRequest {
        decision: SpineDecision {
            thread_id: ThreadId::new("thread-1"),
            policy_snapshot_id: PolicySnapshotId::new("ps-1"),
            reviewers: vec![ReviewerId::new("compliance@enterprise.example")],
            action: DecisionAction::RequestChanges {
                rationale: " ".to_string(),
            },
        },
        decided_at: Timestamp::UnixMillis(1_700_000_002_000),
    };
    let response =
        client.post(format!("{base}/v1/spine/decisions")).json(&invalid).send().unwrap();
    assert_eq!(response.status().as_u16(), 422);
    let body: serde_json::Value = response.json().unwrap();
    assert_eq!(body["code"], "validation_failed");

    // Unknown bundles map to 404 with the stable code.
    let response =
        client.get(format!("{base}/v1/proof-bundles/does-not-exist")).send().unwrap();
    assert_eq!(response.status().as_u16(), 404);
    let body: serde_json::Value = response.json().unwrap();
    assert_eq!(body["code"], "not_found");

    // A missing narrative maps to 502 fetch failure.
    let response = client.get(format!("{base}/v1/threads/ghost/narrative")).send().unwrap();
    assert_eq!(response.status().as_u16(), 502);
    let body: serde_json::Value = response.json().unwrap();
    assert_eq!(body["code"], "fetch_failed");
}
