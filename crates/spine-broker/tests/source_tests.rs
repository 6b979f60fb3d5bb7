// crates/spine-broker/tests/source_tests.rs
// ============================================================================
// Module: Narrative Source Tests
// Description: Tests for inline, file, and HTTP narrative sources.
// Purpose: Validate fixture resolution, traversal refusal, and fail-closed limits.
// Dependencies: spine-broker, spine-core, tempfile, tiny_http
// ============================================================================
//! ## Overview
//! Exercises each reference narrative source against well-formed, missing,
//! malformed, and hostile inputs.

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
use std::thread;

use spine_broker::FileNarrativeSource;
use spine_broker::HttpNarrativeSource;
use spine_broker::InlineNarrativeSource;
use spine_core::ActionRecord;
use spine_core::ActorRef;
use spine_core::EventId;
use spine_core::FetchError;
use spine_core::Narrative;
use spine_core::NarrativeFacts;
use spine_core::NarrativeSource;
use spine_core::PolicySnapshotId;
use spine_core::RuleId;
use spine_core::TenantId;
use spine_core::ThreadId;
use spine_core::Timestamp;
use spine_core::ToolId;
use spine_core::ToolRef;
use spine_core::ToolUsageEvent;
use spine_core::UsageContext;
use spine_core::Verdict;
use spine_core::VerdictStatus;

/// Builds a small narrative fixture.
fn sample_narrative() -> Narrative {
    Narrative {
        facts: NarrativeFacts {
            policy_snapshot_id: PolicySnapshotId::new("ps-1"),
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
                    note: None,
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
                occurred_at: Timestamp::Logical(1),
            },
            verdict: Verdict {
                status: VerdictStatus::RequiresReview,
                reason: "missing watermark configuration".to_string(),
                rule_id: RuleId::new("R1-WATERMARK"),
                policy_snapshot_id: PolicySnapshotId::new("ps-1"),
            },
            case_title: None,
        },
        proof_bundle_id: None,
    }
}

// ============================================================================
// SECTION: Inline Source
// ============================================================================

/// Registered narratives resolve; unregistered threads fail closed.
#[test]
fn inline_source_resolves_registered_threads() {
    let mut source = InlineNarrativeSource::new();
    source.register(ThreadId::new("thread-1"), sample_narrative());

    let narrative = source.fetch(&ThreadId::new("thread-1")).unwrap();
    assert_eq!(narrative.facts.policy_snapshot_id.as_str(), "ps-1");

    let err = source.fetch(&ThreadId::new("thread-2")).unwrap_err();
    assert!(matches!(err, FetchError::Unavailable(_)));
}

// ============================================================================
// SECTION: File Source
// ============================================================================

/// Narrative documents round-trip through the directory source.
#[test]
fn file_source_reads_narrative_documents() {
    let dir = tempfile::tempdir().unwrap();
    let narrative = sample_narrative();
    fs::write(
        dir.path().join("thread-1.json"),
        serde_json::to_vec(&narrative).unwrap(),
    )
    .unwrap();

    let source = FileNarrativeSource::new(dir.path());
    let loaded = source.fetch(&ThreadId::new("thread-1")).unwrap();
    assert_eq!(loaded, narrative);
}

/// A missing document is unavailable, not invalid.
#[test]
fn file_source_reports_missing_documents() {
    let dir = tempfile::tempdir().unwrap();
    let source = FileNarrativeSource::new(dir.path());
    let err = source.fetch(&ThreadId::new("thread-1")).unwrap_err();
    assert!(matches!(err, FetchError::Unavailable(_)));
}

/// Thread ids with path separators or parent components are refused.
#[test]
fn file_source_refuses_traversal_thread_ids() {
    let dir = tempfile::tempdir().unwrap();
    let source = FileNarrativeSource::new(dir.path());

    for hostile in ["../secrets", "a/b", "a\\b", ""] {
        let err = source.fetch(&ThreadId::new(hostile)).unwrap_err();
        assert!(matches!(err, FetchError::Invalid(_)), "accepted hostile id {hostile:?}");
    }
}

/// Malformed documents fail closed as invalid.
#[test]
fn file_source_rejects_malformed_documents() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("thread-1.json"), b"{not json").unwrap();

    let source = FileNarrativeSource::new(dir.path());
    let err = source.fetch(&ThreadId::new("thread-1")).unwrap_err();
    assert!(matches!(err, FetchError::Invalid(_)));
}

/// Oversized documents fail closed before parsing.
#[test]
fn file_source_enforces_size_limit() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("thread-1.json"), vec![b' '; 64]).unwrap();

    let source = FileNarrativeSource::with_max_bytes(dir.path(), 16);
    let err = source.fetch(&ThreadId::new("thread-1")).unwrap_err();
    assert!(matches!(err, FetchError::Invalid(_)));
}

// ============================================================================
// SECTION: HTTP Source
// ============================================================================

/// Starts a one-shot HTTP server returning the given body and status.
fn serve_once(body: Vec<u8>, status: u16) -> String {
    let server = tiny_http::Server::http("127.0.0.1:0").unwrap();
    let port = server.server_addr().to_ip().unwrap().port();
    thread::spawn(move || {
        if let Ok(request) = server.recv() {
            let response = tiny_http::Response::from_data(body)
                .with_status_code(tiny_http::StatusCode(status));
            let _ = request.respond(response);
        }
    });
    format!("http://127.0.0.1:{port}/")
}

/// A healthy upstream resolves the narrative.
#[test]
fn http_source_fetches_narrative() {
    let narrative = sample_narrative();
    let base = serve_once(serde_json::to_vec(&narrative).unwrap(), 200);

    let source = HttpNarrativeSource::new(&base).unwrap();
    let loaded = source.fetch(&ThreadId::new("thread-1")).unwrap();
    assert_eq!(loaded, narrative);
}

/// Non-success status codes fail closed as unavailable.
#[test]
fn http_source_reports_upstream_failure() {
    let base = serve_once(b"backend offline".to_vec(), 503);

    let source = HttpNarrativeSource::new(&base).unwrap();
    let err = source.fetch(&ThreadId::new("thread-1")).unwrap_err();
    assert!(matches!(err, FetchError::Unavailable(_)));
}

/// Malformed upstream payloads fail closed as invalid.
#[test]
fn http_source_rejects_malformed_payloads() {
    let base = serve_once(b"{not json".to_vec(), 200);

    let source = HttpNarrativeSource::new(&base).unwrap();
    let err = source.fetch(&ThreadId::new("thread-1")).unwrap_err();
    assert!(matches!(err, FetchError::Invalid(_)));
}

/// Unsupported base URL schemes are refused at construction.
#[test]
fn http_source_rejects_unsupported_schemes() {
    let err = HttpNarrativeSource::new("ftp://example.invalid/").unwrap_err();
    assert!(matches!(err, FetchError::Invalid(_)));
}
