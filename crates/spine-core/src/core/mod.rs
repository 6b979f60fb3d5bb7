// crates/spine-core/src/core/mod.rs
// ============================================================================
// Module: Spine Core Types
// Description: Canonical Spine event, verdict, decision, and bundle structures.
// Purpose: Provide stable, serializable types for the decision-attestation pipeline.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! Spine core types define upstream events, verdicts, operator decisions,
//! narratives, telemetry, and the audit-facing proof bundle. These types are
//! the canonical source of truth for any derived API surfaces (HTTP, CLI, or
//! SDKs).

// ============================================================================
// SECTION: Submodules
// ============================================================================

pub mod decision;
pub mod event;
pub mod evidence;
pub mod hashing;
pub mod identifiers;
pub mod narrative;
pub mod telemetry;
pub mod time;
pub mod verdict;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use decision::CanaryConfig;
pub use decision::DecisionAction;
pub use decision::DecisionError;
pub use decision::DecisionKind;
pub use decision::SpineDecision;
pub use decision::SpineDecisionResult;
pub use event::ActionRecord;
pub use event::ActorRef;
pub use event::ToolRef;
pub use event::ToolUsageEvent;
pub use event::UsageContext;
pub use evidence::BundleIntegrity;
pub use evidence::EvidenceItem;
pub use evidence::EvidenceScalar;
pub use evidence::ProofBundle;
pub use hashing::DEFAULT_HASH_ALGORITHM;
pub use hashing::HashAlgorithm;
pub use hashing::HashDigest;
pub use identifiers::AttemptId;
pub use identifiers::EnterpriseId;
pub use identifiers::EventId;
pub use identifiers::PartnerId;
pub use identifiers::PolicySnapshotId;
pub use identifiers::ProofBundleId;
pub use identifiers::ReviewerId;
pub use identifiers::RuleId;
pub use identifiers::TenantId;
pub use identifiers::ThreadId;
pub use identifiers::ToolId;
pub use narrative::Narrative;
pub use narrative::NarrativeFacts;
pub use telemetry::TelemetryEvent;
pub use time::Timestamp;
pub use verdict::Verdict;
pub use verdict::VerdictStatus;
