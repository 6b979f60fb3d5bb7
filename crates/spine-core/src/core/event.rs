// crates/spine-core/src/core/event.rs
// ============================================================================
// Module: Spine Tool Usage Events
// Description: Upstream records of governed AI tool usage.
// Purpose: Provide the read-only event shape consumed by the evidence compiler.
// Dependencies: crate::core::{identifiers, time}, serde
// ============================================================================

//! ## Overview
//! Tool usage events are produced upstream by the governance platform and
//! consumed read-only by Spine. Free-text fields (`action.note`) are content
//! and are never eligible for inclusion in evidence; the compiler reads only
//! the curated fields.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;

use crate::core::identifiers::EnterpriseId;
use crate::core::identifiers::EventId;
use crate::core::identifiers::PartnerId;
use crate::core::identifiers::PolicySnapshotId;
use crate::core::identifiers::TenantId;
use crate::core::identifiers::ToolId;
use crate::core::time::Timestamp;

// ============================================================================
// SECTION: Event Components
// ============================================================================

/// Named, versioned tool referenced by a usage event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolRef {
    /// Tool identifier.
    pub tool_id: ToolId,
    /// Tool display name.
    pub name: String,
    /// Tool version string.
    pub version: String,
}

/// Actor attribution for a usage event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActorRef {
    /// Role of the acting identity (reviewer, researcher, agent, ...).
    pub role: String,
}

/// Action performed with the tool.
///
/// # Invariants
/// - `note` is free-text content and must never appear in evidence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionRecord {
    /// Curated action type label.
    pub action_type: String,
    /// Optional free-text note. Content; excluded from evidence.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

/// Governed context in which the tool was used.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UsageContext {
    /// Tenant identifier.
    pub tenant_id: TenantId,
    /// Optional enterprise identifier.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enterprise_id: Option<EnterpriseId>,
    /// Optional partner (agency) identifier.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub partner_id: Option<PartnerId>,
    /// Optional brand label.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub brand: Option<String>,
    /// Optional region label.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
    /// Optional channel label.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub channel: Option<String>,
    /// Policy snapshot the event was observed under.
    pub policy_snapshot_id: PolicySnapshotId,
}

// ============================================================================
// SECTION: Tool Usage Event
// ============================================================================

/// Record of an actor using a named, versioned tool within a governed context.
///
/// # Invariants
/// - Produced upstream and consumed read-only; Spine never mutates events.
/// - `occurred_at` is explicit caller-supplied time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolUsageEvent {
    /// Event identifier.
    pub event_id: EventId,
    /// Tool reference.
    pub tool: ToolRef,
    /// Actor attribution.
    pub actor: ActorRef,
    /// Action performed.
    pub action: ActionRecord,
    /// Governed context.
    pub context: UsageContext,
    /// Time the usage occurred.
    pub occurred_at: Timestamp,
}
