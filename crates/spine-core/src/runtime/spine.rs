// crates/spine-core/src/runtime/spine.rs
// ============================================================================
// Module: Spine Decision Engine
// Description: Per-thread decision state machine with attestation and telemetry.
// Purpose: Orchestrate narrative load, decision validation, evidence compilation, and persistence.
// Dependencies: crate::{core, interfaces, runtime::compiler}
// ============================================================================

//! ## Overview
//! The engine is the single canonical execution path for decisions. All API
//! surfaces (HTTP, CLI) must call into these methods so validation, snapshot
//! binding, and the at-most-one-in-flight invariant hold everywhere.
//!
//! Threads move `Idle → Loading → Ready → Deciding → {Attested | Error}`;
//! `Error` may return to `Loading` on retry, and `Attested` is terminal for
//! that decision instance. Every narrative load carries a per-thread
//! generation token: a fetch that resolves after the thread moved on is
//! discarded instead of applied.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::sync::Mutex;
use std::sync::MutexGuard;

use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

use crate::core::AttemptId;
use crate::core::DecisionAction;
use crate::core::EvidenceScalar;
use crate::core::Narrative;
use crate::core::PolicySnapshotId;
use crate::core::ProofBundle;
use crate::core::ProofBundleId;
use crate::core::ReviewerId;
use crate::core::SpineDecision;
use crate::core::SpineDecisionResult;
use crate::core::TelemetryEvent;
use crate::core::ThreadId;
use crate::core::Timestamp;
use crate::core::hashing::DEFAULT_HASH_ALGORITHM;
use crate::core::hashing::hash_canonical_json;
use crate::interfaces::NarrativeSource;
use crate::interfaces::ProofBundleStore;
use crate::interfaces::TelemetrySink;
use crate::runtime::compiler::CompileError;
use crate::runtime::compiler::compile;

// ============================================================================
// SECTION: Thread State
// ============================================================================

/// Observable thread lifecycle state.
///
/// # Invariants
/// - Variants are stable for serialization and contract matching.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ThreadState {
    /// No session exists for the thread.
    Idle,
    /// A narrative fetch is in flight.
    Loading,
    /// The narrative is loaded and a decision may be submitted.
    Ready,
    /// A decision submission is in flight.
    Deciding,
    /// A decision was attested; terminal for this decision instance.
    Attested,
    /// The last operation failed; the thread may be retried.
    Error,
}

/// Internal per-thread session phase.
#[derive(Debug, Clone)]
enum ThreadPhase {
    /// A narrative fetch is in flight.
    Loading,
    /// The narrative is loaded.
    Ready {
        /// Loaded narrative for the thread.
        narrative: Box<Narrative>,
    },
    /// A decision submission is in flight.
    Deciding {
        /// Attempt identifier for the in-flight submission.
        attempt_id: AttemptId,
    },
    /// A decision was attested.
    Attested {
        /// Attestation result for the decision.
        result: SpineDecisionResult,
    },
    /// The last operation failed.
    Error {
        /// Human-readable failure message.
        message: String,
    },
}

impl ThreadPhase {
    /// Returns the observable state label for this phase.
    const fn state(&self) -> ThreadState {
        match self {
            Self::Loading => ThreadState::Loading,
            Self::Ready {
                ..
            } => ThreadState::Ready,
            Self::Deciding {
                ..
            } => ThreadState::Deciding,
            Self::Attested {
                ..
            } => ThreadState::Attested,
            Self::Error {
                ..
            } => ThreadState::Error,
        }
    }
}

/// Per-thread session with a staleness generation token.
#[derive(Debug, Clone)]
struct ThreadSession {
    /// Generation counter; bumped on every load and on abandonment.
    generation: u64,
    /// Current lifecycle phase.
    phase: ThreadPhase,
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Spine engine errors.
#[derive(Debug, Error)]
pub enum SpineError {
    /// Narrative fetch failed; the thread is retryable.
    #[error("narrative fetch failed: {0}")]
    FetchFailed(String),
    /// Decision failed local validation; nothing was sent to the store.
    #[error("decision validation failed: {0}")]
    ValidationFailed(String),
    /// Snapshot identifiers disagree; no bundle is produced.
    #[error("policy binding mismatch: decision references {found}, bound snapshot is {expected}")]
    PolicyBindingMismatch {
        /// Snapshot the decision had to bind to.
        expected: PolicySnapshotId,
        /// Snapshot the decision actually referenced.
        found: PolicySnapshotId,
    },
    /// Proof bundle persistence failed; retry reuses the same attempt id.
    #[error("proof bundle persistence failed: {0}")]
    PersistenceFailed(String),
    /// Bundle identifier is unknown.
    #[error("proof bundle not found: {0}")]
    NotFound(String),
    /// A decision is already in flight for the thread.
    #[error("decision already in flight for thread: {0}")]
    DecisionInFlight(String),
    /// The thread is not in a state that accepts this operation.
    #[error("thread is not ready: {0}")]
    ThreadNotReady(String),
    /// A narrative fetch resolved for a superseded load and was discarded.
    #[error("stale narrative load discarded for thread: {0}")]
    StaleLoad(String),
    /// Engine state bookkeeping failed (lock poisoned or canonicalization).
    #[error("spine internal error: {0}")]
    Internal(String),
}

// ============================================================================
// SECTION: Engine
// ============================================================================

/// Decision engine with injected narrative source, bundle store, and telemetry.
pub struct Spine<N, S, T> {
    /// Narrative source implementation.
    narrative: N,
    /// Proof bundle store implementation.
    store: S,
    /// Telemetry sink implementation.
    telemetry: T,
    /// Per-thread sessions keyed by thread id.
    threads: Mutex<BTreeMap<String, ThreadSession>>,
}

impl<N, S, T> Spine<N, S, T>
where
    N: NarrativeSource,
    S: ProofBundleStore,
    T: TelemetrySink,
{
    /// Creates a new engine from its collaborators.
    pub fn new(narrative: N, store: S, telemetry: T) -> Self {
        Self {
            narrative,
            store,
            telemetry,
            threads: Mutex::new(BTreeMap::new()),
        }
    }

    /// Opens a thread: fetches its narrative and enters `Ready`.
    ///
    /// The fetch runs outside the session lock. If the thread was abandoned
    /// or re-opened while the fetch was in flight, the resolved narrative is
    /// discarded and [`SpineError::StaleLoad`] is returned.
    ///
    /// # Errors
    ///
    /// Returns [`SpineError::DecisionInFlight`] while a submission is
    /// pending, [`SpineError::FetchFailed`] when the source fails, and
    /// [`SpineError::StaleLoad`] when the load was superseded.
    pub fn open_thread(&self, thread_id: &ThreadId) -> Result<Narrative, SpineError> {
        let generation = {
            let mut guard = self.lock_threads()?;
            let session =
                guard.entry(thread_id.to_string()).or_insert_with(|| ThreadSession {
                    generation: 0,
                    phase: ThreadPhase::Loading,
                });
            if matches!(session.phase, ThreadPhase::Deciding { .. }) {
                return Err(SpineError::DecisionInFlight(thread_id.to_string()));
            }
            session.generation += 1;
            session.phase = ThreadPhase::Loading;
            session.generation
        };

        let fetched = self.narrative.fetch(thread_id);

        let mut guard = self.lock_threads()?;
        let Some(session) = guard.get_mut(thread_id.as_str()) else {
            return Err(SpineError::StaleLoad(thread_id.to_string()));
        };
        if session.generation != generation {
            return Err(SpineError::StaleLoad(thread_id.to_string()));
        }
        match fetched {
            Ok(narrative) => {
                session.phase = ThreadPhase::Ready {
                    narrative: Box::new(narrative.clone()),
                };
                drop(guard);
                self.telemetry.emit(&TelemetryEvent::SpineOpened {
                    thread_id: thread_id.clone(),
                    policy_snapshot_id: narrative.facts.policy_snapshot_id.clone(),
                });
                Ok(narrative)
            }
            Err(err) => {
                session.phase = ThreadPhase::Error {
                    message: err.to_string(),
                };
                Err(SpineError::FetchFailed(err.to_string()))
            }
        }
    }

    /// Retries the narrative fetch for a thread currently in `Error`.
    ///
    /// # Errors
    ///
    /// Returns [`SpineError::ThreadNotReady`] when the thread is not in
    /// `Error`; otherwise behaves like [`Spine::open_thread`].
    pub fn retry_thread(&self, thread_id: &ThreadId) -> Result<Narrative, SpineError> {
        {
            let guard = self.lock_threads()?;
            let phase = guard.get(thread_id.as_str()).map(|session| session.phase.state());
            if phase != Some(ThreadState::Error) {
                return Err(SpineError::ThreadNotReady(thread_id.to_string()));
            }
        }
        self.open_thread(thread_id)
    }

    /// Abandons a thread, discarding its session.
    ///
    /// Any in-flight narrative fetch for the thread resolves stale and is
    /// discarded instead of applied.
    pub fn abandon_thread(&self, thread_id: &ThreadId) {
        if let Ok(mut guard) = self.threads.lock() {
            guard.remove(thread_id.as_str());
        }
    }

    /// Submits a decision for a `Ready` thread and attests it.
    ///
    /// Validation failures leave the thread `Ready` and never reach the
    /// store. A snapshot mismatch, compilation failure, or persistence
    /// failure moves the thread to `Error`; the thread becomes decidable
    /// again after a successful retry of the narrative load. The attempt
    /// identifier is the canonical hash of the decision, so an identical
    /// retried submission deduplicates server-side.
    ///
    /// # Errors
    ///
    /// Returns [`SpineError::ThreadNotReady`], [`SpineError::DecisionInFlight`],
    /// [`SpineError::ValidationFailed`], [`SpineError::PolicyBindingMismatch`],
    /// or [`SpineError::PersistenceFailed`] per the failure taxonomy.
    pub fn submit_decision(
        &self,
        decision: &SpineDecision,
        decided_at: Timestamp,
    ) -> Result<SpineDecisionResult, SpineError> {
        let attempt_id = attempt_id_for(decision)?;
        let narrative = {
            let mut guard = self.lock_threads()?;
            let Some(session) = guard.get_mut(decision.thread_id.as_str()) else {
                return Err(SpineError::ThreadNotReady(decision.thread_id.to_string()));
            };
            let narrative = match &session.phase {
                ThreadPhase::Deciding {
                    ..
                } => return Err(SpineError::DecisionInFlight(decision.thread_id.to_string())),
                ThreadPhase::Ready {
                    narrative,
                } => narrative.as_ref().clone(),
                ThreadPhase::Loading
                | ThreadPhase::Attested {
                    ..
                }
                | ThreadPhase::Error {
                    ..
                } => return Err(SpineError::ThreadNotReady(decision.thread_id.to_string())),
            };

            // Local validation: rejected submissions leave the phase untouched.
            decision
                .validate()
                .map_err(|err| SpineError::ValidationFailed(err.to_string()))?;

            if decision.policy_snapshot_id != narrative.facts.policy_snapshot_id {
                let err = SpineError::PolicyBindingMismatch {
                    expected: narrative.facts.policy_snapshot_id.clone(),
                    found: decision.policy_snapshot_id.clone(),
                };
                session.phase = ThreadPhase::Error {
                    message: err.to_string(),
                };
                return Err(err);
            }

            session.phase = ThreadPhase::Deciding {
                attempt_id: attempt_id.clone(),
            };
            narrative
        };

        let extra = decision_extras(decision, &attempt_id, decided_at);
        let bundle = match compile(&narrative.facts.event, &narrative.facts.verdict, &extra) {
            Ok(bundle) => bundle,
            Err(err) => {
                let spine_err = match err {
                    CompileError::PolicyBindingMismatch {
                        event_snapshot,
                        verdict_snapshot,
                    } => SpineError::PolicyBindingMismatch {
                        expected: event_snapshot,
                        found: verdict_snapshot,
                    },
                    CompileError::Canonicalization(hash_err) => {
                        SpineError::Internal(hash_err.to_string())
                    }
                };
                self.fail_thread(&decision.thread_id, &spine_err.to_string())?;
                return Err(spine_err);
            }
        };

        let bundle_id = match self.store.put(&bundle, &attempt_id) {
            Ok(bundle_id) => bundle_id,
            Err(err) => {
                let spine_err = SpineError::PersistenceFailed(err.to_string());
                self.fail_thread(&decision.thread_id, &spine_err.to_string())?;
                return Err(spine_err);
            }
        };

        let result = SpineDecisionResult {
            proof_bundle_id: bundle_id.clone(),
            decision_kind: decision.kind(),
            policy_snapshot_id: decision.policy_snapshot_id.clone(),
            thread_id: decision.thread_id.clone(),
        };

        {
            let mut guard = self.lock_threads()?;
            if let Some(session) = guard.get_mut(decision.thread_id.as_str())
                && matches!(&session.phase, ThreadPhase::Deciding { attempt_id: current } if *current == attempt_id)
            {
                session.phase = ThreadPhase::Attested {
                    result: result.clone(),
                };
            }
        }

        self.telemetry.emit(&TelemetryEvent::SpineAttested {
            thread_id: decision.thread_id.clone(),
            policy_snapshot_id: decision.policy_snapshot_id.clone(),
            bundle_id,
            decision_kind: decision.kind(),
        });
        Ok(result)
    }

    /// Loads a persisted proof bundle for audit display.
    ///
    /// # Errors
    ///
    /// Returns [`SpineError::NotFound`] for an unknown identifier and
    /// [`SpineError::PersistenceFailed`] when the store fails.
    pub fn open_proof(&self, bundle_id: &ProofBundleId) -> Result<ProofBundle, SpineError> {
        let bundle = self
            .store
            .get(bundle_id)
            .map_err(|err| SpineError::PersistenceFailed(err.to_string()))?
            .ok_or_else(|| SpineError::NotFound(bundle_id.to_string()))?;
        self.telemetry.emit(&TelemetryEvent::SpineProofOpened {
            bundle_id: bundle_id.clone(),
            thread_id: bundle
                .find("thread_id")
                .and_then(EvidenceScalar::as_text)
                .map(ThreadId::new),
            policy_snapshot_id: bundle
                .find("policy_snapshot_id")
                .and_then(EvidenceScalar::as_text)
                .map(PolicySnapshotId::new),
        });
        Ok(bundle)
    }

    /// Returns the observable state of a thread.
    ///
    /// # Errors
    ///
    /// Returns [`SpineError::Internal`] when the session lock is poisoned.
    pub fn thread_state(&self, thread_id: &ThreadId) -> Result<ThreadState, SpineError> {
        let guard = self.lock_threads()?;
        Ok(guard
            .get(thread_id.as_str())
            .map_or(ThreadState::Idle, |session| session.phase.state()))
    }

    /// Returns the attestation result for a thread in `Attested`.
    ///
    /// # Errors
    ///
    /// Returns [`SpineError::Internal`] when the session lock is poisoned.
    pub fn attested_result(
        &self,
        thread_id: &ThreadId,
    ) -> Result<Option<SpineDecisionResult>, SpineError> {
        let guard = self.lock_threads()?;
        Ok(guard.get(thread_id.as_str()).and_then(|session| match &session.phase {
            ThreadPhase::Attested {
                result,
            } => Some(result.clone()),
            _ => None,
        }))
    }

    /// Returns the surfaced failure message for a thread in `Error`.
    ///
    /// # Errors
    ///
    /// Returns [`SpineError::Internal`] when the session lock is poisoned.
    pub fn error_message(&self, thread_id: &ThreadId) -> Result<Option<String>, SpineError> {
        let guard = self.lock_threads()?;
        Ok(guard.get(thread_id.as_str()).and_then(|session| match &session.phase {
            ThreadPhase::Error {
                message,
            } => Some(message.clone()),
            _ => None,
        }))
    }

    /// Moves a thread to `Error` with the provided message.
    fn fail_thread(&self, thread_id: &ThreadId, message: &str) -> Result<(), SpineError> {
        let mut guard = self.lock_threads()?;
        if let Some(session) = guard.get_mut(thread_id.as_str()) {
            session.phase = ThreadPhase::Error {
                message: message.to_string(),
            };
        }
        Ok(())
    }

    /// Locks the session map, mapping poisoning to an internal error.
    fn lock_threads(&self) -> Result<MutexGuard<'_, BTreeMap<String, ThreadSession>>, SpineError> {
        self.threads
            .lock()
            .map_err(|_| SpineError::Internal("thread session mutex poisoned".to_string()))
    }
}

// ============================================================================
// SECTION: Helper Functions
// ============================================================================

/// Derives the stable attempt identifier for a decision.
///
/// The attempt id is the canonical-JSON SHA-256 of the decision itself, so an
/// identical retried submission reuses the same id and deduplicates in the
/// store, while distinct decisions can never collide in practice.
fn attempt_id_for(decision: &SpineDecision) -> Result<AttemptId, SpineError> {
    hash_canonical_json(DEFAULT_HASH_ALGORITHM, decision)
        .map(|digest| AttemptId::new(digest.value))
        .map_err(|err| SpineError::Internal(err.to_string()))
}

/// Builds the curated extra evidence entries for a decision.
///
/// Rationales and approval-condition text are content and never included;
/// reviewer identities are sorted so submission order cannot affect the hash.
fn decision_extras(
    decision: &SpineDecision,
    attempt_id: &AttemptId,
    decided_at: Timestamp,
) -> BTreeMap<String, EvidenceScalar> {
    let mut extra = BTreeMap::new();
    extra.insert("decision_kind".to_string(), EvidenceScalar::from(decision.kind().as_str()));
    extra.insert("thread_id".to_string(), EvidenceScalar::from(decision.thread_id.as_str()));
    extra.insert("decision_attempt_id".to_string(), EvidenceScalar::from(attempt_id.as_str()));
    extra.insert("decided_at".to_string(), EvidenceScalar::from(decided_at.to_string()));
    let mut reviewers: Vec<&str> = decision.reviewers.iter().map(ReviewerId::as_str).collect();
    reviewers.sort_unstable();
    extra.insert("reviewers".to_string(), EvidenceScalar::from(reviewers.join(",")));
    match &decision.action {
        DecisionAction::Escalate {
            escalate_to,
            ..
        } => {
            extra.insert("escalate_to".to_string(), EvidenceScalar::from(escalate_to.as_str()));
        }
        DecisionAction::StartCanary {
            canary: Some(canary),
        } => {
            extra.insert(
                "canary_cohort_percent".to_string(),
                EvidenceScalar::Integer(i64::from(canary.cohort_percent)),
            );
            extra.insert(
                "canary_duration_days".to_string(),
                EvidenceScalar::Integer(i64::from(canary.duration_days)),
            );
        }
        DecisionAction::Approve {
            ..
        }
        | DecisionAction::StartCanary {
            canary: None,
        } => {}
    }
    extra
}
