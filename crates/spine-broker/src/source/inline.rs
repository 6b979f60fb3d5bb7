// crates/spine-broker/src/source/inline.rs
// ============================================================================
// Module: Spine Inline Source
// Description: Fixture-backed narrative source for tests and demos.
// Purpose: Serve pre-registered narratives without I/O.
// Dependencies: spine-core
// ============================================================================

//! ## Overview
//! `InlineNarrativeSource` resolves narratives from an in-memory map. It is
//! deterministic and suited for demos, seeded environments, and tests.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;

use spine_core::FetchError;
use spine_core::Narrative;
use spine_core::NarrativeSource;
use spine_core::ThreadId;

// ============================================================================
// SECTION: Inline Source
// ============================================================================

/// Fixture-backed narrative source.
#[derive(Debug, Clone, Default)]
pub struct InlineNarrativeSource {
    /// Narratives keyed by thread id.
    narratives: BTreeMap<String, Narrative>,
}

impl InlineNarrativeSource {
    /// Creates an empty inline source.
    #[must_use]
    pub fn new() -> Self {
        Self {
            narratives: BTreeMap::new(),
        }
    }

    /// Registers a narrative for a thread, replacing any previous fixture.
    pub fn register(&mut self, thread_id: ThreadId, narrative: Narrative) {
        self.narratives.insert(thread_id.to_string(), narrative);
    }

    /// Returns the number of registered narratives.
    #[must_use]
    pub fn len(&self) -> usize {
        self.narratives.len()
    }

    /// Returns true when no narratives are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.narratives.is_empty()
    }
}

impl NarrativeSource for InlineNarrativeSource {
    fn fetch(&self, thread_id: &ThreadId) -> Result<Narrative, FetchError> {
        self.narratives
            .get(thread_id.as_str())
            .cloned()
            .ok_or_else(|| FetchError::Unavailable(format!("no narrative registered for {thread_id}")))
    }
}
