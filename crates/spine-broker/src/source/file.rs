// crates/spine-broker/src/source/file.rs
// ============================================================================
// Module: Spine File Source
// Description: Directory-backed narrative source.
// Purpose: Read narrative JSON documents from a configured root directory.
// Dependencies: spine-core, serde_json, std
// ============================================================================

//! ## Overview
//! `FileNarrativeSource` resolves `<root>/<thread_id>.json` documents into
//! narratives. Thread ids are untrusted input: ids containing path separators
//! or parent components are refused, and oversized documents fail closed.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;

use spine_core::FetchError;
use spine_core::Narrative;
use spine_core::NarrativeSource;
use spine_core::ThreadId;

use crate::source::MAX_NARRATIVE_BYTES;

// ============================================================================
// SECTION: File Source
// ============================================================================

/// Directory-backed narrative source.
#[derive(Debug, Clone)]
pub struct FileNarrativeSource {
    /// Root directory holding narrative documents.
    root: PathBuf,
    /// Maximum accepted document size in bytes.
    max_bytes: usize,
}

impl FileNarrativeSource {
    /// Creates a file source rooted at the provided directory.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            max_bytes: MAX_NARRATIVE_BYTES,
        }
    }

    /// Creates a file source with an explicit size limit.
    #[must_use]
    pub fn with_max_bytes(root: impl Into<PathBuf>, max_bytes: usize) -> Self {
        Self {
            root: root.into(),
            max_bytes,
        }
    }

    /// Resolves the document path for a thread id, refusing traversal.
    fn resolve_path(&self, thread_id: &ThreadId) -> Result<PathBuf, FetchError> {
        let id = thread_id.as_str();
        let safe = !id.is_empty()
            && id.chars().all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
            && !id.contains("..");
        if !safe {
            return Err(FetchError::Invalid(format!(
                "thread id is not a safe file name: {id}"
            )));
        }
        Ok(self.root.join(format!("{id}.json")))
    }
}

impl NarrativeSource for FileNarrativeSource {
    fn fetch(&self, thread_id: &ThreadId) -> Result<Narrative, FetchError> {
        let path = self.resolve_path(thread_id)?;
        let metadata = fs::metadata(&path).map_err(|err| {
            if err.kind() == ErrorKind::NotFound {
                FetchError::Unavailable(format!("no narrative document for {thread_id}"))
            } else {
                FetchError::Unavailable(err.to_string())
            }
        })?;
        if metadata.len() > self.max_bytes as u64 {
            return Err(FetchError::Invalid(format!(
                "narrative document exceeds size limit: {} bytes (max {})",
                metadata.len(),
                self.max_bytes
            )));
        }
        let bytes = fs::read(&path).map_err(|err| FetchError::Unavailable(err.to_string()))?;
        serde_json::from_slice(&bytes).map_err(|err| FetchError::Invalid(err.to_string()))
    }
}
