// crates/spine-core/src/core/evidence.rs
// ============================================================================
// Module: Spine Evidence Model
// Description: Evidence items, proof bundles, and integrity digests.
// Purpose: Provide the audit-facing bundle shape and its verification surface.
// Dependencies: crate::core::{hashing, identifiers}, serde
// ============================================================================

//! ## Overview
//! A proof bundle is an ordered sequence of non-sensitive key/value facts plus
//! the SHA-256 of their canonical serialization. The serialized shape
//! `{ "items": [{"key", "value"}], "integrity": {"sha256"} }` is the bit-exact
//! contract external auditors rely on; any change to canonicalization is a
//! breaking change.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;

use crate::core::hashing::DEFAULT_HASH_ALGORITHM;
use crate::core::hashing::HashError;
use crate::core::hashing::hash_canonical_json;
use crate::core::identifiers::ProofBundleId;

// ============================================================================
// SECTION: Evidence Values
// ============================================================================

/// Scalar evidence value.
///
/// # Invariants
/// - Evidence values are scalars only; nested structures are not representable.
/// - Integer values should stay within the exact IEEE-double range
///   (±2^53 - 1); RFC 8785 formats numbers as ES6 doubles.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EvidenceScalar {
    /// Boolean value.
    Boolean(bool),
    /// Integer value.
    Integer(i64),
    /// Text value.
    Text(String),
}

impl EvidenceScalar {
    /// Returns the text value when this scalar is textual.
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(value) => Some(value),
            Self::Boolean(_) | Self::Integer(_) => None,
        }
    }
}

impl From<&str> for EvidenceScalar {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for EvidenceScalar {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<i64> for EvidenceScalar {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<bool> for EvidenceScalar {
    fn from(value: bool) -> Self {
        Self::Boolean(value)
    }
}

// ============================================================================
// SECTION: Evidence Items
// ============================================================================

/// One non-sensitive key/value fact extracted for audit purposes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvidenceItem {
    /// Curated evidence key.
    pub key: String,
    /// Scalar evidence value.
    pub value: EvidenceScalar,
}

impl EvidenceItem {
    /// Creates a new evidence item.
    #[must_use]
    pub fn new(key: impl Into<String>, value: impl Into<EvidenceScalar>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

// ============================================================================
// SECTION: Bundle Integrity
// ============================================================================

/// Integrity digest over the canonicalized item sequence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BundleIntegrity {
    /// Lowercase hex SHA-256 of the canonical item serialization (64 chars).
    pub sha256: String,
}

// ============================================================================
// SECTION: Proof Bundle
// ============================================================================

/// Ordered evidence set plus its integrity hash; the audit-facing artifact.
///
/// # Invariants
/// - Immutable once computed; stores never mutate or delete bundles.
/// - `integrity.sha256` is a pure function of the canonicalized items.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProofBundle {
    /// Ordered evidence items.
    pub items: Vec<EvidenceItem>,
    /// Integrity digest over the canonical item sequence.
    pub integrity: BundleIntegrity,
}

impl ProofBundle {
    /// Returns the first item value recorded under `key`, if any.
    #[must_use]
    pub fn find(&self, key: &str) -> Option<&EvidenceScalar> {
        self.items.iter().find(|item| item.key == key).map(|item| &item.value)
    }

    /// Recomputes the integrity digest from the item sequence.
    ///
    /// # Errors
    ///
    /// Returns [`HashError`] when canonical serialization fails.
    pub fn recompute_integrity(&self) -> Result<BundleIntegrity, HashError> {
        let digest = hash_canonical_json(DEFAULT_HASH_ALGORITHM, &self.items)?;
        Ok(BundleIntegrity {
            sha256: digest.value,
        })
    }

    /// Verifies the stored digest against a recomputation over the items.
    ///
    /// # Errors
    ///
    /// Returns [`HashError`] when canonical serialization fails.
    pub fn verify(&self) -> Result<bool, HashError> {
        Ok(self.recompute_integrity()?.sha256 == self.integrity.sha256)
    }

    /// Returns the content-addressed identifier for this bundle.
    #[must_use]
    pub fn bundle_id(&self) -> ProofBundleId {
        ProofBundleId::new(self.integrity.sha256.clone())
    }
}
