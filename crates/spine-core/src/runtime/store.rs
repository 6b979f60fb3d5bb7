// crates/spine-core/src/runtime/store.rs
// ============================================================================
// Module: Spine In-Memory Store
// Description: Simple in-memory proof bundle store for tests and examples.
// Purpose: Provide a deterministic store implementation without external deps.
// Dependencies: crate::core, crate::interfaces
// ============================================================================

//! ## Overview
//! This module provides a simple in-memory implementation of
//! [`ProofBundleStore`] for tests and local demos. It is append-only and
//! content-addressed like the durable stores, but not intended for
//! production use.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::Mutex;

use crate::core::AttemptId;
use crate::core::ProofBundle;
use crate::core::ProofBundleId;
use crate::interfaces::ProofBundleStore;
use crate::interfaces::StoreError;

// ============================================================================
// SECTION: In-Memory Store
// ============================================================================

/// In-memory proof bundle store for tests and examples.
#[derive(Debug, Default, Clone)]
pub struct InMemoryProofBundleStore {
    /// Bundle map keyed by content-addressed id, protected by a mutex.
    bundles: Arc<Mutex<BTreeMap<String, ProofBundle>>>,
    /// Attempt dedup map from attempt id to bundle id, protected by a mutex.
    attempts: Arc<Mutex<BTreeMap<String, String>>>,
}

impl InMemoryProofBundleStore {
    /// Creates a new in-memory proof bundle store.
    #[must_use]
    pub fn new() -> Self {
        Self {
            bundles: Arc::new(Mutex::new(BTreeMap::new())),
            attempts: Arc::new(Mutex::new(BTreeMap::new())),
        }
    }

    /// Returns the number of stored bundles.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Store`] when the store mutex is poisoned.
    pub fn len(&self) -> Result<usize, StoreError> {
        let guard = self
            .bundles
            .lock()
            .map_err(|_| StoreError::Store("proof bundle store mutex poisoned".to_string()))?;
        Ok(guard.len())
    }

    /// Returns true when the store holds no bundles.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Store`] when the store mutex is poisoned.
    pub fn is_empty(&self) -> Result<bool, StoreError> {
        Ok(self.len()? == 0)
    }
}

impl ProofBundleStore for InMemoryProofBundleStore {
    fn put(
        &self,
        bundle: &ProofBundle,
        attempt_id: &AttemptId,
    ) -> Result<ProofBundleId, StoreError> {
        // Fail closed on tampered input: the stored key must be provable
        // against the items it addresses.
        let verified = bundle.verify().map_err(|err| StoreError::Invalid(err.to_string()))?;
        if !verified {
            return Err(StoreError::Invalid(
                "bundle integrity digest does not match its items".to_string(),
            ));
        }
        let bundle_id = bundle.bundle_id();

        let mut attempts = self
            .attempts
            .lock()
            .map_err(|_| StoreError::Store("proof bundle store mutex poisoned".to_string()))?;
        if let Some(existing) = attempts.get(attempt_id.as_str())
            && existing != bundle_id.as_str()
        {
            return Err(StoreError::Conflict(format!(
                "attempt {attempt_id} already recorded bundle {existing}"
            )));
        }
        attempts.insert(attempt_id.to_string(), bundle_id.to_string());
        drop(attempts);

        let mut bundles = self
            .bundles
            .lock()
            .map_err(|_| StoreError::Store("proof bundle store mutex poisoned".to_string()))?;
        bundles.entry(bundle_id.to_string()).or_insert_with(|| bundle.clone());
        drop(bundles);
        Ok(bundle_id)
    }

    fn get(&self, id: &ProofBundleId) -> Result<Option<ProofBundle>, StoreError> {
        let guard = self
            .bundles
            .lock()
            .map_err(|_| StoreError::Store("proof bundle store mutex poisoned".to_string()))?;
        Ok(guard.get(id.as_str()).cloned())
    }
}

// ============================================================================
// SECTION: Shared Store Wrapper
// ============================================================================

/// Shared proof bundle store backed by an `Arc` trait object.
#[derive(Clone)]
pub struct SharedProofBundleStore {
    /// Inner store implementation.
    inner: Arc<dyn ProofBundleStore + Send + Sync>,
}

impl SharedProofBundleStore {
    /// Wraps a proof bundle store in a shared, clonable wrapper.
    #[must_use]
    pub fn from_store(store: impl ProofBundleStore + Send + Sync + 'static) -> Self {
        Self {
            inner: Arc::new(store),
        }
    }

    /// Wraps an existing shared store.
    #[must_use]
    pub const fn new(store: Arc<dyn ProofBundleStore + Send + Sync>) -> Self {
        Self {
            inner: store,
        }
    }
}

impl ProofBundleStore for SharedProofBundleStore {
    fn put(
        &self,
        bundle: &ProofBundle,
        attempt_id: &AttemptId,
    ) -> Result<ProofBundleId, StoreError> {
        self.inner.put(bundle, attempt_id)
    }

    fn get(&self, id: &ProofBundleId) -> Result<Option<ProofBundle>, StoreError> {
        self.inner.get(id)
    }
}
