// crates/spine-core/tests/hashing.rs
// ============================================================================
// Module: Hashing Tests
// Description: Tests for canonical JSON hashing.
// ============================================================================
//! ## Overview
//! Validates deterministic hashing using RFC 8785 canonicalization.

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

use serde_json::json;
use spine_core::hashing::DEFAULT_HASH_ALGORITHM;
use spine_core::hashing::hash_bytes;
use spine_core::hashing::hash_canonical_json;

// ============================================================================
// SECTION: Canonical Hashing
// ============================================================================

/// Tests canonical json hash is stable across key order.
#[test]
fn test_canonical_json_hash_is_stable() {
    let value_a = json!({"b": 1, "a": 2});
    let value_b = json!({"a": 2, "b": 1});

    let hash_a = hash_canonical_json(DEFAULT_HASH_ALGORITHM, &value_a).unwrap();
    let hash_b = hash_canonical_json(DEFAULT_HASH_ALGORITHM, &value_b).unwrap();

    assert_eq!(hash_a, hash_b);
}

/// Tests canonical json hash preserves array order.
#[test]
fn test_canonical_json_hash_respects_array_order() {
    let value_a = json!([{"key": "a"}, {"key": "b"}]);
    let value_b = json!([{"key": "b"}, {"key": "a"}]);

    let hash_a = hash_canonical_json(DEFAULT_HASH_ALGORITHM, &value_a).unwrap();
    let hash_b = hash_canonical_json(DEFAULT_HASH_ALGORITHM, &value_b).unwrap();

    assert_ne!(hash_a, hash_b);
}

/// Tests byte hashing yields lowercase 64-char hex.
#[test]
fn test_hash_bytes_is_lowercase_hex() {
    let digest = hash_bytes(DEFAULT_HASH_ALGORITHM, b"spine");
    assert_eq!(digest.value.len(), 64);
    assert!(digest.value.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
}
