//! Assertion functions for comparing pipeline and collection outputs.

use crate::key::Key;
use indexmap::IndexMap;
use std::collections::HashSet;
use std::fmt::Debug;
use std::hash::Hash;

fn require_same_len<T: Debug>(actual: &[T], expected: &[T]) {
    if actual.len() != expected.len() {
        panic!(
            "collection length mismatch: expected {} elements, got {}\n  expected: {expected:?}\n  actual:   {actual:?}",
            expected.len(),
            actual.len()
        );
    }
}

/// Assert that two collections are equal in order and content.
///
/// # Panics
///
/// Panics with a detailed message if the collections differ in length or
/// content.
pub fn assert_collections_equal<T: Debug + PartialEq>(actual: &[T], expected: &[T]) {
    require_same_len(actual, expected);
    for (i, (a, e)) in actual.iter().zip(expected).enumerate() {
        assert!(
            a == e,
            "collections differ at index {i}: expected {e:?}, got {a:?}\n  expected: {expected:?}\n  actual:   {actual:?}"
        );
    }
}

/// Assert that two collections contain the same elements, ignoring order.
///
/// # Panics
///
/// Panics if the collections differ in content (ignoring order).
pub fn assert_collections_unordered_equal<T: Debug + Eq + Hash>(actual: &[T], expected: &[T]) {
    require_same_len(actual, expected);
    let actual_set: HashSet<&T> = actual.iter().collect();
    let expected_set: HashSet<&T> = expected.iter().collect();
    if actual_set != expected_set {
        let missing: Vec<&&T> = expected_set.difference(&actual_set).collect();
        let extra: Vec<&&T> = actual_set.difference(&expected_set).collect();
        panic!(
            "collections differ (order ignored):\n  missing:    {missing:?}\n  unexpected: {extra:?}\n  expected: {expected:?}\n  actual:   {actual:?}"
        );
    }
}

/// Assert that an association holds exactly the expected entries, in the
/// expected order.
///
/// # Panics
///
/// Panics if keys, values, or entry order differ.
pub fn assert_assoc_equal<V: Debug + PartialEq>(
    actual: &IndexMap<Key, V>,
    expected: &[(Key, V)],
) {
    let actual_pairs: Vec<(&Key, &V)> = actual.iter().collect();
    let expected_pairs: Vec<(&Key, &V)> = expected.iter().map(|(k, v)| (k, v)).collect();
    assert_eq!(
        actual_pairs, expected_pairs,
        "association mismatch:\n  expected: {expected:?}\n  actual:   {actual:?}"
    );
}
