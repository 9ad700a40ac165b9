//! The eager, cached, immutable keyed association.
//!
//! An [`EagerAssociation<V>`] maps [`Key`]s to values, preserving
//! insertion order unless explicitly sorted. It follows the same
//! discipline as [`EagerCollection`](crate::collection::EagerCollection):
//! every transformation stacks one [`Associable`] node over the parent
//! and caps it with a memoizing cache, computation happens on first read,
//! and no in-place write path exists — `with`/`without`/`merge`-style
//! methods returning new associations are the only mutations.

use crate::arrayable::Arrayable;
use crate::associable::{
    AssocCache, AssocFilterNode, AssocLiteral, AssocMapKeysNode, AssocMapNode, AssocMergeNode,
    AssocOnlyNode, AssocSortKeysNode, AssocSortNode, AssocWithNode, AssocWithoutNode, Associable,
    KeysNode, ValuesNode,
};
use crate::collection::EagerCollection;
use crate::error::{Error, Result};
use crate::key::Key;
use crate::lazy::LazyPipeline;
use indexmap::IndexMap;
use serde::ser::{Serialize, Serializer};
use std::cmp::Ordering;
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

/// An immutable, eagerly evaluated, memoized key-value mapping.
pub struct EagerAssociation<V> {
    node: Arc<AssocCache<V>>,
}

impl<V> Clone for EagerAssociation<V> {
    fn clone(&self) -> Self {
        Self { node: Arc::clone(&self.node) }
    }
}

impl<V: Clone + 'static> EagerAssociation<V> {
    /// Wraps literal entries.
    pub fn from_entries(entries: IndexMap<Key, V>) -> Self {
        Self::from_associable(Arc::new(AssocLiteral { entries }))
    }

    /// Builds from `(key, value)` pairs; later pairs win on duplicate
    /// keys.
    pub fn from_pairs<K: Into<Key>>(pairs: Vec<(K, V)>) -> Self {
        let mut entries = IndexMap::new();
        for (k, v) in pairs {
            entries.insert(k.into(), v);
        }
        Self::from_entries(entries)
    }

    /// Admits any [`Associable`] as the upstream of a new association,
    /// capped with a cache.
    pub fn from_associable(upstream: Arc<dyn Associable<V>>) -> Self {
        Self { node: Arc::new(AssocCache::new(upstream)) }
    }

    /// This association's computation node.
    #[must_use]
    pub fn node(&self) -> Arc<dyn Associable<V>> {
        Arc::clone(&self.node) as Arc<dyn Associable<V>>
    }

    /* ===================== transformations ===================== */

    /// Value transform; keys are preserved.
    pub fn map<O, F>(&self, f: F) -> EagerAssociation<O>
    where
        O: Clone + 'static,
        F: Fn(&V) -> O + 'static,
    {
        EagerAssociation::from_associable(Arc::new(AssocMapNode {
            upstream: self.node(),
            f,
            _t: PhantomData,
        }))
    }

    /// Key transform; values are untouched. Colliding result keys
    /// collapse, the last-assigned value wins — that is the contract,
    /// not an error.
    pub fn map_keys<F>(&self, f: F) -> Self
    where
        F: Fn(&Key, &V) -> Key + 'static,
    {
        Self::from_associable(Arc::new(AssocMapKeysNode { upstream: self.node(), f }))
    }

    /// Keeps entries matching the predicate; order is preserved.
    pub fn filter<P>(&self, pred: P) -> Self
    where
        P: Fn(&Key, &V) -> bool + 'static,
    {
        Self::from_associable(Arc::new(AssocFilterNode { upstream: self.node(), pred }))
    }

    /// Keeps entries whose value matches.
    pub fn filter_values<P>(&self, pred: P) -> Self
    where
        P: Fn(&V) -> bool + 'static,
    {
        self.filter(move |_, v| pred(v))
    }

    /// Shallow merge: all keys from both sides, `other` wins on
    /// collisions. Colliding keys keep this side's position; new keys
    /// append in `other`'s order.
    pub fn merge(&self, other: &Self) -> Self {
        Self::from_associable(Arc::new(AssocMergeNode {
            left: self.node(),
            right: other.node(),
        }))
    }

    /// Flat replace: identical to [`merge`](Self::merge) on a flat
    /// association. The recursive form, `replace`, lives on nested
    /// associations (`EagerAssociation<EagerAssociation<V>>`).
    pub fn replace_flat(&self, other: &Self) -> Self {
        self.merge(other)
    }

    /// Stable sort of entries by value.
    pub fn sort_by<C>(&self, cmp: C) -> Self
    where
        C: Fn(&V, &V) -> Ordering + 'static,
    {
        Self::from_associable(Arc::new(AssocSortNode { upstream: self.node(), cmp: Arc::new(cmp) }))
    }

    /// Stable sort of entries by key; integer keys order before string
    /// keys.
    pub fn sort_keys(&self) -> Self {
        Self::from_associable(Arc::new(AssocSortKeysNode { upstream: self.node() }))
    }

    /// A new association with `key` set to `value`. An existing key keeps
    /// its position; a new key appends.
    pub fn with<K: Into<Key>>(&self, key: K, value: V) -> Self {
        Self::from_associable(Arc::new(AssocWithNode {
            upstream: self.node(),
            key: key.into(),
            value,
        }))
    }

    /// A new association without the named keys. Absent keys are ignored.
    pub fn without<K: Into<Key>>(&self, keys: impl IntoIterator<Item = K>) -> Self {
        Self::from_associable(Arc::new(AssocWithoutNode {
            upstream: self.node(),
            keys: keys.into_iter().map(Into::into).collect(),
        }))
    }

    /// A new association keeping only the named keys, in this
    /// association's order. Absent keys are ignored.
    pub fn only<K: Into<Key>>(&self, keys: impl IntoIterator<Item = K>) -> Self {
        Self::from_associable(Arc::new(AssocOnlyNode {
            upstream: self.node(),
            keys: keys.into_iter().map(Into::into).collect(),
        }))
    }

    /// Exchanges the values at two keys. Both keys must be present:
    /// [`Error::MissingKey`] names the first absent one. Unlike the other
    /// transformations this validates (and therefore materializes) at
    /// call time — presence is part of the operation's contract, so the
    /// failure surfaces here, not at some later read.
    pub fn swap<K: Into<Key>>(&self, a: K, b: K) -> Result<Self> {
        let a = a.into();
        let b = b.into();
        let mut map = self.to_assoc();
        let Some(va) = map.get(&a).cloned() else {
            return Err(Error::MissingKey(a));
        };
        let Some(vb) = map.get(&b).cloned() else {
            return Err(Error::MissingKey(b));
        };
        map.insert(a, vb);
        map.insert(b, va);
        Ok(Self::from_entries(map))
    }

    /* ===================== bridges ===================== */

    /// The keys, in order, as a collection.
    pub fn keys(&self) -> EagerCollection<Key> {
        EagerCollection::from_arrayable(Arc::new(KeysNode { upstream: self.node() }))
    }

    /// The values, in order, as a re-indexed collection.
    pub fn values(&self) -> EagerCollection<V> {
        EagerCollection::from_arrayable(Arc::new(ValuesNode { upstream: self.node() }))
    }

    /// A restartable lazy pipeline over the entries, keys preserved.
    pub fn to_lazy(&self) -> LazyPipeline<V> {
        LazyPipeline::from_associable(self.node())
    }

    /* ===================== reads ===================== */

    /// The materialized mapping. Computed on first call, memoized after.
    pub fn to_assoc(&self) -> IndexMap<Key, V> {
        self.node.to_assoc()
    }

    /// Value at `key`, or `None` when absent. Absence is not an error
    /// for reads.
    pub fn get<K: Into<Key>>(&self, key: K) -> Option<V> {
        self.to_assoc().get(&key.into()).cloned()
    }

    /// Whether `key` is present.
    pub fn has<K: Into<Key>>(&self, key: K) -> bool {
        self.to_assoc().contains_key(&key.into())
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.to_assoc().len()
    }

    /// Whether the association is empty.
    pub fn is_empty(&self) -> bool {
        self.to_assoc().is_empty()
    }

    /// Seeded left fold over entries in order.
    pub fn fold<A, F>(&self, seed: A, f: F) -> A
    where
        F: Fn(A, &Key, &V) -> A,
    {
        let mut acc = seed;
        for (k, v) in &self.to_assoc() {
            acc = f(acc, k, v);
        }
        acc
    }

    /// Runs a side effect per entry, in order.
    pub fn each<F>(&self, mut f: F)
    where
        F: FnMut(&Key, &V),
    {
        for (k, v) in &self.to_assoc() {
            f(k, v);
        }
    }
}

impl<V: Clone + 'static> EagerAssociation<EagerAssociation<V>> {
    /// Recursive replace for nested associations: later source wins, and
    /// when both sides carry an association under the same key the two
    /// are combined key-by-key instead of the right side clobbering the
    /// left wholesale. One nesting level of the type gives one level of
    /// recursion; [`merge`](Self::merge) stays shallow at every level.
    pub fn replace(&self, other: &Self) -> Self {
        let mut out = self.to_assoc();
        for (k, bv) in other.to_assoc() {
            let combined = match out.get(&k) {
                Some(av) => av.replace_flat(&bv),
                None => bv,
            };
            out.insert(k, combined);
        }
        Self::from_entries(out)
    }
}

impl<V: Clone + 'static> Associable<V> for EagerAssociation<V> {
    fn to_assoc(&self) -> IndexMap<Key, V> {
        EagerAssociation::to_assoc(self)
    }
}

impl<V: Clone + 'static> From<IndexMap<Key, V>> for EagerAssociation<V> {
    fn from(entries: IndexMap<Key, V>) -> Self {
        Self::from_entries(entries)
    }
}

/// Reads (and therefore materializes) both sides.
impl<V: Clone + PartialEq + 'static> PartialEq for EagerAssociation<V> {
    fn eq(&self, other: &Self) -> bool {
        self.to_assoc() == other.to_assoc()
    }
}

/// Reads (and therefore materializes) the association.
impl<V: Clone + fmt::Debug + 'static> fmt::Debug for EagerAssociation<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.to_assoc()).finish()
    }
}

/// Serializes as a plain map (keys via `Display`), materializing the
/// association.
impl<V: Clone + Serialize + 'static> Serialize for EagerAssociation<V> {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_map(self.to_assoc().into_iter().map(|(k, v)| (k.to_string(), v)))
    }
}
