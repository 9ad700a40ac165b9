//! The `Associable` capability and its computation nodes.
//!
//! The keyed twin of [`arrayable`](crate::arrayable): an
//! [`Associable<V>`] materializes into an insertion-ordered `Key → V`
//! map. Association transformations build the same kind of node tree,
//! capped by the memoizing [`AssocCache`]. `GroupByNode` and
//! `AssocFromPairs` bridge from the list world into the keyed one, and
//! `KeysNode`/`ValuesNode` bridge back.

use crate::arrayable::Arrayable;
use crate::collection::EagerCollection;
use crate::key::Key;
use crate::stage::Comparator;
use indexmap::IndexMap;
use log::trace;
use std::cmp::Ordering;
use std::marker::PhantomData;
use std::sync::{Arc, OnceLock};

/// Capability: materialize into an insertion-ordered key-value mapping.
pub trait Associable<V> {
    fn to_assoc(&self) -> IndexMap<Key, V>;
}

impl<V: Clone> Associable<V> for IndexMap<Key, V> {
    fn to_assoc(&self) -> IndexMap<Key, V> {
        self.clone()
    }
}

/// Memoizing cap, identical in role to [`Cache`](crate::arrayable::Cache).
pub struct AssocCache<V> {
    upstream: Arc<dyn Associable<V>>,
    memo: OnceLock<IndexMap<Key, V>>,
}

impl<V: Clone> AssocCache<V> {
    pub fn new(upstream: Arc<dyn Associable<V>>) -> Self {
        Self { upstream, memo: OnceLock::new() }
    }
}

impl<V: Clone> Associable<V> for AssocCache<V> {
    fn to_assoc(&self) -> IndexMap<Key, V> {
        self.memo
            .get_or_init(|| {
                let map = self.upstream.to_assoc();
                trace!("assoc cache fill: materialized {} entries", map.len());
                map
            })
            .clone()
    }
}

/* ===================== pure nodes ===================== */

pub(crate) struct AssocLiteral<V> {
    pub(crate) entries: IndexMap<Key, V>,
}

impl<V: Clone> Associable<V> for AssocLiteral<V> {
    fn to_assoc(&self) -> IndexMap<Key, V> {
        self.entries.clone()
    }
}

/// Key-preserving value transform.
pub(crate) struct AssocMapNode<I, O, F> {
    pub(crate) upstream: Arc<dyn Associable<I>>,
    pub(crate) f: F,
    pub(crate) _t: PhantomData<fn(I) -> O>,
}

impl<I, O, F> Associable<O> for AssocMapNode<I, O, F>
where
    F: Fn(&I) -> O,
{
    fn to_assoc(&self) -> IndexMap<Key, O> {
        self.upstream
            .to_assoc()
            .into_iter()
            .map(|(k, v)| {
                let o = (self.f)(&v);
                (k, o)
            })
            .collect()
    }
}

/// Key remapping; colliding keys collapse, last write wins.
pub(crate) struct AssocMapKeysNode<V, F> {
    pub(crate) upstream: Arc<dyn Associable<V>>,
    pub(crate) f: F,
}

impl<V, F> Associable<V> for AssocMapKeysNode<V, F>
where
    F: Fn(&Key, &V) -> Key,
{
    fn to_assoc(&self) -> IndexMap<Key, V> {
        let mut out = IndexMap::new();
        for (k, v) in self.upstream.to_assoc() {
            let nk = (self.f)(&k, &v);
            out.insert(nk, v);
        }
        out
    }
}

pub(crate) struct AssocFilterNode<V, P> {
    pub(crate) upstream: Arc<dyn Associable<V>>,
    pub(crate) pred: P,
}

impl<V, P> Associable<V> for AssocFilterNode<V, P>
where
    P: Fn(&Key, &V) -> bool,
{
    fn to_assoc(&self) -> IndexMap<Key, V> {
        self.upstream
            .to_assoc()
            .into_iter()
            .filter(|(k, v)| (self.pred)(k, v))
            .collect()
    }
}

/// Shallow merge: all keys from both sides, the right side wins on
/// collisions; colliding keys keep the left side's position, new keys
/// append in the right side's order.
pub(crate) struct AssocMergeNode<V> {
    pub(crate) left: Arc<dyn Associable<V>>,
    pub(crate) right: Arc<dyn Associable<V>>,
}

impl<V> Associable<V> for AssocMergeNode<V> {
    fn to_assoc(&self) -> IndexMap<Key, V> {
        let mut out = self.left.to_assoc();
        for (k, v) in self.right.to_assoc() {
            out.insert(k, v);
        }
        out
    }
}

/// Stable sort of entries by value.
pub(crate) struct AssocSortNode<V> {
    pub(crate) upstream: Arc<dyn Associable<V>>,
    pub(crate) cmp: Arc<Comparator<V>>,
}

impl<V> Associable<V> for AssocSortNode<V> {
    fn to_assoc(&self) -> IndexMap<Key, V> {
        let mut map = self.upstream.to_assoc();
        map.sort_by(|_, a, _, b| (self.cmp)(a, b));
        map
    }
}

/// Stable sort of entries by key (integer keys before string keys).
pub(crate) struct AssocSortKeysNode<V> {
    pub(crate) upstream: Arc<dyn Associable<V>>,
}

impl<V> Associable<V> for AssocSortKeysNode<V> {
    fn to_assoc(&self) -> IndexMap<Key, V> {
        let mut map = self.upstream.to_assoc();
        map.sort_keys();
        map
    }
}

/// Sets one key; an existing key keeps its position, a new key appends.
pub(crate) struct AssocWithNode<V> {
    pub(crate) upstream: Arc<dyn Associable<V>>,
    pub(crate) key: Key,
    pub(crate) value: V,
}

impl<V: Clone> Associable<V> for AssocWithNode<V> {
    fn to_assoc(&self) -> IndexMap<Key, V> {
        let mut map = self.upstream.to_assoc();
        map.insert(self.key.clone(), self.value.clone());
        map
    }
}

/// Drops the named keys; remaining entries keep their order.
pub(crate) struct AssocWithoutNode<V> {
    pub(crate) upstream: Arc<dyn Associable<V>>,
    pub(crate) keys: Vec<Key>,
}

impl<V> Associable<V> for AssocWithoutNode<V> {
    fn to_assoc(&self) -> IndexMap<Key, V> {
        let mut map = self.upstream.to_assoc();
        for k in &self.keys {
            map.shift_remove(k);
        }
        map
    }
}

/// Keeps only the named keys, in the upstream's order; absent keys are
/// simply not there (no error).
pub(crate) struct AssocOnlyNode<V> {
    pub(crate) upstream: Arc<dyn Associable<V>>,
    pub(crate) keys: Vec<Key>,
}

impl<V> Associable<V> for AssocOnlyNode<V> {
    fn to_assoc(&self) -> IndexMap<Key, V> {
        let mut map = self.upstream.to_assoc();
        map.retain(|k, _| self.keys.contains(k));
        map
    }
}

/* ===================== list <-> assoc bridges ===================== */

/// Groups a list's elements by derived key, preserving first-seen group
/// order and intra-group insertion order. Each group is itself a cached
/// collection.
pub(crate) struct GroupByNode<T, F> {
    upstream: Arc<dyn Arrayable<T>>,
    key_fn: F,
}

impl<T, F> GroupByNode<T, F>
where
    F: Fn(&T) -> Key,
{
    pub(crate) fn new(upstream: Arc<dyn Arrayable<T>>, key_fn: F) -> Self {
        Self { upstream, key_fn }
    }
}

impl<T, F> Associable<EagerCollection<T>> for GroupByNode<T, F>
where
    T: Clone + 'static,
    F: Fn(&T) -> Key,
{
    fn to_assoc(&self) -> IndexMap<Key, EagerCollection<T>> {
        let mut groups: IndexMap<Key, Vec<T>> = IndexMap::new();
        for v in self.upstream.to_array() {
            let k = (self.key_fn)(&v);
            groups.entry(k).or_default().push(v);
        }
        groups
            .into_iter()
            .map(|(k, vs)| (k, EagerCollection::from_values(vs)))
            .collect()
    }
}

/// Re-keys a list by derived key; later elements win on collisions.
pub(crate) struct AssocFromPairs<T, F> {
    upstream: Arc<dyn Arrayable<T>>,
    key_fn: F,
}

impl<T, F> AssocFromPairs<T, F>
where
    F: Fn(&T) -> Key,
{
    pub(crate) fn new(upstream: Arc<dyn Arrayable<T>>, key_fn: F) -> Self {
        Self { upstream, key_fn }
    }
}

impl<T, F> Associable<T> for AssocFromPairs<T, F>
where
    T: Clone + 'static,
    F: Fn(&T) -> Key,
{
    fn to_assoc(&self) -> IndexMap<Key, T> {
        let mut out = IndexMap::new();
        for v in self.upstream.to_array() {
            let k = (self.key_fn)(&v);
            out.insert(k, v);
        }
        out
    }
}

/// An association's keys, in order, as a list.
pub(crate) struct KeysNode<V> {
    pub(crate) upstream: Arc<dyn Associable<V>>,
}

impl<V> Arrayable<Key> for KeysNode<V> {
    fn to_array(&self) -> Vec<Key> {
        self.upstream.to_assoc().into_keys().collect()
    }
}

/// An association's values, in order, as a re-indexed list.
pub(crate) struct ValuesNode<V> {
    pub(crate) upstream: Arc<dyn Associable<V>>,
}

impl<V> Arrayable<V> for ValuesNode<V> {
    fn to_array(&self) -> Vec<V> {
        self.upstream.to_assoc().into_values().collect()
    }
}
