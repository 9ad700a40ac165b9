//! The eager, cached, immutable sequence.
//!
//! An [`EagerCollection<T>`] is an ordered, 0-indexed, immutable sequence.
//! Every transformation wraps the parent's computation node in a new
//! [`Arrayable`] node and immediately caps it with a [`Cache`], so:
//!
//! - nothing is computed at construction time;
//! - the first read (`to_array`, `first`, `len`, …) triggers the whole
//!   upstream chain exactly once;
//! - every subsequent read returns the memoized backing list.
//!
//! Structural operations (`filter`, `diff`, `unique`, `splice`, the
//! sub-arrays of `chunk`) re-index positions to `0..n-1`; there are no
//! sparse indices. There is deliberately no index-assignment write path —
//! `with`-style methods (`push`, `splice`, …) returning new collections
//! are the only way to "change" one.

use crate::arrayable::{
    Arrayable, Cache, ChunkNode, FilterNode, FlatMapNode, JoinNode, Literal, MapNode,
    MembershipNode, ReverseNode, ShuffleNode, SliceNode, SortNode, SpliceNode, UniqueNode,
};
use crate::associable::{AssocFromPairs, GroupByNode};
use crate::association::EagerAssociation;
use crate::error::{Error, Result};
use crate::key::Key;
use crate::lazy::LazyPipeline;
use serde::ser::{Serialize, Serializer};
use std::cmp::Ordering;
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

/// An immutable, eagerly evaluated, memoized sequence.
pub struct EagerCollection<T> {
    node: Arc<Cache<T>>,
}

impl<T> Clone for EagerCollection<T> {
    fn clone(&self) -> Self {
        Self { node: Arc::clone(&self.node) }
    }
}

impl<T: Clone + 'static> EagerCollection<T> {
    /// Wraps literal values; no computation node above the data.
    pub fn from_values(values: Vec<T>) -> Self {
        Self::from_arrayable(Arc::new(Literal { values }))
    }

    /// Admits any [`Arrayable`] — including external implementors — as
    /// the upstream of a new collection. The node is capped with a cache,
    /// so it will be asked to materialize at most once.
    pub fn from_arrayable(upstream: Arc<dyn Arrayable<T>>) -> Self {
        Self { node: Arc::new(Cache::new(upstream)) }
    }

    /// This collection's computation node, for composing into further
    /// trees.
    #[must_use]
    pub fn node(&self) -> Arc<dyn Arrayable<T>> {
        Arc::clone(&self.node) as Arc<dyn Arrayable<T>>
    }

    /* ===================== transformations ===================== */

    /// Element-wise transform.
    pub fn map<O, F>(&self, f: F) -> EagerCollection<O>
    where
        O: Clone + 'static,
        F: Fn(&T) -> O + 'static,
    {
        EagerCollection::from_arrayable(Arc::new(MapNode {
            upstream: self.node(),
            f,
            _t: PhantomData,
        }))
    }

    /// Keeps matching elements and re-indexes the survivors to `0..n-1`.
    pub fn filter<P>(&self, pred: P) -> Self
    where
        P: Fn(&T) -> bool + 'static,
    {
        Self::from_arrayable(Arc::new(FilterNode { upstream: self.node(), pred }))
    }

    /// Transforms each element into zero or more outputs, flattened one
    /// level.
    pub fn flat_map<O, F>(&self, f: F) -> EagerCollection<O>
    where
        O: Clone + 'static,
        F: Fn(&T) -> Vec<O> + 'static,
    {
        EagerCollection::from_arrayable(Arc::new(FlatMapNode {
            upstream: self.node(),
            f,
            _t: PhantomData,
        }))
    }

    /// Stable sort under a comparator.
    pub fn sort_by<C>(&self, cmp: C) -> Self
    where
        C: Fn(&T, &T) -> Ordering + 'static,
    {
        Self::from_arrayable(Arc::new(SortNode { upstream: self.node(), cmp: Arc::new(cmp) }))
    }

    /// Stable natural-order sort.
    pub fn sort(&self) -> Self
    where
        T: Ord,
    {
        self.sort_by(T::cmp)
    }

    /// Reverses element order.
    pub fn reverse(&self) -> Self {
        Self::from_arrayable(Arc::new(ReverseNode { upstream: self.node() }))
    }

    /// Random permutation.
    pub fn shuffle(&self) -> Self {
        Self::from_arrayable(Arc::new(ShuffleNode { upstream: self.node(), seed: None }))
    }

    /// [`shuffle`](Self::shuffle) with a fixed seed, for reproducible
    /// orders in tests.
    pub fn shuffle_seeded(&self, seed: u64) -> Self {
        Self::from_arrayable(Arc::new(ShuffleNode { upstream: self.node(), seed: Some(seed) }))
    }

    /// Drops all but the first occurrence of each value.
    pub fn unique(&self) -> Self
    where
        T: PartialEq,
    {
        Self::from_arrayable(Arc::new(UniqueNode { upstream: self.node(), cmp: None }))
    }

    /// [`unique`](Self::unique) under a comparator's `Ordering::Equal`;
    /// O(n²) pairwise.
    pub fn unique_by<C>(&self, cmp: C) -> Self
    where
        T: PartialEq,
        C: Fn(&T, &T) -> Ordering + 'static,
    {
        Self::from_arrayable(Arc::new(UniqueNode {
            upstream: self.node(),
            cmp: Some(Arc::new(cmp)),
        }))
    }

    /// Elements of `self` not present in `other` (value equality),
    /// re-indexed.
    pub fn diff(&self, other: &Self) -> Self
    where
        T: PartialEq,
    {
        Self::from_arrayable(Arc::new(MembershipNode {
            upstream: self.node(),
            other: other.node(),
            cmp: None,
            keep: false,
        }))
    }

    /// [`diff`](Self::diff) with membership decided by a comparator.
    pub fn diff_by<C>(&self, other: &Self, cmp: C) -> Self
    where
        T: PartialEq,
        C: Fn(&T, &T) -> Ordering + 'static,
    {
        Self::from_arrayable(Arc::new(MembershipNode {
            upstream: self.node(),
            other: other.node(),
            cmp: Some(Arc::new(cmp)),
            keep: false,
        }))
    }

    /// Elements of `self` also present in `other` (value equality),
    /// re-indexed.
    pub fn intersect(&self, other: &Self) -> Self
    where
        T: PartialEq,
    {
        Self::from_arrayable(Arc::new(MembershipNode {
            upstream: self.node(),
            other: other.node(),
            cmp: None,
            keep: true,
        }))
    }

    /// [`intersect`](Self::intersect) with membership decided by a
    /// comparator.
    pub fn intersect_by<C>(&self, other: &Self, cmp: C) -> Self
    where
        T: PartialEq,
        C: Fn(&T, &T) -> Ordering + 'static,
    {
        Self::from_arrayable(Arc::new(MembershipNode {
            upstream: self.node(),
            other: other.node(),
            cmp: Some(Arc::new(cmp)),
            keep: true,
        }))
    }

    /// Positional window. Negative offsets count back from the end;
    /// offset and length clamp to the available range, so over-long
    /// requests return what exists instead of erroring.
    pub fn slice(&self, offset: i64, len: usize) -> Self {
        Self::from_arrayable(Arc::new(SliceNode { upstream: self.node(), offset, len }))
    }

    /// Removes `remove` elements at `offset` (same offset rules as
    /// [`slice`](Self::slice)) and inserts `insert` in their place.
    pub fn splice(&self, offset: i64, remove: usize, insert: Vec<T>) -> Self {
        Self::from_arrayable(Arc::new(SpliceNode {
            upstream: self.node(),
            offset,
            remove,
            insert,
        }))
    }

    /// Splits into chunks of `size`; each chunk is 0-indexed and the
    /// final partial chunk is kept.
    pub fn chunk(&self, size: usize) -> EagerCollection<Vec<T>> {
        EagerCollection::from_arrayable(Arc::new(ChunkNode { upstream: self.node(), size }))
    }

    /// Concatenation: `self`'s elements followed by `other`'s.
    pub fn join(&self, other: &Self) -> Self {
        Self::from_arrayable(Arc::new(JoinNode { left: self.node(), right: other.node() }))
    }

    /* ===================== stack-style ops ===================== */

    /// A new collection with `value` appended.
    pub fn push(&self, value: T) -> Self {
        Self::from_arrayable(Arc::new(JoinNode {
            left: self.node(),
            right: Arc::new(Literal { values: vec![value] }),
        }))
    }

    /// A new collection with `value` prepended.
    pub fn unshift(&self, value: T) -> Self {
        Self::from_arrayable(Arc::new(JoinNode {
            left: Arc::new(Literal { values: vec![value] }),
            right: self.node(),
        }))
    }

    /// A new collection without the last element, plus the removed value.
    pub fn pop(&self) -> (Self, Option<T>) {
        let mut arr = self.to_array();
        let removed = arr.pop();
        (Self::from_values(arr), removed)
    }

    /// A new collection without the first element, plus the removed
    /// value.
    pub fn shift(&self) -> (Self, Option<T>) {
        let mut arr = self.to_array();
        let removed = if arr.is_empty() { None } else { Some(arr.remove(0)) };
        (Self::from_values(arr), removed)
    }

    /* ===================== keyed bridges ===================== */

    /// Groups elements by a derived key, preserving first-seen group
    /// order and intra-group insertion order.
    pub fn group_by<K, F>(&self, key_fn: F) -> EagerAssociation<EagerCollection<T>>
    where
        K: Into<Key>,
        F: Fn(&T) -> K + 'static,
    {
        EagerAssociation::from_associable(Arc::new(GroupByNode::new(self.node(), move |v| {
            key_fn(v).into()
        })))
    }

    /// Re-keys elements by a derived key into an association; later
    /// elements win on key collisions.
    pub fn key_by<K, F>(&self, key_fn: F) -> EagerAssociation<T>
    where
        K: Into<Key>,
        F: Fn(&T) -> K + 'static,
    {
        EagerAssociation::from_associable(Arc::new(AssocFromPairs::new(self.node(), move |v| {
            key_fn(v).into()
        })))
    }

    /// A restartable lazy pipeline over this collection. Materialization
    /// is deferred to the first pull (and memoized here either way).
    pub fn to_lazy(&self) -> LazyPipeline<T> {
        LazyPipeline::from_arrayable(self.node())
    }

    /* ===================== reads ===================== */

    /// The materialized backing list. Computed on first call, memoized
    /// after.
    pub fn to_array(&self) -> Vec<T> {
        self.node.to_array()
    }

    /// Number of elements.
    pub fn len(&self) -> usize {
        self.to_array().len()
    }

    /// Whether the collection is empty.
    pub fn is_empty(&self) -> bool {
        self.to_array().is_empty()
    }

    /// Element at position `index`, or `None` past the end.
    pub fn get(&self, index: usize) -> Option<T> {
        self.to_array().get(index).cloned()
    }

    /// First element, or `None` when empty. Absence is not an error.
    pub fn first(&self) -> Option<T> {
        self.to_array().first().cloned()
    }

    /// Last element, or `None` when empty.
    pub fn last(&self) -> Option<T> {
        self.to_array().last().cloned()
    }

    /// First element matching the predicate.
    pub fn find<P>(&self, pred: P) -> Option<T>
    where
        P: Fn(&T) -> bool,
    {
        self.to_array().into_iter().find(|v| pred(v))
    }

    /// Whether any element matches.
    pub fn any<P>(&self, pred: P) -> bool
    where
        P: Fn(&T) -> bool,
    {
        self.to_array().iter().any(|v| pred(v))
    }

    /// Whether every element matches.
    pub fn every<P>(&self, pred: P) -> bool
    where
        P: Fn(&T) -> bool,
    {
        self.to_array().iter().all(|v| pred(v))
    }

    /// Whether `value` occurs in the collection.
    pub fn contains(&self, value: &T) -> bool
    where
        T: PartialEq,
    {
        self.to_array().contains(value)
    }

    /// Seeded left fold.
    pub fn fold<A, F>(&self, seed: A, f: F) -> A
    where
        F: Fn(A, &T) -> A,
    {
        self.to_array().iter().fold(seed, f)
    }

    /// Seedless reduction; [`Error::EmptyReduce`] when empty.
    pub fn reduce<F>(&self, f: F) -> Result<T>
    where
        F: Fn(T, &T) -> T,
    {
        let mut iter = self.to_array().into_iter();
        let Some(first) = iter.next() else {
            return Err(Error::EmptyReduce);
        };
        Ok(iter.fold(first, |acc, v| f(acc, &v)))
    }

    /// Runs a side effect per element.
    pub fn each<F>(&self, mut f: F)
    where
        F: FnMut(&T),
    {
        for v in &self.to_array() {
            f(v);
        }
    }
}

impl<T: Clone + 'static> Arrayable<T> for EagerCollection<T> {
    fn to_array(&self) -> Vec<T> {
        EagerCollection::to_array(self)
    }
}

impl<T: Clone + 'static> From<Vec<T>> for EagerCollection<T> {
    fn from(values: Vec<T>) -> Self {
        Self::from_values(values)
    }
}

impl<T: Clone + 'static> IntoIterator for EagerCollection<T> {
    type Item = T;
    type IntoIter = std::vec::IntoIter<T>;

    fn into_iter(self) -> Self::IntoIter {
        self.to_array().into_iter()
    }
}

/// Reads (and therefore materializes) both sides.
impl<T: Clone + PartialEq + 'static> PartialEq for EagerCollection<T> {
    fn eq(&self, other: &Self) -> bool {
        self.to_array() == other.to_array()
    }
}

/// Reads (and therefore materializes) the collection.
impl<T: Clone + fmt::Debug + 'static> fmt::Debug for EagerCollection<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.to_array()).finish()
    }
}

/// Serializes as a plain sequence, materializing the collection.
impl<T: Clone + Serialize + 'static> Serialize for EagerCollection<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_seq(self.to_array())
    }
}
