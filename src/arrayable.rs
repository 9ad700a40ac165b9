//! The `Arrayable` capability and its computation nodes.
//!
//! An [`Arrayable<T>`] is anything that can materialize itself into a
//! list. Eager collections are built as trees of small, stateless nodes
//! — one node per transformation, each holding its upstream and its
//! closure — with a single stateful [`Cache`] node at the top that
//! memoizes the materialized list on first read. Asking the cache twice
//! computes once; asking a bare node twice computes twice.
//!
//! External types can join the tree by implementing the trait; `Vec<T>`
//! implements it out of the box so plain data can sit anywhere an
//! upstream is expected.

use crate::stage::Comparator;
use log::trace;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{rng, SeedableRng};
use std::cmp::Ordering;
use std::sync::{Arc, OnceLock};

/// Capability: materialize into an ordered list.
pub trait Arrayable<T> {
    fn to_array(&self) -> Vec<T>;
}

impl<T: Clone> Arrayable<T> for Vec<T> {
    fn to_array(&self) -> Vec<T> {
        self.clone()
    }
}

impl<T: Clone> Arrayable<T> for [T] {
    fn to_array(&self) -> Vec<T> {
        self.to_vec()
    }
}

/// The one stateful node: memoizes its upstream's materialization.
/// Compute-at-most-once holds even if the cache later crosses threads —
/// the memo is a one-time fill.
pub struct Cache<T> {
    upstream: Arc<dyn Arrayable<T>>,
    memo: OnceLock<Vec<T>>,
}

impl<T: Clone> Cache<T> {
    pub fn new(upstream: Arc<dyn Arrayable<T>>) -> Self {
        Self { upstream, memo: OnceLock::new() }
    }
}

impl<T: Clone> Arrayable<T> for Cache<T> {
    fn to_array(&self) -> Vec<T> {
        self.memo
            .get_or_init(|| {
                let arr = self.upstream.to_array();
                trace!("cache fill: materialized {} elements", arr.len());
                arr
            })
            .clone()
    }
}

/* ===================== pure nodes ===================== */

pub(crate) struct Literal<T> {
    pub(crate) values: Vec<T>,
}

impl<T: Clone> Arrayable<T> for Literal<T> {
    fn to_array(&self) -> Vec<T> {
        self.values.clone()
    }
}

pub(crate) struct MapNode<I, O, F> {
    pub(crate) upstream: Arc<dyn Arrayable<I>>,
    pub(crate) f: F,
    pub(crate) _t: std::marker::PhantomData<fn(I) -> O>,
}

impl<I, O, F> Arrayable<O> for MapNode<I, O, F>
where
    F: Fn(&I) -> O,
{
    fn to_array(&self) -> Vec<O> {
        self.upstream.to_array().iter().map(|v| (self.f)(v)).collect()
    }
}

pub(crate) struct FilterNode<T, P> {
    pub(crate) upstream: Arc<dyn Arrayable<T>>,
    pub(crate) pred: P,
}

impl<T, P> Arrayable<T> for FilterNode<T, P>
where
    P: Fn(&T) -> bool,
{
    fn to_array(&self) -> Vec<T> {
        self.upstream
            .to_array()
            .into_iter()
            .filter(|v| (self.pred)(v))
            .collect()
    }
}

pub(crate) struct FlatMapNode<I, O, F> {
    pub(crate) upstream: Arc<dyn Arrayable<I>>,
    pub(crate) f: F,
    pub(crate) _t: std::marker::PhantomData<fn(I) -> O>,
}

impl<I, O, F> Arrayable<O> for FlatMapNode<I, O, F>
where
    F: Fn(&I) -> Vec<O>,
{
    fn to_array(&self) -> Vec<O> {
        let mut out = Vec::new();
        for v in self.upstream.to_array() {
            out.extend((self.f)(&v));
        }
        out
    }
}

/// Stable sort under the held comparator.
pub(crate) struct SortNode<T> {
    pub(crate) upstream: Arc<dyn Arrayable<T>>,
    pub(crate) cmp: Arc<Comparator<T>>,
}

impl<T> Arrayable<T> for SortNode<T> {
    fn to_array(&self) -> Vec<T> {
        let mut arr = self.upstream.to_array();
        arr.sort_by(|a, b| (self.cmp)(a, b));
        arr
    }
}

pub(crate) struct ReverseNode<T> {
    pub(crate) upstream: Arc<dyn Arrayable<T>>,
}

impl<T> Arrayable<T> for ReverseNode<T> {
    fn to_array(&self) -> Vec<T> {
        let mut arr = self.upstream.to_array();
        arr.reverse();
        arr
    }
}

pub(crate) struct ShuffleNode<T> {
    pub(crate) upstream: Arc<dyn Arrayable<T>>,
    pub(crate) seed: Option<u64>,
}

impl<T> Arrayable<T> for ShuffleNode<T> {
    fn to_array(&self) -> Vec<T> {
        let mut arr = self.upstream.to_array();
        match self.seed {
            Some(seed) => arr.shuffle(&mut StdRng::seed_from_u64(seed)),
            None => arr.shuffle(&mut rng()),
        }
        arr
    }
}

/// First occurrence wins; O(n²) pairwise when a comparator is supplied.
pub(crate) struct UniqueNode<T> {
    pub(crate) upstream: Arc<dyn Arrayable<T>>,
    pub(crate) cmp: Option<Arc<Comparator<T>>>,
}

impl<T: PartialEq> Arrayable<T> for UniqueNode<T> {
    fn to_array(&self) -> Vec<T> {
        let mut out: Vec<T> = Vec::new();
        for v in self.upstream.to_array() {
            let dup = match &self.cmp {
                Some(cmp) => out.iter().any(|s| cmp(s, &v) == Ordering::Equal),
                None => out.contains(&v),
            };
            if !dup {
                out.push(v);
            }
        }
        out
    }
}

/// Diff (`keep: false`) or intersect (`keep: true`) against another
/// materialized side.
pub(crate) struct MembershipNode<T> {
    pub(crate) upstream: Arc<dyn Arrayable<T>>,
    pub(crate) other: Arc<dyn Arrayable<T>>,
    pub(crate) cmp: Option<Arc<Comparator<T>>>,
    pub(crate) keep: bool,
}

impl<T: PartialEq> Arrayable<T> for MembershipNode<T> {
    fn to_array(&self) -> Vec<T> {
        let other = self.other.to_array();
        self.upstream
            .to_array()
            .into_iter()
            .filter(|v| {
                let member = match &self.cmp {
                    Some(cmp) => other.iter().any(|o| cmp(o, v) == Ordering::Equal),
                    None => other.contains(v),
                };
                member == self.keep
            })
            .collect()
    }
}

/// Positional window. A negative offset counts back from the end; both
/// offset and length clamp to the available range instead of erroring.
pub(crate) struct SliceNode<T> {
    pub(crate) upstream: Arc<dyn Arrayable<T>>,
    pub(crate) offset: i64,
    pub(crate) len: usize,
}

pub(crate) fn resolve_offset(offset: i64, len: usize) -> usize {
    if offset < 0 {
        len.saturating_sub(offset.unsigned_abs() as usize)
    } else {
        (offset as usize).min(len)
    }
}

impl<T> Arrayable<T> for SliceNode<T> {
    fn to_array(&self) -> Vec<T> {
        let mut arr = self.upstream.to_array();
        let start = resolve_offset(self.offset, arr.len());
        let end = start.saturating_add(self.len).min(arr.len());
        arr.drain(..start);
        arr.truncate(end - start);
        arr
    }
}

/// Removes `remove` elements at `offset` and inserts `insert` in their
/// place. Same offset/clamp rules as [`SliceNode`].
pub(crate) struct SpliceNode<T> {
    pub(crate) upstream: Arc<dyn Arrayable<T>>,
    pub(crate) offset: i64,
    pub(crate) remove: usize,
    pub(crate) insert: Vec<T>,
}

impl<T: Clone> Arrayable<T> for SpliceNode<T> {
    fn to_array(&self) -> Vec<T> {
        let mut arr = self.upstream.to_array();
        let start = resolve_offset(self.offset, arr.len());
        let end = start.saturating_add(self.remove).min(arr.len());
        arr.splice(start..end, self.insert.iter().cloned());
        arr
    }
}

/// Fixed-size chunks; the final partial chunk is kept.
pub(crate) struct ChunkNode<T> {
    pub(crate) upstream: Arc<dyn Arrayable<T>>,
    pub(crate) size: usize,
}

impl<T: Clone> Arrayable<Vec<T>> for ChunkNode<T> {
    fn to_array(&self) -> Vec<Vec<T>> {
        let arr = self.upstream.to_array();
        arr.chunks(self.size.max(1)).map(<[T]>::to_vec).collect()
    }
}

/// Concatenation of two sides.
pub(crate) struct JoinNode<T> {
    pub(crate) left: Arc<dyn Arrayable<T>>,
    pub(crate) right: Arc<dyn Arrayable<T>>,
}

impl<T> Arrayable<T> for JoinNode<T> {
    fn to_array(&self) -> Vec<T> {
        let mut arr = self.left.to_array();
        arr.extend(self.right.to_array());
        arr
    }
}
