//! The lazy transformation pipeline.
//!
//! A [`LazyPipeline<T>`] binds one shared [`SourceIterator`] to one
//! immutable [`OperatorStack`]. Every fluent call returns a *new*
//! pipeline that shares the source handle and extends the stack by one
//! stage; nothing is evaluated until a terminal operation pulls elements
//! through the composed chain, and each terminal pulls the source exactly
//! once. There is no caching across terminals — re-running a terminal on
//! a restartable source recomputes, and on a one-shot source it fails
//! with [`Error::SourceReuse`](crate::Error::SourceReuse).
//!
//! # Infinite sources
//!
//! Pipelines over infinite sources are safe as long as a bounding stage
//! (`slice`, `take`) or a short-circuiting terminal (`first`, `find`,
//! `any`) limits consumption. `sort`, `reverse`, `shuffle`, `last`,
//! `reduce`, and `to_vec` drain their upstream completely and will never
//! return over an unbounded source.
//!
//! # Forks
//!
//! Cloning a pipeline forks it: the two forks extend independent stacks
//! but share the one source handle, including a one-shot source's
//! consumption state. At most one fork may run a terminal over a one-shot
//! source; use [`materialize`](LazyPipeline::materialize) first if both
//! need the data.

use crate::arrayable::Arrayable;
use crate::associable::Associable;
use crate::collection::EagerCollection;
use crate::error::{Error, Result};
use crate::key::Key;
use crate::source::{SourceIterator, SourceKind};
use crate::stack::OperatorStack;
use crate::stage::{
    AnyValue, ChunkStage, Comparator, FilterKeyStage, FilterStage, FlatMapStage, JoinStage,
    MapStage, MembershipStage, ReverseStage, Seq, ShuffleStage, SliceStage, SortStage, Stage,
    UniqueStage,
};
use indexmap::IndexMap;
use log::debug;
use std::cmp::Ordering;
use std::marker::PhantomData;
use std::sync::Arc;

/// A deferred, composable sequence of transformations over a pull source.
pub struct LazyPipeline<T> {
    source: SourceIterator,
    stack: OperatorStack,
    _t: PhantomData<fn() -> T>,
}

/// Forks the pipeline: same source handle, independent stack from here on.
impl<T> Clone for LazyPipeline<T> {
    fn clone(&self) -> Self {
        Self {
            source: self.source.clone(),
            stack: self.stack.clone(),
            _t: PhantomData,
        }
    }
}

fn take_out<T: 'static>(v: AnyValue) -> T {
    *v.downcast::<T>().expect("terminal element type")
}

/* ===================== construction ===================== */

impl<T: 'static> LazyPipeline<T> {
    fn with_source(source: SourceIterator) -> Self {
        Self { source, stack: OperatorStack::default(), _t: PhantomData }
    }

    /// A restartable pipeline over owned values, keyed `0..n`. Terminals
    /// may be run on it (and its forks) any number of times.
    pub fn from_values(values: Vec<T>) -> Self
    where
        T: Clone,
    {
        let data = Arc::new(values);
        let factory: Arc<dyn Fn() -> Seq> = Arc::new(move || {
            let data = Arc::clone(&data);
            Box::new(
                (0..data.len())
                    .map(move |i| (Key::Int(i as i64), Box::new(data[i].clone()) as AnyValue)),
            )
        });
        Self::with_source(SourceIterator::restartable(factory))
    }

    /// A one-shot pipeline over an arbitrary iterator (possibly infinite),
    /// keyed `0, 1, 2, …`. Exactly one terminal call is allowed across the
    /// pipeline and all of its forks.
    pub fn from_iter<I>(iter: I) -> Self
    where
        I: Iterator<Item = T> + 'static,
    {
        let seq: Seq = Box::new(
            iter.enumerate()
                .map(|(i, v)| (Key::Int(i as i64), Box::new(v) as AnyValue)),
        );
        Self::with_source(SourceIterator::one_shot(seq))
    }

    /// A one-shot pipeline over a generator closure; yields until the
    /// closure returns `None`.
    pub fn from_fn<F>(f: F) -> Self
    where
        F: FnMut() -> Option<T> + 'static,
    {
        Self::from_iter(std::iter::from_fn(f))
    }

    /// A restartable pipeline over any [`Arrayable`] node, keyed `0..n`.
    /// Materialization happens per pull, on the node's own terms (a
    /// cached node materializes once).
    pub fn from_arrayable(node: Arc<dyn Arrayable<T>>) -> Self
    where
        T: Clone,
    {
        let factory: Arc<dyn Fn() -> Seq> = Arc::new(move || {
            Box::new(
                node.to_array()
                    .into_iter()
                    .enumerate()
                    .map(|(i, v)| (Key::Int(i as i64), Box::new(v) as AnyValue)),
            )
        });
        Self::with_source(SourceIterator::restartable(factory))
    }

    /// A restartable pipeline over any [`Associable`] node, preserving
    /// its keys and order.
    pub fn from_associable(node: Arc<dyn Associable<T>>) -> Self
    where
        T: Clone,
    {
        let factory: Arc<dyn Fn() -> Seq> = Arc::new(move || {
            Box::new(
                node.to_assoc()
                    .into_iter()
                    .map(|(k, v)| (k, Box::new(v) as AnyValue)),
            )
        });
        Self::with_source(SourceIterator::restartable(factory))
    }

    /// A restartable pipeline over keyed entries, preserving the given
    /// keys and order.
    pub fn from_assoc(entries: IndexMap<Key, T>) -> Self
    where
        T: Clone,
    {
        let data: Arc<Vec<(Key, T)>> = Arc::new(entries.into_iter().collect());
        let factory: Arc<dyn Fn() -> Seq> = Arc::new(move || {
            let data = Arc::clone(&data);
            Box::new((0..data.len()).map(move |i| {
                let (k, v) = &data[i];
                (k.clone(), Box::new(v.clone()) as AnyValue)
            }))
        });
        Self::with_source(SourceIterator::restartable(factory))
    }
}

impl LazyPipeline<i64> {
    /// An infinite arithmetic counter — a one-shot generator source,
    /// useful with `take`/`slice`.
    pub fn counter(start: i64, step: i64) -> Self {
        let mut current = start;
        Self::from_fn(move || {
            let v = current;
            current += step;
            Some(v)
        })
    }
}

/* ===================== fluent stages ===================== */

impl<T: 'static> LazyPipeline<T> {
    fn push<O: 'static>(self, stage: Arc<dyn Stage>) -> LazyPipeline<O> {
        LazyPipeline {
            source: self.source,
            stack: self.stack.push(stage),
            _t: PhantomData,
        }
    }

    /// Element-wise transform; preserves keys.
    pub fn map<O, F>(self, f: F) -> LazyPipeline<O>
    where
        O: 'static,
        F: Fn(&T) -> O + 'static,
    {
        self.push(Arc::new(MapStage::new(f)))
    }

    /// Keeps elements matching the predicate. Keys are preserved as-is,
    /// not re-indexed — the eager counterpart re-indexes, this path does
    /// not.
    pub fn filter<P>(self, pred: P) -> Self
    where
        P: Fn(&T) -> bool + 'static,
    {
        self.push(Arc::new(FilterStage::new(pred)))
    }

    /// Like [`filter`](Self::filter), but the predicate also sees the key.
    pub fn filter_with_key<P>(self, pred: P) -> Self
    where
        P: Fn(&Key, &T) -> bool + 'static,
    {
        self.push(Arc::new(FilterKeyStage::new(pred)))
    }

    /// Transforms each element into zero or more outputs, flattened one
    /// level and re-keyed with a running counter.
    pub fn flat_map<O, F>(self, f: F) -> LazyPipeline<O>
    where
        O: 'static,
        F: Fn(&T) -> Vec<O> + 'static,
    {
        self.push(Arc::new(FlatMapStage::new(f)))
    }

    /// Skips `offset` elements and yields at most `len`, then stops
    /// pulling the upstream — safe on infinite sources.
    pub fn slice(self, offset: usize, len: usize) -> Self {
        self.push(Arc::new(SliceStage { offset, len: Some(len) }))
    }

    /// Skips the first `n` elements.
    pub fn skip(self, n: usize) -> Self {
        self.push(Arc::new(SliceStage { offset: n, len: None }))
    }

    /// Yields at most `n` elements, then stops pulling the upstream.
    pub fn take(self, n: usize) -> Self {
        self.push(Arc::new(SliceStage { offset: 0, len: Some(n) }))
    }

    /// Drops all but the first occurrence of each value. Only the
    /// survivors are buffered, so this is safe on infinite sources when a
    /// downstream `take` bounds the output.
    pub fn unique(self) -> Self
    where
        T: Clone + PartialEq,
    {
        self.push(Arc::new(UniqueStage::<T>::new(None)))
    }

    /// [`unique`](Self::unique) under a comparator's definition of
    /// equality (`Ordering::Equal`). O(n²) pairwise against the survivor
    /// buffer.
    pub fn unique_by<C>(self, cmp: C) -> Self
    where
        T: Clone + PartialEq,
        C: Fn(&T, &T) -> Ordering + 'static,
    {
        self.push(Arc::new(UniqueStage::<T>::new(Some(Arc::new(cmp)))))
    }

    /// Drops elements present in `other`. The other side is materialized
    /// up front and must be finite; the upstream stays lazy.
    pub fn diff<O>(self, other: &O) -> Self
    where
        T: PartialEq,
        O: Arrayable<T> + ?Sized,
    {
        self.push(Arc::new(MembershipStage::new(other.to_array(), None, false)))
    }

    /// [`diff`](Self::diff) with membership decided by a comparator.
    pub fn diff_by<O, C>(self, other: &O, cmp: C) -> Self
    where
        T: PartialEq,
        O: Arrayable<T> + ?Sized,
        C: Fn(&T, &T) -> Ordering + 'static,
    {
        let cmp: Arc<Comparator<T>> = Arc::new(cmp);
        self.push(Arc::new(MembershipStage::new(other.to_array(), Some(cmp), false)))
    }

    /// Keeps only elements present in `other` (finite, materialized up
    /// front).
    pub fn intersect<O>(self, other: &O) -> Self
    where
        T: PartialEq,
        O: Arrayable<T> + ?Sized,
    {
        self.push(Arc::new(MembershipStage::new(other.to_array(), None, true)))
    }

    /// [`intersect`](Self::intersect) with membership decided by a
    /// comparator.
    pub fn intersect_by<O, C>(self, other: &O, cmp: C) -> Self
    where
        T: PartialEq,
        O: Arrayable<T> + ?Sized,
        C: Fn(&T, &T) -> Ordering + 'static,
    {
        let cmp: Arc<Comparator<T>> = Arc::new(cmp);
        self.push(Arc::new(MembershipStage::new(other.to_array(), Some(cmp), true)))
    }

    /// Gathers elements into `Vec<T>` chunks of `size`; the final partial
    /// chunk is emitted if non-empty.
    pub fn chunk(self, size: usize) -> LazyPipeline<Vec<T>> {
        self.push(Arc::new(ChunkStage::<T>::new(size)))
    }

    /// Concatenation: once the upstream exhausts, yields `other`'s
    /// elements (materialized up front).
    pub fn join<O>(self, other: &O) -> Self
    where
        T: Clone,
        O: Arrayable<T> + ?Sized,
    {
        self.push(Arc::new(JoinStage::new(other.to_array())))
    }

    /// Stable sort under a comparator. Buffers the entire upstream; never
    /// returns over an infinite source.
    pub fn sort_by<C>(self, cmp: C) -> Self
    where
        C: Fn(&T, &T) -> Ordering + 'static,
    {
        self.push(Arc::new(SortStage::<T>::new(Arc::new(cmp))))
    }

    /// Stable natural-order sort. Buffers the entire upstream.
    pub fn sort(self) -> Self
    where
        T: Ord,
    {
        self.sort_by(T::cmp)
    }

    /// Reverses the sequence. Buffers the entire upstream.
    pub fn reverse(self) -> Self {
        self.push(Arc::new(ReverseStage::<T>::new()))
    }

    /// Random permutation. Buffers the entire upstream.
    pub fn shuffle(self) -> Self {
        self.push(Arc::new(ShuffleStage::<T>::new(None)))
    }

    /// [`shuffle`](Self::shuffle) with a fixed seed, for reproducible
    /// orders in tests.
    pub fn shuffle_seeded(self, seed: u64) -> Self {
        self.push(Arc::new(ShuffleStage::<T>::new(Some(seed))))
    }
}

/* ===================== terminals ===================== */

impl<T: 'static> LazyPipeline<T> {
    /// Pull one raw iteration from the source and compose the stack over
    /// it. Every terminal funnels through here, so each terminal costs
    /// exactly one source pull.
    fn run(&self) -> Result<Seq> {
        let raw = self.source.pull()?;
        Ok(self.stack.apply(raw))
    }

    /// Drains the pipeline into a `Vec`, discarding keys.
    pub fn to_vec(self) -> Result<Vec<T>> {
        Ok(self.run()?.map(|(_, v)| take_out::<T>(v)).collect())
    }

    /// Drains the pipeline into keyed `(Key, T)` pairs.
    pub fn to_pairs(self) -> Result<Vec<(Key, T)>> {
        Ok(self.run()?.map(|(k, v)| (k, take_out::<T>(v))).collect())
    }

    /// Drains the pipeline into an ordered map. Later writes win on
    /// duplicate keys; a key keeps its first-seen position.
    pub fn to_assoc(self) -> Result<IndexMap<Key, T>> {
        let mut out = IndexMap::new();
        for (k, v) in self.run()? {
            out.insert(k, take_out::<T>(v));
        }
        Ok(out)
    }

    /// Materializes into an [`EagerCollection`]; the lazy source is
    /// consumed once.
    pub fn to_collection(self) -> Result<EagerCollection<T>>
    where
        T: Clone,
    {
        Ok(EagerCollection::from_values(self.to_vec()?))
    }

    /// The first element, or `None` on an empty sequence. Pulls at most
    /// one element past the last bounding stage.
    pub fn first(self) -> Result<Option<T>> {
        Ok(self.run()?.next().map(|(_, v)| take_out::<T>(v)))
    }

    /// The last element, or `None` on an empty sequence. Drains the whole
    /// sequence; never returns over an infinite source.
    pub fn last(self) -> Result<Option<T>> {
        Ok(self.run()?.last().map(|(_, v)| take_out::<T>(v)))
    }

    /// The first element matching the predicate; short-circuits.
    pub fn find<P>(self, pred: P) -> Result<Option<T>>
    where
        P: Fn(&T) -> bool,
    {
        for (_, v) in self.run()? {
            let v = take_out::<T>(v);
            if pred(&v) {
                return Ok(Some(v));
            }
        }
        Ok(None)
    }

    /// The last element matching the predicate. Drains the whole
    /// sequence.
    pub fn find_last<P>(self, pred: P) -> Result<Option<T>>
    where
        P: Fn(&T) -> bool,
    {
        let mut hit = None;
        for (_, v) in self.run()? {
            let v = take_out::<T>(v);
            if pred(&v) {
                hit = Some(v);
            }
        }
        Ok(hit)
    }

    /// Whether any element matches; short-circuits on the first hit.
    pub fn any<P>(self, pred: P) -> Result<bool>
    where
        P: Fn(&T) -> bool,
    {
        for (_, v) in self.run()? {
            if pred(&take_out::<T>(v)) {
                return Ok(true);
            }
        }
        Ok(false)
    }

    /// Whether every element matches; short-circuits on the first miss.
    pub fn every<P>(self, pred: P) -> Result<bool>
    where
        P: Fn(&T) -> bool,
    {
        for (_, v) in self.run()? {
            if !pred(&take_out::<T>(v)) {
                return Ok(false);
            }
        }
        Ok(true)
    }

    /// Number of elements after all stages. Drains the whole sequence.
    pub fn count(self) -> Result<usize> {
        Ok(self.run()?.count())
    }

    /// Seeded left fold over the whole sequence.
    pub fn fold<A, F>(self, seed: A, f: F) -> Result<A>
    where
        F: Fn(A, &T) -> A,
    {
        let mut acc = seed;
        for (_, v) in self.run()? {
            acc = f(acc, &take_out::<T>(v));
        }
        Ok(acc)
    }

    /// Seedless reduction: the first element seeds the accumulator.
    /// Empty input is [`Error::EmptyReduce`].
    pub fn reduce<F>(self, f: F) -> Result<T>
    where
        F: Fn(T, &T) -> T,
    {
        let mut seq = self.run()?;
        let Some((_, first)) = seq.next() else {
            return Err(Error::EmptyReduce);
        };
        let mut acc = take_out::<T>(first);
        for (_, v) in seq {
            acc = f(acc, &take_out::<T>(v));
        }
        Ok(acc)
    }

    /// Runs a side effect per element, draining the whole sequence.
    pub fn each<F>(self, mut f: F) -> Result<()>
    where
        F: FnMut(&T),
    {
        for (_, v) in self.run()? {
            f(&take_out::<T>(v));
        }
        Ok(())
    }

    /// Drains the pipeline once and rebases it onto a restartable
    /// snapshot of the results, with an empty stack.
    ///
    /// The shared source handle is replaced in place, so every fork sees
    /// the snapshot too — this is the sanctioned way to iterate a
    /// one-shot pipeline more than once. Keys survive into the snapshot.
    pub fn materialize(self) -> Result<Self>
    where
        T: Clone,
    {
        let snapshot: Vec<(Key, T)> = self
            .run()?
            .map(|(k, v)| (k, take_out::<T>(v)))
            .collect();
        debug!("materialized pipeline snapshot of {} elements", snapshot.len());
        let data = Arc::new(snapshot);
        let factory: Arc<dyn Fn() -> Seq> = Arc::new(move || {
            let data = Arc::clone(&data);
            Box::new((0..data.len()).map(move |i| {
                let (k, v) = &data[i];
                (k.clone(), Box::new(v.clone()) as AnyValue)
            }))
        });
        self.source.replace(SourceKind::Restartable(factory));
        Ok(Self::with_source(self.source))
    }

    /// Whether this pipeline's one-shot source has already been consumed
    /// (always `false` for restartable sources).
    #[must_use]
    pub fn is_consumed(&self) -> bool {
        self.source.is_consumed()
    }

    /// Number of deferred stages accumulated so far.
    #[must_use]
    pub fn stage_count(&self) -> usize {
        self.stack.len()
    }
}
