//! Deferred transformation stages for the lazy path.
//!
//! A [`Stage`] is a pure function from one keyed sequence to another.
//! Values are type-erased per element (`Box<dyn Any>`); each stage
//! downcasts to its concrete input type and boxes its output, and the
//! typed [`LazyPipeline`](crate::lazy::LazyPipeline) facade keeps the
//! erased chain honest via `PhantomData`.
//!
//! Most stages are fully lazy: they suspend after producing one element
//! and resume on the next pull, which is what makes infinite sources safe
//! under `slice`/`take`. The intrinsically eager exceptions — `sort`,
//! `reverse`, `shuffle` — buffer their entire upstream on the first pull
//! and will never finish over a truly infinite source. That is a
//! documented hazard of calling them there, not something the stage
//! papers over.

use crate::key::Key;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{rng, SeedableRng};
use std::any::Any;
use std::cmp::Ordering;
use std::marker::PhantomData;
use std::sync::Arc;

/// One type-erased element value.
pub(crate) type AnyValue = Box<dyn Any>;

/// A keyed, type-erased element sequence.
pub(crate) type Seq = Box<dyn Iterator<Item = (Key, AnyValue)>>;

/// A three-way comparator; `Ordering::Equal` defines equality for
/// `unique_by`, `diff_by`, and `intersect_by`.
pub type Comparator<T> = dyn Fn(&T, &T) -> Ordering;

/// A deferred, pure transformation step in an operator stack.
pub(crate) trait Stage {
    fn apply(&self, input: Seq) -> Seq;
}

fn unbox<T: 'static>(v: AnyValue, what: &str) -> Box<T> {
    v.downcast::<T>().unwrap_or_else(|_| panic!("stage type invariant violated: {what}"))
}

/* ===================== element-wise stages ===================== */

pub(crate) struct MapStage<I, O, F> {
    f: Arc<F>,
    _t: PhantomData<fn(I) -> O>,
}

impl<I, O, F> MapStage<I, O, F>
where
    F: Fn(&I) -> O + 'static,
{
    pub(crate) fn new(f: F) -> Self {
        Self { f: Arc::new(f), _t: PhantomData }
    }
}

impl<I, O, F> Stage for MapStage<I, O, F>
where
    I: 'static,
    O: 'static,
    F: Fn(&I) -> O + 'static,
{
    fn apply(&self, input: Seq) -> Seq {
        let f = Arc::clone(&self.f);
        Box::new(input.map(move |(k, v)| {
            let v = unbox::<I>(v, "map input");
            (k, Box::new(f(&v)) as AnyValue)
        }))
    }
}

pub(crate) struct FilterStage<T, P> {
    pred: Arc<P>,
    _t: PhantomData<fn(T)>,
}

impl<T, P> FilterStage<T, P>
where
    P: Fn(&T) -> bool + 'static,
{
    pub(crate) fn new(pred: P) -> Self {
        Self { pred: Arc::new(pred), _t: PhantomData }
    }
}

impl<T, P> Stage for FilterStage<T, P>
where
    T: 'static,
    P: Fn(&T) -> bool + 'static,
{
    fn apply(&self, input: Seq) -> Seq {
        let pred = Arc::clone(&self.pred);
        Box::new(input.filter(move |(_, v)| {
            let v = v.downcast_ref::<T>().expect("filter input type");
            pred(v)
        }))
    }
}

/// Key-aware filter; the plain `filter` ignores keys.
pub(crate) struct FilterKeyStage<T, P> {
    pred: Arc<P>,
    _t: PhantomData<fn(T)>,
}

impl<T, P> FilterKeyStage<T, P>
where
    P: Fn(&Key, &T) -> bool + 'static,
{
    pub(crate) fn new(pred: P) -> Self {
        Self { pred: Arc::new(pred), _t: PhantomData }
    }
}

impl<T, P> Stage for FilterKeyStage<T, P>
where
    T: 'static,
    P: Fn(&Key, &T) -> bool + 'static,
{
    fn apply(&self, input: Seq) -> Seq {
        let pred = Arc::clone(&self.pred);
        Box::new(input.filter(move |(k, v)| {
            let v = v.downcast_ref::<T>().expect("filter_with_key input type");
            pred(k, v)
        }))
    }
}

/// Flattens one nesting level. Emitted elements are re-keyed with a
/// running integer counter; the nested values' own positions are
/// discarded.
pub(crate) struct FlatMapStage<I, O, F> {
    f: Arc<F>,
    _t: PhantomData<fn(I) -> O>,
}

impl<I, O, F> FlatMapStage<I, O, F>
where
    F: Fn(&I) -> Vec<O> + 'static,
{
    pub(crate) fn new(f: F) -> Self {
        Self { f: Arc::new(f), _t: PhantomData }
    }
}

impl<I, O, F> Stage for FlatMapStage<I, O, F>
where
    I: 'static,
    O: 'static,
    F: Fn(&I) -> Vec<O> + 'static,
{
    fn apply(&self, input: Seq) -> Seq {
        let f = Arc::clone(&self.f);
        let mut next = 0i64;
        Box::new(input.flat_map(move |(_, v)| {
            let v = unbox::<I>(v, "flat_map input");
            let mut out: Vec<(Key, AnyValue)> = Vec::new();
            for o in f(&v) {
                out.push((Key::Int(next), Box::new(o) as AnyValue));
                next += 1;
            }
            out
        }))
    }
}

/* ===================== bounding stages ===================== */

/// Skips `offset` elements, yields at most `len`, then stops pulling the
/// upstream entirely. The short-circuit is what makes infinite sources
/// usable: total upstream pulls never exceed `offset + len`.
pub(crate) struct SliceStage {
    pub(crate) offset: usize,
    pub(crate) len: Option<usize>,
}

impl Stage for SliceStage {
    fn apply(&self, input: Seq) -> Seq {
        let skipped = input.skip(self.offset);
        match self.len {
            Some(n) => Box::new(skipped.take(n)),
            None => Box::new(skipped),
        }
    }
}

/// Buffers up to `size` elements and emits them as one `Vec<T>` chunk;
/// the final partial chunk is emitted if non-empty. Chunks are keyed by
/// chunk index.
pub(crate) struct ChunkStage<T> {
    size: usize,
    _t: PhantomData<fn(T)>,
}

impl<T> ChunkStage<T> {
    pub(crate) fn new(size: usize) -> Self {
        // A zero chunk size would never fill a chunk; treat it as 1.
        Self { size: size.max(1), _t: PhantomData }
    }
}

impl<T: 'static> Stage for ChunkStage<T> {
    fn apply(&self, input: Seq) -> Seq {
        let size = self.size;
        let mut input = input;
        let mut index = 0i64;
        let mut done = false;
        Box::new(std::iter::from_fn(move || {
            if done {
                return None;
            }
            let mut buf: Vec<T> = Vec::with_capacity(size);
            while buf.len() < size {
                match input.next() {
                    Some((_, v)) => buf.push(*unbox::<T>(v, "chunk input")),
                    None => {
                        done = true;
                        break;
                    }
                }
            }
            if buf.is_empty() {
                return None;
            }
            let k = Key::Int(index);
            index += 1;
            Some((k, Box::new(buf) as AnyValue))
        }))
    }
}

/// Concatenation: the other side is yielded once the upstream exhausts,
/// keyed by its own positions.
pub(crate) struct JoinStage<T> {
    other: Arc<Vec<T>>,
}

impl<T> JoinStage<T> {
    pub(crate) fn new(other: Vec<T>) -> Self {
        Self { other: Arc::new(other) }
    }
}

impl<T: Clone + 'static> Stage for JoinStage<T> {
    fn apply(&self, input: Seq) -> Seq {
        let other = Arc::clone(&self.other);
        let tail = (0..other.len())
            .map(move |i| (Key::Int(i as i64), Box::new(other[i].clone()) as AnyValue));
        Box::new(input.chain(tail))
    }
}

/* ===================== set-style stages ===================== */

/// First occurrence wins. The survivor buffer holds only the emitted
/// elements, never the pending upstream, so memory stays proportional to
/// the distinct count. With a comparator the membership test is O(n²)
/// pairwise; that cost is part of the contract, not an oversight to
/// optimize away.
pub(crate) struct UniqueStage<T> {
    cmp: Option<Arc<Comparator<T>>>,
}

impl<T> UniqueStage<T> {
    pub(crate) fn new(cmp: Option<Arc<Comparator<T>>>) -> Self {
        Self { cmp }
    }
}

impl<T: Clone + PartialEq + 'static> Stage for UniqueStage<T> {
    fn apply(&self, input: Seq) -> Seq {
        let cmp = self.cmp.clone();
        let mut input = input;
        let mut seen: Vec<T> = Vec::new();
        Box::new(std::iter::from_fn(move || {
            loop {
                let (k, v) = input.next()?;
                let val = v.downcast_ref::<T>().expect("unique input type");
                let dup = match &cmp {
                    Some(cmp) => seen.iter().any(|s| cmp(s, val) == Ordering::Equal),
                    None => seen.contains(val),
                };
                if !dup {
                    seen.push(val.clone());
                    return Some((k, v));
                }
            }
        }))
    }
}

/// Membership test against a fully materialized other side. `keep: false`
/// is diff (drop members), `keep: true` is intersect (keep members).
pub(crate) struct MembershipStage<T> {
    other: Arc<Vec<T>>,
    cmp: Option<Arc<Comparator<T>>>,
    keep: bool,
}

impl<T> MembershipStage<T> {
    pub(crate) fn new(other: Vec<T>, cmp: Option<Arc<Comparator<T>>>, keep: bool) -> Self {
        Self { other: Arc::new(other), cmp, keep }
    }
}

impl<T: PartialEq + 'static> Stage for MembershipStage<T> {
    fn apply(&self, input: Seq) -> Seq {
        let other = Arc::clone(&self.other);
        let cmp = self.cmp.clone();
        let keep = self.keep;
        Box::new(input.filter(move |(_, v)| {
            let val = v.downcast_ref::<T>().expect("diff/intersect input type");
            let member = match &cmp {
                Some(cmp) => other.iter().any(|o| cmp(o, val) == Ordering::Equal),
                None => other.contains(val),
            };
            member == keep
        }))
    }
}

/* ===================== buffering stages ===================== */

enum Buffered {
    Pending(Seq),
    Drained(std::vec::IntoIter<(Key, AnyValue)>),
}

/// Shared shape for the intrinsically eager stages: drain the whole
/// upstream on the first pull, reorder the buffer, re-key `0..n`. The
/// exhausted upstream is dropped as soon as the buffer is built so its
/// generator frames release immediately.
fn buffered<T: 'static>(
    input: Seq,
    what: &'static str,
    reorder: impl Fn(&mut Vec<T>) + 'static,
) -> Seq {
    let mut state = Buffered::Pending(input);
    Box::new(std::iter::from_fn(move || {
        if matches!(state, Buffered::Pending(_)) {
            let Buffered::Pending(seq) =
                std::mem::replace(&mut state, Buffered::Drained(Vec::new().into_iter()))
            else {
                unreachable!()
            };
            let mut buf: Vec<T> = seq.map(|(_, v)| *unbox::<T>(v, what)).collect();
            reorder(&mut buf);
            let items: Vec<(Key, AnyValue)> = buf
                .into_iter()
                .enumerate()
                .map(|(i, v)| (Key::Int(i as i64), Box::new(v) as AnyValue))
                .collect();
            state = Buffered::Drained(items.into_iter());
        }
        match &mut state {
            Buffered::Drained(items) => items.next(),
            Buffered::Pending(_) => unreachable!(),
        }
    }))
}

/// Stable sort. Buffers the entire upstream.
pub(crate) struct SortStage<T> {
    cmp: Arc<Comparator<T>>,
}

impl<T> SortStage<T> {
    pub(crate) fn new(cmp: Arc<Comparator<T>>) -> Self {
        Self { cmp }
    }
}

impl<T: 'static> Stage for SortStage<T> {
    fn apply(&self, input: Seq) -> Seq {
        let cmp = Arc::clone(&self.cmp);
        buffered::<T>(input, "sort input", move |buf| buf.sort_by(|a, b| cmp(a, b)))
    }
}

/// Reversal. Buffers the entire upstream.
pub(crate) struct ReverseStage<T> {
    _t: PhantomData<fn(T)>,
}

impl<T> ReverseStage<T> {
    pub(crate) fn new() -> Self {
        Self { _t: PhantomData }
    }
}

impl<T: 'static> Stage for ReverseStage<T> {
    fn apply(&self, input: Seq) -> Seq {
        buffered::<T>(input, "reverse input", |buf| buf.reverse())
    }
}

/// Shuffle. Buffers the entire upstream; a fixed seed makes the order
/// reproducible for tests.
pub(crate) struct ShuffleStage<T> {
    seed: Option<u64>,
    _t: PhantomData<fn(T)>,
}

impl<T> ShuffleStage<T> {
    pub(crate) fn new(seed: Option<u64>) -> Self {
        Self { seed, _t: PhantomData }
    }
}

impl<T: 'static> Stage for ShuffleStage<T> {
    fn apply(&self, input: Seq) -> Seq {
        let seed = self.seed;
        buffered::<T>(input, "shuffle input", move |buf| match seed {
            Some(seed) => buf.shuffle(&mut StdRng::seed_from_u64(seed)),
            None => buf.shuffle(&mut rng()),
        })
    }
}
