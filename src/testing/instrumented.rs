//! Instrumented stubs for asserting laziness, caching, and release
//! contracts.

use crate::arrayable::Arrayable;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Weak};

/// Shared counter of how many elements a [`CountingSource`] has yielded.
#[derive(Clone, Default)]
pub struct PullCount(Arc<AtomicUsize>);

impl PullCount {
    /// Total elements pulled so far.
    #[must_use]
    pub fn total(&self) -> usize {
        self.0.load(Ordering::SeqCst)
    }
}

/// An iterator wrapper that counts every element it yields, for
/// verifying short-circuit bounds (e.g. `slice(offset, len)` pulls at
/// most `offset + len` elements).
pub struct CountingSource<I> {
    inner: I,
    pulls: PullCount,
}

impl<I: Iterator> CountingSource<I> {
    /// Wrap `inner`, returning the source and a handle to its counter.
    pub fn over(inner: impl IntoIterator<IntoIter = I>) -> (Self, PullCount) {
        let pulls = PullCount::default();
        (
            Self { inner: inner.into_iter(), pulls: pulls.clone() },
            pulls,
        )
    }
}

impl<I: Iterator> Iterator for CountingSource<I> {
    type Item = I::Item;

    fn next(&mut self) -> Option<I::Item> {
        let item = self.inner.next();
        if item.is_some() {
            self.pulls.0.fetch_add(1, Ordering::SeqCst);
        }
        item
    }
}

/// An [`Arrayable`] stub that panics when materialized more often than
/// allowed — the memoization contract says a cached node computes at
/// most once.
pub struct CountingArrayable<T> {
    values: Vec<T>,
    max_calls: usize,
    calls: AtomicUsize,
}

impl<T> CountingArrayable<T> {
    /// A stub yielding `values`, allowing at most `max_calls`
    /// materializations.
    pub fn new(values: Vec<T>, max_calls: usize) -> Arc<Self> {
        Arc::new(Self { values, max_calls, calls: AtomicUsize::new(0) })
    }

    /// How often `to_array` has been invoked.
    #[must_use]
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl<T: Clone> Arrayable<T> for CountingArrayable<T> {
    fn to_array(&self) -> Vec<T> {
        let n = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        assert!(
            n <= self.max_calls,
            "Arrayable materialized {n} times, allowed at most {}",
            self.max_calls
        );
        self.values.clone()
    }
}

/// A token to move into a source/closure whose release is under test.
pub struct DropTracker {
    _alive: Arc<()>,
}

/// Observes whether the matching [`DropTracker`] is still alive.
pub struct DropProbe {
    weak: Weak<()>,
}

impl DropTracker {
    /// A tracker/probe pair. Move the tracker into the resource; ask the
    /// probe afterwards.
    #[must_use]
    pub fn new() -> (DropTracker, DropProbe) {
        let alive = Arc::new(());
        let weak = Arc::downgrade(&alive);
        (DropTracker { _alive: alive }, DropProbe { weak })
    }
}

impl DropProbe {
    /// Whether the tracker (and whatever owns it) is still alive.
    #[must_use]
    pub fn is_alive(&self) -> bool {
        self.weak.upgrade().is_some()
    }
}
