//! Pull sources for lazy pipelines.
//!
//! A [`SourceIterator`] is a shared handle over the raw data a pipeline
//! iterates. Restartable sources (backed by owned data) can be pulled any
//! number of times; one-shot sources (arbitrary iterators/generators)
//! hand their iterator over on the first pull and refuse every pull after
//! that with [`Error::SourceReuse`].
//!
//! The handle is deliberately shared across every fork of a pipeline:
//! forking never copies the source, so at most one fork may run a
//! terminal over a one-shot source. That sharing is what keeps forked
//! lazy pipelines memory-bounded (no hidden buffering of the source for
//! the other branch).

use crate::error::{Error, Result};
use crate::stage::Seq;
use log::trace;
use std::sync::{Arc, Mutex};

/// The two source flavors.
pub(crate) enum SourceKind {
    /// A factory over owned data; every call yields a fresh iteration.
    Restartable(Arc<dyn Fn() -> Seq>),
    /// An iterator surrendered on first pull; `None` once consumed.
    OneShot(Option<Seq>),
}

struct SourceInner {
    kind: SourceKind,
    consumed: bool,
}

/// Shared handle over a pipeline's raw source.
#[derive(Clone)]
pub(crate) struct SourceIterator {
    inner: Arc<Mutex<SourceInner>>,
}

impl SourceIterator {
    pub(crate) fn restartable(factory: Arc<dyn Fn() -> Seq>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(SourceInner {
                kind: SourceKind::Restartable(factory),
                consumed: false,
            })),
        }
    }

    pub(crate) fn one_shot(seq: Seq) -> Self {
        Self {
            inner: Arc::new(Mutex::new(SourceInner {
                kind: SourceKind::OneShot(Some(seq)),
                consumed: false,
            })),
        }
    }

    /// Hand out one raw iteration of the source.
    ///
    /// For a one-shot source this surrenders the underlying iterator and
    /// marks the handle consumed; the second pull — from any fork — is
    /// [`Error::SourceReuse`].
    pub(crate) fn pull(&self) -> Result<Seq> {
        let mut inner = self.inner.lock().unwrap();
        match &mut inner.kind {
            SourceKind::Restartable(factory) => {
                trace!("pulling restartable source");
                Ok(factory())
            }
            SourceKind::OneShot(slot) => match slot.take() {
                Some(seq) => {
                    trace!("pulling one-shot source (now consumed)");
                    inner.consumed = true;
                    Ok(seq)
                }
                None => Err(Error::SourceReuse),
            },
        }
    }

    /// Swap the underlying source and reset the consumed flag.
    ///
    /// Used when a pipeline is rebased onto a materialized snapshot; every
    /// fork sharing this handle sees the replacement.
    pub(crate) fn replace(&self, kind: SourceKind) {
        let mut inner = self.inner.lock().unwrap();
        inner.kind = kind;
        inner.consumed = false;
    }

    /// Whether a one-shot source has already been surrendered.
    pub(crate) fn is_consumed(&self) -> bool {
        self.inner.lock().unwrap().consumed
    }
}
