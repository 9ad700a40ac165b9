//! # Fluentseq
//!
//! A **fluent, immutable collection library** for Rust: chainable,
//! side-effect-free operations over lazy pull-based sequences, eager
//! cached collections, keyed associations, and small numeric value
//! objects. Code reads as a declarative pipeline instead of imperative
//! loops, and no operation ever mutates the wrapper it was called on.
//!
//! ## Quick start
//!
//! ```
//! use fluentseq::{EagerCollection, LazyPipeline};
//!
//! # fn main() -> anyhow::Result<()> {
//! // Lazy: nothing runs until a terminal pulls; infinite sources are
//! // fine as long as something bounds them.
//! let squares = LazyPipeline::counter(1, 1)
//!     .map(|n: &i64| n * n)
//!     .filter(|n| n % 2 == 1)
//!     .take(3)
//!     .to_vec()?;
//! assert_eq!(squares, vec![1, 9, 25]);
//!
//! // Eager: computed once on first read, memoized after.
//! let evens = EagerCollection::from_values(vec![1, 2, 3, 4, 5, 6])
//!     .filter(|n| n % 2 == 0)
//!     .map(|n| n * 10);
//! assert_eq!(evens.to_array(), vec![20, 40, 60]);
//! # Ok(())
//! # }
//! ```
//!
//! ## Core concepts
//!
//! ### Lazy pipelines
//!
//! A [`LazyPipeline<T>`] binds a pull source to an immutable stack of
//! deferred stages. Every fluent call returns a new pipeline; evaluation
//! happens when a terminal operation (`to_vec`, `first`, `reduce`, …)
//! pulls elements through the composed chain — exactly one source pass
//! per terminal call. One-shot sources (arbitrary iterators and
//! generators) may be consumed once across the pipeline and all of its
//! forks; a second terminal fails with [`Error::SourceReuse`], and
//! [`materialize`](LazyPipeline::materialize) is the sanctioned way to
//! snapshot and re-iterate.
//!
//! ### Eager collections and associations
//!
//! An [`EagerCollection<T>`] (ordered, 0-indexed) and an
//! [`EagerAssociation<V>`] (insertion-ordered `Key → V`) build a tree of
//! pure computation nodes per transformation, capped by a memoizing
//! cache: the first read computes the whole chain once, every later read
//! returns the stored result. Structural operations re-index positions
//! to `0..n-1`.
//!
//! ### Capability traits
//!
//! [`Arrayable`] ("materialize to a list") and [`Associable`]
//! ("materialize to a mapping") are the seams of the node tree: every
//! collection implements them, and any external implementor composes
//! into pipelines and collections without the core knowing its concrete
//! type.
//!
//! ### Numbers
//!
//! The [`Number`] family offers promotion-aware arithmetic (`Int ∘ Int →
//! Int`, floats poison to `Float`) plus the fixed-scale decimal
//! [`Fixed`] for money-like values, and [`NumberExpr`] builds deferred
//! arithmetic trees over anything [`Numberable`].
//!
//! ## Immutability
//!
//! There is no index- or key-assignment write path anywhere — that rule
//! is enforced by the API surface, not by a runtime error. `push`,
//! `pop`, `with`, `without`, `splice`, and friends all return new
//! containers; `pop`/`shift` bundle the removed element into the return
//! value.
//!
//! ## Errors
//!
//! All fallible operations return [`Result`]. Absence is *not* an error
//! for `first`/`last`/`find`/`get` (they return `Option`); consuming a
//! one-shot source twice, seedless `reduce` on empty input, missing keys
//! in `swap`, and division by zero are.

pub mod arrayable;
pub mod associable;
pub mod association;
pub mod collection;
pub mod error;
pub mod key;
pub mod lazy;
pub mod number;
mod source;
mod stack;
pub mod stage;
pub mod testing;

pub use arrayable::{Arrayable, Cache};
pub use associable::{AssocCache, Associable};
pub use association::EagerAssociation;
pub use collection::EagerCollection;
pub use error::{Error, Result};
pub use key::Key;
pub use lazy::LazyPipeline;
pub use number::{Fixed, Number, NumberExpr, Numberable, RoundMode};
pub use stage::Comparator;
