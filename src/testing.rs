//! Testing utilities for pipelines and collections.
//!
//! This module gives end-users the tools to write idiomatic tests for
//! code built on this crate:
//!
//! - **Assertions**: compare collection and association contents with
//!   detailed failure messages.
//! - **Test data builders**: generate datasets fluently.
//! - **Instrumented stubs**: observable sources and nodes for asserting
//!   the crate's laziness and caching contracts — an upper bound on
//!   source pulls, at-most-once materialization, and resource release.
//!
//! # Quick start
//!
//! ```
//! use fluentseq::LazyPipeline;
//! use fluentseq::testing::*;
//!
//! # fn main() -> anyhow::Result<()> {
//! let (source, pulls) = CountingSource::over(0..100i32);
//! let out = LazyPipeline::from_iter(source).take(3).to_vec()?;
//! assert_collections_equal(&out, &[0, 1, 2]);
//! assert!(pulls.total() <= 3);
//! # Ok(())
//! # }
//! ```

pub mod assertions;
pub mod builders;
pub mod instrumented;

pub use assertions::{assert_assoc_equal, assert_collections_equal, assert_collections_unordered_equal};
pub use builders::TestDataBuilder;
pub use instrumented::{CountingArrayable, CountingSource, DropProbe, DropTracker, PullCount};
