//! Error types shared across the crate.

use crate::key::Key;
use thiserror::Error;

/// Result type alias using the crate's [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised by pipeline, collection, and numeric operations.
///
/// Everything here is deterministic: retrying the same call with the same
/// inputs reproduces the same failure, so none of these are retryable.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// A one-shot source was pulled a second time. The pipeline must be
    /// rebuilt from a fresh source (or snapshotted via `materialize`
    /// before the first terminal call).
    #[error("one-shot source already consumed; rebuild the pipeline or materialize it first")]
    SourceReuse,

    /// An operation that requires a key's presence referenced an absent key.
    #[error("missing key: {0}")]
    MissingKey(Key),

    /// Division or remainder by a zero-valued operand.
    #[error("division by zero")]
    DivisionByZero,

    /// `reduce` without a seed was called on an empty sequence.
    #[error("cannot reduce an empty sequence without a seed")]
    EmptyReduce,

    /// A numeric literal could not be parsed.
    #[error("invalid numeric literal: {0:?}")]
    InvalidNumber(String),
}
