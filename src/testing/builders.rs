//! Test data builders for creating datasets fluently.

use std::ops::RangeInclusive;

/// A fluent builder for constructing test datasets.
///
/// # Example
///
/// ```
/// use fluentseq::testing::TestDataBuilder;
///
/// let data = TestDataBuilder::new()
///     .add_range(1..=10)
///     .add_value(100)
///     .add_repeated(42, 5)
///     .build();
///
/// assert_eq!(data.len(), 16);
/// ```
#[derive(Default)]
pub struct TestDataBuilder<T> {
    data: Vec<T>,
}

impl<T> TestDataBuilder<T> {
    /// Create a new empty builder.
    #[must_use]
    pub const fn new() -> Self {
        Self { data: Vec::new() }
    }

    /// Add a single value.
    #[must_use]
    pub fn add_value(mut self, value: T) -> Self {
        self.data.push(value);
        self
    }

    /// Add multiple values.
    #[must_use]
    pub fn add_values(mut self, values: Vec<T>) -> Self {
        self.data.extend(values);
        self
    }

    /// Add the same value `count` times.
    #[must_use]
    pub fn add_repeated(mut self, value: T, count: usize) -> Self
    where
        T: Clone,
    {
        self.data.extend(std::iter::repeat_n(value, count));
        self
    }

    /// Add every value of an inclusive range.
    #[must_use]
    pub fn add_range(mut self, range: RangeInclusive<T>) -> Self
    where
        T: Clone + PartialOrd,
        RangeInclusive<T>: Iterator<Item = T>,
    {
        self.data.extend(range);
        self
    }

    /// Add `count` values produced by a generator of the index.
    #[must_use]
    pub fn add_generated<F>(mut self, count: usize, f: F) -> Self
    where
        F: Fn(usize) -> T,
    {
        self.data.extend((0..count).map(f));
        self
    }

    /// Finish and return the dataset.
    #[must_use]
    pub fn build(self) -> Vec<T> {
        self.data
    }
}
