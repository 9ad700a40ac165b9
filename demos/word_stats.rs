//! Word statistics over lazy pipelines.
//!
//! Demonstrates:
//! - Lazy flat_map / filter / map chains over text
//! - Infinite counters bounded by take and slice
//! - Grouping words into an association and reading it back
//! - One-shot sources and materialize
//!
//! Run with: cargo run --example word_stats

use anyhow::Result;
use fluentseq::{EagerCollection, Key, LazyPipeline};

const TEXT: &str = "the quick brown fox jumps over the lazy dog \
                    the dog barks and the fox runs";

fn main() -> Result<()> {
    env_logger::init();

    println!("📖 Word Statistics Example\n");

    // =========================================================================
    // EXAMPLE 1: Lazy tokenization
    // =========================================================================
    println!("📊 Example 1: Tokenize lazily, count eagerly");

    let words = LazyPipeline::from_values(vec![TEXT.to_string()])
        .flat_map(|line: &String| {
            line.split_whitespace()
                .map(str::to_string)
                .collect::<Vec<_>>()
        })
        .to_collection()?;

    println!("  total words:  {}", words.len());
    println!("  unique words: {}", words.unique().len());

    // =========================================================================
    // EXAMPLE 2: Group words by length
    // =========================================================================
    println!("\n📊 Example 2: Words grouped by length");

    let by_length = words.group_by(|w| w.len() as i64);
    by_length.sort_keys().each(|len, group| {
        println!("  {len} letters: {:?}", group.unique().to_array());
    });

    // =========================================================================
    // EXAMPLE 3: Frequency table via key counts
    // =========================================================================
    println!("\n📊 Example 3: Top words by frequency");

    let frequencies = words
        .group_by(|w| w.clone())
        .map(|group| group.len() as i64)
        .sort_by(|a, b| b.cmp(a));

    frequencies
        .to_lazy()
        .to_pairs()?
        .iter()
        .take(3)
        .for_each(|(word, count)| println!("  {word}: {count}"));

    // =========================================================================
    // EXAMPLE 4: Infinite counters stay cheap
    // =========================================================================
    println!("\n📊 Example 4: First five odd squares from an infinite counter");

    let odd_squares = LazyPipeline::counter(1, 1)
        .map(|n: &i64| n * n)
        .filter(|n| n % 2 == 1)
        .take(5)
        .to_vec()?;
    println!("  {odd_squares:?}");

    // =========================================================================
    // EXAMPLE 5: One-shot sources and materialize
    // =========================================================================
    println!("\n📊 Example 5: Snapshot a one-shot generator");

    let mut state = 0i64;
    let snapshot = LazyPipeline::from_fn(move || {
        state += 1;
        (state <= 4).then_some(state * 10)
    })
    .materialize()?;

    // The snapshot is restartable: two terminals, no SourceReuse.
    println!("  values: {:?}", snapshot.clone().to_vec()?);
    println!("  sum:    {}", snapshot.fold(0, |acc, n| acc + n)?);

    // =========================================================================
    // EXAMPLE 6: Sentence lengths as a keyed association
    // =========================================================================
    println!("\n📊 Example 6: Per-sentence statistics");

    let sentences = EagerCollection::from_values(vec![
        "the quick brown fox",
        "jumps over the lazy dog",
    ]);
    let stats = sentences
        .key_by(|s| Key::from(*s))
        .map(|s| s.split_whitespace().count());
    stats.each(|sentence, words| println!("  {words} words in \"{sentence}\""));

    println!("\n✅ Done");
    Ok(())
}
