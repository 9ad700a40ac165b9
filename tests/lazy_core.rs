use fluentseq::testing::*;
use fluentseq::{Error, Key, LazyPipeline};

#[test]
fn map_filter_flat_map_chain() -> anyhow::Result<()> {
    let lines = LazyPipeline::from_values(vec![
        "The quick brown fox".to_string(),
        "jumps over the lazy dog".to_string(),
    ]);

    let out = lines
        .flat_map(|s: &String| {
            s.split_whitespace()
                .map(str::to_lowercase)
                .collect::<Vec<_>>()
        })
        .filter(|w: &String| w.len() >= 4)
        .map(|w: &String| w.len())
        .to_vec()?;

    assert_collections_equal(&out, &[5, 5, 5, 4, 4]);
    Ok(())
}

#[test]
fn nothing_runs_before_a_terminal() -> anyhow::Result<()> {
    let (source, pulls) = CountingSource::over(0i64..10);
    let pipeline = LazyPipeline::from_iter(source)
        .map(|n: &i64| n * 2)
        .filter(|n| *n > 2);

    assert_eq!(pulls.total(), 0);
    assert_eq!(pipeline.stage_count(), 2);

    let out = pipeline.to_vec()?;
    assert_collections_equal(&out, &[4, 6, 8, 10, 12, 14, 16, 18]);
    Ok(())
}

#[test]
fn slice_short_circuits_an_infinite_source() -> anyhow::Result<()> {
    let (source, pulls) = CountingSource::over(0i64..);
    let out = LazyPipeline::from_iter(source).slice(2, 3).to_vec()?;

    assert_collections_equal(&out, &[2, 3, 4]);
    assert!(
        pulls.total() <= 5,
        "expected at most offset + len = 5 pulls, saw {}",
        pulls.total()
    );
    Ok(())
}

#[test]
fn take_bounds_chained_stages_over_infinite_counter() -> anyhow::Result<()> {
    let out = LazyPipeline::counter(1, 1)
        .map(|n: &i64| n * n)
        .filter(|n| n % 2 == 1)
        .take(4)
        .to_vec()?;

    assert_collections_equal(&out, &[1, 9, 25, 49]);
    Ok(())
}

#[test]
fn one_shot_source_fails_on_second_terminal() -> anyhow::Result<()> {
    let pipeline = LazyPipeline::from_iter(vec![1, 2, 3].into_iter());
    let fork = pipeline.clone().map(|n: &i32| n * 10);

    assert_collections_equal(&fork.to_vec()?, &[10, 20, 30]);
    assert!(pipeline.is_consumed());
    assert_eq!(pipeline.to_vec().unwrap_err(), Error::SourceReuse);
    Ok(())
}

#[test]
fn forks_share_consumption_but_not_stages() -> anyhow::Result<()> {
    let root = LazyPipeline::from_iter(0i64..6);
    let evens = root.clone().filter(|n| n % 2 == 0);
    let tens = root.clone().map(|n: &i64| n * 10);

    // The first fork to run a terminal wins the one-shot source...
    assert_collections_equal(&evens.to_vec()?, &[0, 2, 4]);
    // ...and the other fork (its stages untouched by the first) loses it.
    assert_eq!(tens.to_vec().unwrap_err(), Error::SourceReuse);
    Ok(())
}

#[test]
fn restartable_source_supports_repeated_terminals() -> anyhow::Result<()> {
    let pipeline = LazyPipeline::from_values(vec![3, 1, 2]);
    assert_eq!(pipeline.clone().count()?, 3);
    assert_eq!(pipeline.clone().sort().to_vec()?, vec![1, 2, 3]);
    assert_eq!(pipeline.first()?, Some(3));
    Ok(())
}

#[test]
fn materialize_rebases_onto_a_restartable_snapshot() -> anyhow::Result<()> {
    let one_shot = LazyPipeline::from_iter(1i64..=4).map(|n: &i64| n * n);
    let snapshot = one_shot.materialize()?;

    // The snapshot (and its forks) can now be iterated repeatedly.
    assert_collections_equal(&snapshot.clone().to_vec()?, &[1, 4, 9, 16]);
    assert_eq!(snapshot.clone().last()?, Some(16));
    assert_eq!(snapshot.fold(0, |acc, n| acc + n)?, 30);
    Ok(())
}

#[test]
fn filter_preserves_keys_on_the_lazy_path() -> anyhow::Result<()> {
    let pairs = LazyPipeline::from_values(vec![10, 11, 12, 13])
        .filter(|n| n % 2 == 1)
        .to_pairs()?;

    assert_eq!(pairs, vec![(Key::Int(1), 11), (Key::Int(3), 13)]);
    Ok(())
}

#[test]
fn filter_with_key_sees_keys() -> anyhow::Result<()> {
    let out = LazyPipeline::from_values(vec!["a", "b", "c", "d"])
        .filter_with_key(|k, _| k.as_int().is_some_and(|i| i % 2 == 0))
        .to_vec()?;

    assert_collections_equal(&out, &["a", "c"]);
    Ok(())
}

#[test]
fn flat_map_rekeys_with_a_running_counter() -> anyhow::Result<()> {
    let pairs = LazyPipeline::from_values(vec![2i64, 3])
        .flat_map(|n: &i64| vec![*n; *n as usize])
        .to_pairs()?;

    let keys: Vec<Key> = pairs.iter().map(|(k, _)| k.clone()).collect();
    assert_eq!(
        keys,
        (0..5).map(Key::Int).collect::<Vec<_>>(),
        "flattened elements should be keyed 0..n"
    );
    Ok(())
}

#[test]
fn chunk_emits_full_then_partial() -> anyhow::Result<()> {
    let chunks = LazyPipeline::from_values(vec![1, 2, 3, 4, 5]).chunk(2).to_vec()?;
    assert_eq!(chunks, vec![vec![1, 2], vec![3, 4], vec![5]]);
    Ok(())
}

#[test]
fn join_appends_after_upstream_exhausts() -> anyhow::Result<()> {
    let out = LazyPipeline::from_values(vec![1, 2])
        .join(&vec![3, 4])
        .to_vec()?;
    assert_collections_equal(&out, &[1, 2, 3, 4]);
    Ok(())
}

#[test]
fn to_assoc_lets_later_duplicate_keys_win() -> anyhow::Result<()> {
    // join re-keys the tail from 0, colliding with the upstream's keys.
    let assoc = LazyPipeline::from_values(vec!["a", "b"])
        .join(&vec!["z"])
        .to_assoc()?;

    assert_assoc_equal(&assoc, &[(Key::Int(0), "z"), (Key::Int(1), "b")]);
    Ok(())
}

#[test]
fn short_circuiting_terminals_stop_pulling() -> anyhow::Result<()> {
    let (source, pulls) = CountingSource::over(1i64..);
    let found = LazyPipeline::from_iter(source).find(|n| n % 7 == 0)?;

    assert_eq!(found, Some(7));
    assert_eq!(pulls.total(), 7);
    Ok(())
}

#[test]
fn any_every_first_on_infinite_sources() -> anyhow::Result<()> {
    assert!(LazyPipeline::counter(0, 1).any(|n| *n > 5)?);
    assert!(!LazyPipeline::counter(0, 1).every(|n| *n < 3)?);
    assert_eq!(LazyPipeline::counter(42, 1).first()?, Some(42));
    Ok(())
}

#[test]
fn reduce_without_seed_errors_on_empty() -> anyhow::Result<()> {
    let empty = LazyPipeline::from_values(Vec::<i64>::new());
    assert_eq!(empty.reduce(|a, b| a + b).unwrap_err(), Error::EmptyReduce);

    let sum = LazyPipeline::from_values(vec![1i64, 2, 3]).reduce(|a, b| a + b)?;
    assert_eq!(sum, 6);
    Ok(())
}

#[test]
fn empty_accessors_return_none_not_errors() -> anyhow::Result<()> {
    let empty = || LazyPipeline::from_values(Vec::<i64>::new());
    assert_eq!(empty().first()?, None);
    assert_eq!(empty().last()?, None);
    assert_eq!(empty().find(|_| true)?, None);
    assert_eq!(empty().find_last(|_| true)?, None);
    Ok(())
}

#[test]
fn find_last_scans_the_whole_sequence() -> anyhow::Result<()> {
    let hit = LazyPipeline::from_values(vec![1, 8, 3, 6, 5]).find_last(|n| n % 2 == 0)?;
    assert_eq!(hit, Some(6));
    Ok(())
}

#[test]
fn dropping_a_bounded_pipeline_releases_the_generator() -> anyhow::Result<()> {
    let (tracker, probe) = DropTracker::new();
    let mut n = 0i64;
    let pipeline = LazyPipeline::from_fn(move || {
        let _held = &tracker;
        n += 1;
        Some(n)
    });

    let out = pipeline.clone().take(3).to_vec()?;
    assert_collections_equal(&out, &[1, 2, 3]);

    // The terminal consumed the one-shot iterator and dropped it, so the
    // generator closure (and everything it captured) is gone even while
    // a pipeline handle still exists.
    assert!(!probe.is_alive());
    drop(pipeline);
    assert!(!probe.is_alive());
    Ok(())
}

#[test]
fn sorting_stages_buffer_and_rekey() -> anyhow::Result<()> {
    let pairs = LazyPipeline::from_values(vec![3, 1, 2]).sort().to_pairs()?;
    assert_eq!(
        pairs,
        vec![(Key::Int(0), 1), (Key::Int(1), 2), (Key::Int(2), 3)]
    );

    let reversed = LazyPipeline::from_values(vec![1, 2, 3]).reverse().to_vec()?;
    assert_collections_equal(&reversed, &[3, 2, 1]);
    Ok(())
}

#[test]
fn shuffle_seeded_is_reproducible() -> anyhow::Result<()> {
    let base = || LazyPipeline::from_values((0i64..20).collect::<Vec<_>>());
    let a = base().shuffle_seeded(99).to_vec()?;
    let b = base().shuffle_seeded(99).to_vec()?;
    assert_eq!(a, b);

    let mut sorted = a.clone();
    sorted.sort_unstable();
    assert_eq!(sorted, (0i64..20).collect::<Vec<_>>());
    Ok(())
}
