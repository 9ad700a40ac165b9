use fluentseq::testing::*;
use fluentseq::{EagerCollection, LazyPipeline};

#[test]
fn diff_and_intersect_partition_the_left_side() -> anyhow::Result<()> {
    let a = vec![1, 2, 3, 4, 5, 6];
    let b = vec![2, 4, 6, 8];

    let diff = LazyPipeline::from_values(a.clone()).diff(&b).to_vec()?;
    let intersect = LazyPipeline::from_values(a.clone()).intersect(&b).to_vec()?;

    assert_collections_equal(&diff, &[1, 3, 5]);
    assert_collections_equal(&intersect, &[2, 4, 6]);

    // Every left element lands in exactly one side, in left order.
    let mut merged = Vec::new();
    let (mut di, mut ii) = (diff.into_iter().peekable(), intersect.into_iter().peekable());
    for v in &a {
        if di.peek() == Some(v) {
            merged.push(di.next().unwrap());
        } else {
            merged.push(ii.next().unwrap());
        }
    }
    assert_eq!(merged, a);
    Ok(())
}

#[test]
fn diff_with_self_is_empty_and_intersect_with_self_is_identity() {
    let a = EagerCollection::from_values(vec![3, 1, 4, 1, 5]);
    assert!(a.diff(&a).is_empty());
    assert_collections_equal(&a.intersect(&a).to_array(), &[3, 1, 4, 1, 5]);
}

#[test]
fn membership_preserves_left_duplicates() {
    let a = EagerCollection::from_values(vec![1, 1, 2, 2, 3]);
    let b = EagerCollection::from_values(vec![2]);

    // Set membership filters; it does not deduplicate the left side.
    assert_collections_equal(&a.diff(&b).to_array(), &[1, 1, 3]);
    assert_collections_equal(&a.intersect(&b).to_array(), &[2, 2]);
}

#[test]
fn unique_keeps_first_occurrences_in_order() -> anyhow::Result<()> {
    let out = LazyPipeline::from_values(vec![3, 1, 3, 2, 1, 3]).unique().to_vec()?;
    assert_collections_equal(&out, &[3, 1, 2]);

    let eager = EagerCollection::from_values(vec!["b", "a", "b", "c", "a"]).unique();
    assert_collections_equal(&eager.to_array(), &["b", "a", "c"]);
    Ok(())
}

#[test]
fn unique_by_uses_the_comparator_for_equality() {
    // Case-insensitive: the first spelling of each word survives.
    let out = EagerCollection::from_values(vec!["Apple", "apple", "Banana", "APPLE", "banana"])
        .unique_by(|x, y| x.to_lowercase().cmp(&y.to_lowercase()));
    assert_collections_equal(&out.to_array(), &["Apple", "Banana"]);
}

#[test]
fn diff_by_and_intersect_by_use_the_comparator() -> anyhow::Result<()> {
    let cmp = |x: &(&str, i32), y: &(&str, i32)| x.0.cmp(y.0);
    let left = vec![("a", 1), ("b", 2), ("c", 3)];
    let right = vec![("b", 99)];

    let diff = LazyPipeline::from_values(left.clone())
        .diff_by(&right, cmp)
        .to_vec()?;
    assert_collections_equal(&diff, &[("a", 1), ("c", 3)]);

    let kept = LazyPipeline::from_values(left)
        .intersect_by(&right, cmp)
        .to_vec()?;
    // Membership compares by name only; the kept value is the left one.
    assert_collections_equal(&kept, &[("b", 2)]);
    Ok(())
}

#[test]
fn lazy_set_ops_accept_any_arrayable_side() -> anyhow::Result<()> {
    let other = EagerCollection::from_values(vec![2, 3]);
    let out = LazyPipeline::from_values(vec![1, 2, 3, 4])
        .diff(&other)
        .to_vec()?;
    assert_collections_equal(&out, &[1, 4]);

    let slice: &[i32] = &[1, 4];
    let out = LazyPipeline::from_values(vec![1, 2, 3, 4])
        .intersect(slice)
        .to_vec()?;
    assert_collections_equal(&out, &[1, 4]);
    Ok(())
}

#[test]
fn set_stages_stay_lazy_per_element() -> anyhow::Result<()> {
    // diff over an infinite source still short-circuits under take.
    let out = LazyPipeline::counter(0, 1)
        .diff(&vec![1i64, 3])
        .take(4)
        .to_vec()?;
    assert_collections_equal(&out, &[0, 2, 4, 5]);
    Ok(())
}

#[test]
fn eager_set_ops_leave_parents_untouched() {
    let a = EagerCollection::from_values(vec![1, 2, 3]);
    let b = EagerCollection::from_values(vec![3]);

    let _ = a.diff(&b).to_array();
    let _ = a.intersect(&b).to_array();
    let _ = a.unique().to_array();

    assert_collections_equal(&a.to_array(), &[1, 2, 3]);
    assert_collections_equal(&b.to_array(), &[3]);
}
