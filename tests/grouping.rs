use fluentseq::testing::*;
use fluentseq::{EagerAssociation, EagerCollection, Error, Key};

#[derive(Clone, Debug, PartialEq)]
struct Item {
    name: &'static str,
    dept: &'static str,
    price: i64,
}

fn item(name: &'static str, dept: &'static str, price: i64) -> Item {
    Item { name, dept, price }
}

#[test]
fn group_by_buckets_in_first_seen_order() {
    let items = EagerCollection::from_values(vec![
        item("bread", "food", 10),
        item("cheese", "food", 20),
        item("soda", "drinks", 10),
    ]);

    let by_dept = items.group_by(|i| i.dept);
    assert_eq!(by_dept.len(), 2);

    let prices = by_dept.map(|group| group.map(|i| i.price).to_array());
    assert_eq!(prices.get("food"), Some(vec![10, 20]));
    assert_eq!(prices.get("drinks"), Some(vec![10]));

    // Bucket order follows first appearance of each key.
    assert_collections_equal(
        &by_dept.keys().to_array(),
        &[Key::from("food"), Key::from("drinks")],
    );
}

#[test]
fn group_buckets_are_reindexed_collections() {
    let groups = EagerCollection::from_values(vec![1i64, 2, 3, 4, 5, 6]).group_by(|n| n % 3);
    let ones = groups.get(1i64).unwrap();

    assert_eq!(ones.get(0), Some(1));
    assert_eq!(ones.get(1), Some(4));
    assert_eq!(ones.len(), 2);
}

#[test]
fn key_by_lets_later_elements_win() {
    let assoc = EagerCollection::from_values(vec![
        item("bread", "food", 10),
        item("cheese", "food", 20),
    ])
    .key_by(|i| i.dept);

    assert_eq!(assoc.len(), 1);
    assert_eq!(assoc.get("food"), Some(item("cheese", "food", 20)));
}

#[test]
fn map_preserves_keys_and_map_keys_collapses_collisions() {
    let assoc = EagerAssociation::from_pairs(vec![("a", 1), ("b", 2), ("c", 3)]);

    let doubled = assoc.map(|v| v * 2);
    assert_assoc_equal(
        &doubled.to_assoc(),
        &[
            (Key::from("a"), 2),
            (Key::from("b"), 4),
            (Key::from("c"), 6),
        ],
    );

    // Every key maps to the same target; the last-assigned value wins.
    let collapsed = assoc.map_keys(|_, _| Key::from("all"));
    assert_assoc_equal(&collapsed.to_assoc(), &[(Key::from("all"), 3)]);
}

#[test]
fn filter_variants_preserve_entry_order() {
    let assoc = EagerAssociation::from_pairs(vec![("a", 1), ("b", 2), ("c", 3), ("d", 4)]);

    let evens = assoc.filter_values(|v| v % 2 == 0);
    assert_assoc_equal(&evens.to_assoc(), &[(Key::from("b"), 2), (Key::from("d"), 4)]);

    let named = assoc.filter(|k, _| k.as_str() == Some("c"));
    assert_assoc_equal(&named.to_assoc(), &[(Key::from("c"), 3)]);
}

#[test]
fn merge_is_shallow_and_right_biased() {
    let left = EagerAssociation::from_pairs(vec![("a", 1), ("b", 2)]);
    let right = EagerAssociation::from_pairs(vec![("b", 20), ("c", 30)]);

    let merged = left.merge(&right);
    assert_assoc_equal(
        &merged.to_assoc(),
        &[
            (Key::from("a"), 1),
            (Key::from("b"), 20),
            (Key::from("c"), 30),
        ],
    );
    // replace_flat is merge on flat associations.
    assert_eq!(left.replace_flat(&right), merged);
}

#[test]
fn replace_recurses_into_nested_associations_where_merge_clobbers() {
    let defaults = EagerAssociation::from_pairs(vec![(
        "server",
        EagerAssociation::from_pairs(vec![("host", "localhost".to_string()), ("port", "80".into())]),
    )]);
    let overrides = EagerAssociation::from_pairs(vec![(
        "server",
        EagerAssociation::from_pairs(vec![("port", "8080".to_string())]),
    )]);

    let merged = defaults.merge(&overrides);
    let merged_server = merged.get("server").unwrap();
    assert_eq!(merged_server.get("host"), None, "merge replaces the whole bucket");
    assert_eq!(merged_server.get("port"), Some("8080".to_string()));

    let replaced = defaults.replace(&overrides);
    let replaced_server = replaced.get("server").unwrap();
    assert_eq!(replaced_server.get("host"), Some("localhost".to_string()));
    assert_eq!(replaced_server.get("port"), Some("8080".to_string()));
}

#[test]
fn with_without_only_return_new_associations() {
    let assoc = EagerAssociation::from_pairs(vec![("a", 1), ("b", 2), ("c", 3)]);

    let extended = assoc.with("d", 4).with("a", 10);
    assert_assoc_equal(
        &extended.to_assoc(),
        &[
            (Key::from("a"), 10),
            (Key::from("b"), 2),
            (Key::from("c"), 3),
            (Key::from("d"), 4),
        ],
    );

    let trimmed = assoc.without(["b", "missing"]);
    assert_assoc_equal(&trimmed.to_assoc(), &[(Key::from("a"), 1), (Key::from("c"), 3)]);

    let picked = assoc.only(["c", "a", "missing"]);
    // only() keeps the association's own entry order.
    assert_assoc_equal(&picked.to_assoc(), &[(Key::from("a"), 1), (Key::from("c"), 3)]);

    assert_eq!(assoc.len(), 3);
}

#[test]
fn swap_requires_both_keys() {
    let assoc = EagerAssociation::from_pairs(vec![("a", 1), ("b", 2)]);

    let swapped = assoc.swap("a", "b").unwrap();
    assert_eq!(swapped.get("a"), Some(2));
    assert_eq!(swapped.get("b"), Some(1));

    assert_eq!(
        assoc.swap("a", "nope").unwrap_err(),
        Error::MissingKey(Key::from("nope"))
    );
    assert_eq!(
        assoc.swap("nope", "b").unwrap_err(),
        Error::MissingKey(Key::from("nope"))
    );
}

#[test]
fn sorting_reorders_entries_without_touching_pairings() {
    let assoc = EagerAssociation::from_pairs(vec![("b", 2), ("c", 3), ("a", 1)]);

    let by_key = assoc.sort_keys();
    assert_assoc_equal(
        &by_key.to_assoc(),
        &[
            (Key::from("a"), 1),
            (Key::from("b"), 2),
            (Key::from("c"), 3),
        ],
    );

    let by_value_desc = assoc.sort_by(|x, y| y.cmp(x));
    assert_assoc_equal(
        &by_value_desc.to_assoc(),
        &[
            (Key::from("c"), 3),
            (Key::from("b"), 2),
            (Key::from("a"), 1),
        ],
    );
}

#[test]
fn int_keys_sort_before_string_keys() {
    let assoc = EagerAssociation::from_pairs(vec![
        (Key::from("z"), 0),
        (Key::from(2i64), 0),
        (Key::from("a"), 0),
        (Key::from(1i64), 0),
    ])
    .sort_keys();

    let keys = assoc.keys().to_array();
    assert_eq!(
        keys,
        vec![Key::Int(1), Key::Int(2), Key::from("a"), Key::from("z")]
    );
}

#[test]
fn keys_and_values_bridge_to_collections() {
    let assoc = EagerAssociation::from_pairs(vec![("a", 10), ("b", 20)]);

    assert_collections_equal(&assoc.keys().to_array(), &[Key::from("a"), Key::from("b")]);
    assert_collections_equal(&assoc.values().to_array(), &[10, 20]);

    // values() re-indexes, so positional ops apply downstream.
    assert_eq!(assoc.values().get(1), Some(20));
}

#[test]
fn association_to_lazy_preserves_keys() -> anyhow::Result<()> {
    let assoc = EagerAssociation::from_pairs(vec![("a", 1), ("b", 2), ("c", 3)]);

    let pairs = assoc.to_lazy().filter(|v| v % 2 == 1).to_pairs()?;
    assert_eq!(
        pairs,
        vec![(Key::from("a"), 1), (Key::from("c"), 3)]
    );
    Ok(())
}

#[test]
fn fold_and_each_walk_entries_in_order() {
    let assoc = EagerAssociation::from_pairs(vec![("a", 1), ("b", 2), ("c", 3)]);

    let summary = assoc.fold(String::new(), |acc, k, v| format!("{acc}{k}={v};"));
    assert_eq!(summary, "a=1;b=2;c=3;");

    let mut seen = Vec::new();
    assoc.each(|k, v| seen.push((k.clone(), *v)));
    assert_eq!(seen.len(), 3);
}

#[test]
fn associations_serialize_as_plain_maps() -> anyhow::Result<()> {
    let assoc = EagerAssociation::from_pairs(vec![("a", 1), ("b", 2)]);
    let json = serde_json::to_value(&assoc)?;
    assert_eq!(json, serde_json::json!({"a": 1, "b": 2}));
    Ok(())
}
