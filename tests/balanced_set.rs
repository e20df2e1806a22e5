use std::collections::BTreeSet;

use friend_forest::BalancedSet;
use proptest::prelude::*;

/// The number of operations to perform in each proptest case.
const TEST_SIZE: usize = 5_000;

/// Values drawn from a range small enough to force collisions.
fn value_strategy() -> impl Strategy<Value = i64> {
    -2_000i64..2_000i64
}

// ─── Operations enum for driving randomized tests ────────────────────────────

#[derive(Debug, Clone)]
enum SetOp {
    Insert(i64),
    Remove(i64),
    Contains(i64),
    Take(i64),
    First,
    Last,
}

fn set_op_strategy() -> impl Strategy<Value = SetOp> {
    prop_oneof![
        5 => value_strategy().prop_map(SetOp::Insert),
        3 => value_strategy().prop_map(SetOp::Remove),
        2 => value_strategy().prop_map(SetOp::Contains),
        1 => value_strategy().prop_map(SetOp::Take),
        1 => Just(SetOp::First),
        1 => Just(SetOp::Last),
    ]
}

// ─── Core operations ─────────────────────────────────────────────────────────

proptest! {
    #![proptest_config(ProptestConfig::with_cases(20))]

    /// Replays a random sequence of operations on both BalancedSet and
    /// BTreeSet and asserts identical results at every step.
    #[test]
    fn set_ops_match_btreeset(ops in proptest::collection::vec(set_op_strategy(), TEST_SIZE)) {
        let mut avl: BalancedSet<i64> = BalancedSet::new();
        let mut bt: BTreeSet<i64> = BTreeSet::new();

        for op in &ops {
            match op {
                SetOp::Insert(v) => prop_assert_eq!(avl.insert(*v), bt.insert(*v), "insert({})", v),
                SetOp::Remove(v) => prop_assert_eq!(avl.remove(v), bt.remove(v), "remove({})", v),
                SetOp::Contains(v) => prop_assert_eq!(avl.contains(v), bt.contains(v), "contains({})", v),
                SetOp::Take(v) => prop_assert_eq!(avl.take(v), bt.take(v), "take({})", v),
                SetOp::First => prop_assert_eq!(avl.first(), bt.first(), "first()"),
                SetOp::Last => prop_assert_eq!(avl.last(), bt.last(), "last()"),
            }
            prop_assert_eq!(avl.len(), bt.len());
        }
        prop_assert!(avl.iter().eq(bt.iter()));
    }

    #[test]
    fn in_order_is_sorted_and_unique(values in proptest::collection::vec(value_strategy(), TEST_SIZE)) {
        let avl: BalancedSet<i64> = values.iter().copied().collect();
        let bt: BTreeSet<i64> = values.iter().copied().collect();

        prop_assert_eq!(avl.in_order(), bt.iter().copied().collect::<Vec<_>>());
        prop_assert_eq!(avl.iter().len(), bt.len());
    }

    /// Height never exceeds the AVL bound of about 1.44 log2(n + 2).
    #[test]
    fn height_stays_logarithmic(values in proptest::collection::vec(value_strategy(), 1..TEST_SIZE)) {
        let set: BalancedSet<i64> = values.into_iter().collect();
        #[allow(clippy::cast_precision_loss)]
        let bound = 1.45 * ((set.len() + 2) as f64).log2();
        #[allow(clippy::cast_precision_loss)]
        let height = set.height() as f64;
        prop_assert!(height <= bound, "height {} for {} items", height, set.len());
    }

    #[test]
    fn intersection_matches_btreeset(
        a in proptest::collection::vec(value_strategy(), 0..500),
        b in proptest::collection::vec(value_strategy(), 0..500),
    ) {
        let avl_a: BalancedSet<i64> = a.iter().copied().collect();
        let avl_b: BalancedSet<i64> = b.iter().copied().collect();
        let bt_a: BTreeSet<i64> = a.into_iter().collect();
        let bt_b: BTreeSet<i64> = b.into_iter().collect();

        let got: Vec<i64> = avl_a.intersection(&avl_b).into_iter().copied().collect();
        let expected: Vec<i64> = bt_a.intersection(&bt_b).copied().collect();
        prop_assert_eq!(got, expected);
    }

    #[test]
    fn extend_matches_btreeset(
        initial in proptest::collection::vec(value_strategy(), 0..500),
        more in proptest::collection::vec(value_strategy(), 0..500),
    ) {
        let mut avl: BalancedSet<i64> = initial.iter().copied().collect();
        let mut bt: BTreeSet<i64> = initial.into_iter().collect();
        avl.extend(more.iter().copied());
        bt.extend(more);
        prop_assert!(avl.iter().eq(bt.iter()));
    }

    #[test]
    fn clone_produces_equal_set(values in proptest::collection::vec(value_strategy(), 0..1_000)) {
        let set: BalancedSet<i64> = values.into_iter().collect();
        let copy = set.clone();
        prop_assert_eq!(&copy, &set);
        prop_assert_eq!(copy.height(), set.height());
    }

    #[test]
    fn clear_empties_set(values in proptest::collection::vec(value_strategy(), 0..1_000)) {
        let mut set: BalancedSet<i64> = values.into_iter().collect();
        set.clear();
        prop_assert!(set.is_empty());
        prop_assert_eq!(set.first(), None);
        prop_assert!(set.insert(7));
        prop_assert_eq!(set.in_order(), vec![7]);
    }
}

// ─── Fixed cases ─────────────────────────────────────────────────────────────

#[test]
fn string_sets_look_up_by_str() {
    let mut set = BalancedSet::from(["mallory".to_string(), "alice".to_string()]);
    assert!(set.contains("alice"));
    assert_eq!(set.get("mallory").map(String::as_str), Some("mallory"));
    assert!(set.remove("alice"));
    assert!(!set.remove("alice"));
    assert_eq!(set.into_sorted_vec(), ["mallory"]);
}

#[test]
fn serializes_as_a_sorted_sequence() {
    let set = BalancedSet::from([3, 1, 2]);
    let json = serde_json::to_string(&set).unwrap();
    assert_eq!(json, "[1,2,3]");

    let back: BalancedSet<i32> = serde_json::from_str("[2,2,1,3]").unwrap();
    assert_eq!(back, set);
}

#[test]
fn debug_prints_like_a_set() {
    let set = BalancedSet::from(["b", "a"]);
    assert_eq!(format!("{set:?}"), r#"{"a", "b"}"#);
}
