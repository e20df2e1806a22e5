//! A height-balanced ordered set.

use core::borrow::Borrow;
use core::fmt;
use core::iter::FusedIterator;

use serde::de::{Deserialize, Deserializer, SeqAccess, Visitor};
use serde::ser::{Serialize, SerializeSeq, Serializer};

use crate::raw::{self, RawAvlTree};

/// An ordered set based on an AVL tree.
///
/// Every node keeps its subtree height cached, and each insertion or removal
/// restores `|height(left) - height(right)| <= 1` along the modified path with
/// single or double rotations. Lookups, insertions and removals therefore
/// take O(log n) time in the worst case.
///
/// It is a logic error for an item to be modified in such a way that the
/// item's ordering relative to any other item, as determined by the [`Ord`]
/// trait, changes while it is in the set.
///
/// # Examples
///
/// ```
/// use friend_forest::BalancedSet;
///
/// let mut friends = BalancedSet::new();
/// friends.insert("carol".to_string());
/// friends.insert("alice".to_string());
/// friends.insert("bob".to_string());
///
/// assert!(friends.contains("bob"));
/// assert_eq!(friends.in_order(), ["alice", "bob", "carol"]);
///
/// friends.remove("bob");
/// assert_eq!(friends.len(), 2);
/// ```
pub struct BalancedSet<T> {
    tree: RawAvlTree<T, ()>,
}

/// An iterator over the items of a `BalancedSet`, in ascending order.
///
/// This `struct` is created by the [`iter`] method on [`BalancedSet`].
///
/// [`iter`]: BalancedSet::iter
#[must_use = "iterators are lazy and do nothing unless consumed"]
pub struct Iter<'a, T: 'a> {
    inner: raw::Iter<'a, T, ()>,
}

impl<T> BalancedSet<T> {
    /// Makes a new, empty `BalancedSet`.
    ///
    /// Does not allocate anything on its own.
    ///
    /// # Examples
    ///
    /// ```
    /// use friend_forest::BalancedSet;
    ///
    /// let set: BalancedSet<i32> = BalancedSet::new();
    /// assert!(set.is_empty());
    /// ```
    #[must_use]
    pub const fn new() -> Self {
        BalancedSet { tree: RawAvlTree::new() }
    }

    /// Creates an empty set with room for at least `capacity` elements.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        BalancedSet {
            tree: RawAvlTree::with_capacity(capacity),
        }
    }

    /// Returns the number of elements in the set.
    ///
    /// # Complexity
    ///
    /// O(1); the count is kept up to date by every mutation.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.tree.len()
    }

    /// Returns `true` if the set contains no elements.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.tree.is_empty()
    }

    /// Returns the height of the underlying tree. An empty set has height 0.
    ///
    /// # Examples
    ///
    /// ```
    /// use friend_forest::BalancedSet;
    ///
    /// let set: BalancedSet<u32> = (0..7).collect();
    /// assert_eq!(set.height(), 3);
    /// ```
    #[must_use]
    pub fn height(&self) -> usize {
        self.tree.height()
    }

    /// Clears the set, removing all elements.
    pub fn clear(&mut self) {
        self.tree.clear();
    }

    /// Gets an iterator that visits the elements in ascending order.
    ///
    /// # Examples
    ///
    /// ```
    /// use friend_forest::BalancedSet;
    ///
    /// let set = BalancedSet::from([3, 1, 2]);
    /// let mut iter = set.iter();
    /// assert_eq!(iter.next(), Some(&1));
    /// assert_eq!(iter.next(), Some(&2));
    /// assert_eq!(iter.next(), Some(&3));
    /// assert_eq!(iter.next(), None);
    /// ```
    pub fn iter(&self) -> Iter<'_, T> {
        Iter { inner: self.tree.iter() }
    }

    /// Returns the smallest element, if any.
    #[must_use]
    pub fn first(&self) -> Option<&T> {
        self.tree.first().map(|(k, ())| k)
    }

    /// Returns the largest element, if any.
    #[must_use]
    pub fn last(&self) -> Option<&T> {
        self.tree.last().map(|(k, ())| k)
    }

    /// Returns a freshly materialized, ascending copy of the elements.
    ///
    /// The result is not a live view: later mutations of the set do not
    /// affect it.
    ///
    /// # Complexity
    ///
    /// O(n)
    #[must_use]
    pub fn in_order(&self) -> Vec<T>
    where
        T: Clone,
    {
        self.iter().cloned().collect()
    }

    /// Consumes the set, returning its elements in ascending order.
    #[must_use]
    pub fn into_sorted_vec(self) -> Vec<T> {
        self.tree.into_vec().into_iter().map(|(k, ())| k).collect()
    }
}

impl<T: Ord> BalancedSet<T> {
    /// Returns `true` if the set contains a value.
    ///
    /// The value may be any borrowed form of the set's element type, but the
    /// ordering on the borrowed form *must* match the ordering on the element
    /// type.
    ///
    /// # Examples
    ///
    /// ```
    /// use friend_forest::BalancedSet;
    ///
    /// let set = BalancedSet::from([1, 2, 3]);
    /// assert_eq!(set.contains(&1), true);
    /// assert_eq!(set.contains(&4), false);
    /// ```
    ///
    /// # Complexity
    ///
    /// O(log n)
    pub fn contains<Q>(&self, value: &Q) -> bool
    where
        T: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        self.tree.contains_key(value)
    }

    /// Returns a reference to the element equal to `value`, if any.
    pub fn get<Q>(&self, value: &Q) -> Option<&T>
    where
        T: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        self.tree.get_key_value(value).map(|(k, ())| k)
    }

    /// Adds a value to the set.
    ///
    /// Returns whether the value was newly inserted. Inserting a value that
    /// is already present is a no-op and returns `false`.
    ///
    /// # Examples
    ///
    /// ```
    /// use friend_forest::BalancedSet;
    ///
    /// let mut set = BalancedSet::new();
    ///
    /// assert_eq!(set.insert(2), true);
    /// assert_eq!(set.insert(2), false);
    /// assert_eq!(set.len(), 1);
    /// ```
    ///
    /// # Complexity
    ///
    /// O(log n)
    pub fn insert(&mut self, value: T) -> bool {
        self.tree.insert(value, ())
    }

    /// Removes a value from the set. Returns whether the value was present.
    ///
    /// # Examples
    ///
    /// ```
    /// use friend_forest::BalancedSet;
    ///
    /// let mut set = BalancedSet::from([1, 2]);
    ///
    /// assert_eq!(set.remove(&2), true);
    /// assert_eq!(set.remove(&2), false);
    /// ```
    ///
    /// # Complexity
    ///
    /// O(log n)
    pub fn remove<Q>(&mut self, value: &Q) -> bool
    where
        T: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        self.tree.remove(value).is_some()
    }

    /// Removes and returns the element equal to `value`, if any.
    pub fn take<Q>(&mut self, value: &Q) -> Option<T>
    where
        T: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        self.tree.remove(value).map(|(k, ())| k)
    }

    /// Returns the elements present in both sets, in ascending order.
    ///
    /// # Examples
    ///
    /// ```
    /// use friend_forest::BalancedSet;
    ///
    /// let a = BalancedSet::from(["x", "y"]);
    /// let b = BalancedSet::from(["y", "z"]);
    /// assert_eq!(a.intersection(&b), [&"y"]);
    /// ```
    ///
    /// # Complexity
    ///
    /// O(n + m), a single merge pass over both in-order sequences.
    #[must_use]
    pub fn intersection<'a>(&'a self, other: &BalancedSet<T>) -> Vec<&'a T> {
        let mut mine = self.iter().peekable();
        let mut theirs = other.iter().peekable();
        let mut common = Vec::new();

        while let (Some(a), Some(b)) = (mine.peek(), theirs.peek()) {
            match a.cmp(b) {
                core::cmp::Ordering::Less => {
                    mine.next();
                }
                core::cmp::Ordering::Greater => {
                    theirs.next();
                }
                core::cmp::Ordering::Equal => {
                    common.extend(mine.next());
                    theirs.next();
                }
            }
        }
        common
    }
}

impl<T: Clone> Clone for BalancedSet<T> {
    fn clone(&self) -> Self {
        BalancedSet { tree: self.tree.clone() }
    }
}

impl<T: fmt::Debug> fmt::Debug for BalancedSet<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

impl<T> Default for BalancedSet<T> {
    fn default() -> Self {
        BalancedSet::new()
    }
}

impl<T: PartialEq> PartialEq for BalancedSet<T> {
    fn eq(&self, other: &BalancedSet<T>) -> bool {
        self.len() == other.len() && self.iter().eq(other.iter())
    }
}

impl<T: Eq> Eq for BalancedSet<T> {}

impl<T: Ord> FromIterator<T> for BalancedSet<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> BalancedSet<T> {
        let mut set = BalancedSet::new();
        set.extend(iter);
        set
    }
}

impl<T: Ord> Extend<T> for BalancedSet<T> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        for value in iter {
            self.insert(value);
        }
    }
}

impl<T: Ord, const N: usize> From<[T; N]> for BalancedSet<T> {
    fn from(arr: [T; N]) -> Self {
        arr.into_iter().collect()
    }
}

impl<'a, T> IntoIterator for &'a BalancedSet<T> {
    type Item = &'a T;
    type IntoIter = Iter<'a, T>;

    fn into_iter(self) -> Iter<'a, T> {
        self.iter()
    }
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<&'a T> {
        self.inner.next().map(|(k, ())| k)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<T> ExactSizeIterator for Iter<'_, T> {}

impl<T> FusedIterator for Iter<'_, T> {}

impl<T> Clone for Iter<'_, T> {
    fn clone(&self) -> Self {
        Iter {
            inner: self.inner.clone(),
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for Iter<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.clone()).finish()
    }
}

// Persisted as a plain ascending sequence.
impl<T: Serialize> Serialize for BalancedSet<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(Some(self.len()))?;
        for value in self {
            seq.serialize_element(value)?;
        }
        seq.end()
    }
}

impl<'de, T: Deserialize<'de> + Ord> Deserialize<'de> for BalancedSet<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct SetVisitor<T>(core::marker::PhantomData<T>);

        impl<'de, T: Deserialize<'de> + Ord> Visitor<'de> for SetVisitor<T> {
            type Value = BalancedSet<T>;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a sequence")
            }

            fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<Self::Value, A::Error> {
                let mut set = BalancedSet::with_capacity(seq.size_hint().unwrap_or(0));
                while let Some(value) = seq.next_element()? {
                    set.insert(value);
                }
                Ok(set)
            }
        }

        deserializer.deserialize_seq(SetVisitor(core::marker::PhantomData))
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn borrowed_lookup_on_strings() {
        let mut set = BalancedSet::new();
        set.insert(String::from("ann"));
        assert!(set.contains("ann"));
        assert_eq!(set.get("ann").map(String::as_str), Some("ann"));
        assert_eq!(set.take("ann"), Some(String::from("ann")));
        assert!(set.is_empty());
    }

    #[test]
    fn in_order_is_a_snapshot() {
        let mut set = BalancedSet::from([2, 1]);
        let snapshot = set.in_order();
        set.insert(0);
        assert_eq!(snapshot, [1, 2]);
        assert_eq!(set.in_order(), [0, 1, 2]);
    }

    #[test]
    fn serde_round_trip_is_sorted_sequence() {
        let set = BalancedSet::from(["b", "a", "c"]);
        let json = serde_json::to_string(&set).unwrap();
        assert_eq!(json, r#"["a","b","c"]"#);

        let back: BalancedSet<String> = serde_json::from_str(r#"["z","y","z"]"#).unwrap();
        assert_eq!(back.in_order(), ["y", "z"]);
    }

    #[test]
    fn debug_lists_elements() {
        let set = BalancedSet::from([2, 1]);
        assert_eq!(format!("{set:?}"), "{1, 2}");
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(50))]

        #[test]
        fn intersection_matches_btreeset(
            a in prop::collection::btree_set(0u16..200, 0..100),
            b in prop::collection::btree_set(0u16..200, 0..100),
        ) {
            let left: BalancedSet<u16> = a.iter().copied().collect();
            let right: BalancedSet<u16> = b.iter().copied().collect();
            let expected: Vec<&u16> = a.intersection(&b).collect();
            prop_assert_eq!(left.intersection(&right), expected);
            left.tree.validate_invariants();
        }
    }
}
