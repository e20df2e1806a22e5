//! Candidates ranked by how many friends they share with a reference user.

use core::cmp::Ordering;

use crate::BalancedSet;
use crate::raw::RawAvlTree;

/// Ordering key of a ranked candidate: mutual count descending, then
/// username ascending.
#[derive(Clone, Debug, PartialEq, Eq)]
struct RankKey {
    mutual: usize,
    username: String,
}

impl Ord for RankKey {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .mutual
            .cmp(&self.mutual)
            .then_with(|| self.username.cmp(&other.username))
    }
}

impl PartialOrd for RankKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// A balanced tree of candidate users ordered by mutual-friend count against
/// a fixed reference friend list.
///
/// The reference list is copied when the tree is built, and each candidate's
/// count is computed exactly once, on insertion. Neither is ever recomputed
/// in place: a node's ordering key must not change while the node is in the
/// tree. To re-rank after friendships change, [`rebuild`](Self::rebuild)
/// against a fresh reference.
///
/// # Examples
///
/// ```
/// use friend_forest::RankedTree;
///
/// let mut ranked = RankedTree::new(["x", "y", "z"]);
/// ranked.insert("dora", ["x"]);
/// ranked.insert("carl", ["x", "y", "q"]);
/// ranked.insert("abe", ["q"]);
///
/// assert_eq!(ranked.in_order(), ["carl", "dora", "abe"]);
/// assert_eq!(ranked.rank_of("carl"), Some(2));
/// ```
pub struct RankedTree {
    reference: BalancedSet<String>,
    /// Candidates in rank order, each carrying the friend list it was
    /// ranked with.
    entries: RawAvlTree<RankKey, Vec<String>>,
    /// Username to the mutual count frozen at insertion.
    members: RawAvlTree<String, usize>,
}

impl RankedTree {
    /// Builds an empty tree ranking against a snapshot of `reference`.
    pub fn new<I>(reference: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        Self {
            reference: reference.into_iter().map(Into::into).collect(),
            entries: RawAvlTree::new(),
            members: RawAvlTree::new(),
        }
    }

    /// The reference friend list this tree ranks against.
    #[must_use]
    pub fn reference(&self) -> &BalancedSet<String> {
        &self.reference
    }

    /// Number of distinct names in `friends` that also appear in the
    /// reference list.
    #[must_use]
    pub fn mutual_count<S: AsRef<str>>(&self, friends: &[S]) -> usize {
        let distinct: BalancedSet<&str> = friends.iter().map(AsRef::as_ref).collect();
        distinct
            .iter()
            .filter(|name| self.reference.contains(**name))
            .count()
    }

    /// Ranks `username` by its friend list and inserts it.
    ///
    /// Returns `false` without touching the tree if `username` is already
    /// ranked, whatever friend list it was ranked with.
    ///
    /// # Complexity
    ///
    /// O(f log r + log n) for `f` friends and a reference of `r` names.
    pub fn insert<S, I>(&mut self, username: S, friends: I) -> bool
    where
        S: Into<String>,
        I: IntoIterator,
        I::Item: Into<String>,
    {
        let username = username.into();
        if self.members.contains_key(username.as_str()) {
            return false;
        }

        let friends: Vec<String> = friends.into_iter().map(Into::into).collect();
        let mutual = self.mutual_count(&friends);
        self.members.insert(username.clone(), mutual);
        self.entries.insert(RankKey { mutual, username }, friends);
        true
    }

    /// Removes `username`, locating its node through the count it was ranked
    /// with. Returns the friend list it was ranked with.
    pub fn remove(&mut self, username: &str) -> Option<Vec<String>> {
        let (username, mutual) = self.members.remove(username)?;
        self.entries
            .remove(&RankKey { mutual, username })
            .map(|(_, friends)| friends)
    }

    #[must_use]
    pub fn contains(&self, username: &str) -> bool {
        self.members.contains_key(username)
    }

    /// The mutual count `username` was ranked with.
    #[must_use]
    pub fn rank_of(&self, username: &str) -> Option<usize> {
        self.members.get(username).copied()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates `(username, mutual count)` pairs, highest count first.
    pub fn iter(&self) -> impl ExactSizeIterator<Item = (&str, usize)> + '_ {
        self.entries.iter().map(|(key, _)| (key.username.as_str(), key.mutual))
    }

    /// Usernames in rank order.
    #[must_use]
    pub fn in_order(&self) -> Vec<String> {
        self.iter().map(|(name, _)| name.to_owned()).collect()
    }

    /// Usernames paired with their frozen counts, in rank order.
    #[must_use]
    pub fn ranked(&self) -> Vec<(String, usize)> {
        self.iter().map(|(name, mutual)| (name.to_owned(), mutual)).collect()
    }

    /// The `n` best-ranked usernames.
    #[must_use]
    pub fn top(&self, n: usize) -> Vec<String> {
        self.iter().take(n).map(|(name, _)| name.to_owned()).collect()
    }

    /// Discards every rank and re-ranks all candidates, with the friend lists
    /// they were inserted with, against a new reference list.
    #[must_use]
    pub fn rebuild<I>(self, reference: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        let mut rebuilt = RankedTree::new(reference);
        for (key, friends) in self.entries.into_vec() {
            rebuilt.insert(key.username, friends);
        }
        rebuilt
    }
}

impl core::fmt::Debug for RankedTree {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}
