//! Case-insensitive username lookup.

use core::borrow::Borrow;

use tracing::info;

use crate::error::{GraphError, Result};
use crate::raw::RawAvlTree;

/// A username projected onto its lower-cased form. Ordering and equality of
/// index nodes are defined on this projection only.
///
/// Folding is done one character at a time so that a prefix folds to a
/// prefix of every name it starts; `str::to_lowercase` treats a final sigma
/// differently depending on what follows it.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord)]
struct FoldedName(String);

impl FoldedName {
    fn new(name: &str) -> Self {
        FoldedName(name.chars().flat_map(char::to_lowercase).collect())
    }
}

impl Borrow<str> for FoldedName {
    fn borrow(&self) -> &str {
        &self.0
    }
}

/// Search index over usernames, ordered and de-duplicated case-insensitively
/// while preserving the original spelling of each stored name.
///
/// # Examples
///
/// ```
/// use friend_forest::PrefixSearchIndex;
///
/// let index = PrefixSearchIndex::from_users(["Alice", "ALBERT", "bob"]);
///
/// assert_eq!(index.search_by_prefix("al"), ["ALBERT", "Alice"]);
/// assert_eq!(index.search_by_substring("li"), ["Alice"]);
/// assert!(index.user_exists("BOB"));
/// ```
#[derive(Clone, Default)]
pub struct PrefixSearchIndex {
    tree: RawAvlTree<FoldedName, String>,
}

impl PrefixSearchIndex {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds an index from a list of usernames, skipping empty ones.
    pub fn from_users<I>(users: I) -> Self
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        let mut index = Self::new();
        index.rebuild_from_users(users);
        index
    }

    /// Number of indexed usernames.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tree.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tree.is_empty()
    }

    /// Indexes `username`. Returns `false` if a name equal to it ignoring case
    /// is already indexed; the stored spelling is then left unchanged.
    ///
    /// # Errors
    ///
    /// [`GraphError::InvalidInput`] if `username` is empty.
    pub fn insert_user(&mut self, username: &str) -> Result<bool> {
        if username.is_empty() {
            return Err(GraphError::InvalidInput {
                reason: "username must not be empty",
            });
        }
        Ok(self.tree.insert(FoldedName::new(username), username.to_owned()))
    }

    /// Drops `username` (matched ignoring case) from the index.
    pub fn remove_user(&mut self, username: &str) -> bool {
        self.tree.remove(FoldedName::new(username).0.as_str()).is_some()
    }

    /// Case-insensitive exact lookup.
    ///
    /// # Complexity
    ///
    /// O(log n)
    #[must_use]
    pub fn user_exists(&self, username: &str) -> bool {
        self.tree.contains_key(FoldedName::new(username).0.as_str())
    }

    /// Every indexed username whose lower-cased form starts with the
    /// lower-cased `prefix`, in index order. An empty prefix matches nothing.
    #[must_use]
    pub fn search_by_prefix(&self, prefix: &str) -> Vec<String> {
        let mut matches = Vec::new();
        if prefix.is_empty() {
            return matches;
        }

        let prefix = FoldedName::new(prefix).0;
        // A left subtree only holds keys below its parent; when the parent is
        // already below the prefix, nothing there can start with it. Right
        // subtrees are always searched.
        self.tree.for_each_pruned(
            |key| prefix.as_str() <= key.0.as_str(),
            |key, original| {
                if key.0.starts_with(&prefix) {
                    matches.push(original.clone());
                }
            },
        );
        matches
    }

    /// Every indexed username whose lower-cased form contains the lower-cased
    /// `query`, in index order. This is a full scan. An empty query matches
    /// nothing.
    #[must_use]
    pub fn search_by_substring(&self, query: &str) -> Vec<String> {
        if query.is_empty() {
            return Vec::new();
        }

        let query = FoldedName::new(query).0;
        self.tree
            .iter()
            .filter(|(key, _)| key.0.contains(&query))
            .map(|(_, original)| original.clone())
            .collect()
    }

    /// All indexed usernames in case-insensitive order.
    #[must_use]
    pub fn all_users(&self) -> Vec<String> {
        self.tree.iter().map(|(_, original)| original.clone()).collect()
    }

    pub fn clear(&mut self) {
        self.tree.clear();
    }

    /// Replaces the whole index with `users`, skipping empty names.
    pub fn rebuild_from_users<I>(&mut self, users: I)
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        self.clear();
        for user in users {
            let user = user.as_ref();
            if !user.is_empty() {
                self.tree.insert(FoldedName::new(user), user.to_owned());
            }
        }
        info!(users = self.len(), "rebuilt username index");
    }
}

impl core::fmt::Debug for PrefixSearchIndex {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_list().entries(self.tree.iter().map(|(_, original)| original)).finish()
    }
}
