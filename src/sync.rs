//! Lock-guarded handles for sharing the engine between request handlers.

use std::sync::Arc;

use parking_lot::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracing::info;

use crate::error::Result;
use crate::{FriendGraph, PrefixSearchIndex};

/// A cloneable handle to one [`FriendGraph`].
///
/// Every mutation holds the write lock for its whole duration, so no reader
/// ever sees one side of an edge without the other. Use
/// [`write`](Self::write) to run several operations as one transaction.
///
/// # Examples
///
/// ```
/// use friend_forest::{Config, FriendGraph, SharedFriendGraph};
///
/// let shared = SharedFriendGraph::new(FriendGraph::with_users(&Config::default(), ["ann", "bob"])?);
/// let handle = shared.clone();
///
/// handle.send_friend_request("ann", "bob")?;
/// shared.accept_friend_request("ann", "bob")?;
/// assert!(handle.read().are_friends("ann", "bob")?);
/// # Ok::<(), friend_forest::GraphError>(())
/// ```
#[derive(Clone, Debug, Default)]
pub struct SharedFriendGraph {
    inner: Arc<RwLock<FriendGraph>>,
}

impl SharedFriendGraph {
    #[must_use]
    pub fn new(graph: FriendGraph) -> Self {
        Self {
            inner: Arc::new(RwLock::new(graph)),
        }
    }

    pub fn read(&self) -> RwLockReadGuard<'_, FriendGraph> {
        self.inner.read()
    }

    pub fn write(&self) -> RwLockWriteGuard<'_, FriendGraph> {
        self.inner.write()
    }

    /// See [`FriendGraph::send_friend_request`].
    ///
    /// # Errors
    ///
    /// As the wrapped operation.
    pub fn send_friend_request(&self, from: &str, to: &str) -> Result<()> {
        self.write().send_friend_request(from, to)
    }

    /// See [`FriendGraph::accept_friend_request`].
    ///
    /// # Errors
    ///
    /// As the wrapped operation.
    pub fn accept_friend_request(&self, from: &str, to: &str) -> Result<()> {
        self.write().accept_friend_request(from, to)
    }

    /// See [`FriendGraph::reject_friend_request`].
    ///
    /// # Errors
    ///
    /// As the wrapped operation.
    pub fn reject_friend_request(&self, from: &str, to: &str) -> Result<()> {
        self.write().reject_friend_request(from, to)
    }

    /// See [`FriendGraph::cancel_friend_request`].
    ///
    /// # Errors
    ///
    /// As the wrapped operation.
    pub fn cancel_friend_request(&self, from: &str, to: &str) -> Result<()> {
        self.write().cancel_friend_request(from, to)
    }

    /// See [`FriendGraph::remove_friend`].
    ///
    /// # Errors
    ///
    /// As the wrapped operation.
    pub fn remove_friend(&self, username: &str, friend_name: &str) -> Result<()> {
        self.write().remove_friend(username, friend_name)
    }
}

/// A [`PrefixSearchIndex`] that can be rebuilt while it is being searched.
///
/// Readers take an `Arc` to the current index and search it without holding
/// any lock. A rebuild constructs the new index off-lock and publishes it
/// with a single pointer swap; readers holding the old `Arc` finish against
/// the old index.
#[derive(Debug, Default)]
pub struct SharedUserIndex {
    current: RwLock<Arc<PrefixSearchIndex>>,
}

impl SharedUserIndex {
    #[must_use]
    pub fn new(index: PrefixSearchIndex) -> Self {
        Self {
            current: RwLock::new(Arc::new(index)),
        }
    }

    /// The index as of now.
    #[must_use]
    pub fn snapshot(&self) -> Arc<PrefixSearchIndex> {
        Arc::clone(&*self.current.read())
    }

    /// Replaces the published index with one built from `users`.
    pub fn rebuild<I>(&self, users: I)
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        let fresh = Arc::new(PrefixSearchIndex::from_users(users));
        let users = fresh.len();
        *self.current.write() = fresh;
        info!(users, "published username index");
    }

    /// Rebuilds from every user registered in `graph`.
    pub fn rebuild_from_graph(&self, graph: &SharedFriendGraph) {
        let usernames = graph.read().usernames();
        self.rebuild(usernames);
    }

    #[must_use]
    pub fn search_by_prefix(&self, prefix: &str) -> Vec<String> {
        self.snapshot().search_by_prefix(prefix)
    }

    #[must_use]
    pub fn search_by_substring(&self, query: &str) -> Vec<String> {
        self.snapshot().search_by_substring(query)
    }

    #[must_use]
    pub fn user_exists(&self, username: &str) -> bool {
        self.snapshot().user_exists(username)
    }
}
