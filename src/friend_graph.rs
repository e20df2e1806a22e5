//! The friend-relationship lifecycle: requests, acceptance, removal, and the
//! queries derived from the resulting friend sets.

use std::collections::HashMap;

use tracing::{debug, error, info, warn};

use crate::config::Config;
use crate::error::{GraphError, Precondition, Result};
use crate::store::GraphSnapshot;
use crate::{BalancedSet, RankedTree};

/// Every registered user's friend set plus the table of pending requests.
///
/// An edge between `a` and `b` is stored twice, as `b` in `a`'s set and `a` in
/// `b`'s set; every mutation writes both sides or neither. Pending requests
/// are keyed by receiver and hold the set of senders. A pending request and
/// an edge never exist between the same two users.
///
/// # Examples
///
/// ```
/// use friend_forest::{Config, FriendGraph};
///
/// let mut graph = FriendGraph::with_users(&Config::default(), ["ann", "bob"])?;
/// graph.send_friend_request("ann", "bob")?;
/// assert_eq!(graph.pending_requests("bob")?, ["ann"]);
///
/// graph.accept_friend_request("ann", "bob")?;
/// assert!(graph.are_friends("bob", "ann")?);
/// assert!(graph.pending_requests("bob")?.is_empty());
/// # Ok::<(), friend_forest::GraphError>(())
/// ```
#[derive(Clone, Debug, Default)]
pub struct FriendGraph {
    max_friends: Option<usize>,
    friends: HashMap<String, BalancedSet<String>>,
    /// Receiver to the senders of requests waiting on them.
    pending: HashMap<String, BalancedSet<String>>,
}

/// Outcome of [`FriendGraph::restore`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RestoreReport {
    /// Edges that were not already present.
    pub edges: usize,
    /// Pending requests that were not already present.
    pub pending: usize,
    /// Entries dropped because they named unknown users or contradicted the
    /// graph.
    pub skipped: usize,
}

impl FriendGraph {
    /// Creates a graph with no users.
    #[must_use]
    pub fn new(config: &Config) -> Self {
        Self {
            max_friends: config.max_friends,
            ..Self::default()
        }
    }

    /// Creates a graph and registers every name in `users`.
    ///
    /// # Errors
    ///
    /// [`GraphError::InvalidInput`] if a name is empty.
    pub fn with_users<I>(config: &Config, users: I) -> Result<Self>
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        let mut graph = Self::new(config);
        for user in users {
            graph.register_user(user.as_ref())?;
        }
        Ok(graph)
    }

    /// Attaches an empty friend set to a new account. Returns `false` if the
    /// user is already registered.
    ///
    /// # Errors
    ///
    /// [`GraphError::InvalidInput`] if `username` is empty.
    pub fn register_user(&mut self, username: &str) -> Result<bool> {
        validate_name(username)?;
        if self.friends.contains_key(username) {
            return Ok(false);
        }
        self.friends.insert(username.to_owned(), BalancedSet::new());
        debug!(username, "registered user");
        Ok(true)
    }

    /// Account-deletion hook: drops the user's friend set, removes the user
    /// from every friend's set, and discards requests to and from the user.
    ///
    /// # Errors
    ///
    /// [`GraphError::NotFound`] if the user is not registered.
    pub fn remove_user(&mut self, username: &str) -> Result<()> {
        let friends = self
            .friends
            .remove(username)
            .ok_or_else(|| GraphError::not_found(username))?;

        for friend in &friends {
            if let Some(set) = self.friends.get_mut(friend.as_str()) {
                set.remove(username);
            }
        }
        self.pending.remove(username);
        self.pending.retain(|_, senders| {
            senders.remove(username);
            !senders.is_empty()
        });

        info!(username, friends = friends.len(), "removed user");
        Ok(())
    }

    #[must_use]
    pub fn contains_user(&self, username: &str) -> bool {
        self.friends.contains_key(username)
    }

    #[must_use]
    pub fn user_count(&self) -> usize {
        self.friends.len()
    }

    /// Every registered username, sorted.
    #[must_use]
    pub fn usernames(&self) -> Vec<String> {
        let mut names: Vec<String> = self.friends.keys().cloned().collect();
        names.sort_unstable();
        names
    }

    /// Total number of pending requests.
    #[must_use]
    pub fn pending_count(&self) -> usize {
        self.pending.values().map(BalancedSet::len).sum()
    }

    /// Records a request from `from` to `to`.
    ///
    /// A request in the opposite direction does not block this one; the two
    /// are kept side by side until either is accepted.
    ///
    /// # Errors
    ///
    /// - [`GraphError::InvalidInput`] if `from == to` or a name is empty.
    /// - [`GraphError::NotFound`] if either user is unknown.
    /// - [`Precondition::AlreadyFriends`] or
    ///   [`Precondition::RequestAlreadyPending`].
    pub fn send_friend_request(&mut self, from: &str, to: &str) -> Result<()> {
        if from == to {
            return Err(GraphError::InvalidInput {
                reason: "cannot send a friend request to yourself",
            });
        }
        self.ensure_pair(from, to)?;

        if self.are_friends(from, to)? {
            return Err(Precondition::AlreadyFriends.into());
        }
        if !self.pending.entry(to.to_owned()).or_default().insert(from.to_owned()) {
            return Err(Precondition::RequestAlreadyPending.into());
        }

        debug!(from, to, "friend request sent");
        Ok(())
    }

    /// Turns the pending request from `from` to `to` into a friendship.
    ///
    /// If the second side of the edge cannot be written, the first side is
    /// undone and the request is put back, so the call either fully succeeds
    /// or leaves the graph as it was. A crossing request from `to` to `from`
    /// is cleared on success.
    ///
    /// # Errors
    ///
    /// - [`GraphError::NotFound`] if either user is unknown.
    /// - [`Precondition::NoPendingRequest`].
    /// - [`GraphError::CapacityExceeded`] if either friend set is full.
    pub fn accept_friend_request(&mut self, from: &str, to: &str) -> Result<()> {
        self.ensure_pair(from, to)?;
        if !self.take_pending(to, from) {
            return Err(Precondition::NoPendingRequest.into());
        }

        if let Err(e) = self.link_both(to, from) {
            error!(from, to, error = %e, "accept failed, request restored");
            self.add_pending(to, from);
            return Err(e);
        }

        if self.take_pending(from, to) {
            debug!(from = to, to = from, "cleared crossing friend request");
        }
        debug!(from, to, "friend request accepted");
        Ok(())
    }

    /// The receiver `to` declines the request from `from`.
    ///
    /// # Errors
    ///
    /// [`GraphError::NotFound`] or [`Precondition::NoPendingRequest`].
    pub fn reject_friend_request(&mut self, from: &str, to: &str) -> Result<()> {
        self.withdraw(from, to)?;
        debug!(from, to, "friend request rejected");
        Ok(())
    }

    /// The sender `from` withdraws its request to `to`.
    ///
    /// # Errors
    ///
    /// [`GraphError::NotFound`] or [`Precondition::NoPendingRequest`].
    pub fn cancel_friend_request(&mut self, from: &str, to: &str) -> Result<()> {
        self.withdraw(from, to)?;
        debug!(from, to, "friend request cancelled");
        Ok(())
    }

    /// Ends the friendship between `username` and `friend_name`.
    ///
    /// # Errors
    ///
    /// [`GraphError::NotFound`] or [`Precondition::NotFriends`].
    pub fn remove_friend(&mut self, username: &str, friend_name: &str) -> Result<()> {
        self.ensure_pair(username, friend_name)?;
        if !self.are_friends(username, friend_name)? {
            return Err(Precondition::NotFriends.into());
        }

        self.unlink(username, friend_name);
        self.unlink(friend_name, username);
        debug!(username, friend_name, "friendship removed");
        Ok(())
    }

    /// The user's friends in ascending order.
    ///
    /// # Errors
    ///
    /// [`GraphError::NotFound`] if the user is unknown.
    pub fn friend_list(&self, username: &str) -> Result<Vec<String>> {
        Ok(self.friend_set(username)?.in_order())
    }

    /// Senders of requests waiting on `username`, in ascending order.
    ///
    /// # Errors
    ///
    /// [`GraphError::NotFound`] if the user is unknown.
    pub fn pending_requests(&self, username: &str) -> Result<Vec<String>> {
        self.ensure_user(username)?;
        Ok(self.pending.get(username).map(BalancedSet::in_order).unwrap_or_default())
    }

    /// Receivers of requests `username` has sent, in ascending order.
    ///
    /// # Errors
    ///
    /// [`GraphError::NotFound`] if the user is unknown.
    pub fn sent_requests(&self, username: &str) -> Result<Vec<String>> {
        self.ensure_user(username)?;
        let mut receivers: Vec<String> = self
            .pending
            .iter()
            .filter(|(_, senders)| senders.contains(username))
            .map(|(receiver, _)| receiver.clone())
            .collect();
        receivers.sort_unstable();
        Ok(receivers)
    }

    /// # Errors
    ///
    /// [`GraphError::NotFound`] if either user is unknown.
    pub fn are_friends(&self, user_a: &str, user_b: &str) -> Result<bool> {
        self.ensure_user(user_b)?;
        Ok(self.friend_set(user_a)?.contains(user_b))
    }

    /// # Errors
    ///
    /// [`GraphError::NotFound`] if the user is unknown.
    pub fn friend_count(&self, username: &str) -> Result<usize> {
        Ok(self.friend_set(username)?.len())
    }

    /// Friends shared by both users, in ascending order.
    ///
    /// # Errors
    ///
    /// [`GraphError::NotFound`] if either user is unknown.
    pub fn mutual_friends(&self, user_a: &str, user_b: &str) -> Result<Vec<String>> {
        let a = self.friend_set(user_a)?;
        let b = self.friend_set(user_b)?;
        Ok(a.intersection(b).into_iter().cloned().collect())
    }

    /// Friends of friends who are neither `username` nor already its friends,
    /// de-duplicated and in ascending order.
    ///
    /// # Errors
    ///
    /// [`GraphError::NotFound`] if the user is unknown.
    pub fn suggest_friends(&self, username: &str) -> Result<Vec<String>> {
        let direct = self.friend_set(username)?;
        let mut suggestions: BalancedSet<&str> = BalancedSet::new();

        for friend in direct {
            let Some(second_degree) = self.friends.get(friend.as_str()) else {
                continue;
            };
            for candidate in second_degree {
                if candidate != username && !direct.contains(candidate.as_str()) {
                    suggestions.insert(candidate.as_str());
                }
            }
        }

        Ok(suggestions.iter().map(|name| (*name).to_owned()).collect())
    }

    /// [`suggest_friends`](Self::suggest_friends), ranked by how many friends
    /// each suggestion shares with `username`, highest first.
    ///
    /// # Errors
    ///
    /// [`GraphError::NotFound`] if the user is unknown.
    pub fn ranked_suggestions(&self, username: &str) -> Result<Vec<(String, usize)>> {
        let candidates = self.suggest_friends(username)?;
        Ok(self.rank_by_mutual_friends(username, &candidates)?.ranked())
    }

    /// Ranks `candidates` by mutual-friend count against a snapshot of
    /// `reference_user`'s current friend list. The returned tree does not
    /// follow later changes to the graph.
    ///
    /// # Errors
    ///
    /// [`GraphError::NotFound`] if the reference user or a candidate is
    /// unknown.
    pub fn rank_by_mutual_friends<I>(&self, reference_user: &str, candidates: I) -> Result<RankedTree>
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        let mut ranked = RankedTree::new(self.friend_set(reference_user)?);
        for candidate in candidates {
            let candidate = candidate.as_ref();
            ranked.insert(candidate, self.friend_set(candidate)?);
        }
        Ok(ranked)
    }

    /// Copies the friend sets and pending table into their persisted form.
    #[must_use]
    pub fn snapshot(&self) -> GraphSnapshot {
        GraphSnapshot {
            friends: self
                .friends
                .iter()
                .map(|(user, set)| (user.clone(), set.in_order()))
                .collect(),
            pending: self
                .pending
                .iter()
                .filter(|(_, senders)| !senders.is_empty())
                .map(|(receiver, senders)| (receiver.clone(), senders.in_order()))
                .collect(),
        }
    }

    /// Merges a persisted snapshot into the graph.
    ///
    /// Edges are written in both directions, and a new edge drops any request
    /// already pending between the two users. Entries naming unregistered
    /// users, self-friendships, edges that would exceed the friend limit, and
    /// requests between users who are already friends are skipped with a
    /// warning.
    pub fn restore(&mut self, snapshot: &GraphSnapshot) -> RestoreReport {
        let mut report = RestoreReport::default();

        for (owner, names) in &snapshot.friends {
            if !self.contains_user(owner) {
                warn!(user = owner.as_str(), "skipping friends of unknown user");
                report.skipped += names.len();
                continue;
            }
            for name in names {
                if name == owner || !self.contains_user(name) {
                    warn!(user = owner.as_str(), friend = name.as_str(), "skipping unknown friend");
                    report.skipped += 1;
                    continue;
                }
                if self.friend_set(owner).is_ok_and(|set| set.contains(name.as_str())) {
                    continue;
                }
                match self.link_both(owner, name) {
                    Ok(()) => {
                        self.take_pending(owner, name);
                        self.take_pending(name, owner);
                        report.edges += 1;
                    }
                    Err(e) => {
                        warn!(user = owner.as_str(), friend = name.as_str(), error = %e, "skipping edge");
                        report.skipped += 1;
                    }
                }
            }
        }

        for (receiver, senders) in &snapshot.pending {
            for sender in senders {
                let valid = sender != receiver
                    && self.contains_user(receiver)
                    && self.contains_user(sender)
                    && !self.are_friends(receiver, sender).unwrap_or(true);
                if !valid {
                    warn!(receiver = receiver.as_str(), sender = sender.as_str(), "skipping pending request");
                    report.skipped += 1;
                } else if self.add_pending(receiver, sender) {
                    report.pending += 1;
                }
            }
        }

        info!(
            edges = report.edges,
            pending = report.pending,
            skipped = report.skipped,
            "restored friend graph"
        );
        report
    }

    fn friend_set(&self, username: &str) -> Result<&BalancedSet<String>> {
        validate_name(username)?;
        self.friends.get(username).ok_or_else(|| GraphError::not_found(username))
    }

    fn ensure_user(&self, username: &str) -> Result<()> {
        self.friend_set(username).map(|_| ())
    }

    fn ensure_pair(&self, a: &str, b: &str) -> Result<()> {
        self.ensure_user(a)?;
        self.ensure_user(b)
    }

    /// Removes a pending request without creating an edge.
    fn withdraw(&mut self, from: &str, to: &str) -> Result<()> {
        self.ensure_pair(from, to)?;
        if self.take_pending(to, from) {
            Ok(())
        } else {
            Err(Precondition::NoPendingRequest.into())
        }
    }

    fn add_pending(&mut self, receiver: &str, sender: &str) -> bool {
        self.pending
            .entry(receiver.to_owned())
            .or_default()
            .insert(sender.to_owned())
    }

    fn take_pending(&mut self, receiver: &str, sender: &str) -> bool {
        let Some(senders) = self.pending.get_mut(receiver) else {
            return false;
        };
        let removed = senders.remove(sender);
        if senders.is_empty() {
            self.pending.remove(receiver);
        }
        removed
    }

    /// Writes `a <-> b`. If the second side fails, the first is undone.
    fn link_both(&mut self, a: &str, b: &str) -> Result<()> {
        let inserted = self.link(a, b)?;
        if let Err(e) = self.link(b, a) {
            if inserted {
                self.unlink(a, b);
            }
            return Err(e);
        }
        Ok(())
    }

    /// Adds `friend` to `owner`'s set, honouring the friend limit. Returns
    /// whether the name was newly added.
    fn link(&mut self, owner: &str, friend: &str) -> Result<bool> {
        let limit = self.max_friends;
        let set = self
            .friends
            .get_mut(owner)
            .ok_or_else(|| GraphError::not_found(owner))?;

        if let Some(limit) = limit
            && set.len() >= limit
            && !set.contains(friend)
        {
            return Err(GraphError::CapacityExceeded {
                username: owner.to_owned(),
                limit,
            });
        }
        Ok(set.insert(friend.to_owned()))
    }

    fn unlink(&mut self, owner: &str, friend: &str) {
        if let Some(set) = self.friends.get_mut(owner) {
            set.remove(friend);
        }
    }
}

fn validate_name(username: &str) -> Result<()> {
    if username.is_empty() {
        Err(GraphError::InvalidInput {
            reason: "username must not be empty",
        })
    } else {
        Ok(())
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use pretty_assertions::assert_eq;

    fn graph(users: &[&str]) -> FriendGraph {
        FriendGraph::with_users(&Config::default(), users).unwrap()
    }

    fn befriend(graph: &mut FriendGraph, a: &str, b: &str) {
        graph.send_friend_request(a, b).unwrap();
        graph.accept_friend_request(a, b).unwrap();
    }

    impl FriendGraph {
        /// Every edge is mirrored and never coexists with a pending request.
        fn assert_consistent(&self) {
            for (owner, set) in &self.friends {
                for friend in set {
                    assert!(
                        self.friends[friend.as_str()].contains(owner.as_str()),
                        "{owner} -> {friend} is not mirrored"
                    );
                    assert!(!self.pending.get(owner).is_some_and(|s| s.contains(friend.as_str())));
                    assert!(!self.pending.get(friend).is_some_and(|s| s.contains(owner.as_str())));
                }
            }
            assert!(self.pending.values().all(|senders| !senders.is_empty()));
        }
    }

    #[test]
    fn request_then_accept_creates_an_edge() {
        let mut g = graph(&["a", "b"]);
        g.send_friend_request("a", "b").unwrap();
        g.accept_friend_request("a", "b").unwrap();

        assert!(g.are_friends("a", "b").unwrap());
        assert!(g.are_friends("b", "a").unwrap());
        assert!(!g.pending_requests("b").unwrap().contains(&"a".to_string()));
        assert_eq!(g.friend_count("a").unwrap(), 1);
        g.assert_consistent();
    }

    #[test]
    fn duplicate_request_is_refused() {
        let mut g = graph(&["a", "b"]);
        g.send_friend_request("a", "b").unwrap();
        let err = g.send_friend_request("a", "b").unwrap_err();
        assert!(matches!(err, GraphError::PreconditionFailed(Precondition::RequestAlreadyPending)));
        assert_eq!(g.pending_requests("b").unwrap(), ["a"]);
        assert_eq!(g.pending_count(), 1);
    }

    #[test]
    fn request_validation() {
        let mut g = graph(&["a", "b"]);
        assert_eq!(g.send_friend_request("a", "a").unwrap_err().kind(), ErrorKind::InvalidInput);
        assert_eq!(g.send_friend_request("a", "zed").unwrap_err().kind(), ErrorKind::NotFound);

        befriend(&mut g, "a", "b");
        assert!(matches!(
            g.send_friend_request("b", "a"),
            Err(GraphError::PreconditionFailed(Precondition::AlreadyFriends))
        ));
    }

    #[test]
    fn remove_friend_when_not_friends_changes_nothing() {
        let mut g = graph(&["a", "b"]);
        g.send_friend_request("a", "b").unwrap();
        let before = g.snapshot();

        assert!(matches!(
            g.remove_friend("a", "b"),
            Err(GraphError::PreconditionFailed(Precondition::NotFriends))
        ));
        assert_eq!(g.snapshot(), before);
    }

    #[test]
    fn remove_friend_clears_both_sides() {
        let mut g = graph(&["a", "b"]);
        befriend(&mut g, "a", "b");
        g.remove_friend("b", "a").unwrap();
        assert!(g.friend_list("a").unwrap().is_empty());
        assert!(g.friend_list("b").unwrap().is_empty());
    }

    #[test]
    fn reject_and_cancel_consume_the_request() {
        let mut g = graph(&["a", "b", "c"]);
        g.send_friend_request("a", "b").unwrap();
        g.send_friend_request("c", "b").unwrap();
        assert_eq!(g.sent_requests("a").unwrap(), ["b"]);

        g.reject_friend_request("a", "b").unwrap();
        g.cancel_friend_request("c", "b").unwrap();
        assert!(g.pending_requests("b").unwrap().is_empty());
        assert!(matches!(
            g.cancel_friend_request("c", "b"),
            Err(GraphError::PreconditionFailed(Precondition::NoPendingRequest))
        ));
        assert!(!g.are_friends("a", "b").unwrap());
    }

    #[test]
    fn accept_without_request_fails() {
        let mut g = graph(&["a", "b"]);
        assert!(matches!(
            g.accept_friend_request("a", "b"),
            Err(GraphError::PreconditionFailed(Precondition::NoPendingRequest))
        ));
    }

    #[test]
    fn crossing_requests_resolve_together() {
        let mut g = graph(&["a", "b"]);
        g.send_friend_request("a", "b").unwrap();
        g.send_friend_request("b", "a").unwrap();
        assert_eq!(g.pending_count(), 2);

        g.accept_friend_request("b", "a").unwrap();
        assert_eq!(g.pending_count(), 0);
        g.assert_consistent();
    }

    #[test]
    fn failed_accept_rolls_back_and_restores_the_request() {
        let config = Config {
            max_friends: Some(1),
            ..Config::default()
        };
        let mut g = FriendGraph::with_users(&config, ["a", "b", "c"]).unwrap();
        befriend(&mut g, "a", "c");

        // `b` gains `a` first, then `a` is found to be full.
        g.send_friend_request("a", "b").unwrap();
        let err = g.accept_friend_request("a", "b").unwrap_err();
        assert!(matches!(err, GraphError::CapacityExceeded { ref username, limit: 1 } if username == "a"));

        assert!(g.friend_list("b").unwrap().is_empty());
        assert_eq!(g.friend_list("a").unwrap(), ["c"]);
        assert_eq!(g.pending_requests("b").unwrap(), ["a"]);
        g.assert_consistent();

        // Once `a` has room the restored request goes through.
        g.remove_friend("a", "c").unwrap();
        g.accept_friend_request("a", "b").unwrap();
        assert!(g.are_friends("a", "b").unwrap());
    }

    #[test]
    fn mutual_friends_intersect() {
        let mut g = graph(&["a", "b", "x", "y", "z"]);
        befriend(&mut g, "a", "x");
        befriend(&mut g, "a", "y");
        befriend(&mut g, "b", "y");
        befriend(&mut g, "b", "z");
        assert_eq!(g.mutual_friends("a", "b").unwrap(), ["y"]);
    }

    #[test]
    fn suggestions_are_second_degree_only() {
        let mut g = graph(&["a", "b", "c"]);
        befriend(&mut g, "a", "b");
        befriend(&mut g, "b", "c");
        assert_eq!(g.suggest_friends("a").unwrap(), ["c"]);
        assert!(g.suggest_friends("b").unwrap().is_empty());
    }

    #[test]
    fn ranked_suggestions_order_by_shared_friends() {
        let mut g = graph(&["me", "f1", "f2", "s1", "s2"]);
        befriend(&mut g, "me", "f1");
        befriend(&mut g, "me", "f2");
        befriend(&mut g, "s1", "f1");
        befriend(&mut g, "s2", "f1");
        befriend(&mut g, "s2", "f2");

        assert_eq!(
            g.ranked_suggestions("me").unwrap(),
            [("s2".to_string(), 2), ("s1".to_string(), 1)]
        );
    }

    #[test]
    fn ranking_is_frozen_until_rebuilt() {
        let mut g = graph(&["me", "f1", "f2", "s1", "s2"]);
        befriend(&mut g, "me", "f1");
        befriend(&mut g, "s1", "f1");

        let ranked = g.rank_by_mutual_friends("me", &["s1", "s2"]).unwrap();
        befriend(&mut g, "me", "f2");
        befriend(&mut g, "s2", "f2");
        befriend(&mut g, "me", "s1");

        // The graph moved on; the tree still reflects the old snapshot.
        assert_eq!(ranked.in_order(), ["s1", "s2"]);
        assert_eq!(ranked.rank_of("s2"), Some(0));

        let fresh = g.rank_by_mutual_friends("me", &["s2"]).unwrap();
        assert_eq!(fresh.rank_of("s2"), Some(1));
    }

    #[test]
    fn removing_a_user_scrubs_every_reference() {
        let mut g = graph(&["a", "b", "c"]);
        befriend(&mut g, "a", "b");
        g.send_friend_request("a", "c").unwrap();
        g.send_friend_request("c", "b").unwrap();

        g.remove_user("a").unwrap();
        assert!(!g.contains_user("a"));
        assert!(g.friend_list("b").unwrap().is_empty());
        assert!(g.pending_requests("c").unwrap().is_empty());
        assert_eq!(g.pending_requests("b").unwrap(), ["c"]);
        assert_eq!(g.remove_user("a").unwrap_err().kind(), ErrorKind::NotFound);
        g.assert_consistent();
    }

    #[test]
    fn registration() {
        let mut g = graph(&[]);
        assert!(g.register_user("a").unwrap());
        assert!(!g.register_user("a").unwrap());
        assert_eq!(g.register_user("").unwrap_err().kind(), ErrorKind::InvalidInput);
        assert_eq!(g.usernames(), ["a"]);
        assert_eq!(g.friend_list("nobody").unwrap_err().kind(), ErrorKind::NotFound);
    }

    #[test]
    fn restored_edge_clears_requests_between_the_pair() {
        let mut g = graph(&["a", "b", "c"]);
        g.send_friend_request("a", "b").unwrap();
        g.send_friend_request("b", "a").unwrap();
        g.send_friend_request("c", "b").unwrap();

        let mut snapshot = GraphSnapshot::default();
        snapshot.friends.insert("a".into(), vec!["b".into()]);
        let report = g.restore(&snapshot);

        assert_eq!(report.edges, 1);
        assert!(g.are_friends("a", "b").unwrap());
        assert_eq!(g.pending_requests("b").unwrap(), ["c"]);
        assert!(g.pending_requests("a").unwrap().is_empty());
        g.assert_consistent();
    }

    #[test]
    fn empty_names_are_invalid_input_everywhere() {
        let mut g = graph(&["a"]);
        let invalid = |result: Result<()>| assert_eq!(result.unwrap_err().kind(), ErrorKind::InvalidInput);

        invalid(g.send_friend_request("", "a"));
        invalid(g.send_friend_request("a", ""));
        invalid(g.accept_friend_request("", "a"));
        invalid(g.reject_friend_request("a", ""));
        invalid(g.cancel_friend_request("", "a"));
        invalid(g.remove_friend("a", ""));
        assert_eq!(g.friend_list("").unwrap_err().kind(), ErrorKind::InvalidInput);
        assert_eq!(g.are_friends("a", "").unwrap_err().kind(), ErrorKind::InvalidInput);
        assert_eq!(g.send_friend_request("zed", "a").unwrap_err().kind(), ErrorKind::NotFound);
    }

    #[test]
    fn snapshot_restore_round_trips_and_skips_garbage() {
        let mut g = graph(&["a", "b", "c"]);
        befriend(&mut g, "a", "b");
        g.send_friend_request("c", "a").unwrap();
        let mut snapshot = g.snapshot();

        snapshot.friends.insert("ghost".into(), vec!["a".into()]);
        snapshot.friends.get_mut("c").unwrap().push("nobody".into());
        snapshot.pending.insert("b".into(), vec!["a".into()]);

        let mut fresh = graph(&["a", "b", "c"]);
        let report = fresh.restore(&snapshot);
        assert_eq!(
            report,
            RestoreReport {
                edges: 1,
                pending: 1,
                skipped: 3
            }
        );
        assert_eq!(fresh.friend_list("a").unwrap(), ["b"]);
        assert_eq!(fresh.pending_requests("a").unwrap(), ["c"]);
        assert!(fresh.pending_requests("b").unwrap().is_empty());
        fresh.assert_consistent();
    }
}
