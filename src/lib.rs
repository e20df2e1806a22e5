//! Friend-relationship engine for a social network, built on AVL trees.
//!
//! This crate provides:
//!
//! - [`BalancedSet`] - a generic ordered set, used for every friend list
//! - [`RankedTree`] - candidates ordered by mutual-friend count against a fixed reference
//! - [`PrefixSearchIndex`] - case-insensitive username search by prefix or substring
//! - [`FriendGraph`] - friend requests, friendships, mutual friends and suggestions
//!
//! # Example
//!
//! ```
//! use friend_forest::{Config, FriendGraph, PrefixSearchIndex};
//!
//! let mut graph = FriendGraph::with_users(&Config::default(), ["Alice", "Bob", "Carol"])?;
//!
//! graph.send_friend_request("Alice", "Bob")?;
//! graph.accept_friend_request("Alice", "Bob")?;
//! graph.send_friend_request("Bob", "Carol")?;
//! graph.accept_friend_request("Bob", "Carol")?;
//!
//! // Carol is a friend of Alice's friend Bob.
//! assert_eq!(graph.suggest_friends("Alice")?, ["Carol"]);
//! assert_eq!(graph.mutual_friends("Alice", "Carol")?, ["Bob"]);
//!
//! let index = PrefixSearchIndex::from_users(graph.usernames());
//! assert_eq!(index.search_by_prefix("CA"), ["Carol"]);
//! # Ok::<(), friend_forest::GraphError>(())
//! ```
//!
//! # Implementation
//!
//! All three tree types share one AVL engine whose nodes live in a slot arena
//! and link to each other through compact handles. The different orderings
//! are expressed through key types rather than separate tree
//! implementations. Mutations walk down iteratively, record the path, and
//! retrace it to restore balance.
//!
//! The graph itself is single-threaded; wrap it in a [`SharedFriendGraph`] to
//! share it between handlers.

// These forbid rules and lint groups are meant to be very restrictive.
#![forbid(unsafe_code)]
#![forbid(keyword_idents)]
#![forbid(non_ascii_idents)]
#![forbid(unreachable_pub)]
#![warn(clippy::all)]
#![warn(clippy::cargo)]
#![warn(clippy::pedantic)]
// Enable coverage attributes for nightly builds.
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

mod raw;

pub mod balanced_set;
pub mod config;
pub mod error;
pub mod friend_graph;
pub mod prefix_index;
pub mod ranked_tree;
pub mod store;
pub mod sync;

pub use balanced_set::BalancedSet;
pub use config::Config;
pub use error::{ErrorKind, GraphError, Precondition, Result};
pub use friend_graph::{FriendGraph, RestoreReport};
pub use prefix_index::PrefixSearchIndex;
pub use ranked_tree::RankedTree;
pub use store::GraphSnapshot;
pub use sync::{SharedFriendGraph, SharedUserIndex};
