//! The error taxonomy shared by every engine operation.

use std::fmt;
use std::io;

use thiserror::Error;

/// Result alias used throughout the crate.
pub type Result<T, E = GraphError> = core::result::Result<T, E>;

/// Relationship state a [`FriendGraph`](crate::FriendGraph) operation
/// required but did not find.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum Precondition {
    /// The two users are already friends.
    AlreadyFriends,
    /// A request in the same direction is already waiting.
    RequestAlreadyPending,
    /// There is no request in the given direction.
    NoPendingRequest,
    /// The two users are not friends.
    NotFriends,
}

impl fmt::Display for Precondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Precondition::AlreadyFriends => "users are already friends",
            Precondition::RequestAlreadyPending => "friend request already pending",
            Precondition::NoPendingRequest => "no pending friend request",
            Precondition::NotFriends => "users are not friends",
        })
    }
}

/// Coarse classification of a [`GraphError`], one per failure class an
/// outer layer has to map (for example onto HTTP status codes).
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum ErrorKind {
    NotFound,
    InvalidInput,
    PreconditionFailed,
    IoFailure,
}

#[derive(Error, Debug)]
pub enum GraphError {
    #[error("user not found: {username}")]
    NotFound { username: String },

    #[error("invalid input: {reason}")]
    InvalidInput { reason: &'static str },

    #[error("precondition failed: {0}")]
    PreconditionFailed(Precondition),

    #[error("{username} already has the maximum of {limit} friends")]
    CapacityExceeded { username: String, limit: usize },

    #[error("invalid configuration value for {key}: {reason}")]
    InvalidConfig { key: &'static str, reason: String },

    #[error("corrupt record on line {line}: {reason}")]
    Corrupt { line: usize, reason: &'static str },

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl GraphError {
    pub(crate) fn not_found(username: &str) -> Self {
        GraphError::NotFound {
            username: username.to_owned(),
        }
    }

    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            GraphError::NotFound { .. } => ErrorKind::NotFound,
            GraphError::InvalidInput { .. } | GraphError::InvalidConfig { .. } => ErrorKind::InvalidInput,
            GraphError::PreconditionFailed(_) | GraphError::CapacityExceeded { .. } => ErrorKind::PreconditionFailed,
            GraphError::Corrupt { .. } | GraphError::Io(_) | GraphError::Json(_) => ErrorKind::IoFailure,
        }
    }
}

impl From<Precondition> for GraphError {
    fn from(precondition: Precondition) -> Self {
        GraphError::PreconditionFailed(precondition)
    }
}
