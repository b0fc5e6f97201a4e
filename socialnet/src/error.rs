use thiserror::Error;

use crate::model::UserId;

pub type Result<T> = std::result::Result<T, Error>;

/// Every failure surfaced by the social network. Nothing is retried or recovered locally.
#[derive(Error, Debug)]
pub enum Error {
    #[error("User '{0}' does not exist.")]
    UserNotFound(UserId),

    #[error("Users '{0}' and '{1}' are already friends.")]
    DuplicateFriendship(UserId, UserId),

    #[error("User '{0}' cannot be friends with itself.")]
    SelfFriendship(UserId),

    /// Raised by a [crate::UserStore] when a record fails its attribute checks. The message is
    /// passed through untouched.
    #[error("Validation failed: {0}")]
    ValidationFailed(String),

    #[error("User '{0}' already exists.")]
    AlreadyExists(UserId),

    #[error(transparent)]
    Storage(#[from] anyhow::Error),
}
