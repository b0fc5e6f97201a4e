use std::collections::{BTreeSet, HashMap};
use std::fmt::{Display, Formatter};

use serde::Deserialize;

/// Stable identifier of a [User].
///
/// Friendships are expressed purely in terms of ids. The [crate::UserStore] is the only place an
/// id resolves to a full [User] record.
#[derive(Debug, Default, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Deserialize)]
#[serde(transparent)]
pub struct UserId(String);

impl UserId {
    pub fn new(id: impl ToString) -> Self {
        Self(id.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for UserId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for UserId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for UserId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// A member of the social network.
///
/// The neighbor set is only mutated from within this crate, which keeps friendships symmetric:
/// `a` lists `b` as a friend if and only if `b` lists `a`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    id: UserId,
    pub first_name: String,
    pub last_name: String,
    friends: BTreeSet<UserId>,
}

impl User {
    pub fn new(id: impl Into<UserId>, first_name: impl ToString, last_name: impl ToString) -> Self {
        Self {
            id: id.into(),
            first_name: first_name.to_string(),
            last_name: last_name.to_string(),
            friends: BTreeSet::new(),
        }
    }

    pub fn id(&self) -> &UserId {
        &self.id
    }

    /// Ids of this user's friends, in id order.
    pub fn friends(&self) -> &BTreeSet<UserId> {
        &self.friends
    }

    pub fn is_friend_of(&self, id: &UserId) -> bool {
        self.friends.contains(id)
    }

    /// Returns false if `id` was already a friend or is this user's own id.
    pub(crate) fn add_friend(&mut self, id: UserId) -> bool {
        if id == self.id {
            return false;
        }
        self.friends.insert(id)
    }

    pub(crate) fn remove_friend(&mut self, id: &UserId) -> bool {
        self.friends.remove(id)
    }

    pub(crate) fn with_friends_of(mut self, other: &User) -> Self {
        self.friends = other.friends.clone();
        self
    }

    pub(crate) fn without_friends(mut self) -> Self {
        self.friends.clear();
        self
    }
}

impl Display for User {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {} {}", self.id, self.first_name, self.last_name)
    }
}

pub(crate) fn index_by_id(users: &[User]) -> HashMap<&UserId, &User> {
    users.iter().map(|user| (user.id(), user)).collect()
}
