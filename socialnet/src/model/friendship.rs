use std::fmt::{Display, Formatter};

use crate::model::UserId;

/// An undirected edge between two distinct users.
///
/// The service never stores these. They are derived from neighbor sets for enumeration and handed
/// to [crate::UserStore] backends that persist edges separately.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Friendship {
    pub user1: UserId,
    pub user2: UserId,
}

impl Friendship {
    pub fn new(user1: UserId, user2: UserId) -> Self {
        Self { user1, user2 }
    }

    pub fn involves(&self, id: &UserId) -> bool {
        &self.user1 == id || &self.user2 == id
    }

    /// True if this edge joins `a` and `b`, in either direction.
    pub fn connects(&self, a: &UserId, b: &UserId) -> bool {
        (&self.user1 == a && &self.user2 == b) || (&self.user1 == b && &self.user2 == a)
    }
}

impl Display for Friendship {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} <-> {}", self.user1, self.user2)
    }
}
