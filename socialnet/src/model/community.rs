use crate::model::UserId;

/// A maximal set of users transitively connected by friendships.
///
/// Members are kept in discovery order; the first member is the origin the traversal started from.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Community {
    members: Vec<UserId>,
}

impl Community {
    pub fn new(members: Vec<UserId>) -> Self {
        Self { members }
    }

    pub fn members(&self) -> &[UserId] {
        &self.members
    }

    pub fn origin(&self) -> Option<&UserId> {
        self.members.first()
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}
