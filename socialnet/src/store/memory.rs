use crate::error::Result;
use crate::model::{User, UserId};
use crate::store::UserStore;
use crate::validate::{UserValidator, Validator};

/// Keeps every user in memory, enumerated in insertion order.
#[derive(Debug)]
pub struct MemoryStore<V: Validator<User> = UserValidator> {
    users: Vec<User>,
    validator: V,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::with_validator(UserValidator)
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl<V: Validator<User>> MemoryStore<V> {
    pub fn with_validator(validator: V) -> Self {
        Self {
            users: vec![],
            validator,
        }
    }

    pub fn len(&self) -> usize {
        self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }

    /// Befriends two stored users directly, without validation. Returns false if either is
    /// unknown, they are the same user, or they are already friends.
    pub(crate) fn link(&mut self, a: &UserId, b: &UserId) -> bool {
        let (Some(ia), Some(ib)) = (self.position(a), self.position(b)) else {
            return false;
        };
        if ia == ib || self.users[ia].is_friend_of(b) {
            return false;
        }
        self.users[ia].add_friend(b.clone());
        self.users[ib].add_friend(a.clone());
        true
    }

    fn position(&self, id: &UserId) -> Option<usize> {
        self.users.iter().position(|user| user.id() == id)
    }
}

impl<V: Validator<User>> UserStore for MemoryStore<V> {
    fn find_by_id(&self, id: &UserId) -> Option<User> {
        self.users.iter().find(|user| user.id() == id).cloned()
    }

    fn find_all(&self) -> Vec<User> {
        self.users.clone()
    }

    fn save(&mut self, user: User) -> Result<Option<User>> {
        self.validator.check(&user)?;
        if let Some(existing) = self.find_by_id(user.id()) {
            return Ok(Some(existing));
        }
        self.users.push(user);
        Ok(None)
    }

    fn delete(&mut self, id: &UserId) -> Result<Option<User>> {
        Ok(self.position(id).map(|index| self.users.remove(index)))
    }

    fn update(&mut self, user: User) -> Result<Option<User>> {
        self.validator.check(&user)?;
        match self.position(user.id()) {
            None => Ok(Some(user)),
            Some(index) => {
                self.users[index] = user;
                Ok(None)
            }
        }
    }

    fn exists(&self, id: &UserId) -> bool {
        self.position(id).is_some()
    }
}
