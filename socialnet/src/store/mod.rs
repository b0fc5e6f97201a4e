mod file;
mod memory;
mod sqlite;

pub use file::FileStore;
pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

use crate::error::Result;
use crate::model::{Friendship, User, UserId};

/// Storage for [User] records, keyed by [UserId].
///
/// The store owns every user, including each user's neighbor set. [crate::SocialNetwork] reads
/// records out, changes them, and writes them back through [UserStore::update]; it holds no
/// copy of its own.
///
/// Backends that persist friendship edges separately from users override
/// [UserStore::save_friendship] and [UserStore::delete_friendship]. Everyone else gets the no-op
/// defaults.
pub trait UserStore {
    fn find_by_id(&self, id: &UserId) -> Option<User>;

    /// All users in a stable, backend-defined order. Community origins and sociability
    /// tie-breaks follow this order.
    fn find_all(&self) -> Vec<User>;

    /// Returns the pre-existing user if `user.id()` is already taken, `None` on success.
    fn save(&mut self, user: User) -> Result<Option<User>>;

    /// Returns the removed user, or `None` if there was nothing to remove.
    fn delete(&mut self, id: &UserId) -> Result<Option<User>>;

    /// Returns `user` unchanged if its id is unknown, `None` on success.
    fn update(&mut self, user: User) -> Result<Option<User>>;

    fn save_friendship(&mut self, _friendship: &Friendship) -> Result<()> {
        Ok(())
    }

    fn delete_friendship(&mut self, _friendship: &Friendship) -> Result<()> {
        Ok(())
    }

    fn exists(&self, id: &UserId) -> bool {
        self.find_by_id(id).is_some()
    }
}

impl<S: UserStore + ?Sized> UserStore for Box<S> {
    fn find_by_id(&self, id: &UserId) -> Option<User> {
        (**self).find_by_id(id)
    }

    fn find_all(&self) -> Vec<User> {
        (**self).find_all()
    }

    fn save(&mut self, user: User) -> Result<Option<User>> {
        (**self).save(user)
    }

    fn delete(&mut self, id: &UserId) -> Result<Option<User>> {
        (**self).delete(id)
    }

    fn update(&mut self, user: User) -> Result<Option<User>> {
        (**self).update(user)
    }

    fn save_friendship(&mut self, friendship: &Friendship) -> Result<()> {
        (**self).save_friendship(friendship)
    }

    fn delete_friendship(&mut self, friendship: &Friendship) -> Result<()> {
        (**self).delete_friendship(friendship)
    }

    fn exists(&self, id: &UserId) -> bool {
        (**self).exists(id)
    }
}
