use std::collections::HashMap;

use log::{debug, info, warn};

use crate::error::{Error, Result};
use crate::model::{index_by_id, Community, Friendship, User, UserId};
use crate::store::UserStore;
use crate::{community, sociability};

/// The social network: users, the friendships between them, and the community queries over both.
///
/// All state lives in the [UserStore]. Every query takes a fresh snapshot through
/// [UserStore::find_all], so results always reflect the latest mutation.
///
/// Operations are synchronous and assume exclusive access for their whole duration. Hosts that
/// share a network between threads must serialize access themselves, e.g. behind a single `Mutex`.
///
/// Adding a user or friendship fails loudly when an entity is missing or already present.
/// Removing is idempotent: removing something that is not there succeeds without changes.
pub struct SocialNetwork<S: UserStore> {
    store: S,
}

impl<S: UserStore> SocialNetwork<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn into_store(self) -> S {
        self.store
    }

    /// Adds `user` with no friends.
    ///
    /// Store validation failures surface as [Error::ValidationFailed]; an id collision as
    /// [Error::AlreadyExists].
    pub fn add_user(&mut self, user: User) -> Result<()> {
        let user = user.without_friends();
        let id = user.id().clone();
        if let Some(existing) = self.store.save(user)? {
            return Err(Error::AlreadyExists(existing.id().clone()));
        }
        info!("Added user '{}'", id);
        Ok(())
    }

    /// Replaces the names of an existing user. Friendships are kept as they are.
    pub fn update_user(&mut self, user: User) -> Result<()> {
        let current = self.require(user.id())?;
        self.write_back(user.with_friends_of(&current))?;
        info!("Updated user '{}'", current.id());
        Ok(())
    }

    /// Removes the user and every friendship it is part of. Returns the removed user, or `None`
    /// if `id` was unknown.
    pub fn remove_user(&mut self, id: &UserId) -> Result<Option<User>> {
        if !self.store.exists(id) {
            debug!("Remove user '{}': not found, nothing to do", id);
            return Ok(None);
        }
        // Sweep every user rather than only the removed user's own friends so that no reference
        // to `id` survives.
        let friends = self
            .store
            .find_all()
            .into_iter()
            .filter(|user| user.id() != id && user.is_friend_of(id));
        for friend in friends {
            let mut updated = friend.clone();
            updated.remove_friend(id);
            let friendship = Friendship::new(id.clone(), friend.id().clone());
            self.commit([friend], [updated], |store| store.delete_friendship(&friendship))?;
        }
        let removed = self.store.delete(id)?;
        info!("Removed user '{}'", id);
        Ok(removed)
    }

    /// Befriends `a` and `b`.
    ///
    /// Fails with [Error::SelfFriendship] if `a == b` (checked before any lookup),
    /// [Error::UserNotFound] if either user is missing, and [Error::DuplicateFriendship] if they
    /// are already friends. Nothing changes on failure.
    pub fn add_friendship(&mut self, a: &UserId, b: &UserId) -> Result<()> {
        if a == b {
            return Err(Error::SelfFriendship(a.clone()));
        }
        let user_a = self.require(a)?;
        let user_b = self.require(b)?;
        if user_a.is_friend_of(b) {
            return Err(Error::DuplicateFriendship(a.clone(), b.clone()));
        }
        let mut updated_a = user_a.clone();
        let mut updated_b = user_b.clone();
        updated_a.add_friend(b.clone());
        updated_b.add_friend(a.clone());
        let friendship = Friendship::new(a.clone(), b.clone());
        self.commit([user_a, user_b], [updated_a, updated_b], |store| {
            store.save_friendship(&friendship)
        })?;
        info!("Added friendship '{}' <-> '{}'", a, b);
        Ok(())
    }

    /// Ends the friendship between `a` and `b`. Unknown users and non-friends are a no-op.
    pub fn remove_friendship(&mut self, a: &UserId, b: &UserId) -> Result<()> {
        let (Some(user_a), Some(user_b)) = (self.store.find_by_id(a), self.store.find_by_id(b))
        else {
            debug!("Remove friendship '{}' <-> '{}': unknown user, nothing to do", a, b);
            return Ok(());
        };
        let mut updated_a = user_a.clone();
        let mut updated_b = user_b.clone();
        let removed_a = updated_a.remove_friend(b);
        let removed_b = updated_b.remove_friend(a);
        if !removed_a && !removed_b {
            debug!("Remove friendship '{}' <-> '{}': not friends, nothing to do", a, b);
            return Ok(());
        }
        let friendship = Friendship::new(a.clone(), b.clone());
        self.commit([user_a, user_b], [updated_a, updated_b], |store| {
            store.delete_friendship(&friendship)
        })?;
        info!("Removed friendship '{}' <-> '{}'", a, b);
        Ok(())
    }

    pub fn find_user(&self, id: &UserId) -> Option<User> {
        self.store.find_by_id(id)
    }

    pub fn all_users(&self) -> Vec<User> {
        self.store.find_all()
    }

    /// The friends of `id`, in id order.
    pub fn friends_of(&self, id: &UserId) -> Result<Vec<User>> {
        let user = self.require(id)?;
        Ok(user
            .friends()
            .iter()
            .filter_map(|friend| self.store.find_by_id(friend))
            .collect())
    }

    /// Every friendship exactly once, ordered by the store position of the endpoint that comes
    /// first in store order.
    pub fn friendships(&self) -> Vec<Friendship> {
        let users = self.store.find_all();
        let positions: HashMap<&UserId, usize> = users
            .iter()
            .enumerate()
            .map(|(i, user)| (user.id(), i))
            .collect();
        let mut friendships = vec![];
        for (i, user) in users.iter().enumerate() {
            for friend in user.friends() {
                if positions.get(friend).is_some_and(|&j| j > i) {
                    friendships.push(Friendship::new(user.id().clone(), friend.clone()));
                }
            }
        }
        friendships
    }

    pub fn communities(&self) -> Vec<Community> {
        community::detect(&self.store.find_all())
    }

    pub fn number_of_communities(&self) -> usize {
        let count = community::count(&self.store.find_all());
        debug!("Found {} communities", count);
        count
    }

    /// Members of the community with the most internal friendships, see
    /// [sociability::most_sociable]. Empty if no community has at least two members.
    pub fn most_sociable_community(&self) -> Vec<User> {
        let users = self.store.find_all();
        let communities = community::detect(&users);
        let Some(community) = sociability::most_sociable(&communities, &users) else {
            return vec![];
        };
        let index = index_by_id(&users);
        community
            .members()
            .iter()
            .filter_map(|id| index.get(id).map(|&user| user.clone()))
            .collect()
    }

    fn require(&self, id: &UserId) -> Result<User> {
        self.store
            .find_by_id(id)
            .ok_or_else(|| Error::UserNotFound(id.clone()))
    }

    /// Writes `updated`, then runs the store's friendship `hook`. If either step fails, the users
    /// in `previous` are written back and the first error is returned.
    fn commit<const N: usize>(
        &mut self,
        previous: [User; N],
        updated: [User; N],
        hook: impl FnOnce(&mut S) -> Result<()>,
    ) -> Result<()> {
        let result = self.write_all(updated).and_then(|()| hook(&mut self.store));
        if result.is_err() {
            for user in previous {
                let id = user.id().clone();
                if let Err(err) = self.write_back(user) {
                    warn!("Failed to restore user '{}': {}", id, err);
                }
            }
        }
        result
    }

    fn write_all<const N: usize>(&mut self, users: [User; N]) -> Result<()> {
        users.into_iter().try_for_each(|user| self.write_back(user))
    }

    fn write_back(&mut self, user: User) -> Result<()> {
        match self.store.update(user)? {
            Some(user) => Err(Error::UserNotFound(user.id().clone())),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use anyhow::Result;

    use crate::model::{User, UserId};
    use crate::test_util::{connect, id, test_network, test_user};
    use crate::{Error, SocialNetwork, UserStore};

    fn assert_symmetric<S: UserStore>(network: &SocialNetwork<S>) {
        let users = network.all_users();
        for user in &users {
            for friend in user.friends() {
                let other = network.find_user(friend).expect("friend must exist");
                assert!(
                    other.is_friend_of(user.id()),
                    "'{}' lists '{}' but not the other way around",
                    user.id(),
                    friend
                );
            }
        }
    }

    fn member_ids(users: &[User]) -> Vec<String> {
        let mut ids = users
            .iter()
            .map(|user| user.id().to_string())
            .collect::<Vec<_>>();
        ids.sort();
        ids
    }

    mod add_user {
        use super::*;

        #[test]
        fn single_user_is_one_community() -> Result<()> {
            let mut network = test_network(0);
            network.add_user(test_user(1))?;
            assert_eq!(network.number_of_communities(), 1);
            Ok(())
        }

        #[test]
        fn invalid_user() {
            let mut network = test_network(0);
            let result = network.add_user(User::new("", "", ""));
            assert!(matches!(result, Err(Error::ValidationFailed(_))));
            assert!(network.all_users().is_empty());
        }

        #[test]
        fn duplicate_id() {
            let mut network = test_network(1);
            let result = network.add_user(User::new("1", "Someone", "Else"));
            assert!(matches!(result, Err(Error::AlreadyExists(existing)) if existing == id(1)));
            assert_eq!(network.find_user(&id(1)), Some(test_user(1)));
        }
    }

    mod update_user {
        use super::*;

        #[test]
        fn keeps_friendships() -> Result<()> {
            let mut network = test_network(2);
            network.add_friendship(&id(1), &id(2))?;
            network.update_user(User::new("1", "Johnny", "Doe"))?;
            let user = network.find_user(&id(1)).unwrap();
            assert_eq!(user.first_name, "Johnny");
            assert!(user.is_friend_of(&id(2)));
            Ok(())
        }

        #[test]
        fn unknown_user() {
            let mut network = test_network(1);
            let result = network.update_user(User::new("9", "No", "Body"));
            assert!(matches!(result, Err(Error::UserNotFound(_))));
        }

        #[test]
        fn invalid_names() {
            let mut network = test_network(1);
            let result = network.update_user(User::new("1", "", "Doe"));
            assert!(matches!(result, Err(Error::ValidationFailed(_))));
            assert_eq!(network.find_user(&id(1)), Some(test_user(1)));
        }
    }

    mod add_friendship {
        use super::*;

        #[test]
        fn is_symmetric() -> Result<()> {
            let mut network = test_network(2);
            network.add_friendship(&id(1), &id(2))?;
            assert!(network.find_user(&id(1)).unwrap().is_friend_of(&id(2)));
            assert!(network.find_user(&id(2)).unwrap().is_friend_of(&id(1)));
            assert_eq!(network.number_of_communities(), 1);
            Ok(())
        }

        #[test]
        fn unknown_user() {
            let mut network = test_network(1);
            let result = network.add_friendship(&id(1), &id(2));
            assert!(matches!(result, Err(Error::UserNotFound(missing)) if missing == id(2)));
            assert!(network.find_user(&id(1)).unwrap().friends().is_empty());
        }

        #[test]
        fn duplicate_in_either_direction() -> Result<()> {
            let mut network = test_network(2);
            network.add_friendship(&id(1), &id(2))?;
            assert!(matches!(
                network.add_friendship(&id(1), &id(2)),
                Err(Error::DuplicateFriendship(_, _))
            ));
            assert!(matches!(
                network.add_friendship(&id(2), &id(1)),
                Err(Error::DuplicateFriendship(_, _))
            ));
            assert_eq!(network.friendships().len(), 1);
            Ok(())
        }

        #[test]
        fn self_friendship_never_mutates() {
            let mut network = test_network(1);
            assert!(matches!(
                network.add_friendship(&id(1), &id(1)),
                Err(Error::SelfFriendship(_))
            ));
            assert!(network.find_user(&id(1)).unwrap().friends().is_empty());
        }

        #[test]
        fn self_friendship_checked_before_lookup() {
            let mut network = test_network(0);
            assert!(matches!(
                network.add_friendship(&id(5), &id(5)),
                Err(Error::SelfFriendship(_))
            ));
        }
    }

    mod remove_friendship {
        use super::*;

        #[test]
        fn idempotent() -> Result<()> {
            let mut network = test_network(3);
            connect(&mut network, &[(1, 2), (2, 3)]);
            network.remove_friendship(&id(1), &id(2))?;
            let once = network.all_users();
            network.remove_friendship(&id(1), &id(2))?;
            assert_eq!(network.all_users(), once);
            assert!(!network.find_user(&id(1)).unwrap().is_friend_of(&id(2)));
            assert!(!network.find_user(&id(2)).unwrap().is_friend_of(&id(1)));
            assert_eq!(network.number_of_communities(), 2);
            Ok(())
        }

        #[test]
        fn non_friends_and_unknown_users_are_noops() -> Result<()> {
            let mut network = test_network(2);
            let before = network.all_users();
            network.remove_friendship(&id(1), &id(2))?;
            network.remove_friendship(&id(1), &id(9))?;
            network.remove_friendship(&id(8), &id(9))?;
            assert_eq!(network.all_users(), before);
            Ok(())
        }
    }

    mod remove_user {
        use super::*;

        #[test]
        fn cascades() -> Result<()> {
            let mut network = test_network(4);
            connect(&mut network, &[(1, 2), (1, 3), (3, 4)]);
            let removed = network.remove_user(&id(1))?;
            assert_eq!(removed.map(|user| user.id().clone()), Some(id(1)));
            assert!(network
                .all_users()
                .iter()
                .all(|user| !user.is_friend_of(&id(1))));
            assert_symmetric(&network);
            assert_eq!(network.number_of_communities(), 2);
            Ok(())
        }

        #[test]
        fn unknown_is_noop() -> Result<()> {
            let mut network = test_network(2);
            assert!(network.remove_user(&id(9))?.is_none());
            assert_eq!(network.all_users().len(), 2);
            Ok(())
        }
    }

    mod queries {
        use super::*;

        #[test]
        fn chain_plus_singletons() {
            let mut network = test_network(5);
            connect(&mut network, &[(1, 2), (2, 3)]);
            assert_eq!(network.number_of_communities(), 3);
        }

        #[test]
        fn empty_network() {
            let network = test_network(0);
            assert_eq!(network.number_of_communities(), 0);
            assert!(network.communities().is_empty());
            assert!(network.most_sociable_community().is_empty());
        }

        #[test]
        fn most_sociable_is_densest() {
            let mut network = test_network(7);
            connect(&mut network, &[(1, 2), (2, 3), (4, 5), (5, 6), (6, 7)]);
            assert_eq!(
                member_ids(&network.most_sociable_community()),
                vec!["4", "5", "6", "7"]
            );
        }

        #[test]
        fn most_sociable_all_isolated() {
            let network = test_network(4);
            assert!(network.most_sociable_community().is_empty());
        }

        #[test]
        fn most_sociable_tie_goes_to_first_origin() {
            let mut network = test_network(4);
            connect(&mut network, &[(3, 4), (1, 2)]);
            assert_eq!(member_ids(&network.most_sociable_community()), vec!["1", "2"]);
        }

        #[test]
        fn friends_of() -> Result<()> {
            let mut network = test_network(3);
            connect(&mut network, &[(2, 3), (2, 1)]);
            let friends = network.friends_of(&id(2))?;
            assert_eq!(member_ids(&friends), vec!["1", "3"]);
            assert!(matches!(
                network.friends_of(&id(9)),
                Err(Error::UserNotFound(_))
            ));
            Ok(())
        }

        #[test]
        fn friendships_listed_once() {
            let mut network = test_network(3);
            connect(&mut network, &[(3, 1), (2, 3)]);
            let friendships = network
                .friendships()
                .iter()
                .map(|f| (f.user1.to_string(), f.user2.to_string()))
                .collect::<Vec<_>>();
            assert_eq!(
                friendships,
                vec![
                    ("1".to_string(), "3".to_string()),
                    ("2".to_string(), "3".to_string())
                ]
            );
        }
    }

    #[test]
    fn symmetry_survives_mixed_operations() -> Result<()> {
        let mut network = test_network(6);
        connect(&mut network, &[(1, 2), (2, 3), (3, 4), (4, 5), (5, 6), (6, 1)]);
        network.remove_friendship(&id(3), &id(4))?;
        network.add_friendship(&id(1), &id(4))?;
        network.remove_user(&id(6))?;
        network.remove_friendship(&id(2), &UserId::from("missing"))?;
        network.add_friendship(&id(3), &id(5))?;
        assert_symmetric(&network);
        assert!(network
            .all_users()
            .iter()
            .all(|user| !user.is_friend_of(user.id())));
        Ok(())
    }

    mod failed_friendship_hooks {
        use anyhow::anyhow;

        use super::*;
        use crate::model::Friendship;
        use crate::store::MemoryStore;

        struct RejectingHooks(MemoryStore);

        impl UserStore for RejectingHooks {
            fn find_by_id(&self, id: &UserId) -> Option<User> {
                self.0.find_by_id(id)
            }

            fn find_all(&self) -> Vec<User> {
                self.0.find_all()
            }

            fn save(&mut self, user: User) -> crate::Result<Option<User>> {
                self.0.save(user)
            }

            fn delete(&mut self, id: &UserId) -> crate::Result<Option<User>> {
                self.0.delete(id)
            }

            fn update(&mut self, user: User) -> crate::Result<Option<User>> {
                self.0.update(user)
            }

            fn save_friendship(&mut self, friendship: &Friendship) -> crate::Result<()> {
                Err(anyhow!("cannot save {}", friendship).into())
            }

            fn delete_friendship(&mut self, friendship: &Friendship) -> crate::Result<()> {
                Err(anyhow!("cannot delete {}", friendship).into())
            }
        }

        fn rejecting_network(n: usize, links: &[(usize, usize)]) -> SocialNetwork<RejectingHooks> {
            let mut network = test_network(n);
            connect(&mut network, links);
            SocialNetwork::new(RejectingHooks(network.into_store()))
        }

        #[test]
        fn add_restores_both_users() {
            let mut network = rejecting_network(2, &[]);
            assert!(matches!(
                network.add_friendship(&id(1), &id(2)),
                Err(Error::Storage(_))
            ));
            assert!(network.find_user(&id(1)).unwrap().friends().is_empty());
            assert!(network.find_user(&id(2)).unwrap().friends().is_empty());
        }

        #[test]
        fn remove_restores_both_users() {
            let mut network = rejecting_network(2, &[(1, 2)]);
            assert!(matches!(
                network.remove_friendship(&id(1), &id(2)),
                Err(Error::Storage(_))
            ));
            assert!(network.find_user(&id(1)).unwrap().is_friend_of(&id(2)));
            assert!(network.find_user(&id(2)).unwrap().is_friend_of(&id(1)));
        }

        #[test]
        fn remove_user_keeps_user_and_friends() {
            let mut network = rejecting_network(3, &[(1, 2), (1, 3)]);
            assert!(network.remove_user(&id(1)).is_err());
            assert!(network.find_user(&id(1)).is_some());
            assert!(network.find_user(&id(2)).unwrap().is_friend_of(&id(1)));
            assert_symmetric(&network);
        }
    }
}
