use crate::model::{User, UserId};
use crate::store::MemoryStore;
use crate::SocialNetwork;

pub const NAMES: &[(&str, &str)] = &[
    ("John", "Doe"),
    ("Jane", "Smith"),
    ("Michael", "Johnson"),
    ("Sarah", "Williams"),
    ("David", "Brown"),
    ("Emily", "Jones"),
    ("James", "Wilson"),
];

pub fn id(i: usize) -> UserId {
    UserId::new(i)
}

pub fn ids(is: &[usize]) -> Vec<UserId> {
    is.iter().map(|&i| id(i)).collect()
}

/// User with id `i` (1-based) and a name picked from [NAMES].
pub fn test_user(i: usize) -> User {
    let (first, last) = NAMES[(i - 1) % NAMES.len()];
    User::new(id(i), first, last)
}

/// Users `1..=n` with the given friendships applied directly to their neighbor sets.
pub fn linked_users(n: usize, links: &[(usize, usize)]) -> Vec<User> {
    let mut users = (1..=n).map(test_user).collect::<Vec<_>>();
    for &(a, b) in links {
        users[a - 1].add_friend(id(b));
        users[b - 1].add_friend(id(a));
    }
    users
}

/// In-memory network holding users `1..=n` without friendships.
pub fn test_network(n: usize) -> SocialNetwork<MemoryStore> {
    let mut network = SocialNetwork::new(MemoryStore::new());
    for i in 1..=n {
        network.add_user(test_user(i)).expect("valid test user");
    }
    network
}

pub fn connect(network: &mut SocialNetwork<MemoryStore>, links: &[(usize, usize)]) {
    for &(a, b) in links {
        network
            .add_friendship(&id(a), &id(b))
            .expect("valid test friendship");
    }
}
