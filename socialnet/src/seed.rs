use log::{debug, info};
use serde::Deserialize;

use crate::error::{Error, Result};
use crate::model::{User, UserId};
use crate::service::SocialNetwork;
use crate::store::UserStore;

/// Initial users and friendships, typically read from JSON:
///
/// ```json
/// {
///   "users": [{ "id": "1", "first_name": "John", "last_name": "Doe" }],
///   "friendships": [["1", "2"]]
/// }
/// ```
#[derive(Debug, Default, Deserialize)]
pub struct Seed {
    #[serde(default)]
    pub users: Vec<SeedUser>,
    #[serde(default)]
    pub friendships: Vec<(UserId, UserId)>,
}

#[derive(Debug, Deserialize)]
pub struct SeedUser {
    pub id: UserId,
    pub first_name: String,
    pub last_name: String,
}

/// What [Seed::apply] actually added.
#[derive(Debug, Default, Copy, Clone, Eq, PartialEq)]
pub struct Applied {
    pub users: usize,
    pub friendships: usize,
}

const SAMPLE_USERS: [(&str, &str); 21] = [
    ("John", "Doe"),
    ("Jane", "Smith"),
    ("Michael", "Johnson"),
    ("Sarah", "Williams"),
    ("David", "Brown"),
    ("Emily", "Jones"),
    ("James", "Wilson"),
    ("Emma", "Taylor"),
    ("Robert", "Anderson"),
    ("Olivia", "Thomas"),
    ("Ion", "Popescu"),
    ("Maria", "Ionescu"),
    ("Alex", "Popa"),
    ("Elena", "Dumitru"),
    ("Andrei", "Radu"),
    ("Ana", "Stan"),
    ("George", "Munteanu"),
    ("Laura", "Gheorghe"),
    ("Daniel", "Stoica"),
    ("Diana", "Matei"),
    ("Mihai", "Bujor"),
];

impl Seed {
    /// Twenty-one users with ids `1` through `21` and no friendships.
    pub fn sample() -> Self {
        let users = SAMPLE_USERS
            .iter()
            .enumerate()
            .map(|(i, (first_name, last_name))| SeedUser {
                id: UserId::new(i + 1),
                first_name: first_name.to_string(),
                last_name: last_name.to_string(),
            })
            .collect();
        Self {
            users,
            friendships: vec![],
        }
    }

    /// Adds the seed's users and friendships to `network`.
    ///
    /// Users that already exist and friendships that are already in place are skipped, so applying
    /// the same seed twice is harmless. Any other error (an invalid user, a friendship with an
    /// unknown user) stops the seeding and is returned.
    pub fn apply<S: UserStore>(&self, network: &mut SocialNetwork<S>) -> Result<Applied> {
        let mut applied = Applied::default();
        for user in &self.users {
            let user = User::new(user.id.clone(), &user.first_name, &user.last_name);
            match network.add_user(user) {
                Ok(()) => applied.users += 1,
                Err(Error::AlreadyExists(id)) => debug!("Seed: user '{}' already exists", id),
                Err(err) => return Err(err),
            }
        }
        for (a, b) in &self.friendships {
            match network.add_friendship(a, b) {
                Ok(()) => applied.friendships += 1,
                Err(Error::DuplicateFriendship(a, b)) => {
                    debug!("Seed: '{}' and '{}' are already friends", a, b)
                }
                Err(err) => return Err(err),
            }
        }
        info!(
            "Seeded {} users and {} friendships",
            applied.users, applied.friendships
        );
        Ok(applied)
    }
}
