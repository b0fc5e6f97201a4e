//! A social graph of users and undirected friendships, with queries for the communities
//! (connected friend groups) it contains and for the most sociable of them.

pub use error::{Error, Result};
pub use model::{Community, Friendship, User, UserId};
pub use seed::Seed;
pub use service::SocialNetwork;
pub use store::UserStore;

pub mod community;
pub mod error;
pub mod model;
pub mod seed;
pub mod service;
pub mod sociability;
pub mod store;
pub mod validate;

#[cfg(test)]
pub(crate) mod test_util;
