mod community;
mod friendship;
mod user;

pub use community::Community;
pub use friendship::Friendship;
pub use user::{User, UserId};

pub(crate) use user::index_by_id;
