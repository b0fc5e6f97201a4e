//! Partitioning of the friend graph into communities (connected components).
//!
//! Detection always runs over a fresh snapshot of users. Nothing is cached between calls.

use std::collections::{HashSet, VecDeque};

use log::trace;

use crate::model::{index_by_id, Community, User, UserId};

/// Partitions `users` into communities.
///
/// Users are visited in slice order; each not-yet-visited user becomes the origin of a new
/// community, which is then filled by a breadth-first traversal over friend ids. The traversal
/// uses an explicit queue, so deep friend chains cannot overflow the stack. Friend ids that do not
/// resolve to a user in `users` are ignored.
///
/// Communities are returned in origin order, and each community lists its members in discovery
/// order.
pub fn detect(users: &[User]) -> Vec<Community> {
    let index = index_by_id(users);
    let mut visited: HashSet<&UserId> = HashSet::with_capacity(users.len());
    let mut communities = vec![];

    for origin in users {
        if !visited.insert(origin.id()) {
            continue;
        }
        let mut members = vec![];
        let mut queue = VecDeque::from([origin]);
        while let Some(user) = queue.pop_front() {
            members.push(user.id().clone());
            for friend in user.friends() {
                let Some(&next) = index.get(friend) else {
                    trace!("ignoring unknown friend '{}' of '{}'", friend, user.id());
                    continue;
                };
                if visited.insert(next.id()) {
                    queue.push_back(next);
                }
            }
        }
        communities.push(Community::new(members));
    }

    communities
}

/// Number of communities in `users`. Zero for no users, `users.len()` if nobody has friends.
pub fn count(users: &[User]) -> usize {
    detect(users).len()
}
