//! Ranking of communities by how densely their members are befriended.

use std::collections::{HashMap, HashSet};

use log::{debug, trace};

use crate::model::{index_by_id, Community, User, UserId};

/// Number of distinct friendships with both endpoints inside `community`.
///
/// Each internal edge is seen once from each endpoint, so the sum of in-community friend counts is
/// halved.
pub fn score(community: &Community, users: &[User]) -> usize {
    score_indexed(community, &index_by_id(users))
}

/// Picks the community with the strictly highest [score] among those with at least two members.
///
/// Ties go to the community that comes first in `communities`, which for [crate::community::detect]
/// output means the one whose origin comes first in store order. Returns `None` when no community
/// has two or more members; a lone user is never the most sociable.
pub fn most_sociable<'c>(communities: &'c [Community], users: &[User]) -> Option<&'c Community> {
    let index = index_by_id(users);
    let mut best: Option<(&Community, usize)> = None;
    for community in communities.iter().filter(|c| c.len() >= 2) {
        let score = score_indexed(community, &index);
        trace!(
            "community of {} (origin {:?}) scores {}",
            community.len(),
            community.origin(),
            score
        );
        if best.map_or(true, |(_, best_score)| score > best_score) {
            best = Some((community, score));
        }
    }
    if let Some((community, score)) = best {
        debug!(
            "most sociable community has {} members and {} friendships",
            community.len(),
            score
        );
    }
    best.map(|(community, _)| community)
}

fn score_indexed(community: &Community, index: &HashMap<&UserId, &User>) -> usize {
    let members: HashSet<&UserId> = community.members().iter().collect();
    let endpoints: usize = community
        .members()
        .iter()
        .filter_map(|id| index.get(id))
        .map(|user| {
            user.friends()
                .iter()
                .filter(|friend| members.contains(friend))
                .count()
        })
        .sum();
    endpoints / 2
}
