//! Reachability queries over the adjacency view.
//!
//! Everything here is a read-only breadth-first pass. Reach sets are
//! recomputed per call; nothing is cached across queries.

use std::collections::{BTreeSet, VecDeque};

use serde::{Deserialize, Serialize};

use crate::adjacency::AdjacencyView;
use crate::types::UserId;

/// Reach ranking entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReachEntry {
    /// User being ranked.
    pub user_id: UserId,
    /// Number of distinct users downstream of them.
    pub reach: usize,
}

/// All users reachable from `start` by following referral edges forward,
/// excluding `start` itself.
///
/// Unknown ids yield an empty set rather than an error: asking about
/// nothing finds nothing.
pub fn reach_set(view: &AdjacencyView, start: UserId) -> BTreeSet<UserId> {
    let mut seen: BTreeSet<UserId> = BTreeSet::new();
    let mut queue: VecDeque<UserId> = view.successors(start).iter().copied().collect();

    while let Some(user) = queue.pop_front() {
        // The start node stays excluded even on malformed cyclic input.
        if user != start && seen.insert(user) {
            queue.extend(view.successors(user).iter().copied());
        }
    }

    seen
}

/// Number of distinct users downstream of `start`.
pub fn reach_count(view: &AdjacencyView, start: UserId) -> usize {
    reach_set(view, start).len()
}

/// Whether `target` is reachable from `start` via forward edges.
///
/// Reflexive: `start == target` is true for any id, known or not. This is
/// the predicate collaborators run (as `has_path(candidate, referrer)`)
/// to reject cycle-forming edges before commit.
pub fn has_path(view: &AdjacencyView, start: UserId, target: UserId) -> bool {
    if start == target {
        return true;
    }

    let mut seen: BTreeSet<UserId> = BTreeSet::new();
    let mut queue: VecDeque<UserId> = VecDeque::new();
    seen.insert(start);
    queue.push_back(start);

    while let Some(user) = queue.pop_front() {
        for &next in view.successors(user) {
            if next == target {
                return true;
            }
            if seen.insert(next) {
                queue.push_back(next);
            }
        }
    }

    false
}

/// The `k` users with the largest reach, descending.
///
/// Ties break ascending by id so repeated calls rank identically.
/// `k == 0` yields an empty list; `k` past the user count yields everyone.
pub fn top_by_reach(view: &AdjacencyView, k: usize) -> Vec<ReachEntry> {
    let mut entries: Vec<ReachEntry> = view
        .users()
        .map(|user_id| ReachEntry {
            user_id,
            reach: reach_count(view, user_id),
        })
        .collect();

    entries.sort_by(|a, b| b.reach.cmp(&a.reach).then_with(|| a.user_id.cmp(&b.user_id)));
    entries.truncate(k);
    entries
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Referral;

    fn chain_view() -> AdjacencyView {
        // 1 -> 2 -> 3
        let users: Vec<UserId> = (1..=3).map(UserId::new).collect();
        let edges = vec![
            Referral::new(UserId::new(1), UserId::new(2)),
            Referral::new(UserId::new(2), UserId::new(3)),
        ];
        AdjacencyView::build(&users, &edges)
    }

    #[test]
    fn test_reach_set_chain() {
        let view = chain_view();

        let from_1 = reach_set(&view, UserId::new(1));
        assert_eq!(from_1.len(), 2);
        assert!(from_1.contains(&UserId::new(2)));
        assert!(from_1.contains(&UserId::new(3)));

        let from_2 = reach_set(&view, UserId::new(2));
        assert_eq!(from_2.len(), 1);
        assert!(from_2.contains(&UserId::new(3)));

        assert!(reach_set(&view, UserId::new(3)).is_empty());
    }

    #[test]
    fn test_reach_set_unknown_user_is_empty() {
        let view = chain_view();
        assert!(reach_set(&view, UserId::new(99)).is_empty());
        assert_eq!(reach_count(&view, UserId::new(99)), 0);
    }

    #[test]
    fn test_reach_set_excludes_self() {
        let view = chain_view();
        assert!(!reach_set(&view, UserId::new(1)).contains(&UserId::new(1)));
    }

    #[test]
    fn test_has_path_direction_matters() {
        let view = chain_view();

        assert!(has_path(&view, UserId::new(1), UserId::new(3)));
        assert!(!has_path(&view, UserId::new(3), UserId::new(1)));
    }

    #[test]
    fn test_has_path_reflexive() {
        let view = chain_view();
        assert!(has_path(&view, UserId::new(2), UserId::new(2)));
        // Reflexive even for ids the view has never seen
        assert!(has_path(&view, UserId::new(99), UserId::new(99)));
    }

    #[test]
    fn test_top_by_reach_ranking_and_ties() {
        // 1 -> 2, 1 -> 3, 4 -> 5 : reach(1)=2, reach(4)=1, rest 0
        let users: Vec<UserId> = (1..=5).map(UserId::new).collect();
        let edges = vec![
            Referral::new(UserId::new(1), UserId::new(2)),
            Referral::new(UserId::new(1), UserId::new(3)),
            Referral::new(UserId::new(4), UserId::new(5)),
        ];
        let view = AdjacencyView::build(&users, &edges);

        let top = top_by_reach(&view, 10);
        assert_eq!(top.len(), 5);
        assert_eq!(top[0].user_id, UserId::new(1));
        assert_eq!(top[0].reach, 2);
        assert_eq!(top[1].user_id, UserId::new(4));
        // Zero-reach tie resolves ascending by id
        assert_eq!(top[2].user_id, UserId::new(2));
        assert_eq!(top[3].user_id, UserId::new(3));
        assert_eq!(top[4].user_id, UserId::new(5));
    }

    #[test]
    fn test_top_by_reach_k_zero_is_empty() {
        let view = chain_view();
        assert!(top_by_reach(&view, 0).is_empty());
    }

    #[test]
    fn test_top_by_reach_truncates_to_k() {
        let view = chain_view();
        let top = top_by_reach(&view, 2);
        assert_eq!(top.len(), 2);
        assert_eq!(top[0].user_id, UserId::new(1));
    }
}
