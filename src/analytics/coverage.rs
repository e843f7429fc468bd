//! Greedy maximum-coverage selection over reach sets.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::adjacency::AdjacencyView;
use crate::analytics::reach::reach_set;
use crate::types::UserId;

/// One pick of the unique-reach greedy selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoveragePick {
    /// Selected user.
    pub user_id: UserId,
    /// Users newly covered by this pick (marginal gain).
    pub gain: usize,
}

/// Select users by descending marginal reach until nothing new is covered.
///
/// The standard (1 - 1/e)-approximation greedy for maximum coverage:
/// reach sets are computed once up front, then each round picks the user
/// adding the most not-yet-covered users. Ties go to the smallest id
/// (candidates are scanned in ascending id order and only a strictly
/// larger gain displaces the current best). Users with zero marginal gain
/// are never selected. Re-runs from scratch on every call.
pub fn unique_reach_greedy(view: &AdjacencyView) -> Vec<CoveragePick> {
    let mut candidates: BTreeMap<UserId, BTreeSet<UserId>> = view
        .users()
        .map(|user| (user, reach_set(view, user)))
        .collect();

    let mut covered: BTreeSet<UserId> = BTreeSet::new();
    let mut picks: Vec<CoveragePick> = Vec::new();

    loop {
        let mut best: Option<(UserId, usize)> = None;

        for (&user, set) in &candidates {
            let gain = set.difference(&covered).count();
            if gain > best.map_or(0, |(_, g)| g) {
                best = Some((user, gain));
            }
        }

        let (user_id, gain) = match best {
            Some(pick) => pick,
            None => break,
        };

        if let Some(set) = candidates.remove(&user_id) {
            covered.extend(set);
        }
        picks.push(CoveragePick { user_id, gain });
    }

    picks
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Referral;

    fn view(users: &[i64], edges: &[(i64, i64)]) -> AdjacencyView {
        let users: Vec<UserId> = users.iter().copied().map(UserId::new).collect();
        let edges: Vec<Referral> = edges
            .iter()
            .map(|&(r, c)| Referral::new(UserId::new(r), UserId::new(c)))
            .collect();
        AdjacencyView::build(&users, &edges)
    }

    #[test]
    fn test_greedy_picks_largest_tree_first() {
        // Two disjoint trees: 1 -> {2,3,4} and 5 -> {6}
        let v = view(
            &[1, 2, 3, 4, 5, 6],
            &[(1, 2), (1, 3), (1, 4), (5, 6)],
        );

        let picks = unique_reach_greedy(&v);
        assert_eq!(picks.len(), 2);
        assert_eq!(picks[0].user_id, UserId::new(1));
        assert_eq!(picks[0].gain, 3);
        assert_eq!(picks[1].user_id, UserId::new(5));
        assert_eq!(picks[1].gain, 1);
    }

    #[test]
    fn test_greedy_counts_only_new_coverage() {
        // 1 -> 2 -> 3: picking 1 covers {2,3}; 2's residual gain is 0
        let v = view(&[1, 2, 3], &[(1, 2), (2, 3)]);

        let picks = unique_reach_greedy(&v);
        assert_eq!(picks.len(), 1);
        assert_eq!(picks[0].user_id, UserId::new(1));
        assert_eq!(picks[0].gain, 2);
    }

    #[test]
    fn test_greedy_never_picks_zero_gain() {
        let v = view(&[1, 2, 3], &[]);
        assert!(unique_reach_greedy(&v).is_empty());
    }

    #[test]
    fn test_greedy_tie_breaks_to_smallest_id() {
        // Both 1 and 2 reach exactly one user
        let v = view(&[1, 2, 3, 4], &[(2, 4), (1, 3)]);

        let picks = unique_reach_greedy(&v);
        assert_eq!(picks[0].user_id, UserId::new(1));
        assert_eq!(picks[1].user_id, UserId::new(2));
    }

    #[test]
    fn test_greedy_union_matches_total_coverage() {
        let v = view(
            &[1, 2, 3, 4, 5, 6, 7],
            &[(1, 2), (2, 3), (4, 5), (6, 7)],
        );

        let picks = unique_reach_greedy(&v);
        let picked_union: usize = picks.iter().map(|p| p.gain).sum();

        // Union of every user's reach set
        let mut total: BTreeSet<UserId> = BTreeSet::new();
        for user in v.users() {
            total.extend(reach_set(&v, user));
        }

        assert_eq!(picked_union, total.len());
    }
}
