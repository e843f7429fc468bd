//! Flow centrality: shortest-path incidence scoring.
//!
//! A node scores one point for every ordered pair (s, t) it sits on some
//! shortest path between. This is an incidence indicator, not a weighted
//! betweenness count: equidistant intermediates each earn the full point
//! for a pair. Cost after the distance tables is O(V^3), which limits this
//! engine to small-to-moderate graphs.

use std::collections::{BTreeMap, VecDeque};

use serde::{Deserialize, Serialize};

use crate::adjacency::AdjacencyView;
use crate::types::UserId;

/// Hop-count sentinel for unreachable pairs.
const UNREACHABLE: u32 = u32::MAX;

/// Flow centrality score for one user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CentralityScore {
    /// Scored user.
    pub user_id: UserId,
    /// Number of (source, target) pairs this user lies between.
    pub score: u64,
}

/// Score every user by shortest-path incidence.
///
/// Runs one BFS per user to build the all-pairs hop-count table, then for
/// every ordered reachable pair (s, t) credits each distinct intermediate
/// `v` with `dist(s,v) + dist(v,t) == dist(s,t)`. Output is sorted by
/// score descending, ties ascending by id.
pub fn flow_centrality(view: &AdjacencyView) -> Vec<CentralityScore> {
    let users: Vec<UserId> = view.users().collect();
    let n = users.len();
    let index: BTreeMap<UserId, usize> = users
        .iter()
        .enumerate()
        .map(|(i, &user)| (user, i))
        .collect();

    let dist: Vec<Vec<u32>> = users
        .iter()
        .map(|&source| bfs_distances(view, source, &index, n))
        .collect();

    let mut scores = vec![0u64; n];
    for s in 0..n {
        for t in 0..n {
            if s == t {
                continue;
            }
            let d_st = dist[s][t];
            if d_st == UNREACHABLE {
                continue;
            }
            for v in 0..n {
                if v == s || v == t {
                    continue;
                }
                let d_sv = dist[s][v];
                let d_vt = dist[v][t];
                if d_sv != UNREACHABLE && d_vt != UNREACHABLE && d_sv + d_vt == d_st {
                    scores[v] += 1;
                }
            }
        }
    }

    let mut ranked: Vec<CentralityScore> = users
        .into_iter()
        .zip(scores)
        .map(|(user_id, score)| CentralityScore { user_id, score })
        .collect();

    ranked.sort_by(|a, b| b.score.cmp(&a.score).then_with(|| a.user_id.cmp(&b.user_id)));
    ranked
}

/// Single-source hop counts into the shared index space.
fn bfs_distances(
    view: &AdjacencyView,
    source: UserId,
    index: &BTreeMap<UserId, usize>,
    n: usize,
) -> Vec<u32> {
    let mut dist = vec![UNREACHABLE; n];
    let start = match index.get(&source) {
        Some(&i) => i,
        None => return dist,
    };
    dist[start] = 0;

    let mut queue: VecDeque<(UserId, u32)> = VecDeque::new();
    queue.push_back((source, 0));

    while let Some((user, hops)) = queue.pop_front() {
        for &next in view.successors(user) {
            if let Some(&i) = index.get(&next) {
                if dist[i] == UNREACHABLE {
                    dist[i] = hops + 1;
                    queue.push_back((next, hops + 1));
                }
            }
        }
    }

    dist
}
