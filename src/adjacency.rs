//! Derived adjacency view over the referral network.
//!
//! The view is a pure function of one (user list, edge list) snapshot:
//! built wholesale, never patched. `ReferralNetwork` caches exactly one
//! view and replaces it on invalidation, so readers always observe a
//! fully-old or fully-new graph, never a mix.

use std::collections::BTreeMap;

use crate::types::{Referral, UserId};

/// Immutable forward-adjacency snapshot of the referral graph.
///
/// Maps every known user to their direct referrals. Successor lists keep
/// edge commit order; users iterate ascending by id. Edge endpoints are
/// registered even when the corresponding user is missing from the user
/// list, so queries about them stay well-defined.
#[derive(Debug, Clone, Default)]
pub struct AdjacencyView {
    /// User -> direct referrals, in edge order.
    successors: BTreeMap<UserId, Vec<UserId>>,
    /// Candidate -> referrer. Single-valued because in-degree <= 1.
    referrer: BTreeMap<UserId, UserId>,
    /// Number of edges the view was built from.
    edge_count: usize,
}

impl AdjacencyView {
    /// Build a view from full user and edge lists.
    pub fn build(users: &[UserId], referrals: &[Referral]) -> Self {
        let mut successors: BTreeMap<UserId, Vec<UserId>> = BTreeMap::new();
        for &user in users {
            successors.entry(user).or_default();
        }

        let mut referrer = BTreeMap::new();
        for edge in referrals {
            successors
                .entry(edge.referrer)
                .or_default()
                .push(edge.candidate);
            successors.entry(edge.candidate).or_default();
            referrer.insert(edge.candidate, edge.referrer);
        }

        Self {
            successors,
            referrer,
            edge_count: referrals.len(),
        }
    }

    /// Direct referrals of a user, in edge order. Unknown user -> empty.
    pub fn successors(&self, user: UserId) -> &[UserId] {
        self.successors
            .get(&user)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// All known users, ascending by id.
    pub fn users(&self) -> impl Iterator<Item = UserId> + '_ {
        self.successors.keys().copied()
    }

    /// Whether the user is known to this view.
    pub fn contains(&self, user: UserId) -> bool {
        self.successors.contains_key(&user)
    }

    /// The user who referred `candidate`, if any.
    pub fn referrer_of(&self, candidate: UserId) -> Option<UserId> {
        self.referrer.get(&candidate).copied()
    }

    /// Number of known users.
    pub fn user_count(&self) -> usize {
        self.successors.len()
    }

    /// Number of edges the view was built from.
    pub fn edge_count(&self) -> usize {
        self.edge_count
    }

    /// Whether the view holds no users at all.
    pub fn is_empty(&self) -> bool {
        self.successors.is_empty()
    }
}
