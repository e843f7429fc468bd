//! Referral network engine: cached adjacency view plus the read API.
//!
//! `ReferralNetwork` is the single owner of the adjacency cache. Reads
//! rebuild the view lazily from the backing source; structural mutations
//! committed by the collaborator layer must be followed by `invalidate()`
//! before the next read. The view is replaced wholesale, never patched,
//! so a reader always sees a graph that existed at some point in time.

use std::collections::BTreeSet;
use std::sync::Arc;

use parking_lot::RwLock;

use crate::adjacency::AdjacencyView;
use crate::analytics::{
    centrality, coverage, reach, CentralityScore, CoveragePick, ReachEntry,
};
use crate::store::NetworkSource;
use crate::types::{Referral, ReferralViolation, UserId};

/// Error type for network engine operations.
#[derive(Debug, thiserror::Error)]
pub enum NetworkError {
    /// Proposed referral violates a structural invariant.
    #[error("Referral rejected: {0}")]
    Rejected(#[from] ReferralViolation),
    /// Underlying node/edge source failed.
    #[error("Network source error: {0}")]
    Source(String),
}

impl NetworkError {
    /// Create a source error from any error type.
    pub fn from_source<E: std::error::Error>(e: E) -> Self {
        Self::Source(e.to_string())
    }
}

/// Graph store and analytics front-end for one referral network.
///
/// ## Cache discipline
///
/// The one piece of shared mutable state is a single cache slot holding
/// the current `Arc<AdjacencyView>`. A read clones the `Arc` under a read
/// lock; a miss fetches users and edges from the source, builds the view
/// off-lock, and installs it under a brief write lock. The lock is never
/// held across an await point. Concurrent rebuilds may race; each installs
/// a fully-consistent view and the last one wins, which is harmless given
/// the single-writer assumption for structural mutations.
pub struct ReferralNetwork<S: NetworkSource> {
    source: Arc<S>,
    cache: RwLock<Option<Arc<AdjacencyView>>>,
}

impl<S: NetworkSource + Send + Sync + 'static> ReferralNetwork<S> {
    /// Create an engine over a node/edge source.
    pub fn new(source: Arc<S>) -> Self {
        Self {
            source,
            cache: RwLock::new(None),
        }
    }

    /// The backing source.
    pub fn source(&self) -> &S {
        &self.source
    }

    /// Drop the cached view unconditionally.
    ///
    /// Collaborators call this after committing any structural mutation;
    /// the next read rebuilds from the source.
    pub fn invalidate(&self) {
        *self.cache.write() = None;
        tracing::debug!("adjacency cache invalidated");
    }

    /// Current adjacency view, rebuilding from the source if needed.
    pub async fn view(&self) -> Result<Arc<AdjacencyView>, NetworkError> {
        if let Some(view) = self.cache.read().as_ref() {
            return Ok(Arc::clone(view));
        }

        let users = self
            .source
            .list_user_ids()
            .await
            .map_err(NetworkError::from_source)?;
        let referrals = self
            .source
            .list_referrals()
            .await
            .map_err(NetworkError::from_source)?;

        let view = Arc::new(AdjacencyView::build(&users, &referrals));
        tracing::debug!(
            users = view.user_count(),
            edges = view.edge_count(),
            "adjacency view rebuilt"
        );

        *self.cache.write() = Some(Arc::clone(&view));
        Ok(view)
    }

    /// All users reachable downstream of `user`, excluding `user`.
    pub async fn reach_set(&self, user: UserId) -> Result<BTreeSet<UserId>, NetworkError> {
        let view = self.view().await?;
        Ok(reach::reach_set(&view, user))
    }

    /// Size of the downstream network of `user`.
    pub async fn reach_count(&self, user: UserId) -> Result<usize, NetworkError> {
        let view = self.view().await?;
        Ok(reach::reach_count(&view, user))
    }

    /// Direct referrals of `user`, in edge order.
    pub async fn direct_referrals(&self, user: UserId) -> Result<Vec<UserId>, NetworkError> {
        let view = self.view().await?;
        Ok(view.successors(user).to_vec())
    }

    /// The `k` users with the largest reach.
    pub async fn top_by_reach(&self, k: usize) -> Result<Vec<ReachEntry>, NetworkError> {
        let view = self.view().await?;
        Ok(reach::top_by_reach(&view, k))
    }

    /// Whether `to` is reachable from `from` via forward edges.
    pub async fn has_path_between(&self, from: UserId, to: UserId) -> Result<bool, NetworkError> {
        let view = self.view().await?;
        Ok(reach::has_path(&view, from, to))
    }

    /// Greedy maximum-coverage selection over reach sets.
    pub async fn unique_reach_greedy(&self) -> Result<Vec<CoveragePick>, NetworkError> {
        let view = self.view().await?;
        Ok(coverage::unique_reach_greedy(&view))
    }

    /// Shortest-path incidence scores for every user.
    pub async fn flow_centrality(&self) -> Result<Vec<CentralityScore>, NetworkError> {
        let view = self.view().await?;
        Ok(centrality::flow_centrality(&view))
    }

    /// Run the pre-commit checks for a proposed referral edge.
    ///
    /// Validation order: self-referral, candidate already referred, cycle
    /// (`has_path(candidate, referrer)`). The cache is dropped first so
    /// the checks run against the latest committed edges. This only
    /// answers the question; committing the edge and invalidating again
    /// afterwards remain the caller's job.
    pub async fn check_referral(&self, referral: Referral) -> Result<(), NetworkError> {
        if referral.referrer == referral.candidate {
            return Err(ReferralViolation::SelfReferral.into());
        }

        self.invalidate();
        let view = self.view().await?;

        if view.referrer_of(referral.candidate).is_some() {
            return Err(ReferralViolation::AlreadyReferred(referral.candidate).into());
        }

        if reach::has_path(&view, referral.candidate, referral.referrer) {
            return Err(ReferralViolation::WouldCreateCycle {
                referrer: referral.referrer,
                candidate: referral.candidate,
            }
            .into());
        }

        Ok(())
    }
}
