//! # referral-kernel
//!
//! Graph analytics and growth simulation for referral networks.
//!
//! The kernel answers two families of questions:
//!
//! > Given the referral graph, who influences it most: by downstream
//! > reach, by unique coverage, by brokerage between others?
//!
//! > Given an incentive budget, how fast does the network grow, and what
//! > is the cheapest bonus that hits a hiring target on time?
//!
//! ## Core Contract
//!
//! 1. The referral graph is a forest of out-trees: no self-referrals, at
//!    most one referrer per candidate, no cycles
//! 2. Every analytics result is deterministic: ties break toward the
//!    smaller user id, orderings are canonical
//! 3. Graph reads go through a cached adjacency view that is either fully
//!    stale or fully fresh, never a mix
//!
//! ## Architecture
//!
//! ```text
//! NetworkSource (SQLite or Memory)
//!        ↓
//! ReferralNetwork (cached AdjacencyView + referral validation)
//!        ↓
//! analytics (reach / coverage / centrality)    sim (growth / bonus)
//! ```
//!
//! Simulation is independent of the graph: it models expected-value
//! cohort growth and answers incentive questions on top of it.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod adjacency;
pub mod analytics;
pub mod network;
pub mod sim;
pub mod store;
pub mod types;

#[cfg(feature = "service")]
pub mod service;

// Re-exports
pub use types::{Referral, ReferralViolation, UserId, UserProfile};
pub use adjacency::AdjacencyView;
pub use analytics::{
    flow_centrality, has_path, reach_count, reach_set, top_by_reach, unique_reach_greedy,
    CentralityScore, CoveragePick, ReachEntry,
};
pub use network::{NetworkError, ReferralNetwork};
pub use sim::{
    active_fraction, GrowthModel, BONUS_STEP, DEFAULT_INITIAL_PARTICIPANTS,
    DEFAULT_REFERRAL_CAPACITY, MAX_BONUS, MAX_SIMULATED_DAYS, NEGLIGIBLE_GROWTH, TARGET_EPSILON,
};
pub use store::{MemoryNetwork, NetworkSource};
#[cfg(feature = "sqlite")]
pub use store::{SqliteConfig, SqliteNetwork};

// Service re-exports (when service feature is enabled)
#[cfg(feature = "service")]
pub use service::{create_router, ServiceState};
