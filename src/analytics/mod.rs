//! Read-only analytics over the adjacency view.
//!
//! Each engine is a pure function of one `AdjacencyView`: reachability
//! (BFS descendant sets, top-K ranking), unique-reach greedy coverage,
//! and flow centrality. None of them mutate shared state, so any number
//! may run concurrently against the same view.

pub mod centrality;
pub mod coverage;
pub mod reach;

pub use centrality::{flow_centrality, CentralityScore};
pub use coverage::{unique_reach_greedy, CoveragePick};
pub use reach::{has_path, reach_count, reach_set, top_by_reach, ReachEntry};
