//! Referral Network REST Service
//!
//! Exposes the referral graph, influence metrics, and growth simulation
//! as a REST API for the network dashboard.
//!
//! ## Endpoints
//!
//! - `GET /api/stats` - Directory statistics
//! - `GET /api/users` - Users with reach counts
//! - `POST /api/users` - Create a user
//! - `GET /api/users/:id` - User detail with direct referrals and reach set
//! - `POST /api/users/:id/select` - Set or toggle the selected flag
//! - `POST /api/referrals` - Validate and record a referral edge
//! - `GET /api/graph` - Nodes and links for the force-directed view
//! - `GET /api/metrics/:metric` - `reach`, `unique_reach`, or `flow`
//! - `GET /api/simulate` - Cumulative expected-referral series
//! - `POST /api/min-bonus` - Minimum bonus meeting a hiring target
//! - `GET /api/export/users.csv` - Users as a CSV attachment
//! - `GET /health` - Detailed service health check
//! - `GET /health/live` - Liveness probe
//! - `GET /health/ready` - Readiness probe

pub mod middleware;
pub mod routes;
pub mod state;

pub use middleware::metrics_middleware;
pub use routes::{create_router, AppState};
pub use state::ServiceState;
