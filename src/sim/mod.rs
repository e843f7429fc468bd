//! Network growth simulation and incentive solving.
//!
//! [`growth`] holds the expected-value cohort model; [`bonus`] layers the
//! minimum-incentive search on top of it. Both are pure computations with
//! no dependency on the graph store.

pub mod bonus;
pub mod growth;

pub use bonus::{BONUS_STEP, MAX_BONUS};
pub use growth::{
    active_fraction, GrowthModel, DEFAULT_INITIAL_PARTICIPANTS, DEFAULT_REFERRAL_CAPACITY,
    MAX_SIMULATED_DAYS, NEGLIGIBLE_GROWTH, TARGET_EPSILON,
};
