//! Core types for the referral kernel.

pub mod user;
pub mod edge;

pub use user::{UserId, UserProfile};
pub use edge::{Referral, ReferralViolation};
