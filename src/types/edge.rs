//! Referral edge types for the referral kernel.

use serde::{Deserialize, Serialize};
use super::user::UserId;

/// Directed referral edge in the network.
///
/// Represents "referrer brought in candidate". A valid edge set forms a
/// forest of out-trees: no self-loops, at most one referrer per candidate,
/// no cycles. The kernel assumes these invariants; the collaborator layer
/// enforces them before committing an edge (see `ReferralViolation`).
/// Implements `Ord` for deterministic ordering: (referrer, candidate).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Referral {
    /// The user who made the referral (source).
    pub referrer: UserId,
    /// The user who was referred (target).
    pub candidate: UserId,
}

impl Referral {
    /// Create a new referral edge.
    pub fn new(referrer: UserId, candidate: UserId) -> Self {
        Self {
            referrer,
            candidate,
        }
    }
}

// Canonical ordering: referrer, then candidate
impl PartialOrd for Referral {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Referral {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        match self.referrer.cmp(&other.referrer) {
            std::cmp::Ordering::Equal => self.candidate.cmp(&other.candidate),
            ord => ord,
        }
    }
}

/// Reason a proposed referral edge was rejected.
///
/// Produced by the pre-commit checks (`ReferralNetwork::check_referral`),
/// never by the stores themselves. Rejection leaves no partial state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ReferralViolation {
    /// Referrer and candidate are the same user.
    #[error("No self-referrals allowed")]
    SelfReferral,
    /// The candidate already has a referrer (in-degree would exceed 1).
    #[error("Candidate {0} already has a referrer")]
    AlreadyReferred(UserId),
    /// The candidate can already reach the referrer, so the edge would
    /// close a cycle.
    #[error("Referral {referrer} -> {candidate} would create a cycle")]
    WouldCreateCycle {
        /// Proposed referrer (source).
        referrer: UserId,
        /// Proposed candidate (target).
        candidate: UserId,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_referral_ordering() {
        let e1 = Referral::new(UserId::new(1), UserId::new(2));
        let e2 = Referral::new(UserId::new(1), UserId::new(3));
        let e3 = Referral::new(UserId::new(2), UserId::new(3));

        // Same referrer, different candidate
        assert!(e1 < e2);
        // Different referrer
        assert!(e1 < e3);
        assert!(e2 < e3);
    }

    #[test]
    fn test_violation_messages() {
        let v = ReferralViolation::SelfReferral;
        assert_eq!(v.to_string(), "No self-referrals allowed");

        let v = ReferralViolation::AlreadyReferred(UserId::new(7));
        assert!(v.to_string().contains('7'));
    }
}
