//! User types for the referral kernel.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Unique identifier for a user in the referral network.
///
/// Wraps the directory's integer id and implements `Ord` for
/// deterministic ordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(i64);

impl UserId {
    /// Create a new UserId from a raw integer.
    pub fn new(id: i64) -> Self {
        Self(id)
    }

    /// Get the inner integer.
    pub fn as_i64(&self) -> i64 {
        self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for UserId {
    fn from(id: i64) -> Self {
        Self(id)
    }
}

/// Directory record for a user.
///
/// Carried by the stores for presentation; the graph and simulation
/// engines never consult anything beyond the id.
/// Ordered by UserId for deterministic listings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserProfile {
    /// Unique user identifier.
    pub id: UserId,
    /// Display name.
    pub name: String,
    /// Contact email, if provided.
    pub email: Option<String>,
    /// Free-form gender label, if provided.
    pub gender: Option<String>,
    /// Whether the user is currently marked selected on the dashboard.
    pub selected: bool,
}

impl UserProfile {
    /// Create a new profile, unselected by default.
    pub fn new(id: UserId, name: String, email: Option<String>, gender: Option<String>) -> Self {
        Self {
            id,
            name,
            email,
            gender,
            selected: false,
        }
    }
}

// Implement Ord for UserProfile based on UserId for deterministic ordering
impl PartialEq for UserProfile {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for UserProfile {}

impl PartialOrd for UserProfile {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for UserProfile {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.id.cmp(&other.id)
    }
}
