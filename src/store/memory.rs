//! In-memory network store for testing.

use std::collections::BTreeMap;

use async_trait::async_trait;
use parking_lot::RwLock;

use super::NetworkSource;
use crate::types::{Referral, UserId, UserProfile};

/// Error type for in-memory store.
#[derive(Debug, Clone, thiserror::Error)]
pub enum MemoryError {
    /// User not found.
    #[error("User not found: {0}")]
    UserNotFound(UserId),
}

#[derive(Debug, Default)]
struct MemoryState {
    /// Profiles by id.
    profiles: BTreeMap<UserId, UserProfile>,
    /// All referral edges, in insertion order.
    referrals: Vec<Referral>,
    /// Last assigned id; ids start at 1 like SQLite rowids.
    last_id: i64,
}

/// In-memory network store for testing.
///
/// Uses BTreeMap for deterministic iteration order. Mutation takes
/// `&self` so tests can share one store between direct writes and a
/// [`ReferralNetwork`](crate::network::ReferralNetwork) holding an `Arc`.
#[derive(Debug, Default)]
pub struct MemoryNetwork {
    state: RwLock<MemoryState>,
}

impl MemoryNetwork {
    /// Create a new empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a user, assigning the next sequential id.
    pub fn add_user(&self, name: &str, email: Option<&str>, gender: Option<&str>) -> UserId {
        let mut state = self.state.write();
        state.last_id += 1;
        let id = UserId::new(state.last_id);
        state.profiles.insert(
            id,
            UserProfile::new(
                id,
                name.to_string(),
                email.map(str::to_string),
                gender.map(str::to_string),
            ),
        );
        id
    }

    /// Add a referral edge. No structural validation happens here; the
    /// engine's `check_referral` is the gatekeeper.
    pub fn add_referral(&self, referrer: UserId, candidate: UserId) {
        self.state.write().referrals.push(Referral::new(referrer, candidate));
    }

    /// Fetch one profile.
    pub fn profile(&self, id: UserId) -> Option<UserProfile> {
        self.state.read().profiles.get(&id).cloned()
    }

    /// All profiles, ordered by id.
    pub fn profiles(&self) -> Vec<UserProfile> {
        self.state.read().profiles.values().cloned().collect()
    }

    /// Set or toggle a user's selected flag, returning the new value.
    ///
    /// `Some(value)` sets it explicitly; `None` flips the current value.
    pub fn set_selected(&self, id: UserId, selected: Option<bool>) -> Result<bool, MemoryError> {
        let mut state = self.state.write();
        match state.profiles.get_mut(&id) {
            Some(profile) => {
                profile.selected = selected.unwrap_or(!profile.selected);
                Ok(profile.selected)
            }
            None => Err(MemoryError::UserNotFound(id)),
        }
    }

    /// Whether the user already appears as a candidate in some edge.
    pub fn has_referrer(&self, id: UserId) -> bool {
        self.state.read().referrals.iter().any(|r| r.candidate == id)
    }

    /// Number of users.
    pub fn user_count(&self) -> usize {
        self.state.read().profiles.len()
    }

    /// Number of referral edges.
    pub fn referral_count(&self) -> usize {
        self.state.read().referrals.len()
    }
}

#[async_trait]
impl NetworkSource for MemoryNetwork {
    type Error = MemoryError;

    async fn list_user_ids(&self) -> Result<Vec<UserId>, Self::Error> {
        Ok(self.state.read().profiles.keys().copied().collect())
    }

    async fn list_referrals(&self) -> Result<Vec<Referral>, Self::Error> {
        Ok(self.state.read().referrals.clone())
    }
}
