//! Service state management.
//!
//! Contains the shared network engine and growth model parameters.

use std::sync::Arc;

use crate::network::ReferralNetwork;
use crate::sim::GrowthModel;
use crate::store::NetworkSource;

/// Shared service state.
///
/// One engine per process; handlers clone the state, which clones the
/// inner `Arc`s, so every request sees the same adjacency cache.
pub struct ServiceState<S: NetworkSource + Send + Sync + 'static> {
    /// The network engine for graph reads and referral validation.
    pub network: Arc<ReferralNetwork<S>>,
    /// Growth model parameters used by the simulation endpoints.
    pub model: GrowthModel,
}

impl<S: NetworkSource + Send + Sync + 'static> ServiceState<S> {
    /// Create service state over a store, with default growth parameters.
    pub fn new(source: S) -> Self {
        Self::with_model(source, GrowthModel::default())
    }

    /// Create service state with explicit growth model parameters.
    pub fn with_model(source: S, model: GrowthModel) -> Self {
        Self {
            network: Arc::new(ReferralNetwork::new(Arc::new(source))),
            model,
        }
    }
}

impl<S: NetworkSource + Send + Sync + 'static> Clone for ServiceState<S> {
    fn clone(&self) -> Self {
        Self {
            network: Arc::clone(&self.network),
            model: self.model,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryNetwork;

    #[test]
    fn test_clones_share_one_engine() {
        let state = ServiceState::new(MemoryNetwork::new());
        let clone = state.clone();
        assert!(Arc::ptr_eq(&state.network, &clone.network));
    }

    #[test]
    fn test_default_model_parameters() {
        let state = ServiceState::new(MemoryNetwork::new());
        assert_eq!(state.model.capacity, 10);
        assert_eq!(state.model.initial_participants, 100.0);
    }
}
