//! Referral network storage backends.

pub mod memory;

#[cfg(feature = "sqlite")]
pub mod sqlite;

use async_trait::async_trait;

use crate::types::{Referral, UserId};

/// Trait for referral network node/edge sources.
///
/// Implementations must guarantee deterministic ordering of results.
/// All methods are async to support async database access.
#[async_trait]
pub trait NetworkSource: Send + Sync {
    /// Error type for source operations.
    type Error: std::error::Error + Send + Sync;

    /// Fetch all user ids, ordered ascending.
    async fn list_user_ids(&self) -> Result<Vec<UserId>, Self::Error>;

    /// Fetch all referral edges, in insertion order.
    async fn list_referrals(&self) -> Result<Vec<Referral>, Self::Error>;
}

pub use memory::MemoryNetwork;

#[cfg(feature = "sqlite")]
pub use sqlite::{SqliteConfig, SqliteNetwork};
