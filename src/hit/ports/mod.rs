//! Port contracts for HIT synchronization.
//!
//! Ports define infrastructure-agnostic interfaces used by the sync service:
//! the marketplace that owns the remote HITs and the store that mirrors them.

mod marketplace;
mod repository;

#[cfg(test)]
pub use marketplace::MockMarketplaceClient;
pub use marketplace::{MarketplaceClient, MarketplaceError, MarketplaceResult};
pub use repository::{GetOrCreated, HitRepository, HitRepositoryError, HitRepositoryResult};
