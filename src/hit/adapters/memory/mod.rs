//! In-memory adapters for the HIT repository and marketplace ports.

mod marketplace;
mod repository;

pub use marketplace::{InMemoryMarketplace, MarketplaceCall};
pub use repository::InMemoryHitRepository;
