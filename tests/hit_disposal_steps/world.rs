//! Shared world state for HIT disposal BDD scenarios.

use std::sync::Arc;

use hitsync::hit::{
    adapters::memory::{InMemoryHitRepository, InMemoryMarketplace},
    domain::Hit,
    services::{HitSyncError, HitSyncService, SyncConfig},
};
use mockable::DefaultClock;
use rstest::fixture;

/// Service type used by the BDD world.
pub type TestSyncService =
    HitSyncService<InMemoryHitRepository, InMemoryMarketplace<DefaultClock>, DefaultClock>;

/// Scenario world for HIT disposal behaviour tests.
pub struct DisposalWorld {
    pub service: TestSyncService,
    pub marketplace: InMemoryMarketplace<DefaultClock>,
    pub hit: Option<Hit>,
    pub last_disposal: Option<Result<Hit, HitSyncError>>,
}

impl DisposalWorld {
    /// Creates a world over fresh in-memory adapters.
    ///
    /// # Panics
    ///
    /// Panics if the fixed scenario configuration is rejected.
    #[must_use]
    pub fn new() -> Self {
        let clock = Arc::new(DefaultClock);
        let marketplace = InMemoryMarketplace::new(Arc::clone(&clock));
        let config = SyncConfig::new("https://experiments.example.org")
            .unwrap_or_else(|err| panic!("scenario configuration should be valid: {err}"));
        let service = HitSyncService::new(
            Arc::new(InMemoryHitRepository::new()),
            Arc::new(marketplace.clone()),
            clock,
            config,
        );

        Self {
            service,
            marketplace,
            hit: None,
            last_disposal: None,
        }
    }

    /// Returns the HIT created by the scenario.
    ///
    /// # Errors
    ///
    /// Returns an error when no HIT has been published yet.
    pub fn hit(&self) -> Result<&Hit, eyre::Report> {
        self.hit
            .as_ref()
            .ok_or_else(|| eyre::eyre!("missing published HIT in scenario world"))
    }
}

impl Default for DisposalWorld {
    fn default() -> Self {
        Self::new()
    }
}

/// Fixture that creates a new scenario world.
#[fixture]
pub fn world() -> DisposalWorld {
    DisposalWorld::default()
}

/// Runs an async operation within sync step definitions.
pub fn run_async<T>(future: impl std::future::Future<Output = T>) -> T {
    tokio::task::block_in_place(|| tokio::runtime::Handle::current().block_on(future))
}
