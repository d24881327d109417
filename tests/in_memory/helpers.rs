//! Shared test helpers for in-memory HIT synchronization tests.

use std::sync::Arc;

use hitsync::hit::{
    adapters::memory::{InMemoryHitRepository, InMemoryMarketplace},
    domain::{Hit, HitDraft, RemoteAssignment, RemoteAssignmentId, WorkerId},
    services::{HitSyncService, SyncConfig},
};
use mockable::DefaultClock;
use rstest::fixture;
use rust_decimal_macros::dec;

/// Service type wired to the in-memory adapters.
pub type TestService =
    HitSyncService<InMemoryHitRepository, InMemoryMarketplace<DefaultClock>, DefaultClock>;

/// Service plus handles on the adapters it was built from.
pub struct SyncHarness {
    pub service: TestService,
    pub repository: InMemoryHitRepository,
    pub marketplace: InMemoryMarketplace<DefaultClock>,
}

/// Provides a service over fresh in-memory adapters.
///
/// # Panics
///
/// Panics if the fixed test configuration is rejected.
#[fixture]
pub fn harness() -> SyncHarness {
    let repository = InMemoryHitRepository::new();
    let clock = Arc::new(DefaultClock);
    let marketplace = InMemoryMarketplace::new(Arc::clone(&clock));
    let config = SyncConfig::new("https://experiments.example.org")
        .and_then(|config| config.with_assignment_page_size(2))
        .unwrap_or_else(|err| panic!("test configuration should be valid: {err}"));
    let service = HitSyncService::new(
        Arc::new(repository.clone()),
        Arc::new(marketplace.clone()),
        clock,
        config,
    );
    SyncHarness {
        service,
        repository,
        marketplace,
    }
}

/// Creates and publishes a HIT with two assignments.
///
/// # Errors
///
/// Returns an error if the draft is invalid or publication fails.
pub async fn publish_hit(harness: &SyncHarness) -> Result<Hit, eyre::Report> {
    let draft = HitDraft::new("Stroop task", "Name the ink colour", dec!(0.75))?
        .with_keywords(["psychology".to_owned(), "attention".to_owned()])
        .with_max_assignments(2)?
        .with_assignment_duration(1_800);
    Ok(harness.service.create_hit(draft).await?)
}

/// Simulates a worker submitting an assignment on the marketplace.
///
/// # Errors
///
/// Returns an error if the HIT is unpublished or the identifiers are blank.
pub fn submit_assignment(
    harness: &SyncHarness,
    hit: &Hit,
    assignment: &str,
    worker: &str,
) -> Result<RemoteAssignmentId, eyre::Report> {
    let assignment_id = RemoteAssignmentId::new(assignment)?;
    let payload = RemoteAssignment::new(
        assignment_id.clone(),
        hit.require_remote_id()?.clone(),
        WorkerId::new(worker)?,
        "Submitted",
        "2015-04-01T18:00:00Z",
    );
    harness.marketplace.insert_assignment(payload)?;
    Ok(assignment_id)
}
