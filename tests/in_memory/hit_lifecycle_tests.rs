//! In-memory integration tests for the HIT lifecycle.

use super::helpers::{SyncHarness, harness, publish_hit, submit_assignment};
use hitsync::hit::{
    domain::{AssignmentStatus, HitDisposalError, HitExtension, HitStatus},
    services::{AssignmentCascade, HitSyncError},
};
use rstest::rstest;

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn publish_review_and_dispose(harness: SyncHarness) -> Result<(), eyre::Report> {
    let hit = publish_hit(&harness).await?;
    let first = submit_assignment(&harness, &hit, "A1", "W1")?;
    let second = submit_assignment(&harness, &hit, "A2", "W2")?;

    let refreshed = harness
        .service
        .refresh_hit(hit.id(), None, AssignmentCascade::Refresh)
        .await?;
    eyre::ensure!(
        refreshed.status() == Some(HitStatus::Assignable),
        "expected Assignable, found {:?}",
        refreshed.status()
    );
    eyre::ensure!(
        refreshed.keywords() == ["psychology", "attention"],
        "keywords should survive the round trip"
    );

    harness.service.expire_hit(hit.id()).await?;
    let blocked = harness.service.dispose_hit(hit.id()).await;
    eyre::ensure!(
        matches!(
            blocked,
            Err(HitSyncError::Disposal(HitDisposalError::UnresolvedAssignment { .. }))
        ),
        "disposal must wait for every assignment, got {blocked:?}"
    );

    let approved = harness
        .service
        .approve_assignment(&first, Some("Thanks".to_owned()))
        .await?;
    let rejected = harness.service.reject_assignment(&second, None).await?;
    eyre::ensure!(
        approved.status() == Some(AssignmentStatus::Approved),
        "approval should be mirrored"
    );
    eyre::ensure!(
        rejected.status() == Some(AssignmentStatus::Rejected),
        "rejection should be mirrored"
    );

    let disposed = harness.service.dispose_hit(hit.id()).await?;
    eyre::ensure!(
        disposed.status() == Some(HitStatus::Disposed),
        "HIT should be disposed"
    );
    let repeated = harness.service.dispose_hit(hit.id()).await?;
    eyre::ensure!(repeated == disposed, "second disposal should be a no-op");
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn extension_reopens_an_expired_hit(harness: SyncHarness) -> Result<(), eyre::Report> {
    let hit = publish_hit(&harness).await?;
    let expired = harness.service.expire_hit(hit.id()).await?;
    eyre::ensure!(
        expired.status() == Some(HitStatus::Reviewable),
        "expired HIT should be reviewable"
    );
    eyre::ensure!(
        expired.assignment_counts().available == Some(0),
        "expired HIT should have no available assignments"
    );

    let extended = harness
        .service
        .extend_hit(
            hit.id(),
            HitExtension {
                assignments_increment: Some(1),
                expiration_increment_seconds: None,
            },
        )
        .await?;

    eyre::ensure!(
        extended.status() == Some(HitStatus::Assignable),
        "extended HIT should be assignable again"
    );
    eyre::ensure!(
        extended.max_assignments() == 3,
        "expected 3 assignments, found {}",
        extended.max_assignments()
    );
    eyre::ensure!(
        extended.assignment_counts().available == Some(1),
        "only the added assignment should be available"
    );
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn review_toggle_requires_a_reviewable_hit(harness: SyncHarness) -> Result<(), eyre::Report> {
    let hit = publish_hit(&harness).await?;

    let premature = harness.service.set_reviewing(hit.id(), false).await;
    eyre::ensure!(
        matches!(premature, Err(HitSyncError::Marketplace(_))),
        "marketplace should refuse review of an assignable HIT, got {premature:?}"
    );

    harness.service.expire_hit(hit.id()).await?;
    let reviewing = harness.service.set_reviewing(hit.id(), false).await?;
    eyre::ensure!(
        reviewing.status() == Some(HitStatus::Reviewing),
        "HIT should be under review"
    );
    let reverted = harness.service.set_reviewing(hit.id(), true).await?;
    eyre::ensure!(
        reverted.status() == Some(HitStatus::Reviewable),
        "HIT should be reviewable again"
    );
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn disabling_approves_outstanding_work(harness: SyncHarness) -> Result<(), eyre::Report> {
    let hit = publish_hit(&harness).await?;
    let submitted = submit_assignment(&harness, &hit, "A1", "W1")?;

    let disabled = harness.service.disable_hit(hit.id()).await?;
    eyre::ensure!(
        disabled.status() == Some(HitStatus::Disposed),
        "disabled HIT should be disposed"
    );

    let refreshed = harness.service.refresh_assignment(&submitted, None).await?;
    eyre::ensure!(
        refreshed.status() == Some(AssignmentStatus::Approved),
        "disabled HITs pay outstanding submissions, found {:?}",
        refreshed.status()
    );
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn every_published_hit_is_listed(harness: SyncHarness) -> Result<(), eyre::Report> {
    let first = publish_hit(&harness).await?;
    let second = publish_hit(&harness).await?;

    let listed: Vec<_> = harness
        .service
        .list_hits()
        .await?
        .into_iter()
        .map(|hit| hit.id())
        .collect();

    eyre::ensure!(listed.len() == 2, "expected two HITs, found {}", listed.len());
    eyre::ensure!(
        listed.contains(&first.id()) && listed.contains(&second.id()),
        "both HITs should be listed"
    );
    eyre::ensure!(
        first.remote_id() != second.remote_id(),
        "each publication gets its own marketplace identifier"
    );
    Ok(())
}
