//! In-memory integration tests for assignments, answers and results.

use super::helpers::{SyncHarness, harness, publish_hit, submit_assignment};
use hitsync::hit::{
    domain::{
        AnswerField, AnswerSet, BatteryId, CompletionResult, RemoteAssignment, RemoteAssignmentId,
        TemplateId, WorkerId,
    },
    ports::{HitRepository, HitRepositoryError},
    services::AssignmentCascade,
};
use chrono::Utc;
use rstest::rstest;
use rust_decimal_macros::dec;
use serde_json::json;

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn cascade_refresh_ingests_submitted_answers(
    harness: SyncHarness,
) -> Result<(), eyre::Report> {
    let hit = publish_hit(&harness).await?;
    let assignment_id = RemoteAssignmentId::new("A1")?;
    let worker_id = WorkerId::new("W1")?;
    harness.marketplace.insert_assignment(
        RemoteAssignment::new(
            assignment_id.clone(),
            hit.require_remote_id()?.clone(),
            worker_id.clone(),
            "Submitted",
            "2015-04-01T18:00:00Z",
        )
        .with_answers([AnswerSet::from_fields([
            AnswerField::new("consent", "yes"),
            AnswerField::new("comments", "none"),
        ])]),
    )?;

    harness
        .service
        .refresh_hit(hit.id(), None, AssignmentCascade::Refresh)
        .await?;

    let answers = harness.service.answers_for_assignment(&assignment_id).await?;
    let pairs: Vec<(&str, Option<&str>)> = answers
        .iter()
        .map(|answer| (answer.key(), answer.value()))
        .collect();
    eyre::ensure!(
        pairs == [("comments", Some("none")), ("consent", Some("yes"))],
        "unexpected answers {pairs:?}"
    );

    let worker = harness
        .repository
        .get_or_create_worker(&worker_id, Utc::now())
        .await?;
    eyre::ensure!(!worker.created, "worker should have been recorded by the refresh");
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn bonus_follows_an_approved_assignment(harness: SyncHarness) -> Result<(), eyre::Report> {
    let hit = publish_hit(&harness).await?;
    let assignment_id = submit_assignment(&harness, &hit, "A1", "W1")?;
    harness
        .service
        .refresh_assignments(hit.id(), harness.service.default_paging())
        .await?;
    harness.service.approve_assignment(&assignment_id, None).await?;

    let assignment = harness
        .service
        .grant_bonus(&assignment_id, dec!(0.50), Some("Accurate".to_owned()))
        .await?;

    eyre::ensure!(
        assignment.worker_id().map(WorkerId::as_str) == Some("W1"),
        "bonus should be paid to the recorded worker"
    );
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn results_are_unique_per_submission(harness: SyncHarness) -> Result<(), eyre::Report> {
    let hit = publish_hit(&harness).await?;
    let assignment_id = submit_assignment(&harness, &hit, "A1", "W1")?;
    harness
        .service
        .refresh_assignments(hit.id(), harness.service.default_paging())
        .await?;

    let mut result = CompletionResult::new(
        WorkerId::new("W1")?,
        assignment_id.clone(),
        BatteryId::new("attention")?,
        TemplateId::new("stroop")?,
    );
    harness.repository.store_result(&result).await?;

    result.task_data = Some(json!({"trials": 48, "accuracy": 0.92}));
    result.completed = true;
    result.credit_granted = true;
    harness.repository.update_result(&result).await?;

    let other_template = CompletionResult::new(
        WorkerId::new("W1")?,
        assignment_id.clone(),
        BatteryId::new("attention")?,
        TemplateId::new("flanker")?,
    );
    harness.repository.store_result(&other_template).await?;

    let duplicate = CompletionResult::new(
        WorkerId::new("W1")?,
        assignment_id.clone(),
        BatteryId::new("attention")?,
        TemplateId::new("stroop")?,
    );
    let rejected = harness.repository.store_result(&duplicate).await;
    eyre::ensure!(
        matches!(rejected, Err(HitRepositoryError::DuplicateResult(_))),
        "duplicate submission should be rejected, got {rejected:?}"
    );

    let results = harness.service.results_for_assignment(&assignment_id).await?;
    eyre::ensure!(results.len() == 2, "expected two results, found {}", results.len());
    let stroop = results
        .iter()
        .find(|stored| stored.template_id.as_str() == "stroop")
        .ok_or_else(|| eyre::eyre!("stroop result missing"))?;
    eyre::ensure!(
        stroop.completed && stroop.credit_granted,
        "updated flags should persist"
    );
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn results_must_reference_a_mirrored_worker_and_assignment(
    harness: SyncHarness,
) -> Result<(), eyre::Report> {
    let hit = publish_hit(&harness).await?;
    let assignment_id = submit_assignment(&harness, &hit, "A1", "W1")?;
    harness
        .service
        .refresh_assignments(hit.id(), harness.service.default_paging())
        .await?;

    let unknown_worker = CompletionResult::new(
        WorkerId::new("W-UNSEEN")?,
        assignment_id.clone(),
        BatteryId::new("attention")?,
        TemplateId::new("stroop")?,
    );
    let rejected = harness.repository.store_result(&unknown_worker).await;
    eyre::ensure!(
        matches!(rejected, Err(HitRepositoryError::WorkerNotFound(_))),
        "unseen worker should be rejected, got {rejected:?}"
    );

    let unknown_assignment = CompletionResult::new(
        WorkerId::new("W1")?,
        RemoteAssignmentId::new("A-UNSEEN")?,
        BatteryId::new("attention")?,
        TemplateId::new("stroop")?,
    );
    let rejected = harness.repository.store_result(&unknown_assignment).await;
    eyre::ensure!(
        matches!(rejected, Err(HitRepositoryError::AssignmentNotFound(_))),
        "unseen assignment should be rejected, got {rejected:?}"
    );

    let results = harness.service.results_for_assignment(&assignment_id).await?;
    eyre::ensure!(results.is_empty(), "no result should be stored, found {results:?}");
    Ok(())
}
