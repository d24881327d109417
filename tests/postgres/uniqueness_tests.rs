//! Constraint enforcement for the `PostgreSQL` HIT repository.

use crate::postgres::helpers::{
    BoxError, draft_hit, prepare_repository, published_hit, test_runtime,
};
use chrono::Utc;
use hitsync::hit::{
    adapters::postgres::PostgresHitRepository,
    domain::{
        AnswerRecord, BatteryId, CompletionResult, RemoteAssignmentId, RemoteHitId, TemplateId,
        WorkerId,
    },
    ports::{HitRepository, HitRepositoryError},
};
use pg_embedded_setup_unpriv::{TestCluster, test_support::shared_test_cluster};
use rstest::rstest;

/// Stores a published HIT with one assignment worked by `W1`.
async fn seed_assignment(
    repo: &PostgresHitRepository,
) -> Result<(RemoteAssignmentId, WorkerId), BoxError> {
    let hit = published_hit("HIT1")?;
    repo.store_hit(&hit).await?;
    let assignment_id = RemoteAssignmentId::new("A1")?;
    let worker_id = WorkerId::new("W1")?;
    repo.get_or_create_worker(&worker_id, Utc::now()).await?;
    repo.get_or_create_assignment(&assignment_id, hit.id()).await?;
    Ok((assignment_id, worker_id))
}

fn stroop_result(
    worker_id: &WorkerId,
    assignment_id: &RemoteAssignmentId,
) -> Result<CompletionResult, BoxError> {
    Ok(CompletionResult::new(
        worker_id.clone(),
        assignment_id.clone(),
        BatteryId::new("attention")?,
        TemplateId::new("stroop")?,
    ))
}

#[rstest]
fn duplicate_remote_hit_id_is_rejected(shared_test_cluster: &'static TestCluster) {
    let (_guard, repo) =
        prepare_repository(shared_test_cluster, "test_dup_remote_id").expect("repository setup");
    let rt = test_runtime().expect("tokio runtime");
    let first = published_hit("HIT1").expect("published HIT");
    let second = published_hit("HIT1").expect("published HIT");

    rt.block_on(repo.store_hit(&first)).expect("first store");
    let result = rt.block_on(repo.store_hit(&second));

    let expected = RemoteHitId::new("HIT1").expect("valid remote id");
    assert!(
        matches!(&result, Err(HitRepositoryError::DuplicateRemoteHit(id)) if *id == expected),
        "expected DuplicateRemoteHit, got: {result:?}"
    );
}

#[rstest]
fn unpublished_hits_do_not_collide(shared_test_cluster: &'static TestCluster) {
    let (_guard, repo) =
        prepare_repository(shared_test_cluster, "test_null_remote_id").expect("repository setup");
    let rt = test_runtime().expect("tokio runtime");

    rt.block_on(repo.store_hit(&draft_hit().expect("draft HIT")))
        .expect("first draft");
    rt.block_on(repo.store_hit(&draft_hit().expect("draft HIT")))
        .expect("second draft");

    let hits = rt.block_on(repo.list_hits()).expect("list HITs");
    assert_eq!(hits.len(), 2);
}

#[rstest]
fn duplicate_answer_key_is_rejected(shared_test_cluster: &'static TestCluster) {
    let (_guard, repo) =
        prepare_repository(shared_test_cluster, "test_dup_answer").expect("repository setup");
    let rt = test_runtime().expect("tokio runtime");
    let (assignment_id, _) = rt.block_on(seed_assignment(&repo)).expect("seed assignment");
    let answer = AnswerRecord::new(assignment_id.clone(), "consent", Some("yes".to_owned()))
        .expect("valid answer");
    let duplicate = AnswerRecord::new(assignment_id.clone(), "consent", Some("no".to_owned()))
        .expect("valid answer");

    rt.block_on(repo.store_answer(&answer)).expect("first answer");
    let result = rt.block_on(repo.store_answer(&duplicate));

    assert!(
        matches!(
            &result,
            Err(HitRepositoryError::DuplicateAnswer { assignment, key })
                if *assignment == assignment_id && key == "consent"
        ),
        "expected DuplicateAnswer, got: {result:?}"
    );
    let stored = rt
        .block_on(repo.find_answer(&assignment_id, "consent"))
        .expect("answer lookup")
        .expect("answer should exist");
    assert_eq!(stored.value(), Some("yes"));
}

#[rstest]
fn answer_for_unknown_assignment_is_rejected(shared_test_cluster: &'static TestCluster) {
    let (_guard, repo) =
        prepare_repository(shared_test_cluster, "test_orphan_answer").expect("repository setup");
    let rt = test_runtime().expect("tokio runtime");
    let assignment_id = RemoteAssignmentId::new("A-UNSEEN").expect("valid assignment id");
    let answer =
        AnswerRecord::new(assignment_id.clone(), "consent", None).expect("valid answer");

    let result = rt.block_on(repo.store_answer(&answer));

    assert!(
        matches!(&result, Err(HitRepositoryError::AssignmentNotFound(id)) if *id == assignment_id),
        "expected AssignmentNotFound, got: {result:?}"
    );
}

#[rstest]
fn duplicate_result_is_rejected(shared_test_cluster: &'static TestCluster) {
    let (_guard, repo) =
        prepare_repository(shared_test_cluster, "test_dup_result").expect("repository setup");
    let rt = test_runtime().expect("tokio runtime");
    let (assignment_id, worker_id) = rt.block_on(seed_assignment(&repo)).expect("seed assignment");
    let result = stroop_result(&worker_id, &assignment_id).expect("valid result");
    let again = stroop_result(&worker_id, &assignment_id).expect("valid result");

    rt.block_on(repo.store_result(&result)).expect("first result");
    let duplicate = rt.block_on(repo.store_result(&again));

    assert!(
        matches!(
            &duplicate,
            Err(HitRepositoryError::DuplicateResult(key)) if *key == result.key()
        ),
        "expected DuplicateResult, got: {duplicate:?}"
    );
    let stored = rt
        .block_on(repo.list_results_for_assignment(&assignment_id))
        .expect("list results");
    assert_eq!(stored.len(), 1);
}

#[rstest]
fn result_for_unknown_worker_is_rejected(shared_test_cluster: &'static TestCluster) {
    let (_guard, repo) =
        prepare_repository(shared_test_cluster, "test_orphan_result").expect("repository setup");
    let rt = test_runtime().expect("tokio runtime");
    let (assignment_id, _) = rt.block_on(seed_assignment(&repo)).expect("seed assignment");
    let unseen = WorkerId::new("W-UNSEEN").expect("valid worker id");
    let orphan = stroop_result(&unseen, &assignment_id).expect("valid result");

    let result = rt.block_on(repo.store_result(&orphan));

    assert!(
        matches!(&result, Err(HitRepositoryError::WorkerNotFound(id)) if *id == unseen),
        "expected WorkerNotFound, got: {result:?}"
    );
}
