//! HIT, assignment and worker storage against `PostgreSQL`.

use crate::postgres::helpers::{draft_hit, prepare_repository, published_hit, test_runtime};
use chrono::Utc;
use hitsync::hit::{
    domain::{RemoteAssignmentId, RemoteHitId, WorkerId},
    ports::{HitRepository, HitRepositoryError},
};
use pg_embedded_setup_unpriv::{TestCluster, test_support::shared_test_cluster};
use rstest::rstest;

#[rstest]
fn published_hit_is_found_by_both_identifiers(shared_test_cluster: &'static TestCluster) {
    let (_guard, repo) =
        prepare_repository(shared_test_cluster, "test_find_hit").expect("repository setup");
    let rt = test_runtime().expect("tokio runtime");
    let hit = published_hit("HIT1").expect("published HIT");
    let remote_id = RemoteHitId::new("HIT1").expect("valid remote id");

    rt.block_on(repo.store_hit(&hit)).expect("store HIT");
    let by_id = rt
        .block_on(repo.find_hit(hit.id()))
        .expect("lookup by id")
        .expect("HIT should exist");
    let by_remote_id = rt
        .block_on(repo.find_hit_by_remote_id(&remote_id))
        .expect("lookup by remote id")
        .expect("HIT should be mirrored");
    let missing = rt
        .block_on(repo.find_hit_by_remote_id(
            &RemoteHitId::new("HIT404").expect("valid remote id"),
        ))
        .expect("lookup by remote id");

    assert_eq!(by_id.id(), hit.id());
    assert_eq!(by_remote_id.id(), hit.id());
    assert_eq!(by_remote_id.remote_id(), Some(&remote_id));
    assert_eq!(by_remote_id.reward(), hit.reward());
    assert_eq!(by_remote_id.max_assignments(), 3);
    assert!(missing.is_none());
}

#[rstest]
fn assignment_mirror_is_created_once(shared_test_cluster: &'static TestCluster) {
    let (_guard, repo) =
        prepare_repository(shared_test_cluster, "test_assignment_mirror").expect("repository setup");
    let rt = test_runtime().expect("tokio runtime");
    let hit = published_hit("HIT1").expect("published HIT");
    let other = published_hit("HIT2").expect("published HIT");
    rt.block_on(repo.store_hit(&hit)).expect("store HIT");
    rt.block_on(repo.store_hit(&other)).expect("store other HIT");
    let assignment_id = RemoteAssignmentId::new("A1").expect("valid assignment id");

    let first = rt
        .block_on(repo.get_or_create_assignment(&assignment_id, hit.id()))
        .expect("first get-or-create");
    let second = rt
        .block_on(repo.get_or_create_assignment(&assignment_id, hit.id()))
        .expect("second get-or-create");
    let foreign = rt.block_on(repo.get_or_create_assignment(&assignment_id, other.id()));

    assert!(first.created);
    assert!(!second.created);
    assert_eq!(second.value.hit_id(), hit.id());
    assert!(
        matches!(
            foreign,
            Err(HitRepositoryError::AssignmentHitMismatch { owner, requested, .. })
                if owner == hit.id() && requested == other.id()
        ),
        "expected AssignmentHitMismatch, got: {foreign:?}"
    );
    let listed = rt
        .block_on(repo.list_assignments_for_hit(hit.id()))
        .expect("list assignments");
    assert_eq!(listed.len(), 1);
}

#[rstest]
fn assignment_for_unknown_hit_is_rejected(shared_test_cluster: &'static TestCluster) {
    let (_guard, repo) =
        prepare_repository(shared_test_cluster, "test_assignment_orphan").expect("repository setup");
    let rt = test_runtime().expect("tokio runtime");
    let unstored = draft_hit().expect("draft HIT");

    let result = rt.block_on(repo.get_or_create_assignment(
        &RemoteAssignmentId::new("A1").expect("valid assignment id"),
        unstored.id(),
    ));

    assert!(
        matches!(result, Err(HitRepositoryError::HitNotFound(id)) if id == unstored.id()),
        "expected HitNotFound, got: {result:?}"
    );
}

#[rstest]
fn worker_is_recorded_on_first_reference_only(shared_test_cluster: &'static TestCluster) {
    let (_guard, repo) =
        prepare_repository(shared_test_cluster, "test_worker_mirror").expect("repository setup");
    let rt = test_runtime().expect("tokio runtime");
    let worker_id = WorkerId::new("W1").expect("valid worker id");

    let first = rt
        .block_on(repo.get_or_create_worker(&worker_id, Utc::now()))
        .expect("first get-or-create");
    let second = rt
        .block_on(repo.get_or_create_worker(&worker_id, Utc::now()))
        .expect("second get-or-create");

    assert!(first.created);
    assert!(!second.created);
    assert_eq!(second.value, worker_id);
}
