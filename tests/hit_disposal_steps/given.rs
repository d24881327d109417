//! Given steps for HIT disposal BDD scenarios.

use super::world::{DisposalWorld, run_async};
use eyre::WrapErr;
use hitsync::hit::domain::{HitDraft, RemoteAssignment, RemoteAssignmentId, WorkerId};
use rstest_bdd_macros::given;
use rust_decimal_macros::dec;

#[given("a published HIT")]
fn published_hit(world: &mut DisposalWorld) -> Result<(), eyre::Report> {
    let draft = HitDraft::new("Stroop task", "Name the ink colour", dec!(1.00))?
        .with_max_assignments(2)?;
    let created = run_async(world.service.create_hit(draft)).wrap_err("publish scenario HIT")?;
    world.hit = Some(created);
    Ok(())
}

#[given(r#"worker "{worker}" has submitted assignment "{assignment}""#)]
fn worker_submitted(
    world: &mut DisposalWorld,
    worker: String,
    assignment: String,
) -> Result<(), eyre::Report> {
    let remote_hit_id = world.hit()?.require_remote_id()?.clone();
    world.marketplace.insert_assignment(RemoteAssignment::new(
        RemoteAssignmentId::new(assignment)?,
        remote_hit_id,
        WorkerId::new(worker)?,
        "Submitted",
        "2015-04-01T18:00:00Z",
    ))?;
    Ok(())
}

#[given("the HIT has expired")]
fn hit_expired(world: &mut DisposalWorld) -> Result<(), eyre::Report> {
    let hit_id = world.hit()?.id();
    let expired = run_async(world.service.expire_hit(hit_id)).wrap_err("expire scenario HIT")?;
    world.hit = Some(expired);
    Ok(())
}

#[given(r#"assignment "{assignment}" has been approved"#)]
fn assignment_approved(world: &mut DisposalWorld, assignment: String) -> Result<(), eyre::Report> {
    let hit_id = world.hit()?.id();
    let paging = world.service.default_paging();
    run_async(world.service.refresh_assignments(hit_id, paging))
        .wrap_err("mirror scenario assignments")?;
    let assignment_id = RemoteAssignmentId::new(assignment)?;
    run_async(world.service.approve_assignment(&assignment_id, None))
        .wrap_err("approve scenario assignment")?;
    Ok(())
}

#[given("the HIT has been disposed")]
fn hit_disposed(world: &mut DisposalWorld) -> Result<(), eyre::Report> {
    let hit_id = world.hit()?.id();
    let disposed = run_async(world.service.dispose_hit(hit_id)).wrap_err("dispose scenario HIT")?;
    world.hit = Some(disposed);
    Ok(())
}
