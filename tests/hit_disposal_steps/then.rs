//! Then steps for HIT disposal BDD scenarios.

use super::world::DisposalWorld;
use hitsync::hit::{
    adapters::memory::MarketplaceCall,
    domain::{HitDisposalError, HitStatus},
    services::HitSyncError,
};
use rstest_bdd_macros::then;

fn disposal_error(world: &DisposalWorld) -> Result<&HitDisposalError, eyre::Report> {
    let result = world
        .last_disposal
        .as_ref()
        .ok_or_else(|| eyre::eyre!("missing disposal result"))?;
    match result {
        Err(HitSyncError::Disposal(err)) => Ok(err),
        other => Err(eyre::eyre!("expected a disposal error, got {other:?}")),
    }
}

#[then(r#"the HIT status is "{status}""#)]
fn hit_status_is(world: &DisposalWorld, status: String) -> Result<(), eyre::Report> {
    let expected = HitStatus::try_from(status.as_str())
        .map_err(|err| eyre::eyre!("invalid expected status in scenario: {err}"))?;
    let actual = world.hit()?.status();
    if actual != Some(expected) {
        return Err(eyre::eyre!(
            "expected status {}, found {actual:?}",
            expected.as_remote_str()
        ));
    }
    Ok(())
}

#[then(r#"disposal fails naming assignment "{assignment}""#)]
fn disposal_names_assignment(world: &DisposalWorld, assignment: String) -> Result<(), eyre::Report> {
    match disposal_error(world)? {
        HitDisposalError::UnresolvedAssignment {
            assignment: unresolved,
            ..
        } if unresolved.as_str() == assignment => Ok(()),
        other => Err(eyre::eyre!(
            "expected assignment {assignment} to block disposal, got {other}"
        )),
    }
}

#[then(r#"disposal fails because the HIT is "{status}""#)]
fn disposal_blocked_by_status(world: &DisposalWorld, status: String) -> Result<(), eyre::Report> {
    match disposal_error(world)? {
        HitDisposalError::NotReviewable {
            status: reported, ..
        } if *reported == status => Ok(()),
        other => Err(eyre::eyre!(
            "expected {status} to block disposal, got {other}"
        )),
    }
}

#[then("the marketplace received {count:usize} disposal request")]
fn disposal_request_count(world: &DisposalWorld, count: usize) -> Result<(), eyre::Report> {
    let received = world
        .marketplace
        .calls()?
        .iter()
        .filter(|call| matches!(call, MarketplaceCall::DisposeHit(_)))
        .count();
    if received != count {
        return Err(eyre::eyre!(
            "expected {count} disposal requests, found {received}"
        ));
    }
    Ok(())
}
