//! When steps for HIT disposal BDD scenarios.

use super::world::{DisposalWorld, run_async};
use rstest_bdd_macros::when;

#[when("the HIT is disposed")]
fn dispose_hit(world: &mut DisposalWorld) -> Result<(), eyre::Report> {
    let hit_id = world.hit()?.id();
    let result = run_async(world.service.dispose_hit(hit_id));
    if let Ok(ref disposed) = result {
        world.hit = Some(disposed.clone());
    }
    world.last_disposal = Some(result);
    Ok(())
}
