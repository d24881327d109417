//! In-memory marketplace adapter for sync tests and local runs.

use crate::hit::{
    domain::{
        AssignmentPage, AssignmentStatus, CreatedRemoteHit, HitExtension, HitStatus, HitTypeId,
        NewRemoteHit, RemoteAssignment, RemoteAssignmentId, RemoteHit, RemoteHitId, WorkerId,
        format_marketplace_timestamp, join_keywords,
    },
    ports::{MarketplaceClient, MarketplaceError, MarketplaceResult},
};
use async_trait::async_trait;
use mockable::Clock;
use rust_decimal::Decimal;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::{Arc, RwLock, RwLockWriteGuard};

/// A request received by [`InMemoryMarketplace`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MarketplaceCall {
    /// HIT creation, by title.
    CreateHit {
        /// Requested title.
        title: String,
    },
    /// HIT lookup.
    GetHit(RemoteHitId),
    /// Assignment page lookup.
    GetAssignments {
        /// HIT queried.
        hit_id: RemoteHitId,
        /// Requested page, starting at 1.
        page_number: u32,
        /// Requested page size.
        page_size: u32,
    },
    /// HIT expiration.
    ExpireHit(RemoteHitId),
    /// HIT extension.
    ExtendHit(RemoteHitId, HitExtension),
    /// Review-state change.
    SetReviewing {
        /// HIT changed.
        hit_id: RemoteHitId,
        /// `true` to move back to `Reviewable`.
        revert: bool,
    },
    /// HIT disposal.
    DisposeHit(RemoteHitId),
    /// Assignment approval.
    ApproveAssignment(RemoteAssignmentId),
    /// Assignment rejection.
    RejectAssignment(RemoteAssignmentId),
    /// Bonus payment.
    GrantBonus {
        /// Worker paid.
        worker_id: WorkerId,
        /// Assignment the bonus is for.
        assignment_id: RemoteAssignmentId,
        /// Amount paid.
        amount: Decimal,
        /// Reason shown to the worker.
        reason: Option<String>,
    },
}

/// In-memory marketplace.
///
/// Creation assigns sequential identifiers (`HIT1`, `HIT2`, ...). Assignment
/// listings are paginated from the seeded assignments in identifier order.
/// Every request is recorded and can be inspected with
/// [`InMemoryMarketplace::calls`]. Creation, approval and rejection times
/// come from the injected clock.
pub struct InMemoryMarketplace<C: Clock + Send + Sync> {
    state: Arc<RwLock<InMemoryMarketplaceState>>,
    clock: Arc<C>,
}

impl<C: Clock + Send + Sync> Clone for InMemoryMarketplace<C> {
    fn clone(&self) -> Self {
        Self {
            state: Arc::clone(&self.state),
            clock: Arc::clone(&self.clock),
        }
    }
}

impl<C: Clock + Send + Sync> fmt::Debug for InMemoryMarketplace<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InMemoryMarketplace")
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Default)]
struct InMemoryMarketplaceState {
    hits: BTreeMap<RemoteHitId, RemoteHit>,
    assignments: BTreeMap<RemoteAssignmentId, RemoteAssignment>,
    calls: Vec<MarketplaceCall>,
    created: u64,
    failure: Option<MarketplaceError>,
}

impl InMemoryMarketplaceState {
    fn record(&mut self, call: MarketplaceCall) -> MarketplaceResult<()> {
        self.calls.push(call);
        self.failure.clone().map_or(Ok(()), Err)
    }

    fn hit_mut(&mut self, hit_id: &RemoteHitId) -> MarketplaceResult<&mut RemoteHit> {
        self.hits
            .get_mut(hit_id)
            .ok_or_else(|| MarketplaceError::NotFound(hit_id.to_string()))
    }

    fn submitted_assignment_mut(
        &mut self,
        assignment_id: &RemoteAssignmentId,
    ) -> MarketplaceResult<&mut RemoteAssignment> {
        let assignment = self
            .assignments
            .get_mut(assignment_id)
            .ok_or_else(|| MarketplaceError::NotFound(assignment_id.to_string()))?;
        if assignment.status != AssignmentStatus::Submitted.as_remote_str() {
            return Err(MarketplaceError::api(
                "AWS.MechanicalTurk.InvalidAssignmentState",
                format!(
                    "assignment {assignment_id} is in status {}",
                    assignment.status
                ),
            ));
        }
        Ok(assignment)
    }
}

impl<C: Clock + Send + Sync> InMemoryMarketplace<C> {
    /// Creates an empty marketplace reading time from `clock`.
    #[must_use]
    pub fn new(clock: Arc<C>) -> Self {
        Self {
            state: Arc::new(RwLock::new(InMemoryMarketplaceState::default())),
            clock,
        }
    }

    fn now_string(&self) -> String {
        format_marketplace_timestamp(self.clock.utc())
    }

    fn write(&self) -> MarketplaceResult<RwLockWriteGuard<'_, InMemoryMarketplaceState>> {
        self.state
            .write()
            .map_err(|err| MarketplaceError::transport(std::io::Error::other(err.to_string())))
    }

    /// Adds or replaces a HIT snapshot.
    ///
    /// # Errors
    ///
    /// Returns transport errors when lock acquisition fails.
    pub fn insert_hit(&self, hit: RemoteHit) -> MarketplaceResult<()> {
        let mut state = self.write()?;
        state.hits.insert(hit.hit_id.clone(), hit);
        Ok(())
    }

    /// Adds or replaces an assignment snapshot.
    ///
    /// # Errors
    ///
    /// Returns transport errors when lock acquisition fails.
    pub fn insert_assignment(&self, assignment: RemoteAssignment) -> MarketplaceResult<()> {
        let mut state = self.write()?;
        state
            .assignments
            .insert(assignment.assignment_id.clone(), assignment);
        Ok(())
    }

    /// Overwrites the status word of a HIT.
    ///
    /// # Errors
    ///
    /// Returns [`MarketplaceError::NotFound`] for unknown HITs.
    pub fn set_hit_status(&self, hit_id: &RemoteHitId, status: &str) -> MarketplaceResult<()> {
        let mut state = self.write()?;
        state.hit_mut(hit_id)?.status = status.to_owned();
        Ok(())
    }

    /// Makes every following request fail with `error` until cleared.
    ///
    /// # Errors
    ///
    /// Returns transport errors when lock acquisition fails.
    pub fn fail_with(&self, error: MarketplaceError) -> MarketplaceResult<()> {
        self.write()?.failure = Some(error);
        Ok(())
    }

    /// Stops injecting failures.
    ///
    /// # Errors
    ///
    /// Returns transport errors when lock acquisition fails.
    pub fn clear_failure(&self) -> MarketplaceResult<()> {
        self.write()?.failure = None;
        Ok(())
    }

    /// Returns every request received so far, in order.
    ///
    /// # Errors
    ///
    /// Returns transport errors when lock acquisition fails.
    pub fn calls(&self) -> MarketplaceResult<Vec<MarketplaceCall>> {
        let state = self
            .state
            .read()
            .map_err(|err| MarketplaceError::transport(std::io::Error::other(err.to_string())))?;
        Ok(state.calls.clone())
    }
}

#[async_trait]
impl<C: Clock + Send + Sync> MarketplaceClient for InMemoryMarketplace<C> {
    async fn create_hit(&self, request: NewRemoteHit) -> MarketplaceResult<CreatedRemoteHit> {
        let created_at = self.now_string();
        let mut state = self.write()?;
        state.record(MarketplaceCall::CreateHit {
            title: request.title.clone(),
        })?;
        state.created = state.created.saturating_add(1);
        let hit_id =
            RemoteHitId::new(format!("HIT{}", state.created)).map_err(MarketplaceError::transport)?;
        let hit_type_id =
            HitTypeId::new(format!("TYPE{}", state.created)).map_err(MarketplaceError::transport)?;

        let mut hit = RemoteHit::new(
            hit_id.clone(),
            HitStatus::Assignable.as_remote_str(),
            request.title,
            request.description,
            request.reward,
            created_at,
        )
        .with_assignment_counts(0, request.max_assignments, 0);
        hit.hit_type_id = Some(hit_type_id.clone());
        hit.keywords = Some(join_keywords(&request.keywords));
        hit.max_assignments = Some(request.max_assignments);
        hit.assignment_duration_in_seconds = request.assignment_duration_in_seconds;
        hit.auto_approval_delay_in_seconds = request.auto_approval_delay_in_seconds;
        state.hits.insert(hit_id.clone(), hit);

        Ok(CreatedRemoteHit {
            hit_id,
            hit_type_id: Some(hit_type_id),
        })
    }

    async fn get_hit(&self, hit_id: &RemoteHitId) -> MarketplaceResult<RemoteHit> {
        let mut state = self.write()?;
        state.record(MarketplaceCall::GetHit(hit_id.clone()))?;
        Ok(state.hit_mut(hit_id)?.clone())
    }

    async fn get_assignments(
        &self,
        hit_id: &RemoteHitId,
        page_number: u32,
        page_size: u32,
    ) -> MarketplaceResult<AssignmentPage> {
        let mut state = self.write()?;
        state.record(MarketplaceCall::GetAssignments {
            hit_id: hit_id.clone(),
            page_number,
            page_size,
        })?;
        state.hit_mut(hit_id)?;

        let owned: Vec<&RemoteAssignment> = state
            .assignments
            .values()
            .filter(|assignment| assignment.hit_id == *hit_id)
            .collect();
        let total_num_results = u32::try_from(owned.len()).unwrap_or(u32::MAX);
        let size = usize::try_from(page_size).unwrap_or(usize::MAX);
        let skip = usize::try_from(page_number.saturating_sub(1))
            .unwrap_or(usize::MAX)
            .saturating_mul(size);
        let assignments = owned
            .into_iter()
            .skip(skip)
            .take(size)
            .cloned()
            .collect();

        Ok(AssignmentPage {
            page_number,
            total_num_results,
            assignments,
        })
    }

    async fn expire_hit(&self, hit_id: &RemoteHitId) -> MarketplaceResult<()> {
        let mut state = self.write()?;
        state.record(MarketplaceCall::ExpireHit(hit_id.clone()))?;
        let hit = state.hit_mut(hit_id)?;
        hit.status = HitStatus::Reviewable.as_remote_str().to_owned();
        hit.number_of_assignments_available = Some(0);
        Ok(())
    }

    async fn extend_hit(
        &self,
        hit_id: &RemoteHitId,
        extension: HitExtension,
    ) -> MarketplaceResult<()> {
        let mut state = self.write()?;
        state.record(MarketplaceCall::ExtendHit(hit_id.clone(), extension))?;
        let hit = state.hit_mut(hit_id)?;
        if let Some(increment) = extension.assignments_increment {
            hit.max_assignments = Some(hit.max_assignments.unwrap_or(0).saturating_add(increment));
            hit.number_of_assignments_available = Some(
                hit.number_of_assignments_available
                    .unwrap_or(0)
                    .saturating_add(increment),
            );
        }
        hit.status = HitStatus::Assignable.as_remote_str().to_owned();
        Ok(())
    }

    async fn set_reviewing(&self, hit_id: &RemoteHitId, revert: bool) -> MarketplaceResult<()> {
        let mut state = self.write()?;
        state.record(MarketplaceCall::SetReviewing {
            hit_id: hit_id.clone(),
            revert,
        })?;
        let hit = state.hit_mut(hit_id)?;
        let reviewable = HitStatus::Reviewable.as_remote_str();
        let reviewing = HitStatus::Reviewing.as_remote_str();
        if hit.status != reviewable && hit.status != reviewing {
            return Err(MarketplaceError::api(
                "AWS.MechanicalTurk.InvalidHITState",
                format!("HIT {hit_id} is in status {}", hit.status),
            ));
        }
        let next = if revert { reviewable } else { reviewing };
        hit.status = next.to_owned();
        Ok(())
    }

    async fn dispose_hit(&self, hit_id: &RemoteHitId) -> MarketplaceResult<()> {
        let approved_at = self.now_string();
        let mut state = self.write()?;
        state.record(MarketplaceCall::DisposeHit(hit_id.clone()))?;
        state.hit_mut(hit_id)?.status = HitStatus::Disposed.as_remote_str().to_owned();
        for assignment in state
            .assignments
            .values_mut()
            .filter(|assignment| assignment.hit_id == *hit_id)
        {
            if assignment.status == AssignmentStatus::Submitted.as_remote_str() {
                assignment.status = AssignmentStatus::Approved.as_remote_str().to_owned();
                assignment.approval_time = Some(approved_at.clone());
            }
        }
        Ok(())
    }

    async fn approve_assignment(
        &self,
        assignment_id: &RemoteAssignmentId,
        feedback: Option<String>,
    ) -> MarketplaceResult<()> {
        let approved_at = self.now_string();
        let mut state = self.write()?;
        state.record(MarketplaceCall::ApproveAssignment(assignment_id.clone()))?;
        let assignment = state.submitted_assignment_mut(assignment_id)?;
        assignment.status = AssignmentStatus::Approved.as_remote_str().to_owned();
        assignment.approval_time = Some(approved_at);
        assignment.requester_feedback = feedback;
        Ok(())
    }

    async fn reject_assignment(
        &self,
        assignment_id: &RemoteAssignmentId,
        feedback: Option<String>,
    ) -> MarketplaceResult<()> {
        let rejected_at = self.now_string();
        let mut state = self.write()?;
        state.record(MarketplaceCall::RejectAssignment(assignment_id.clone()))?;
        let assignment = state.submitted_assignment_mut(assignment_id)?;
        assignment.status = AssignmentStatus::Rejected.as_remote_str().to_owned();
        assignment.rejection_time = Some(rejected_at);
        assignment.requester_feedback = feedback;
        Ok(())
    }

    async fn grant_bonus(
        &self,
        worker_id: &WorkerId,
        assignment_id: &RemoteAssignmentId,
        amount: Decimal,
        reason: Option<String>,
    ) -> MarketplaceResult<()> {
        let mut state = self.write()?;
        state.record(MarketplaceCall::GrantBonus {
            worker_id: worker_id.clone(),
            assignment_id: assignment_id.clone(),
            amount,
            reason,
        })?;
        let assignment = state
            .assignments
            .get(assignment_id)
            .ok_or_else(|| MarketplaceError::NotFound(assignment_id.to_string()))?;
        if assignment.worker_id != *worker_id {
            return Err(MarketplaceError::api(
                "AWS.MechanicalTurk.InvalidParameterValue",
                format!("worker {worker_id} did not work on assignment {assignment_id}"),
            ));
        }
        Ok(())
    }
}
