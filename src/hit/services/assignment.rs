//! Assignment operations on [`HitSyncService`].

use super::{HitSyncError, HitSyncResult, HitSyncService, ingest_answers};
use crate::hit::{
    domain::{
        AnswerRecord, Assignment, CompletionResult, Hit, HitDomainError, RemoteAssignment,
        RemoteAssignmentId, RemoteHitId,
    },
    ports::{HitRepository, MarketplaceClient},
};
use mockable::Clock;
use rust_decimal::Decimal;
use tracing::{debug, info, warn};

impl<R, M, C> HitSyncService<R, M, C>
where
    R: HitRepository,
    M: MarketplaceClient,
    C: Clock + Send + Sync,
{
    async fn find_assignment_or_error(
        &self,
        assignment_id: &RemoteAssignmentId,
    ) -> HitSyncResult<Assignment> {
        self.repository
            .find_assignment(assignment_id)
            .await?
            .ok_or_else(|| HitSyncError::AssignmentNotFound(assignment_id.clone()))
    }

    /// Finds an assignment by marketplace identifier.
    ///
    /// # Errors
    ///
    /// Returns persistence errors from the repository.
    pub async fn find_assignment(
        &self,
        assignment_id: &RemoteAssignmentId,
    ) -> HitSyncResult<Option<Assignment>> {
        Ok(self.repository.find_assignment(assignment_id).await?)
    }

    /// Approves an assignment on the marketplace, then refreshes it.
    ///
    /// # Errors
    ///
    /// Returns [`HitSyncError::AssignmentNotFound`] for unknown assignments,
    /// plus the errors of [`Self::refresh_assignment`].
    pub async fn approve_assignment(
        &self,
        assignment_id: &RemoteAssignmentId,
        feedback: Option<String>,
    ) -> HitSyncResult<Assignment> {
        self.find_assignment_or_error(assignment_id).await?;
        self.marketplace
            .approve_assignment(assignment_id, feedback)
            .await?;
        info!(assignment_id = %assignment_id, "approved assignment");
        self.refresh_assignment(assignment_id, None).await
    }

    /// Rejects an assignment on the marketplace, then refreshes it.
    ///
    /// # Errors
    ///
    /// Returns [`HitSyncError::AssignmentNotFound`] for unknown assignments,
    /// plus the errors of [`Self::refresh_assignment`].
    pub async fn reject_assignment(
        &self,
        assignment_id: &RemoteAssignmentId,
        feedback: Option<String>,
    ) -> HitSyncResult<Assignment> {
        self.find_assignment_or_error(assignment_id).await?;
        self.marketplace
            .reject_assignment(assignment_id, feedback)
            .await?;
        info!(assignment_id = %assignment_id, "rejected assignment");
        self.refresh_assignment(assignment_id, None).await
    }

    /// Pays a bonus to the worker of an assignment, then refreshes it.
    ///
    /// # Errors
    ///
    /// Returns [`HitDomainError::InvalidBonusAmount`] unless the amount is
    /// positive, [`HitDomainError::MissingWorker`] before the worker is
    /// known, plus marketplace and refresh errors.
    pub async fn grant_bonus(
        &self,
        assignment_id: &RemoteAssignmentId,
        amount: Decimal,
        reason: Option<String>,
    ) -> HitSyncResult<Assignment> {
        if amount <= Decimal::ZERO {
            return Err(HitDomainError::InvalidBonusAmount(amount).into());
        }
        let assignment = self.find_assignment_or_error(assignment_id).await?;
        let worker_id = assignment.require_worker_id()?;
        self.marketplace
            .grant_bonus(worker_id, assignment_id, amount, reason)
            .await?;
        info!(
            assignment_id = %assignment_id,
            worker_id = %worker_id,
            amount = %amount,
            "granted bonus"
        );
        self.refresh_assignment(assignment_id, None).await
    }

    /// Refreshes an assignment from the marketplace.
    ///
    /// With a payload, the payload is applied directly. Without one, every
    /// page of the owning HIT's assignments is fetched: sibling assignments
    /// encountered on the way are refreshed with their own payloads and this
    /// assignment keeps its matching payload. The assignment is persisted
    /// even when no payload for it was found.
    ///
    /// # Errors
    ///
    /// Returns [`HitSyncError::AssignmentNotFound`] for unknown assignments,
    /// [`HitDomainError::MismatchedAssignment`] when the payload names
    /// another assignment, translation errors, and marketplace or repository
    /// errors.
    pub async fn refresh_assignment(
        &self,
        assignment_id: &RemoteAssignmentId,
        payload: Option<RemoteAssignment>,
    ) -> HitSyncResult<Assignment> {
        let mut assignment = self.find_assignment_or_error(assignment_id).await?;
        let hit = self.find_hit_or_error(assignment.hit_id()).await?;
        let remote_hit_id = hit.require_remote_id()?.clone();

        let own_payload = match payload {
            Some(snapshot) => {
                if snapshot.assignment_id != *assignment_id {
                    return Err(HitDomainError::MismatchedAssignment {
                        expected: assignment_id.clone(),
                        actual: snapshot.assignment_id,
                    }
                    .into());
                }
                Some(snapshot)
            }
            None => {
                self.refresh_siblings(&hit, &remote_hit_id, assignment_id)
                    .await?
            }
        };

        if let Some(snapshot) = own_payload {
            ensure_same_hit(&snapshot, &remote_hit_id)?;
            self.apply_assignment_payload(&mut assignment, &snapshot)
                .await?;
        } else {
            debug!(
                assignment_id = %assignment_id,
                "marketplace listed no payload for assignment"
            );
            self.repository.update_assignment(&assignment).await?;
        }
        Ok(assignment)
    }

    /// Fetches every page of a HIT's assignments, refreshing all but
    /// `own_id`, and returns the payload for `own_id` when listed.
    async fn refresh_siblings(
        &self,
        hit: &Hit,
        remote_hit_id: &RemoteHitId,
        own_id: &RemoteAssignmentId,
    ) -> HitSyncResult<Option<RemoteAssignment>> {
        let paging = self.default_paging();
        let mut own_payload = None;
        let mut page_number = paging.start_page;
        loop {
            let page = self
                .marketplace
                .get_assignments(remote_hit_id, page_number, paging.page_size)
                .await?;
            let fetched = page.assignments.len();
            for remote in page.assignments {
                if remote.assignment_id == *own_id {
                    own_payload = Some(remote);
                } else {
                    self.sync_assignment(hit, remote_hit_id, &remote).await?;
                }
            }

            if fetched == 0 || paging.is_last_page(page_number, page.total_num_results) {
                break;
            }
            match page_number.checked_add(1) {
                Some(next) => page_number = next,
                None => break,
            }
        }
        Ok(own_payload)
    }

    /// Mirrors one listed assignment of `hit`, creating it when unseen.
    pub(super) async fn sync_assignment(
        &self,
        hit: &Hit,
        remote_hit_id: &RemoteHitId,
        payload: &RemoteAssignment,
    ) -> HitSyncResult<Assignment> {
        ensure_same_hit(payload, remote_hit_id)?;
        let mut assignment = self
            .repository
            .get_or_create_assignment(&payload.assignment_id, hit.id())
            .await?
            .value;
        self.apply_assignment_payload(&mut assignment, payload)
            .await?;
        Ok(assignment)
    }

    async fn apply_assignment_payload(
        &self,
        assignment: &mut Assignment,
        payload: &RemoteAssignment,
    ) -> HitSyncResult<()> {
        assignment.apply_remote_snapshot(payload, &*self.clock)?;
        let worker = self
            .repository
            .get_or_create_worker(&payload.worker_id, self.clock.utc())
            .await?;
        if worker.created {
            warn!(
                worker_id = %worker.value,
                assignment_id = %assignment.id(),
                "recorded worker on first reference"
            );
        }
        self.repository.update_assignment(assignment).await?;
        ingest_answers(&*self.repository, assignment.id(), &payload.answers).await?;
        Ok(())
    }

    /// Sets the local completion flag of an assignment.
    ///
    /// # Errors
    ///
    /// Returns [`HitSyncError::AssignmentNotFound`] for unknown assignments
    /// and repository errors.
    pub async fn mark_assignment_completed(
        &self,
        assignment_id: &RemoteAssignmentId,
        completed: bool,
    ) -> HitSyncResult<Assignment> {
        let mut assignment = self.find_assignment_or_error(assignment_id).await?;
        assignment.set_completed(completed);
        self.repository.update_assignment(&assignment).await?;
        Ok(assignment)
    }

    /// Returns the stored answers of an assignment, ordered by key.
    ///
    /// # Errors
    ///
    /// Returns [`HitSyncError::AssignmentNotFound`] for unknown assignments
    /// and repository errors.
    pub async fn answers_for_assignment(
        &self,
        assignment_id: &RemoteAssignmentId,
    ) -> HitSyncResult<Vec<AnswerRecord>> {
        self.find_assignment_or_error(assignment_id).await?;
        Ok(self.repository.list_answers(assignment_id).await?)
    }

    /// Returns the completion results recorded under an assignment.
    ///
    /// # Errors
    ///
    /// Returns [`HitSyncError::AssignmentNotFound`] for unknown assignments
    /// and repository errors.
    pub async fn results_for_assignment(
        &self,
        assignment_id: &RemoteAssignmentId,
    ) -> HitSyncResult<Vec<CompletionResult>> {
        self.find_assignment_or_error(assignment_id).await?;
        Ok(self
            .repository
            .list_results_for_assignment(assignment_id)
            .await?)
    }
}

fn ensure_same_hit(
    payload: &RemoteAssignment,
    remote_hit_id: &RemoteHitId,
) -> Result<(), HitDomainError> {
    if payload.hit_id == *remote_hit_id {
        return Ok(());
    }
    Err(HitDomainError::ForeignAssignment {
        assignment: payload.assignment_id.clone(),
        expected: remote_hit_id.clone(),
        actual: payload.hit_id.clone(),
    })
}
