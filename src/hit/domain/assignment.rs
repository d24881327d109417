//! Assignment aggregate: one worker's attempt at a HIT.

use super::{
    AssignmentStatus, HitDomainError, HitId, RemoteAssignment, RemoteAssignmentId, WorkerId,
    parse_marketplace_timestamp, parse_optional_timestamp,
};
use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};

/// Marketplace timestamps mirrored on an assignment.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssignmentTimes {
    /// When the worker accepted the HIT.
    pub accepted_at: Option<DateTime<Utc>>,
    /// When the worker submitted results.
    pub submitted_at: Option<DateTime<Utc>>,
    /// When the results are approved automatically.
    pub auto_approval_at: Option<DateTime<Utc>>,
    /// When the requester approved the results.
    pub approved_at: Option<DateTime<Utc>>,
    /// When the requester rejected the results.
    pub rejected_at: Option<DateTime<Utc>>,
    /// Deadline for the assignment.
    pub deadline: Option<DateTime<Utc>>,
}

/// Assignment aggregate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Assignment {
    id: RemoteAssignmentId,
    hit_id: HitId,
    worker_id: Option<WorkerId>,
    status: Option<AssignmentStatus>,
    times: AssignmentTimes,
    requester_feedback: Option<String>,
    completed: bool,
    last_synced_at: Option<DateTime<Utc>>,
}

/// Parameter object for reconstructing a persisted assignment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedAssignmentData {
    /// Marketplace assignment identifier.
    pub id: RemoteAssignmentId,
    /// Owning HIT.
    pub hit_id: HitId,
    /// Worker, once known.
    pub worker_id: Option<WorkerId>,
    /// Status, once known.
    pub status: Option<AssignmentStatus>,
    /// Mirrored timestamps.
    pub times: AssignmentTimes,
    /// Requester feedback.
    pub requester_feedback: Option<String>,
    /// Locally tracked completion flag.
    pub completed: bool,
    /// Last marketplace sync.
    pub last_synced_at: Option<DateTime<Utc>>,
}

/// Values translated from a marketplace assignment snapshot.
struct TranslatedSnapshot {
    status: AssignmentStatus,
    accepted_at: DateTime<Utc>,
    submitted_at: DateTime<Utc>,
    auto_approval_at: DateTime<Utc>,
    approved_at: Option<DateTime<Utc>>,
    rejected_at: Option<DateTime<Utc>>,
    deadline: Option<DateTime<Utc>>,
}

impl TranslatedSnapshot {
    fn from_remote(snapshot: &RemoteAssignment) -> Result<Self, HitDomainError> {
        Ok(Self {
            status: AssignmentStatus::try_from(snapshot.status.as_str())?,
            accepted_at: parse_marketplace_timestamp(&snapshot.accept_time)?,
            submitted_at: parse_marketplace_timestamp(&snapshot.submit_time)?,
            auto_approval_at: parse_marketplace_timestamp(&snapshot.auto_approval_time)?,
            approved_at: parse_optional_timestamp(snapshot.approval_time.as_deref())?,
            rejected_at: parse_optional_timestamp(snapshot.rejection_time.as_deref())?,
            deadline: parse_optional_timestamp(snapshot.deadline.as_deref())?,
        })
    }
}

impl Assignment {
    /// Creates an empty local mirror for a marketplace assignment.
    #[must_use]
    pub const fn new(id: RemoteAssignmentId, hit_id: HitId) -> Self {
        Self {
            id,
            hit_id,
            worker_id: None,
            status: None,
            times: AssignmentTimes {
                accepted_at: None,
                submitted_at: None,
                auto_approval_at: None,
                approved_at: None,
                rejected_at: None,
                deadline: None,
            },
            requester_feedback: None,
            completed: false,
            last_synced_at: None,
        }
    }

    /// Reconstructs an assignment from persisted storage.
    #[must_use]
    pub fn from_persisted(data: PersistedAssignmentData) -> Self {
        Self {
            id: data.id,
            hit_id: data.hit_id,
            worker_id: data.worker_id,
            status: data.status,
            times: data.times,
            requester_feedback: data.requester_feedback,
            completed: data.completed,
            last_synced_at: data.last_synced_at,
        }
    }

    /// Returns the marketplace assignment identifier.
    #[must_use]
    pub const fn id(&self) -> &RemoteAssignmentId {
        &self.id
    }

    /// Returns the owning HIT.
    #[must_use]
    pub const fn hit_id(&self) -> HitId {
        self.hit_id
    }

    /// Returns the worker, once known.
    #[must_use]
    pub const fn worker_id(&self) -> Option<&WorkerId> {
        self.worker_id.as_ref()
    }

    /// Returns the worker or fails when no refresh has set it yet.
    ///
    /// # Errors
    ///
    /// Returns [`HitDomainError::MissingWorker`] when the worker is unknown.
    pub fn require_worker_id(&self) -> Result<&WorkerId, HitDomainError> {
        self.worker_id
            .as_ref()
            .ok_or_else(|| HitDomainError::MissingWorker(self.id.clone()))
    }

    /// Returns the status, once known.
    #[must_use]
    pub const fn status(&self) -> Option<AssignmentStatus> {
        self.status
    }

    /// Returns `true` when the assignment was approved or rejected.
    #[must_use]
    pub fn is_resolved(&self) -> bool {
        self.status.is_some_and(AssignmentStatus::is_final)
    }

    /// Returns the mirrored marketplace timestamps.
    #[must_use]
    pub const fn times(&self) -> &AssignmentTimes {
        &self.times
    }

    /// Returns the requester feedback.
    #[must_use]
    pub fn requester_feedback(&self) -> Option<&str> {
        self.requester_feedback.as_deref()
    }

    /// Returns the local completion flag.
    #[must_use]
    pub const fn completed(&self) -> bool {
        self.completed
    }

    /// Returns when the assignment was last refreshed.
    #[must_use]
    pub const fn last_synced_at(&self) -> Option<DateTime<Utc>> {
        self.last_synced_at
    }

    /// Sets the local completion flag.
    pub const fn set_completed(&mut self, completed: bool) {
        self.completed = completed;
    }

    /// Overwrites mirrored fields from a marketplace snapshot.
    ///
    /// Approval, rejection, deadline, and feedback are only copied when the
    /// snapshot reports them. A snapshot that would move an approved or
    /// rejected assignment to a different status is refused.
    ///
    /// # Errors
    ///
    /// Returns [`HitDomainError`] for unknown status words, malformed
    /// timestamps, or a status regression.
    pub fn apply_remote_snapshot(
        &mut self,
        snapshot: &RemoteAssignment,
        clock: &impl Clock,
    ) -> Result<(), HitDomainError> {
        let translated = TranslatedSnapshot::from_remote(snapshot)?;
        self.ensure_status_transition(translated.status)?;

        self.status = Some(translated.status);
        self.worker_id = Some(snapshot.worker_id.clone());
        self.times.accepted_at = Some(translated.accepted_at);
        self.times.submitted_at = Some(translated.submitted_at);
        self.times.auto_approval_at = Some(translated.auto_approval_at);
        if translated.approved_at.is_some() {
            self.times.approved_at = translated.approved_at;
        }
        if translated.rejected_at.is_some() {
            self.times.rejected_at = translated.rejected_at;
        }
        if translated.deadline.is_some() {
            self.times.deadline = translated.deadline;
        }
        if snapshot.requester_feedback.is_some() {
            self.requester_feedback.clone_from(&snapshot.requester_feedback);
        }
        self.last_synced_at = Some(clock.utc());
        Ok(())
    }

    fn ensure_status_transition(&self, next: AssignmentStatus) -> Result<(), HitDomainError> {
        match self.status {
            Some(current) if current.is_final() && current != next => {
                Err(HitDomainError::AssignmentStatusRegression {
                    assignment: self.id.clone(),
                    from: current.as_remote_str().to_owned(),
                    to: next.as_remote_str().to_owned(),
                })
            }
            _ => Ok(()),
        }
    }
}
