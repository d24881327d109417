//! HIT aggregate root: the local mirror of a marketplace task.

use super::{
    CreatedRemoteHit, ExternalQuestion, HitDomainError, HitId, HitReviewStatus, HitStatus,
    HitTypeId, NewRemoteHit, RemoteHit, RemoteHitId, parse_marketplace_timestamp,
};
use chrono::{DateTime, Utc};
use mockable::Clock;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Largest reward representable in the `NUMERIC(5, 3)` column.
fn max_reward() -> Decimal {
    Decimal::new(99_999, 3)
}

fn validate_reward(reward: Decimal) -> Result<Decimal, HitDomainError> {
    if reward.is_sign_negative() || reward > max_reward() || reward.scale() > 3 {
        return Err(HitDomainError::InvalidReward(reward));
    }
    Ok(reward)
}

/// Splits a comma-separated keyword string, dropping blank entries.
#[must_use]
pub fn split_keywords(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|keyword| !keyword.is_empty())
        .map(str::to_owned)
        .collect()
}

/// Joins keywords into the comma-separated marketplace form.
#[must_use]
pub fn join_keywords(keywords: &[String]) -> String {
    keywords.join(", ")
}

/// Assignment-count snapshot; each count is only known when reported.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssignmentCounts {
    /// Accepted but not yet submitted.
    pub pending: Option<u32>,
    /// Still available to workers.
    pub available: Option<u32>,
    /// Approved or rejected.
    pub completed: Option<u32>,
}

/// Validated content for a HIT that has not been stored yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HitDraft {
    title: String,
    description: String,
    reward: Decimal,
    keywords: Vec<String>,
    max_assignments: u32,
    lifetime_in_seconds: Option<u32>,
    assignment_duration_in_seconds: Option<u32>,
    auto_approval_delay_in_seconds: Option<u32>,
    requester_annotation: Option<String>,
}

impl HitDraft {
    /// Creates a draft with required content and one assignment.
    ///
    /// # Errors
    ///
    /// Returns [`HitDomainError`] when the title or description is blank or
    /// the reward is out of range.
    pub fn new(
        title: impl Into<String>,
        description: impl Into<String>,
        reward: Decimal,
    ) -> Result<Self, HitDomainError> {
        let raw_title = title.into();
        let raw_description = description.into();
        if raw_title.trim().is_empty() {
            return Err(HitDomainError::EmptyTitle);
        }
        if raw_description.trim().is_empty() {
            return Err(HitDomainError::EmptyDescription);
        }
        Ok(Self {
            title: raw_title.trim().to_owned(),
            description: raw_description.trim().to_owned(),
            reward: validate_reward(reward)?,
            keywords: Vec::new(),
            max_assignments: 1,
            lifetime_in_seconds: None,
            assignment_duration_in_seconds: None,
            auto_approval_delay_in_seconds: None,
            requester_annotation: None,
        })
    }

    /// Sets keywords.
    #[must_use]
    pub fn with_keywords(mut self, keywords: impl IntoIterator<Item = String>) -> Self {
        self.keywords = keywords
            .into_iter()
            .map(|keyword| keyword.trim().to_owned())
            .filter(|keyword| !keyword.is_empty())
            .collect();
        self
    }

    /// Sets the maximum number of assignments.
    ///
    /// # Errors
    ///
    /// Returns [`HitDomainError::InvalidMaxAssignments`] for zero.
    pub fn with_max_assignments(mut self, max_assignments: u32) -> Result<Self, HitDomainError> {
        if max_assignments == 0 {
            return Err(HitDomainError::InvalidMaxAssignments(max_assignments));
        }
        self.max_assignments = max_assignments;
        Ok(self)
    }

    /// Sets the HIT lifetime.
    #[must_use]
    pub const fn with_lifetime(mut self, seconds: u32) -> Self {
        self.lifetime_in_seconds = Some(seconds);
        self
    }

    /// Sets the assignment duration.
    #[must_use]
    pub const fn with_assignment_duration(mut self, seconds: u32) -> Self {
        self.assignment_duration_in_seconds = Some(seconds);
        self
    }

    /// Sets the auto-approval delay.
    #[must_use]
    pub const fn with_auto_approval_delay(mut self, seconds: u32) -> Self {
        self.auto_approval_delay_in_seconds = Some(seconds);
        self
    }

    /// Sets the requester annotation.
    #[must_use]
    pub fn with_requester_annotation(mut self, annotation: impl Into<String>) -> Self {
        self.requester_annotation = Some(annotation.into());
        self
    }
}

/// HIT aggregate root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Hit {
    id: HitId,
    remote_id: Option<RemoteHitId>,
    hit_type_id: Option<HitTypeId>,
    creation_time: Option<DateTime<Utc>>,
    title: String,
    description: String,
    keywords: Vec<String>,
    reward: Decimal,
    lifetime_in_seconds: Option<u32>,
    assignment_duration_in_seconds: Option<u32>,
    max_assignments: u32,
    auto_approval_delay_in_seconds: Option<u32>,
    requester_annotation: Option<String>,
    number_of_similar_hits: Option<u32>,
    status: Option<HitStatus>,
    review_status: Option<HitReviewStatus>,
    assignment_counts: AssignmentCounts,
    last_synced_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

/// Parameter object for reconstructing a persisted HIT.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedHitData {
    /// Local identifier.
    pub id: HitId,
    /// Marketplace identifier, if created remotely.
    pub remote_id: Option<RemoteHitId>,
    /// HIT type identifier.
    pub hit_type_id: Option<HitTypeId>,
    /// Marketplace creation time.
    pub creation_time: Option<DateTime<Utc>>,
    /// Title.
    pub title: String,
    /// Description.
    pub description: String,
    /// Keywords.
    pub keywords: Vec<String>,
    /// Reward.
    pub reward: Decimal,
    /// Lifetime in seconds.
    pub lifetime_in_seconds: Option<u32>,
    /// Assignment duration in seconds.
    pub assignment_duration_in_seconds: Option<u32>,
    /// Maximum assignments.
    pub max_assignments: u32,
    /// Auto-approval delay in seconds.
    pub auto_approval_delay_in_seconds: Option<u32>,
    /// Requester annotation.
    pub requester_annotation: Option<String>,
    /// Number of similar HITs.
    pub number_of_similar_hits: Option<u32>,
    /// Lifecycle status.
    pub status: Option<HitStatus>,
    /// Review status.
    pub review_status: Option<HitReviewStatus>,
    /// Assignment counts.
    pub assignment_counts: AssignmentCounts,
    /// Last marketplace sync.
    pub last_synced_at: Option<DateTime<Utc>>,
    /// Local creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Local update timestamp.
    pub updated_at: DateTime<Utc>,
}

impl Hit {
    /// Creates a local HIT that has not been sent to the marketplace.
    #[must_use]
    pub fn new(draft: HitDraft, clock: &impl Clock) -> Self {
        let timestamp = clock.utc();
        Self {
            id: HitId::new(),
            remote_id: None,
            hit_type_id: None,
            creation_time: None,
            title: draft.title,
            description: draft.description,
            keywords: draft.keywords,
            reward: draft.reward,
            lifetime_in_seconds: draft.lifetime_in_seconds,
            assignment_duration_in_seconds: draft.assignment_duration_in_seconds,
            max_assignments: draft.max_assignments,
            auto_approval_delay_in_seconds: draft.auto_approval_delay_in_seconds,
            requester_annotation: draft.requester_annotation,
            number_of_similar_hits: None,
            status: None,
            review_status: None,
            assignment_counts: AssignmentCounts::default(),
            last_synced_at: None,
            created_at: timestamp,
            updated_at: timestamp,
        }
    }

    /// Reconstructs a HIT from persisted storage.
    #[must_use]
    pub fn from_persisted(data: PersistedHitData) -> Self {
        Self {
            id: data.id,
            remote_id: data.remote_id,
            hit_type_id: data.hit_type_id,
            creation_time: data.creation_time,
            title: data.title,
            description: data.description,
            keywords: data.keywords,
            reward: data.reward,
            lifetime_in_seconds: data.lifetime_in_seconds,
            assignment_duration_in_seconds: data.assignment_duration_in_seconds,
            max_assignments: data.max_assignments,
            auto_approval_delay_in_seconds: data.auto_approval_delay_in_seconds,
            requester_annotation: data.requester_annotation,
            number_of_similar_hits: data.number_of_similar_hits,
            status: data.status,
            review_status: data.review_status,
            assignment_counts: data.assignment_counts,
            last_synced_at: data.last_synced_at,
            created_at: data.created_at,
            updated_at: data.updated_at,
        }
    }

    /// Returns the local identifier.
    #[must_use]
    pub const fn id(&self) -> HitId {
        self.id
    }

    /// Returns the marketplace identifier, if created remotely.
    #[must_use]
    pub const fn remote_id(&self) -> Option<&RemoteHitId> {
        self.remote_id.as_ref()
    }

    /// Returns the marketplace identifier or fails for unpublished HITs.
    ///
    /// # Errors
    ///
    /// Returns [`HitDomainError::MissingRemoteId`] when the HIT was never
    /// created on the marketplace.
    pub fn require_remote_id(&self) -> Result<&RemoteHitId, HitDomainError> {
        self.remote_id
            .as_ref()
            .ok_or(HitDomainError::MissingRemoteId(self.id))
    }

    /// Returns the HIT type identifier.
    #[must_use]
    pub const fn hit_type_id(&self) -> Option<&HitTypeId> {
        self.hit_type_id.as_ref()
    }

    /// Returns the marketplace creation time.
    #[must_use]
    pub const fn creation_time(&self) -> Option<DateTime<Utc>> {
        self.creation_time
    }

    /// Returns the title.
    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Returns the description.
    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Returns the keywords.
    #[must_use]
    pub fn keywords(&self) -> &[String] {
        &self.keywords
    }

    /// Returns the reward.
    #[must_use]
    pub const fn reward(&self) -> Decimal {
        self.reward
    }

    /// Returns the lifetime in seconds.
    #[must_use]
    pub const fn lifetime_in_seconds(&self) -> Option<u32> {
        self.lifetime_in_seconds
    }

    /// Returns the assignment duration in seconds.
    #[must_use]
    pub const fn assignment_duration_in_seconds(&self) -> Option<u32> {
        self.assignment_duration_in_seconds
    }

    /// Returns the maximum number of assignments.
    #[must_use]
    pub const fn max_assignments(&self) -> u32 {
        self.max_assignments
    }

    /// Returns the auto-approval delay in seconds.
    #[must_use]
    pub const fn auto_approval_delay_in_seconds(&self) -> Option<u32> {
        self.auto_approval_delay_in_seconds
    }

    /// Returns the requester annotation.
    #[must_use]
    pub fn requester_annotation(&self) -> Option<&str> {
        self.requester_annotation.as_deref()
    }

    /// Returns the number of similar HITs.
    #[must_use]
    pub const fn number_of_similar_hits(&self) -> Option<u32> {
        self.number_of_similar_hits
    }

    /// Returns the lifecycle status; unset until the first refresh.
    #[must_use]
    pub const fn status(&self) -> Option<HitStatus> {
        self.status
    }

    /// Returns the review status.
    #[must_use]
    pub const fn review_status(&self) -> Option<HitReviewStatus> {
        self.review_status
    }

    /// Returns the assignment-count snapshot.
    #[must_use]
    pub const fn assignment_counts(&self) -> AssignmentCounts {
        self.assignment_counts
    }

    /// Returns when the HIT was last refreshed from the marketplace.
    #[must_use]
    pub const fn last_synced_at(&self) -> Option<DateTime<Utc>> {
        self.last_synced_at
    }

    /// Returns the local creation timestamp.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Returns the local update timestamp.
    #[must_use]
    pub const fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Returns `true` once marketplace data has been disposed.
    #[must_use]
    pub fn is_disposed(&self) -> bool {
        self.status == Some(HitStatus::Disposed)
    }

    /// Builds the marketplace creation request for this HIT.
    #[must_use]
    pub fn to_remote_request(
        &self,
        question: ExternalQuestion,
        response_groups: Vec<String>,
    ) -> NewRemoteHit {
        NewRemoteHit {
            title: self.title.clone(),
            description: self.description.clone(),
            keywords: self.keywords.clone(),
            max_assignments: self.max_assignments,
            question,
            reward: self.reward,
            lifetime_in_seconds: self.lifetime_in_seconds,
            assignment_duration_in_seconds: self.assignment_duration_in_seconds,
            auto_approval_delay_in_seconds: self.auto_approval_delay_in_seconds,
            response_groups,
        }
    }

    /// Records the identifiers assigned by marketplace creation.
    pub fn record_remote_creation(&mut self, created: CreatedRemoteHit, clock: &impl Clock) {
        self.remote_id = Some(created.hit_id);
        if created.hit_type_id.is_some() {
            self.hit_type_id = created.hit_type_id;
        }
        self.touch(clock);
    }

    /// Overwrites mirrored fields from a marketplace snapshot.
    ///
    /// Every value is translated before any field changes, so a failed
    /// translation leaves the HIT untouched. Assignment counts and review
    /// status are only overwritten when the snapshot reports them.
    ///
    /// # Errors
    ///
    /// Returns [`HitDomainError::MismatchedHit`] when the snapshot names a
    /// different marketplace HIT, and [`HitDomainError`] for unknown status
    /// words or malformed timestamps.
    pub fn apply_remote_snapshot(
        &mut self,
        snapshot: &RemoteHit,
        clock: &impl Clock,
    ) -> Result<(), HitDomainError> {
        if let Some(expected) = self.remote_id.as_ref().filter(|id| **id != snapshot.hit_id) {
            return Err(HitDomainError::MismatchedHit {
                expected: expected.clone(),
                actual: snapshot.hit_id.clone(),
            });
        }
        let status = HitStatus::try_from(snapshot.status.as_str())?;
        let review_status = snapshot
            .review_status
            .as_deref()
            .map(HitReviewStatus::try_from)
            .transpose()?;
        let creation_time = parse_marketplace_timestamp(&snapshot.creation_time)?;

        self.status = Some(status);
        if review_status.is_some() {
            self.review_status = review_status;
        }
        self.reward = snapshot.reward;
        self.assignment_duration_in_seconds = snapshot.assignment_duration_in_seconds;
        self.auto_approval_delay_in_seconds = snapshot.auto_approval_delay_in_seconds;
        if let Some(max_assignments) = snapshot.max_assignments {
            self.max_assignments = max_assignments;
        }
        self.creation_time = Some(creation_time);
        self.description.clone_from(&snapshot.description);
        self.title.clone_from(&snapshot.title);
        if snapshot.hit_type_id.is_some() {
            self.hit_type_id.clone_from(&snapshot.hit_type_id);
        }
        self.keywords = snapshot
            .keywords
            .as_deref()
            .map(split_keywords)
            .unwrap_or_default();
        if snapshot.requester_annotation.is_some() {
            self.requester_annotation.clone_from(&snapshot.requester_annotation);
        }
        if snapshot.number_of_similar_hits.is_some() {
            self.number_of_similar_hits = snapshot.number_of_similar_hits;
        }
        self.apply_counts(snapshot);

        let now = clock.utc();
        self.last_synced_at = Some(now);
        self.updated_at = now;
        Ok(())
    }

    fn apply_counts(&mut self, snapshot: &RemoteHit) {
        let counts = &mut self.assignment_counts;
        if snapshot.number_of_assignments_pending.is_some() {
            counts.pending = snapshot.number_of_assignments_pending;
        }
        if snapshot.number_of_assignments_available.is_some() {
            counts.available = snapshot.number_of_assignments_available;
        }
        if snapshot.number_of_assignments_completed.is_some() {
            counts.completed = snapshot.number_of_assignments_completed;
        }
    }

    fn touch(&mut self, clock: &impl Clock) {
        self.updated_at = clock.utc();
    }
}
