//! Marketplace payloads exchanged through the marketplace port.
//!
//! Snapshots keep statuses and timestamps in their raw marketplace form;
//! translation into domain values happens when a snapshot is applied to a
//! local record. Different marketplace query modes return different field
//! subsets, so optional fields mean "not reported", not "cleared".

use super::{HitTypeId, RemoteAssignmentId, RemoteHitId, WorkerId};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Snapshot of a HIT as returned by the marketplace.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteHit {
    /// Marketplace HIT identifier.
    pub hit_id: RemoteHitId,
    /// HIT type identifier, when reported.
    pub hit_type_id: Option<HitTypeId>,
    /// Raw status word, e.g. `Reviewable`.
    pub status: String,
    /// Raw review status word, when reported.
    pub review_status: Option<String>,
    /// HIT title.
    pub title: String,
    /// HIT description.
    pub description: String,
    /// Comma-separated keywords.
    pub keywords: Option<String>,
    /// Reward amount.
    pub reward: Decimal,
    /// Raw creation timestamp.
    pub creation_time: String,
    /// Time a worker has to finish an accepted assignment.
    pub assignment_duration_in_seconds: Option<u32>,
    /// Delay before submitted work is approved automatically.
    pub auto_approval_delay_in_seconds: Option<u32>,
    /// Maximum number of assignments.
    pub max_assignments: Option<u32>,
    /// Requester-only annotation.
    pub requester_annotation: Option<String>,
    /// Number of HITs sharing this HIT's settings.
    pub number_of_similar_hits: Option<u32>,
    /// Accepted but not yet submitted assignments.
    pub number_of_assignments_pending: Option<u32>,
    /// Assignments still available to workers.
    pub number_of_assignments_available: Option<u32>,
    /// Approved or rejected assignments.
    pub number_of_assignments_completed: Option<u32>,
}

impl RemoteHit {
    /// Creates a snapshot with the fields every query mode reports.
    #[must_use]
    pub fn new(
        hit_id: RemoteHitId,
        status: impl Into<String>,
        title: impl Into<String>,
        description: impl Into<String>,
        reward: Decimal,
        creation_time: impl Into<String>,
    ) -> Self {
        Self {
            hit_id,
            hit_type_id: None,
            status: status.into(),
            review_status: None,
            title: title.into(),
            description: description.into(),
            keywords: None,
            reward,
            creation_time: creation_time.into(),
            assignment_duration_in_seconds: None,
            auto_approval_delay_in_seconds: None,
            max_assignments: None,
            requester_annotation: None,
            number_of_similar_hits: None,
            number_of_assignments_pending: None,
            number_of_assignments_available: None,
            number_of_assignments_completed: None,
        }
    }

    /// Sets the assignment counts reported by detailed query modes.
    #[must_use]
    pub const fn with_assignment_counts(mut self, pending: u32, available: u32, completed: u32) -> Self {
        self.number_of_assignments_pending = Some(pending);
        self.number_of_assignments_available = Some(available);
        self.number_of_assignments_completed = Some(completed);
        self
    }
}

/// One `key=value` answer field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnswerField {
    /// Question identifier.
    pub key: String,
    /// Submitted value.
    pub value: String,
}

impl AnswerField {
    /// Creates an answer field.
    #[must_use]
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

/// Answer to a single question; may carry several fields.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionAnswer {
    /// Fields submitted for the question.
    pub fields: Vec<AnswerField>,
}

/// A repeatable group of question answers.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnswerSet {
    /// Answers in this set.
    pub questions: Vec<QuestionAnswer>,
}

impl AnswerSet {
    /// Creates a set containing one question per field.
    #[must_use]
    pub fn from_fields(fields: impl IntoIterator<Item = AnswerField>) -> Self {
        Self {
            questions: fields
                .into_iter()
                .map(|field| QuestionAnswer {
                    fields: vec![field],
                })
                .collect(),
        }
    }
}

/// Snapshot of an assignment as returned by the marketplace.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteAssignment {
    /// Marketplace assignment identifier.
    pub assignment_id: RemoteAssignmentId,
    /// Owning HIT.
    pub hit_id: RemoteHitId,
    /// Worker who accepted the HIT.
    pub worker_id: WorkerId,
    /// Raw status word, e.g. `Submitted`.
    pub status: String,
    /// Raw accept timestamp.
    pub accept_time: String,
    /// Raw submit timestamp.
    pub submit_time: String,
    /// Raw auto-approval deadline.
    pub auto_approval_time: String,
    /// Raw approval timestamp, when reported.
    pub approval_time: Option<String>,
    /// Raw rejection timestamp, when reported.
    pub rejection_time: Option<String>,
    /// Raw assignment deadline, when reported.
    pub deadline: Option<String>,
    /// Feedback sent with the approval or rejection, when reported.
    pub requester_feedback: Option<String>,
    /// Submitted answers.
    pub answers: Vec<AnswerSet>,
}

impl RemoteAssignment {
    /// Creates a submitted-assignment snapshot with no answers.
    #[must_use]
    pub fn new(
        assignment_id: RemoteAssignmentId,
        hit_id: RemoteHitId,
        worker_id: WorkerId,
        status: impl Into<String>,
        submitted_at: impl Into<String>,
    ) -> Self {
        let submitted = submitted_at.into();
        Self {
            assignment_id,
            hit_id,
            worker_id,
            status: status.into(),
            accept_time: submitted.clone(),
            submit_time: submitted.clone(),
            auto_approval_time: submitted,
            approval_time: None,
            rejection_time: None,
            deadline: None,
            requester_feedback: None,
            answers: Vec::new(),
        }
    }

    /// Sets the submitted answers.
    #[must_use]
    pub fn with_answers(mut self, answers: impl IntoIterator<Item = AnswerSet>) -> Self {
        self.answers = answers.into_iter().collect();
        self
    }
}

/// One page of a HIT's assignments.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssignmentPage {
    /// Page number the marketplace returned, starting at 1.
    pub page_number: u32,
    /// Total assignments across all pages.
    pub total_num_results: u32,
    /// Assignments on this page.
    pub assignments: Vec<RemoteAssignment>,
}

/// Externally hosted question shown to workers in a frame.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExternalQuestion {
    /// HTTPS URL of the task page.
    pub url: String,
    /// Frame height in pixels.
    pub frame_height: u32,
}

/// Request to create a HIT on the marketplace.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewRemoteHit {
    /// HIT title.
    pub title: String,
    /// HIT description.
    pub description: String,
    /// Keywords, sent comma-separated.
    pub keywords: Vec<String>,
    /// Maximum number of assignments.
    pub max_assignments: u32,
    /// Question content.
    pub question: ExternalQuestion,
    /// Reward per assignment.
    pub reward: Decimal,
    /// Lifetime before the HIT stops accepting workers.
    pub lifetime_in_seconds: Option<u32>,
    /// Time a worker has to finish an accepted assignment.
    pub assignment_duration_in_seconds: Option<u32>,
    /// Delay before submitted work is approved automatically.
    pub auto_approval_delay_in_seconds: Option<u32>,
    /// Response groups controlling which fields the reply carries.
    pub response_groups: Vec<String>,
}

/// Marketplace reply to HIT creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreatedRemoteHit {
    /// Identifier assigned by the marketplace.
    pub hit_id: RemoteHitId,
    /// HIT type identifier, when reported.
    pub hit_type_id: Option<HitTypeId>,
}

/// Increments applied by a HIT extension.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HitExtension {
    /// Additional assignments to allow.
    pub assignments_increment: Option<u32>,
    /// Additional lifetime in seconds.
    pub expiration_increment_seconds: Option<u64>,
}

impl HitExtension {
    /// Returns `true` when neither increment is set.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.assignments_increment.is_none() && self.expiration_increment_seconds.is_none()
    }
}
