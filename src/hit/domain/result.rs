//! Completion results recorded by the task front end.
//!
//! A result ties a worker, an experiment template and battery pair, and an
//! assignment together for credit tracking. The sync core never creates
//! results; it reads them through the owning assignment.

use super::{BatteryId, CompletionResultId, RemoteAssignmentId, TemplateId, WorkerId};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Browser metadata captured with the last data submission.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmissionMetadata {
    /// Date-time string reported by the browser.
    pub datetime: Option<String>,
    /// Last trial recorded as complete.
    pub current_trial: Option<u32>,
    /// Browser language.
    pub language: Option<String>,
    /// Browser name.
    pub browser: Option<String>,
    /// Operating platform.
    pub platform: Option<String>,
}

/// Uniqueness key: one result per worker, assignment, battery, and template.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CompletionResultKey {
    /// Worker.
    pub worker_id: WorkerId,
    /// Assignment.
    pub assignment_id: RemoteAssignmentId,
    /// Battery.
    pub battery_id: BatteryId,
    /// Template.
    pub template_id: TemplateId,
}

/// Denormalized completion record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompletionResult {
    /// Record identifier.
    pub id: CompletionResultId,
    /// Worker who produced the data.
    pub worker_id: WorkerId,
    /// Experiment template completed.
    pub template_id: TemplateId,
    /// Battery the template was deployed in.
    pub battery_id: BatteryId,
    /// Assignment the data was submitted under.
    pub assignment_id: RemoteAssignmentId,
    /// Free-form submitted payload.
    pub task_data: Option<Value>,
    /// Browser metadata.
    pub metadata: SubmissionMetadata,
    /// The worker finished the experiment.
    pub completed: bool,
    /// Credit has been allocated for this result.
    pub credit_granted: bool,
}

impl CompletionResult {
    /// Creates an incomplete, uncredited result.
    #[must_use]
    pub fn new(
        worker_id: WorkerId,
        assignment_id: RemoteAssignmentId,
        battery_id: BatteryId,
        template_id: TemplateId,
    ) -> Self {
        Self {
            id: CompletionResultId::new(),
            worker_id,
            template_id,
            battery_id,
            assignment_id,
            task_data: None,
            metadata: SubmissionMetadata::default(),
            completed: false,
            credit_granted: false,
        }
    }

    /// Returns the uniqueness key of this result.
    #[must_use]
    pub fn key(&self) -> CompletionResultKey {
        CompletionResultKey {
            worker_id: self.worker_id.clone(),
            assignment_id: self.assignment_id.clone(),
            battery_id: self.battery_id.clone(),
            template_id: self.template_id.clone(),
        }
    }
}
