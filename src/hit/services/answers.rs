//! Answer ingestion: flattening submitted answer sets into stored fields.

use super::HitSyncResult;
use crate::hit::{
    domain::{AnswerRecord, AnswerSet, RemoteAssignmentId, flatten_answers},
    ports::HitRepository,
};
use tracing::debug;

/// Counts of what one ingestion pass changed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IngestionSummary {
    /// Keys seen for the first time.
    pub created: usize,
    /// Keys whose value changed.
    pub updated: usize,
    /// Keys whose value was already current.
    pub unchanged: usize,
}

impl IngestionSummary {
    /// Returns `true` when the pass wrote nothing.
    #[must_use]
    pub const fn is_noop(&self) -> bool {
        self.created == 0 && self.updated == 0
    }
}

/// Upserts every answer field of a payload against an assignment.
///
/// Each `(key, value)` pair at any nesting level is matched by key: a new
/// key is stored, a changed value is overwritten in place, and an identical
/// value is left alone. Re-ingesting the same payload writes nothing.
///
/// # Errors
///
/// Returns domain errors for invalid keys and repository errors from
/// storage.
pub async fn ingest_answers<R>(
    repository: &R,
    assignment_id: &RemoteAssignmentId,
    answers: &[AnswerSet],
) -> HitSyncResult<IngestionSummary>
where
    R: HitRepository + ?Sized,
{
    let mut summary = IngestionSummary::default();
    for (key, value) in flatten_answers(answers) {
        match repository.find_answer(assignment_id, key).await? {
            Some(mut existing) => {
                if existing.replace_value(value) {
                    repository.update_answer(&existing).await?;
                    summary.updated += 1;
                } else {
                    summary.unchanged += 1;
                }
            }
            None => {
                let record =
                    AnswerRecord::new(assignment_id.clone(), key, Some(value.to_owned()))?;
                repository.store_answer(&record).await?;
                summary.created += 1;
            }
        }
    }
    debug!(
        assignment_id = %assignment_id,
        created = summary.created,
        updated = summary.updated,
        unchanged = summary.unchanged,
        "ingested assignment answers"
    );
    Ok(summary)
}
