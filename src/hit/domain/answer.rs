//! Submitted answer fields stored per assignment.

use super::{AnswerId, AnswerSet, HitDomainError, RemoteAssignmentId};
use serde::{Deserialize, Serialize};

/// Characters shown by [`AnswerRecord::short_value`] before truncation.
pub const MAX_DISPLAY_LENGTH: usize = 255;

/// Longest key accepted by storage.
const MAX_KEY_LENGTH: usize = 255;

/// One `key=value` answer stored against an assignment.
///
/// `(assignment, key)` is the effective identity: ingestion updates the
/// value in place instead of adding a second record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnswerRecord {
    id: AnswerId,
    assignment_id: RemoteAssignmentId,
    key: String,
    value: Option<String>,
}

impl AnswerRecord {
    /// Creates an answer record.
    ///
    /// # Errors
    ///
    /// Returns [`HitDomainError::InvalidAnswerKey`] when the key is blank or
    /// exceeds 255 characters.
    pub fn new(
        assignment_id: RemoteAssignmentId,
        key: impl Into<String>,
        value: Option<String>,
    ) -> Result<Self, HitDomainError> {
        let raw_key = key.into();
        if raw_key.trim().is_empty() || raw_key.chars().count() > MAX_KEY_LENGTH {
            return Err(HitDomainError::InvalidAnswerKey(raw_key));
        }
        Ok(Self {
            id: AnswerId::new(),
            assignment_id,
            key: raw_key,
            value,
        })
    }

    /// Reconstructs a persisted answer record.
    #[must_use]
    pub const fn from_persisted(
        id: AnswerId,
        assignment_id: RemoteAssignmentId,
        key: String,
        value: Option<String>,
    ) -> Self {
        Self {
            id,
            assignment_id,
            key,
            value,
        }
    }

    /// Returns the record identifier.
    #[must_use]
    pub const fn id(&self) -> AnswerId {
        self.id
    }

    /// Returns the owning assignment.
    #[must_use]
    pub const fn assignment_id(&self) -> &RemoteAssignmentId {
        &self.assignment_id
    }

    /// Returns the answer key.
    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Returns the stored value.
    #[must_use]
    pub fn value(&self) -> Option<&str> {
        self.value.as_deref()
    }

    /// Replaces the value, returning `true` when it changed.
    pub fn replace_value(&mut self, value: &str) -> bool {
        if self.value.as_deref() == Some(value) {
            return false;
        }
        self.value = Some(value.to_owned());
        true
    }

    /// Returns the value truncated for display.
    #[must_use]
    pub fn short_value(&self) -> String {
        let value = self.value.as_deref().unwrap_or_default();
        if value.chars().count() > MAX_DISPLAY_LENGTH {
            let truncated: String = value.chars().take(MAX_DISPLAY_LENGTH).collect();
            return format!("{truncated}...");
        }
        value.to_owned()
    }
}

/// Flattens nested answer sets into `(key, value)` pairs.
///
/// Covers every set, every question, and every field in payload order.
pub fn flatten_answers(answers: &[AnswerSet]) -> impl Iterator<Item = (&str, &str)> {
    answers
        .iter()
        .flat_map(|set| set.questions.iter())
        .flat_map(|question| question.fields.iter())
        .map(|field| (field.key.as_str(), field.value.as_str()))
}
