//! Translation between marketplace status strings and compact storage codes.
//!
//! The marketplace reports statuses as words (`"Reviewable"`), while local
//! records store a single character. Both directions are exact: an unknown
//! word or code is an error, never a default.

use super::{ParseAssignmentStatusError, ParseHitStatusError, ParseReviewStatusError};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifecycle status of a HIT as reported by the marketplace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HitStatus {
    /// Workers can accept the HIT.
    Assignable,
    /// All assignments are taken or in progress.
    Unassignable,
    /// All assignments are submitted or the HIT expired.
    Reviewable,
    /// The requester marked the HIT as under review.
    Reviewing,
    /// Marketplace data has been removed.
    Disposed,
}

impl HitStatus {
    /// Every HIT status, in marketplace documentation order.
    pub const ALL: [Self; 5] = [
        Self::Assignable,
        Self::Unassignable,
        Self::Reviewable,
        Self::Reviewing,
        Self::Disposed,
    ];

    /// Returns the single-character storage code.
    #[must_use]
    pub const fn code(self) -> char {
        match self {
            Self::Assignable => 'A',
            Self::Unassignable => 'U',
            Self::Reviewable => 'R',
            Self::Reviewing => 'G',
            Self::Disposed => 'D',
        }
    }

    /// Returns the marketplace status string.
    #[must_use]
    pub const fn as_remote_str(self) -> &'static str {
        match self {
            Self::Assignable => "Assignable",
            Self::Unassignable => "Unassignable",
            Self::Reviewable => "Reviewable",
            Self::Reviewing => "Reviewing",
            Self::Disposed => "Disposed",
        }
    }

    /// Decodes a storage code.
    ///
    /// # Errors
    ///
    /// Returns [`ParseHitStatusError`] for unknown codes.
    pub fn from_code(code: char) -> Result<Self, ParseHitStatusError> {
        Self::ALL
            .into_iter()
            .find(|status| status.code() == code)
            .ok_or_else(|| ParseHitStatusError(code.to_string()))
    }
}

impl fmt::Display for HitStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_remote_str())
    }
}

impl TryFrom<&str> for HitStatus {
    type Error = ParseHitStatusError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim() {
            "Assignable" => Ok(Self::Assignable),
            "Unassignable" => Ok(Self::Unassignable),
            "Reviewable" => Ok(Self::Reviewable),
            "Reviewing" => Ok(Self::Reviewing),
            "Disposed" => Ok(Self::Disposed),
            _ => Err(ParseHitStatusError(value.to_owned())),
        }
    }
}

/// Status of a worker's submitted assignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AssignmentStatus {
    /// Results submitted, awaiting a decision.
    Submitted,
    /// The requester approved the results.
    Approved,
    /// The requester rejected the results.
    Rejected,
}

impl AssignmentStatus {
    /// Every assignment status.
    pub const ALL: [Self; 3] = [Self::Submitted, Self::Approved, Self::Rejected];

    /// Returns the single-character storage code.
    #[must_use]
    pub const fn code(self) -> char {
        match self {
            Self::Submitted => 'S',
            Self::Approved => 'A',
            Self::Rejected => 'R',
        }
    }

    /// Returns the marketplace status string.
    #[must_use]
    pub const fn as_remote_str(self) -> &'static str {
        match self {
            Self::Submitted => "Submitted",
            Self::Approved => "Approved",
            Self::Rejected => "Rejected",
        }
    }

    /// Returns `true` once the requester has approved or rejected.
    #[must_use]
    pub const fn is_final(self) -> bool {
        matches!(self, Self::Approved | Self::Rejected)
    }

    /// Decodes a storage code.
    ///
    /// # Errors
    ///
    /// Returns [`ParseAssignmentStatusError`] for unknown codes.
    pub fn from_code(code: char) -> Result<Self, ParseAssignmentStatusError> {
        Self::ALL
            .into_iter()
            .find(|status| status.code() == code)
            .ok_or_else(|| ParseAssignmentStatusError(code.to_string()))
    }
}

impl fmt::Display for AssignmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_remote_str())
    }
}

impl TryFrom<&str> for AssignmentStatus {
    type Error = ParseAssignmentStatusError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim() {
            "Submitted" => Ok(Self::Submitted),
            "Approved" => Ok(Self::Approved),
            "Rejected" => Ok(Self::Rejected),
            _ => Err(ParseAssignmentStatusError(value.to_owned())),
        }
    }
}

/// Review status of a HIT.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HitReviewStatus {
    /// No review has happened.
    NotReviewed,
    /// Flagged for review.
    MarkedForReview,
    /// Reviewed and found appropriate.
    ReviewedAppropriate,
    /// Reviewed and found inappropriate.
    ReviewedInappropriate,
}

impl HitReviewStatus {
    /// Every review status.
    pub const ALL: [Self; 4] = [
        Self::NotReviewed,
        Self::MarkedForReview,
        Self::ReviewedAppropriate,
        Self::ReviewedInappropriate,
    ];

    /// Returns the single-character storage code.
    #[must_use]
    pub const fn code(self) -> char {
        match self {
            Self::NotReviewed => 'N',
            Self::MarkedForReview => 'M',
            Self::ReviewedAppropriate => 'R',
            Self::ReviewedInappropriate => 'I',
        }
    }

    /// Returns the marketplace status string.
    #[must_use]
    pub const fn as_remote_str(self) -> &'static str {
        match self {
            Self::NotReviewed => "NotReviewed",
            Self::MarkedForReview => "MarkedForReview",
            Self::ReviewedAppropriate => "ReviewedAppropriate",
            Self::ReviewedInappropriate => "ReviewedInappropriate",
        }
    }

    /// Decodes a storage code.
    ///
    /// # Errors
    ///
    /// Returns [`ParseReviewStatusError`] for unknown codes.
    pub fn from_code(code: char) -> Result<Self, ParseReviewStatusError> {
        Self::ALL
            .into_iter()
            .find(|status| status.code() == code)
            .ok_or_else(|| ParseReviewStatusError(code.to_string()))
    }
}

impl fmt::Display for HitReviewStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_remote_str())
    }
}

impl TryFrom<&str> for HitReviewStatus {
    type Error = ParseReviewStatusError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim() {
            "NotReviewed" => Ok(Self::NotReviewed),
            "MarkedForReview" => Ok(Self::MarkedForReview),
            "ReviewedAppropriate" => Ok(Self::ReviewedAppropriate),
            "ReviewedInappropriate" => Ok(Self::ReviewedInappropriate),
            _ => Err(ParseReviewStatusError(value.to_owned())),
        }
    }
}
