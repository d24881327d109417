//! Error types for HIT domain validation, translation, and disposal.

use super::{HitId, RemoteAssignmentId, RemoteHitId};
use rust_decimal::Decimal;
use thiserror::Error;

/// Errors returned while constructing or mutating HIT domain values.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum HitDomainError {
    /// The HIT title is empty after trimming.
    #[error("HIT title must not be empty")]
    EmptyTitle,

    /// The HIT description is empty after trimming.
    #[error("HIT description must not be empty")]
    EmptyDescription,

    /// The reward is negative or does not fit `NUMERIC(5, 3)`.
    #[error("invalid HIT reward {0}, expected 0 <= reward <= 99.999")]
    InvalidReward(Decimal),

    /// Bonus amounts must be strictly positive.
    #[error("invalid bonus amount {0}, expected a positive amount")]
    InvalidBonusAmount(Decimal),

    /// A HIT must allow at least one assignment.
    #[error("invalid max assignments {0}, expected a positive integer")]
    InvalidMaxAssignments(u32),

    /// A remote identifier value is empty after trimming.
    #[error("{kind} identifier must not be empty")]
    EmptyIdentifier {
        /// Kind of identifier being constructed.
        kind: &'static str,
    },

    /// An answer key is empty or longer than the storage limit.
    #[error("invalid answer key '{0}', expected 1 to 255 characters")]
    InvalidAnswerKey(String),

    /// The HIT has never been created on the marketplace.
    #[error("HIT {0} has no marketplace identifier yet")]
    MissingRemoteId(HitId),

    /// A bonus was requested before the assignment worker was known.
    #[error("assignment {0} has no known worker")]
    MissingWorker(RemoteAssignmentId),

    /// An extension request carried neither increment.
    #[error("HIT {0} extension requires an assignment or expiration increment")]
    EmptyExtension(RemoteHitId),

    /// Paging parameters must be positive.
    #[error("invalid assignment paging: page {page}, page size {page_size}")]
    InvalidPaging {
        /// Requested page number.
        page: u32,
        /// Requested page size.
        page_size: u32,
    },

    /// A marketplace timestamp could not be normalized.
    #[error("invalid marketplace timestamp: {0}")]
    InvalidTimestamp(String),

    /// The marketplace reported a status that would undo a final decision.
    #[error("assignment {assignment} cannot move from {from} to {to}")]
    AssignmentStatusRegression {
        /// Assignment identifier.
        assignment: RemoteAssignmentId,
        /// Current local status.
        from: String,
        /// Status reported by the marketplace.
        to: String,
    },

    /// A remote assignment payload belongs to a different HIT.
    #[error("assignment {assignment} belongs to HIT {actual}, not {expected}")]
    ForeignAssignment {
        /// Assignment identifier.
        assignment: RemoteAssignmentId,
        /// HIT the refresh was running for.
        expected: RemoteHitId,
        /// HIT named by the payload.
        actual: RemoteHitId,
    },

    /// A payload describes a different HIT than the one refreshed.
    #[error("payload for HIT {actual} cannot refresh HIT {expected}")]
    MismatchedHit {
        /// HIT being refreshed.
        expected: RemoteHitId,
        /// HIT named by the payload.
        actual: RemoteHitId,
    },

    /// A payload describes a different assignment than the one refreshed.
    #[error("payload for assignment {actual} cannot refresh assignment {expected}")]
    MismatchedAssignment {
        /// Assignment being refreshed.
        expected: RemoteAssignmentId,
        /// Assignment named by the payload.
        actual: RemoteAssignmentId,
    },

    /// Unknown HIT status string or code.
    #[error(transparent)]
    HitStatus(#[from] ParseHitStatusError),

    /// Unknown assignment status string or code.
    #[error(transparent)]
    AssignmentStatus(#[from] ParseAssignmentStatusError),

    /// Unknown review status string or code.
    #[error(transparent)]
    ReviewStatus(#[from] ParseReviewStatusError),
}

/// Disposal precondition violations, intended for caller display.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum HitDisposalError {
    /// Only `Reviewable` HITs can be disposed.
    #[error("can't dispose of HIT ({hit}) that is still in {status} status")]
    NotReviewable {
        /// Marketplace HIT identifier.
        hit: RemoteHitId,
        /// Current status in remote form, or `unset`.
        status: String,
    },

    /// Every assignment must be approved or rejected before disposal.
    #[error(
        "can't dispose of HIT ({hit}) because assignment ({assignment}) is not approved or rejected"
    )]
    UnresolvedAssignment {
        /// Marketplace HIT identifier.
        hit: RemoteHitId,
        /// Offending assignment identifier.
        assignment: RemoteAssignmentId,
    },
}

/// Error returned when a HIT status string or code is unknown.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown HIT status: {0}")]
pub struct ParseHitStatusError(pub String);

/// Error returned when an assignment status string or code is unknown.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown assignment status: {0}")]
pub struct ParseAssignmentStatusError(pub String);

/// Error returned when a HIT review status string or code is unknown.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown HIT review status: {0}")]
pub struct ParseReviewStatusError(pub String);
