//! Domain model for HIT synchronization.
//!
//! The HIT domain mirrors marketplace tasks, worker assignments, submitted
//! answers, and completion results. Translation between marketplace payloads
//! and local values lives here; network and storage concerns stay outside.

mod answer;
mod assignment;
mod error;
mod hit;
mod ids;
mod remote;
mod result;
mod status;
mod timestamp;

pub use answer::{AnswerRecord, MAX_DISPLAY_LENGTH, flatten_answers};
pub use assignment::{Assignment, AssignmentTimes, PersistedAssignmentData};
pub use error::{
    HitDisposalError, HitDomainError, ParseAssignmentStatusError, ParseHitStatusError,
    ParseReviewStatusError,
};
pub use hit::{AssignmentCounts, Hit, HitDraft, PersistedHitData, join_keywords, split_keywords};
pub use ids::{
    AnswerId, BatteryId, CompletionResultId, HitId, HitTypeId, RemoteAssignmentId, RemoteHitId,
    TemplateId, WorkerId,
};
pub use remote::{
    AnswerField, AnswerSet, AssignmentPage, CreatedRemoteHit, ExternalQuestion, HitExtension,
    NewRemoteHit, QuestionAnswer, RemoteAssignment, RemoteHit,
};
pub use result::{CompletionResult, CompletionResultKey, SubmissionMetadata};
pub use status::{AssignmentStatus, HitReviewStatus, HitStatus};
pub use timestamp::{
    MARKETPLACE_TIMESTAMP_FORMAT, format_marketplace_timestamp, parse_marketplace_timestamp,
    parse_optional_timestamp,
};
