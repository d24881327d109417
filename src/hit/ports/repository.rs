//! Repository port for HIT, assignment, worker, answer, and result storage.

use crate::hit::domain::{
    AnswerId, AnswerRecord, Assignment, CompletionResult, CompletionResultId,
    CompletionResultKey, Hit, HitId, RemoteAssignmentId, RemoteHitId, WorkerId,
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use thiserror::Error;

/// Result type for HIT repository operations.
pub type HitRepositoryResult<T> = Result<T, HitRepositoryError>;

/// Outcome of a get-or-create lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GetOrCreated<T> {
    /// The stored or newly created value.
    pub value: T,
    /// `true` when the call inserted the value.
    pub created: bool,
}

impl<T> GetOrCreated<T> {
    /// Wraps an existing value.
    #[must_use]
    pub const fn existing(value: T) -> Self {
        Self {
            value,
            created: false,
        }
    }

    /// Wraps a newly inserted value.
    #[must_use]
    pub const fn created(value: T) -> Self {
        Self {
            value,
            created: true,
        }
    }
}

/// Persistence contract for the HIT sync core.
#[async_trait]
pub trait HitRepository: Send + Sync {
    /// Stores a new HIT.
    ///
    /// # Errors
    ///
    /// Returns [`HitRepositoryError::DuplicateHit`] when the ID exists or
    /// [`HitRepositoryError::DuplicateRemoteHit`] when the marketplace ID is
    /// already mirrored.
    async fn store_hit(&self, hit: &Hit) -> HitRepositoryResult<()>;

    /// Persists changes to an existing HIT.
    ///
    /// # Errors
    ///
    /// Returns [`HitRepositoryError::HitNotFound`] when the HIT does not
    /// exist.
    async fn update_hit(&self, hit: &Hit) -> HitRepositoryResult<()>;

    /// Finds a HIT by local identifier.
    async fn find_hit(&self, id: HitId) -> HitRepositoryResult<Option<Hit>>;

    /// Finds a HIT by marketplace identifier.
    async fn find_hit_by_remote_id(
        &self,
        remote_id: &RemoteHitId,
    ) -> HitRepositoryResult<Option<Hit>>;

    /// Returns all HITs.
    async fn list_hits(&self) -> HitRepositoryResult<Vec<Hit>>;

    /// Returns the assignment with this identifier, inserting an empty
    /// mirror owned by `hit_id` when absent.
    ///
    /// # Errors
    ///
    /// Returns [`HitRepositoryError::AssignmentHitMismatch`] when the
    /// assignment exists but belongs to another HIT.
    async fn get_or_create_assignment(
        &self,
        id: &RemoteAssignmentId,
        hit_id: HitId,
    ) -> HitRepositoryResult<GetOrCreated<Assignment>>;

    /// Persists changes to an existing assignment.
    ///
    /// # Errors
    ///
    /// Returns [`HitRepositoryError::AssignmentNotFound`] when absent.
    async fn update_assignment(&self, assignment: &Assignment) -> HitRepositoryResult<()>;

    /// Finds an assignment by identifier.
    async fn find_assignment(
        &self,
        id: &RemoteAssignmentId,
    ) -> HitRepositoryResult<Option<Assignment>>;

    /// Returns every assignment owned by a HIT, ordered by identifier.
    async fn list_assignments_for_hit(
        &self,
        hit_id: HitId,
    ) -> HitRepositoryResult<Vec<Assignment>>;

    /// Inserts the worker when absent, recording `first_seen_at` as its
    /// creation time. Reports whether it was created.
    async fn get_or_create_worker(
        &self,
        id: &WorkerId,
        first_seen_at: DateTime<Utc>,
    ) -> HitRepositoryResult<GetOrCreated<WorkerId>>;

    /// Finds the answer stored for `(assignment, key)`.
    async fn find_answer(
        &self,
        assignment_id: &RemoteAssignmentId,
        key: &str,
    ) -> HitRepositoryResult<Option<AnswerRecord>>;

    /// Stores a new answer record.
    ///
    /// # Errors
    ///
    /// Returns [`HitRepositoryError::AssignmentNotFound`] when the owning
    /// assignment does not exist, or [`HitRepositoryError::DuplicateAnswer`]
    /// when the key is already stored for it.
    async fn store_answer(&self, answer: &AnswerRecord) -> HitRepositoryResult<()>;

    /// Persists a changed answer value.
    ///
    /// # Errors
    ///
    /// Returns [`HitRepositoryError::AnswerNotFound`] when absent.
    async fn update_answer(&self, answer: &AnswerRecord) -> HitRepositoryResult<()>;

    /// Returns the answers of an assignment ordered by key.
    async fn list_answers(
        &self,
        assignment_id: &RemoteAssignmentId,
    ) -> HitRepositoryResult<Vec<AnswerRecord>>;

    /// Stores a completion result.
    ///
    /// # Errors
    ///
    /// Returns [`HitRepositoryError::WorkerNotFound`] or
    /// [`HitRepositoryError::AssignmentNotFound`] when the result references
    /// an unknown worker or assignment, and
    /// [`HitRepositoryError::DuplicateResult`] when a result with the same
    /// worker, assignment, battery, and template exists.
    async fn store_result(&self, result: &CompletionResult) -> HitRepositoryResult<()>;

    /// Persists changes to a completion result.
    ///
    /// # Errors
    ///
    /// Returns [`HitRepositoryError::ResultNotFound`] when absent, plus the
    /// reference and uniqueness errors of [`Self::store_result`].
    async fn update_result(&self, result: &CompletionResult) -> HitRepositoryResult<()>;

    /// Returns the results recorded under an assignment.
    async fn list_results_for_assignment(
        &self,
        assignment_id: &RemoteAssignmentId,
    ) -> HitRepositoryResult<Vec<CompletionResult>>;
}

/// Errors returned by HIT repository implementations.
#[derive(Debug, Clone, Error)]
pub enum HitRepositoryError {
    /// A HIT with the same identifier already exists.
    #[error("duplicate HIT identifier: {0}")]
    DuplicateHit(HitId),

    /// A HIT already mirrors the marketplace identifier.
    #[error("duplicate marketplace HIT identifier: {0}")]
    DuplicateRemoteHit(RemoteHitId),

    /// The HIT was not found.
    #[error("HIT not found: {0}")]
    HitNotFound(HitId),

    /// The assignment was not found.
    #[error("assignment not found: {0}")]
    AssignmentNotFound(RemoteAssignmentId),

    /// The worker was not found.
    #[error("worker not found: {0}")]
    WorkerNotFound(WorkerId),

    /// The assignment is owned by a different HIT.
    #[error("assignment {assignment} belongs to HIT {owner}, not {requested}")]
    AssignmentHitMismatch {
        /// Assignment identifier.
        assignment: RemoteAssignmentId,
        /// Stored owner.
        owner: HitId,
        /// HIT named by the caller.
        requested: HitId,
    },

    /// An answer with the same key is already stored for the assignment.
    #[error("duplicate answer key '{key}' for assignment {assignment}")]
    DuplicateAnswer {
        /// Owning assignment.
        assignment: RemoteAssignmentId,
        /// Answer key.
        key: String,
    },

    /// The answer record was not found.
    #[error("answer not found: {0}")]
    AnswerNotFound(AnswerId),

    /// A result for the same submission already exists.
    #[error(
        "duplicate result for worker {} assignment {} battery {} template {}",
        .0.worker_id, .0.assignment_id, .0.battery_id, .0.template_id
    )]
    DuplicateResult(CompletionResultKey),

    /// The result was not found.
    #[error("result not found: {0}")]
    ResultNotFound(CompletionResultId),

    /// Persisted data could not be reconstructed into domain types.
    #[error("invalid persisted HIT data: {0}")]
    InvalidPersistedData(Arc<dyn std::error::Error + Send + Sync>),

    /// Persistence-layer failure.
    #[error("persistence error: {0}")]
    Persistence(Arc<dyn std::error::Error + Send + Sync>),
}

impl HitRepositoryError {
    /// Wraps persisted-data decoding or validation failures.
    pub fn invalid_persisted_data(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::InvalidPersistedData(Arc::new(err))
    }

    /// Wraps a persistence-layer failure.
    pub fn persistence(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Persistence(Arc::new(err))
    }
}
