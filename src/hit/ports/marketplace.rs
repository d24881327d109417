//! Marketplace port: the remote task marketplace surface used by sync.

use crate::hit::domain::{
    AssignmentPage, CreatedRemoteHit, HitExtension, NewRemoteHit, RemoteAssignmentId, RemoteHit,
    RemoteHitId, WorkerId,
};
use async_trait::async_trait;
use rust_decimal::Decimal;
use std::sync::Arc;
use thiserror::Error;

/// Result type for marketplace operations.
pub type MarketplaceResult<T> = Result<T, MarketplaceError>;

/// Authenticated marketplace client.
///
/// Implementations own credentials and transport. Callers hold one handle
/// and pass it to the sync service; entities never cache connections.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MarketplaceClient: Send + Sync {
    /// Creates a HIT.
    async fn create_hit(&self, request: NewRemoteHit) -> MarketplaceResult<CreatedRemoteHit>;

    /// Fetches a HIT snapshot.
    async fn get_hit(&self, hit_id: &RemoteHitId) -> MarketplaceResult<RemoteHit>;

    /// Fetches one page of a HIT's assignments. Pages start at 1.
    async fn get_assignments(
        &self,
        hit_id: &RemoteHitId,
        page_number: u32,
        page_size: u32,
    ) -> MarketplaceResult<AssignmentPage>;

    /// Expires a HIT so no new workers can accept it.
    async fn expire_hit(&self, hit_id: &RemoteHitId) -> MarketplaceResult<()>;

    /// Adds assignments or lifetime to a HIT.
    async fn extend_hit(
        &self,
        hit_id: &RemoteHitId,
        extension: HitExtension,
    ) -> MarketplaceResult<()>;

    /// Moves a HIT to `Reviewing`, or back to `Reviewable` when `revert`.
    async fn set_reviewing(&self, hit_id: &RemoteHitId, revert: bool) -> MarketplaceResult<()>;

    /// Removes a HIT's marketplace data.
    async fn dispose_hit(&self, hit_id: &RemoteHitId) -> MarketplaceResult<()>;

    /// Approves a submitted assignment.
    async fn approve_assignment(
        &self,
        assignment_id: &RemoteAssignmentId,
        feedback: Option<String>,
    ) -> MarketplaceResult<()>;

    /// Rejects a submitted assignment.
    async fn reject_assignment(
        &self,
        assignment_id: &RemoteAssignmentId,
        feedback: Option<String>,
    ) -> MarketplaceResult<()>;

    /// Pays a bonus to the worker of an assignment.
    async fn grant_bonus(
        &self,
        worker_id: &WorkerId,
        assignment_id: &RemoteAssignmentId,
        amount: Decimal,
        reason: Option<String>,
    ) -> MarketplaceResult<()>;
}

/// Errors returned by marketplace adapters.
#[derive(Debug, Clone, Error)]
pub enum MarketplaceError {
    /// The marketplace does not know the referenced entity.
    #[error("marketplace entity not found: {0}")]
    NotFound(String),

    /// The marketplace rejected the request.
    #[error("marketplace rejected request ({code}): {message}")]
    Api {
        /// Marketplace error code.
        code: String,
        /// Marketplace error message.
        message: String,
    },

    /// Network or credential failure.
    #[error("marketplace transport error: {0}")]
    Transport(Arc<dyn std::error::Error + Send + Sync>),
}

impl MarketplaceError {
    /// Wraps a transport failure.
    pub fn transport(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Transport(Arc::new(err))
    }

    /// Builds an API rejection.
    pub fn api(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Api {
            code: code.into(),
            message: message.into(),
        }
    }
}
