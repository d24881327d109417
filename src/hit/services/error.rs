//! Service-level errors for HIT synchronization.

use crate::hit::{
    domain::{HitDisposalError, HitDomainError, HitId, RemoteAssignmentId},
    ports::{HitRepositoryError, MarketplaceError},
};
use thiserror::Error;

/// Errors returned by [`super::HitSyncService`].
#[derive(Debug, Error)]
pub enum HitSyncError {
    /// Domain validation or translation failed.
    #[error(transparent)]
    Domain(#[from] HitDomainError),
    /// A disposal precondition does not hold.
    #[error(transparent)]
    Disposal(#[from] HitDisposalError),
    /// Repository operation failed.
    #[error(transparent)]
    Repository(#[from] HitRepositoryError),
    /// Marketplace call failed; propagated without retry.
    #[error(transparent)]
    Marketplace(#[from] MarketplaceError),
    /// No HIT exists with the given identifier.
    #[error("HIT {0} not found")]
    HitNotFound(HitId),
    /// No assignment exists with the given identifier.
    #[error("assignment {0} not found")]
    AssignmentNotFound(RemoteAssignmentId),
}

/// Result type for sync service operations.
pub type HitSyncResult<T> = Result<T, HitSyncError>;
