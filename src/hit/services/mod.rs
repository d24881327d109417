//! Application services for HIT synchronization.
//!
//! [`HitSyncService`] drives the marketplace client and the repository:
//! publishing HITs, mirroring marketplace snapshots, walking assignment
//! pages, and ingesting submitted answers.

mod answers;
mod assignment;
mod config;
mod error;
mod hit;

pub use answers::{IngestionSummary, ingest_answers};
pub use config::{ConfigError, SyncConfig};
pub use error::{HitSyncError, HitSyncResult};
pub use hit::{AssignmentCascade, AssignmentPaging, HitSyncService, PagingSummary};
