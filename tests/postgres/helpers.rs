//! Shared helpers for `PostgreSQL` integration tests.

use diesel::connection::SimpleConnection;
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool};
use hitsync::hit::{
    adapters::postgres::PostgresHitRepository,
    domain::{CreatedRemoteHit, Hit, HitDraft, RemoteHitId},
};
use mockable::DefaultClock;
use pg_embedded_setup_unpriv::TestCluster;
use rust_decimal_macros::dec;
use tokio::runtime::Runtime;
use uuid::Uuid;

pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// SQL creating the HIT sync schema.
pub const CREATE_SCHEMA_SQL: &str =
    include_str!("../../migrations/2026-10-19-000000_create_hit_sync/up.sql");

/// Template database name for the pre-migrated schema.
pub const TEMPLATE_DB: &str = "hitsync_test_template";

/// Creates a tokio runtime for driving the repository in tests.
///
/// # Errors
///
/// Returns an error if the runtime cannot be built.
pub fn test_runtime() -> Result<Runtime, BoxError> {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|err| Box::new(err) as BoxError)
}

/// Ensures the template database exists with the schema applied.
///
/// # Errors
///
/// Returns an error if template creation or migration fails.
pub fn ensure_template(cluster: &TestCluster) -> Result<(), BoxError> {
    cluster
        .ensure_template_exists(TEMPLATE_DB, |db_name| {
            let url = cluster.connection().database_url(db_name);
            let mut conn = PgConnection::establish(&url).map_err(|e| eyre::eyre!("{e}"))?;
            conn.batch_execute(CREATE_SCHEMA_SQL)
                .map_err(|e| eyre::eyre!("migration failed: {e}"))?;
            Ok(())
        })
        .map_err(|err| Box::new(err) as BoxError)?;
    Ok(())
}

/// Drops the test database when it goes out of scope, even after a panic.
pub struct CleanupGuard<'a> {
    cluster: &'a TestCluster,
    db_name: String,
}

impl Drop for CleanupGuard<'_> {
    fn drop(&mut self) {
        if let Err(e) = self.cluster.drop_database(self.db_name.as_str()) {
            eprintln!("Warning: failed to drop test database {}: {e}", self.db_name);
        }
    }
}

/// Creates a fresh database from the template and a repository over it.
///
/// The repository must be dropped before the guard so the pool releases
/// its connection.
///
/// # Errors
///
/// Returns an error if template setup, database creation or pool
/// construction fails.
pub fn prepare_repository<'a>(
    cluster: &'a TestCluster,
    prefix: &str,
) -> Result<(CleanupGuard<'a>, PostgresHitRepository), BoxError> {
    ensure_template(cluster)?;
    let db_name = format!("{prefix}_{}", Uuid::new_v4().simple());
    cluster
        .create_database_from_template(db_name.as_str(), TEMPLATE_DB)
        .map_err(|err| Box::new(err) as BoxError)?;
    let guard = CleanupGuard {
        cluster,
        db_name: db_name.clone(),
    };

    let url = cluster.connection().database_url(&db_name);
    let manager = ConnectionManager::<PgConnection>::new(url);
    let pool = Pool::builder()
        .max_size(1)
        .build(manager)
        .map_err(|err| Box::new(err) as BoxError)?;
    Ok((guard, PostgresHitRepository::new(pool)))
}

/// Builds a HIT that the marketplace has accepted under `remote_id`.
///
/// # Errors
///
/// Returns an error if the draft or identifier is rejected.
pub fn published_hit(remote_id: &str) -> Result<Hit, BoxError> {
    let draft = HitDraft::new("Stroop task", "Name the ink colour", dec!(1.50))?
        .with_max_assignments(3)?;
    let mut hit = Hit::new(draft, &DefaultClock);
    hit.record_remote_creation(
        CreatedRemoteHit {
            hit_id: RemoteHitId::new(remote_id)?,
            hit_type_id: None,
        },
        &DefaultClock,
    );
    Ok(hit)
}

/// Builds a HIT that has not been published yet.
///
/// # Errors
///
/// Returns an error if the draft is rejected.
pub fn draft_hit() -> Result<Hit, BoxError> {
    let draft = HitDraft::new("Flanker task", "Name the middle arrow", dec!(0.75))?;
    Ok(Hit::new(draft, &DefaultClock))
}
