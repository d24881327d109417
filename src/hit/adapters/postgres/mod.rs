//! `PostgreSQL` adapters for HIT synchronization persistence.

mod models;
mod repository;
mod schema;

pub use repository::{HitPgPool, PostgresHitRepository};
