//! `PostgreSQL` integration tests for the HIT repository.
//!
//! Tests are organized into modules by functionality:
//! - `helpers`: Template database, migrations and repository setup
//! - `hit_repository_tests`: HIT lookups and get-or-create mirrors
//! - `uniqueness_tests`: Constraint violations mapped to repository errors

#![expect(
    clippy::print_stderr,
    reason = "Test cleanup warnings are informational"
)]

mod postgres {
    pub mod helpers;

    mod hit_repository_tests;
    mod uniqueness_tests;
}
