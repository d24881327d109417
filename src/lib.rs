//! Hitsync: crowdsourcing marketplace synchronization.
//!
//! This crate mirrors HITs (human intelligence tasks) published on a remote
//! crowdsourcing marketplace into local storage, drives their lifecycle
//! (creation, expiry, extension, review and disposal), and keeps worker
//! assignments, submitted answers and experiment results in step with the
//! marketplace.
//!
//! # Architecture
//!
//! Hitsync follows hexagonal architecture principles:
//!
//! - **Domain**: Pure business logic with no infrastructure dependencies
//! - **Ports**: Abstract trait interfaces for external interactions
//! - **Adapters**: Concrete implementations of ports (database, marketplace)
//!
//! # Modules
//!
//! - [`hit`]: HIT, assignment, answer and result synchronization

pub mod hit;
