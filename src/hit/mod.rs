//! HIT synchronization core.
//!
//! Keeps a local mirror of crowdsourcing marketplace tasks (HITs), the
//! assignments workers submit against them, the answers those assignments
//! carry, and the completion results recorded by the experiment runner. The
//! module follows hexagonal architecture:
//!
//! - Domain types and status translation in [`domain`]
//! - Port contracts in [`ports`]
//! - Adapter implementations in [`adapters`]
//! - Orchestration services in [`services`]

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod services;

#[cfg(test)]
mod tests;
