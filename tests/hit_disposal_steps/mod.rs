//! Step definitions for HIT disposal scenarios.

mod given;
mod then;
mod when;
pub mod world;
