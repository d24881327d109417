//! Adapter implementations for HIT synchronization ports.

pub mod memory;
pub mod postgres;
