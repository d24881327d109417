//! Unit tests for the HIT synchronization core.
