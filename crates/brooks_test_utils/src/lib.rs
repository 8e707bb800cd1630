//! # Brooks Test Utilities
//!
//! Shared testing utilities for all crates:
//! - Sandbox fixtures (standard bases, supply-blocked bases, enemies)
//! - Determinism harness for agent-driven matches
//! - Property-based testing strategies

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod determinism;
pub mod fixtures;
pub mod strategies;

/// Re-export proptest for convenience.
pub use proptest;
