//! Deterministic, pure logic of the build pipeline.
//!
//! Core modules must be free of I/O side effects. They operate on in-memory
//! data structures and return deterministic outputs suitable for tests.

pub mod chain;
pub mod registry;
pub mod step;
pub mod template;
