//! Deterministic LaTeX toolchain build pipeline.
//!
//! This crate orchestrates a chain of external tool invocations (typesetting
//! engine, bibliography processor, index generators, format converters) that
//! turns a LaTeX source document into a rendered artifact. The architecture
//! enforces a strict separation:
//!
//! - **[`core`]**: Pure, deterministic logic (step descriptors, registry,
//!   chain resolution, argument templates). No I/O, fully testable in
//!   isolation.
//! - **[`io`]**: Side-effecting operations (executable lookup, processes,
//!   working directory, log aggregation). Isolated to enable faking in
//!   tests.
//!
//! The [`pipeline`] module coordinates core logic with I/O behind the
//! [`build::Build`] host interface, so the same engine runs under the
//! bundled CLI or an embedding build system.

pub mod build;
pub mod config;
pub mod core;
pub mod exit_codes;
pub mod io;
pub mod logging;
pub mod pipeline;
#[cfg(test)]
mod test_support;
