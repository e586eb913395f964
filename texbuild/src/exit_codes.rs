//! Stable exit codes for texbuild CLI commands.

/// Command succeeded.
pub const OK: i32 = 0;
/// Configuration, resolution or execution failure.
pub const FAILURE: i32 = 1;
