//! Side-effecting operations: filesystem, executable lookup, processes.

pub mod build_log;
pub mod executable;
pub mod process;
pub mod workdir;
