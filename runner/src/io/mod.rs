//! Side-effecting helpers: environment snapshots, process execution, config files.

pub mod config;
pub mod environment;
pub mod process;
