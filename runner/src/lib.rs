//! Subprocess simulation runner.
//!
//! Runs an external simulation binary as a child process with its working
//! directory and `INET_ROOT` resolved from the owning simulation project, and
//! captures its output in memory.
//!
//! - **[`simulation`]**: caller-owned descriptors (run, config, project).
//! - **[`runner`]**: [`SubprocessRunner`], the single service type.
//! - **[`io`]**: environment derivation, process capture, CLI config.

pub mod error;
pub mod exit_codes;
pub mod io;
pub mod logging;
pub mod runner;
pub mod simulation;
#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

pub use error::LaunchError;
pub use io::process::ProcessResult;
pub use runner::{LaunchPlan, SubprocessRunner};
pub use simulation::{LocalProject, SimulationConfig, SimulationProject, SimulationRun};
