//! Errors raised when a child process cannot be started.
//!
//! A child that starts and exits non-zero is not an error; see
//! [`ProcessResult`](crate::io::process::ProcessResult).

use std::io;
use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum LaunchError {
    #[error("command vector is empty")]
    EmptyCommand,
    #[error("working directory {} is not usable", path.display())]
    WorkingDirectory {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to spawn {program} in {}", cwd.display())]
    Spawn {
        program: String,
        cwd: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to collect output of {program}")]
    Capture {
        program: String,
        #[source]
        source: io::Error,
    },
}

impl LaunchError {
    /// True when the program itself could not be found.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::Spawn { source, .. } if source.kind() == io::ErrorKind::NotFound)
    }
}
