//! Subprocess-backed simulation runner.
//!
//! [`SubprocessRunner::run`] resolves the working directory and `INET_ROOT`
//! from the simulation's project, starts the command vector as a child
//! process, blocks until it exits, and hands back the captured output. The
//! runner keeps no per-call state, so one instance can be shared across
//! threads.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::process::Command;

use serde::Serialize;
use tracing::{debug, instrument};

use crate::error::LaunchError;
use crate::io::environment::{self, EnvMap};
use crate::io::process::{ProcessResult, run_command_capture};
use crate::simulation::SimulationRun;

/// Fully resolved inputs for one child process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchPlan {
    pub args: Vec<String>,
    pub working_dir: PathBuf,
    pub project_root: PathBuf,
    pub env: EnvMap,
}

impl LaunchPlan {
    pub fn program(&self) -> &str {
        self.args.first().map(String::as_str).unwrap_or_default()
    }

    fn command(&self) -> Command {
        let mut cmd = Command::new(self.program());
        cmd.args(&self.args[1..])
            .current_dir(&self.working_dir)
            .env_clear()
            .envs(&self.env);
        cmd
    }
}

/// Working directory and project root derived from a [`SimulationRun`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Resolution {
    pub working_dir: PathBuf,
    pub inet_root: PathBuf,
}

/// Runs simulations as child processes.
#[derive(Debug, Default)]
pub struct SubprocessRunner {
    ready: bool,
}

impl SubprocessRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Prepare the runner. Idempotent; nothing to acquire.
    pub fn setup(&mut self) {
        if !self.ready {
            debug!("subprocess runner ready");
        }
        self.ready = true;
    }

    /// Release the runner. Idempotent; nothing to release.
    pub fn teardown(&mut self) {
        self.ready = false;
    }

    pub fn is_ready(&self) -> bool {
        self.ready
    }

    /// Resolve the working directory and `INET_ROOT` for `run`.
    pub fn resolve(&self, run: &SimulationRun) -> Resolution {
        let config = run.config();
        let project = config.project();
        Resolution {
            working_dir: project.full_path(config.working_directory()),
            inet_root: project.full_path(Path::new(".")),
        }
    }

    /// Resolve the working directory and environment for `args` without spawning.
    pub fn prepare(&self, run: &SimulationRun, args: &[String]) -> Result<LaunchPlan, LaunchError> {
        self.prepare_with_env(run, args, &environment::host_snapshot())
    }

    /// Like [`prepare`](Self::prepare), but derives the environment from `base`.
    pub fn prepare_with_env(
        &self,
        run: &SimulationRun,
        args: &[String],
        base: &EnvMap,
    ) -> Result<LaunchPlan, LaunchError> {
        if args.is_empty() {
            return Err(LaunchError::EmptyCommand);
        }
        let Resolution {
            working_dir,
            inet_root,
        } = self.resolve(run);
        let env = environment::with_project_root(base, &inet_root);
        Ok(LaunchPlan {
            args: args.to_vec(),
            working_dir,
            project_root: inet_root,
            env,
        })
    }

    /// Run `args` for `run` and wait for the child to exit.
    ///
    /// A non-zero exit code is returned as data. Errors only mean the child
    /// never started or its output could not be collected.
    #[instrument(skip_all, fields(program = args.first().map(String::as_str).unwrap_or_default()))]
    pub fn run(&self, run: &SimulationRun, args: &[String]) -> Result<ProcessResult, LaunchError> {
        let plan = self.prepare(run, args)?;
        self.execute(&plan)
    }

    /// Spawn a previously prepared plan.
    pub fn execute(&self, plan: &LaunchPlan) -> Result<ProcessResult, LaunchError> {
        if plan.args.is_empty() {
            return Err(LaunchError::EmptyCommand);
        }
        ensure_dir(&plan.working_dir)?;
        debug!(
            working_dir = %plan.working_dir.display(),
            inet_root = %plan.project_root.display(),
            "launching simulation"
        );
        run_command_capture(plan.command(), &plan.args)
    }
}

fn ensure_dir(path: &Path) -> Result<(), LaunchError> {
    let meta = fs::metadata(path).map_err(|source| LaunchError::WorkingDirectory {
        path: path.to_path_buf(),
        source,
    })?;
    if !meta.is_dir() {
        return Err(LaunchError::WorkingDirectory {
            path: path.to_path_buf(),
            source: io::Error::new(io::ErrorKind::NotADirectory, "not a directory"),
        });
    }
    Ok(())
}
