//! Caller-owned descriptors consumed by the runner.
//!
//! A [`SimulationRun`] points at a [`SimulationConfig`], which in turn carries a
//! relative working directory and the [`SimulationProject`] that resolves it.
//! The runner only ever borrows these.

use std::fmt;
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};

/// Resolves project-relative paths to absolute paths.
pub trait SimulationProject: Send + Sync {
    /// Return the absolute path for `relative` within the project.
    ///
    /// `full_path(Path::new("."))` is the project root.
    fn full_path(&self, relative: &Path) -> PathBuf;
}

/// Project rooted at a directory on the local filesystem.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalProject {
    root: PathBuf,
}

impl LocalProject {
    /// Create a project rooted at `root`.
    ///
    /// A relative root is resolved against the current directory, so the
    /// stored root (and every `full_path`) is always absolute.
    pub fn new(root: impl AsRef<Path>) -> Result<Self> {
        let root = root.as_ref();
        if root.is_absolute() {
            return Ok(Self::from_absolute(root));
        }
        let cwd = std::env::current_dir().context("read current directory")?;
        Ok(Self::from_absolute(cwd.join(root)))
    }

    /// Create a project from a root that is already absolute.
    pub fn from_absolute(root: impl AsRef<Path>) -> Self {
        let root = root.as_ref();
        debug_assert!(root.is_absolute(), "project root {} is relative", root.display());
        Self {
            root: normalize(root),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl SimulationProject for LocalProject {
    fn full_path(&self, relative: &Path) -> PathBuf {
        if relative.is_absolute() {
            normalize(relative)
        } else {
            normalize(&self.root.join(relative))
        }
    }
}

/// Settings for one kind of simulation: where it runs and which project owns it.
#[derive(Clone)]
pub struct SimulationConfig {
    working_directory: PathBuf,
    project: Arc<dyn SimulationProject>,
}

impl SimulationConfig {
    pub fn new(working_directory: impl Into<PathBuf>, project: Arc<dyn SimulationProject>) -> Self {
        Self {
            working_directory: working_directory.into(),
            project,
        }
    }

    /// Working directory relative to the project root.
    pub fn working_directory(&self) -> &Path {
        &self.working_directory
    }

    pub fn project(&self) -> &dyn SimulationProject {
        self.project.as_ref()
    }
}

impl fmt::Debug for SimulationConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SimulationConfig")
            .field("working_directory", &self.working_directory)
            .field("root", &self.project.full_path(Path::new(".")))
            .finish()
    }
}

/// One execution request.
#[derive(Debug, Clone)]
pub struct SimulationRun {
    config: SimulationConfig,
}

impl SimulationRun {
    pub fn new(config: SimulationConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }
}

/// Lexically resolve `.` and `..` components without touching the filesystem.
///
/// `..` never climbs above the filesystem root.
fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match out.components().next_back() {
                Some(Component::Normal(_)) => {
                    out.pop();
                }
                Some(Component::RootDir | Component::Prefix(_)) => {}
                _ => out.push(component),
            },
            Component::Prefix(_) | Component::RootDir | Component::Normal(_) => {
                out.push(component);
            }
        }
    }
    out
}
