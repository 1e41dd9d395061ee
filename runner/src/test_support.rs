//! Test-only helpers for building simulation projects on disk.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use tempfile::TempDir;

use crate::simulation::{LocalProject, SimulationConfig, SimulationRun};

/// A simulation project rooted in a temporary directory.
pub struct TestProject {
    dir: TempDir,
    project: Arc<LocalProject>,
}

impl TestProject {
    pub fn new() -> Result<Self> {
        let dir = tempfile::tempdir().context("create temp project")?;
        let project = Arc::new(LocalProject::from_absolute(dir.path()));
        Ok(Self { dir, project })
    }

    /// Absolute project root (what `INET_ROOT` should be).
    pub fn root(&self) -> &Path {
        self.project.root()
    }

    /// Create `relative` (and parents) under the project root.
    pub fn mkdir(&self, relative: &str) -> Result<PathBuf> {
        let path = self.dir.path().join(relative);
        fs::create_dir_all(&path).with_context(|| format!("create {}", path.display()))?;
        Ok(self.root().join(relative))
    }

    /// Build a run whose config uses `working_directory` within this project.
    pub fn run(&self, working_directory: &str) -> SimulationRun {
        SimulationRun::new(SimulationConfig::new(
            working_directory,
            self.project.clone(),
        ))
    }
}

/// Turn string literals into an owned command vector.
pub fn argv(items: &[&str]) -> Vec<String> {
    items.iter().map(|item| item.to_string()).collect()
}
