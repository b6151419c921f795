//! Global context for Lookout operations.
//!
//! Provides centralized access to the working directory, the per-user home
//! (`~/.lookout`) and the merged configuration.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::core::manifest::{find_manifest, MANIFEST_NAME};
use crate::util::config::{self, Config};

/// Directory holding project-local state.
pub const PROJECT_DIR: &str = ".lookout";

/// Global context containing configuration and paths.
#[derive(Debug, Clone)]
pub struct GlobalContext {
    /// Current working directory
    cwd: PathBuf,

    /// Home directory for global Lookout data (~/.lookout/)
    home: PathBuf,

    verbose: bool,
}

impl GlobalContext {
    pub fn new() -> Result<Self> {
        let cwd = std::env::current_dir().context("failed to get current directory")?;
        Ok(Self::with_cwd(cwd))
    }

    /// Create a context rooted at a specific working directory.
    pub fn with_cwd(cwd: PathBuf) -> Self {
        let home = config::global_config_dir().unwrap_or_else(|| PathBuf::from(PROJECT_DIR));
        GlobalContext {
            cwd,
            home,
            verbose: false,
        }
    }

    /// Override the home directory.
    pub fn with_home(mut self, home: PathBuf) -> Self {
        self.home = home;
        self
    }

    pub fn set_verbose(&mut self, verbose: bool) {
        self.verbose = verbose;
    }

    pub fn is_verbose(&self) -> bool {
        self.verbose
    }

    pub fn cwd(&self) -> &Path {
        &self.cwd
    }

    /// The Lookout home directory (~/.lookout/).
    pub fn home(&self) -> &Path {
        &self.home
    }

    /// Global configuration file.
    pub fn config_path(&self) -> PathBuf {
        self.home.join("config.toml")
    }

    /// Project-local state directory for a project root.
    pub fn project_dir(&self, root: &Path) -> PathBuf {
        root.join(PROJECT_DIR)
    }

    /// Locate the manifest, searching upward from `explicit` or the cwd.
    pub fn find_manifest(&self, explicit: Option<&Path>) -> Result<PathBuf> {
        if let Some(path) = explicit {
            let path = if path.is_absolute() {
                path.to_path_buf()
            } else {
                self.cwd.join(path)
            };
            let path = if path.is_dir() {
                path.join(MANIFEST_NAME)
            } else {
                path
            };
            anyhow::ensure!(path.is_file(), "manifest not found: {}", path.display());
            return Ok(path);
        }

        find_manifest(&self.cwd).with_context(|| {
            format!(
                "could not find {} in {} or any parent directory",
                MANIFEST_NAME,
                self.cwd.display()
            )
        })
    }

    /// Merged global and project configuration for a project root.
    pub fn load_config(&self, project_root: &Path) -> Config {
        config::load_config(&self.config_path(), &config::project_config_path(project_root))
    }
}
