//! Discovery backend traits.
//!
//! Two kinds of backends feed the resolver:
//! - [`PackageManager`]: native package discovery that yields package config
//!   files declaring importable targets
//! - [`ModuleProvider`]: lower-level module descriptions (`.pc` files) that
//!   only yield include directories and library tokens

use std::path::PathBuf;

use anyhow::Result;

use crate::sources::package_config::PackageConfig;

/// Native package discovery.
pub trait PackageManager {
    /// Backend name for display.
    fn name(&self) -> &str;

    /// Locate the package config for `name`.
    ///
    /// `Ok(None)` means the backend does not know the package. Errors are
    /// reserved for configs that exist but cannot be read.
    fn find(&self, name: &str) -> Result<Option<PackageConfig>>;
}

/// Module-style discovery (pkg-config and friends).
pub trait ModuleProvider {
    /// Backend name for display.
    fn name(&self) -> &str;

    /// Probe for a module description.
    fn probe(&self, module: &str) -> Result<Option<ModuleInfo>>;
}

/// Usage information extracted from a module description.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ModuleInfo {
    /// Module name as found
    pub name: String,

    pub version: Option<String>,

    /// `-I` directories
    pub include_dirs: Vec<PathBuf>,

    /// `-L` directories
    pub lib_dirs: Vec<PathBuf>,

    /// Library tokens (`-lfoo`, paths, other linker flags), in order
    pub libs: Vec<String>,

    /// Module description file
    pub path: Option<PathBuf>,
}

impl ModuleInfo {
    /// Whether the description yielded no usage information at all.
    pub fn is_empty(&self) -> bool {
        self.include_dirs.is_empty() && self.libs.is_empty()
    }
}
