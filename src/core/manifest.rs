//! Lookout.toml manifest parsing and schema.
//!
//! The manifest names the project, the packages it requires, the build
//! options it enables and the targets whose link plans should be computed.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use semver::Version;
use serde::{Deserialize, Serialize};

use crate::core::name::PackageName;

/// Manifest file name.
pub const MANIFEST_NAME: &str = "Lookout.toml";

/// Parsed project manifest.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Manifest {
    pub project: ProjectInfo,

    #[serde(default)]
    pub dependencies: Dependencies,

    #[serde(default)]
    pub options: OptionsTable,

    #[serde(default, rename = "target")]
    pub targets: Vec<TargetSpec>,
}

/// `[project]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectInfo {
    pub name: String,
    pub version: Version,
    #[serde(default)]
    pub description: Option<String>,
}

/// `[dependencies]` section.
///
/// Custom packages are the project's own libraries built elsewhere;
/// third-party packages come from the system or a package manager.
/// Both are required.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Dependencies {
    #[serde(default)]
    pub custom: Vec<PackageName>,

    #[serde(default)]
    pub third_party: Vec<PackageName>,
}

impl Dependencies {
    /// All required packages, custom first.
    pub fn all(&self) -> impl Iterator<Item = &PackageName> {
        self.custom.iter().chain(self.third_party.iter())
    }

    pub fn is_empty(&self) -> bool {
        self.custom.is_empty() && self.third_party.is_empty()
    }
}

/// `[options]` section. Unset keys fall back to defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OptionsTable {
    #[serde(rename = "static")]
    pub static_lib: Option<bool>,
    pub shared: Option<bool>,
    pub debug: Option<bool>,
    pub coverage: Option<bool>,
    pub lint: Option<bool>,
    pub asan: Option<bool>,
    pub testing: Option<bool>,
}

/// Kind of a manifest target.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TargetSpecKind {
    #[default]
    Library,
    Executable,
    Test,
}

/// A `[[target]]` entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct TargetSpec {
    pub name: String,
    pub kind: TargetSpecKind,

    #[serde(default)]
    pub sources: Vec<PathBuf>,

    /// Additional per-target sources appended after `sources`
    #[serde(default)]
    pub extra_sources: Vec<PathBuf>,

    /// Packages this target links; defaults to every manifest dependency
    #[serde(default)]
    pub links: Option<Vec<PackageName>>,
}

impl TargetSpec {
    /// All sources in declaration order.
    pub fn all_sources(&self) -> impl Iterator<Item = &PathBuf> {
        self.sources.iter().chain(self.extra_sources.iter())
    }
}

impl Manifest {
    /// Load a manifest from disk.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read manifest: {}", path.display()))?;
        Self::parse(&contents)
            .with_context(|| format!("failed to parse manifest: {}", path.display()))
    }

    /// Parse and validate manifest text.
    pub fn parse(contents: &str) -> Result<Self> {
        let manifest: Manifest = toml::from_str(contents)?;
        manifest.validate()?;
        Ok(manifest)
    }

    fn validate(&self) -> Result<()> {
        if self.project.name.trim().is_empty() {
            bail!("project name must not be empty");
        }

        let mut seen = std::collections::HashSet::new();
        for target in &self.targets {
            if !seen.insert(target.name.as_str()) {
                bail!("duplicate target `{}`", target.name);
            }
        }

        Ok(())
    }

    /// Packages a target links against.
    pub fn links_for(&self, target: &TargetSpec) -> Vec<PackageName> {
        match &target.links {
            Some(links) => links.clone(),
            None => self.dependencies.all().cloned().collect(),
        }
    }
}

/// Find a manifest in `start` or any parent directory.
pub fn find_manifest(start: &Path) -> Option<PathBuf> {
    start
        .ancestors()
        .map(|dir| dir.join(MANIFEST_NAME))
        .find(|candidate| candidate.is_file())
}
