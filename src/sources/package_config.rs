//! Package config files.
//!
//! A package config (`<name>-config.toml`) declares the importable targets a
//! package provides, the aliases it defines and the packages it depends on.
//! An optional sibling version descriptor (`<name>-config-version.toml`)
//! records the installed version.
//!
//! ```toml
//! [package]
//! name = "zlib"
//! prefix = "../../.."
//! dependencies = []
//!
//! [[target]]
//! name = "ZLIB::ZLIB"
//! kind = "imported"
//! include-dirs = ["include"]
//! link = ["lib/libz.a"]
//! ```
//!
//! Relative include directories and relative library paths containing a
//! `/` are resolved against the package prefix, which is itself relative to
//! the directory holding the config file.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use semver::Version;
use serde::{Deserialize, Serialize};

use crate::core::name::PackageName;
use crate::core::target::{LinkRef, TargetDescriptor, TargetKind};

/// Suffix of package config files.
pub const CONFIG_SUFFIX: &str = "-config.toml";

/// Suffix of version descriptor files.
pub const VERSION_SUFFIX: &str = "-config-version.toml";

/// `[package]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PackageSection {
    pub name: String,

    /// Install prefix, relative to the config file's directory
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prefix: Option<PathBuf>,

    /// Packages that must be found for this one to be usable
    #[serde(default)]
    pub dependencies: Vec<PackageName>,
}

/// A `[[target]]` entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct TargetEntry {
    pub name: String,

    #[serde(default = "default_kind")]
    pub kind: TargetKind,

    #[serde(default)]
    pub include_dirs: Vec<PathBuf>,

    #[serde(default)]
    pub link: Vec<LinkRef>,
}

fn default_kind() -> TargetKind {
    TargetKind::Imported
}

/// Version compatibility policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Compatibility {
    #[default]
    SameMajor,
}

/// Contents of a version descriptor file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionDescriptor {
    pub version: Version,
    #[serde(default)]
    pub compatibility: Compatibility,
}

/// On-disk package config document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PackageConfigFile {
    pub package: PackageSection,

    #[serde(default, rename = "target")]
    pub targets: Vec<TargetEntry>,

    /// `alias = "target"` pairs
    #[serde(default)]
    pub aliases: BTreeMap<String, String>,
}

/// A loaded package config.
#[derive(Debug, Clone)]
pub struct PackageConfig {
    /// File the config was read from
    pub path: PathBuf,

    pub file: PackageConfigFile,

    pub version: Option<VersionDescriptor>,
}

impl PackageConfig {
    /// Load a config file and its version descriptor, if present.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read package config: {}", path.display()))?;
        let file: PackageConfigFile = toml::from_str(&contents)
            .with_context(|| format!("failed to parse package config: {}", path.display()))?;

        let version_path = version_path_for(path);
        let version = if version_path.is_file() {
            let text = std::fs::read_to_string(&version_path).with_context(|| {
                format!("failed to read version file: {}", version_path.display())
            })?;
            Some(toml::from_str(&text).with_context(|| {
                format!("failed to parse version file: {}", version_path.display())
            })?)
        } else {
            None
        };

        Ok(PackageConfig {
            path: path.to_path_buf(),
            file,
            version,
        })
    }

    pub fn name(&self) -> &str {
        &self.file.package.name
    }

    pub fn dependencies(&self) -> &[PackageName] {
        &self.file.package.dependencies
    }

    /// Absolute install prefix of the package.
    pub fn prefix(&self) -> PathBuf {
        let dir = self.path.parent().unwrap_or(Path::new("."));
        match &self.file.package.prefix {
            Some(prefix) => crate::util::fs::normalize_path(&dir.join(prefix)),
            None => dir.to_path_buf(),
        }
    }

    /// Target descriptors with paths resolved against the prefix.
    pub fn descriptors(&self) -> Vec<TargetDescriptor> {
        let prefix = self.prefix();

        self.file
            .targets
            .iter()
            .map(|entry| {
                let include_dirs = entry
                    .include_dirs
                    .iter()
                    .map(|dir| absolutize(&prefix, dir))
                    .collect();
                let link = entry
                    .link
                    .iter()
                    .map(|link| match link {
                        LinkRef::Path(p) if p.is_relative() && p.components().count() > 1 => {
                            LinkRef::Path(prefix.join(p))
                        }
                        other => other.clone(),
                    })
                    .collect();

                TargetDescriptor {
                    name: entry.name.clone(),
                    kind: entry.kind,
                    include_dirs,
                    link,
                    origin: Some(self.path.clone()),
                }
            })
            .collect()
    }

    /// Alias pairs declared by the config.
    pub fn aliases(&self) -> impl Iterator<Item = (&str, &str)> {
        self.file
            .aliases
            .iter()
            .map(|(a, t)| (a.as_str(), t.as_str()))
    }
}

fn absolutize(prefix: &Path, dir: &Path) -> PathBuf {
    if dir.is_absolute() {
        dir.to_path_buf()
    } else {
        prefix.join(dir)
    }
}

/// Version descriptor path belonging to a config file.
pub fn version_path_for(config: &Path) -> PathBuf {
    let file_name = config
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or_default();
    let stem = file_name.strip_suffix(".toml").unwrap_or(file_name);
    config.with_file_name(format!("{stem}-version.toml"))
}

/// Candidate config file names for a package, in lookup order.
pub fn config_file_names(name: &str) -> Vec<String> {
    let lower = name.to_lowercase();
    let mut names = vec![format!("{name}{CONFIG_SUFFIX}"), format!("{name}Config.toml")];
    if lower != name {
        names.push(format!("{lower}{CONFIG_SUFFIX}"));
        names.push(format!("{lower}Config.toml"));
    }
    names
}

/// Whether a file looks like a package config (and not a version file).
pub fn is_config_file(path: &Path) -> bool {
    let Some(file_name) = path.file_name().and_then(|n| n.to_str()) else {
        return false;
    };
    file_name.ends_with(".toml")
        && !file_name.ends_with(VERSION_SUFFIX)
        && !file_name.ends_with("Config-version.toml")
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write_zlib_config(root: &Path) -> PathBuf {
        let dir = root.join("lib").join("lookout").join("zlib");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("zlib-config.toml");
        std::fs::write(
            &path,
            r#"
[package]
name = "zlib"
prefix = "../../.."

[[target]]
name = "ZLIB::ZLIB"
include-dirs = ["include"]
link = ["lib/libz.a", "-lm", "libextra.so"]

[aliases]
"zlib::static" = "ZLIB::ZLIB"
"#,
        )
        .unwrap();
        path
    }

    #[test]
    fn test_load_resolves_prefix_paths() {
        let tmp = TempDir::new().unwrap();
        let root = crate::util::fs::normalize_path(tmp.path());
        let path = write_zlib_config(&root);

        let config = PackageConfig::load(&path).unwrap();
        assert_eq!(config.name(), "zlib");
        assert_eq!(config.prefix(), root);

        let targets = config.descriptors();
        assert_eq!(targets.len(), 1);
        let zlib = &targets[0];
        assert_eq!(zlib.kind, TargetKind::Imported);
        assert_eq!(zlib.include_dirs, vec![root.join("include")]);
        assert_eq!(
            zlib.link,
            vec![
                LinkRef::Path(root.join("lib/libz.a")),
                LinkRef::Name("m".into()),
                LinkRef::Path("libextra.so".into()),
            ]
        );
        assert_eq!(zlib.origin.as_deref(), Some(path.as_path()));

        let aliases: Vec<_> = config.aliases().collect();
        assert_eq!(aliases, vec![("zlib::static", "ZLIB::ZLIB")]);
        assert!(config.version.is_none());
    }

    #[test]
    fn test_load_version_descriptor() {
        let tmp = TempDir::new().unwrap();
        let path = write_zlib_config(tmp.path());
        std::fs::write(
            version_path_for(&path),
            "version = \"1.3.1\"\ncompatibility = \"same-major\"\n",
        )
        .unwrap();

        let config = PackageConfig::load(&path).unwrap();
        let version = config.version.unwrap();
        assert_eq!(version.version, Version::new(1, 3, 1));
        assert_eq!(version.compatibility, Compatibility::SameMajor);
    }

    #[test]
    fn test_config_file_names() {
        assert_eq!(
            config_file_names("ZLIB"),
            vec![
                "ZLIB-config.toml",
                "ZLIBConfig.toml",
                "zlib-config.toml",
                "zlibConfig.toml"
            ]
        );
        assert_eq!(config_file_names("zlib").len(), 2);
    }

    #[test]
    fn test_is_config_file() {
        assert!(is_config_file(Path::new("zlib-config.toml")));
        assert!(!is_config_file(Path::new("zlib-config-version.toml")));
        assert!(!is_config_file(Path::new("zlib.pc")));
    }

    #[test]
    fn test_version_path_for() {
        assert_eq!(
            version_path_for(Path::new("/p/zlib-config.toml")),
            PathBuf::from("/p/zlib-config-version.toml")
        );
    }
}
