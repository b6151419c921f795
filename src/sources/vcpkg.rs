//! Vcpkg package discovery.
//!
//! Reads an installed vcpkg tree directly rather than parsing CLI output:
//!
//! ```text
//! <vcpkg-root>/
//! └── installed/<triplet>/
//!     ├── include/              # Headers
//!     ├── lib/                  # Libraries
//!     ├── debug/lib/            # Debug libraries
//!     └── share/<port>/
//!         ├── vcpkg.json        # Port metadata (version info)
//!         ├── usage             # Usage hints naming the port's targets
//!         └── <port>-config.toml (optional)
//! ```
//!
//! A port that ships its own package config is used as-is. Otherwise one is
//! derived from the usage file: every `ns::tgt` it mentions becomes an
//! imported target carrying the triplet's include directory and the
//! port's libraries.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use anyhow::Result;
use regex::Regex;
use semver::Version;

use crate::core::linkage::LinkageStyle;
use crate::core::target::{LinkRef, TargetKind};
use crate::resolver::libtoken::find_library;
use crate::sources::package_config::{
    config_file_names, Compatibility, PackageConfig, PackageConfigFile, PackageSection,
    TargetEntry, VersionDescriptor,
};
use crate::sources::source::PackageManager;
use crate::util::vcpkg::VcpkgIntegration;

/// `ns::tgt` mentions in usage files.
static TARGET_REF: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b([A-Za-z][A-Za-z0-9_.+-]*::[A-Za-z0-9_.+-]+)").expect("valid target regex")
});

/// Package discovery over an installed vcpkg tree.
pub struct VcpkgPackageManager {
    vcpkg: VcpkgIntegration,
    linkage: LinkageStyle,
}

impl VcpkgPackageManager {
    pub fn new(vcpkg: VcpkgIntegration, linkage: LinkageStyle) -> Self {
        VcpkgPackageManager { vcpkg, linkage }
    }

    /// Installed port directory for a package name, trying the lowercase
    /// spelling as vcpkg port names are lowercase.
    fn port_for(&self, name: &str) -> Option<String> {
        let lower = name.to_lowercase();
        [name.to_string(), lower]
            .into_iter()
            .find(|port| self.vcpkg.is_port_installed(port))
    }

    fn port_version(&self, port: &str) -> Option<VersionDescriptor> {
        self.vcpkg.get_port_version(port).map(|raw| VersionDescriptor {
            version: normalize_version(&raw),
            compatibility: Compatibility::SameMajor,
        })
    }

    /// Library files installed for a port.
    fn port_libraries(&self, port: &str) -> Vec<LinkRef> {
        // libjwt -> jwt, zlib -> z
        let mut stems = vec![port.to_string()];
        let trimmed = [port.strip_prefix("lib"), port.strip_suffix("lib")];
        for stem in trimmed.into_iter().flatten() {
            if !stem.is_empty() && !stems.iter().any(|s| s == stem) {
                stems.push(stem.to_string());
            }
        }

        stems
            .iter()
            .find_map(|stem| find_library(stem, &self.vcpkg.lib_dirs, self.linkage))
            .map(LinkRef::Path)
            .into_iter()
            .collect()
    }

    /// Derive a package config from the port's usage file.
    fn derive_config(&self, port: &str) -> PackageConfig {
        let share = self.vcpkg.port_share_dir(port);
        let usage_path = share.join("usage");
        let usage = std::fs::read_to_string(&usage_path).unwrap_or_default();

        let mut names = usage_targets(&usage);
        if names.is_empty() {
            names.push(format!("{port}::{port}"));
        }

        let link = self.port_libraries(port);
        let targets = names
            .into_iter()
            .map(|name| TargetEntry {
                name,
                kind: TargetKind::Imported,
                include_dirs: self.vcpkg.include_dirs.clone(),
                link: link.clone(),
            })
            .collect();

        PackageConfig {
            path: usage_path,
            file: PackageConfigFile {
                package: PackageSection {
                    name: port.to_string(),
                    prefix: Some(self.vcpkg.installed_dir()),
                    dependencies: Vec::new(),
                },
                targets,
                aliases: BTreeMap::new(),
            },
            version: self.port_version(port),
        }
    }
}

impl PackageManager for VcpkgPackageManager {
    fn name(&self) -> &str {
        "vcpkg"
    }

    fn find(&self, name: &str) -> Result<Option<PackageConfig>> {
        let Some(port) = self.port_for(name) else {
            return Ok(None);
        };
        let share = self.vcpkg.port_share_dir(&port);

        if let Some(path) = shipped_config(&share, &port) {
            tracing::debug!("vcpkg port `{}` ships {}", port, path.display());
            let mut config = PackageConfig::load(&path)?;
            if config.version.is_none() {
                config.version = self.port_version(&port);
            }
            return Ok(Some(config));
        }

        tracing::debug!("deriving package config for vcpkg port `{}`", port);
        Ok(Some(self.derive_config(&port)))
    }
}

fn shipped_config(share: &Path, port: &str) -> Option<PathBuf> {
    config_file_names(port)
        .into_iter()
        .map(|file| share.join(file))
        .find(|path| path.is_file())
}

/// Distinct `ns::tgt` names mentioned in a usage file, in order.
fn usage_targets(usage: &str) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for cap in TARGET_REF.captures_iter(usage) {
        let name = cap[1].trim_end_matches(['.', ')']).to_string();
        if !out.contains(&name) {
            out.push(name);
        }
    }
    out
}

/// Lenient version parse for vcpkg version strings (`1.2`, `2023-01-01`, `3.0.0#2`).
fn normalize_version(raw: &str) -> Version {
    let raw = raw.split('#').next().unwrap_or(raw);
    let raw = raw.split('+').next().unwrap_or(raw);
    if let Ok(version) = Version::parse(raw) {
        return version;
    }

    let parts: Vec<u64> = raw
        .split(|c: char| !c.is_ascii_digit())
        .filter(|p| !p.is_empty())
        .filter_map(|p| p.parse().ok())
        .collect();

    match parts.as_slice() {
        [] => Version::new(0, 0, 0),
        [major] => Version::new(*major, 0, 0),
        [major, minor] => Version::new(*major, *minor, 0),
        [major, minor, patch, ..] => Version::new(*major, *minor, *patch),
    }
}
