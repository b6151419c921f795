//! Vcpkg integration helpers.
//!
//! This module locates a vcpkg installation and describes its installed tree:
//! - Resolving vcpkg root and triplet from configuration and environment
//! - Path helpers for the `installed/<triplet>` layout
//! - Port metadata (version) lookup

use std::fs;
use std::path::{Path, PathBuf};

use crate::util::config::VcpkgConfig;

/// Resolved vcpkg integration settings.
#[derive(Debug, Clone)]
pub struct VcpkgIntegration {
    /// Path to the vcpkg root directory
    pub root: PathBuf,
    /// Target triplet (e.g., x64-windows, x64-linux)
    pub triplet: String,
    /// Include directories for compilation
    pub include_dirs: Vec<PathBuf>,
    /// Library directories for linking
    pub lib_dirs: Vec<PathBuf>,
}

impl VcpkgIntegration {
    /// Resolve vcpkg integration from config and environment.
    pub fn from_config(config: &VcpkgConfig, debug: bool) -> Option<Self> {
        if !is_enabled(config) {
            return None;
        }

        let root = resolve_root(config)?;
        if !root.exists() {
            return None;
        }

        let triplet = resolve_triplet(config)?;
        Some(Self::with_root(root, triplet, debug))
    }

    /// Build an integration for a known root and triplet.
    pub fn with_root(root: PathBuf, triplet: String, debug: bool) -> Self {
        let installed = root.join("installed").join(&triplet);

        let include_dirs = vec![installed.join("include")];

        let mut lib_dirs = Vec::new();
        if debug {
            lib_dirs.push(installed.join("debug").join("lib"));
        }
        lib_dirs.push(installed.join("lib"));
        lib_dirs.push(installed.join("lib64"));

        VcpkgIntegration {
            root,
            triplet,
            include_dirs,
            lib_dirs,
        }
    }

    /// Get the installed directory for the current triplet.
    pub fn installed_dir(&self) -> PathBuf {
        self.root.join("installed").join(&self.triplet)
    }

    /// Get the share directory for a specific port.
    pub fn port_share_dir(&self, port: &str) -> PathBuf {
        self.installed_dir().join("share").join(port)
    }

    /// Check if a port is installed.
    pub fn is_port_installed(&self, port: &str) -> bool {
        self.port_share_dir(port).is_dir()
    }

    /// Get version info for an installed port.
    pub fn get_port_version(&self, port: &str) -> Option<String> {
        let vcpkg_json = self.port_share_dir(port).join("vcpkg.json");
        if !vcpkg_json.exists() {
            return None;
        }

        let content = fs::read_to_string(&vcpkg_json).ok()?;
        let json: serde_json::Value = serde_json::from_str(&content).ok()?;

        json.get("version")
            .or_else(|| json.get("version-string"))
            .or_else(|| json.get("version-semver"))
            .or_else(|| json.get("version-date"))
            .and_then(|v| v.as_str())
            .map(String::from)
    }
}

fn is_enabled(config: &VcpkgConfig) -> bool {
    match config.enabled {
        Some(value) => value,
        // Auto-enable if vcpkg can be detected
        None => {
            std::env::var_os("VCPKG_ROOT").is_some()
                || config.root.is_some()
                || detect_from_path().is_some()
        }
    }
}

fn resolve_root(config: &VcpkgConfig) -> Option<PathBuf> {
    // Priority: config file > environment variable > PATH
    config
        .root
        .clone()
        .or_else(|| std::env::var_os("VCPKG_ROOT").map(PathBuf::from))
        .or_else(detect_from_path)
}

/// Find vcpkg in PATH and derive root from binary location.
fn detect_from_path() -> Option<PathBuf> {
    let vcpkg_exe = if cfg!(windows) { "vcpkg.exe" } else { "vcpkg" };

    let vcpkg_path = which::which(vcpkg_exe).ok()?;

    // vcpkg binary is at <root>/vcpkg[.exe]
    let root = vcpkg_path.parent()?;

    if is_valid_vcpkg_root(root) {
        tracing::debug!("Found vcpkg in PATH: {}", root.display());
        return Some(root.to_path_buf());
    }

    None
}

/// Validate that a directory is a valid vcpkg root.
fn is_valid_vcpkg_root(path: &Path) -> bool {
    // Check for .vcpkg-root marker file (created by vcpkg bootstrap)
    if path.join(".vcpkg-root").exists() {
        return true;
    }

    let vcpkg_exe = if cfg!(windows) { "vcpkg.exe" } else { "vcpkg" };
    path.join(vcpkg_exe).exists() && path.join("scripts").is_dir()
}

fn resolve_triplet(config: &VcpkgConfig) -> Option<String> {
    config
        .triplet
        .clone()
        .or_else(|| std::env::var("VCPKG_TARGET_TRIPLET").ok())
        .or_else(|| std::env::var("VCPKG_DEFAULT_TRIPLET").ok())
        .or_else(|| infer_triplet(std::env::consts::ARCH, std::env::consts::OS))
}

fn infer_triplet(arch: &str, os: &str) -> Option<String> {
    let arch = match arch {
        "x86_64" => "x64",
        "x86" | "i686" | "i386" => "x86",
        "aarch64" => "arm64",
        "arm" => "arm",
        _ => return None,
    };

    let os = match os {
        "windows" => "windows",
        "linux" => "linux",
        "macos" | "darwin" => "osx",
        _ => return None,
    };

    Some(format!("{}-{}", arch, os))
}
