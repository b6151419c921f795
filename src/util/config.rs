//! Configuration file support for Lookout.
//!
//! Lookout supports two configuration file locations:
//! - Global: `~/.lookout/config.toml` - User-wide defaults
//! - Project: `.lookout/config.toml` - Project-specific overrides
//!
//! Project config takes precedence over global config.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Environment variable holding extra install prefixes.
pub const PREFIX_PATH_ENV: &str = "LOOKOUT_PREFIX_PATH";

/// Environment variable holding extra `.pc` directories.
pub const PKG_CONFIG_PATH_ENV: &str = "PKG_CONFIG_PATH";

/// Lookout configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Search roots
    pub search: SearchConfig,

    /// vcpkg integration
    pub vcpkg: VcpkgConfig,
}

/// Search-root configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct SearchConfig {
    /// Install prefixes searched for package configs
    pub prefixes: Vec<PathBuf>,

    /// Directories scanned for `name*` package configs
    pub scan_dirs: Vec<PathBuf>,

    /// Directories searched when resolving bare library names
    pub lib_dirs: Vec<PathBuf>,

    /// Directories searched for `.pc` files
    pub pkg_config_path: Vec<PathBuf>,

    /// Prefix used for last-resort placeholder targets
    pub install_prefix: Option<PathBuf>,

    /// Skip the built-in conventional locations
    pub no_default_paths: bool,
}

/// vcpkg configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct VcpkgConfig {
    /// Force vcpkg discovery on or off (auto-detected when unset)
    pub enabled: Option<bool>,

    /// vcpkg root directory
    pub root: Option<PathBuf>,

    /// Target triplet (e.g., x64-linux)
    pub triplet: Option<String>,
}

impl Config {
    /// Load configuration from a file.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file: {}", path.display()))?;

        toml::from_str(&contents)
            .with_context(|| format!("failed to parse config file: {}", path.display()))
    }

    /// Load configuration with fallback to defaults if file doesn't exist.
    pub fn load_or_default(path: &Path) -> Self {
        if path.exists() {
            Self::load(path).unwrap_or_else(|e| {
                tracing::warn!("Failed to load config from {}: {}", path.display(), e);
                Self::default()
            })
        } else {
            Self::default()
        }
    }

    /// Merge another config into this one (other takes precedence).
    pub fn merge(&mut self, other: Config) {
        // Search roots: non-empty lists replace
        if !other.search.prefixes.is_empty() {
            self.search.prefixes = other.search.prefixes;
        }
        if !other.search.scan_dirs.is_empty() {
            self.search.scan_dirs = other.search.scan_dirs;
        }
        if !other.search.lib_dirs.is_empty() {
            self.search.lib_dirs = other.search.lib_dirs;
        }
        if !other.search.pkg_config_path.is_empty() {
            self.search.pkg_config_path = other.search.pkg_config_path;
        }
        if other.search.install_prefix.is_some() {
            self.search.install_prefix = other.search.install_prefix;
        }
        if other.search.no_default_paths {
            self.search.no_default_paths = true;
        }

        // vcpkg settings
        if other.vcpkg.enabled.is_some() {
            self.vcpkg.enabled = other.vcpkg.enabled;
        }
        if other.vcpkg.root.is_some() {
            self.vcpkg.root = other.vcpkg.root;
        }
        if other.vcpkg.triplet.is_some() {
            self.vcpkg.triplet = other.vcpkg.triplet;
        }
    }
}

/// Load merged configuration from global and project locations.
///
/// Order of precedence (highest to lowest):
/// 1. Project config (.lookout/config.toml)
/// 2. Global config (~/.lookout/config.toml)
/// 3. Defaults
pub fn load_config(global_path: &Path, project_path: &Path) -> Config {
    let mut config = Config::default();

    if global_path.exists() {
        let global = Config::load_or_default(global_path);
        config.merge(global);
    }

    if project_path.exists() {
        let project = Config::load_or_default(project_path);
        config.merge(project);
    }

    config
}

/// Get the global lookout config directory (~/.lookout).
pub fn global_config_dir() -> Option<PathBuf> {
    directories::BaseDirs::new().map(|b| b.home_dir().join(".lookout"))
}

/// Get the project config path (.lookout/config.toml).
pub fn project_config_path(project_root: &Path) -> PathBuf {
    project_root.join(".lookout").join("config.toml")
}

/// Effective search roots: configuration, then environment, then defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchRoots {
    pub prefixes: Vec<PathBuf>,
    pub scan_dirs: Vec<PathBuf>,
    pub lib_dirs: Vec<PathBuf>,
    pub pkg_config_dirs: Vec<PathBuf>,
    pub install_prefix: PathBuf,
}

impl SearchRoots {
    /// Build search roots from configuration and the process environment.
    pub fn from_config(config: &SearchConfig) -> Self {
        let env_prefixes = std::env::var_os(PREFIX_PATH_ENV)
            .map(|v| std::env::split_paths(&v).collect::<Vec<_>>())
            .unwrap_or_default();
        let env_pc = std::env::var_os(PKG_CONFIG_PATH_ENV)
            .map(|v| std::env::split_paths(&v).collect::<Vec<_>>())
            .unwrap_or_default();

        Self::assemble(config, env_prefixes, env_pc)
    }

    fn assemble(config: &SearchConfig, env_prefixes: Vec<PathBuf>, env_pc: Vec<PathBuf>) -> Self {
        let defaults = !config.no_default_paths;

        let mut prefixes = config.prefixes.clone();
        extend_unique(&mut prefixes, env_prefixes);
        if defaults {
            extend_unique(&mut prefixes, default_prefixes());
        }

        let mut scan_dirs = config.scan_dirs.clone();
        if defaults {
            extend_unique(&mut scan_dirs, default_scan_dirs());
        }

        let mut lib_dirs = config.lib_dirs.clone();
        extend_unique(
            &mut lib_dirs,
            prefixes.iter().map(|p| p.join("lib")).collect::<Vec<_>>(),
        );
        if defaults {
            extend_unique(&mut lib_dirs, default_lib_dirs());
        }

        let mut pkg_config_dirs = config.pkg_config_path.clone();
        extend_unique(&mut pkg_config_dirs, env_pc);
        extend_unique(
            &mut pkg_config_dirs,
            lib_dirs.iter().map(|d| d.join("pkgconfig")).collect::<Vec<_>>(),
        );
        if defaults {
            extend_unique(
                &mut pkg_config_dirs,
                vec![
                    PathBuf::from("/usr/local/share/pkgconfig"),
                    PathBuf::from("/usr/share/pkgconfig"),
                ],
            );
        }

        let install_prefix = config
            .install_prefix
            .clone()
            .unwrap_or_else(|| PathBuf::from("/usr/local"));

        SearchRoots {
            prefixes,
            scan_dirs,
            lib_dirs,
            pkg_config_dirs,
            install_prefix,
        }
    }

    /// Search roots for a single prefix, ignoring the environment and defaults.
    pub fn for_prefix(prefix: &Path) -> Self {
        let config = SearchConfig {
            prefixes: vec![prefix.to_path_buf()],
            scan_dirs: vec![prefix.join("lib").join("lookout")],
            install_prefix: Some(prefix.to_path_buf()),
            no_default_paths: true,
            ..Default::default()
        };
        Self::assemble(&config, Vec::new(), Vec::new())
    }
}

fn extend_unique(list: &mut Vec<PathBuf>, items: Vec<PathBuf>) {
    for item in items {
        if !list.contains(&item) {
            list.push(item);
        }
    }
}

fn default_prefixes() -> Vec<PathBuf> {
    ["/usr/local", "/usr", "/opt/local", "/opt/homebrew"]
        .iter()
        .map(PathBuf::from)
        .collect()
}

fn default_scan_dirs() -> Vec<PathBuf> {
    [
        "/usr/local/lib/lookout",
        "/usr/lib/lookout",
        "/usr/local/share/lookout",
        "/usr/share/lookout",
        "/opt/lookout",
        "/opt/local/lib/lookout",
    ]
    .iter()
    .map(PathBuf::from)
    .collect()
}

fn default_lib_dirs() -> Vec<PathBuf> {
    let mut dirs: Vec<PathBuf> = ["/usr/local/lib64", "/usr/lib64"]
        .iter()
        .map(PathBuf::from)
        .collect();
    if cfg!(target_os = "linux") {
        dirs.push(PathBuf::from(format!(
            "/usr/lib/{}-linux-gnu",
            std::env::consts::ARCH
        )));
    }
    dirs
}
