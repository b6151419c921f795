//! Install-prefix package discovery.
//!
//! Searches a list of install prefixes for a package config using the
//! conventional layouts:
//!
//! ```text
//! <prefix>/lib/lookout/<name>/<name>-config.toml
//! <prefix>/lib/lookout/<name>-config.toml
//! <prefix>/share/lookout/<name>/<name>-config.toml
//! <prefix>/share/lookout/<name>-config.toml
//! <prefix>/<name>-config.toml
//! ```
//!
//! Both the requested spelling and its lowercase form are tried, as are
//! `<Name>Config.toml` file names.

use std::path::{Path, PathBuf};

use anyhow::Result;

use crate::sources::package_config::{config_file_names, PackageConfig};
use crate::sources::source::PackageManager;

/// Package discovery over install prefixes.
#[derive(Debug, Clone)]
pub struct PrefixPackageManager {
    prefixes: Vec<PathBuf>,
}

impl PrefixPackageManager {
    pub fn new(prefixes: Vec<PathBuf>) -> Self {
        PrefixPackageManager { prefixes }
    }

    /// Candidate config paths under one prefix, in lookup order.
    fn candidates(prefix: &Path, name: &str) -> Vec<PathBuf> {
        let files = config_file_names(name);
        let mut dirs_for_name = vec![name.to_string()];
        let lower = name.to_lowercase();
        if lower != name {
            dirs_for_name.push(lower);
        }

        let mut out = Vec::new();
        for base in [prefix.join("lib").join("lookout"), prefix.join("share").join("lookout")] {
            for dir in &dirs_for_name {
                for file in &files {
                    out.push(base.join(dir).join(file));
                }
            }
            for file in &files {
                out.push(base.join(file));
            }
        }
        for file in &files {
            out.push(prefix.join(file));
        }
        out
    }

    /// First existing config path for `name`.
    pub fn locate(&self, name: &str) -> Option<PathBuf> {
        self.prefixes
            .iter()
            .flat_map(|prefix| Self::candidates(prefix, name))
            .find(|candidate| candidate.is_file())
    }
}

impl PackageManager for PrefixPackageManager {
    fn name(&self) -> &str {
        "prefix"
    }

    fn find(&self, name: &str) -> Result<Option<PackageConfig>> {
        match self.locate(name) {
            Some(path) => {
                tracing::debug!("found package config for `{}` at {}", name, path.display());
                PackageConfig::load(&path).map(Some)
            }
            None => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const CONFIG: &str = "[package]\nname = \"zlib\"\n\n[[target]]\nname = \"ZLIB::ZLIB\"\n";

    #[test]
    fn test_locate_in_nested_layout() {
        let tmp = TempDir::new().unwrap();
        let dir = tmp.path().join("lib/lookout/zlib");
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join("zlib-config.toml"), CONFIG).unwrap();

        let pm = PrefixPackageManager::new(vec![tmp.path().to_path_buf()]);
        assert_eq!(pm.locate("zlib"), Some(dir.join("zlib-config.toml")));
        // Upper-case requests fall back to the lowercase spelling
        assert_eq!(pm.locate("ZLIB"), Some(dir.join("zlib-config.toml")));
        assert_eq!(pm.locate("png"), None);
    }

    #[test]
    fn test_locate_respects_prefix_order() {
        let first = TempDir::new().unwrap();
        let second = TempDir::new().unwrap();
        for prefix in [first.path(), second.path()] {
            let dir = prefix.join("share/lookout");
            std::fs::create_dir_all(&dir).unwrap();
            std::fs::write(dir.join("zlibConfig.toml"), CONFIG).unwrap();
        }

        let pm = PrefixPackageManager::new(vec![
            second.path().to_path_buf(),
            first.path().to_path_buf(),
        ]);
        let found = pm.locate("zlib").unwrap();
        assert!(found.starts_with(second.path()));
    }

    #[test]
    fn test_find_loads_config() {
        let tmp = TempDir::new().unwrap();
        std::fs::write(tmp.path().join("zlib-config.toml"), CONFIG).unwrap();

        let pm = PrefixPackageManager::new(vec![tmp.path().to_path_buf()]);
        let config = pm.find("zlib").unwrap().unwrap();
        assert_eq!(config.name(), "zlib");
        assert!(pm.find("missing").unwrap().is_none());
    }
}
