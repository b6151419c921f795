//! Heuristic scan for package config files.
//!
//! Looks in conventional directories (two levels deep) for config files whose
//! name starts with the requested package name, ignoring case. Used when no
//! package manager knows the package.

use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::sources::package_config::is_config_file;

/// Maximum directory depth below each scan root.
const SCAN_DEPTH: usize = 2;

#[derive(Debug, Clone, Default)]
pub struct FilesystemScanner {
    dirs: Vec<PathBuf>,
}

impl FilesystemScanner {
    pub fn new(dirs: Vec<PathBuf>) -> Self {
        FilesystemScanner { dirs }
    }

    /// Config files matching `name*`, sorted by path.
    pub fn candidates(&self, name: &str) -> Vec<PathBuf> {
        let prefix = name.to_lowercase();
        let mut found: Vec<PathBuf> = self
            .dirs
            .iter()
            .filter(|dir| dir.is_dir())
            .flat_map(|dir| scan_dir(dir, &prefix))
            .collect();

        found.sort();
        found.dedup();
        found
    }
}

fn scan_dir(dir: &Path, prefix: &str) -> Vec<PathBuf> {
    WalkDir::new(dir)
        .max_depth(SCAN_DEPTH)
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_file())
        .map(|entry| entry.into_path())
        .filter(|path| {
            path.file_name()
                .and_then(|n| n.to_str())
                .is_some_and(|n| n.to_lowercase().starts_with(prefix))
        })
        .filter(|path| is_config_file(path))
        .collect()
}
