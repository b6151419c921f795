//! Library-token resolution.
//!
//! Turns raw library tokens into [`LinkRef`]s. Abstract link names
//! (`-lfoo`, `foo`) are looked up in the search directories and replaced by
//! the absolute path of the first matching file. Everything else is kept
//! verbatim.

use std::path::{Path, PathBuf};

use crate::core::linkage::LinkageStyle;
use crate::core::target::LinkRef;

/// Resolve one raw token.
pub fn resolve_token(token: &str, search_dirs: &[PathBuf], linkage: LinkageStyle) -> Option<LinkRef> {
    LinkRef::parse(token).map(|link| resolve_link(link, search_dirs, linkage))
}

/// Resolve an already-classified reference.
pub fn resolve_link(link: LinkRef, search_dirs: &[PathBuf], linkage: LinkageStyle) -> LinkRef {
    match link {
        LinkRef::Name(name) => match find_library(&name, search_dirs, linkage) {
            Some(path) => LinkRef::Path(path),
            None => {
                tracing::debug!("library `{}` not found in search dirs, keeping link name", name);
                LinkRef::Name(name)
            }
        },
        other => other,
    }
}

/// Resolve a list of raw tokens, dropping empty ones.
pub fn resolve_tokens<'a>(
    tokens: impl IntoIterator<Item = &'a str>,
    search_dirs: &[PathBuf],
    linkage: LinkageStyle,
) -> Vec<LinkRef> {
    tokens
        .into_iter()
        .filter_map(|token| resolve_token(token, search_dirs, linkage))
        .collect()
}

/// Find a library file for a link name.
///
/// Directories are searched in order; within a directory the file names
/// preferred by `linkage` are tried first.
pub fn find_library(name: &str, search_dirs: &[PathBuf], linkage: LinkageStyle) -> Option<PathBuf> {
    let candidates = linkage.library_file_names(name);
    search_dirs.iter().find_map(|dir| find_in_dir(dir, &candidates))
}

fn find_in_dir(dir: &Path, candidates: &[String]) -> Option<PathBuf> {
    candidates
        .iter()
        .map(|file| dir.join(file))
        .find(|path| path.is_file())
        .map(|path| crate::util::fs::normalize_path(&path))
}
