//! Build targets and the library references they carry.
//!
//! A target is a named, linkable thing: an imported library described by a
//! package config file, or a placeholder synthesized from discovered include
//! directories and libraries. Targets only carry usage requirements; they
//! never own build steps.

use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::core::name::NAMESPACE_SEP;

/// File extensions that mark a token as an explicit library file.
const LIBRARY_EXTENSIONS: &[&str] = &["a", "so", "dylib", "lib", "dll", "tbd"];

/// Namespace used for module-style (pkg-config) target references.
pub const MODULE_NAMESPACE: &str = "PkgConfig";

/// How a target came to exist in the registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TargetKind {
    /// Declared by a package config file
    Imported,
    /// Header-only or pure link-interface target
    Interface,
    /// Placeholder created from discovered include paths and libraries
    Synthesized,
}

impl fmt::Display for TargetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TargetKind::Imported => write!(f, "imported"),
            TargetKind::Interface => write!(f, "interface"),
            TargetKind::Synthesized => write!(f, "synthesized"),
        }
    }
}

/// A library reference as it appears in a link interface.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum LinkRef {
    /// Library file, absolute or with an explicit extension
    Path(PathBuf),

    /// Another target (`pkg::tgt`)
    Target(String),

    /// Abstract link name (`-lfoo` or `foo`)
    Name(String),

    /// Any other linker flag, kept verbatim
    Flag(String),
}

impl LinkRef {
    /// Classify a raw library token.
    pub fn parse(token: &str) -> Option<LinkRef> {
        let token = token.trim();
        if token.is_empty() {
            return None;
        }

        if let Some(name) = token.strip_prefix("-l") {
            if !name.is_empty() {
                return Some(LinkRef::Name(name.to_string()));
            }
        }
        if token.starts_with('-') {
            return Some(LinkRef::Flag(token.to_string()));
        }
        if token.contains(NAMESPACE_SEP) {
            return Some(LinkRef::Target(token.to_string()));
        }

        let path = Path::new(token);
        if path.is_absolute() || has_library_extension(path) || token.contains('/') {
            return Some(LinkRef::Path(path.to_path_buf()));
        }

        Some(LinkRef::Name(token.to_string()))
    }

    /// Create a target reference.
    pub fn target(name: impl Into<String>) -> Self {
        LinkRef::Target(name.into())
    }

    /// Create a path reference.
    pub fn path(path: impl Into<PathBuf>) -> Self {
        LinkRef::Path(path.into())
    }

    /// The referenced target name, if this is a target reference.
    pub fn as_target(&self) -> Option<&str> {
        match self {
            LinkRef::Target(name) => Some(name),
            _ => None,
        }
    }

    /// Module name for `PkgConfig::NAME` references.
    pub fn module_name(&self) -> Option<&str> {
        let target = self.as_target()?;
        let (ns, module) = target.split_once(NAMESPACE_SEP)?;
        (ns == MODULE_NAMESPACE && !module.is_empty()).then_some(module)
    }

    /// Convert to linker flag(s).
    pub fn to_flags(&self) -> Vec<String> {
        match self {
            LinkRef::Path(path) => vec![path.display().to_string()],
            LinkRef::Name(name) => vec![format!("-l{}", name)],
            // Paired options such as `-framework Foo` are stored as one flag
            LinkRef::Flag(flag) => flag.split_whitespace().map(String::from).collect(),
            LinkRef::Target(_) => {
                // Expanded through the registry when building link plans
                vec![]
            }
        }
    }
}

impl fmt::Display for LinkRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LinkRef::Path(path) => write!(f, "{}", path.display()),
            LinkRef::Target(name) => write!(f, "{}", name),
            LinkRef::Name(name) => write!(f, "-l{}", name),
            LinkRef::Flag(flag) => write!(f, "{}", flag),
        }
    }
}

impl TryFrom<String> for LinkRef {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        LinkRef::parse(&value).ok_or_else(|| "empty library reference".to_string())
    }
}

impl From<LinkRef> for String {
    fn from(link: LinkRef) -> Self {
        link.to_string()
    }
}

/// Whether a path names a library file explicitly (`foo.a`, `libz.so.1`).
pub fn has_library_extension(path: &Path) -> bool {
    let Some(file_name) = path.file_name().and_then(|n| n.to_str()) else {
        return false;
    };

    if let Some(ext) = path.extension().and_then(|e| e.to_str()) {
        if LIBRARY_EXTENSIONS.contains(&ext) {
            return true;
        }
    }

    // Versioned shared objects: libfoo.so.1.2
    file_name.contains(".so.")
}

/// A target descriptor held by the registry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetDescriptor {
    pub name: String,

    pub kind: TargetKind,

    /// Include directories consumers compile with
    #[serde(default)]
    pub include_dirs: Vec<PathBuf>,

    /// Link interface
    #[serde(default)]
    pub link: Vec<LinkRef>,

    /// Package config file that declared the target, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub origin: Option<PathBuf>,
}

impl TargetDescriptor {
    /// Create a target with no usage requirements.
    pub fn new(name: impl Into<String>, kind: TargetKind) -> Self {
        TargetDescriptor {
            name: name.into(),
            kind,
            include_dirs: Vec::new(),
            link: Vec::new(),
            origin: None,
        }
    }

    /// Create a placeholder target.
    pub fn synthesized(
        name: impl Into<String>,
        include_dirs: Vec<PathBuf>,
        link: Vec<LinkRef>,
    ) -> Self {
        TargetDescriptor {
            name: name.into(),
            kind: TargetKind::Synthesized,
            include_dirs,
            link,
            origin: None,
        }
    }

    pub fn with_include_dirs(mut self, dirs: impl IntoIterator<Item = PathBuf>) -> Self {
        self.include_dirs.extend(dirs);
        self
    }

    pub fn with_link(mut self, link: impl IntoIterator<Item = LinkRef>) -> Self {
        self.link.extend(link);
        self
    }

    /// Module-style references in the link interface.
    pub fn module_refs(&self) -> impl Iterator<Item = &LinkRef> {
        self.link.iter().filter(|l| l.module_name().is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_tokens() {
        assert_eq!(LinkRef::parse("-lfoo"), Some(LinkRef::Name("foo".into())));
        assert_eq!(LinkRef::parse("foo"), Some(LinkRef::Name("foo".into())));
        assert_eq!(
            LinkRef::parse("ZLIB::ZLIB"),
            Some(LinkRef::Target("ZLIB::ZLIB".into()))
        );
        assert_eq!(
            LinkRef::parse("/usr/lib/libz.so"),
            Some(LinkRef::Path("/usr/lib/libz.so".into()))
        );
        assert_eq!(
            LinkRef::parse("libfoo.a"),
            Some(LinkRef::Path("libfoo.a".into()))
        );
        assert_eq!(
            LinkRef::parse("libssl.so.3"),
            Some(LinkRef::Path("libssl.so.3".into()))
        );
        assert_eq!(
            LinkRef::parse("-pthread"),
            Some(LinkRef::Flag("-pthread".into()))
        );
        assert_eq!(LinkRef::parse("  "), None);
    }

    #[test]
    fn test_token_display_is_stable() {
        for token in ["-lfoo", "ZLIB::ZLIB", "/usr/lib/libz.so", "-Wl,--as-needed"] {
            let link = LinkRef::parse(token).unwrap();
            assert_eq!(link.to_string(), token);
        }
    }

    #[test]
    fn test_module_name() {
        let link = LinkRef::target("PkgConfig::LIBXML");
        assert_eq!(link.module_name(), Some("LIBXML"));
        assert_eq!(LinkRef::target("ZLIB::ZLIB").module_name(), None);
        assert_eq!(LinkRef::Name("m".into()).module_name(), None);
    }

    #[test]
    fn test_to_flags() {
        assert_eq!(LinkRef::Name("m".into()).to_flags(), vec!["-lm"]);
        assert!(LinkRef::target("a::b").to_flags().is_empty());
        assert_eq!(
            LinkRef::parse("-framework CoreFoundation").unwrap().to_flags(),
            vec!["-framework", "CoreFoundation"]
        );
    }
}
