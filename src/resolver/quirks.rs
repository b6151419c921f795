//! Per-package remediations for upstreams with inconsistent target naming.
//!
//! Quirks are data: each entry lists the spellings upstream has used for its
//! targets, the canonical aliases consumers expect, and an optional
//! last-resort placeholder at the conventional install location.

use std::path::Path;

use crate::core::linkage::LinkageStyle;
use crate::core::registry::TargetRegistry;
use crate::core::target::{LinkRef, TargetDescriptor};

/// Placeholder used when nothing else finds the package.
#[derive(Debug, Clone, Copy)]
pub struct Fallback {
    /// Placeholder target name
    pub target: &'static str,
    /// Include directory under the install prefix
    pub include_dir: &'static str,
    /// Link name of the library under `<prefix>/lib`
    pub library: &'static str,
}

/// One package's remediation steps.
#[derive(Debug, Clone, Copy)]
pub struct Quirk {
    pub package: &'static str,
    /// Other names that refer to the same package
    pub synonyms: &'static [&'static str],
    /// Aliases that must exist once the package is found
    pub canonical: &'static [&'static str],
    /// Upstream target spellings, most preferred first
    pub alias_candidates: &'static [&'static str],
    pub fallback: Option<Fallback>,
}

/// Built-in quirk entries.
pub const BUILTIN_QUIRKS: &[Quirk] = &[Quirk {
    package: "libjwt",
    synonyms: &["jwt"],
    canonical: &["libjwt::libjwt", "jwt::jwt"],
    alias_candidates: &[
        "libjwt::libjwt",
        "LibJWT::LibJWT",
        "jwt::jwt",
        "libjwt::jwt",
        "libjwt::jwt_static",
        "PkgConfig::JWT",
        "PkgConfig::LIBJWT",
    ],
    fallback: Some(Fallback {
        target: "libjwt::libjwt",
        include_dir: "include",
        library: "jwt",
    }),
}];

impl Quirk {
    /// Whether this entry covers a requested package name.
    pub fn matches(&self, name: &str) -> bool {
        self.package.eq_ignore_ascii_case(name)
            || self.synonyms.iter().any(|s| s.eq_ignore_ascii_case(name))
    }

    /// Point every missing canonical alias at the first existing upstream
    /// spelling. Returns the aliases created.
    pub fn remediate_aliases(&self, registry: &mut TargetRegistry) -> Vec<String> {
        let Some(upstream) = self
            .alias_candidates
            .iter()
            .find(|candidate| registry.contains(candidate))
        else {
            return Vec::new();
        };

        self.canonical
            .iter()
            .filter(|alias| registry.add_alias(**alias, upstream))
            .map(|alias| alias.to_string())
            .collect()
    }

    /// Placeholder at the conventional install path.
    pub fn fallback_target(&self, install_prefix: &Path, linkage: LinkageStyle) -> Option<TargetDescriptor> {
        let fallback = self.fallback?;
        let library = install_prefix
            .join("lib")
            .join(linkage.artifact_file_name(fallback.library));

        Some(TargetDescriptor::synthesized(
            fallback.target,
            vec![install_prefix.join(fallback.include_dir)],
            vec![LinkRef::Path(library)],
        ))
    }
}

/// Lookup table over quirk entries.
#[derive(Debug, Clone)]
pub struct Quirks {
    entries: Vec<Quirk>,
}

impl Quirks {
    pub fn new(entries: Vec<Quirk>) -> Self {
        Quirks { entries }
    }

    /// The built-in table.
    pub fn builtin() -> Self {
        Quirks::new(BUILTIN_QUIRKS.to_vec())
    }

    /// A table with no entries.
    pub fn none() -> Self {
        Quirks::new(Vec::new())
    }

    pub fn lookup(&self, name: &str) -> Option<&Quirk> {
        self.entries.iter().find(|q| q.matches(name))
    }
}

impl Default for Quirks {
    fn default() -> Self {
        Quirks::builtin()
    }
}
