//! Package names and the target spellings derived from them.
//!
//! A package name is either a bare identifier (`zlib`) or a fully-qualified
//! target reference (`ZLIB::ZLIB`). Qualified names are treated as precise:
//! they are only ever looked up literally.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::core::linkage::LinkageStyle;
use crate::resolver::errors::ResolveError;

/// Namespace separator used by target references.
pub const NAMESPACE_SEP: &str = "::";

/// A validated, optionally namespaced package name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PackageName {
    raw: String,
}

impl PackageName {
    /// Parse and validate a package name.
    pub fn new(raw: impl Into<String>) -> Result<Self, ResolveError> {
        let raw = raw.into();
        let trimmed = raw.trim();

        if trimmed.is_empty() {
            return Err(ResolveError::InvalidName {
                name: raw,
                reason: "name is empty".to_string(),
            });
        }
        if trimmed.chars().any(char::is_whitespace) {
            return Err(ResolveError::InvalidName {
                name: raw,
                reason: "name contains whitespace".to_string(),
            });
        }

        let relative = trimmed.split(NAMESPACE_SEP).any(|p| p == "." || p == "..");
        if relative || trimmed.contains(['/', '\\']) {
            return Err(ResolveError::InvalidName {
                name: raw,
                reason: "name contains a path separator or relative path".to_string(),
            });
        }

        if trimmed.contains(NAMESPACE_SEP) {
            let parts: Vec<&str> = trimmed.split(NAMESPACE_SEP).collect();
            if parts.len() != 2 || parts.iter().any(|p| p.is_empty()) {
                return Err(ResolveError::InvalidName {
                    name: raw,
                    reason: "qualified names must have the form `prefix::suffix`".to_string(),
                });
            }
        }

        Ok(PackageName {
            raw: trimmed.to_string(),
        })
    }

    /// The name exactly as requested.
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Whether the name is a fully-qualified `prefix::suffix` reference.
    pub fn is_qualified(&self) -> bool {
        self.raw.contains(NAMESPACE_SEP)
    }

    /// The namespace part of a qualified name, or the whole name otherwise.
    pub fn namespace(&self) -> &str {
        match self.raw.split_once(NAMESPACE_SEP) {
            Some((ns, _)) => ns,
            None => &self.raw,
        }
    }

    /// Lowercase `name::name` spelling used for auto-aliases and placeholders.
    pub fn canonical_target(&self) -> String {
        let base = self.namespace().to_lowercase();
        format!("{base}{NAMESPACE_SEP}{base}")
    }

    /// Upper-cased form, used for found flags and scope variables.
    pub fn upper(&self) -> String {
        self.raw.to_uppercase().replace(NAMESPACE_SEP, "_")
    }

    /// Keys under which a found flag is recorded: exact case, then upper case.
    pub fn flag_keys(&self) -> Vec<String> {
        let mut keys = vec![self.raw.clone()];
        let upper = self.upper();
        if upper != self.raw {
            keys.push(upper);
        }
        keys
    }

    /// Conventional target spellings checked by the fast path.
    ///
    /// A qualified name only has its literal spelling. For bare names the
    /// variant matching `linkage` is tried before the other two.
    pub fn spellings(&self, linkage: LinkageStyle) -> Vec<String> {
        if self.is_qualified() {
            return vec![self.raw.clone()];
        }

        let mut out = vec![self.raw.clone(), self.canonical_target()];
        let mut variants = vec![linkage];
        variants.extend(LinkageStyle::ALL.iter().copied().filter(|v| *v != linkage));
        for variant in variants {
            out.push(format!("{}{}{}", self.raw, NAMESPACE_SEP, variant.as_str()));
        }
        out.dedup();
        out
    }

    /// Whether `target` falls under this name's `name::*` namespace.
    ///
    /// Namespaces are compared case-insensitively so `ZLIB::ZLIB` matches
    /// a request for `zlib`.
    pub fn owns_target(&self, target: &str) -> bool {
        match target.split_once(NAMESPACE_SEP) {
            Some((ns, rest)) => !rest.is_empty() && ns.eq_ignore_ascii_case(self.namespace()),
            None => false,
        }
    }
}

impl fmt::Display for PackageName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

impl FromStr for PackageName {
    type Err = ResolveError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PackageName::new(s)
    }
}

impl TryFrom<String> for PackageName {
    type Error = ResolveError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        PackageName::new(value)
    }
}

impl From<PackageName> for String {
    fn from(name: PackageName) -> Self {
        name.raw
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bare_name() {
        let name = PackageName::new("zlib").unwrap();
        assert!(!name.is_qualified());
        assert_eq!(name.namespace(), "zlib");
        assert_eq!(name.canonical_target(), "zlib::zlib");
        assert_eq!(name.flag_keys(), vec!["zlib", "ZLIB"]);
    }

    #[test]
    fn test_qualified_name() {
        let name = PackageName::new("OpenSSL::Crypto").unwrap();
        assert!(name.is_qualified());
        assert_eq!(name.namespace(), "OpenSSL");
        assert_eq!(name.spellings(LinkageStyle::Static), vec!["OpenSSL::Crypto"]);
        assert_eq!(name.upper(), "OPENSSL_CRYPTO");
    }

    #[test]
    fn test_invalid_names() {
        assert!(PackageName::new("").is_err());
        assert!(PackageName::new("   ").is_err());
        assert!(PackageName::new("a b").is_err());
        assert!(PackageName::new("::x").is_err());
        assert!(PackageName::new("x::").is_err());
        assert!(PackageName::new("a::b::c").is_err());
        assert!(PackageName::new("../../etc").is_err());
        assert!(PackageName::new("a/b").is_err());
        assert!(PackageName::new("a\\b").is_err());
        assert!(PackageName::new("..").is_err());
        assert!(PackageName::new("..::x").is_err());
        assert!(PackageName::new("glib-2.0").is_ok());
    }

    #[test]
    fn test_spellings_prefer_linkage() {
        let name = PackageName::new("foo").unwrap();
        assert_eq!(
            name.spellings(LinkageStyle::Shared),
            vec![
                "foo",
                "foo::foo",
                "foo::shared",
                "foo::static",
                "foo::debug"
            ]
        );
    }

    #[test]
    fn test_upper_keys_deduplicate() {
        let name = PackageName::new("ZLIB").unwrap();
        assert_eq!(name.flag_keys(), vec!["ZLIB"]);
    }

    #[test]
    fn test_owns_target() {
        let name = PackageName::new("zlib").unwrap();
        assert!(name.owns_target("ZLIB::ZLIB"));
        assert!(name.owns_target("zlib::static"));
        assert!(!name.owns_target("zlibx::zlib"));
        assert!(!name.owns_target("zlib"));
    }
}
