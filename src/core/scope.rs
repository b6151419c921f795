//! Run-scoped resolution state.
//!
//! A [`Scope`] is the explicit replacement for ambient configuration state:
//! the target registry, found flags, cached search variables and the memo of
//! which strategy tiers have already been tried for which names. One scope
//! lives for one configuration run and is passed by `&mut` to everything
//! that resolves packages.

use std::collections::{BTreeMap, HashSet};

use serde::Serialize;

use crate::core::name::PackageName;
use crate::core::registry::TargetRegistry;
use crate::resolver::strategy::StrategyKind;
use crate::resolver::Resolution;

/// Name-keyed "found" markers. Set once, never retracted.
#[derive(Debug, Clone, Default, Serialize)]
pub struct FoundFlags {
    flags: BTreeMap<String, bool>,
}

impl FoundFlags {
    /// Mark a package found under its exact and upper-case keys.
    pub fn mark_found(&mut self, name: &PackageName) {
        for key in name.flag_keys() {
            self.flags.insert(key, true);
        }
    }

    /// Record a miss, unless the key is already marked found.
    pub fn mark_missing(&mut self, name: &PackageName) {
        for key in name.flag_keys() {
            self.flags.entry(key).or_insert(false);
        }
    }

    /// Whether `<key>_FOUND` would be true.
    pub fn is_found(&self, key: &str) -> bool {
        self.flags.get(key).copied().unwrap_or(false)
    }

    /// Render as `KEY_FOUND` entries.
    pub fn iter(&self) -> impl Iterator<Item = (String, bool)> + '_ {
        self.flags.iter().map(|(k, v)| (format!("{k}_FOUND"), *v))
    }
}

/// Cached search results such as `JANSSON_INCLUDE_DIRS`.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ScopeVars {
    vars: BTreeMap<String, Vec<String>>,
}

impl ScopeVars {
    pub fn set(&mut self, key: impl Into<String>, values: Vec<String>) {
        self.vars.insert(key.into(), values);
    }

    pub fn get(&self, key: &str) -> Option<&[String]> {
        self.vars.get(key).map(Vec::as_slice)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.vars.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }
}

/// Mutable state shared by every resolution in a run.
#[derive(Debug, Default)]
pub struct Scope {
    pub registry: TargetRegistry,
    pub flags: FoundFlags,
    pub vars: ScopeVars,
    attempted: HashSet<(StrategyKind, String)>,
    resolutions: BTreeMap<String, Resolution>,
    in_progress: HashSet<String>,
}

impl Scope {
    pub fn new() -> Self {
        Scope::default()
    }

    /// Claim a strategy tier for a name.
    ///
    /// Returns `false` if the tier already ran for this name in this run.
    pub fn claim_attempt(&mut self, kind: StrategyKind, name: &PackageName) -> bool {
        self.attempted.insert((kind, name.as_str().to_string()))
    }

    /// Whether `<key>_FOUND` is set.
    pub fn is_found(&self, key: &str) -> bool {
        self.flags.is_found(key)
    }

    /// Record the outcome of a resolution.
    pub fn record(&mut self, name: &PackageName, resolution: Resolution) {
        if resolution.is_found() {
            self.flags.mark_found(name);
        } else {
            self.flags.mark_missing(name);
        }
        self.resolutions.insert(name.as_str().to_string(), resolution);
    }

    /// The most recent resolution recorded for a name.
    pub fn resolution(&self, name: &str) -> Option<&Resolution> {
        self.resolutions.get(name)
    }

    /// All recorded resolutions, by requested name.
    pub fn resolutions(&self) -> impl Iterator<Item = (&str, &Resolution)> {
        self.resolutions.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Mark a name as being resolved. Returns `false` on re-entry.
    pub(crate) fn enter(&mut self, name: &PackageName) -> bool {
        self.in_progress.insert(name.as_str().to_string())
    }

    pub(crate) fn leave(&mut self, name: &PackageName) {
        self.in_progress.remove(name.as_str());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flags_record_both_cases() {
        let mut flags = FoundFlags::default();
        flags.mark_found(&PackageName::new("zlib").unwrap());
        assert!(flags.is_found("zlib"));
        assert!(flags.is_found("ZLIB"));
        assert!(!flags.is_found("Zlib"));
    }

    #[test]
    fn test_flags_never_retracted() {
        let mut flags = FoundFlags::default();
        let name = PackageName::new("jansson").unwrap();
        flags.mark_found(&name);
        flags.mark_missing(&name);
        assert!(flags.is_found("JANSSON"));
    }

    #[test]
    fn test_claim_attempt_once() {
        let mut scope = Scope::new();
        let name = PackageName::new("foo").unwrap();
        assert!(scope.claim_attempt(StrategyKind::Module, &name));
        assert!(!scope.claim_attempt(StrategyKind::Module, &name));
        assert!(scope.claim_attempt(StrategyKind::FilesystemScan, &name));
        assert!(!scope.claim_attempt(StrategyKind::FilesystemScan, &name));
    }
}
