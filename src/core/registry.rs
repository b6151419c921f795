//! Target registry - the typed namespace of known targets and aliases.
//!
//! The registry only grows during a run: targets and aliases are inserted
//! at most once and never replaced or removed.

use std::collections::{BTreeMap, BTreeSet};

use crate::core::target::TargetDescriptor;

/// A point-in-time view of which names exist, used to diff discovery results.
#[derive(Debug, Clone, Default)]
pub struct RegistrySnapshot {
    names: BTreeSet<String>,
}

/// All targets and aliases visible in the current configuration scope.
#[derive(Debug, Clone, Default)]
pub struct TargetRegistry {
    targets: BTreeMap<String, TargetDescriptor>,
    aliases: BTreeMap<String, String>,
}

impl TargetRegistry {
    pub fn new() -> Self {
        TargetRegistry::default()
    }

    /// Check whether a target or alias with this name exists.
    pub fn contains(&self, name: &str) -> bool {
        self.targets.contains_key(name) || self.aliases.contains_key(name)
    }

    /// Look up a target, following aliases.
    pub fn get(&self, name: &str) -> Option<&TargetDescriptor> {
        match self.targets.get(name) {
            Some(target) => Some(target),
            None => self
                .aliases
                .get(name)
                .and_then(|real| self.targets.get(real)),
        }
    }

    /// Resolve an alias to the real target name.
    pub fn alias_target(&self, alias: &str) -> Option<&str> {
        self.aliases.get(alias).map(String::as_str)
    }

    /// Insert a target unless the name is already taken.
    ///
    /// Returns `true` if the target was inserted.
    pub fn insert_if_absent(&mut self, target: TargetDescriptor) -> bool {
        if self.contains(&target.name) {
            tracing::debug!("target `{}` already exists, keeping original", target.name);
            return false;
        }
        self.targets.insert(target.name.clone(), target);
        true
    }

    /// Bind `alias` to an existing target.
    ///
    /// No-op (returns `false`) if the alias name is taken or the target is
    /// unknown. Aliases of aliases are flattened to the real target.
    pub fn add_alias(&mut self, alias: impl Into<String>, target: &str) -> bool {
        let alias = alias.into();
        if self.contains(&alias) {
            return false;
        }

        let real = match self.aliases.get(target) {
            Some(real) => real.clone(),
            None if self.targets.contains_key(target) => target.to_string(),
            None => return false,
        };

        tracing::debug!("aliasing `{}` -> `{}`", alias, real);
        self.aliases.insert(alias, real);
        true
    }

    /// Mutable access for link-interface edits on a real (non-alias) target.
    pub(crate) fn get_mut(&mut self, name: &str) -> Option<&mut TargetDescriptor> {
        self.targets.get_mut(name)
    }

    /// Record the names currently visible.
    pub fn snapshot(&self) -> RegistrySnapshot {
        RegistrySnapshot {
            names: self
                .targets
                .keys()
                .chain(self.aliases.keys())
                .cloned()
                .collect(),
        }
    }

    /// Real targets that appeared after `snapshot` was taken, sorted by name.
    pub fn introduced_since(&self, snapshot: &RegistrySnapshot) -> Vec<String> {
        self.targets
            .keys()
            .filter(|name| !snapshot.names.contains(*name))
            .cloned()
            .collect()
    }

    /// Iterate all real targets.
    pub fn targets(&self) -> impl Iterator<Item = &TargetDescriptor> {
        self.targets.values()
    }

    /// Iterate all aliases as `(alias, target)`.
    pub fn aliases(&self) -> impl Iterator<Item = (&str, &str)> {
        self.aliases.iter().map(|(a, t)| (a.as_str(), t.as_str()))
    }

    pub fn len(&self) -> usize {
        self.targets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }
}
