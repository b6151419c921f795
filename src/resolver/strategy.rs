//! The resolution strategies, in chain order.

use std::fmt;
use std::path::PathBuf;

use serde::Serialize;

use crate::core::name::PackageName;
use crate::core::scope::Scope;
use crate::core::target::{LinkRef, TargetDescriptor};
use crate::resolver::errors::ResolveError;
use crate::resolver::libtoken;
use crate::resolver::{Discovery, Found};
use crate::sources::package_config::PackageConfig;
use crate::sources::source::ModuleInfo;

/// Identifies a strategy tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum StrategyKind {
    FastPath,
    QualifiedLiteral,
    PackageManager,
    Module,
    FilesystemScan,
    Quirk,
}

impl StrategyKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            StrategyKind::FastPath => "fast-path",
            StrategyKind::QualifiedLiteral => "qualified-literal",
            StrategyKind::PackageManager => "package-manager",
            StrategyKind::Module => "module",
            StrategyKind::FilesystemScan => "filesystem-scan",
            StrategyKind::Quirk => "quirk",
        }
    }
}

impl fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One tier of the resolution chain.
pub trait Strategy {
    fn kind(&self) -> StrategyKind;

    /// Whether the tier runs at all for this name.
    fn applies_to(&self, name: &PackageName, discovery: &Discovery) -> bool;

    /// Try to resolve `name`. `Ok(None)` passes to the next tier.
    fn attempt(
        &self,
        name: &PackageName,
        scope: &mut Scope,
        discovery: &Discovery,
    ) -> Result<Option<Found>, ResolveError>;
}

/// The standard chain.
pub fn default_chain() -> Vec<Box<dyn Strategy>> {
    vec![
        Box::new(FastPath),
        Box::new(QualifiedLiteral),
        Box::new(PackageManagerSearch),
        Box::new(ModuleSearch),
        Box::new(FilesystemScan),
        Box::new(QuirkFallback),
    ]
}

/// Reuse a target that already exists under a conventional spelling.
pub struct FastPath;

impl Strategy for FastPath {
    fn kind(&self) -> StrategyKind {
        StrategyKind::FastPath
    }

    fn applies_to(&self, _name: &PackageName, _discovery: &Discovery) -> bool {
        true
    }

    fn attempt(
        &self,
        name: &PackageName,
        scope: &mut Scope,
        discovery: &Discovery,
    ) -> Result<Option<Found>, ResolveError> {
        Ok(existing_spelling(name, scope, discovery)
            .map(|target| Found::from_target(self.kind(), &scope.registry, &target)))
    }
}

/// Look up a `pkg::tgt` name by searching for `pkg` and checking the literal target.
pub struct QualifiedLiteral;

impl Strategy for QualifiedLiteral {
    fn kind(&self) -> StrategyKind {
        StrategyKind::QualifiedLiteral
    }

    fn applies_to(&self, name: &PackageName, _discovery: &Discovery) -> bool {
        name.is_qualified()
    }

    fn attempt(
        &self,
        name: &PackageName,
        scope: &mut Scope,
        discovery: &Discovery,
    ) -> Result<Option<Found>, ResolveError> {
        let package = name.namespace();
        let mut introduced = Vec::new();
        let mut forwarded = Vec::new();

        for pm in &discovery.package_managers {
            let config = pm.find(package).map_err(|e| discovery_error(pm.name(), package, e))?;
            let Some(config) = config else {
                continue;
            };
            extend_unique(&mut introduced, include_config(scope, discovery, &config));
            forwarded.extend(config.dependencies().iter().cloned());
            if scope.registry.contains(name.as_str()) {
                return Ok(Some(literal_found(self.kind(), name, scope, introduced, forwarded)));
            }
        }

        for path in discovery.scanner.candidates(package) {
            let Some(config) = load_scanned(&path) else {
                continue;
            };
            extend_unique(&mut introduced, include_config(scope, discovery, &config));
            forwarded.extend(config.dependencies().iter().cloned());
            if scope.registry.contains(name.as_str()) {
                return Ok(Some(literal_found(self.kind(), name, scope, introduced, forwarded)));
            }
        }

        Ok(None)
    }
}

fn extend_unique(list: &mut Vec<String>, items: Vec<String>) {
    for item in items {
        if !list.contains(&item) {
            list.push(item);
        }
    }
}

fn literal_found(
    kind: StrategyKind,
    name: &PackageName,
    scope: &Scope,
    introduced: Vec<String>,
    forwarded: Vec<PackageName>,
) -> Found {
    let mut found = Found::from_target(kind, &scope.registry, name.as_str());
    found.introduced = introduced;
    found.forwarded = forwarded;
    found
}

/// Native package discovery with auto-aliasing.
pub struct PackageManagerSearch;

impl Strategy for PackageManagerSearch {
    fn kind(&self) -> StrategyKind {
        StrategyKind::PackageManager
    }

    fn applies_to(&self, name: &PackageName, _discovery: &Discovery) -> bool {
        !name.is_qualified()
    }

    fn attempt(
        &self,
        name: &PackageName,
        scope: &mut Scope,
        discovery: &Discovery,
    ) -> Result<Option<Found>, ResolveError> {
        for pm in &discovery.package_managers {
            let config = pm
                .find(name.as_str())
                .map_err(|e| discovery_error(pm.name(), name.as_str(), e))?;
            let Some(config) = config else {
                tracing::debug!("{} does not know `{}`", pm.name(), name);
                continue;
            };

            tracing::debug!("{} found `{}` at {}", pm.name(), name, config.path.display());
            return Ok(Some(adopt_config(self.kind(), name, scope, discovery, &config)));
        }
        Ok(None)
    }
}

/// Module-description discovery, synthesizing a placeholder target.
pub struct ModuleSearch;

impl Strategy for ModuleSearch {
    fn kind(&self) -> StrategyKind {
        StrategyKind::Module
    }

    fn applies_to(&self, name: &PackageName, _discovery: &Discovery) -> bool {
        !name.is_qualified()
    }

    fn attempt(
        &self,
        name: &PackageName,
        scope: &mut Scope,
        discovery: &Discovery,
    ) -> Result<Option<Found>, ResolveError> {
        let Some(info) = probe_module(discovery, name.as_str()) else {
            return Ok(None);
        };
        if info.is_empty() {
            tracing::warn!(
                "module `{}` has no include directories or libraries, creating an empty target",
                name
            );
        }

        let upper = name.upper();
        let (include_dirs, libraries) = module_usage(discovery, &info);
        set_module_vars(scope, &upper, &info, &include_dirs, &libraries);

        let target = name.canonical_target();
        let mut introduced = Vec::new();
        if scope.registry.insert_if_absent(TargetDescriptor::synthesized(
            target.clone(),
            include_dirs.clone(),
            libraries.clone(),
        )) {
            introduced.push(target.clone());
        }

        Ok(Some(Found {
            strategy: self.kind(),
            target: Some(target),
            introduced,
            include_dirs,
            libraries,
            version: info.version,
            synthesized: true,
            forwarded: Vec::new(),
        }))
    }
}

/// Heuristic scan of conventional locations for `name*` config files.
pub struct FilesystemScan;

impl Strategy for FilesystemScan {
    fn kind(&self) -> StrategyKind {
        StrategyKind::FilesystemScan
    }

    fn applies_to(&self, name: &PackageName, _discovery: &Discovery) -> bool {
        !name.is_qualified()
    }

    fn attempt(
        &self,
        name: &PackageName,
        scope: &mut Scope,
        discovery: &Discovery,
    ) -> Result<Option<Found>, ResolveError> {
        let mut introduced = Vec::new();

        for path in discovery.scanner.candidates(name.as_str()) {
            let Some(config) = load_scanned(&path) else {
                continue;
            };
            tracing::debug!("including scanned config {}", path.display());

            let mut found = adopt_config(self.kind(), name, scope, discovery, &config);
            extend_unique(&mut introduced, std::mem::take(&mut found.introduced));
            if found.target.is_some() {
                found.introduced = introduced;
                return Ok(Some(found));
            }
        }

        Ok(None)
    }
}

/// Last-resort placeholder for packages with a known quirk.
pub struct QuirkFallback;

impl Strategy for QuirkFallback {
    fn kind(&self) -> StrategyKind {
        StrategyKind::Quirk
    }

    fn applies_to(&self, name: &PackageName, discovery: &Discovery) -> bool {
        !name.is_qualified()
            && discovery
                .quirks
                .lookup(name.as_str())
                .is_some_and(|q| q.fallback.is_some())
    }

    fn attempt(
        &self,
        name: &PackageName,
        scope: &mut Scope,
        discovery: &Discovery,
    ) -> Result<Option<Found>, ResolveError> {
        let Some(quirk) = discovery.quirks.lookup(name.as_str()) else {
            return Ok(None);
        };

        // Upstream may already be present under an odd spelling
        quirk.remediate_aliases(&mut scope.registry);
        if let Some(alias) = quirk.canonical.iter().find(|a| scope.registry.contains(a)) {
            return Ok(Some(Found::from_target(self.kind(), &scope.registry, alias)));
        }

        let Some(target) = quirk.fallback_target(&discovery.roots.install_prefix, discovery.linkage)
        else {
            return Ok(None);
        };

        tracing::warn!(
            "using placeholder `{}` for `{}` at {}",
            target.name,
            name,
            discovery.roots.install_prefix.display()
        );

        let target_name = target.name.clone();
        let include_dirs = target.include_dirs.clone();
        let libraries = target.link.clone();
        let mut introduced = Vec::new();
        if scope.registry.insert_if_absent(target) {
            introduced.push(target_name.clone());
        }

        Ok(Some(Found {
            strategy: self.kind(),
            target: Some(target_name),
            introduced,
            include_dirs,
            libraries,
            version: None,
            synthesized: true,
            forwarded: Vec::new(),
        }))
    }
}

/// First conventional spelling of `name` present in the scope.
fn existing_spelling(name: &PackageName, scope: &Scope, discovery: &Discovery) -> Option<String> {
    name.spellings(discovery.linkage)
        .into_iter()
        .find(|spelling| scope.registry.contains(spelling))
}

/// Register a config's targets and aliases.
///
/// Returns the config's targets present in the registry, whether this call
/// added them or an earlier inclusion of the same config did. Module
/// references are only resolved for targets added now.
fn include_config(scope: &mut Scope, discovery: &Discovery, config: &PackageConfig) -> Vec<String> {
    let snapshot = scope.registry.snapshot();

    for descriptor in config.descriptors() {
        scope.registry.insert_if_absent(descriptor);
    }
    for (alias, target) in config.aliases() {
        if !scope.registry.add_alias(alias, target) {
            tracing::debug!("alias `{}` -> `{}` not added", alias, target);
        }
    }

    let added = scope.registry.introduced_since(&snapshot);
    resolve_module_refs(scope, discovery, &added);

    config
        .file
        .targets
        .iter()
        .map(|t| t.name.clone())
        .filter(|t| scope.registry.contains(t))
        .collect()
}

/// Include a discovered config, auto-alias and pick the canonical target.
fn adopt_config(
    kind: StrategyKind,
    name: &PackageName,
    scope: &mut Scope,
    discovery: &Discovery,
    config: &PackageConfig,
) -> Found {
    let introduced = include_config(scope, discovery, config);
    auto_alias(name, scope, &introduced);

    let mut found = match existing_spelling(name, scope, discovery) {
        Some(target) => Found::from_target(kind, &scope.registry, &target),
        None => Found::untargeted(kind),
    };
    found.introduced = introduced;
    found.version = config.version.as_ref().map(|v| v.version.to_string());
    found.forwarded = config.dependencies().to_vec();
    found
}

/// Alias `name::name` when exactly one of the config's targets sits in the `name::*` namespace.
fn auto_alias(name: &PackageName, scope: &mut Scope, provided: &[String]) {
    let alias = name.canonical_target();
    if scope.registry.contains(&alias) {
        return;
    }

    let matching: Vec<&String> = provided.iter().filter(|t| name.owns_target(t)).collect();
    match matching.as_slice() {
        [only] => {
            if scope.registry.add_alias(alias.clone(), only) {
                tracing::debug!("auto-aliased `{}` -> `{}`", alias, only);
            }
        }
        [] => {}
        many => tracing::debug!(
            "not aliasing `{}`: {} candidate targets",
            alias,
            many.len()
        ),
    }
}

/// Synthesize or prune `PkgConfig::NAME` references in newly added targets.
fn resolve_module_refs(scope: &mut Scope, discovery: &Discovery, introduced: &[String]) {
    for target_name in introduced {
        let refs: Vec<LinkRef> = match scope.registry.get(target_name) {
            Some(target) => target.module_refs().cloned().collect(),
            None => continue,
        };

        for link in refs {
            let (Some(reference), Some(module)) = (link.as_target(), link.module_name()) else {
                continue;
            };
            if scope.registry.contains(reference) {
                continue;
            }

            match probe_module(discovery, module) {
                Some(info) => {
                    let (include_dirs, libraries) = module_usage(discovery, &info);
                    if let Ok(name) = PackageName::new(module) {
                        set_module_vars(scope, &name.upper(), &info, &include_dirs, &libraries);
                        scope.flags.mark_found(&name);
                    }
                    tracing::debug!("synthesized `{}` for `{}`", reference, target_name);
                    scope.registry.insert_if_absent(TargetDescriptor::synthesized(
                        reference,
                        include_dirs,
                        libraries,
                    ));
                }
                None => {
                    tracing::warn!(
                        "`{}` links `{}`, but module `{}` was not found; dropping the reference",
                        target_name,
                        reference,
                        module
                    );
                    if let Some(target) = scope.registry.get_mut(target_name) {
                        target.link.retain(|l| *l != link);
                    }
                }
            }
        }
    }
}

/// Probe the module provider, treating read errors as a miss.
fn probe_module(discovery: &Discovery, module: &str) -> Option<ModuleInfo> {
    let lower = module.to_lowercase();
    let mut names = vec![module];
    if lower != module {
        names.push(&lower);
    }

    for candidate in names {
        match discovery.modules.probe(candidate) {
            Ok(Some(info)) => return Some(info),
            Ok(None) => {}
            Err(e) => {
                tracing::warn!("{} probe for `{}` failed: {:#}", discovery.modules.name(), candidate, e);
            }
        }
    }
    None
}

/// Include directories and resolved libraries for a module.
fn module_usage(discovery: &Discovery, info: &ModuleInfo) -> (Vec<PathBuf>, Vec<LinkRef>) {
    let dirs = discovery.lib_search_dirs(&info.lib_dirs);
    let libraries = libtoken::resolve_tokens(info.libs.iter().map(String::as_str), &dirs, discovery.linkage);
    (info.include_dirs.clone(), libraries)
}

fn set_module_vars(
    scope: &mut Scope,
    upper: &str,
    info: &ModuleInfo,
    include_dirs: &[PathBuf],
    libraries: &[LinkRef],
) {
    scope.vars.set(
        format!("{upper}_INCLUDE_DIRS"),
        include_dirs.iter().map(|d| d.display().to_string()).collect(),
    );
    scope.vars.set(
        format!("{upper}_LIBRARIES"),
        libraries.iter().map(LinkRef::to_string).collect(),
    );
    scope.vars.set(
        format!("{upper}_LIBRARY_DIRS"),
        info.lib_dirs.iter().map(|d| d.display().to_string()).collect(),
    );
    if let Some(version) = &info.version {
        scope.vars.set(format!("{upper}_VERSION"), vec![version.clone()]);
    }
}

/// Load a config found by the scan; unreadable files are skipped.
fn load_scanned(path: &std::path::Path) -> Option<PackageConfig> {
    match PackageConfig::load(path) {
        Ok(config) => Some(config),
        Err(e) => {
            tracing::warn!("skipping {}: {:#}", path.display(), e);
            None
        }
    }
}

fn discovery_error(source: &str, package: &str, err: anyhow::Error) -> ResolveError {
    ResolveError::Discovery {
        source_name: source.to_string(),
        package: package.to_string(),
        message: format!("{:#}", err),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_names() {
        assert_eq!(StrategyKind::FastPath.to_string(), "fast-path");
        assert_eq!(StrategyKind::FilesystemScan.as_str(), "filesystem-scan");
        assert_eq!(
            serde_json::to_string(&StrategyKind::PackageManager).unwrap(),
            "\"package-manager\""
        );
    }

    #[test]
    fn test_default_chain_order() {
        let kinds: Vec<_> = default_chain().iter().map(|s| s.kind()).collect();
        assert_eq!(
            kinds,
            vec![
                StrategyKind::FastPath,
                StrategyKind::QualifiedLiteral,
                StrategyKind::PackageManager,
                StrategyKind::Module,
                StrategyKind::FilesystemScan,
                StrategyKind::Quirk,
            ]
        );
    }
}
