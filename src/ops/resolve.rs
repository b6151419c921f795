//! Ad-hoc package resolution.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::Result;
use serde::Serialize;

use crate::core::linkage::LinkageStyle;
use crate::core::name::PackageName;
use crate::core::scope::Scope;
use crate::resolver::{Discovery, Requirement, Resolution, Resolver};
use crate::util::config::{Config, SearchRoots};
use crate::util::{GlobalContext, VcpkgIntegration};

/// Command-line adjustments to the configured search roots.
#[derive(Debug, Clone, Default)]
pub struct SearchOverrides {
    /// Prefixes searched before the configured ones
    pub prefixes: Vec<PathBuf>,
    pub pkg_config_path: Vec<PathBuf>,
    pub install_prefix: Option<PathBuf>,
    pub no_default_paths: bool,
}

impl SearchOverrides {
    pub fn apply(&self, config: &mut Config) {
        let mut prefixes = self.prefixes.clone();
        prefixes.extend(config.search.prefixes.drain(..));
        config.search.prefixes = prefixes;

        let mut pc = self.pkg_config_path.clone();
        pc.extend(config.search.pkg_config_path.drain(..));
        config.search.pkg_config_path = pc;

        if self.install_prefix.is_some() {
            config.search.install_prefix = self.install_prefix.clone();
        }
        if self.no_default_paths {
            config.search.no_default_paths = true;
        }
    }
}

/// Create a resolver over the configured search roots and vcpkg tree.
pub fn build_resolver(config: &Config, linkage: LinkageStyle) -> Resolver {
    let roots = SearchRoots::from_config(&config.search);
    tracing::debug!(
        "search roots: {} prefixes, {} scan dirs, {} pkg-config dirs",
        roots.prefixes.len(),
        roots.scan_dirs.len(),
        roots.pkg_config_dirs.len()
    );

    let mut discovery = Discovery::new(roots, linkage);
    if let Some(vcpkg) = VcpkgIntegration::from_config(&config.vcpkg, linkage == LinkageStyle::Debug) {
        tracing::debug!("using vcpkg at {} ({})", vcpkg.root.display(), vcpkg.triplet);
        discovery = discovery.with_vcpkg(vcpkg);
    }
    Resolver::new(discovery)
}

/// Options for [`resolve_packages`].
#[derive(Debug, Clone)]
pub struct ResolveOptions {
    pub names: Vec<String>,
    pub requirement: Requirement,
    pub linkage: LinkageStyle,
    pub search: SearchOverrides,
}

/// One requested name and its outcome.
#[derive(Debug, Clone, Serialize)]
pub struct PackageReport {
    pub name: String,
    pub resolution: Resolution,
}

/// Result of resolving a list of names.
#[derive(Debug, Clone, Serialize)]
pub struct ResolveReport {
    pub packages: Vec<PackageReport>,
    /// `<NAME>_FOUND` flags for every name touched, including forwarded dependencies
    pub found: BTreeMap<String, bool>,
    pub variables: BTreeMap<String, Vec<String>>,
}

impl ResolveReport {
    /// Build a report from a scope for the requested names.
    pub fn from_scope<'a>(scope: &Scope, names: impl IntoIterator<Item = &'a PackageName>) -> Self {
        let packages = names
            .into_iter()
            .filter_map(|name| {
                scope.resolution(name.as_str()).map(|resolution| PackageReport {
                    name: name.to_string(),
                    resolution: resolution.clone(),
                })
            })
            .collect();

        ResolveReport {
            packages,
            found: scope.flags.iter().collect(),
            variables: scope
                .vars
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_vec()))
                .collect(),
        }
    }
}

/// Project root for config lookup: the manifest's directory, else the cwd.
pub fn project_root(ctx: &GlobalContext) -> PathBuf {
    ctx.find_manifest(None)
        .ok()
        .and_then(|m| m.parent().map(Path::to_path_buf))
        .unwrap_or_else(|| ctx.cwd().to_path_buf())
}

/// Resolve each name in order within one scope.
pub fn resolve_packages(ctx: &GlobalContext, opts: &ResolveOptions) -> Result<ResolveReport> {
    let mut config = ctx.load_config(&project_root(ctx));
    opts.search.apply(&mut config);

    let resolver = build_resolver(&config, opts.linkage);
    let names = opts
        .names
        .iter()
        .map(PackageName::new)
        .collect::<Result<Vec<_>, _>>()?;

    let mut scope = Scope::new();
    for name in &names {
        resolver.resolve(&mut scope, name, opts.requirement)?;
    }

    Ok(ResolveReport::from_scope(&scope, &names))
}
