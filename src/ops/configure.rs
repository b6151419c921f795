//! Configuration runs over a project manifest.
//!
//! A configure run evaluates build options, resolves every declared
//! dependency (custom packages first, then third-party) as required, and
//! computes a link plan for each manifest target. Test targets are skipped
//! when the `testing` option is off. The run's outcome is
//! written to `.lookout/resolution.json`.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Serialize;

use crate::core::manifest::{Manifest, TargetSpec, TargetSpecKind};
use crate::core::name::PackageName;
use crate::core::registry::TargetRegistry;
use crate::core::scope::Scope;
use crate::core::target::LinkRef;
use crate::ops::options::{BuildOption, BuildOptions, EffectiveOptions, ToolProbe};
use crate::ops::resolve::{build_resolver, ResolveReport, SearchOverrides};
use crate::resolver::{Requirement, Resolution};
use crate::util::context::PROJECT_DIR;
use crate::util::GlobalContext;

/// File the resolution report is written to, under the project directory.
pub const REPORT_FILE: &str = "resolution.json";

/// Options for [`configure`].
#[derive(Debug, Clone, Default)]
pub struct ConfigureOptions {
    /// Explicit manifest path (searched upward from the cwd otherwise)
    pub manifest_path: Option<PathBuf>,
    pub enable: Vec<BuildOption>,
    pub disable: Vec<BuildOption>,
    pub search: SearchOverrides,
    /// Skip writing `.lookout/resolution.json`
    pub no_report: bool,
}

/// Include directories and link items for one manifest target.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LinkPlan {
    pub target: String,
    pub kind: TargetSpecKind,
    /// Target sources, `extra-sources` last
    pub sources: Vec<PathBuf>,
    pub include_dirs: Vec<PathBuf>,
    /// Flattened link items; target references are expanded
    pub link: Vec<LinkRef>,
    /// Packages linked through their discovered targets
    pub packages: Vec<String>,
}

impl LinkPlan {
    /// Linker arguments in order.
    pub fn link_flags(&self) -> Vec<String> {
        self.link.iter().flat_map(LinkRef::to_flags).collect()
    }

    fn add_include(&mut self, dir: &Path) {
        if !self.include_dirs.iter().any(|d| d == dir) {
            self.include_dirs.push(dir.to_path_buf());
        }
    }

    fn add_link(&mut self, link: &LinkRef) {
        if !self.link.contains(link) {
            self.link.push(link.clone());
        }
    }
}

/// Outcome of a configure run.
#[derive(Debug, Clone, Serialize)]
pub struct ConfigureResult {
    pub project: String,
    pub version: String,
    pub options: EffectiveOptions,
    #[serde(flatten)]
    pub resolutions: ResolveReport,
    pub link_plans: Vec<LinkPlan>,
    #[serde(skip)]
    pub report_path: Option<PathBuf>,
}

/// Run configuration for the project found from `ctx`.
pub fn configure(
    ctx: &GlobalContext,
    opts: &ConfigureOptions,
    probe: &dyn ToolProbe,
) -> Result<ConfigureResult> {
    let manifest_path = ctx.find_manifest(opts.manifest_path.as_deref())?;
    let root = manifest_path
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_else(|| ctx.cwd().to_path_buf());
    let manifest = Manifest::load(&manifest_path)?;

    let mut options = BuildOptions::from_table(&manifest.options);
    options.apply_overrides(&opts.enable, &opts.disable);
    let options = options.evaluate(probe);

    let mut config = ctx.load_config(&root);
    opts.search.apply(&mut config);
    let resolver = build_resolver(&config, options.linkage());

    tracing::info!(
        "configuring {} v{} ({} linkage)",
        manifest.project.name,
        manifest.project.version,
        options.linkage()
    );

    let mut scope = Scope::new();
    let names: Vec<PackageName> = manifest.dependencies.all().cloned().collect();
    for name in &names {
        resolver.resolve(&mut scope, name, Requirement::Required)?;
    }

    let testing = options.options.testing;
    let link_plans = manifest
        .targets
        .iter()
        .filter(|target| {
            let keep = testing || target.kind != TargetSpecKind::Test;
            if !keep {
                tracing::debug!("testing is off, skipping test target `{}`", target.name);
            }
            keep
        })
        .map(|target| target_plan(target, &manifest, &scope))
        .collect();

    let mut result = ConfigureResult {
        project: manifest.project.name.clone(),
        version: manifest.project.version.to_string(),
        options,
        resolutions: ResolveReport::from_scope(&scope, &names),
        link_plans,
        report_path: None,
    };

    if !opts.no_report {
        let path = root.join(PROJECT_DIR).join(REPORT_FILE);
        let json = serde_json::to_string_pretty(&result).context("failed to serialize report")?;
        crate::util::fs::write_string(&path, &json)?;
        tracing::debug!("wrote {}", path.display());
        result.report_path = Some(path);
    }

    Ok(result)
}

fn target_plan(target: &TargetSpec, manifest: &Manifest, scope: &Scope) -> LinkPlan {
    let mut plan = link_plan(&target.name, &manifest.links_for(target), scope);
    plan.kind = target.kind;
    plan.sources = target.all_sources().cloned().collect();
    plan
}

/// Compute the link plan for one target from resolved packages.
pub fn link_plan(target: &str, packages: &[PackageName], scope: &Scope) -> LinkPlan {
    let mut plan = LinkPlan {
        target: target.to_string(),
        ..Default::default()
    };
    let mut visited = HashSet::new();

    for package in packages {
        let Some(found) = scope.resolution(package.as_str()).and_then(Resolution::found) else {
            tracing::warn!("`{}` links `{}`, which was not resolved", target, package);
            continue;
        };
        plan.packages.push(package.to_string());

        // Without a canonical target, link everything the package introduced
        let roots: Vec<&str> = match &found.target {
            Some(t) => vec![t.as_str()],
            None => found.introduced.iter().map(String::as_str).collect(),
        };
        for root in roots {
            flatten(&scope.registry, root, &mut visited, &mut plan);
        }
    }

    plan
}

fn flatten(registry: &TargetRegistry, name: &str, visited: &mut HashSet<String>, plan: &mut LinkPlan) {
    let Some(descriptor) = registry.get(name) else {
        tracing::debug!("target `{}` is not registered, skipping", name);
        return;
    };
    if !visited.insert(descriptor.name.clone()) {
        return;
    }

    for dir in &descriptor.include_dirs {
        plan.add_include(dir);
    }
    for link in &descriptor.link {
        match link.as_target() {
            Some(dep) => flatten(registry, dep, visited, plan),
            None => plan.add_link(link),
        }
    }
}
