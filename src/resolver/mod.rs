//! Package resolution.
//!
//! The resolver maps a requested package name to a usable target by running
//! an ordered chain of strategies and stopping at the first success:
//!
//! 1. fast path - the target already exists in the scope
//! 2. qualified literal - `pkg::tgt` names, searched literally
//! 3. package manager - native package configs
//! 4. module - `.pc` module descriptions, synthesizing a placeholder
//! 5. filesystem scan - `name*` configs in conventional locations
//! 6. quirk - last-resort placeholders for known-problematic packages
//!
//! All state lives in the [`Scope`] passed in by the caller.

pub mod errors;
pub mod libtoken;
pub mod quirks;
pub mod strategy;

pub use errors::ResolveError;
pub use quirks::Quirks;
pub use strategy::{Strategy, StrategyKind};

use std::path::PathBuf;

use serde::Serialize;

use crate::core::linkage::LinkageStyle;
use crate::core::name::PackageName;
use crate::core::registry::TargetRegistry;
use crate::core::scope::Scope;
use crate::core::target::LinkRef;
use crate::sources::pkgconfig::PkgConfigProvider;
use crate::sources::prefix::PrefixPackageManager;
use crate::sources::scan::FilesystemScanner;
use crate::sources::source::{ModuleProvider, PackageManager};
use crate::sources::vcpkg::VcpkgPackageManager;
use crate::util::config::SearchRoots;
use crate::util::vcpkg::VcpkgIntegration;

/// Whether a failed lookup aborts the run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Requirement {
    /// Failure is fatal
    Required,
    /// Failure yields `NotFound`
    Optional,
}

/// What a successful strategy produced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Found {
    pub strategy: StrategyKind,

    /// Target consumers should link, when one is unambiguous
    pub target: Option<String>,

    /// Targets the discovered package provides, including ones an earlier
    /// lookup already registered
    pub introduced: Vec<String>,

    pub include_dirs: Vec<PathBuf>,

    pub libraries: Vec<LinkRef>,

    pub version: Option<String>,

    /// Whether `target` is a placeholder
    pub synthesized: bool,

    /// Packages the discovered config depends on
    #[serde(skip)]
    pub forwarded: Vec<PackageName>,
}

impl Found {
    /// A result pointing at an existing target, copying its usage requirements.
    pub fn from_target(strategy: StrategyKind, registry: &TargetRegistry, target: &str) -> Self {
        let (include_dirs, libraries) = registry
            .get(target)
            .map(|t| (t.include_dirs.clone(), t.link.clone()))
            .unwrap_or_default();

        Found {
            strategy,
            target: Some(target.to_string()),
            introduced: Vec::new(),
            include_dirs,
            libraries,
            version: None,
            synthesized: false,
            forwarded: Vec::new(),
        }
    }

    /// A result with no canonical target.
    pub fn untargeted(strategy: StrategyKind) -> Self {
        Found {
            strategy,
            target: None,
            introduced: Vec::new(),
            include_dirs: Vec::new(),
            libraries: Vec::new(),
            version: None,
            synthesized: false,
            forwarded: Vec::new(),
        }
    }
}

/// Outcome of resolving one name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "kebab-case")]
pub enum Resolution {
    /// Resolved to an importable target
    Target {
        found: Found,
        attempted: Vec<StrategyKind>,
    },
    /// Resolved through discovered files; the target is a placeholder
    Files {
        found: Found,
        attempted: Vec<StrategyKind>,
    },
    NotFound { attempted: Vec<StrategyKind> },
}

impl Resolution {
    fn from_found(found: Found, attempted: Vec<StrategyKind>) -> Self {
        if found.synthesized {
            Resolution::Files { found, attempted }
        } else {
            Resolution::Target { found, attempted }
        }
    }

    pub fn is_found(&self) -> bool {
        !matches!(self, Resolution::NotFound { .. })
    }

    pub fn found(&self) -> Option<&Found> {
        match self {
            Resolution::Target { found, .. } | Resolution::Files { found, .. } => Some(found),
            Resolution::NotFound { .. } => None,
        }
    }

    /// The canonical target, if any.
    pub fn target(&self) -> Option<&str> {
        self.found().and_then(|f| f.target.as_deref())
    }

    /// Strategy tiers that ran for this call, in order.
    pub fn attempted(&self) -> &[StrategyKind] {
        match self {
            Resolution::Target { attempted, .. }
            | Resolution::Files { attempted, .. }
            | Resolution::NotFound { attempted } => attempted,
        }
    }

    fn with_attempted(self, attempted: Vec<StrategyKind>) -> Self {
        match self {
            Resolution::Target { found, .. } => Resolution::Target { found, attempted },
            Resolution::Files { found, .. } => Resolution::Files { found, attempted },
            Resolution::NotFound { .. } => Resolution::NotFound { attempted },
        }
    }
}

/// Discovery backends and search settings shared by all strategies.
pub struct Discovery {
    pub package_managers: Vec<Box<dyn PackageManager>>,
    pub modules: Box<dyn ModuleProvider>,
    pub scanner: FilesystemScanner,
    pub roots: SearchRoots,
    pub linkage: LinkageStyle,
    pub quirks: Quirks,
}

impl Discovery {
    /// Standard backends over the given search roots.
    pub fn new(roots: SearchRoots, linkage: LinkageStyle) -> Self {
        Discovery {
            package_managers: vec![Box::new(PrefixPackageManager::new(roots.prefixes.clone()))],
            modules: Box::new(PkgConfigProvider::new(roots.pkg_config_dirs.clone())),
            scanner: FilesystemScanner::new(roots.scan_dirs.clone()),
            roots,
            linkage,
            quirks: Quirks::builtin(),
        }
    }

    /// Add vcpkg as a package manager after the prefix search.
    pub fn with_vcpkg(mut self, vcpkg: VcpkgIntegration) -> Self {
        self.package_managers
            .push(Box::new(VcpkgPackageManager::new(vcpkg, self.linkage)));
        self
    }

    pub fn with_package_manager(mut self, pm: Box<dyn PackageManager>) -> Self {
        self.package_managers.push(pm);
        self
    }

    /// Directories searched for libraries named by module descriptions.
    pub fn lib_search_dirs(&self, extra: &[PathBuf]) -> Vec<PathBuf> {
        let mut dirs = extra.to_vec();
        for dir in &self.roots.lib_dirs {
            if !dirs.contains(dir) {
                dirs.push(dir.clone());
            }
        }
        dirs
    }
}

/// The strategy-chain driver.
pub struct Resolver {
    discovery: Discovery,
    chain: Vec<Box<dyn Strategy>>,
}

impl Resolver {
    /// Create a resolver with the standard strategy chain.
    pub fn new(discovery: Discovery) -> Self {
        Resolver {
            discovery,
            chain: strategy::default_chain(),
        }
    }

    pub fn discovery(&self) -> &Discovery {
        &self.discovery
    }

    pub fn linkage(&self) -> LinkageStyle {
        self.discovery.linkage
    }

    /// Resolve a name given as a string.
    pub fn resolve_str(
        &self,
        scope: &mut Scope,
        name: &str,
        requirement: Requirement,
    ) -> Result<Resolution, ResolveError> {
        let name = PackageName::new(name)?;
        self.resolve(scope, &name, requirement)
    }

    /// Resolve `name`, stopping at the first strategy that succeeds.
    pub fn resolve(
        &self,
        scope: &mut Scope,
        name: &PackageName,
        requirement: Requirement,
    ) -> Result<Resolution, ResolveError> {
        if !scope.enter(name) {
            tracing::debug!("`{}` is already being resolved, skipping", name);
            return Ok(Resolution::NotFound {
                attempted: Vec::new(),
            });
        }

        let result = self.run_chain(scope, name);
        scope.leave(name);
        let resolution = result?;

        match (&resolution, requirement) {
            (Resolution::NotFound { attempted }, Requirement::Required) => {
                Err(ResolveError::MissingDependency {
                    package: name.to_string(),
                    attempted: attempted.iter().map(|k| k.to_string()).collect(),
                })
            }
            _ => Ok(resolution),
        }
    }

    fn run_chain(&self, scope: &mut Scope, name: &PackageName) -> Result<Resolution, ResolveError> {
        let mut attempted = Vec::new();

        for strategy in &self.chain {
            if !strategy.applies_to(name, &self.discovery) {
                continue;
            }
            let kind = strategy.kind();

            if kind != StrategyKind::FastPath {
                // Found names never fall through to later tiers
                if let Some(previous) = scope.resolution(name.as_str()).filter(|r| r.is_found()) {
                    return Ok(previous.clone().with_attempted(attempted));
                }
                if !scope.claim_attempt(kind, name) {
                    tracing::debug!("{} already tried for `{}`", kind, name);
                    continue;
                }
            }

            attempted.push(kind);
            tracing::debug!("trying {} for `{}`", kind, name);

            if let Some(found) = strategy.attempt(name, scope, &self.discovery)? {
                let found = self.after_success(scope, name, found)?;
                tracing::info!(
                    "found `{}` via {}{}",
                    name,
                    kind,
                    found
                        .target
                        .as_deref()
                        .map(|t| format!(" as `{}`", t))
                        .unwrap_or_default()
                );
                let resolution = Resolution::from_found(found, attempted);
                scope.record(name, resolution.clone());
                return Ok(resolution);
            }
        }

        tracing::debug!("`{}` not found", name);
        let resolution = Resolution::NotFound { attempted };
        scope.record(name, resolution.clone());
        Ok(resolution)
    }

    /// Quirk alias remediation and forwarded dependencies.
    fn after_success(
        &self,
        scope: &mut Scope,
        name: &PackageName,
        mut found: Found,
    ) -> Result<Found, ResolveError> {
        if let Some(quirk) = self.discovery.quirks.lookup(name.namespace()) {
            let created = quirk.remediate_aliases(&mut scope.registry);
            if !created.is_empty() {
                tracing::debug!("quirk aliases for `{}`: {}", name, created.join(", "));
            }
            if found.target.is_none() {
                found.target = quirk
                    .canonical
                    .iter()
                    .find(|alias| scope.registry.contains(alias))
                    .map(|alias| alias.to_string());
            }
        }

        for dep in found.forwarded.clone() {
            let resolution = self.resolve(scope, &dep, Requirement::Optional)?;
            if !resolution.is_found() {
                tracing::warn!("`{}` depends on `{}`, which was not found", name, dep);
            }
        }

        Ok(found)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::target::{TargetDescriptor, TargetKind};
    use std::path::Path;
    use tempfile::TempDir;

    fn write(path: &Path, contents: &str) {
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, contents).unwrap();
    }

    fn write_config(prefix: &Path, name: &str, body: &str) {
        write(
            &prefix
                .join("lib/lookout")
                .join(name)
                .join(format!("{name}-config.toml")),
            body,
        );
    }

    fn resolver_for(prefix: &Path) -> Resolver {
        Resolver::new(Discovery::new(SearchRoots::for_prefix(prefix), LinkageStyle::Static))
    }

    const ZLIB_CONFIG: &str = r#"
[package]
name = "zlib"
prefix = "../../.."

[[target]]
name = "ZLIB::ZLIB"
include-dirs = ["include"]
link = ["lib/libz.a"]
"#;

    #[test]
    fn test_fast_path_reuses_existing_target() {
        let tmp = TempDir::new().unwrap();
        let resolver = resolver_for(tmp.path());
        let mut scope = Scope::new();
        scope
            .registry
            .insert_if_absent(TargetDescriptor::new("foo::foo", TargetKind::Imported));

        let resolution = resolver
            .resolve_str(&mut scope, "foo", Requirement::Required)
            .unwrap();

        assert!(matches!(resolution, Resolution::Target { .. }));
        assert_eq!(resolution.target(), Some("foo::foo"));
        assert_eq!(resolution.attempted(), &[StrategyKind::FastPath]);
        assert!(scope.is_found("FOO"));
    }

    #[test]
    fn test_package_manager_auto_aliases_zlib() {
        let tmp = TempDir::new().unwrap();
        write_config(tmp.path(), "zlib", ZLIB_CONFIG);
        let resolver = resolver_for(tmp.path());
        let mut scope = Scope::new();

        let resolution = resolver
            .resolve_str(&mut scope, "zlib", Requirement::Required)
            .unwrap();

        assert_eq!(resolution.target(), Some("zlib::zlib"));
        assert_eq!(scope.registry.alias_target("zlib::zlib"), Some("ZLIB::ZLIB"));
        assert!(scope.is_found("ZLIB"));
        assert!(scope.is_found("zlib"));
        assert_eq!(
            resolution.attempted(),
            &[StrategyKind::FastPath, StrategyKind::PackageManager]
        );

        let found = resolution.found().unwrap();
        assert_eq!(found.introduced, vec!["ZLIB::ZLIB"]);
        assert!(found.include_dirs[0].ends_with("include"));
    }

    #[test]
    fn test_second_resolution_is_idempotent() {
        let tmp = TempDir::new().unwrap();
        write_config(tmp.path(), "zlib", ZLIB_CONFIG);
        let resolver = resolver_for(tmp.path());
        let mut scope = Scope::new();

        let first = resolver
            .resolve_str(&mut scope, "zlib", Requirement::Required)
            .unwrap();
        let targets_before = scope.registry.len();
        let second = resolver
            .resolve_str(&mut scope, "zlib", Requirement::Required)
            .unwrap();

        assert_eq!(first.target(), second.target());
        assert_eq!(second.attempted(), &[StrategyKind::FastPath]);
        assert_eq!(scope.registry.len(), targets_before);
    }

    #[test]
    fn test_bare_name_after_qualified_lookup_still_aliased() {
        let tmp = TempDir::new().unwrap();
        write_config(tmp.path(), "zlib", ZLIB_CONFIG);
        let resolver = resolver_for(tmp.path());
        let mut scope = Scope::new();

        resolver
            .resolve_str(&mut scope, "ZLIB::ZLIB", Requirement::Required)
            .unwrap();
        let resolution = resolver
            .resolve_str(&mut scope, "zlib", Requirement::Required)
            .unwrap();

        assert_eq!(resolution.target(), Some("zlib::zlib"));
        assert_eq!(scope.registry.alias_target("zlib::zlib"), Some("ZLIB::ZLIB"));
        assert_eq!(resolution.found().unwrap().introduced, vec!["ZLIB::ZLIB"]);

        let zlib = PackageName::new("zlib").unwrap();
        let plan = crate::ops::configure::link_plan("app", &[zlib], &scope);
        assert_eq!(plan.include_dirs.len(), 1);
        assert!(plan.link_flags()[0].ends_with("lib/libz.a"));
    }

    #[test]
    fn test_qualified_name_only_searched_literally() {
        let tmp = TempDir::new().unwrap();
        write_config(tmp.path(), "ZLIB", ZLIB_CONFIG);
        write(&tmp.path().join("lib/pkgconfig/ZLIB.pc"), "Libs: -lz\n");
        let resolver = resolver_for(tmp.path());
        let mut scope = Scope::new();

        let found = resolver
            .resolve_str(&mut scope, "ZLIB::ZLIB", Requirement::Required)
            .unwrap();
        assert_eq!(found.target(), Some("ZLIB::ZLIB"));
        assert_eq!(
            found.attempted(),
            &[StrategyKind::FastPath, StrategyKind::QualifiedLiteral]
        );

        let missing = resolver
            .resolve_str(&mut scope, "ZLIB::Other", Requirement::Optional)
            .unwrap();
        assert!(!missing.is_found());
        assert!(!missing.attempted().contains(&StrategyKind::Module));
        assert!(!scope.registry.contains("zlib::zlib"));
    }

    #[test]
    fn test_ambiguous_namespace_gets_no_alias() {
        let tmp = TempDir::new().unwrap();
        write_config(
            tmp.path(),
            "multi",
            "[package]\nname = \"multi\"\n\n[[target]]\nname = \"multi::a\"\n\n[[target]]\nname = \"multi::b\"\n",
        );
        let resolver = resolver_for(tmp.path());
        let mut scope = Scope::new();

        let resolution = resolver
            .resolve_str(&mut scope, "multi", Requirement::Required)
            .unwrap();

        assert!(resolution.is_found());
        assert_eq!(resolution.target(), None);
        assert!(!scope.registry.contains("multi::multi"));
        assert_eq!(resolution.found().unwrap().introduced, vec!["multi::a", "multi::b"]);
    }

    #[test]
    fn test_config_without_namespace_match_still_found() {
        let tmp = TempDir::new().unwrap();
        write_config(
            tmp.path(),
            "odd",
            "[package]\nname = \"odd\"\n\n[[target]]\nname = \"Other::thing\"\n",
        );
        let resolver = resolver_for(tmp.path());
        let mut scope = Scope::new();

        let resolution = resolver
            .resolve_str(&mut scope, "odd", Requirement::Required)
            .unwrap();
        assert!(resolution.is_found());
        assert_eq!(resolution.target(), None);
        assert!(!scope.registry.contains("odd::odd"));
    }

    #[test]
    fn test_module_synthesizes_placeholder() {
        let tmp = TempDir::new().unwrap();
        let prefix = tmp.path().display().to_string();
        write(
            &tmp.path().join("lib/pkgconfig/jansson.pc"),
            &format!(
                "prefix={prefix}\nlibdir=${{prefix}}/lib\nincludedir=${{prefix}}/include\n\
                 Name: Jansson\nVersion: 2.14\nLibs: -L${{libdir}} -ljansson\nCflags: -I${{includedir}}\n"
            ),
        );
        write(&tmp.path().join("lib/libjansson.a"), "");
        let resolver = resolver_for(tmp.path());
        let mut scope = Scope::new();

        let resolution = resolver
            .resolve_str(&mut scope, "jansson", Requirement::Required)
            .unwrap();

        assert!(matches!(resolution, Resolution::Files { .. }));
        assert_eq!(resolution.target(), Some("jansson::jansson"));
        assert_eq!(
            resolution.attempted(),
            &[StrategyKind::FastPath, StrategyKind::PackageManager, StrategyKind::Module]
        );

        let libraries = scope.vars.get("JANSSON_LIBRARIES").unwrap();
        assert_eq!(libraries.len(), 1);
        assert!(Path::new(&libraries[0]).is_absolute());
        assert!(libraries[0].ends_with("libjansson.a"));
        assert_eq!(scope.vars.get("JANSSON_VERSION").unwrap(), &["2.14"]);
        assert_eq!(
            scope.registry.get("jansson::jansson").unwrap().kind,
            TargetKind::Synthesized
        );
    }

    #[test]
    fn test_module_refs_synthesized_or_pruned() {
        let tmp = TempDir::new().unwrap();
        write_config(
            tmp.path(),
            "app",
            "[package]\nname = \"app\"\n\n[[target]]\nname = \"app::core\"\nlink = [\"PkgConfig::FOO\", \"PkgConfig::GONE\", \"-lm\"]\n",
        );
        write(&tmp.path().join("lib/pkgconfig/foo.pc"), "Libs: -lfoo\nCflags: -I/opt/foo/include\n");
        let resolver = resolver_for(tmp.path());
        let mut scope = Scope::new();

        let resolution = resolver
            .resolve_str(&mut scope, "app", Requirement::Required)
            .unwrap();
        assert_eq!(resolution.target(), Some("app::app"));

        let foo = scope.registry.get("PkgConfig::FOO").unwrap();
        assert_eq!(foo.include_dirs, vec![PathBuf::from("/opt/foo/include")]);
        assert!(scope.is_found("FOO"));
        assert!(!scope.is_found("GONE"));
        assert_eq!(
            scope.vars.get("FOO_INCLUDE_DIRS"),
            Some(&["/opt/foo/include".to_string()][..])
        );
        assert_eq!(scope.vars.get("FOO_LIBRARIES").map(<[String]>::len), Some(1));

        let core = scope.registry.get("app::core").unwrap();
        assert_eq!(
            core.link,
            vec![LinkRef::target("PkgConfig::FOO"), LinkRef::Name("m".into())]
        );
    }

    #[test]
    fn test_filesystem_scan_finds_unregistered_config() {
        let tmp = TempDir::new().unwrap();
        let mut roots = SearchRoots::for_prefix(tmp.path());
        roots.scan_dirs = vec![tmp.path().join("scan")];
        write(
            &tmp.path().join("scan/sub/Widget-config.toml"),
            "[package]\nname = \"widget\"\n\n[[target]]\nname = \"widget::widget\"\n",
        );
        let resolver = Resolver::new(Discovery::new(roots, LinkageStyle::Static));
        let mut scope = Scope::new();

        let resolution = resolver
            .resolve_str(&mut scope, "widget", Requirement::Required)
            .unwrap();

        assert_eq!(resolution.target(), Some("widget::widget"));
        assert_eq!(
            resolution.attempted(),
            &[
                StrategyKind::FastPath,
                StrategyKind::PackageManager,
                StrategyKind::Module,
                StrategyKind::FilesystemScan,
            ]
        );
    }

    #[test]
    fn test_required_missing_is_fatal() {
        let tmp = TempDir::new().unwrap();
        let resolver = resolver_for(tmp.path());
        let mut scope = Scope::new();

        let err = resolver
            .resolve_str(&mut scope, "nothere", Requirement::Required)
            .unwrap_err();
        match err {
            ResolveError::MissingDependency { package, attempted } => {
                assert_eq!(package, "nothere");
                assert!(attempted.contains(&"filesystem-scan".to_string()));
            }
            other => panic!("unexpected error: {other}"),
        }
        assert!(!scope.is_found("NOTHERE"));
    }

    #[test]
    fn test_optional_missing_memoizes_tiers() {
        let tmp = TempDir::new().unwrap();
        let resolver = resolver_for(tmp.path());
        let mut scope = Scope::new();

        let first = resolver
            .resolve_str(&mut scope, "nothere", Requirement::Optional)
            .unwrap();
        assert!(!first.is_found());
        assert_eq!(first.attempted().len(), 4);

        let second = resolver
            .resolve_str(&mut scope, "nothere", Requirement::Optional)
            .unwrap();
        assert!(!second.is_found());
        assert_eq!(second.attempted(), &[StrategyKind::FastPath]);
    }

    #[test]
    fn test_quirk_fallback_and_canonical_aliases() {
        let tmp = TempDir::new().unwrap();
        let resolver = resolver_for(tmp.path());
        let mut scope = Scope::new();

        let resolution = resolver
            .resolve_str(&mut scope, "libjwt", Requirement::Required)
            .unwrap();

        assert!(matches!(resolution, Resolution::Files { .. }));
        assert_eq!(resolution.target(), Some("libjwt::libjwt"));
        assert_eq!(resolution.attempted().last(), Some(&StrategyKind::Quirk));
        assert_eq!(scope.registry.alias_target("jwt::jwt"), Some("libjwt::libjwt"));

        let jwt = resolver
            .resolve_str(&mut scope, "jwt", Requirement::Required)
            .unwrap();
        assert_eq!(jwt.target(), Some("jwt::jwt"));
        assert_eq!(jwt.attempted(), &[StrategyKind::FastPath]);
    }

    #[test]
    fn test_quirk_aliases_upstream_spelling() {
        let tmp = TempDir::new().unwrap();
        write_config(
            tmp.path(),
            "libjwt",
            "[package]\nname = \"libjwt\"\n\n[[target]]\nname = \"LibJWT::LibJWT\"\n\n[[target]]\nname = \"LibJWT::jwt_static\"\n",
        );
        let resolver = resolver_for(tmp.path());
        let mut scope = Scope::new();

        let resolution = resolver
            .resolve_str(&mut scope, "libjwt", Requirement::Required)
            .unwrap();

        assert_eq!(resolution.target(), Some("libjwt::libjwt"));
        assert_eq!(scope.registry.alias_target("libjwt::libjwt"), Some("LibJWT::LibJWT"));
        assert_eq!(scope.registry.alias_target("jwt::jwt"), Some("LibJWT::LibJWT"));
    }

    #[test]
    fn test_forwarded_dependencies_resolved() {
        let tmp = TempDir::new().unwrap();
        write_config(tmp.path(), "zlib", ZLIB_CONFIG);
        write_config(
            tmp.path(),
            "png",
            "[package]\nname = \"png\"\ndependencies = [\"zlib\"]\n\n[[target]]\nname = \"PNG::PNG\"\nlink = [\"ZLIB::ZLIB\"]\n",
        );
        let resolver = resolver_for(tmp.path());
        let mut scope = Scope::new();

        resolver
            .resolve_str(&mut scope, "png", Requirement::Required)
            .unwrap();

        assert!(scope.is_found("PNG"));
        assert!(scope.is_found("ZLIB"));
        assert!(scope.registry.contains("zlib::zlib"));
    }

    #[test]
    fn test_dependency_cycle_terminates() {
        let tmp = TempDir::new().unwrap();
        write_config(
            tmp.path(),
            "a",
            "[package]\nname = \"a\"\ndependencies = [\"b\"]\n\n[[target]]\nname = \"a::a\"\n",
        );
        write_config(
            tmp.path(),
            "b",
            "[package]\nname = \"b\"\ndependencies = [\"a\"]\n\n[[target]]\nname = \"b::b\"\n",
        );
        let resolver = resolver_for(tmp.path());
        let mut scope = Scope::new();

        let resolution = resolver
            .resolve_str(&mut scope, "a", Requirement::Required)
            .unwrap();
        assert!(resolution.is_found());
        assert!(scope.is_found("b"));
    }

    struct BrokenManager;

    impl PackageManager for BrokenManager {
        fn name(&self) -> &str {
            "broken"
        }

        fn find(&self, _name: &str) -> anyhow::Result<Option<crate::sources::package_config::PackageConfig>> {
            anyhow::bail!("corrupt index")
        }
    }

    #[test]
    fn test_package_manager_errors_propagate() {
        let tmp = TempDir::new().unwrap();
        let discovery = Discovery::new(SearchRoots::for_prefix(tmp.path()), LinkageStyle::Static)
            .with_package_manager(Box::new(BrokenManager));
        let resolver = Resolver::new(discovery);
        let mut scope = Scope::new();

        let err = resolver
            .resolve_str(&mut scope, "zlib", Requirement::Optional)
            .unwrap_err();
        assert!(matches!(err, ResolveError::Discovery { .. }));
        assert!(err.to_string().contains("corrupt index"));
    }
}
