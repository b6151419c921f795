//! Package-config export.
//!
//! Writes the files that let other projects find this one:
//!
//! ```text
//! <prefix>/lib/lookout/<name>/<name>-config.toml          # targets + forwarded dependencies
//! <prefix>/lib/lookout/<name>/<name>-config-version.toml  # version, same-major compatibility
//! ```
//!
//! One target is declared per enabled library variant (`name::static`,
//! `name::shared`, `name::debug`), and `name::name` aliases the preferred
//! one. Every written path is appended to the install manifest.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::core::linkage::LinkageStyle;
use crate::core::manifest::Manifest;
use crate::core::name::NAMESPACE_SEP;
use crate::core::target::{LinkRef, TargetKind};
use crate::ops::options::EffectiveOptions;
use crate::sources::package_config::{
    version_path_for, Compatibility, PackageConfigFile, PackageSection, TargetEntry,
    VersionDescriptor, CONFIG_SUFFIX,
};

/// Install manifest file name.
pub const INSTALL_MANIFEST: &str = "install_manifest.txt";

/// Prefix path recorded in exported configs, relative to the config's directory.
const RELATIVE_PREFIX: &str = "../../..";

/// Options for [`export`].
#[derive(Debug, Clone)]
pub struct ExportOptions {
    /// Install prefix the package is exported into
    pub prefix: PathBuf,
    /// Install manifest the written paths are appended to
    pub install_manifest: PathBuf,
}

/// Files written by an export.
#[derive(Debug, Clone)]
pub struct ExportResult {
    pub config_path: PathBuf,
    pub version_path: PathBuf,
    pub targets: Vec<String>,
    pub install_manifest: PathBuf,
}

/// Directory an exported package's configs live in.
pub fn export_dir(prefix: &Path, name: &str) -> PathBuf {
    prefix.join("lib").join("lookout").join(name)
}

/// Build the exported config document.
pub fn export_config(manifest: &Manifest, options: &EffectiveOptions) -> PackageConfigFile {
    let name = &manifest.project.name;
    let variants = options.variants();

    let targets: Vec<TargetEntry> = variants
        .iter()
        .map(|variant| TargetEntry {
            name: variant_target(name, *variant),
            kind: TargetKind::Imported,
            include_dirs: vec![PathBuf::from("include")],
            link: vec![LinkRef::Path(
                Path::new("lib").join(variant.artifact_file_name(name)),
            )],
        })
        .collect();

    let mut aliases = BTreeMap::new();
    if let Some(preferred) = variants.first() {
        aliases.insert(
            format!("{name}{NAMESPACE_SEP}{name}"),
            variant_target(name, *preferred),
        );
    }

    PackageConfigFile {
        package: PackageSection {
            name: name.clone(),
            prefix: Some(PathBuf::from(RELATIVE_PREFIX)),
            dependencies: manifest.dependencies.all().cloned().collect(),
        },
        targets,
        aliases,
    }
}

fn variant_target(name: &str, variant: LinkageStyle) -> String {
    format!("{name}{NAMESPACE_SEP}{}", variant.as_str())
}

/// Write config and version descriptors and record them in the install manifest.
pub fn export(manifest: &Manifest, options: &EffectiveOptions, opts: &ExportOptions) -> Result<ExportResult> {
    let name = &manifest.project.name;
    let dir = export_dir(&opts.prefix, name);
    let config_path = dir.join(format!("{name}{CONFIG_SUFFIX}"));
    let version_path = version_path_for(&config_path);

    let config = export_config(manifest, options);
    let config_text = toml::to_string_pretty(&config).context("failed to serialize package config")?;
    crate::util::fs::write_string(
        &config_path,
        &format!("# Generated by lookout export\n\n{config_text}"),
    )?;

    let version = VersionDescriptor {
        version: manifest.project.version.clone(),
        compatibility: Compatibility::SameMajor,
    };
    let version_text = toml::to_string_pretty(&version).context("failed to serialize version descriptor")?;
    crate::util::fs::write_string(&version_path, &version_text)?;

    crate::util::fs::append_lines(
        &opts.install_manifest,
        [config_path.display().to_string(), version_path.display().to_string()],
    )?;

    tracing::info!("exported {} to {}", name, dir.display());

    Ok(ExportResult {
        config_path,
        version_path,
        targets: config.targets.into_iter().map(|t| t.name).collect(),
        install_manifest: opts.install_manifest.clone(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::scope::Scope;
    use crate::ops::options::{BuildOption, BuildOptions, ToolProbe};
    use crate::resolver::{Discovery, Requirement, Resolver};
    use crate::sources::package_config::PackageConfig;
    use crate::util::config::SearchRoots;
    use semver::Version;
    use tempfile::TempDir;

    struct NoTools;

    impl ToolProbe for NoTools {
        fn find(&self, _tool: &str) -> Option<PathBuf> {
            None
        }
    }

    const MANIFEST: &str = r#"
[project]
name = "mylib"
version = "1.4.2"

[dependencies]
third-party = ["zlib"]
"#;

    fn options(enable: &[BuildOption]) -> EffectiveOptions {
        let mut options = BuildOptions::default();
        options.apply_overrides(enable, &[]);
        options.evaluate(&NoTools)
    }

    #[test]
    fn test_export_config_variants() {
        let manifest = Manifest::parse(MANIFEST).unwrap();
        let config = export_config(&manifest, &options(&[BuildOption::Shared]));

        let names: Vec<_> = config.targets.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["mylib::static", "mylib::shared"]);
        assert_eq!(config.aliases["mylib::mylib"], "mylib::static");
        assert_eq!(config.package.dependencies[0].as_str(), "zlib");
        assert_eq!(
            config.targets[1].link,
            vec![LinkRef::Path(PathBuf::from("lib/libmylib.so"))]
        );
    }

    #[test]
    fn test_export_writes_files_and_install_manifest() {
        let tmp = TempDir::new().unwrap();
        let manifest = Manifest::parse(MANIFEST).unwrap();
        let opts = ExportOptions {
            prefix: tmp.path().join("stage"),
            install_manifest: tmp.path().join("build").join(INSTALL_MANIFEST),
        };

        let result = export(&manifest, &options(&[]), &opts).unwrap();

        assert_eq!(
            result.config_path,
            tmp.path().join("stage/lib/lookout/mylib/mylib-config.toml")
        );
        assert!(result.version_path.ends_with("mylib-config-version.toml"));

        let loaded = PackageConfig::load(&result.config_path).unwrap();
        let version = loaded.version.as_ref().unwrap();
        assert_eq!(version.version, Version::new(1, 4, 2));
        assert_eq!(version.compatibility, Compatibility::SameMajor);
        assert_eq!(
            loaded.prefix(),
            crate::util::fs::normalize_path(&tmp.path().join("stage"))
        );

        let lines = std::fs::read_to_string(&result.install_manifest).unwrap();
        assert_eq!(lines.lines().count(), 2);
    }

    #[test]
    fn test_exported_package_is_resolvable() {
        let tmp = TempDir::new().unwrap();
        let stage = tmp.path().join("stage");
        let manifest = Manifest::parse(MANIFEST).unwrap();
        export(
            &manifest,
            &options(&[]),
            &ExportOptions {
                prefix: stage.clone(),
                install_manifest: tmp.path().join(INSTALL_MANIFEST),
            },
        )
        .unwrap();

        let resolver = Resolver::new(Discovery::new(
            SearchRoots::for_prefix(&stage),
            LinkageStyle::Static,
        ));
        let mut scope = Scope::new();
        let resolution = resolver
            .resolve_str(&mut scope, "mylib", Requirement::Required)
            .unwrap();

        assert_eq!(resolution.target(), Some("mylib::mylib"));
        assert_eq!(scope.registry.alias_target("mylib::mylib"), Some("mylib::static"));
        // zlib is forwarded but not installed in the stage
        assert!(!scope.is_found("ZLIB"));
    }
}
