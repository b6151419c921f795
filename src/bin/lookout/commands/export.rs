//! `lookout export` command

use std::path::Path;

use anyhow::Result;

use crate::cli::ExportArgs;
use lookout::core::Manifest;
use lookout::ops::export::{export, ExportOptions, INSTALL_MANIFEST};
use lookout::ops::options::{BuildOptions, WhichProbe};
use lookout::util::context::PROJECT_DIR;
use lookout::util::shell::Status;
use lookout::util::{GlobalContext, SearchRoots, Shell};

pub fn execute(args: ExportArgs, shell: &Shell) -> Result<()> {
    let ctx = GlobalContext::new()?;

    let manifest_path = ctx.find_manifest(args.manifest_path.as_deref())?;
    let root = manifest_path.parent().unwrap_or(Path::new(".")).to_path_buf();
    let manifest = Manifest::load(&manifest_path)?;

    let mut options = BuildOptions::from_table(&manifest.options);
    options.apply_overrides(&args.options.enable, &args.options.disable);
    let options = options.evaluate(&WhichProbe);

    let prefix = match args.install_prefix {
        Some(prefix) => prefix,
        None => SearchRoots::from_config(&ctx.load_config(&root).search).install_prefix,
    };
    let install_manifest = args
        .install_manifest
        .unwrap_or_else(|| root.join(PROJECT_DIR).join(INSTALL_MANIFEST));

    let result = export(
        &manifest,
        &options,
        &ExportOptions {
            prefix,
            install_manifest,
        },
    )?;

    if shell.is_json() {
        shell.json_event(&serde_json::json!({
            "reason": "export",
            "config": result.config_path,
            "version": result.version_path,
            "targets": result.targets,
            "install-manifest": result.install_manifest,
        }));
        return Ok(());
    }

    shell.status(Status::Created, result.config_path.display());
    shell.status(Status::Created, result.version_path.display());
    shell.status(
        Status::Finished,
        format!(
            "exported {} ({})",
            manifest.project.name,
            result.targets.join(", ")
        ),
    );

    Ok(())
}
