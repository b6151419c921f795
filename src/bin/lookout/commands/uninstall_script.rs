//! `lookout uninstall-script` command

use anyhow::Result;

use crate::cli::UninstallScriptArgs;
use lookout::ops::export::INSTALL_MANIFEST;
use lookout::ops::resolve::project_root;
use lookout::ops::uninstall::{read_install_manifest, render_script, write_script, SCRIPT_NAME};
use lookout::util::context::PROJECT_DIR;
use lookout::util::shell::Status;
use lookout::util::{GlobalContext, Shell};

pub fn execute(args: UninstallScriptArgs, shell: &Shell) -> Result<()> {
    let ctx = GlobalContext::new()?;
    let project_dir = project_root(&ctx).join(PROJECT_DIR);

    let install_manifest = args
        .install_manifest
        .unwrap_or_else(|| project_dir.join(INSTALL_MANIFEST));

    if args.stdout {
        let files = read_install_manifest(&install_manifest)?;
        print!("{}", render_script(&files));
        return Ok(());
    }

    let output = args.output.unwrap_or_else(|| project_dir.join(SCRIPT_NAME));
    let count = write_script(&install_manifest, &output)?;

    if shell.is_json() {
        shell.json_event(&serde_json::json!({
            "reason": "uninstall-script",
            "script": output,
            "files": count,
        }));
    } else {
        shell.status(
            Status::Created,
            format!("{} ({} files)", output.display(), count),
        );
    }

    Ok(())
}
