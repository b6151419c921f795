//! `lookout configure` command

use anyhow::{Context, Result};

use crate::cli::ConfigureArgs;
use crate::commands::print_resolution;
use lookout::ops::configure::{configure, ConfigureOptions};
use lookout::ops::options::WhichProbe;
use lookout::util::shell::Status;
use lookout::util::{GlobalContext, Shell};

pub fn execute(args: ConfigureArgs, shell: &Shell) -> Result<()> {
    let mut ctx = GlobalContext::new()?;
    ctx.set_verbose(shell.is_verbose());

    let opts = ConfigureOptions {
        manifest_path: args.manifest_path,
        enable: args.options.enable,
        disable: args.options.disable,
        search: args.search.overrides(),
        no_report: args.no_report,
    };

    let result = configure(&ctx, &opts, &WhichProbe)?;

    if shell.is_json() {
        let value = serde_json::to_value(&result).context("failed to serialize configuration")?;
        shell.json_event(&value);
        return Ok(());
    }

    let variants: Vec<String> = result
        .options
        .variants()
        .iter()
        .map(|v| v.to_string())
        .collect();
    shell.status(
        Status::Info,
        format!("{} v{} [{}]", result.project, result.version, variants.join(", ")),
    );
    for tool in &result.options.tools {
        shell.status(
            Status::Found,
            format!("{} for {} at {}", tool.tool, tool.option, tool.path.display()),
        );
    }

    for package in &result.resolutions.packages {
        print_resolution(shell, &package.name, &package.resolution);
    }

    for plan in &result.link_plans {
        shell.status(
            Status::Info,
            format!("{} links {}", plan.target, plan.packages.join(", ")),
        );
        if shell.is_verbose() {
            for dir in &plan.include_dirs {
                shell.note(format!("  -I{}", dir.display()));
            }
            for flag in plan.link_flags() {
                shell.note(format!("  {}", flag));
            }
        }
    }

    match &result.report_path {
        Some(path) => shell.status(
            Status::Finished,
            format!("configuration written to {}", path.display()),
        ),
        None => shell.status(Status::Finished, "configuration complete"),
    }

    Ok(())
}
