//! `lookout resolve` command

use anyhow::{Context, Result};

use crate::cli::ResolveArgs;
use crate::commands::print_resolution;
use lookout::ops::resolve::{resolve_packages, ResolveOptions};
use lookout::resolver::Requirement;
use lookout::util::shell::Status;
use lookout::util::{GlobalContext, Shell};

pub fn execute(args: ResolveArgs, shell: &Shell) -> Result<()> {
    let mut ctx = GlobalContext::new()?;
    ctx.set_verbose(shell.is_verbose());

    let requirement = if args.optional {
        Requirement::Optional
    } else {
        Requirement::Required
    };

    let opts = ResolveOptions {
        names: args.names,
        requirement,
        linkage: args.linkage,
        search: args.search.overrides(),
    };

    shell.status(
        Status::Resolving,
        format!("{} ({} linkage)", opts.names.join(", "), opts.linkage),
    );

    let report = resolve_packages(&ctx, &opts)?;

    if shell.is_json() {
        let value = serde_json::to_value(&report).context("failed to serialize report")?;
        shell.json_event(&value);
        return Ok(());
    }

    for package in &report.packages {
        print_resolution(shell, &package.name, &package.resolution);
    }

    if shell.is_verbose() {
        for (key, found) in &report.found {
            shell.note(format!("{} = {}", key, found));
        }
    }

    Ok(())
}
