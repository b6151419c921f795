//! CLI definitions using clap.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use clap_complete::Shell as CompletionShell;

use lookout::core::LinkageStyle;
use lookout::ops::options::BuildOption;
use lookout::ops::resolve::SearchOverrides;
use lookout::util::shell::ColorChoice;

/// Lookout - dependency discovery for C and C++ projects
#[derive(Parser)]
#[command(name = "lookout")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Only print errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Coloring: auto, always, never
    #[arg(long, global = true, default_value = "auto")]
    pub color: ColorChoice,

    /// Emit machine-readable JSON on stdout
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Resolve package names to linkable targets
    Resolve(ResolveArgs),

    /// Evaluate options and resolve the project's dependencies
    Configure(ConfigureArgs),

    /// Write the project's package config into an install prefix
    Export(ExportArgs),

    /// Generate an uninstall script from an install manifest
    UninstallScript(UninstallScriptArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

/// Search root overrides shared by resolving commands.
#[derive(Args, Clone, Default)]
pub struct SearchArgs {
    /// Install prefix to search first (repeatable)
    #[arg(long = "prefix", value_name = "DIR")]
    pub prefixes: Vec<PathBuf>,

    /// Extra directory for `.pc` files (repeatable)
    #[arg(long, value_name = "DIR")]
    pub pkg_config_path: Vec<PathBuf>,

    /// Only search the given roots, not conventional system locations
    #[arg(long)]
    pub no_default_paths: bool,
}

impl SearchArgs {
    pub fn overrides(&self) -> SearchOverrides {
        SearchOverrides {
            prefixes: self.prefixes.clone(),
            pkg_config_path: self.pkg_config_path.clone(),
            install_prefix: None,
            no_default_paths: self.no_default_paths,
        }
    }
}

/// `--enable`/`--disable` build option overrides.
#[derive(Args, Clone, Default)]
pub struct OptionArgs {
    /// Turn a build option on (repeatable)
    #[arg(long, value_name = "OPTION")]
    pub enable: Vec<BuildOption>,

    /// Turn a build option off (repeatable)
    #[arg(long, value_name = "OPTION")]
    pub disable: Vec<BuildOption>,
}

#[derive(Args)]
pub struct ResolveArgs {
    /// Package names or qualified targets (`zlib`, `ZLIB::ZLIB`)
    #[arg(required = true)]
    pub names: Vec<String>,

    /// Report missing packages instead of failing
    #[arg(long)]
    pub optional: bool,

    /// Preferred library variant
    #[arg(long, default_value = "static")]
    pub linkage: LinkageStyle,

    #[command(flatten)]
    pub search: SearchArgs,
}

#[derive(Args)]
pub struct ConfigureArgs {
    /// Path to Lookout.toml (searched upward from the cwd by default)
    #[arg(long)]
    pub manifest_path: Option<PathBuf>,

    #[command(flatten)]
    pub options: OptionArgs,

    #[command(flatten)]
    pub search: SearchArgs,

    /// Don't write .lookout/resolution.json
    #[arg(long)]
    pub no_report: bool,
}

#[derive(Args)]
pub struct ExportArgs {
    /// Path to Lookout.toml (searched upward from the cwd by default)
    #[arg(long)]
    pub manifest_path: Option<PathBuf>,

    /// Prefix to export into (defaults to the configured install prefix)
    #[arg(long)]
    pub install_prefix: Option<PathBuf>,

    /// Install manifest to append to (defaults to .lookout/install_manifest.txt)
    #[arg(long)]
    pub install_manifest: Option<PathBuf>,

    #[command(flatten)]
    pub options: OptionArgs,
}

#[derive(Args)]
pub struct UninstallScriptArgs {
    /// Install manifest to read (defaults to .lookout/install_manifest.txt)
    #[arg(long)]
    pub install_manifest: Option<PathBuf>,

    /// Where to write the script (defaults to .lookout/uninstall.sh)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Print the script to stdout instead of writing it
    #[arg(long, conflicts_with = "output")]
    pub stdout: bool,
}

#[derive(Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: CompletionShell,
}
