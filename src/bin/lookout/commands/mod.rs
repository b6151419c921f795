//! Command implementations

pub mod completions;
pub mod configure;
pub mod export;
pub mod resolve;
pub mod uninstall_script;

use lookout::resolver::Resolution;
use lookout::util::shell::Status;
use lookout::util::Shell;

/// Print one package's outcome as a status line.
pub fn print_resolution(shell: &Shell, name: &str, resolution: &Resolution) {
    match resolution {
        Resolution::Target { found, .. } | Resolution::Files { found, .. } => {
            let status = if found.synthesized {
                Status::Synthesized
            } else {
                Status::Found
            };
            let mut line = match &found.target {
                Some(target) => format!("{} -> {} (via {})", name, target, found.strategy),
                None => format!("{} (via {})", name, found.strategy),
            };
            if let Some(version) = &found.version {
                line.push_str(&format!(" v{}", version));
            }
            shell.status(status, line);

            if shell.is_verbose() {
                for dir in &found.include_dirs {
                    shell.note(format!("  -I{}", dir.display()));
                }
                for lib in &found.libraries {
                    for flag in lib.to_flags() {
                        shell.note(format!("  {}", flag));
                    }
                }
            }
        }
        Resolution::NotFound { attempted } => {
            let tried: Vec<&str> = attempted.iter().map(|k| k.as_str()).collect();
            shell.status(Status::Missing, format!("{} (tried: {})", name, tried.join(", ")));
        }
    }
}
