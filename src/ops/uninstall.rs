//! Uninstall script generation.
//!
//! Turns an install manifest (one installed path per line) into a POSIX `sh`
//! script that removes each file, reporting files that are already gone.

use std::path::{Path, PathBuf};

use anyhow::{bail, Result};

/// Default script file name, under the project directory.
pub const SCRIPT_NAME: &str = "uninstall.sh";

/// Read the paths listed in an install manifest, in order, without duplicates.
pub fn read_install_manifest(path: &Path) -> Result<Vec<PathBuf>> {
    if !path.is_file() {
        bail!(
            "install manifest not found: {}\nhelp: run `lookout export` first",
            path.display()
        );
    }
    let contents = crate::util::fs::read_to_string(path)?;

    let mut files: Vec<PathBuf> = Vec::new();
    for line in contents.lines().map(str::trim).filter(|l| !l.is_empty()) {
        let file = PathBuf::from(line);
        if !files.contains(&file) {
            files.push(file);
        }
    }
    Ok(files)
}

/// Render the uninstall script for a list of files.
pub fn render_script(files: &[PathBuf]) -> String {
    let mut script = String::from(
        "#!/bin/sh\n\
         # Generated by lookout uninstall-script\n\
         set -u\n\
         \n\
         remove() {\n\
         \x20   if [ -e \"$1\" ] || [ -L \"$1\" ]; then\n\
         \x20       echo \"-- Uninstalling $1\"\n\
         \x20       rm -f \"$1\" || echo \"-- Failed to remove $1\" >&2\n\
         \x20   else\n\
         \x20       echo \"-- File $1 does not exist.\"\n\
         \x20   fi\n\
         }\n\
         \n",
    );
    for file in files {
        script.push_str("remove ");
        script.push_str(&shell_quote(&file.display().to_string()));
        script.push('\n');
    }
    script
}

/// Single-quote a string for `sh`.
fn shell_quote(s: &str) -> String {
    format!("'{}'", s.replace('\'', r"'\''"))
}

/// Write the uninstall script for `manifest` to `output`.
pub fn write_script(manifest: &Path, output: &Path) -> Result<usize> {
    let files = read_install_manifest(manifest)?;
    crate::util::fs::write_string(output, &render_script(&files))?;
    make_executable(output)?;
    tracing::debug!("wrote uninstall script for {} files to {}", files.len(), output.display());
    Ok(files.len())
}

#[cfg(unix)]
fn make_executable(path: &Path) -> Result<()> {
    use anyhow::Context;
    use std::os::unix::fs::PermissionsExt;

    let mut perms = std::fs::metadata(path)
        .with_context(|| format!("failed to stat {}", path.display()))?
        .permissions();
    perms.set_mode(0o755);
    std::fs::set_permissions(path, perms)
        .with_context(|| format!("failed to set permissions on {}", path.display()))
}

#[cfg(not(unix))]
fn make_executable(_path: &Path) -> Result<()> {
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_read_manifest_skips_blanks_and_duplicates() {
        let tmp = TempDir::new().unwrap();
        let manifest = tmp.path().join("install_manifest.txt");
        std::fs::write(&manifest, "/p/a.toml\n\n/p/b.toml\n/p/a.toml\n").unwrap();

        let files = read_install_manifest(&manifest).unwrap();
        assert_eq!(files, vec![PathBuf::from("/p/a.toml"), PathBuf::from("/p/b.toml")]);
    }

    #[test]
    fn test_missing_manifest_is_an_error() {
        let tmp = TempDir::new().unwrap();
        let err = read_install_manifest(&tmp.path().join("nope.txt")).unwrap_err();
        assert!(err.to_string().contains("install manifest not found"));
    }

    #[test]
    fn test_render_quotes_paths() {
        let script = render_script(&[PathBuf::from("/opt/it's here/lib.a")]);
        assert!(script.starts_with("#!/bin/sh\n"));
        assert!(script.contains("    if [ -e \"$1\" ]"));
        assert!(script.contains("does not exist."));
        assert!(script.ends_with("remove '/opt/it'\\''s here/lib.a'\n"));
    }

    #[test]
    fn test_write_script() {
        let tmp = TempDir::new().unwrap();
        let manifest = tmp.path().join("install_manifest.txt");
        std::fs::write(&manifest, "/p/a.toml\n").unwrap();
        let output = tmp.path().join("out").join(SCRIPT_NAME);

        assert_eq!(write_script(&manifest, &output).unwrap(), 1);
        let script = std::fs::read_to_string(&output).unwrap();
        assert!(script.contains("remove '/p/a.toml'"));

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mode = std::fs::metadata(&output).unwrap().permissions().mode();
            assert_eq!(mode & 0o111, 0o111);
        }
    }
}
