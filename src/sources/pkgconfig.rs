//! Module-style discovery from pkg-config `.pc` files.
//!
//! The `.pc` files are read directly; the `pkg-config` tool is never run.
//! Supported subset:
//! - `name=value` variable definitions with `${var}` expansion
//! - `Name`, `Version`, `Cflags`, `Libs` and `Requires` fields
//! - `Requires` modules are merged in recursively

use std::collections::{BTreeMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use anyhow::{Context, Result};
use regex::Regex;

use crate::sources::source::{ModuleInfo, ModuleProvider};

static VAR_REF: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\$\{([A-Za-z0-9_.]+)\}").expect("valid regex"));

/// Maximum rounds of variable expansion before giving up on a value.
const MAX_EXPANSION_DEPTH: usize = 16;

/// A parsed `.pc` file.
#[derive(Debug, Clone, Default)]
pub struct PcFile {
    pub path: PathBuf,
    pub variables: BTreeMap<String, String>,
    pub fields: BTreeMap<String, String>,
}

impl PcFile {
    /// Read and parse a `.pc` file.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read module file: {}", path.display()))?;
        Ok(Self::parse(&contents, path))
    }

    /// Parse `.pc` text. `path` seeds the `pcfiledir` variable.
    pub fn parse(contents: &str, path: &Path) -> Self {
        let mut pc = PcFile {
            path: path.to_path_buf(),
            ..Default::default()
        };

        if let Some(dir) = path.parent() {
            pc.variables
                .insert("pcfiledir".to_string(), dir.display().to_string());
        }

        for raw_line in contents.lines() {
            let line = match raw_line.find('#') {
                Some(idx) => &raw_line[..idx],
                None => raw_line,
            }
            .trim();
            if line.is_empty() {
                continue;
            }

            let eq = line.find('=');
            let colon = line.find(':');
            match (eq, colon) {
                (Some(e), c) if c.map_or(true, |c| e < c) => {
                    let key = line[..e].trim();
                    if is_identifier(key) {
                        let value = pc.expand(line[e + 1..].trim());
                        pc.variables.insert(key.to_string(), value);
                    }
                }
                (_, Some(c)) => {
                    let key = line[..c].trim();
                    if is_identifier(key) {
                        let value = pc.expand(line[c + 1..].trim());
                        pc.fields.insert(key.to_string(), value);
                    }
                }
                _ => {}
            }
        }

        pc
    }

    /// Expand `${var}` references using variables defined so far.
    fn expand(&self, value: &str) -> String {
        let mut current = value.to_string();
        for _ in 0..MAX_EXPANSION_DEPTH {
            if !VAR_REF.is_match(&current) {
                break;
            }
            current = VAR_REF
                .replace_all(&current, |caps: &regex::Captures<'_>| {
                    self.variables.get(&caps[1]).cloned().unwrap_or_default()
                })
                .into_owned();
        }
        current
    }

    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(String::as_str)
    }

    /// Module names from the `Requires` field, with version constraints dropped.
    pub fn requires(&self) -> Vec<String> {
        let Some(raw) = self.field("Requires") else {
            return Vec::new();
        };

        let mut out = Vec::new();
        let mut skip_next = false;
        for token in raw.split(|c: char| c == ',' || c.is_whitespace()) {
            if token.is_empty() {
                continue;
            }
            if skip_next {
                skip_next = false;
                continue;
            }
            if matches!(token, "=" | "<" | ">" | "<=" | ">=" | "!=") {
                skip_next = true;
                continue;
            }
            out.push(token.to_string());
        }
        out
    }

    /// Usage information from this file alone.
    pub fn module_info(&self, module: &str) -> ModuleInfo {
        let mut info = ModuleInfo {
            name: self.field("Name").unwrap_or(module).to_string(),
            version: self.field("Version").map(String::from),
            path: Some(self.path.clone()),
            ..Default::default()
        };

        if let Some(cflags) = self.field("Cflags") {
            let mut tokens = cflags.split_whitespace();
            while let Some(token) = tokens.next() {
                if token == "-I" {
                    if let Some(dir) = tokens.next() {
                        push_unique(&mut info.include_dirs, PathBuf::from(dir));
                    }
                } else if let Some(dir) = token.strip_prefix("-I") {
                    push_unique(&mut info.include_dirs, PathBuf::from(dir));
                }
            }
        }

        if let Some(libs) = self.field("Libs") {
            let mut tokens = libs.split_whitespace();
            while let Some(token) = tokens.next() {
                if token == "-L" {
                    if let Some(dir) = tokens.next() {
                        push_unique(&mut info.lib_dirs, PathBuf::from(dir));
                    }
                } else if let Some(dir) = token.strip_prefix("-L") {
                    push_unique(&mut info.lib_dirs, PathBuf::from(dir));
                } else if token == "-framework" {
                    if let Some(framework) = tokens.next() {
                        info.libs.push(format!("-framework {framework}"));
                    }
                } else {
                    info.libs.push(token.to_string());
                }
            }
        }

        info
    }
}

fn is_identifier(s: &str) -> bool {
    !s.is_empty()
        && s.chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '.')
}

fn push_unique<T: PartialEq>(list: &mut Vec<T>, item: T) {
    if !list.contains(&item) {
        list.push(item);
    }
}

/// Module provider backed by `.pc` search directories.
#[derive(Debug, Clone)]
pub struct PkgConfigProvider {
    search_dirs: Vec<PathBuf>,
}

impl PkgConfigProvider {
    pub fn new(search_dirs: Vec<PathBuf>) -> Self {
        PkgConfigProvider { search_dirs }
    }

    /// Locate `<module>.pc`, trying the exact spelling then lowercase.
    pub fn locate(&self, module: &str) -> Option<PathBuf> {
        let lower = module.to_lowercase();
        let mut names = vec![format!("{module}.pc")];
        if lower != module {
            names.push(format!("{lower}.pc"));
        }

        names.iter().find_map(|file| {
            self.search_dirs
                .iter()
                .map(|dir| dir.join(file))
                .find(|candidate| candidate.is_file())
        })
    }

    fn probe_recursive(
        &self,
        module: &str,
        visited: &mut HashSet<String>,
    ) -> Result<Option<ModuleInfo>> {
        if !visited.insert(module.to_lowercase()) {
            return Ok(None);
        }

        let Some(path) = self.locate(module) else {
            return Ok(None);
        };
        let pc = PcFile::load(&path)?;
        let mut info = pc.module_info(module);

        for required in pc.requires() {
            match self.probe_recursive(&required, visited)? {
                Some(dep) => {
                    for dir in dep.include_dirs {
                        push_unique(&mut info.include_dirs, dir);
                    }
                    for dir in dep.lib_dirs {
                        push_unique(&mut info.lib_dirs, dir);
                    }
                    info.libs.extend(dep.libs);
                }
                None => {
                    tracing::debug!(
                        "module `{}` requires `{}`, which was not found",
                        module,
                        required
                    );
                }
            }
        }

        Ok(Some(info))
    }
}

impl ModuleProvider for PkgConfigProvider {
    fn name(&self) -> &str {
        "pkg-config"
    }

    fn probe(&self, module: &str) -> Result<Option<ModuleInfo>> {
        let mut visited = HashSet::new();
        self.probe_recursive(module, &mut visited)
    }
}
