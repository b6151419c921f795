//! Build-option evaluation.
//!
//! Options come from the manifest's `[options]` table, overridden from the
//! command line. Options that need an external tool (coverage, lint,
//! sanitizers) are checked against the environment; a missing tool turns
//! the option off with a warning instead of failing the run.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use serde::Serialize;

use crate::core::linkage::LinkageStyle;
use crate::core::manifest::OptionsTable;

/// Tools accepted for coverage reports, in preference order.
pub const COVERAGE_TOOLS: &[&str] = &["gcovr", "lcov", "llvm-cov", "gcov"];

/// Static analyzers accepted for linting.
pub const LINT_TOOLS: &[&str] = &["clang-tidy", "cppcheck"];

/// Compilers with AddressSanitizer support.
pub const ASAN_TOOLS: &[&str] = &["gcc", "clang"];

/// A named build option.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BuildOption {
    Static,
    Shared,
    Debug,
    Coverage,
    Lint,
    Asan,
    Testing,
}

impl BuildOption {
    pub const ALL: [BuildOption; 7] = [
        BuildOption::Static,
        BuildOption::Shared,
        BuildOption::Debug,
        BuildOption::Coverage,
        BuildOption::Lint,
        BuildOption::Asan,
        BuildOption::Testing,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            BuildOption::Static => "static",
            BuildOption::Shared => "shared",
            BuildOption::Debug => "debug",
            BuildOption::Coverage => "coverage",
            BuildOption::Lint => "lint",
            BuildOption::Asan => "asan",
            BuildOption::Testing => "testing",
        }
    }

    /// Tools the option needs, any one of which suffices.
    pub fn required_tools(&self) -> &'static [&'static str] {
        match self {
            BuildOption::Coverage => COVERAGE_TOOLS,
            BuildOption::Lint => LINT_TOOLS,
            BuildOption::Asan => ASAN_TOOLS,
            _ => &[],
        }
    }
}

impl fmt::Display for BuildOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BuildOption {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        BuildOption::ALL
            .iter()
            .copied()
            .find(|opt| opt.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| {
                format!(
                    "unknown option '{}'; expected one of: static, shared, debug, coverage, lint, asan, testing",
                    s
                )
            })
    }
}

/// Requested option values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BuildOptions {
    #[serde(rename = "static")]
    pub static_lib: bool,
    pub shared: bool,
    pub debug: bool,
    pub coverage: bool,
    pub lint: bool,
    pub asan: bool,
    pub testing: bool,
}

impl Default for BuildOptions {
    fn default() -> Self {
        BuildOptions {
            static_lib: true,
            shared: false,
            debug: false,
            coverage: false,
            lint: false,
            asan: false,
            testing: true,
        }
    }
}

impl BuildOptions {
    /// Options from a manifest table; unset keys keep their defaults.
    pub fn from_table(table: &OptionsTable) -> Self {
        let defaults = BuildOptions::default();
        BuildOptions {
            static_lib: table.static_lib.unwrap_or(defaults.static_lib),
            shared: table.shared.unwrap_or(defaults.shared),
            debug: table.debug.unwrap_or(defaults.debug),
            coverage: table.coverage.unwrap_or(defaults.coverage),
            lint: table.lint.unwrap_or(defaults.lint),
            asan: table.asan.unwrap_or(defaults.asan),
            testing: table.testing.unwrap_or(defaults.testing),
        }
    }

    pub fn get(&self, option: BuildOption) -> bool {
        match option {
            BuildOption::Static => self.static_lib,
            BuildOption::Shared => self.shared,
            BuildOption::Debug => self.debug,
            BuildOption::Coverage => self.coverage,
            BuildOption::Lint => self.lint,
            BuildOption::Asan => self.asan,
            BuildOption::Testing => self.testing,
        }
    }

    pub fn set(&mut self, option: BuildOption, value: bool) {
        let slot = match option {
            BuildOption::Static => &mut self.static_lib,
            BuildOption::Shared => &mut self.shared,
            BuildOption::Debug => &mut self.debug,
            BuildOption::Coverage => &mut self.coverage,
            BuildOption::Lint => &mut self.lint,
            BuildOption::Asan => &mut self.asan,
            BuildOption::Testing => &mut self.testing,
        };
        *slot = value;
    }

    /// Apply `--enable`/`--disable` overrides. Disables win over enables.
    pub fn apply_overrides(&mut self, enable: &[BuildOption], disable: &[BuildOption]) {
        for option in enable {
            self.set(*option, true);
        }
        for option in disable {
            self.set(*option, false);
        }
    }

    /// Check tool-dependent options against the environment.
    pub fn evaluate(self, probe: &dyn ToolProbe) -> EffectiveOptions {
        let mut options = self;
        let mut tools = Vec::new();
        let mut warnings = Vec::new();

        for option in [BuildOption::Coverage, BuildOption::Lint, BuildOption::Asan] {
            if !options.get(option) {
                continue;
            }
            let required = option.required_tools();
            match required
                .iter()
                .find_map(|tool| probe.find(tool).map(|path| (*tool, path)))
            {
                Some((tool, path)) => {
                    tracing::debug!("{} enabled using {} at {}", option, tool, path.display());
                    tools.push(ToolMatch {
                        option,
                        tool: tool.to_string(),
                        path,
                    });
                }
                None => {
                    let message = format!(
                        "{} requested but none of {} found; disabling it",
                        option,
                        required.join(", ")
                    );
                    tracing::warn!("{}", message);
                    warnings.push(message);
                    options.set(option, false);
                }
            }
        }

        if !(options.static_lib || options.shared || options.debug) {
            let message = "no library variant enabled; enabling static".to_string();
            tracing::warn!("{}", message);
            warnings.push(message);
            options.static_lib = true;
        }

        EffectiveOptions {
            options,
            tools,
            warnings,
        }
    }
}

/// Locates external tools.
pub trait ToolProbe {
    fn find(&self, tool: &str) -> Option<PathBuf>;
}

/// Looks tools up on `PATH`.
#[derive(Debug, Clone, Copy, Default)]
pub struct WhichProbe;

impl ToolProbe for WhichProbe {
    fn find(&self, tool: &str) -> Option<PathBuf> {
        which::which(tool).ok()
    }
}

/// A tool chosen for an option.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ToolMatch {
    pub option: BuildOption,
    pub tool: String,
    pub path: PathBuf,
}

/// Options after tool checks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EffectiveOptions {
    pub options: BuildOptions,
    pub tools: Vec<ToolMatch>,
    pub warnings: Vec<String>,
}

impl EffectiveOptions {
    /// Library variants to produce, in preference order.
    pub fn variants(&self) -> Vec<LinkageStyle> {
        let mut out = Vec::new();
        if self.options.static_lib {
            out.push(LinkageStyle::Static);
        }
        if self.options.shared {
            out.push(LinkageStyle::Shared);
        }
        if self.options.debug {
            out.push(LinkageStyle::Debug);
        }
        out
    }

    /// Preferred linkage for dependency lookups.
    pub fn linkage(&self) -> LinkageStyle {
        self.variants().first().copied().unwrap_or_default()
    }

    pub fn is_enabled(&self, option: BuildOption) -> bool {
        self.options.get(option)
    }
}
