//! High-level operations.
//!
//! This module contains the implementation of Lookout commands.

pub mod configure;
pub mod export;
pub mod options;
pub mod resolve;
pub mod uninstall;

pub use configure::{configure, link_plan, ConfigureOptions, ConfigureResult, LinkPlan};
pub use export::{export, export_config, ExportOptions, ExportResult, INSTALL_MANIFEST};
pub use options::{BuildOption, BuildOptions, EffectiveOptions, ToolProbe, WhichProbe};
pub use resolve::{build_resolver, resolve_packages, ResolveOptions, ResolveReport, SearchOverrides};
pub use uninstall::{render_script, write_script};
