//! Shared utilities

pub mod config;
pub mod context;
pub mod diagnostic;
pub mod fs;
pub mod shell;
pub mod vcpkg;

pub use config::{Config, SearchRoots};
pub use context::GlobalContext;
pub use diagnostic::Diagnostic;
pub use shell::Shell;
pub use vcpkg::VcpkgIntegration;
