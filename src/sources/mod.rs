//! Discovery backends.
//!
//! Backends locate package descriptions on disk: native package configs
//! (install prefixes, vcpkg), pkg-config module files, and the heuristic
//! filesystem scan.

pub mod package_config;
pub mod pkgconfig;
pub mod prefix;
pub mod scan;
pub mod source;
pub mod vcpkg;

pub use package_config::PackageConfig;
pub use pkgconfig::PkgConfigProvider;
pub use prefix::PrefixPackageManager;
pub use scan::FilesystemScanner;
pub use source::{ModuleInfo, ModuleProvider, PackageManager};
pub use vcpkg::VcpkgPackageManager;
