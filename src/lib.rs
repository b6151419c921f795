//! Lookout - dependency discovery for C and C++ projects
//!
//! This crate resolves requested package names to linkable targets through a
//! prioritized chain of discovery strategies, and provides the project
//! operations built on top of it: build-option policy, configuration,
//! package-config export and uninstall-script generation.

pub mod core;
pub mod ops;
pub mod resolver;
pub mod sources;
pub mod util;

pub use core::{Manifest, PackageName, Scope};
pub use resolver::{Discovery, Found, Requirement, Resolution, Resolver};
pub use util::context::GlobalContext;
