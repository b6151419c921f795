//! Core data structures for Lookout.
//!
//! - Package names and the target spellings derived from them
//! - Targets, library references and the target registry
//! - The run-scoped resolution state
//! - Project manifests

pub mod linkage;
pub mod manifest;
pub mod name;
pub mod registry;
pub mod scope;
pub mod target;

pub use linkage::LinkageStyle;
pub use manifest::{find_manifest, Manifest, MANIFEST_NAME};
pub use name::PackageName;
pub use registry::TargetRegistry;
pub use scope::Scope;
pub use target::{LinkRef, TargetDescriptor, TargetKind};
