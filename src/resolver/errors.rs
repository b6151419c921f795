//! Resolution error types and diagnostics.

use miette::Diagnostic as MietteDiagnostic;
use thiserror::Error;

use crate::util::diagnostic::{suggestions, Diagnostic};

/// Error during package resolution.
#[derive(Debug, Error, MietteDiagnostic)]
pub enum ResolveError {
    /// A required package could not be found by any strategy.
    #[error("required package `{package}` could not be found")]
    #[diagnostic(code(lookout::resolve::missing_dependency))]
    MissingDependency {
        package: String,
        /// Strategy tiers that ran before giving up
        attempted: Vec<String>,
    },

    #[error("invalid package name `{name}`: {reason}")]
    #[diagnostic(code(lookout::resolve::invalid_name))]
    InvalidName { name: String, reason: String },

    /// A discovery backend located something but could not read it.
    #[error("{source_name} discovery failed for `{package}`: {message}")]
    #[diagnostic(code(lookout::resolve::discovery))]
    Discovery {
        source_name: String,
        package: String,
        message: String,
    },
}

impl ResolveError {
    /// Convert to a user-friendly diagnostic.
    pub fn to_diagnostic(&self) -> Diagnostic {
        match self {
            ResolveError::MissingDependency { package, attempted } => {
                let mut diag = Diagnostic::error(format!(
                    "required package `{}` could not be found",
                    package
                ));

                if !attempted.is_empty() {
                    diag = diag.with_context(format!("tried: {}", attempted.join(", ")));
                }

                diag.with_suggestion(format!(
                    "Install `{}` or add its install prefix to {}",
                    package,
                    crate::util::config::PREFIX_PATH_ENV
                ))
                .with_suggestion(format!(
                    "Provide a `{}.pc` file on PKG_CONFIG_PATH",
                    package.to_lowercase()
                ))
                .with_suggestion(suggestions::SEARCH_ROOTS)
            }

            ResolveError::InvalidName { name, reason } => {
                Diagnostic::error(format!("invalid package name `{}`", name))
                    .with_context(reason.clone())
                    .with_suggestion("Use a bare name (`zlib`) or a qualified target (`ZLIB::ZLIB`)")
            }

            ResolveError::Discovery {
                source_name,
                package,
                message,
            } => Diagnostic::error(format!("{} discovery failed for `{}`", source_name, package))
                .with_context(message.clone())
                .with_suggestion(suggestions::VERBOSE),
        }
    }
}
