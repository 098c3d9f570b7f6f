//! Resolution error types for the script generator
//!
//! [`ResolutionError`] covers everything that can go wrong after a successful
//! parse: a called function the registry does not permit, or one whose
//! permitted target cannot be rendered as a call.
//!
//! Every variant is fatal for the render; no partial script is returned.

use crate::parser::ast::SourceLocation;
use crate::registry::MethodCategory;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolutionError {
    /// Called function is not in the environment of the requested category
    #[error(
        "Function '{name}' is not permitted in the {category} environment (line {}, column {})",
        .location.line,
        .location.column
    )]
    UnresolvedFunction {
        name: String,
        category: MethodCategory,
        location: SourceLocation,
    },

    /// Permitted, but defined by a script body rather than a packaged function
    #[error(
        "Function '{name}' in the {category} environment is script-defined and cannot be called from an expression (line {}, column {})",
        .location.line,
        .location.column
    )]
    UnsupportedScriptTarget {
        name: String,
        category: MethodCategory,
        location: SourceLocation,
    },
}

impl ResolutionError {
    /// Name of the offending function as written by the analyst
    pub fn name(&self) -> &str {
        match self {
            ResolutionError::UnresolvedFunction { name, .. } => name,
            ResolutionError::UnsupportedScriptTarget { name, .. } => name,
        }
    }

    pub fn location(&self) -> SourceLocation {
        match self {
            ResolutionError::UnresolvedFunction { location, .. } => *location,
            ResolutionError::UnsupportedScriptTarget { location, .. } => *location,
        }
    }
}
