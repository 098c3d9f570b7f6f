//! Crate-level error returned by [`crate::to_script`]

use crate::generator::ResolutionError;
use crate::parser::ast::SourceLocation;
use crate::parser::parser::ParseError;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error(transparent)]
    Resolution(#[from] ResolutionError),
}

impl Error {
    /// Where in the expression text the failure was detected
    pub fn location(&self) -> SourceLocation {
        match self {
            Error::Parse(err) => err.location(),
            Error::Resolution(err) => err.location(),
        }
    }
}
