//! Script generation from parsed expressions
//!
//! - [`script`]: [`ScriptGenerator`], the qualified renderer and index mode
//! - `formula`: compact native rendering used for formulas
//! - [`errors`]: [`ResolutionError`]
//!
//! Rendering is a pure function of the AST, the resolver view and the
//! category; it never mutates either input.

pub mod errors;
mod formula;
pub mod script;

pub use errors::ResolutionError;
pub use script::{ScriptGenerator, DEFAULT_BASE_NAMESPACE};

use crate::parser::ast::AstNode;
use crate::registry::{MethodCategory, MethodResolver};

/// Render `ast` with the default base namespace
pub fn render(
    ast: &AstNode,
    resolver: &dyn MethodResolver,
    category: MethodCategory,
) -> Result<String, ResolutionError> {
    ScriptGenerator::new(resolver, category).to_script(ast)
}
