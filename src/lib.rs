//! # Introduction
//!
//! dsexpr turns untrusted analyst-supplied expressions written in a restricted
//! subset of R into executable scripts in which every function call has been
//! checked against an administrator-controlled registry of permitted methods.
//! Operators are rewritten into explicit, fully qualified calls so that nothing
//! in the output can be shadowed by user-defined bindings.
//!
//! ## Pipeline
//!
//! ```text
//! Expression text → Lexer → Parser → AST → ScriptGenerator (+ Registry) → Script
//! ```
//!
//! 1. [`parser`] tokenises the text, rejects forbidden characters in string
//!    literals and builds an AST of symbols, literals, binary operators,
//!    subsets, calls and formulas.
//! 2. [`registry`] holds the permitted methods per [`MethodCategory`] and the
//!    configuration options, loadable from YAML and shareable across threads
//!    through [`SharedRegistry`] snapshots.
//! 3. [`generator`] walks the AST once, resolving each call through a
//!    [`MethodResolver`] and qualifying operators into the base namespace.
//!    Formulas are emitted natively.
//!
//! ## Example
//!
//! ```
//! use dsexpr::{to_script, MethodCategory, Registry, ResolvedMethod};
//!
//! let mut registry = Registry::new();
//! registry.add_method(
//!     MethodCategory::Aggregate,
//!     ResolvedMethod::packaged("meanDS", "dsBase::meanDS"),
//! );
//!
//! let script = to_script("meanDS(D$age + 1)", &registry, MethodCategory::Aggregate).unwrap();
//! assert_eq!(script, "dsBase::meanDS(base::'+'(D$age, 1))");
//! ```

pub mod error;
pub mod generator;
pub mod parser;
pub mod registry;

pub use error::Error;
pub use generator::{render, ResolutionError, ScriptGenerator};
pub use parser::ast::{AstNode, SourceLocation};
pub use parser::parse;
pub use parser::parser::ParseError;
pub use registry::{
    ConfigError, MethodCategory, MethodResolver, Registry, ResolvedMethod, SharedRegistry,
};

/// Parse `text` and render it against `resolver` in one step
pub fn to_script(
    text: &str,
    resolver: &dyn MethodResolver,
    category: MethodCategory,
) -> Result<String, Error> {
    let ast = parse(text)?;
    Ok(render(&ast, resolver, category)?)
}
