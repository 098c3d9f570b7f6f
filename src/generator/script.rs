//! Qualified script generation
//!
//! Walks the AST once and appends text to a single output buffer:
//!
//! - symbols and literals are emitted verbatim
//! - each binary operator becomes an explicit call into the base namespace,
//!   e.g. `A + B` → `base::'+'(A, B)`
//! - parentheses are dropped, since nesting already carries the grouping
//! - every function call is resolved through the [`MethodResolver`] and
//!   emitted under its permitted target name
//! - formulas are handed to the native formula renderer
//!
//! Subset index slots are rendered in a separate mode where `:` stays native,
//! so `A[2, 1:2]` comes out unchanged.

use crate::parser::ast::{Argument, AstNode, BinOp, SourceLocation};
use crate::registry::{MethodCategory, MethodResolver, ResolvedMethod};
use tracing::{debug, warn};

use super::errors::ResolutionError;
use super::formula::write_native;

/// Namespace operator calls are qualified with unless overridden
pub const DEFAULT_BASE_NAMESPACE: &str = "base";

/// Renders ASTs against one resolver and one method category
pub struct ScriptGenerator<'a> {
    resolver: &'a dyn MethodResolver,
    category: MethodCategory,
    base_namespace: String,
}

impl<'a> ScriptGenerator<'a> {
    pub fn new(resolver: &'a dyn MethodResolver, category: MethodCategory) -> Self {
        Self {
            resolver,
            category,
            base_namespace: DEFAULT_BASE_NAMESPACE.to_string(),
        }
    }

    pub fn with_base_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.base_namespace = namespace.into();
        self
    }

    pub fn category(&self) -> MethodCategory {
        self.category
    }

    /// Render `root` as an executable script.
    ///
    /// Fails on the first call (in left-to-right, outer-first order) that the
    /// resolver does not permit.
    pub fn to_script(&self, root: &AstNode) -> Result<String, ResolutionError> {
        debug!(category = %self.category, "rendering expression");
        let mut out = String::new();
        self.write_expr(root, &mut out)?;
        Ok(out)
    }

    fn write_expr(&self, node: &AstNode, out: &mut String) -> Result<(), ResolutionError> {
        match node {
            AstNode::Symbol { .. } | AstNode::NumberLiteral { .. } | AstNode::StringLiteral { .. } => {
                write_atom(node, out);
                Ok(())
            }
            AstNode::Group { inner, .. } => self.write_expr(inner, out),
            AstNode::BinaryOp {
                op, left, right, ..
            } => self.write_operator_call(*op, left, right, out),
            AstNode::FunctionCall {
                name,
                args,
                location,
            } => self.write_call(name, args, *location, out),
            AstNode::Subset { base, indices, .. } => self.write_subset(base, indices, out),
            AstNode::Formula { .. } => {
                write_native(node, out);
                Ok(())
            }
        }
    }

    fn write_operator_call(
        &self,
        op: BinOp,
        left: &AstNode,
        right: &AstNode,
        out: &mut String,
    ) -> Result<(), ResolutionError> {
        out.push_str(&self.base_namespace);
        out.push_str("::'");
        out.push_str(op.symbol());
        out.push_str("'(");
        self.write_expr(left, out)?;
        out.push_str(", ");
        self.write_expr(right, out)?;
        out.push(')');
        Ok(())
    }

    fn write_call(
        &self,
        name: &str,
        args: &[Argument],
        location: SourceLocation,
        out: &mut String,
    ) -> Result<(), ResolutionError> {
        let target = match self.resolver.resolve(name, self.category) {
            Some(ResolvedMethod::Packaged(function)) => function.function,
            Some(ResolvedMethod::Script(_)) => {
                warn!(function = name, category = %self.category, "script-defined function called from expression");
                return Err(ResolutionError::UnsupportedScriptTarget {
                    name: name.to_string(),
                    category: self.category,
                    location,
                });
            }
            None => {
                warn!(function = name, category = %self.category, "function not permitted");
                return Err(ResolutionError::UnresolvedFunction {
                    name: name.to_string(),
                    category: self.category,
                    location,
                });
            }
        };

        out.push_str(&target);
        out.push('(');
        for (i, arg) in args.iter().enumerate() {
            if i > 0 {
                out.push_str(", ");
            }
            if let Some(arg_name) = &arg.name {
                out.push_str(arg_name);
                out.push_str(" = ");
            }
            self.write_expr(&arg.value, out)?;
        }
        out.push(')');
        Ok(())
    }

    fn write_subset(
        &self,
        base: &AstNode,
        indices: &[Option<AstNode>],
        out: &mut String,
    ) -> Result<(), ResolutionError> {
        self.write_expr(base, out)?;
        out.push('[');
        match indices {
            // [, j] selects column j
            [None, Some(column)] => self.write_index(column, out)?,
            slots => {
                for (i, slot) in slots.iter().enumerate() {
                    if i > 0 {
                        out.push_str(", ");
                    }
                    if let Some(index) = slot {
                        self.write_index(index, out)?;
                    }
                }
            }
        }
        out.push(']');
        Ok(())
    }

    /// Index slot rendering: `:` stays native, everything else is qualified
    fn write_index(&self, node: &AstNode, out: &mut String) -> Result<(), ResolutionError> {
        match node {
            AstNode::BinaryOp {
                op: BinOp::Range,
                left,
                right,
                ..
            } => {
                self.write_index(left, out)?;
                out.push(':');
                self.write_index(right, out)
            }
            AstNode::Group { inner, .. } if is_range(inner) => {
                out.push('(');
                self.write_index(inner, out)?;
                out.push(')');
                Ok(())
            }
            AstNode::Group { inner, .. } => self.write_index(inner, out),
            _ => self.write_expr(node, out),
        }
    }
}

fn is_range(node: &AstNode) -> bool {
    matches!(
        node,
        AstNode::BinaryOp {
            op: BinOp::Range,
            ..
        }
    )
}

/// Verbatim text of a symbol or literal; other nodes write nothing
pub(crate) fn write_atom(node: &AstNode, out: &mut String) {
    match node {
        AstNode::Symbol { segments, .. } => {
            for (i, segment) in segments.iter().enumerate() {
                if i > 0 {
                    out.push('$');
                }
                out.push_str(segment);
            }
        }
        AstNode::NumberLiteral { text, .. } => out.push_str(text),
        AstNode::StringLiteral { text, quote, .. } => {
            out.push(quote.as_char());
            out.push_str(text);
            out.push(quote.as_char());
        }
        _ => {}
    }
}
