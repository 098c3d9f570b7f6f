// Native rendering of formulas: compact, parentheses kept, calls unresolved

use crate::parser::ast::AstNode;

use super::script::write_atom;

/// Append the native text of `node` to `out`.
///
/// The output uses no spaces, keeps every parenthesized group and leaves
/// function names and subsets exactly as written, so the modelling function
/// receiving the formula sees what the analyst wrote.
pub(crate) fn write_native(node: &AstNode, out: &mut String) {
    match node {
        AstNode::Symbol { .. } | AstNode::NumberLiteral { .. } | AstNode::StringLiteral { .. } => {
            write_atom(node, out)
        }
        AstNode::Group { inner, .. } => {
            out.push('(');
            write_native(inner, out);
            out.push(')');
        }
        AstNode::BinaryOp {
            op, left, right, ..
        } => {
            write_native(left, out);
            out.push_str(op.symbol());
            write_native(right, out);
        }
        AstNode::FunctionCall { name, args, .. } => {
            out.push_str(name);
            out.push('(');
            for (i, arg) in args.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                if let Some(name) = &arg.name {
                    out.push_str(name);
                    out.push('=');
                }
                write_native(&arg.value, out);
            }
            out.push(')');
        }
        AstNode::Subset { base, indices, .. } => {
            write_native(base, out);
            out.push('[');
            for (i, slot) in indices.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                if let Some(index) = slot {
                    write_native(index, out);
                }
            }
            out.push(']');
        }
        AstNode::Formula { lhs, rhs, .. } => {
            if let Some(lhs) = lhs {
                write_native(lhs, out);
            }
            out.push('~');
            write_native(rhs, out);
        }
    }
}
