//! Property-based tests for parsing and rendering using proptest.
//!
//! These tests verify that:
//! 1. Whitespace between tokens never changes the rendered script
//! 2. Symbols (including `$` chains) render exactly as written
//! 3. Rendering is idempotent where its output stays inside the input grammar

use dsexpr::registry::ResolvedMethod;
use dsexpr::{to_script, MethodCategory, MethodResolver};
use proptest::prelude::*;

struct PermitAll;

impl MethodResolver for PermitAll {
    fn resolve(&self, name: &str, _category: MethodCategory) -> Option<ResolvedMethod> {
        Some(ResolvedMethod::packaged(name, format!("pkg::{name}")))
    }
}

fn render(text: &str) -> Result<String, String> {
    to_script(text, &PermitAll, MethodCategory::Aggregate).map_err(|err| err.to_string())
}

// Strategies produce token lists; tokens never contain whitespace themselves

fn ident_strategy() -> impl Strategy<Value = String> {
    "[a-z][a-z0-9_.]{0,6}".prop_map(|s| s.to_string())
}

fn leaf_strategy() -> impl Strategy<Value = Vec<String>> {
    prop_oneof![
        ident_strategy(),
        (0u32..1000).prop_map(|n| n.to_string()),
        (1u32..1000).prop_map(|n| format!("-{n}")),
        (0u32..100, 0u32..100).prop_map(|(a, b)| format!("{a}.{b}")),
        (0u32..100).prop_map(|n| format!("{n}L")),
        "[a-z0-9_]{1,6}".prop_map(|s| format!("'{s}'")),
    ]
    .prop_map(|token| vec![token])
}

fn op_strategy() -> impl Strategy<Value = &'static str> {
    prop_oneof![
        Just("+"),
        Just("-"),
        Just("*"),
        Just("/"),
        Just("^"),
        Just(":"),
        Just("%in%"),
    ]
}

fn expr_strategy() -> impl Strategy<Value = Vec<String>> {
    leaf_strategy().prop_recursive(4, 32, 3, |inner| {
        prop_oneof![
            (inner.clone(), op_strategy(), inner.clone()).prop_map(|(left, op, right)| {
                let mut tokens = vec!["(".to_string()];
                tokens.extend(left);
                tokens.push(op.to_string());
                tokens.extend(right);
                tokens.push(")".to_string());
                tokens
            }),
            (
                "[a-z][a-z0-9]{0,4}",
                prop::collection::vec((prop::option::of(ident_strategy()), inner.clone()), 0..3)
            )
                .prop_map(|(name, args)| {
                    let mut tokens = vec![name, "(".to_string()];
                    for (i, (arg_name, value)) in args.into_iter().enumerate() {
                        if i > 0 {
                            tokens.push(",".to_string());
                        }
                        if let Some(arg_name) = arg_name {
                            tokens.push(arg_name);
                            tokens.push("=".to_string());
                        }
                        tokens.extend(value);
                    }
                    tokens.push(")".to_string());
                    tokens
                }),
            ("[A-Z][a-z]{0,3}", inner).prop_map(|(base, index)| {
                let mut tokens = vec![base, "[".to_string()];
                tokens.extend(index);
                tokens.push("]".to_string());
                tokens
            }),
        ]
    })
}

fn index_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        ident_strategy(),
        (1u32..100).prop_map(|n| n.to_string()),
        (1u32..100).prop_map(|n| format!("-{n}")),
        (1u32..50, 1u32..50).prop_map(|(a, b)| format!("{a}:{b}")),
    ]
}

proptest! {
    #[test]
    fn whitespace_does_not_change_rendering(
        tokens in expr_strategy(),
        separator in "[ \t\n]{0,2}",
    ) {
        let spaced = render(&tokens.join(" "));
        prop_assert!(spaced.is_ok(), "{:?} failed: {:?}", tokens, spaced);
        prop_assert_eq!(render(&tokens.join(separator.as_str())), spaced);
    }

    #[test]
    fn symbols_render_verbatim(
        segments in prop::collection::vec("[A-Za-z][A-Za-z0-9._]{0,6}", 1..4),
    ) {
        let text = segments.join("$");
        prop_assert_eq!(render(&text), Ok(text.clone()));
    }

    #[test]
    fn subsets_are_idempotent(
        base in "[A-Z][a-zA-Z0-9]{0,4}",
        row in prop::option::of(index_strategy()),
        column in prop::option::of(index_strategy()),
    ) {
        let text = match (row, column) {
            (None, None) => format!("{base}[]"),
            (Some(i), None) => format!("{base}[{i}]"),
            (Some(i), Some(j)) => format!("{base}[{i}, {j}]"),
            (None, Some(j)) => format!("{base}[, {j}]"),
        };
        let once = render(&text);
        prop_assert!(once.is_ok(), "{} failed: {:?}", text, once);
        let once = once.unwrap_or_default();
        prop_assert_eq!(render(&once), Ok(once.clone()));
    }

    #[test]
    fn formulas_are_idempotent(
        lhs in prop::option::of(expr_strategy()),
        rhs in expr_strategy(),
    ) {
        let text = format!("{} ~ {}", lhs.unwrap_or_default().join(" "), rhs.join(" "));
        let once = render(&text);
        prop_assert!(once.is_ok(), "{} failed: {:?}", text, once);
        let once = once.unwrap_or_default();
        prop_assert_eq!(render(&once), Ok(once.clone()));
    }
}
