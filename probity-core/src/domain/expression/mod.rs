// probity-core/src/domain/expression/mod.rs
//
// The business-rule sublanguage: bracketed column references combined
// with comparison, boolean and arithmetic operators plus a few string
// predicates, e.g. `[A] > [B] and startswith([Code], "AB")`.
//
// Expressions originate from a metadata file, an untrusted-by-default
// configuration surface, so evaluation goes through a closed grammar
// (tokenize -> parse -> walk a tagged AST) rather than any
// general-purpose evaluator.

pub mod ast;
pub mod eval;
pub mod lexer;
pub mod parser;

pub use ast::{BinaryOp, Expr, StrFunction, Value};
pub use eval::RowScope;

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ExprError {
    #[error("unexpected character '{0}' in expression")]
    UnexpectedChar(char),

    #[error("unterminated string literal")]
    UnterminatedString,

    #[error("unterminated column reference (missing ']')")]
    UnterminatedColumn,

    #[error("malformed number '{0}'")]
    MalformedNumber(String),

    #[error("unexpected token {0}")]
    UnexpectedToken(String),

    #[error("unexpected end of expression")]
    UnexpectedEnd,

    #[error("unknown function '{0}'")]
    UnknownFunction(String),

    #[error("function '{function}' expects {expected} argument(s), got {got}")]
    BadArity {
        function: &'static str,
        expected: usize,
        got: usize,
    },

    #[error("type mismatch: operator '{operator}' cannot be applied to {operands}")]
    TypeMismatch {
        operator: &'static str,
        operands: String,
    },

    #[error("division by zero")]
    DivisionByZero,

    #[error("column '{0}' is not bound in the row scope")]
    UnboundColumn(String),

    #[error("expression result is not a boolean (got '{0}')")]
    NotBoolean(String),
}

/// An expression parsed once and evaluated per row. Evaluation is
/// stateless and deterministic: same source + same row scope, same
/// result.
#[derive(Debug, Clone)]
pub struct CompiledExpression {
    source: String,
    ast: Expr,
    columns: Vec<String>,
}

impl CompiledExpression {
    pub fn compile(source: &str) -> Result<Self, ExprError> {
        let tokens = lexer::tokenize(source)?;
        let ast = parser::parse(tokens)?;
        let mut columns = Vec::new();
        ast.collect_columns(&mut columns);
        Ok(Self {
            source: source.to_string(),
            ast,
            columns,
        })
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    /// Distinct referenced columns, in order of first appearance in the
    /// parsed tree.
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn evaluate(&self, scope: &RowScope<'_>) -> Result<bool, ExprError> {
        match eval::evaluate(&self.ast, scope)? {
            Value::Bool(b) => Ok(b),
            other => Err(ExprError::NotBoolean(other.render())),
        }
    }
}

/// Distinct bracketed identifiers referenced by an expression source, in
/// order of first appearance. Works on the raw text so the validator can
/// resolve columns (and fail fast on unknown ones) before parsing.
pub fn referenced_columns(source: &str) -> Vec<String> {
    let mut columns: Vec<String> = Vec::new();
    let mut chars = source.chars();
    while let Some(c) = chars.next() {
        if c != '[' {
            continue;
        }
        let mut name = String::new();
        for inner in chars.by_ref() {
            if inner == ']' {
                break;
            }
            name.push(inner);
        }
        let name = name.trim().to_string();
        if !name.is_empty() && !columns.contains(&name) {
            columns.push(name);
        }
    }
    columns
}

/// Substitutes each bracketed reference with that row's literal value,
/// quoted, yielding the concrete per-row expression. Only used to build
/// human-readable violation descriptions.
pub fn render(source: &str, scope: &RowScope<'_>) -> String {
    let mut out = String::with_capacity(source.len());
    let mut chars = source.chars().peekable();
    while let Some(c) = chars.next() {
        if c != '[' {
            out.push(c);
            continue;
        }
        let mut name = String::new();
        let mut closed = false;
        for inner in chars.by_ref() {
            if inner == ']' {
                closed = true;
                break;
            }
            name.push(inner);
        }
        match scope.get(name.trim()) {
            Some(value) if closed => {
                out.push('\'');
                out.push_str(value);
                out.push('\'');
            }
            _ => {
                // Unknown reference or dangling bracket: keep the
                // original text so the description stays meaningful.
                out.push('[');
                out.push_str(&name);
                if closed {
                    out.push(']');
                }
            }
        }
    }
    out
}

// --- UNIT TESTS ---
#[cfg(test)]
mod tests {
    use super::*;

    fn scope<'a>(bindings: &[(&'a str, &'a str)]) -> RowScope<'a> {
        let mut scope = RowScope::new();
        for (name, value) in bindings {
            scope.bind(name, value);
        }
        scope
    }

    #[test]
    fn test_referenced_columns_deduplicated_in_order() {
        let columns = referenced_columns("[B] > [A] or [B] == 0");
        assert_eq!(columns, vec!["B".to_string(), "A".to_string()]);
        assert!(referenced_columns("1 > 2").is_empty());
    }

    #[test]
    fn test_numeric_comparison() {
        let expr = CompiledExpression::compile("[A] > [B]").unwrap();
        assert_eq!(expr.columns(), ["A".to_string(), "B".to_string()]);
        assert_eq!(expr.source(), "[A] > [B]");
        assert!(expr.evaluate(&scope(&[("A", "5"), ("B", "2")])).unwrap());
        assert!(!expr.evaluate(&scope(&[("A", "1"), ("B", "9")])).unwrap());
    }

    #[test]
    fn test_operator_precedence() {
        let expr = CompiledExpression::compile("1 + 2 * 3 == 7").unwrap();
        assert!(expr.evaluate(&RowScope::new()).unwrap());

        let expr = CompiledExpression::compile("(1 + 2) * 3 == 9").unwrap();
        assert!(expr.evaluate(&RowScope::new()).unwrap());
    }

    #[test]
    fn test_boolean_connectives() {
        let expr = CompiledExpression::compile("[A] == 'x' or not ([B] < 10)").unwrap();
        assert!(expr.evaluate(&scope(&[("A", "x"), ("B", "3")])).unwrap());
        assert!(expr.evaluate(&scope(&[("A", "y"), ("B", "12")])).unwrap());
        assert!(!expr.evaluate(&scope(&[("A", "y"), ("B", "3")])).unwrap());
    }

    #[test]
    fn test_string_predicates() {
        let expr = CompiledExpression::compile("startswith([Code], 'AB') and len([Code]) == 4")
            .unwrap();
        assert!(expr.evaluate(&scope(&[("Code", "AB12")])).unwrap());
        assert!(!expr.evaluate(&scope(&[("Code", "XY12")])).unwrap());
    }

    #[test]
    fn test_string_comparison_falls_back_to_lexicographic() {
        let expr = CompiledExpression::compile("[A] < [B]").unwrap();
        assert!(expr.evaluate(&scope(&[("A", "apple"), ("B", "pear")])).unwrap());
    }

    #[test]
    fn test_evaluation_errors_are_values_not_panics() {
        let expr = CompiledExpression::compile("[A] / [B] > 1").unwrap();
        assert_eq!(
            expr.evaluate(&scope(&[("A", "4"), ("B", "0")])),
            Err(ExprError::DivisionByZero)
        );

        let expr = CompiledExpression::compile("[A] + 1 > 0").unwrap();
        assert!(matches!(
            expr.evaluate(&scope(&[("A", "oops")])),
            Err(ExprError::TypeMismatch { .. })
        ));
    }

    #[test]
    fn test_non_boolean_result_rejected() {
        let expr = CompiledExpression::compile("[A] + 1").unwrap();
        assert!(matches!(
            expr.evaluate(&scope(&[("A", "1")])),
            Err(ExprError::NotBoolean(_))
        ));
    }

    #[test]
    fn test_render_substitutes_quoted_values() {
        let rendered = render("[A] > [B]", &scope(&[("A", "5"), ("B", "2")]));
        assert_eq!(rendered, "'5' > '2'");

        // unknown reference stays as-is
        let rendered = render("[A] > [C]", &scope(&[("A", "5")]));
        assert_eq!(rendered, "'5' > [C]");
    }

    #[test]
    fn test_same_row_same_result() {
        let expr = CompiledExpression::compile("[A] * 2 >= [B]").unwrap();
        let s = scope(&[("A", "3"), ("B", "6")]);
        let first = expr.evaluate(&s).unwrap();
        for _ in 0..10 {
            assert_eq!(expr.evaluate(&s).unwrap(), first);
        }
    }
}
