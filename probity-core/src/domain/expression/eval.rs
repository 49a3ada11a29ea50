// probity-core/src/domain/expression/eval.rs

use super::ExprError;
use super::ast::{BinaryOp, Expr, StrFunction, Value};
use std::cmp::Ordering;
use std::collections::HashMap;

/// The values of one row, keyed by column name. Bindings borrow from the
/// dataset so building a scope per row costs no allocations beyond the
/// map itself.
#[derive(Debug, Default)]
pub struct RowScope<'a> {
    bindings: HashMap<&'a str, &'a str>,
}

impl<'a> RowScope<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn bind(&mut self, column: &'a str, value: &'a str) {
        self.bindings.insert(column, value);
    }

    pub fn get(&self, column: &str) -> Option<&'a str> {
        self.bindings.get(column).copied()
    }
}

pub fn evaluate(expr: &Expr, scope: &RowScope<'_>) -> Result<Value, ExprError> {
    match expr {
        Expr::Literal(value) => Ok(value.clone()),
        Expr::Column(name) => scope
            .get(name)
            .map(|v| Value::Str(v.to_string()))
            .ok_or_else(|| ExprError::UnboundColumn(name.clone())),
        Expr::Not(inner) => match evaluate(inner, scope)? {
            Value::Bool(b) => Ok(Value::Bool(!b)),
            other => Err(type_mismatch("not", &[&other])),
        },
        Expr::Neg(inner) => {
            let value = evaluate(inner, scope)?;
            match value.as_number() {
                Some(n) => Ok(Value::Number(-n)),
                None => Err(type_mismatch("-", &[&value])),
            }
        }
        Expr::Binary { op, lhs, rhs } => binary(*op, lhs, rhs, scope),
        Expr::Call { function, args } => call(*function, args, scope),
    }
}

fn binary(op: BinaryOp, lhs: &Expr, rhs: &Expr, scope: &RowScope<'_>) -> Result<Value, ExprError> {
    // Boolean connectives short-circuit; everything else evaluates both
    // operands first.
    if matches!(op, BinaryOp::And | BinaryOp::Or) {
        let left = as_bool(op.symbol(), evaluate(lhs, scope)?)?;
        return match (op, left) {
            (BinaryOp::And, false) => Ok(Value::Bool(false)),
            (BinaryOp::Or, true) => Ok(Value::Bool(true)),
            _ => Ok(Value::Bool(as_bool(op.symbol(), evaluate(rhs, scope)?)?)),
        };
    }

    let left = evaluate(lhs, scope)?;
    let right = evaluate(rhs, scope)?;

    match op {
        BinaryOp::Eq => Ok(Value::Bool(compare(&left, &right) == Ordering::Equal)),
        BinaryOp::Ne => Ok(Value::Bool(compare(&left, &right) != Ordering::Equal)),
        BinaryOp::Lt => Ok(Value::Bool(compare(&left, &right) == Ordering::Less)),
        BinaryOp::Le => Ok(Value::Bool(compare(&left, &right) != Ordering::Greater)),
        BinaryOp::Gt => Ok(Value::Bool(compare(&left, &right) == Ordering::Greater)),
        BinaryOp::Ge => Ok(Value::Bool(compare(&left, &right) != Ordering::Less)),
        BinaryOp::Add | BinaryOp::Sub | BinaryOp::Mul | BinaryOp::Div | BinaryOp::Rem => {
            arithmetic(op, &left, &right)
        }
        BinaryOp::And | BinaryOp::Or => unreachable!("handled above"),
    }
}

/// Numeric comparison when both operands are numeric-looking, otherwise
/// lexicographic over the rendered forms.
fn compare(left: &Value, right: &Value) -> Ordering {
    if let (Some(a), Some(b)) = (left.as_number(), right.as_number()) {
        a.total_cmp(&b)
    } else {
        left.render().cmp(&right.render())
    }
}

fn arithmetic(op: BinaryOp, left: &Value, right: &Value) -> Result<Value, ExprError> {
    let (Some(a), Some(b)) = (left.as_number(), right.as_number()) else {
        return Err(type_mismatch(op.symbol(), &[left, right]));
    };
    match op {
        BinaryOp::Add => Ok(Value::Number(a + b)),
        BinaryOp::Sub => Ok(Value::Number(a - b)),
        BinaryOp::Mul => Ok(Value::Number(a * b)),
        BinaryOp::Div if b == 0.0 => Err(ExprError::DivisionByZero),
        BinaryOp::Div => Ok(Value::Number(a / b)),
        BinaryOp::Rem if b == 0.0 => Err(ExprError::DivisionByZero),
        BinaryOp::Rem => Ok(Value::Number(a % b)),
        _ => unreachable!("non-arithmetic op"),
    }
}

fn call(function: StrFunction, args: &[Expr], scope: &RowScope<'_>) -> Result<Value, ExprError> {
    let mut values = Vec::with_capacity(args.len());
    for arg in args {
        values.push(evaluate(arg, scope)?.render());
    }
    match function {
        StrFunction::Len => Ok(Value::Number(values[0].chars().count() as f64)),
        StrFunction::StartsWith => Ok(Value::Bool(values[0].starts_with(&values[1]))),
        StrFunction::EndsWith => Ok(Value::Bool(values[0].ends_with(&values[1]))),
        StrFunction::Contains => Ok(Value::Bool(values[0].contains(&values[1]))),
    }
}

fn as_bool(operator: &'static str, value: Value) -> Result<bool, ExprError> {
    match value {
        Value::Bool(b) => Ok(b),
        other => Err(type_mismatch(operator, &[&other])),
    }
}

fn type_mismatch(operator: &'static str, operands: &[&Value]) -> ExprError {
    let operands = operands
        .iter()
        .map(|v| format!("{} '{}'", v.kind(), v.render()))
        .collect::<Vec<_>>()
        .join(" and ");
    ExprError::TypeMismatch { operator, operands }
}

// --- UNIT TESTS ---
#[cfg(test)]
mod tests {
    use super::*;

    fn eval_str(source: &str, scope: &RowScope<'_>) -> Result<Value, ExprError> {
        let tokens = crate::domain::expression::lexer::tokenize(source)?;
        let expr = crate::domain::expression::parser::parse(tokens)?;
        evaluate(&expr, scope)
    }

    #[test]
    fn test_short_circuit_skips_rhs_errors() {
        // rhs would be a type mismatch, but the lhs decides the result
        let scope = RowScope::new();
        assert_eq!(
            eval_str("false and (1 + 'x' > 0)", &scope),
            Ok(Value::Bool(false))
        );
        assert_eq!(
            eval_str("true or (1 + 'x' > 0)", &scope),
            Ok(Value::Bool(true))
        );
    }

    #[test]
    fn test_mixed_numeric_string_comparison() {
        let mut scope = RowScope::new();
        scope.bind("A", "10");
        // "10" < "9" lexicographically, but both are numeric-looking
        assert_eq!(eval_str("[A] > 9", &scope), Ok(Value::Bool(true)));
    }

    #[test]
    fn test_unbound_column() {
        let scope = RowScope::new();
        assert_eq!(
            eval_str("[Ghost] == 1", &scope),
            Err(ExprError::UnboundColumn("Ghost".to_string()))
        );
    }

    #[test]
    fn test_modulo_and_negation() {
        let scope = RowScope::new();
        assert_eq!(eval_str("7 % 2", &scope), Ok(Value::Number(1.0)));
        assert_eq!(eval_str("-3 + 5", &scope), Ok(Value::Number(2.0)));
        assert_eq!(eval_str("7 % 0", &scope), Err(ExprError::DivisionByZero));
    }

    #[test]
    fn test_boolean_equality() {
        let scope = RowScope::new();
        assert_eq!(eval_str("true == true", &scope), Ok(Value::Bool(true)));
        assert_eq!(eval_str("not false", &scope), Ok(Value::Bool(true)));
    }
}
