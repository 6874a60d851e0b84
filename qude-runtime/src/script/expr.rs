//! # 表达式求值
//!
//! 求值从不失败：
//! - 未设置的变量读作数字 0
//! - 非数字参与 `-`、`*`、`/`，或除数为 0，结果都是数字 0
//! - `+` 任一侧是文本时按显示形式拼接

use crate::script::{BinaryOperator, Expr};
use crate::session::{INPUT_ALIAS, INPUT_VARIABLE, Value};

/// 求值上下文
pub trait EvalContext {
    /// 获取变量值
    fn get_var(&self, name: &str) -> Option<&Value>;
}

/// 求值表达式
pub fn evaluate(expr: &Expr, ctx: &impl EvalContext) -> Value {
    match expr {
        Expr::StringLiteral(s) => {
            if s.eq_ignore_ascii_case(INPUT_ALIAS) {
                ctx.get_var(INPUT_VARIABLE)
                    .cloned()
                    .unwrap_or_else(|| Value::text(""))
            } else {
                Value::text(s.as_str())
            }
        }
        Expr::NumberLiteral(n) => Value::Number(*n),
        Expr::VariableReference(name) => ctx.get_var(name).cloned().unwrap_or_default(),
        Expr::BinaryOp {
            left,
            operator,
            right,
        } => {
            let left = evaluate(left, ctx);
            let right = evaluate(right, ctx);
            apply_binary(&left, *operator, &right)
        }
    }
}

/// 应用二元运算
pub fn apply_binary(left: &Value, operator: BinaryOperator, right: &Value) -> Value {
    if operator == BinaryOperator::Add && (left.is_text() || right.is_text()) {
        return Value::Text(format!("{left}{right}"));
    }

    let (Some(l), Some(r)) = (left.as_number(), right.as_number()) else {
        return Value::Number(0.0);
    };

    let result = match operator {
        BinaryOperator::Add => l + r,
        BinaryOperator::Sub => l - r,
        BinaryOperator::Mul => l * r,
        BinaryOperator::Div if r == 0.0 => 0.0,
        BinaryOperator::Div => l / r,
    };
    Value::Number(result)
}

/// 条件比较：数字按数值比较，文本按文本比较，数字与文本永不相等
pub fn values_equal(left: &Value, right: &Value) -> bool {
    match (left, right) {
        (Value::Number(a), Value::Number(b)) => a == b,
        (Value::Text(a), Value::Text(b)) => a == b,
        _ => false,
    }
}

/// 求值并按布尔解释
pub fn evaluate_to_bool(expr: &Expr, ctx: &impl EvalContext) -> bool {
    evaluate(expr, ctx).is_truthy()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    struct TestContext {
        vars: HashMap<String, Value>,
    }

    impl TestContext {
        fn new() -> Self {
            Self {
                vars: HashMap::new(),
            }
        }

        fn with_var(mut self, name: &str, value: Value) -> Self {
            self.vars.insert(name.to_string(), value);
            self
        }
    }

    impl EvalContext for TestContext {
        fn get_var(&self, name: &str) -> Option<&Value> {
            self.vars.get(name)
        }
    }

    #[test]
    fn test_literal_evaluation() {
        let ctx = TestContext::new();
        assert_eq!(evaluate(&Expr::string("hi"), &ctx), Value::text("hi"));
        assert_eq!(evaluate(&Expr::number(2.5), &ctx), Value::Number(2.5));
    }

    #[test]
    fn test_input_alias_is_case_insensitive() {
        let ctx = TestContext::new().with_var("data", Value::text("x"));
        assert_eq!(evaluate(&Expr::string("taqe.data"), &ctx), Value::text("x"));
        assert_eq!(evaluate(&Expr::string("TAQE.DATA"), &ctx), Value::text("x"));

        let empty = TestContext::new();
        assert_eq!(evaluate(&Expr::string("taQe.data"), &empty), Value::text(""));
    }

    #[test]
    fn test_unset_variable_is_zero() {
        let ctx = TestContext::new();
        assert_eq!(evaluate(&Expr::var("missing"), &ctx), Value::Number(0.0));
    }

    #[test]
    fn test_variable_round_trip() {
        let ctx = TestContext::new().with_var("n", Value::Number(5.0));
        assert_eq!(evaluate(&Expr::var("n"), &ctx), Value::Number(5.0));
    }

    #[test]
    fn test_concatenation() {
        let ctx = TestContext::new().with_var("n", Value::Number(3.0));
        let expr = Expr::binary(Expr::string("n="), BinaryOperator::Add, Expr::var("n"));
        assert_eq!(evaluate(&expr, &ctx), Value::text("n=3"));
    }

    #[test]
    fn test_numeric_text_coercion() {
        let result = apply_binary(&Value::text("6"), BinaryOperator::Mul, &Value::Number(2.0));
        assert_eq!(result, Value::Number(12.0));
    }

    #[test]
    fn test_arithmetic_failure_is_zero() {
        assert_eq!(
            apply_binary(&Value::text("abc"), BinaryOperator::Div, &Value::Number(2.0)),
            Value::Number(0.0)
        );
        assert_eq!(
            apply_binary(&Value::Number(1.0), BinaryOperator::Div, &Value::Number(0.0)),
            Value::Number(0.0)
        );
        assert_eq!(
            apply_binary(&Value::Number(7.0), BinaryOperator::Sub, &Value::Number(2.0)),
            Value::Number(5.0)
        );
    }

    #[test]
    fn test_values_equal() {
        assert!(values_equal(&Value::Number(1.0), &Value::Number(1.0)));
        assert!(values_equal(&Value::text("a"), &Value::text("a")));
        assert!(!values_equal(&Value::Number(1.0), &Value::text("1")));
    }

    #[test]
    fn test_evaluate_to_bool() {
        let ctx = TestContext::new().with_var("flag", Value::text("yes"));
        assert!(evaluate_to_bool(&Expr::var("flag"), &ctx));
        assert!(!evaluate_to_bool(&Expr::string("false"), &ctx));
        assert!(evaluate_to_bool(&Expr::number(1.0), &ctx));
    }
}
