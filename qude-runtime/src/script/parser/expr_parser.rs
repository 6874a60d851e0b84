//! # 表达式解析器
//!
//! 表达式解析从不失败，按以下顺序尝试：
//!
//! 1. 一对匹配引号包围（内部不再出现同种引号）：字符串字面量
//! 2. `\d+(\.\d+)?`：数字字面量
//! 3. 含顶层 `+`、`-`、`*`、`/`：按出现顺序从左到右结合，没有优先级
//! 4. 名字：变量引用
//! 5. 其他：原样作为字符串字面量
//!
//! 第 3 步不是常规的运算符优先级：`2+3*4` 解析为 `(2+3)*4`，结果是 20。
//! 括号只用于跟踪深度，不起分组作用：`(1+2)` 是字符串字面量。

use crate::script::{BinaryOperator, Expr};

use super::helpers::{is_bool_word, is_identifier, top_level_chars};

const OPERATOR_CHARS: [char; 4] = ['+', '-', '*', '/'];

/// 解析表达式字符串
pub fn parse_expression(input: &str) -> Expr {
    let text = input.trim();

    if let Some(content) = quoted_content(text) {
        return Expr::string(content);
    }

    if is_number_literal(text) {
        if let Ok(n) = text.parse::<f64>() {
            return Expr::number(n);
        }
    }

    let operators: Vec<(usize, BinaryOperator)> = top_level_chars(text, &OPERATOR_CHARS)
        .into_iter()
        .filter_map(|(pos, c)| BinaryOperator::from_symbol(c).map(|op| (pos, op)))
        .collect();
    if !operators.is_empty() {
        return fold_left(text, &operators);
    }

    if is_identifier(text) {
        return Expr::var(text);
    }

    Expr::string(text)
}

/// 解析布尔参数
///
/// `true`、`no`、`1` 这类单词保留为字符串字面量，不当作变量引用。
pub fn parse_bool_argument(input: &str) -> Expr {
    let text = input.trim();
    if is_bool_word(text) {
        Expr::string(text)
    } else {
        parse_expression(text)
    }
}

/// 按顶层运算符切分操作数，从左到右结合
///
/// 运算符都是单字节字符。
fn fold_left(text: &str, operators: &[(usize, BinaryOperator)]) -> Expr {
    let mut start = 0;
    let mut pending: Option<(Expr, BinaryOperator)> = None;
    for &(pos, operator) in operators {
        let operand = parse_expression(&text[start..pos]);
        let lhs = match pending.take() {
            Some((left, op)) => Expr::binary(left, op, operand),
            None => operand,
        };
        pending = Some((lhs, operator));
        start = pos + 1;
    }
    let last = parse_expression(&text[start..]);
    match pending {
        Some((left, op)) => Expr::binary(left, op, last),
        None => last,
    }
}

/// 一对匹配引号之间的内容
fn quoted_content(text: &str) -> Option<&str> {
    let quote = text.chars().next().filter(|c| *c == '\'' || *c == '"')?;
    if text.len() < 2 || !text.ends_with(quote) {
        return None;
    }
    let content = &text[1..text.len() - 1];
    (!content.contains(quote)).then_some(content)
}

/// `\d+(\.\d+)?`
fn is_number_literal(text: &str) -> bool {
    let (int, frac) = match text.split_once('.') {
        Some((int, frac)) => (int, Some(frac)),
        None => (text, None),
    };
    let all_digits = |s: &str| !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit());
    all_digits(int) && frac.is_none_or(all_digits)
}
