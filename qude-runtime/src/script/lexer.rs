//! # 词法分析
//!
//! 逐行把脚本文本切分为 [`Token`] 流。
//!
//! - 每个物理行结束时产生一个 `EndOfLine`，全部结束后产生一个 `EndOfFile`
//! - `//` 或 `#` 开始的部分视为注释，直接丢弃该行剩余内容
//! - 空白不产生 token
//! - 不会失败：无法识别的字符产生 `Unknown`，交由解析器处理

use serde::{Deserialize, Serialize};

/// 关键字
const KEYWORDS: &[&str] = &["event", "then", "if", "elif", "else"];

/// 单字符符号
const SYMBOLS: &[char] = &['(', ')', ',', '.', '=', ':', ';', '<', '>'];

/// 算术运算符
const OPERATORS: &[char] = &['+', '-', '*', '/'];

/// Token 类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TokenKind {
    Identifier,
    Keyword,
    Number,
    String,
    Symbol,
    Operator,
    EndOfLine,
    EndOfFile,
    Unknown,
}

/// 词法单元
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    /// 类型
    pub kind: TokenKind,
    /// 原文（字符串 token 包含引号）
    pub text: String,
    /// 行号（从 1 开始）
    pub line: usize,
    /// 列号（从 1 开始，按字符计）
    pub column: usize,
}

impl Token {
    fn new(kind: TokenKind, text: impl Into<String>, line: usize, column: usize) -> Self {
        Self {
            kind,
            text: text.into(),
            line,
            column,
        }
    }

    /// token 结束后的下一列
    pub fn end_column(&self) -> usize {
        self.column + self.text.chars().count()
    }

    /// 是否是行/文件结束标记
    pub fn is_terminator(&self) -> bool {
        matches!(self.kind, TokenKind::EndOfLine | TokenKind::EndOfFile)
    }
}

/// 把源文本切分为 token 流
pub fn tokenize(source: &str) -> Vec<Token> {
    let mut tokens = Vec::new();
    let mut line_count = 0;

    for (line_idx, raw) in source.lines().enumerate() {
        let line_number = line_idx + 1;
        line_count = line_number;
        tokenize_line(raw, line_number, &mut tokens);
        tokens.push(Token::new(
            TokenKind::EndOfLine,
            "",
            line_number,
            raw.chars().count() + 1,
        ));
    }

    tokens.push(Token::new(TokenKind::EndOfFile, "", line_count + 1, 1));
    tokens
}

fn tokenize_line(raw: &str, line_number: usize, tokens: &mut Vec<Token>) {
    let chars: Vec<char> = raw.chars().collect();
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        let column = i + 1;

        // 注释
        if c == '#' || (c == '/' && chars.get(i + 1) == Some(&'/')) {
            break;
        }

        if c.is_whitespace() {
            i += 1;
            continue;
        }

        if c == '\'' || c == '"' {
            if let Some(end) = scan_string(&chars, i) {
                let text: String = chars[i..=end].iter().collect();
                tokens.push(Token::new(TokenKind::String, text, line_number, column));
                i = end + 1;
                continue;
            }
            // 未闭合的引号
            tokens.push(Token::new(TokenKind::Unknown, c, line_number, column));
            i += 1;
            continue;
        }

        if c.is_ascii_digit() {
            let end = scan_number(&chars, i);
            let text: String = chars[i..end].iter().collect();
            tokens.push(Token::new(TokenKind::Number, text, line_number, column));
            i = end;
            continue;
        }

        if c.is_ascii_alphabetic() || c == '_' {
            let mut end = i + 1;
            while end < chars.len() && (chars[end].is_ascii_alphanumeric() || chars[end] == '_') {
                end += 1;
            }
            let text: String = chars[i..end].iter().collect();
            let kind = if KEYWORDS.contains(&text.as_str()) {
                TokenKind::Keyword
            } else {
                TokenKind::Identifier
            };
            tokens.push(Token::new(kind, text, line_number, column));
            i = end;
            continue;
        }

        let kind = if SYMBOLS.contains(&c) {
            TokenKind::Symbol
        } else if OPERATORS.contains(&c) {
            TokenKind::Operator
        } else {
            TokenKind::Unknown
        };
        tokens.push(Token::new(kind, c, line_number, column));
        i += 1;
    }
}

/// 从引号位置开始扫描字符串，返回结束引号的下标
///
/// 反斜杠转义下一个字符（原样保留）。
fn scan_string(chars: &[char], start: usize) -> Option<usize> {
    let quote = chars[start];
    let mut i = start + 1;
    while i < chars.len() {
        match chars[i] {
            '\\' => i += 2,
            c if c == quote => return Some(i),
            _ => i += 1,
        }
    }
    None
}

/// 扫描 `\d+(\.\d+)?`，返回结束位置（不含）
fn scan_number(chars: &[char], start: usize) -> usize {
    let mut i = start;
    while i < chars.len() && chars[i].is_ascii_digit() {
        i += 1;
    }
    if i + 1 < chars.len() && chars[i] == '.' && chars[i + 1].is_ascii_digit() {
        i += 1;
        while i < chars.len() && chars[i].is_ascii_digit() {
            i += 1;
        }
    }
    i
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(tokens: &[Token]) -> Vec<TokenKind> {
        tokens.iter().map(|t| t.kind).collect()
    }

    #[test]
    fn test_tokenize_console_write() {
        let tokens = tokenize("Qonsol.write('hello')");
        assert_eq!(
            kinds(&tokens),
            vec![
                TokenKind::Identifier,
                TokenKind::Symbol,
                TokenKind::Identifier,
                TokenKind::Symbol,
                TokenKind::String,
                TokenKind::Symbol,
                TokenKind::EndOfLine,
                TokenKind::EndOfFile,
            ]
        );
        assert_eq!(tokens[4].text, "'hello'");
        assert_eq!(tokens[4].column, 14);
        assert_eq!(tokens[4].end_column(), 21);
    }

    #[test]
    fn test_line_and_eof_markers() {
        let tokens = tokenize("q>\n\nq<");
        let eols: Vec<usize> = tokens
            .iter()
            .filter(|t| t.kind == TokenKind::EndOfLine)
            .map(|t| t.line)
            .collect();
        assert_eq!(eols, vec![1, 2, 3]);

        let last = tokens.last().unwrap();
        assert_eq!(last.kind, TokenKind::EndOfFile);
        assert_eq!(last.line, 4);
    }

    #[test]
    fn test_comments_stop_the_line() {
        let tokens = tokenize("qrr x = 1 # trailing\n// whole line\nqrr y = 2");
        let texts: Vec<&str> = tokens
            .iter()
            .filter(|t| !t.is_terminator())
            .map(|t| t.text.as_str())
            .collect();
        assert_eq!(texts, vec!["qrr", "x", "=", "1", "qrr", "y", "=", "2"]);
    }

    #[test]
    fn test_hash_inside_string_is_not_a_comment() {
        let tokens = tokenize("b.bgc('#222')");
        assert!(tokens.iter().any(|t| t.text == "'#222'"));
    }

    #[test]
    fn test_keywords_numbers_operators() {
        let tokens = tokenize("if 2.5+x then");
        assert_eq!(tokens[0].kind, TokenKind::Keyword);
        assert_eq!(tokens[1].kind, TokenKind::Number);
        assert_eq!(tokens[1].text, "2.5");
        assert_eq!(tokens[2].kind, TokenKind::Operator);
        assert_eq!(tokens[3].kind, TokenKind::Identifier);
        assert_eq!(tokens[4].kind, TokenKind::Keyword);
    }

    #[test]
    fn test_unknown_characters_never_fail() {
        let tokens = tokenize("q£('x') q$ 'open");
        let unknown: Vec<&str> = tokens
            .iter()
            .filter(|t| t.kind == TokenKind::Unknown)
            .map(|t| t.text.as_str())
            .collect();
        assert_eq!(unknown, vec!["£", "$", "'"]);
    }

    #[test]
    fn test_number_without_fraction_digits() {
        // "5." 只识别整数部分
        let tokens = tokenize("5.");
        assert_eq!(tokens[0].text, "5");
        assert_eq!(tokens[1].text, ".");
    }
}
