//! # 阶段 1：块识别
//!
//! 由 token 流重建逻辑行，再把逻辑行分组为块（单行、event 块）。

use crate::error::ParseError;
use crate::script::lexer::{Token, TokenKind};

/// 一个逻辑行（已去掉注释和多余空白）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogicalLine {
    pub text: String,
    pub line_number: usize,
}

/// 块类型（阶段 1 输出）
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Block {
    /// 单行语句
    SingleLine(LogicalLine),
    /// `event;` + 事件头 + 动作
    Event {
        start_line: usize,
        header: LogicalLine,
        action: LogicalLine,
    },
}

impl Block {
    /// 获取块的起始行号
    pub fn start_line(&self) -> usize {
        match self {
            Block::SingleLine(line) => line.line_number,
            Block::Event { start_line, .. } => *start_line,
        }
    }
}

/// 是否是 `event;` 行
pub fn is_event_marker(text: &str) -> bool {
    text.eq_ignore_ascii_case("event;")
}

/// 由 token 重建逻辑行
///
/// 同一物理行内相邻 token 之间原本有空白时插入一个空格；
/// 没有任何 token 的行被跳过。
pub fn logical_lines(tokens: &[Token]) -> Vec<LogicalLine> {
    let mut lines = Vec::new();
    let mut text = String::new();
    let mut prev_end: Option<usize> = None;

    for token in tokens {
        if token.is_terminator() {
            if !text.is_empty() {
                lines.push(LogicalLine {
                    text: std::mem::take(&mut text),
                    line_number: token.line,
                });
            }
            prev_end = None;
            if token.kind == TokenKind::EndOfFile {
                break;
            }
            continue;
        }
        if prev_end.is_some_and(|end| token.column > end) {
            text.push(' ');
        }
        text.push_str(&token.text);
        prev_end = Some(token.end_column());
    }

    lines
}

/// 把逻辑行分组为块
///
/// `event;` 之后必须紧跟事件头和动作两行；动作不能再是 `event;`。
pub fn recognize_blocks(lines: Vec<LogicalLine>) -> Result<Vec<Block>, ParseError> {
    let mut blocks = Vec::new();
    let mut iter = lines.into_iter();

    while let Some(line) = iter.next() {
        if !is_event_marker(&line.text) {
            blocks.push(Block::SingleLine(line));
            continue;
        }

        let start_line = line.line_number;
        let header = iter.next().ok_or_else(|| ParseError::IncompleteEventBlock {
            line: start_line,
            text: line.text.clone(),
            missing: "事件头".to_string(),
        })?;
        if is_event_marker(&header.text) {
            return Err(ParseError::NestedEventBlock {
                line: header.line_number,
                text: header.text,
            });
        }
        let action = iter.next().ok_or_else(|| ParseError::IncompleteEventBlock {
            line: header.line_number,
            text: header.text.clone(),
            missing: "动作语句".to_string(),
        })?;
        if is_event_marker(&action.text) {
            return Err(ParseError::NestedEventBlock {
                line: action.line_number,
                text: action.text,
            });
        }

        blocks.push(Block::Event {
            start_line,
            header,
            action,
        });
    }

    Ok(blocks)
}
