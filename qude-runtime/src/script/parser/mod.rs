//! # Parser 模块
//!
//! 两阶段脚本解析器实现（手写匹配，无 regex 依赖）。
//!
//! ## 架构
//!
//! ```text
//! 原始文本 → [词法分析] → Vec<Token>
//!          → [阶段1: 逻辑行 + 块识别] → Vec<Block>
//!          → [阶段2: 规则表匹配] → Vec<Statement>
//! ```
//!
//! ## 设计原则
//!
//! - 整份脚本要么全部解析成功，要么在第一个错误处失败，不存在部分结果
//! - 每个逻辑行按固定优先级尝试规则表，第一条匹配的规则生效
//! - 表达式解析从不失败
//!
//! ## 模块结构
//!
//! - `helpers`: 辅助解析函数
//! - `expr_parser`: 表达式解析器
//! - `phase1`: 逻辑行与块识别
//! - `phase2`: 规则表与语句解析

mod expr_parser;
mod helpers;
mod phase1;
mod phase2;


use crate::error::ParseError;
use crate::script::ast::Program;
use crate::script::lexer::tokenize;

use phase1::{logical_lines, recognize_blocks};
use phase2::Phase2Parser;

// 重新导出辅助函数供其他模块使用
pub use helpers::{is_identifier, split_args, split_call, starts_with_ignore_case};

// 重新导出表达式解析函数
pub use expr_parser::{parse_bool_argument, parse_expression};

pub use phase2::{STATEMENT_RULES, StatementRule, parse_statement};

/// 脚本解析器
pub struct Parser {
    /// 阶段2解析器
    phase2: Phase2Parser,
}

impl Parser {
    /// 创建新的解析器
    pub fn new() -> Self {
        Self {
            phase2: Phase2Parser::new(),
        }
    }

    /// 解析脚本文本
    ///
    /// # 参数
    ///
    /// - `script_id`: 脚本标识符
    /// - `text`: 脚本文本内容
    ///
    /// # 返回
    ///
    /// 解析后的 `Program`，或第一个解析错误
    pub fn parse(&self, script_id: &str, text: &str) -> Result<Program, ParseError> {
        let tokens = tokenize(text);

        // 阶段 1：逻辑行与块识别
        let blocks = recognize_blocks(logical_lines(&tokens))?;

        // 阶段 2：块解析（同时收集行号）
        let mut statements = Vec::with_capacity(blocks.len());
        let mut source_map = Vec::with_capacity(blocks.len());
        for block in blocks {
            let line_number = block.start_line();
            statements.push(self.phase2.parse_block(block)?);
            source_map.push(line_number);
        }

        Ok(Program::with_source_map(script_id, statements, source_map))
    }
}

impl Default for Parser {
    fn default() -> Self {
        Self::new()
    }
}
