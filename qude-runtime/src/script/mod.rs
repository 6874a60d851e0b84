//! # Script 模块
//!
//! 脚本前端：词法分析、AST、解析器、表达式求值和 event 头。
//!
//! ## 模块结构
//!
//! - [`lexer`]：词法分析
//! - [`ast`]：脚本抽象语法树定义
//! - [`parser`]：两阶段解析器实现
//! - [`expr`]：表达式求值
//! - [`event`]：event 头语法

pub mod ast;
pub mod event;
pub mod expr;
pub mod lexer;
pub mod parser;

pub use ast::*;
pub use event::EventHeader;
pub use expr::{EvalContext, apply_binary, evaluate, evaluate_to_bool, values_equal};
pub use lexer::{Token, TokenKind, tokenize};
pub use parser::Parser;
