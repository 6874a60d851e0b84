//! # Qude Runtime
//!
//! Qude 脚本语言的核心运行时库。
//!
//! ## 架构概述
//!
//! `qude-runtime` 负责解析和解释脚本，不依赖任何 GUI 工具包。
//! 它通过 [`UiHost`] trait 调用宿主的窗口/控件能力，宿主把用户交互以
//! [`RuntimeInput`] 送回：
//!
//! ```text
//! Host                          Runtime
//!   │                              │
//!   │◄──── UiHost 调用 ────────────│ run()
//!   │                              │
//!   │──── RuntimeInput ──────────►│ dispatch()
//!   │◄──── UiHost 调用 ────────────│
//! ```
//!
//! ## 核心类型
//!
//! - [`Parser`]：把脚本文本解析为 [`Program`]
//! - [`QudeRuntime`]：执行引擎
//! - [`UiHost`]：宿主能力接口，[`MemoryHost`] 是其内存实现
//! - [`SessionState`]：一次运行的全部可变状态
//!
//! ## 使用示例
//!
//! ```ignore
//! use qude_runtime::{MemoryHost, MouseButton, Parser, QudeRuntime};
//!
//! let program = Parser::new().parse("demo.q", script_text)?;
//! let mut runtime = QudeRuntime::new(program);
//! let mut host = MemoryHost::new();
//!
//! runtime.run(&mut host)?;
//!
//! if let Some(button) = runtime.widget("b1") {
//!     for input in host.click(button, MouseButton::Left) {
//!         runtime.dispatch(input, &mut host);
//!     }
//! }
//! ```
//!
//! ## 模块结构
//!
//! - [`script`]：词法分析、AST、解析器、表达式
//! - [`runtime`]：执行引擎、单语句执行器、事件绑定
//! - [`session`]：会话状态与变量值
//! - [`host`]：宿主接口与内存宿主
//! - [`input`]：RuntimeInput 定义
//! - [`diagnostic`]：静态检查
//! - [`error`]：错误类型定义

pub mod diagnostic;
pub mod error;
pub mod host;
pub mod input;
pub mod runtime;
pub mod script;
pub mod session;

// 重导出核心类型
pub use diagnostic::{Diagnostic, DiagnosticLevel, DiagnosticResult, analyze_program};
pub use error::{ParseError, QudeError, QudeResult, RuntimeError};
pub use host::{
    BindingId, ConsoleLine, FontSpec, HostDefaults, HostError, HostResult, MemoryHost,
    MouseButton, Severity, SurfaceHandle, UiHost, WidgetHandle, WidgetKind, WindowHandle,
};
pub use input::{DispatchOutcome, RuntimeInput};
pub use runtime::{QudeRuntime, RunSummary, StyleDefaults};
pub use script::{Expr, Parser, Program, Statement};
pub use session::{SessionState, Value};

/// 解析并运行一段脚本
///
/// 解析失败时不调用宿主。
pub fn run_source(
    script_id: &str,
    text: &str,
    host: &mut impl UiHost,
) -> QudeResult<(QudeRuntime, RunSummary)> {
    let program = Parser::new().parse(script_id, text)?;
    let mut runtime = QudeRuntime::new(program);
    let summary = runtime.run(host)?;
    Ok((runtime, summary))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_public_api_accessible() {
        let _expr = Expr::string("hello");
        let _input = RuntimeInput::triggered(BindingId(1));
        let _state = SessionState::new();
        let _program = Program::new("main", vec![Statement::Start, Statement::Stop]);
        let _style = StyleDefaults::default();
    }

    #[test]
    fn test_run_source_parse_failure_touches_nothing() {
        let mut host = MemoryHost::new();
        let err = run_source("bad.q", "q>\nnonsense here\nq<", &mut host).unwrap_err();
        assert!(matches!(err, QudeError::Parse(_)));
        assert!(host.console().is_empty());
    }

    #[test]
    fn test_run_source_hello() {
        let mut host = MemoryHost::new();
        let (_, summary) = run_source("hello.q", "q>\nqons.wrt('hello')\nq<", &mut host).unwrap();
        assert_eq!(summary.executed, 3);
        assert_eq!(host.console_lines(), vec!["hello"]);
    }
}
