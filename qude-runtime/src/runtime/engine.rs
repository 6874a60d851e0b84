//! # Engine 模块
//!
//! Qude Runtime 核心执行引擎。
//!
//! ## 执行模型
//!
//! ```text
//! run(host)             -> RunSummary          顶层遍历，经过运行闸门
//! dispatch(input, host) -> DispatchOutcome     事件回调，不经过运行闸门
//! ```
//!
//! 1. `run` 先做生命周期检查，缺少开始/结束语句时不调用宿主
//! 2. 清空会话状态，按顺序遍历语句，Start 与 Stop 之间的语句才生效
//! 3. 单条语句的错误写入控制台后继续下一条
//! 4. 宿主之后把用户交互以 [`RuntimeInput`] 送回 `dispatch`

use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, warn};

use super::binder::{BindingAction, BindingTrigger};
use super::executor::{Executor, StyleDefaults};
use crate::error::RuntimeError;
use crate::host::{BindingId, Severity, UiHost, WidgetHandle};
use crate::input::{DispatchOutcome, RuntimeInput};
use crate::script::{Program, Statement};
use crate::session::{ConditionalChain, SessionState};

/// 一次运行的统计
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RunSummary {
    /// 已执行的语句数（含 Start/Stop）
    pub executed: usize,
    /// 因运行闸门关闭而跳过的语句数
    pub skipped: usize,
    /// 执行失败的语句数
    pub failed: usize,
}

/// Qude Runtime 执行引擎
///
/// 持有程序、会话状态和执行器。宿主通过 `&mut impl UiHost` 借给引擎。
///
/// # 使用示例
///
/// ```ignore
/// let program = Parser::new().parse("demo.q", text)?;
/// let mut runtime = QudeRuntime::new(program);
/// let mut host = MemoryHost::new();
///
/// runtime.run(&mut host)?;
/// for input in host.click(button, MouseButton::Left) {
///     runtime.dispatch(input, &mut host);
/// }
/// ```
#[derive(Debug)]
pub struct QudeRuntime {
    /// 当前程序
    program: Program,
    /// 会话状态
    state: SessionState,
    /// 语句执行器
    executor: Executor,
}

impl QudeRuntime {
    /// 创建新的 Runtime 实例
    ///
    /// # 参数
    ///
    /// - `program`: 已解析的程序
    pub fn new(program: Program) -> Self {
        Self::with_style(program, StyleDefaults::default())
    }

    /// 使用指定的控件默认样式创建 Runtime
    pub fn with_style(program: Program, style: StyleDefaults) -> Self {
        Self {
            program,
            state: SessionState::new(),
            executor: Executor::new(style),
        }
    }

    /// 执行整个程序
    ///
    /// # 返回
    ///
    /// - `Ok(RunSummary)`: 程序已遍历完（单条语句的失败只计数）
    /// - `Err(RuntimeError)`: 生命周期检查失败，没有语句被执行
    pub fn run(&mut self, host: &mut impl UiHost) -> Result<RunSummary, RuntimeError> {
        self.state.reset();

        if let Some(err) = lifecycle_error(&self.program) {
            error!(script = %self.program.id, error = %err, "生命周期检查失败");
            host.console_write(&err.to_string(), Severity::Error);
            return Err(err);
        }

        info!(script = %self.program.id, statements = self.program.len(), "开始运行");

        let mut summary = RunSummary::default();
        let mut chain = ConditionalChain::default();

        for (index, statement) in self.program.statements.iter().enumerate() {
            let line = self.program.source_line(index);

            if !statement.is_lifecycle() && !self.state.running {
                debug!(line = ?line, statement = statement.kind_name(), "运行闸门关闭，跳过");
                summary.skipped += 1;
                continue;
            }

            match self
                .executor
                .execute(statement, &mut self.state, host, &mut chain)
            {
                Ok(()) => summary.executed += 1,
                Err(err) => {
                    summary.failed += 1;
                    report(host, &err, line.map(|l| format!("第 {l} 行")));
                }
            }
        }

        info!(
            executed = summary.executed,
            skipped = summary.skipped,
            failed = summary.failed,
            "运行结束"
        );
        Ok(summary)
    }

    /// 处理宿主送回的输入
    ///
    /// 回调的错误写入控制台，从不返回给宿主。
    pub fn dispatch(&mut self, input: RuntimeInput, host: &mut impl UiHost) -> DispatchOutcome {
        match input {
            RuntimeInput::Triggered { binding } => self.trigger(binding, host),
            RuntimeInput::WindowClosed { window } => {
                if self.state.window == Some(window) {
                    debug!(window = window.0, "主窗口被关闭");
                    self.state.forget_window();
                    DispatchOutcome::Executed
                } else {
                    DispatchOutcome::UnknownBinding
                }
            }
            RuntimeInput::SurfaceClosed { surface } => {
                if self.state.warn_window == Some(surface) {
                    debug!(surface = surface.0, "warn 窗口被关闭");
                    self.state.forget_warn_screen();
                    DispatchOutcome::Executed
                } else {
                    DispatchOutcome::UnknownBinding
                }
            }
        }
    }

    /// 在当前会话中执行一条语句（不经过运行闸门）
    ///
    /// 使用独立的条件链。
    pub fn execute_statement(
        &mut self,
        statement: &Statement,
        host: &mut impl UiHost,
    ) -> Result<(), RuntimeError> {
        let mut chain = ConditionalChain::default();
        self.executor
            .execute(statement, &mut self.state, host, &mut chain)
    }

    fn trigger(&mut self, binding: BindingId, host: &mut impl UiHost) -> DispatchOutcome {
        let Some(entry) = self.state.bindings.get(&binding).cloned() else {
            debug!(binding = %binding, "未知绑定");
            return DispatchOutcome::UnknownBinding;
        };

        if let BindingTrigger::ContentMatch { .. } = entry.trigger {
            let current = match host.widget_text(entry.target) {
                Ok(text) => text,
                Err(e) => {
                    report(host, &RuntimeError::from(e), Some(format!("事件 {binding}")));
                    return DispatchOutcome::Failed;
                }
            };
            if !entry.matches_content(&current) {
                debug!(binding = %binding, "内容不匹配");
                return DispatchOutcome::Filtered;
            }
        }

        let result = match entry.action {
            BindingAction::Run(statement) => self.execute_statement(&statement, host),
            BindingAction::OpenLink { widget_name } => {
                // 控件已被同名新控件取代时不再响应
                if self.widget(&widget_name) != Some(entry.target) {
                    return DispatchOutcome::Filtered;
                }
                match self.state.link_targets.get(&widget_name) {
                    Some(url) => host.open_external_link(url).map_err(RuntimeError::from),
                    None => return DispatchOutcome::Filtered,
                }
            }
        };

        match result {
            Ok(()) => DispatchOutcome::Executed,
            Err(err) => {
                report(host, &err, Some(format!("事件 {binding}")));
                DispatchOutcome::Failed
            }
        }
    }

    /// 获取当前程序
    pub fn program(&self) -> &Program {
        &self.program
    }

    /// 获取会话状态
    pub fn state(&self) -> &SessionState {
        &self.state
    }

    /// 是否处于 Start 与 Stop 之间
    pub fn is_running(&self) -> bool {
        self.state.running
    }

    /// 按名称查找控件句柄
    pub fn widget(&self, name: &str) -> Option<WidgetHandle> {
        self.state.widget(name).map(|w| w.handle)
    }

    /// 按标签查找 warn 选项控件
    pub fn warn_option(&self, label: &str) -> Option<WidgetHandle> {
        self.state.warn_option_widgets.get(label).copied()
    }

    /// 当前使用的默认样式
    pub fn style(&self) -> &StyleDefaults {
        self.executor.style()
    }
}

/// 生命周期检查
fn lifecycle_error(program: &Program) -> Option<RuntimeError> {
    match (program.has_start(), program.has_stop()) {
        (true, true) => None,
        (false, false) => Some(RuntimeError::MissingStartAndStop),
        (false, true) => Some(RuntimeError::MissingStart),
        (true, false) => Some(RuntimeError::MissingStop),
    }
}

/// 把错误写入控制台和日志
fn report(host: &mut impl UiHost, err: &RuntimeError, location: Option<String>) {
    let severity = err.severity();
    let text = match &location {
        Some(location) => format!("{location}：{err}"),
        None => err.to_string(),
    };
    match severity {
        Severity::Error => error!(location = ?location, error = %err, "语句执行失败"),
        _ => warn!(location = ?location, error = %err, "语句执行失败"),
    }
    host.console_write(&text, severity);
}
