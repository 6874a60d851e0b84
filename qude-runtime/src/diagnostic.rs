//! # 诊断模块
//!
//! 脚本静态检查，不需要宿主也不执行任何语句。
//!
//! ## 设计原则
//!
//! - 纯函数 API，只读 `Program`
//! - 诊断分级：Error（运行时一定失败）、Warn（很可能是笔误）、Info（信息提示）
//! - event 头复用运行时的 [`EventHeader`] 语法

use std::collections::{HashMap, HashSet};
use std::fmt;

use serde::Serialize;

use crate::host::WidgetKind;
use crate::script::{EventHeader, Program, Statement};
use crate::session::INPUT_VARIABLE;

/// 诊断级别
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum DiagnosticLevel {
    /// 信息提示
    Info,
    /// 警告（建议修复）
    Warn,
    /// 错误（必须修复）
    Error,
}

impl fmt::Display for DiagnosticLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Info => write!(f, "INFO"),
            Self::Warn => write!(f, "WARN"),
            Self::Error => write!(f, "ERROR"),
        }
    }
}

/// 诊断条目
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    pub level: DiagnosticLevel,
    /// 脚本 ID / 文件路径
    pub script_id: String,
    /// 行号（如果可定位，从 1 开始）
    pub line: Option<usize>,
    pub message: String,
}

impl Diagnostic {
    fn new(level: DiagnosticLevel, script_id: &str, message: impl Into<String>) -> Self {
        Self {
            level,
            script_id: script_id.to_string(),
            line: None,
            message: message.into(),
        }
    }

    /// 创建错误诊断
    pub fn error(script_id: &str, message: impl Into<String>) -> Self {
        Self::new(DiagnosticLevel::Error, script_id, message)
    }

    /// 创建警告诊断
    pub fn warn(script_id: &str, message: impl Into<String>) -> Self {
        Self::new(DiagnosticLevel::Warn, script_id, message)
    }

    /// 创建信息诊断
    pub fn info(script_id: &str, message: impl Into<String>) -> Self {
        Self::new(DiagnosticLevel::Info, script_id, message)
    }

    /// 设置行号
    pub fn at(mut self, line: Option<usize>) -> Self {
        self.line = line;
        self
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.level, self.script_id)?;
        if let Some(line) = self.line {
            write!(f, ":{line}")?;
        }
        write!(f, ": {}", self.message)
    }
}

/// 诊断结果
#[derive(Debug, Clone, Default, Serialize)]
pub struct DiagnosticResult {
    pub diagnostics: Vec<Diagnostic>,
}

impl DiagnosticResult {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, diagnostic: Diagnostic) {
        self.diagnostics.push(diagnostic);
    }

    /// 合并另一个结果
    pub fn merge(&mut self, other: DiagnosticResult) {
        self.diagnostics.extend(other.diagnostics);
    }

    /// 获取错误数量
    pub fn error_count(&self) -> usize {
        self.count(DiagnosticLevel::Error)
    }

    /// 获取警告数量
    pub fn warn_count(&self) -> usize {
        self.count(DiagnosticLevel::Warn)
    }

    pub fn has_errors(&self) -> bool {
        self.error_count() > 0
    }

    pub fn is_empty(&self) -> bool {
        self.diagnostics.is_empty()
    }

    /// 按最低级别过滤
    pub fn filter_by_level(&self, min_level: DiagnosticLevel) -> Vec<&Diagnostic> {
        self.diagnostics
            .iter()
            .filter(|d| d.level >= min_level)
            .collect()
    }

    fn count(&self, level: DiagnosticLevel) -> usize {
        self.diagnostics.iter().filter(|d| d.level == level).count()
    }
}

//=============================================================================
// 脚本分析 API
//=============================================================================

/// 分析程序，返回诊断结果
///
/// 执行以下检查：
/// - 缺少开始/结束语句
/// - 无法识别的 event 头
/// - 运行闸门关闭时才会遇到的语句（永远不会执行）
/// - 引用了此前未声明的控件或 warn 选项
/// - MatchEvent 指向非输入框控件
/// - 给保留变量 `data` 赋值
/// - 没有打开过 warn 窗口时关闭它（信息）
pub fn analyze_program(program: &Program) -> DiagnosticResult {
    let mut analyzer = Analyzer {
        script_id: &program.id,
        result: DiagnosticResult::new(),
        widgets: HashMap::new(),
        options: HashSet::new(),
    };

    if !program.has_start() {
        analyzer.result.push(Diagnostic::error(
            &program.id,
            "缺少开始语句 Qude.prompt（或 qude.str()、q>）",
        ));
    }
    if !program.has_stop() {
        analyzer.result.push(Diagnostic::error(
            &program.id,
            "缺少结束语句 Qude.kill/（或 qude.end、q<）",
        ));
    }

    let mut running = false;
    for (index, statement) in program.statements.iter().enumerate() {
        let line = program.source_line(index);
        match statement {
            Statement::Start => running = true,
            Statement::Stop => running = false,
            _ if !running => analyzer.result.push(
                Diagnostic::warn(
                    &program.id,
                    format!("{} 位于开始语句之前或结束语句之后，永远不会执行", statement.kind_name()),
                )
                .at(line),
            ),
            _ => analyzer.check(statement, line),
        }
    }

    analyzer.result
}

struct Analyzer<'a> {
    script_id: &'a str,
    result: DiagnosticResult,
    /// 已声明的控件
    widgets: HashMap<String, WidgetKind>,
    /// 已打开的 warn 选项
    options: HashSet<String>,
}

impl Analyzer<'_> {
    fn check(&mut self, statement: &Statement, line: Option<usize>) {
        match statement {
            Statement::InsertText { name, .. } | Statement::InsertLink { name } => {
                self.widgets.insert(name.clone(), WidgetKind::Label);
            }
            Statement::InsertButton { name } => {
                self.widgets.insert(name.clone(), WidgetKind::Button);
            }
            Statement::InsertInput { name } => {
                self.widgets.insert(name.clone(), WidgetKind::Input);
            }
            Statement::WarnScreen { option_label, .. } => {
                self.options.insert(option_label.clone());
            }
            Statement::Assign { name, .. } if name == INPUT_VARIABLE => {
                self.warn(format!("'{name}' 是保留变量，只能由输入语句写入"), line);
            }
            Statement::WarnClose if self.options.is_empty() => {
                let message = "此前没有打开过 warn 窗口，kill.wwindow/ 不会有效果";
                self.result
                    .push(Diagnostic::info(self.script_id, message).at(line));
            }
            Statement::Conditional { action, .. } => self.check(action, line),
            Statement::EventBlock { header, .. } => self.check_header(header, line),
            other => {
                let undeclared = other
                    .widget_name()
                    .filter(|name| !self.widgets.contains_key(*name));
                if let Some(name) = undeclared {
                    self.warn(format!("控件 '{name}' 在此之前没有声明"), line);
                }
            }
        }
    }

    fn check_header(&mut self, header: &str, line: Option<usize>) {
        let Some(parsed) = EventHeader::parse(header) else {
            self.result.push(
                Diagnostic::error(self.script_id, format!("无法识别的 event 头 '{}'", header.trim()))
                    .at(line),
            );
            return;
        };

        match parsed {
            EventHeader::OptionClick { option, .. } => {
                if !self.options.contains(&option) {
                    self.warn(format!("warn 选项 '{option}' 在此之前没有打开"), line);
                }
            }
            EventHeader::Match { widget, .. } => match self.widgets.get(&widget).copied() {
                None => self.warn(format!("event 目标控件 '{widget}' 在此之前没有声明"), line),
                Some(WidgetKind::Input) => {}
                Some(kind) => self.warn(
                    format!("MatchEvent 需要 inputter 控件，'{widget}' 是 {kind:?}"),
                    line,
                ),
            },
            EventHeader::WidgetClick { widget, .. } => {
                if !self.widgets.contains_key(&widget) {
                    self.warn(format!("event 目标控件 '{widget}' 在此之前没有声明"), line);
                }
            }
        }
    }

    fn warn(&mut self, message: String, line: Option<usize>) {
        self.result
            .push(Diagnostic::warn(self.script_id, message).at(line));
    }
}
