//! # Error 模块
//!
//! 定义 qude-runtime 中使用的错误类型。
//!
//! - [`ParseError`]：解析期错误（SyntaxError），整份脚本在执行前被拒绝
//! - [`RuntimeError`]：执行期错误，在语句/回调边界被捕获并写入控制台
//! - [`HostError`]：宿主能力调用失败，经 `RuntimeError::Host` 传递

use thiserror::Error;

use crate::host::{HostError, Severity, WidgetKind};

/// 解析错误
///
/// 每个变体都携带行号和出错行的原文。
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParseError {
    /// 无法识别的语句
    #[error("第 {line} 行：无法识别的语句 '{text}'")]
    UnrecognizedStatement { line: usize, text: String },

    /// 参数个数不正确
    #[error("第 {line} 行：'{command}' 需要 {expected} 个参数，实际 {found} 个 - {text}")]
    ArgumentCount {
        line: usize,
        text: String,
        command: String,
        expected: usize,
        found: usize,
    },

    /// event 块不完整
    #[error("第 {line} 行：event 块不完整，缺少{missing} - {text}")]
    IncompleteEventBlock {
        line: usize,
        text: String,
        missing: String,
    },

    /// event 块嵌套
    #[error("第 {line} 行：event 块的动作不能是另一个 event 块 - {text}")]
    NestedEventBlock { line: usize, text: String },

    /// 条件语句的动作不能再是条件语句
    #[error("第 {line} 行：条件语句的动作不能是另一个条件语句 - {text}")]
    NestedConditional { line: usize, text: String },
}

impl ParseError {
    /// 出错的行号（从 1 开始）
    pub fn line(&self) -> usize {
        match self {
            Self::UnrecognizedStatement { line, .. }
            | Self::ArgumentCount { line, .. }
            | Self::IncompleteEventBlock { line, .. }
            | Self::NestedEventBlock { line, .. }
            | Self::NestedConditional { line, .. } => *line,
        }
    }

    /// 出错行的原文
    pub fn text(&self) -> &str {
        match self {
            Self::UnrecognizedStatement { text, .. }
            | Self::ArgumentCount { text, .. }
            | Self::IncompleteEventBlock { text, .. }
            | Self::NestedEventBlock { text, .. }
            | Self::NestedConditional { text, .. } => text,
        }
    }
}

/// 运行时错误
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RuntimeError {
    /// 控件名未声明
    #[error("未知控件 '{name}'")]
    UnknownWidget { name: String },

    /// event 头引用了未声明的控件
    #[error("event 目标控件 '{name}' 不存在")]
    UnknownEventTarget { name: String },

    /// event 头引用了不存在的 warn 选项
    #[error("未知的 warn 选项 '{option}'")]
    UnknownWarnOption { option: String },

    /// MatchEvent 只能绑定到输入框
    #[error("MatchEvent 需要 inputter 控件：'{name}' 是 {actual:?}")]
    MatchTargetNotInput { name: String, actual: WidgetKind },

    /// 控件类型不支持该操作
    #[error("控件 '{name}' 的类型 {actual:?} 不支持 {operation}")]
    WrongWidgetKind {
        name: String,
        operation: String,
        actual: WidgetKind,
    },

    /// 当前没有打开的 warn 窗口
    #[error("没有打开的 warn 窗口，已忽略 {operation}")]
    NoWarnScreen { operation: String },

    /// 无法识别的 event 头
    #[error("无法识别的 event 头 '{header}'")]
    BadEventHeader { header: String },

    /// 保留变量只能由 Input 写入
    #[error("变量 '{name}' 是保留变量，只能由输入语句写入")]
    ReservedVariable { name: String },

    /// 参数值无效
    #[error("{what} 的值无效：'{value}'")]
    InvalidArgument { what: String, value: String },

    /// 缺少开始与结束语句
    #[error("脚本缺少开始语句和结束语句：Qude.prompt / Qude.kill/")]
    MissingStartAndStop,

    /// 缺少开始语句
    #[error("脚本缺少开始语句：Qude.prompt（或 qude.str()、q>）")]
    MissingStart,

    /// 缺少结束语句
    #[error("脚本缺少结束语句：Qude.kill/（或 qude.end、q<）")]
    MissingStop,

    /// 宿主调用失败
    #[error("宿主错误: {0}")]
    Host(#[from] HostError),
}

impl RuntimeError {
    /// 写入控制台时使用的级别
    ///
    /// 对单个控件的样式/布局操作失败只是警告；
    /// 事件注册、生命周期与宿主失败属于错误。
    pub fn severity(&self) -> Severity {
        match self {
            Self::UnknownWidget { .. }
            | Self::WrongWidgetKind { .. }
            | Self::NoWarnScreen { .. }
            | Self::ReservedVariable { .. }
            | Self::InvalidArgument { .. } => Severity::Warning,
            Self::UnknownEventTarget { .. }
            | Self::UnknownWarnOption { .. }
            | Self::MatchTargetNotInput { .. }
            | Self::BadEventHeader { .. }
            | Self::MissingStartAndStop
            | Self::MissingStart
            | Self::MissingStop
            | Self::Host(_) => Severity::Error,
        }
    }
}

/// qude-runtime 统一错误类型
#[derive(Error, Debug, Clone, PartialEq)]
pub enum QudeError {
    /// 解析错误
    #[error("解析错误: {0}")]
    Parse(#[from] ParseError),

    /// 运行时错误
    #[error("运行时错误: {0}")]
    Runtime(#[from] RuntimeError),
}

/// Result 类型别名
pub type QudeResult<T> = Result<T, QudeError>;
