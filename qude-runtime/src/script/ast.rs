//! # AST 模块
//!
//! 定义 Qude 脚本的抽象语法树。
//!
//! ## 设计说明
//!
//! 解析器输出一个按顺序排列的 [`Statement`] 列表（[`Program`]），
//! 执行引擎逐条执行；event 块中的动作语句会被保存，等待宿主触发。

use serde::{Deserialize, Serialize};

/// 二元运算符
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BinaryOperator {
    Add,
    Sub,
    Mul,
    Div,
}

impl BinaryOperator {
    /// 从源码字符得到运算符
    pub fn from_symbol(c: char) -> Option<Self> {
        match c {
            '+' => Some(Self::Add),
            '-' => Some(Self::Sub),
            '*' => Some(Self::Mul),
            '/' => Some(Self::Div),
            _ => None,
        }
    }
}

/// 表达式
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Expr {
    /// 字符串字面量（不含引号，不做转义处理）
    StringLiteral(String),
    /// 数字字面量
    NumberLiteral(f64),
    /// 变量引用
    VariableReference(String),
    /// 二元运算
    BinaryOp {
        left: Box<Expr>,
        operator: BinaryOperator,
        right: Box<Expr>,
    },
}

impl Expr {
    /// 创建字符串字面量
    pub fn string(s: impl Into<String>) -> Self {
        Self::StringLiteral(s.into())
    }

    /// 创建数字字面量
    pub fn number(n: f64) -> Self {
        Self::NumberLiteral(n)
    }

    /// 创建变量引用
    pub fn var(name: impl Into<String>) -> Self {
        Self::VariableReference(name.into())
    }

    /// 创建二元运算
    pub fn binary(left: Expr, operator: BinaryOperator, right: Expr) -> Self {
        Self::BinaryOp {
            left: Box::new(left),
            operator,
            right: Box::new(right),
        }
    }
}

/// 条件语句类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConditionalKind {
    If,
    Elif,
    Else,
}

/// 条件比较（`left = right`）
///
/// `Else` 分支没有比较。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comparison {
    pub left: Expr,
    pub right: Expr,
}

/// 脚本语句
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Statement {
    /// `Qude.prompt`
    Start,
    /// `Qude.kill/`
    Stop,
    /// `Qonsol.write(expr)`
    ConsoleWrite(Expr),
    /// `taQe.putt(prompt)`，结果写入变量 `data`
    Input(Expr),
    /// `Qurr name = expr`
    Assign { name: String, expr: Expr },
    /// `matq(expr)`
    MathEcho(Expr),

    /// `Qwindow.qoll()`
    WindowOpen,
    /// `Qwindow.uptext(expr)`
    WindowTitle(Expr),
    /// `Qwindow.geometry.size(w, h)`
    WindowSize { width: Expr, height: Expr },
    /// `Qwindow.resizable = bool`
    WindowResizable(Expr),
    /// `Qwindow.fullscreen = bool`
    WindowFullscreen(Expr),
    /// `Qwindow.background.color(color)`
    WindowBackground(Expr),
    /// `kill.qwindow/`
    WindowClose,

    /// `kill.wwindow/`
    WarnClose,
    /// `Wwindow.uptext(expr)`
    WarnTitle(Expr),
    /// `Wwindow.background.color(expr)`
    WarnBackground(Expr),
    /// `warn.screen('message' <option>)`
    WarnScreen { message: Expr, option_label: String },

    /// `insert.text(expr) as name`
    InsertText { text: Expr, name: String },
    /// `insert.link() as name`
    InsertLink { name: String },
    /// `insert.button() as name`
    InsertButton { name: String },
    /// `insert.inputter() as name`
    InsertInput { name: String },

    /// `name.text(expr)`
    WidgetText { name: String, value: Expr },
    /// `name.link(url)`
    WidgetLink { name: String, url: Expr },
    /// `name.text.color(expr)`
    WidgetTextColor { name: String, value: Expr },
    /// `name.background.color(expr)`
    WidgetBackground { name: String, value: Expr },
    /// `name.font.font(expr)`
    WidgetFontFamily { name: String, value: Expr },
    /// `name.font.size = expr`
    WidgetFontSize { name: String, value: Expr },
    /// `name.geometry.size(w, h)`
    WidgetSize {
        name: String,
        width: Expr,
        height: Expr,
    },
    /// `name.cordinates(x, y)`
    WidgetPosition { name: String, x: Expr, y: Expr },

    /// `if left = right: then action` 及 elif / else
    Conditional {
        kind: ConditionalKind,
        comparison: Option<Comparison>,
        action: Box<Statement>,
    },

    /// `event;` 块
    ///
    /// `header` 保存源文本，执行时再按 event 头语法解析。
    EventBlock {
        header: String,
        action: Box<Statement>,
    },
}

impl Statement {
    /// 语句类型名（用于日志）
    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::Start => "Start",
            Self::Stop => "Stop",
            Self::ConsoleWrite(_) => "ConsoleWrite",
            Self::Input(_) => "Input",
            Self::Assign { .. } => "Assign",
            Self::MathEcho(_) => "MathEcho",
            Self::WindowOpen => "WindowOpen",
            Self::WindowTitle(_) => "WindowTitle",
            Self::WindowSize { .. } => "WindowSize",
            Self::WindowResizable(_) => "WindowResizable",
            Self::WindowFullscreen(_) => "WindowFullscreen",
            Self::WindowBackground(_) => "WindowBackground",
            Self::WindowClose => "WindowClose",
            Self::WarnClose => "WarnClose",
            Self::WarnTitle(_) => "WarnTitle",
            Self::WarnBackground(_) => "WarnBackground",
            Self::WarnScreen { .. } => "WarnScreen",
            Self::InsertText { .. } => "InsertText",
            Self::InsertLink { .. } => "InsertLink",
            Self::InsertButton { .. } => "InsertButton",
            Self::InsertInput { .. } => "InsertInput",
            Self::WidgetText { .. } => "WidgetText",
            Self::WidgetLink { .. } => "WidgetLink",
            Self::WidgetTextColor { .. } => "WidgetTextColor",
            Self::WidgetBackground { .. } => "WidgetBackground",
            Self::WidgetFontFamily { .. } => "WidgetFontFamily",
            Self::WidgetFontSize { .. } => "WidgetFontSize",
            Self::WidgetSize { .. } => "WidgetSize",
            Self::WidgetPosition { .. } => "WidgetPosition",
            Self::Conditional { .. } => "Conditional",
            Self::EventBlock { .. } => "EventBlock",
        }
    }

    /// 是否是 Start / Stop
    pub fn is_lifecycle(&self) -> bool {
        matches!(self, Self::Start | Self::Stop)
    }

    /// 语句操作的控件名（插入或样式/布局语句）
    pub fn widget_name(&self) -> Option<&str> {
        match self {
            Self::InsertText { name, .. }
            | Self::InsertLink { name }
            | Self::InsertButton { name }
            | Self::InsertInput { name }
            | Self::WidgetText { name, .. }
            | Self::WidgetLink { name, .. }
            | Self::WidgetTextColor { name, .. }
            | Self::WidgetBackground { name, .. }
            | Self::WidgetFontFamily { name, .. }
            | Self::WidgetFontSize { name, .. }
            | Self::WidgetSize { name, .. }
            | Self::WidgetPosition { name, .. } => Some(name),
            _ => None,
        }
    }

    /// 是否是控件插入语句
    pub fn is_insert(&self) -> bool {
        matches!(
            self,
            Self::InsertText { .. }
                | Self::InsertLink { .. }
                | Self::InsertButton { .. }
                | Self::InsertInput { .. }
        )
    }
}

/// 解析后的脚本
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Program {
    /// 脚本标识符
    pub id: String,
    /// 语句列表
    pub statements: Vec<Statement>,
    /// 每条语句对应的源码行号（从 1 开始）
    #[serde(default)]
    pub source_map: Vec<usize>,
}

impl Program {
    /// 创建脚本（无行号信息）
    pub fn new(id: impl Into<String>, statements: Vec<Statement>) -> Self {
        Self {
            id: id.into(),
            statements,
            source_map: Vec::new(),
        }
    }

    /// 创建带行号映射的脚本
    pub fn with_source_map(
        id: impl Into<String>,
        statements: Vec<Statement>,
        source_map: Vec<usize>,
    ) -> Self {
        Self {
            id: id.into(),
            statements,
            source_map,
        }
    }

    /// 语句数量
    pub fn len(&self) -> usize {
        self.statements.len()
    }

    /// 是否为空
    pub fn is_empty(&self) -> bool {
        self.statements.is_empty()
    }

    /// 第 `index` 条语句的源码行号
    pub fn source_line(&self, index: usize) -> Option<usize> {
        self.source_map.get(index).copied()
    }

    /// 是否包含开始语句
    pub fn has_start(&self) -> bool {
        self.statements.iter().any(|s| matches!(s, Statement::Start))
    }

    /// 是否包含结束语句
    pub fn has_stop(&self) -> bool {
        self.statements.iter().any(|s| matches!(s, Statement::Stop))
    }
}
