//! # Session 模块
//!
//! 定义一次脚本运行的会话状态与变量值。
//!
//! ## 设计原则
//!
//! - 会话状态由一个运行实例独占，不存在进程级全局状态
//! - 每次运行都从全新的状态开始，旧的窗口/控件句柄直接丢弃
//! - 顶层语句与事件回调通过同一条执行路径修改状态

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

use crate::host::{BindingId, FontSpec, SurfaceHandle, WidgetHandle, WidgetKind, WindowHandle};
use crate::runtime::binder::EventBinding;
use crate::script::EvalContext;

/// 输入语句写入的保留变量名
pub const INPUT_VARIABLE: &str = "data";

/// 脚本中引用输入结果的写法（大小写不敏感）
pub const INPUT_ALIAS: &str = "taqe.data";

/// 脚本变量值
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Value {
    /// 数字
    Number(f64),
    /// 文本
    Text(String),
}

impl Value {
    /// 创建文本值
    pub fn text(s: impl Into<String>) -> Self {
        Self::Text(s.into())
    }

    /// 按数字解释
    ///
    /// 文本去除首尾空白后，形如 `-12`、`3.5` 才视为数字。
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(*n),
            Self::Text(s) => parse_numeric_text(s),
        }
    }

    /// 布尔解释：`true`/`tr`/`1`/`yes`/`y`（大小写不敏感）或非零数字
    pub fn is_truthy(&self) -> bool {
        match self {
            Self::Number(n) => *n != 0.0,
            Self::Text(s) => matches!(
                s.trim().to_ascii_lowercase().as_str(),
                "true" | "tr" | "1" | "yes" | "y"
            ),
        }
    }

    /// 是否是文本
    pub fn is_text(&self) -> bool {
        matches!(self, Self::Text(_))
    }
}

impl Default for Value {
    fn default() -> Self {
        Self::Number(0.0)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(n) => {
                if n.is_finite() && n.fract() == 0.0 && n.abs() < 1e15 {
                    write!(f, "{}", *n as i64)
                } else {
                    write!(f, "{n}")
                }
            }
            Self::Text(s) => write!(f, "{s}"),
        }
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Self::Number(n)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

/// 解析形如 `[+-]digits[.digits]` 的文本
fn parse_numeric_text(s: &str) -> Option<f64> {
    let s = s.trim();
    let digits = s.strip_prefix(['+', '-']).unwrap_or(s);
    if digits.is_empty() || digits.starts_with('.') || digits.ends_with('.') {
        return None;
    }
    let mut seen_dot = false;
    for c in digits.chars() {
        match c {
            '0'..='9' => {}
            '.' if !seen_dot => seen_dot = true,
            _ => return None,
        }
    }
    s.parse::<f64>().ok()
}

/// 已注册的控件
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WidgetEntry {
    /// 宿主句柄
    pub handle: WidgetHandle,
    /// 控件类型
    pub kind: WidgetKind,
}

/// 条件链状态
///
/// `if` 开始一条新链，`elif`/`else` 只在链中尚无分支执行时才求值。
/// 顶层遍历和每次回调各自持有一条链。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConditionalChain {
    /// 当前没有活动的条件链
    #[default]
    Inactive,
    /// 链中尚未有分支执行
    Pending,
    /// 链中已有分支执行
    Taken,
}

/// 会话状态
///
/// 一次运行的**唯一可变状态**。
#[derive(Debug, Clone, Default)]
pub struct SessionState {
    /// 是否处于 Start 与 Stop 之间
    pub running: bool,
    /// 脚本变量
    pub variables: HashMap<String, Value>,
    /// 控件名 -> 控件
    pub widgets: HashMap<String, WidgetEntry>,
    /// 控件名 -> 字体
    pub widget_fonts: HashMap<String, FontSpec>,
    /// 控件名 -> 显式设置过的尺寸
    pub widget_sizes: HashMap<String, (u32, u32)>,
    /// 控件名 -> 位置
    pub widget_positions: HashMap<String, (i32, i32)>,
    /// 主窗口
    pub window: Option<WindowHandle>,
    /// warn 窗口
    pub warn_window: Option<SurfaceHandle>,
    /// warn 选项标签 -> 选项控件
    pub warn_option_widgets: HashMap<String, WidgetHandle>,
    /// 链接控件名 -> URL
    pub link_targets: HashMap<String, String>,
    /// 已注册的事件绑定
    pub bindings: HashMap<BindingId, EventBinding>,
    next_binding: u64,
}

impl SessionState {
    /// 创建新的会话状态
    pub fn new() -> Self {
        Self::default()
    }

    /// 清空所有状态，开始新的运行
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// 设置变量
    pub fn set_var(&mut self, name: impl Into<String>, value: Value) {
        self.variables.insert(name.into(), value);
    }

    /// 获取变量
    pub fn get_var(&self, name: &str) -> Option<&Value> {
        self.variables.get(name)
    }

    /// 获取控件
    pub fn widget(&self, name: &str) -> Option<WidgetEntry> {
        self.widgets.get(name).copied()
    }

    /// 注册控件
    ///
    /// 同名控件直接覆盖，旧句柄不再可达；旧控件的尺寸、位置和链接目标一并遗忘。
    pub fn register_widget(&mut self, name: &str, entry: WidgetEntry, font: FontSpec) {
        self.widget_sizes.remove(name);
        self.link_targets.remove(name);
        self.widget_positions.insert(name.to_string(), (0, 0));
        self.widget_fonts.insert(name.to_string(), font);
        self.widgets.insert(name.to_string(), entry);
    }

    /// 主窗口关闭：丢弃窗口及其控件
    pub fn forget_window(&mut self) {
        let handles: Vec<WidgetHandle> = self.widgets.values().map(|w| w.handle).collect();
        self.drop_bindings_for(&handles);
        self.window = None;
        self.widgets.clear();
        self.widget_fonts.clear();
        self.widget_sizes.clear();
        self.widget_positions.clear();
        self.link_targets.clear();
    }

    /// warn 窗口关闭：丢弃窗口及选项控件，返回被丢弃的窗口句柄
    pub fn forget_warn_screen(&mut self) -> Option<SurfaceHandle> {
        let handles: Vec<WidgetHandle> = self.warn_option_widgets.values().copied().collect();
        self.drop_bindings_for(&handles);
        self.warn_option_widgets.clear();
        self.warn_window.take()
    }

    /// 分配新的绑定 ID
    pub fn next_binding_id(&mut self) -> BindingId {
        self.next_binding += 1;
        BindingId(self.next_binding)
    }

    /// 删除目标为指定控件的绑定
    fn drop_bindings_for(&mut self, handles: &[WidgetHandle]) {
        self.bindings
            .retain(|_, binding| !handles.contains(&binding.target));
    }
}

impl EvalContext for SessionState {
    fn get_var(&self, name: &str) -> Option<&Value> {
        self.variables.get(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::MouseButton;
    use crate::runtime::binder::{BindingAction, BindingTrigger};
    use crate::script::Statement;

    #[test]
    fn test_value_display() {
        assert_eq!(Value::Number(20.0).to_string(), "20");
        assert_eq!(Value::Number(2.5).to_string(), "2.5");
        assert_eq!(Value::Number(-3.0).to_string(), "-3");
        assert_eq!(Value::text("hi").to_string(), "hi");
    }

    #[test]
    fn test_value_as_number() {
        assert_eq!(Value::text(" 12 ").as_number(), Some(12.0));
        assert_eq!(Value::text("-1.5").as_number(), Some(-1.5));
        assert_eq!(Value::text("1e3").as_number(), None);
        assert_eq!(Value::text("inf").as_number(), None);
        assert_eq!(Value::text("1.").as_number(), None);
        assert_eq!(Value::text("").as_number(), None);
        assert_eq!(Value::Number(4.0).as_number(), Some(4.0));
    }

    #[test]
    fn test_value_truthiness() {
        assert!(Value::text("True").is_truthy());
        assert!(Value::text(" y ").is_truthy());
        assert!(!Value::text("no").is_truthy());
        assert!(!Value::text("false").is_truthy());
        assert!(Value::Number(2.0).is_truthy());
        assert!(!Value::Number(0.0).is_truthy());
    }

    #[test]
    fn test_register_widget_overwrites_and_forgets_layout() {
        let mut state = SessionState::new();
        let first = WidgetEntry {
            handle: WidgetHandle(1),
            kind: WidgetKind::Button,
        };
        state.register_widget("b", first, FontSpec::default());
        state.widget_sizes.insert("b".to_string(), (10, 10));
        state.widget_positions.insert("b".to_string(), (5, 5));

        let second = WidgetEntry {
            handle: WidgetHandle(2),
            kind: WidgetKind::Input,
        };
        state.register_widget("b", second, FontSpec::default());

        assert_eq!(state.widget("b"), Some(second));
        assert!(!state.widget_sizes.contains_key("b"));
        assert_eq!(state.widget_positions.get("b"), Some(&(0, 0)));
    }

    #[test]
    fn test_forget_warn_screen_drops_option_bindings() {
        let mut state = SessionState::new();
        state.warn_window = Some(SurfaceHandle(7));
        state
            .warn_option_widgets
            .insert("ok".to_string(), WidgetHandle(3));
        let id = state.next_binding_id();
        state.bindings.insert(
            id,
            EventBinding {
                target: WidgetHandle(3),
                trigger: BindingTrigger::Click {
                    button: MouseButton::Left,
                },
                action: BindingAction::Run(Box::new(Statement::WarnClose)),
            },
        );

        assert_eq!(state.forget_warn_screen(), Some(SurfaceHandle(7)));
        assert!(state.warn_option_widgets.is_empty());
        assert!(state.bindings.is_empty());
        assert_eq!(state.forget_warn_screen(), None);
    }

    #[test]
    fn test_binding_ids_are_unique() {
        let mut state = SessionState::new();
        let a = state.next_binding_id();
        let b = state.next_binding_id();
        assert_ne!(a, b);
    }
}
