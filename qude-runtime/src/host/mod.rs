//! # Host 模块
//!
//! 定义 Runtime 调用的 UI 宿主能力。
//!
//! ## 设计说明
//!
//! - Runtime 只调用 [`UiHost`]，从不持有宿主资源，只持有句柄
//! - 事件回调不以闭包形式交给宿主，而是交一个 [`BindingId`]；
//!   宿主在用户交互时把 `RuntimeInput::Triggered` 送回 Runtime
//! - 控制台是脚本作者唯一可见的错误通道

mod memory;

pub use memory::{
    ConsoleLine, HostDefaults, MemoryHost, MemorySurface, MemoryWidget, MemoryWindow, WidgetParent,
};

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// 主窗口句柄
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct WindowHandle(pub u64);

/// 控件句柄
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct WidgetHandle(pub u64);

/// 次级窗口（warn 窗口）句柄
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SurfaceHandle(pub u64);

/// 事件绑定标识符
///
/// 由 Runtime 分配，宿主在触发时原样送回。
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct BindingId(pub u64);

impl fmt::Display for BindingId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// 控件类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WidgetKind {
    /// 文本标签（链接也是标签）
    Label,
    /// 按钮
    Button,
    /// 单行输入框
    Input,
}

/// 鼠标按键
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MouseButton {
    Left,
    Right,
}

impl MouseButton {
    /// 从 event 头中的 `LeftClickEvent` / `RightClickEvent` 得到按键
    pub fn from_event_name(name: &str) -> Option<Self> {
        match name {
            "LeftClickEvent" => Some(Self::Left),
            "RightClickEvent" => Some(Self::Right),
            _ => None,
        }
    }
}

/// 控制台级别
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Warning,
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Info => "info",
            Self::Warning => "warning",
            Self::Error => "error",
        };
        f.write_str(name)
    }
}

/// 字体描述
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FontSpec {
    pub family: String,
    pub size: u32,
    pub underline: bool,
}

impl Default for FontSpec {
    fn default() -> Self {
        Self {
            family: "Helvetica".to_string(),
            size: 12,
            underline: false,
        }
    }
}

/// 宿主调用失败
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum HostError {
    /// 无法识别的颜色
    #[error("无效的颜色 '{0}'")]
    InvalidColor(String),

    /// 句柄已失效（窗口已关闭）
    #[error("句柄已失效: {0}")]
    StaleHandle(String),

    /// 其他失败
    #[error("{0}")]
    Failed(String),
}

/// 宿主调用结果
pub type HostResult<T> = Result<T, HostError>;

/// UI 宿主能力
///
/// 表现层实现这个 trait；Runtime 只调用它。
/// 所有方法都在同一个逻辑线程上被调用，不需要 `Send`/`Sync`。
pub trait UiHost {
    // ---- 主窗口 ----

    /// 创建主窗口
    fn create_window(&mut self) -> HostResult<WindowHandle>;

    /// 窗口是否仍然存在
    fn window_alive(&self, window: WindowHandle) -> bool;

    fn set_window_title(&mut self, window: WindowHandle, title: &str) -> HostResult<()>;

    fn set_window_size(&mut self, window: WindowHandle, width: u32, height: u32)
    -> HostResult<()>;

    fn set_window_resizable(&mut self, window: WindowHandle, resizable: bool) -> HostResult<()>;

    fn set_window_fullscreen(&mut self, window: WindowHandle, fullscreen: bool)
    -> HostResult<()>;

    fn set_window_background(&mut self, window: WindowHandle, color: &str) -> HostResult<()>;

    /// 关闭主窗口，其上的控件一并失效
    fn close_window(&mut self, window: WindowHandle) -> HostResult<()>;

    // ---- 控件 ----

    /// 在窗口中创建控件
    fn create_widget(&mut self, parent: WindowHandle, kind: WidgetKind)
    -> HostResult<WidgetHandle>;

    fn set_widget_text(&mut self, widget: WidgetHandle, text: &str) -> HostResult<()>;

    fn set_widget_text_color(&mut self, widget: WidgetHandle, color: &str) -> HostResult<()>;

    fn set_widget_background(&mut self, widget: WidgetHandle, color: &str) -> HostResult<()>;

    /// 整体替换控件字体
    fn set_widget_font(&mut self, widget: WidgetHandle, font: &FontSpec) -> HostResult<()>;

    fn set_widget_size(&mut self, widget: WidgetHandle, width: u32, height: u32)
    -> HostResult<()>;

    /// 放置控件；`size` 为 `None` 时使用宿主默认尺寸
    fn set_widget_position(
        &mut self,
        widget: WidgetHandle,
        x: i32,
        y: i32,
        size: Option<(u32, u32)>,
    ) -> HostResult<()>;

    /// 读取控件当前文本（用于输入框）
    fn widget_text(&self, widget: WidgetHandle) -> HostResult<String>;

    // ---- 事件 ----

    /// 注册点击通道
    fn on_click(
        &mut self,
        widget: WidgetHandle,
        button: MouseButton,
        binding: BindingId,
    ) -> HostResult<()>;

    /// 注册内容变化通道
    fn on_content_changed(&mut self, widget: WidgetHandle, binding: BindingId) -> HostResult<()>;

    // ---- 其他 ----

    /// 阻塞式文本输入；`None` 表示用户取消
    fn prompt_text(&mut self, parent: Option<WindowHandle>, message: &str) -> Option<String>;

    fn open_external_link(&mut self, url: &str) -> HostResult<()>;

    // ---- warn 窗口 ----

    /// 打开次级窗口，返回窗口句柄和选项控件句柄
    fn open_secondary_surface(
        &mut self,
        message: &str,
        option_label: &str,
    ) -> HostResult<(SurfaceHandle, WidgetHandle)>;

    fn set_surface_title(&mut self, surface: SurfaceHandle, title: &str) -> HostResult<()>;

    fn set_surface_background(&mut self, surface: SurfaceHandle, color: &str) -> HostResult<()>;

    fn close_secondary_surface(&mut self, surface: SurfaceHandle) -> HostResult<()>;

    // ---- 控制台 ----

    /// 写入一行控制台输出
    fn console_write(&mut self, line: &str, severity: Severity);
}
