//! 内存宿主
//!
//! [`UiHost`] 的无界面实现：窗口、控件、warn 窗口都只是内存中的记录。
//! 用于测试和命令行宿主，并提供模拟用户交互的辅助方法。

use std::collections::{BTreeMap, VecDeque};
use std::fmt;

use super::{
    BindingId, FontSpec, HostError, HostResult, MouseButton, Severity, SurfaceHandle, UiHost,
    WidgetHandle, WidgetKind, WindowHandle,
};
use crate::input::RuntimeInput;

/// 新窗口的默认属性
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostDefaults {
    pub title: String,
    pub width: u32,
    pub height: u32,
    pub background: String,
}

impl Default for HostDefaults {
    fn default() -> Self {
        Self {
            title: "Qude App".to_string(),
            width: 400,
            height: 300,
            background: "#222".to_string(),
        }
    }
}

/// 内存中的主窗口
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemoryWindow {
    pub title: String,
    pub width: u32,
    pub height: u32,
    pub resizable: bool,
    pub fullscreen: bool,
    pub background: String,
    pub open: bool,
}

/// 控件所属的窗口
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WidgetParent {
    Window(WindowHandle),
    Surface(SurfaceHandle),
}

/// 内存中的控件
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemoryWidget {
    pub parent: WidgetParent,
    pub kind: WidgetKind,
    pub text: String,
    pub text_color: Option<String>,
    pub background: Option<String>,
    pub font: Option<FontSpec>,
    pub size: Option<(u32, u32)>,
    pub position: Option<(i32, i32)>,
    pub click_bindings: Vec<(MouseButton, BindingId)>,
    pub change_bindings: Vec<BindingId>,
}

impl MemoryWidget {
    fn new(parent: WidgetParent, kind: WidgetKind) -> Self {
        Self {
            parent,
            kind,
            text: String::new(),
            text_color: None,
            background: None,
            font: None,
            size: None,
            position: None,
            click_bindings: Vec::new(),
            change_bindings: Vec::new(),
        }
    }
}

/// 内存中的 warn 窗口
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemorySurface {
    pub message: String,
    pub option_label: String,
    pub option: WidgetHandle,
    pub title: String,
    pub background: Option<String>,
    pub open: bool,
}

/// 一行控制台输出
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConsoleLine {
    pub text: String,
    pub severity: Severity,
}

type Prompter = Box<dyn FnMut(&str) -> Option<String>>;
type ConsoleEcho = Box<dyn FnMut(&ConsoleLine)>;

/// 内存宿主
#[derive(Default)]
pub struct MemoryHost {
    defaults: HostDefaults,
    next_handle: u64,
    windows: BTreeMap<WindowHandle, MemoryWindow>,
    widgets: BTreeMap<WidgetHandle, MemoryWidget>,
    surfaces: BTreeMap<SurfaceHandle, MemorySurface>,
    console: Vec<ConsoleLine>,
    answers: VecDeque<String>,
    prompter: Option<Prompter>,
    echo: Option<ConsoleEcho>,
    prompts: Vec<String>,
    opened_links: Vec<String>,
}

impl fmt::Debug for MemoryHost {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemoryHost")
            .field("windows", &self.windows.len())
            .field("widgets", &self.widgets.len())
            .field("surfaces", &self.surfaces.len())
            .field("console", &self.console.len())
            .finish_non_exhaustive()
    }
}

impl MemoryHost {
    pub fn new() -> Self {
        Self::default()
    }

    /// 使用指定的窗口默认属性
    pub fn with_defaults(defaults: HostDefaults) -> Self {
        Self {
            defaults,
            ..Self::default()
        }
    }

    /// 预置 Input 提示的回答（按顺序消费）
    pub fn with_answers<I, S>(mut self, answers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.answers.extend(answers.into_iter().map(Into::into));
        self
    }

    /// 预置回答用尽后调用的提示函数
    pub fn set_prompter(&mut self, prompter: impl FnMut(&str) -> Option<String> + 'static) {
        self.prompter = Some(Box::new(prompter));
    }

    /// 每写入一行控制台输出时回调
    pub fn set_console_echo(&mut self, echo: impl FnMut(&ConsoleLine) + 'static) {
        self.echo = Some(Box::new(echo));
    }

    // ---- 查询 ----

    pub fn console(&self) -> &[ConsoleLine] {
        &self.console
    }

    /// 控制台输出文本
    pub fn console_lines(&self) -> Vec<&str> {
        self.console.iter().map(|l| l.text.as_str()).collect()
    }

    /// 指定级别的控制台输出
    pub fn console_lines_at(&self, severity: Severity) -> Vec<&str> {
        self.console
            .iter()
            .filter(|l| l.severity == severity)
            .map(|l| l.text.as_str())
            .collect()
    }

    pub fn window(&self, window: WindowHandle) -> Option<&MemoryWindow> {
        self.windows.get(&window)
    }

    pub fn widget(&self, widget: WidgetHandle) -> Option<&MemoryWidget> {
        self.widgets.get(&widget)
    }

    pub fn surface(&self, surface: SurfaceHandle) -> Option<&MemorySurface> {
        self.surfaces.get(&surface)
    }

    /// 所有仍然打开的主窗口
    pub fn open_windows(&self) -> Vec<WindowHandle> {
        self.windows
            .iter()
            .filter(|(_, w)| w.open)
            .map(|(h, _)| *h)
            .collect()
    }

    /// 所有仍然打开的 warn 窗口
    pub fn open_surfaces(&self) -> Vec<SurfaceHandle> {
        self.surfaces
            .iter()
            .filter(|(_, s)| s.open)
            .map(|(h, _)| *h)
            .collect()
    }

    /// 所有仍然可用的控件
    pub fn live_widgets(&self) -> Vec<WidgetHandle> {
        self.widgets
            .keys()
            .copied()
            .filter(|h| self.widget_alive(*h))
            .collect()
    }

    /// 当前打开的 warn 窗口中标签为 `label` 的选项控件
    pub fn surface_option(&self, label: &str) -> Option<WidgetHandle> {
        self.surfaces
            .values()
            .filter(|s| s.open && s.option_label == label)
            .map(|s| s.option)
            .next_back()
    }

    /// 已显示过的提示文本
    pub fn prompts(&self) -> &[String] {
        &self.prompts
    }

    /// 已打开的外部链接
    pub fn opened_links(&self) -> &[String] {
        &self.opened_links
    }

    // ---- 模拟交互 ----

    /// 模拟点击控件，返回宿主应送回 Runtime 的输入
    pub fn click(&self, widget: WidgetHandle, button: MouseButton) -> Vec<RuntimeInput> {
        if !self.widget_alive(widget) {
            return Vec::new();
        }
        self.widgets
            .get(&widget)
            .map(|w| {
                w.click_bindings
                    .iter()
                    .filter(|(b, _)| *b == button)
                    .map(|(_, id)| RuntimeInput::triggered(*id))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// 模拟在输入框中输入（整体替换内容）
    ///
    /// 内容没有变化时不产生输入。
    pub fn type_text(&mut self, widget: WidgetHandle, text: &str) -> Vec<RuntimeInput> {
        if !self.widget_alive(widget) {
            return Vec::new();
        }
        let Some(w) = self.widgets.get_mut(&widget) else {
            return Vec::new();
        };
        if w.kind != WidgetKind::Input || w.text == text {
            return Vec::new();
        }
        w.text = text.to_string();
        w.change_bindings
            .iter()
            .map(|id| RuntimeInput::triggered(*id))
            .collect()
    }

    /// 模拟用户关闭主窗口
    pub fn user_close_window(&mut self, window: WindowHandle) -> Vec<RuntimeInput> {
        match self.windows.get_mut(&window) {
            Some(w) if w.open => {
                w.open = false;
                vec![RuntimeInput::window_closed(window)]
            }
            _ => Vec::new(),
        }
    }

    /// 模拟用户关闭 warn 窗口
    pub fn user_close_surface(&mut self, surface: SurfaceHandle) -> Vec<RuntimeInput> {
        match self.surfaces.get_mut(&surface) {
            Some(s) if s.open => {
                s.open = false;
                vec![RuntimeInput::surface_closed(surface)]
            }
            _ => Vec::new(),
        }
    }

    // ---- 内部 ----

    fn next_id(&mut self) -> u64 {
        self.next_handle += 1;
        self.next_handle
    }

    fn widget_alive(&self, widget: WidgetHandle) -> bool {
        match self.widgets.get(&widget).map(|w| w.parent) {
            Some(WidgetParent::Window(window)) => self.window_alive(window),
            Some(WidgetParent::Surface(surface)) => {
                self.surfaces.get(&surface).is_some_and(|s| s.open)
            }
            None => false,
        }
    }

    fn window_mut(&mut self, window: WindowHandle) -> HostResult<&mut MemoryWindow> {
        match self.windows.get_mut(&window) {
            Some(w) if w.open => Ok(w),
            _ => Err(HostError::StaleHandle(format!("window {}", window.0))),
        }
    }

    fn widget_mut(&mut self, widget: WidgetHandle) -> HostResult<&mut MemoryWidget> {
        if !self.widget_alive(widget) {
            return Err(HostError::StaleHandle(format!("widget {}", widget.0)));
        }
        self.widgets
            .get_mut(&widget)
            .ok_or_else(|| HostError::StaleHandle(format!("widget {}", widget.0)))
    }

    fn surface_mut(&mut self, surface: SurfaceHandle) -> HostResult<&mut MemorySurface> {
        match self.surfaces.get_mut(&surface) {
            Some(s) if s.open => Ok(s),
            _ => Err(HostError::StaleHandle(format!("surface {}", surface.0))),
        }
    }
}

/// 校验颜色：`#rgb`、`#rrggbb` 或纯字母颜色名
pub(crate) fn validate_color(color: &str) -> HostResult<String> {
    let color = color.trim();
    let valid = match color.strip_prefix('#') {
        Some(hex) => (hex.len() == 3 || hex.len() == 6) && hex.chars().all(|c| c.is_ascii_hexdigit()),
        None => !color.is_empty() && color.chars().all(|c| c.is_ascii_alphabetic()),
    };
    if valid {
        Ok(color.to_string())
    } else {
        Err(HostError::InvalidColor(color.to_string()))
    }
}

impl UiHost for MemoryHost {
    fn create_window(&mut self) -> HostResult<WindowHandle> {
        let handle = WindowHandle(self.next_id());
        self.windows.insert(
            handle,
            MemoryWindow {
                title: self.defaults.title.clone(),
                width: self.defaults.width,
                height: self.defaults.height,
                resizable: true,
                fullscreen: false,
                background: self.defaults.background.clone(),
                open: true,
            },
        );
        Ok(handle)
    }

    fn window_alive(&self, window: WindowHandle) -> bool {
        self.windows.get(&window).is_some_and(|w| w.open)
    }

    fn set_window_title(&mut self, window: WindowHandle, title: &str) -> HostResult<()> {
        self.window_mut(window)?.title = title.to_string();
        Ok(())
    }

    fn set_window_size(
        &mut self,
        window: WindowHandle,
        width: u32,
        height: u32,
    ) -> HostResult<()> {
        let w = self.window_mut(window)?;
        w.width = width;
        w.height = height;
        Ok(())
    }

    fn set_window_resizable(&mut self, window: WindowHandle, resizable: bool) -> HostResult<()> {
        self.window_mut(window)?.resizable = resizable;
        Ok(())
    }

    fn set_window_fullscreen(
        &mut self,
        window: WindowHandle,
        fullscreen: bool,
    ) -> HostResult<()> {
        self.window_mut(window)?.fullscreen = fullscreen;
        Ok(())
    }

    fn set_window_background(&mut self, window: WindowHandle, color: &str) -> HostResult<()> {
        let color = validate_color(color)?;
        self.window_mut(window)?.background = color;
        Ok(())
    }

    fn close_window(&mut self, window: WindowHandle) -> HostResult<()> {
        self.window_mut(window)?.open = false;
        Ok(())
    }

    fn create_widget(
        &mut self,
        parent: WindowHandle,
        kind: WidgetKind,
    ) -> HostResult<WidgetHandle> {
        self.window_mut(parent)?;
        let handle = WidgetHandle(self.next_id());
        self.widgets
            .insert(handle, MemoryWidget::new(WidgetParent::Window(parent), kind));
        Ok(handle)
    }

    fn set_widget_text(&mut self, widget: WidgetHandle, text: &str) -> HostResult<()> {
        self.widget_mut(widget)?.text = text.to_string();
        Ok(())
    }

    fn set_widget_text_color(&mut self, widget: WidgetHandle, color: &str) -> HostResult<()> {
        let color = validate_color(color)?;
        self.widget_mut(widget)?.text_color = Some(color);
        Ok(())
    }

    fn set_widget_background(&mut self, widget: WidgetHandle, color: &str) -> HostResult<()> {
        let color = validate_color(color)?;
        self.widget_mut(widget)?.background = Some(color);
        Ok(())
    }

    fn set_widget_font(&mut self, widget: WidgetHandle, font: &FontSpec) -> HostResult<()> {
        self.widget_mut(widget)?.font = Some(font.clone());
        Ok(())
    }

    fn set_widget_size(
        &mut self,
        widget: WidgetHandle,
        width: u32,
        height: u32,
    ) -> HostResult<()> {
        self.widget_mut(widget)?.size = Some((width, height));
        Ok(())
    }

    fn set_widget_position(
        &mut self,
        widget: WidgetHandle,
        x: i32,
        y: i32,
        size: Option<(u32, u32)>,
    ) -> HostResult<()> {
        let w = self.widget_mut(widget)?;
        w.position = Some((x, y));
        if size.is_some() {
            w.size = size;
        }
        Ok(())
    }

    fn widget_text(&self, widget: WidgetHandle) -> HostResult<String> {
        if !self.widget_alive(widget) {
            return Err(HostError::StaleHandle(format!("widget {}", widget.0)));
        }
        self.widgets
            .get(&widget)
            .map(|w| w.text.clone())
            .ok_or_else(|| HostError::StaleHandle(format!("widget {}", widget.0)))
    }

    fn on_click(
        &mut self,
        widget: WidgetHandle,
        button: MouseButton,
        binding: BindingId,
    ) -> HostResult<()> {
        self.widget_mut(widget)?
            .click_bindings
            .push((button, binding));
        Ok(())
    }

    fn on_content_changed(&mut self, widget: WidgetHandle, binding: BindingId) -> HostResult<()> {
        let w = self.widget_mut(widget)?;
        if w.kind != WidgetKind::Input {
            return Err(HostError::Failed(format!(
                "widget {} has no content channel",
                widget.0
            )));
        }
        w.change_bindings.push(binding);
        Ok(())
    }

    fn prompt_text(&mut self, _parent: Option<WindowHandle>, message: &str) -> Option<String> {
        self.prompts.push(message.to_string());
        if let Some(answer) = self.answers.pop_front() {
            return Some(answer);
        }
        self.prompter.as_mut().and_then(|prompt| prompt(message))
    }

    fn open_external_link(&mut self, url: &str) -> HostResult<()> {
        if url.trim().is_empty() {
            return Err(HostError::Failed("empty link target".to_string()));
        }
        self.opened_links.push(url.to_string());
        Ok(())
    }

    fn open_secondary_surface(
        &mut self,
        message: &str,
        option_label: &str,
    ) -> HostResult<(SurfaceHandle, WidgetHandle)> {
        let surface = SurfaceHandle(self.next_id());
        let option = WidgetHandle(self.next_id());
        let mut widget = MemoryWidget::new(WidgetParent::Surface(surface), WidgetKind::Button);
        widget.text = option_label.to_string();
        self.widgets.insert(option, widget);
        self.surfaces.insert(
            surface,
            MemorySurface {
                message: message.to_string(),
                option_label: option_label.to_string(),
                option,
                title: String::new(),
                background: None,
                open: true,
            },
        );
        Ok((surface, option))
    }

    fn set_surface_title(&mut self, surface: SurfaceHandle, title: &str) -> HostResult<()> {
        self.surface_mut(surface)?.title = title.to_string();
        Ok(())
    }

    fn set_surface_background(&mut self, surface: SurfaceHandle, color: &str) -> HostResult<()> {
        let color = validate_color(color)?;
        self.surface_mut(surface)?.background = Some(color);
        Ok(())
    }

    fn close_secondary_surface(&mut self, surface: SurfaceHandle) -> HostResult<()> {
        self.surface_mut(surface)?.open = false;
        Ok(())
    }

    fn console_write(&mut self, line: &str, severity: Severity) {
        let line = ConsoleLine {
            text: line.to_string(),
            severity,
        };
        if let Some(echo) = self.echo.as_mut() {
            echo(&line);
        }
        self.console.push(line);
    }
}
