//! # Executor 模块
//!
//! 单语句执行路径。
//!
//! ## 职责
//!
//! - 对一条语句求值并调用宿主能力
//! - 维护条件链
//! - 把 event 块交给 binder 注册
//!
//! 顶层遍历和事件回调都经过 [`Executor::execute`]，它不知道自己处于哪一种。

use tracing::debug;

use super::binder::{register_event, register_link};
use crate::error::RuntimeError;
use crate::host::{FontSpec, Severity, SurfaceHandle, UiHost, WidgetHandle, WidgetKind, WindowHandle};
use crate::script::{
    Comparison, ConditionalKind, Statement, evaluate, evaluate_to_bool, values_equal,
};
use crate::session::{ConditionalChain, INPUT_VARIABLE, SessionState, Value, WidgetEntry};

/// 新控件的默认样式
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StyleDefaults {
    pub font_family: String,
    pub font_size: u32,
    /// 链接控件的文字颜色
    pub link_color: String,
    /// `insert.button()` 的默认文字
    pub button_text: String,
    /// `insert.link()` 的默认文字
    pub link_text: String,
}

impl Default for StyleDefaults {
    fn default() -> Self {
        Self {
            font_family: "Helvetica".to_string(),
            font_size: 12,
            link_color: "#1a73e8".to_string(),
            button_text: "button".to_string(),
            link_text: "link".to_string(),
        }
    }
}

impl StyleDefaults {
    /// 普通控件字体
    pub fn font(&self) -> FontSpec {
        FontSpec {
            family: self.font_family.clone(),
            size: self.font_size,
            underline: false,
        }
    }

    /// 链接控件字体（带下划线）
    pub fn link_font(&self) -> FontSpec {
        FontSpec {
            underline: true,
            ..self.font()
        }
    }
}

/// 语句执行器
#[derive(Debug)]
pub struct Executor {
    style: StyleDefaults,
}

impl Executor {
    /// 创建新的执行器
    pub fn new(style: StyleDefaults) -> Self {
        Self { style }
    }

    /// 当前使用的默认样式
    pub fn style(&self) -> &StyleDefaults {
        &self.style
    }

    /// 执行单条语句
    ///
    /// 不检查运行闸门。`chain` 是调用方持有的条件链。
    pub fn execute(
        &self,
        statement: &Statement,
        state: &mut SessionState,
        host: &mut impl UiHost,
        chain: &mut ConditionalChain,
    ) -> Result<(), RuntimeError> {
        debug!(statement = statement.kind_name(), "执行语句");

        match statement {
            Statement::Start => {
                state.running = true;
                *chain = ConditionalChain::Inactive;
            }
            Statement::Stop => {
                state.running = false;
                *chain = ConditionalChain::Inactive;
            }
            Statement::ConsoleWrite(expr) | Statement::MathEcho(expr) => {
                let value = evaluate(expr, state);
                host.console_write(&value.to_string(), Severity::Info);
            }
            Statement::Input(prompt) => {
                let prompt = evaluate(prompt, state).to_string();
                let parent = state.window.filter(|w| host.window_alive(*w));
                let answer = host.prompt_text(parent, &prompt).unwrap_or_default();
                state.set_var(INPUT_VARIABLE, Value::Text(answer));
            }
            Statement::Assign { name, expr } => {
                if name == INPUT_VARIABLE {
                    return Err(RuntimeError::ReservedVariable { name: name.clone() });
                }
                let value = evaluate(expr, state);
                state.set_var(name.as_str(), value);
            }

            Statement::WindowOpen => {
                ensure_window(state, host)?;
            }
            Statement::WindowTitle(expr) => {
                let window = ensure_window(state, host)?;
                let title = evaluate(expr, state).to_string();
                host.set_window_title(window, &title)?;
            }
            Statement::WindowSize { width, height } => {
                let window = ensure_window(state, host)?;
                let width = to_dimension(&evaluate(width, state), "窗口宽度")?;
                let height = to_dimension(&evaluate(height, state), "窗口高度")?;
                host.set_window_size(window, width, height)?;
            }
            Statement::WindowResizable(expr) => {
                let window = ensure_window(state, host)?;
                let resizable = evaluate_to_bool(expr, state);
                host.set_window_resizable(window, resizable)?;
            }
            Statement::WindowFullscreen(expr) => {
                let window = ensure_window(state, host)?;
                let fullscreen = evaluate_to_bool(expr, state);
                host.set_window_fullscreen(window, fullscreen)?;
            }
            Statement::WindowBackground(expr) => {
                let window = ensure_window(state, host)?;
                let color = evaluate(expr, state).to_string();
                host.set_window_background(window, &color)?;
            }
            Statement::WindowClose => {
                if let Some(window) = state.window {
                    state.forget_window();
                    if host.window_alive(window) {
                        host.close_window(window)?;
                    }
                } else {
                    debug!("没有打开的主窗口");
                }
            }

            Statement::WarnClose => match state.forget_warn_screen() {
                Some(surface) => host.close_secondary_surface(surface)?,
                None => debug!("没有打开的 warn 窗口"),
            },
            Statement::WarnTitle(expr) => {
                let surface = warn_surface(state, "Wwindow.uptext")?;
                let title = evaluate(expr, state).to_string();
                host.set_surface_title(surface, &title)?;
            }
            Statement::WarnBackground(expr) => {
                let surface = warn_surface(state, "Wwindow.bg")?;
                let color = evaluate(expr, state).to_string();
                host.set_surface_background(surface, &color)?;
            }
            Statement::WarnScreen {
                message,
                option_label,
            } => {
                if let Some(old) = state.forget_warn_screen() {
                    // 旧窗口可能已被用户关闭
                    if let Err(e) = host.close_secondary_surface(old) {
                        debug!(error = %e, "关闭旧 warn 窗口失败");
                    }
                }
                let message = evaluate(message, state).to_string();
                let (surface, option) = host.open_secondary_surface(&message, option_label)?;
                state.warn_window = Some(surface);
                state
                    .warn_option_widgets
                    .insert(option_label.clone(), option);
            }

            Statement::InsertText { text, name } => {
                let text = evaluate(text, state).to_string();
                let font = self.style.font();
                let handle = self.insert_widget(name, WidgetKind::Label, font, state, host)?;
                host.set_widget_text(handle, &text)?;
            }
            Statement::InsertButton { name } => {
                let font = self.style.font();
                let handle = self.insert_widget(name, WidgetKind::Button, font, state, host)?;
                host.set_widget_text(handle, &self.style.button_text)?;
            }
            Statement::InsertInput { name } => {
                let font = self.style.font();
                self.insert_widget(name, WidgetKind::Input, font, state, host)?;
            }
            Statement::InsertLink { name } => {
                let font = self.style.link_font();
                let handle = self.insert_widget(name, WidgetKind::Label, font, state, host)?;
                host.set_widget_text(handle, &self.style.link_text)?;
                host.set_widget_text_color(handle, &self.style.link_color)?;
            }

            Statement::WidgetText { name, value } => {
                let entry = lookup(state, name)?;
                if entry.kind == WidgetKind::Input {
                    return Err(RuntimeError::WrongWidgetKind {
                        name: name.clone(),
                        operation: "text".to_string(),
                        actual: entry.kind,
                    });
                }
                let text = evaluate(value, state).to_string();
                host.set_widget_text(entry.handle, &text)?;
            }
            Statement::WidgetLink { name, url } => {
                let entry = lookup(state, name)?;
                if entry.kind != WidgetKind::Label {
                    return Err(RuntimeError::WrongWidgetKind {
                        name: name.clone(),
                        operation: "link".to_string(),
                        actual: entry.kind,
                    });
                }
                let url = evaluate(url, state).to_string();
                if register_link(name, entry.handle, state, host)?.is_some() {
                    // 首次链接的文本控件换成链接样式
                    let font = FontSpec {
                        underline: true,
                        ..self.current_font(state, name)
                    };
                    host.set_widget_text_color(entry.handle, &self.style.link_color)?;
                    host.set_widget_font(entry.handle, &font)?;
                    state.widget_fonts.insert(name.clone(), font);
                }
                state.link_targets.insert(name.clone(), url);
            }
            Statement::WidgetTextColor { name, value } => {
                let entry = lookup(state, name)?;
                let color = evaluate(value, state).to_string();
                host.set_widget_text_color(entry.handle, &color)?;
            }
            Statement::WidgetBackground { name, value } => {
                let entry = lookup(state, name)?;
                let color = evaluate(value, state).to_string();
                host.set_widget_background(entry.handle, &color)?;
            }
            Statement::WidgetFontFamily { name, value } => {
                let entry = lookup(state, name)?;
                let family = evaluate(value, state).to_string();
                let mut font = self.current_font(state, name);
                font.family = family;
                host.set_widget_font(entry.handle, &font)?;
                state.widget_fonts.insert(name.clone(), font);
            }
            Statement::WidgetFontSize { name, value } => {
                let entry = lookup(state, name)?;
                let size = to_dimension(&evaluate(value, state), "字号")?;
                if size == 0 {
                    return Err(RuntimeError::InvalidArgument {
                        what: "字号".to_string(),
                        value: size.to_string(),
                    });
                }
                let mut font = self.current_font(state, name);
                font.size = size;
                host.set_widget_font(entry.handle, &font)?;
                state.widget_fonts.insert(name.clone(), font);
            }
            Statement::WidgetSize {
                name,
                width,
                height,
            } => {
                let entry = lookup(state, name)?;
                let width = to_dimension(&evaluate(width, state), "控件宽度")?;
                let height = to_dimension(&evaluate(height, state), "控件高度")?;
                host.set_widget_size(entry.handle, width, height)?;
                state.widget_sizes.insert(name.clone(), (width, height));
            }
            Statement::WidgetPosition { name, x, y } => {
                let entry = lookup(state, name)?;
                let x = to_coordinate(&evaluate(x, state), "横坐标")?;
                let y = to_coordinate(&evaluate(y, state), "纵坐标")?;
                let size = state.widget_sizes.get(name).copied();
                host.set_widget_position(entry.handle, x, y, size)?;
                state.widget_positions.insert(name.clone(), (x, y));
            }

            Statement::Conditional {
                kind,
                comparison,
                action,
            } => {
                if self.take_branch(*kind, comparison.as_ref(), state, chain) {
                    self.execute(action, state, host, chain)?;
                }
            }
            Statement::EventBlock { header, action } => {
                register_event(header, action, state, host)?;
            }
        }

        Ok(())
    }

    /// 推进条件链，返回本分支是否执行
    fn take_branch(
        &self,
        kind: ConditionalKind,
        comparison: Option<&Comparison>,
        state: &SessionState,
        chain: &mut ConditionalChain,
    ) -> bool {
        let holds = |c: Option<&Comparison>| {
            c.is_none_or(|c| values_equal(&evaluate(&c.left, state), &evaluate(&c.right, state)))
        };

        let taken = match (kind, *chain) {
            (ConditionalKind::If, _) => holds(comparison),
            (ConditionalKind::Elif | ConditionalKind::Else, ConditionalChain::Pending) => {
                holds(comparison)
            }
            (ConditionalKind::Elif | ConditionalKind::Else, _) => {
                debug!(chain = ?*chain, "跳过分支");
                false
            }
        };

        *chain = match (kind, taken) {
            (ConditionalKind::Else, _) => ConditionalChain::Inactive,
            (ConditionalKind::If, false) => ConditionalChain::Pending,
            (ConditionalKind::Elif, false) => *chain,
            (_, true) => ConditionalChain::Taken,
        };
        taken
    }

    /// 创建控件并注册到会话
    fn insert_widget(
        &self,
        name: &str,
        kind: WidgetKind,
        font: FontSpec,
        state: &mut SessionState,
        host: &mut impl UiHost,
    ) -> Result<WidgetHandle, RuntimeError> {
        let window = ensure_window(state, host)?;
        let handle = host.create_widget(window, kind)?;
        host.set_widget_font(handle, &font)?;
        state.register_widget(name, WidgetEntry { handle, kind }, font);
        debug!(widget = name, kind = ?kind, "创建控件");
        Ok(handle)
    }

    fn current_font(&self, state: &SessionState, name: &str) -> FontSpec {
        state
            .widget_fonts
            .get(name)
            .cloned()
            .unwrap_or_else(|| self.style.font())
    }
}

impl Default for Executor {
    fn default() -> Self {
        Self::new(StyleDefaults::default())
    }
}

/// 返回当前主窗口，不存在或已销毁时新建
fn ensure_window(
    state: &mut SessionState,
    host: &mut impl UiHost,
) -> Result<WindowHandle, RuntimeError> {
    if let Some(window) = state.window.filter(|w| host.window_alive(*w)) {
        return Ok(window);
    }
    let window = host.create_window()?;
    debug!(window = window.0, "创建主窗口");
    state.window = Some(window);
    Ok(window)
}

fn warn_surface(state: &SessionState, operation: &str) -> Result<SurfaceHandle, RuntimeError> {
    state.warn_window.ok_or_else(|| RuntimeError::NoWarnScreen {
        operation: operation.to_string(),
    })
}

fn lookup(state: &SessionState, name: &str) -> Result<WidgetEntry, RuntimeError> {
    state.widget(name).ok_or_else(|| RuntimeError::UnknownWidget {
        name: name.to_string(),
    })
}

/// 非负整数尺寸（四舍五入）
fn to_dimension(value: &Value, what: &str) -> Result<u32, RuntimeError> {
    match value.as_number() {
        Some(n) if n.is_finite() && n >= 0.0 && n <= f64::from(u32::MAX) => Ok(n.round() as u32),
        _ => Err(invalid(value, what)),
    }
}

/// 整数坐标，允许负数
fn to_coordinate(value: &Value, what: &str) -> Result<i32, RuntimeError> {
    match value.as_number() {
        Some(n) if n.is_finite() && n.abs() <= f64::from(i32::MAX) => Ok(n.round() as i32),
        _ => Err(invalid(value, what)),
    }
}

fn invalid(value: &Value, what: &str) -> RuntimeError {
    RuntimeError::InvalidArgument {
        what: what.to_string(),
        value: value.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::MemoryHost;
    use crate::script::Expr;

    fn run_all(statements: &[Statement], host: &mut MemoryHost) -> SessionState {
        let executor = Executor::default();
        let mut state = SessionState::new();
        let mut chain = ConditionalChain::default();
        for statement in statements {
            executor
                .execute(statement, &mut state, host, &mut chain)
                .unwrap();
        }
        state
    }

    fn cond(kind: ConditionalKind, left: Expr, right: Expr, text: &str) -> Statement {
        Statement::Conditional {
            kind,
            comparison: Some(Comparison { left, right }),
            action: Box::new(Statement::ConsoleWrite(Expr::string(text))),
        }
    }

    #[test]
    fn test_console_write_and_math_echo() {
        let mut host = MemoryHost::new();
        run_all(
            &[
                Statement::ConsoleWrite(Expr::string("hello")),
                Statement::MathEcho(Expr::binary(
                    Expr::number(2.0),
                    crate::script::BinaryOperator::Add,
                    Expr::number(3.0),
                )),
            ],
            &mut host,
        );
        assert_eq!(host.console_lines(), vec!["hello", "5"]);
        assert!(host.open_windows().is_empty());
    }

    #[test]
    fn test_input_stores_answer_or_empty() {
        let mut host = MemoryHost::new().with_answers(["alice"]);
        let state = run_all(&[Statement::Input(Expr::string("name?"))], &mut host);
        assert_eq!(state.get_var("data"), Some(&Value::text("alice")));
        assert_eq!(host.prompts(), &["name?".to_string()]);

        let mut host = MemoryHost::new();
        let state = run_all(&[Statement::Input(Expr::string("again?"))], &mut host);
        assert_eq!(state.get_var("data"), Some(&Value::text("")));
    }

    #[test]
    fn test_window_open_is_idempotent() {
        let mut host = MemoryHost::new();
        let state = run_all(&[Statement::WindowOpen, Statement::WindowOpen], &mut host);
        assert_eq!(host.open_windows().len(), 1);
        assert_eq!(host.open_windows()[0], state.window.unwrap());
    }

    #[test]
    fn test_window_properties() {
        let mut host = MemoryHost::new();
        let state = run_all(
            &[
                Statement::WindowTitle(Expr::string("Demo")),
                Statement::WindowSize {
                    width: Expr::number(640.0),
                    height: Expr::string("480"),
                },
                Statement::WindowResizable(Expr::string("no")),
                Statement::WindowFullscreen(Expr::string("yes")),
            ],
            &mut host,
        );
        let window = host.window(state.window.unwrap()).unwrap();
        assert_eq!(window.title, "Demo");
        assert_eq!((window.width, window.height), (640, 480));
        assert!(!window.resizable);
        assert!(window.fullscreen);
    }

    #[test]
    fn test_invalid_window_size() {
        let mut host = MemoryHost::new();
        let executor = Executor::default();
        let mut state = SessionState::new();
        let err = executor
            .execute(
                &Statement::WindowSize {
                    width: Expr::string("wide"),
                    height: Expr::number(1.0),
                },
                &mut state,
                &mut host,
                &mut ConditionalChain::default(),
            )
            .unwrap_err();
        assert!(matches!(err, RuntimeError::InvalidArgument { .. }));
        assert_eq!(err.severity(), Severity::Warning);
    }

    #[test]
    fn test_insert_widgets_apply_style() {
        let mut host = MemoryHost::new();
        let state = run_all(
            &[
                Statement::InsertText {
                    text: Expr::string("Hi"),
                    name: "t".to_string(),
                },
                Statement::InsertButton {
                    name: "b".to_string(),
                },
                Statement::InsertLink {
                    name: "l".to_string(),
                },
                Statement::InsertInput {
                    name: "i".to_string(),
                },
            ],
            &mut host,
        );

        let text = host.widget(state.widget("t").unwrap().handle).unwrap();
        assert_eq!(text.text, "Hi");
        assert_eq!(text.kind, WidgetKind::Label);

        let button = host.widget(state.widget("b").unwrap().handle).unwrap();
        assert_eq!(button.text, "button");

        let link = host.widget(state.widget("l").unwrap().handle).unwrap();
        assert_eq!(link.text, "link");
        assert_eq!(link.text_color.as_deref(), Some("#1a73e8"));
        assert!(link.font.as_ref().unwrap().underline);

        assert_eq!(state.widget("i").unwrap().kind, WidgetKind::Input);
        assert_eq!(host.open_windows().len(), 1);
    }

    #[test]
    fn test_widget_ops_on_unknown_name() {
        let mut host = MemoryHost::new();
        let executor = Executor::default();
        let mut state = SessionState::new();
        let err = executor
            .execute(
                &Statement::WidgetBackground {
                    name: "ghost".to_string(),
                    value: Expr::string("red"),
                },
                &mut state,
                &mut host,
                &mut ConditionalChain::default(),
            )
            .unwrap_err();
        assert_eq!(
            err,
            RuntimeError::UnknownWidget {
                name: "ghost".to_string()
            }
        );
        assert!(host.open_windows().is_empty());
    }

    #[test]
    fn test_position_keeps_recorded_size() {
        let mut host = MemoryHost::new();
        let name = "b".to_string();
        let state = run_all(
            &[
                Statement::InsertButton { name: name.clone() },
                Statement::WidgetSize {
                    name: name.clone(),
                    width: Expr::number(80.0),
                    height: Expr::number(20.0),
                },
                Statement::WidgetPosition {
                    name: name.clone(),
                    x: Expr::number(10.0),
                    y: Expr::number(30.0),
                },
            ],
            &mut host,
        );
        let widget = host.widget(state.widget("b").unwrap().handle).unwrap();
        assert_eq!(widget.position, Some((10, 30)));
        assert_eq!(widget.size, Some((80, 20)));
        assert_eq!(state.widget_positions.get("b"), Some(&(10, 30)));
    }

    #[test]
    fn test_font_changes_accumulate() {
        let mut host = MemoryHost::new();
        let name = "t".to_string();
        let state = run_all(
            &[
                Statement::InsertText {
                    text: Expr::string("x"),
                    name: name.clone(),
                },
                Statement::WidgetFontFamily {
                    name: name.clone(),
                    value: Expr::string("Courier"),
                },
                Statement::WidgetFontSize {
                    name: name.clone(),
                    value: Expr::number(20.0),
                },
            ],
            &mut host,
        );
        let font = host
            .widget(state.widget("t").unwrap().handle)
            .unwrap()
            .font
            .clone()
            .unwrap();
        assert_eq!(font.family, "Courier");
        assert_eq!(font.size, 20);
    }

    #[test]
    fn test_text_on_input_is_rejected() {
        let mut host = MemoryHost::new();
        let executor = Executor::default();
        let mut state = run_all(
            &[Statement::InsertInput {
                name: "i".to_string(),
            }],
            &mut host,
        );
        let err = executor
            .execute(
                &Statement::WidgetText {
                    name: "i".to_string(),
                    value: Expr::string("x"),
                },
                &mut state,
                &mut host,
                &mut ConditionalChain::default(),
            )
            .unwrap_err();
        assert!(matches!(err, RuntimeError::WrongWidgetKind { .. }));
    }

    #[test]
    fn test_assign_to_data_is_rejected() {
        let mut host = MemoryHost::new().with_answers(["real"]);
        let executor = Executor::default();
        let mut state = run_all(&[Statement::Input(Expr::string("?"))], &mut host);
        let err = executor
            .execute(
                &Statement::Assign {
                    name: "data".to_string(),
                    expr: Expr::string("forged"),
                },
                &mut state,
                &mut host,
                &mut ConditionalChain::default(),
            )
            .unwrap_err();
        assert!(matches!(err, RuntimeError::ReservedVariable { .. }));
        assert_eq!(err.severity(), Severity::Warning);
        assert_eq!(state.get_var("data"), Some(&Value::text("real")));
    }

    #[test]
    fn test_link_requires_label() {
        let mut host = MemoryHost::new();
        let executor = Executor::default();
        let mut state = run_all(
            &[
                Statement::InsertInput {
                    name: "i".to_string(),
                },
                Statement::InsertText {
                    text: Expr::string("docs"),
                    name: "t".to_string(),
                },
            ],
            &mut host,
        );
        let link = |name: &str| Statement::WidgetLink {
            name: name.to_string(),
            url: Expr::string("https://x.example"),
        };

        let err = executor
            .execute(&link("i"), &mut state, &mut host, &mut ConditionalChain::default())
            .unwrap_err();
        assert!(matches!(err, RuntimeError::WrongWidgetKind { .. }));
        assert!(state.bindings.is_empty());
        assert!(!state.link_targets.contains_key("i"));

        executor
            .execute(&link("t"), &mut state, &mut host, &mut ConditionalChain::default())
            .unwrap();
        let label = host.widget(state.widget("t").unwrap().handle).unwrap();
        assert_eq!(label.text, "docs");
        assert_eq!(label.text_color.as_deref(), Some("#1a73e8"));
        assert!(label.font.as_ref().unwrap().underline);
        assert_eq!(state.bindings.len(), 1);
    }

    #[test]
    fn test_conditional_chain_takes_first_true_branch() {
        let mut host = MemoryHost::new();
        run_all(
            &[
                Statement::Assign {
                    name: "n".to_string(),
                    expr: Expr::number(2.0),
                },
                cond(ConditionalKind::If, Expr::var("n"), Expr::number(1.0), "one"),
                cond(ConditionalKind::Elif, Expr::var("n"), Expr::number(2.0), "two"),
                cond(ConditionalKind::Elif, Expr::var("n"), Expr::number(2.0), "again"),
                Statement::Conditional {
                    kind: ConditionalKind::Else,
                    comparison: None,
                    action: Box::new(Statement::ConsoleWrite(Expr::string("other"))),
                },
            ],
            &mut host,
        );
        assert_eq!(host.console_lines(), vec!["two"]);
    }

    #[test]
    fn test_else_runs_when_nothing_matched() {
        let mut host = MemoryHost::new();
        run_all(
            &[
                cond(ConditionalKind::If, Expr::number(1.0), Expr::number(2.0), "if"),
                Statement::Conditional {
                    kind: ConditionalKind::Else,
                    comparison: None,
                    action: Box::new(Statement::ConsoleWrite(Expr::string("else"))),
                },
                // 链已结束
                cond(ConditionalKind::Elif, Expr::number(1.0), Expr::number(1.0), "stray"),
            ],
            &mut host,
        );
        assert_eq!(host.console_lines(), vec!["else"]);
    }

    #[test]
    fn test_number_never_equals_text() {
        let mut host = MemoryHost::new();
        run_all(
            &[cond(
                ConditionalKind::If,
                Expr::number(5.0),
                Expr::string("5"),
                "equal",
            )],
            &mut host,
        );
        assert!(host.console_lines().is_empty());
    }

    #[test]
    fn test_warn_screen_replaces_previous() {
        let mut host = MemoryHost::new();
        let state = run_all(
            &[
                Statement::WarnScreen {
                    message: Expr::string("first"),
                    option_label: "a".to_string(),
                },
                Statement::WarnScreen {
                    message: Expr::string("second"),
                    option_label: "b".to_string(),
                },
                Statement::WarnTitle(Expr::string("Notice")),
            ],
            &mut host,
        );
        assert_eq!(host.open_surfaces().len(), 1);
        let surface = host.surface(state.warn_window.unwrap()).unwrap();
        assert_eq!(surface.message, "second");
        assert_eq!(surface.title, "Notice");
        assert!(!state.warn_option_widgets.contains_key("a"));
        assert!(state.warn_option_widgets.contains_key("b"));
    }

    #[test]
    fn test_warn_title_without_surface() {
        let mut host = MemoryHost::new();
        let err = Executor::default()
            .execute(
                &Statement::WarnTitle(Expr::string("x")),
                &mut SessionState::new(),
                &mut host,
                &mut ConditionalChain::default(),
            )
            .unwrap_err();
        assert!(matches!(err, RuntimeError::NoWarnScreen { .. }));
    }

    #[test]
    fn test_window_close_forgets_widgets() {
        let mut host = MemoryHost::new();
        let state = run_all(
            &[
                Statement::InsertButton {
                    name: "b".to_string(),
                },
                Statement::WindowClose,
            ],
            &mut host,
        );
        assert!(state.window.is_none());
        assert!(state.widgets.is_empty());
        assert!(host.open_windows().is_empty());
    }
}
