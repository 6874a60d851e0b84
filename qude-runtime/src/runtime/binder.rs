//! # Binder 模块
//!
//! 把 event 块注册为宿主的事件通道。
//!
//! 宿主只拿到一个 [`BindingId`]，触发时把它原样送回 `dispatch`；
//! 绑定表（触发条件 + 捕获的动作）由会话状态持有。

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::RuntimeError;
use crate::host::{BindingId, MouseButton, UiHost, WidgetHandle, WidgetKind};
use crate::script::{EventHeader, Statement, evaluate};
use crate::session::{SessionState, Value};

/// 绑定的触发条件
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum BindingTrigger {
    /// 点击
    Click { button: MouseButton },
    /// 输入框内容等于 `expected`（注册时求值）
    ContentMatch { expected: Value },
}

/// 绑定触发后的动作
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum BindingAction {
    /// 通过单语句路径执行动作
    Run(Box<Statement>),
    /// 打开链接控件当前的目标地址
    OpenLink { widget_name: String },
}

/// 一条事件绑定
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventBinding {
    /// 绑定的控件
    pub target: WidgetHandle,
    pub trigger: BindingTrigger,
    pub action: BindingAction,
}

impl EventBinding {
    /// 内容匹配绑定是否满足条件
    ///
    /// 控件文本与期望值的显示形式逐字比较。
    pub fn matches_content(&self, current: &str) -> bool {
        match &self.trigger {
            BindingTrigger::Click { .. } => true,
            BindingTrigger::ContentMatch { expected } => current == expected.to_string(),
        }
    }
}

/// 注册一个 event 块
///
/// 头无法识别、目标不存在或类型不符时不注册任何东西并返回错误。
pub fn register_event(
    header: &str,
    action: &Statement,
    state: &mut SessionState,
    host: &mut impl UiHost,
) -> Result<BindingId, RuntimeError> {
    let parsed = EventHeader::parse(header).ok_or_else(|| RuntimeError::BadEventHeader {
        header: header.trim().to_string(),
    })?;

    let (target, trigger) = match parsed {
        EventHeader::OptionClick { option, button } => {
            let target = state
                .warn_option_widgets
                .get(&option)
                .copied()
                .ok_or(RuntimeError::UnknownWarnOption { option })?;
            (target, BindingTrigger::Click { button })
        }
        EventHeader::Match { widget, value } => {
            let entry = state
                .widget(&widget)
                .ok_or_else(|| RuntimeError::UnknownEventTarget {
                    name: widget.clone(),
                })?;
            if entry.kind != WidgetKind::Input {
                return Err(RuntimeError::MatchTargetNotInput {
                    name: widget,
                    actual: entry.kind,
                });
            }
            let expected = evaluate(&value, state);
            (entry.handle, BindingTrigger::ContentMatch { expected })
        }
        EventHeader::WidgetClick { widget, button } => {
            let entry = state
                .widget(&widget)
                .ok_or(RuntimeError::UnknownEventTarget { name: widget })?;
            (entry.handle, BindingTrigger::Click { button })
        }
    };

    let binding = state.next_binding_id();
    match &trigger {
        BindingTrigger::Click { button } => host.on_click(target, *button, binding)?,
        BindingTrigger::ContentMatch { .. } => host.on_content_changed(target, binding)?,
    }
    debug!(binding = %binding, header = header.trim(), "注册事件绑定");

    state.bindings.insert(
        binding,
        EventBinding {
            target,
            trigger,
            action: BindingAction::Run(Box::new(action.clone())),
        },
    );
    Ok(binding)
}

/// 为控件注册链接点击
///
/// 同一控件名只注册一次，之后的 `link` 只更新目标地址。
pub fn register_link(
    name: &str,
    target: WidgetHandle,
    state: &mut SessionState,
    host: &mut impl UiHost,
) -> Result<Option<BindingId>, RuntimeError> {
    if state.link_targets.contains_key(name) {
        return Ok(None);
    }
    let binding = state.next_binding_id();
    host.on_click(target, MouseButton::Left, binding)?;
    debug!(binding = %binding, widget = name, "注册链接点击");
    state.bindings.insert(
        binding,
        EventBinding {
            target,
            trigger: BindingTrigger::Click {
                button: MouseButton::Left,
            },
            action: BindingAction::OpenLink {
                widget_name: name.to_string(),
            },
        },
    );
    Ok(Some(binding))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::{FontSpec, MemoryHost};
    use crate::script::Expr;
    use crate::session::WidgetEntry;

    fn state_with(host: &mut MemoryHost, name: &str, kind: WidgetKind) -> SessionState {
        let mut state = SessionState::new();
        let window = host.create_window().unwrap();
        let handle = host.create_widget(window, kind).unwrap();
        state.window = Some(window);
        state.register_widget(name, WidgetEntry { handle, kind }, FontSpec::default());
        state
    }

    fn write(text: &str) -> Statement {
        Statement::ConsoleWrite(Expr::string(text))
    }

    #[test]
    fn test_register_widget_click() {
        let mut host = MemoryHost::new();
        let mut state = state_with(&mut host, "b1", WidgetKind::Button);

        let id = register_event("b1.LeftClickEvent:", &write("hi"), &mut state, &mut host)
            .unwrap();

        let handle = state.widget("b1").unwrap().handle;
        assert_eq!(
            host.widget(handle).unwrap().click_bindings,
            vec![(MouseButton::Left, id)]
        );
        assert_eq!(state.bindings[&id].target, handle);
    }

    #[test]
    fn test_register_unknown_target() {
        let mut host = MemoryHost::new();
        let mut state = SessionState::new();
        let err = register_event("ghost.LeftClickEvent:", &write("x"), &mut state, &mut host)
            .unwrap_err();
        assert_eq!(
            err,
            RuntimeError::UnknownEventTarget {
                name: "ghost".to_string()
            }
        );
        assert!(state.bindings.is_empty());
    }

    #[test]
    fn test_register_bad_header() {
        let mut host = MemoryHost::new();
        let mut state = SessionState::new();
        let err = register_event("whatever", &write("x"), &mut state, &mut host).unwrap_err();
        assert!(matches!(err, RuntimeError::BadEventHeader { .. }));
    }

    #[test]
    fn test_match_requires_input() {
        let mut host = MemoryHost::new();
        let mut state = state_with(&mut host, "b1", WidgetKind::Button);
        let err = register_event("b1.MatchEvent == 'x':", &write("x"), &mut state, &mut host)
            .unwrap_err();
        assert_eq!(
            err,
            RuntimeError::MatchTargetNotInput {
                name: "b1".to_string(),
                actual: WidgetKind::Button,
            }
        );
        assert!(state.bindings.is_empty());
    }

    #[test]
    fn test_match_value_evaluated_at_registration() {
        let mut host = MemoryHost::new();
        let mut state = state_with(&mut host, "pw", WidgetKind::Input);
        state.set_var("secret", Value::Number(42.0));

        let id = register_event("pw.MatchEvent == secret:", &write("ok"), &mut state, &mut host)
            .unwrap();
        state.set_var("secret", Value::Number(0.0));

        let binding = &state.bindings[&id];
        assert!(binding.matches_content("42"));
        assert!(!binding.matches_content("0"));
    }

    #[test]
    fn test_unknown_warn_option() {
        let mut host = MemoryHost::new();
        let mut state = SessionState::new();
        let err = register_event("<ok>LeftClickEvent:", &write("x"), &mut state, &mut host)
            .unwrap_err();
        assert_eq!(
            err,
            RuntimeError::UnknownWarnOption {
                option: "ok".to_string()
            }
        );
    }

    #[test]
    fn test_register_link_once() {
        let mut host = MemoryHost::new();
        let mut state = state_with(&mut host, "l", WidgetKind::Label);
        let handle = state.widget("l").unwrap().handle;

        let first = register_link("l", handle, &mut state, &mut host).unwrap();
        assert!(first.is_some());
        state
            .link_targets
            .insert("l".to_string(), "https://a".to_string());
        let second = register_link("l", handle, &mut state, &mut host).unwrap();
        assert_eq!(second, None);
        assert_eq!(host.widget(handle).unwrap().click_bindings.len(), 1);
    }
}
