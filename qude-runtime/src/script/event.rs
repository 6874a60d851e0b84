//! # Event 头
//!
//! event 块的头在解析期只保存原文，注册时才按以下顺序匹配：
//!
//! 1. `<option>LeftClickEvent:` / `<option>RightClickEvent:`：warn 窗口选项
//! 2. `name.MatchEvent == value:`：输入框内容等于 `value` 时触发
//! 3. `name.LeftClickEvent:` / `name.RightClickEvent:`：控件点击

use serde::{Deserialize, Serialize};

use crate::host::MouseButton;
use crate::script::Expr;
use crate::script::parser::{is_identifier, parse_expression};

/// 解析后的 event 头
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum EventHeader {
    /// warn 窗口选项点击
    OptionClick { option: String, button: MouseButton },
    /// 输入框内容匹配
    Match { widget: String, value: Expr },
    /// 控件点击
    WidgetClick { widget: String, button: MouseButton },
}

impl EventHeader {
    /// 解析 event 头，三种形式都不匹配时返回 `None`
    pub fn parse(header: &str) -> Option<Self> {
        let body = header.trim().strip_suffix(':')?.trim_end();
        Self::parse_option_click(body)
            .or_else(|| Self::parse_match(body))
            .or_else(|| Self::parse_widget_click(body))
    }

    /// 头中引用的控件名（选项点击返回 `None`）
    pub fn widget(&self) -> Option<&str> {
        match self {
            Self::Match { widget, .. } | Self::WidgetClick { widget, .. } => Some(widget),
            Self::OptionClick { .. } => None,
        }
    }

    fn parse_option_click(body: &str) -> Option<Self> {
        let rest = body.strip_prefix('<')?;
        let (option, event) = rest.split_once('>')?;
        let option = option.trim();
        if option.is_empty() {
            return None;
        }
        let button = MouseButton::from_event_name(event.trim())?;
        Some(Self::OptionClick {
            option: option.to_string(),
            button,
        })
    }

    fn parse_match(body: &str) -> Option<Self> {
        let (widget, rest) = body.split_once(".MatchEvent")?;
        if !is_identifier(widget) {
            return None;
        }
        let value = rest.trim_start().strip_prefix("==")?.trim();
        if value.is_empty() {
            return None;
        }
        Some(Self::Match {
            widget: widget.to_string(),
            value: parse_expression(value),
        })
    }

    fn parse_widget_click(body: &str) -> Option<Self> {
        let (widget, event) = body.split_once('.')?;
        if !is_identifier(widget) {
            return None;
        }
        let button = MouseButton::from_event_name(event)?;
        Some(Self::WidgetClick {
            widget: widget.to_string(),
            button,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_option_click() {
        assert_eq!(
            EventHeader::parse("<ok>LeftClickEvent:"),
            Some(EventHeader::OptionClick {
                option: "ok".to_string(),
                button: MouseButton::Left,
            })
        );
        assert_eq!(
            EventHeader::parse("  <Cancel> RightClickEvent:  "),
            Some(EventHeader::OptionClick {
                option: "Cancel".to_string(),
                button: MouseButton::Right,
            })
        );
    }

    #[test]
    fn test_match_event() {
        assert_eq!(
            EventHeader::parse("name.MatchEvent == 'admin':"),
            Some(EventHeader::Match {
                widget: "name".to_string(),
                value: Expr::string("admin"),
            })
        );
        assert_eq!(
            EventHeader::parse("name.MatchEvent==secret:"),
            Some(EventHeader::Match {
                widget: "name".to_string(),
                value: Expr::var("secret"),
            })
        );
    }

    #[test]
    fn test_widget_click() {
        let header = EventHeader::parse("b1.RightClickEvent:").unwrap();
        assert_eq!(
            header,
            EventHeader::WidgetClick {
                widget: "b1".to_string(),
                button: MouseButton::Right,
            }
        );
        assert_eq!(header.widget(), Some("b1"));
    }

    #[test]
    fn test_unrecognized_headers() {
        assert_eq!(EventHeader::parse("b1.LeftClickEvent"), None);
        assert_eq!(EventHeader::parse("b1.DoubleClickEvent:"), None);
        assert_eq!(EventHeader::parse("<>LeftClickEvent:"), None);
        assert_eq!(EventHeader::parse("b1.MatchEvent == :"), None);
        assert_eq!(EventHeader::parse("a b.LeftClickEvent:"), None);
    }
}
