//! # Input 模块
//!
//! 定义 Host 向 Runtime 传递的输入事件。
//!
//! ## 设计说明
//!
//! - `RuntimeInput` 是 Host 采集用户操作后，传递给 Runtime 的抽象输入
//! - Runtime 不直接处理鼠标/键盘事件，只处理语义化的输入：
//!   某个绑定被触发、某个窗口被用户关闭
//! - 所有输入都通过 `QudeRuntime::dispatch` 进入，与顶层语句走同一条执行路径

use serde::{Deserialize, Serialize};

use crate::host::{BindingId, SurfaceHandle, WindowHandle};

/// Host 向 Runtime 传递的输入
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum RuntimeInput {
    /// 某个事件绑定被触发（点击或内容变化）
    Triggered { binding: BindingId },

    /// 用户关闭了主窗口
    WindowClosed { window: WindowHandle },

    /// 用户关闭了 warn 窗口
    SurfaceClosed { surface: SurfaceHandle },
}

impl RuntimeInput {
    /// 创建触发输入
    pub fn triggered(binding: BindingId) -> Self {
        Self::Triggered { binding }
    }

    /// 创建主窗口关闭输入
    pub fn window_closed(window: WindowHandle) -> Self {
        Self::WindowClosed { window }
    }

    /// 创建 warn 窗口关闭输入
    pub fn surface_closed(surface: SurfaceHandle) -> Self {
        Self::SurfaceClosed { surface }
    }
}

/// `dispatch` 的处理结果
///
/// `dispatch` 从不向宿主返回错误；失败已经写入控制台。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DispatchOutcome {
    /// 动作已执行（或关闭事件已处理）
    Executed,
    /// 绑定存在但条件不满足（MatchEvent 内容不相等）
    Filtered,
    /// 未知绑定或已失效的窗口
    UnknownBinding,
    /// 动作执行失败
    Failed,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_input_creation() {
        assert_eq!(
            RuntimeInput::triggered(BindingId(3)),
            RuntimeInput::Triggered {
                binding: BindingId(3)
            }
        );
        assert_eq!(
            RuntimeInput::window_closed(WindowHandle(1)),
            RuntimeInput::WindowClosed {
                window: WindowHandle(1)
            }
        );
    }

    #[test]
    fn test_input_serialization() {
        let input = RuntimeInput::surface_closed(SurfaceHandle(9));
        let json = serde_json::to_string(&input).unwrap();
        let back: RuntimeInput = serde_json::from_str(&json).unwrap();
        assert_eq!(input, back);
    }
}
