//! # Runtime 模块
//!
//! 解释器核心：执行引擎、单语句执行器和事件绑定。

pub mod binder;
pub mod engine;
pub mod executor;

pub use binder::{BindingAction, BindingTrigger, EventBinding};
pub use engine::{QudeRuntime, RunSummary};
pub use executor::{Executor, StyleDefaults};
