//! # Config 模块
//!
//! 命令行宿主的配置。
//!
//! ## 配置优先级
//!
//! 1. 命令行参数（最高）
//! 2. 配置文件 (qude.json)
//! 3. 默认值（最低）

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

use qude_runtime::{HostDefaults, Severity, StyleDefaults};

/// 默认配置文件名
pub const DEFAULT_CONFIG_PATH: &str = "qude.json";

/// 命令行宿主配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CliConfig {
    /// 新窗口的默认属性
    #[serde(default)]
    pub window: WindowConfig,

    /// 新控件的默认样式
    #[serde(default)]
    pub style: StyleConfig,

    /// 控制台输出格式
    #[serde(default)]
    pub console: ConsoleConfig,

    /// 日志级别（trace/debug/info/warn/error）
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

/// 窗口配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WindowConfig {
    #[serde(default = "default_window_title")]
    pub title: String,
    #[serde(default = "default_window_width")]
    pub width: u32,
    #[serde(default = "default_window_height")]
    pub height: u32,
    #[serde(default = "default_window_background")]
    pub background: String,
}

/// 控件样式配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StyleConfig {
    #[serde(default = "default_font_family")]
    pub font_family: String,
    #[serde(default = "default_font_size")]
    pub font_size: u32,
    #[serde(default = "default_link_color")]
    pub link_color: String,
    /// `insert.button()` 的文字
    #[serde(default = "default_button_text")]
    pub button_text: String,
    /// `insert.link()` 的文字
    #[serde(default = "default_link_text")]
    pub link_text: String,
}

/// 控制台配置：每个级别的行前缀
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConsoleConfig {
    #[serde(default)]
    pub info_prefix: String,
    #[serde(default = "default_warning_prefix")]
    pub warning_prefix: String,
    #[serde(default = "default_error_prefix")]
    pub error_prefix: String,
}

// 默认值函数

fn default_log_level() -> String {
    "warn".to_string()
}

fn default_window_title() -> String {
    HostDefaults::default().title
}

fn default_window_width() -> u32 {
    HostDefaults::default().width
}

fn default_window_height() -> u32 {
    HostDefaults::default().height
}

fn default_window_background() -> String {
    HostDefaults::default().background
}

fn default_font_family() -> String {
    StyleDefaults::default().font_family
}

fn default_font_size() -> u32 {
    StyleDefaults::default().font_size
}

fn default_link_color() -> String {
    StyleDefaults::default().link_color
}

fn default_button_text() -> String {
    StyleDefaults::default().button_text
}

fn default_link_text() -> String {
    StyleDefaults::default().link_text
}

fn default_warning_prefix() -> String {
    "[warning] ".to_string()
}

fn default_error_prefix() -> String {
    "[error] ".to_string()
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            window: WindowConfig::default(),
            style: StyleConfig::default(),
            console: ConsoleConfig::default(),
            log_level: default_log_level(),
        }
    }
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: default_window_title(),
            width: default_window_width(),
            height: default_window_height(),
            background: default_window_background(),
        }
    }
}

impl Default for StyleConfig {
    fn default() -> Self {
        Self {
            font_family: default_font_family(),
            font_size: default_font_size(),
            link_color: default_link_color(),
            button_text: default_button_text(),
            link_text: default_link_text(),
        }
    }
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        Self {
            info_prefix: String::new(),
            warning_prefix: default_warning_prefix(),
            error_prefix: default_error_prefix(),
        }
    }
}

impl CliConfig {
    /// 加载配置文件
    ///
    /// 文件不存在时返回默认配置；读取、解析或验证失败返回错误。
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// 保存配置到文件
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }

    /// 验证配置有效性
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.window.width == 0 || self.window.height == 0 {
            return Err(ConfigError::ValidationFailed(
                "窗口尺寸必须大于 0".to_string(),
            ));
        }
        if self.style.font_size == 0 {
            return Err(ConfigError::ValidationFailed("字号必须大于 0".to_string()));
        }
        if parse_level(&self.log_level).is_none() {
            return Err(ConfigError::ValidationFailed(format!(
                "未知的日志级别: {}",
                self.log_level
            )));
        }
        Ok(())
    }

    /// 内存宿主的窗口默认属性
    pub fn host_defaults(&self) -> HostDefaults {
        HostDefaults {
            title: self.window.title.clone(),
            width: self.window.width,
            height: self.window.height,
            background: self.window.background.clone(),
        }
    }

    /// 控件默认样式
    pub fn style_defaults(&self) -> StyleDefaults {
        StyleDefaults {
            font_family: self.style.font_family.clone(),
            font_size: self.style.font_size,
            link_color: self.style.link_color.clone(),
            button_text: self.style.button_text.clone(),
            link_text: self.style.link_text.clone(),
        }
    }
}

impl ConsoleConfig {
    /// 给控制台行加上级别前缀
    pub fn format(&self, text: &str, severity: Severity) -> String {
        let prefix = match severity {
            Severity::Info => &self.info_prefix,
            Severity::Warning => &self.warning_prefix,
            Severity::Error => &self.error_prefix,
        };
        format!("{prefix}{text}")
    }
}

/// 解析日志级别名（大小写不敏感）
pub fn parse_level(name: &str) -> Option<tracing::Level> {
    match name.trim().to_ascii_lowercase().as_str() {
        "trace" => Some(tracing::Level::TRACE),
        "debug" => Some(tracing::Level::DEBUG),
        "info" => Some(tracing::Level::INFO),
        "warn" | "warning" => Some(tracing::Level::WARN),
        "error" => Some(tracing::Level::ERROR),
        _ => None,
    }
}

/// 配置错误
#[derive(Error, Debug)]
pub enum ConfigError {
    /// 序列化失败
    #[error("配置序列化失败: {0}")]
    SerializationFailed(#[from] serde_json::Error),

    /// IO 错误
    #[error("配置 IO 错误: {0}")]
    IoError(#[from] std::io::Error),

    /// 验证失败
    #[error("配置验证失败: {0}")]
    ValidationFailed(String),
}
