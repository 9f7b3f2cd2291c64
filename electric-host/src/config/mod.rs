//! # Config 模块
//!
//! 预览工具与宿主应用共用的配置，集中管理默认参数、尺寸投递策略和日志级别。
//!
//! ## 配置优先级
//!
//! 1. 命令行参数（最高）
//! 2. 配置文件 (electric.json)
//! 3. 默认值（最低）
//!
//! ## 示例
//!
//! ```json
//! {
//!   "defaults": { "color": "#5227FF", "speed": 1.5 },
//!   "resize": { "mode": "debounce", "frames": 2 },
//!   "log": { "level": "debug" }
//! }
//! ```

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};

use electric_core::{EffectParameters, ElectricOptions, ParamError, defaults};

use crate::headless::ResizePolicy;

/// 应用配置
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ElectricConfig {
    /// 新建效果的默认参数
    #[serde(default)]
    pub defaults: DefaultsConfig,

    /// 尺寸变化的投递策略
    #[serde(default)]
    pub resize: ResizePolicy,

    /// 日志配置
    #[serde(default)]
    pub log: LogConfig,
}

/// 默认效果参数
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DefaultsConfig {
    #[serde(default = "default_color")]
    pub color: String,

    #[serde(default = "default_speed")]
    pub speed: f64,

    #[serde(default = "default_chaos")]
    pub chaos: f64,

    /// 边框粗细（px）
    #[serde(default = "default_thickness")]
    pub thickness: f64,
}

/// 日志配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogConfig {
    /// `error` / `warn` / `info` / `debug` / `trace`
    #[serde(default = "default_log_level")]
    pub level: String,
}

fn default_color() -> String {
    defaults::COLOR.to_string()
}

fn default_speed() -> f64 {
    defaults::SPEED
}

fn default_chaos() -> f64 {
    defaults::CHAOS
}

fn default_thickness() -> f64 {
    defaults::THICKNESS
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            color: default_color(),
            speed: default_speed(),
            chaos: default_chaos(),
            thickness: default_thickness(),
        }
    }
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

impl DefaultsConfig {
    /// 作为完整选项，用来补齐调用方未给出的字段
    pub fn to_options(&self) -> ElectricOptions {
        ElectricOptions {
            color: Some(self.color.clone()),
            speed: Some(self.speed),
            chaos: Some(self.chaos),
            thickness: Some(self.thickness),
        }
    }

    fn to_parameters(&self) -> EffectParameters {
        EffectParameters::from_options(&self.to_options())
    }
}

impl LogConfig {
    /// 解析日志级别
    pub fn parse_level(&self) -> Result<tracing::Level, ConfigError> {
        self.level
            .parse()
            .map_err(|_| ConfigError::InvalidLogLevel(self.level.clone()))
    }
}

impl ElectricConfig {
    /// 加载配置文件
    ///
    /// 如果文件不存在或解析失败，返回默认配置并记录警告。
    pub fn load(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();

        if !path.exists() {
            warn!(path = %path.display(), "配置文件不存在，使用默认配置");
            return Self::default();
        }

        match fs::read_to_string(path) {
            Ok(content) => match serde_json::from_str(&content) {
                Ok(config) => {
                    info!(path = %path.display(), "配置文件加载成功");
                    config
                }
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "配置文件解析失败，使用默认配置");
                    Self::default()
                }
            },
            Err(e) => {
                warn!(path = %path.display(), error = %e, "配置文件读取失败，使用默认配置");
                Self::default()
            }
        }
    }

    /// 保存配置到文件
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| ConfigError::SerializationFailed(e.to_string()))?;

        fs::write(path, json).map_err(|e| ConfigError::IoError(e.to_string()))?;

        Ok(())
    }

    /// 验证配置有效性
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.defaults.to_parameters().validate()?;

        if let ResizePolicy::Debounce { frames: 0 } = self.resize {
            return Err(ConfigError::ValidationFailed(
                "debounce 模式的 frames 必须大于 0".to_string(),
            ));
        }

        self.log.parse_level()?;
        Ok(())
    }
}

/// 配置错误
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// 序列化失败
    #[error("配置序列化失败: {0}")]
    SerializationFailed(String),

    /// IO 错误
    #[error("配置 IO 错误: {0}")]
    IoError(String),

    /// 默认参数非法
    #[error("默认参数非法: {0}")]
    InvalidDefaults(#[from] ParamError),

    /// 无法识别的日志级别
    #[error("无法识别的日志级别: {0}")]
    InvalidLogLevel(String),

    /// 验证失败
    #[error("配置验证失败: {0}")]
    ValidationFailed(String),
}
