//! # Error 模块
//!
//! 定义 electric-core 中使用的错误类型。

use thiserror::Error;

/// 参数校验错误
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParamError {
    /// 数值参数不是有限正数
    #[error("参数 '{name}' 必须是正数，实际为 {value}")]
    NotPositive { name: &'static str, value: f64 },

    /// 颜色为空
    #[error("颜色不能为空")]
    EmptyColor,
}
