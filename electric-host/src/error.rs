//! # Error 模块
//!
//! 定义 electric-host 中使用的错误类型。

use thiserror::Error;

use crate::dom::NodeId;

/// 效果构造错误
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ElectricError {
    /// 目标节点不存在
    #[error("目标节点 {node} 不存在")]
    NodeNotFound { node: NodeId },

    /// 目标节点不是元素
    #[error("目标节点 {node} 不是元素")]
    NotAnElement { node: NodeId },
}

/// Result 类型别名
pub type ElectricResult<T> = Result<T, ElectricError>;
