//! # Dom 模块
//!
//! 效果所依附的保留式节点树。
//!
//! ## 核心组件
//!
//! - [`Document`]：节点数组 + `id` 索引，提供创建、挂载、属性/样式读写与查询
//! - [`NodeId`]：节点引用，创建后稳定
//! - [`BoxMetrics`]：宿主布局阶段写入的尺寸，供同步器测量
//!
//! 树只描述结构，不做布局和绘制；尺寸由宿主通过 `set_layout` 写入。

mod document;
mod markup;
mod node;

pub use document::{Document, SharedDocument};
pub use node::{BoxMetrics, ElementData, Namespace, Node, NodeId, NodeKind};
