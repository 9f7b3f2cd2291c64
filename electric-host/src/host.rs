//! # Host 模块
//!
//! 宿主环境接口。效果只依赖这里的 trait，不依赖具体运行时原语，
//! 测试和预览工具用 [`HeadlessHost`](crate::headless::HeadlessHost) 替换。
//!
//! ## 宿主能力
//!
//! | 能力 | 接口 | 缺失时 |
//! |------|------|--------|
//! | 尺寸观察 | [`SizeObserver`] | 只在构造时同步一次 |
//! | 下一帧回调 | [`Host::request_frame`] | 必需 |
//! | 动画重启 | [`AnimationDriver`] | 跳过重启，参数照常写入 |
//!
//! 回调都是宿主调度的异步延续，不会在 `update_options` 内被同步调用。

use std::rc::Rc;

use electric_core::ElementSize;
use thiserror::Error;

use crate::dom::NodeId;

/// 尺寸变化通知
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResizeEntry {
    /// 被观察的元素
    pub target: NodeId,
    /// 最近一次布局后的尺寸
    pub size: ElementSize,
}

/// 尺寸变化回调
pub type ResizeCallback = Box<dyn FnMut(ResizeEntry)>;

/// 帧回调
pub type FrameCallback = Box<dyn FnOnce()>;

/// 尺寸观察器
///
/// 一个观察器只服务一个效果实例。`disconnect` 之后不再投递任何通知，
/// 重复调用 `disconnect` 无副作用。
pub trait SizeObserver {
    /// 开始观察 `target`，尺寸变化时调用 `callback`
    fn on_change(&mut self, target: NodeId, callback: ResizeCallback);

    /// 停止观察并释放回调
    fn disconnect(&mut self);
}

/// 动画重启错误
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AnimationError {
    /// 节点不是可重启的动画
    #[error("节点 {node} 不是可重启的动画")]
    NotAnimation { node: NodeId },

    /// 宿主拒绝重启
    #[error("重启动画失败: {message}")]
    Rejected { message: String },
}

/// 动画驱动
pub trait AnimationDriver {
    /// 从头开始播放 `node` 对应的动画
    fn begin_element(&self, node: NodeId) -> Result<(), AnimationError>;
}

/// 宿主环境
pub trait Host {
    /// 创建尺寸观察器；返回 `None` 表示宿主不支持尺寸观察
    fn create_size_observer(&self) -> Option<Box<dyn SizeObserver>>;

    /// 在下一帧绘制前调用 `callback`
    fn request_frame(&self, callback: FrameCallback);

    /// 动画驱动；返回 `None` 表示宿主没有动画重启原语
    fn animation_driver(&self) -> Option<Rc<dyn AnimationDriver>>;
}
