//! # Electric Host
//!
//! Electric border 效果的宿主层：在保留式节点树上构建滤镜与装饰层，
//! 并在元素尺寸变化时把 `electric-core` 的计算结果写回。
//!
//! ## 架构概述
//!
//! ```text
//! 宿主应用                         ElectricBorder
//!   │                                   │
//!   │── new(doc, element, options) ───►│ 构建滤镜 / 装饰层 / 内容分区
//!   │                                   │ 首次同步
//!   │◄── SizeObserver::on_change ──────│
//!   │                                   │
//!   │── resize ─► 观察器回调 ─────────►│ 重新测量 → 计算 → 写回
//!   │◄── request_frame(重启动画) ──────│
//! ```
//!
//! 宿主能力通过 [`Host`] trait 注入；[`HeadlessHost`] 是确定性的进程内实现，
//! 供测试与 `eb-preview` 使用。
//!
//! ## 使用示例
//!
//! ```ignore
//! use electric_host::{Document, ElectricBorder, ElectricOptions, HeadlessHost};
//!
//! let host = HeadlessHost::new(Document::new().into_shared());
//! let mut border = ElectricBorder::new(
//!     host.document(),
//!     element,
//!     &ElectricOptions::new().color("#7df9ff").speed(1.5),
//!     Rc::new(host.clone()),
//! )?;
//!
//! host.resize(element, 640.0, 200.0);
//! host.run_until_idle(8);
//!
//! border.update_options(&ElectricOptions::new().chaos(2.0));
//! border.destroy();
//! ```
//!
//! ## 模块结构
//!
//! - [`dom`]：保留式节点树与标记序列化
//! - [`host`]：宿主能力接口
//! - [`headless`]：无界面宿主
//! - [`layers`]：滤镜与装饰层构建
//! - [`partition`]：内容分区
//! - [`sync`]：滤镜状态写回与动画重启
//! - [`border`]：生命周期控制
//! - [`discovery`]：声明式自动初始化
//! - [`config`]：配置文件

pub mod border;
pub mod config;
pub mod discovery;
pub mod dom;
pub mod error;
pub mod headless;
pub mod host;
pub mod layers;
pub mod partition;
pub mod sync;

pub use border::ElectricBorder;
pub use config::{ConfigError, DefaultsConfig, ElectricConfig, LogConfig};
pub use discovery::{DiscoveryAttributes, discover_options, init_electric_borders};
pub use dom::{BoxMetrics, Document, NodeId, SharedDocument};
pub use error::{ElectricError, ElectricResult};
pub use headless::{HeadlessHost, ResizePolicy};
pub use host::{AnimationDriver, AnimationError, Host, ResizeEntry, SizeObserver};
pub use layers::{FilterHandles, LayerHandles};

pub use electric_core::{
    EffectParameters, ElectricOptions, FilterState, OptionsPatch, compute_filter_state,
};
