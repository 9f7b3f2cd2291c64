//! # Electric Core
//!
//! Electric border 效果的纯逻辑核心，不依赖任何节点树或宿主环境。
//!
//! ## 架构概述
//!
//! ```text
//! ElectricOptions ──► EffectParameters ──┐
//!                                        ├──► compute_filter_state() ──► FilterState
//! ElementSize (宿主测量) ─────────────────┘
//! ```
//!
//! 宿主层（`electric-host`）负责测量元素、把 [`FilterState`] 写回滤镜节点、
//! 以及在尺寸变化时重新调用计算。
//!
//! ## 模块结构
//!
//! - [`params`]：参数模型与默认值
//! - [`filter`]：滤镜状态计算
//! - [`attributes`]：声明式属性约定与宽松数值解析
//! - [`error`]：错误类型

pub mod attributes;
pub mod error;
pub mod filter;
pub mod params;

pub use attributes::{numeric_or_default, options_from_attributes, parse_float_lenient};
pub use error::ParamError;
pub use filter::{
    ElementSize, FilterRegion, FilterState, OffsetAxis, OffsetSweep, compute_filter_state,
};
pub use params::{EffectParameters, ElectricOptions, OptionsPatch, defaults, resolve_positive};
