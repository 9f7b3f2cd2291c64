//! # Filter 模块
//!
//! 尺寸响应式滤镜参数计算。
//!
//! 噪声位移滤镜由四路偏移动画驱动：两路竖直（`dy`）、两路水平（`dx`）。
//! 同一轴上的两路方向相反、幅度等于元素对应边长，
//! 平铺噪声因此看起来在无限滚动，循环处不会出现接缝。
//!
//! [`compute_filter_state`] 是纯函数：相同输入得到完全相同的输出，
//! 宿主层只负责把结果写回节点树。

use serde::{Deserialize, Serialize};

use crate::params::{EffectParameters, defaults, resolve_positive};

/// 滤镜区域外扩（百分比）
///
/// 大位移或极端宽高比下，滤镜输出不会在元素边缘被裁切。
pub const REGION_OFFSET_PERCENT: i32 = -200;
/// 滤镜区域尺寸（百分比）
pub const REGION_SIZE_PERCENT: i32 = 500;

/// 元素尺寸
///
/// 四舍五入到整数，且每个维度至少为 1。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ElementSize {
    pub width: u32,
    pub height: u32,
}

impl ElementSize {
    /// 创建尺寸，0 会被提升为 1
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width: width.max(1),
            height: height.max(1),
        }
    }

    /// 从测量得到的浮点尺寸构造
    ///
    /// 先四舍五入，再下限钳制为 1；NaN 与负数视为 0。
    pub fn from_measured(width: f64, height: f64) -> Self {
        Self::new(round_dimension(width), round_dimension(height))
    }
}

impl std::fmt::Display for ElementSize {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

fn round_dimension(value: f64) -> u32 {
    if value.is_nan() || value <= 0.0 {
        return 0;
    }
    // `as` 对超出范围的值做饱和转换
    value.round() as u32
}

/// 偏移动画作用的轴
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OffsetAxis {
    /// 水平偏移
    Dx,
    /// 竖直偏移
    Dy,
}

impl OffsetAxis {
    /// 对应 `animate` 节点的 `attributeName`
    pub fn attribute_name(self) -> &'static str {
        match self {
            Self::Dx => "dx",
            Self::Dy => "dy",
        }
    }
}

/// 单路偏移动画的扫描区间
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OffsetSweep {
    pub axis: OffsetAxis,
    pub from: i64,
    pub to: i64,
}

impl OffsetSweep {
    /// 从 `amplitude` 扫到 0
    pub fn inbound(axis: OffsetAxis, amplitude: u32) -> Self {
        Self {
            axis,
            from: i64::from(amplitude),
            to: 0,
        }
    }

    /// 从 0 扫到 `-amplitude`
    pub fn outbound(axis: OffsetAxis, amplitude: u32) -> Self {
        Self {
            axis,
            from: 0,
            to: -i64::from(amplitude),
        }
    }

    /// 扫描幅度
    pub fn amplitude(&self) -> u64 {
        (self.from - self.to).unsigned_abs()
    }

    /// `animate` 节点的 `values` 属性值，如 `700; 0`
    pub fn values(&self) -> String {
        format!("{}; {}", self.from, self.to)
    }
}

/// 滤镜区域（相对元素包围盒的百分比）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterRegion {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl FilterRegion {
    /// 外扩后的固定区域
    pub fn expanded() -> Self {
        Self {
            x: REGION_OFFSET_PERCENT,
            y: REGION_OFFSET_PERCENT,
            width: REGION_SIZE_PERCENT,
            height: REGION_SIZE_PERCENT,
        }
    }

    /// 以 `(属性名, 属性值)` 形式列出
    pub fn attributes(&self) -> [(&'static str, String); 4] {
        [
            ("x", format!("{}%", self.x)),
            ("y", format!("{}%", self.y)),
            ("width", format!("{}%", self.width)),
            ("height", format!("{}%", self.height)),
        ]
    }
}

/// 派生的滤镜状态
///
/// 完全由 `(width, height, speed, chaos)` 决定，每次整体重算，不做增量修补。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterState {
    /// 计算所依据的元素尺寸
    pub size: ElementSize,
    /// 竖直方向两路：`height → 0` 与 `0 → -height`
    pub vertical: [OffsetSweep; 2],
    /// 水平方向两路：`width → 0` 与 `0 → -width`
    pub horizontal: [OffsetSweep; 2],
    /// 动画周期（秒）
    pub duration: f64,
    /// 位移强度
    pub displacement_scale: f64,
    /// 滤镜区域
    pub region: FilterRegion,
}

impl FilterState {
    /// 按当前参数计算
    pub fn for_size(size: ElementSize, params: &EffectParameters) -> Self {
        compute_filter_state(size.width, size.height, params.speed, params.chaos)
    }

    /// 四路动画，按 dy, dy, dx, dx 顺序
    pub fn sweeps(&self) -> [OffsetSweep; 4] {
        [
            self.vertical[0],
            self.vertical[1],
            self.horizontal[0],
            self.horizontal[1],
        ]
    }

    /// `dur` 属性值，如 `6s`
    pub fn duration_attr(&self) -> String {
        format!("{}s", self.duration)
    }

    /// `scale` 属性值
    pub fn scale_attr(&self) -> String {
        self.displacement_scale.to_string()
    }
}

/// 计算滤镜状态
///
/// - 宽高下限钳制为 1
/// - 周期 = `6 / speed`，下限 0.001 秒；`speed` 非正数时按 1 处理
/// - 位移强度 = `30 * chaos`；`chaos` 非正数时按 1 处理
pub fn compute_filter_state(width: u32, height: u32, speed: f64, chaos: f64) -> FilterState {
    let size = ElementSize::new(width, height);
    let speed = resolve_positive(speed, defaults::SPEED);
    let chaos = resolve_positive(chaos, defaults::CHAOS);

    FilterState {
        size,
        vertical: [
            OffsetSweep::inbound(OffsetAxis::Dy, size.height),
            OffsetSweep::outbound(OffsetAxis::Dy, size.height),
        ],
        horizontal: [
            OffsetSweep::inbound(OffsetAxis::Dx, size.width),
            OffsetSweep::outbound(OffsetAxis::Dx, size.width),
        ],
        duration: (defaults::BASE_DURATION / speed).max(defaults::MIN_DURATION),
        displacement_scale: defaults::BASE_SCALE * chaos,
        region: FilterRegion::expanded(),
    }
}
