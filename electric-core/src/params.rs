//! # Params 模块
//!
//! 效果参数模型：颜色、速度、混沌度、边框粗细。
//!
//! ## 设计说明
//!
//! - [`ElectricOptions`]：调用方传入的**部分**选项，构造与增量更新共用
//! - [`EffectParameters`]：实例持有的完整参数，缺省项由 [`defaults`] 填充
//! - 存储值按"最后一次写入"保留；使用方通过 `resolved_*` 取得可安全参与计算的值

use serde::{Deserialize, Serialize};

use crate::error::ParamError;

/// 各参数的默认值与滤镜基准常量
///
/// 这是所有默认值的**唯一来源**，其他模块不应硬编码这些数字。
pub mod defaults {
    /// 默认描边颜色
    pub const COLOR: &str = "#5227FF";
    /// 默认动画速度倍率
    pub const SPEED: f64 = 1.0;
    /// 默认混沌度（位移强度倍率）
    pub const CHAOS: f64 = 1.0;
    /// 默认边框粗细（px）
    pub const THICKNESS: f64 = 2.0;

    /// 速度为 1 时的动画周期（秒）
    pub const BASE_DURATION: f64 = 6.0;
    /// 动画周期下限（秒），避免产生零时长动画
    pub const MIN_DURATION: f64 = 0.001;
    /// 混沌度为 1 时的位移强度
    pub const BASE_SCALE: f64 = 30.0;
}

/// 部分选项
///
/// 所有字段可选。用于 `ElectricBorder::new` 的构造参数以及
/// `update_options` 的增量更新。
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ElectricOptions {
    /// 描边颜色（任意 CSS 颜色字符串）
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    /// 动画速度倍率
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub speed: Option<f64>,
    /// 混沌度
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chaos: Option<f64>,
    /// 边框粗细（px）
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thickness: Option<f64>,
}

impl ElectricOptions {
    /// 创建空选项
    pub fn new() -> Self {
        Self::default()
    }

    /// 设置描边颜色
    pub fn color(mut self, color: impl Into<String>) -> Self {
        self.color = Some(color.into());
        self
    }

    /// 设置动画速度倍率
    pub fn speed(mut self, speed: f64) -> Self {
        self.speed = Some(speed);
        self
    }

    /// 设置混沌度
    pub fn chaos(mut self, chaos: f64) -> Self {
        self.chaos = Some(chaos);
        self
    }

    /// 设置边框粗细（px）
    pub fn thickness(mut self, thickness: f64) -> Self {
        self.thickness = Some(thickness);
        self
    }

    /// 是否没有任何字段
    pub fn is_empty(&self) -> bool {
        self.color.is_none()
            && self.speed.is_none()
            && self.chaos.is_none()
            && self.thickness.is_none()
    }

    /// 用 `fallback` 补齐本选项中缺失的字段
    pub fn or(self, fallback: &ElectricOptions) -> Self {
        Self {
            color: self.color.or_else(|| fallback.color.clone()),
            speed: self.speed.or(fallback.speed),
            chaos: self.chaos.or(fallback.chaos),
            thickness: self.thickness.or(fallback.thickness),
        }
    }
}

/// 增量更新使用同一结构：出现的字段覆盖，缺失的字段保持不变
pub type OptionsPatch = ElectricOptions;

/// 效果参数
///
/// 一个效果实例当前生效的完整参数集合。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EffectParameters {
    pub color: String,
    pub speed: f64,
    pub chaos: f64,
    pub thickness: f64,
}

impl Default for EffectParameters {
    fn default() -> Self {
        Self {
            color: defaults::COLOR.to_string(),
            speed: defaults::SPEED,
            chaos: defaults::CHAOS,
            thickness: defaults::THICKNESS,
        }
    }
}

impl EffectParameters {
    /// 从部分选项构造，缺失字段取默认值
    pub fn from_options(options: &ElectricOptions) -> Self {
        let mut params = Self::default();
        params.apply_patch(options);
        params
    }

    /// 合并增量更新
    ///
    /// 只覆盖 `patch` 中出现的字段，不保留历史。
    pub fn apply_patch(&mut self, patch: &ElectricOptions) {
        if let Some(color) = &patch.color {
            self.color = color.clone();
        }
        if let Some(speed) = patch.speed {
            self.speed = speed;
        }
        if let Some(chaos) = patch.chaos {
            self.chaos = chaos;
        }
        if let Some(thickness) = patch.thickness {
            self.thickness = thickness;
        }
    }

    /// 实际使用的颜色（空字符串回退为默认色）
    pub fn resolved_color(&self) -> &str {
        if self.color.trim().is_empty() {
            defaults::COLOR
        } else {
            &self.color
        }
    }

    /// 实际使用的速度（非正数/非有限值回退为 1）
    pub fn resolved_speed(&self) -> f64 {
        resolve_positive(self.speed, defaults::SPEED)
    }

    /// 实际使用的混沌度（非正数/非有限值回退为 1）
    pub fn resolved_chaos(&self) -> f64 {
        resolve_positive(self.chaos, defaults::CHAOS)
    }

    /// 实际使用的边框粗细（非正数/非有限值回退为 2）
    pub fn resolved_thickness(&self) -> f64 {
        resolve_positive(self.thickness, defaults::THICKNESS)
    }

    /// 边框粗细的 CSS 长度表示，如 `2px`
    pub fn thickness_css(&self) -> String {
        format!("{}px", self.resolved_thickness())
    }

    /// 严格校验
    ///
    /// 运行期计算永远使用 `resolved_*`，不会因非法值失败；
    /// 此方法供配置文件等需要显式报错的场景使用。
    pub fn validate(&self) -> Result<(), ParamError> {
        if self.color.trim().is_empty() {
            return Err(ParamError::EmptyColor);
        }
        for (name, value) in [
            ("speed", self.speed),
            ("chaos", self.chaos),
            ("thickness", self.thickness),
        ] {
            if !(value.is_finite() && value > 0.0) {
                return Err(ParamError::NotPositive { name, value });
            }
        }
        Ok(())
    }
}

/// 正数有效则原样返回，否则返回 `default`
pub fn resolve_positive(value: f64, default: f64) -> f64 {
    if value.is_finite() && value > 0.0 {
        value
    } else {
        default
    }
}
