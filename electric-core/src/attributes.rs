//! # Attributes 模块
//!
//! 声明式用法的属性约定与宽松解析。
//!
//! 标记了 [`MARKER`] 的元素会被自动初始化，另外四个 `data-*` 属性以字符串
//! 形式提供参数。数值按浏览器 `parseFloat` 的习惯解析：跳过前导空白，
//! 取最长的合法数字前缀（`"2px"` 得到 2）。解析失败、结果为 0 或非有限值时
//! 使用默认值，不报错也不记录日志。

use crate::params::{ElectricOptions, defaults};

/// 自动初始化标记属性
pub const MARKER: &str = "data-electric-border";
/// 颜色属性
pub const COLOR: &str = "data-electric-color";
/// 速度属性
pub const SPEED: &str = "data-electric-speed";
/// 混沌度属性
pub const CHAOS: &str = "data-electric-chaos";
/// 边框粗细属性
pub const THICKNESS: &str = "data-electric-thickness";

/// 宽松的浮点解析
///
/// 返回最长合法前缀的值；没有任何数字时返回 `None`。
pub fn parse_float_lenient(text: &str) -> Option<f64> {
    let s = text.trim_start();
    let bytes = s.as_bytes();
    let mut end = 0;

    if matches!(bytes.first(), Some(b'+' | b'-')) {
        end = 1;
    }

    if s[end..].starts_with("Infinity") {
        let negative = bytes.first() == Some(&b'-');
        return Some(if negative {
            f64::NEG_INFINITY
        } else {
            f64::INFINITY
        });
    }

    let int_start = end;
    while end < bytes.len() && bytes[end].is_ascii_digit() {
        end += 1;
    }
    let mut digits = end - int_start;

    if end < bytes.len() && bytes[end] == b'.' {
        let frac_start = end + 1;
        let mut frac_end = frac_start;
        while frac_end < bytes.len() && bytes[frac_end].is_ascii_digit() {
            frac_end += 1;
        }
        digits += frac_end - frac_start;
        if digits > 0 {
            end = frac_end;
        }
    }

    if digits == 0 {
        return None;
    }

    // 指数部分必须至少带一位数字才计入
    if end < bytes.len() && matches!(bytes[end], b'e' | b'E') {
        let mut exp_end = end + 1;
        if exp_end < bytes.len() && matches!(bytes[exp_end], b'+' | b'-') {
            exp_end += 1;
        }
        let exp_digits_start = exp_end;
        while exp_end < bytes.len() && bytes[exp_end].is_ascii_digit() {
            exp_end += 1;
        }
        if exp_end > exp_digits_start {
            end = exp_end;
        }
    }

    s[..end].parse::<f64>().ok()
}

/// 解析数值属性，失败、为 0 或非有限值时返回 `default`
pub fn numeric_or_default(raw: Option<&str>, default: f64) -> f64 {
    match raw.and_then(parse_float_lenient) {
        Some(value) if value != 0.0 && value.is_finite() => value,
        _ => default,
    }
}

/// 从属性读取选项
///
/// `lookup` 按属性名返回原始字符串。所有字段都会被填充：
/// 缺失或无法解析的值取默认值。
pub fn options_from_attributes<F>(lookup: F) -> ElectricOptions
where
    F: Fn(&str) -> Option<String>,
{
    let color = lookup(COLOR)
        .filter(|c| !c.is_empty())
        .unwrap_or_else(|| defaults::COLOR.to_string());

    ElectricOptions {
        color: Some(color),
        speed: Some(numeric_or_default(lookup(SPEED).as_deref(), defaults::SPEED)),
        chaos: Some(numeric_or_default(lookup(CHAOS).as_deref(), defaults::CHAOS)),
        thickness: Some(numeric_or_default(
            lookup(THICKNESS).as_deref(),
            defaults::THICKNESS,
        )),
    }
}
