//! # Sync 模块（尺寸同步写回）
//!
//! 把 [`FilterState`] 写回滤镜节点，并在下一帧重启四路偏移动画。
//!
//! ## 失败策略
//!
//! - 宿主没有动画驱动：只写参数，不重启
//! - 某一路重启失败：记录 `warn` 日志，继续重启其余几路；已写入的参数不回滚
//!
//! 几何参数总是正确的，失败只会让动画在视觉上衔接得不那么平滑。

use tracing::{debug, warn};

use electric_core::FilterState;

use crate::dom::{Document, NodeId};
use crate::host::Host;
use crate::layers::FilterHandles;

/// 把滤镜状态写回节点树
///
/// 同时把 `stroke` 的 `filter` 样式指向本实例的滤镜 id。
pub fn apply_filter_state(
    doc: &mut Document,
    filter_id: &str,
    handles: &FilterHandles,
    stroke: NodeId,
    state: &FilterState,
) {
    doc.set_style_property(stroke, "filter", &format!("url(#{filter_id})"));

    let duration = state.duration_attr();
    for (animation, sweep) in handles.animations().into_iter().zip(state.sweeps()) {
        doc.set_attribute(animation, "values", &sweep.values());
        doc.set_attribute(animation, "dur", &duration);
    }

    doc.set_attribute(handles.displacement, "scale", &state.scale_attr());

    for (name, value) in state.region.attributes() {
        doc.set_attribute(handles.filter, name, &value);
    }
}

/// 在下一帧重启动画
///
/// 返回是否登记了帧回调。
pub fn schedule_restart(host: &dyn Host, filter_id: &str, animations: [NodeId; 4]) -> bool {
    let Some(driver) = host.animation_driver() else {
        debug!(filter_id, "宿主没有动画驱动，跳过重启");
        return false;
    };

    let filter_id = filter_id.to_string();
    host.request_frame(Box::new(move || {
        for node in animations {
            if let Err(error) = driver.begin_element(node) {
                warn!(filter_id = %filter_id, %node, %error, "重启滤镜动画失败");
            }
        }
    }));
    true
}
