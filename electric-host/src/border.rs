//! # Border 模块（生命周期控制）
//!
//! [`ElectricBorder`] 把参数模型、图层构建、内容分区和尺寸同步串起来。
//!
//! ## 构造顺序
//!
//! ```text
//! class + CSS 变量 → 滤镜 → 装饰层 → 内容分区 → 首次同步 → 挂载尺寸观察器
//! ```
//!
//! ## 生命周期
//!
//! - `update_options`：合并参数，更新 CSS 变量，无条件重新同步
//! - `destroy`：只断开尺寸观察器；生成的节点与分区保持原样
//!
//! 观察器回调只持有实例状态的弱引用，实例被丢弃后回调自动失效。

use std::cell::RefCell;
use std::rc::Rc;

use tracing::{debug, info};

use electric_core::{EffectParameters, ElectricOptions, FilterState, OptionsPatch};

use crate::dom::{NodeId, SharedDocument};
use crate::error::{ElectricError, ElectricResult};
use crate::host::{Host, ResizeEntry, SizeObserver};
use crate::layers::{
    FilterHandles, LayerHandles, build_filter, build_layers, classes, css_vars,
    generate_filter_id,
};
use crate::partition::wrap_content;
use crate::sync::{apply_filter_state, schedule_restart};

/// 实例内部状态（与观察器回调共享）
struct BorderState {
    document: SharedDocument,
    host: Rc<dyn Host>,
    element: NodeId,
    filter_id: String,
    params: EffectParameters,
    filter: FilterHandles,
    layers: LayerHandles,
    content: NodeId,
    current: Option<FilterState>,
    sync_count: u64,
}

impl BorderState {
    /// 测量 → 计算 → 写回 → 登记重启
    fn sync(&mut self) {
        let state = {
            let mut doc = self.document.borrow_mut();
            let size = doc.measure(self.element);
            let state = FilterState::for_size(size, &self.params);
            apply_filter_state(
                &mut doc,
                &self.filter_id,
                &self.filter,
                self.layers.stroke,
                &state,
            );
            state
        };

        schedule_restart(self.host.as_ref(), &self.filter_id, self.filter.animations());
        self.sync_count += 1;
        debug!(
            filter_id = %self.filter_id,
            size = %state.size,
            duration = state.duration,
            scale = state.displacement_scale,
            "滤镜参数已同步"
        );
        self.current = Some(state);
    }
}

/// Electric border 效果实例
pub struct ElectricBorder {
    state: Rc<RefCell<BorderState>>,
    observer: Option<Box<dyn SizeObserver>>,
}

impl std::fmt::Debug for ElectricBorder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state.borrow();
        f.debug_struct("ElectricBorder")
            .field("element", &state.element)
            .field("filter_id", &state.filter_id)
            .field("params", &state.params)
            .field("observing", &self.observer.is_some())
            .finish()
    }
}

impl ElectricBorder {
    /// 在 `element` 上创建效果
    ///
    /// # 错误
    /// - `NodeNotFound`：节点不存在
    /// - `NotAnElement`：节点是文本节点
    pub fn new(
        document: SharedDocument,
        element: NodeId,
        options: &ElectricOptions,
        host: Rc<dyn Host>,
    ) -> ElectricResult<Self> {
        let params = EffectParameters::from_options(options);

        let (filter_id, filter, layers, content) = {
            let mut doc = document.borrow_mut();
            if !doc.contains(element) {
                return Err(ElectricError::NodeNotFound { node: element });
            }
            if !doc.is_element(element) {
                return Err(ElectricError::NotAnElement { node: element });
            }

            doc.add_class(element, classes::ROOT);
            doc.set_style_property(element, css_vars::COLOR, params.resolved_color());
            doc.set_style_property(element, css_vars::BORDER_WIDTH, &params.thickness_css());

            let filter_id = generate_filter_id(&doc);
            let filter = build_filter(&mut doc, element, &filter_id);
            let layers = build_layers(&mut doc, element);
            let content = wrap_content(&mut doc, element);
            (filter_id, filter, layers, content)
        };

        let state = Rc::new(RefCell::new(BorderState {
            document,
            host: host.clone(),
            element,
            filter_id,
            params,
            filter,
            layers,
            content,
            current: None,
            sync_count: 0,
        }));
        state.borrow_mut().sync();

        let observer = host.create_size_observer().map(|mut observer| {
            let weak = Rc::downgrade(&state);
            observer.on_change(
                element,
                Box::new(move |_entry: ResizeEntry| {
                    // 以重新测量为准，回调携带的尺寸只用于触发
                    if let Some(state) = weak.upgrade() {
                        state.borrow_mut().sync();
                    }
                }),
            );
            observer
        });

        {
            let state = state.borrow();
            info!(
                filter_id = %state.filter_id,
                %element,
                observing = observer.is_some(),
                "electric border 已创建"
            );
        }

        Ok(Self { state, observer })
    }

    /// 合并增量选项并重新同步
    ///
    /// 颜色非空时更新 `--electric-border-color`，给出粗细时更新 `--eb-border-width`。
    /// 无论改动了什么，滤镜参数都会整体重算一次。
    pub fn update_options(&mut self, patch: &OptionsPatch) {
        let mut state = self.state.borrow_mut();
        state.params.apply_patch(patch);

        {
            let mut doc = state.document.borrow_mut();
            if let Some(color) = patch.color.as_deref().filter(|c| !c.is_empty()) {
                doc.set_style_property(state.element, css_vars::COLOR, color);
            }
            if patch.thickness.is_some() {
                doc.set_style_property(
                    state.element,
                    css_vars::BORDER_WIDTH,
                    &state.params.thickness_css(),
                );
            }
        }

        state.sync();
    }

    /// 断开尺寸观察器
    ///
    /// 不移除生成的节点，也不还原内容分区。重复调用无副作用。
    pub fn destroy(&mut self) {
        if let Some(mut observer) = self.observer.take() {
            observer.disconnect();
            debug!(filter_id = %self.state.borrow().filter_id, "尺寸观察器已断开");
        }
    }

    /// 立即按当前尺寸重新同步
    pub fn refresh(&self) {
        self.state.borrow_mut().sync();
    }

    // ========== 查询 ==========

    pub fn element(&self) -> NodeId {
        self.state.borrow().element
    }

    pub fn filter_id(&self) -> String {
        self.state.borrow().filter_id.clone()
    }

    pub fn parameters(&self) -> EffectParameters {
        self.state.borrow().params.clone()
    }

    pub fn filter(&self) -> FilterHandles {
        self.state.borrow().filter
    }

    pub fn layers(&self) -> LayerHandles {
        self.state.borrow().layers
    }

    /// 原有内容的包装节点
    pub fn content(&self) -> NodeId {
        self.state.borrow().content
    }

    /// 最近一次同步得到的滤镜状态
    pub fn current_filter_state(&self) -> Option<FilterState> {
        self.state.borrow().current.clone()
    }

    /// 已执行的同步次数
    pub fn sync_count(&self) -> u64 {
        self.state.borrow().sync_count
    }

    /// 尺寸观察器是否仍然挂载
    pub fn is_observing(&self) -> bool {
        self.observer.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::{BoxMetrics, Document};
    use crate::headless::HeadlessHost;

    fn setup() -> (HeadlessHost, NodeId) {
        let mut doc = Document::new();
        let el = doc.create_element("div");
        let root = doc.root();
        doc.append_child(root, el);
        doc.set_layout(el, BoxMetrics::uniform(320.0, 180.0));
        (HeadlessHost::new(doc.into_shared()), el)
    }

    fn create(host: &HeadlessHost, el: NodeId, options: &ElectricOptions) -> ElectricBorder {
        ElectricBorder::new(host.document(), el, options, Rc::new(host.clone())).unwrap()
    }

    // ========== 构造 ==========

    #[test]
    fn test_construction_applies_variables() {
        let (host, el) = setup();
        let border = create(&host, el, &ElectricOptions::new().color("#ff0000").thickness(3.0));

        let doc = host.document();
        let doc = doc.borrow();
        assert!(doc.has_class(el, classes::ROOT));
        assert_eq!(doc.style_property(el, css_vars::COLOR), Some("#ff0000"));
        assert_eq!(doc.style_property(el, css_vars::BORDER_WIDTH), Some("3px"));
        assert_eq!(border.sync_count(), 1);
        assert!(border.is_observing());
    }

    #[test]
    fn test_construction_rejects_bad_target() {
        let (host, _el) = setup();
        let text = host.document().borrow_mut().create_text("t");

        let err = ElectricBorder::new(
            host.document(),
            text,
            &ElectricOptions::new(),
            Rc::new(host.clone()),
        )
        .unwrap_err();
        assert_eq!(err, ElectricError::NotAnElement { node: text });

        let missing = NodeId(10_000);
        let err = ElectricBorder::new(
            host.document(),
            missing,
            &ElectricOptions::new(),
            Rc::new(host.clone()),
        )
        .unwrap_err();
        assert_eq!(err, ElectricError::NodeNotFound { node: missing });
    }

    #[test]
    fn test_initial_state_matches_size() {
        let (host, el) = setup();
        let border = create(&host, el, &ElectricOptions::new());
        let state = border.current_filter_state().unwrap();

        assert_eq!(state.vertical[0].values(), "180; 0");
        assert_eq!(state.horizontal[1].values(), "0; -320");
        assert_eq!(state.duration_attr(), "6s");
        assert_eq!(state.scale_attr(), "30");
    }

    // ========== update_options ==========

    #[test]
    fn test_update_speed_recomputes_duration() {
        let (host, el) = setup();
        let mut border = create(&host, el, &ElectricOptions::new());
        border.update_options(&ElectricOptions::new().speed(2.0).chaos(2.0));

        let state = border.current_filter_state().unwrap();
        assert_eq!(state.duration, 3.0);
        assert_eq!(state.displacement_scale, 60.0);
        assert_eq!(border.sync_count(), 2);

        let doc = host.document();
        let doc = doc.borrow();
        assert_eq!(doc.attribute(border.filter().dy_animations[0], "dur"), Some("3s"));
    }

    #[test]
    fn test_update_empty_color_keeps_variable() {
        let (host, el) = setup();
        let mut border = create(&host, el, &ElectricOptions::new().color("blue"));
        border.update_options(&ElectricOptions::new().color(""));

        let doc = host.document();
        assert_eq!(
            doc.borrow().style_property(el, css_vars::COLOR),
            Some("blue")
        );
    }

    // ========== destroy ==========

    #[test]
    fn test_destroy_is_idempotent() {
        let (host, el) = setup();
        let mut border = create(&host, el, &ElectricOptions::new());
        assert_eq!(host.active_observers(), 1);

        border.destroy();
        border.destroy();
        assert!(!border.is_observing());
        assert_eq!(host.active_observers(), 0);
    }

    #[test]
    fn test_dropped_instance_ignores_resize() {
        let (host, el) = setup();
        let border = create(&host, el, &ElectricOptions::new());
        drop(border);

        host.resize(el, 10.0, 10.0);
        host.run_until_idle(10);
        assert_eq!(host.active_observers(), 0);
    }
}
