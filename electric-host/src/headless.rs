//! # Headless 模块
//!
//! 确定性的进程内宿主，模拟单线程 UI 事件循环：
//!
//! ```text
//! resize() ──► 待投递队列 ──┐
//!                          │ run_frame():
//!                          │   1. 执行上一帧登记的帧回调
//!                          └─► 2. 按 ResizePolicy 投递尺寸变化通知
//! ```
//!
//! 通知回调中登记的帧回调在下一帧执行，与浏览器"动画帧回调先于尺寸观察"
//! 的顺序一致。测试与 `eb-preview` 都通过它驱动效果。

use std::cell::{Cell, RefCell};
use std::collections::HashSet;
use std::rc::{Rc, Weak};

use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::dom::{BoxMetrics, NodeId, SharedDocument};
use crate::host::{
    AnimationDriver, AnimationError, FrameCallback, Host, ResizeCallback, ResizeEntry,
    SizeObserver,
};

/// 尺寸变化的投递策略
///
/// 连续多次 resize 是否合并由宿主决定，这里做成可配置项。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "kebab-case")]
pub enum ResizePolicy {
    /// 每次 resize 立即同步投递
    Immediate,
    /// 同一帧内的多次 resize 合并为一次，在下一帧投递
    PerFrame,
    /// 目标连续 `frames` 帧没有新的 resize 后才投递
    Debounce { frames: u32 },
}

impl Default for ResizePolicy {
    fn default() -> Self {
        Self::PerFrame
    }
}

impl ResizePolicy {
    /// 投递前需要保持静止的帧数
    fn quiet_frames_required(self) -> u32 {
        match self {
            Self::Immediate | Self::PerFrame => 1,
            Self::Debounce { frames } => frames.max(1),
        }
    }
}

/// 一个观察器对某个目标的登记
struct Registration {
    key: u64,
    observer: u64,
    target: NodeId,
    /// 投递期间被暂时取出
    callback: Option<ResizeCallback>,
}

struct PendingResize {
    target: NodeId,
    quiet_frames: u32,
}

struct HeadlessState {
    document: SharedDocument,
    policy: Cell<ResizePolicy>,
    supports_observer: Cell<bool>,
    supports_animation: Cell<bool>,
    fail_restarts: Cell<bool>,
    /// 只对这些节点注入重启失败
    failing_nodes: RefCell<HashSet<NodeId>>,
    next_key: Cell<u64>,
    registrations: RefCell<Vec<Registration>>,
    pending: RefCell<Vec<PendingResize>>,
    frames: RefCell<Vec<FrameCallback>>,
    restarts: RefCell<Vec<NodeId>>,
    frame_count: Cell<u64>,
}

impl HeadlessState {
    fn next_key(&self) -> u64 {
        let key = self.next_key.get();
        self.next_key.set(key + 1);
        key
    }

    /// 向所有观察 `target` 的回调投递一次通知
    fn deliver(&self, target: NodeId) {
        let size = self.document.borrow().measure(target);
        let keys: Vec<u64> = self
            .registrations
            .borrow()
            .iter()
            .filter(|r| r.target == target)
            .map(|r| r.key)
            .collect();

        for key in keys {
            // 回调执行期间不持有借用，回调里可以安全地 disconnect 或登记新观察
            let callback = self
                .registrations
                .borrow_mut()
                .iter_mut()
                .find(|r| r.key == key)
                .and_then(|r| r.callback.take());
            let Some(mut callback) = callback else {
                continue;
            };

            callback(ResizeEntry { target, size });

            if let Some(registration) = self
                .registrations
                .borrow_mut()
                .iter_mut()
                .find(|r| r.key == key)
            {
                registration.callback = Some(callback);
            }
        }
    }
}

/// 无界面宿主
///
/// 克隆得到的是同一个宿主的另一个句柄。
#[derive(Clone)]
pub struct HeadlessHost {
    state: Rc<HeadlessState>,
}

impl std::fmt::Debug for HeadlessHost {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HeadlessHost")
            .field("policy", &self.state.policy.get())
            .field("observers", &self.active_observers())
            .field("pending_resizes", &self.pending_resizes())
            .field("pending_frame_callbacks", &self.pending_frame_callbacks())
            .field("frame_count", &self.state.frame_count.get())
            .finish()
    }
}

impl HeadlessHost {
    /// 创建宿主（默认 `PerFrame` 策略，支持尺寸观察与动画重启）
    pub fn new(document: SharedDocument) -> Self {
        Self::with_policy(document, ResizePolicy::default())
    }

    pub fn with_policy(document: SharedDocument, policy: ResizePolicy) -> Self {
        Self {
            state: Rc::new(HeadlessState {
                document,
                policy: Cell::new(policy),
                supports_observer: Cell::new(true),
                supports_animation: Cell::new(true),
                fail_restarts: Cell::new(false),
                failing_nodes: RefCell::new(HashSet::new()),
                next_key: Cell::new(1),
                registrations: RefCell::new(Vec::new()),
                pending: RefCell::new(Vec::new()),
                frames: RefCell::new(Vec::new()),
                restarts: RefCell::new(Vec::new()),
                frame_count: Cell::new(0),
            }),
        }
    }

    pub fn document(&self) -> SharedDocument {
        self.state.document.clone()
    }

    // ========== 能力开关 ==========

    /// 关闭后 `create_size_observer` 返回 `None`
    pub fn set_size_observer_supported(&self, supported: bool) {
        self.state.supports_observer.set(supported);
    }

    /// 关闭后 `animation_driver` 返回 `None`
    pub fn set_animation_supported(&self, supported: bool) {
        self.state.supports_animation.set(supported);
    }

    /// 开启后每次动画重启都返回错误
    pub fn set_restart_failure(&self, fail: bool) {
        self.state.fail_restarts.set(fail);
    }

    /// 只让 `node` 的重启返回错误，其余节点照常
    pub fn set_restart_failure_for(&self, node: NodeId) {
        self.state.failing_nodes.borrow_mut().insert(node);
    }

    // ========== 布局与事件循环 ==========

    /// 修改元素布局尺寸（包围盒与客户区相同）
    pub fn resize(&self, target: NodeId, width: f64, height: f64) -> bool {
        self.set_layout(target, BoxMetrics::uniform(width, height))
    }

    /// 写入完整布局盒，测量尺寸变化时登记一次通知
    ///
    /// 返回 `false` 表示节点不存在或不是元素。
    pub fn set_layout(&self, target: NodeId, layout: BoxMetrics) -> bool {
        let changed = {
            let mut doc = self.state.document.borrow_mut();
            let before = doc.measure(target);
            if !doc.set_layout(target, layout) {
                return false;
            }
            doc.measure(target) != before
        };
        if !changed {
            trace!(%target, "尺寸未变化，不登记通知");
            return true;
        }

        match self.state.policy.get() {
            ResizePolicy::Immediate => self.state.deliver(target),
            ResizePolicy::PerFrame | ResizePolicy::Debounce { .. } => {
                let mut pending = self.state.pending.borrow_mut();
                match pending.iter_mut().find(|p| p.target == target) {
                    Some(entry) => entry.quiet_frames = 0,
                    None => pending.push(PendingResize {
                        target,
                        quiet_frames: 0,
                    }),
                }
            }
        }
        true
    }

    /// 推进一帧
    pub fn run_frame(&self) {
        let frame = self.state.frame_count.get() + 1;
        self.state.frame_count.set(frame);

        let callbacks = std::mem::take(&mut *self.state.frames.borrow_mut());
        trace!(frame, callbacks = callbacks.len(), "执行帧回调");
        for callback in callbacks {
            callback();
        }

        let required = self.state.policy.get().quiet_frames_required();
        let due: Vec<NodeId> = {
            let mut pending = self.state.pending.borrow_mut();
            for entry in pending.iter_mut() {
                entry.quiet_frames += 1;
            }
            let due = pending
                .iter()
                .filter(|p| p.quiet_frames >= required)
                .map(|p| p.target)
                .collect();
            pending.retain(|p| p.quiet_frames < required);
            due
        };

        for target in due {
            trace!(frame, %target, "投递尺寸变化");
            self.state.deliver(target);
        }
    }

    /// 连续推进 `count` 帧
    pub fn run_frames(&self, count: usize) {
        for _ in 0..count {
            self.run_frame();
        }
    }

    /// 推进直到没有待处理的工作，最多 `max_frames` 帧；返回实际推进的帧数
    pub fn run_until_idle(&self, max_frames: usize) -> usize {
        let mut frames = 0;
        while !self.is_idle() && frames < max_frames {
            self.run_frame();
            frames += 1;
        }
        frames
    }

    pub fn is_idle(&self) -> bool {
        self.pending_frame_callbacks() == 0 && self.pending_resizes() == 0
    }

    // ========== 观测 ==========

    pub fn frame_count(&self) -> u64 {
        self.state.frame_count.get()
    }

    pub fn pending_frame_callbacks(&self) -> usize {
        self.state.frames.borrow().len()
    }

    pub fn pending_resizes(&self) -> usize {
        self.state.pending.borrow().len()
    }

    /// 仍然有效的观察登记数
    pub fn active_observers(&self) -> usize {
        self.state.registrations.borrow().len()
    }

    /// 已成功重启的动画节点（按重启顺序）
    pub fn restarts(&self) -> Vec<NodeId> {
        self.state.restarts.borrow().clone()
    }

    pub fn take_restarts(&self) -> Vec<NodeId> {
        std::mem::take(&mut *self.state.restarts.borrow_mut())
    }
}

impl Host for HeadlessHost {
    fn create_size_observer(&self) -> Option<Box<dyn SizeObserver>> {
        if !self.state.supports_observer.get() {
            return None;
        }
        Some(Box::new(HeadlessObserver {
            state: Rc::downgrade(&self.state),
            id: self.state.next_key(),
        }))
    }

    fn request_frame(&self, callback: FrameCallback) {
        self.state.frames.borrow_mut().push(callback);
    }

    fn animation_driver(&self) -> Option<Rc<dyn AnimationDriver>> {
        if !self.state.supports_animation.get() {
            return None;
        }
        Some(Rc::new(HeadlessDriver {
            state: Rc::downgrade(&self.state),
        }))
    }
}

/// 无界面宿主的尺寸观察器
struct HeadlessObserver {
    state: Weak<HeadlessState>,
    id: u64,
}

impl SizeObserver for HeadlessObserver {
    fn on_change(&mut self, target: NodeId, callback: ResizeCallback) {
        let Some(state) = self.state.upgrade() else {
            return;
        };
        let key = state.next_key();
        state.registrations.borrow_mut().push(Registration {
            key,
            observer: self.id,
            target,
            callback: Some(callback),
        });
    }

    fn disconnect(&mut self) {
        if let Some(state) = self.state.upgrade() {
            state
                .registrations
                .borrow_mut()
                .retain(|r| r.observer != self.id);
        }
    }
}

impl Drop for HeadlessObserver {
    fn drop(&mut self) {
        self.disconnect();
    }
}

/// 无界面宿主的动画驱动：记录重启，可注入失败
struct HeadlessDriver {
    state: Weak<HeadlessState>,
}

impl AnimationDriver for HeadlessDriver {
    fn begin_element(&self, node: NodeId) -> Result<(), AnimationError> {
        let Some(state) = self.state.upgrade() else {
            return Err(AnimationError::Rejected {
                message: "宿主已释放".to_string(),
            });
        };
        if state.fail_restarts.get() || state.failing_nodes.borrow().contains(&node) {
            return Err(AnimationError::Rejected {
                message: "注入的重启失败".to_string(),
            });
        }
        let is_animation = state
            .document
            .borrow()
            .element(node)
            .is_some_and(|el| el.tag == "animate");
        if !is_animation {
            return Err(AnimationError::NotAnimation { node });
        }
        state.restarts.borrow_mut().push(node);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::Document;
    use std::cell::RefCell;

    fn setup(policy: ResizePolicy) -> (HeadlessHost, NodeId) {
        let mut doc = Document::new();
        let el = doc.create_element("div");
        let root = doc.root();
        doc.append_child(root, el);
        (HeadlessHost::with_policy(doc.into_shared(), policy), el)
    }

    fn observe(host: &HeadlessHost, target: NodeId) -> (Box<dyn SizeObserver>, Rc<RefCell<Vec<ResizeEntry>>>) {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let mut observer = host.create_size_observer().unwrap();
        let sink = seen.clone();
        observer.on_change(target, Box::new(move |entry: ResizeEntry| sink.borrow_mut().push(entry)));
        (observer, seen)
    }

    // ========== 投递策略 ==========

    #[test]
    fn test_immediate_delivers_every_resize() {
        let (host, el) = setup(ResizePolicy::Immediate);
        let (_observer, seen) = observe(&host, el);

        host.resize(el, 100.0, 50.0);
        host.resize(el, 200.0, 50.0);

        let seen = seen.borrow();
        assert_eq!(seen.len(), 2);
        assert_eq!(seen[1].size.width, 200);
    }

    #[test]
    fn test_per_frame_coalesces() {
        let (host, el) = setup(ResizePolicy::PerFrame);
        let (_observer, seen) = observe(&host, el);

        host.resize(el, 100.0, 50.0);
        host.resize(el, 150.0, 50.0);
        host.resize(el, 300.0, 75.0);
        assert!(seen.borrow().is_empty());

        host.run_frame();
        let seen = seen.borrow();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].size.width, 300);
        assert_eq!(seen[0].size.height, 75);
    }

    #[test]
    fn test_debounce_waits_for_quiet_frames() {
        let (host, el) = setup(ResizePolicy::Debounce { frames: 3 });
        let (_observer, seen) = observe(&host, el);

        host.resize(el, 100.0, 50.0);
        host.run_frames(2);
        // 静止期内再次 resize，计数重新开始
        host.resize(el, 120.0, 50.0);
        host.run_frames(2);
        assert!(seen.borrow().is_empty());

        host.run_frame();
        assert_eq!(seen.borrow().len(), 1);
        assert_eq!(seen.borrow()[0].size.width, 120);
    }

    // ========== 观察器 ==========

    #[test]
    fn test_disconnect_stops_delivery() {
        let (host, el) = setup(ResizePolicy::Immediate);
        let (mut observer, seen) = observe(&host, el);
        assert_eq!(host.active_observers(), 1);

        observer.disconnect();
        observer.disconnect();
        assert_eq!(host.active_observers(), 0);

        host.resize(el, 10.0, 10.0);
        assert!(seen.borrow().is_empty());
    }

    #[test]
    fn test_drop_disconnects() {
        let (host, el) = setup(ResizePolicy::Immediate);
        let (observer, _seen) = observe(&host, el);
        drop(observer);
        assert_eq!(host.active_observers(), 0);
    }

    #[test]
    fn test_observer_unsupported() {
        let (host, _el) = setup(ResizePolicy::PerFrame);
        host.set_size_observer_supported(false);
        assert!(host.create_size_observer().is_none());
    }

    #[test]
    fn test_unchanged_size_is_not_queued() {
        let (host, el) = setup(ResizePolicy::PerFrame);
        let (_observer, seen) = observe(&host, el);

        host.resize(el, 100.0, 50.0);
        host.run_frame();
        assert!(host.resize(el, 100.0, 50.0));
        // 四舍五入后尺寸相同
        assert!(host.resize(el, 100.3, 49.8));
        assert_eq!(host.pending_resizes(), 0);

        host.run_frame();
        assert_eq!(seen.borrow().len(), 1);
    }

    #[test]
    fn test_unchanged_size_immediate() {
        let (host, el) = setup(ResizePolicy::Immediate);
        let (_observer, seen) = observe(&host, el);

        host.resize(el, 80.0, 40.0);
        host.resize(el, 80.0, 40.0);
        assert_eq!(seen.borrow().len(), 1);
    }

    #[test]
    fn test_resize_unknown_node() {
        let (host, _el) = setup(ResizePolicy::PerFrame);
        assert!(!host.resize(NodeId(999), 1.0, 1.0));
        assert_eq!(host.pending_resizes(), 0);
    }

    // ========== 帧回调 ==========

    #[test]
    fn test_frame_callbacks_run_next_frame() {
        let (host, _el) = setup(ResizePolicy::PerFrame);
        let ran = Rc::new(Cell::new(0));

        let counter = ran.clone();
        let inner_host = host.clone();
        host.request_frame(Box::new(move || {
            counter.set(counter.get() + 1);
            let counter = counter.clone();
            inner_host.request_frame(Box::new(move || counter.set(counter.get() + 10)));
        }));

        host.run_frame();
        assert_eq!(ran.get(), 1);
        host.run_frame();
        assert_eq!(ran.get(), 11);
        assert!(host.is_idle());
    }

    #[test]
    fn test_run_until_idle_is_bounded() {
        let (host, el) = setup(ResizePolicy::PerFrame);
        host.resize(el, 10.0, 10.0);
        assert_eq!(host.run_until_idle(10), 1);
        assert_eq!(host.run_until_idle(10), 0);
    }

    // ========== 动画驱动 ==========

    #[test]
    fn test_driver_records_and_fails() {
        let (host, el) = setup(ResizePolicy::PerFrame);
        let animate = {
            let doc = host.document();
            let mut doc = doc.borrow_mut();
            let node = doc.create_svg_element("animate");
            doc.append_child(el, node);
            node
        };
        let driver = host.animation_driver().unwrap();

        assert_eq!(driver.begin_element(animate), Ok(()));
        assert_eq!(
            driver.begin_element(el),
            Err(AnimationError::NotAnimation { node: el })
        );

        host.set_restart_failure(true);
        assert!(matches!(
            driver.begin_element(animate),
            Err(AnimationError::Rejected { .. })
        ));
        assert_eq!(host.take_restarts(), vec![animate]);
        assert!(host.restarts().is_empty());

        host.set_restart_failure(false);
        host.set_restart_failure_for(animate);
        assert!(matches!(
            driver.begin_element(animate),
            Err(AnimationError::Rejected { .. })
        ));

        host.set_animation_supported(false);
        assert!(host.animation_driver().is_none());
    }
}
