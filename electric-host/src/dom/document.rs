//! # Document 模块
//!
//! 保留式节点树：节点存放在数组中，通过 [`NodeId`] 引用。
//! 节点一旦创建不会被释放，`append_child` 会先把子节点从旧父节点上摘下，
//! 与浏览器 `appendChild` 的移动语义一致。

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use electric_core::ElementSize;

use super::node::{BoxMetrics, ElementData, Namespace, Node, NodeId, NodeKind};

/// 共享文档句柄
///
/// 单线程模型下，控制器与宿主回调通过 `Rc<RefCell<_>>` 共享同一棵树。
pub type SharedDocument = Rc<RefCell<Document>>;

/// 节点树
#[derive(Debug, Clone)]
pub struct Document {
    nodes: Vec<Node>,
    root: NodeId,
    /// `id` 属性索引
    ids: HashMap<String, NodeId>,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    /// 创建只含 `body` 根元素的文档
    pub fn new() -> Self {
        let root = Node::new(NodeKind::Element(ElementData::new("body", Namespace::Html)));
        Self {
            nodes: vec![root],
            root: NodeId(0),
            ids: HashMap::new(),
        }
    }

    /// 包装为共享句柄
    pub fn into_shared(self) -> SharedDocument {
        Rc::new(RefCell::new(self))
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn contains(&self, id: NodeId) -> bool {
        id.0 < self.nodes.len()
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.0)
    }

    pub fn element(&self, id: NodeId) -> Option<&ElementData> {
        self.nodes.get(id.0).and_then(Node::as_element)
    }

    fn element_mut(&mut self, id: NodeId) -> Option<&mut ElementData> {
        self.nodes.get_mut(id.0).and_then(Node::as_element_mut)
    }

    pub fn is_element(&self, id: NodeId) -> bool {
        self.element(id).is_some()
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes.get(id.0)?.parent
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.nodes
            .get(id.0)
            .map(|n| n.children.as_slice())
            .unwrap_or(&[])
    }

    // ========== 节点创建 ==========

    fn push(&mut self, kind: NodeKind) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node::new(kind));
        id
    }

    /// 创建 HTML 元素（未挂载）
    pub fn create_element(&mut self, tag: &str) -> NodeId {
        self.push(NodeKind::Element(ElementData::new(tag, Namespace::Html)))
    }

    /// 创建 SVG 元素（未挂载）
    pub fn create_svg_element(&mut self, tag: &str) -> NodeId {
        self.push(NodeKind::Element(ElementData::new(tag, Namespace::Svg)))
    }

    /// 创建文本节点（未挂载）
    pub fn create_text(&mut self, text: &str) -> NodeId {
        self.push(NodeKind::Text(text.to_string()))
    }

    // ========== 树结构 ==========

    /// 把 `child` 追加为 `parent` 的最后一个子节点
    ///
    /// `child` 已有父节点时先从原处移除。
    /// 返回 `false` 表示节点不存在、`parent` 不是元素，或会形成环。
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) -> bool {
        if !self.is_element(parent) || !self.contains(child) {
            return false;
        }
        if self.is_ancestor_or_self(child, parent) {
            return false;
        }

        self.detach(child);
        self.nodes[child.0].parent = Some(parent);
        self.nodes[parent.0].children.push(child);
        true
    }

    /// 把节点从父节点上摘下（节点本身保留）
    pub fn detach(&mut self, id: NodeId) {
        let Some(parent) = self.parent(id) else {
            return;
        };
        self.nodes[parent.0].children.retain(|c| *c != id);
        self.nodes[id.0].parent = None;
    }

    fn is_ancestor_or_self(&self, ancestor: NodeId, mut node: NodeId) -> bool {
        loop {
            if node == ancestor {
                return true;
            }
            match self.parent(node) {
                Some(parent) => node = parent,
                None => return false,
            }
        }
    }

    /// 先序遍历 `from` 子树
    pub fn descendants(&self, from: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack = vec![from];
        while let Some(id) = stack.pop() {
            out.push(id);
            stack.extend(self.children(id).iter().rev().copied());
        }
        out
    }

    // ========== class / 属性 / 样式 ==========

    pub fn add_class(&mut self, id: NodeId, class: &str) -> bool {
        match self.element_mut(id) {
            Some(el) => {
                if !el.has_class(class) {
                    el.classes.push(class.to_string());
                }
                true
            }
            None => false,
        }
    }

    pub fn has_class(&self, id: NodeId, class: &str) -> bool {
        self.element(id).is_some_and(|el| el.has_class(class))
    }

    /// 设置属性，已存在时原位覆盖
    ///
    /// `id` 属性会同步更新索引。
    pub fn set_attribute(&mut self, id: NodeId, name: &str, value: &str) -> bool {
        let previous_id = if name == "id" {
            self.attribute(id, "id").map(str::to_string)
        } else {
            None
        };

        let Some(el) = self.element_mut(id) else {
            return false;
        };
        match el.attributes.iter_mut().find(|(k, _)| k == name) {
            Some((_, v)) => *v = value.to_string(),
            None => el.attributes.push((name.to_string(), value.to_string())),
        }

        if name == "id" {
            if let Some(previous) = previous_id {
                if self.ids.get(&previous) == Some(&id) {
                    self.ids.remove(&previous);
                }
            }
            self.ids.insert(value.to_string(), id);
        }
        true
    }

    pub fn attribute(&self, id: NodeId, name: &str) -> Option<&str> {
        self.element(id)?.attribute(name)
    }

    pub fn has_attribute(&self, id: NodeId, name: &str) -> bool {
        self.attribute(id, name).is_some()
    }

    /// 设置内联样式属性（含 `--*` 自定义属性）
    pub fn set_style_property(&mut self, id: NodeId, name: &str, value: &str) -> bool {
        let Some(el) = self.element_mut(id) else {
            return false;
        };
        match el.style.iter_mut().find(|(k, _)| k == name) {
            Some((_, v)) => *v = value.to_string(),
            None => el.style.push((name.to_string(), value.to_string())),
        }
        true
    }

    pub fn style_property(&self, id: NodeId, name: &str) -> Option<&str> {
        self.element(id)?.style_property(name)
    }

    // ========== 查询 ==========

    /// 按 `id` 属性查找
    pub fn find_by_id(&self, element_id: &str) -> Option<NodeId> {
        self.ids.get(element_id).copied()
    }

    /// 文档中所有带指定属性的元素（文档顺序，仅限挂载在根下的节点）
    pub fn elements_with_attribute(&self, name: &str) -> Vec<NodeId> {
        self.descendants(self.root)
            .into_iter()
            .filter(|id| self.has_attribute(*id, name))
            .collect()
    }

    // ========== 布局 ==========

    pub fn set_layout(&mut self, id: NodeId, layout: BoxMetrics) -> bool {
        match self.element_mut(id) {
            Some(el) => {
                el.layout = layout;
                true
            }
            None => false,
        }
    }

    pub fn layout(&self, id: NodeId) -> Option<BoxMetrics> {
        self.element(id).map(|el| el.layout)
    }

    /// 测量元素尺寸
    ///
    /// 包围盒某维度为 0 时回退到客户区，结果四舍五入并下限钳制为 1。
    pub fn measure(&self, id: NodeId) -> ElementSize {
        let layout = self.layout(id).unwrap_or_default();
        let pick = |rect: f64, client: f64| {
            if rect != 0.0 && !rect.is_nan() {
                rect
            } else {
                client
            }
        };
        ElementSize::from_measured(
            pick(layout.width, layout.client_width),
            pick(layout.height, layout.client_height),
        )
    }
}
