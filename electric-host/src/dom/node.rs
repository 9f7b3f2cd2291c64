//! # Node 模块
//!
//! 节点树的基础类型。

use serde::{Deserialize, Serialize};

/// 节点标识符
///
/// 由 [`Document`](super::Document) 在创建节点时分配，是节点数组中的下标，
/// 在文档生命周期内保持稳定。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) usize);

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "NodeId({})", self.0)
    }
}

/// 元素命名空间
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Namespace {
    Html,
    Svg,
}

/// 元素的布局盒
///
/// 由宿主布局阶段写入。`width/height` 对应包围盒，
/// `client_width/client_height` 对应客户区；包围盒为 0 时测量会回退到客户区。
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct BoxMetrics {
    pub width: f64,
    pub height: f64,
    #[serde(default)]
    pub client_width: f64,
    #[serde(default)]
    pub client_height: f64,
}

impl BoxMetrics {
    /// 包围盒与客户区相同的布局盒
    pub fn uniform(width: f64, height: f64) -> Self {
        Self {
            width,
            height,
            client_width: width,
            client_height: height,
        }
    }
}

/// 元素数据
#[derive(Debug, Clone)]
pub struct ElementData {
    /// 标签名（SVG 元素保留大小写，如 `feTurbulence`）
    pub tag: String,
    pub namespace: Namespace,
    /// class 列表（有序、去重）
    pub classes: Vec<String>,
    /// 属性（有序）
    pub attributes: Vec<(String, String)>,
    /// 内联样式属性（有序）
    pub style: Vec<(String, String)>,
    pub layout: BoxMetrics,
}

impl ElementData {
    pub(crate) fn new(tag: impl Into<String>, namespace: Namespace) -> Self {
        Self {
            tag: tag.into(),
            namespace,
            classes: Vec::new(),
            attributes: Vec::new(),
            style: Vec::new(),
            layout: BoxMetrics::default(),
        }
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.classes.iter().any(|c| c == class)
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn style_property(&self, name: &str) -> Option<&str> {
        self.style
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }
}

/// 节点内容
#[derive(Debug, Clone)]
pub enum NodeKind {
    Element(ElementData),
    Text(String),
}

/// 树中的一个节点
#[derive(Debug, Clone)]
pub struct Node {
    pub kind: NodeKind,
    pub parent: Option<NodeId>,
    pub children: Vec<NodeId>,
}

impl Node {
    pub(crate) fn new(kind: NodeKind) -> Self {
        Self {
            kind,
            parent: None,
            children: Vec::new(),
        }
    }

    pub fn as_element(&self) -> Option<&ElementData> {
        match &self.kind {
            NodeKind::Element(data) => Some(data),
            NodeKind::Text(_) => None,
        }
    }

    pub(crate) fn as_element_mut(&mut self) -> Option<&mut ElementData> {
        match &mut self.kind {
            NodeKind::Element(data) => Some(data),
            NodeKind::Text(_) => None,
        }
    }
}
