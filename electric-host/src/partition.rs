//! # Partition 模块（内容分区）
//!
//! 把目标元素原有的子节点搬进一个 `div.eb-content` 包装节点，追加在装饰层之后。
//! 绘制顺序因此固定为：滤镜定义（不可见）→ 装饰层 → 原有内容。
//!
//! 只在构造时执行一次；搬运是单向的，不提供还原。

use crate::dom::{Document, NodeId};
use crate::layers::classes;

/// 是否是效果自己生成的节点
fn is_generated(doc: &Document, node: NodeId) -> bool {
    doc.has_class(node, classes::SVG) || doc.has_class(node, classes::LAYERS)
}

/// 包装原有内容，返回包装节点
///
/// 文本节点总是被搬运；带 `eb-svg` / `eb-layers` class 的元素留在原处。
pub fn wrap_content(doc: &mut Document, element: NodeId) -> NodeId {
    let wrapper = doc.create_element("div");
    doc.add_class(wrapper, classes::CONTENT);

    let moved: Vec<NodeId> = {
        let doc: &Document = doc;
        doc.children(element)
            .iter()
            .copied()
            .filter(|child| !is_generated(doc, *child))
            .collect()
    };
    for child in moved {
        doc.append_child(wrapper, child);
    }

    doc.append_child(element, wrapper);
    wrapper
}
