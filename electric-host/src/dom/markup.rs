//! # Markup 模块
//!
//! 把子树序列化为缩进的标记文本，用于预览与快照测试。
//!
//! 属性输出顺序固定：`class` → 其他属性（插入顺序）→ `style`。
//! 无子节点的 SVG 元素自闭合，HTML 元素输出成对标签。

use std::fmt::Write;

use super::document::Document;
use super::node::{ElementData, Namespace, NodeId, NodeKind};

const INDENT: &str = "  ";

impl Document {
    /// 序列化 `id` 子树（末尾不含换行）
    pub fn to_markup(&self, id: NodeId) -> String {
        let mut out = String::new();
        self.write_node(id, 0, &mut out);
        let trimmed = out.trim_end().len();
        out.truncate(trimmed);
        out
    }

    fn write_node(&self, id: NodeId, depth: usize, out: &mut String) {
        let Some(node) = self.node(id) else {
            return;
        };
        let indent = INDENT.repeat(depth);

        match &node.kind {
            NodeKind::Text(text) => {
                let _ = writeln!(out, "{indent}{}", escape(text));
            }
            NodeKind::Element(el) => {
                let _ = write!(out, "{indent}<{}", el.tag);
                write_attributes(el, out);

                if node.children.is_empty() {
                    match el.namespace {
                        Namespace::Svg => out.push_str(" />\n"),
                        Namespace::Html => {
                            let _ = writeln!(out, "></{}>", el.tag);
                        }
                    }
                    return;
                }

                out.push_str(">\n");
                for child in &node.children {
                    self.write_node(*child, depth + 1, out);
                }
                let _ = writeln!(out, "{indent}</{}>", el.tag);
            }
        }
    }
}

fn write_attributes(el: &ElementData, out: &mut String) {
    if !el.classes.is_empty() {
        let _ = write!(out, " class=\"{}\"", escape(&el.classes.join(" ")));
    }
    for (name, value) in &el.attributes {
        let _ = write!(out, " {name}=\"{}\"", escape(value));
    }
    if !el.style.is_empty() {
        let style = el
            .style
            .iter()
            .map(|(k, v)| format!("{k}: {v}"))
            .collect::<Vec<_>>()
            .join("; ");
        let _ = write!(out, " style=\"{}\"", escape(&style));
    }
}

fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
    out
}
