//! # Discovery 模块（声明式自动初始化）
//!
//! 扫描带 `data-electric-border` 标记的元素，按属性读取选项并逐个创建效果。
//!
//! ```text
//! <div data-electric-border data-electric-speed="2" data-electric-color="#0ff">
//! ```
//!
//! 由宿主应用显式调用，模块本身没有全局副作用。

use std::rc::Rc;

use tracing::{info, warn};

use electric_core::ElectricOptions;
use electric_core::attributes::{self, options_from_attributes};

use crate::border::ElectricBorder;
use crate::dom::{Document, NodeId, SharedDocument};
use crate::host::Host;

/// 一个标记元素上的原始属性值
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DiscoveryAttributes {
    pub color: Option<String>,
    pub speed: Option<String>,
    pub chaos: Option<String>,
    pub thickness: Option<String>,
}

impl DiscoveryAttributes {
    /// 读取 `node` 上的 `data-electric-*` 属性
    pub fn read(doc: &Document, node: NodeId) -> Self {
        let get = |name: &str| doc.attribute(node, name).map(str::to_string);
        Self {
            color: get(attributes::COLOR),
            speed: get(attributes::SPEED),
            chaos: get(attributes::CHAOS),
            thickness: get(attributes::THICKNESS),
        }
    }

    /// 转成完整选项：缺失或无法解析的值取默认值
    pub fn to_options(&self) -> ElectricOptions {
        options_from_attributes(|name| match name {
            attributes::COLOR => self.color.clone(),
            attributes::SPEED => self.speed.clone(),
            attributes::CHAOS => self.chaos.clone(),
            attributes::THICKNESS => self.thickness.clone(),
            _ => None,
        })
    }
}

/// 读取单个元素的声明式选项
pub fn discover_options(doc: &Document, node: NodeId) -> ElectricOptions {
    DiscoveryAttributes::read(doc, node).to_options()
}

/// 为文档中所有标记元素创建效果
///
/// 构造失败的元素记录 `warn` 日志后跳过。
pub fn init_electric_borders(document: &SharedDocument, host: Rc<dyn Host>) -> Vec<ElectricBorder> {
    // 先收集，构造过程中需要可变借用文档
    let targets: Vec<(NodeId, ElectricOptions)> = {
        let doc = document.borrow();
        doc.elements_with_attribute(attributes::MARKER)
            .into_iter()
            .map(|node| (node, discover_options(&doc, node)))
            .collect()
    };

    let mut borders = Vec::with_capacity(targets.len());
    for (node, options) in targets {
        match ElectricBorder::new(document.clone(), node, &options, host.clone()) {
            Ok(border) => borders.push(border),
            Err(error) => warn!(%node, %error, "跳过无法初始化的元素"),
        }
    }

    info!(count = borders.len(), "声明式 electric border 初始化完成");
    borders
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::BoxMetrics;
    use crate::headless::HeadlessHost;
    use electric_core::defaults;

    fn marked(doc: &mut Document, attrs: &[(&str, &str)]) -> NodeId {
        let el = doc.create_element("div");
        doc.set_attribute(el, attributes::MARKER, "");
        for (name, value) in attrs {
            doc.set_attribute(el, name, value);
        }
        let root = doc.root();
        doc.append_child(root, el);
        el
    }

    // ========== 属性读取 ==========

    #[test]
    fn test_discover_numeric_speed() {
        let mut doc = Document::new();
        let el = marked(&mut doc, &[(attributes::SPEED, "2")]);

        let options = discover_options(&doc, el);
        assert_eq!(options.speed, Some(2.0));
        assert_eq!(options.chaos, Some(defaults::CHAOS));
        assert_eq!(options.color.as_deref(), Some(defaults::COLOR));
    }

    #[test]
    fn test_discover_bogus_speed_falls_back() {
        let mut doc = Document::new();
        let el = marked(&mut doc, &[(attributes::SPEED, "bogus")]);
        assert_eq!(discover_options(&doc, el).speed, Some(1.0));
    }

    #[test]
    fn test_discover_lenient_values() {
        let mut doc = Document::new();
        let el = marked(
            &mut doc,
            &[
                (attributes::THICKNESS, " 4px"),
                (attributes::CHAOS, "0"),
                (attributes::COLOR, ""),
            ],
        );

        let options = discover_options(&doc, el);
        assert_eq!(options.thickness, Some(4.0));
        assert_eq!(options.chaos, Some(defaults::CHAOS));
        assert_eq!(options.color.as_deref(), Some(defaults::COLOR));
    }

    // ========== 初始化 ==========

    #[test]
    fn test_init_creates_one_per_marker() {
        let mut doc = Document::new();
        let a = marked(&mut doc, &[(attributes::COLOR, "#00ffff")]);
        let b = marked(&mut doc, &[]);
        let plain = doc.create_element("div");
        let root = doc.root();
        doc.append_child(root, plain);
        for el in [a, b] {
            doc.set_layout(el, BoxMetrics::uniform(200.0, 100.0));
        }

        let host = HeadlessHost::new(doc.into_shared());
        let borders = init_electric_borders(&host.document(), Rc::new(host.clone()));

        let elements: Vec<NodeId> = borders.iter().map(|b| b.element()).collect();
        assert_eq!(elements, vec![a, b]);
        assert_eq!(borders[0].parameters().color, "#00ffff");
        assert_ne!(borders[0].filter_id(), borders[1].filter_id());
        assert!(!host.document().borrow().has_class(plain, "electric-border"));
    }

    #[test]
    fn test_init_empty_document() {
        let host = HeadlessHost::new(Document::new().into_shared());
        assert!(init_electric_borders(&host.document(), Rc::new(host.clone())).is_empty());
    }
}
