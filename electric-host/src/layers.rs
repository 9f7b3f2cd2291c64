//! # Layers 模块（图层构建）
//!
//! 为效果实例一次性构建固定的节点结构：
//!
//! ```text
//! svg.eb-svg
//!   └─ defs
//!       └─ filter#<id>
//!           ├─ feTurbulence → feOffset(animate dy)     ×2
//!           ├─ feTurbulence → feOffset(animate dx)     ×2
//!           ├─ feComposite ×2 → feBlend(color-dodge)
//!           └─ feDisplacementMap
//! div.eb-layers
//!   ├─ div.eb-stroke           （应用噪声滤镜）
//!   ├─ div.eb-glow-1
//!   ├─ div.eb-glow-2
//!   └─ div.eb-background-glow
//! ```
//!
//! 构建结果以句柄形式返回，同步器据此直接写回，不再在树中查找节点。

use rand::Rng;

use electric_core::OffsetAxis;

use crate::dom::{Document, NodeId};

/// 固定的 class 名
///
/// 外部样式依赖这些名字，属于对外契约。
pub mod classes {
    pub const ROOT: &str = "electric-border";
    pub const SVG: &str = "eb-svg";
    pub const LAYERS: &str = "eb-layers";
    pub const STROKE: &str = "eb-stroke";
    pub const GLOW_PRIMARY: &str = "eb-glow-1";
    pub const GLOW_SECONDARY: &str = "eb-glow-2";
    pub const BACKGROUND_GLOW: &str = "eb-background-glow";
    pub const CONTENT: &str = "eb-content";
}

/// 对外暴露的 CSS 自定义属性
pub mod css_vars {
    /// 当前颜色
    pub const COLOR: &str = "--electric-border-color";
    /// 当前边框粗细
    pub const BORDER_WIDTH: &str = "--eb-border-width";
}

/// 滤镜 id 前缀
pub const FILTER_ID_PREFIX: &str = "turbulent-displace-";

const ID_SUFFIX_LEN: usize = 9;
const BASE36: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// 一路噪声：湍流源 + 带偏移动画的 feOffset
struct NoiseStage {
    seed: &'static str,
    noise: &'static str,
    offset: &'static str,
    axis: OffsetAxis,
    initial_values: &'static str,
}

const NOISE_STAGES: [NoiseStage; 4] = [
    NoiseStage {
        seed: "1",
        noise: "noise1",
        offset: "offsetNoise1",
        axis: OffsetAxis::Dy,
        initial_values: "700; 0",
    },
    NoiseStage {
        seed: "1",
        noise: "noise2",
        offset: "offsetNoise2",
        axis: OffsetAxis::Dy,
        initial_values: "0; -700",
    },
    NoiseStage {
        seed: "2",
        noise: "noise1",
        offset: "offsetNoise3",
        axis: OffsetAxis::Dx,
        initial_values: "490; 0",
    },
    NoiseStage {
        seed: "2",
        noise: "noise2",
        offset: "offsetNoise4",
        axis: OffsetAxis::Dx,
        initial_values: "0; -490",
    },
];

/// 滤镜节点句柄
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FilterHandles {
    pub svg: NodeId,
    pub filter: NodeId,
    /// `height → 0`、`0 → -height` 两路
    pub dy_animations: [NodeId; 2],
    /// `width → 0`、`0 → -width` 两路
    pub dx_animations: [NodeId; 2],
    pub displacement: NodeId,
}

impl FilterHandles {
    /// 四路动画，按 dy, dy, dx, dx 顺序
    pub fn animations(&self) -> [NodeId; 4] {
        [
            self.dy_animations[0],
            self.dy_animations[1],
            self.dx_animations[0],
            self.dx_animations[1],
        ]
    }
}

/// 装饰图层句柄
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LayerHandles {
    pub container: NodeId,
    pub stroke: NodeId,
    pub glow_primary: NodeId,
    pub glow_secondary: NodeId,
    pub background_glow: NodeId,
}

impl LayerHandles {
    /// 四个装饰层，按绘制顺序
    pub fn layers(&self) -> [NodeId; 4] {
        [
            self.stroke,
            self.glow_primary,
            self.glow_secondary,
            self.background_glow,
        ]
    }
}

/// 生成文档内唯一的滤镜 id
///
/// 形如 `turbulent-displace-k3j9x0a1b`；与已有 id 冲突时重新生成。
pub fn generate_filter_id(doc: &Document) -> String {
    let mut rng = rand::rng();
    loop {
        let suffix: String = (0..ID_SUFFIX_LEN)
            .map(|_| BASE36[rng.random_range(0..BASE36.len())] as char)
            .collect();
        let id = format!("{FILTER_ID_PREFIX}{suffix}");
        if doc.find_by_id(&id).is_none() {
            return id;
        }
    }
}

fn set_attributes(doc: &mut Document, node: NodeId, attributes: &[(&str, &str)]) {
    for (name, value) in attributes {
        doc.set_attribute(node, name, value);
    }
}

fn append_svg(doc: &mut Document, parent: NodeId, tag: &str, attributes: &[(&str, &str)]) -> NodeId {
    let node = doc.create_svg_element(tag);
    set_attributes(doc, node, attributes);
    doc.append_child(parent, node);
    node
}

/// 构建滤镜定义并追加到 `element`
pub fn build_filter(doc: &mut Document, element: NodeId, filter_id: &str) -> FilterHandles {
    let svg = doc.create_svg_element("svg");
    doc.add_class(svg, classes::SVG);
    set_attributes(doc, svg, &[("aria-hidden", "true"), ("focusable", "false")]);

    let defs = append_svg(doc, svg, "defs", &[]);
    let filter = append_svg(
        doc,
        defs,
        "filter",
        &[
            ("id", filter_id),
            ("color-interpolation-filters", "sRGB"),
            ("x", "-20%"),
            ("y", "-20%"),
            ("width", "140%"),
            ("height", "140%"),
        ],
    );

    let mut animations = [filter; 4];
    for (slot, stage) in animations.iter_mut().zip(NOISE_STAGES.iter()) {
        append_svg(
            doc,
            filter,
            "feTurbulence",
            &[
                ("type", "turbulence"),
                ("baseFrequency", "0.02"),
                ("numOctaves", "10"),
                ("result", stage.noise),
                ("seed", stage.seed),
            ],
        );
        let offset = append_svg(
            doc,
            filter,
            "feOffset",
            &[
                ("in", stage.noise),
                ("dx", "0"),
                ("dy", "0"),
                ("result", stage.offset),
            ],
        );
        *slot = append_svg(
            doc,
            offset,
            "animate",
            &[
                ("attributeName", stage.axis.attribute_name()),
                ("values", stage.initial_values),
                ("dur", "6s"),
                ("repeatCount", "indefinite"),
                ("calcMode", "linear"),
            ],
        );
    }

    append_svg(
        doc,
        filter,
        "feComposite",
        &[("in", "offsetNoise1"), ("in2", "offsetNoise2"), ("result", "part1")],
    );
    append_svg(
        doc,
        filter,
        "feComposite",
        &[("in", "offsetNoise3"), ("in2", "offsetNoise4"), ("result", "part2")],
    );
    append_svg(
        doc,
        filter,
        "feBlend",
        &[
            ("in", "part1"),
            ("in2", "part2"),
            ("mode", "color-dodge"),
            ("result", "combinedNoise"),
        ],
    );
    let displacement = append_svg(
        doc,
        filter,
        "feDisplacementMap",
        &[
            ("in", "SourceGraphic"),
            ("in2", "combinedNoise"),
            ("scale", "30"),
            ("xChannelSelector", "R"),
            ("yChannelSelector", "B"),
        ],
    );

    doc.append_child(element, svg);

    FilterHandles {
        svg,
        filter,
        dy_animations: [animations[0], animations[1]],
        dx_animations: [animations[2], animations[3]],
        displacement,
    }
}

/// 构建四个装饰层并追加到 `element`
pub fn build_layers(doc: &mut Document, element: NodeId) -> LayerHandles {
    let container = doc.create_element("div");
    doc.add_class(container, classes::LAYERS);

    let mut layer = |class: &str| {
        let node = doc.create_element("div");
        doc.add_class(node, class);
        doc.append_child(container, node);
        node
    };
    let stroke = layer(classes::STROKE);
    let glow_primary = layer(classes::GLOW_PRIMARY);
    let glow_secondary = layer(classes::GLOW_SECONDARY);
    let background_glow = layer(classes::BACKGROUND_GLOW);

    doc.append_child(element, container);

    LayerHandles {
        container,
        stroke,
        glow_primary,
        glow_secondary,
        background_glow,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc_with_target() -> (Document, NodeId) {
        let mut doc = Document::new();
        let el = doc.create_element("div");
        let root = doc.root();
        doc.append_child(root, el);
        (doc, el)
    }

    // ========== 滤镜 id ==========

    #[test]
    fn test_filter_id_format() {
        let (doc, _) = doc_with_target();
        let id = generate_filter_id(&doc);
        let suffix = id.strip_prefix(FILTER_ID_PREFIX).unwrap();
        assert_eq!(suffix.len(), 9);
        assert!(suffix.bytes().all(|b| BASE36.contains(&b)));
    }

    #[test]
    fn test_filter_ids_unique_in_document() {
        let (mut doc, el) = doc_with_target();
        let mut seen = std::collections::HashSet::new();
        for _ in 0..50 {
            let id = generate_filter_id(&doc);
            build_filter(&mut doc, el, &id);
            assert!(seen.insert(id));
        }
    }

    // ========== 滤镜结构 ==========

    #[test]
    fn test_filter_structure() {
        let (mut doc, el) = doc_with_target();
        let handles = build_filter(&mut doc, el, "turbulent-displace-test");

        assert_eq!(doc.children(el), &[handles.svg]);
        assert!(doc.has_class(handles.svg, classes::SVG));
        assert_eq!(doc.attribute(handles.svg, "aria-hidden"), Some("true"));
        assert_eq!(doc.find_by_id("turbulent-displace-test"), Some(handles.filter));

        let tags: Vec<String> = doc
            .children(handles.filter)
            .iter()
            .map(|id| doc.element(*id).unwrap().tag.clone())
            .collect();
        assert_eq!(
            tags,
            vec![
                "feTurbulence",
                "feOffset",
                "feTurbulence",
                "feOffset",
                "feTurbulence",
                "feOffset",
                "feTurbulence",
                "feOffset",
                "feComposite",
                "feComposite",
                "feBlend",
                "feDisplacementMap",
            ]
        );

        for anim in handles.dy_animations {
            assert_eq!(doc.attribute(anim, "attributeName"), Some("dy"));
        }
        for anim in handles.dx_animations {
            assert_eq!(doc.attribute(anim, "attributeName"), Some("dx"));
        }
        assert_eq!(doc.attribute(handles.displacement, "scale"), Some("30"));
    }

    #[test]
    fn test_stage_axes_match_filter_state() {
        let (mut doc, el) = doc_with_target();
        let handles = build_filter(&mut doc, el, "turbulent-displace-axes");
        let state = electric_core::compute_filter_state(10, 10, 1.0, 1.0);

        for (animation, sweep) in handles.animations().into_iter().zip(state.sweeps()) {
            assert_eq!(
                doc.attribute(animation, "attributeName"),
                Some(sweep.axis.attribute_name())
            );
        }
    }

    #[test]
    fn test_filter_markup_snapshot() {
        let (mut doc, el) = doc_with_target();
        let handles = build_filter(&mut doc, el, "turbulent-displace-test");
        let offset = doc.parent(handles.dx_animations[1]).unwrap();

        insta::assert_snapshot!(doc.to_markup(offset), @r#"
        <feOffset in="noise2" dx="0" dy="0" result="offsetNoise4">
          <animate attributeName="dx" values="0; -490" dur="6s" repeatCount="indefinite" calcMode="linear" />
        </feOffset>
        "#);
    }

    // ========== 装饰层 ==========

    #[test]
    fn test_layers_order() {
        let (mut doc, el) = doc_with_target();
        let layers = build_layers(&mut doc, el);

        assert_eq!(doc.children(layers.container), &layers.layers());
        insta::assert_snapshot!(doc.to_markup(layers.container), @r#"
        <div class="eb-layers">
          <div class="eb-stroke"></div>
          <div class="eb-glow-1"></div>
          <div class="eb-glow-2"></div>
          <div class="eb-background-glow"></div>
        </div>
        "#);
    }
}
