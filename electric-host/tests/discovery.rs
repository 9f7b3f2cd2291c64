//! # 声明式初始化集成测试

use std::rc::Rc;

use electric_core::attributes;
use electric_host::{
    BoxMetrics, Document, HeadlessHost, NodeId, ResizePolicy, init_electric_borders,
};

fn marked_card(doc: &mut Document, attrs: &[(&str, &str)]) -> NodeId {
    let card = doc.create_element("section");
    doc.set_attribute(card, attributes::MARKER, "");
    for (name, value) in attrs {
        doc.set_attribute(card, name, value);
    }
    let root = doc.root();
    doc.append_child(root, card);
    doc.set_layout(card, BoxMetrics::uniform(300.0, 120.0));
    card
}

#[test]
fn test_declared_speeds() {
    let mut doc = Document::new();
    marked_card(&mut doc, &[(attributes::SPEED, "2")]);
    marked_card(&mut doc, &[(attributes::SPEED, "bogus")]);
    let host = HeadlessHost::new(doc.into_shared());

    let borders = init_electric_borders(&host.document(), Rc::new(host.clone()));
    let speeds: Vec<f64> = borders.iter().map(|b| b.parameters().speed).collect();
    assert_eq!(speeds, vec![2.0, 1.0]);

    let durations: Vec<f64> = borders
        .iter()
        .map(|b| b.current_filter_state().unwrap().duration)
        .collect();
    assert_eq!(durations, vec![3.0, 6.0]);
}

#[test]
fn test_discovered_borders_follow_resizes() {
    let mut doc = Document::new();
    let nested_parent = doc.create_element("div");
    let root = doc.root();
    doc.append_child(root, nested_parent);
    let top = marked_card(&mut doc, &[(attributes::THICKNESS, "3px")]);
    let nested = doc.create_element("div");
    doc.set_attribute(nested, attributes::MARKER, "true");
    doc.append_child(nested_parent, nested);

    let host = HeadlessHost::with_policy(doc.into_shared(), ResizePolicy::PerFrame);
    let borders = init_electric_borders(&host.document(), Rc::new(host.clone()));
    assert_eq!(borders.len(), 2);
    assert_eq!(borders[0].element(), nested);
    assert_eq!(borders[1].element(), top);
    assert_eq!(borders[1].parameters().thickness, 3.0);

    host.resize(top, 720.0, 240.0);
    host.run_until_idle(16);

    assert_eq!(borders[1].current_filter_state().unwrap().size.width, 720);
    assert_eq!(borders[0].sync_count(), 1);
}

#[test]
fn test_detached_markers_are_ignored() {
    let mut doc = Document::new();
    let detached = doc.create_element("div");
    doc.set_attribute(detached, attributes::MARKER, "");
    let host = HeadlessHost::new(doc.into_shared());

    assert!(init_electric_borders(&host.document(), Rc::new(host.clone())).is_empty());
    assert!(!host.document().borrow().has_class(detached, "electric-border"));
}
