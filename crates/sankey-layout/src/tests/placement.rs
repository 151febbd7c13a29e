use super::{approx, layout_with, two_node};
use crate::placement::{ColumnPosition, column_gaps};
use crate::*;

fn fan_out() -> (Vec<NodeSpec>, Vec<LinkSpec>) {
    (
        vec![
            NodeSpec::new("P", 260.0, 0),
            NodeSpec::new("C3", 10.0, 1),
            NodeSpec::new("C1", 200.0, 1),
            NodeSpec::new("C2", 50.0, 1),
        ],
        vec![
            LinkSpec::new("P", "C1", 200.0),
            LinkSpec::new("P", "C2", 50.0),
            LinkSpec::new("P", "C3", 10.0),
        ],
    )
}

#[test]
fn siblings_of_one_parent_form_a_single_cluster() {
    let (nodes, links) = fan_out();
    let out = layout_with(LayoutConfig::default(), &nodes, &links);

    let c1 = out.node("C1").unwrap();
    let c2 = out.node("C2").unwrap();
    let c3 = out.node("C3").unwrap();
    // 130 + 32.5 + 6.5 + 2 * 17.5 stacked, a quarter of the free space above.
    assert!(approx(c1.y, 99.0));
    assert!(approx(c2.y - c1.bottom(), 17.5));
    assert!(approx(c3.y - c2.bottom(), 17.5));
}

#[test]
fn clusters_are_separated_by_the_cluster_gap() {
    let nodes = vec![
        NodeSpec::new("P1", 80.0, 0),
        NodeSpec::new("P2", 40.0, 0),
        NodeSpec::new("X", 50.0, 1),
        NodeSpec::new("Y", 40.0, 1),
        NodeSpec::new("Z", 30.0, 1),
    ];
    let links = vec![
        LinkSpec::new("P1", "X", 50.0),
        LinkSpec::new("P2", "Y", 40.0),
        LinkSpec::new("P1", "Z", 30.0),
    ];
    let out = layout_with(LayoutConfig::default(), &nodes, &links);

    let x = out.node("X").unwrap();
    let y = out.node("Y").unwrap();
    let z = out.node("Z").unwrap();
    assert!(x.y < z.y && z.y < y.y);
    assert!(approx(z.y - x.bottom(), 17.5));
    assert!(approx(y.y - z.bottom(), 20.0));
}

#[test]
fn explicit_custom_order_is_never_regrouped() {
    let nodes = vec![
        NodeSpec::new("P1", 80.0, 0),
        NodeSpec::new("P2", 40.0, 0),
        NodeSpec::new("X", 50.0, 1).with_custom_order(1.0),
        NodeSpec::new("Y", 40.0, 1).with_custom_order(2.0),
        NodeSpec::new("Z", 30.0, 1).with_custom_order(3.0),
    ];
    let links = vec![
        LinkSpec::new("P1", "X", 50.0),
        LinkSpec::new("P2", "Y", 40.0),
        LinkSpec::new("P1", "Z", 30.0),
    ];
    let out = layout_with(LayoutConfig::default(), &nodes, &links);

    let x = out.node("X").unwrap();
    let y = out.node("Y").unwrap();
    let z = out.node("Z").unwrap();
    assert!(x.y < y.y && y.y < z.y);
}

#[test]
fn middle_columns_use_middle_gaps() {
    let nodes = vec![
        NodeSpec::new("S", 100.0, 0),
        NodeSpec::new("M1", 60.0, 1),
        NodeSpec::new("M2", 40.0, 1),
        NodeSpec::new("T", 100.0, 2),
    ];
    let links = vec![
        LinkSpec::new("S", "M1", 60.0),
        LinkSpec::new("S", "M2", 40.0),
        LinkSpec::new("M1", "T", 60.0),
        LinkSpec::new("M2", "T", 40.0),
    ];
    let out = layout_with(LayoutConfig::default(), &nodes, &links);
    let m1 = out.node("M1").unwrap();
    let m2 = out.node("M2").unwrap();
    assert!(approx(m2.y - m1.bottom(), 22.5));
}

#[test]
fn leftmost_column_is_one_stack() {
    let nodes = vec![
        NodeSpec::new("A", 50.0, 0),
        NodeSpec::new("B", 100.0, 0),
        NodeSpec::new("T", 150.0, 1),
    ];
    let links = vec![LinkSpec::new("A", "T", 50.0), LinkSpec::new("B", "T", 100.0)];
    let out = layout_with(LayoutConfig::default(), &nodes, &links);
    let a = out.node("A").unwrap();
    let b = out.node("B").unwrap();
    assert!(b.y < a.y);
    assert!(approx(a.y - b.bottom(), 30.0));
}

#[test]
fn middle_align_centers_the_stack() {
    let mut cfg = LayoutConfig::default();
    cfg.auto_features.auto_middle_align = true;
    let nodes = vec![NodeSpec::new("A", 100.0, 0)];
    let out = layout_with(cfg, &nodes, &[]);
    assert!(approx(out.nodes[0].y, (600.0 - 65.0) / 2.0));
}

#[test]
fn narrow_canvas_keeps_columns_in_depth_order() {
    let (nodes, links) = two_node();
    let out = SankeyLayout::default()
        .calculate_layout(&nodes, &links, Dimensions::new(24.0, 600.0))
        .unwrap();
    let a = out.node("A").unwrap();
    let b = out.node("B").unwrap();
    assert!(a.x < b.x, "{} vs {}", a.x, b.x);
    assert!(approx(b.x - a.x, 24.0 * 0.82));
    assert!(out.layout_info.column_spacing > 0.0);
}

#[test]
fn top_margin_wins_when_content_is_tall() {
    let nodes = vec![NodeSpec::new("A", 800.0, 0)];
    let out = layout_with(LayoutConfig::default(), &nodes, &[]);
    assert!(approx(out.nodes[0].y, 40.0));
}

#[test]
fn cluster_gap_never_drops_below_node_padding_fraction() {
    let mut cfg = LayoutConfig::default();
    cfg.layout.node_padding = 50.0;
    let (node_gap, cluster_gap) = column_gaps(ColumnPosition::Rightmost, &cfg);
    assert!(approx(node_gap, 35.0));
    assert!(approx(cluster_gap, 40.0));

    let (node_gap, cluster_gap) = column_gaps(ColumnPosition::Leftmost, &cfg);
    assert!(approx(node_gap, 60.0));
    assert!(approx(cluster_gap, 60.0));
}
