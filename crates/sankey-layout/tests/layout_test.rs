use sankey_core::FlowDataProcessor;
use sankey_layout::{Dimensions, LayoutConfig, LayoutResult, SankeyLayout, calculate_layout};
use serde_json::json;

fn budget_layout() -> LayoutResult {
    let raw = json!({
        "nodes": [
            {"id": "Salary", "value": 3000, "depth": 0},
            {"id": "Bonus", "value": 500, "depth": 0},
            {"id": "Budget", "value": 3500, "depth": 1},
            {"id": "Housing", "value": 1500, "depth": 2, "customOrder": 1},
            {"id": "Savings", "value": 1200, "depth": 2, "customOrder": 3},
            {"id": "Food", "value": 800, "depth": 2, "customOrder": 2},
            {"id": "Rent", "value": 1200, "depth": 3},
            {"id": "Utilities", "value": 300, "depth": 3}
        ],
        "links": [
            {"source": "Salary", "target": "Budget", "value": 3000},
            {"source": "Bonus", "target": "Budget", "value": 500},
            {"source": "Budget", "target": "Housing", "value": 1500},
            {"source": "Budget", "target": "Food", "value": 800},
            {"source": "Budget", "target": "Savings", "value": 1200},
            {"source": "Housing", "target": "Rent", "value": 1200},
            {"source": "Housing", "target": "Utilities", "value": 300}
        ]
    });
    let graph = FlowDataProcessor::default().process(&raw).expect("valid graph");
    let mut config = LayoutConfig::default();
    config.visual.node_height_scale = 0.1;
    config.visual.link_width_scale = 0.1;
    calculate_layout(&graph, Dimensions::new(1200.0, 800.0), &config).expect("layout")
}

#[test]
fn node_heights_respect_scale_and_minimum() {
    let out = budget_layout();
    for n in &out.nodes {
        assert!(n.height >= 5.0, "{}", n.id);
        assert!(n.height >= n.value * 0.1 - 1e-9, "{}", n.id);
    }
}

#[test]
fn link_slices_fill_every_node_side() {
    let out = budget_layout();
    for n in &out.nodes {
        if !n.source_links.is_empty() {
            let sum: f64 = n.source_links.iter().map(|&l| out.links[l].source_height).sum();
            assert!((sum - n.height).abs() < 1e-6, "outgoing of {}", n.id);
        }
        if !n.target_links.is_empty() {
            let sum: f64 = n.target_links.iter().map(|&l| out.links[l].target_height).sum();
            assert!((sum - n.height).abs() < 1e-6, "incoming of {}", n.id);
        }
    }
}

#[test]
fn deeper_nodes_sit_further_right() {
    let out = budget_layout();
    for a in &out.nodes {
        for b in &out.nodes {
            if a.depth < b.depth {
                assert!(a.x < b.x, "{} vs {}", a.id, b.id);
            }
        }
    }
}

#[test]
fn custom_order_wins_over_value() {
    let out = budget_layout();
    let housing = out.node("Housing").unwrap();
    let food = out.node("Food").unwrap();
    let savings = out.node("Savings").unwrap();
    assert!(housing.y < food.y);
    assert!(food.y < savings.y);
}

#[test]
fn nodes_in_a_column_never_overlap() {
    let out = budget_layout();
    for a in &out.nodes {
        for b in &out.nodes {
            if a.index != b.index && a.depth == b.depth && a.y <= b.y {
                assert!(a.bottom() <= b.y + 1e-9, "{} overlaps {}", a.id, b.id);
            }
        }
    }
}

#[test]
fn paths_run_from_source_edge_to_target_edge() {
    let out = budget_layout();
    for l in &out.links {
        let source = &out.nodes[l.source];
        let target = &out.nodes[l.target];
        assert_eq!(l.path.start.x, source.right());
        assert_eq!(l.path.end.x, target.x);
        assert!(l.path.svg_path_data().starts_with('M'));
    }
}

#[test]
fn two_node_scenario_on_800_by_600() {
    let raw = json!({
        "nodes": [
            {"id": "A", "value": 100, "depth": 0},
            {"id": "B", "value": 100, "depth": 1}
        ],
        "links": [{"source": "A", "target": "B", "value": 100}]
    });
    let out = sankey_layout::layout_json(
        &raw,
        Dimensions::new(800.0, 600.0),
        &LayoutConfig::default(),
    )
    .unwrap();
    let a = out.node("A").unwrap();
    let b = out.node("B").unwrap();
    assert!(a.x < b.x);
    assert!(a.height >= 5.0 && b.height >= 5.0);
}

#[test]
fn fan_out_siblings_stay_contiguous() {
    let nodes = vec![
        sankey_layout::NodeSpec::new("Root", 1010.0, 0),
        sankey_layout::NodeSpec::new("Big", 1000.0, 1),
        sankey_layout::NodeSpec::new("Mid", 9.0, 1),
        sankey_layout::NodeSpec::new("Small", 1.0, 1),
    ];
    let links = vec![
        sankey_layout::LinkSpec::new("Root", "Big", 1000.0),
        sankey_layout::LinkSpec::new("Root", "Mid", 9.0),
        sankey_layout::LinkSpec::new("Root", "Small", 1.0),
    ];
    let mut config = LayoutConfig::default();
    config.visual.node_height_scale = 0.3;
    let out = SankeyLayout::new(config)
        .calculate_layout(&nodes, &links, Dimensions::new(800.0, 600.0))
        .unwrap();

    let mut column: Vec<_> = out.nodes.iter().filter(|n| n.depth == 1).collect();
    column.sort_by(|a, b| a.y.total_cmp(&b.y));
    for pair in column.windows(2) {
        let gap = pair[1].y - pair[0].bottom();
        assert!((gap - 17.5).abs() < 1e-9, "gap {gap}");
    }
}

#[test]
fn layout_result_serializes_camel_case() {
    let out = budget_layout();
    let v = serde_json::to_value(&out).unwrap();
    assert!(v["layoutInfo"]["columnSpacing"].is_number());
    assert!(v["links"][0]["sourceHeight"].is_number());
    assert!(v["links"][0]["path"]["control1"]["x"].is_number());
    assert!(v["bounds"]["maxX"].is_number());
}
