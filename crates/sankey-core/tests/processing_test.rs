use sankey_core::{Error, FlowDataProcessor, validate_flow_conservation};
use serde_json::{Value, json};

fn two_node_graph(link_value: f64) -> Value {
    json!({
        "nodes": [
            {"id": "A", "value": 100, "depth": 0},
            {"id": "B", "value": 100, "depth": 1}
        ],
        "links": [{"source": "A", "target": "B", "value": link_value}]
    })
}

#[test]
fn two_node_graph_is_conserved() {
    let g = FlowDataProcessor::default()
        .process(&two_node_graph(100.0))
        .expect("process ok");
    let report = validate_flow_conservation(&g, 0.01);
    assert!(report.valid);
    assert!(report.errors.is_empty());
}

#[test]
fn half_flow_fails_conservation_for_both_nodes() {
    let g = FlowDataProcessor::default()
        .process(&two_node_graph(50.0))
        .expect("conservation problems are not fatal");
    let report = validate_flow_conservation(&g, 0.01);
    assert!(!report.valid);
    assert_eq!(report.errors.len(), 2);
    assert!(report.errors.iter().any(|e| e.contains("'A'")));
    assert!(report.errors.iter().any(|e| e.contains("'B'")));
}

#[test]
fn unknown_target_is_reported_by_name() {
    let raw = json!({
        "nodes": [{"id": "A", "value": 10, "depth": 0}],
        "links": [{"source": "A", "target": "Z", "value": 10}]
    });
    let err = FlowDataProcessor::default().process(&raw).unwrap_err();
    assert!(matches!(err, Error::LinkValidation { .. }));
    assert!(err.to_string().contains("target node 'Z' not found"));
}

#[test]
fn duplicate_ids_are_rejected() {
    let raw = json!({
        "nodes": [
            {"id": "A", "value": 10, "depth": 0},
            {"id": "A", "value": 10, "depth": 1}
        ],
        "links": [{"source": "A", "target": "A", "value": 10}]
    });
    let err = FlowDataProcessor::default().process(&raw).unwrap_err();
    assert!(err.to_string().contains("Duplicate node ID: 'A'"));
}

#[test]
fn self_loops_are_rejected() {
    let raw = json!({
        "nodes": [
            {"id": "A", "value": 5, "depth": 0},
            {"id": "B", "value": 5, "depth": 1}
        ],
        "links": [
            {"source": "A", "target": "B", "value": 5},
            {"source": "A", "target": "A", "value": 5}
        ]
    });
    let err = FlowDataProcessor::default().process(&raw).unwrap_err();
    let text = err.to_string();
    assert!(text.contains("self-loop not allowed"), "{text}");
    assert!(text.contains("Link 1"), "{text}");
    assert_eq!(err.problem_lines().len(), 1);
}

#[test]
fn processed_graph_serializes_with_string_endpoints() {
    let g = FlowDataProcessor::default()
        .process(&two_node_graph(100.0))
        .unwrap();
    let v = serde_json::to_value(&g).unwrap();
    assert_eq!(v["links"][0]["sourceId"], json!("A"));
    assert_eq!(v["links"][0]["targetId"], json!("B"));
    assert_eq!(v["nodes"][0]["totalOutflow"], json!(100.0));
    assert_eq!(v["report"]["validated"], json!(true));
}
