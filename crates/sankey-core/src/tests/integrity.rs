use crate::*;
use serde_json::json;

#[test]
fn clean_graph_has_no_issues() {
    let g = process(&json!({
        "nodes": [
            {"id": "A", "value": 10, "depth": 0},
            {"id": "B", "value": 10, "depth": 1}
        ],
        "links": [{"source": "A", "target": "B", "value": 10}]
    }))
    .unwrap();
    let report = check_data_integrity(&g);
    assert!(report.is_clean());
    assert!(report.suggestions.is_empty());
}

#[test]
fn detects_gaps_orphans_and_value_blowups() {
    let g = process(&json!({
        "nodes": [
            {"id": "A", "value": 5000, "depth": 0},
            {"id": "B", "value": 5000, "depth": 3},
            {"id": "Tiny", "value": 2, "depth": 3},
            {"id": "Zero", "value": 0, "depth": 3}
        ],
        "links": [{"source": "A", "target": "B", "value": 5000}]
    }))
    .unwrap();
    let report = check_data_integrity(&g);
    assert_eq!(
        report.issues,
        vec![
            IntegrityIssue::DepthGap {
                missing: vec![1, 2]
            },
            IntegrityIssue::OrphanedNodes {
                ids: vec!["Tiny".to_string(), "Zero".to_string()]
            },
            IntegrityIssue::ValueRange {
                min: 2.0,
                max: 5000.0,
                ratio: 2500.0
            },
        ]
    );
    assert_eq!(report.suggestions.len(), 3);
    assert!(report.issues[0].to_string().contains("no nodes at depth 1, 2"));
}
