//! Flow conservation checks.
//!
//! Each node is classified by which side of it carries flow:
//! - source: no inflow, outflow must match the node value
//! - sink: no outflow, inflow must match the node value
//! - intermediate: inflow must match outflow
//! - isolated: neither side carries flow; reported as a warning only
//!
//! The tolerance is an absolute difference, not a percentage of the node value.

use crate::model::{FlowNode, ProcessedGraph};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FlowRole {
    Source,
    Sink,
    Intermediate,
    Isolated,
}

impl FlowRole {
    pub fn classify(node: &FlowNode) -> Self {
        match (node.total_inflow > 0.0, node.total_outflow > 0.0) {
            (false, true) => FlowRole::Source,
            (true, false) => FlowRole::Sink,
            (true, true) => FlowRole::Intermediate,
            (false, false) => FlowRole::Isolated,
        }
    }
}

impl fmt::Display for FlowRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            FlowRole::Source => "source",
            FlowRole::Sink => "sink",
            FlowRole::Intermediate => "intermediate",
            FlowRole::Isolated => "isolated",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeFlowReport {
    pub id: String,
    pub role: FlowRole,
    pub value: f64,
    pub inflow: f64,
    pub outflow: f64,
    /// Absolute gap between the compared quantities (0 for isolated nodes).
    pub difference: f64,
    pub balanced: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConservationSummary {
    pub total_nodes: usize,
    pub sources: usize,
    pub sinks: usize,
    pub intermediates: usize,
    pub isolated: usize,
    pub balanced: usize,
    pub unbalanced: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConservationReport {
    pub valid: bool,
    pub tolerance: f64,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
    pub node_reports: Vec<NodeFlowReport>,
    pub summary: ConservationSummary,
}

impl ConservationReport {
    pub fn unbalanced(&self) -> impl Iterator<Item = &NodeFlowReport> {
        self.node_reports.iter().filter(|r| !r.balanced)
    }
}

pub fn validate_flow_conservation(graph: &ProcessedGraph, tolerance: f64) -> ConservationReport {
    let mut errors = Vec::new();
    let mut warnings = Vec::new();
    let mut summary = ConservationSummary {
        total_nodes: graph.nodes.len(),
        ..Default::default()
    };
    let mut node_reports = Vec::with_capacity(graph.nodes.len());

    for node in &graph.nodes {
        let role = FlowRole::classify(node);
        let (expected, actual, label) = match role {
            FlowRole::Source => (node.value, node.total_outflow, "outflow"),
            FlowRole::Sink => (node.value, node.total_inflow, "inflow"),
            FlowRole::Intermediate => (node.total_outflow, node.total_inflow, "inflow"),
            FlowRole::Isolated => (0.0, 0.0, ""),
        };
        let difference = (actual - expected).abs();
        let balanced = difference <= tolerance;

        match role {
            FlowRole::Source => summary.sources += 1,
            FlowRole::Sink => summary.sinks += 1,
            FlowRole::Intermediate => summary.intermediates += 1,
            FlowRole::Isolated => summary.isolated += 1,
        }

        match role {
            FlowRole::Isolated => {
                warnings.push(format!("Node '{}' is isolated (no inflow or outflow)", node.id));
            }
            FlowRole::Intermediate if !balanced => {
                errors.push(format!(
                    "Node '{}' (intermediate): inflow {} does not match outflow {} (difference {})",
                    node.id, node.total_inflow, node.total_outflow, difference
                ));
            }
            FlowRole::Source | FlowRole::Sink if !balanced => {
                errors.push(format!(
                    "Node '{}' ({role}): {label} {actual} does not match node value {expected} (difference {difference})",
                    node.id
                ));
            }
            _ => {}
        }

        if balanced {
            summary.balanced += 1;
        } else {
            summary.unbalanced += 1;
        }

        node_reports.push(NodeFlowReport {
            id: node.id.clone(),
            role,
            value: node.value,
            inflow: node.total_inflow,
            outflow: node.total_outflow,
            difference,
            balanced,
        });
    }

    ConservationReport {
        valid: errors.is_empty(),
        tolerance,
        errors,
        warnings,
        node_reports,
        summary,
    }
}
