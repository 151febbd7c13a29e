//! Data-prep helpers that return rewritten copies of a processed graph.

use crate::model::{FlowNode, NodeId, ProcessedGraph, build_relationships};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ValueRange {
    pub min: f64,
    pub max: f64,
}

impl Default for ValueRange {
    fn default() -> Self {
        Self {
            min: 1.0,
            max: 100.0,
        }
    }
}

/// Linearly rescales node values into `target`.
///
/// The previous value is kept in `original_value`. When every node has the same value they all
/// map to the midpoint of the range.
pub fn normalize_node_values(nodes: &[FlowNode], target: ValueRange) -> Vec<FlowNode> {
    let (lo, hi) = nodes
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), n| {
            (lo.min(n.value), hi.max(n.value))
        });
    let span = hi - lo;

    nodes
        .iter()
        .map(|n| {
            let mut out = n.clone();
            out.original_value = Some(n.original_value.unwrap_or(n.value));
            out.value = if span > 0.0 {
                target.min + (n.value - lo) / span * (target.max - target.min)
            } else {
                (target.min + target.max) / 2.0
            };
            out
        })
        .collect()
}

/// Returns a copy with nodes ordered by depth and, inside each depth, by the canonical
/// custom-order / parent-order / value ordering. Link endpoints are remapped accordingly.
pub fn optimize_for_sankey(graph: &ProcessedGraph) -> ProcessedGraph {
    let mut order: Vec<usize> = (0..graph.nodes.len()).collect();
    order.sort_by(|&a, &b| {
        let (na, nb) = (&graph.nodes[a], &graph.nodes[b]);
        na.depth
            .cmp(&nb.depth)
            .then_with(|| na.order_key().cmp_order(&nb.order_key()))
    });

    let mut remap = vec![NodeId(0); graph.nodes.len()];
    for (new_idx, &old_idx) in order.iter().enumerate() {
        remap[old_idx] = NodeId(new_idx);
    }

    let mut nodes: Vec<FlowNode> = order.iter().map(|&i| graph.nodes[i].clone()).collect();
    let links: Vec<_> = graph
        .links
        .iter()
        .map(|l| {
            let mut l = l.clone();
            l.source = remap[l.source.0];
            l.target = remap[l.target.0];
            l
        })
        .collect();
    build_relationships(&mut nodes, &links);

    ProcessedGraph {
        nodes,
        links,
        metadata: graph.metadata.clone(),
        color_scheme: graph.color_scheme.clone(),
        report: graph.report.clone(),
    }
}
