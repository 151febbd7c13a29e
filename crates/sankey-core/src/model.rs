//! Arena-indexed flow graph model.
//!
//! Nodes and links live in flat vectors; relationships are stored as index lists so the graph
//! has no reference cycles and every processing stage can hand out an owned snapshot.

use crate::conservation::ConservationReport;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::cmp::Ordering;
use std::collections::BTreeMap;

pub const DEFAULT_CATEGORY: &str = "default";
pub const DEFAULT_LINK_TYPE: &str = "default";

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(pub usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LinkId(pub usize);

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlowNode {
    pub id: String,
    pub value: f64,
    pub depth: usize,
    pub category: String,
    pub custom_order: Option<f64>,
    pub parent_order: Option<f64>,
    /// Set by [`crate::normalize_node_values`] before `value` is rescaled.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_value: Option<f64>,

    pub source_links: Vec<LinkId>,
    pub target_links: Vec<LinkId>,
    pub total_inflow: f64,
    pub total_outflow: f64,
    pub flow_balance: f64,
}

impl FlowNode {
    pub fn new(id: impl Into<String>, value: f64, depth: usize) -> Self {
        Self {
            id: id.into(),
            value,
            depth,
            category: DEFAULT_CATEGORY.to_string(),
            custom_order: None,
            parent_order: None,
            original_value: None,
            source_links: Vec::new(),
            target_links: Vec::new(),
            total_inflow: 0.0,
            total_outflow: 0.0,
            flow_balance: 0.0,
        }
    }

    pub fn order_key(&self) -> OrderKey {
        OrderKey {
            custom_order: self.custom_order,
            parent_order: self.parent_order,
            value: self.value,
        }
    }

    pub fn is_orphan(&self) -> bool {
        self.source_links.is_empty() && self.target_links.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlowLink {
    pub source: NodeId,
    pub target: NodeId,
    pub source_id: String,
    pub target_id: String,
    pub value: f64,
    #[serde(rename = "type")]
    pub link_type: String,
}

/// Ordering key shared by data prep and layout for nodes within one depth.
///
/// Explicit `custom_order` ranks come first (present values win over absent ones), then
/// `parent_order`, then larger values first.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrderKey {
    pub custom_order: Option<f64>,
    pub parent_order: Option<f64>,
    pub value: f64,
}

impl OrderKey {
    pub fn cmp_order(&self, other: &Self) -> Ordering {
        cmp_explicit_rank(self.custom_order, other.custom_order)
            .then_with(|| cmp_explicit_rank(self.parent_order, other.parent_order))
            .then_with(|| f64_cmp(other.value, self.value))
    }
}

fn cmp_explicit_rank(a: Option<f64>, b: Option<f64>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => f64_cmp(a, b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

pub fn f64_cmp(a: f64, b: f64) -> Ordering {
    a.partial_cmp(&b).unwrap_or(Ordering::Equal)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessingReport {
    pub timestamp: DateTime<Utc>,
    pub node_count: usize,
    pub link_count: usize,
    /// Whether the conservation check ran.
    pub validated: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conservation: Option<ConservationReport>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessedGraph {
    pub nodes: Vec<FlowNode>,
    pub links: Vec<FlowLink>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color_scheme: Option<Value>,
    pub report: ProcessingReport,
}

impl ProcessedGraph {
    pub fn node(&self, id: NodeId) -> &FlowNode {
        &self.nodes[id.0]
    }

    pub fn link(&self, id: LinkId) -> &FlowLink {
        &self.links[id.0]
    }

    pub fn node_by_id(&self, id: &str) -> Option<&FlowNode> {
        self.nodes.iter().find(|n| n.id == id)
    }

    pub fn summary(&self) -> GraphSummary {
        let mut nodes_per_depth: BTreeMap<usize, usize> = BTreeMap::new();
        for n in &self.nodes {
            *nodes_per_depth.entry(n.depth).or_default() += 1;
        }
        GraphSummary {
            node_count: self.nodes.len(),
            link_count: self.links.len(),
            total_flow: self.links.iter().map(|l| l.value).sum(),
            depth_count: nodes_per_depth.len(),
            nodes_per_depth,
            source_count: self
                .nodes
                .iter()
                .filter(|n| n.target_links.is_empty() && !n.source_links.is_empty())
                .count(),
            sink_count: self
                .nodes
                .iter()
                .filter(|n| n.source_links.is_empty() && !n.target_links.is_empty())
                .count(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphSummary {
    pub node_count: usize,
    pub link_count: usize,
    pub total_flow: f64,
    pub depth_count: usize,
    pub nodes_per_depth: BTreeMap<usize, usize>,
    pub source_count: usize,
    pub sink_count: usize,
}

/// Recomputes `source_links`/`target_links` and the flow totals of every node from `links`.
pub fn build_relationships(nodes: &mut [FlowNode], links: &[FlowLink]) {
    for n in nodes.iter_mut() {
        n.source_links.clear();
        n.target_links.clear();
        n.total_inflow = 0.0;
        n.total_outflow = 0.0;
    }
    for (i, l) in links.iter().enumerate() {
        nodes[l.source.0].source_links.push(LinkId(i));
        nodes[l.source.0].total_outflow += l.value;
        nodes[l.target.0].target_links.push(LinkId(i));
        nodes[l.target.0].total_inflow += l.value;
    }
    for n in nodes.iter_mut() {
        n.flow_balance = n.total_inflow - n.total_outflow;
    }
}
