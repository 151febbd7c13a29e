use crate::model::ProcessedGraph;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// Largest tolerated ratio between the biggest and smallest positive node value.
pub const MAX_VALUE_RATIO: f64 = 1000.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum IntegrityIssue {
    DepthGap { missing: Vec<usize> },
    OrphanedNodes { ids: Vec<String> },
    ValueRange { min: f64, max: f64, ratio: f64 },
}

impl fmt::Display for IntegrityIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IntegrityIssue::DepthGap { missing } => {
                let list = missing
                    .iter()
                    .map(ToString::to_string)
                    .collect::<Vec<_>>()
                    .join(", ");
                write!(f, "depth sequence has gaps: no nodes at depth {list}")
            }
            IntegrityIssue::OrphanedNodes { ids } => {
                write!(f, "orphaned nodes without any links: {}", ids.join(", "))
            }
            IntegrityIssue::ValueRange { min, max, ratio } => write!(
                f,
                "node values span a very wide range ({min} to {max}, ratio {ratio:.0}:1)"
            ),
        }
    }
}

impl IntegrityIssue {
    pub fn suggestion(&self) -> String {
        match self {
            IntegrityIssue::DepthGap { .. } => {
                "Renumber depths so columns are consecutive starting at 0".to_string()
            }
            IntegrityIssue::OrphanedNodes { ids } => format!(
                "Connect or remove the {} orphaned node(s); they render as floating boxes",
                ids.len()
            ),
            IntegrityIssue::ValueRange { .. } => {
                "Consider normalizing node values or splitting the diagram; small flows will be barely visible"
                    .to_string()
            }
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IntegrityReport {
    pub issues: Vec<IntegrityIssue>,
    pub suggestions: Vec<String>,
}

impl IntegrityReport {
    pub fn is_clean(&self) -> bool {
        self.issues.is_empty()
    }
}

/// Advisory structural checks. Never fails; an empty report means nothing was found.
pub fn check_data_integrity(graph: &ProcessedGraph) -> IntegrityReport {
    let mut issues = Vec::new();

    let depths: BTreeSet<usize> = graph.nodes.iter().map(|n| n.depth).collect();
    if let Some(&max_depth) = depths.last() {
        let missing: Vec<usize> = (0..=max_depth).filter(|d| !depths.contains(d)).collect();
        if !missing.is_empty() {
            issues.push(IntegrityIssue::DepthGap { missing });
        }
    }

    let orphans: Vec<String> = graph
        .nodes
        .iter()
        .filter(|n| n.is_orphan())
        .map(|n| n.id.clone())
        .collect();
    if !orphans.is_empty() {
        issues.push(IntegrityIssue::OrphanedNodes { ids: orphans });
    }

    let positive = graph.nodes.iter().map(|n| n.value).filter(|v| *v > 0.0);
    let (min, max) = positive.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
        (lo.min(v), hi.max(v))
    });
    if min.is_finite() && max.is_finite() {
        let ratio = max / min;
        if ratio > MAX_VALUE_RATIO {
            issues.push(IntegrityIssue::ValueRange { min, max, ratio });
        }
    }

    let suggestions = issues.iter().map(IntegrityIssue::suggestion).collect();
    IntegrityReport {
        issues,
        suggestions,
    }
}
