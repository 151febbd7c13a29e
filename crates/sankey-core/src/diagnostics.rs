//! Triage-style diagnostics for data editors: critical problems, warnings and suggestions.

use crate::conservation::{ConservationReport, FlowRole, validate_flow_conservation};
use crate::error::Error;
use crate::integrity::{IntegrityReport, check_data_integrity};
use crate::model::{GraphSummary, ProcessedGraph};
use indexmap::IndexSet;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Severity {
    Critical,
    Warning,
    Suggestion,
}

impl Severity {
    fn heading(self) -> &'static str {
        match self {
            Severity::Critical => "Critical",
            Severity::Warning => "Warnings",
            Severity::Suggestion => "Suggestions",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Diagnostic {
    pub severity: Severity,
    pub message: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DiagnosticReport {
    pub diagnostics: Vec<Diagnostic>,
}

impl DiagnosticReport {
    fn from_entries(entries: IndexSet<Diagnostic>) -> Self {
        let mut diagnostics: Vec<Diagnostic> = entries.into_iter().collect();
        diagnostics.sort_by_key(|d| d.severity);
        Self { diagnostics }
    }

    pub fn with_severity(&self, severity: Severity) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics
            .iter()
            .filter(move |d| d.severity == severity)
    }

    pub fn has_critical(&self) -> bool {
        self.with_severity(Severity::Critical).next().is_some()
    }

    pub fn is_empty(&self) -> bool {
        self.diagnostics.is_empty()
    }
}

impl fmt::Display for DiagnosticReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.diagnostics.is_empty() {
            return writeln!(f, "No issues found.");
        }
        for severity in [Severity::Critical, Severity::Warning, Severity::Suggestion] {
            let mut entries = self.with_severity(severity).peekable();
            if entries.peek().is_none() {
                continue;
            }
            writeln!(f, "{}:", severity.heading())?;
            for d in entries {
                writeln!(f, "  - {}", d.message)?;
            }
        }
        Ok(())
    }
}

/// Turns a processing failure into a report listing every problem with a matching fix hint.
pub fn generate_error_report(err: &Error) -> DiagnosticReport {
    let mut entries: IndexSet<Diagnostic> = IndexSet::new();
    let mut critical = |message: String, hint: &str| {
        entries.insert(Diagnostic {
            severity: Severity::Critical,
            message,
        });
        entries.insert(Diagnostic {
            severity: Severity::Suggestion,
            message: hint.to_string(),
        });
    };

    match err {
        Error::Structure { problems } => {
            for p in problems {
                critical(p.to_string(), p.hint());
            }
        }
        Error::NodeValidation { problems } => {
            for p in problems {
                critical(p.to_string(), p.hint());
            }
        }
        Error::LinkValidation { problems } => {
            for p in problems {
                critical(p.to_string(), p.hint());
            }
        }
        Error::FlowList { .. } => critical(
            err.to_string(),
            "Each flow row needs three columns: source, target, value",
        ),
        Error::CircularFlow { .. } => critical(
            err.to_string(),
            "Sankey flows must run in one direction; break the cycle with a separate node",
        ),
        Error::Json(_) => critical(err.to_string(), "Check the input is well-formed JSON"),
    }

    DiagnosticReport::from_entries(entries)
}

/// Derives warnings and fix suggestions from the non-fatal reports.
pub fn suggest_fixes(
    conservation: &ConservationReport,
    integrity: &IntegrityReport,
) -> DiagnosticReport {
    let mut entries: IndexSet<Diagnostic> = IndexSet::new();
    let mut add = |severity, message: String| {
        entries.insert(Diagnostic { severity, message });
    };

    for r in conservation.unbalanced() {
        match r.role {
            FlowRole::Source => {
                add(
                    Severity::Warning,
                    format!("'{}' sends {} but is worth {}", r.id, r.outflow, r.value),
                );
                add(
                    Severity::Suggestion,
                    format!(
                        "Set the value of '{}' to {} or adjust its outgoing flows",
                        r.id, r.outflow
                    ),
                );
            }
            FlowRole::Sink => {
                add(
                    Severity::Warning,
                    format!("'{}' receives {} but is worth {}", r.id, r.inflow, r.value),
                );
                add(
                    Severity::Suggestion,
                    format!(
                        "Set the value of '{}' to {} or adjust its incoming flows",
                        r.id, r.inflow
                    ),
                );
            }
            FlowRole::Intermediate => {
                add(
                    Severity::Warning,
                    format!("'{}' receives {} but sends {}", r.id, r.inflow, r.outflow),
                );
                let gap = r.inflow - r.outflow;
                let fix = if gap > 0.0 {
                    format!("Add an outgoing flow of {gap} from '{}'", r.id)
                } else {
                    format!("Add an incoming flow of {} into '{}'", -gap, r.id)
                };
                add(Severity::Suggestion, fix);
            }
            FlowRole::Isolated => {}
        }
    }

    for w in &conservation.warnings {
        add(Severity::Warning, w.clone());
    }

    for (issue, suggestion) in integrity.issues.iter().zip(&integrity.suggestions) {
        add(Severity::Warning, issue.to_string());
        add(Severity::Suggestion, suggestion.clone());
    }

    DiagnosticReport::from_entries(entries)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlowReport {
    pub summary: GraphSummary,
    pub conservation: ConservationReport,
    pub integrity: IntegrityReport,
    pub diagnostics: DiagnosticReport,
}

impl fmt::Display for FlowReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = &self.summary;
        writeln!(
            f,
            "Flow graph: {} nodes, {} links, {} depth(s), total flow {}",
            s.node_count, s.link_count, s.depth_count, s.total_flow
        )?;
        for (depth, count) in &s.nodes_per_depth {
            writeln!(f, "  depth {depth}: {count} node(s)")?;
        }
        let c = &self.conservation.summary;
        writeln!(
            f,
            "Conservation: {} ({} balanced, {} unbalanced; {} sources, {} sinks, {} intermediate, {} isolated)",
            if self.conservation.valid { "ok" } else { "violated" },
            c.balanced,
            c.unbalanced,
            c.sources,
            c.sinks,
            c.intermediates,
            c.isolated
        )?;
        write!(f, "{}", self.diagnostics)
    }
}

pub fn generate_flow_report(graph: &ProcessedGraph, tolerance: f64) -> FlowReport {
    let conservation = validate_flow_conservation(graph, tolerance);
    let integrity = check_data_integrity(graph);
    let diagnostics = suggest_fixes(&conservation, &integrity);
    FlowReport {
        summary: graph.summary(),
        conservation,
        integrity,
        diagnostics,
    }
}
