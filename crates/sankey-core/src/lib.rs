#![forbid(unsafe_code)]

//! Flow graph processing for Sankey diagrams (headless).
//!
//! Raw node/link documents go in, a validated arena-indexed [`ProcessedGraph`] comes out.
//! Validation collects every structural, node and link problem before failing so a data editor
//! can show them all at once. Flow conservation and integrity findings never fail processing;
//! they are returned as reports.

pub mod conservation;
pub mod diagnostics;
pub mod error;
pub mod flow_list;
pub mod integrity;
pub mod model;
pub mod prep;
pub mod processor;

pub use conservation::{
    ConservationReport, ConservationSummary, FlowRole, NodeFlowReport, validate_flow_conservation,
};
pub use diagnostics::{
    Diagnostic, DiagnosticReport, FlowReport, Severity, generate_error_report,
    generate_flow_report, suggest_fixes,
};
pub use error::{
    Error, LinkProblem, LinkProblemKind, NodeProblem, NodeProblemKind, Result, StructureProblem,
};
pub use flow_list::{FlowRow, parse_flow_list, parse_flow_rows};
pub use integrity::{IntegrityIssue, IntegrityReport, check_data_integrity};
pub use model::{
    FlowLink, FlowNode, GraphSummary, LinkId, NodeId, OrderKey, ProcessedGraph, ProcessingReport,
};
pub use prep::{ValueRange, normalize_node_values, optimize_for_sankey};
pub use processor::{FlowDataProcessor, ProcessorOptions};

/// Processes `raw` with default options.
pub fn process(raw: &serde_json::Value) -> Result<ProcessedGraph> {
    FlowDataProcessor::default().process(raw)
}
