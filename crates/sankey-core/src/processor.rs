use crate::conservation::validate_flow_conservation;
use crate::error::{
    Error, LinkProblem, LinkProblemKind, NodeProblem, NodeProblemKind, Result, StructureProblem,
};
use crate::model::{
    DEFAULT_CATEGORY, DEFAULT_LINK_TYPE, FlowLink, FlowNode, NodeId, ProcessedGraph,
    ProcessingReport, build_relationships,
};
use rustc_hash::{FxHashMap, FxHashSet};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ProcessorOptions {
    pub validate_flow_conservation: bool,
    pub allow_negative_values: bool,
    /// Absolute difference allowed between a node's value and its flow totals.
    pub tolerance: f64,
}

impl Default for ProcessorOptions {
    fn default() -> Self {
        Self {
            validate_flow_conservation: true,
            allow_negative_values: false,
            tolerance: 0.01,
        }
    }
}

/// Turns raw node/link JSON into a validated, cross-referenced [`ProcessedGraph`].
#[derive(Debug, Clone, Default)]
pub struct FlowDataProcessor {
    options: ProcessorOptions,
}

impl FlowDataProcessor {
    pub fn new(options: ProcessorOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &ProcessorOptions {
        &self.options
    }

    /// Validates and cross-references `raw`.
    ///
    /// Structural, node and link problems are fatal and reported all at once. Conservation
    /// violations are logged and recorded in the processing report but never fail the call.
    pub fn process(&self, raw: &Value) -> Result<ProcessedGraph> {
        let (raw_nodes, raw_links, root) = validate_structure(raw)?;

        let (mut nodes, node_index) = self.process_nodes(raw_nodes)?;
        let links = process_links(raw_links, &node_index)?;
        build_relationships(&mut nodes, &links);

        let mut graph = ProcessedGraph {
            report: ProcessingReport {
                timestamp: chrono::Utc::now(),
                node_count: nodes.len(),
                link_count: links.len(),
                validated: false,
                conservation: None,
            },
            nodes,
            links,
            metadata: root.get("metadata").cloned(),
            color_scheme: root.get("colorScheme").cloned(),
        };

        if self.options.validate_flow_conservation {
            let conservation = validate_flow_conservation(&graph, self.options.tolerance);
            for message in &conservation.errors {
                tracing::warn!(%message, "flow conservation violation");
            }
            for message in &conservation.warnings {
                tracing::debug!(%message, "flow conservation warning");
            }
            graph.report.validated = true;
            graph.report.conservation = Some(conservation);
        }

        tracing::debug!(
            nodes = graph.nodes.len(),
            links = graph.links.len(),
            "processed flow graph"
        );
        Ok(graph)
    }

    /// Convenience wrapper for callers holding JSON text.
    pub fn process_str(&self, json: &str) -> Result<ProcessedGraph> {
        let raw: Value = serde_json::from_str(json)?;
        self.process(&raw)
    }

    fn process_nodes(
        &self,
        raw_nodes: &[Value],
    ) -> Result<(Vec<FlowNode>, FxHashMap<String, NodeId>)> {
        let mut problems: Vec<NodeProblem> = Vec::new();
        let mut nodes: Vec<FlowNode> = Vec::with_capacity(raw_nodes.len());
        let mut node_index: FxHashMap<String, NodeId> = FxHashMap::default();
        // Every id seen so far, including ids of nodes that failed other checks.
        let mut seen_ids: FxHashSet<String> = FxHashSet::default();

        for (index, raw) in raw_nodes.iter().enumerate() {
            let mut push = |kind| problems.push(NodeProblem { index, kind });
            let Some(obj) = raw.as_object() else {
                push(NodeProblemKind::NotAnObject);
                continue;
            };

            let id = match obj.get("id") {
                None | Some(Value::Null) => {
                    push(NodeProblemKind::MissingField("id"));
                    None
                }
                Some(Value::String(s)) if s.trim().is_empty() => {
                    push(NodeProblemKind::EmptyId);
                    None
                }
                Some(Value::String(s)) => Some(s.clone()),
                Some(_) => {
                    push(NodeProblemKind::InvalidType {
                        field: "id",
                        expected: "string",
                    });
                    None
                }
            };

            let value = match obj.get("value") {
                None | Some(Value::Null) => {
                    push(NodeProblemKind::MissingField("value"));
                    None
                }
                Some(v) => match v.as_f64() {
                    Some(v) if v < 0.0 && !self.options.allow_negative_values => {
                        push(NodeProblemKind::NegativeValue(v));
                        None
                    }
                    Some(v) => Some(v),
                    None => {
                        push(NodeProblemKind::InvalidType {
                            field: "value",
                            expected: "number",
                        });
                        None
                    }
                },
            };

            let depth = match obj.get("depth") {
                None | Some(Value::Null) => {
                    push(NodeProblemKind::MissingField("depth"));
                    None
                }
                Some(v) => match parse_depth(v) {
                    Ok(d) => Some(d),
                    Err(kind) => {
                        push(kind);
                        None
                    }
                },
            };

            let category = match obj.get("category") {
                None | Some(Value::Null) => Some(DEFAULT_CATEGORY.to_string()),
                Some(Value::String(s)) => Some(s.clone()),
                Some(_) => {
                    push(NodeProblemKind::InvalidType {
                        field: "category",
                        expected: "string",
                    });
                    None
                }
            };

            let custom_order = optional_number(obj, "customOrder").unwrap_or_else(|kind| {
                push(kind);
                None
            });
            let parent_order = optional_number(obj, "parentOrder").unwrap_or_else(|kind| {
                push(kind);
                None
            });

            if let Some(id) = &id {
                if !seen_ids.insert(id.clone()) {
                    push(NodeProblemKind::DuplicateId(id.clone()));
                    continue;
                }
            }

            if let (Some(id), Some(value), Some(depth), Some(category)) =
                (id, value, depth, category)
            {
                node_index.insert(id.clone(), NodeId(nodes.len()));
                let mut node = FlowNode::new(id, value, depth);
                node.category = category;
                node.custom_order = custom_order;
                node.parent_order = parent_order;
                nodes.push(node);
            }
        }

        if !problems.is_empty() {
            return Err(Error::NodeValidation { problems });
        }
        Ok((nodes, node_index))
    }
}

fn validate_structure(raw: &Value) -> Result<(&[Value], &[Value], &Map<String, Value>)> {
    let Some(root) = raw.as_object() else {
        return Err(Error::Structure {
            problems: vec![StructureProblem::NotAnObject],
        });
    };

    let mut problems = Vec::new();
    let nodes = array_field(root, "nodes", &mut problems);
    let links = array_field(root, "links", &mut problems);

    match (nodes, links) {
        (Some(nodes), Some(links)) => Ok((nodes, links, root)),
        _ => Err(Error::Structure { problems }),
    }
}

fn array_field<'a>(
    root: &'a Map<String, Value>,
    field: &'static str,
    problems: &mut Vec<StructureProblem>,
) -> Option<&'a [Value]> {
    match root.get(field) {
        None | Some(Value::Null) => {
            problems.push(StructureProblem::MissingField(field));
            None
        }
        Some(Value::Array(items)) if items.is_empty() => {
            problems.push(StructureProblem::Empty(field));
            None
        }
        Some(Value::Array(items)) => Some(items.as_slice()),
        Some(_) => {
            problems.push(StructureProblem::NotAnArray(field));
            None
        }
    }
}

fn parse_depth(v: &Value) -> std::result::Result<usize, NodeProblemKind> {
    let invalid = NodeProblemKind::InvalidType {
        field: "depth",
        expected: "non-negative integer",
    };
    if let Some(d) = v.as_u64() {
        return usize::try_from(d).map_err(|_| invalid);
    }
    if v.as_i64().is_some_and(|d| d < 0) {
        return Err(NodeProblemKind::NegativeDepth);
    }
    match v.as_f64() {
        Some(d) if d < 0.0 => Err(NodeProblemKind::NegativeDepth),
        Some(d) if d.fract() == 0.0 && d <= usize::MAX as f64 => Ok(d as usize),
        _ => Err(invalid),
    }
}

fn optional_number(
    obj: &Map<String, Value>,
    field: &'static str,
) -> std::result::Result<Option<f64>, NodeProblemKind> {
    match obj.get(field) {
        None | Some(Value::Null) => Ok(None),
        Some(v) => v.as_f64().map(Some).ok_or(NodeProblemKind::InvalidType {
            field,
            expected: "number",
        }),
    }
}

/// Reads a link endpoint: either a node id string or an embedded node object carrying `id`.
fn endpoint_id(
    obj: &Map<String, Value>,
    field: &'static str,
) -> std::result::Result<String, LinkProblemKind> {
    match obj.get(field) {
        None | Some(Value::Null) => Err(LinkProblemKind::MissingField(field)),
        Some(Value::String(s)) => Ok(s.clone()),
        Some(Value::Object(node)) => match node.get("id") {
            Some(Value::String(s)) => Ok(s.clone()),
            _ => Err(LinkProblemKind::InvalidEndpoint(field)),
        },
        Some(_) => Err(LinkProblemKind::InvalidEndpoint(field)),
    }
}

fn process_links(
    raw_links: &[Value],
    node_index: &FxHashMap<String, NodeId>,
) -> Result<Vec<FlowLink>> {
    let mut problems: Vec<LinkProblem> = Vec::new();
    let mut links: Vec<FlowLink> = Vec::with_capacity(raw_links.len());

    for (index, raw) in raw_links.iter().enumerate() {
        let mut push = |kind| problems.push(LinkProblem { index, kind });
        let Some(obj) = raw.as_object() else {
            push(LinkProblemKind::NotAnObject);
            continue;
        };

        let source_id = endpoint_id(obj, "source").map_err(&mut push).ok();
        let target_id = endpoint_id(obj, "target").map_err(&mut push).ok();

        let value = match obj.get("value") {
            None | Some(Value::Null) => {
                push(LinkProblemKind::MissingField("value"));
                None
            }
            Some(v) => match v.as_f64() {
                Some(x) if x.is_finite() && x > 0.0 => Some(x),
                _ => {
                    push(LinkProblemKind::InvalidValue(v.to_string()));
                    None
                }
            },
        };

        let link_type = match obj.get("type") {
            Some(Value::String(s)) => s.clone(),
            _ => DEFAULT_LINK_TYPE.to_string(),
        };

        let source = source_id.as_ref().and_then(|id| {
            let found = node_index.get(id).copied();
            if found.is_none() {
                push(LinkProblemKind::SourceNotFound(id.clone()));
            }
            found
        });
        let target = target_id.as_ref().and_then(|id| {
            let found = node_index.get(id).copied();
            if found.is_none() {
                push(LinkProblemKind::TargetNotFound(id.clone()));
            }
            found
        });

        if let (Some(s), Some(t)) = (&source_id, &target_id) {
            if s == t {
                push(LinkProblemKind::SelfLoop(s.clone()));
                continue;
            }
        }

        if let (Some(source), Some(target), Some(value), Some(source_id), Some(target_id)) =
            (source, target, value, source_id, target_id)
        {
            links.push(FlowLink {
                source,
                target,
                source_id,
                target_id,
                value,
                link_type,
            });
        }
    }

    if !problems.is_empty() {
        return Err(Error::LinkValidation { problems });
    }
    Ok(links)
}
