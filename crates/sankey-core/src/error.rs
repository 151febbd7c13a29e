use std::fmt;

pub type Result<T> = std::result::Result<T, Error>;

/// Fatal processing failures.
///
/// Validation collects every problem it can find before failing, so the structure, node and
/// link variants each carry the complete list; `Display` renders one problem per line.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("invalid flow graph structure:\n{}", join_lines(.problems))]
    Structure { problems: Vec<StructureProblem> },

    #[error("node validation failed:\n{}", join_lines(.problems))]
    NodeValidation { problems: Vec<NodeProblem> },

    #[error("link validation failed:\n{}", join_lines(.problems))]
    LinkValidation { problems: Vec<LinkProblem> },

    #[error("flow list parse error (line {line}): {message}")]
    FlowList { line: usize, message: String },

    #[error("circular flow detected at node '{node}'")]
    CircularFlow { node: String },

    #[error("flow graph JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Human-readable problem lines, one per offending element.
    pub fn problem_lines(&self) -> Vec<String> {
        match self {
            Error::Structure { problems } => problems.iter().map(ToString::to_string).collect(),
            Error::NodeValidation { problems } => {
                problems.iter().map(ToString::to_string).collect()
            }
            Error::LinkValidation { problems } => {
                problems.iter().map(ToString::to_string).collect()
            }
            other => vec![other.to_string()],
        }
    }
}

fn join_lines<T: fmt::Display>(items: &[T]) -> String {
    items
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("\n")
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StructureProblem {
    NotAnObject,
    MissingField(&'static str),
    NotAnArray(&'static str),
    Empty(&'static str),
}

impl fmt::Display for StructureProblem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StructureProblem::NotAnObject => write!(f, "input must be an object"),
            StructureProblem::MissingField(field) => write!(f, "missing required field '{field}'"),
            StructureProblem::NotAnArray(field) => write!(f, "'{field}' must be an array"),
            StructureProblem::Empty(field) => write!(f, "'{field}' must not be empty"),
        }
    }
}

impl StructureProblem {
    pub fn hint(&self) -> &'static str {
        match self {
            StructureProblem::NotAnObject => {
                "Provide a JSON object with 'nodes' and 'links' arrays"
            }
            StructureProblem::MissingField(_) | StructureProblem::NotAnArray(_) => {
                "Add the 'nodes' and 'links' arrays at the top level of the input"
            }
            StructureProblem::Empty(_) => {
                "A Sankey diagram needs at least one node and one link"
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct NodeProblem {
    pub index: usize,
    pub kind: NodeProblemKind,
}

#[derive(Debug, Clone, PartialEq)]
pub enum NodeProblemKind {
    NotAnObject,
    MissingField(&'static str),
    InvalidType {
        field: &'static str,
        expected: &'static str,
    },
    EmptyId,
    NegativeValue(f64),
    NegativeDepth,
    DuplicateId(String),
}

impl fmt::Display for NodeProblem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Node {}: ", self.index)?;
        match &self.kind {
            NodeProblemKind::NotAnObject => write!(f, "must be an object"),
            NodeProblemKind::MissingField(field) => write!(f, "missing required field '{field}'"),
            NodeProblemKind::InvalidType { field, expected } => {
                write!(f, "field '{field}' must be a {expected}")
            }
            NodeProblemKind::EmptyId => write!(f, "'id' must not be empty"),
            NodeProblemKind::NegativeValue(v) => {
                write!(f, "value must be non-negative (got {v})")
            }
            NodeProblemKind::NegativeDepth => write!(f, "depth must be non-negative"),
            NodeProblemKind::DuplicateId(id) => write!(f, "Duplicate node ID: '{id}'"),
        }
    }
}

impl NodeProblem {
    pub fn hint(&self) -> &'static str {
        match self.kind {
            NodeProblemKind::NotAnObject | NodeProblemKind::MissingField(_) => {
                "Every node needs an 'id', a numeric 'value' and an integer 'depth'"
            }
            NodeProblemKind::InvalidType { .. } | NodeProblemKind::EmptyId => {
                "Check node field types: 'id' is text, 'value' and 'depth' are numbers"
            }
            NodeProblemKind::NegativeValue(_) => {
                "Use non-negative node values, or enable negative values explicitly"
            }
            NodeProblemKind::NegativeDepth => "Depths start at 0 for the leftmost column",
            NodeProblemKind::DuplicateId(_) => "Rename or merge nodes that share the same id",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LinkProblem {
    pub index: usize,
    pub kind: LinkProblemKind,
}

#[derive(Debug, Clone, PartialEq)]
pub enum LinkProblemKind {
    NotAnObject,
    MissingField(&'static str),
    InvalidEndpoint(&'static str),
    InvalidValue(String),
    SourceNotFound(String),
    TargetNotFound(String),
    SelfLoop(String),
}

impl fmt::Display for LinkProblem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Link {}: ", self.index)?;
        match &self.kind {
            LinkProblemKind::NotAnObject => write!(f, "must be an object"),
            LinkProblemKind::MissingField(field) => write!(f, "missing required field '{field}'"),
            LinkProblemKind::InvalidEndpoint(field) => {
                write!(f, "'{field}' must be a node id or an object with an 'id'")
            }
            LinkProblemKind::InvalidValue(raw) => {
                write!(f, "value must be a positive finite number (got {raw})")
            }
            LinkProblemKind::SourceNotFound(id) => write!(f, "source node '{id}' not found"),
            LinkProblemKind::TargetNotFound(id) => write!(f, "target node '{id}' not found"),
            LinkProblemKind::SelfLoop(id) => {
                write!(f, "self-loop not allowed ('{id}' -> '{id}')")
            }
        }
    }
}

impl LinkProblem {
    pub fn hint(&self) -> &'static str {
        match self.kind {
            LinkProblemKind::NotAnObject | LinkProblemKind::MissingField(_) => {
                "Every link needs a 'source', a 'target' and a positive 'value'"
            }
            LinkProblemKind::InvalidEndpoint(_) => "Refer to link endpoints by node id",
            LinkProblemKind::InvalidValue(_) => {
                "Remove zero-valued links or correct their value to a positive number"
            }
            LinkProblemKind::SourceNotFound(_) | LinkProblemKind::TargetNotFound(_) => {
                "Add the missing node or fix the spelling of the link endpoint"
            }
            LinkProblemKind::SelfLoop(_) => {
                "Route the flow through a separate node instead of linking a node to itself"
            }
        }
    }
}
