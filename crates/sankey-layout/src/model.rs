use sankey_core::{FlowLink, FlowNode, NodeId, OrderKey};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Dimensions {
    pub width: f64,
    pub height: f64,
}

impl Dimensions {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

/// A node as handed to the layout engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeSpec {
    pub id: String,
    pub value: f64,
    pub depth: usize,
    #[serde(default = "default_category")]
    pub category: String,
    #[serde(default)]
    pub custom_order: Option<f64>,
    #[serde(default)]
    pub parent_order: Option<f64>,
}

fn default_category() -> String {
    "default".to_string()
}

impl NodeSpec {
    pub fn new(id: impl Into<String>, value: f64, depth: usize) -> Self {
        Self {
            id: id.into(),
            value,
            depth,
            category: default_category(),
            custom_order: None,
            parent_order: None,
        }
    }

    pub fn with_custom_order(mut self, order: f64) -> Self {
        self.custom_order = Some(order);
        self
    }

    pub fn with_parent_order(mut self, order: f64) -> Self {
        self.parent_order = Some(order);
        self
    }
}

impl From<&FlowNode> for NodeSpec {
    fn from(n: &FlowNode) -> Self {
        Self {
            id: n.id.clone(),
            value: n.value,
            depth: n.depth,
            category: n.category.clone(),
            custom_order: n.custom_order,
            parent_order: n.parent_order,
        }
    }
}

/// A link endpoint before resolution: a node id, or an index into the node list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Endpoint {
    Id(String),
    Node(NodeId),
}

impl From<&str> for Endpoint {
    fn from(id: &str) -> Self {
        Endpoint::Id(id.to_string())
    }
}

impl From<NodeId> for Endpoint {
    fn from(id: NodeId) -> Self {
        Endpoint::Node(id)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkSpec {
    pub source: Endpoint,
    pub target: Endpoint,
    pub value: f64,
    #[serde(default = "default_category", rename = "type")]
    pub link_type: String,
}

impl LinkSpec {
    pub fn new(source: impl Into<Endpoint>, target: impl Into<Endpoint>, value: f64) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
            value,
            link_type: default_category(),
        }
    }
}

impl From<&FlowLink> for LinkSpec {
    fn from(l: &FlowLink) -> Self {
        Self {
            source: Endpoint::Node(l.source),
            target: Endpoint::Node(l.target),
            value: l.value,
            link_type: l.link_type.clone(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutNode {
    pub id: String,
    pub index: usize,
    pub depth: usize,
    pub value: f64,
    pub category: String,
    pub custom_order: Option<f64>,
    pub parent_order: Option<f64>,
    pub total_inflow: f64,
    pub total_outflow: f64,
    pub source_links: Vec<usize>,
    pub target_links: Vec<usize>,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl LayoutNode {
    pub fn order_key(&self) -> OrderKey {
        OrderKey {
            custom_order: self.custom_order,
            parent_order: self.parent_order,
            value: self.value,
        }
    }

    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }
}

/// Cubic bezier from the source slice to the target slice.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct LinkPath {
    pub start: Point,
    pub control1: Point,
    pub control2: Point,
    pub end: Point,
}

impl LinkPath {
    /// SVG path data (`M x,y C c1 c2 end`).
    pub fn svg_path_data(&self) -> String {
        format!(
            "M{},{}C{},{},{},{},{},{}",
            fmt(self.start.x),
            fmt(self.start.y),
            fmt(self.control1.x),
            fmt(self.control1.y),
            fmt(self.control2.x),
            fmt(self.control2.y),
            fmt(self.end.x),
            fmt(self.end.y),
        )
    }
}

fn fmt(v: f64) -> String {
    let r = (v * 1000.0).round() / 1000.0;
    if r == 0.0 { "0".to_string() } else { r.to_string() }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutLink {
    pub index: usize,
    pub source: usize,
    pub target: usize,
    pub source_id: String,
    pub target_id: String,
    pub value: f64,
    #[serde(rename = "type")]
    pub link_type: String,
    pub width: f64,
    pub source_y: f64,
    pub source_height: f64,
    pub target_y: f64,
    pub target_height: f64,
    pub path: LinkPath,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Bounds {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl Bounds {
    pub fn from_points(points: impl IntoIterator<Item = (f64, f64)>) -> Option<Self> {
        let mut it = points.into_iter();
        let (x0, y0) = it.next()?;
        let mut b = Self {
            min_x: x0,
            min_y: y0,
            max_x: x0,
            max_y: y0,
        };
        for (x, y) in it {
            b.min_x = b.min_x.min(x);
            b.min_y = b.min_y.min(y);
            b.max_x = b.max_x.max(x);
            b.max_y = b.max_y.max(y);
        }
        Some(b)
    }

    pub fn width(&self) -> f64 {
        self.max_x - self.min_x
    }

    pub fn height(&self) -> f64 {
        self.max_y - self.min_y
    }

    pub fn center_x(&self) -> f64 {
        (self.min_x + self.max_x) / 2.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ResizeSuggestion {
    pub width: f64,
    pub height: f64,
}

/// Optional auto-fit hints. Nothing here is applied; callers decide whether to re-run the
/// layout with a different canvas or centering offset.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutSuggestions {
    pub resize: Option<ResizeSuggestion>,
    pub centering_offset: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutInfo {
    pub dimensions: Dimensions,
    pub node_count: usize,
    pub link_count: usize,
    pub depth_count: usize,
    pub max_depth: usize,
    pub start_x: f64,
    pub usable_width: f64,
    /// Horizontal distance between consecutive depth values.
    pub column_spacing: f64,
    pub suggestions: LayoutSuggestions,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutResult {
    pub nodes: Vec<LayoutNode>,
    pub links: Vec<LayoutLink>,
    pub bounds: Bounds,
    pub layout_info: LayoutInfo,
}

impl LayoutResult {
    pub fn node(&self, id: &str) -> Option<&LayoutNode> {
        self.nodes.iter().find(|n| n.id == id)
    }
}
