#![forbid(unsafe_code)]

//! Headless Sankey layout.
//!
//! Takes nodes with a depth and value plus links between them, and produces pixel geometry:
//! node rectangles arranged in depth columns, link slices on both node edges, and a cubic
//! bezier per link. Rendering is left to the caller.

pub mod auto_fit;
pub mod config;
pub mod engine;
pub mod links;
pub mod model;
pub mod placement;

pub use config::{
    AutoFeatures, CurvatureConfig, LayerSpacingConfig, LayoutConfig, SpacingConfig, VisualConfig,
};
pub use engine::{DepthBuckets, SankeyLayout};
pub use model::{
    Bounds, Dimensions, Endpoint, LayoutInfo, LayoutLink, LayoutNode, LayoutResult,
    LayoutSuggestions, LinkPath, LinkSpec, NodeSpec, Point, ResizeSuggestion,
};

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("layout precondition failed: {message}")]
    LayoutPrecondition { message: String },
    #[error(transparent)]
    Core(#[from] sankey_core::Error),
    #[error("layout config JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

/// Lays out an already processed graph.
pub fn calculate_layout(
    graph: &sankey_core::ProcessedGraph,
    dims: Dimensions,
    config: &LayoutConfig,
) -> Result<LayoutResult> {
    SankeyLayout::new(config.clone()).layout_graph(graph, dims)
}

/// Processes a raw node/link document with default options and lays it out.
pub fn layout_json(
    raw: &serde_json::Value,
    dims: Dimensions,
    config: &LayoutConfig,
) -> Result<LayoutResult> {
    let graph = sankey_core::process(raw)?;
    calculate_layout(&graph, dims, config)
}
