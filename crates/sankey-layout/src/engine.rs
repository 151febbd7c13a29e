//! The layout pipeline.
//!
//! Each stage takes the previous stage's output by value and returns a new snapshot, so stages
//! can be exercised on their own.

use crate::config::LayoutConfig;
use crate::model::{
    Bounds, Dimensions, Endpoint, LayoutInfo, LayoutLink, LayoutNode, LayoutResult, LinkPath,
    LinkSpec, NodeSpec,
};
use crate::{Error, Result, auto_fit, links, placement};
use rustc_hash::FxHashMap;
use sankey_core::ProcessedGraph;
use std::collections::BTreeMap;

/// Nodes grouped by depth, each bucket in canonical order.
pub type DepthBuckets = BTreeMap<usize, Vec<usize>>;

/// Sankey layout engine. Holds only configuration; every call is independent.
#[derive(Debug, Clone, Default)]
pub struct SankeyLayout {
    config: LayoutConfig,
}

impl SankeyLayout {
    pub fn new(config: LayoutConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &LayoutConfig {
        &self.config
    }

    pub fn layout_graph(&self, graph: &ProcessedGraph, dims: Dimensions) -> Result<LayoutResult> {
        let nodes: Vec<NodeSpec> = graph.nodes.iter().map(NodeSpec::from).collect();
        let links: Vec<LinkSpec> = graph.links.iter().map(LinkSpec::from).collect();
        self.calculate_layout(&nodes, &links, dims)
    }

    pub fn calculate_layout(
        &self,
        nodes: &[NodeSpec],
        links: &[LinkSpec],
        dims: Dimensions,
    ) -> Result<LayoutResult> {
        validate_dimensions(dims)?;
        if nodes.is_empty() {
            return Err(Error::LayoutPrecondition {
                message: "cannot lay out an empty node set".to_string(),
            });
        }
        validate_node_values(nodes)?;
        let cfg = &self.config;

        let nodes = prepare_nodes(nodes, cfg);
        let (nodes, links) = resolve_links(nodes, links)?;
        let buckets = group_by_depth(&nodes);
        let nodes = size_nodes(nodes, cfg);
        let (nodes, columns) = placement::place_horizontally(nodes, &buckets, dims, cfg);
        let nodes = placement::place_vertically(nodes, &links, &buckets, dims, cfg);
        let links = links::link_geometry(&nodes, links, cfg);

        let bounds = content_bounds(&nodes);
        let suggestions = auto_fit::suggest(&bounds, dims, cfg);

        let layout_info = LayoutInfo {
            dimensions: dims,
            node_count: nodes.len(),
            link_count: links.len(),
            depth_count: buckets.len(),
            max_depth: columns.max_depth,
            start_x: columns.start_x,
            usable_width: columns.usable_width,
            column_spacing: columns.column_spacing,
            suggestions,
        };
        tracing::debug!(
            nodes = layout_info.node_count,
            links = layout_info.link_count,
            depths = layout_info.depth_count,
            "sankey layout computed"
        );

        Ok(LayoutResult {
            nodes,
            links,
            bounds,
            layout_info,
        })
    }
}

fn validate_dimensions(dims: Dimensions) -> Result<()> {
    if !(dims.width.is_finite() && dims.width > 0.0 && dims.height.is_finite() && dims.height > 0.0)
    {
        return Err(Error::LayoutPrecondition {
            message: format!(
                "canvas dimensions must be positive and finite (got {}x{})",
                dims.width, dims.height
            ),
        });
    }
    Ok(())
}

fn validate_node_values(nodes: &[NodeSpec]) -> Result<()> {
    match nodes.iter().position(|n| !n.value.is_finite()) {
        Some(index) => Err(Error::LayoutPrecondition {
            message: format!("node {index} ('{}'): value must be finite", nodes[index].id),
        }),
        None => Ok(()),
    }
}

/// Step 1: geometry placeholders.
pub fn prepare_nodes(specs: &[NodeSpec], cfg: &LayoutConfig) -> Vec<LayoutNode> {
    specs
        .iter()
        .enumerate()
        .map(|(index, s)| LayoutNode {
            id: s.id.clone(),
            index,
            depth: s.depth,
            value: s.value,
            category: s.category.clone(),
            custom_order: s.custom_order,
            parent_order: s.parent_order,
            total_inflow: 0.0,
            total_outflow: 0.0,
            source_links: Vec::new(),
            target_links: Vec::new(),
            x: 0.0,
            y: 0.0,
            width: cfg.node_width,
            height: 0.0,
        })
        .collect()
}

/// Step 2: resolves endpoints to node indices and fills adjacency and flow totals.
///
/// An endpoint that names no node is an error rather than a link with undefined geometry.
pub fn resolve_links(
    mut nodes: Vec<LayoutNode>,
    specs: &[LinkSpec],
) -> Result<(Vec<LayoutNode>, Vec<LayoutLink>)> {
    let by_id: FxHashMap<&str, usize> = nodes
        .iter()
        .enumerate()
        .map(|(i, n)| (n.id.as_str(), i))
        .collect();
    let resolve = |index: usize, side: &str, endpoint: &Endpoint| -> Result<usize> {
        let found = match endpoint {
            Endpoint::Id(id) => by_id.get(id.as_str()).copied(),
            Endpoint::Node(id) => (id.0 < nodes.len()).then_some(id.0),
        };
        found.ok_or_else(|| Error::LayoutPrecondition {
            message: format!("link {index}: unresolved {side} endpoint {endpoint:?}"),
        })
    };

    let mut links = Vec::with_capacity(specs.len());
    for (index, spec) in specs.iter().enumerate() {
        let source = resolve(index, "source", &spec.source)?;
        let target = resolve(index, "target", &spec.target)?;
        if !spec.value.is_finite() {
            return Err(Error::LayoutPrecondition {
                message: format!("link {index}: value must be finite"),
            });
        }
        links.push(LayoutLink {
            index,
            source,
            target,
            source_id: nodes[source].id.clone(),
            target_id: nodes[target].id.clone(),
            value: spec.value,
            link_type: spec.link_type.clone(),
            width: 0.0,
            source_y: 0.0,
            source_height: 0.0,
            target_y: 0.0,
            target_height: 0.0,
            path: LinkPath::default(),
        });
    }

    for l in &links {
        nodes[l.source].source_links.push(l.index);
        nodes[l.source].total_outflow += l.value;
        nodes[l.target].target_links.push(l.index);
        nodes[l.target].total_inflow += l.value;
    }
    Ok((nodes, links))
}

/// Step 3: buckets node indices by depth, sorted by the canonical order within each depth.
pub fn group_by_depth(nodes: &[LayoutNode]) -> DepthBuckets {
    let mut buckets: DepthBuckets = BTreeMap::new();
    for n in nodes {
        buckets.entry(n.depth).or_default().push(n.index);
    }
    for bucket in buckets.values_mut() {
        bucket.sort_by(|&a, &b| nodes[a].order_key().cmp_order(&nodes[b].order_key()));
    }
    buckets
}

/// Step 4: node heights follow the largest of the declared value and both flow totals.
pub fn size_nodes(mut nodes: Vec<LayoutNode>, cfg: &LayoutConfig) -> Vec<LayoutNode> {
    for n in &mut nodes {
        let magnitude = n.value.max(n.total_inflow).max(n.total_outflow);
        n.height = (magnitude * cfg.visual.node_height_scale).max(cfg.visual.min_node_height);
    }
    nodes
}

fn content_bounds(nodes: &[LayoutNode]) -> Bounds {
    Bounds::from_points(
        nodes
            .iter()
            .flat_map(|n| [(n.x, n.y), (n.right(), n.bottom())]),
    )
    .unwrap_or(Bounds {
        min_x: 0.0,
        min_y: 0.0,
        max_x: 0.0,
        max_y: 0.0,
    })
}
