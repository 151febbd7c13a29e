//! Horizontal (depth columns) and vertical (stacking within a column) placement.

use crate::config::LayoutConfig;
use crate::engine::DepthBuckets;
use crate::model::{Dimensions, LayoutLink, LayoutNode};
use indexmap::IndexMap;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Columns {
    pub start_x: f64,
    pub usable_width: f64,
    pub max_depth: usize,
    pub column_spacing: f64,
}

/// Where a column sits; spacing rules differ between the three.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnPosition {
    Leftmost,
    Middle,
    Rightmost,
}

/// Step 5: maps depth values linearly onto `[start_x, start_x + usable_width]`.
///
/// The last column's right edge lands on the end of the usable span, unless the span is
/// narrower than a node; then columns are spread across the span and nodes may overlap.
pub fn place_horizontally(
    mut nodes: Vec<LayoutNode>,
    buckets: &DepthBuckets,
    dims: Dimensions,
    cfg: &LayoutConfig,
) -> (Vec<LayoutNode>, Columns) {
    let start_x = dims.width * cfg.layout.centering_offset;
    let usable_width = dims.width * cfg.layout.width_usage;
    let max_depth = buckets.keys().next_back().copied().unwrap_or(0);
    // Columns stay strictly ordered even when the usable span is narrower than a node.
    let column_spacing = if max_depth == 0 {
        0.0
    } else if usable_width > cfg.node_width {
        (usable_width - cfg.node_width) / max_depth as f64
    } else {
        usable_width / max_depth as f64
    };

    for n in &mut nodes {
        n.x = start_x + n.depth as f64 * column_spacing;
    }

    (
        nodes,
        Columns {
            start_x,
            usable_width,
            max_depth,
            column_spacing,
        },
    )
}

/// Step 6: stacks every column top to bottom.
///
/// The leftmost column is a plain stack. Other columns are first clustered by the set of
/// upstream nodes feeding each node; clusters are separated by a larger gap than nodes within
/// a cluster.
pub fn place_vertically(
    mut nodes: Vec<LayoutNode>,
    links: &[LayoutLink],
    buckets: &DepthBuckets,
    dims: Dimensions,
    cfg: &LayoutConfig,
) -> Vec<LayoutNode> {
    let first_depth = buckets.keys().next().copied();
    let last_depth = buckets.keys().next_back().copied();

    for (&depth, bucket) in buckets {
        let position = if Some(depth) == first_depth {
            ColumnPosition::Leftmost
        } else if Some(depth) == last_depth {
            ColumnPosition::Rightmost
        } else {
            ColumnPosition::Middle
        };

        let clusters = match position {
            ColumnPosition::Leftmost => vec![bucket.clone()],
            ColumnPosition::Middle | ColumnPosition::Rightmost => {
                cluster_by_parents(bucket, &nodes, links)
            }
        };
        let (node_gap, cluster_gap) = column_gaps(position, cfg);

        let stacked: f64 = clusters
            .iter()
            .flatten()
            .map(|&i| nodes[i].height)
            .sum::<f64>()
            + clusters
                .iter()
                .map(|c| c.len().saturating_sub(1) as f64 * node_gap)
                .sum::<f64>()
            + clusters.len().saturating_sub(1) as f64 * cluster_gap;

        let mut y = start_y(stacked, dims, cfg);
        for (ci, cluster) in clusters.iter().enumerate() {
            if ci > 0 {
                y += cluster_gap;
            }
            for (ni, &i) in cluster.iter().enumerate() {
                if ni > 0 {
                    y += node_gap;
                }
                nodes[i].y = y;
                y += nodes[i].height;
            }
        }
    }

    nodes
}

/// Gap between nodes in a cluster, and gap between clusters.
pub fn column_gaps(position: ColumnPosition, cfg: &LayoutConfig) -> (f64, f64) {
    let padding = cfg.layout.node_padding;
    let s = &cfg.spacing;
    match position {
        ColumnPosition::Leftmost => {
            let gap = padding * s.leftmost_spacing_multiplier;
            (gap, gap)
        }
        ColumnPosition::Middle => (
            padding * s.middle_spacing_multiplier,
            (padding * 0.8).max(s.middle_cluster_gap),
        ),
        ColumnPosition::Rightmost => (
            padding * s.rightmost_spacing_multiplier,
            (padding * 0.8).max(s.rightmost_cluster_gap),
        ),
    }
}

fn start_y(stacked_height: f64, dims: Dimensions, cfg: &LayoutConfig) -> f64 {
    let free = dims.height - stacked_height;
    if cfg.auto_features.auto_middle_align {
        (free / 2.0).max(0.0)
    } else {
        (free * cfg.layout.top_bias).max(cfg.layout.top_margin)
    }
}

/// Groups a sorted bucket by the sorted set of parent ids feeding each node.
///
/// Clusters appear in order of their first member. When every node in the bucket carries an
/// explicit `custom_order`, that order is kept as is and only adjacent nodes with the same
/// parents share a cluster.
pub fn cluster_by_parents(
    bucket: &[usize],
    nodes: &[LayoutNode],
    links: &[LayoutLink],
) -> Vec<Vec<usize>> {
    let parents_of = |i: usize| {
        let mut ids: Vec<&str> = nodes[i]
            .target_links
            .iter()
            .map(|&li| nodes[links[li].source].id.as_str())
            .collect();
        ids.sort_unstable();
        ids.dedup();
        ids
    };

    if bucket.iter().all(|&i| nodes[i].custom_order.is_some()) {
        let mut clusters: Vec<Vec<usize>> = Vec::new();
        let mut last_key: Option<Vec<&str>> = None;
        for &i in bucket {
            let key = parents_of(i);
            match clusters.len().checked_sub(1) {
                Some(last) if last_key.as_ref() == Some(&key) => clusters[last].push(i),
                _ => clusters.push(vec![i]),
            }
            last_key = Some(key);
        }
        return clusters;
    }

    let mut groups: IndexMap<Vec<&str>, Vec<usize>> = IndexMap::new();
    for &i in bucket {
        groups.entry(parents_of(i)).or_default().push(i);
    }
    groups.into_values().collect()
}
