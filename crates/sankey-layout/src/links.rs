//! Link slices and bezier paths.

use crate::config::LayoutConfig;
use crate::model::{LayoutLink, LayoutNode, LinkPath, Point};
use sankey_core::model::f64_cmp;

/// Step 7: widths, per-node slices and curve geometry for every link.
///
/// Each node's outgoing links are stacked down its right edge sorted by target y, and its
/// incoming links down its left edge sorted by source y. A slice is the link's share of the
/// node's flow on that side times the node height, so the slices on a side exactly fill it.
pub fn link_geometry(
    nodes: &[LayoutNode],
    mut links: Vec<LayoutLink>,
    cfg: &LayoutConfig,
) -> Vec<LayoutLink> {
    for l in &mut links {
        l.width = l.value * cfg.visual.link_width_scale;
    }

    for node in nodes {
        let mut outgoing = node.source_links.clone();
        sort_by_node_y(&mut outgoing, nodes, &links, |l| l.target);
        let mut y = node.y;
        for li in outgoing {
            let h = slice_height(links[li].value, node.total_outflow, node.height);
            links[li].source_y = y;
            links[li].source_height = h;
            y += h;
        }

        let mut incoming = node.target_links.clone();
        sort_by_node_y(&mut incoming, nodes, &links, |l| l.source);
        let mut y = node.y;
        for li in incoming {
            let h = slice_height(links[li].value, node.total_inflow, node.height);
            links[li].target_y = y;
            links[li].target_height = h;
            y += h;
        }
    }

    for l in &mut links {
        let source = &nodes[l.source];
        let target = &nodes[l.target];
        l.path = bezier(
            Point {
                x: source.right(),
                y: l.source_y + l.source_height / 2.0,
            },
            Point {
                x: target.x,
                y: l.target_y + l.target_height / 2.0,
            },
            cfg.curvature_for(source.depth),
        );
    }

    links
}

fn slice_height(value: f64, side_total: f64, node_height: f64) -> f64 {
    if side_total > 0.0 {
        value / side_total * node_height
    } else {
        0.0
    }
}

/// Sorts link indices by the y of the node on the far end, ties by link index.
pub fn sort_by_node_y(
    link_indices: &mut [usize],
    nodes: &[LayoutNode],
    links: &[LayoutLink],
    far_end: impl Fn(&LayoutLink) -> usize,
) {
    link_indices.sort_by(|&a, &b| {
        let ya = nodes[far_end(&links[a])].y;
        let yb = nodes[far_end(&links[b])].y;
        f64_cmp(ya, yb).then_with(|| links[a].index.cmp(&links[b].index))
    });
}

/// Control points are pulled horizontally toward each other by `curvature`.
pub fn bezier(start: Point, end: Point, curvature: f64) -> LinkPath {
    let dx = end.x - start.x;
    LinkPath {
        start,
        control1: Point {
            x: start.x + dx * curvature,
            y: start.y,
        },
        control2: Point {
            x: start.x + dx * (1.0 - curvature),
            y: end.y,
        },
        end,
    }
}
