//! Typed layout configuration.
//!
//! Every field has a default, and deserialization uses camelCase keys with `#[serde(default)]`
//! throughout, so a partial JSON document only overrides the fields it names.

use crate::Result;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LayoutConfig {
    pub node_width: f64,
    pub visual: VisualConfig,
    pub layout: SpacingConfig,
    pub spacing: LayerSpacingConfig,
    pub curvature: CurvatureConfig,
    pub auto_features: AutoFeatures,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            node_width: 20.0,
            visual: VisualConfig::default(),
            layout: SpacingConfig::default(),
            spacing: LayerSpacingConfig::default(),
            curvature: CurvatureConfig::default(),
            auto_features: AutoFeatures::default(),
        }
    }
}

impl LayoutConfig {
    pub fn from_json(value: &serde_json::Value) -> Result<Self> {
        Ok(serde_json::from_value(serde_json::Value::clone(value))?)
    }

    /// Curvature for links leaving a node at `depth`.
    pub fn curvature_for(&self, depth: usize) -> f64 {
        self.curvature
            .layer_curvature
            .get(&depth)
            .copied()
            .unwrap_or(self.curvature.curve_intensity)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct VisualConfig {
    /// Pixels per value unit for node heights.
    pub node_height_scale: f64,
    pub min_node_height: f64,
    /// Pixels per value unit for link widths.
    pub link_width_scale: f64,
}

impl Default for VisualConfig {
    fn default() -> Self {
        Self {
            node_height_scale: 0.65,
            min_node_height: 5.0,
            link_width_scale: 0.65,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SpacingConfig {
    pub node_padding: f64,
    /// Fraction of the canvas width left empty before the first column.
    pub centering_offset: f64,
    /// Fraction of the canvas width spanned by the columns.
    pub width_usage: f64,
    /// Space kept above the content for labels when it is not middle-aligned.
    pub top_margin: f64,
    /// Where the content sits in the free vertical space when not middle-aligned (0 = top).
    pub top_bias: f64,
}

impl Default for SpacingConfig {
    fn default() -> Self {
        Self {
            node_padding: 25.0,
            centering_offset: 0.08,
            width_usage: 0.82,
            top_margin: 40.0,
            top_bias: 0.25,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LayerSpacingConfig {
    pub leftmost_spacing_multiplier: f64,
    pub middle_spacing_multiplier: f64,
    pub rightmost_spacing_multiplier: f64,
    /// Minimum gap between parent clusters in middle columns.
    pub middle_cluster_gap: f64,
    /// Minimum gap between parent clusters in the rightmost column.
    pub rightmost_cluster_gap: f64,
}

impl Default for LayerSpacingConfig {
    fn default() -> Self {
        Self {
            leftmost_spacing_multiplier: 1.2,
            middle_spacing_multiplier: 0.9,
            rightmost_spacing_multiplier: 0.7,
            middle_cluster_gap: 25.0,
            rightmost_cluster_gap: 12.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CurvatureConfig {
    pub curve_intensity: f64,
    /// Per-source-depth overrides of `curve_intensity`.
    pub layer_curvature: BTreeMap<usize, f64>,
}

impl Default for CurvatureConfig {
    fn default() -> Self {
        Self {
            curve_intensity: 0.5,
            layer_curvature: BTreeMap::new(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AutoFeatures {
    pub auto_center: bool,
    pub auto_middle_align: bool,
    pub dynamic_space_fill: bool,
}
