//! Auto-fit suggestions computed from the content bounds.

use crate::config::LayoutConfig;
use crate::model::{Bounds, Dimensions, LayoutSuggestions, ResizeSuggestion};

/// Canvas width change below which no resize is suggested.
pub const RESIZE_WIDTH_THRESHOLD: f64 = 100.0;
/// Canvas height change below which no resize is suggested.
pub const RESIZE_HEIGHT_THRESHOLD: f64 = 50.0;
/// Horizontal drift of the content center below which the centering offset is kept.
pub const CENTER_DRIFT_THRESHOLD: f64 = 20.0;

/// Step 8: nothing is suggested unless the matching auto feature is enabled.
pub fn suggest(bounds: &Bounds, dims: Dimensions, cfg: &LayoutConfig) -> LayoutSuggestions {
    let mut out = LayoutSuggestions::default();

    if cfg.auto_features.dynamic_space_fill {
        let width = bounds.max_x + bounds.min_x.max(0.0);
        let height = bounds.max_y + bounds.min_y.max(0.0);
        if (width - dims.width).abs() > RESIZE_WIDTH_THRESHOLD
            || (height - dims.height).abs() > RESIZE_HEIGHT_THRESHOLD
        {
            tracing::debug!(
                from_width = dims.width,
                from_height = dims.height,
                width,
                height,
                "suggesting canvas resize"
            );
            out.resize = Some(ResizeSuggestion { width, height });
        }
    }

    if cfg.auto_features.auto_center {
        let drift = dims.width / 2.0 - bounds.center_x();
        if drift.abs() > CENTER_DRIFT_THRESHOLD {
            let start_x = dims.width * cfg.layout.centering_offset;
            let offset = (start_x + drift) / dims.width;
            tracing::debug!(drift, offset, "suggesting centering offset");
            out.centering_offset = Some(offset);
        }
    }

    out
}
