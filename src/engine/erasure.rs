//! Erase zone planning.
//!
//! The zone covers the occurrence plus `pad` on every side. When the new
//! text is wider than the old, the zone also grows leftward by the
//! difference so the right edge, where columns align, never moves.

use crate::geometry::Rect;
use crate::metrics::TextMeasure;

/// Region to erase for one occurrence.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RedactionZone {
    pub rect: Rect,
    /// Growth beyond `pad` on the left edge.
    pub extra_left: f32,
}

/// Plans the erase zone for replacing `old_text` at `rect` with `new_text`.
#[allow(clippy::too_many_arguments)]
pub fn plan_erasure(
    rect: &Rect,
    new_text: &str,
    old_text: &str,
    font_size: f32,
    pad: f32,
    slack: f32,
    measure: &dyn TextMeasure,
    font_name: &str,
) -> RedactionZone {
    let width_old = measure.text_width(old_text, font_name, font_size);
    let width_new = if new_text.is_empty() {
        0.0
    } else {
        measure.text_width(new_text, font_name, font_size)
    };
    let extra_left = (width_new - width_old).max(0.0) + slack;

    RedactionZone {
        rect: rect.expand(pad + extra_left, pad, pad, pad),
        extra_left,
    }
}
