//! Destination boxes for replacement text.
//!
//! The box keeps the occurrence's right edge and grows leftward to fit
//! the new text, so right-aligned columns stay aligned whatever the digit
//! count. Alignment is right for every script; direction only changes the
//! shaping hints.

use super::direction::TextDirection;
use crate::geometry::Rect;
use crate::metrics::TextMeasure;
use crate::page::{Align, Color, InsertStyle};

/// Right-anchored box sized for `new_text` at `font_size`, plus `slack`.
pub fn layout_replacement_box(
    rect: &Rect,
    new_text: &str,
    font_size: f32,
    slack: f32,
    measure: &dyn TextMeasure,
    font_name: &str,
) -> Rect {
    let width = measure.text_width(new_text, font_name, font_size);
    Rect {
        x0: rect.x1 - width - slack,
        y0: rect.y0,
        x1: rect.x1,
        y1: rect.y1,
    }
}

/// Insertion style for `new_text`.
pub fn replacement_style(
    new_text: &str,
    font_name: &str,
    font_size: f32,
    color: Color,
) -> InsertStyle {
    let direction = TextDirection::of(new_text);
    InsertStyle {
        font_name: font_name.to_string(),
        font_size,
        align: Align::Right,
        color,
        rtl: direction == TextDirection::RightToLeft,
        family_hint: direction.family_hint(),
    }
}
