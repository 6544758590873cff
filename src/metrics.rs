//! Text width measurement with standard (non-embedded) font metrics.
//!
//! Widths are the base-14 AFM advance widths in 1/1000 em. Fonts are
//! addressed either by their PDF base name (`Helvetica-Bold`) or by the
//! short MuPDF-style aliases (`helv`, `hebo`, `cour`); anything unknown
//! resolves to Helvetica, which is also the insertion font.

/// Measures the rendered width of a string.
pub trait TextMeasure: Send + Sync {
    /// Width in points of `text` set in `font_name` at `font_size`.
    fn text_width(&self, text: &str, font_name: &str, font_size: f32) -> f32;
}

/// Base-14 font families with built-in metrics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StandardFont {
    Helvetica,
    HelveticaBold,
    Courier,
}

impl StandardFont {
    /// Resolves a font name or alias; unknown names fall back to Helvetica.
    pub fn resolve(name: &str) -> Self {
        let lower = name.to_ascii_lowercase();
        if lower == "cour" || lower.contains("courier") || lower.contains("mono") {
            StandardFont::Courier
        } else if lower == "hebo" || lower.contains("bold") {
            StandardFont::HelveticaBold
        } else {
            StandardFont::Helvetica
        }
    }

    /// Advance width of `ch` in 1/1000 em.
    pub fn char_width(&self, ch: char) -> f32 {
        let code = ch as u32;
        match self {
            StandardFont::Courier => 600.0,
            StandardFont::Helvetica if (32..=126).contains(&code) => {
                HELVETICA[(code - 32) as usize]
            }
            StandardFont::HelveticaBold if (32..=126).contains(&code) => {
                HELVETICA_BOLD[(code - 32) as usize]
            }
            // No glyph in the base-14 set; MuPDF substitutes a figure-width glyph.
            _ if ch == '\u{a0}' => 278.0,
            _ if is_zero_width(ch) => 0.0,
            _ => FALLBACK_WIDTH,
        }
    }
}

const FALLBACK_WIDTH: f32 = 556.0;

fn is_zero_width(ch: char) -> bool {
    matches!(ch, '\u{200b}'..='\u{200f}' | '\u{202a}'..='\u{202e}' | '\u{2066}'..='\u{2069}')
}

/// [`TextMeasure`] backed by the built-in base-14 tables.
#[derive(Debug, Clone, Copy, Default)]
pub struct StandardMetrics;

impl TextMeasure for StandardMetrics {
    fn text_width(&self, text: &str, font_name: &str, font_size: f32) -> f32 {
        let font = StandardFont::resolve(font_name);
        let units: f32 = text.chars().map(|c| font.char_width(c)).sum();
        units * font_size / 1000.0
    }
}

#[rustfmt::skip]
const HELVETICA: [f32; 95] = [
    278.0, 278.0, 355.0, 556.0, 556.0, 889.0, 667.0, 191.0, 333.0, 333.0, // ' '..')'
    389.0, 584.0, 278.0, 333.0, 278.0, 278.0, 556.0, 556.0, 556.0, 556.0, // '*'..'3'
    556.0, 556.0, 556.0, 556.0, 556.0, 556.0, 278.0, 278.0, 584.0, 584.0, // '4'..'='
    584.0, 556.0, 1015.0, 667.0, 667.0, 722.0, 722.0, 667.0, 611.0, 778.0, // '>'..'G'
    722.0, 278.0, 500.0, 667.0, 556.0, 833.0, 722.0, 778.0, 667.0, 778.0, // 'H'..'Q'
    722.0, 667.0, 611.0, 722.0, 667.0, 944.0, 667.0, 667.0, 611.0, 278.0, // 'R'..'['
    278.0, 278.0, 469.0, 556.0, 333.0, 556.0, 556.0, 500.0, 556.0, 556.0, // '\\'..'e'
    278.0, 556.0, 556.0, 222.0, 222.0, 500.0, 222.0, 833.0, 556.0, 556.0, // 'f'..'o'
    556.0, 556.0, 333.0, 500.0, 278.0, 556.0, 500.0, 722.0, 500.0, 500.0, // 'p'..'y'
    500.0, 334.0, 260.0, 334.0, 584.0,                                    // 'z'..'~'
];

#[rustfmt::skip]
const HELVETICA_BOLD: [f32; 95] = [
    278.0, 333.0, 474.0, 556.0, 556.0, 889.0, 722.0, 238.0, 333.0, 333.0,
    389.0, 584.0, 278.0, 333.0, 278.0, 278.0, 556.0, 556.0, 556.0, 556.0,
    556.0, 556.0, 556.0, 556.0, 556.0, 556.0, 333.0, 333.0, 584.0, 584.0,
    584.0, 611.0, 975.0, 722.0, 722.0, 722.0, 722.0, 667.0, 611.0, 778.0,
    722.0, 278.0, 556.0, 722.0, 611.0, 833.0, 722.0, 778.0, 667.0, 778.0,
    722.0, 667.0, 611.0, 722.0, 667.0, 944.0, 667.0, 667.0, 611.0, 333.0,
    278.0, 333.0, 584.0, 556.0, 333.0, 556.0, 611.0, 556.0, 611.0, 556.0,
    333.0, 611.0, 611.0, 278.0, 278.0, 556.0, 278.0, 889.0, 611.0, 611.0,
    611.0, 611.0, 389.0, 556.0, 333.0, 611.0, 556.0, 778.0, 556.0, 556.0,
    500.0, 389.0, 280.0, 389.0, 584.0,
];
