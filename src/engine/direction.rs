//! Script direction detection.

/// Layout direction of a replacement string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextDirection {
    LeftToRight,
    RightToLeft,
}

impl TextDirection {
    pub fn of(text: &str) -> Self {
        if is_right_to_left(text) {
            TextDirection::RightToLeft
        } else {
            TextDirection::LeftToRight
        }
    }

    /// Font families to try when shaping text in this direction.
    pub fn family_hint(&self) -> &'static str {
        match self {
            TextDirection::RightToLeft => "Arial, DejaVu Sans, Noto Sans Hebrew, sans-serif",
            TextDirection::LeftToRight => "Helvetica, Arial, sans-serif",
        }
    }
}

/// True if any character belongs to a right-to-left script block
/// (Hebrew, Arabic, Syriac, Thaana, NKo and their presentation forms).
///
/// # Examples
///
/// ```
/// use pdfpatch::engine::is_right_to_left;
///
/// assert!(is_right_to_left("שכר נטו"));
/// assert!(is_right_to_left("total ₪ נטו"));
/// assert!(!is_right_to_left("2723.00"));
/// ```
pub fn is_right_to_left(text: &str) -> bool {
    text.chars().any(is_rtl_char)
}

/// Characters of `text` in left-to-right drawing order.
///
/// Right-to-left runs are reversed and laid out from the right edge, while
/// numbers and Latin words inside them keep their own order. Whitespace
/// joins the right-to-left side unless it sits between two left-to-right
/// characters.
///
/// # Examples
///
/// ```
/// use pdfpatch::engine::visual_order;
///
/// assert_eq!(visual_order("נטו"), "וטנ");
/// assert_eq!(visual_order("נטו 1,234"), "1,234 וטנ");
/// assert_eq!(visual_order("2723.00"), "2723.00");
/// ```
pub fn visual_order(text: &str) -> String {
    if !is_right_to_left(text) {
        return text.to_string();
    }
    let chars: Vec<char> = text.chars().collect();
    let strong: Vec<Option<bool>> = chars
        .iter()
        .map(|&c| if c.is_whitespace() { None } else { Some(is_rtl_char(c)) })
        .collect();

    let mut runs: Vec<(bool, Vec<char>)> = Vec::new();
    for (i, &ch) in chars.iter().enumerate() {
        let rtl = strong[i].unwrap_or_else(|| {
            let before = strong[..i].iter().rev().flatten().next();
            let after = strong[i + 1..].iter().flatten().next();
            !(before == Some(&false) && after == Some(&false))
        });
        match runs.last_mut() {
            Some((run_rtl, run)) if *run_rtl == rtl => run.push(ch),
            _ => runs.push((rtl, vec![ch])),
        }
    }

    let mut visual = String::with_capacity(text.len());
    for (rtl, run) in runs.iter().rev() {
        if *rtl {
            visual.extend(run.iter().rev());
        } else {
            visual.extend(run.iter());
        }
    }
    visual
}

fn is_rtl_char(ch: char) -> bool {
    matches!(
        ch,
        '\u{0590}'..='\u{05FF}'     // Hebrew
            | '\u{0600}'..='\u{07BF}' // Arabic, Syriac, Arabic Supplement, Thaana
            | '\u{07C0}'..='\u{07FF}' // NKo
            | '\u{08A0}'..='\u{08FF}' // Arabic Extended-A
            | '\u{FB1D}'..='\u{FB4F}' // Hebrew presentation forms
            | '\u{FB50}'..='\u{FDFF}' // Arabic presentation forms A
            | '\u{FE70}'..='\u{FEFF}' // Arabic presentation forms B
    )
}
