//! Custom assertions for patched PDFs and pages.

use super::pdf_helpers::{count_in_pdf, is_valid_pdf};
use pdfpatch::{PatchPage, Rect};
use std::path::Path;

/// Asserts that `needle` occurs exactly `expected` times in the PDF.
///
/// # Panics
/// Panics if the count differs or the PDF cannot be searched.
pub fn assert_occurrences(pdf_path: &Path, needle: &str, expected: usize) {
    let found = count_in_pdf(pdf_path, needle)
        .unwrap_or_else(|e| panic!("Failed to search '{}': {}", pdf_path.display(), e));
    assert_eq!(
        found,
        expected,
        "'{}' should occur {} time(s) in '{}' but occurs {} time(s)",
        needle,
        expected,
        pdf_path.display(),
        found
    );
}

/// Asserts that a PDF exists and parses.
pub fn assert_valid_pdf(pdf_path: &Path) {
    assert!(pdf_path.exists(), "PDF should exist at '{}'", pdf_path.display());
    assert!(
        is_valid_pdf(pdf_path),
        "PDF at '{}' should be loadable",
        pdf_path.display()
    );
}

/// Asserts that `needle` is no longer found on `page`.
pub fn assert_gone<P: PatchPage>(page: &P, needle: &str) {
    let hits = page.search_text(needle).expect("search should not fail");
    assert!(
        hits.is_empty(),
        "'{}' should be gone from page {} but {} hit(s) remain",
        needle,
        page.index() + 1,
        hits.len()
    );
}

/// Asserts that two rectangles agree to within a hundredth of a point.
pub fn assert_rect_near(actual: Rect, expected: Rect) {
    let close = [
        (actual.x0, expected.x0),
        (actual.y0, expected.y0),
        (actual.x1, expected.x1),
        (actual.y1, expected.y1),
    ]
    .iter()
    .all(|(a, e)| (a - e).abs() < 0.01);
    assert!(close, "expected {:?}, got {:?}", expected, actual);
}
