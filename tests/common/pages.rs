//! In-memory page builders.

use pdfpatch::memory::MemoryPage;
use pdfpatch::Rect;

/// A right-aligned amount column ending at x = 452.
pub const COLUMN_RIGHT: f32 = 452.0;

/// Rectangle of an amount in the right-aligned column, on row `y`.
pub fn column_cell(width: f32, y: f32) -> Rect {
    Rect::new(COLUMN_RIGHT - width, y, COLUMN_RIGHT, y + 12.0)
}

/// A payslip page: labels on the left, amounts right-aligned in a column.
///
/// | row | label      | amount  |
/// |-----|------------|---------|
/// | 200 | שכר נטו    | 4704.32 |
/// | 230 | Gross pay  | 6,120.00|
/// | 260 | Employee   | 073     |
pub fn payslip_page() -> MemoryPage {
    MemoryPage::new(0)
        .with_run("שכר נטו", Rect::new(100.0, 200.0, 140.0, 212.0), 10.0, "helv", 0, 0)
        .with_run("4704.32", column_cell(39.54, 200.0), 11.0, "helv", 1, 0)
        .with_run("Gross pay", Rect::new(100.0, 230.0, 150.0, 242.0), 10.0, "helv", 2, 0)
        .with_run("6,120.00", column_cell(42.0, 230.0), 11.0, "helv", 3, 0)
        .with_run("Employee", Rect::new(100.0, 260.0, 150.0, 272.0), 10.0, "helv", 4, 0)
        .with_run("073", column_cell(18.0, 260.0), 11.0, "helv", 5, 0)
}

/// A page where the currency sign is a separate token left of the amount.
pub fn split_amount_page() -> MemoryPage {
    MemoryPage::new(0)
        .with_run("לתשלום", Rect::new(300.0, 100.0, 340.0, 112.0), 10.0, "helv", 0, 0)
        .with_run("₪", Rect::new(200.0, 100.0, 206.0, 112.0), 10.0, "helv", 1, 0)
        .with_run("2,723.00", Rect::new(208.0, 100.0, 245.0, 112.0), 10.0, "helv", 1, 0)
}
