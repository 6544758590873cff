//! Test fixtures and PDF builders.
//!
//! Builds small single-page PDFs with text placed at fixed positions, so a
//! label and its amount can sit in separate columns like on a real slip.

use anyhow::Result;
use printpdf::*;
use std::fs;
use std::io::BufWriter;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone)]
struct PlacedText {
    text: String,
    x_mm: f32,
    y_mm: f32,
    size: f32,
}

#[derive(Debug, Clone, Copy)]
struct PlacedImage {
    x_mm: f32,
    y_mm: f32,
    scale: f32,
}

/// Builder for creating test PDFs with positioned text.
///
/// # Example
///
/// ```no_run
/// use std::path::Path;
/// # use anyhow::Result;
/// # fn main() -> Result<()> {
/// let pdf = TestPdfBuilder::new()
///     .with_title("Salary Slip")
///     .with_text("Net pay", 20.0, 200.0, 11.0)
///     .with_text("4704.32", 120.0, 200.0, 11.0)
///     .build(Path::new("/tmp/slip.pdf"))?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct TestPdfBuilder {
    title: String,
    placed: Vec<PlacedText>,
    images: Vec<PlacedImage>,
    page_width: Mm,
    page_height: Mm,
}

impl TestPdfBuilder {
    /// Creates a new test PDF builder with default settings.
    pub fn new() -> Self {
        Self {
            title: "Test Document".to_string(),
            placed: Vec::new(),
            images: Vec::new(),
            page_width: Mm(210.0),  // A4 width
            page_height: Mm(297.0), // A4 height
        }
    }

    /// Sets the document title, printed at the top of the page.
    pub fn with_title(mut self, title: &str) -> Self {
        self.title = title.to_string();
        self
    }

    /// Places `text` with its baseline at (`x_mm`, `y_mm`) from the bottom left.
    pub fn with_text(mut self, text: &str, x_mm: f32, y_mm: f32, size: f32) -> Self {
        self.placed.push(PlacedText {
            text: text.to_string(),
            x_mm,
            y_mm,
            size,
        });
        self
    }

    /// Paints a small RGB gradient with its lower left corner at
    /// (`x_mm`, `y_mm`), below any text on the page.
    pub fn with_image(mut self, x_mm: f32, y_mm: f32, scale: f32) -> Self {
        self.images.push(PlacedImage { x_mm, y_mm, scale });
        self
    }

    /// Builds the PDF and writes it to the specified path.
    pub fn build(self, output_path: &Path) -> Result<PathBuf> {
        let (doc, page1, layer1) =
            PdfDocument::new(&self.title, self.page_width, self.page_height, "Layer 1");
        let current_layer = doc.get_page(page1).get_layer(layer1);

        for img in &self.images {
            Image::from(gradient(60, 20)).add_to_layer(
                current_layer.clone(),
                ImageTransform {
                    translate_x: Some(Mm(img.x_mm)),
                    translate_y: Some(Mm(img.y_mm)),
                    scale_x: Some(img.scale),
                    scale_y: Some(img.scale),
                    ..Default::default()
                },
            );
        }

        let bold = doc.add_builtin_font(BuiltinFont::HelveticaBold)?;
        current_layer.use_text(&self.title, 16.0, Mm(20.0), Mm(270.0), &bold);

        let font = doc.add_builtin_font(BuiltinFont::Helvetica)?;
        for p in &self.placed {
            current_layer.use_text(&p.text, p.size, Mm(p.x_mm), Mm(p.y_mm), &font);
        }

        doc.save(&mut BufWriter::new(fs::File::create(output_path)?))?;
        Ok(output_path.to_path_buf())
    }
}

fn gradient(width: usize, height: usize) -> ImageXObject {
    let mut image_data = Vec::with_capacity(width * height * 3);
    for y in 0..height {
        for x in 0..width {
            image_data.extend_from_slice(&[(x * 4) as u8, (y * 12) as u8, 200]);
        }
    }
    ImageXObject {
        width: Px(width),
        height: Px(height),
        color_space: ColorSpace::Rgb,
        bits_per_component: ColorBits::Bit8,
        interpolate: false,
        image_data,
        image_filter: None,
        smask: None,
        clipping_bbox: None,
    }
}

impl Default for TestPdfBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// A salary slip with a net-pay row, a reference row and a tax row.
pub fn create_salary_slip(path: &Path, net_amount: &str) -> Result<PathBuf> {
    TestPdfBuilder::new()
        .with_title("Salary Slip July 2025")
        .with_text("Employee 073", 20.0, 240.0, 11.0)
        .with_text("Gross pay", 20.0, 220.0, 11.0)
        .with_text("6120.00", 120.0, 220.0, 11.0)
        .with_text("Net pay", 20.0, 200.0, 11.0)
        .with_text(net_amount, 120.0, 200.0, 11.0)
        .with_text("Income tax", 20.0, 180.0, 11.0)
        .with_text("1415.68", 120.0, 180.0, 11.0)
        .build(path)
}

/// The salary slip with a picture painted under the net amount.
pub fn create_slip_with_image(path: &Path, net_amount: &str) -> Result<PathBuf> {
    TestPdfBuilder::new()
        .with_title("Salary Slip July 2025")
        .with_image(110.0, 195.0, 10.0)
        .with_text("Net pay", 20.0, 200.0, 11.0)
        .with_text(net_amount, 120.0, 200.0, 11.0)
        .build(path)
}

/// A replacements config file in the bulk JSON shape.
pub fn write_config(path: &Path, replacements: &[(&str, &str)]) -> Result<PathBuf> {
    let entries: Vec<serde_json::Value> = replacements
        .iter()
        .map(|(old, new)| serde_json::json!({ "old": old, "new": new }))
        .collect();
    let config = serde_json::json!({
        "replacements": entries,
        "pad": 1.2,
        "slack": 3.0,
        "fs_min": 8.0,
        "fs_max": 18.0,
    });
    fs::write(path, serde_json::to_string_pretty(&config)?)?;
    Ok(path.to_path_buf())
}
