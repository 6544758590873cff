//! PDF inspection helpers.

use anyhow::Result;
use mupdf::pdf::PdfDocument;
use std::path::Path;
use std::sync::{Mutex, MutexGuard};

// MuPDF has thread-safety issues with font loading, so only one test may
// use it at a time
static MUPDF_LOCK: Mutex<()> = Mutex::new(());

/// Holds the global MuPDF lock for the lifetime of the guard.
pub fn mupdf_guard() -> MutexGuard<'static, ()> {
    MUPDF_LOCK.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Counts occurrences of `needle` across all pages, as MuPDF renders them.
pub fn count_in_pdf(pdf_path: &Path, needle: &str) -> Result<usize> {
    let path = pdf_path
        .to_str()
        .ok_or_else(|| anyhow::anyhow!("non UTF-8 path"))?;
    let doc = PdfDocument::open(path)?;
    let mut count = 0;
    for i in 0..doc.page_count()? {
        let page = doc.load_page(i)?;
        count += page.search(needle, 100)?.into_iter().count();
    }
    Ok(count)
}

/// Extracts text with pdf-extract, returning an error instead of panicking.
pub fn extract_text(pdf_path: &Path) -> Result<String> {
    let bytes = std::fs::read(pdf_path)?;
    pdf_extract::extract_text_from_mem(&bytes)
        .map_err(|e| anyhow::anyhow!("Failed to extract text: {}", e))
}

/// Decoded pixel data of every image XObject, in object order.
pub fn image_streams(pdf_path: &Path) -> Result<Vec<Vec<u8>>> {
    let doc = ::lopdf::Document::load(pdf_path)?;
    let mut images = Vec::new();
    for object in doc.objects.values() {
        if let ::lopdf::Object::Stream(stream) = object {
            let is_image = stream
                .dict
                .get(b"Subtype")
                .and_then(|s| s.as_name())
                .map(|name| name == b"Image")
                .unwrap_or(false);
            if is_image {
                let data = stream
                    .decompressed_content()
                    .unwrap_or_else(|_| stream.content.clone());
                images.push(data);
            }
        }
    }
    Ok(images)
}

/// Validates that a PDF is loadable and has basic structure.
pub fn is_valid_pdf(pdf_path: &Path) -> bool {
    ::lopdf::Document::load(pdf_path).is_ok()
}
