//! Bulk runs over a directory of PDFs.
//!
//! Every `*.pdf` under the source directory is patched into the output
//! directory at the same relative path. A document that cannot be
//! processed is reported and skipped; the run always continues with the
//! next file.

use crate::engine::{PatchConfig, PatchSummary};
use crate::error::{PatchError, PatchResult};
use crate::service::PatchService;
use log::{info, warn};
use serde::Serialize;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Name of the default output directory inside the source directory.
pub const DEFAULT_OUT_DIR: &str = "_edited";

/// Where to look for documents and where to write them.
#[derive(Debug, Clone)]
pub struct BatchOptions {
    pub src_dir: PathBuf,
    pub out_dir: Option<PathBuf>,
    pub recursive: bool,
    /// Appended to the file stem, e.g. `slip.pdf` -> `slip_edited.pdf`.
    pub suffix: String,
}

impl BatchOptions {
    pub fn new(src_dir: impl Into<PathBuf>) -> Self {
        Self {
            src_dir: src_dir.into(),
            out_dir: None,
            recursive: false,
            suffix: String::new(),
        }
    }

    /// The output directory, `<src>/_edited` unless set.
    pub fn out_dir(&self) -> PathBuf {
        self.out_dir
            .clone()
            .unwrap_or_else(|| self.src_dir.join(DEFAULT_OUT_DIR))
    }

    /// Output path for `input`: same path relative to the source directory,
    /// rooted at the output directory, with the suffix before the extension.
    ///
    /// # Examples
    ///
    /// ```
    /// use pdfpatch::batch::BatchOptions;
    /// use std::path::Path;
    ///
    /// let mut options = BatchOptions::new("/slips");
    /// options.suffix = "_edited".to_string();
    /// assert_eq!(
    ///     options.output_for(Path::new("/slips/2025/07.pdf")),
    ///     Path::new("/slips/_edited/2025/07_edited.pdf")
    /// );
    /// ```
    pub fn output_for(&self, input: &Path) -> PathBuf {
        let relative = input.strip_prefix(&self.src_dir).unwrap_or(input);
        let relative = match relative.file_name() {
            Some(name) if relative.is_absolute() => PathBuf::from(name),
            _ => relative.to_path_buf(),
        };
        let mut out = self.out_dir().join(relative);
        if !self.suffix.is_empty() {
            let stem = out
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_default();
            let name = match out.extension() {
                Some(ext) => format!("{}{}.{}", stem, self.suffix, ext.to_string_lossy()),
                None => format!("{}{}", stem, self.suffix),
            };
            out.set_file_name(name);
        }
        out
    }

    /// PDFs to process, sorted. The output directory is never searched.
    pub fn discover(&self) -> PatchResult<Vec<PathBuf>> {
        if !self.src_dir.is_dir() {
            return Err(PatchError::InvalidInput {
                parameter: "src-dir".to_string(),
                reason: format!(
                    "'{}' does not exist or is not a directory",
                    self.src_dir.display()
                ),
            });
        }

        let out_dir = self.out_dir();
        let max_depth = if self.recursive { usize::MAX } else { 1 };
        let mut files: Vec<PathBuf> = WalkDir::new(&self.src_dir)
            .max_depth(max_depth)
            .into_iter()
            .filter_entry(|e| e.depth() == 0 || e.path() != out_dir)
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file() && is_pdf(e.path()))
            .map(|e| e.path().to_path_buf())
            .collect();
        files.sort();
        Ok(files)
    }
}

fn is_pdf(path: &Path) -> bool {
    path.extension()
        .map(|ext| ext.eq_ignore_ascii_case("pdf"))
        .unwrap_or(false)
}

/// Result class of one document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentStatus {
    Ok,
    SkippedEncrypted,
    Error,
}

/// Per-document status line.
#[derive(Debug, Clone, Serialize)]
pub struct DocumentOutcome {
    pub file: PathBuf,
    pub status: DocumentStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub out: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<PatchSummary>,
}

impl DocumentOutcome {
    fn from_result(file: &Path, out: &Path, result: PatchResult<PatchSummary>) -> Self {
        let (status, out, error, summary) = match result {
            Ok(summary) => (DocumentStatus::Ok, Some(out.to_path_buf()), None, Some(summary)),
            Err(e) if e.is_encrypted() => (DocumentStatus::SkippedEncrypted, None, None, None),
            Err(e) => (DocumentStatus::Error, None, Some(e.to_string()), None),
        };
        Self {
            file: file.to_path_buf(),
            status,
            out,
            error,
            summary,
        }
    }

    /// Single-line JSON form.
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| format!("{:?}", self))
    }
}

/// Outcomes of a whole run, in processing order.
#[derive(Debug, Clone, Default)]
pub struct BatchReport {
    pub outcomes: Vec<DocumentOutcome>,
}

impl BatchReport {
    pub fn count(&self, status: DocumentStatus) -> usize {
        self.outcomes.iter().filter(|o| o.status == status).count()
    }

    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }
}

/// Patches each file with `patch`, reporting every outcome as it happens.
pub fn process_files<P, R>(
    options: &BatchOptions,
    files: &[PathBuf],
    mut patch: P,
    mut report: R,
) -> BatchReport
where
    P: FnMut(&Path, &Path) -> PatchResult<PatchSummary>,
    R: FnMut(&DocumentOutcome),
{
    let mut batch = BatchReport::default();
    for file in files {
        let out = options.output_for(file);
        let result = match out.parent() {
            Some(parent) => std::fs::create_dir_all(parent)
                .map_err(|e| PatchError::Io {
                    path: parent.to_path_buf(),
                    source: e,
                })
                .and_then(|_| patch(file, &out)),
            None => patch(file, &out),
        };

        let outcome = DocumentOutcome::from_result(file, &out, result);
        match outcome.status {
            DocumentStatus::Ok => {}
            DocumentStatus::SkippedEncrypted => {
                warn!("{}: encrypted, skipped", file.display())
            }
            DocumentStatus::Error => warn!(
                "{}: {}",
                file.display(),
                outcome.error.as_deref().unwrap_or("unknown error")
            ),
        }
        report(&outcome);
        batch.outcomes.push(outcome);
    }

    info!(
        "batch done: {} ok, {} encrypted, {} failed",
        batch.count(DocumentStatus::Ok),
        batch.count(DocumentStatus::SkippedEncrypted),
        batch.count(DocumentStatus::Error)
    );
    batch
}

/// Patches one document of a batch. A config without replacements passes
/// the document through unchanged.
pub fn patch_document(
    service: &PatchService,
    config: &PatchConfig,
    input: &Path,
    output: &Path,
) -> PatchResult<PatchSummary> {
    if !config.replacements.is_empty() {
        return service.patch(input, output, config);
    }
    config.validate()?;
    std::fs::copy(input, output).map_err(|e| PatchError::Io {
        path: input.to_path_buf(),
        source: e,
    })?;
    Ok(PatchSummary::none())
}

/// Discovers and patches every PDF under `options.src_dir`.
pub fn run<R>(
    service: &PatchService,
    config: &PatchConfig,
    options: &BatchOptions,
    report: R,
) -> PatchResult<BatchReport>
where
    R: FnMut(&DocumentOutcome),
{
    let files = options.discover()?;
    Ok(process_files(
        options,
        &files,
        |input, output| patch_document(service, config, input, output),
        report,
    ))
}
