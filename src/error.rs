//! Error types for the PDF patch library.
//!
//! Style inference and amount location never fail outward; everything
//! that can fail (opening, searching, erasing, saving) reports through
//! [`PatchError`] with enough context to tell which document and page
//! was involved.

use std::fmt;
use std::io;
use std::path::PathBuf;

/// Result type alias for patch operations.
pub type PatchResult<T> = Result<T, PatchError>;

/// Error type for all patch operations.
#[derive(Debug)]
pub enum PatchError {
    /// Error occurred while reading or writing files
    Io { path: PathBuf, source: io::Error },

    /// Error occurred during PDF processing
    PdfProcessing {
        message: String,
        page: Option<usize>,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Token classifier regex failed to compile
    PatternError { pattern: String, reason: String },

    /// Text extraction failed
    TextExtraction { path: PathBuf, reason: String },

    /// Invalid configuration or parameters
    InvalidInput { parameter: String, reason: String },

    /// Configuration file could not be parsed
    Config { path: Option<PathBuf>, reason: String },

    /// Document is encrypted and the empty password did not open it
    Encrypted { path: PathBuf },

    /// Backend-specific error (MuPDF, LoPDF, etc.)
    BackendError {
        backend: String,
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },
}

impl PatchError {
    /// Wraps a backend failure that happened on a specific page.
    pub fn on_page<E>(page: usize, message: impl Into<String>, source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::PdfProcessing {
            message: message.into(),
            page: Some(page),
            source: Some(Box::new(source)),
        }
    }

    /// Wraps a MuPDF failure.
    pub fn mupdf<E>(message: impl Into<String>, source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::BackendError {
            backend: "MuPDF".to_string(),
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Returns true for documents that were skipped rather than failed.
    pub fn is_encrypted(&self) -> bool {
        matches!(self, Self::Encrypted { .. })
    }
}

impl fmt::Display for PatchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io { path, source } => {
                write!(f, "IO error for path '{}': {}", path.display(), source)
            }
            Self::PdfProcessing { message, page, .. } => {
                if let Some(p) = page {
                    write!(f, "PDF processing error on page {}: {}", p, message)
                } else {
                    write!(f, "PDF processing error: {}", message)
                }
            }
            Self::PatternError { pattern, reason } => {
                write!(f, "Pattern error for '{}': {}", pattern, reason)
            }
            Self::TextExtraction { path, reason } => {
                write!(
                    f,
                    "Text extraction failed for '{}': {}",
                    path.display(),
                    reason
                )
            }
            Self::InvalidInput { parameter, reason } => {
                write!(f, "Invalid input for '{}': {}", parameter, reason)
            }
            Self::Config { path, reason } => match path {
                Some(p) => write!(f, "Invalid config '{}': {}", p.display(), reason),
                None => write!(f, "Invalid config: {}", reason),
            },
            Self::Encrypted { path } => {
                write!(f, "Document '{}' is encrypted", path.display())
            }
            Self::BackendError {
                backend, message, ..
            } => {
                write!(f, "{} backend error: {}", backend, message)
            }
        }
    }
}

impl std::error::Error for PatchError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::PdfProcessing { source, .. } | Self::BackendError { source, .. } => source
                .as_ref()
                .map(|e| e.as_ref() as &(dyn std::error::Error + 'static)),
            _ => None,
        }
    }
}

impl From<io::Error> for PatchError {
    fn from(err: io::Error) -> Self {
        Self::BackendError {
            backend: "std::io".to_string(),
            message: err.to_string(),
            source: Some(Box::new(err)),
        }
    }
}

impl From<regex::Error> for PatchError {
    fn from(err: regex::Error) -> Self {
        Self::PatternError {
            pattern: "<unknown>".to_string(),
            reason: err.to_string(),
        }
    }
}

impl From<serde_json::Error> for PatchError {
    fn from(err: serde_json::Error) -> Self {
        Self::Config {
            path: None,
            reason: err.to_string(),
        }
    }
}

impl From<lopdf::Error> for PatchError {
    fn from(err: lopdf::Error) -> Self {
        Self::BackendError {
            backend: "LoPDF".to_string(),
            message: err.to_string(),
            source: None,
        }
    }
}

impl From<anyhow::Error> for PatchError {
    fn from(err: anyhow::Error) -> Self {
        Self::BackendError {
            backend: "anyhow".to_string(),
            message: err.to_string(),
            source: None,
        }
    }
}
