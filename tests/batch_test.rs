//! Bulk run tests: discovery, output paths and skip-and-report.
//!
//! The patch step is injected as a closure, so these tests exercise the
//! batch bookkeeping without opening a single PDF.

use pdfpatch::batch::{process_files, BatchOptions, DocumentOutcome, DocumentStatus};
use pdfpatch::{PatchError, PatchSummary};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

fn touch(path: &Path) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, b"%PDF-1.4\n").unwrap();
}

fn source_tree() -> TempDir {
    let dir = TempDir::new().unwrap();
    let root = dir.path();
    touch(&root.join("b.pdf"));
    touch(&root.join("a.PDF"));
    touch(&root.join("notes.txt"));
    touch(&root.join("2025/07.pdf"));
    touch(&root.join("2025/deep/08.pdf"));
    touch(&root.join("_edited/old.pdf"));
    dir
}

fn names(root: &Path, files: &[PathBuf]) -> Vec<String> {
    files
        .iter()
        .map(|f| {
            f.strip_prefix(root)
                .unwrap()
                .to_string_lossy()
                .replace('\\', "/")
        })
        .collect()
}

fn summary(occurrences: usize) -> PatchSummary {
    PatchSummary {
        pages_processed: 1,
        pages_modified: usize::from(occurrences > 0),
        occurrences,
        insertions: occurrences,
    }
}

mod discovery {
    use super::*;

    #[test]
    fn test_top_level_only_by_default() {
        let dir = source_tree();
        let files = BatchOptions::new(dir.path()).discover().unwrap();
        assert_eq!(names(dir.path(), &files), vec!["a.PDF", "b.pdf"]);
    }

    #[test]
    fn test_recursive_skips_output_dir() {
        let dir = source_tree();
        let mut options = BatchOptions::new(dir.path());
        options.recursive = true;

        let files = options.discover().unwrap();
        assert_eq!(
            names(dir.path(), &files),
            vec!["2025/07.pdf", "2025/deep/08.pdf", "a.PDF", "b.pdf"]
        );
    }

    #[test]
    fn test_custom_out_dir_inside_source_is_skipped() {
        let dir = source_tree();
        touch(&dir.path().join("patched/c.pdf"));
        let mut options = BatchOptions::new(dir.path());
        options.recursive = true;
        options.out_dir = Some(dir.path().join("patched"));

        let files = options.discover().unwrap();
        let found = names(dir.path(), &files);
        assert!(!found.iter().any(|f| f.starts_with("patched/")));
        // with a custom out dir the default one is ordinary input
        assert!(found.contains(&"_edited/old.pdf".to_string()));
    }

    #[test]
    fn test_empty_directory() {
        let dir = TempDir::new().unwrap();
        let files = BatchOptions::new(dir.path()).discover().unwrap();
        assert!(files.is_empty());
    }

    #[test]
    fn test_missing_directory_is_invalid_input() {
        let dir = TempDir::new().unwrap();
        let err = BatchOptions::new(dir.path().join("absent"))
            .discover()
            .unwrap_err();
        assert!(matches!(err, PatchError::InvalidInput { .. }));
    }
}

mod processing {
    use super::*;

    #[test]
    fn test_outputs_mirror_source_layout() {
        let dir = source_tree();
        let mut options = BatchOptions::new(dir.path());
        options.recursive = true;
        options.suffix = "_edited".to_string();
        let files = options.discover().unwrap();

        let mut written = Vec::new();
        let report = process_files(
            &options,
            &files,
            |input, output| {
                assert!(output.parent().unwrap().is_dir());
                fs::copy(input, output)?;
                written.push(output.to_path_buf());
                Ok(summary(1))
            },
            |_| {},
        );

        assert_eq!(report.count(DocumentStatus::Ok), 4);
        let out = dir.path().join("_edited");
        assert!(out.join("2025/deep/08_edited.pdf").is_file());
        assert!(out.join("a_edited.PDF").is_file());
        assert_eq!(written.len(), 4);
    }

    #[test]
    fn test_failures_are_reported_and_skipped() {
        let dir = source_tree();
        let options = BatchOptions::new(dir.path());
        let files = vec![
            dir.path().join("a.PDF"),
            dir.path().join("b.pdf"),
            dir.path().join("c.pdf"),
        ];

        let mut seen: Vec<DocumentOutcome> = Vec::new();
        let report = process_files(
            &options,
            &files,
            |input, _| match input.file_name().and_then(|n| n.to_str()) {
                Some("a.PDF") => Err(PatchError::Encrypted {
                    path: input.to_path_buf(),
                }),
                Some("b.pdf") => Err(PatchError::PdfProcessing {
                    message: "broken xref".to_string(),
                    page: None,
                    source: None,
                }),
                _ => Ok(summary(0)),
            },
            |outcome| seen.push(outcome.clone()),
        );

        let statuses: Vec<DocumentStatus> = report.outcomes.iter().map(|o| o.status).collect();
        assert_eq!(
            statuses,
            vec![
                DocumentStatus::SkippedEncrypted,
                DocumentStatus::Error,
                DocumentStatus::Ok
            ]
        );
        assert_eq!(seen.len(), 3);
        assert!(report.outcomes[0].error.is_none());
        assert!(report.outcomes[1]
            .error
            .as_deref()
            .unwrap()
            .contains("broken xref"));
        assert_eq!(
            report.outcomes[2].out.as_deref(),
            Some(dir.path().join("_edited/c.pdf").as_path())
        );
    }

    #[test]
    fn test_status_lines_are_json() {
        let dir = TempDir::new().unwrap();
        let options = BatchOptions::new(dir.path());
        let files = vec![dir.path().join("slip.pdf")];

        let mut lines = Vec::new();
        process_files(&options, &files, |_, _| Ok(summary(2)), |o| lines.push(o.to_json()));

        let value: serde_json::Value = serde_json::from_str(&lines[0]).unwrap();
        assert_eq!(value["status"], "ok");
        assert_eq!(value["summary"]["occurrences"], 2);
        assert!(value["out"].as_str().unwrap().ends_with("slip.pdf"));
        assert!(value.get("error").is_none());
    }

    #[test]
    fn test_empty_file_list() {
        let dir = TempDir::new().unwrap();
        let report = process_files(
            &BatchOptions::new(dir.path()),
            &[],
            |_, _| panic!("nothing to patch"),
            |_| {},
        );
        assert!(report.is_empty());
    }
}
