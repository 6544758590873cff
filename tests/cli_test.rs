//! CLI integration tests.
//!
//! Runs the actual binary: argument parsing, exit codes and the status
//! lines printed for single and bulk runs.

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

mod common;
use common::*;

fn pdfpatch_cmd() -> Command {
    assert_cmd::cargo::cargo_bin_cmd!("pdfpatch")
}

mod argument_parsing {
    use super::*;

    #[test]
    fn test_help_lists_subcommands() {
        pdfpatch_cmd()
            .arg("--help")
            .assert()
            .success()
            .stdout(predicate::str::contains("replace"))
            .stdout(predicate::str::contains("bulk"))
            .stdout(predicate::str::contains("mark"))
            .stdout(predicate::str::contains("extract"));
    }

    #[test]
    fn test_version_flag() {
        pdfpatch_cmd()
            .arg("--version")
            .assert()
            .success()
            .stdout(predicate::str::contains("pdfpatch"));
    }

    #[test]
    fn test_replace_help_documents_pairs() {
        pdfpatch_cmd()
            .args(["replace", "--help"])
            .assert()
            .success()
            .stdout(predicate::str::contains("OLD=NEW"))
            .stdout(predicate::str::contains("--fs-min"));
    }

    #[test]
    fn test_replace_requires_output() {
        pdfpatch_cmd()
            .args(["replace", "--input", "in.pdf", "--replace", "a=b"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("--output"));
    }

    #[test]
    fn test_mark_requires_label() {
        pdfpatch_cmd()
            .args(["mark", "--input", "in.pdf", "--output", "out.pdf"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("--label"));
    }

    #[test]
    fn test_malformed_pair_rejected() {
        pdfpatch_cmd()
            .args(["replace", "-i", "in.pdf", "-o", "out.pdf", "-r", "no-equals-sign"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("OLD=NEW"));
    }

    #[test]
    fn test_inverted_font_bounds_rejected() {
        pdfpatch_cmd()
            .args(["replace", "-i", "in.pdf", "-o", "out.pdf", "-r", "a=b"])
            .args(["--fs-min", "20", "--fs-max", "10"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("fs_min"));
    }
}

mod replace_command {
    use super::*;

    #[test]
    fn test_missing_input_fails() {
        let temp_dir = TempDir::new().unwrap();
        pdfpatch_cmd()
            .arg("replace")
            .arg("--input")
            .arg(temp_dir.path().join("absent.pdf"))
            .arg("--output")
            .arg(temp_dir.path().join("out.pdf"))
            .args(["--replace", "a=b"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("does not exist"));
    }

    #[test]
    fn test_no_replacements_fails() {
        let temp_dir = TempDir::new().unwrap();
        let input = create_salary_slip(&temp_dir.path().join("slip.pdf"), "4704.32").unwrap();

        pdfpatch_cmd()
            .arg("replace")
            .arg("--input")
            .arg(&input)
            .arg("--output")
            .arg(temp_dir.path().join("out.pdf"))
            .assert()
            .failure()
            .stderr(predicate::str::contains("No replacements"));
    }

    #[test]
    fn test_broken_config_fails() {
        let temp_dir = TempDir::new().unwrap();
        let input = create_salary_slip(&temp_dir.path().join("slip.pdf"), "4704.32").unwrap();
        let config = temp_dir.path().join("config.json");
        fs::write(&config, "{ \"replacements\": [ ").unwrap();

        pdfpatch_cmd()
            .arg("replace")
            .arg("--input")
            .arg(&input)
            .arg("--output")
            .arg(temp_dir.path().join("out.pdf"))
            .arg("--config")
            .arg(&config)
            .assert()
            .failure()
            .stderr(predicate::str::contains("config"));
    }

    #[test]
    fn test_replaces_amount() {
        let temp_dir = TempDir::new().unwrap();
        let input = create_salary_slip(&temp_dir.path().join("slip.pdf"), "4704.32").unwrap();
        let output = temp_dir.path().join("out.pdf");

        pdfpatch_cmd()
            .arg("replace")
            .arg("--input")
            .arg(&input)
            .arg("--output")
            .arg(&output)
            .args(["--replace", "4704.32=2723.00"])
            .assert()
            .success()
            .stdout(predicate::str::contains("Replaced 1 occurrence"));

        let _guard = mupdf_guard();
        assert_valid_pdf(&output);
        assert_occurrences(&output, "4704.32", 0);
        assert_occurrences(&output, "2723.00", 1);
    }

    #[test]
    fn test_config_file_and_inline_pairs_combine() {
        let temp_dir = TempDir::new().unwrap();
        let input = create_salary_slip(&temp_dir.path().join("slip.pdf"), "4704.32").unwrap();
        let config = write_config(&temp_dir.path().join("c.json"), &[("1415.68", "")]).unwrap();
        let output = temp_dir.path().join("out.pdf");

        pdfpatch_cmd()
            .arg("--verbose")
            .arg("replace")
            .arg("-i")
            .arg(&input)
            .arg("-o")
            .arg(&output)
            .arg("-c")
            .arg(&config)
            .args(["-r", "4704.32=2723.00"])
            .assert()
            .success()
            .stdout(predicate::str::contains("Replacements: 2"))
            .stdout(predicate::str::contains("Occurrences:     2"));

        let _guard = mupdf_guard();
        assert_occurrences(&output, "1415.68", 0);
        assert_occurrences(&output, "Income tax", 1);
    }

    #[test]
    fn test_absent_text_copies_unchanged() {
        let temp_dir = TempDir::new().unwrap();
        let input = create_salary_slip(&temp_dir.path().join("slip.pdf"), "4704.32").unwrap();
        let output = temp_dir.path().join("out.pdf");

        pdfpatch_cmd()
            .arg("replace")
            .arg("-i")
            .arg(&input)
            .arg("-o")
            .arg(&output)
            .args(["-r", "9999.99=1"])
            .assert()
            .success()
            .stdout(predicate::str::contains("copied unchanged"));

        assert_eq!(fs::read(&input).unwrap(), fs::read(&output).unwrap());
    }
}

mod bulk_command {
    use super::*;

    #[test]
    fn test_missing_src_dir_exits_2() {
        let temp_dir = TempDir::new().unwrap();
        let config = write_config(&temp_dir.path().join("c.json"), &[("a", "b")]).unwrap();

        pdfpatch_cmd()
            .arg("bulk")
            .arg("--src-dir")
            .arg(temp_dir.path().join("absent"))
            .arg("--config")
            .arg(&config)
            .assert()
            .code(2)
            .stderr(predicate::str::contains("Source dir does not exist"));
    }

    #[test]
    fn test_missing_src_dir_checked_before_config() {
        let temp_dir = TempDir::new().unwrap();

        pdfpatch_cmd()
            .arg("bulk")
            .arg("--src-dir")
            .arg(temp_dir.path().join("absent"))
            .arg("--config")
            .arg(temp_dir.path().join("absent.json"))
            .assert()
            .code(2)
            .stderr(predicate::str::contains("Source dir does not exist"));
    }

    #[test]
    fn test_empty_replacements_report_ok() {
        let temp_dir = TempDir::new().unwrap();
        let src = temp_dir.path().join("src");
        fs::create_dir(&src).unwrap();
        create_salary_slip(&src.join("july.pdf"), "4704.32").unwrap();
        let config = write_config(&temp_dir.path().join("c.json"), &[]).unwrap();

        pdfpatch_cmd()
            .arg("bulk")
            .arg("--src-dir")
            .arg(&src)
            .arg("--config")
            .arg(&config)
            .assert()
            .success()
            .stdout(predicate::str::contains(r#""status":"ok""#));

        assert_eq!(
            fs::read(src.join("july.pdf")).unwrap(),
            fs::read(src.join("_edited/july.pdf")).unwrap()
        );
    }

    #[test]
    fn test_no_pdfs_exits_1() {
        let temp_dir = TempDir::new().unwrap();
        let src = temp_dir.path().join("src");
        fs::create_dir(&src).unwrap();
        fs::write(src.join("readme.txt"), "not a pdf").unwrap();
        let config = write_config(&temp_dir.path().join("c.json"), &[("a", "b")]).unwrap();

        pdfpatch_cmd()
            .arg("bulk")
            .arg("--src-dir")
            .arg(&src)
            .arg("--config")
            .arg(&config)
            .assert()
            .code(1)
            .stderr(predicate::str::contains("No PDF files found"));
    }

    #[test]
    fn test_reports_one_line_per_document() {
        let temp_dir = TempDir::new().unwrap();
        let src = temp_dir.path().join("src");
        fs::create_dir(&src).unwrap();
        create_salary_slip(&src.join("july.pdf"), "4704.32").unwrap();
        fs::write(src.join("broken.pdf"), "not really a pdf").unwrap();
        let config =
            write_config(&temp_dir.path().join("c.json"), &[("4704.32", "2723.00")]).unwrap();

        let assert = pdfpatch_cmd()
            .arg("bulk")
            .arg("--src-dir")
            .arg(&src)
            .arg("--config")
            .arg(&config)
            .args(["--suffix", "_edited"])
            .assert()
            .success();

        let stdout = String::from_utf8_lossy(&assert.get_output().stdout).into_owned();
        let lines: Vec<serde_json::Value> = stdout
            .lines()
            .filter(|l| l.starts_with('{'))
            .map(|l| serde_json::from_str(l).unwrap())
            .collect();
        assert_eq!(lines.len(), 2);
        // sorted: broken.pdf first
        assert_eq!(lines[0]["status"], "error");
        assert_eq!(lines[1]["status"], "ok");

        let out = src.join("_edited").join("july_edited.pdf");
        let _guard = mupdf_guard();
        assert_occurrences(&out, "2723.00", 1);
    }
}

mod other_commands {
    use super::*;

    #[test]
    fn test_extract_to_stdout() {
        let temp_dir = TempDir::new().unwrap();
        let input = create_salary_slip(&temp_dir.path().join("slip.pdf"), "4704.32").unwrap();

        pdfpatch_cmd()
            .arg("extract")
            .arg("--input")
            .arg(&input)
            .assert()
            .success()
            .stdout(predicate::str::contains("Net pay"));
    }

    #[test]
    fn test_mark_reports_labels() {
        let temp_dir = TempDir::new().unwrap();
        let input = create_salary_slip(&temp_dir.path().join("slip.pdf"), "4704.32").unwrap();
        let output = temp_dir.path().join("marked.pdf");

        pdfpatch_cmd()
            .arg("mark")
            .arg("-i")
            .arg(&input)
            .arg("-o")
            .arg(&output)
            .args(["-l", "Net pay"])
            .assert()
            .success()
            .stdout(predicate::str::contains("Marked 1 label(s), 1 amount(s)"));

        assert_valid_pdf(&output);
    }
}
