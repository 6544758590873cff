//! PDF text patch CLI.
//!
//! Replaces text in PDFs while keeping right-aligned columns aligned,
//! runs the same replacements over whole directories, and outlines the
//! amounts printed next to given labels.

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use log::LevelFilter;
use std::path::{Path, PathBuf};

use pdfpatch::batch::{self, BatchOptions, DocumentStatus};
use pdfpatch::{PatchConfig, PatchService, Replacement, StrokeStyle};

/// PDF text patch tool
///
/// Replace text in place without breaking column alignment, or locate
/// and outline the amounts next to labels.
#[derive(Parser)]
#[command(name = "pdfpatch")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Command-line overrides for the numeric config fields.
#[derive(Args, Debug, Default)]
struct Tuning {
    /// Erase margin around each occurrence
    #[arg(long)]
    pad: Option<f32>,

    /// Extra room reserved left of the replacement text
    #[arg(long)]
    slack: Option<f32>,

    /// Smallest font size used when the size must be estimated
    #[arg(long)]
    fs_min: Option<f32>,

    /// Largest font size used when the size must be estimated
    #[arg(long)]
    fs_max: Option<f32>,
}

#[derive(Subcommand)]
enum Commands {
    /// Replace text in one PDF
    Replace {
        /// Input PDF file path
        #[arg(short, long, value_name = "FILE")]
        input: PathBuf,

        /// Output PDF file path
        #[arg(short, long, value_name = "FILE")]
        output: PathBuf,

        /// JSON config with replacements
        #[arg(short, long, value_name = "FILE")]
        config: Option<PathBuf>,

        /// Replacement as OLD=NEW; OLD= deletes (can be specified multiple times)
        #[arg(short, long, value_name = "OLD=NEW")]
        replace: Vec<String>,

        #[command(flatten)]
        tuning: Tuning,
    },

    /// Replace text in every PDF of a directory
    Bulk {
        /// Directory containing PDFs
        #[arg(long, value_name = "DIR")]
        src_dir: PathBuf,

        /// JSON config with replacements
        #[arg(short, long, value_name = "FILE")]
        config: PathBuf,

        /// Output directory (default: <src-dir>/_edited)
        #[arg(long, value_name = "DIR")]
        out_dir: Option<PathBuf>,

        /// Recurse into subfolders
        #[arg(long)]
        recursive: bool,

        /// Suffix appended before .pdf (e.g. _edited)
        #[arg(long, default_value = "")]
        suffix: String,
    },

    /// Outline the amount next to each label
    Mark {
        /// Input PDF file path
        #[arg(short, long, value_name = "FILE")]
        input: PathBuf,

        /// Output PDF file path
        #[arg(short, long, value_name = "FILE")]
        output: PathBuf,

        /// Label text (can be specified multiple times)
        #[arg(short, long, value_name = "TEXT", required = true)]
        label: Vec<String>,

        /// Minimum vertical overlap with the label, as a share of the smaller height
        #[arg(long)]
        overlap_ratio: Option<f32>,

        /// Largest gap across which amount fragments are merged
        #[arg(long)]
        merge_gap: Option<f32>,
    },

    /// Extract text from a PDF (for debugging and verification)
    Extract {
        /// Input PDF file path
        #[arg(short, long, value_name = "FILE")]
        input: PathBuf,

        /// Output text file (optional, defaults to stdout)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,
    },
}

/// Builds the config for a single-document run.
fn build_config(config: Option<&Path>, replace: &[String], tuning: &Tuning) -> Result<PatchConfig> {
    let mut cfg = match config {
        Some(path) => PatchConfig::load(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => PatchConfig::default(),
    };

    for pair in replace {
        cfg.replacements.push(Replacement::parse_pair(pair)?);
    }
    if let Some(pad) = tuning.pad {
        cfg.pad = pad;
    }
    if let Some(slack) = tuning.slack {
        cfg.slack = slack;
    }
    if let Some(fs_min) = tuning.fs_min {
        cfg.font_min = fs_min;
    }
    if let Some(fs_max) = tuning.fs_max {
        cfg.font_max = fs_max;
    }
    cfg.validate()?;
    Ok(cfg)
}

/// Command handler with dependency injection.
struct PatchHandler {
    service: PatchService,
    verbose: bool,
}

impl PatchHandler {
    fn new(verbose: bool) -> Self {
        Self {
            service: PatchService::with_mupdf(),
            verbose,
        }
    }

    fn replace(&self, input: &Path, output: &Path, config: &PatchConfig) -> Result<()> {
        if !input.exists() {
            anyhow::bail!("Input file does not exist: {}", input.display());
        }
        if config.replacements.is_empty() {
            anyhow::bail!("No replacements specified. Use --config or --replace.");
        }

        if self.verbose {
            println!("Input:  {}", input.display());
            println!("Output: {}", output.display());
            println!("Replacements: {}", config.replacements.len());
        }

        let summary = self
            .service
            .patch(input, output, config)
            .with_context(|| "Replacement failed")?;

        if self.verbose {
            println!("\nPatch Summary:");
            println!("  Pages processed: {}", summary.pages_processed);
            println!("  Pages modified:  {}", summary.pages_modified);
            println!("  Occurrences:     {}", summary.occurrences);
            println!("  Insertions:      {}", summary.insertions);
        }

        if summary.has_changes() {
            println!(
                "✓ Replaced {} occurrence(s) → {}",
                summary.occurrences,
                output.display()
            );
        } else {
            println!("⚠ No occurrences found; copied unchanged → {}", output.display());
        }
        Ok(())
    }

    /// Returns the process exit code.
    fn bulk(&self, config: &PatchConfig, options: &BatchOptions) -> Result<i32> {
        let files = options.discover()?;
        if files.is_empty() {
            eprintln!("No PDF files found.");
            return Ok(1);
        }
        if self.verbose {
            println!("Found {} PDF file(s)", files.len());
        }

        let report = batch::process_files(
            options,
            &files,
            |input, output| batch::patch_document(&self.service, config, input, output),
            |outcome| println!("{}", outcome.to_json()),
        );

        if self.verbose {
            println!("\nBatch Summary:");
            println!("  Patched:   {}", report.count(DocumentStatus::Ok));
            println!("  Encrypted: {}", report.count(DocumentStatus::SkippedEncrypted));
            println!("  Failed:    {}", report.count(DocumentStatus::Error));
        }
        Ok(0)
    }

    fn mark(
        &self,
        input: &Path,
        output: &Path,
        config: &PatchConfig,
        labels: &[String],
    ) -> Result<()> {
        if !input.exists() {
            anyhow::bail!("Input file does not exist: {}", input.display());
        }

        let (summary, hits) = self
            .service
            .mark(input, output, config, labels, StrokeStyle::default())
            .with_context(|| "Marking failed")?;

        if self.verbose {
            for hit in &hits {
                match &hit.value {
                    Some(value) => {
                        println!("  page {}: '{}' → {}", hit.page_index + 1, hit.label, value)
                    }
                    None => println!(
                        "  page {}: '{}' → (no amount, label outlined)",
                        hit.page_index + 1,
                        hit.label
                    ),
                }
            }
        }

        if summary.labels_found > 0 {
            println!(
                "✓ Marked {} label(s), {} amount(s) → {}",
                summary.labels_found,
                summary.amounts_found,
                output.display()
            );
        } else {
            println!("⚠ No labels found");
        }
        Ok(())
    }

    fn extract(&self, input: &Path, output: Option<&Path>) -> Result<()> {
        if !input.exists() {
            anyhow::bail!("Input file does not exist: {}", input.display());
        }

        let text = self
            .service
            .extract_text(input)
            .with_context(|| "Text extraction failed")?;

        if let Some(output_path) = output {
            std::fs::write(output_path, &text)
                .with_context(|| format!("Failed to write to {}", output_path.display()))?;
            println!(
                "✓ Extracted {} characters → {}",
                text.len(),
                output_path.display()
            );
        } else {
            println!("{}", text);
        }
        Ok(())
    }
}

fn init_logging(verbose: bool) {
    let level = if verbose {
        LevelFilter::Info
    } else {
        LevelFilter::Warn
    };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .format_timestamp(None)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    let handler = PatchHandler::new(cli.verbose);

    match &cli.command {
        Commands::Replace {
            input,
            output,
            config,
            replace,
            tuning,
        } => {
            let cfg = build_config(config.as_deref(), replace, tuning)?;
            handler.replace(input, output, &cfg)?;
        }
        Commands::Bulk {
            src_dir,
            config,
            out_dir,
            recursive,
            suffix,
        } => {
            if !src_dir.is_dir() {
                eprintln!(
                    "Source dir does not exist or not a directory: {}",
                    src_dir.display()
                );
                std::process::exit(2);
            }
            let cfg = PatchConfig::load(config)
                .with_context(|| format!("Failed to load config {}", config.display()))?;
            let options = BatchOptions {
                src_dir: src_dir.clone(),
                out_dir: out_dir.clone(),
                recursive: *recursive,
                suffix: suffix.clone(),
            };
            let code = handler.bulk(&cfg, &options)?;
            if code != 0 {
                std::process::exit(code);
            }
        }
        Commands::Mark {
            input,
            output,
            label,
            overlap_ratio,
            merge_gap,
        } => {
            let mut cfg = PatchConfig::default();
            if let Some(ratio) = overlap_ratio {
                cfg.proximity.overlap_ratio = *ratio;
            }
            if let Some(gap) = merge_gap {
                cfg.proximity.merge_gap = *gap;
            }
            handler.mark(input, output, &cfg, label)?;
        }
        Commands::Extract { input, output } => {
            handler.extract(input, output.as_deref())?;
        }
    }

    Ok(())
}
