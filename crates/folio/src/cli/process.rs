//! The `folio process` command: ingest one image into a gallery category.

use clap::Args;
use folio_core::{
    generate_rendition_path, CaptureMetadata, Config, ImagePipeline, ProcessedImageSet,
    ProcessingStep, ProgressObserver, RawImageInput, SizeKey, UploadValidator,
    RENDITION_CONTENT_TYPE,
};
use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Arguments for the `process` command.
#[derive(Args, Debug)]
pub struct ProcessArgs {
    /// Image file to ingest
    #[arg(required = true)]
    pub input: PathBuf,

    /// Gallery category slug the renditions are filed under
    #[arg(short, long)]
    pub category: String,

    /// Directory to write renditions into (defaults to storage.output_dir)
    #[arg(short, long)]
    pub output_dir: Option<PathBuf>,

    /// Run the pipeline and print the report without writing renditions
    #[arg(long)]
    pub no_write: bool,
}

/// JSON report printed to stdout after a run.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ProcessReport {
    source: String,
    category: String,
    content_type: &'static str,
    written: bool,
    original_width: u32,
    original_height: u32,
    renditions: Vec<RenditionReport>,
    metadata: CaptureMetadata,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct RenditionReport {
    size: SizeKey,
    width: u32,
    height: u32,
    byte_length: usize,
    path: String,
}

/// Shows the current pipeline step on a spinner.
struct SpinnerObserver {
    spinner: ProgressBar,
}

impl ProgressObserver for SpinnerObserver {
    fn on_step(&self, step: ProcessingStep) {
        tracing::debug!("Step: {}", step);
        self.spinner.set_message(step.to_string());
    }
}

/// Execute the process command.
pub async fn execute(args: ProcessArgs) -> anyhow::Result<()> {
    if !args.input.is_file() {
        anyhow::bail!(
            "Input file does not exist: {:?}\n\n  Hint: Check the file path and try again.",
            args.input
        );
    }
    validate_category(&args.category)?;

    let config = Config::load()?;
    let file_name = args
        .input
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("upload")
        .to_string();

    let bytes = tokio::fs::read(&args.input).await?;
    let input = RawImageInput::new(bytes).with_name(file_name.clone());
    UploadValidator::new(config.limits.clone()).validate(&input)?;

    let pipeline = ImagePipeline::new(&config);
    let spinner = create_spinner(&file_name)?;
    let observer = SpinnerObserver {
        spinner: spinner.clone(),
    };
    let result = pipeline.process_image(&input, &observer).await;
    spinner.finish_and_clear();
    let set = result?;

    let report = build_report(&set, &file_name, &args.category, !args.no_write);

    if args.no_write {
        tracing::info!("--no-write: skipping rendition output");
    } else {
        let output_dir = args
            .output_dir
            .clone()
            .unwrap_or_else(|| config.output_dir());
        write_renditions(&output_dir, &set, &report)?;
        tracing::info!("Renditions written under {:?}", output_dir);
    }

    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

/// Category slugs become a single path segment.
fn validate_category(slug: &str) -> anyhow::Result<()> {
    let valid = !slug.is_empty()
        && slug
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-' || c == '_');
    if !valid {
        anyhow::bail!(
            "Invalid category slug: {:?}\n\n  Hint: Use lowercase letters, digits, '-' and '_'.",
            slug
        );
    }
    Ok(())
}

fn build_report(
    set: &ProcessedImageSet,
    file_name: &str,
    category: &str,
    written: bool,
) -> ProcessReport {
    ProcessReport {
        source: file_name.to_string(),
        category: category.to_string(),
        content_type: RENDITION_CONTENT_TYPE,
        written,
        original_width: set.original_width,
        original_height: set.original_height,
        renditions: set
            .renditions()
            .into_iter()
            .map(|r| RenditionReport {
                size: r.size,
                width: r.width,
                height: r.height,
                byte_length: r.byte_length,
                path: generate_rendition_path(category, file_name, r.size),
            })
            .collect(),
        metadata: set.metadata.clone(),
    }
}

/// Write each rendition to `output_dir` joined with its storage key.
fn write_renditions(
    output_dir: &Path,
    set: &ProcessedImageSet,
    report: &ProcessReport,
) -> anyhow::Result<()> {
    for entry in &report.renditions {
        let target = output_dir.join(&entry.path);
        if let Some(parent) = target.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&target, &set.rendition(entry.size).bytes)?;
        tracing::debug!("Wrote {} ({} bytes)", target.display(), entry.byte_length);
    }
    Ok(())
}

fn create_spinner(file_name: &str) -> anyhow::Result<ProgressBar> {
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(ProgressStyle::default_spinner().template("{spinner:.green} {prefix} {msg}")?);
    spinner.set_prefix(file_name.to_string());
    spinner.set_message("starting...");
    spinner.enable_steady_tick(Duration::from_millis(100));
    Ok(spinner)
}
