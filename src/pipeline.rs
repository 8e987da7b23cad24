//! Pipeline processing module
//!
//! Provides a clean API for the padding pipeline, separating business
//! logic from CLI handling.
//!
//! ## Processing Steps
//!
//! 1. Decode the source photo and lift its metadata
//! 2. Resolve the canvas plan (ratio or even-border mode, plus the
//!    optional outer border)
//! 3. Composite the source onto the fresh canvas
//! 4. Encode and re-embed the carried metadata
//!
//! Directory batches run the same steps per file in parallel; one bad
//! file fails its own entry without aborting the batch.

use rayon::prelude::*;
use std::path::{Path, PathBuf};
use std::time::Instant;
use thiserror::Error;

use crate::compositor::{self, CompositeWarning, PaddingConfig};
use crate::geometry::{self, PadMode};
use crate::reader;
use crate::writer::{self, WriterOptions};

/// Pipeline processing error
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error(transparent)]
    Geometry(#[from] crate::geometry::GeometryError),

    #[error(transparent)]
    Composite(#[from] crate::compositor::CompositeError),

    #[error(transparent)]
    Read(#[from] crate::reader::ReadError),

    #[error(transparent)]
    Write(#[from] crate::writer::WriteError),

    #[error("Output already exists: {0}")]
    OutputExists(PathBuf),

    #[error("No supported images found in {0}")]
    NoImagesFound(PathBuf),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, PipelineError>;

/// Extensions accepted when scanning a directory
pub const SUPPORTED_EXTENSIONS: [&str; 6] = ["jpg", "jpeg", "png", "tif", "tiff", "webp"];

/// Suffix appended to the source stem for the output file name
pub const OUTPUT_SUFFIX: &str = "_padded";

// ============================================================
// Job Options
// ============================================================

/// What to do when the output file already exists
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OverwritePolicy {
    /// Leave the existing file and record the entry as skipped
    #[default]
    Skip,
    /// Replace the existing file
    Overwrite,
    /// Fail the entry
    Abort,
}

/// Options for a padding job
#[derive(Debug, Clone)]
pub struct JobOptions {
    /// Canvas and metadata configuration
    pub padding: PaddingConfig,
    /// Encoder configuration
    pub writer: WriterOptions,
    /// Existing-output handling
    pub overwrite: OverwritePolicy,
    /// Swap the target ratio's components to follow the source orientation
    pub match_orientation: bool,
    /// Worker thread count (None = rayon default)
    pub threads: Option<usize>,
}

impl Default for JobOptions {
    fn default() -> Self {
        Self {
            padding: PaddingConfig::default(),
            writer: WriterOptions::default(),
            overwrite: OverwritePolicy::Skip,
            match_orientation: true,
            threads: None,
        }
    }
}

impl JobOptions {
    /// Create a new options builder
    pub fn builder() -> JobOptionsBuilder {
        JobOptionsBuilder::default()
    }

    /// The effective padding mode for a source of the given dimensions.
    ///
    /// With orientation matching on, a ratio mode follows the source's
    /// orientation so a landscape photo padded to "2:3" gets a 3:2 canvas.
    pub fn effective_mode(&self, source_width: u32, source_height: u32) -> PadMode {
        if !self.match_orientation {
            return self.padding.mode;
        }
        match self.padding.mode {
            PadMode::Preset(r) => PadMode::Preset(r.matched_to(source_width, source_height)),
            PadMode::Custom(r) => PadMode::Custom(r.matched_to(source_width, source_height)),
            even @ PadMode::Even { .. } => even,
        }
    }
}

/// Builder for [`JobOptions`]
#[derive(Debug, Default)]
pub struct JobOptionsBuilder {
    options: JobOptions,
}

impl JobOptionsBuilder {
    /// Set the padding configuration
    #[must_use]
    pub fn padding(mut self, padding: PaddingConfig) -> Self {
        self.options.padding = padding;
        self
    }

    /// Set the encoder configuration
    #[must_use]
    pub fn writer(mut self, writer: WriterOptions) -> Self {
        self.options.writer = writer;
        self
    }

    /// Set the existing-output policy
    #[must_use]
    pub fn overwrite(mut self, policy: OverwritePolicy) -> Self {
        self.options.overwrite = policy;
        self
    }

    /// Set orientation matching for ratio modes
    #[must_use]
    pub fn match_orientation(mut self, enabled: bool) -> Self {
        self.options.match_orientation = enabled;
        self
    }

    /// Set the worker thread count
    #[must_use]
    pub fn threads(mut self, threads: Option<usize>) -> Self {
        self.options.threads = threads;
        self
    }

    /// Build the options
    #[must_use]
    pub fn build(self) -> JobOptions {
        self.options
    }
}

// ============================================================
// Progress Reporting
// ============================================================

/// Progress callback for batch processing
pub trait ProgressCallback: Sync {
    /// Called when a file begins processing
    fn on_file_start(&self, _input: &Path) {}
    /// Called when a file finishes (processed or skipped)
    fn on_file_done(&self, _report: &FileReport) {}
    /// Called when a file fails
    fn on_file_error(&self, _input: &Path, _error: &PipelineError) {}
}

/// No-op progress callback (silent mode)
pub struct SilentProgress;

impl ProgressCallback for SilentProgress {}

// ============================================================
// Reports
// ============================================================

/// Outcome of padding a single file
#[derive(Debug, Clone)]
pub struct FileReport {
    /// Source path
    pub input: PathBuf,
    /// Written output path
    pub output: PathBuf,
    /// Source dimensions
    pub source_size: (u32, u32),
    /// Canvas dimensions
    pub canvas_size: (u32, u32),
    /// True when the output existed and the policy left it in place
    pub skipped: bool,
    /// Non-fatal conditions recorded while compositing
    pub warnings: Vec<CompositeWarning>,
}

/// Outcome of a directory batch
#[derive(Debug)]
pub struct BatchReport {
    /// Files padded and written
    pub processed: usize,
    /// Files left in place by the overwrite policy
    pub skipped: usize,
    /// Files that failed, with their errors
    pub failed: Vec<(PathBuf, PipelineError)>,
    /// Per-file outcomes for the successful entries
    pub outcomes: Vec<FileReport>,
    /// Wall-clock batch time in seconds
    pub elapsed_seconds: f64,
}

impl BatchReport {
    /// Whether every file in the batch succeeded
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }
}

// ============================================================
// Single-file processing
// ============================================================

/// Output path for a source file: `photo.jpg` -> `photo_padded.jpg`
pub fn output_name(input: &Path, output_dir: &Path) -> PathBuf {
    let stem = input.file_stem().unwrap_or_default().to_string_lossy();
    let ext = input.extension().unwrap_or_default().to_string_lossy();
    if ext.is_empty() {
        output_dir.join(format!("{stem}{OUTPUT_SUFFIX}"))
    } else {
        output_dir.join(format!("{stem}{OUTPUT_SUFFIX}.{ext}"))
    }
}

/// Pad one photo onto its canvas and write the result.
///
/// The output keeps the source's container format. An existing output is
/// handled per the overwrite policy before the source is even decoded.
pub fn process_file(input: &Path, output: &Path, options: &JobOptions) -> Result<FileReport> {
    if output.exists() {
        match options.overwrite {
            OverwritePolicy::Abort => {
                return Err(PipelineError::OutputExists(output.to_path_buf()))
            }
            OverwritePolicy::Skip => {
                return Ok(FileReport {
                    input: input.to_path_buf(),
                    output: output.to_path_buf(),
                    source_size: (0, 0),
                    canvas_size: (0, 0),
                    skipped: true,
                    warnings: Vec::new(),
                })
            }
            OverwritePolicy::Overwrite => {}
        }
    }

    let source = reader::read_source(input)?;
    let mode = options.effective_mode(source.width(), source.height());
    let plan = geometry::resolve_with_border(
        source.width(),
        source.height(),
        &mode,
        options.padding.border_percent,
    )?;

    let result = compositor::composite(&source, &plan, &options.padding)?;
    writer::write_composite(&result, output, &options.writer)?;

    Ok(FileReport {
        input: input.to_path_buf(),
        output: output.to_path_buf(),
        source_size: (source.width(), source.height()),
        canvas_size: (plan.target_width, plan.target_height),
        skipped: false,
        warnings: result.warnings,
    })
}

// ============================================================
// Directory batches
// ============================================================

/// Collect the supported images directly under `dir`, sorted by name
pub fn collect_images(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut images: Vec<PathBuf> = std::fs::read_dir(dir)?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| {
            path.is_file()
                && path
                    .extension()
                    .and_then(|e| e.to_str())
                    .map(str::to_ascii_lowercase)
                    .is_some_and(|ext| SUPPORTED_EXTENSIONS.contains(&ext.as_str()))
        })
        .collect();
    images.sort();

    if images.is_empty() {
        return Err(PipelineError::NoImagesFound(dir.to_path_buf()));
    }
    Ok(images)
}

/// Pad every supported image in `input_dir` into `output_dir`.
///
/// Files process in parallel; a failed file lands in the report's failure
/// list without stopping the others.
pub fn process_dir<P: ProgressCallback>(
    input_dir: &Path,
    output_dir: &Path,
    options: &JobOptions,
    progress: &P,
) -> Result<BatchReport> {
    let start_time = Instant::now();

    let images = collect_images(input_dir)?;
    std::fs::create_dir_all(output_dir)?;

    let run = || -> Vec<(PathBuf, Result<FileReport>)> {
        images
            .par_iter()
            .map(|input| {
                progress.on_file_start(input);
                let output = output_name(input, output_dir);
                let result = process_file(input, &output, options);
                match &result {
                    Ok(report) => progress.on_file_done(report),
                    Err(error) => progress.on_file_error(input, error),
                }
                (input.clone(), result)
            })
            .collect()
    };

    let results = match options.threads {
        Some(threads) => rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .build()
            .map_err(|e| {
                PipelineError::Io(std::io::Error::other(format!(
                    "failed to build worker pool: {e}"
                )))
            })?
            .install(run),
        None => run(),
    };

    let mut report = BatchReport {
        processed: 0,
        skipped: 0,
        failed: Vec::new(),
        outcomes: Vec::new(),
        elapsed_seconds: 0.0,
    };
    for (input, result) in results {
        match result {
            Ok(file) => {
                if file.skipped {
                    report.skipped += 1;
                } else {
                    report.processed += 1;
                }
                report.outcomes.push(file);
            }
            Err(error) => report.failed.push((input, error)),
        }
    }
    report.elapsed_seconds = start_time.elapsed().as_secs_f64();

    Ok(report)
}
