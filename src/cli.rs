//! CLI interface module
//!
//! Provides command-line interface using clap derive macros.

use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;

/// Exit codes for the CLI
///
/// These codes follow standard Unix conventions and provide
/// specific error categories for scripting and automation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum ExitCode {
    /// Normal completion
    Success = 0,
    /// General error
    GeneralError = 1,
    /// Argument error
    InvalidArgs = 2,
    /// Input file or directory not found
    InputNotFound = 3,
    /// Output error (permissions, unsupported format)
    OutputError = 4,
    /// One or more files failed to process
    ProcessingError = 5,
}

impl ExitCode {
    /// Convert to process exit code
    pub fn code(self) -> i32 {
        self as i32
    }

    /// Get human-readable description
    pub fn description(self) -> &'static str {
        match self {
            ExitCode::Success => "Success",
            ExitCode::GeneralError => "General error",
            ExitCode::InvalidArgs => "Invalid arguments",
            ExitCode::InputNotFound => "Input file or directory not found",
            ExitCode::OutputError => "Output error (permission denied, unsupported format, etc.)",
            ExitCode::ProcessingError => "Processing error",
        }
    }
}

impl From<ExitCode> for i32 {
    fn from(code: ExitCode) -> Self {
        code.code()
    }
}

impl From<ExitCode> for std::process::ExitCode {
    fn from(code: ExitCode) -> Self {
        std::process::ExitCode::from(code.code() as u8)
    }
}

/// Pad photos to print aspect ratios without resizing or cropping
#[derive(Parser, Debug)]
#[command(name = "printpad")]
#[command(version)]
#[command(about = "Pad photos to print aspect ratios without resizing or cropping", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Pad a photo or a directory of photos
    Pad(PadArgs),
    /// Show supported formats and configuration search paths
    Info,
}

/// Arguments for the pad command
#[derive(clap::Args, Debug)]
pub struct PadArgs {
    /// Input image file or directory
    pub input: PathBuf,

    /// Output directory
    #[arg(default_value = "./padded")]
    pub output: PathBuf,

    /// Target aspect ratio, e.g. "2:3", "4:5", "1:1"
    #[arg(short, long)]
    pub ratio: Option<String>,

    /// Even-border mode: uniform pixel border instead of a ratio
    #[arg(short, long)]
    pub even: bool,

    /// Border size in pixels for even-border mode
    #[arg(short, long)]
    pub margin: Option<u32>,

    /// Extra outer border in percent of the padded canvas
    #[arg(short, long)]
    pub border: Option<f64>,

    /// Border color as hex, e.g. "#FFFFFF"
    #[arg(short, long)]
    pub color: Option<String>,

    /// Do not carry the ICC color profile
    #[arg(long = "no-icc")]
    pub no_icc: bool,

    /// Do not carry the EXIF block
    #[arg(long = "no-exif")]
    pub no_exif: bool,

    /// Do not carry the stored DPI
    #[arg(long = "no-dpi")]
    pub no_dpi: bool,

    /// Apply the ratio exactly as given instead of following the
    /// source orientation
    #[arg(long = "exact-ratio")]
    pub exact_ratio: bool,

    /// Replace existing output files instead of skipping them
    #[arg(long)]
    pub overwrite: bool,

    /// JPEG quality (1-100)
    #[arg(short, long)]
    pub quality: Option<u8>,

    /// Number of parallel threads
    #[arg(short, long)]
    pub threads: Option<usize>,

    /// Configuration file path
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Verbosity level (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress progress output
    #[arg(long)]
    pub quiet: bool,
}

impl PadArgs {
    /// Get thread count (default to available CPUs)
    pub fn thread_count(&self) -> usize {
        self.threads.unwrap_or_else(num_cpus::get)
    }

    /// Build config overrides from these arguments
    pub fn to_overrides(&self) -> crate::config::CliOverrides {
        crate::config::CliOverrides {
            ratio: self.ratio.clone(),
            even: self.even.then_some(true),
            margin: self.margin,
            border_percent: self.border,
            color: self.color.clone(),
            preserve_icc: self.no_icc.then_some(false),
            preserve_exif: self.no_exif.then_some(false),
            preserve_dpi: self.no_dpi.then_some(false),
            jpeg_quality: self.quality,
            overwrite: self.overwrite.then_some(true),
            threads: self.threads,
            match_orientation: self.exact_ratio.then_some(false),
        }
    }
}

/// Create a styled progress bar for file processing
pub fn create_progress_bar(total: u64) -> ProgressBar {
    let pb = ProgressBar::new(total);
    pb.set_style(
        ProgressStyle::default_bar()
            .template(
                "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta})",
            )
            .expect("Invalid progress bar template")
            .progress_chars("#>-"),
    );
    pb
}

/// Create a spinner for indeterminate progress
pub fn create_spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg}")
            .expect("Invalid spinner template"),
    );
    pb.set_message(message.to_string());
    pb
}
