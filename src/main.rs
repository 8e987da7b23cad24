//! printpad - Pad photos to print aspect ratios without resizing or cropping
//!
//! CLI entry point

use clap::Parser;
use indicatif::ProgressBar;
use std::path::Path;
use printpad::{
    create_progress_bar,
    // Config
    Config,
    // Pipeline
    output_name, process_dir, process_file,
    // CLI
    Cli, Commands, ExitCode, PadArgs,
    FileReport, JobOptions, PipelineError, ProgressCallback, SUPPORTED_EXTENSIONS,
};

fn main() -> std::process::ExitCode {
    let cli = Cli::parse();

    let code = match cli.command {
        Commands::Pad(args) => run_pad(&args),
        Commands::Info => run_info(),
    };

    code.into()
}

// ============ Progress Callback Implementation ============

/// Progress callback driving an indicatif bar for batch runs
struct CliProgress {
    bar: ProgressBar,
    verbose: u8,
}

impl CliProgress {
    fn new(total: u64, verbose: u8, quiet: bool) -> Self {
        let bar = if quiet {
            ProgressBar::hidden()
        } else {
            create_progress_bar(total)
        };
        Self { bar, verbose }
    }

    fn finish(&self) {
        self.bar.finish_and_clear();
    }
}

impl ProgressCallback for CliProgress {
    fn on_file_done(&self, report: &FileReport) {
        if self.verbose > 0 {
            let line = if report.skipped {
                format!("Skipped (exists): {}", report.input.display())
            } else {
                format!(
                    "{} -> {} ({}x{} -> {}x{})",
                    report.input.display(),
                    report.output.display(),
                    report.source_size.0,
                    report.source_size.1,
                    report.canvas_size.0,
                    report.canvas_size.1,
                )
            };
            self.bar.println(line);
        }
        if self.verbose > 1 {
            for warning in &report.warnings {
                self.bar
                    .println(format!("  warning: {}: {warning}", report.input.display()));
            }
        }
        self.bar.inc(1);
    }

    fn on_file_error(&self, input: &Path, error: &PipelineError) {
        self.bar
            .println(format!("Error processing {}: {error}", input.display()));
        self.bar.inc(1);
    }
}

// ============ Pad Command ============

fn run_pad(args: &PadArgs) -> ExitCode {
    if !args.input.exists() {
        eprintln!("Error: Input path does not exist: {}", args.input.display());
        return ExitCode::InputNotFound;
    }

    // Load config file if specified, otherwise use the search path
    let file_config = match &args.config {
        Some(config_path) => match Config::load_from_path(config_path) {
            Ok(cfg) => cfg,
            Err(e) => {
                eprintln!("Error: Failed to load config file: {e}");
                return ExitCode::InvalidArgs;
            }
        },
        None => Config::load().unwrap_or_default(),
    };

    // Merge config file with CLI arguments (CLI takes precedence)
    let options = match file_config.merge_with_cli(&args.to_overrides()) {
        Ok(options) => options,
        Err(e) => {
            eprintln!("Error: {e}");
            return ExitCode::InvalidArgs;
        }
    };

    if args.input.is_file() {
        pad_single_file(args, &options)
    } else {
        pad_directory(args, &options)
    }
}

fn pad_single_file(args: &PadArgs, options: &JobOptions) -> ExitCode {
    if let Err(e) = std::fs::create_dir_all(&args.output) {
        eprintln!("Error: Cannot create output directory: {e}");
        return ExitCode::OutputError;
    }

    let output = output_name(&args.input, &args.output);
    match process_file(&args.input, &output, options) {
        Ok(report) => {
            if !args.quiet {
                if report.skipped {
                    println!("Skipped (exists): {}", output.display());
                } else {
                    for warning in &report.warnings {
                        eprintln!("Warning: {warning}");
                    }
                    println!(
                        "Padded {}x{} -> {}x{}: {}",
                        report.source_size.0,
                        report.source_size.1,
                        report.canvas_size.0,
                        report.canvas_size.1,
                        output.display()
                    );
                }
            }
            ExitCode::Success
        }
        Err(e) => {
            eprintln!("Error: {e}");
            match e {
                PipelineError::Read(_) => ExitCode::InputNotFound,
                PipelineError::Write(_) | PipelineError::OutputExists(_) => ExitCode::OutputError,
                _ => ExitCode::ProcessingError,
            }
        }
    }
}

fn pad_directory(args: &PadArgs, options: &JobOptions) -> ExitCode {
    let total = printpad::collect_images(&args.input)
        .map(|images| images.len() as u64)
        .unwrap_or(0);
    if total == 0 {
        eprintln!(
            "Error: No supported images found in {}",
            args.input.display()
        );
        return ExitCode::InputNotFound;
    }

    let progress = CliProgress::new(total, args.verbose, args.quiet);
    let report = match process_dir(&args.input, &args.output, options, &progress) {
        Ok(report) => report,
        Err(e) => {
            progress.finish();
            eprintln!("Error: {e}");
            return ExitCode::GeneralError;
        }
    };
    progress.finish();

    if !args.quiet {
        println!(
            "Done! Processed {} image(s), skipped {}, failed {} in {:.2}s",
            report.processed,
            report.skipped,
            report.failed.len(),
            report.elapsed_seconds
        );
    }

    if report.is_complete() {
        ExitCode::Success
    } else {
        for (input, error) in &report.failed {
            eprintln!("Failed: {}: {error}", input.display());
        }
        ExitCode::ProcessingError
    }
}

// ============ Info Command ============

fn run_info() -> ExitCode {
    println!("printpad v{}", env!("CARGO_PKG_VERSION"));
    println!();

    println!("Supported formats:");
    println!("  Input/output: {}", SUPPORTED_EXTENSIONS.join(", "));
    println!("  ICC profile carried in: png, jpg");
    println!("  EXIF and DPI carried in: png, jpg");

    println!();
    println!("Built-in ratios: 2:3, 4:5, 1:1 (custom via --ratio W:H)");

    println!();
    println!("System Information:");
    println!("  Platform: {}", std::env::consts::OS);
    println!("  Arch: {}", std::env::consts::ARCH);
    println!("  CPUs: {}", num_cpus::get());

    println!();
    println!("Config File Locations:");
    for path in Config::search_paths() {
        println!("  {}", path.display());
    }

    ExitCode::Success
}
