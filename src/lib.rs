//! printpad - Pad photos to print aspect ratios without resizing or cropping
//!
//! Printing a photo at a standard size usually means cropping it or
//! letting the lab distort it. printpad takes the other route: it grows
//! the canvas around the untouched pixels until the frame matches the
//! target ratio, and carries the photo's ICC profile, EXIF block, and
//! print DPI onto the result.
//!
//! # Features
//!
//! - **Canvas Geometry** ([`geometry`]) - Resolve canvas size and placement
//!   for ratio or even-border padding
//! - **Compositing** ([`compositor`]) - Paint the border and place the
//!   source pixels byte-for-byte
//! - **Metadata** ([`metadata`]) - Carry ICC/EXIF blobs and read DPI from
//!   EXIF resolution tags
//! - **Reading** ([`reader`]) - Decode a photo together with its metadata
//! - **Writing** ([`writer`]) - Encode and re-embed metadata into the
//!   output container
//! - **Pipeline** ([`pipeline`]) - Single files and parallel directory
//!   batches
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use std::path::Path;
//! use printpad::{output_name, process_file, JobOptions};
//!
//! let options = JobOptions::default(); // 2:3, white border, keep metadata
//! let output = output_name(Path::new("photo.jpg"), Path::new("./padded"));
//! let report = process_file(Path::new("photo.jpg"), &output, &options).unwrap();
//! println!("canvas: {}x{}", report.canvas_size.0, report.canvas_size.1);
//! ```
//!
//! ## Using Builder Patterns
//!
//! All option structs support fluent builder patterns:
//!
//! ```rust
//! use printpad::{
//!     AspectRatio, BorderColor, JobOptions, PadMode, PaddingConfig, WriterOptions,
//! };
//!
//! let padding = PaddingConfig::builder()
//!     .mode(PadMode::Preset(AspectRatio::PRINT_4X5))
//!     .border_color(BorderColor::BLACK)
//!     .border_percent(0.05)
//!     .build();
//!
//! let options = JobOptions::builder()
//!     .padding(padding)
//!     .writer(WriterOptions::builder().jpeg_quality(100).build())
//!     .build();
//! ```
//!
//! # Architecture
//!
//! ```text
//! Photo Input -> Geometry Resolve -> Composite onto Canvas
//!                                          |
//!                        Metadata Carriage (ICC/EXIF/DPI)
//!                                          |
//!                                  Encoded Output
//! ```
//!
//! # License
//!
//! MIT

pub mod cli;
pub mod compositor;
pub mod config;
pub mod geometry;
pub mod metadata;
pub mod pipeline;
pub mod reader;
pub mod writer;

// Re-exports for convenience
pub use cli::{create_progress_bar, create_spinner, Cli, Commands, ExitCode, PadArgs};
pub use compositor::{
    composite, BorderColor, CompositeError, CompositeResult, CompositeWarning, PaddingConfig,
    PaddingConfigBuilder, SourceImage,
};
pub use config::{CliOverrides, Config, ConfigError};
pub use geometry::{
    outer_border, resolve, resolve_with_border, AspectRatio, CanvasPlan, GeometryError, PadMode,
};
pub use metadata::{dpi_from_exif, Resolution};
pub use pipeline::{
    collect_images, output_name, process_dir, process_file, BatchReport, FileReport, JobOptions,
    JobOptionsBuilder, OverwritePolicy, PipelineError, ProgressCallback, SilentProgress,
    OUTPUT_SUFFIX, SUPPORTED_EXTENSIONS,
};
pub use reader::{read_source, ReadError};
pub use writer::{
    write_composite, OutputFormat, WriteError, WriteReport, WriterOptions, WriterOptionsBuilder,
};
