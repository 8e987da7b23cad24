//! Photo reading module
//!
//! Decodes an image file and lifts the embedded metadata (ICC profile,
//! raw EXIF block, print resolution) onto a [`SourceImage`]. The blobs are
//! carried as opaque bytes; only the EXIF resolution tags are interpreted,
//! to recover the stored DPI.

use image::{DynamicImage, ImageDecoder, ImageReader};
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::compositor::SourceImage;
use crate::metadata;

/// Read error types
#[derive(Debug, Error)]
pub enum ReadError {
    #[error("Image not found: {0}")]
    ImageNotFound(PathBuf),

    #[error("Failed to decode image {path}: {reason}")]
    Decode { path: PathBuf, reason: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, ReadError>;

/// Decode a photo and its embedded metadata from disk.
///
/// A file without an ICC profile, EXIF block, or stored DPI is perfectly
/// valid; the corresponding fields are simply absent on the result.
pub fn read_source(path: &Path) -> Result<SourceImage> {
    if !path.exists() {
        return Err(ReadError::ImageNotFound(path.to_path_buf()));
    }

    let decode_err = |e: image::ImageError| ReadError::Decode {
        path: path.to_path_buf(),
        reason: e.to_string(),
    };

    let mut decoder = ImageReader::open(path)?
        .with_guessed_format()?
        .into_decoder()
        .map_err(decode_err)?;

    // Metadata extraction failures are not decode failures; a truncated
    // iCCP chunk should not prevent padding the pixels.
    let icc_profile = decoder.icc_profile().ok().flatten();
    let exif = decoder.exif_metadata().ok().flatten();

    let pixels = DynamicImage::from_decoder(decoder).map_err(decode_err)?;

    let dpi = exif.as_deref().and_then(metadata::dpi_from_exif);

    let mut source = SourceImage::new(pixels);
    if let Some(icc) = icc_profile {
        if !icc.is_empty() {
            source = source.with_icc_profile(icc);
        }
    }
    if let Some(exif) = exif {
        if !exif.is_empty() {
            source = source.with_exif(exif);
        }
    }
    if let Some(dpi) = dpi {
        source = source.with_dpi(dpi);
    }

    Ok(source)
}
