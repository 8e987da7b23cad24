//! Photo writing module
//!
//! Encodes a composited canvas to disk and re-embeds the carried metadata.
//! The ICC profile goes through the format encoder; the EXIF block and DPI
//! are spliced into the written container byte-for-byte (JPEG APP1/APP0
//! segments, PNG eXIf/pHYs chunks), so the blobs survive unmodified.
//!
//! Metadata the chosen container cannot hold is surfaced as an error, not
//! silently dropped; silent loss would break the tool's core promise.

use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::{CompressionType, FilterType, PngEncoder};
use image::codecs::tiff::TiffEncoder;
use image::codecs::webp::WebPEncoder;
use image::{ExtendedColorType, ImageEncoder};
use std::fs;
use std::io::Cursor;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::compositor::CompositeResult;
use crate::metadata::Resolution;

/// Write error types
#[derive(Debug, Error)]
pub enum WriteError {
    #[error("Unsupported output format: {0}")]
    UnsupportedFormat(String),

    #[error("Failed to encode image: {0}")]
    Encode(String),

    #[error("Metadata preservation failed: {0}")]
    MetadataPreservationFailed(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, WriteError>;

/// Default JPEG quality; padding is a final export step, so quality
/// stays at maximum
pub const DEFAULT_JPEG_QUALITY: u8 = 100;

// ============================================================
// Output Format
// ============================================================

/// Supported output containers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Png,
    Jpeg,
    Tiff,
    WebP,
}

impl OutputFormat {
    /// Derive the format from a file extension
    pub fn from_path(path: &Path) -> Result<Self> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
            .unwrap_or_default();
        match ext.as_str() {
            "png" => Ok(OutputFormat::Png),
            "jpg" | "jpeg" => Ok(OutputFormat::Jpeg),
            "tif" | "tiff" => Ok(OutputFormat::Tiff),
            "webp" => Ok(OutputFormat::WebP),
            _ => Err(WriteError::UnsupportedFormat(path.display().to_string())),
        }
    }

    /// Whether the encoder can embed an ICC profile in this container
    pub fn supports_icc(&self) -> bool {
        matches!(self, OutputFormat::Png | OutputFormat::Jpeg)
    }

    /// Whether an EXIF block / DPI tag can be spliced into this container
    pub fn supports_exif(&self) -> bool {
        matches!(self, OutputFormat::Png | OutputFormat::Jpeg)
    }
}

// ============================================================
// Writer Options
// ============================================================

/// Encoding options
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriterOptions {
    /// JPEG quality (1-100)
    pub jpeg_quality: u8,
}

impl Default for WriterOptions {
    fn default() -> Self {
        Self {
            jpeg_quality: DEFAULT_JPEG_QUALITY,
        }
    }
}

impl WriterOptions {
    /// Create a new options builder
    pub fn builder() -> WriterOptionsBuilder {
        WriterOptionsBuilder::default()
    }
}

/// Builder for [`WriterOptions`]
#[derive(Debug, Default)]
pub struct WriterOptionsBuilder {
    options: WriterOptions,
}

impl WriterOptionsBuilder {
    /// Set JPEG quality (clamped to 1-100)
    #[must_use]
    pub fn jpeg_quality(mut self, quality: u8) -> Self {
        self.options.jpeg_quality = quality.clamp(1, 100);
        self
    }

    /// Build the options
    #[must_use]
    pub fn build(self) -> WriterOptions {
        self.options
    }
}

/// Write operation result
#[derive(Debug, Clone)]
pub struct WriteReport {
    pub output_path: PathBuf,
    pub format: OutputFormat,
    pub bytes_written: u64,
}

// ============================================================
// Writer
// ============================================================

/// Encode a composited canvas to `output` with its metadata attached.
///
/// The format follows the output extension. Carried metadata the format
/// cannot hold fails with `MetadataPreservationFailed` before any bytes
/// are written.
pub fn write_composite(
    result: &CompositeResult,
    output: &Path,
    options: &WriterOptions,
) -> Result<WriteReport> {
    let format = OutputFormat::from_path(output)?;

    if result.icc_profile.is_some() && !format.supports_icc() {
        return Err(WriteError::MetadataPreservationFailed(format!(
            "{format:?} output cannot embed the carried ICC profile"
        )));
    }
    if (result.exif.is_some() || result.dpi.is_some()) && !format.supports_exif() {
        return Err(WriteError::MetadataPreservationFailed(format!(
            "{format:?} output cannot embed the carried EXIF/DPI metadata"
        )));
    }

    let mut encoded = encode_pixels(result, format, options)?;

    match format {
        OutputFormat::Jpeg => {
            if let Some(exif) = result.exif.as_deref() {
                encoded = jpeg_meta::insert_exif(&encoded, exif)?;
            }
            if let Some(dpi) = result.dpi {
                let patched = jpeg_meta::patch_jfif_density(&mut encoded, dpi);
                if !patched && result.exif.is_none() {
                    return Err(WriteError::MetadataPreservationFailed(
                        "JPEG output has no JFIF header to carry the DPI".to_string(),
                    ));
                }
            }
        }
        OutputFormat::Png => {
            if let Some(exif) = result.exif.as_deref() {
                png_meta::insert_chunk(&mut encoded, b"eXIf", exif)?;
            }
            if let Some(dpi) = result.dpi {
                let data = png_meta::phys_data(dpi);
                png_meta::insert_chunk(&mut encoded, b"pHYs", &data)?;
            }
        }
        OutputFormat::Tiff | OutputFormat::WebP => {}
    }

    fs::write(output, &encoded)?;

    Ok(WriteReport {
        output_path: output.to_path_buf(),
        format,
        bytes_written: encoded.len() as u64,
    })
}

fn encode_pixels(
    result: &CompositeResult,
    format: OutputFormat,
    options: &WriterOptions,
) -> Result<Vec<u8>> {
    let pixels = &result.pixels;
    let (width, height) = (pixels.width(), pixels.height());
    let color: ExtendedColorType = pixels.color().into();
    let encode_err = |e: image::ImageError| WriteError::Encode(e.to_string());
    let icc_err = |e: image::error::UnsupportedError| {
        WriteError::MetadataPreservationFailed(format!("encoder rejected the ICC profile: {e}"))
    };

    let mut out = Vec::new();
    match format {
        OutputFormat::Png => {
            let mut encoder = PngEncoder::new_with_quality(
                &mut out,
                CompressionType::Default,
                FilterType::Adaptive,
            );
            if let Some(icc) = &result.icc_profile {
                encoder.set_icc_profile(icc.clone()).map_err(icc_err)?;
            }
            encoder
                .write_image(pixels.as_bytes(), width, height, color)
                .map_err(encode_err)?;
        }
        OutputFormat::Jpeg => {
            let mut encoder = JpegEncoder::new_with_quality(&mut out, options.jpeg_quality);
            if let Some(icc) = &result.icc_profile {
                encoder.set_icc_profile(icc.clone()).map_err(icc_err)?;
            }
            encoder
                .write_image(pixels.as_bytes(), width, height, color)
                .map_err(encode_err)?;
        }
        OutputFormat::Tiff => {
            let encoder = TiffEncoder::new(Cursor::new(&mut out));
            encoder
                .write_image(pixels.as_bytes(), width, height, color)
                .map_err(encode_err)?;
        }
        OutputFormat::WebP => {
            let encoder = WebPEncoder::new_lossless(&mut out);
            encoder
                .write_image(pixels.as_bytes(), width, height, color)
                .map_err(encode_err)?;
        }
    }
    Ok(out)
}

// ============================================================
// JPEG metadata splicing
// ============================================================

mod jpeg_meta {
    use super::{Resolution, Result, WriteError};

    const SOI: [u8; 2] = [0xFF, 0xD8];
    const APP0: u8 = 0xE0;
    const APP1: u8 = 0xE1;
    const SOS: u8 = 0xDA;
    const EOI: u8 = 0xD9;
    const EXIF_ID: &[u8] = b"Exif\0\0";
    const JFIF_ID: &[u8] = b"JFIF\0";

    /// Insert an APP1 Exif segment right after SOI
    pub fn insert_exif(encoded: &[u8], exif: &[u8]) -> Result<Vec<u8>> {
        if !encoded.starts_with(&SOI) {
            return Err(WriteError::Encode("encoder produced no JPEG SOI".to_string()));
        }
        // Segment length covers the two length bytes plus the payload
        let seg_len = exif.len() + EXIF_ID.len() + 2;
        if seg_len > u16::MAX as usize {
            return Err(WriteError::MetadataPreservationFailed(format!(
                "EXIF block of {} bytes does not fit a JPEG APP1 segment",
                exif.len()
            )));
        }

        let mut out = Vec::with_capacity(encoded.len() + seg_len + 2);
        out.extend_from_slice(&SOI);
        out.push(0xFF);
        out.push(APP1);
        out.extend_from_slice(&(seg_len as u16).to_be_bytes());
        out.extend_from_slice(EXIF_ID);
        out.extend_from_slice(exif);
        out.extend_from_slice(&encoded[2..]);
        Ok(out)
    }

    /// Set the pixel density fields of the JFIF APP0 header in place.
    ///
    /// Returns false when the stream carries no JFIF header to patch.
    pub fn patch_jfif_density(encoded: &mut [u8], dpi: Resolution) -> bool {
        let clamp = |v: f64| -> [u8; 2] { (v.round().clamp(1.0, 65535.0) as u16).to_be_bytes() };

        let mut i = 2; // skip SOI
        while i + 4 <= encoded.len() {
            if encoded[i] != 0xFF {
                return false;
            }
            let marker = encoded[i + 1];
            if marker == SOS || marker == EOI {
                return false;
            }
            let seg_len =
                u16::from_be_bytes([encoded[i + 2], encoded[i + 3]]) as usize;
            if seg_len < 2 || i + 2 + seg_len > encoded.len() {
                return false;
            }
            // APP0 payload: "JFIF\0" version(2) units(1) Xdensity(2) Ydensity(2) ...
            if marker == APP0
                && seg_len >= 2 + JFIF_ID.len() + 7
                && &encoded[i + 4..i + 4 + JFIF_ID.len()] == JFIF_ID
            {
                let units = i + 4 + JFIF_ID.len() + 2;
                encoded[units] = 1; // dots per inch
                encoded[units + 1..units + 3].copy_from_slice(&clamp(dpi.x));
                encoded[units + 3..units + 5].copy_from_slice(&clamp(dpi.y));
                return true;
            }
            i += 2 + seg_len;
        }
        false
    }
}

// ============================================================
// PNG metadata splicing
// ============================================================

mod png_meta {
    use super::{Resolution, Result, WriteError};

    const SIGNATURE: &[u8] = b"\x89PNG\r\n\x1a\n";
    /// Signature + IHDR (length, tag, 13 data bytes, CRC)
    const AFTER_IHDR: usize = 8 + 4 + 4 + 13 + 4;
    /// Pixels per meter for one dot per inch
    const PPM_PER_DPI: f64 = 1000.0 / 25.4;

    /// Insert a chunk immediately after IHDR
    pub fn insert_chunk(encoded: &mut Vec<u8>, tag: &[u8; 4], data: &[u8]) -> Result<()> {
        if !encoded.starts_with(SIGNATURE) || encoded.len() < AFTER_IHDR {
            return Err(WriteError::Encode(
                "encoder produced no PNG IHDR".to_string(),
            ));
        }
        if data.len() > u32::MAX as usize {
            return Err(WriteError::MetadataPreservationFailed(format!(
                "{} byte block does not fit a PNG chunk",
                data.len()
            )));
        }

        let mut chunk = Vec::with_capacity(data.len() + 12);
        chunk.extend_from_slice(&(data.len() as u32).to_be_bytes());
        chunk.extend_from_slice(tag);
        chunk.extend_from_slice(data);
        chunk.extend_from_slice(&crc32(tag, data).to_be_bytes());

        encoded.splice(AFTER_IHDR..AFTER_IHDR, chunk);
        Ok(())
    }

    /// pHYs chunk data for a print resolution
    pub fn phys_data(dpi: Resolution) -> [u8; 9] {
        let ppm = |v: f64| ((v * PPM_PER_DPI).round().max(1.0) as u32).to_be_bytes();
        let mut data = [0u8; 9];
        data[0..4].copy_from_slice(&ppm(dpi.x));
        data[4..8].copy_from_slice(&ppm(dpi.y));
        data[8] = 1; // unit: meter
        data
    }

    pub(super) fn crc32(tag: &[u8], data: &[u8]) -> u32 {
        static TABLE: std::sync::OnceLock<[u32; 256]> = std::sync::OnceLock::new();
        let table = TABLE.get_or_init(|| {
            let mut t = [0u32; 256];
            for n in 0..256u32 {
                let mut c = n;
                for _ in 0..8 {
                    c = if c & 1 != 0 { 0xEDB8_8320 ^ (c >> 1) } else { c >> 1 };
                }
                t[n as usize] = c;
            }
            t
        });
        let mut c = 0xFFFF_FFFFu32;
        for &b in tag.iter().chain(data.iter()) {
            c = table[((c ^ b as u32) & 0xFF) as usize] ^ (c >> 8);
        }
        c ^ 0xFFFF_FFFF
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compositor::CompositeResult;
    use image::{DynamicImage, ImageBuffer, Rgb};

    fn small_result() -> CompositeResult {
        CompositeResult {
            pixels: DynamicImage::ImageRgb8(ImageBuffer::from_fn(9, 7, |x, y| {
                Rgb([x as u8 * 20, y as u8 * 30, 77])
            })),
            icc_profile: None,
            exif: None,
            dpi: None,
            warnings: Vec::new(),
        }
    }

    /// Minimal little-endian EXIF block carrying only resolution tags
    fn resolution_exif(dpi: u32) -> Vec<u8> {
        let mut d = Vec::new();
        d.extend_from_slice(b"II");
        d.extend_from_slice(&42u16.to_le_bytes());
        d.extend_from_slice(&8u32.to_le_bytes());
        d.extend_from_slice(&3u16.to_le_bytes());
        for (tag, offset) in [(0x011Au16, 50u32), (0x011B, 58)] {
            d.extend_from_slice(&tag.to_le_bytes());
            d.extend_from_slice(&5u16.to_le_bytes());
            d.extend_from_slice(&1u32.to_le_bytes());
            d.extend_from_slice(&offset.to_le_bytes());
        }
        d.extend_from_slice(&0x0128u16.to_le_bytes());
        d.extend_from_slice(&3u16.to_le_bytes());
        d.extend_from_slice(&1u32.to_le_bytes());
        d.extend_from_slice(&2u32.to_le_bytes());
        d.extend_from_slice(&0u32.to_le_bytes());
        for _ in 0..2 {
            d.extend_from_slice(&dpi.to_le_bytes());
            d.extend_from_slice(&1u32.to_le_bytes());
        }
        d
    }

    #[test]
    fn test_output_format_from_path() {
        assert_eq!(
            OutputFormat::from_path(Path::new("a.png")).unwrap(),
            OutputFormat::Png
        );
        assert_eq!(
            OutputFormat::from_path(Path::new("a.JPG")).unwrap(),
            OutputFormat::Jpeg
        );
        assert_eq!(
            OutputFormat::from_path(Path::new("a.jpeg")).unwrap(),
            OutputFormat::Jpeg
        );
        assert_eq!(
            OutputFormat::from_path(Path::new("a.tif")).unwrap(),
            OutputFormat::Tiff
        );
        assert_eq!(
            OutputFormat::from_path(Path::new("a.webp")).unwrap(),
            OutputFormat::WebP
        );
        assert!(matches!(
            OutputFormat::from_path(Path::new("a.gif")),
            Err(WriteError::UnsupportedFormat(_))
        ));
        assert!(OutputFormat::from_path(Path::new("no_extension")).is_err());
    }

    #[test]
    fn test_write_png_pixels_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("padded.png");
        let result = small_result();

        let report = write_composite(&result, &out, &WriterOptions::default()).unwrap();
        assert_eq!(report.format, OutputFormat::Png);
        assert!(report.bytes_written > 0);

        let back = image::open(&out).unwrap();
        assert_eq!(back.to_rgb8().as_raw(), result.pixels.to_rgb8().as_raw());
    }

    #[test]
    fn test_write_png_icc_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("padded.png");
        let icc = vec![7u8; 64];
        let result = CompositeResult {
            icc_profile: Some(icc.clone()),
            ..small_result()
        };

        write_composite(&result, &out, &WriterOptions::default()).unwrap();

        let source = crate::reader::read_source(&out).unwrap();
        assert_eq!(source.icc_profile(), Some(icc.as_slice()));
    }

    #[test]
    fn test_write_png_exif_and_dpi_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("padded.png");
        let exif = resolution_exif(300);
        let result = CompositeResult {
            exif: Some(exif.clone()),
            dpi: Some(Resolution::uniform(300.0)),
            ..small_result()
        };

        write_composite(&result, &out, &WriterOptions::default()).unwrap();

        let source = crate::reader::read_source(&out).unwrap();
        assert_eq!(source.exif(), Some(exif.as_slice()));
        assert_eq!(source.dpi(), Some(Resolution::uniform(300.0)));
    }

    #[test]
    fn test_write_jpeg_exif_segment_present() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("padded.jpg");
        let result = CompositeResult {
            exif: Some(resolution_exif(240)),
            ..small_result()
        };

        write_composite(&result, &out, &WriterOptions::default()).unwrap();

        let bytes = std::fs::read(&out).unwrap();
        assert!(bytes.starts_with(&[0xFF, 0xD8, 0xFF, 0xE1]));
        assert_eq!(&bytes[6..12], b"Exif\0\0");
    }

    #[test]
    fn test_write_jpeg_jfif_density_patched() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("padded.jpg");
        let result = CompositeResult {
            dpi: Some(Resolution::uniform(300.0)),
            ..small_result()
        };

        write_composite(&result, &out, &WriterOptions::default()).unwrap();

        let bytes = std::fs::read(&out).unwrap();
        let jfif = bytes
            .windows(5)
            .position(|w| w == b"JFIF\0")
            .expect("JFIF header");
        // units byte follows the 2 version bytes
        assert_eq!(bytes[jfif + 7], 1);
        assert_eq!(u16::from_be_bytes([bytes[jfif + 8], bytes[jfif + 9]]), 300);
        assert_eq!(u16::from_be_bytes([bytes[jfif + 10], bytes[jfif + 11]]), 300);
    }

    #[test]
    fn test_webp_rejects_carried_icc() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("padded.webp");
        let result = CompositeResult {
            icc_profile: Some(vec![1, 2, 3]),
            ..small_result()
        };

        let err = write_composite(&result, &out, &WriterOptions::default());
        assert!(matches!(
            err,
            Err(WriteError::MetadataPreservationFailed(_))
        ));
        assert!(!out.exists(), "nothing must be written on failure");
    }

    #[test]
    fn test_tiff_rejects_carried_exif() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("padded.tif");
        let result = CompositeResult {
            exif: Some(vec![1, 2, 3]),
            ..small_result()
        };

        assert!(matches!(
            write_composite(&result, &out, &WriterOptions::default()),
            Err(WriteError::MetadataPreservationFailed(_))
        ));
    }

    #[test]
    fn test_plain_tiff_and_webp_write() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["plain.tif", "plain.webp"] {
            let out = dir.path().join(name);
            write_composite(&small_result(), &out, &WriterOptions::default()).unwrap();
            let back = image::open(&out).unwrap();
            assert_eq!(
                back.to_rgb8().as_raw(),
                small_result().pixels.to_rgb8().as_raw(),
                "{name}"
            );
        }
    }

    #[test]
    fn test_oversized_exif_rejected_for_jpeg() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("padded.jpg");
        let result = CompositeResult {
            exif: Some(vec![0u8; 70_000]),
            ..small_result()
        };

        assert!(matches!(
            write_composite(&result, &out, &WriterOptions::default()),
            Err(WriteError::MetadataPreservationFailed(_))
        ));
    }

    #[test]
    fn test_writer_options_builder_clamps_quality() {
        assert_eq!(WriterOptions::builder().jpeg_quality(0).build().jpeg_quality, 1);
        assert_eq!(
            WriterOptions::builder().jpeg_quality(85).build().jpeg_quality,
            85
        );
        assert_eq!(WriterOptions::default().jpeg_quality, 100);
    }

    #[test]
    fn test_png_crc_matches_known_value() {
        // CRC of "IEND" with empty data is a published constant
        assert_eq!(png_meta::crc32(b"IEND", &[]), 0xAE42_6082);
    }
}
