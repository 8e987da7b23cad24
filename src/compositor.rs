//! Canvas compositor module
//!
//! Allocates a fresh canvas of the resolved dimensions filled with the
//! border color, places the untouched source pixels at the planned offset,
//! and carries the preserved metadata onto the result.
//!
//! The copy is verbatim: no interpolation, no channel reordering, no
//! bit-depth change. A source whose pixel layout cannot be reproduced
//! exactly in the output buffer aborts with `UnsupportedPixelFormat`
//! instead of converting.

use image::{imageops, DynamicImage, ImageBuffer, Luma, LumaA, Pixel, Rgb, Rgba};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::geometry::{CanvasPlan, PadMode};
use crate::metadata::Resolution;

/// Compositing error types
#[derive(Debug, Error)]
pub enum CompositeError {
    #[error("Unsupported pixel format: {0}")]
    UnsupportedPixelFormat(String),

    #[error("Metadata preservation failed: {0}")]
    MetadataPreservationFailed(String),

    #[error("Canvas plan {target_width}x{target_height} cannot contain a {source_width}x{source_height} source at offset ({offset_x}, {offset_y})")]
    PlanMismatch {
        target_width: u32,
        target_height: u32,
        source_width: u32,
        source_height: u32,
        offset_x: u32,
        offset_y: u32,
    },

    #[error("Invalid border color: {0:?} (expected hex like \"#RRGGBB\" or \"#RRGGBBAA\")")]
    InvalidColor(String),
}

pub type Result<T> = std::result::Result<T, CompositeError>;

// ============================================================
// Border Color
// ============================================================

/// Border fill color.
///
/// RGB with an optional alpha; the alpha only applies when the source
/// layout carries an alpha channel, otherwise it is dropped with a
/// recorded warning.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BorderColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub alpha: Option<u8>,
}

impl BorderColor {
    pub const WHITE: BorderColor = BorderColor {
        r: 255,
        g: 255,
        b: 255,
        alpha: None,
    };

    pub const BLACK: BorderColor = BorderColor {
        r: 0,
        g: 0,
        b: 0,
        alpha: None,
    };

    /// Create an opaque border color
    pub fn new(r: u8, g: u8, b: u8) -> Self {
        Self {
            r,
            g,
            b,
            alpha: None,
        }
    }

    /// Set an explicit alpha
    #[must_use]
    pub fn with_alpha(mut self, alpha: u8) -> Self {
        self.alpha = Some(alpha);
        self
    }

    /// Grayscale value of the color (ITU-R BT.601 luminance)
    pub fn luma8(&self) -> u8 {
        let y = 0.299 * self.r as f32 + 0.587 * self.g as f32 + 0.114 * self.b as f32;
        y.round() as u8
    }

    /// Alpha to use when the layout supports it (opaque by default)
    pub fn alpha8(&self) -> u8 {
        self.alpha.unwrap_or(u8::MAX)
    }
}

impl Default for BorderColor {
    fn default() -> Self {
        Self::WHITE
    }
}

impl fmt::Display for BorderColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.alpha {
            Some(a) => write!(f, "#{:02X}{:02X}{:02X}{:02X}", self.r, self.g, self.b, a),
            None => write!(f, "#{:02X}{:02X}{:02X}", self.r, self.g, self.b),
        }
    }
}

impl FromStr for BorderColor {
    type Err = CompositeError;

    /// Parse `"#RRGGBB"` or `"#RRGGBBAA"` (leading `#` optional)
    fn from_str(s: &str) -> Result<Self> {
        let hex = s.trim().trim_start_matches('#');
        let parse_err = || CompositeError::InvalidColor(s.to_string());
        let byte = |i: usize| -> Result<u8> {
            u8::from_str_radix(hex.get(i..i + 2).ok_or_else(parse_err)?, 16)
                .map_err(|_| parse_err())
        };
        match hex.len() {
            6 => Ok(Self::new(byte(0)?, byte(2)?, byte(4)?)),
            8 => Ok(Self::new(byte(0)?, byte(2)?, byte(4)?).with_alpha(byte(6)?)),
            _ => Err(parse_err()),
        }
    }
}

/// Widen an 8-bit channel to 16 bits (0xFF -> 0xFFFF)
fn widen(channel: u8) -> u16 {
    channel as u16 * 257
}

// ============================================================
// Padding Configuration
// ============================================================

/// Configuration for one padding operation.
///
/// Immutable for the duration of the operation; independent operations
/// may share one config across threads freely.
#[derive(Debug, Clone, PartialEq)]
pub struct PaddingConfig {
    /// Canvas derivation mode
    pub mode: PadMode,
    /// Border fill color
    pub border_color: BorderColor,
    /// Extra outer border as a fraction of the padded canvas (0.05 = 5%)
    pub border_percent: f64,
    /// Carry the ICC color profile onto the result
    pub preserve_icc: bool,
    /// Carry the EXIF block onto the result
    pub preserve_exif: bool,
    /// Carry the stored DPI onto the result
    pub preserve_dpi: bool,
}

impl Default for PaddingConfig {
    fn default() -> Self {
        Self {
            mode: PadMode::Preset(crate::geometry::AspectRatio::CLASSIC_35MM),
            border_color: BorderColor::WHITE,
            border_percent: 0.0,
            preserve_icc: true,
            preserve_exif: true,
            preserve_dpi: true,
        }
    }
}

impl PaddingConfig {
    /// Create a new config builder
    pub fn builder() -> PaddingConfigBuilder {
        PaddingConfigBuilder::default()
    }
}

/// Builder for [`PaddingConfig`]
#[derive(Debug, Default)]
pub struct PaddingConfigBuilder {
    config: PaddingConfig,
}

impl PaddingConfigBuilder {
    /// Set the padding mode
    #[must_use]
    pub fn mode(mut self, mode: PadMode) -> Self {
        self.config.mode = mode;
        self
    }

    /// Set the border color
    #[must_use]
    pub fn border_color(mut self, color: BorderColor) -> Self {
        self.config.border_color = color;
        self
    }

    /// Set the extra outer border fraction
    #[must_use]
    pub fn border_percent(mut self, percent: f64) -> Self {
        self.config.border_percent = percent;
        self
    }

    /// Set ICC profile preservation
    #[must_use]
    pub fn preserve_icc(mut self, preserve: bool) -> Self {
        self.config.preserve_icc = preserve;
        self
    }

    /// Set EXIF preservation
    #[must_use]
    pub fn preserve_exif(mut self, preserve: bool) -> Self {
        self.config.preserve_exif = preserve;
        self
    }

    /// Set DPI preservation
    #[must_use]
    pub fn preserve_dpi(mut self, preserve: bool) -> Self {
        self.config.preserve_dpi = preserve;
        self
    }

    /// Build the config
    #[must_use]
    pub fn build(self) -> PaddingConfig {
        self.config
    }
}

// ============================================================
// Source Image
// ============================================================

/// Immutable view of a decoded photo and its embedded metadata.
///
/// The compositor only reads from it; the pixel buffer is never mutated
/// and the metadata blobs are never reinterpreted.
#[derive(Debug, Clone)]
pub struct SourceImage {
    pixels: DynamicImage,
    icc_profile: Option<Vec<u8>>,
    exif: Option<Vec<u8>>,
    dpi: Option<Resolution>,
}

impl SourceImage {
    /// Wrap a decoded pixel buffer with no metadata
    pub fn new(pixels: DynamicImage) -> Self {
        Self {
            pixels,
            icc_profile: None,
            exif: None,
            dpi: None,
        }
    }

    /// Attach an embedded ICC color profile
    #[must_use]
    pub fn with_icc_profile(mut self, icc: Vec<u8>) -> Self {
        self.icc_profile = Some(icc);
        self
    }

    /// Attach an embedded EXIF block
    #[must_use]
    pub fn with_exif(mut self, exif: Vec<u8>) -> Self {
        self.exif = Some(exif);
        self
    }

    /// Attach the stored print resolution
    #[must_use]
    pub fn with_dpi(mut self, dpi: Resolution) -> Self {
        self.dpi = Some(dpi);
        self
    }

    /// Source width in pixels
    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    /// Source height in pixels
    pub fn height(&self) -> u32 {
        self.pixels.height()
    }

    /// The decoded pixel buffer
    pub fn pixels(&self) -> &DynamicImage {
        &self.pixels
    }

    /// Embedded ICC profile bytes, if any
    pub fn icc_profile(&self) -> Option<&[u8]> {
        self.icc_profile.as_deref()
    }

    /// Embedded EXIF bytes, if any
    pub fn exif(&self) -> Option<&[u8]> {
        self.exif.as_deref()
    }

    /// Stored print resolution, if any
    pub fn dpi(&self) -> Option<Resolution> {
        self.dpi
    }
}

// ============================================================
// Result Types
// ============================================================

/// Non-fatal conditions recorded during compositing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompositeWarning {
    /// Border color carried an alpha but the pixel layout has none
    AlphaDropped,
    /// ICC preservation was requested but the source has no profile
    NoColorProfile,
    /// EXIF preservation was requested but the source has no block
    NoExif,
    /// DPI preservation was requested but the source stores none
    NoDpi,
}

impl fmt::Display for CompositeWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CompositeWarning::AlphaDropped => {
                write!(f, "border alpha dropped: pixel layout has no alpha channel")
            }
            CompositeWarning::NoColorProfile => write!(f, "no ICC profile found in source"),
            CompositeWarning::NoExif => write!(f, "no EXIF block found in source"),
            CompositeWarning::NoDpi => write!(f, "no DPI value found in source"),
        }
    }
}

/// A composited canvas and the metadata carried onto it.
///
/// Created fresh per call and owned entirely by the caller; the compositor
/// retains no reference to input or output.
#[derive(Debug, Clone)]
pub struct CompositeResult {
    /// The padded canvas
    pub pixels: DynamicImage,
    /// Carried-forward ICC profile bytes
    pub icc_profile: Option<Vec<u8>>,
    /// Carried-forward EXIF bytes
    pub exif: Option<Vec<u8>>,
    /// Carried-forward print resolution
    pub dpi: Option<Resolution>,
    /// Non-fatal conditions recorded during the operation
    pub warnings: Vec<CompositeWarning>,
}

// ============================================================
// Compositor
// ============================================================

/// Composite a source image onto a fresh canvas described by `plan`.
///
/// The region of the output at the plan offset is byte-identical to the
/// source buffer; every other pixel is the border color. Metadata is
/// carried per the `preserve_*` flags: a requested-but-absent block is a
/// recorded warning, a requested-but-unusable block is an error.
pub fn composite(
    source: &SourceImage,
    plan: &CanvasPlan,
    config: &PaddingConfig,
) -> Result<CompositeResult> {
    if !plan.contains(source.width(), source.height()) {
        return Err(CompositeError::PlanMismatch {
            target_width: plan.target_width,
            target_height: plan.target_height,
            source_width: source.width(),
            source_height: source.height(),
            offset_x: plan.offset_x,
            offset_y: plan.offset_y,
        });
    }

    let mut warnings = Vec::new();
    let pixels = paint_canvas(source.pixels(), plan, config.border_color, &mut warnings)?;

    let icc_profile = carry_blob(
        config.preserve_icc,
        source.icc_profile(),
        "ICC profile",
        CompositeWarning::NoColorProfile,
        &mut warnings,
    )?;
    let exif = carry_blob(
        config.preserve_exif,
        source.exif(),
        "EXIF block",
        CompositeWarning::NoExif,
        &mut warnings,
    )?;

    let dpi = if config.preserve_dpi {
        match source.dpi() {
            Some(res) if res.is_valid() => Some(res),
            Some(res) => {
                return Err(CompositeError::MetadataPreservationFailed(format!(
                    "stored resolution is not a positive DPI value: {res}"
                )))
            }
            None => {
                warnings.push(CompositeWarning::NoDpi);
                None
            }
        }
    } else {
        None
    };

    Ok(CompositeResult {
        pixels,
        icc_profile,
        exif,
        dpi,
        warnings,
    })
}

fn carry_blob(
    requested: bool,
    blob: Option<&[u8]>,
    label: &str,
    missing: CompositeWarning,
    warnings: &mut Vec<CompositeWarning>,
) -> Result<Option<Vec<u8>>> {
    if !requested {
        return Ok(None);
    }
    match blob {
        Some(bytes) if bytes.is_empty() => Err(CompositeError::MetadataPreservationFailed(
            format!("{label} is present but empty"),
        )),
        Some(bytes) => Ok(Some(bytes.to_vec())),
        None => {
            warnings.push(missing);
            Ok(None)
        }
    }
}

fn paint_canvas(
    source: &DynamicImage,
    plan: &CanvasPlan,
    color: BorderColor,
    warnings: &mut Vec<CompositeWarning>,
) -> Result<DynamicImage> {
    use DynamicImage::*;

    if color.alpha.is_some() && !source.color().has_alpha() {
        warnings.push(CompositeWarning::AlphaDropped);
    }

    let out = match source {
        ImageLuma8(buf) => ImageLuma8(paint_plane(buf, plan, Luma([color.luma8()]))),
        ImageLumaA8(buf) => {
            ImageLumaA8(paint_plane(buf, plan, LumaA([color.luma8(), color.alpha8()])))
        }
        ImageRgb8(buf) => ImageRgb8(paint_plane(buf, plan, Rgb([color.r, color.g, color.b]))),
        ImageRgba8(buf) => ImageRgba8(paint_plane(
            buf,
            plan,
            Rgba([color.r, color.g, color.b, color.alpha8()]),
        )),
        ImageLuma16(buf) => ImageLuma16(paint_plane(buf, plan, Luma([widen(color.luma8())]))),
        ImageLumaA16(buf) => ImageLumaA16(paint_plane(
            buf,
            plan,
            LumaA([widen(color.luma8()), widen(color.alpha8())]),
        )),
        ImageRgb16(buf) => ImageRgb16(paint_plane(
            buf,
            plan,
            Rgb([widen(color.r), widen(color.g), widen(color.b)]),
        )),
        ImageRgba16(buf) => ImageRgba16(paint_plane(
            buf,
            plan,
            Rgba([
                widen(color.r),
                widen(color.g),
                widen(color.b),
                widen(color.alpha8()),
            ]),
        )),
        other => {
            return Err(CompositeError::UnsupportedPixelFormat(format!(
                "{:?}",
                other.color()
            )))
        }
    };

    Ok(out)
}

fn paint_plane<P>(
    source: &ImageBuffer<P, Vec<P::Subpixel>>,
    plan: &CanvasPlan,
    fill: P,
) -> ImageBuffer<P, Vec<P::Subpixel>>
where
    P: Pixel + 'static,
{
    let mut canvas = ImageBuffer::from_pixel(plan.target_width, plan.target_height, fill);
    imageops::replace(&mut canvas, source, plan.offset_x as i64, plan.offset_y as i64);
    canvas
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{self, AspectRatio};

    /// A small RGB gradient so every source pixel is distinct
    fn gradient_rgb(width: u32, height: u32) -> DynamicImage {
        DynamicImage::ImageRgb8(ImageBuffer::from_fn(width, height, |x, y| {
            Rgb([x as u8, y as u8, (x * 7 + y * 13) as u8])
        }))
    }

    fn plan_for(source: &SourceImage, mode: &PadMode) -> CanvasPlan {
        geometry::resolve(source.width(), source.height(), mode).unwrap()
    }

    #[test]
    fn test_source_region_is_byte_identical() {
        let source = SourceImage::new(gradient_rgb(40, 30));
        let plan = plan_for(&source, &PadMode::Preset(AspectRatio::SQUARE));
        let config = PaddingConfig::default();

        let result = composite(&source, &plan, &config).unwrap();
        assert_eq!(result.pixels.width(), plan.target_width);
        assert_eq!(result.pixels.height(), plan.target_height);

        let region = result.pixels.crop_imm(plan.offset_x, plan.offset_y, 40, 30);
        assert_eq!(region.as_bytes(), source.pixels().as_bytes());
    }

    #[test]
    fn test_border_pixels_are_fill_color() {
        let source = SourceImage::new(gradient_rgb(10, 20));
        let plan = plan_for(&source, &PadMode::Preset(AspectRatio::SQUARE));
        let config = PaddingConfig::builder()
            .mode(PadMode::Preset(AspectRatio::SQUARE))
            .border_color(BorderColor::new(10, 20, 30))
            .build();

        let result = composite(&source, &plan, &config).unwrap();
        let out = result.pixels.to_rgb8();

        // Left of the photo and right of the photo are border
        assert_eq!(out.get_pixel(0, 0), &Rgb([10, 20, 30]));
        assert_eq!(
            out.get_pixel(plan.target_width - 1, plan.target_height - 1),
            &Rgb([10, 20, 30])
        );
        // First photo pixel is the source's first pixel
        assert_eq!(
            out.get_pixel(plan.offset_x, plan.offset_y),
            &Rgb([0, 0, 0])
        );
    }

    #[test]
    fn test_even_mode_uniform_border() {
        let source = SourceImage::new(gradient_rgb(8, 8));
        let plan = plan_for(&source, &PadMode::Even { margin: 3 });
        let result = composite(&source, &plan, &PaddingConfig::default()).unwrap();

        assert_eq!(result.pixels.width(), 14);
        assert_eq!(result.pixels.height(), 14);
        let out = result.pixels.to_rgb8();
        assert_eq!(out.get_pixel(3, 3), &Rgb([0, 0, 0]));
    }

    #[test]
    fn test_grayscale_fill_uses_luminance() {
        let source = SourceImage::new(DynamicImage::ImageLuma8(ImageBuffer::from_pixel(
            4,
            4,
            Luma([128]),
        )));
        let plan = plan_for(&source, &PadMode::Even { margin: 2 });
        let config = PaddingConfig::builder()
            .border_color(BorderColor::new(255, 0, 0))
            .build();

        let result = composite(&source, &plan, &config).unwrap();
        let out = match result.pixels {
            DynamicImage::ImageLuma8(buf) => buf,
            other => panic!("layout changed: {:?}", other.color()),
        };
        // BT.601 luminance of pure red
        assert_eq!(out.get_pixel(0, 0), &Luma([76]));
        assert_eq!(out.get_pixel(2, 2), &Luma([128]));
    }

    #[test]
    fn test_alpha_border_on_rgba() {
        let source = SourceImage::new(DynamicImage::ImageRgba8(ImageBuffer::from_pixel(
            2,
            2,
            Rgba([1, 2, 3, 4]),
        )));
        let plan = plan_for(&source, &PadMode::Even { margin: 1 });
        let config = PaddingConfig::builder()
            .border_color(BorderColor::new(9, 9, 9).with_alpha(0))
            .build();

        let result = composite(&source, &plan, &config).unwrap();
        assert!(result.warnings.is_empty());
        let out = result.pixels.to_rgba8();
        assert_eq!(out.get_pixel(0, 0), &Rgba([9, 9, 9, 0]));
        assert_eq!(out.get_pixel(1, 1), &Rgba([1, 2, 3, 4]));
    }

    #[test]
    fn test_alpha_dropped_warning_on_rgb() {
        let source = SourceImage::new(gradient_rgb(2, 2));
        let plan = plan_for(&source, &PadMode::Even { margin: 1 });
        let config = PaddingConfig::builder()
            .border_color(BorderColor::WHITE.with_alpha(128))
            .preserve_icc(false)
            .preserve_exif(false)
            .preserve_dpi(false)
            .build();

        let result = composite(&source, &plan, &config).unwrap();
        assert_eq!(result.warnings, vec![CompositeWarning::AlphaDropped]);
    }

    #[test]
    fn test_sixteen_bit_widening() {
        let source = SourceImage::new(DynamicImage::ImageRgb16(ImageBuffer::from_pixel(
            2,
            2,
            Rgb([1u16, 2, 3]),
        )));
        let plan = plan_for(&source, &PadMode::Even { margin: 1 });
        let config = PaddingConfig::builder()
            .border_color(BorderColor::WHITE)
            .build();

        let result = composite(&source, &plan, &config).unwrap();
        let out = match result.pixels {
            DynamicImage::ImageRgb16(buf) => buf,
            other => panic!("layout changed: {:?}", other.color()),
        };
        assert_eq!(out.get_pixel(0, 0), &Rgb([65535, 65535, 65535]));
        assert_eq!(out.get_pixel(1, 1), &Rgb([1, 2, 3]));
    }

    #[test]
    fn test_float_layout_rejected() {
        let source = SourceImage::new(DynamicImage::ImageRgb32F(ImageBuffer::from_pixel(
            2,
            2,
            Rgb([0.5f32, 0.5, 0.5]),
        )));
        let plan = plan_for(&source, &PadMode::Even { margin: 1 });
        let result = composite(&source, &plan, &PaddingConfig::default());
        assert!(matches!(
            result,
            Err(CompositeError::UnsupportedPixelFormat(_))
        ));
    }

    #[test]
    fn test_plan_mismatch_rejected() {
        let source = SourceImage::new(gradient_rgb(10, 10));
        let plan = CanvasPlan {
            target_width: 8,
            target_height: 8,
            offset_x: 0,
            offset_y: 0,
        };
        let result = composite(&source, &plan, &PaddingConfig::default());
        assert!(matches!(result, Err(CompositeError::PlanMismatch { .. })));
    }

    #[test]
    fn test_metadata_round_trip() {
        let icc = vec![1u8, 2, 3, 4];
        let exif = vec![9u8, 8, 7];
        let source = SourceImage::new(gradient_rgb(4, 4))
            .with_icc_profile(icc.clone())
            .with_exif(exif.clone())
            .with_dpi(Resolution::uniform(300.0));
        let plan = plan_for(&source, &PadMode::Even { margin: 2 });

        let result = composite(&source, &plan, &PaddingConfig::default()).unwrap();
        assert_eq!(result.icc_profile.as_deref(), Some(icc.as_slice()));
        assert_eq!(result.exif.as_deref(), Some(exif.as_slice()));
        assert_eq!(result.dpi, Some(Resolution::uniform(300.0)));
        assert!(result.warnings.is_empty());
    }

    #[test]
    fn test_metadata_not_carried_when_not_requested() {
        let source = SourceImage::new(gradient_rgb(4, 4))
            .with_icc_profile(vec![1, 2, 3])
            .with_exif(vec![4, 5, 6])
            .with_dpi(Resolution::uniform(240.0));
        let plan = plan_for(&source, &PadMode::Even { margin: 1 });
        let config = PaddingConfig::builder()
            .preserve_icc(false)
            .preserve_exif(false)
            .preserve_dpi(false)
            .build();

        let result = composite(&source, &plan, &config).unwrap();
        assert!(result.icc_profile.is_none());
        assert!(result.exif.is_none());
        assert!(result.dpi.is_none());
        assert!(result.warnings.is_empty());
    }

    #[test]
    fn test_missing_requested_metadata_is_warning_not_error() {
        let source = SourceImage::new(gradient_rgb(4, 4));
        let plan = plan_for(&source, &PadMode::Even { margin: 1 });
        let result = composite(&source, &plan, &PaddingConfig::default()).unwrap();

        assert!(result.warnings.contains(&CompositeWarning::NoColorProfile));
        assert!(result.warnings.contains(&CompositeWarning::NoExif));
        assert!(result.warnings.contains(&CompositeWarning::NoDpi));
    }

    #[test]
    fn test_empty_requested_blob_is_error() {
        let source = SourceImage::new(gradient_rgb(4, 4)).with_icc_profile(Vec::new());
        let plan = plan_for(&source, &PadMode::Even { margin: 1 });
        let result = composite(&source, &plan, &PaddingConfig::default());
        assert!(matches!(
            result,
            Err(CompositeError::MetadataPreservationFailed(_))
        ));
    }

    #[test]
    fn test_invalid_dpi_is_error() {
        let source = SourceImage::new(gradient_rgb(4, 4)).with_dpi(Resolution::uniform(0.0));
        let plan = plan_for(&source, &PadMode::Even { margin: 1 });
        let result = composite(&source, &plan, &PaddingConfig::default());
        assert!(matches!(
            result,
            Err(CompositeError::MetadataPreservationFailed(_))
        ));
    }

    #[test]
    fn test_repeated_calls_are_identical() {
        let source = SourceImage::new(gradient_rgb(15, 9)).with_dpi(Resolution::uniform(300.0));
        let plan = plan_for(&source, &PadMode::Preset(AspectRatio::PRINT_4X5));
        let config = PaddingConfig::default();

        let a = composite(&source, &plan, &config).unwrap();
        let b = composite(&source, &plan, &config).unwrap();
        assert_eq!(a.pixels.as_bytes(), b.pixels.as_bytes());
        assert_eq!(a.dpi, b.dpi);
    }

    #[test]
    fn test_border_color_hex_parse() {
        assert_eq!(
            "#FFFFFF".parse::<BorderColor>().unwrap(),
            BorderColor::new(255, 255, 255)
        );
        assert_eq!(
            "1a2b3c".parse::<BorderColor>().unwrap(),
            BorderColor::new(0x1A, 0x2B, 0x3C)
        );
        assert_eq!(
            "#00000080".parse::<BorderColor>().unwrap(),
            BorderColor::BLACK.with_alpha(128)
        );
        for s in ["", "#FFF", "#GGGGGG", "#1234567"] {
            assert!(s.parse::<BorderColor>().is_err(), "{s:?} should not parse");
        }
    }

    #[test]
    fn test_border_color_display_round_trip() {
        let color = BorderColor::new(16, 32, 48).with_alpha(64);
        assert_eq!(color.to_string().parse::<BorderColor>().unwrap(), color);
    }

    #[test]
    fn test_config_builder() {
        let config = PaddingConfig::builder()
            .mode(PadMode::Even { margin: 12 })
            .border_color(BorderColor::BLACK)
            .border_percent(0.05)
            .preserve_exif(false)
            .build();

        assert_eq!(config.mode, PadMode::Even { margin: 12 });
        assert_eq!(config.border_color, BorderColor::BLACK);
        assert!((config.border_percent - 0.05).abs() < f64::EPSILON);
        assert!(config.preserve_icc);
        assert!(!config.preserve_exif);
        assert!(config.preserve_dpi);
    }
}
