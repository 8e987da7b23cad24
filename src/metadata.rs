//! Metadata carriage module
//!
//! ICC profiles and EXIF blocks travel through a pad as opaque byte blobs;
//! their internal structure belongs to the codec boundary, not the core.
//! The one value that does need interpretation is print resolution (DPI),
//! which lives in the EXIF resolution tags and controls the physical print
//! size of the output. DPI is carried as a metadata value, never recomputed
//! from the padded canvas dimensions.

use std::fmt;

/// Centimeter-based EXIF resolution unit (tag 0x0128 value 3)
const RESOLUTION_UNIT_CM: u32 = 3;

/// Inches per centimeter
const CM_TO_INCH: f64 = 2.54;

/// Print resolution in dots per inch
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Resolution {
    /// Horizontal dots per inch
    pub x: f64,
    /// Vertical dots per inch
    pub y: f64,
}

impl Resolution {
    /// Create a resolution from per-axis DPI values
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Create a uniform resolution
    pub fn uniform(dpi: f64) -> Self {
        Self { x: dpi, y: dpi }
    }

    /// Whether both axes are positive, finite DPI values
    pub fn is_valid(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.x > 0.0 && self.y > 0.0
    }
}

impl fmt::Display for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{} dpi", self.x, self.y)
    }
}

/// Read the print resolution from a raw EXIF block.
///
/// Looks up XResolution/YResolution and converts from centimeters when
/// ResolutionUnit says so. Returns `None` when the block has no usable
/// resolution tags; a missing DPI is common and not an error.
pub fn dpi_from_exif(blob: &[u8]) -> Option<Resolution> {
    let parsed = exif::Reader::new().read_raw(blob.to_vec()).ok()?;

    let rational = |tag: exif::Tag| -> Option<f64> {
        let field = parsed.get_field(tag, exif::In::PRIMARY)?;
        match field.value {
            exif::Value::Rational(ref values) => values.first().map(|r| r.to_f64()),
            _ => None,
        }
    };

    let x = rational(exif::Tag::XResolution)?;
    let y = rational(exif::Tag::YResolution).unwrap_or(x);

    let unit = parsed
        .get_field(exif::Tag::ResolutionUnit, exif::In::PRIMARY)
        .and_then(|f| f.value.get_uint(0));
    let scale = if unit == Some(RESOLUTION_UNIT_CM) {
        CM_TO_INCH
    } else {
        1.0
    };

    let resolution = Resolution::new(x * scale, y * scale);
    resolution.is_valid().then_some(resolution)
}
