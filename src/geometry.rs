//! Canvas geometry module
//!
//! Computes target canvas dimensions and placement offsets for padding a
//! photo to a print aspect ratio, or for adding a uniform border. Pure
//! integer math over the source dimensions; never touches pixel data.

use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Geometry error types
#[derive(Debug, Error)]
pub enum GeometryError {
    #[error("Invalid image dimensions: {width}x{height}")]
    InvalidDimensions { width: u32, height: u32 },

    #[error("Invalid aspect ratio: {w}:{h} (components must be positive and finite)")]
    InvalidRatio { w: f64, h: f64 },

    #[error("Invalid ratio string: {0:?} (expected e.g. \"2:3\")")]
    RatioParse(String),

    #[error("Invalid border percentage: {0}")]
    InvalidBorderPercent(f64),

    #[error("Canvas dimensions overflow: {width}x{height} with margin {margin}")]
    CanvasOverflow { width: u32, height: u32, margin: u32 },
}

pub type Result<T> = std::result::Result<T, GeometryError>;

/// Tolerance when deciding the source already sits at the target ratio
const RATIO_EPSILON: f64 = 1e-6;

// ============================================================
// Aspect Ratio
// ============================================================

/// Target aspect ratio expressed as `width : height` units.
///
/// Components are floats so custom cinema-style ratios like `2.35:1`
/// work the same as simple print ratios.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AspectRatio {
    w: f64,
    h: f64,
}

impl AspectRatio {
    /// 2:3, the classic 35mm print ratio
    pub const CLASSIC_35MM: AspectRatio = AspectRatio { w: 2.0, h: 3.0 };

    /// 4:5, the common print ratio
    pub const PRINT_4X5: AspectRatio = AspectRatio { w: 4.0, h: 5.0 };

    /// 1:1, square
    pub const SQUARE: AspectRatio = AspectRatio { w: 1.0, h: 1.0 };

    /// Create a ratio from `width : height` components
    pub fn new(w: f64, h: f64) -> Result<Self> {
        if !(w.is_finite() && h.is_finite()) || w <= 0.0 || h <= 0.0 {
            return Err(GeometryError::InvalidRatio { w, h });
        }
        Ok(Self { w, h })
    }

    /// Width component
    pub fn w(&self) -> f64 {
        self.w
    }

    /// Height component
    pub fn h(&self) -> f64 {
        self.h
    }

    /// The ratio as a single value, `w / h`
    pub fn value(&self) -> f64 {
        self.w / self.h
    }

    /// Align the ratio's orientation with the source image.
    ///
    /// Print ratios are conventionally quoted short:long ("2:3"). A landscape
    /// source padded to 2:3 should become 3:2, not a towering portrait
    /// canvas. Returns the ratio with its long component on the source's
    /// long axis.
    pub fn matched_to(&self, source_width: u32, source_height: u32) -> Self {
        let landscape = source_width >= source_height;
        if landscape == (self.w >= self.h) {
            *self
        } else {
            Self {
                w: self.h,
                h: self.w,
            }
        }
    }
}

impl fmt::Display for AspectRatio {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.w, self.h)
    }
}

impl FromStr for AspectRatio {
    type Err = GeometryError;

    /// Parse `"2:3"`, `"16:9"`, `"2.35:1"`, ...
    fn from_str(s: &str) -> Result<Self> {
        let parse_err = || GeometryError::RatioParse(s.to_string());
        let (w, h) = s.split_once(':').ok_or_else(parse_err)?;
        let w: f64 = w.trim().parse().map_err(|_| parse_err())?;
        let h: f64 = h.trim().parse().map_err(|_| parse_err())?;
        Self::new(w, h)
    }
}

// ============================================================
// Padding Mode
// ============================================================

/// How the canvas dimensions are derived from the source
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PadMode {
    /// Pad to one of the built-in print ratios
    Preset(AspectRatio),
    /// Pad to a user-supplied ratio
    Custom(AspectRatio),
    /// No ratio padding; add a uniform pixel border on every side.
    ///
    /// A fixed pixel margin lets the aspect ratio drift by the border's
    /// absolute size (it is only ratio-exact for square sources). That
    /// drift is the intended behavior of this mode, not an accident.
    Even { margin: u32 },
}

impl PadMode {
    /// The ratio this mode targets, if any
    pub fn ratio(&self) -> Option<AspectRatio> {
        match self {
            PadMode::Preset(r) | PadMode::Custom(r) => Some(*r),
            PadMode::Even { .. } => None,
        }
    }
}

// ============================================================
// Canvas Plan
// ============================================================

/// Resolved canvas dimensions and source placement.
///
/// Derived once per operation; purely a function of the source dimensions
/// and the padding mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CanvasPlan {
    /// Canvas width in pixels
    pub target_width: u32,
    /// Canvas height in pixels
    pub target_height: u32,
    /// Horizontal placement of the source's left edge
    pub offset_x: u32,
    /// Vertical placement of the source's top edge
    pub offset_y: u32,
}

impl CanvasPlan {
    /// Whether a source of the given size fits entirely inside this plan
    pub fn contains(&self, source_width: u32, source_height: u32) -> bool {
        self.offset_x as u64 + source_width as u64 <= self.target_width as u64
            && self.offset_y as u64 + source_height as u64 <= self.target_height as u64
    }

    /// Whether this plan leaves the source untouched
    pub fn is_noop(&self, source_width: u32, source_height: u32) -> bool {
        self.offset_x == 0
            && self.offset_y == 0
            && self.target_width == source_width
            && self.target_height == source_height
    }
}

// ============================================================
// Resolver
// ============================================================

/// Compute the canvas plan for a source image and padding mode.
///
/// Pure and deterministic. Ratio modes fix one source axis and grow the
/// other, so the canvas is never smaller than the source on either axis
/// and the original pixels are always fully contained. A source already
/// at the target ratio resolves to a successful no-op plan.
pub fn resolve(source_width: u32, source_height: u32, mode: &PadMode) -> Result<CanvasPlan> {
    if source_width == 0 || source_height == 0 {
        return Err(GeometryError::InvalidDimensions {
            width: source_width,
            height: source_height,
        });
    }

    match *mode {
        PadMode::Even { margin } => {
            let target_width = source_width
                .checked_add(margin)
                .and_then(|w| w.checked_add(margin));
            let target_height = source_height
                .checked_add(margin)
                .and_then(|h| h.checked_add(margin));
            match (target_width, target_height) {
                (Some(target_width), Some(target_height)) => Ok(CanvasPlan {
                    target_width,
                    target_height,
                    offset_x: margin,
                    offset_y: margin,
                }),
                _ => Err(GeometryError::CanvasOverflow {
                    width: source_width,
                    height: source_height,
                    margin,
                }),
            }
        }
        PadMode::Preset(ratio) | PadMode::Custom(ratio) => {
            // Constructed ratios are validated, but the resolver accepts any
            // AspectRatio value and must reject a degenerate one itself.
            AspectRatio::new(ratio.w, ratio.h)?;
            Ok(resolve_ratio(source_width, source_height, ratio))
        }
    }
}

fn resolve_ratio(source_width: u32, source_height: u32, ratio: AspectRatio) -> CanvasPlan {
    let r = ratio.value();
    let current = source_width as f64 / source_height as f64;

    if (current - r).abs() < RATIO_EPSILON {
        return CanvasPlan {
            target_width: source_width,
            target_height: source_height,
            offset_x: 0,
            offset_y: 0,
        };
    }

    let (target_width, target_height) = if current < r {
        // Too tall for the target ratio: grow width, keep height
        let grown = (source_height as f64 * r).ceil() as u32;
        (grown.max(source_width), source_height)
    } else {
        // Too wide: grow height, keep width
        let grown = (source_width as f64 / r).ceil() as u32;
        (source_width, grown.max(source_height))
    };

    CanvasPlan {
        target_width,
        target_height,
        offset_x: (target_width - source_width) / 2,
        offset_y: (target_height - source_height) / 2,
    }
}

/// Compute an outer-border plan scaling both axes by `1 + percent`.
///
/// This is the "extra border" step applied after ratio padding: both
/// canvas axes grow proportionally and the inner canvas is centered.
/// `percent` is a fraction (0.05 = 5%).
pub fn outer_border(width: u32, height: u32, percent: f64) -> Result<CanvasPlan> {
    if width == 0 || height == 0 {
        return Err(GeometryError::InvalidDimensions { width, height });
    }
    if !percent.is_finite() || percent < 0.0 {
        return Err(GeometryError::InvalidBorderPercent(percent));
    }

    let factor = 1.0 + percent;
    let target_width = ((width as f64 * factor) as u32).max(width);
    let target_height = ((height as f64 * factor) as u32).max(height);

    Ok(CanvasPlan {
        target_width,
        target_height,
        offset_x: (target_width - width) / 2,
        offset_y: (target_height - height) / 2,
    })
}

/// Resolve the full canvas plan for a padding mode plus the optional
/// outer border step, folded into a single placement.
///
/// Padding to a ratio and then adding an outer border both fill with the
/// same color, so the two steps compose into one plan: the outer plan's
/// offset shifts the inner plan's placement.
pub fn resolve_with_border(
    source_width: u32,
    source_height: u32,
    mode: &PadMode,
    border_percent: f64,
) -> Result<CanvasPlan> {
    let inner = resolve(source_width, source_height, mode)?;
    let outer = outer_border(inner.target_width, inner.target_height, border_percent)?;
    Ok(CanvasPlan {
        target_width: outer.target_width,
        target_height: outer.target_height,
        offset_x: outer.offset_x + inner.offset_x,
        offset_y: outer.offset_y + inner.offset_y,
    })
}
