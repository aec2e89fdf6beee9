//! Physical unit conversion for target canvas sizes.
//!
//! Maps a [`SizeSpec`] (width, height, unit, dpi) to integer pixel
//! dimensions. Pure arithmetic — rounding happens once, at the end,
//! never on intermediate values.
//!
//! # Example
//!
//! ```
//! use zenmasonry::{SizeSpec, Unit};
//!
//! let spec = SizeSpec::new(10.0, 15.0, Unit::In, 300.0);
//! assert_eq!(spec.to_pixels().unwrap(), (3000, 4500));
//! ```

use crate::error::{Error, Result};

/// Centimeters per inch, for [`Unit::Cm`] conversion.
pub const CM_PER_INCH: f64 = 2.54;

/// Maximum single-dimension pixel size the target rasterizer can allocate.
///
/// Canvases above this fail with [`Error::CanvasTooLarge`] before any
/// layout work begins.
pub const MAX_RASTER_DIM: u32 = 16000;

/// Measurement unit for a target size.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum Unit {
    /// Device pixels. DPI is ignored.
    #[default]
    Px,
    /// Inches, converted at `dpi` dots per inch.
    In,
    /// Centimeters, converted at `dpi` dots per inch.
    Cm,
}

impl Unit {
    /// Short lowercase name, as used in output filenames (`px`, `in`, `cm`).
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Px => "px",
            Self::In => "in",
            Self::Cm => "cm",
        }
    }
}

/// Target output size: numeric dimensions, unit, resolution, and encoder
/// quality.
///
/// `dpi` only participates in conversion for physical units; `quality` is
/// consumed by the encoder alone (see [`encode_jpeg`](crate::compose::encode_jpeg)).
///
/// # Example
///
/// ```
/// use zenmasonry::{SizeSpec, Unit};
///
/// let spec = SizeSpec::new(21.0, 29.7, Unit::Cm, 150.0);
/// let (w, h) = spec.to_pixels().unwrap();
/// assert_eq!((w, h), (1240, 1754));
/// ```
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct SizeSpec {
    /// Target width in `unit`.
    pub width: f64,
    /// Target height in `unit`.
    pub height: f64,
    /// Measurement unit for `width` and `height`.
    pub unit: Unit,
    /// Dots per inch. Ignored when `unit` is [`Unit::Px`].
    pub dpi: f64,
    /// Encoder quality fraction in `(0, 1]`.
    pub quality: f64,
}

impl SizeSpec {
    /// Default encoder quality.
    pub const DEFAULT_QUALITY: f64 = 0.92;

    /// Create a size spec with the default encoder quality.
    pub const fn new(width: f64, height: f64, unit: Unit, dpi: f64) -> Self {
        Self {
            width,
            height,
            unit,
            dpi,
            quality: Self::DEFAULT_QUALITY,
        }
    }

    /// Set the encoder quality fraction.
    pub const fn quality(mut self, quality: f64) -> Self {
        self.quality = quality;
        self
    }

    /// Convert to integer pixel dimensions.
    ///
    /// Rounds half away from zero, applied once to the final product.
    /// Fails with [`Error::InvalidDimension`] for non-positive dimensions
    /// and [`Error::InvalidDpi`] for non-positive dpi on physical units.
    pub fn to_pixels(&self) -> Result<(u32, u32)> {
        let positive = |v: f64| v > 0.0 && v.is_finite();
        if !positive(self.width) || !positive(self.height) {
            return Err(Error::InvalidDimension {
                width: self.width,
                height: self.height,
            });
        }
        let scale = match self.unit {
            Unit::Px => 1.0,
            Unit::In | Unit::Cm => {
                if !(self.dpi > 0.0 && self.dpi.is_finite()) {
                    return Err(Error::InvalidDpi { dpi: self.dpi });
                }
                match self.unit {
                    Unit::In => self.dpi,
                    _ => self.dpi / CM_PER_INCH,
                }
            }
        };
        let w = (self.width * scale).round() as u32;
        let h = (self.height * scale).round() as u32;
        Ok((w, h))
    }

    /// Validate every field, including the encoder quality.
    ///
    /// [`to_pixels`](Self::to_pixels) checks only what conversion needs;
    /// the render pipeline calls this up front so a bad quality fails
    /// before any raster work.
    pub fn validate(&self) -> Result<()> {
        self.to_pixels()?;
        if !(self.quality > 0.0 && self.quality <= 1.0) {
            return Err(Error::InvalidQuality {
                quality: self.quality,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ── pixel unit ──────────────────────────────────────────────────────

    #[test]
    fn px_passes_through_rounded() {
        let spec = SizeSpec::new(800.4, 600.5, Unit::Px, 72.0);
        assert_eq!(spec.to_pixels().unwrap(), (800, 601));
    }

    #[test]
    fn px_ignores_dpi() {
        for dpi in [1.0, 72.0, 300.0, 1200.0] {
            let spec = SizeSpec::new(640.0, 480.0, Unit::Px, dpi);
            assert_eq!(spec.to_pixels().unwrap(), (640, 480));
        }
    }

    #[test]
    fn px_ignores_nonsense_dpi() {
        // dpi is not even validated for pixel specs
        let spec = SizeSpec::new(640.0, 480.0, Unit::Px, -1.0);
        assert_eq!(spec.to_pixels().unwrap(), (640, 480));
    }

    // ── physical units ──────────────────────────────────────────────────

    #[test]
    fn inches_multiply_by_dpi() {
        let spec = SizeSpec::new(10.0, 15.0, Unit::In, 300.0);
        assert_eq!(spec.to_pixels().unwrap(), (3000, 4500));
    }

    #[test]
    fn centimeters_divide_by_two_point_five_four() {
        // 2.54 cm at 100 dpi is exactly one inch
        let spec = SizeSpec::new(2.54, 5.08, Unit::Cm, 100.0);
        assert_eq!(spec.to_pixels().unwrap(), (100, 200));
    }

    #[test]
    fn a4_at_150_dpi() {
        let spec = SizeSpec::new(21.0, 29.7, Unit::Cm, 150.0);
        // 21 / 2.54 * 150 = 1240.15…, 29.7 / 2.54 * 150 = 1753.93…
        assert_eq!(spec.to_pixels().unwrap(), (1240, 1754));
    }

    #[test]
    fn rounding_applies_once_at_the_end() {
        // 3.3 in at 91 dpi = 300.3 → 300. Rounding 3.3 first would give
        // 3 * 91 = 273.
        let spec = SizeSpec::new(3.3, 3.3, Unit::In, 91.0);
        assert_eq!(spec.to_pixels().unwrap(), (300, 300));
    }

    // ── validation ──────────────────────────────────────────────────────

    #[test]
    fn zero_width_rejected() {
        let spec = SizeSpec::new(0.0, 10.0, Unit::Px, 72.0);
        assert!(matches!(
            spec.to_pixels(),
            Err(Error::InvalidDimension { .. })
        ));
    }

    #[test]
    fn negative_height_rejected() {
        let spec = SizeSpec::new(10.0, -1.0, Unit::In, 300.0);
        assert!(matches!(
            spec.to_pixels(),
            Err(Error::InvalidDimension { .. })
        ));
    }

    #[test]
    fn nan_rejected() {
        let spec = SizeSpec::new(f64::NAN, 10.0, Unit::Px, 72.0);
        assert!(matches!(
            spec.to_pixels(),
            Err(Error::InvalidDimension { .. })
        ));
    }

    #[test]
    fn zero_dpi_rejected_for_physical_units() {
        for unit in [Unit::In, Unit::Cm] {
            let spec = SizeSpec::new(10.0, 10.0, unit, 0.0);
            assert!(matches!(spec.to_pixels(), Err(Error::InvalidDpi { .. })));
        }
    }

    #[test]
    fn validate_rejects_out_of_range_quality() {
        for q in [0.0, -0.5, 1.01, f64::NAN] {
            let spec = SizeSpec::new(100.0, 100.0, Unit::Px, 72.0).quality(q);
            assert!(matches!(
                spec.validate(),
                Err(Error::InvalidQuality { .. })
            ));
        }
        let spec = SizeSpec::new(100.0, 100.0, Unit::Px, 72.0).quality(1.0);
        assert!(spec.validate().is_ok());
    }

    #[test]
    fn unit_names_match_filename_convention() {
        assert_eq!(Unit::Px.as_str(), "px");
        assert_eq!(Unit::In.as_str(), "in");
        assert_eq!(Unit::Cm.as_str(), "cm");
    }
}
