//! Crate-wide error type and result alias.
//!
//! Everything fatal to a render request surfaces here. Per-image pixel
//! failures ([`Error::ImageLoadFailed`]) are the exception: the compositor
//! catches them in its draw loop, logs them, and keeps going.

use thiserror::Error;

/// Alias for `Result<T, zenmasonry::Error>`.
pub type Result<T> = core::result::Result<T, Error>;

/// Layout or compositing failure.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    /// A width or height was zero, negative, or non-finite.
    #[error("invalid dimensions: width and height must be positive, got {width}\u{d7}{height}")]
    InvalidDimension {
        /// Requested width.
        width: f64,
        /// Requested height.
        height: f64,
    },

    /// DPI must be positive when converting physical units.
    #[error("invalid resolution: dpi must be positive for physical units, got {dpi}")]
    InvalidDpi {
        /// Requested dots per inch.
        dpi: f64,
    },

    /// Encoder quality must lie in `(0, 1]`.
    #[error("invalid quality: must be in (0, 1], got {quality}")]
    InvalidQuality {
        /// Requested quality fraction.
        quality: f64,
    },

    /// The canvas exceeds the platform rasterizer ceiling.
    #[error(
        "canvas {width}\u{d7}{height} exceeds the rasterizer ceiling of {max}\u{d7}{max} pixels; \
         reduce the target size or dpi"
    )]
    CanvasTooLarge {
        /// Requested canvas width in pixels.
        width: u32,
        /// Requested canvas height in pixels.
        height: u32,
        /// Maximum dimension the rasterizer can allocate.
        max: u32,
    },

    /// No image could be placed on the canvas.
    #[error("no image could be placed ({rejected} rejected); enlarge the canvas or use more columns")]
    EmptyLayout {
        /// Number of images rejected by the overflow cutoff.
        rejected: usize,
    },

    /// One image's pixel source could not be resolved or decoded.
    ///
    /// Non-fatal: the compositor skips the image and continues.
    #[error("image {key:?} could not be loaded: {reason}")]
    ImageLoadFailed {
        /// Identifier of the failing image.
        key: String,
        /// Human-readable cause.
        reason: String,
    },

    /// The encoder could not produce output bytes.
    #[cfg(feature = "raster")]
    #[error("encoding failed: {0}")]
    EncodingFailed(#[from] image::ImageError),
}
