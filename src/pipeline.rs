//! The render pipeline: convert → layout → composite → encode → preview.
//!
//! One strict, synchronous sequence per request — no internal parallelism,
//! no shared mutable state, no caching across calls. Each call snapshots
//! its inputs; a superseded request is simply discarded by the caller.
//! Stage transitions and per-image skips are reported as `tracing` events,
//! which decouples progress observation from any particular UI.
//!
//! # Example
//!
//! ```
//! use std::collections::HashMap;
//! use image::DynamicImage;
//! use zenmasonry::{render, RenderOptions, SizeSpec, SourceImage, Unit};
//!
//! let images = vec![SourceImage::new("a", 300, 50)];
//! let mut pixels = HashMap::new();
//! pixels.insert("a".to_string(), DynamicImage::new_rgb8(300, 50));
//!
//! let spec = SizeSpec::new(600.0, 600.0, Unit::Px, 72.0);
//! let out = render(&images, &pixels, &spec, &RenderOptions::default()).unwrap();
//!
//! assert_eq!((out.width, out.height), (600, 600));
//! assert!(!out.jpeg.is_empty());
//! ```

use time::{Date, OffsetDateTime};
use tracing::{debug, instrument};

use crate::compose::{
    self, CompositeOptions, Composited, DEFAULT_PREVIEW_DIM, PixelSource, SkippedImage,
};
use crate::error::Result;
use crate::masonry::{self, LayoutResult, SourceImage};
use crate::units::SizeSpec;

/// Default spacing between columns and stacked items, in pixels.
pub const DEFAULT_GAP: f64 = 10.0;

/// Per-request render configuration.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct RenderOptions {
    /// Column count. `None` applies
    /// [`default_columns`](crate::masonry::default_columns).
    pub columns: Option<usize>,
    /// Gap between columns and stacked items, in pixels.
    pub gap: f64,
    /// Bound for the preview raster's larger dimension.
    pub preview_max_dim: u32,
    /// Background, border, and stroke width.
    pub composite: CompositeOptions,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            columns: None,
            gap: DEFAULT_GAP,
            preview_max_dim: DEFAULT_PREVIEW_DIM,
            composite: CompositeOptions::default(),
        }
    }
}

/// Everything one render request produces.
#[derive(Clone, Debug)]
pub struct RenderOutput {
    /// Canvas width in pixels (converted from the size spec).
    pub width: u32,
    /// Canvas height in pixels.
    pub height: u32,
    /// The placements the canvas was drawn from.
    pub layout: LayoutResult,
    /// Final composited canvas, JPEG-encoded.
    pub jpeg: Vec<u8>,
    /// Preview raster, JPEG-encoded at the same quality.
    pub preview_jpeg: Vec<u8>,
    /// Images whose pixel source failed at composite time.
    pub skipped: Vec<SkippedImage>,
    /// Suggested filename per the `banner_<w>x<h><unit>_<date>.jpg`
    /// convention, stamped with today's UTC date.
    pub file_name: String,
}

/// Run one full render request.
///
/// Converts the size spec to pixels, lays the images out, composites the
/// canvas, encodes it, and resamples the preview — in that order, failing
/// fast at the first terminal error. Per-image pixel failures are not
/// terminal; they end up in [`RenderOutput::skipped`].
#[instrument(skip_all, fields(images = images.len()))]
pub fn render<S: PixelSource + ?Sized>(
    images: &[SourceImage],
    source: &S,
    spec: &SizeSpec,
    options: &RenderOptions,
) -> Result<RenderOutput> {
    spec.validate()?;
    let (width, height) = spec.to_pixels()?;
    debug!(width, height, "converted target size");

    let columns = options
        .columns
        .unwrap_or_else(|| masonry::default_columns(width));
    let layout = masonry::layout(images, width, height, columns, options.gap)?;
    debug!(
        placed = layout.items.len(),
        rejected = layout.rejected,
        columns,
        "layout computed"
    );

    let Composited { raster, skipped } =
        compose::composite(&layout, width, height, &options.composite, source)?;

    let jpeg = compose::encode_jpeg(&raster, spec.quality)?;
    let preview = compose::preview(&raster, options.preview_max_dim);
    let preview_jpeg = compose::encode_jpeg(&preview, spec.quality)?;
    debug!(
        bytes = jpeg.len(),
        preview_bytes = preview_jpeg.len(),
        "encoded output"
    );

    Ok(RenderOutput {
        width,
        height,
        layout,
        jpeg,
        preview_jpeg,
        skipped,
        file_name: output_filename(spec, OffsetDateTime::now_utc().date()),
    })
}

/// Filename for a persisted banner:
/// `banner_<width>x<height><unit>_<ISO-date>.jpg`.
///
/// Dimensions are the spec's numeric values with a trailing `.0` trimmed,
/// so `banner_10x15in_2026-08-06.jpg`, not `banner_10.0x15.0in_…`.
pub fn output_filename(spec: &SizeSpec, date: Date) -> String {
    format!(
        "banner_{}x{}{}_{:04}-{:02}-{:02}.jpg",
        DimDisplay(spec.width),
        DimDisplay(spec.height),
        spec.unit.as_str(),
        date.year(),
        u8::from(date.month()),
        date.day(),
    )
}

/// Formats a spec dimension without a trailing `.0`.
struct DimDisplay(f64);

impl core::fmt::Display for DimDisplay {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        if self.0.fract() == 0.0 {
            write!(f, "{}", self.0 as i64)
        } else {
            write!(f, "{}", self.0)
        }
    }
}
