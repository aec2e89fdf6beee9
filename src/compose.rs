//! Raster compositing of a computed masonry layout.
//!
//! Allocates the output canvas, fills the background, draws each placed
//! image scaled to its rectangle with a border stroke, and encodes the
//! result. Per-image pixel failures are isolated here: a bad source is
//! logged, recorded, and skipped — it never aborts the rest of the draw
//! loop.
//!
//! # Example
//!
//! ```
//! use std::collections::HashMap;
//! use image::DynamicImage;
//! use zenmasonry::{composite, layout, CompositeOptions, SourceImage};
//!
//! let images = vec![SourceImage::new("a", 200, 200)];
//! let result = layout(&images, 400, 400, 1, 10.0).unwrap();
//!
//! let mut pixels = HashMap::new();
//! pixels.insert("a".to_string(), DynamicImage::new_rgb8(200, 200));
//!
//! let out = composite(&result, 400, 400, &CompositeOptions::default(), &pixels).unwrap();
//! assert_eq!((out.raster.width(), out.raster.height()), (400, 400));
//! assert!(out.skipped.is_empty());
//! ```

use std::collections::HashMap;

use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::{DynamicImage, GenericImage, Rgb, RgbImage, Rgba, imageops};
use tracing::{debug, instrument, warn};

use crate::error::{Error, Result};
use crate::masonry::{LayoutResult, Rect};

/// Default bound for the preview raster's larger dimension.
pub const DEFAULT_PREVIEW_DIM: u32 = 800;

/// Opaque sRGB color for the canvas fill and border strokes.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct CanvasColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl CanvasColor {
    /// Create a color from 8-bit channels.
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// White.
    pub const fn white() -> Self {
        Self::rgb(255, 255, 255)
    }

    /// Black.
    pub const fn black() -> Self {
        Self::rgb(0, 0, 0)
    }

    /// Neutral gray of the given level.
    pub const fn gray(level: u8) -> Self {
        Self::rgb(level, level, level)
    }

    const fn to_rgb(self) -> Rgb<u8> {
        Rgb([self.r, self.g, self.b])
    }

    const fn to_rgba(self) -> Rgba<u8> {
        Rgba([self.r, self.g, self.b, 255])
    }
}

/// Compositor configuration.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct CompositeOptions {
    /// Canvas background fill.
    pub background: CanvasColor,
    /// Border stroke color.
    pub border: CanvasColor,
    /// Border stroke width in pixels. Zero disables the stroke.
    pub border_width: u32,
}

impl Default for CompositeOptions {
    fn default() -> Self {
        Self {
            background: CanvasColor::white(),
            border: CanvasColor::gray(0x80),
            border_width: 1,
        }
    }
}

/// Resolves decoded pixel data for placed images.
///
/// The layout engine only sees dimensions; the compositor asks this seam
/// for the actual pixels, keyed by [`SourceImage::key`](crate::SourceImage).
/// Returning [`Error::ImageLoadFailed`] marks that one image as
/// undrawable — the compositor skips it and keeps going.
pub trait PixelSource {
    /// Decoded pixels for the image identified by `key`.
    fn pixels(&self, key: &str) -> Result<&DynamicImage>;
}

impl PixelSource for HashMap<String, DynamicImage> {
    fn pixels(&self, key: &str) -> Result<&DynamicImage> {
        self.get(key).ok_or_else(|| Error::ImageLoadFailed {
            key: key.to_owned(),
            reason: "no decoded pixels for this key".to_owned(),
        })
    }
}

/// One image the compositor had to leave out.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct SkippedImage {
    /// Identifier of the image.
    pub key: String,
    /// Why its pixels were unavailable.
    pub reason: String,
}

/// A composited canvas plus the images that could not be drawn.
#[derive(Clone, Debug)]
pub struct Composited {
    /// The output raster (RGB8).
    pub raster: DynamicImage,
    /// Images whose pixel source failed, in placement order.
    pub skipped: Vec<SkippedImage>,
}

/// Composite a layout onto a fresh `canvas_w` × `canvas_h` raster.
///
/// Fills the canvas with the background color, then draws each
/// [`PlacedItem`](crate::PlacedItem) in placement order: source pixels
/// resized exactly to the placed rectangle (aspect ratio is already
/// preserved by the layout), overlaid at the placed position, and stroked
/// with the border last so a neighbor never occludes it.
///
/// Pixel-source failures are logged, recorded in
/// [`Composited::skipped`], and do not abort the remaining draws.
#[instrument(skip_all)]
pub fn composite<S: PixelSource + ?Sized>(
    layout: &LayoutResult,
    canvas_w: u32,
    canvas_h: u32,
    options: &CompositeOptions,
    source: &S,
) -> Result<Composited> {
    if canvas_w == 0 || canvas_h == 0 {
        return Err(Error::InvalidDimension {
            width: canvas_w as f64,
            height: canvas_h as f64,
        });
    }

    let mut canvas = DynamicImage::ImageRgb8(RgbImage::from_pixel(
        canvas_w,
        canvas_h,
        options.background.to_rgb(),
    ));
    let mut skipped = Vec::new();

    for item in &layout.items {
        let pixels = match source.pixels(&item.key) {
            Ok(pixels) => pixels,
            Err(err) => {
                warn!(key = %item.key, error = %err, "skipping image: pixel source failed");
                skipped.push(SkippedImage {
                    key: item.key.clone(),
                    reason: err.to_string(),
                });
                continue;
            }
        };
        let rect = item.pixel_rect(canvas_w, canvas_h);
        let resized = pixels.resize_exact(rect.width, rect.height, FilterType::Triangle);
        imageops::overlay(&mut canvas, &resized, rect.x as i64, rect.y as i64);
        stroke_rect(&mut canvas, rect, options.border, options.border_width);
    }

    debug!(
        drawn = layout.items.len() - skipped.len(),
        skipped = skipped.len(),
        "composited canvas"
    );
    Ok(Composited {
        raster: canvas,
        skipped,
    })
}

/// Encode a raster as JPEG at the given quality fraction.
///
/// `quality` must lie in `(0, 1]` and maps onto the encoder's 1–100 scale.
/// Encoder failures surface as [`Error::EncodingFailed`]; they are terminal
/// for the request and not retried here.
pub fn encode_jpeg(raster: &DynamicImage, quality: f64) -> Result<Vec<u8>> {
    if !(quality > 0.0 && quality <= 1.0) {
        return Err(Error::InvalidQuality { quality });
    }
    let steps = (quality * 100.0).round().clamp(1.0, 100.0) as u8;
    let mut bytes = Vec::new();
    let encoder = JpegEncoder::new_with_quality(&mut bytes, steps);
    raster.write_with_encoder(encoder)?;
    Ok(bytes)
}

/// Downscale a composited raster to fit within `max_dim` on both axes,
/// preserving aspect ratio.
///
/// A pure downstream resample of the finished composite — no re-layout.
/// Returns a clone when the raster already fits.
pub fn preview(raster: &DynamicImage, max_dim: u32) -> DynamicImage {
    let (w, h) = (raster.width(), raster.height());
    if max_dim == 0 || (w <= max_dim && h <= max_dim) {
        return raster.clone();
    }
    raster.resize(max_dim, max_dim, FilterType::Triangle)
}

/// Stroke a border of `width` pixels just inside `rect`.
///
/// `rect` must already be clamped to the canvas (see
/// [`PlacedItem::pixel_rect`](crate::PlacedItem::pixel_rect)).
fn stroke_rect(canvas: &mut DynamicImage, rect: Rect, color: CanvasColor, width: u32) {
    if width == 0 || rect.width == 0 || rect.height == 0 {
        return;
    }
    let px = color.to_rgba();
    let inset = width.min(rect.width / 2 + 1).min(rect.height / 2 + 1);
    let (x0, y0) = (rect.x, rect.y);
    let (x1, y1) = (rect.x + rect.width, rect.y + rect.height);
    for y in y0..y1 {
        if y < y0 + inset || y >= y1 - inset {
            for x in x0..x1 {
                canvas.put_pixel(x, y, px);
            }
        } else {
            for x in x0..x0 + inset {
                canvas.put_pixel(x, y, px);
            }
            for x in x1 - inset..x1 {
                canvas.put_pixel(x, y, px);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::masonry::{SourceImage, layout};

    fn flat(w: u32, h: u32, color: [u8; 3]) -> DynamicImage {
        DynamicImage::ImageRgb8(RgbImage::from_pixel(w, h, Rgb(color)))
    }

    fn single_item_fixture() -> (crate::masonry::LayoutResult, HashMap<String, DynamicImage>) {
        // Canvas 200×200, one column, gap 10 → the image occupies
        // (10, 10)..(190, 190).
        let images = vec![SourceImage::new("a", 90, 90)];
        let result = layout(&images, 200, 200, 1, 10.0).unwrap();
        let mut pixels = HashMap::new();
        pixels.insert("a".to_string(), flat(90, 90, [10, 200, 30]));
        (result, pixels)
    }

    // ── canvas fill and drawing ─────────────────────────────────────────

    #[test]
    fn empty_layout_is_pure_background() {
        let result = crate::masonry::LayoutResult::default();
        let pixels: HashMap<String, DynamicImage> = HashMap::new();
        let out = composite(&result, 32, 16, &CompositeOptions::default(), &pixels).unwrap();
        let rgb = out.raster.to_rgb8();
        assert!(rgb.pixels().all(|p| *p == Rgb([255, 255, 255])));
    }

    #[test]
    fn draws_image_inside_placed_rect() {
        let (result, pixels) = single_item_fixture();
        let out = composite(&result, 200, 200, &CompositeOptions::default(), &pixels).unwrap();
        let rgb = out.raster.to_rgb8();

        // Center of the placed rect carries the source color (Triangle
        // resampling of a flat image stays flat, within rounding).
        let center = rgb.get_pixel(100, 100);
        for (got, want) in center.0.iter().zip([10u8, 200, 30]) {
            assert!(got.abs_diff(want) <= 1, "{got} vs {want}");
        }
        // Outside the rect is untouched background.
        assert_eq!(*rgb.get_pixel(5, 5), Rgb([255, 255, 255]));
        assert_eq!(*rgb.get_pixel(195, 195), Rgb([255, 255, 255]));
    }

    #[test]
    fn border_is_stroked_last_on_the_perimeter() {
        let (result, pixels) = single_item_fixture();
        let options = CompositeOptions {
            border: CanvasColor::black(),
            ..CompositeOptions::default()
        };
        let out = composite(&result, 200, 200, &options, &pixels).unwrap();
        let rgb = out.raster.to_rgb8();

        // Perimeter of (10,10)..(190,190), width 1.
        for (x, y) in [(10, 10), (100, 10), (189, 100), (100, 189), (10, 100)] {
            assert_eq!(*rgb.get_pixel(x, y), Rgb([0, 0, 0]), "at ({x},{y})");
        }
        // One pixel inside the stroke is image again.
        let inner = rgb.get_pixel(100, 11);
        assert!(inner.0[1] > 100, "expected image color, got {inner:?}");
    }

    #[test]
    fn missing_pixels_skip_only_that_image() {
        let images = vec![SourceImage::new("ok", 100, 100), SourceImage::new("gone", 100, 100)];
        let result = layout(&images, 900, 900, 2, 10.0).unwrap();
        let mut pixels = HashMap::new();
        pixels.insert("ok".to_string(), flat(100, 100, [200, 0, 0]));

        let out = composite(&result, 900, 900, &CompositeOptions::default(), &pixels).unwrap();
        assert_eq!(out.skipped.len(), 1);
        assert_eq!(out.skipped[0].key, "gone");

        // The surviving image was still drawn.
        let rect = result.items[0].pixel_rect(900, 900);
        let rgb = out.raster.to_rgb8();
        let probe = rgb.get_pixel(rect.x + rect.width / 2, rect.y + rect.height / 2);
        assert!(probe.0[0] > 150, "expected drawn image, got {probe:?}");
    }

    // ── encoding ────────────────────────────────────────────────────────

    #[test]
    fn encode_round_trips_dimensions() {
        let raster = flat(64, 32, [1, 2, 3]);
        let bytes = encode_jpeg(&raster, 0.8).unwrap();
        let decoded = image::load_from_memory(&bytes).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (64, 32));
    }

    #[test]
    fn encode_rejects_out_of_range_quality() {
        let raster = flat(8, 8, [0, 0, 0]);
        for quality in [0.0, -1.0, 1.5] {
            assert!(matches!(
                encode_jpeg(&raster, quality),
                Err(Error::InvalidQuality { .. })
            ));
        }
        assert!(encode_jpeg(&raster, 1.0).is_ok());
        assert!(encode_jpeg(&raster, 0.01).is_ok());
    }

    // ── preview ─────────────────────────────────────────────────────────

    #[test]
    fn preview_fits_within_bound_preserving_aspect() {
        let raster = flat(1600, 800, [9, 9, 9]);
        let small = preview(&raster, 800);
        assert_eq!((small.width(), small.height()), (800, 400));
    }

    #[test]
    fn preview_is_identity_when_already_small() {
        let raster = flat(300, 200, [9, 9, 9]);
        let same = preview(&raster, 800);
        assert_eq!((same.width(), same.height()), (300, 200));
    }

    #[test]
    fn preview_portrait_bounds_height() {
        let raster = flat(500, 2000, [9, 9, 9]);
        let small = preview(&raster, 800);
        assert_eq!((small.width(), small.height()), (200, 800));
    }
}
