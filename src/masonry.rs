//! Masonry layout computation: shortest-column-first greedy packing.
//!
//! Assigns each image to a column and vertical offset, preserving aspect
//! ratio, and rejects images that would overflow the canvas. Pure geometry —
//! deterministic, single pass, no pixel operations.
//!
//! # Example
//!
//! ```
//! use zenmasonry::{layout, SourceImage};
//!
//! let images = vec![
//!     SourceImage::new("a", 400, 300),
//!     SourceImage::new("b", 400, 600),
//! ];
//! let result = layout(&images, 1000, 1000, 3, 10.0).unwrap();
//!
//! assert_eq!(result.items.len(), 2);
//! assert_eq!(result.rejected, 0);
//! // Both land at the top of their own column.
//! assert_eq!(result.items[0].column, 0);
//! assert_eq!(result.items[1].column, 1);
//! ```

use crate::error::{Error, Result};
use crate::units::MAX_RASTER_DIM;

/// An image to be placed: stable identifier plus original pixel dimensions.
///
/// Pixel data is owned externally and resolved by `key` at composite time
/// (see [`PixelSource`](crate::compose::PixelSource)); the layout engine
/// only reads dimensions.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct SourceImage {
    /// Stable identifier, unique within one layout request.
    pub key: String,
    /// Original width in pixels. Must be positive.
    pub width: u32,
    /// Original height in pixels. Must be positive.
    pub height: u32,
}

impl SourceImage {
    /// Create a source image record.
    pub fn new(key: impl Into<String>, width: u32, height: u32) -> Self {
        Self {
            key: key.into(),
            width,
            height,
        }
    }
}

/// A placed image: position and size on the output canvas, in pixels.
///
/// Created once per successful placement, never mutated. `width / height`
/// equals the source aspect ratio within floating-point tolerance.
#[derive(Clone, Debug, PartialEq)]
pub struct PlacedItem {
    /// Index of the originating image in the input slice.
    pub index: usize,
    /// Identifier of the originating image.
    pub key: String,
    /// Column this item landed in (0-based).
    pub column: usize,
    /// Left edge on the canvas.
    pub x: f64,
    /// Top edge on the canvas.
    pub y: f64,
    /// Placed width (the column width).
    pub width: f64,
    /// Placed height, width-driven from the source aspect ratio.
    pub height: f64,
}

impl PlacedItem {
    /// Integer device rectangle for drawing, clamped to the canvas.
    pub fn pixel_rect(&self, canvas_w: u32, canvas_h: u32) -> Rect {
        let x = (self.x.round().max(0.0) as u32).min(canvas_w.saturating_sub(1));
        let y = (self.y.round().max(0.0) as u32).min(canvas_h.saturating_sub(1));
        let w = (self.width.round().max(1.0) as u32).min(canvas_w - x);
        let h = (self.height.round().max(1.0) as u32).min(canvas_h - y);
        Rect {
            x,
            y,
            width: w.max(1),
            height: h.max(1),
        }
    }
}

/// Axis-aligned rectangle in device pixel coordinates.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct Rect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

/// Output of one layout computation: placements plus the rejected count.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct LayoutResult {
    /// Placed items in placement order (input order of the survivors).
    pub items: Vec<PlacedItem>,
    /// Number of input images the overflow cutoff excluded.
    pub rejected: usize,
}

/// Default column-count heuristic: one column per 400 px of canvas width,
/// clamped to `1..=5`.
///
/// A documented default, not an engine constraint — [`layout`] accepts any
/// caller-supplied count ≥ 1.
pub fn default_columns(canvas_w: u32) -> usize {
    ((canvas_w / 400) as usize).clamp(1, 5)
}

/// Compute a masonry layout for `images` on a `canvas_w` × `canvas_h` canvas.
///
/// Deterministic single pass in input order. Each image goes to the column
/// with the minimum filled height (lowest index wins ties), at the column
/// width, with height derived from its aspect ratio. An image whose bottom
/// edge would cross `canvas_h − gap` is rejected outright — it is not
/// retried in another column, so a later, shorter image may still fit where
/// an earlier, taller one did not.
///
/// `columns` is clamped to ≥ 1 and `gap` to ≥ 0.
///
/// # Errors
///
/// - [`Error::InvalidDimension`] — zero canvas or source dimensions.
/// - [`Error::CanvasTooLarge`] — a canvas dimension above
///   [`MAX_RASTER_DIM`], checked before any placement.
/// - [`Error::EmptyLayout`] — the usable height is zero, the columns have
///   no width, or every image was rejected.
pub fn layout(
    images: &[SourceImage],
    canvas_w: u32,
    canvas_h: u32,
    columns: usize,
    gap: f64,
) -> Result<LayoutResult> {
    if canvas_w == 0 || canvas_h == 0 {
        return Err(Error::InvalidDimension {
            width: canvas_w as f64,
            height: canvas_h as f64,
        });
    }
    if canvas_w > MAX_RASTER_DIM || canvas_h > MAX_RASTER_DIM {
        return Err(Error::CanvasTooLarge {
            width: canvas_w,
            height: canvas_h,
            max: MAX_RASTER_DIM,
        });
    }
    if let Some(bad) = images.iter().find(|i| i.width == 0 || i.height == 0) {
        return Err(Error::InvalidDimension {
            width: bad.width as f64,
            height: bad.height as f64,
        });
    }

    let columns = columns.max(1);
    let gap = gap.max(0.0);

    // Bottom edge no placement may cross.
    let ceiling = canvas_h as f64 - gap;
    if ceiling <= 0.0 {
        return Err(Error::EmptyLayout {
            rejected: images.len(),
        });
    }

    let column_width = (canvas_w as f64 - gap * (columns as f64 + 1.0)) / columns as f64;
    if column_width <= 0.0 {
        return Err(Error::EmptyLayout {
            rejected: images.len(),
        });
    }

    // Filled height per column, starting at the top gap.
    let mut heights = vec![gap; columns];
    let mut items = Vec::with_capacity(images.len());
    let mut rejected = 0usize;

    for (index, image) in images.iter().enumerate() {
        let column = shortest_column(&heights);
        let height = column_width * image.height as f64 / image.width as f64;
        let y = heights[column];
        if y + height > ceiling {
            rejected += 1;
            continue;
        }
        let x = gap + column as f64 * (column_width + gap);
        items.push(PlacedItem {
            index,
            key: image.key.clone(),
            column,
            x,
            y,
            width: column_width,
            height,
        });
        heights[column] = y + height + gap;
    }

    if items.is_empty() && !images.is_empty() {
        return Err(Error::EmptyLayout { rejected });
    }
    Ok(LayoutResult { items, rejected })
}

/// Index of the column with the minimum filled height; the first column
/// achieving the minimum wins (left-to-right scan).
fn shortest_column(heights: &[f64]) -> usize {
    let mut best = 0;
    for (i, h) in heights.iter().enumerate().skip(1) {
        if *h < heights[best] {
            best = i;
        }
    }
    best
}
