//! Masonry banner layout and compositing.
//!
//! Lays rectangular images out into a dense, gap-free multi-column masonry
//! arrangement and composites the result into one fixed-size raster. The
//! geometry core is pure and deterministic — no pixel operations; the
//! raster surface (feature `raster`, on by default) draws, encodes, and
//! previews.
//!
//! # Modules
//!
//! - [`units`] — physical unit conversion (px / in / cm + DPI → pixels)
//! - [`masonry`] — shortest-column-first greedy packing with overflow rejection
//! - [`compose`] — canvas fill, scaled draws, border strokes, JPEG encoding
//! - [`pipeline`] — the per-request render sequence and filename convention
//!
//! # Example
//!
//! ```
//! use zenmasonry::{SourceImage, layout};
//!
//! let images = vec![
//!     SourceImage::new("a", 100, 100),
//!     SourceImage::new("b", 100, 100),
//!     SourceImage::new("c", 100, 100),
//! ];
//! let result = layout(&images, 1000, 1000, 3, 10.0).unwrap();
//!
//! // One 320-wide square at the top of each column.
//! assert_eq!(result.items.len(), 3);
//! assert_eq!(result.rejected, 0);
//! assert_eq!(result.items[2].x, 670.0);
//! ```

#![forbid(unsafe_code)]

pub mod error;
pub mod masonry;
pub mod units;

#[cfg(feature = "raster")]
pub mod compose;
#[cfg(feature = "raster")]
pub mod pipeline;

// Re-exports: core types from the geometry modules
pub use error::{Error, Result};
pub use masonry::{LayoutResult, PlacedItem, Rect, SourceImage, default_columns, layout};
pub use units::{CM_PER_INCH, MAX_RASTER_DIM, SizeSpec, Unit};

// Re-exports: raster surface
#[cfg(feature = "raster")]
pub use compose::{
    CanvasColor, CompositeOptions, Composited, DEFAULT_PREVIEW_DIM, PixelSource, SkippedImage,
    composite, encode_jpeg, preview,
};
#[cfg(feature = "raster")]
pub use pipeline::{DEFAULT_GAP, RenderOptions, RenderOutput, output_filename, render};
