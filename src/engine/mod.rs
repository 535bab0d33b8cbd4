//! Rendering engine contract.
//!
//! The editor never parses PDF itself. It drives an engine through three
//! small async traits that mirror the pdf.js document/page API:
//!
//! - [`RenderEngine`]: decodes raw bytes into a [`DocumentHandle`]
//! - [`DocumentHandle`]: page count plus 1-based page lookup
//! - [`Page`]: viewport geometry, rasterization and text items
//!
//! All three are `?Send`: loading runs on a single cooperative timeline and
//! engines such as pdfium hand out thread-bound handles.
//!
//! # Implementations
//!
//! | Engine | Module | Feature Flag |
//! |--------|--------|-------------|
//! | [`MemoryEngine`] | [`memory`] | always |
//! | `PdfiumEngine` | `pdfium` | `pdf` |

pub mod memory;
#[cfg(feature = "pdf")]
pub mod pdfium;

use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::geometry::Matrix;

pub use memory::{MemoryEngine, MemoryPage};
#[cfg(feature = "pdf")]
pub use pdfium::PdfiumEngine;

/// A run of text as reported by the engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextItem {
    #[serde(rename = "str")]
    pub text: String,
    /// Text-space to page-space transform of the run's origin.
    pub transform: Matrix,
    pub width: f64,
    pub height: f64,
}

impl TextItem {
    pub fn new(text: impl Into<String>, transform: Matrix, width: f64, height: f64) -> Self {
        Self {
            text: text.into(),
            transform,
            width,
            height,
        }
    }
}

/// An RGBA raster of a rendered page.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RasterImage {
    pub width: u32,
    pub height: u32,
    pub rgba: Vec<u8>,
}

/// Page geometry at a given scale and rotation.
///
/// Computes the same `transform`, `width` and `height` as pdf.js
/// `PageViewport`, so text-item transforms composed against it land on the
/// same pixels the raster was drawn at.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    /// `[x1, y1, x2, y2]` in PDF user space.
    pub view_box: [f64; 4],
    pub scale: f64,
    /// Degrees, normalized to 0, 90, 180 or 270.
    pub rotation: i32,
    pub offset_x: f64,
    pub offset_y: f64,
    pub dont_flip: bool,
    pub transform: Matrix,
    pub width: f64,
    pub height: f64,
}

impl Viewport {
    #[must_use]
    pub fn new(view_box: [f64; 4], scale: f64, rotation: i32) -> Self {
        Self::with_options(view_box, scale, rotation, 0.0, 0.0, false)
    }

    #[must_use]
    pub fn with_options(
        view_box: [f64; 4],
        scale: f64,
        rotation: i32,
        offset_x: f64,
        offset_y: f64,
        dont_flip: bool,
    ) -> Self {
        let [x1, y1, x2, y2] = view_box;
        let center_x = (x2 + x1) / 2.0;
        let center_y = (y2 + y1) / 2.0;

        let rotation = rotation.rem_euclid(360) / 90 * 90;
        let (rotate_a, rotate_b, mut rotate_c, mut rotate_d) = match rotation {
            90 => (0.0, 1.0, 1.0, 0.0),
            180 => (-1.0, 0.0, 0.0, 1.0),
            270 => (0.0, -1.0, -1.0, 0.0),
            _ => (1.0, 0.0, 0.0, -1.0),
        };
        if dont_flip {
            rotate_c = -rotate_c;
            rotate_d = -rotate_d;
        }

        let (offset_canvas_x, offset_canvas_y, width, height) = if rotate_a == 0.0 {
            (
                (center_y - y1).abs() * scale + offset_x,
                (center_x - x1).abs() * scale + offset_y,
                (y2 - y1).abs() * scale,
                (x2 - x1).abs() * scale,
            )
        } else {
            (
                (center_x - x1).abs() * scale + offset_x,
                (center_y - y1).abs() * scale + offset_y,
                (x2 - x1).abs() * scale,
                (y2 - y1).abs() * scale,
            )
        };

        let transform = Matrix::new(
            rotate_a * scale,
            rotate_b * scale,
            rotate_c * scale,
            rotate_d * scale,
            offset_canvas_x - rotate_a * scale * center_x - rotate_c * scale * center_y,
            offset_canvas_y - rotate_b * scale * center_x - rotate_d * scale * center_y,
        );

        Self {
            view_box,
            scale,
            rotation,
            offset_x,
            offset_y,
            dont_flip,
            transform,
            width,
            height,
        }
    }

    /// Same page geometry with the y-axis flip toggled.
    #[must_use]
    pub fn clone_with(&self, dont_flip: bool) -> Self {
        Self::with_options(
            self.view_box,
            self.scale,
            self.rotation,
            self.offset_x,
            self.offset_y,
            dont_flip,
        )
    }
}

/// Decodes raw document bytes.
#[async_trait(?Send)]
pub trait RenderEngine {
    /// Engine name for logs (e.g., "pdfium", "memory").
    fn name(&self) -> &'static str;

    async fn open_document(&self, bytes: &[u8]) -> Result<Box<dyn DocumentHandle>>;
}

/// An opened document.
#[async_trait(?Send)]
pub trait DocumentHandle {
    fn page_count(&self) -> u32;

    /// Look up a page by 1-based number.
    async fn page(&self, number: u32) -> Result<Box<dyn Page>>;
}

/// A single decoded page.
#[async_trait(?Send)]
pub trait Page {
    fn viewport(&self, scale: f64) -> Viewport;

    async fn render(&self, viewport: &Viewport) -> Result<RasterImage>;

    /// Text items in the engine's encounter order.
    async fn text_content(&self) -> Result<Vec<TextItem>>;
}
