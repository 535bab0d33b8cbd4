//! Rendering engine backed by `pdfium-render` (Chromium's PDF library).
//!
//! Text comes from pdfium's text segments: each segment becomes one
//! [`TextItem`] whose transform places a `height`-sized glyph run at the
//! segment's bottom-left corner, the same shape pdf.js reports.
//!
//! Segment bounds are in unrotated page space while pdfium reports page size
//! after `/Rotate`, so the view box is un-rotated and the page rotation is
//! carried into the [`Viewport`].
//!
//! Requires the pdfium dynamic library at runtime.

use std::rc::Rc;

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use pdfium_render::prelude::*;
use tracing::debug;

use super::{DocumentHandle, Page, RasterImage, RenderEngine, TextItem, Viewport};
use crate::geometry::Matrix;

pub struct PdfiumEngine {
    pdfium: Rc<Pdfium>,
}

impl PdfiumEngine {
    /// Bind to a pdfium library next to the executable, falling back to the
    /// system library.
    pub fn new() -> Result<Self> {
        let bindings = Pdfium::bind_to_library(Pdfium::pdfium_platform_library_name_at_path("./"))
            .or_else(|_| Pdfium::bind_to_system_library())
            .map_err(|e| anyhow!("failed to bind to pdfium library: {e}"))?;
        Ok(Self {
            pdfium: Rc::new(Pdfium::new(bindings)),
        })
    }
}

#[async_trait(?Send)]
impl RenderEngine for PdfiumEngine {
    fn name(&self) -> &'static str {
        "pdfium"
    }

    async fn open_document(&self, bytes: &[u8]) -> Result<Box<dyn DocumentHandle>> {
        let bytes: Rc<[u8]> = Rc::from(bytes);
        let page_count = {
            let doc = self
                .pdfium
                .load_pdf_from_byte_slice(&bytes, None)
                .context("Failed to parse PDF")?;
            doc.pages().len() as u32
        };
        debug!(page_count, "pdfium opened document");
        Ok(Box::new(PdfiumDocument {
            pdfium: Rc::clone(&self.pdfium),
            bytes,
            page_count,
        }))
    }
}

/// pdfium documents borrow their bytes and bindings, so each handle keeps
/// the bytes and reopens the document per page.
struct PdfiumDocument {
    pdfium: Rc<Pdfium>,
    bytes: Rc<[u8]>,
    page_count: u32,
}

#[async_trait(?Send)]
impl DocumentHandle for PdfiumDocument {
    fn page_count(&self) -> u32 {
        self.page_count
    }

    async fn page(&self, number: u32) -> Result<Box<dyn Page>> {
        let index = page_index(number, self.page_count)?;
        let doc = self
            .pdfium
            .load_pdf_from_byte_slice(&self.bytes, None)
            .context("Failed to parse PDF")?;
        let page = doc.pages().get(index).context("Failed to load page")?;

        let rotation = rotation_degrees(page.rotation().context("Failed to read page rotation")?);
        let view_box = unrotated_view_box(
            f64::from(page.width().value),
            f64::from(page.height().value),
            rotation,
        );
        let items = extract_items(&page)?;

        Ok(Box::new(PdfiumPage {
            pdfium: Rc::clone(&self.pdfium),
            bytes: Rc::clone(&self.bytes),
            index,
            view_box,
            rotation,
            items,
        }))
    }
}

fn rotation_degrees(rotation: PdfPageRenderRotation) -> i32 {
    match rotation {
        PdfPageRenderRotation::None => 0,
        PdfPageRenderRotation::Degrees90 => 90,
        PdfPageRenderRotation::Degrees180 => 180,
        PdfPageRenderRotation::Degrees270 => 270,
    }
}

/// View box in unrotated page space from the displayed page size.
fn unrotated_view_box(width: f64, height: f64, rotation: i32) -> [f64; 4] {
    if rotation % 180 == 0 {
        [0.0, 0.0, width, height]
    } else {
        [0.0, 0.0, height, width]
    }
}

fn page_index(number: u32, page_count: u32) -> Result<u16> {
    if number == 0 || number > page_count {
        return Err(anyhow!("page {number} out of range (1..={page_count})"));
    }
    u16::try_from(number - 1).context("page index exceeds pdfium range")
}

#[allow(deprecated)] // PdfRect field access deprecated in 0.8.28, removed in 0.9.0
fn extract_items(page: &PdfPage) -> Result<Vec<TextItem>> {
    let text = page.text().context("Failed to extract text from page")?;
    let mut items = Vec::new();

    for segment in text.segments().iter() {
        let bounds = segment.bounds();
        let left = f64::from(bounds.left.value);
        let bottom = f64::from(bounds.bottom.value);
        let width = f64::from((bounds.right.value - bounds.left.value).abs());
        let height = f64::from((bounds.top.value - bounds.bottom.value).abs());

        items.push(TextItem::new(
            segment.text(),
            Matrix::new(height, 0.0, 0.0, height, left, bottom),
            width,
            height,
        ));
    }

    Ok(items)
}

struct PdfiumPage {
    pdfium: Rc<Pdfium>,
    bytes: Rc<[u8]>,
    index: u16,
    view_box: [f64; 4],
    rotation: i32,
    items: Vec<TextItem>,
}

#[async_trait(?Send)]
impl Page for PdfiumPage {
    fn viewport(&self, scale: f64) -> Viewport {
        Viewport::new(self.view_box, scale, self.rotation)
    }

    async fn render(&self, viewport: &Viewport) -> Result<RasterImage> {
        let doc = self
            .pdfium
            .load_pdf_from_byte_slice(&self.bytes, None)
            .context("Failed to parse PDF")?;
        let page = doc.pages().get(self.index).context("Failed to load page")?;

        let config = PdfRenderConfig::new()
            .set_target_width(viewport.width.round() as i32)
            .set_maximum_height(viewport.height.round() as i32);
        let bitmap = page
            .render_with_config(&config)
            .context("Failed to rasterize page")?;

        Ok(RasterImage {
            width: bitmap.width() as u32,
            height: bitmap.height() as u32,
            rgba: bitmap.as_rgba_bytes(),
        })
    }

    async fn text_content(&self) -> Result<Vec<TextItem>> {
        Ok(self.items.clone())
    }
}
