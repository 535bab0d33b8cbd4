//! Page rendering orchestration.
//!
//! ```text
//! bytes → open_document → page 1 → page 2 → … → DocumentLayout
//!                          (raster + text items → overlay)
//! ```
//!
//! Pages render strictly in order; the first failing page aborts the load.

use tracing::{debug, info, instrument};

use crate::engine::{DocumentHandle, RasterImage, RenderEngine, TextItem, Viewport};
use crate::error::{DecodeError, PageRenderError};
use crate::overlay::DocumentLayout;

/// A page's raster and raw text items at a given scale.
#[derive(Debug, Clone)]
pub struct RenderedPage {
    /// 1-based page number.
    pub number: u32,
    pub viewport: Viewport,
    pub raster: RasterImage,
    pub items: Vec<TextItem>,
}

/// Render one page.
pub async fn render_page(
    doc: &dyn DocumentHandle,
    number: u32,
    scale: f64,
) -> Result<RenderedPage, PageRenderError> {
    let fail = |e: anyhow::Error| PageRenderError {
        page: number,
        reason: format!("{e:#}"),
    };

    let page = doc.page(number).await.map_err(fail)?;
    let viewport = page.viewport(scale);
    let raster = page.render(&viewport).await.map_err(fail)?;
    let items = page.text_content().await.map_err(fail)?;

    debug!(page = number, items = items.len(), "page rendered");
    Ok(RenderedPage {
        number,
        viewport,
        raster,
        items,
    })
}

/// Decode `bytes` and render every page into a fresh layout.
///
/// `on_page` is called with `(page, total)` before each page renders.
#[instrument(skip_all, fields(engine = engine.name(), bytes = bytes.len(), scale = scale))]
pub async fn render_document<F>(
    engine: &dyn RenderEngine,
    bytes: &[u8],
    scale: f64,
    mut on_page: F,
) -> Result<DocumentLayout, DecodeError>
where
    F: FnMut(u32, u32),
{
    let doc = engine
        .open_document(bytes)
        .await
        .map_err(|e| DecodeError::Document(format!("{e:#}")))?;
    let total = doc.page_count();
    info!(pages = total, "document opened");

    let mut layout = DocumentLayout::new();
    for number in 1..=total {
        on_page(number, total);
        let rendered = render_page(doc.as_ref(), number, scale).await?;
        let index = layout.push_page(&rendered.viewport, rendered.raster);
        layout.add_items(index, &rendered.viewport, &rendered.items);
    }

    info!(
        pages = layout.pages().len(),
        elements = layout.records().len(),
        "document rendered"
    );
    Ok(layout)
}
