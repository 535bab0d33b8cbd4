//! In-memory engine over pre-extracted page layouts.
//!
//! Useful when text positions come from somewhere other than a live PDF
//! decoder (fixtures, a remote extractor, a cached layout). The document
//! bytes handed to [`RenderEngine::open_document`] are ignored; every open
//! yields the configured pages.

use anyhow::{bail, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::{DocumentHandle, Page, RasterImage, RenderEngine, TextItem, Viewport};

/// Upper bound on one page raster (256 MiB of RGBA).
const MAX_RASTER_BYTES: u64 = 256 * 1024 * 1024;

/// One page of a pre-extracted layout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemoryPage {
    /// `[x1, y1, x2, y2]` in PDF user space.
    pub view_box: [f64; 4],
    #[serde(default)]
    pub rotation: i32,
    #[serde(default)]
    pub items: Vec<TextItem>,
    /// Simulate a decode failure for this page.
    #[serde(default)]
    pub broken: bool,
}

impl MemoryPage {
    #[must_use]
    pub fn new(view_box: [f64; 4]) -> Self {
        Self {
            view_box,
            rotation: 0,
            items: Vec::new(),
            broken: false,
        }
    }

    #[must_use]
    pub fn with_item(mut self, item: TextItem) -> Self {
        self.items.push(item);
        self
    }

    #[must_use]
    pub fn broken(mut self) -> Self {
        self.broken = true;
        self
    }
}

#[derive(Debug, Clone, Default)]
pub struct MemoryEngine {
    pages: Vec<MemoryPage>,
    reject_open: bool,
}

impl MemoryEngine {
    #[must_use]
    pub fn new(pages: Vec<MemoryPage>) -> Self {
        Self {
            pages,
            reject_open: false,
        }
    }

    /// An engine whose every `open_document` call fails.
    #[must_use]
    pub fn rejecting() -> Self {
        Self {
            pages: Vec::new(),
            reject_open: true,
        }
    }

    /// Parse a JSON array of [`MemoryPage`]s.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(Self::new(serde_json::from_str(json)?))
    }
}

#[async_trait(?Send)]
impl RenderEngine for MemoryEngine {
    fn name(&self) -> &'static str {
        "memory"
    }

    async fn open_document(&self, _bytes: &[u8]) -> Result<Box<dyn DocumentHandle>> {
        if self.reject_open {
            bail!("document is not a valid PDF");
        }
        Ok(Box::new(MemoryDocument {
            pages: self.pages.clone(),
        }))
    }
}

struct MemoryDocument {
    pages: Vec<MemoryPage>,
}

#[async_trait(?Send)]
impl DocumentHandle for MemoryDocument {
    fn page_count(&self) -> u32 {
        u32::try_from(self.pages.len()).unwrap_or(u32::MAX)
    }

    async fn page(&self, number: u32) -> Result<Box<dyn Page>> {
        let Some(page) = number
            .checked_sub(1)
            .and_then(|i| self.pages.get(i as usize))
        else {
            bail!("page {number} out of range (1..={})", self.pages.len());
        };
        if page.broken {
            bail!("corrupt content stream");
        }
        Ok(Box::new(page.clone()))
    }
}

#[async_trait(?Send)]
impl Page for MemoryPage {
    fn viewport(&self, scale: f64) -> Viewport {
        Viewport::new(self.view_box, scale, self.rotation)
    }

    async fn render(&self, viewport: &Viewport) -> Result<RasterImage> {
        let (width, height) = (viewport.width.round(), viewport.height.round());
        if !(width.is_finite() && height.is_finite()) || width < 0.0 || height < 0.0 {
            bail!("invalid raster size {width}x{height}");
        }
        let (width, height) = (width as u32, height as u32);
        let len = u64::from(width)
            .checked_mul(u64::from(height))
            .and_then(|pixels| pixels.checked_mul(4))
            .unwrap_or(u64::MAX);
        if len > MAX_RASTER_BYTES {
            bail!("raster {width}x{height} exceeds {MAX_RASTER_BYTES} bytes");
        }
        Ok(RasterImage {
            width,
            height,
            rgba: vec![0xFF; len as usize],
        })
    }

    async fn text_content(&self) -> Result<Vec<TextItem>> {
        Ok(self.items.clone())
    }
}
