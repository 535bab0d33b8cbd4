//! Overlay building: from engine text items to editable, positioned elements.
//!
//! For every text item with visible content the builder
//!
//! 1. composes the page's non-flipped viewport transform with the item
//!    transform (see [`place_item`]),
//! 2. creates an [`EditableElement`] at the composed anchor, sized to the
//!    item's intrinsic width/height,
//! 3. appends it to the page's overlay in encounter order,
//! 4. appends a [`TextItemRecord`] tying the element to its origin.
//!
//! Whitespace-only items produce neither an element nor a record.

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::engine::{RasterImage, TextItem, Viewport};
use crate::geometry::Rect;

/// Identifies an editable element within one document layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ElementId(pub u32);

impl fmt::Display for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

/// Absolute placement of an element inside its page overlay, in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ElementStyle {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
    pub font_size: f64,
}

/// An editable text element. `text` is the live content the UI reads and
/// writes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EditableElement {
    pub id: ElementId,
    pub style: ElementStyle,
    pub text: String,
}

/// Origin metadata for one editable element. Never mutated after creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextItemRecord {
    #[serde(rename = "ownerElementId")]
    pub owner: ElementId,
    pub original_text: String,
    /// 0-based page index.
    pub page_index: u32,
    /// Viewport pixel space, same space as the element style.
    pub rect: Rect,
    pub font_size: f64,
}

/// A rendered page: raster plus its overlay region.
#[derive(Debug, Clone, PartialEq)]
pub struct PageView {
    pub index: u32,
    pub width: f64,
    pub height: f64,
    pub raster: RasterImage,
    pub overlay: Vec<EditableElement>,
}

/// Where an item lands in viewport pixel space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Placement {
    pub x: f64,
    pub y: f64,
    pub font_size: f64,
}

/// Map a text item into the viewport's non-flipped pixel space.
///
/// The composed `scaleX` is the font size and the composed translation is
/// the element's top-left anchor.
#[must_use]
pub fn place_item(viewport: &Viewport, item: &TextItem) -> Placement {
    let composed = viewport.clone_with(true).transform.compose(&item.transform);
    Placement {
        x: composed.translate_x(),
        y: composed.translate_y(),
        font_size: composed.scale_x(),
    }
}

/// All pages and records of one loaded document.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DocumentLayout {
    pages: Vec<PageView>,
    records: Vec<TextItemRecord>,
    /// `(page, slot)` of each element, indexed by id. Ids are dense from 0.
    slots: Vec<(u32, usize)>,
}

impl DocumentLayout {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a page container with an empty overlay. Returns its 0-based index.
    pub fn push_page(&mut self, viewport: &Viewport, raster: RasterImage) -> u32 {
        let index = self.pages.len() as u32;
        self.pages.push(PageView {
            index,
            width: viewport.width,
            height: viewport.height,
            raster,
            overlay: Vec::new(),
        });
        index
    }

    /// Build editable elements for `items` on page `page_index`.
    ///
    /// Returns the number of elements created.
    ///
    /// # Panics
    ///
    /// Panics if `page_index` was not returned by [`push_page`](Self::push_page).
    pub fn add_items(&mut self, page_index: u32, viewport: &Viewport, items: &[TextItem]) -> usize {
        let page = &mut self.pages[page_index as usize];
        let mut added = 0;

        for item in items {
            if item.text.trim().is_empty() {
                continue;
            }

            let placement = place_item(viewport, item);
            let id = ElementId(self.slots.len() as u32);
            self.slots.push((page_index, page.overlay.len()));

            page.overlay.push(EditableElement {
                id,
                style: ElementStyle {
                    left: placement.x,
                    top: placement.y,
                    width: item.width,
                    height: item.height,
                    font_size: placement.font_size,
                },
                text: item.text.clone(),
            });
            self.records.push(TextItemRecord {
                owner: id,
                original_text: item.text.clone(),
                page_index,
                rect: Rect::new(placement.x, placement.y, item.width, item.height),
                font_size: placement.font_size,
            });
            added += 1;
        }

        debug!(
            page = page_index + 1,
            items = items.len(),
            elements = added,
            "overlay built"
        );
        added
    }

    #[must_use]
    pub fn pages(&self) -> &[PageView] {
        &self.pages
    }

    #[must_use]
    pub fn records(&self) -> &[TextItemRecord] {
        &self.records
    }

    pub fn elements(&self) -> impl Iterator<Item = &EditableElement> {
        self.pages.iter().flat_map(|p| p.overlay.iter())
    }

    #[must_use]
    pub fn element(&self, id: ElementId) -> Option<&EditableElement> {
        let &(page, slot) = self.slots.get(id.0 as usize)?;
        self.pages.get(page as usize)?.overlay.get(slot)
    }

    pub fn element_mut(&mut self, id: ElementId) -> Option<&mut EditableElement> {
        let &(page, slot) = self.slots.get(id.0 as usize)?;
        self.pages.get_mut(page as usize)?.overlay.get_mut(slot)
    }

    /// Replace an element's live text. Returns `false` for unknown ids.
    pub fn set_text(&mut self, id: ElementId, text: impl Into<String>) -> bool {
        match self.element_mut(id) {
            Some(element) => {
                element.text = text.into();
                true
            }
            None => false,
        }
    }
}
