//! Edit collection: which elements changed, in document order.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{EditorError, Result};
use crate::geometry::Rect;
use crate::overlay::{DocumentLayout, ElementId, TextItemRecord};

/// One changed text run, addressed by page and viewport rectangle.
///
/// Serializes to the wire shape the rewriting service expects:
/// `{pageIndex, newText, rect: {x, y, width, height}, fontSize}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EditDiff {
    pub page_index: u32,
    pub new_text: String,
    pub rect: Rect,
    pub font_size: f64,
}

/// Read access to the live text of editable elements.
pub trait LiveText {
    fn live_text(&self, id: ElementId) -> Option<&str>;
}

impl LiveText for DocumentLayout {
    fn live_text(&self, id: ElementId) -> Option<&str> {
        self.element(id).map(|e| e.text.as_str())
    }
}

impl LiveText for HashMap<ElementId, String> {
    fn live_text(&self, id: ElementId) -> Option<&str> {
        self.get(&id).map(String::as_str)
    }
}

/// Diffs for every record whose live text differs from its original.
///
/// Comparison is exact (no trimming or normalization). Records whose
/// element cannot be found are treated as unchanged.
pub fn collect_edits<L: LiveText + ?Sized>(records: &[TextItemRecord], live: &L) -> Vec<EditDiff> {
    let edits: Vec<EditDiff> = records
        .iter()
        .filter_map(|record| {
            let current = live.live_text(record.owner)?;
            (current != record.original_text).then(|| EditDiff {
                page_index: record.page_index,
                new_text: current.to_string(),
                rect: record.rect,
                font_size: record.font_size,
            })
        })
        .collect();

    debug!(records = records.len(), edits = edits.len(), "collected edits");
    edits
}

/// Like [`collect_edits`], but an empty result is [`EditorError::NoChanges`].
pub fn require_edits<L: LiveText + ?Sized>(
    records: &[TextItemRecord],
    live: &L,
) -> Result<Vec<EditDiff>> {
    let edits = collect_edits(records, live);
    if edits.is_empty() {
        return Err(EditorError::NoChanges);
    }
    Ok(edits)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(id: u32, text: &str, page: u32) -> TextItemRecord {
        TextItemRecord {
            owner: ElementId(id),
            original_text: text.to_string(),
            page_index: page,
            rect: Rect::new(f64::from(id) * 10.0, 20.0, 5.0, 10.0),
            font_size: 12.0,
        }
    }

    fn live(pairs: &[(u32, &str)]) -> HashMap<ElementId, String> {
        pairs
            .iter()
            .map(|(id, text)| (ElementId(*id), (*text).to_string()))
            .collect()
    }

    #[test]
    fn unmodified_set_is_empty_every_time() {
        let records = vec![record(0, "a", 0), record(1, "b", 0)];
        let texts = live(&[(0, "a"), (1, "b")]);
        assert!(collect_edits(&records, &texts).is_empty());
        assert!(collect_edits(&records, &texts).is_empty());
        assert!(matches!(require_edits(&records, &texts), Err(EditorError::NoChanges)));
    }

    #[test]
    fn single_change_among_many() {
        let mut records: Vec<_> = (0..50).map(|i| record(i, "same", i / 10)).collect();
        records[17].original_text = "Hello".to_string();
        let mut texts: HashMap<_, _> = records
            .iter()
            .map(|r| (r.owner, r.original_text.clone()))
            .collect();
        texts.insert(ElementId(17), "Hello, World".to_string());

        let edits = collect_edits(&records, &texts);
        assert_eq!(edits.len(), 1);
        assert_eq!(edits[0].new_text, "Hello, World");
        assert_eq!(edits[0].rect, records[17].rect);
        assert_eq!(edits[0].font_size, records[17].font_size);
        assert_eq!(edits[0].page_index, 1);
    }

    #[test]
    fn order_follows_records_not_edits() {
        let records = vec![record(0, "a", 0), record(1, "b", 0), record(2, "c", 1)];
        // HashMap iteration order is irrelevant; record order drives output.
        let texts = live(&[(2, "C"), (0, "A"), (1, "b")]);
        let edits = collect_edits(&records, &texts);
        let new: Vec<_> = edits.iter().map(|e| e.new_text.as_str()).collect();
        assert_eq!(new, ["A", "C"]);
    }

    #[test]
    fn whitespace_differences_count() {
        let records = vec![record(0, "Hello", 0)];
        let edits = collect_edits(&records, &live(&[(0, "Hello ")]));
        assert_eq!(edits.len(), 1);
    }

    #[test]
    fn cleared_text_is_sent_as_empty_string() {
        let records = vec![record(0, "Hello", 0)];
        let edits = collect_edits(&records, &live(&[(0, "")]));
        assert_eq!(edits[0].new_text, "");
    }

    #[test]
    fn missing_element_is_unchanged() {
        let records = vec![record(0, "Hello", 0)];
        assert!(collect_edits(&records, &live(&[])).is_empty());
    }

    #[test]
    fn wire_format_uses_camel_case() {
        let diff = EditDiff {
            page_index: 0,
            new_text: "B".to_string(),
            rect: Rect::new(10.0, 20.0, 5.0, 10.0),
            font_size: 12.0,
        };
        let json = serde_json::to_value(&diff).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "pageIndex": 0,
                "newText": "B",
                "rect": {"x": 10.0, "y": 20.0, "width": 5.0, "height": 10.0},
                "fontSize": 12.0
            })
        );
    }
}
