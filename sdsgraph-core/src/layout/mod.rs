// Layout collaborator boundary.
//
// A `Layout` is everything the external extraction stage hands over for one
// document: positioned text fragments per page, detected table grids and
// pictogram detections. `LayoutSource` implementations produce it.

pub mod json;
pub mod source;

pub use json::JsonLayoutSource;
pub use source::LayoutSource;

use crate::error::{Result, SdsError};
use crate::injection::pictogram::PictogramDetection;
use crate::injection::table::TableGrid;
use crate::types::{sort_document_order, BoundingBox, ElementClass, PositionedElement};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Name used when neither the layout nor its file provides one.
pub const DEFAULT_DOCUMENT_NAME: &str = "default";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Layout {
    #[serde(default)]
    pub name: Option<String>,
    pub pages: Vec<LayoutPage>,
    #[serde(default)]
    pub pictograms: Vec<PictogramDetection>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LayoutPage {
    pub number: u32,
    #[serde(default)]
    pub width: f64,
    pub height: f64,
    #[serde(default)]
    pub elements: Vec<LayoutElement>,
    #[serde(default)]
    pub tables: Vec<TableGrid>,
}

/// A fragment in native page space (bottom-up).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LayoutElement {
    pub x0: f64,
    pub y0: f64,
    pub x1: f64,
    pub y1: f64,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub class: ElementClass,
}

impl Layout {
    pub fn document_name(&self) -> &str {
        self.name
            .as_deref()
            .filter(|n| !n.trim().is_empty())
            .unwrap_or(DEFAULT_DOCUMENT_NAME)
    }

    /// Unnamed layouts take the file stem of `path`.
    pub fn with_name_from_path(mut self, path: &Path) -> Self {
        if self.name.is_none() {
            self.name = path
                .file_stem()
                .and_then(|s| s.to_str())
                .map(str::to_string);
        }
        self
    }

    /// Pages must have a positive height and ascending numbers, since document
    /// space is built by stacking them in order.
    pub fn validate(&self) -> Result<()> {
        let mut previous: Option<u32> = None;
        for page in &self.pages {
            if !page.height.is_finite() || page.height <= 0.0 {
                return Err(SdsError::InvalidLayout(format!(
                    "page {} has non-positive height {}",
                    page.number, page.height
                )));
            }
            if let Some(prev) = previous {
                if page.number <= prev {
                    return Err(SdsError::InvalidLayout(format!(
                        "page {} listed after page {}",
                        page.number, prev
                    )));
                }
            }
            previous = Some(page.number);
        }
        Ok(())
    }

    /// Sum of the heights of all pages before `page`.
    pub fn page_offset(&self, page: u32) -> Option<f64> {
        let mut offset = 0.0;
        for p in &self.pages {
            if p.number == page {
                return Some(offset);
            }
            offset += p.height;
        }
        None
    }

    pub fn page(&self, number: u32) -> Option<&LayoutPage> {
        self.pages.iter().find(|p| p.number == number)
    }

    /// All fragments with document-space geometry, in reading order.
    pub fn positioned_elements(&self) -> Vec<PositionedElement> {
        let mut elements = Vec::new();
        let mut offset = 0.0;
        for page in &self.pages {
            for e in &page.elements {
                elements.push(PositionedElement::from_page_space(
                    page.number,
                    page.height,
                    offset,
                    BoundingBox::new(e.x0, e.y0, e.x1, e.y1),
                    e.text.clone(),
                    e.class.clone(),
                ));
            }
            offset += page.height;
        }
        sort_document_order(&mut elements);
        elements
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn two_pages() -> Layout {
        serde_json::from_value(json!({
            "pages": [
                {"number": 1, "width": 612.0, "height": 792.0, "elements": [
                    {"x0": 30.0, "y0": 600.0, "x1": 200.0, "y1": 612.0, "text": "second"},
                    {"x0": 30.0, "y0": 700.0, "x1": 200.0, "y1": 712.0, "text": "first"}
                ]},
                {"number": 2, "width": 612.0, "height": 792.0, "elements": [
                    {"x0": 30.0, "y0": 760.0, "x1": 200.0, "y1": 772.0, "text": "third", "class": "TextLine"}
                ]}
            ]
        }))
        .unwrap()
    }

    #[test]
    fn elements_come_out_in_reading_order_across_pages() {
        let layout = two_pages();
        let elements = layout.positioned_elements();
        let texts: Vec<&str> = elements.iter().map(|e| e.text.as_str()).collect();
        assert_eq!(texts, ["first", "second", "third"]);
        assert_eq!(elements[2].doc_bbox.y0, 792.0 + 20.0);
        assert_eq!(elements[2].class, ElementClass::TextLine);
    }

    #[test]
    fn offsets_accumulate_page_heights() {
        let layout = two_pages();
        assert_eq!(layout.page_offset(1), Some(0.0));
        assert_eq!(layout.page_offset(2), Some(792.0));
        assert_eq!(layout.page_offset(3), None);
        assert_eq!(layout.document_name(), DEFAULT_DOCUMENT_NAME);
    }

    #[test]
    fn rejects_out_of_order_pages() {
        let mut layout = two_pages();
        layout.pages.swap(0, 1);
        assert!(matches!(layout.validate(), Err(SdsError::InvalidLayout(_))));
    }

    #[test]
    fn unknown_classes_are_tolerated() {
        let element: LayoutElement =
            serde_json::from_value(json!({"x0": 0, "y0": 0, "x1": 1, "y1": 1, "class": "LTCurve"}))
                .unwrap();
        assert_eq!(element.class, ElementClass::Other);
        assert!(element.text.is_empty());
    }
}
