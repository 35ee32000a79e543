use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

// ===== COORDINATES =====
// Page space is native PDF space: origin bottom-left, y grows upward, y0 is the bottom edge.
// Document space is continuous across pages: origin top-left of page 1, y grows downward,
// y0 is the top edge.

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CoordinateSpace {
    Page,
    Document,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub x0: f64,
    pub y0: f64,
    pub x1: f64,
    pub y1: f64,
}

impl BoundingBox {
    pub fn new(x0: f64, y0: f64, x1: f64, y1: f64) -> Self {
        Self { x0, y0, x1, y1 }
    }

    /// Inclusive overlap test, touching edges count as overlap.
    pub fn intersects(&self, other: &BoundingBox) -> bool {
        self.x0.max(other.x0) <= self.x1.min(other.x1)
            && self.y0.max(other.y0) <= self.y1.min(other.y1)
    }

    pub fn width(&self) -> f64 {
        self.x1 - self.x0
    }

    pub fn height(&self) -> f64 {
        self.y1 - self.y0
    }

    /// Converts a page-space box into document space for a page of `page_height`
    /// placed `offset` points below the top of the first page.
    pub fn page_to_document(&self, page_height: f64, offset: f64) -> BoundingBox {
        BoundingBox {
            x0: self.x0,
            y0: offset + (page_height - self.y1),
            x1: self.x1,
            y1: offset + (page_height - self.y0),
        }
    }
}

/// Supplier families with a dedicated rule set and field registry.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Supplier {
    #[default]
    SigmaAldrich,
}

impl std::fmt::Display for Supplier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Supplier::SigmaAldrich => write!(f, "sigma_aldrich"),
        }
    }
}

/// Layout class tag attached by the layout collaborator (or by an injector).
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ElementClass {
    #[default]
    TextBox,
    TextLine,
    Table,
    Figure,
    #[serde(other)]
    Other,
}

/// One rendered fragment of the source document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PositionedElement {
    pub page: u32,               // 1-indexed
    pub page_bbox: BoundingBox,  // bottom-up page space
    pub doc_bbox: BoundingBox,   // top-down, page offsets accumulated
    pub text: String,
    #[serde(default)]
    pub class: ElementClass,
    /// Free-text side notes, e.g. remarks pulled out of a table.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub annotations: Vec<String>,
    #[serde(default)]
    pub deleted: bool,
}

impl PositionedElement {
    /// Builds an element from page-space geometry, deriving the document-space box.
    pub fn from_page_space(
        page: u32,
        page_height: f64,
        page_offset: f64,
        page_bbox: BoundingBox,
        text: impl Into<String>,
        class: ElementClass,
    ) -> Self {
        Self {
            page,
            page_bbox,
            doc_bbox: page_bbox.page_to_document(page_height, page_offset),
            text: text.into(),
            class,
            annotations: Vec::new(),
            deleted: false,
        }
    }

    pub fn bbox(&self, space: CoordinateSpace) -> &BoundingBox {
        match space {
            CoordinateSpace::Page => &self.page_bbox,
            CoordinateSpace::Document => &self.doc_bbox,
        }
    }

    /// Reading order: top-to-bottom across the whole document, then left-to-right.
    pub fn document_order(&self, other: &Self) -> Ordering {
        self.doc_bbox
            .y0
            .total_cmp(&other.doc_bbox.y0)
            .then(self.doc_bbox.x0.total_cmp(&other.doc_bbox.x0))
    }
}

/// Stable sort into reading order; exact ties keep extraction order.
pub fn sort_document_order(elements: &mut [PositionedElement]) {
    elements.sort_by(|a, b| a.document_order(b));
}
