//! Injection / merge engine
//!
//! Injectors look at the layout independently of the text stream and produce
//! replacement content. The engine then merges it into the hierarchy:
//!
//! ```text
//! Layout ──► [Injector]* ──► Injections
//!                               │
//! HierarchyTree ──► delete overlapped nodes ──► place payloads ──► HierarchyTree
//! ```
//!
//! Deletion is evaluated for every injection against every node before any
//! node is removed, so one injection's removals never change what another
//! injection overlaps.

pub mod engine;
pub mod pictogram;
pub mod table;

pub use engine::{inject, InjectionReport};
pub use pictogram::{PictogramDetection, PictogramInjector};
pub use table::{TableCell, TableGrid, TableInjector};

use crate::error::{Result, SdsError};
use crate::ghs::Pictogram;
use crate::layout::Layout;
use crate::types::{BoundingBox, CoordinateSpace, PositionedElement};
use serde::{Deserialize, Serialize};

/// How an injection treats existing content under its boxes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OverwriteMode {
    /// Insert the payload, delete nothing
    NoAction,
    /// Delete every node whose box touches an injection box
    Intersects,
    /// Reserved; rejected by the engine
    Contains,
}

impl OverwriteMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            OverwriteMode::NoAction => "NO_ACTION",
            OverwriteMode::Intersects => "INTERSECTS",
            OverwriteMode::Contains => "CONTAINS",
        }
    }
}

/// A rectangle tagged with the coordinate space it is expressed in.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct InjectionBox {
    pub bbox: BoundingBox,
    pub space: CoordinateSpace,
    /// Required for page space; optional page filter for document space
    pub page: Option<u32>,
}

impl InjectionBox {
    pub fn new(bbox: BoundingBox, space: CoordinateSpace, page: Option<u32>) -> Result<Self> {
        if space == CoordinateSpace::Page && page.is_none() {
            return Err(SdsError::InjectionCoordinate(
                "page-space box without a page number".to_string(),
            ));
        }
        if !(bbox.x0 <= bbox.x1 && bbox.y0 <= bbox.y1) {
            return Err(SdsError::InjectionCoordinate(format!(
                "inverted box ({}, {}, {}, {})",
                bbox.x0, bbox.y0, bbox.x1, bbox.y1
            )));
        }
        Ok(Self { bbox, space, page })
    }

    /// The element's own box in `space`, pinned to its page.
    pub fn of_element(element: &PositionedElement, space: CoordinateSpace) -> Self {
        Self {
            bbox: *element.bbox(space),
            space,
            page: Some(element.page),
        }
    }

    fn same_space(&self, other: &InjectionBox) -> Result<()> {
        if self.space != other.space {
            return Err(SdsError::InjectionCoordinate(format!(
                "cannot compare a {:?} box with a {:?} box",
                self.space, other.space
            )));
        }
        Ok(())
    }

    /// Inclusive overlap; touching edges count.
    pub fn intersects(&self, other: &InjectionBox) -> Result<bool> {
        self.same_space(other)?;
        Ok(self.bbox.intersects(&other.bbox))
    }

    /// True when `self` ends at or above the top edge of `other`.
    pub fn is_above(&self, other: &InjectionBox) -> Result<bool> {
        self.same_space(other)?;
        Ok(match self.space {
            CoordinateSpace::Document => self.bbox.y1 <= other.bbox.y0,
            CoordinateSpace::Page => self.bbox.y0 >= other.bbox.y1,
        })
    }

    /// Document boxes without a page apply to every page.
    pub fn applies_to_page(&self, page: u32) -> bool {
        self.page.map_or(true, |p| p == page)
    }
}

/// Replacement content for one region of the document.
#[derive(Debug, Clone, PartialEq)]
pub struct Injection {
    boxes: Vec<InjectionBox>,
    mode: OverwriteMode,
    payload: PositionedElement,
}

impl Injection {
    /// At least one box is required (the first one anchors placement) and all
    /// boxes must share a coordinate space.
    pub fn new(
        boxes: Vec<InjectionBox>,
        mode: OverwriteMode,
        payload: PositionedElement,
    ) -> Result<Self> {
        let Some(first) = boxes.first() else {
            return Err(SdsError::InjectionCoordinate(
                "injection without boxes".to_string(),
            ));
        };
        if let Some(other) = boxes.iter().find(|b| b.space != first.space) {
            return Err(SdsError::InjectionCoordinate(format!(
                "injection mixes {:?} and {:?} boxes",
                first.space, other.space
            )));
        }
        Ok(Self {
            boxes,
            mode,
            payload,
        })
    }

    /// Never empty.
    pub fn boxes(&self) -> &[InjectionBox] {
        &self.boxes
    }

    /// The first box; placement is decided relative to it.
    pub fn anchor(&self) -> Option<&InjectionBox> {
        self.boxes.first()
    }

    pub fn mode(&self) -> OverwriteMode {
        self.mode
    }

    pub fn payload(&self) -> &PositionedElement {
        &self.payload
    }
}

/// Everything the injectors of one parser produced for one document.
#[derive(Debug, Clone, Default)]
pub struct Injections {
    pub spatial: Vec<Injection>,
    /// Document-scope pictogram identifiers, unordered
    pub pictograms: Vec<Pictogram>,
}

impl Injections {
    pub fn extend(&mut self, other: Injections) {
        self.spatial.extend(other.spatial);
        self.pictograms.extend(other.pictograms);
    }

    pub fn is_empty(&self) -> bool {
        self.spatial.is_empty() && self.pictograms.is_empty()
    }
}

/// Produces injections for one document from its layout.
///
/// Injectors are built per parser instance and never shared between parsers.
pub trait Injector: Send + Sync {
    /// Injector name for logging
    fn name(&self) -> &str;

    fn generate_injections(&self, layout: &Layout) -> Result<Injections>;
}
