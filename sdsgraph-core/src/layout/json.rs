use super::{Layout, LayoutSource};
use crate::error::Result;
use std::path::Path;
use tracing::debug;

/// Reads layout dumps written by the extraction stage as JSON.
#[derive(Debug, Clone, Default)]
pub struct JsonLayoutSource;

impl JsonLayoutSource {
    pub fn new() -> Self {
        Self
    }
}

impl LayoutSource for JsonLayoutSource {
    fn parse_layout(&self, bytes: &[u8]) -> Result<Layout> {
        let layout: Layout = serde_json::from_slice(bytes)?;
        layout.validate()?;
        debug!(
            "parsed layout: {} pages, {} tables, {} pictogram detections",
            layout.pages.len(),
            layout.pages.iter().map(|p| p.tables.len()).sum::<usize>(),
            layout.pictograms.len()
        );
        Ok(layout)
    }

    fn name(&self) -> &str {
        "json"
    }

    fn supports_file_type(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("json"))
    }
}
