// Layout source abstraction
//
// This is the boundary between external layout extraction (PDF decoding,
// table detection, pictogram matching) and structure reconstruction. Everything
// after this point works with a `Layout` and never touches the source format.

use super::Layout;
use crate::error::Result;
use std::path::Path;

/// Produces the `Layout` of one document.
pub trait LayoutSource: Send + Sync {
    /// Decode raw bytes into a layout.
    fn parse_layout(&self, bytes: &[u8]) -> Result<Layout>;

    /// Convenience method: read the file and parse it.
    ///
    /// Layouts without a name take the file stem.
    fn process_file(&self, path: &Path) -> Result<Layout> {
        let bytes = std::fs::read(path)?;
        Ok(self.parse_layout(&bytes)?.with_name_from_path(path))
    }

    /// Source name for logging
    fn name(&self) -> &str;

    fn supports_file_type(&self, path: &Path) -> bool;
}
