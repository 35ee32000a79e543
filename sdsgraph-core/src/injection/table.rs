// Table grids from the table-detection collaborator, their cleaning, and the
// injector that turns each grid into a replacement payload.
//
// Grid geometry is measured from the top-left corner of the page. Empty cells
// are reported with zero geometry.

use super::{Injection, InjectionBox, Injections, Injector, OverwriteMode};
use crate::config::TableConfig;
use crate::error::Result;
use crate::layout::Layout;
use crate::types::{BoundingBox, CoordinateSpace, ElementClass, PositionedElement};
use serde::{Deserialize, Serialize};
use tracing::debug;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TableCell {
    #[serde(default)]
    pub top: f64,
    #[serde(default)]
    pub left: f64,
    #[serde(default)]
    pub width: f64,
    #[serde(default)]
    pub height: f64,
    #[serde(default)]
    pub text: String,
}

impl TableCell {
    /// Placeholder cells carry no geometry.
    pub fn is_placeholder(&self) -> bool {
        self.top == 0.0
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableGrid {
    pub top: f64,
    pub left: f64,
    pub bottom: f64,
    pub right: f64,
    /// rows of columns
    #[serde(default)]
    pub data: Vec<Vec<TableCell>>,
}

fn row_top(row: &[TableCell]) -> f64 {
    row.iter().map(|c| c.top).fold(0.0, f64::max)
}

fn row_height(row: &[TableCell]) -> f64 {
    row.iter().map(|c| c.height).fold(0.0, f64::max)
}

impl TableGrid {
    /// Folds rows whose top lies within `threshold` points of the previous
    /// row's top into the row above. Wrapped cell text ends up joined by a
    /// single space.
    pub fn merge_rows(&mut self, threshold: f64) {
        let Some(first) = self.data.first() else {
            return;
        };
        let mut last_top = row_top(first);
        let mut i = 1;
        while i < self.data.len() {
            let top = row_top(&self.data[i]);
            if top - last_top < threshold {
                let height = row_height(&self.data[i]);
                let row = self.data.remove(i);
                let above = &mut self.data[i - 1];
                for (j, cell) in row.into_iter().enumerate() {
                    if cell.text.trim().is_empty() {
                        continue;
                    }
                    match above.get_mut(j) {
                        Some(target) if !target.is_placeholder() => {
                            target.height += height;
                            target.text.push(' ');
                            target.text.push_str(&cell.text);
                        }
                        Some(target) => *target = cell,
                        None => above.push(cell),
                    }
                }
            } else {
                i += 1;
            }
            last_top = top;
        }
    }

    /// Removes everything from the first row that opens with "Remarks" and
    /// returns those rows as space-joined strings.
    pub fn extract_remarks(&mut self) -> Vec<String> {
        let start = self.data.iter().position(|row| {
            row.iter()
                .any(|cell| cell.text.trim_start().starts_with("Remarks"))
        });
        let Some(start) = start else {
            return Vec::new();
        };
        self.data
            .split_off(start)
            .into_iter()
            .map(|row| {
                row.iter()
                    .map(|c| c.text.trim())
                    .filter(|t| !t.is_empty())
                    .collect::<Vec<_>>()
                    .join(" ")
            })
            .filter(|line| !line.is_empty())
            .collect()
    }

    /// Fills blank cells with the last non-empty value above them in the same column.
    pub fn cascade_blank_cells(&mut self) {
        let mut last: Vec<Option<String>> = Vec::new();
        for row in &mut self.data {
            if last.len() < row.len() {
                last.resize(row.len(), None);
            }
            for (j, cell) in row.iter_mut().enumerate() {
                if cell.text.trim().is_empty() {
                    if let Some(value) = &last[j] {
                        cell.text = value.clone();
                    }
                } else {
                    last[j] = Some(cell.text.clone());
                }
            }
        }
    }

    /// Cells joined by " | ", one line per non-empty row.
    pub fn render(&self) -> String {
        self.data
            .iter()
            .filter_map(|row| {
                let cells: Vec<&str> = row.iter().map(|c| c.text.trim()).collect();
                if cells.iter().all(|c| c.is_empty()) {
                    None
                } else {
                    Some(cells.join(" | "))
                }
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Runs the configured cleaning steps in order and returns any remarks.
    pub fn clean(&mut self, config: &TableConfig) -> Vec<String> {
        self.merge_rows(config.merge_threshold);
        let remarks = if config.extract_remarks {
            self.extract_remarks()
        } else {
            Vec::new()
        };
        if config.cascade_blank_cells {
            self.cascade_blank_cells();
        }
        remarks
    }

    /// Table region in page space (bottom-up) for a page of `page_height`.
    pub fn page_bbox(&self, page_height: f64) -> BoundingBox {
        BoundingBox::new(
            self.left,
            page_height - self.bottom,
            self.right,
            page_height - self.top,
        )
    }

    /// Table region in document space for a page starting at `offset`.
    pub fn document_bbox(&self, offset: f64) -> BoundingBox {
        BoundingBox::new(self.left, offset + self.top, self.right, offset + self.bottom)
    }
}

/// Replaces the text fragments a detected table was extracted from with one
/// cleaned, rendered table element.
#[derive(Debug, Clone, Default)]
pub struct TableInjector {
    config: TableConfig,
}

impl TableInjector {
    pub fn new(config: TableConfig) -> Self {
        Self { config }
    }
}

impl Injector for TableInjector {
    fn name(&self) -> &str {
        "tables"
    }

    fn generate_injections(&self, layout: &Layout) -> Result<Injections> {
        let mut injections = Injections::default();
        if !self.config.enabled {
            return Ok(injections);
        }

        let mut offset = 0.0;
        for page in &layout.pages {
            for grid in &page.tables {
                let mut grid = grid.clone();
                let remarks = grid.clean(&self.config);
                let text = grid.render();
                debug!(
                    "page {}: table at top={} with {} rows, {} remarks",
                    page.number,
                    grid.top,
                    grid.data.len(),
                    remarks.len()
                );

                let doc_bbox = grid.document_bbox(offset);
                let payload = PositionedElement {
                    page: page.number,
                    page_bbox: grid.page_bbox(page.height),
                    doc_bbox,
                    text,
                    class: ElementClass::Table,
                    annotations: remarks,
                    deleted: false,
                };
                let region = InjectionBox::new(doc_bbox, CoordinateSpace::Document, Some(page.number))?;
                injections
                    .spatial
                    .push(Injection::new(vec![region], OverwriteMode::Intersects, payload)?);
            }
            offset += page.height;
        }
        Ok(injections)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cell(top: f64, text: &str) -> TableCell {
        TableCell {
            top,
            left: 50.0,
            width: 100.0,
            height: 10.0,
            text: text.to_string(),
        }
    }

    fn empty() -> TableCell {
        TableCell::default()
    }

    fn grid(rows: Vec<Vec<TableCell>>) -> TableGrid {
        TableGrid {
            top: 100.0,
            left: 40.0,
            bottom: 200.0,
            right: 500.0,
            data: rows,
        }
    }

    fn texts(grid: &TableGrid) -> Vec<Vec<&str>> {
        grid.data
            .iter()
            .map(|r| r.iter().map(|c| c.text.as_str()).collect())
            .collect()
    }

    #[test]
    fn close_rows_merge_into_the_row_above() {
        let mut g = grid(vec![
            vec![cell(100.0, "Component"), cell(100.0, "Conc.")],
            vec![cell(105.0, "name"), empty()],
            vec![cell(130.0, "Acetone"), cell(130.0, "<= 100 %")],
        ]);
        g.merge_rows(12.5);
        assert_eq!(texts(&g), [vec!["Component name", "Conc."], vec!["Acetone", "<= 100 %"]]);
        assert_eq!(g.data[0][0].height, 20.0);
    }

    #[test]
    fn merge_compares_against_the_previous_raw_row_top() {
        // 100 -> 110 -> 120: each step is within the threshold
        let mut g = grid(vec![
            vec![cell(100.0, "a")],
            vec![cell(110.0, "b")],
            vec![cell(120.0, "c")],
        ]);
        g.merge_rows(12.5);
        assert_eq!(texts(&g), [vec!["a b c"]]);
    }

    #[test]
    fn empty_cell_above_takes_the_lower_cell() {
        let mut g = grid(vec![
            vec![cell(100.0, "Oral"), empty()],
            vec![cell(104.0, "LD50"), cell(104.0, "5,800 mg/kg")],
        ]);
        g.merge_rows(12.5);
        assert_eq!(texts(&g), [vec!["Oral LD50", "5,800 mg/kg"]]);
    }

    #[test]
    fn cascade_fills_blank_cells_down_the_column() {
        let mut g = grid(vec![
            vec![cell(100.0, "Acetone"), cell(100.0, "TWA")],
            vec![empty(), cell(120.0, "STEL")],
            vec![cell(140.0, "Ethanol"), empty()],
        ]);
        g.cascade_blank_cells();
        assert_eq!(
            texts(&g),
            [vec!["Acetone", "TWA"], vec!["Acetone", "STEL"], vec!["Ethanol", "STEL"]]
        );
    }

    #[test]
    fn remarks_rows_are_split_off() {
        let mut g = grid(vec![
            vec![cell(100.0, "Acetone"), cell(100.0, "TWA 500 ppm")],
            vec![cell(120.0, "Remarks"), cell(120.0, "Eye irritation")],
            vec![empty(), cell(140.0, "Central Nervous System impairment")],
        ]);
        let remarks = g.extract_remarks();
        assert_eq!(
            remarks,
            ["Remarks Eye irritation", "Central Nervous System impairment"]
        );
        assert_eq!(g.render(), "Acetone | TWA 500 ppm");
    }

    #[test]
    fn geometry_converts_from_top_left_page_coordinates() {
        let g = grid(vec![]);
        assert_eq!(g.page_bbox(792.0), BoundingBox::new(40.0, 592.0, 500.0, 692.0));
        assert_eq!(g.document_bbox(792.0), BoundingBox::new(40.0, 892.0, 500.0, 992.0));
    }

    #[test]
    fn disabled_injector_emits_nothing() {
        let layout: Layout = serde_json::from_value(serde_json::json!({
            "pages": [{"number": 1, "height": 792.0, "tables": [
                {"top": 100.0, "left": 40.0, "bottom": 200.0, "right": 500.0, "data": []}
            ]}]
        }))
        .unwrap();
        let config = TableConfig {
            enabled: false,
            ..TableConfig::default()
        };
        let injections = TableInjector::new(config).generate_injections(&layout).unwrap();
        assert!(injections.spatial.is_empty());

        let injections = TableInjector::default().generate_injections(&layout).unwrap();
        assert_eq!(injections.spatial.len(), 1);
        let injection = &injections.spatial[0];
        assert_eq!(injection.mode(), OverwriteMode::Intersects);
        assert_eq!(injection.payload().class, ElementClass::Table);
        assert_eq!(injection.boxes()[0].space, CoordinateSpace::Document);
    }
}
