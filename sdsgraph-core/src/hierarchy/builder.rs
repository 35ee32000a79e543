use super::tree::{HierarchyTree, NodeId, ROOT};
use crate::config::HierarchyConfig;
use crate::error::{Result, SdsError};
use crate::types::PositionedElement;
use tracing::debug;

/// Turns a reading-ordered element stream into a tree whose depth follows the
/// left margin. Knows nothing about SDS semantics.
#[derive(Debug, Clone)]
pub struct HierarchyBuilder {
    footer_threshold: f64,
    indent_tolerance: f64,
}

impl Default for HierarchyBuilder {
    fn default() -> Self {
        Self::from_config(&HierarchyConfig::default())
    }
}

impl HierarchyBuilder {
    pub fn new(footer_threshold: f64, indent_tolerance: f64) -> Self {
        Self {
            footer_threshold,
            indent_tolerance,
        }
    }

    pub fn from_config(config: &HierarchyConfig) -> Self {
        Self::new(config.footer_threshold, config.indent_tolerance)
    }

    /// Empty fragments and anything in the footer band never reach the tree.
    pub fn include(&self, element: &PositionedElement) -> bool {
        !element.text.trim().is_empty() && element.page_bbox.y0 >= self.footer_threshold
    }

    /// Builds the indentation tree. Elements must already be in reading order.
    pub fn build(&self, elements: Vec<PositionedElement>) -> Result<HierarchyTree> {
        let mut tree = HierarchyTree::new();
        // (node, x-level); the root has no level
        let mut stack: Vec<(NodeId, Option<f64>)> = vec![(ROOT, None)];
        let mut skipped = 0usize;

        for element in elements {
            if !self.include(&element) {
                skipped += 1;
                continue;
            }
            let x0 = element.doc_bbox.x0;

            // A shallower element pops one level per pass until it finds its peer level.
            loop {
                let (top, level) = stack[stack.len() - 1];
                match level {
                    None => {
                        let id = tree.add_child(top, element);
                        stack.push((id, Some(x0)));
                        break;
                    }
                    Some(level) if (x0 - level).abs() <= self.indent_tolerance => {
                        stack.pop();
                        let parent = stack[stack.len() - 1].0;
                        let id = tree.add_child(parent, element);
                        stack.push((id, Some(level)));
                        break;
                    }
                    Some(level) if x0 > level => {
                        let id = tree.add_child(top, element);
                        stack.push((id, Some(x0)));
                        break;
                    }
                    Some(_) => {
                        if stack.len() <= 2 {
                            return Err(SdsError::StructuralParse {
                                page: element.page,
                                x0,
                                text: element.text,
                            });
                        }
                        stack.pop();
                    }
                }
            }
        }

        debug!(
            "built hierarchy: {} nodes, depth {}, {} elements filtered",
            tree.len(),
            tree.depth(),
            skipped
        );
        Ok(tree)
    }
}

impl HierarchyTree {
    /// Regroups the root's children under section headers. Layouts that print
    /// section headers at the same indentation as their content produce a flat
    /// root; each non-section child moves under the most recent header, and
    /// children before the first header are dropped.
    pub fn group_under_sections<F>(&mut self, is_section: F)
    where
        F: Fn(&str) -> bool,
    {
        let children = self.children(ROOT).to_vec();
        let mut current: Option<NodeId> = None;
        let mut dropped = 0usize;

        for child in children {
            if is_section(self.text(child)) {
                current = Some(child);
                continue;
            }
            match current {
                Some(section) => self.move_node(child, section),
                None => {
                    debug!("dropping preamble node before first section: {:?}", self.text(child));
                    self.detach(child);
                    dropped += 1;
                }
            }
        }

        if dropped > 0 {
            self.compact();
        }
    }
}
