use super::{Injection, InjectionBox, OverwriteMode};
use crate::error::{Result, SdsError};
use crate::hierarchy::{HierarchyTree, NodeId, ROOT};
use crate::rules::SdsRules;
use crate::types::PositionedElement;
use std::collections::HashSet;
use tracing::{debug, info, warn};

/// What an injection pass did to the tree.
#[derive(Debug, Clone, Default)]
pub struct InjectionReport {
    /// Elements removed in phase 1, deletion flag set
    pub deleted: Vec<PositionedElement>,
    pub placed: usize,
    /// Payloads with no preceding content, sent to the last section (or root)
    pub fallbacks: usize,
}

/// Merges `injections` into `tree`: delete everything the injection boxes
/// overlap, then attach each payload under the last node above its first box.
pub fn inject<R>(
    tree: &mut HierarchyTree,
    injections: &[Injection],
    rules: &R,
) -> Result<InjectionReport>
where
    R: SdsRules + ?Sized,
{
    let mut report = InjectionReport::default();
    if injections.is_empty() {
        return Ok(report);
    }

    if let Some(bad) = injections.iter().find(|i| i.mode() == OverwriteMode::Contains) {
        return Err(SdsError::UnsupportedOverwriteMode(bad.mode().as_str().to_string()));
    }

    // Phase 1: mark against the untouched tree, then remove in one pass
    let marked = mark_overlaps(tree, injections)?;
    if !marked.is_empty() {
        report.deleted = tree.remove_nodes(&marked);
        debug!("injection removed {} nodes", report.deleted.len());
    }

    // Phase 2
    let sections = tree.find_outermost(|text| rules.is_section(text));
    let mut inserted: HashSet<NodeId> = HashSet::new();
    for injection in injections {
        let anchor = match injection.anchor() {
            Some(anchor) => find_anchor(tree, &sections, anchor, &inserted)?,
            None => None,
        };
        let target = match anchor {
            Some(id) => id,
            None => {
                let fallback = sections.last().copied().unwrap_or(ROOT);
                warn!(
                    "no content precedes injection on page {:?}, appending to {:?}",
                    injection.anchor().and_then(|a| a.page),
                    tree.text(fallback)
                );
                report.fallbacks += 1;
                fallback
            }
        };
        let id = tree.add_child(target, injection.payload().clone());
        inserted.insert(id);
        report.placed += 1;
    }

    info!(
        "🧩 injected {} payloads ({} deleted nodes, {} fallbacks)",
        report.placed,
        report.deleted.len(),
        report.fallbacks
    );
    Ok(report)
}

fn mark_overlaps(tree: &HierarchyTree, injections: &[Injection]) -> Result<HashSet<NodeId>> {
    let mut marked = HashSet::new();
    for id in tree.descendants(ROOT) {
        let Some(element) = tree.element(id) else {
            continue;
        };
        'injections: for injection in injections {
            if injection.mode() != OverwriteMode::Intersects {
                continue;
            }
            for region in injection.boxes() {
                if !region.applies_to_page(element.page) {
                    continue;
                }
                let node_box = InjectionBox::of_element(element, region.space);
                if region.intersects(&node_box)? {
                    marked.insert(id);
                    break 'injections;
                }
            }
        }
    }
    Ok(marked)
}

/// Sections are scanned last to first, each section's subtree in reverse
/// pre-order; the first node on the anchor's page ending above the anchor wins.
/// When nothing on that page precedes it, the last node of an earlier page
/// does.
fn find_anchor(
    tree: &HierarchyTree,
    sections: &[NodeId],
    anchor: &InjectionBox,
    inserted: &HashSet<NodeId>,
) -> Result<Option<NodeId>> {
    let same_page = last_matching(tree, sections, inserted, |element| {
        if !anchor.applies_to_page(element.page) {
            return Ok(false);
        }
        InjectionBox::of_element(element, anchor.space).is_above(anchor)
    })?;
    if same_page.is_some() {
        return Ok(same_page);
    }

    let Some(page) = anchor.page else {
        return Ok(None);
    };
    let earlier = last_matching(tree, sections, inserted, |element| Ok(element.page < page))?;
    if let Some(id) = earlier {
        debug!("injection on page {page} anchored to {:?} on an earlier page", tree.text(id));
    }
    Ok(earlier)
}

fn last_matching<F>(
    tree: &HierarchyTree,
    sections: &[NodeId],
    inserted: &HashSet<NodeId>,
    mut accept: F,
) -> Result<Option<NodeId>>
where
    F: FnMut(&PositionedElement) -> Result<bool>,
{
    for &section in sections.iter().rev() {
        let mut candidates = vec![section];
        candidates.extend(tree.descendants(section));
        for &id in candidates.iter().rev() {
            if inserted.contains(&id) {
                continue;
            }
            let Some(element) = tree.element(id) else {
                continue;
            };
            if accept(element)? {
                return Ok(Some(id));
            }
        }
    }
    Ok(None)
}
