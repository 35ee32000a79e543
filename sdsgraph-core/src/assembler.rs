//! Document assembly
//!
//! Walks the classified, post-injection hierarchy into the read-only
//! [`Document`] graph. Sections are the outermost nodes that look like section
//! headers; their direct children are partitioned into subsections; whatever
//! sits below a subsection becomes items.

use crate::ghs::{
    Document, Item, ItemData, Pictogram, Section, SectionTitle, Subsection, TableData,
};
use crate::hierarchy::{HierarchyTree, NodeId};
use crate::rules::SdsRules;
use crate::types::ElementClass;
use tracing::debug;

pub fn assemble<R>(
    tree: &HierarchyTree,
    rules: &R,
    name: &str,
    pictograms: &[Pictogram],
) -> Document
where
    R: SdsRules + ?Sized,
{
    let sections = tree
        .find_outermost(|text| rules.is_section(text))
        .into_iter()
        .map(|id| assemble_section(tree, rules, id))
        .collect();

    let mut pictograms = pictograms.to_vec();
    pictograms.sort();
    pictograms.dedup();

    Document {
        name: name.to_string(),
        pictograms,
        sections,
    }
}

fn assemble_section<R>(tree: &HierarchyTree, rules: &R, id: NodeId) -> Section
where
    R: SdsRules + ?Sized,
{
    let raw_title = tree.text(id).trim().to_string();
    let title = rules.discriminate_section(&raw_title).unwrap_or_else(|| {
        debug!("no discriminator for section header {raw_title:?}");
        SectionTitle::Unknown
    });

    let mut subsections = Vec::new();
    let mut loose: Vec<NodeId> = Vec::new();
    for &child in tree.children(id) {
        let text = tree.text(child);
        if rules.is_subsection(text) || tree.has_children(child) {
            flush_loose(tree, title, &mut loose, &mut subsections);
            let mut items = Vec::new();
            for &grandchild in tree.children(child) {
                push_items(tree, grandchild, &mut items);
            }
            subsections.push(Subsection {
                title: rules.discriminate_subsection(text, title),
                raw_title: text.trim().to_string(),
                items,
            });
        } else {
            loose.push(child);
        }
    }
    flush_loose(tree, title, &mut loose, &mut subsections);

    Section {
        title,
        raw_title,
        subsections,
    }
}

/// Consecutive leaf children of a section go into one untitled default subsection.
fn flush_loose(
    tree: &HierarchyTree,
    section: SectionTitle,
    loose: &mut Vec<NodeId>,
    subsections: &mut Vec<Subsection>,
) {
    if loose.is_empty() {
        return;
    }
    let mut items = Vec::new();
    for id in loose.drain(..) {
        push_items(tree, id, &mut items);
    }
    subsections.push(Subsection {
        title: section.default_subsection(),
        raw_title: String::new(),
        items,
    });
}

/// Turns one node into items. Tables and figures below a field are kept as
/// items of their own right after it.
fn push_items(tree: &HierarchyTree, id: NodeId, items: &mut Vec<Item>) {
    if let Some(item) = artifact_item(tree, id) {
        items.push(item);
        return;
    }

    let text = tree.text(id).trim().to_string();
    if !tree.has_children(id) {
        items.push(Item::text(text.clone(), text));
        return;
    }

    let mut values = Vec::new();
    let mut artifacts = Vec::new();
    for descendant in tree.descendants(id) {
        match artifact_item(tree, descendant) {
            Some(item) => artifacts.push(item),
            None => values.push(tree.text(descendant).trim().to_string()),
        }
    }
    items.push(Item::field(text, values));
    items.extend(artifacts);
}

fn artifact_item(tree: &HierarchyTree, id: NodeId) -> Option<Item> {
    let element = tree.element(id)?;
    match element.class {
        ElementClass::Table => Some(Item {
            name: "Table".to_string(),
            data: ItemData::Table(TableData {
                text: element.text.clone(),
                remarks: element.annotations.clone(),
            }),
        }),
        ElementClass::Figure => Some(Item {
            name: "Figure".to_string(),
            data: ItemData::Figure(element.text.trim().to_string()),
        }),
        _ => None,
    }
}
