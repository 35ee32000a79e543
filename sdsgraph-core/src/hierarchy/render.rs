// Indented outline rendering for diagnostics (`--outline` in the CLI).

use super::tree::{HierarchyTree, NodeId};
use std::fmt;

fn render_node(tree: &HierarchyTree, id: NodeId) -> String {
    let mut out = if tree.node(id).is_root() {
        "<ROOT>".to_string()
    } else {
        tree.text(id).trim().replace('\n', " ")
    };

    for &child in tree.children(id) {
        let rendered = render_node(tree, child);
        let mut lines = rendered.lines();
        if let Some(first) = lines.next() {
            out.push_str("\n|-");
            out.push_str(first);
        }
        for line in lines {
            out.push_str("\n| ");
            out.push_str(line);
        }
    }
    out
}

impl fmt::Display for HierarchyTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&render_node(self, self.root()))
    }
}

#[cfg(test)]
mod tests {
    use super::super::tree::ROOT;
    use super::*;
    use crate::types::{BoundingBox, ElementClass, PositionedElement};

    fn el(text: &str) -> PositionedElement {
        PositionedElement::from_page_space(
            1,
            792.0,
            0.0,
            BoundingBox::new(0.0, 500.0, 10.0, 510.0),
            text,
            ElementClass::TextBox,
        )
    }

    #[test]
    fn outline_marks_nesting() {
        let mut tree = HierarchyTree::new();
        let s = tree.add_child(ROOT, el("SECTION 1"));
        let sub = tree.add_child(s, el("1.1 Product identifiers"));
        tree.add_child(sub, el("Product name : Acetone"));
        tree.add_child(ROOT, el("SECTION 2"));

        let expected = "<ROOT>\n\
                        |-SECTION 1\n\
                        | |-1.1 Product identifiers\n\
                        | | |-Product name : Acetone\n\
                        |-SECTION 2";
        assert_eq!(tree.to_string(), expected);
    }
}
