use crate::types::PositionedElement;
use std::collections::HashSet;

pub type NodeId = usize;

/// Index of the synthetic root in every tree.
pub const ROOT: NodeId = 0;

#[derive(Debug, Clone)]
pub struct HierarchyNode {
    /// None only for the synthetic root
    pub element: Option<PositionedElement>,
    pub parent: Option<NodeId>,
    pub children: Vec<NodeId>,
}

impl HierarchyNode {
    pub fn is_root(&self) -> bool {
        self.element.is_none()
    }

    pub fn text(&self) -> &str {
        self.element.as_ref().map(|e| e.text.as_str()).unwrap_or("")
    }
}

/// Arena-backed ordered tree. Nodes refer to each other by index; the root is
/// always index 0 and is never anybody's child.
#[derive(Debug, Clone)]
pub struct HierarchyTree {
    nodes: Vec<HierarchyNode>,
}

impl Default for HierarchyTree {
    fn default() -> Self {
        Self::new()
    }
}

impl HierarchyTree {
    pub fn new() -> Self {
        Self {
            nodes: vec![HierarchyNode {
                element: None,
                parent: None,
                children: Vec::new(),
            }],
        }
    }

    pub fn root(&self) -> NodeId {
        ROOT
    }

    /// Number of element-bearing nodes (the root is not counted).
    pub fn len(&self) -> usize {
        self.nodes.len() - 1
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn node(&self, id: NodeId) -> &HierarchyNode {
        &self.nodes[id]
    }

    pub fn element(&self, id: NodeId) -> Option<&PositionedElement> {
        self.nodes[id].element.as_ref()
    }

    pub fn text(&self, id: NodeId) -> &str {
        self.nodes[id].text()
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.nodes[id].children
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id].parent
    }

    pub fn has_children(&self, id: NodeId) -> bool {
        !self.nodes[id].children.is_empty()
    }

    /// Appends a new node holding `element` as the last child of `parent`.
    pub fn add_child(&mut self, parent: NodeId, element: PositionedElement) -> NodeId {
        let id = self.nodes.len();
        self.nodes.push(HierarchyNode {
            element: Some(element),
            parent: Some(parent),
            children: Vec::new(),
        });
        self.nodes[parent].children.push(id);
        id
    }

    /// Re-parents an existing node as the last child of `new_parent`.
    pub fn move_node(&mut self, id: NodeId, new_parent: NodeId) {
        if id == ROOT {
            return;
        }
        self.detach(id);
        self.nodes[id].parent = Some(new_parent);
        self.nodes[new_parent].children.push(id);
    }

    /// Unlinks a node (and its subtree) from its parent. The arena slot stays
    /// allocated until the next compaction.
    pub fn detach(&mut self, id: NodeId) {
        if let Some(parent) = self.nodes[id].parent.take() {
            self.nodes[parent].children.retain(|&c| c != id);
        }
    }

    /// Descendants of `id` in pre-order, `id` itself excluded.
    pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack: Vec<NodeId> = self.nodes[id].children.iter().rev().copied().collect();
        while let Some(next) = stack.pop() {
            out.push(next);
            stack.extend(self.nodes[next].children.iter().rev());
        }
        out
    }

    /// Pre-order walk that collects nodes satisfying `pred` without descending
    /// into them.
    pub fn find_outermost<F>(&self, pred: F) -> Vec<NodeId>
    where
        F: Fn(&str) -> bool,
    {
        let mut out = Vec::new();
        let mut stack: Vec<NodeId> = self.nodes[ROOT].children.iter().rev().copied().collect();
        while let Some(next) = stack.pop() {
            if pred(self.text(next)) {
                out.push(next);
            } else {
                stack.extend(self.nodes[next].children.iter().rev());
            }
        }
        out
    }

    /// Length of the longest root-to-leaf path, counted in edges.
    pub fn depth(&self) -> usize {
        fn walk(tree: &HierarchyTree, id: NodeId) -> usize {
            tree.children(id)
                .iter()
                .map(|&c| 1 + walk(tree, c))
                .max()
                .unwrap_or(0)
        }
        walk(self, ROOT)
    }

    /// Removes the given nodes in one pass. Surviving children of a removed node
    /// take its place in the parent's child list. The root is never removed.
    /// Returns the removed elements, in pre-order, with their deletion flag set.
    pub fn remove_nodes(&mut self, ids: &HashSet<NodeId>) -> Vec<PositionedElement> {
        let marked: HashSet<NodeId> = ids.iter().copied().filter(|&id| id != ROOT).collect();
        if marked.is_empty() {
            return Vec::new();
        }

        let order = self.reachable();
        let mut removed = Vec::new();
        for &id in order.iter().filter(|&&id| marked.contains(&id)) {
            if let Some(element) = self.nodes[id].element.as_mut() {
                element.deleted = true;
                removed.push(element.clone());
            }
        }

        for id in order {
            if marked.contains(&id) {
                continue;
            }
            let spliced = self.splice_children(id, &marked);
            for &child in &spliced {
                self.nodes[child].parent = Some(id);
            }
            self.nodes[id].children = spliced;
        }

        self.compact();
        removed
    }

    fn splice_children(&self, id: NodeId, marked: &HashSet<NodeId>) -> Vec<NodeId> {
        let mut out = Vec::new();
        for &child in &self.nodes[id].children {
            if marked.contains(&child) {
                out.extend(self.splice_children(child, marked));
            } else {
                out.push(child);
            }
        }
        out
    }

    fn reachable(&self) -> Vec<NodeId> {
        let mut ids = vec![ROOT];
        ids.extend(self.descendants(ROOT));
        ids
    }

    /// Drops every node not reachable from the root and renumbers the rest in
    /// pre-order.
    pub(crate) fn compact(&mut self) {
        let order = self.reachable();
        if order.len() == self.nodes.len() && order.iter().enumerate().all(|(i, &id)| i == id) {
            return;
        }

        let mut remap = vec![usize::MAX; self.nodes.len()];
        for (new_id, &old_id) in order.iter().enumerate() {
            remap[old_id] = new_id;
        }

        let mut old_nodes: Vec<Option<HierarchyNode>> =
            std::mem::take(&mut self.nodes).into_iter().map(Some).collect();
        self.nodes = order
            .iter()
            .filter_map(|&old_id| old_nodes[old_id].take())
            .map(|mut node| {
                node.parent = node.parent.map(|p| remap[p]);
                node.children = node.children.iter().map(|&c| remap[c]).collect();
                node
            })
            .collect();
    }
}
