//! The arena that owns every node in a document tree.
//!
//! Nodes reference children by [`NodeId`] (owned, downward) and their parent
//! by [`NodeId`] (weak, upward — the arena is the sole owner). No node is
//! ever linked as the child of two parents; splits and merges move ids
//! between parents rather than duplicating them.

use vellum_delta::{ObjectValue, Style};

/// An index into a [`Tree`](crate::Tree)'s arena. Stable for the node's
/// lifetime; freed ids are never reused while the tree is alive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) usize);

#[derive(Debug, Clone)]
pub(crate) enum NodeData {
    Root {
        children: Vec<NodeId>,
    },
    Block {
        children: Vec<NodeId>,
    },
    Line {
        children: Vec<NodeId>,
        style: Style,
    },
    Text {
        text: String,
        style: Style,
    },
    Embed {
        object: ObjectValue,
        /// `true` when the embed's registered placement is `line` — a line
        /// holding this embed must contain no other leaf.
        line_placed: bool,
        style: Style,
    },
}

#[derive(Debug, Clone)]
pub(crate) struct Node {
    pub parent: Option<NodeId>,
    pub data: NodeData,
}

/// What kind of node an id refers to — used by callers that need to branch
/// on node identity without matching the private [`NodeData`] directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    Root,
    Block,
    Line,
    Text,
    Embed,
}

impl NodeData {
    pub(crate) fn kind(&self) -> NodeKind {
        match self {
            NodeData::Root { .. } => NodeKind::Root,
            NodeData::Block { .. } => NodeKind::Block,
            NodeData::Line { .. } => NodeKind::Line,
            NodeData::Text { .. } => NodeKind::Text,
            NodeData::Embed { .. } => NodeKind::Embed,
        }
    }

    pub(crate) fn children(&self) -> &[NodeId] {
        match self {
            NodeData::Root { children }
            | NodeData::Block { children }
            | NodeData::Line { children, .. } => children,
            NodeData::Text { .. } | NodeData::Embed { .. } => &[],
        }
    }

    pub(crate) fn children_mut(&mut self) -> &mut Vec<NodeId> {
        match self {
            NodeData::Root { children }
            | NodeData::Block { children }
            | NodeData::Line { children, .. } => children,
            NodeData::Text { .. } | NodeData::Embed { .. } => {
                panic!("leaf nodes have no children")
            }
        }
    }

    pub(crate) fn is_container(&self) -> bool {
        matches!(self, NodeData::Root { .. } | NodeData::Block { .. } | NodeData::Line { .. })
    }

    /// Length this leaf contributes to its line's content (excludes the
    /// line's own terminating `'\n'`, which is not stored as a leaf at all).
    pub(crate) fn leaf_length(&self) -> usize {
        match self {
            NodeData::Text { text, .. } => text.chars().count(),
            NodeData::Embed { .. } => 1,
            _ => 0,
        }
    }

    pub(crate) fn style(&self) -> &Style {
        match self {
            NodeData::Line { style, .. } | NodeData::Text { style, .. } | NodeData::Embed { style, .. } => style,
            NodeData::Root { .. } | NodeData::Block { .. } => {
                panic!("containers other than Line carry no style")
            }
        }
    }

    pub(crate) fn set_style(&mut self, new_style: Style) {
        match self {
            NodeData::Line { style, .. } | NodeData::Text { style, .. } | NodeData::Embed { style, .. } => {
                *style = new_style;
            }
            NodeData::Root { .. } | NodeData::Block { .. } => {
                panic!("containers other than Line carry no style")
            }
        }
    }
}

/// Owning storage for every node in a tree. Ids are never reused once freed,
/// which keeps stale [`NodeId`]s detectable as a logic error rather than a
/// silent aliasing bug.
#[derive(Debug, Clone, Default)]
pub(crate) struct Arena {
    slots: Vec<Option<Node>>,
}

impl Arena {
    pub fn new() -> Self {
        Self { slots: Vec::new() }
    }

    pub fn alloc(&mut self, parent: Option<NodeId>, data: NodeData) -> NodeId {
        let id = NodeId(self.slots.len());
        self.slots.push(Some(Node { parent, data }));
        id
    }

    pub fn get(&self, id: NodeId) -> &Node {
        self.slots[id.0]
            .as_ref()
            .expect("dangling NodeId: node was freed")
    }

    pub fn get_mut(&mut self, id: NodeId) -> &mut Node {
        self.slots[id.0]
            .as_mut()
            .expect("dangling NodeId: node was freed")
    }

    pub fn free(&mut self, id: NodeId) {
        self.slots[id.0] = None;
    }

    pub fn parent_of(&self, id: NodeId) -> Option<NodeId> {
        self.get(id).parent
    }

    pub fn kind_of(&self, id: NodeId) -> NodeKind {
        self.get(id).data.kind()
    }

    pub fn children_of(&self, id: NodeId) -> &[NodeId] {
        self.get(id).data.children()
    }

    /// Inserts `child` into `parent`'s children at `index` and sets the
    /// child's parent pointer. Does not detach `child` from a prior parent —
    /// callers must do that first.
    pub fn attach(&mut self, parent: NodeId, index: usize, child: NodeId) {
        self.get_mut(child).parent = Some(parent);
        self.get_mut(parent).data.children_mut().insert(index, child);
    }

    pub fn detach(&mut self, parent: NodeId, child: NodeId) {
        let children = self.get_mut(parent).data.children_mut();
        if let Some(pos) = children.iter().position(|&c| c == child) {
            children.remove(pos);
        }
    }

    /// Replaces `parent`'s children wholesale and reparents each of
    /// `new_children`. Used by block (re)grouping, which throws away and
    /// rebuilds the Root/Block layer on every mutation.
    pub fn set_children(&mut self, parent: NodeId, new_children: Vec<NodeId>) {
        for &child in &new_children {
            self.get_mut(child).parent = Some(parent);
        }
        *self.get_mut(parent).data.children_mut() = new_children;
    }

    pub fn alloc_line(&mut self, style: Style) -> NodeId {
        self.alloc(
            None,
            NodeData::Line {
                children: Vec::new(),
                style,
            },
        )
    }

    pub fn alloc_text(&mut self, text: String, style: Style) -> NodeId {
        self.alloc(None, NodeData::Text { text, style })
    }

    pub fn alloc_embed(&mut self, object: ObjectValue, line_placed: bool, style: Style) -> NodeId {
        self.alloc(
            None,
            NodeData::Embed {
                object,
                line_placed,
                style,
            },
        )
    }
}
