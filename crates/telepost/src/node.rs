//! Arena-backed document tree.
//!
//! Every node lives in one `Vec` owned by [`Document`] and is addressed by a
//! [`NodeId`]. Parent and child links are plain indices, so the rewriting
//! passes can rename, unwrap, insert and replace nodes in place. Nodes that are
//! detached stay in the arena but are no longer reachable from the root.

use indexmap::IndexMap;

/// Index of a node inside its [`Document`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(usize);

/// What a node holds.
#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind {
    /// The fragment root. Exactly one per document, never serialized.
    Root,
    /// An element with a lowercase tag name and its attributes in source order.
    Element {
        name: String,
        attrs: IndexMap<String, String>,
    },
    /// Character data.
    Text(String),
    /// A line break marker, written out as `\n`.
    LineBreak,
}

#[derive(Debug, Clone)]
struct NodeData {
    kind: NodeKind,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

/// An ordered forest of nodes hanging off a single root.
#[derive(Debug, Clone)]
pub struct Document {
    nodes: Vec<NodeData>,
}

impl Document {
    /// Create an empty document holding only the root.
    pub fn new() -> Self {
        Self {
            nodes: vec![NodeData {
                kind: NodeKind::Root,
                parent: None,
                children: Vec::new(),
            }],
        }
    }

    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    pub fn kind(&self, id: NodeId) -> &NodeKind {
        &self.nodes[id.0].kind
    }

    /// Tag name for element nodes, `None` for everything else.
    pub fn tag_name(&self, id: NodeId) -> Option<&str> {
        match &self.nodes[id.0].kind {
            NodeKind::Element { name, .. } => Some(name.as_str()),
            _ => None,
        }
    }

    /// Check whether `id` is an element with the given tag name
    pub fn is_tag(&self, id: NodeId, tag: &str) -> bool {
        self.tag_name(id) == Some(tag)
    }

    pub fn is_line_break(&self, id: NodeId) -> bool {
        matches!(self.nodes[id.0].kind, NodeKind::LineBreak)
    }

    /// Get an attribute value by name
    pub fn attr(&self, id: NodeId, name: &str) -> Option<&str> {
        match &self.nodes[id.0].kind {
            NodeKind::Element { attrs, .. } => attrs.get(name).map(String::as_str),
            _ => None,
        }
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id.0].parent
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.nodes[id.0].children
    }

    /// Create a detached element node
    pub fn create_element(&mut self, name: &str) -> NodeId {
        self.create_element_with_attrs(name, std::iter::empty::<(String, String)>())
    }

    /// Create a detached element node with attributes
    pub fn create_element_with_attrs<I, K, V>(&mut self, name: &str, attrs: I) -> NodeId
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let attrs = attrs
            .into_iter()
            .map(|(k, v)| (k.into().to_lowercase(), v.into()))
            .collect();
        self.push(NodeKind::Element {
            name: name.to_lowercase(),
            attrs,
        })
    }

    /// Create a detached text node
    pub fn create_text(&mut self, text: &str) -> NodeId {
        self.push(NodeKind::Text(text.to_string()))
    }

    /// Create a detached line break marker
    pub fn create_line_break(&mut self) -> NodeId {
        self.push(NodeKind::LineBreak)
    }

    fn push(&mut self, kind: NodeKind) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(NodeData {
            kind,
            parent: None,
            children: Vec::new(),
        });
        id
    }

    /// Append `child` as the last child of `parent`, detaching it first.
    pub fn append(&mut self, parent: NodeId, child: NodeId) {
        debug_assert_ne!(parent, child);
        self.detach(child);
        self.nodes[child.0].parent = Some(parent);
        self.nodes[parent.0].children.push(child);
    }

    /// Insert `node` right before `reference` in its parent's children.
    ///
    /// Does nothing if `reference` has no parent.
    pub fn insert_before(&mut self, reference: NodeId, node: NodeId) {
        self.insert_at_offset(reference, node, 0);
    }

    /// Insert `node` right after `reference` in its parent's children.
    ///
    /// Does nothing if `reference` has no parent.
    pub fn insert_after(&mut self, reference: NodeId, node: NodeId) {
        self.insert_at_offset(reference, node, 1);
    }

    fn insert_at_offset(&mut self, reference: NodeId, node: NodeId, offset: usize) {
        if reference == node || self.parent(reference).is_none() {
            return;
        }
        self.detach(node);
        // Detaching `node` may shift `reference`, so look the position up afterwards.
        if let Some((parent, index)) = self.position(reference) {
            self.nodes[node.0].parent = Some(parent);
            self.nodes[parent.0].children.insert(index + offset, node);
        }
    }

    /// Remove `id` from its parent. The subtree stays intact but unreachable.
    pub fn detach(&mut self, id: NodeId) {
        if let Some((parent, index)) = self.position(id) {
            self.nodes[parent.0].children.remove(index);
            self.nodes[id.0].parent = None;
        }
    }

    /// Replace `id` by its own children, keeping them at its position.
    pub fn unwrap(&mut self, id: NodeId) {
        let Some((parent, index)) = self.position(id) else {
            return;
        };
        let children = std::mem::take(&mut self.nodes[id.0].children);
        for &child in &children {
            self.nodes[child.0].parent = Some(parent);
        }
        self.nodes[parent.0].children.splice(index..=index, children);
        self.nodes[id.0].parent = None;
    }

    /// Put `replacement` where `id` is and detach `id`.
    pub fn replace_with(&mut self, id: NodeId, replacement: NodeId) {
        if id == replacement || self.parent(id).is_none() {
            return;
        }
        self.insert_before(id, replacement);
        self.detach(id);
    }

    /// Change an element's tag name. Non-element nodes are left alone.
    pub fn rename(&mut self, id: NodeId, tag: &str) {
        if let NodeKind::Element { name, .. } = &mut self.nodes[id.0].kind {
            *name = tag.to_lowercase();
        }
    }

    /// Drop every attribute whose name does not satisfy `keep`.
    pub fn retain_attrs<F>(&mut self, id: NodeId, keep: F)
    where
        F: Fn(&str) -> bool,
    {
        if let NodeKind::Element { attrs, .. } = &mut self.nodes[id.0].kind {
            attrs.retain(|name, _| keep(name));
        }
    }

    pub fn previous_sibling(&self, id: NodeId) -> Option<NodeId> {
        let (parent, index) = self.position(id)?;
        index
            .checked_sub(1)
            .map(|i| self.nodes[parent.0].children[i])
    }

    pub fn next_sibling(&self, id: NodeId) -> Option<NodeId> {
        let (parent, index) = self.position(id)?;
        self.nodes[parent.0].children.get(index + 1).copied()
    }

    /// All nodes below `id` in document (pre-)order, `id` itself excluded.
    pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack: Vec<NodeId> = self.children(id).iter().rev().copied().collect();
        while let Some(next) = stack.pop() {
            out.push(next);
            stack.extend(self.children(next).iter().rev().copied());
        }
        out
    }

    /// Whether `id` is still reachable from the root.
    pub fn is_attached(&self, id: NodeId) -> bool {
        let mut current = id;
        loop {
            if current == self.root() {
                return true;
            }
            match self.parent(current) {
                Some(parent) => current = parent,
                None => return false,
            }
        }
    }

    /// Concatenated character data of `id` and its descendants.
    ///
    /// Line break markers contribute nothing.
    pub fn text_content(&self, id: NodeId) -> String {
        let mut out = String::new();
        if let NodeKind::Text(text) = &self.nodes[id.0].kind {
            out.push_str(text);
        }
        for node in self.descendants(id) {
            if let NodeKind::Text(text) = &self.nodes[node.0].kind {
                out.push_str(text);
            }
        }
        out
    }

    fn position(&self, id: NodeId) -> Option<(NodeId, usize)> {
        let parent = self.parent(id)?;
        let index = self.nodes[parent.0].children.iter().position(|&c| c == id)?;
        Some((parent, index))
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}
