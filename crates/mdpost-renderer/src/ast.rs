//! Arena-backed markdown syntax tree.
//!
//! Nodes live in a single `Vec` owned by [`Document`] and are addressed by
//! [`NodeId`]. Every node except the root has exactly one parent, and children
//! are stored in document order. The tree shape is fixed once parsing is done;
//! transform passes only update fields of the node they are visiting, which
//! keeps a single depth-first walk valid while nodes are rewritten.

use pulldown_cmark::Alignment;

/// Stable index of a node inside its [`Document`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct NodeId(usize);

/// Decision returned by a walk callback.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WalkStatus {
    /// Descend into children (on enter) and keep walking.
    Continue,
    /// Do not visit the children of the current node. The exit phase still runs.
    SkipChildren,
    /// Stop the whole walk.
    Stop,
}

/// Node kind without payload, used to key render overrides.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum NodeKind {
    Document,
    Paragraph,
    Heading,
    BlockQuote,
    CodeBlock,
    HtmlBlock,
    List,
    Item,
    ThematicBreak,
    Table,
    TableHead,
    TableRow,
    TableCell,
    Text,
    Code,
    InlineHtml,
    SoftBreak,
    HardBreak,
    Emphasis,
    Strong,
    Strikethrough,
    Link,
    Image,
    TaskListMarker,
    Fragment,
}

/// Named attribute carried by an image node.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Attribute {
    pub name: String,
    pub value: String,
}

/// Image payload.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ImageNode {
    /// Image URL or relative path.
    pub destination: String,
    /// Title (empty when the source had none).
    pub title: String,
    /// Extra attributes in insertion order.
    pub attributes: Vec<Attribute>,
}

impl ImageNode {
    /// Set an attribute, replacing the value of an existing one with the same name.
    pub fn set_attribute(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        if let Some(existing) = self.attributes.iter_mut().find(|a| a.name == name) {
            existing.value = value;
        } else {
            self.attributes.push(Attribute { name, value });
        }
    }

    /// Look up an attribute value by name.
    #[must_use]
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|a| a.name == name)
            .map(|a| a.value.as_str())
    }
}

/// Link payload.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LinkNode {
    pub destination: String,
    pub title: String,
}

/// Code block payload. Fenced blocks keep their info string.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CodeBlockNode {
    pub info: Option<String>,
    pub literal: String,
}

impl CodeBlockNode {
    /// Language identifier: the first word of the info string.
    #[must_use]
    pub fn language(&self) -> Option<&str> {
        self.info
            .as_deref()
            .and_then(|info| info.split_whitespace().next())
    }
}

/// Node payload.
#[derive(Clone, Debug, PartialEq)]
pub enum NodeValue {
    Document,
    Paragraph,
    Heading { level: u8 },
    BlockQuote,
    CodeBlock(CodeBlockNode),
    HtmlBlock { literal: String },
    List { start: Option<u64> },
    Item,
    ThematicBreak,
    Table { alignments: Vec<Alignment> },
    TableHead,
    TableRow,
    TableCell,
    Text(String),
    Code(String),
    InlineHtml(String),
    SoftBreak,
    HardBreak,
    Emphasis,
    Strong,
    Strikethrough,
    Link(LinkNode),
    Image(ImageNode),
    TaskListMarker { checked: bool },
    /// Container for constructs the configured parser options never produce.
    /// Renders only its children.
    Fragment,
}

impl NodeValue {
    /// Payload-free kind of this value.
    #[must_use]
    pub fn kind(&self) -> NodeKind {
        match self {
            Self::Document => NodeKind::Document,
            Self::Paragraph => NodeKind::Paragraph,
            Self::Heading { .. } => NodeKind::Heading,
            Self::BlockQuote => NodeKind::BlockQuote,
            Self::CodeBlock(_) => NodeKind::CodeBlock,
            Self::HtmlBlock { .. } => NodeKind::HtmlBlock,
            Self::List { .. } => NodeKind::List,
            Self::Item => NodeKind::Item,
            Self::ThematicBreak => NodeKind::ThematicBreak,
            Self::Table { .. } => NodeKind::Table,
            Self::TableHead => NodeKind::TableHead,
            Self::TableRow => NodeKind::TableRow,
            Self::TableCell => NodeKind::TableCell,
            Self::Text(_) => NodeKind::Text,
            Self::Code(_) => NodeKind::Code,
            Self::InlineHtml(_) => NodeKind::InlineHtml,
            Self::SoftBreak => NodeKind::SoftBreak,
            Self::HardBreak => NodeKind::HardBreak,
            Self::Emphasis => NodeKind::Emphasis,
            Self::Strong => NodeKind::Strong,
            Self::Strikethrough => NodeKind::Strikethrough,
            Self::Link(_) => NodeKind::Link,
            Self::Image(_) => NodeKind::Image,
            Self::TaskListMarker { .. } => NodeKind::TaskListMarker,
            Self::Fragment => NodeKind::Fragment,
        }
    }
}

/// A node in the arena.
#[derive(Clone, Debug)]
pub struct Node {
    pub value: NodeValue,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

impl Node {
    /// Payload-free kind of this node.
    #[must_use]
    pub fn kind(&self) -> NodeKind {
        self.value.kind()
    }

    /// Parent node (`None` for the root).
    #[must_use]
    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    /// Children in document order.
    #[must_use]
    pub fn children(&self) -> &[NodeId] {
        &self.children
    }
}

/// Parsed markdown document.
#[derive(Clone, Debug)]
pub struct Document {
    nodes: Vec<Node>,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    /// Create a document containing only the root node.
    #[must_use]
    pub fn new() -> Self {
        Self {
            nodes: vec![Node {
                value: NodeValue::Document,
                parent: None,
                children: Vec::new(),
            }],
        }
    }

    /// Root node id.
    #[must_use]
    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    /// Number of nodes, root included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// All node ids in creation order (parents before their children).
    ///
    /// The iterator does not borrow the document, so payloads can be updated
    /// while iterating.
    pub fn ids(&self) -> impl Iterator<Item = NodeId> + use<> {
        (0..self.nodes.len()).map(NodeId)
    }

    /// Whether the document has no content besides the root.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.len() == 1
    }

    /// Append a new child to `parent` and return its id.
    ///
    /// Only the parser builds trees; passes receive a `&mut Document` but the
    /// shape is considered frozen from then on.
    pub(crate) fn append(&mut self, parent: NodeId, value: NodeValue) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node {
            value,
            parent: Some(parent),
            children: Vec::new(),
        });
        self.nodes[parent.0].children.push(id);
        id
    }

    /// Borrow a node.
    #[must_use]
    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.0]
    }

    /// Borrow a node's payload.
    #[must_use]
    pub fn value(&self, id: NodeId) -> &NodeValue {
        &self.nodes[id.0].value
    }

    /// Mutably borrow a node's payload.
    pub fn value_mut(&mut self, id: NodeId) -> &mut NodeValue {
        &mut self.nodes[id.0].value
    }

    /// Children of a node in document order.
    #[must_use]
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.nodes[id.0].children
    }

    /// Position of a node among its parent's children.
    #[must_use]
    pub fn index_in_parent(&self, id: NodeId) -> Option<usize> {
        let parent = self.nodes[id.0].parent?;
        self.children(parent).iter().position(|&c| c == id)
    }

    /// Concatenated text of all descendant text and inline code nodes.
    ///
    /// This is the alt text of an image node.
    #[must_use]
    pub fn text_content(&self, id: NodeId) -> String {
        let mut text = String::new();
        self.collect_text(id, &mut text);
        text
    }

    fn collect_text(&self, id: NodeId, out: &mut String) {
        let mut pending: Vec<NodeId> = self.children(id).iter().rev().copied().collect();
        while let Some(node) = pending.pop() {
            match self.value(node) {
                NodeValue::Text(t) | NodeValue::Code(t) => out.push_str(t),
                _ => pending.extend(self.children(node).iter().rev()),
            }
        }
    }

    /// Iterate over all image payloads in document order.
    pub fn images(&self) -> impl Iterator<Item = &ImageNode> {
        self.nodes.iter().filter_map(|n| match &n.value {
            NodeValue::Image(img) => Some(img),
            _ => None,
        })
    }

    /// Depth-first walk with enter and exit phases.
    ///
    /// The callback is invoked with `entering = true` before the children and
    /// `entering = false` after them. Returning [`WalkStatus::SkipChildren`] on
    /// enter skips the children but still runs the exit phase.
    ///
    /// The walk keeps its own stack, so nesting depth is bounded by memory
    /// rather than the thread's stack size.
    pub fn walk<E, F>(&self, id: NodeId, f: &mut F) -> Result<WalkStatus, E>
    where
        F: FnMut(&Self, NodeId, bool) -> Result<WalkStatus, E>,
    {
        // (node, index of the next child to visit)
        let mut stack: Vec<(NodeId, usize)> = Vec::new();
        match f(self, id, true)? {
            WalkStatus::Stop => return Ok(WalkStatus::Stop),
            WalkStatus::SkipChildren => return f(self, id, false),
            WalkStatus::Continue => stack.push((id, 0)),
        }

        while let Some(frame) = stack.last_mut() {
            let (node, index) = *frame;
            if let Some(&child) = self.children(node).get(index) {
                frame.1 += 1;
                match f(self, child, true)? {
                    WalkStatus::Stop => return Ok(WalkStatus::Stop),
                    WalkStatus::SkipChildren => {
                        if f(self, child, false)? == WalkStatus::Stop {
                            return Ok(WalkStatus::Stop);
                        }
                    }
                    WalkStatus::Continue => stack.push((child, 0)),
                }
            } else {
                stack.pop();
                let status = f(self, node, false)?;
                if stack.is_empty() || status == WalkStatus::Stop {
                    return Ok(status);
                }
            }
        }
        Ok(WalkStatus::Continue)
    }

    /// Depth-first walk that hands the callback mutable access to the document.
    ///
    /// Same phase semantics as [`walk`](Self::walk). Children are looked up by
    /// position on every step, so callbacks may freely update node payloads.
    pub fn walk_mut<E, F>(&mut self, id: NodeId, f: &mut F) -> Result<WalkStatus, E>
    where
        F: FnMut(&mut Self, NodeId, bool) -> Result<WalkStatus, E>,
    {
        let mut stack: Vec<(NodeId, usize)> = Vec::new();
        match f(self, id, true)? {
            WalkStatus::Stop => return Ok(WalkStatus::Stop),
            WalkStatus::SkipChildren => return f(self, id, false),
            WalkStatus::Continue => stack.push((id, 0)),
        }

        while let Some(&(node, index)) = stack.last() {
            if let Some(&child) = self.children(node).get(index) {
                if let Some(frame) = stack.last_mut() {
                    frame.1 += 1;
                }
                match f(self, child, true)? {
                    WalkStatus::Stop => return Ok(WalkStatus::Stop),
                    WalkStatus::SkipChildren => {
                        if f(self, child, false)? == WalkStatus::Stop {
                            return Ok(WalkStatus::Stop);
                        }
                    }
                    WalkStatus::Continue => stack.push((child, 0)),
                }
            } else {
                stack.pop();
                let status = f(self, node, false)?;
                if stack.is_empty() || status == WalkStatus::Stop {
                    return Ok(status);
                }
            }
        }
        Ok(WalkStatus::Continue)
    }
}
