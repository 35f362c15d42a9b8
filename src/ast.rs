//! Syntax tree definitions consumed by the renderer.
//!
//! The tree is an arena: every node lives in a slot of [`Tree`] and is
//! addressed by a [`NodeId`]. Parent, child and sibling links are ids, so
//! navigation never needs reference counting and a finished tree is plain
//! `Send + Sync` data that any number of render sessions can read at once.

use crate::error::TreeError;

/// Index of a node inside its [`Tree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl NodeId {
    /// Position of the node in the arena.
    pub fn index(self) -> usize {
        self.0
    }
}

/// Heading attributes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HeadingData {
    /// Level 1-6. Anything outside 1..=5 renders as `<h6>`.
    pub level: u8,
    /// Identifier assigned by the parser, if any.
    pub heading_id: Option<String>,
    /// Title-block headings get `class="title"` and stay out of the TOC.
    pub is_title_block: bool,
}

impl HeadingData {
    pub fn new(level: u8) -> Self {
        Self {
            level,
            ..Default::default()
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.heading_id = Some(id.into());
        self
    }
}

/// List type flags shared by lists and their items.
///
/// `term` wins over `definition`, which wins over `ordered`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ListFlags {
    pub ordered: bool,
    pub definition: bool,
    pub term: bool,
}

/// List attributes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListData {
    pub flags: ListFlags,
    /// Tight lists render item paragraphs without `<p>` tags.
    pub tight: bool,
    /// The list collecting footnote bodies at the end of a document.
    pub is_footnotes_list: bool,
}

/// List item attributes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListItemData {
    pub flags: ListFlags,
    /// Set on footnote bodies; holds the footnote's reference text.
    pub ref_link: Option<String>,
}

/// A fenced or indented code block.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CodeBlockData {
    /// Info string; the language is everything before the first blank.
    pub info: String,
    pub literal: String,
}

/// Table column alignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Alignment {
    #[default]
    None,
    Left,
    Center,
    Right,
}

impl Alignment {
    /// Value for the `align` attribute, if any.
    pub fn as_attr(self) -> Option<&'static str> {
        match self {
            Self::None => None,
            Self::Left => Some("left"),
            Self::Center => Some("center"),
            Self::Right => Some("right"),
        }
    }
}

/// Table cell attributes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TableCellData {
    pub is_header: bool,
    pub align: Alignment,
}

/// Link attributes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LinkData {
    pub destination: String,
    pub title: Option<String>,
    /// Nonzero marks a footnote reference rather than a hyperlink.
    pub note_id: u32,
}

impl LinkData {
    pub fn new(destination: impl Into<String>) -> Self {
        Self {
            destination: destination.into(),
            ..Default::default()
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn footnote(reference: impl Into<String>, note_id: u32) -> Self {
        Self {
            destination: reference.into(),
            title: None,
            note_id,
        }
    }
}

/// Image attributes. The alt text is the image node's children.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImageData {
    pub destination: String,
    pub title: Option<String>,
}

impl ImageData {
    pub fn new(destination: impl Into<String>) -> Self {
        Self {
            destination: destination.into(),
            title: None,
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }
}

/// The closed set of node kinds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
    // Block-level
    Document,
    BlockQuote,
    Paragraph,
    Heading(HeadingData),
    HorizontalRule,
    List(ListData),
    ListItem(ListItemData),
    CodeBlock(CodeBlockData),
    RawHtmlBlock(String),
    Table,
    TableHead,
    TableBody,
    TableRow,
    TableCell(TableCellData),

    // Inline
    Text(String),
    SoftBreak,
    HardBreak,
    Emphasis,
    Strong,
    Delete,
    Link(LinkData),
    Image(ImageData),
    Code(String),
    RawHtmlSpan(String),
}

impl NodeKind {
    pub fn text(literal: impl Into<String>) -> Self {
        Self::Text(literal.into())
    }

    /// Container nodes are visited twice by the walker, leaves once.
    pub fn is_container(&self) -> bool {
        !matches!(
            self,
            Self::Text(_)
                | Self::SoftBreak
                | Self::HardBreak
                | Self::Code(_)
                | Self::CodeBlock(_)
                | Self::RawHtmlBlock(_)
                | Self::RawHtmlSpan(_)
                | Self::HorizontalRule
        )
    }

    /// Short name used in errors and log events.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Document => "Document",
            Self::BlockQuote => "BlockQuote",
            Self::Paragraph => "Paragraph",
            Self::Heading(_) => "Heading",
            Self::HorizontalRule => "HorizontalRule",
            Self::List(_) => "List",
            Self::ListItem(_) => "ListItem",
            Self::CodeBlock(_) => "CodeBlock",
            Self::RawHtmlBlock(_) => "RawHtmlBlock",
            Self::Table => "Table",
            Self::TableHead => "TableHead",
            Self::TableBody => "TableBody",
            Self::TableRow => "TableRow",
            Self::TableCell(_) => "TableCell",
            Self::Text(_) => "Text",
            Self::SoftBreak => "SoftBreak",
            Self::HardBreak => "HardBreak",
            Self::Emphasis => "Emphasis",
            Self::Strong => "Strong",
            Self::Delete => "Delete",
            Self::Link(_) => "Link",
            Self::Image(_) => "Image",
            Self::Code(_) => "Code",
            Self::RawHtmlSpan(_) => "RawHtmlSpan",
        }
    }
}

#[derive(Debug, Clone)]
struct Slot {
    kind: NodeKind,
    parent: Option<NodeId>,
    first_child: Option<NodeId>,
    last_child: Option<NodeId>,
    prev: Option<NodeId>,
    next: Option<NodeId>,
}

impl Slot {
    fn new(kind: NodeKind, parent: Option<NodeId>) -> Self {
        Self {
            kind,
            parent,
            first_child: None,
            last_child: None,
            prev: None,
            next: None,
        }
    }
}

/// A complete document tree rooted at a single Document node.
#[derive(Debug, Clone)]
pub struct Tree {
    slots: Vec<Slot>,
}

impl Default for Tree {
    fn default() -> Self {
        Self::new()
    }
}

impl Tree {
    /// Create a tree holding only the Document root.
    pub fn new() -> Self {
        Self {
            slots: vec![Slot::new(NodeKind::Document, None)],
        }
    }

    pub fn root(&self) -> NodeRef<'_> {
        NodeRef {
            tree: self,
            id: NodeId(0),
        }
    }

    pub fn root_id(&self) -> NodeId {
        NodeId(0)
    }

    /// Look up a node. Ids from another tree may be out of range.
    pub fn get(&self, id: NodeId) -> Option<NodeRef<'_>> {
        (id.0 < self.slots.len()).then_some(NodeRef { tree: self, id })
    }

    /// Number of nodes, root included.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.len() == 1
    }

    /// Append `kind` as the last child of `parent`.
    pub fn append(&mut self, parent: NodeId, kind: NodeKind) -> Result<NodeId, TreeError> {
        let parent_kind = &self
            .slots
            .get(parent.0)
            .ok_or(TreeError::UnknownNode(parent.0))?
            .kind;
        if matches!(kind, NodeKind::Document) {
            return Err(TreeError::NestedDocument);
        }
        if !parent_kind.is_container() {
            return Err(TreeError::LeafParent {
                parent: parent_kind.name(),
                child: kind.name(),
            });
        }

        let id = NodeId(self.slots.len());
        let mut slot = Slot::new(kind, Some(parent));
        slot.prev = self.slots[parent.0].last_child;
        self.slots.push(slot);

        if let Some(prev) = self.slots[parent.0].last_child {
            self.slots[prev.0].next = Some(id);
        } else {
            self.slots[parent.0].first_child = Some(id);
        }
        self.slots[parent.0].last_child = Some(id);

        Ok(id)
    }
}

/// A borrowed handle to one node, used for navigation.
#[derive(Debug, Clone, Copy)]
pub struct NodeRef<'t> {
    tree: &'t Tree,
    id: NodeId,
}

impl<'t> NodeRef<'t> {
    fn slot(&self) -> &'t Slot {
        &self.tree.slots[self.id.0]
    }

    fn wrap(&self, id: Option<NodeId>) -> Option<NodeRef<'t>> {
        id.map(|id| NodeRef {
            tree: self.tree,
            id,
        })
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn kind(&self) -> &'t NodeKind {
        &self.slot().kind
    }

    pub fn parent(&self) -> Option<NodeRef<'t>> {
        self.wrap(self.slot().parent)
    }

    pub fn prev(&self) -> Option<NodeRef<'t>> {
        self.wrap(self.slot().prev)
    }

    pub fn next(&self) -> Option<NodeRef<'t>> {
        self.wrap(self.slot().next)
    }

    pub fn first_child(&self) -> Option<NodeRef<'t>> {
        self.wrap(self.slot().first_child)
    }

    pub fn last_child(&self) -> Option<NodeRef<'t>> {
        self.wrap(self.slot().last_child)
    }

    pub fn children(&self) -> Children<'t> {
        Children {
            next: self.first_child(),
        }
    }

    pub fn is_container(&self) -> bool {
        self.kind().is_container()
    }
}

impl PartialEq for NodeRef<'_> {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.tree, other.tree) && self.id == other.id
    }
}

impl Eq for NodeRef<'_> {}

/// Iterator over a node's children in document order.
#[derive(Debug, Clone)]
pub struct Children<'t> {
    next: Option<NodeRef<'t>>,
}

impl<'t> Iterator for Children<'t> {
    type Item = NodeRef<'t>;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next?;
        self.next = current.next();
        Some(current)
    }
}

/// Incremental builder for nested trees.
///
/// ```
/// use markdown_html::ast::{NodeKind, TreeBuilder};
///
/// let mut builder = TreeBuilder::new();
/// builder.open(NodeKind::Paragraph).text("hello").close();
/// let tree = builder.finish().unwrap();
/// assert_eq!(tree.len(), 3);
/// ```
#[derive(Debug)]
pub struct TreeBuilder {
    tree: Tree,
    stack: Vec<NodeId>,
    error: Option<TreeError>,
}

impl Default for TreeBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl TreeBuilder {
    pub fn new() -> Self {
        let tree = Tree::new();
        let root = tree.root_id();
        Self {
            tree,
            stack: vec![root],
            error: None,
        }
    }

    fn current(&self) -> NodeId {
        self.stack.last().copied().unwrap_or(NodeId(0))
    }

    fn push(&mut self, kind: NodeKind) -> Option<NodeId> {
        if self.error.is_some() {
            return None;
        }
        match self.tree.append(self.current(), kind) {
            Ok(id) => Some(id),
            Err(e) => {
                self.error = Some(e);
                None
            }
        }
    }

    /// Append a container and make it the insertion point.
    pub fn open(&mut self, kind: NodeKind) -> &mut Self {
        if !kind.is_container() {
            if self.error.is_none() {
                self.error = Some(TreeError::NotAContainer(kind.name()));
            }
            return self;
        }
        if let Some(id) = self.push(kind) {
            self.stack.push(id);
        }
        self
    }

    /// Append a node without descending into it.
    pub fn leaf(&mut self, kind: NodeKind) -> &mut Self {
        self.push(kind);
        self
    }

    pub fn text(&mut self, literal: impl Into<String>) -> &mut Self {
        self.leaf(NodeKind::Text(literal.into()))
    }

    /// Return to the parent of the innermost open container.
    pub fn close(&mut self) -> &mut Self {
        if self.stack.len() <= 1 {
            if self.error.is_none() {
                self.error = Some(TreeError::CloseAtRoot);
            }
        } else {
            self.stack.pop();
        }
        self
    }

    pub fn finish(self) -> Result<Tree, TreeError> {
        if let Some(e) = self.error {
            return Err(e);
        }
        if self.stack.len() > 1 {
            return Err(TreeError::Unclosed(self.stack.len() - 1));
        }
        Ok(self.tree)
    }
}
