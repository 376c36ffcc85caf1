use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{ElementRef, Node};

pub type NodeId = usize;

/// Open paren or minus, optional whitespace, then a digit.
static NEGATIVE_HINT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[\(-]\s*\d").expect("static regex"));

const FACT_ELEMENT_NAMES: [&str; 2] = ["nonfraction", "nonnumeric"];
const FACT_ELEMENT_CLASS: &str = "ixbrl-element";

/// Navigation needed by [`preceding_text`]: previous sibling, parent, and the
/// text carried by a node.
pub trait SiblingTree {
    type Node: Copy + PartialEq;

    fn previous_sibling(&self, node: Self::Node) -> Option<Self::Node>;
    fn parent(&self, node: Self::Node) -> Option<Self::Node>;
    /// Text of a text node, `None` for anything else.
    fn own_text(&self, node: Self::Node) -> Option<&str>;
    /// Concatenated text of every text node at or below `node`.
    fn text_content(&self, node: Self::Node) -> String;
}

/// Concatenate the text of `from` with every text node met walking backwards
/// (previous sibling, else parent) until `boundary` is reached.
///
/// Element siblings are stepped over without descending into them.
pub fn preceding_text<T: SiblingTree>(tree: &T, from: T::Node, boundary: T::Node) -> String {
    let mut text = tree.text_content(from);
    let mut node = from;
    while node != boundary {
        node = match tree.previous_sibling(node).or_else(|| tree.parent(node)) {
            Some(next) => next,
            None => break,
        };
        if let Some(s) = tree.own_text(node) {
            text.insert_str(0, s);
        }
    }
    text
}

pub fn is_negative_hint(text: &str) -> bool {
    NEGATIVE_HINT.is_match(text)
}

#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind {
    Element {
        name: String,
        /// Identifier of the fact this element is bound to, if it is a fact element.
        fact_id: Option<String>,
    },
    Text(String),
}

#[derive(Debug, Clone)]
struct TreeNode {
    kind: NodeKind,
    parent: Option<NodeId>,
    prev_sibling: Option<NodeId>,
    children: Vec<NodeId>,
}

/// Arena of nodes in document order; node 0 is the cell itself.
#[derive(Debug, Clone, Default)]
pub struct CellTree {
    nodes: Vec<TreeNode>,
}

impl CellTree {
    pub const ROOT: NodeId = 0;

    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot the subtree rooted at `cell`.
    pub fn from_element(cell: ElementRef<'_>) -> Self {
        let mut tree = Self::new();
        tree.push_element(cell, None);
        tree
    }

    fn push_element(&mut self, element: ElementRef<'_>, parent: Option<NodeId>) -> NodeId {
        let id = self.push(
            NodeKind::Element {
                name: element.value().name().to_string(),
                fact_id: fact_id_of(element),
            },
            parent,
        );
        for child in element.children() {
            if let Some(child_element) = ElementRef::wrap(child) {
                self.push_element(child_element, Some(id));
            } else if let Node::Text(text) = child.value() {
                self.push(NodeKind::Text(String::from(&**text)), Some(id));
            }
        }
        id
    }

    /// Append a node as the last child of `parent` (or as a root).
    pub fn push(&mut self, kind: NodeKind, parent: Option<NodeId>) -> NodeId {
        let id = self.nodes.len();
        let prev_sibling = parent.and_then(|p| self.nodes[p].children.last().copied());
        self.nodes.push(TreeNode {
            kind,
            parent,
            prev_sibling,
            children: Vec::new(),
        });
        if let Some(p) = parent {
            self.nodes[p].children.push(id);
        }
        id
    }

    /// First fact element in document order, the cell itself included.
    pub fn bound_element(&self) -> Option<(NodeId, &str)> {
        self.nodes.iter().enumerate().find_map(|(id, node)| match &node.kind {
            NodeKind::Element {
                fact_id: Some(fact_id),
                ..
            } => Some((id, fact_id.as_str())),
            _ => None,
        })
    }

    pub fn text(&self) -> String {
        if self.nodes.is_empty() {
            return String::new();
        }
        self.text_content(Self::ROOT)
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

impl SiblingTree for CellTree {
    type Node = NodeId;

    fn previous_sibling(&self, node: NodeId) -> Option<NodeId> {
        self.nodes.get(node)?.prev_sibling
    }

    fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.nodes.get(node)?.parent
    }

    fn own_text(&self, node: NodeId) -> Option<&str> {
        match &self.nodes.get(node)?.kind {
            NodeKind::Text(text) => Some(text),
            NodeKind::Element { .. } => None,
        }
    }

    fn text_content(&self, node: NodeId) -> String {
        let mut out = String::new();
        let mut stack = vec![node];
        while let Some(id) = stack.pop() {
            let Some(n) = self.nodes.get(id) else {
                continue;
            };
            match &n.kind {
                NodeKind::Text(text) => out.push_str(text),
                NodeKind::Element { .. } => stack.extend(n.children.iter().rev()),
            }
        }
        out
    }
}

/// Fact identifier carried by an inline XBRL fact element, or by an element
/// already marked up by the viewer.
pub fn fact_id_of(element: ElementRef<'_>) -> Option<String> {
    let value = element.value();
    let local_name = value
        .name()
        .rsplit(':')
        .next()
        .unwrap_or_default()
        .to_ascii_lowercase();
    let is_ix_fact = value.name().contains(':') && FACT_ELEMENT_NAMES.contains(&local_name.as_str());
    if is_ix_fact {
        if let Some(id) = value.attr("id") {
            return Some(id.to_string());
        }
    }
    if value.classes().any(|c| c == FACT_ELEMENT_CLASS) {
        return value.attr("data-ivid").map(str::to_string);
    }
    None
}
