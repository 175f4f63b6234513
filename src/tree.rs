//! Syntax tree data structures
//!
//! Macula sentences are stored as arena trees: nodes live in a flat `Vec`
//! and refer to each other by index. Only the attributes the flattener
//! reads are kept.

/// Index of a node within its tree
pub type NodeId = usize;

/// A node in a sentence's syntax tree
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Node {
    pub id: NodeId,
    /// Category label (`Cat`), e.g. `cl`, `np`, `noun`
    pub cat: Option<String>,
    /// Treebank node identifier (`nodeId`)
    pub node_id: Option<String>,
    /// Character data before the first child element
    pub text: Option<String>,
    pub reference: Option<String>,
    pub lemma: Option<String>,
    pub gloss: Option<String>,
    pub strong: Option<String>,
    pub morph: Option<String>,
    /// Structural word identifier (`xml:id`)
    pub word_id: Option<String>,
    pub parent: Option<NodeId>,
    pub children: Vec<NodeId>,
}

impl Node {
    /// Create a node with only a category and node identifier set
    pub fn new(id: NodeId, cat: &str, node_id: &str) -> Self {
        Self {
            id,
            cat: Some(cat.to_string()),
            node_id: Some(node_id.to_string()),
            ..Default::default()
        }
    }

    /// Trimmed text, if any non-whitespace text is present
    pub fn trimmed_text(&self) -> Option<&str> {
        self.text
            .as_deref()
            .map(str::trim)
            .filter(|text| !text.is_empty())
    }

    /// A word node carries text and has no structural children
    pub fn is_word(&self) -> bool {
        self.children.is_empty() && self.trimmed_text().is_some()
    }

    /// A clause node is labelled `cl` (any case)
    pub fn is_clause(&self) -> bool {
        self.cat
            .as_deref()
            .is_some_and(|cat| cat.eq_ignore_ascii_case("cl"))
    }
}

/// A syntax tree (one sentence)
#[derive(Debug, Clone, Default)]
pub struct Tree {
    pub nodes: Vec<Node>,
    pub root_id: Option<NodeId>,
}

impl Tree {
    /// Create a new empty tree
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a node, assigning it the next free id
    pub fn add_node(&mut self, mut node: Node) -> NodeId {
        let id = self.nodes.len();
        node.id = id;
        self.nodes.push(node);
        if self.root_id.is_none() {
            self.root_id = Some(id);
        }
        id
    }

    pub fn get_node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id)
    }

    pub fn get_node_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(id)
    }

    /// Attach `child_id` as the last child of `parent_id`
    pub fn set_parent(&mut self, child_id: NodeId, parent_id: NodeId) {
        if let Some(child) = self.get_node_mut(child_id) {
            child.parent = Some(parent_id);
        }
        if let Some(parent) = self.get_node_mut(parent_id) {
            parent.children.push(child_id);
        }
    }

    pub fn root(&self) -> Option<&Node> {
        self.root_id.and_then(|id| self.get_node(id))
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

/// One `Sentence` scope of a document
#[derive(Debug, Clone, Default)]
pub struct Sentence {
    /// The sentence's declared reference (`ref`)
    pub reference: Option<String>,
    /// The syntax tree, absent when the sentence has no `Tree/Node`
    pub tree: Option<Tree>,
}

/// A parsed treebank document
#[derive(Debug, Clone, Default)]
pub struct Document {
    pub sentences: Vec<Sentence>,
}

impl Document {
    /// Total number of tree nodes across all sentences
    pub fn node_count(&self) -> usize {
        self.sentences
            .iter()
            .filter_map(|s| s.tree.as_ref())
            .map(Tree::len)
            .sum()
    }
}
