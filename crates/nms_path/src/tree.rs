//! The path tree and its node arena.

use std::cmp::Ordering;

/// Handle to a node inside a [`PathTree`].
///
/// Ids are only meaningful for the tree that produced them.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct NodeId(usize);

/// One segment of the namespace.
#[derive(Debug, Clone)]
pub struct PathNode<T> {
    /// This node's segment, with a trailing `/` when it names a directory.
    text: String,
    /// Full path from the root to (and including) this node.
    path: String,
    /// Non-owning reference to the parent; `None` only for the root.
    parent: Option<NodeId>,
    /// Children ids, sorted directories-first then ordinal on segment text.
    children: Vec<NodeId>,
    /// Payload attached to leaf nodes; pure ancestor directories carry none.
    payload: Option<T>,
}

impl<T> PathNode<T> {
    /// The segment text, including the trailing `/` for directories.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Full path from the root of the tree to this node.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// The parent node, `None` for the root.
    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    /// Payload attached by insertion, if any.
    pub fn payload(&self) -> Option<&T> {
        self.payload.as_ref()
    }

    /// Whether this segment names a directory.
    pub fn is_dir(&self) -> bool {
        self.text.ends_with('/')
    }

    /// Whether this node has no children.
    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }
}

/// An ordered namespace of slash-delimited paths.
///
/// ```
/// use nms_path::PathTree;
///
/// let mut tree = PathTree::new();
/// tree.insert("DIR/A.TXT", 1);
/// tree.insert("B.TXT", 2);
///
/// let dir = tree.search("DIR/").unwrap();
/// assert!(tree.node(dir).is_dir());
/// assert_eq!(tree.node(tree.search("DIR/A.TXT").unwrap()).payload(), Some(&1));
/// ```
#[derive(Debug, Clone)]
pub struct PathTree<T> {
    nodes: Vec<PathNode<T>>,
}

impl<T> Default for PathTree<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> PathTree<T> {
    /// Create an empty tree holding only the root node.
    pub fn new() -> Self {
        PathTree {
            nodes: vec![PathNode {
                text: String::new(),
                path: String::new(),
                parent: None,
                children: Vec::new(),
                payload: None,
            }],
        }
    }

    /// The root node's id.
    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    /// Total number of nodes, the root included.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the tree holds nothing but the root.
    pub fn is_empty(&self) -> bool {
        self.nodes.len() == 1
    }

    /// Borrow a node by id.
    ///
    /// # Panics
    ///
    /// Panics when `id` came from a different tree and is out of range.
    pub fn node(&self, id: NodeId) -> &PathNode<T> {
        &self.nodes[id.0]
    }

    /// The sorted children of `id`.
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.nodes[id.0].children
    }

    /// Insert `path`, creating exactly the missing segments, and attach
    /// `payload` to the final one.
    ///
    /// Paths sharing a prefix reuse the existing ancestor chain, and
    /// re-inserting an existing path replaces its payload without adding
    /// nodes. Returns the leaf's id, or `None` for an empty path.
    pub fn insert(&mut self, path: &str, payload: T) -> Option<NodeId> {
        if path.is_empty() {
            return None;
        }

        let mut current = self.root();
        let mut rest = path;
        loop {
            let (segment, remaining) = split_first_segment(rest);

            let position = self.nodes[current.0]
                .children
                .binary_search_by(|child| compare_segments(&self.nodes[child.0].text, segment));

            let next = match position {
                Ok(at) => self.nodes[current.0].children[at],
                Err(at) => {
                    let id = NodeId(self.nodes.len());
                    let full = format!("{}{}", self.nodes[current.0].path, segment);
                    self.nodes.push(PathNode {
                        text: segment.to_owned(),
                        path: full,
                        parent: Some(current),
                        children: Vec::new(),
                        payload: None,
                    });
                    self.nodes[current.0].children.insert(at, id);
                    id
                }
            };

            if remaining.is_empty() {
                self.nodes[next.0].payload = Some(payload);
                return Some(next);
            }

            current = next;
            rest = remaining;
        }
    }

    /// Find the node for an exact `path` without creating anything.
    ///
    /// Directory lookups spell the trailing `/`: `search("DIR/")` finds
    /// the directory, `search("DIR")` would only find a *file* named
    /// `DIR` at the top level.
    pub fn search(&self, path: &str) -> Option<NodeId> {
        if path.is_empty() {
            return None;
        }

        let mut current = self.root();
        let mut rest = path;
        loop {
            let (segment, remaining) = split_first_segment(rest);

            let at = self.nodes[current.0]
                .children
                .binary_search_by(|child| compare_segments(&self.nodes[child.0].text, segment))
                .ok()?;
            current = self.nodes[current.0].children[at];

            if remaining.is_empty() {
                return Some(current);
            }
            rest = remaining;
        }
    }

    /// The chain of nodes from the root to `id`, both ends included.
    ///
    /// This is the breadcrumb for a node: every ancestor in order,
    /// finishing with the node itself.
    pub fn path_nodes(&self, id: NodeId) -> Vec<NodeId> {
        let mut chain = Vec::new();
        let mut current = Some(id);
        while let Some(node) = current {
            chain.push(node);
            current = self.nodes[node.0].parent;
        }
        chain.reverse();
        chain
    }

    /// Preorder traversal of every node below the root.
    ///
    /// Siblings are visited in their sorted order, so a straight loop
    /// over this iterator prints the tree the way a viewer would list it.
    pub fn iter(&self) -> Preorder<'_, T> {
        let mut stack: Vec<NodeId> = self.nodes[0].children.clone();
        stack.reverse();
        Preorder { tree: self, stack }
    }
}

/// Preorder iterator over a [`PathTree`], root excluded.
pub struct Preorder<'a, T> {
    tree: &'a PathTree<T>,
    stack: Vec<NodeId>,
}

impl<T> Iterator for Preorder<'_, T> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let id = self.stack.pop()?;
        self.stack
            .extend(self.tree.nodes[id.0].children.iter().rev().copied());
        Some(id)
    }
}

/// Split off the first segment of `path`, keeping the `/` on the segment.
///
/// `"DIR/A.TXT"` becomes `("DIR/", "A.TXT")`; a final segment comes back
/// with an empty remainder.
fn split_first_segment(path: &str) -> (&str, &str) {
    match path.find('/') {
        Some(at) => path.split_at(at + 1),
        None => (path, ""),
    }
}

/// Sibling ordering: directories before files, ordinal text otherwise.
fn compare_segments(lhs: &str, rhs: &str) -> Ordering {
    match (lhs.ends_with('/'), rhs.ends_with('/')) {
        (true, false) => Ordering::Less,
        (false, true) => Ordering::Greater,
        _ => lhs.cmp(rhs),
    }
}
