//! Unbalanced binary search tree over `i64` keys.
//!
//! Nodes live in an arena (`Vec<Node>`) and refer to their children by
//! [`NodeId`]. The arena only grows; nodes are never removed.

use std::fmt::Write as _;

/// Handle of a node inside one [`OrderedIndexTree`] arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(usize);

impl NodeId {
    /// Returns the arena slot of this node.
    #[must_use]
    pub const fn as_usize(self) -> usize {
        self.0
    }
}

/// One tree node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    key: i64,
    left: Option<NodeId>,
    right: Option<NodeId>,
}

impl Node {
    /// The key stored in this node.
    #[must_use]
    pub const fn key(&self) -> i64 {
        self.key
    }

    /// Left child: keys `<=` this node's key.
    #[must_use]
    pub const fn left(&self) -> Option<NodeId> {
        self.left
    }

    /// Right child: keys `>` this node's key.
    #[must_use]
    pub const fn right(&self) -> Option<NodeId> {
        self.right
    }
}

/// One entry of [`OrderedIndexTree::shape`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShapeEntry {
    /// Node key.
    pub key: i64,
    /// Whether the node has a left child.
    pub has_left: bool,
    /// Whether the node has a right child.
    pub has_right: bool,
}

/// Ordered, unbalanced binary search tree.
///
/// For every node, all keys in the left subtree are `<=` the node's key and
/// all keys in the right subtree are `>`. Duplicates are allowed and go
/// left.
///
/// The tree is never rebalanced. Shape depends only on insertion order, and
/// sorted input degrades it to a list with O(n) depth. That cost is
/// accepted; lookups and inserts are O(depth).
///
/// # Persistence
///
/// [`serialize`](Self::serialize) emits keys in pre-order. Replaying that
/// sequence through [`insert`](Self::insert) rebuilds exactly the same
/// shape, not just the same key set: every key is placed under the same
/// parent because its ancestors are inserted before it.
///
/// # Example
///
/// ```
/// use dossier_core::OrderedIndexTree;
///
/// let tree = OrderedIndexTree::from_keys([100, -20, 50, -50]);
/// assert_eq!(tree.iter().collect::<Vec<_>>(), vec![-50, -20, 50, 100]);
///
/// let copy = OrderedIndexTree::from_keys(tree.serialize());
/// assert_eq!(copy.shape(), tree.shape());
/// ```
#[derive(Debug, Clone, Default)]
pub struct OrderedIndexTree {
    nodes: Vec<Node>,
    root: Option<NodeId>,
}

impl OrderedIndexTree {
    /// Creates an empty tree.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a tree by inserting `keys` in order.
    pub fn from_keys<I>(keys: I) -> Self
    where
        I: IntoIterator<Item = i64>,
    {
        let mut tree = Self::new();
        tree.extend(keys);
        tree
    }

    /// Inserts `key` and returns the handle of the new node.
    ///
    /// Descends left while `key <= node.key`, right otherwise, and attaches
    /// the new node at the first empty child slot.
    pub fn insert(&mut self, key: i64) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node {
            key,
            left: None,
            right: None,
        });

        let Some(mut current) = self.root else {
            self.root = Some(id);
            return id;
        };

        loop {
            let node = &mut self.nodes[current.0];
            let slot = if key <= node.key {
                &mut node.left
            } else {
                &mut node.right
            };
            match *slot {
                Some(child) => current = child,
                None => {
                    *slot = Some(id);
                    return id;
                }
            }
        }
    }

    /// Inserts every key from `keys` in order.
    pub fn extend<I>(&mut self, keys: I)
    where
        I: IntoIterator<Item = i64>,
    {
        for key in keys {
            self.insert(key);
        }
    }

    /// Number of keys, counting duplicates.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Returns true if the tree holds no keys.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Handle of the root node.
    #[must_use]
    pub fn root(&self) -> Option<NodeId> {
        self.root
    }

    /// Returns the node behind `id`.
    #[must_use]
    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.0)
    }

    /// Returns true if `key` is present at least once.
    #[must_use]
    pub fn contains(&self, key: i64) -> bool {
        let mut current = self.root;
        while let Some(id) = current {
            let node = &self.nodes[id.0];
            if key == node.key {
                return true;
            }
            current = if key < node.key { node.left } else { node.right };
        }
        false
    }

    /// Smallest key.
    #[must_use]
    pub fn min(&self) -> Option<i64> {
        let mut id = self.root?;
        while let Some(left) = self.nodes[id.0].left {
            id = left;
        }
        Some(self.nodes[id.0].key)
    }

    /// Largest key.
    #[must_use]
    pub fn max(&self) -> Option<i64> {
        let mut id = self.root?;
        while let Some(right) = self.nodes[id.0].right {
            id = right;
        }
        Some(self.nodes[id.0].key)
    }

    /// Number of nodes on the longest root-to-leaf path (0 when empty).
    #[must_use]
    pub fn height(&self) -> usize {
        let mut height = 0;
        let mut stack: Vec<(NodeId, usize)> = self.root.map(|r| (r, 1)).into_iter().collect();
        while let Some((id, depth)) = stack.pop() {
            height = height.max(depth);
            let node = &self.nodes[id.0];
            stack.extend(node.left.map(|c| (c, depth + 1)));
            stack.extend(node.right.map(|c| (c, depth + 1)));
        }
        height
    }

    /// Keys in ascending order.
    ///
    /// The iterator is lazy; calling `iter` again starts a fresh traversal.
    #[must_use]
    pub fn iter(&self) -> InOrder<'_> {
        InOrder {
            tree: self,
            stack: Vec::new(),
            current: self.root,
        }
    }

    /// Keys in pre-order (node, left subtree, right subtree).
    #[must_use]
    pub fn pre_order(&self) -> PreOrder<'_> {
        PreOrder {
            tree: self,
            stack: self.root.into_iter().collect(),
        }
    }

    /// Keys within `lo..=hi` in ascending order.
    pub fn range(&self, lo: i64, hi: i64) -> impl Iterator<Item = i64> + '_ {
        self.iter()
            .skip_while(move |&k| k < lo)
            .take_while(move |&k| k <= hi)
    }

    /// Keys in the order that reproduces this tree's shape when replayed.
    #[must_use]
    pub fn serialize(&self) -> Vec<i64> {
        self.pre_order().collect()
    }

    /// Pre-order description of the tree shape.
    ///
    /// Two trees have the same shape exactly when their shapes compare equal.
    #[must_use]
    pub fn shape(&self) -> Vec<ShapeEntry> {
        let mut shape = Vec::with_capacity(self.nodes.len());
        let mut stack: Vec<NodeId> = self.root.into_iter().collect();
        while let Some(id) = stack.pop() {
            let node = &self.nodes[id.0];
            shape.push(ShapeEntry {
                key: node.key,
                has_left: node.left.is_some(),
                has_right: node.right.is_some(),
            });
            stack.extend(node.right);
            stack.extend(node.left);
        }
        shape
    }

    /// Indented dump, one node per line: `M:` root, `L:`/`R:` children.
    #[must_use]
    pub fn render(&self) -> String {
        let mut out = String::new();
        let mut stack: Vec<(NodeId, usize, char)> =
            self.root.map(|r| (r, 0, 'M')).into_iter().collect();
        while let Some((id, indent, side)) = stack.pop() {
            let node = &self.nodes[id.0];
            let _ = writeln!(out, "{:indent$}{side}:{}", "", node.key);
            stack.extend(node.right.map(|c| (c, indent + 2, 'R')));
            stack.extend(node.left.map(|c| (c, indent + 2, 'L')));
        }
        out
    }
}

impl FromIterator<i64> for OrderedIndexTree {
    fn from_iter<I: IntoIterator<Item = i64>>(iter: I) -> Self {
        Self::from_keys(iter)
    }
}

impl<'a> IntoIterator for &'a OrderedIndexTree {
    type Item = i64;
    type IntoIter = InOrder<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Ascending iterator returned by [`OrderedIndexTree::iter`].
#[derive(Debug, Clone)]
pub struct InOrder<'a> {
    tree: &'a OrderedIndexTree,
    stack: Vec<NodeId>,
    current: Option<NodeId>,
}

impl Iterator for InOrder<'_> {
    type Item = i64;

    fn next(&mut self) -> Option<i64> {
        while let Some(id) = self.current {
            self.stack.push(id);
            self.current = self.tree.nodes[id.0].left;
        }
        let id = self.stack.pop()?;
        let node = &self.tree.nodes[id.0];
        self.current = node.right;
        Some(node.key)
    }
}

/// Pre-order iterator returned by [`OrderedIndexTree::pre_order`].
#[derive(Debug, Clone)]
pub struct PreOrder<'a> {
    tree: &'a OrderedIndexTree,
    stack: Vec<NodeId>,
}

impl Iterator for PreOrder<'_> {
    type Item = i64;

    fn next(&mut self) -> Option<i64> {
        let id = self.stack.pop()?;
        let node = &self.tree.nodes[id.0];
        self.stack.extend(node.right);
        self.stack.extend(node.left);
        Some(node.key)
    }
}
