use core::{
    borrow::Borrow,
    fmt::{self, Debug, Formatter},
    hash::Hash,
    iter::FusedIterator,
};
use std::collections::hash_map;
use granite::Storage;
use crate::DefaultStorage;
use super::{PathTree, Node};

/// A reference to a node in a path tree.
///
/// Since this type does not point to the node directly, but rather the tree the node is in and the key of the node in the storage, it can be used to traverse the tree.
pub struct NodeRef<'a, K, V, I = usize, S = DefaultStorage<Node<K, V, I>>>
where
    S: Storage<Element = Node<K, V, I>, Key = I>,
    I: Clone + Debug + Eq,
{
    pub(super) tree: &'a PathTree<K, V, I, S>,
    pub(super) key: I,
}
impl<'a, K, V, I, S> NodeRef<'a, K, V, I, S>
where
    S: Storage<Element = Node<K, V, I>, Key = I>,
    I: Clone + Debug + Eq,
{
    /// Creates a new `NodeRef` pointing to the specified key in the storage, or `None` if it's out of bounds.
    pub fn new_raw(tree: &'a PathTree<K, V, I, S>, key: I) -> Option<Self> {
        if tree.storage.contains_key(&key) {
            Some(unsafe {
                // SAFETY: we just did a key check
                Self::new_raw_unchecked(tree, key)
            })
        } else {
            None
        }
    }
    /// Creates a new `NodeRef` pointing to the specified key in the storage without doing bounds checking.
    ///
    /// # Safety
    /// Causes *immediate* undefined behavior if the specified key is not present in the storage.
    pub unsafe fn new_raw_unchecked(tree: &'a PathTree<K, V, I, S>, key: I) -> Self {
        Self { tree, key }
    }
    /// Returns a reference the raw storage key for the node.
    pub fn raw_key(&self) -> &I {
        &self.key
    }
    /// Consumes the reference and returns the underlying raw storage key for the node.
    #[allow(clippy::missing_const_for_fn)]
    pub fn into_raw_key(self) -> I {
        self.key
    }

    /// Returns the path segment under which the node is stored in its parent, or `None` if it's the root node.
    pub fn key(&self) -> Option<&'a K> {
        self.node().key.as_ref()
    }
    /// Returns a reference to the value stored in the node.
    pub fn value(&self) -> &'a V {
        &self.node().value
    }
    /// Returns `true` if the node is the root node, `false` otherwise.
    pub fn is_root(&self) -> bool {
        self.node().parent.is_none()
    }
    /// Returns `true` if the node is a *leaf*, i.e. does not have child nodes; `false` otherwise.
    pub fn is_leaf(&self) -> bool {
        self.node().is_leaf()
    }
    /// Returns the number of children of the node.
    pub fn num_children(&self) -> usize {
        self.node().children.len()
    }
    /// Returns a reference to the parent node of the pointee, or `None` if it's the root node.
    pub fn parent(&self) -> Option<Self> {
        self.node().parent.as_ref().map(|x| unsafe {
            // SAFETY: nodes can never have out-of-bounds parents
            Self::new_raw_unchecked(self.tree, x.clone())
        })
    }
    /// Returns a reference to the child stored under the specified path segment, or `None` if there is no such child.
    pub fn child<Q>(&self, segment: &Q) -> Option<Self>
    where
        K: Borrow<Q> + Eq + Hash,
        Q: Eq + Hash + ?Sized,
    {
        self.node().children.get(segment).map(|x| unsafe {
            // SAFETY: child keys are always valid
            Self::new_raw_unchecked(self.tree, x.clone())
        })
    }
    /// Returns an iterator over references to the children of the node, in no particular order.
    pub fn children(&self) -> NodeChildrenIter<'a, K, V, I, S> {
        NodeChildrenIter {
            tree: self.tree,
            keys: self.node().children.values(),
        }
    }
    /// Returns the path leading from the root to the node.
    ///
    /// # Example
    /// ```rust
    /// # use pathtree::PathTree;
    /// let mut tree = PathTree::<&str, u32>::new();
    /// let node = tree.insert_all(&["a", "b", "c"], 1).unwrap();
    /// assert_eq!(node.path(), [&"a", &"b", &"c"]);
    /// assert!(tree.root().path().is_empty());
    /// ```
    pub fn path(&self) -> Vec<&'a K> {
        let mut path = Vec::new();
        let mut current = Some(self.clone());
        while let Some(node) = current {
            path.extend(node.key());
            current = node.parent();
        }
        path.reverse();
        path
    }

    fn node(&self) -> &'a Node<K, V, I> {
        self.tree.node(&self.key)
    }
}
impl<K, V, I, S> Copy for NodeRef<'_, K, V, I, S>
where
    S: Storage<Element = Node<K, V, I>, Key = I>,
    I: Copy + Debug + Eq,
{
}
impl<K, V, I, S> Clone for NodeRef<'_, K, V, I, S>
where
    S: Storage<Element = Node<K, V, I>, Key = I>,
    I: Clone + Debug + Eq,
{
    fn clone(&self) -> Self {
        Self {
            tree: self.tree,
            key: self.key.clone(),
        }
    }
}
impl<K, V, I, S> Debug for NodeRef<'_, K, V, I, S>
where
    S: Storage<Element = Node<K, V, I>, Key = I>,
    I: Clone + Debug + Eq,
    K: Debug,
    V: Debug,
{
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("NodeRef")
            .field("raw_key", &self.key)
            .field("key", &self.key())
            .field("value", self.value())
            .field("num_children", &self.num_children())
            .finish()
    }
}

/// An iterator over references to the children of a path tree node.
pub struct NodeChildrenIter<'a, K, V, I = usize, S = DefaultStorage<Node<K, V, I>>>
where
    S: Storage<Element = Node<K, V, I>, Key = I>,
    I: Clone + Debug + Eq,
{
    tree: &'a PathTree<K, V, I, S>,
    keys: hash_map::Values<'a, K, I>,
}
impl<'a, K, V, I, S> Iterator for NodeChildrenIter<'a, K, V, I, S>
where
    S: Storage<Element = Node<K, V, I>, Key = I>,
    I: Clone + Debug + Eq,
{
    type Item = NodeRef<'a, K, V, I, S>;
    fn next(&mut self) -> Option<Self::Item> {
        let tree = self.tree;
        self.keys.next().map(|key| unsafe {
            // SAFETY: child keys are always valid
            NodeRef::new_raw_unchecked(tree, key.clone())
        })
    }
    fn size_hint(&self) -> (usize, Option<usize>) {
        self.keys.size_hint()
    }
}
impl<K, V, I, S> ExactSizeIterator for NodeChildrenIter<'_, K, V, I, S>
where
    S: Storage<Element = Node<K, V, I>, Key = I>,
    I: Clone + Debug + Eq,
{
}
impl<K, V, I, S> FusedIterator for NodeChildrenIter<'_, K, V, I, S>
where
    S: Storage<Element = Node<K, V, I>, Key = I>,
    I: Clone + Debug + Eq,
{
}
impl<K, V, I, S> Debug for NodeChildrenIter<'_, K, V, I, S>
where
    S: Storage<Element = Node<K, V, I>, Key = I>,
    I: Clone + Debug + Eq,
    K: Debug,
{
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("NodeChildrenIter")
            .field("keys", &self.keys)
            .finish()
    }
}
