//! Path trees, ones in which every node is addressed by the path of keys leading to it from the root.
//!
//! Every node owns a mapping from keys to its children, and a sequence of keys, called a *path*, identifies at most one node: the one reached by starting at the root and stepping into the child named by each key in turn. The empty path refers to the root node, which always exists.
//!
//! # Example
//! ```rust
//! use pathtree::{PathTree, PathTreeError, InvalidPathReason};
//!
//! // Create the tree. The root node gets the default value for the value type. The turbofish
//! // there is needed to state that we are using the default storage method instead of asking the
//! // compiler to infer it, which would be impossible.
//! let mut tree = PathTree::<&str, &str>::new();
//!
//! // `insert` only creates the last node of the path, so the parent has to exist:
//! assert!(tree.insert(&["grand", "parent"], "Pat").unwrap_err().is_not_exist());
//!
//! // `insert_all` creates the missing intermediate nodes with the default value:
//! let child = tree.insert_all(&["grand", "parent", "child"], "Gary").unwrap();
//! assert_eq!(child.key(), Some(&"child"));
//! assert_eq!(*child.value(), "Gary");
//! assert_eq!(tree.get(&["grand", "parent"]), Some(&""));
//!
//! // Now the parent exists and we can add a sibling:
//! tree.insert(&["grand", "parent", "sibling"], "Sam").unwrap();
//! let parent = tree.find(&["grand", "parent"]).unwrap();
//! assert_eq!(parent.num_children(), 2);
//!
//! // Nodes with children can only be removed along with their entire subtree:
//! assert_eq!(
//!     tree.remove(&["grand"]),
//!     Err(PathTreeError::InvalidPath {
//!         path: vec!["grand"],
//!         reason: InvalidPathReason::HasChildren,
//!     }),
//! );
//! assert_eq!(tree.remove(&["grand", "parent", "child"]), Ok("Gary"));
//! tree.remove_all(&["grand"]).unwrap();
//! assert!(tree.is_empty());
//! ```

use core::{
    borrow::Borrow,
    fmt::Debug,
    hash::Hash,
    mem,
};
use std::collections::VecDeque;
use granite::{Storage, ListStorage, SparseStorage, SparseStorageSlot};
use tracing::{debug, trace};
use crate::{DefaultStorage, InvalidPathReason, PathTreeError};

mod node;
mod node_ref;

pub use node::Node;
pub use node_ref::{NodeRef, NodeChildrenIter};

/// A path tree.
///
/// See the [module-level documentation] for more.
///
/// [module-level documentation]: index.html " "
#[derive(Clone, Debug)]
pub struct PathTree<K, V, I = usize, S = DefaultStorage<Node<K, V, I>>>
where
    S: Storage<Element = Node<K, V, I>, Key = I>,
    I: Clone + Debug + Eq,
{
    storage: S,
    root: I,
    len: usize,
}
impl<K, V, I, S> PathTree<K, V, I, S>
where
    S: Storage<Element = Node<K, V, I>, Key = I>,
    I: Clone + Debug + Eq,
{
    /// Creates a path tree with the default value for the root node.
    ///
    /// # Example
    /// ```rust
    /// # use pathtree::PathTree;
    /// let tree = PathTree::<String, u32>::new();
    /// // There is nothing but the root node:
    /// assert!(tree.is_empty());
    /// assert_eq!(*tree.root().value(), 0);
    /// ```
    #[inline(always)]
    pub fn new() -> Self
    where
        V: Default,
    {
        Self::with_root(V::default())
    }
    /// Creates a path tree with the specified value for the root node.
    ///
    /// # Example
    /// ```rust
    /// # use pathtree::PathTree;
    /// let tree = PathTree::<String, _>::with_root("/");
    /// assert_eq!(*tree.root().value(), "/");
    /// assert_eq!(tree.root().key(), None);
    /// ```
    #[inline]
    pub fn with_root(value: V) -> Self {
        let mut storage = S::new();
        let root = storage.add(Node::root(value));
        Self {
            storage,
            root,
            len: 1,
        }
    }
    /// Creates a path tree with the specified capacity for the storage and the default value for the root node.
    ///
    /// # Panics
    /// The storage may panic if it has fixed capacity and the specified value does not match it.
    #[inline(always)]
    pub fn with_capacity(capacity: usize) -> Self
    where
        V: Default,
    {
        Self::with_root_and_capacity(capacity, V::default())
    }
    /// Creates a path tree with the specified capacity for the storage and the specified value for the root node.
    ///
    /// # Panics
    /// The storage may panic if it has fixed capacity and the specified value does not match it.
    #[inline]
    pub fn with_root_and_capacity(capacity: usize, value: V) -> Self {
        let mut storage = S::with_capacity(capacity);
        let root = storage.add(Node::root(value));
        Self {
            storage,
            root,
            len: 1,
        }
    }

    /// Returns a reference to the root node of the tree.
    #[inline(always)]
    pub fn root(&self) -> NodeRef<'_, K, V, I, S> {
        unsafe {
            // SAFETY: path trees cannot be created without a root, and it is never removed
            NodeRef::new_raw_unchecked(self, self.root.clone())
        }
    }
    /// Returns the number of nodes in the tree, including the root node.
    #[inline(always)]
    pub fn len(&self) -> usize {
        self.len
    }
    /// Returns `true` if the root node is the only node in the tree, `false` otherwise.
    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.len == 1
    }

    fn node(&self, key: &I) -> &Node<K, V, I> {
        debug_assert!(
            self.storage.contains_key(key),
            "\
debug key check failed: tried to reference key {:?} which is not present in the storage",
            key,
        );
        unsafe {
            // SAFETY: storage keys held by nodes and node references are never dangling
            self.storage.get_unchecked(key)
        }
    }
    fn node_mut(&mut self, key: &I) -> &mut Node<K, V, I> {
        debug_assert!(
            self.storage.contains_key(key),
            "\
debug key check failed: tried to reference key {:?} which is not present in the storage",
            key,
        );
        unsafe {
            // SAFETY: as above
            self.storage.get_unchecked_mut(key)
        }
    }

    /// Walks the path from the root, returning the storage key of the node it leads to.
    fn resolve<Q>(&self, path: &[Q]) -> Option<I>
    where
        K: Borrow<Q> + Eq + Hash,
        Q: Eq + Hash,
    {
        if !self.storage.contains_key(&self.root) {
            return None;
        }
        let mut current = self.root.clone();
        for segment in path {
            current = self.node(&current).children.get(segment)?.clone();
        }
        Some(current)
    }

    /// Finds the node at the specified path, or returns `None` if there is no such node.
    ///
    /// The empty path refers to the root node.
    ///
    /// # Example
    /// ```rust
    /// # use pathtree::PathTree;
    /// let mut tree = PathTree::<&str, u32>::new();
    /// tree.insert_all(&["a", "b"], 1).unwrap();
    ///
    /// assert_eq!(tree.find(&["a", "b"]).map(|node| *node.value()), Some(1));
    /// assert!(tree.find::<&str>(&[]).unwrap().is_root());
    /// assert!(tree.find(&["a", "c"]).is_none());
    /// ```
    pub fn find<Q>(&self, path: &[Q]) -> Option<NodeRef<'_, K, V, I, S>>
    where
        K: Borrow<Q> + Eq + Hash,
        Q: Eq + Hash,
    {
        self.resolve(path).map(|key| unsafe {
            // SAFETY: keys produced by a walk from the root are valid
            NodeRef::new_raw_unchecked(self, key)
        })
    }
    /// Returns a reference to the value of the node at the specified path, or `None` if there is no such node.
    #[inline]
    pub fn get<Q>(&self, path: &[Q]) -> Option<&V>
    where
        K: Borrow<Q> + Eq + Hash,
        Q: Eq + Hash,
    {
        self.resolve(path).map(|key| &self.node(&key).value)
    }
    /// Returns `true` if there is a node at the specified path, `false` otherwise.
    #[inline]
    pub fn contains<Q>(&self, path: &[Q]) -> bool
    where
        K: Borrow<Q> + Eq + Hash,
        Q: Eq + Hash,
    {
        self.resolve(path).is_some()
    }
}
impl<K, V, I, S> PathTree<K, V, I, S>
where
    S: Storage<Element = Node<K, V, I>, Key = I>,
    I: Clone + Debug + Ord,
    K: Clone + Debug + Eq + Hash,
{
    /// Inserts a node with the specified value at the specified path, the parent of which must already exist. Returns a reference to the new node.
    ///
    /// If the parent already had a child under the last key of the path, that child is replaced, **dropping its entire subtree**.
    ///
    /// # Errors
    /// - `InvalidPath` if the path is empty, since the root node cannot be replaced;
    /// - `NotExist` if there is no node at the path without its last key.
    ///
    /// # Example
    /// ```rust
    /// # use pathtree::PathTree;
    /// let mut tree = PathTree::<&str, u32>::new();
    /// tree.insert(&["etc"], 1).unwrap();
    /// tree.insert(&["etc", "hosts"], 2).unwrap();
    /// assert!(tree.insert(&["var", "log"], 3).is_err());
    ///
    /// // Inserting at an occupied path replaces the subtree:
    /// tree.insert(&["etc"], 4).unwrap();
    /// assert_eq!(tree.get(&["etc"]), Some(&4));
    /// assert!(!tree.contains(&["etc", "hosts"]));
    /// ```
    pub fn insert(&mut self, path: &[K], value: V) -> Result<NodeRef<'_, K, V, I, S>, PathTreeError<K>> {
        let (last, parent_path) = path
            .split_last()
            .ok_or_else(|| PathTreeError::invalid_path(path, InvalidPathReason::Empty))?;
        let mut parent = self
            .resolve(parent_path)
            .ok_or_else(|| PathTreeError::not_exist(path))?;
        if let Some(old) = self.node(&parent).children.get(last).cloned() {
            let (_, freed) = self.detach(old);
            trace!(?path, freed, "replaced subtree");
            // Freeing may have shifted the parent in list storages
            parent = self
                .resolve(parent_path)
                .ok_or_else(|| PathTreeError::not_exist(path))?;
        }
        let key = self.attach(parent, last.clone(), value);
        trace!(?path, "inserted node");
        Ok(unsafe {
            // SAFETY: we just added the node
            NodeRef::new_raw_unchecked(self, key)
        })
    }
    /// Inserts a node with the specified value at the specified path, creating all missing nodes along the way with the default value. Returns a reference to the node at the path.
    ///
    /// Nodes which already exist are left untouched, including the one at the path itself: if it exists, `value` is dropped and the existing node is returned. The empty path returns the root node.
    ///
    /// # Errors
    /// `NotExist` with an empty path if the tree has no root node. This cannot happen to trees created through the public interface.
    ///
    /// # Example
    /// ```rust
    /// # use pathtree::PathTree;
    /// let mut tree = PathTree::<&str, u32>::new();
    /// tree.insert_all(&["a", "b", "c"], 1).unwrap();
    /// tree.insert_all(&["a", "b", "d"], 2).unwrap();
    ///
    /// assert_eq!(tree.get(&["a", "b", "c"]), Some(&1));
    /// assert_eq!(tree.get(&["a", "b", "d"]), Some(&2));
    /// assert_eq!(tree.get(&["a", "b"]), Some(&0));
    /// assert_eq!(tree.len(), 5);
    /// ```
    pub fn insert_all(&mut self, path: &[K], value: V) -> Result<NodeRef<'_, K, V, I, S>, PathTreeError<K>>
    where
        V: Default,
    {
        if !self.storage.contains_key(&self.root) {
            return Err(PathTreeError::not_exist(&[]));
        }
        let (last, intermediate) = match path.split_last() {
            Some(x) => x,
            None => return Ok(self.root()),
        };
        let mut current = self.root.clone();
        for segment in intermediate {
            current = self.child_or_insert_with(current, segment, V::default);
        }
        let key = self.child_or_insert_with(current, last, || value);
        Ok(unsafe {
            // SAFETY: the key either was found by walking the tree or was just added
            NodeRef::new_raw_unchecked(self, key)
        })
    }
    /// Removes the *leaf* node at the specified path, returning its value.
    ///
    /// # Errors
    /// - `InvalidPath` if the path is empty, since the root node cannot be removed;
    /// - `NotExist` if there is no node at the path;
    /// - `InvalidPath` if the node has children, in which case `remove_all` should be used instead.
    ///
    /// # Example
    /// ```rust
    /// # use pathtree::PathTree;
    /// let mut tree = PathTree::<&str, u32>::new();
    /// tree.insert_all(&["grand", "parent", "child"], 7).unwrap();
    ///
    /// assert!(tree.remove(&["grand", "parent"]).unwrap_err().is_invalid_path());
    /// assert_eq!(tree.remove(&["grand", "parent", "child"]), Ok(7));
    /// assert!(tree.contains(&["grand", "parent"]));
    /// ```
    #[inline(always)]
    pub fn remove(&mut self, path: &[K]) -> Result<V, PathTreeError<K>> {
        self.remove_impl(path, false)
    }
    /// Removes the node at the specified path along with all of its descendants, returning the value of the node.
    ///
    /// # Errors
    /// - `InvalidPath` if the path is empty, since the root node cannot be removed;
    /// - `NotExist` if there is no node at the path.
    ///
    /// # Example
    /// ```rust
    /// # use pathtree::PathTree;
    /// let mut tree = PathTree::<&str, u32>::new();
    /// tree.insert_all(&["a", "b", "c"], 1).unwrap();
    ///
    /// assert_eq!(tree.remove_all(&["a"]), Ok(0));
    /// assert!(tree.is_empty());
    /// ```
    #[inline(always)]
    pub fn remove_all(&mut self, path: &[K]) -> Result<V, PathTreeError<K>> {
        self.remove_impl(path, true)
    }

    fn remove_impl(&mut self, path: &[K], recursive: bool) -> Result<V, PathTreeError<K>> {
        if path.is_empty() {
            return Err(PathTreeError::invalid_path(path, InvalidPathReason::Empty));
        }
        let target = self
            .resolve(path)
            .ok_or_else(|| PathTreeError::not_exist(path))?;
        if !recursive && !self.node(&target).is_leaf() {
            return Err(PathTreeError::invalid_path(path, InvalidPathReason::HasChildren));
        }
        let (value, freed) = self.detach(target);
        trace!(?path, freed, recursive, "removed node");
        Ok(value)
    }

    fn child_or_insert_with(&mut self, parent: I, segment: &K, f: impl FnOnce() -> V) -> I {
        if let Some(child) = self.node(&parent).children.get(segment) {
            return child.clone();
        }
        let key = self.attach(parent, segment.clone(), f());
        trace!(?segment, "created node");
        key
    }
    fn attach(&mut self, parent: I, segment: K, value: V) -> I {
        let key = self
            .storage
            .add(Node::child(segment.clone(), value, parent.clone()));
        self.node_mut(&parent).children.insert(segment, key.clone());
        self.len += 1;
        key
    }
    /// Unlinks the node from its parent and frees it along with its subtree. Returns the value of the node and the number of nodes freed.
    ///
    /// Storage keys held by the caller are invalidated, since list storages shift elements on removal.
    fn detach(&mut self, target: I) -> (V, usize) {
        let (parent, segment) = {
            let node = self.node(&target);
            (node.parent.clone(), node.key.clone())
        };
        if let (Some(parent), Some(segment)) = (parent, segment) {
            self.node_mut(&parent).children.remove(&segment);
        }
        let mut descendants = Vec::new();
        let mut stack: Vec<I> = self.node(&target).children.values().cloned().collect();
        while let Some(key) = stack.pop() {
            stack.extend(self.node(&key).children.values().cloned());
            descendants.push(key);
        }
        // Removing from the back first keeps the remaining keys valid in storages which shift.
        // Descendants always come after their ancestors in those.
        descendants.sort_unstable_by(|a, b| b.cmp(a));
        for key in &descendants {
            self.storage.remove(key);
        }
        let value = self.storage.remove(&target).value;
        let freed = descendants.len() + 1;
        self.len -= freed;
        (value, freed)
    }
}
impl<K, V, I, S> Default for PathTree<K, V, I, S>
where
    S: Storage<Element = Node<K, V, I>, Key = I>,
    I: Clone + Debug + Eq,
    V: Default,
{
    #[inline(always)]
    fn default() -> Self {
        Self::new()
    }
}
impl<K, V, L> PathTree<K, V, usize, SparseStorage<Node<K, V, usize>, L>>
where
    L: ListStorage<Element = SparseStorageSlot<Node<K, V, usize>>>,
    K: Clone + Eq + Hash,
{
    /// Removes all holes from the sparse storage by moving every node into a fresh storage of the same capacity, fixing the storage keys stored in the nodes.
    ///
    /// Nodes end up in breadth-first order, with the root node first. Does nothing if the storage is already dense.
    ///
    /// # Example
    /// ```rust
    /// # use pathtree::PathTree;
    /// let mut tree = PathTree::<&str, u32>::new();
    /// tree.insert_all(&["a", "b"], 1).unwrap();
    /// tree.insert_all(&["c", "d"], 2).unwrap();
    /// tree.remove_all(&["a"]).unwrap();
    /// assert_eq!(tree.num_holes(), 2);
    ///
    /// tree.defragment();
    /// assert!(tree.is_dense());
    /// assert_eq!(tree.get(&["c", "d"]), Some(&2));
    /// ```
    pub fn defragment(&mut self) {
        let holes = self.num_holes();
        if holes == 0 {
            return;
        }
        let capacity = Storage::capacity(&self.storage);
        let mut old = mem::replace(
            &mut self.storage,
            <SparseStorage<Node<K, V, usize>, L> as Storage>::with_capacity(capacity),
        );
        // Parents are always added before their children, so their new keys are known by then
        let mut queue = VecDeque::with_capacity(self.len);
        queue.push_back((self.root, None));
        while let Some((old_key, parent)) = queue.pop_front() {
            let mut node = Storage::remove(&mut old, &old_key);
            node.parent = parent;
            let segment = node.key.clone();
            let children = node.children.values().copied().collect::<Vec<_>>();
            let new_key = Storage::add(&mut self.storage, node);
            match (parent, segment) {
                (Some(parent), Some(segment)) => {
                    // Overwrites the stale key left over from the old storage
                    self.node_mut(&parent).children.insert(segment, new_key);
                }
                _ => self.root = new_key,
            }
            queue.extend(children.into_iter().map(|child| (child, Some(new_key))));
        }
        debug!(holes, nodes = self.len, "defragmented path tree storage");
    }
    /// Returns the number of holes in the storage, i.e. slots of removed nodes which have not been reused yet.
    #[inline(always)]
    pub fn num_holes(&self) -> usize {
        self.storage.num_holes()
    }
    /// Returns `true` if there are no holes in the storage, `false` otherwise.
    #[inline(always)]
    pub fn is_dense(&self) -> bool {
        self.storage.is_dense()
    }
}
