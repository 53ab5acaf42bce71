use core::{fmt::Debug, hash::Hash, num::NonZeroIsize};
use std::collections::HashMap;
use granite::{ListStorage, MoveFix};

/// A node of a path tree.
///
/// Created by the path tree internally and only publicly exposed so that path tree storages' generic arguments could be specified. Use [`NodeRef`] to inspect nodes together with the tree they belong to.
///
/// [`NodeRef`]: struct.NodeRef.html " "
#[derive(Clone, Debug)]
pub struct Node<K, V, I>
where
    I: Clone + Debug + Eq,
{
    pub(super) key: Option<K>,
    pub(super) value: V,
    pub(super) parent: Option<I>,
    pub(super) children: HashMap<K, I>,
}
impl<K, V, I> Node<K, V, I>
where
    I: Clone + Debug + Eq,
{
    #[inline(always)]
    pub(super) fn root(value: V) -> Self {
        Self {
            key: None,
            value,
            parent: None,
            children: HashMap::new(),
        }
    }
    #[inline(always)]
    pub(super) fn child(key: K, value: V, parent: I) -> Self {
        Self {
            key: Some(key),
            value,
            parent: Some(parent),
            children: HashMap::new(),
        }
    }

    /// Returns the path segment under which the node is stored in its parent, or `None` for the root node.
    #[inline(always)]
    pub fn key(&self) -> Option<&K> {
        self.key.as_ref()
    }
    /// Returns a reference to the value stored in the node.
    #[inline(always)]
    pub fn value(&self) -> &V {
        &self.value
    }
    /// Returns the storage key of the parent node, or `None` for the root node.
    #[inline(always)]
    pub fn parent_raw_key(&self) -> Option<&I> {
        self.parent.as_ref()
    }
    /// Returns the mapping from the path segments of the node's children to their storage keys.
    #[inline(always)]
    pub fn children(&self) -> &HashMap<K, I> {
        &self.children
    }
    /// Returns `true` if the node has no children, `false` otherwise.
    #[inline(always)]
    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }
}

impl<K, V> MoveFix for Node<K, V, usize>
where
    K: Clone + Eq + Hash,
{
    unsafe fn fix_shift<S>(storage: &mut S, shifted_from: usize, shifted_by: NonZeroIsize)
    where
        S: ListStorage<Element = Self>,
    {
        let shift = shifted_by.get();
        // First index, in the numbering before the shift, of the elements which got moved
        let moved_from = if shift > 0 {
            shifted_from
        } else {
            shifted_from + shift.unsigned_abs()
        };
        let translate = |index: usize| {
            if index >= moved_from {
                (index as isize + shift) as usize
            } else {
                index
            }
        };
        // Links can point both ways across the shifted region, so every node has to be visited
        for i in 0..ListStorage::len(storage) {
            let node = ListStorage::get_unchecked_mut(storage, i);
            node.parent = node.parent.map(translate);
            for child in node.children.values_mut() {
                *child = translate(*child);
            }
        }
    }

    unsafe fn fix_move<S>(storage: &mut S, previous_index: usize, current_index: usize)
    where
        S: ListStorage<Element = Self>,
    {
        let (parent, key, children) = {
            // SAFETY: index validity is guaranteed for `current_index`.
            let node = ListStorage::get_unchecked(storage, current_index);
            (
                node.parent,
                node.key.clone(),
                node.children.values().copied().collect::<Vec<_>>(),
            )
        };
        for child in children {
            // SAFETY: index validity is guaranteed for children.
            ListStorage::get_unchecked_mut(storage, child).parent = Some(current_index);
        }
        if let (Some(parent), Some(key)) = (parent, key) {
            // SAFETY: nodes can never have out-of-bounds parents
            let parent = ListStorage::get_unchecked_mut(storage, parent);
            if let Some(link) = parent.children.get_mut(&key) {
                debug_assert_eq!(*link, previous_index, "parent pointed to a different child");
                *link = current_index;
            }
        }
    }
}
