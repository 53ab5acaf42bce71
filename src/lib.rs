//! Implements an arena-allocated tree whose nodes are addressed by paths of keys.
//!
//! # Overview
//! A [`PathTree`] maps *paths*, i.e. sequences of keys, to values. Every key in a path names a child of the node reached by the keys before it, starting from the root, which always exists and cannot be removed. The tree supports:
//! - lookup by path with [`find`];
//! - insertion of a single node under an existing parent with [`insert`];
//! - insertion which builds out missing intermediate nodes with [`insert_all`];
//! - removal of leaf nodes with [`remove`] and of entire subtrees with [`remove_all`].
//!
//! Like other arena-allocated trees, the nodes are not linked with pointers. They live in some sort of backing storage, a sparse [`Vec`] unless a different one is specified, and refer to each other by their keys in that storage. Each node keeps a hash map from the path segments of its children to their storage keys, so resolving a path of length N takes N hash lookups.
//!
//! # Example
//! ```rust
//! use pathtree::PathTree;
//!
//! let mut tree = PathTree::<&str, u32>::new();
//! tree.insert_all(&["usr", "local", "bin"], 755).unwrap();
//! tree.insert(&["usr", "share"], 644).unwrap();
//!
//! let bin = tree.find(&["usr", "local", "bin"]).unwrap();
//! assert_eq!(bin.key(), Some(&"bin"));
//! assert_eq!(*bin.value(), 755);
//! // Intermediate nodes hold the default value:
//! assert_eq!(tree.get(&["usr", "local"]), Some(&0));
//!
//! // Branch nodes can only be removed together with their descendants.
//! assert!(tree.remove(&["usr", "local"]).is_err());
//! tree.remove_all(&["usr", "local"]).unwrap();
//! assert!(!tree.contains(&["usr", "local", "bin"]));
//! ```
//!
//! # Storage
//! The storage is pluggable through the [`Storage`] trait from the `granite` crate. The default storage punches holes instead of shifting elements on removal, which keeps removal cheap and storage keys stable; the holes are reused by later insertions, and [`defragment`] moves all nodes into a fresh storage without holes, rewriting the storage keys they hold for each other. Plain list storages like [`Vec`] work too, at the cost of every removal shifting the elements after it.
//!
//! # Feature flags
//! - `arrayvec_storage`: enables fixed-capacity [`ArrayVec`] storages and the [`ArrayVecPathTree`] type definition.
//! - `smallvec`, `slab`, `slotmap`: enable the corresponding storage implementations in `granite`.
//! - `union_optimizations`: forwards to `granite`, decreasing the size of sparse storage slots. **Requires a nightly compiler.**
//!
//! [`find`]: struct.PathTree.html#method.find " "
//! [`insert`]: struct.PathTree.html#method.insert " "
//! [`insert_all`]: struct.PathTree.html#method.insert_all " "
//! [`remove`]: struct.PathTree.html#method.remove " "
//! [`remove_all`]: struct.PathTree.html#method.remove_all " "
//! [`defragment`]: struct.PathTree.html#method.defragment " "
//! [`Vec`]: https://doc.rust-lang.org/std/vec/struct.Vec.html " "
//! [`ArrayVec`]: https://docs.rs/arrayvec/*/arrayvec/struct.ArrayVec.html " "

#![warn(
    rust_2018_idioms,
    clippy::nursery,
    missing_debug_implementations,
    missing_docs,
    unused_qualifications,
    clippy::cast_lossless,
    clippy::explicit_iter_loop,
    clippy::explicit_into_iter_loop,
    clippy::filter_map_next,
    clippy::map_flatten,
    clippy::map_unwrap_or,
    clippy::inefficient_to_string,
    clippy::items_after_statements,
    clippy::match_same_arms,
    clippy::match_wildcard_for_single_variants,
    clippy::mut_mut,
    clippy::needless_continue,
    clippy::needless_pass_by_value,
    clippy::option_option,
    clippy::redundant_closure_for_method_calls,
    clippy::similar_names,
    clippy::single_match_else,
    clippy::too_many_lines,
    clippy::type_repetition_in_bounds,
    clippy::trivially_copy_pass_by_ref,
    clippy::unnested_or_patterns,
    clippy::unused_self,
    clippy::used_underscore_binding,
    clippy::clone_on_ref_ptr,
    clippy::dbg_macro,
    clippy::get_unwrap,
    clippy::rest_pat_in_fully_bound_structs,
    clippy::unwrap_used, // Only .expect() allowed
)]
#![deny(
    anonymous_parameters,
    bare_trait_objects,
    clippy::exit,
)]
#![allow(clippy::use_self)]
#![cfg_attr(feature = "doc_cfg", feature(doc_cfg))]

pub mod path_tree;
pub use path_tree::{PathTree, Node, NodeRef};

#[doc(no_inline)]
pub use granite::{Storage, ListStorage, SparseStorage};

use core::fmt::{self, Formatter, Display};

/// The default storage type used by [`PathTree`] when a storage type is not provided: a `Vec` wrapped in [`SparseStorage`].
///
/// [`PathTree`]: path_tree/struct.PathTree.html " "
/// [`SparseStorage`]: https://docs.rs/granite/*/granite/struct.SparseStorage.html " "
pub type DefaultStorage<T> = granite::SparseVec<T>;

/// A path tree which uses a `Vec` as backing storage without sparse storage, meaning that every removal shifts all nodes stored after the removed ones.
pub type VecPathTree<K, V> = PathTree<K, V, usize, Vec<Node<K, V, usize>>>;

/// A path tree which uses a *sparse* `ArrayVec` as backing storage, i.e. can never hold more than `A::CAPACITY` nodes, including the root.
///
/// Trees of this type have to be created with [`with_capacity`] or [`with_root_and_capacity`] using the exact capacity of the array.
///
/// [`with_capacity`]: path_tree/struct.PathTree.html#method.with_capacity " "
/// [`with_root_and_capacity`]: path_tree/struct.PathTree.html#method.with_root_and_capacity " "
#[cfg(feature = "arrayvec_storage")]
#[cfg_attr(feature = "doc_cfg", doc(cfg(feature = "arrayvec_storage")))]
pub type ArrayVecPathTree<K, V, A> =
    PathTree<K, V, usize, SparseStorage<Node<K, V, usize>, arrayvec::ArrayVec<A>>>;

/// The error type returned by the operations of [`PathTree`].
///
/// Both variants carry the path which was passed to the failed operation.
///
/// [`PathTree`]: path_tree/struct.PathTree.html " "
#[derive(Clone, Debug, PartialEq, Eq, Hash, thiserror::Error)]
pub enum PathTreeError<K> {
    /// A node required by the operation does not exist: the parent for `insert`, the target for `remove` and `remove_all`.
    #[error("cannot find node at path {path:?}")]
    NotExist {
        /// The path passed to the operation.
        path: Vec<K>,
    },
    /// The path cannot be used for the operation.
    #[error("invalid path {path:?}: {reason}")]
    InvalidPath {
        /// The path passed to the operation.
        path: Vec<K>,
        /// Why the path was rejected.
        reason: InvalidPathReason,
    },
}
impl<K> PathTreeError<K> {
    #[inline]
    pub(crate) fn not_exist(path: &[K]) -> Self
    where
        K: Clone,
    {
        Self::NotExist {
            path: path.to_vec(),
        }
    }
    #[inline]
    pub(crate) fn invalid_path(path: &[K], reason: InvalidPathReason) -> Self
    where
        K: Clone,
    {
        Self::InvalidPath {
            path: path.to_vec(),
            reason,
        }
    }
    /// Returns the path which was passed to the failed operation.
    #[inline]
    pub fn path(&self) -> &[K] {
        match self {
              Self::NotExist { path }
            | Self::InvalidPath { path, .. }
            => path,
        }
    }
    /// Consumes the error and returns the path which was passed to the failed operation.
    #[inline]
    #[allow(clippy::missing_const_for_fn)] // const fn cannot evaluate drop
    pub fn into_path(self) -> Vec<K> {
        match self {
              Self::NotExist { path }
            | Self::InvalidPath { path, .. }
            => path,
        }
    }
    /// Returns `true` if the error is `NotExist`, `false` otherwise.
    #[inline]
    pub const fn is_not_exist(&self) -> bool {
        matches!(self, Self::NotExist { .. })
    }
    /// Returns `true` if the error is `InvalidPath`, `false` otherwise.
    #[inline]
    pub const fn is_invalid_path(&self) -> bool {
        matches!(self, Self::InvalidPath { .. })
    }
}

/// The reason for a path to be rejected with [`PathTreeError::InvalidPath`].
///
/// [`PathTreeError::InvalidPath`]: enum.PathTreeError.html#variant.InvalidPath " "
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum InvalidPathReason {
    /// The path was empty, i.e. pointed at the root node, which cannot be inserted or removed.
    Empty,
    /// The node at the path has children and thus can only be removed with `remove_all`.
    HasChildren,
}
impl Display for InvalidPathReason {
    #[inline]
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.pad(match self {
            Self::Empty => "the path is empty and refers to the root node",
            Self::HasChildren => {
                "the node has children and cannot be removed without recursion, use remove_all"
            }
        })
    }
}

#[cfg(test)]
mod proptests;
