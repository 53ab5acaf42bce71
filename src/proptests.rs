use crate::{InvalidPathReason, Node, PathTree, PathTreeError, Storage, VecPathTree};

use proptest::prelude::*;
use proptest::test_runner::TestCaseError;
use std::collections::BTreeMap;

type Model = BTreeMap<Vec<u8>, u32>;

#[derive(Clone, Debug)]
enum Op {
    Insert(Vec<u8>, u32),
    InsertAll(Vec<u8>, u32),
    Remove(Vec<u8>),
    RemoveAll(Vec<u8>),
    Find(Vec<u8>),
    Defragment,
}

fn path_strategy() -> impl Strategy<Value = Vec<u8>> + Clone {
    // A tiny alphabet makes shared prefixes and collisions likely.
    prop::collection::vec(0u8..3, 0..=4)
}

fn ops_strategy() -> impl Strategy<Value = Vec<Op>> {
    let path = path_strategy();
    let op = prop_oneof![
        20 => (path.clone(), 1u32..1000).prop_map(|(p, v)| Op::Insert(p, v)),
        30 => (path.clone(), 1u32..1000).prop_map(|(p, v)| Op::InsertAll(p, v)),
        15 => path.clone().prop_map(Op::Remove),
        10 => path.clone().prop_map(Op::RemoveAll),
        25 => path.prop_map(Op::Find),
        5 => Just(Op::Defragment),
    ];
    prop::collection::vec(op, 0..=300)
}

fn is_descendant(candidate: &[u8], ancestor: &[u8]) -> bool {
    candidate.len() > ancestor.len() && candidate.starts_with(ancestor)
}

fn model_remove_subtree(model: &mut Model, path: &[u8]) {
    model.retain(|key, _| !key.starts_with(path));
}

fn model_contains(model: &Model, path: &[u8]) -> bool {
    path.is_empty() || model.contains_key(path)
}

fn validate_tree<S>(tree: &PathTree<u8, u32, usize, S>, model: &Model) -> Result<(), TestCaseError>
where
    S: Storage<Element = Node<u8, u32, usize>, Key = usize>,
{
    let mut reachable = 0usize;
    let mut stack = vec![tree.root()];
    while let Some(node) = stack.pop() {
        reachable += 1;
        let path = node.path().into_iter().copied().collect::<Vec<_>>();
        if !node.is_root() {
            prop_assert_eq!(model.get(&path), Some(node.value()), "value mismatch at {:?}", path);
        }
        for child in node.children() {
            let parent = child.parent();
            prop_assert_eq!(parent.map(|x| x.into_raw_key()), Some(*node.raw_key()));
            let key = child.key().copied();
            prop_assert!(key.is_some(), "child without key under {:?}", path);
            prop_assert_eq!(
                node.child(&key.unwrap()).map(|x| x.into_raw_key()),
                Some(*child.raw_key()),
            );
            stack.push(child);
        }
    }
    prop_assert_eq!(reachable, tree.len(), "reachable node count must match len");
    prop_assert_eq!(tree.len(), model.len() + 1);
    Ok(())
}

fn check_equivalence<S>(
    tree: &mut PathTree<u8, u32, usize, S>,
    ops: Vec<Op>,
    defragment: impl Fn(&mut PathTree<u8, u32, usize, S>),
) -> Result<(), TestCaseError>
where
    S: Storage<Element = Node<u8, u32, usize>, Key = usize>,
{
    let mut model = Model::new();
    for op in ops {
        match op {
            Op::Insert(path, value) => {
                let got = tree.insert(&path, value).map(|node| *node.value());
                let expected = match path.split_last() {
                    None => Err(PathTreeError::InvalidPath {
                        path: path.clone(),
                        reason: InvalidPathReason::Empty,
                    }),
                    Some((_, parent)) if !model_contains(&model, parent) => {
                        Err(PathTreeError::NotExist { path: path.clone() })
                    }
                    Some(_) => {
                        model_remove_subtree(&mut model, &path);
                        model.insert(path.clone(), value);
                        Ok(value)
                    }
                };
                prop_assert_eq!(got, expected);
            }
            Op::InsertAll(path, value) => {
                let got = tree.insert_all(&path, value).map(|node| *node.value());
                for depth in 1..path.len() {
                    model.entry(path[..depth].to_vec()).or_insert(0);
                }
                let expected = if path.is_empty() {
                    0
                } else {
                    *model.entry(path.clone()).or_insert(value)
                };
                prop_assert_eq!(got, Ok(expected));
            }
            Op::Remove(path) => {
                let got = tree.remove(&path);
                let expected = if path.is_empty() {
                    Err(PathTreeError::InvalidPath {
                        path: path.clone(),
                        reason: InvalidPathReason::Empty,
                    })
                } else if !model.contains_key(&path) {
                    Err(PathTreeError::NotExist { path: path.clone() })
                } else if model.keys().any(|key| is_descendant(key, &path)) {
                    Err(PathTreeError::InvalidPath {
                        path: path.clone(),
                        reason: InvalidPathReason::HasChildren,
                    })
                } else {
                    Ok(model.remove(&path).unwrap_or_default())
                };
                prop_assert_eq!(got, expected);
            }
            Op::RemoveAll(path) => {
                let got = tree.remove_all(&path);
                let expected = if path.is_empty() {
                    Err(PathTreeError::InvalidPath {
                        path: path.clone(),
                        reason: InvalidPathReason::Empty,
                    })
                } else if let Some(value) = model.get(&path).copied() {
                    model_remove_subtree(&mut model, &path);
                    Ok(value)
                } else {
                    Err(PathTreeError::NotExist { path: path.clone() })
                };
                prop_assert_eq!(got, expected);
            }
            Op::Find(path) => {
                let got = tree.find(&path).map(|node| *node.value());
                let expected = if path.is_empty() {
                    Some(0)
                } else {
                    model.get(&path).copied()
                };
                prop_assert_eq!(got, expected);
            }
            Op::Defragment => {
                defragment(&mut *tree);
                validate_tree(tree, &model)?;
            }
        }
        prop_assert_eq!(tree.len(), model.len() + 1);
    }
    validate_tree(tree, &model)
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 256,
        .. ProptestConfig::default()
    })]

    #[test]
    fn prop_equivalence_sparse(ops in ops_strategy()) {
        let mut tree: PathTree<u8, u32> = PathTree::new();
        check_equivalence(&mut tree, ops, |tree: &mut PathTree<u8, u32>| {
            tree.defragment();
            assert!(tree.is_dense());
        })?;
    }

    #[test]
    fn prop_equivalence_vec(ops in ops_strategy()) {
        // List storages never have holes
        let mut tree: VecPathTree<u8, u32> = PathTree::new();
        check_equivalence(&mut tree, ops, |_| {})?;
    }
}

#[test]
fn deep_chain_removal() {
    let path = (0..200u8).collect::<Vec<_>>();
    let mut tree: VecPathTree<u8, u32> = PathTree::new();
    tree.insert_all(&path, 1).unwrap();
    tree.insert_all(&[0, 7], 2).unwrap();
    assert_eq!(tree.len(), 202);

    assert_eq!(tree.remove_all(&path[..2]), Ok(0));
    assert_eq!(tree.len(), 3);
    assert_eq!(tree.get(&[0u8, 7]), Some(&2));
}
