//! Flat cluster extraction from a merge tree.
//!
//! To cut into `k` clusters the most recently created internal nodes act as
//! split points: a max-heap of node ids starts from the tree roots, and each
//! pop replaces an internal node by its two children. After the pops the heap
//! holds the roots of the `k` final clusters; their leaves are enumerated by
//! iterative descent. O(n log k) overall.

use std::collections::BinaryHeap;

use super::{LinkageError, LinkageTree};

pub(super) fn cut(k: usize, tree: &LinkageTree) -> Result<Vec<usize>, LinkageError> {
    let n_leaves = tree.n_leaves();
    if k == 0 || k > n_leaves {
        return Err(LinkageError::InvalidClusterCount {
            requested: k,
            n_leaves,
        });
    }

    // Every node without a parent is a root; a full tree has exactly one,
    // a partial or early-stopped tree one per remaining top-level cluster.
    let mut frontier: BinaryHeap<usize> = tree
        .parents()
        .iter()
        .enumerate()
        .filter_map(|(node, &parent)| (parent == node).then_some(node))
        .collect();

    if k < frontier.len() {
        return Err(LinkageError::PartialTreeCut {
            requested: k,
            available: frontier.len(),
        });
    }

    while frontier.len() < k {
        let node = frontier.pop().ok_or(LinkageError::InvariantViolation {
            invariant: "split frontier drained before reaching the cluster count",
            cluster: k,
            neighbour: frontier.len(),
        })?;
        if node < n_leaves {
            return Err(LinkageError::InvariantViolation {
                invariant: "split frontier contains a leaf before k clusters exist",
                cluster: node,
                neighbour: n_leaves,
            });
        }
        let (left, right) = tree.children()[node - n_leaves];
        frontier.push(left);
        frontier.push(right);
    }

    let mut roots: Vec<usize> = frontier.into_vec();
    roots.sort_unstable();

    let mut labels = vec![0usize; n_leaves];
    for (label, &root) in roots.iter().enumerate() {
        let mut stack = vec![root];
        while let Some(node) = stack.pop() {
            if node < n_leaves {
                labels[node] = label;
            } else {
                let (left, right) = tree.children()[node - n_leaves];
                stack.push(left);
                stack.push(right);
            }
        }
    }
    Ok(labels)
}
