use core::borrow::Borrow;
use core::cmp::Ordering;
use core::fmt;

use smallvec::SmallVec;

use super::arena::Arena;
use super::handle::Handle;
use super::node::Node;
use crate::error::DuplicateKeyError;

/// The core AVL tree backing `OrderedTree`.
///
/// All structural algorithms live here: BST descent, bottom-up rebalancing,
/// the four-case rotations, and the three removal cases. The public wrapper
/// only adds documentation and trait impls.
pub(crate) struct RawOrderedTree<T> {
    /// Arena storing all tree nodes.
    nodes: Arena<Node<T>>,
    /// Handle to the root node, if the tree is non-empty.
    root: Option<Handle>,
    /// Total number of values in the tree.
    len: usize,
}

/// Stack of handles recording a root-to-node descent.
///
/// Mutations rebalance each recorded ancestor on the unwind, deepest first;
/// traversal uses the same type as its explicit in-order stack.
type Path = SmallVec<[Handle; 16]>;

impl<T> RawOrderedTree<T> {
    /// Creates a new, empty tree.
    pub(crate) const fn new() -> Self {
        Self {
            nodes: Arena::new(),
            root: None,
            len: 0,
        }
    }

    /// Returns the number of values in the tree.
    pub(crate) const fn len(&self) -> usize {
        self.len
    }

    /// Returns true if the tree contains no values.
    pub(crate) const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Discards every node and resets the length to zero.
    pub(crate) fn clear(&mut self) {
        self.nodes.clear();
        self.root = None;
        self.len = 0;
    }

    /// Longest node path from the root down to a leaf: a leaf counts 1, the
    /// empty tree 0. Recomputed on every call; nothing is cached.
    pub(crate) fn height(&self) -> usize {
        self.height_of(self.root)
    }

    fn height_of(&self, node: Option<Handle>) -> usize {
        match node {
            None => 0,
            Some(handle) => {
                let node = self.nodes.get(handle);
                1 + core::cmp::max(self.height_of(node.left), self.height_of(node.right))
            }
        }
    }

    /// Right subtree height minus left subtree height, absent child = 0.
    #[allow(clippy::cast_possible_wrap)]
    fn balance_factor(&self, handle: Handle) -> isize {
        let node = self.nodes.get(handle);
        self.height_of(node.right) as isize - self.height_of(node.left) as isize
    }

    /// Re-points the child slot that held `old` under `parent` to `new`.
    /// A `None` parent means `old` was the root.
    fn relink(&mut self, parent: Option<Handle>, old: Handle, new: Option<Handle>) {
        match parent {
            None => self.root = new,
            Some(parent) => {
                let node = self.nodes.get_mut(parent);
                if node.left == Some(old) {
                    node.left = new;
                } else {
                    node.right = new;
                }
            }
        }
    }

    /// Rotates left at `handle`: the right child becomes the subtree root,
    /// `handle` becomes its left child, and the pivot's old left subtree is
    /// reattached as `handle`'s new right subtree. Parent back-references of
    /// every relinked node are updated, as is the grandparent's child link
    /// (or the tree root).
    fn rotate_left(&mut self, handle: Handle) {
        let pivot =
            self.nodes.get(handle).right.expect("`RawOrderedTree::rotate_left()` - node has no right child!");
        let inner = self.nodes.get(pivot).left;
        let parent = self.nodes.get(handle).parent;

        self.nodes.get_mut(handle).right = inner;
        if let Some(inner) = inner {
            self.nodes.get_mut(inner).parent = Some(handle);
        }
        self.nodes.get_mut(pivot).left = Some(handle);
        self.nodes.get_mut(handle).parent = Some(pivot);
        self.nodes.get_mut(pivot).parent = parent;
        self.relink(parent, handle, Some(pivot));
    }

    /// Mirror image of [`rotate_left`](Self::rotate_left).
    fn rotate_right(&mut self, handle: Handle) {
        let pivot =
            self.nodes.get(handle).left.expect("`RawOrderedTree::rotate_right()` - node has no left child!");
        let inner = self.nodes.get(pivot).right;
        let parent = self.nodes.get(handle).parent;

        self.nodes.get_mut(handle).left = inner;
        if let Some(inner) = inner {
            self.nodes.get_mut(inner).parent = Some(handle);
        }
        self.nodes.get_mut(pivot).right = Some(handle);
        self.nodes.get_mut(handle).parent = Some(pivot);
        self.nodes.get_mut(pivot).parent = parent;
        self.relink(parent, handle, Some(pivot));
    }

    /// Restores the AVL balance at `handle` if its balance factor has left
    /// `[-1, 1]`.
    ///
    /// This is the canonical four-case scheme: the taller child's own lean
    /// decides whether a single rotation suffices (left-left / right-right)
    /// or the inner case (left-right / right-left) needs a pre-rotation at
    /// that child first. An unconditional single rotation cannot restore the
    /// height invariant in the inner cases.
    fn rebalance(&mut self, handle: Handle) {
        if self.nodes.get(handle).is_leaf() {
            return;
        }
        let factor = self.balance_factor(handle);
        if factor < -1 {
            let left = self
                .nodes
                .get(handle)
                .left
                .expect("`RawOrderedTree::rebalance()` - left-heavy node has no left child!");
            if self.balance_factor(left) > 0 {
                // Left-right case.
                self.rotate_left(left);
            }
            self.rotate_right(handle);
        } else if factor > 1 {
            let right = self
                .nodes
                .get(handle)
                .right
                .expect("`RawOrderedTree::rebalance()` - right-heavy node has no right child!");
            if self.balance_factor(right) < 0 {
                // Right-left case.
                self.rotate_right(right);
            }
            self.rotate_left(handle);
        }
    }

    /// Writes the nested diagnostic form of the whole tree:
    /// `{value: <V>, left: <L|NIL>, right: <R|NIL>}`, `NIL` for absent
    /// children and for the empty tree.
    pub(crate) fn fmt_tree(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    where
        T: fmt::Debug,
    {
        self.fmt_subtree(f, self.root)
    }

    fn fmt_subtree(&self, f: &mut fmt::Formatter<'_>, node: Option<Handle>) -> fmt::Result
    where
        T: fmt::Debug,
    {
        match node {
            None => f.write_str("NIL"),
            Some(handle) => {
                let node = self.nodes.get(handle);
                write!(f, "{{value: {:?}, left: ", node.value)?;
                self.fmt_subtree(f, node.left)?;
                f.write_str(", right: ")?;
                self.fmt_subtree(f, node.right)?;
                f.write_str("}")
            }
        }
    }
}

impl<T: Ord> RawOrderedTree<T> {
    /// Returns a reference to the stored value comparing equal to `key`.
    /// An empty tree returns `None` immediately.
    pub(crate) fn get<Q>(&self, key: &Q) -> Option<&T>
    where
        T: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        let mut current = self.root;
        while let Some(handle) = current {
            let node = self.nodes.get(handle);
            match node.value.borrow().cmp(key) {
                Ordering::Equal => return Some(&node.value),
                Ordering::Greater => current = node.left,
                Ordering::Less => current = node.right,
            }
        }
        None
    }

    /// Inserts `value` at the BST position found by descent from the root.
    ///
    /// On an equal comparison anywhere along the descent the tree is left
    /// unmodified and `DuplicateKeyError` is returned. Otherwise the new
    /// node is attached with its parent back-reference set, and every
    /// ancestor on the descent path is rebalanced bottom-up.
    pub(crate) fn insert(&mut self, value: T) -> Result<(), DuplicateKeyError> {
        let Some(root) = self.root else {
            let handle = self.nodes.alloc(Node::new(value, None));
            self.root = Some(handle);
            self.len = 1;
            return Ok(());
        };

        let mut path: Path = SmallVec::new();
        let mut current = root;
        loop {
            path.push(current);
            let node = self.nodes.get(current);
            match value.cmp(&node.value) {
                Ordering::Equal => return Err(DuplicateKeyError),
                Ordering::Less => match node.left {
                    Some(left) => current = left,
                    None => {
                        let handle = self.nodes.alloc(Node::new(value, Some(current)));
                        self.nodes.get_mut(current).left = Some(handle);
                        break;
                    }
                },
                Ordering::Greater => match node.right {
                    Some(right) => current = right,
                    None => {
                        let handle = self.nodes.alloc(Node::new(value, Some(current)));
                        self.nodes.get_mut(current).right = Some(handle);
                        break;
                    }
                },
            }
        }
        self.len += 1;

        while let Some(ancestor) = path.pop() {
            self.rebalance(ancestor);
        }
        Ok(())
    }

    /// Removes the value comparing equal to `key` and returns it, or `None`
    /// if no such value is stored.
    ///
    /// # Panics
    ///
    /// Panics if the tree is empty: removing from an empty tree is a caller
    /// contract violation, not a not-found outcome.
    pub(crate) fn remove<Q>(&mut self, key: &Q) -> Option<T>
    where
        T: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        let root = self.root.expect("`RawOrderedTree::remove()` - tree is empty!");

        let mut path: Path = SmallVec::new();
        let mut current = root;
        let target = loop {
            let node = self.nodes.get(current);
            match node.value.borrow().cmp(key) {
                Ordering::Equal => break current,
                Ordering::Greater => {
                    let left = node.left?;
                    path.push(current);
                    current = left;
                }
                Ordering::Less => {
                    let right = node.right?;
                    path.push(current);
                    current = right;
                }
            }
        };

        let (left, right) = {
            let node = self.nodes.get(target);
            (node.left, node.right)
        };

        let removed = match (left, right) {
            (Some(_), Some(right)) => {
                // Two children: the in-order successor (leftmost node of the
                // right subtree, never a left child of its own) donates its
                // value to the target and is spliced out of its slot.
                path.push(target);
                let mut successor = right;
                while let Some(left) = self.nodes.get(successor).left {
                    path.push(successor);
                    successor = left;
                }
                let donor = self.nodes.take(successor);
                self.relink(donor.parent, successor, donor.right);
                if let Some(child) = donor.right {
                    self.nodes.get_mut(child).parent = donor.parent;
                }
                core::mem::replace(&mut self.nodes.get_mut(target).value, donor.value)
            }
            (Some(child), None) | (None, Some(child)) => {
                // One child: splice it into the removed node's slot and
                // re-point its parent back-reference.
                let node = self.nodes.take(target);
                self.relink(node.parent, target, Some(child));
                self.nodes.get_mut(child).parent = node.parent;
                node.value
            }
            (None, None) => {
                let node = self.nodes.take(target);
                self.relink(node.parent, target, None);
                node.value
            }
        };

        self.len -= 1;
        while let Some(ancestor) = path.pop() {
            self.rebalance(ancestor);
        }
        Some(removed)
    }
}

impl<T: Clone> RawOrderedTree<T> {
    /// In-order snapshot of every stored value into `out`, returning the
    /// count written. The empty tree returns 0 without touching the buffer.
    ///
    /// # Panics
    ///
    /// Panics if `out` has fewer than `len()` slots.
    pub(crate) fn collect_ascending(&self, out: &mut [T]) -> usize {
        let Some(root) = self.root else {
            return 0;
        };
        assert!(
            out.len() >= self.len,
            "`RawOrderedTree::collect_ascending()` - buffer holds {} slots but the tree stores {} values!",
            out.len(),
            self.len
        );

        let mut stack: Path = SmallVec::new();
        let mut current = Some(root);
        let mut written = 0;
        loop {
            while let Some(handle) = current {
                stack.push(handle);
                current = self.nodes.get(handle).left;
            }
            let Some(handle) = stack.pop() else {
                break;
            };
            let node = self.nodes.get(handle);
            out[written] = node.value.clone();
            written += 1;
            current = node.right;
        }
        written
    }

    /// Reverse in-order snapshot; otherwise identical to
    /// [`collect_ascending`](Self::collect_ascending).
    ///
    /// # Panics
    ///
    /// Panics if `out` has fewer than `len()` slots.
    pub(crate) fn collect_descending(&self, out: &mut [T]) -> usize {
        let Some(root) = self.root else {
            return 0;
        };
        assert!(
            out.len() >= self.len,
            "`RawOrderedTree::collect_descending()` - buffer holds {} slots but the tree stores {} values!",
            out.len(),
            self.len
        );

        let mut stack: Path = SmallVec::new();
        let mut current = Some(root);
        let mut written = 0;
        loop {
            while let Some(handle) = current {
                stack.push(handle);
                current = self.nodes.get(handle).right;
            }
            let Some(handle) = stack.pop() else {
                break;
            };
            let node = self.nodes.get(handle);
            out[written] = node.value.clone();
            written += 1;
            current = node.left;
        }
        written
    }
}

impl<T: Clone> Clone for RawOrderedTree<T> {
    fn clone(&self) -> Self {
        // Handles index the arena's slot vector, so cloning the slots
        // wholesale keeps every child/parent link valid in the copy.
        Self {
            nodes: self.nodes.clone(),
            root: self.root,
            len: self.len,
        }
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use alloc::collections::BTreeSet;
    use alloc::vec;
    use alloc::vec::Vec;
    use proptest::prelude::*;

    impl<T: Ord + core::fmt::Debug> RawOrderedTree<T> {
        /// Number of nodes strictly below `handle`; a leaf reports 0.
        fn descendant_count(&self, handle: Handle) -> usize {
            let node = self.nodes.get(handle);
            let left = node.left.map_or(0, |left| self.descendant_count(left) + 1);
            let right = node.right.map_or(0, |right| self.descendant_count(right) + 1);
            left + right
        }

        /// Validates every structural invariant: BST order, parent link
        /// consistency, AVL balance at each node, and `len` agreement.
        /// Panics with a descriptive message on the first violation.
        fn validate_invariants(&self) {
            let Some(root) = self.root else {
                assert_eq!(self.len, 0, "empty tree must have len 0");
                return;
            };
            assert_eq!(self.nodes.get(root).parent, None, "root must have no parent");
            let counted = self.validate_node(root, None, None, None);
            assert_eq!(counted, self.len, "len disagrees with reachable node count");
            assert_eq!(self.descendant_count(root) + 1, self.len, "descendant count disagrees with len");
        }

        /// Returns the number of nodes in the subtree rooted at `handle`.
        fn validate_node(
            &self,
            handle: Handle,
            parent: Option<Handle>,
            lower: Option<&T>,
            upper: Option<&T>,
        ) -> usize {
            let node = self.nodes.get(handle);
            assert_eq!(node.parent, parent, "parent back-reference is inconsistent at {:?}", node.value);
            if let Some(lower) = lower {
                assert!(*lower < node.value, "BST order violated: {:?} not above its lower bound", node.value);
            }
            if let Some(upper) = upper {
                assert!(node.value < *upper, "BST order violated: {:?} not below its upper bound", node.value);
            }
            let factor = self.balance_factor(handle);
            assert!(
                (-1..=1).contains(&factor),
                "balance factor {} out of [-1, 1] at {:?}",
                factor,
                node.value
            );

            let mut count = 1;
            if let Some(left) = node.left {
                count += self.validate_node(left, Some(handle), lower, Some(&node.value));
            }
            if let Some(right) = node.right {
                count += self.validate_node(right, Some(handle), Some(&node.value), upper);
            }
            count
        }
    }

    fn ascending(tree: &RawOrderedTree<i64>) -> Vec<i64> {
        let mut out = vec![0; tree.len()];
        let count = tree.collect_ascending(&mut out);
        out.truncate(count);
        out
    }

    #[test]
    fn empty_tree_reports_empty() {
        let tree: RawOrderedTree<i64> = RawOrderedTree::new();
        assert_eq!(tree.len(), 0);
        assert!(tree.is_empty());
        assert_eq!(tree.height(), 0);
        assert_eq!(tree.get(&1), None);
        tree.validate_invariants();
    }

    #[test]
    fn insert_then_get_round_trips() {
        let mut tree = RawOrderedTree::new();
        for value in [5, 3, 8, 1, 4] {
            tree.insert(value).unwrap();
            assert_eq!(tree.get(&value), Some(&value));
            tree.validate_invariants();
        }
        assert_eq!(tree.len(), 5);
        assert_eq!(ascending(&tree), [1, 3, 4, 5, 8]);
    }

    #[test]
    fn duplicate_insert_leaves_tree_unmodified() {
        let mut tree = RawOrderedTree::new();
        tree.insert(5).unwrap();
        tree.insert(3).unwrap();
        assert_eq!(tree.insert(3), Err(DuplicateKeyError));
        assert_eq!(tree.len(), 2);
        assert_eq!(ascending(&tree), [3, 5]);
        tree.validate_invariants();
    }

    #[test]
    fn remove_leaf_node() {
        let mut tree = RawOrderedTree::new();
        for value in [5, 3, 8] {
            tree.insert(value).unwrap();
        }
        assert_eq!(tree.remove(&3), Some(3));
        assert_eq!(tree.get(&3), None);
        assert_eq!(ascending(&tree), [5, 8]);
        tree.validate_invariants();
    }

    #[test]
    fn remove_node_with_one_child() {
        let mut tree = RawOrderedTree::new();
        for value in [5, 3, 8, 9] {
            tree.insert(value).unwrap();
        }
        // 8 has only a right child (9), which must be spliced into its slot.
        assert_eq!(tree.remove(&8), Some(8));
        assert_eq!(ascending(&tree), [3, 5, 9]);
        tree.validate_invariants();
    }

    #[test]
    fn remove_node_with_two_children_uses_successor() {
        let mut tree = RawOrderedTree::new();
        for value in [5, 3, 8, 7, 9] {
            tree.insert(value).unwrap();
        }
        assert_eq!(tree.remove(&8), Some(8));
        assert_eq!(tree.get(&8), None);
        assert_eq!(ascending(&tree), [3, 5, 7, 9]);
        tree.validate_invariants();
    }

    #[test]
    fn remove_root_with_two_children() {
        let mut tree = RawOrderedTree::new();
        for value in [5, 3, 8, 1, 4, 7, 9] {
            tree.insert(value).unwrap();
        }
        assert_eq!(tree.remove(&5), Some(5));
        assert_eq!(ascending(&tree), [1, 3, 4, 7, 8, 9]);
        tree.validate_invariants();
    }

    #[test]
    fn remove_missing_key_is_a_no_op() {
        let mut tree = RawOrderedTree::new();
        tree.insert(5).unwrap();
        assert_eq!(tree.remove(&42), None);
        assert_eq!(tree.len(), 1);
        tree.validate_invariants();
    }

    #[test]
    #[should_panic(expected = "`RawOrderedTree::remove()` - tree is empty!")]
    fn remove_from_empty_tree_panics() {
        let mut tree: RawOrderedTree<i64> = RawOrderedTree::new();
        let _ = tree.remove(&1);
    }

    #[test]
    #[should_panic(expected = "buffer holds 2 slots but the tree stores 3 values!")]
    fn undersized_snapshot_buffer_panics() {
        let mut tree = RawOrderedTree::new();
        for value in [1, 2, 3] {
            tree.insert(value).unwrap();
        }
        let mut out = [0; 2];
        let _ = tree.collect_ascending(&mut out);
    }

    #[test]
    fn ascending_inserts_stay_balanced() {
        let mut tree = RawOrderedTree::new();
        for value in 0..256 {
            tree.insert(value).unwrap();
            tree.validate_invariants();
        }
        // A degenerate BST would be 256 levels deep; AVL keeps it within
        // 1.44 * log2(256 + 2) ~= 11.6.
        assert!(tree.height() <= 11, "height {} exceeds the AVL bound", tree.height());
    }

    #[test]
    fn descending_inserts_stay_balanced() {
        let mut tree = RawOrderedTree::new();
        for value in (0..256).rev() {
            tree.insert(value).unwrap();
            tree.validate_invariants();
        }
        assert!(tree.height() <= 11, "height {} exceeds the AVL bound", tree.height());
    }

    #[test]
    fn clear_resets_the_tree() {
        let mut tree = RawOrderedTree::new();
        for value in [5, 3, 8] {
            tree.insert(value).unwrap();
        }
        tree.clear();
        assert!(tree.is_empty());
        assert_eq!(tree.height(), 0);
        tree.validate_invariants();
        // The tree is usable again after a clear.
        tree.insert(1).unwrap();
        assert_eq!(ascending(&tree), [1]);
    }

    #[derive(Clone, Debug)]
    enum Op {
        Insert(i64),
        Remove(i64),
        Get(i64),
    }

    fn op_strategy() -> impl Strategy<Value = Op> {
        let value = -64i64..64i64;
        prop_oneof![
            5 => value.clone().prop_map(Op::Insert),
            3 => value.clone().prop_map(Op::Remove),
            2 => value.prop_map(Op::Get),
        ]
    }

    proptest! {
        /// Replays random insert/remove/get sequences against a `BTreeSet`
        /// model, revalidating every structural invariant after each step.
        #[test]
        fn tree_matches_btreeset_model(ops in prop::collection::vec(op_strategy(), 0..512)) {
            let mut tree: RawOrderedTree<i64> = RawOrderedTree::new();
            let mut model = BTreeSet::new();

            for op in ops {
                match op {
                    Op::Insert(v) => {
                        prop_assert_eq!(tree.insert(v).is_ok(), model.insert(v), "insert({})", v);
                    }
                    Op::Remove(v) => {
                        // Removing from an empty tree is a precondition
                        // violation, not a not-found outcome.
                        if !tree.is_empty() {
                            prop_assert_eq!(tree.remove(&v), model.take(&v), "remove({})", v);
                        }
                    }
                    Op::Get(v) => {
                        prop_assert_eq!(tree.get(&v), model.get(&v), "get({})", v);
                    }
                }

                tree.validate_invariants();
                prop_assert_eq!(tree.len(), model.len());
            }

            let snapshot = ascending(&tree);
            let expected: Vec<i64> = model.iter().copied().collect();
            prop_assert_eq!(snapshot, expected, "final ascending snapshot mismatch");
        }
    }
}
