use core::borrow::Borrow;
use core::cmp::Ordering;

use alloc::vec::Vec;
use tracing::{debug, trace};

use super::arena::Arena;
use super::handle::Handle;
use super::node::{Node, Position};

/// The AVL tree backing `AvlTree`.
///
/// Two relations live side by side over the same nodes: the search tree
/// (`left`/`right`, owning, shaped by rotations) and the in-order chain
/// (`prev`/`next`, non-owning, shaped only by key order). Structural code may
/// reshape the first freely; the second only changes when a node is spliced in
/// or unlinked.
#[derive(Clone)]
pub(crate) struct RawAvlTree<T> {
    /// Owns every real node.
    nodes: Arena<Node<T>>,
    root: Option<Handle>,
    len: usize,
    /// `next` link of the front sentinel.
    front_next: Position,
    /// `prev` link of the back sentinel.
    back_prev: Position,
}

/// A subtree after one of its keys has been removed.
struct Removal<T> {
    /// Root to install in the parent's slot.
    root: Option<Handle>,
    key: T,
}

impl<T> RawAvlTree<T> {
    pub(crate) const fn new() -> Self {
        Self {
            nodes: Arena::new(),
            root: None,
            len: 0,
            front_next: Position::Back,
            back_prev: Position::Front,
        }
    }

    pub(crate) fn with_capacity(capacity: usize) -> Self {
        Self {
            nodes: Arena::with_capacity(capacity),
            ..Self::new()
        }
    }

    pub(crate) fn capacity(&self) -> usize {
        self.nodes.capacity()
    }

    pub(crate) const fn len(&self) -> usize {
        self.len
    }

    pub(crate) const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Height of the root, `None` for an empty tree.
    pub(crate) fn height(&self) -> Option<usize> {
        self.root.map(|root| usize::from(self.nodes.get(root).height().unsigned_abs()))
    }

    /// Position of the minimum, or the back sentinel when empty.
    pub(crate) const fn first_position(&self) -> Position {
        self.front_next
    }

    /// Position of the maximum, or the front sentinel when empty.
    pub(crate) const fn last_position(&self) -> Position {
        self.back_prev
    }

    /// Successor on the chain. The back sentinel is its own successor.
    pub(crate) fn next(&self, position: Position) -> Position {
        match position {
            Position::Front => self.front_next,
            Position::Node(handle) => self.nodes.get(handle).next,
            Position::Back => Position::Back,
        }
    }

    /// Predecessor on the chain. The front sentinel is its own predecessor.
    pub(crate) fn prev(&self, position: Position) -> Position {
        match position {
            Position::Front => Position::Front,
            Position::Node(handle) => self.nodes.get(handle).prev,
            Position::Back => self.back_prev,
        }
    }

    pub(crate) fn key_at(&self, position: Position) -> Option<&T> {
        match position {
            Position::Node(handle) => Some(self.nodes.get(handle).key()),
            Position::Front | Position::Back => None,
        }
    }

    /// Drops every node and relinks the sentinels to each other.
    pub(crate) fn clear(&mut self) {
        let released = self.len;
        self.nodes.clear();
        self.root = None;
        self.len = 0;
        self.front_next = Position::Back;
        self.back_prev = Position::Front;
        debug!(released, "cleared tree");
    }

    /// Moves every key out in ascending order, leaving the tree empty.
    pub(crate) fn drain_to_vec(&mut self) -> Vec<T> {
        let mut keys = Vec::with_capacity(self.len);
        let mut position = self.front_next;
        while let Position::Node(handle) = position {
            let node = self.nodes.release(handle);
            position = node.next;
            keys.push(node.into_key());
        }
        self.clear();
        keys
    }

    pub(crate) fn pop_first(&mut self) -> Option<T> {
        let (root, key) = self.take_front(self.root?);
        self.root = root;
        self.len -= 1;
        Some(key)
    }

    pub(crate) fn pop_last(&mut self) -> Option<T> {
        let (root, key) = self.take_back(self.root?);
        self.root = root;
        self.len -= 1;
        Some(key)
    }

    /// Leftmost node of the subtree at `handle`.
    fn front_of(&self, mut handle: Handle) -> Handle {
        while let Some(left) = self.nodes.get(handle).left {
            handle = left;
        }
        handle
    }

    /// Rightmost node of the subtree at `handle`.
    fn back_of(&self, mut handle: Handle) -> Handle {
        while let Some(right) = self.nodes.get(handle).right {
            handle = right;
        }
        handle
    }

    /// The sentinels must always point at the extremes of the search tree, and
    /// every live slot must belong to it.
    fn debug_assert_consistent(&self) {
        debug_assert_eq!(self.nodes.len(), self.len);
        debug_assert_eq!(self.front_next, self.root.map_or(Position::Back, |root| Position::Node(self.front_of(root))));
        debug_assert_eq!(self.back_prev, self.root.map_or(Position::Front, |root| Position::Node(self.back_of(root))));
    }

    // ─── Chain maintenance ──────────────────────────────────────────────────

    fn set_next(&mut self, position: Position, next: Position) {
        match position {
            Position::Front => self.front_next = next,
            Position::Node(handle) => self.nodes.get_mut(handle).next = next,
            Position::Back => unreachable!("`RawAvlTree::set_next()` - the back sentinel has no successor"),
        }
    }

    fn set_prev(&mut self, position: Position, prev: Position) {
        match position {
            Position::Back => self.back_prev = prev,
            Position::Node(handle) => self.nodes.get_mut(handle).prev = prev,
            Position::Front => unreachable!("`RawAvlTree::set_prev()` - the front sentinel has no predecessor"),
        }
    }

    /// Allocates `key` and splices it into the chain immediately before `at`.
    fn splice_before(&mut self, at: Handle, key: T) -> Handle {
        let prev = self.nodes.get(at).prev;
        let handle = self.nodes.alloc(Node::new(key, prev, Position::Node(at)));
        self.set_next(prev, Position::Node(handle));
        self.nodes.get_mut(at).prev = Position::Node(handle);
        handle
    }

    /// Allocates `key` and splices it into the chain immediately after `at`.
    fn splice_after(&mut self, at: Handle, key: T) -> Handle {
        let next = self.nodes.get(at).next;
        let handle = self.nodes.alloc(Node::new(key, Position::Node(at), next));
        self.set_prev(next, Position::Node(handle));
        self.nodes.get_mut(at).next = Position::Node(handle);
        handle
    }

    /// Joins the chain neighbours of `handle` and frees the node.
    fn unlink(&mut self, handle: Handle) -> T {
        let node = self.nodes.release(handle);
        self.set_next(node.prev, node.next);
        self.set_prev(node.next, node.prev);
        node.into_key()
    }

    // ─── Heights and rotations ──────────────────────────────────────────────

    /// Height of a child slot; an absent subtree is `-1`.
    fn height_of(&self, link: Option<Handle>) -> i8 {
        link.map_or(-1, |handle| self.nodes.get(handle).height())
    }

    fn update_height(&mut self, handle: Handle) {
        let node = self.nodes.get(handle);
        let height = 1 + self.height_of(node.left).max(self.height_of(node.right));
        self.nodes.get_mut(handle).set_height(height);
    }

    fn rotate_right(&mut self, handle: Handle) -> Handle {
        let pivot = self.nodes.get(handle).left.expect("`RawAvlTree::rotate_right()` - missing left child");
        let inner = self.nodes.get(pivot).right;
        self.nodes.get_mut(handle).left = inner;
        self.nodes.get_mut(pivot).right = Some(handle);
        self.update_height(handle);
        self.update_height(pivot);
        pivot
    }

    fn rotate_left(&mut self, handle: Handle) -> Handle {
        let pivot = self.nodes.get(handle).right.expect("`RawAvlTree::rotate_left()` - missing right child");
        let inner = self.nodes.get(pivot).left;
        self.nodes.get_mut(handle).right = inner;
        self.nodes.get_mut(pivot).left = Some(handle);
        self.update_height(handle);
        self.update_height(pivot);
        pivot
    }

    /// Restores balance at `handle` when its left side may be two taller than
    /// its right. Returns the root to install in the parent's slot.
    fn balance_left(&mut self, handle: Handle) -> Handle {
        let node = self.nodes.get(handle);
        let (left, right) = (node.left, node.right);
        match left {
            Some(child) if self.height_of(left) - self.height_of(right) > 1 => {
                let child_node = self.nodes.get(child);
                let (outer, inner) = (child_node.left, child_node.right);
                if self.height_of(outer) >= self.height_of(inner) {
                    trace!(rotation = "right", height = self.height_of(left), "rebalancing left-heavy subtree");
                    self.rotate_right(handle)
                } else {
                    trace!(rotation = "left-right", height = self.height_of(left), "rebalancing left-heavy subtree");
                    let pivot = self.rotate_left(child);
                    self.nodes.get_mut(handle).left = Some(pivot);
                    self.rotate_right(handle)
                }
            }
            _ => {
                self.update_height(handle);
                handle
            }
        }
    }

    /// Mirror of [`balance_left`](Self::balance_left).
    fn balance_right(&mut self, handle: Handle) -> Handle {
        let node = self.nodes.get(handle);
        let (left, right) = (node.left, node.right);
        match right {
            Some(child) if self.height_of(right) - self.height_of(left) > 1 => {
                let child_node = self.nodes.get(child);
                let (inner, outer) = (child_node.left, child_node.right);
                if self.height_of(outer) >= self.height_of(inner) {
                    trace!(rotation = "left", height = self.height_of(right), "rebalancing right-heavy subtree");
                    self.rotate_left(handle)
                } else {
                    trace!(rotation = "right-left", height = self.height_of(right), "rebalancing right-heavy subtree");
                    let pivot = self.rotate_right(child);
                    self.nodes.get_mut(handle).right = Some(pivot);
                    self.rotate_left(handle)
                }
            }
            _ => {
                self.update_height(handle);
                handle
            }
        }
    }

    // ─── Removal of extremes ────────────────────────────────────────────────

    /// Removes the minimum of the subtree at `handle`.
    /// Returns the new subtree root and the removed key.
    fn take_front(&mut self, handle: Handle) -> (Option<Handle>, T) {
        let node = self.nodes.get(handle);
        let (left, right) = (node.left, node.right);
        match left {
            None => (right, self.unlink(handle)),
            Some(left) => {
                let (left, key) = self.take_front(left);
                self.nodes.get_mut(handle).left = left;
                (Some(self.balance_right(handle)), key)
            }
        }
    }

    /// Removes the maximum of the subtree at `handle`.
    fn take_back(&mut self, handle: Handle) -> (Option<Handle>, T) {
        let node = self.nodes.get(handle);
        let (left, right) = (node.left, node.right);
        match right {
            None => (left, self.unlink(handle)),
            Some(right) => {
                let (right, key) = self.take_back(right);
                self.nodes.get_mut(handle).right = right;
                (Some(self.balance_left(handle)), key)
            }
        }
    }
}

impl<T: Ord> RawAvlTree<T> {
    pub(crate) fn find<Q>(&self, key: &Q) -> Option<Handle>
    where
        T: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        let mut link = self.root;
        while let Some(handle) = link {
            let node = self.nodes.get(handle);
            link = match key.cmp(node.key().borrow()) {
                Ordering::Less => node.left,
                Ordering::Greater => node.right,
                Ordering::Equal => return Some(handle),
            };
        }
        None
    }

    /// Inserts `key`. Returns `false`, leaving the tree untouched, if an equal
    /// key is already present.
    pub(crate) fn insert(&mut self, key: T) -> bool {
        let Some(root) = self.root else {
            let handle = self.nodes.alloc(Node::new(key, Position::Front, Position::Back));
            self.root = Some(handle);
            self.front_next = Position::Node(handle);
            self.back_prev = Position::Node(handle);
            self.len = 1;
            return true;
        };

        let Some(root) = self.insert_at(root, key) else {
            return false;
        };
        self.root = Some(root);
        self.len += 1;
        self.debug_assert_consistent();
        true
    }

    /// Removes the key equal to `key` and hands it back.
    pub(crate) fn erase<Q>(&mut self, key: &Q) -> Option<T>
    where
        T: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        let removal = self.erase_at(self.root?, key)?;
        self.root = removal.root;
        self.len -= 1;
        self.debug_assert_consistent();
        Some(removal.key)
    }

    /// Inserts into the subtree at `handle`.
    /// Returns the root to install in its place, or `None` on a duplicate.
    fn insert_at(&mut self, handle: Handle, key: T) -> Option<Handle> {
        let node = self.nodes.get(handle);
        let (left, right) = (node.left, node.right);
        match key.cmp(node.key()) {
            Ordering::Equal => None,
            Ordering::Less => {
                let left = match left {
                    None => self.splice_before(handle, key),
                    Some(left) => self.insert_at(left, key)?,
                };
                self.nodes.get_mut(handle).left = Some(left);
                Some(self.balance_left(handle))
            }
            Ordering::Greater => {
                let right = match right {
                    None => self.splice_after(handle, key),
                    Some(right) => self.insert_at(right, key)?,
                };
                self.nodes.get_mut(handle).right = Some(right);
                Some(self.balance_right(handle))
            }
        }
    }

    /// Erases from the subtree at `handle`; `None` if the key is absent.
    fn erase_at<Q>(&mut self, handle: Handle, key: &Q) -> Option<Removal<T>>
    where
        T: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        let node = self.nodes.get(handle);
        let (left, right) = (node.left, node.right);
        match key.cmp(node.key().borrow()) {
            Ordering::Less => {
                let removal = self.erase_at(left?, key)?;
                self.nodes.get_mut(handle).left = removal.root;
                Some(Removal {
                    root: Some(self.balance_right(handle)),
                    key: removal.key,
                })
            }
            Ordering::Greater => {
                let removal = self.erase_at(right?, key)?;
                self.nodes.get_mut(handle).right = removal.root;
                Some(Removal {
                    root: Some(self.balance_left(handle)),
                    key: removal.key,
                })
            }
            Ordering::Equal => Some(self.remove_node(handle)),
        }
    }

    /// Removes the node at `handle` from the tree and the chain.
    fn remove_node(&mut self, handle: Handle) -> Removal<T> {
        let node = self.nodes.get(handle);
        match (node.left, node.right) {
            (Some(_), Some(right)) => {
                // The in-order successor is this node's chain neighbour, so
                // moving its key here and unlinking it keeps the chain sorted.
                let (right, successor) = self.take_front(right);
                let node = self.nodes.get_mut(handle);
                node.right = right;
                let key = node.replace_key(successor);
                Removal {
                    root: Some(self.balance_left(handle)),
                    key,
                }
            }
            (child, None) | (None, child) => Removal {
                root: child,
                key: self.unlink(handle),
            },
        }
    }
}

#[cfg(test)]
impl<T: Ord> RawAvlTree<T> {
    /// Panics unless every structural invariant holds.
    pub(crate) fn validate(&self) {
        let mut in_order = Vec::new();
        let height = self.validate_subtree(self.root, &mut in_order);
        assert_eq!(self.height(), usize::try_from(height).ok(), "root height");
        assert_eq!(in_order.len(), self.len, "len disagrees with the tree");
        assert_eq!(self.nodes.len(), self.len, "arena holds unreachable nodes");
        assert!(
            in_order.windows(2).all(|pair| self.nodes.get(pair[0]).key() < self.nodes.get(pair[1]).key()),
            "search order violated"
        );

        let mut forward = Vec::new();
        let (mut position, mut behind) = (self.front_next, Position::Front);
        while let Position::Node(handle) = position {
            assert_eq!(self.nodes.get(handle).prev, behind, "broken prev link");
            forward.push(handle);
            behind = position;
            position = self.nodes.get(handle).next;
        }
        assert_eq!(position, Position::Back, "forward chain must end at the back sentinel");
        assert_eq!(self.back_prev, behind, "back sentinel is not anchored to the maximum");
        assert_eq!(forward, in_order, "chain order differs from tree order");

        let mut backward = Vec::new();
        let mut position = self.back_prev;
        while let Position::Node(handle) = position {
            backward.push(handle);
            position = self.nodes.get(handle).prev;
        }
        assert_eq!(position, Position::Front, "backward chain must end at the front sentinel");
        backward.reverse();
        assert_eq!(backward, in_order, "backward chain differs from tree order");
    }

    fn validate_subtree(&self, link: Option<Handle>, in_order: &mut Vec<Handle>) -> i8 {
        let Some(handle) = link else {
            return -1;
        };
        let node = self.nodes.get(handle);
        let left = self.validate_subtree(node.left, in_order);
        in_order.push(handle);
        let right = self.validate_subtree(node.right, in_order);
        assert!((left - right).abs() <= 1, "AVL balance violated");
        assert_eq!(node.height(), 1 + left.max(right), "stale cached height");
        assert_eq!(node.is_leaf(), node.height() == 0);
        node.height()
    }

    fn keys(&self) -> Vec<&T> {
        let mut keys = Vec::new();
        let mut position = self.front_next;
        while let Some(key) = self.key_at(position) {
            keys.push(key);
            position = self.next(position);
        }
        keys
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use alloc::vec;
    use proptest::prelude::*;

    fn tree_of(keys: &[i32]) -> RawAvlTree<i32> {
        let mut tree = RawAvlTree::new();
        for &key in keys {
            assert!(tree.insert(key));
            tree.validate();
        }
        tree
    }

    fn root_key(tree: &RawAvlTree<i32>) -> i32 {
        *tree.nodes.get(tree.root.expect("tree is non-empty")).key()
    }

    #[test]
    fn empty_tree_links_sentinels() {
        let tree: RawAvlTree<i32> = RawAvlTree::new();
        assert_eq!(tree.first_position(), Position::Back);
        assert_eq!(tree.last_position(), Position::Front);
        assert_eq!(tree.height(), None);
        tree.validate();
    }

    #[test]
    fn single_rotations_fix_straight_runs() {
        let ascending = tree_of(&[1, 2, 3]);
        assert_eq!(root_key(&ascending), 2);
        assert_eq!(ascending.height(), Some(1));

        let descending = tree_of(&[3, 2, 1]);
        assert_eq!(root_key(&descending), 2);
        assert_eq!(descending.height(), Some(1));
    }

    #[test]
    fn double_rotations_fix_zig_zags() {
        let left_right = tree_of(&[3, 1, 2]);
        assert_eq!(root_key(&left_right), 2);
        assert_eq!(left_right.keys(), vec![&1, &2, &3]);

        let right_left = tree_of(&[1, 3, 2]);
        assert_eq!(root_key(&right_left), 2);
        assert_eq!(right_left.keys(), vec![&1, &2, &3]);
    }

    #[test]
    fn ascending_five_stays_at_height_two() {
        let tree = tree_of(&[1, 2, 3, 4, 5]);
        assert_eq!(tree.height(), Some(2));
        assert_eq!(tree.keys(), vec![&1, &2, &3, &4, &5]);
    }

    #[test]
    fn duplicate_leaves_tree_untouched() {
        let mut tree = tree_of(&[2, 1, 3]);
        assert!(!tree.insert(1));
        assert_eq!(tree.len(), 3);
        tree.validate();
    }

    #[test]
    fn erase_rotates_when_sibling_grandchildren_are_even() {
        // Removing 1 leaves 2 with an empty left side and a right child whose
        // two subtrees have equal height.
        let mut tree = tree_of(&[2, 1, 4, 3, 5]);
        assert_eq!(tree.erase(&1), Some(1));
        tree.validate();
        assert_eq!(root_key(&tree), 4);
        assert_eq!(tree.keys(), vec![&2, &3, &4, &5]);

        let mut mirrored = tree_of(&[4, 5, 2, 1, 3]);
        assert_eq!(mirrored.erase(&5), Some(5));
        mirrored.validate();
        assert_eq!(root_key(&mirrored), 2);
    }

    #[test]
    fn erase_with_two_children_takes_successor_key() {
        let mut tree = tree_of(&[5, 3, 8, 1, 4, 7, 9]);
        let root = tree.root.expect("tree is non-empty");
        assert_eq!(tree.erase(&5), Some(5));
        tree.validate();
        // The root node survives and now carries the successor.
        assert_eq!(tree.root, Some(root));
        assert_eq!(root_key(&tree), 7);
        assert_eq!(tree.keys(), vec![&1, &3, &4, &7, &8, &9]);
    }

    #[test]
    fn erase_missing_key_is_rejected() {
        let mut tree = tree_of(&[2, 1, 3]);
        assert_eq!(tree.erase(&7), None);
        assert_eq!(tree.len(), 3);

        let mut empty: RawAvlTree<i32> = RawAvlTree::new();
        assert_eq!(empty.erase(&7), None);
        assert!(empty.is_empty());
    }

    #[test]
    fn erasing_everything_relinks_sentinels() {
        let mut tree = tree_of(&[10, 20]);
        assert_eq!(tree.erase(&10), Some(10));
        assert_eq!(tree.key_at(tree.first_position()), Some(&20));
        assert_eq!(tree.key_at(tree.last_position()), Some(&20));
        assert_eq!(tree.erase(&20), Some(20));
        assert_eq!(tree.first_position(), Position::Back);
        assert_eq!(tree.last_position(), Position::Front);
        tree.validate();
    }

    #[test]
    fn pops_walk_inwards() {
        let mut tree = tree_of(&[4, 2, 6, 1, 3, 5, 7]);
        assert_eq!(tree.pop_first(), Some(1));
        assert_eq!(tree.pop_last(), Some(7));
        tree.validate();
        assert_eq!(tree.keys(), vec![&2, &3, &4, &5, &6]);
    }

    #[test]
    fn drain_yields_sorted_keys_and_empties() {
        let mut tree = tree_of(&[3, 1, 2]);
        assert_eq!(tree.drain_to_vec(), vec![1, 2, 3]);
        assert!(tree.is_empty());
        tree.validate();
        assert!(tree.insert(9));
        tree.validate();
    }

    #[test]
    fn sentinels_are_their_own_outer_neighbours() {
        let tree = tree_of(&[1]);
        assert_eq!(tree.next(Position::Back), Position::Back);
        assert_eq!(tree.prev(Position::Front), Position::Front);
        assert_eq!(tree.key_at(tree.next(Position::Front)), Some(&1));
        assert_eq!(tree.key_at(tree.prev(Position::Back)), Some(&1));
    }

    proptest! {
        #[test]
        fn invariants_hold_after_every_step(operations in prop::collection::vec((any::<bool>(), 0_i16..64), 0..400)) {
            let mut tree = RawAvlTree::new();
            let mut model = alloc::collections::BTreeSet::new();
            for (is_insert, key) in operations {
                if is_insert {
                    prop_assert_eq!(tree.insert(key), model.insert(key));
                } else {
                    prop_assert_eq!(tree.erase(&key), model.take(&key));
                }
                tree.validate();
                prop_assert!(tree.keys().into_iter().eq(model.iter()));
            }
        }

        #[test]
        fn height_is_logarithmic(count in 1_usize..2_000) {
            let mut tree = RawAvlTree::new();
            for key in 0..count {
                tree.insert(key);
            }
            tree.validate();
            // Integer relaxation of the AVL bound h < 1.4405 * log2(n + 2).
            let bound = (count + 2).ilog2() as usize * 3 / 2 + 2;
            prop_assert!(tree.height().unwrap_or(0) <= bound);
        }
    }
}
