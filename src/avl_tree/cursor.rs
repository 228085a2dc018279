use core::fmt;
use core::ptr;

use crate::raw::{Position, RawAvlTree};

/// A position on the sorted chain of an [`AvlTree`](crate::AvlTree).
///
/// A cursor stands either on a key or on one of the two sentinels:
/// [`rend`](crate::AvlTree::rend) (one before the smallest key) and
/// [`end`](crate::AvlTree::end) (one past the largest). Both sentinels are
/// absorbing in their outward direction, so moving past either end is a no-op
/// rather than an error.
///
/// Cursors borrow the tree, so the tree cannot be modified while one is alive.
///
/// # Examples
///
/// ```
/// use threaded_avl::AvlTree;
///
/// let tree = AvlTree::from([1, 2]);
///
/// let mut cursor = tree.rbegin();
/// assert_eq!(cursor.get(), Some(&2));
/// cursor.move_prev();
/// cursor.move_prev();
/// assert!(cursor.is_rend());
/// cursor.move_prev();
/// assert!(cursor == tree.rend());
///
/// cursor.move_next();
/// assert_eq!(cursor.get(), Some(&1));
/// ```
pub struct Cursor<'a, T> {
    tree: &'a RawAvlTree<T>,
    position: Position,
}

impl<'a, T> Cursor<'a, T> {
    pub(crate) const fn new(tree: &'a RawAvlTree<T>, position: Position) -> Self {
        Self {
            tree,
            position,
        }
    }

    /// Returns the key under the cursor, or `None` on a sentinel.
    #[must_use]
    pub fn get(&self) -> Option<&'a T> {
        self.tree.key_at(self.position)
    }

    /// Steps to the next larger key, or onto `end()` after the largest.
    /// Stays put when already at `end()`.
    pub fn move_next(&mut self) {
        self.position = self.tree.next(self.position);
    }

    /// Steps to the next smaller key, or onto `rend()` before the smallest.
    /// Stays put when already at `rend()`.
    pub fn move_prev(&mut self) {
        self.position = self.tree.prev(self.position);
    }

    /// Returns the key [`move_next`](Self::move_next) would land on.
    #[must_use]
    pub fn peek_next(&self) -> Option<&'a T> {
        self.tree.key_at(self.tree.next(self.position))
    }

    /// Returns the key [`move_prev`](Self::move_prev) would land on.
    #[must_use]
    pub fn peek_prev(&self) -> Option<&'a T> {
        self.tree.key_at(self.tree.prev(self.position))
    }

    /// Returns `true` on the back sentinel.
    #[must_use]
    pub fn is_end(&self) -> bool {
        self.position == Position::Back
    }

    /// Returns `true` on the front sentinel.
    #[must_use]
    pub fn is_rend(&self) -> bool {
        self.position == Position::Front
    }
}

impl<T> Clone for Cursor<'_, T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Cursor<'_, T> {}

/// Two cursors are equal when they stand on the same node, or the same
/// sentinel, of the same tree.
impl<T> PartialEq for Cursor<'_, T> {
    fn eq(&self, other: &Self) -> bool {
        ptr::eq(self.tree, other.tree) && self.position == other.position
    }
}

impl<T> Eq for Cursor<'_, T> {}

impl<T: fmt::Debug> fmt::Debug for Cursor<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.get() {
            Some(key) => f.debug_tuple("Cursor").field(key).finish(),
            None if self.is_end() => f.write_str("Cursor(end)"),
            None => f.write_str("Cursor(rend)"),
        }
    }
}
