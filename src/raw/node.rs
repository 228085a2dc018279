use super::handle::Handle;

/// A place on the in-order chain.
///
/// The two sentinels are key-less and never take part in the search tree; they
/// only anchor the ends of the chain so that "before the first" and "after the
/// last" are always valid positions.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) enum Position {
    /// The front sentinel, one before the minimum.
    Front,
    Node(Handle),
    /// The back sentinel, one past the maximum.
    Back,
}

/// A stored key.
///
/// `left`/`right` own their subtrees (through the arena). `prev`/`next` thread
/// the node into the sorted chain and own nothing.
#[derive(Clone)]
pub(crate) struct Node<T> {
    key: T,
    // Cached subtree height: 0 for a leaf.
    height: i8,
    pub(crate) left: Option<Handle>,
    pub(crate) right: Option<Handle>,
    pub(crate) prev: Position,
    pub(crate) next: Position,
}

impl<T> Node<T> {
    /// Creates a leaf spliced between `prev` and `next`.
    pub(crate) const fn new(key: T, prev: Position, next: Position) -> Self {
        Self {
            key,
            height: 0,
            left: None,
            right: None,
            prev,
            next,
        }
    }

    #[inline]
    pub(crate) const fn key(&self) -> &T {
        &self.key
    }

    /// Swaps in a new key, returning the old one.
    pub(crate) fn replace_key(&mut self, key: T) -> T {
        core::mem::replace(&mut self.key, key)
    }

    pub(crate) fn into_key(self) -> T {
        self.key
    }

    #[inline]
    pub(crate) const fn height(&self) -> i8 {
        self.height
    }

    pub(crate) fn set_height(&mut self, height: i8) {
        debug_assert!(height >= 0, "real nodes have a non-negative height");
        self.height = height;
    }

    #[cfg(test)]
    pub(crate) const fn is_leaf(&self) -> bool {
        self.left.is_none() && self.right.is_none()
    }
}
