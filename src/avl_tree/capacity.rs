use super::AvlTree;
use crate::raw::RawAvlTree;

impl<T> AvlTree<T> {
    /// Creates an empty tree with node storage for at least `capacity` keys.
    ///
    /// # Examples
    ///
    /// ```
    /// use threaded_avl::AvlTree;
    ///
    /// let tree: AvlTree<i32> = AvlTree::with_capacity(16);
    /// assert!(tree.is_empty());
    /// assert!(tree.capacity() >= 16);
    /// ```
    ///
    /// # Complexity
    ///
    /// O(capacity) for memory allocation.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        AvlTree {
            raw: RawAvlTree::with_capacity(capacity),
        }
    }

    /// Returns how many keys the tree can hold before its node storage grows.
    ///
    /// Slots freed by erased keys are reused before the storage grows.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.raw.capacity()
    }
}
