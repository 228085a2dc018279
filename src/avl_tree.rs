use core::borrow::Borrow;
use core::fmt;
use core::hash::{Hash, Hasher};
use core::iter::FusedIterator;

use crate::Underflow;
use crate::raw::{Position, RawAvlTree};

mod capacity;
mod chain_display;
mod cursor;

pub use chain_display::ChainDisplay;
pub use cursor::Cursor;

/// An ordered set based on an AVL tree threaded with a sorted chain.
///
/// Keys are kept in a binary search tree whose subtree heights never differ by
/// more than one, so lookups, inserts and erases take O(log n). Every node is
/// also linked to its in-order predecessor and successor, with a key-less
/// sentinel at each end of that chain. The smallest and largest keys are
/// therefore available in O(1), and both [`iter`](Self::iter) and [`Cursor`]
/// advance in O(1) per step.
///
/// Duplicate keys are rejected: [`insert`](Self::insert) returns `false` and
/// leaves the set unchanged.
///
/// It is a logic error for a key to be modified in such a way that its ordering
/// relative to any other key, as determined by the [`Ord`] trait, changes while
/// it is in the set. The behavior resulting from such a logic error is not
/// specified, but will be encapsulated to the `AvlTree` that observed it and not
/// result in undefined behavior.
///
/// # Examples
///
/// ```
/// use threaded_avl::AvlTree;
///
/// let mut books = AvlTree::new();
/// books.insert("A Dance With Dragons");
/// books.insert("To Kill a Mockingbird");
/// books.insert("The Odyssey");
///
/// if !books.contains("The Winds of Winter") {
///     println!("We have {} books, but The Winds of Winter ain't one.", books.len());
/// }
///
/// books.erase("The Odyssey");
///
/// for book in &books {
///     println!("{book}");
/// }
/// ```
///
/// An `AvlTree` with a known list of keys can be initialized from an array:
///
/// ```
/// use threaded_avl::AvlTree;
///
/// let tree = AvlTree::from([1, 2, 3]);
/// ```
pub struct AvlTree<T> {
    raw: RawAvlTree<T>,
}

/// An iterator over the keys of an `AvlTree`, following the chain.
///
/// This `struct` is created by the [`iter`] method on [`AvlTree`].
///
/// # Examples
///
/// ```
/// use threaded_avl::AvlTree;
///
/// let tree = AvlTree::from([3, 1, 2]);
/// let mut iter = tree.iter();
/// assert_eq!(iter.next(), Some(&1));
/// assert_eq!(iter.next_back(), Some(&3));
/// assert_eq!(iter.next(), Some(&2));
/// assert_eq!(iter.next(), None);
/// ```
///
/// [`iter`]: AvlTree::iter
#[must_use = "iterators are lazy and do nothing unless consumed"]
pub struct Iter<'a, T> {
    tree: &'a RawAvlTree<T>,
    front: Position,
    back: Position,
    remaining: usize,
}

/// An owning iterator over the keys of an `AvlTree` in ascending order.
///
/// This `struct` is created by the [`into_iter`] method on [`AvlTree`]
/// (provided by the [`IntoIterator`] trait).
///
/// [`into_iter`]: AvlTree#method.into_iter
pub struct IntoIter<T> {
    inner: alloc::vec::IntoIter<T>,
}

impl<T> AvlTree<T> {
    /// Makes a new, empty `AvlTree`. Both sentinels point at each other.
    ///
    /// Does not allocate anything on its own.
    ///
    /// # Examples
    ///
    /// ```
    /// use threaded_avl::AvlTree;
    ///
    /// let tree: AvlTree<i32> = AvlTree::new();
    /// assert!(tree.is_empty());
    /// assert!(tree.begin() == tree.end());
    /// ```
    #[must_use]
    pub const fn new() -> AvlTree<T> {
        AvlTree {
            raw: RawAvlTree::new(),
        }
    }

    /// Returns the number of keys in the set.
    ///
    /// # Examples
    ///
    /// ```
    /// use threaded_avl::AvlTree;
    ///
    /// let mut tree = AvlTree::new();
    /// assert_eq!(tree.len(), 0);
    /// tree.insert(1);
    /// assert_eq!(tree.len(), 1);
    /// ```
    #[must_use]
    pub const fn len(&self) -> usize {
        self.raw.len()
    }

    /// Alias for [`len`](Self::len).
    #[must_use]
    pub const fn size(&self) -> usize {
        self.raw.len()
    }

    /// Returns `true` if the set contains no keys.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.raw.is_empty()
    }

    /// Returns the height of the tree: `Some(0)` for a single key, `None` when
    /// empty.
    ///
    /// The AVL invariant bounds this by roughly `1.44 * log2(len + 2)`.
    ///
    /// # Examples
    ///
    /// ```
    /// use threaded_avl::AvlTree;
    ///
    /// let mut tree = AvlTree::new();
    /// assert_eq!(tree.height(), None);
    /// tree.extend([1, 2, 3, 4, 5]);
    /// assert_eq!(tree.height(), Some(2));
    /// ```
    ///
    /// # Complexity
    ///
    /// O(1), the height is cached on every node.
    #[must_use]
    pub fn height(&self) -> Option<usize> {
        self.raw.height()
    }

    /// Returns the smallest key.
    ///
    /// # Errors
    ///
    /// Returns [`Underflow`] if the set is empty.
    ///
    /// # Examples
    ///
    /// ```
    /// use threaded_avl::{AvlTree, Underflow};
    ///
    /// let mut tree = AvlTree::new();
    /// assert_eq!(tree.front(), Err(Underflow));
    /// tree.extend([2, 1]);
    /// assert_eq!(tree.front(), Ok(&1));
    /// ```
    ///
    /// # Complexity
    ///
    /// O(1), read through the front sentinel.
    pub fn front(&self) -> Result<&T, Underflow> {
        self.first().ok_or(Underflow)
    }

    /// Returns the largest key.
    ///
    /// # Errors
    ///
    /// Returns [`Underflow`] if the set is empty.
    ///
    /// # Complexity
    ///
    /// O(1), read through the back sentinel.
    pub fn back(&self) -> Result<&T, Underflow> {
        self.last().ok_or(Underflow)
    }

    /// Returns the smallest key, or `None` if the set is empty.
    ///
    /// # Examples
    ///
    /// ```
    /// use threaded_avl::AvlTree;
    ///
    /// let tree = AvlTree::from([3, 1, 2]);
    /// assert_eq!(tree.first(), Some(&1));
    /// ```
    #[must_use]
    pub fn first(&self) -> Option<&T> {
        self.raw.key_at(self.raw.first_position())
    }

    /// Returns the largest key, or `None` if the set is empty.
    #[must_use]
    pub fn last(&self) -> Option<&T> {
        self.raw.key_at(self.raw.last_position())
    }

    /// Removes and returns the smallest key.
    ///
    /// # Examples
    ///
    /// ```
    /// use threaded_avl::AvlTree;
    ///
    /// let mut tree = AvlTree::from([1, 2]);
    /// assert_eq!(tree.pop_first(), Some(1));
    /// assert_eq!(tree.pop_first(), Some(2));
    /// assert_eq!(tree.pop_first(), None);
    /// ```
    pub fn pop_first(&mut self) -> Option<T> {
        self.raw.pop_first()
    }

    /// Removes and returns the largest key.
    pub fn pop_last(&mut self) -> Option<T> {
        self.raw.pop_last()
    }

    /// Removes every key and relinks the two sentinels to each other.
    ///
    /// # Examples
    ///
    /// ```
    /// use threaded_avl::AvlTree;
    ///
    /// let mut tree = AvlTree::from([1, 2, 3]);
    /// tree.clear();
    /// assert!(tree.is_empty());
    /// assert!(tree.begin() == tree.end());
    /// assert!(tree.rbegin() == tree.rend());
    /// ```
    pub fn clear(&mut self) {
        self.raw.clear();
    }

    /// Gets an iterator that visits the keys in ascending order.
    ///
    /// # Examples
    ///
    /// ```
    /// use threaded_avl::AvlTree;
    ///
    /// let tree = AvlTree::from([3, 1, 2]);
    /// let keys: Vec<_> = tree.iter().copied().collect();
    /// assert_eq!(keys, [1, 2, 3]);
    /// ```
    ///
    /// # Complexity
    ///
    /// O(1) to create and O(1) per step: the iterator follows the chain.
    pub fn iter(&self) -> Iter<'_, T> {
        Iter {
            tree: &self.raw,
            front: self.raw.first_position(),
            back: self.raw.last_position(),
            remaining: self.raw.len(),
        }
    }

    /// Returns a cursor on the smallest key, or on [`end`](Self::end) when the
    /// set is empty.
    pub fn begin(&self) -> Cursor<'_, T> {
        Cursor::new(&self.raw, self.raw.first_position())
    }

    /// Returns a cursor on the back sentinel, one past the largest key.
    pub fn end(&self) -> Cursor<'_, T> {
        Cursor::new(&self.raw, Position::Back)
    }

    /// Returns a cursor on the largest key, or on [`rend`](Self::rend) when the
    /// set is empty.
    pub fn rbegin(&self) -> Cursor<'_, T> {
        Cursor::new(&self.raw, self.raw.last_position())
    }

    /// Returns a cursor on the front sentinel, one before the smallest key.
    pub fn rend(&self) -> Cursor<'_, T> {
        Cursor::new(&self.raw, Position::Front)
    }

    /// Renders the chain in both directions, sentinels included.
    ///
    /// The output is diagnostic only; its format is not stable.
    ///
    /// # Examples
    ///
    /// ```
    /// use threaded_avl::AvlTree;
    ///
    /// let tree = AvlTree::from([2, 1]);
    /// println!("{}", tree.chain_display());
    /// ```
    pub fn chain_display(&self) -> ChainDisplay<'_, T> {
        ChainDisplay::new(&self.raw)
    }
}

impl<T: Ord> AvlTree<T> {
    /// Adds a key to the set.
    ///
    /// Returns whether the key was newly inserted. An equal key already in the
    /// set is left untouched and `false` is returned.
    ///
    /// # Examples
    ///
    /// ```
    /// use threaded_avl::AvlTree;
    ///
    /// let mut tree = AvlTree::new();
    /// assert!(tree.insert(2));
    /// assert!(!tree.insert(2));
    /// assert_eq!(tree.len(), 1);
    /// ```
    ///
    /// # Complexity
    ///
    /// O(log n), with at most one rotation family applied per ancestor.
    pub fn insert(&mut self, key: T) -> bool {
        self.raw.insert(key)
    }

    /// Removes a key from the set. Returns whether the key was present.
    ///
    /// Erasing from an empty set, or erasing a key that is not present, is not
    /// an error.
    ///
    /// # Examples
    ///
    /// ```
    /// use threaded_avl::AvlTree;
    ///
    /// let mut tree = AvlTree::from([10, 20]);
    /// assert!(tree.erase(&10));
    /// assert!(!tree.erase(&10));
    /// assert_eq!(tree.front(), Ok(&20));
    /// assert_eq!(tree.back(), Ok(&20));
    /// ```
    ///
    /// # Complexity
    ///
    /// O(log n)
    pub fn erase<Q>(&mut self, key: &Q) -> bool
    where
        T: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        self.raw.erase(key).is_some()
    }

    /// Removes and returns the key equal to `key`, if any.
    ///
    /// # Examples
    ///
    /// ```
    /// use threaded_avl::AvlTree;
    ///
    /// let mut tree = AvlTree::from([1, 2, 3]);
    /// assert_eq!(tree.take(&2), Some(2));
    /// assert_eq!(tree.take(&2), None);
    /// ```
    pub fn take<Q>(&mut self, key: &Q) -> Option<T>
    where
        T: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        self.raw.erase(key)
    }

    /// Returns a cursor on the key equal to `key`, or [`end`](Self::end) if there
    /// is none.
    ///
    /// # Examples
    ///
    /// ```
    /// use threaded_avl::AvlTree;
    ///
    /// let tree = AvlTree::from([1, 3, 5]);
    /// let mut cursor = tree.find(&3);
    /// assert_eq!(cursor.get(), Some(&3));
    /// cursor.move_next();
    /// assert_eq!(cursor.get(), Some(&5));
    ///
    /// assert!(tree.find(&4) == tree.end());
    /// ```
    ///
    /// # Complexity
    ///
    /// O(log n)
    pub fn find<Q>(&self, key: &Q) -> Cursor<'_, T>
    where
        T: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        let position = self.raw.find(key).map_or(Position::Back, Position::Node);
        Cursor::new(&self.raw, position)
    }

    /// Returns `true` if the set contains a key equal to `key`.
    #[must_use]
    pub fn contains<Q>(&self, key: &Q) -> bool
    where
        T: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        self.raw.find(key).is_some()
    }

    /// Returns a reference to the stored key equal to `key`, if any.
    pub fn get<Q>(&self, key: &Q) -> Option<&T>
    where
        T: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        self.raw.key_at(Position::Node(self.raw.find(key)?))
    }
}

impl<T: Clone> Clone for AvlTree<T> {
    fn clone(&self) -> Self {
        AvlTree {
            raw: self.raw.clone(),
        }
    }
}

impl<T> Default for AvlTree<T> {
    fn default() -> Self {
        AvlTree::new()
    }
}

impl<T: PartialEq> PartialEq for AvlTree<T> {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.iter().eq(other.iter())
    }
}

impl<T: Eq> Eq for AvlTree<T> {}

impl<T: Hash> Hash for AvlTree<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_usize(self.len());
        for key in self {
            key.hash(state);
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for AvlTree<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

impl<T: Ord> FromIterator<T> for AvlTree<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut tree = AvlTree::new();
        tree.extend(iter);
        tree
    }
}

impl<T: Ord> Extend<T> for AvlTree<T> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        for key in iter {
            self.insert(key);
        }
    }
}

impl<'a, T: 'a + Ord + Copy> Extend<&'a T> for AvlTree<T> {
    fn extend<I: IntoIterator<Item = &'a T>>(&mut self, iter: I) {
        self.extend(iter.into_iter().copied());
    }
}

impl<T: Ord, const N: usize> From<[T; N]> for AvlTree<T> {
    fn from(keys: [T; N]) -> Self {
        keys.into_iter().collect()
    }
}

impl<'a, T> IntoIterator for &'a AvlTree<T> {
    type Item = &'a T;
    type IntoIter = Iter<'a, T>;

    fn into_iter(self) -> Iter<'a, T> {
        self.iter()
    }
}

impl<T> IntoIterator for AvlTree<T> {
    type Item = T;
    type IntoIter = IntoIter<T>;

    /// Gets an owning iterator over the keys, in ascending order.
    ///
    /// # Examples
    ///
    /// ```
    /// use threaded_avl::AvlTree;
    ///
    /// let tree = AvlTree::from([2, 1, 3]);
    /// let mut iter = tree.into_iter();
    /// assert_eq!(iter.next(), Some(1));
    /// assert_eq!(iter.next_back(), Some(3));
    /// ```
    fn into_iter(mut self) -> IntoIter<T> {
        IntoIter {
            inner: self.raw.drain_to_vec().into_iter(),
        }
    }
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<&'a T> {
        if self.remaining == 0 {
            return None;
        }
        let key = self.tree.key_at(self.front)?;
        self.front = self.tree.next(self.front);
        self.remaining -= 1;
        Some(key)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }

    fn last(mut self) -> Option<&'a T> {
        self.next_back()
    }
}

impl<'a, T> DoubleEndedIterator for Iter<'a, T> {
    fn next_back(&mut self) -> Option<&'a T> {
        if self.remaining == 0 {
            return None;
        }
        let key = self.tree.key_at(self.back)?;
        self.back = self.tree.prev(self.back);
        self.remaining -= 1;
        Some(key)
    }
}

impl<T> ExactSizeIterator for Iter<'_, T> {
    fn len(&self) -> usize {
        self.remaining
    }
}

impl<T> FusedIterator for Iter<'_, T> {}

impl<T> Clone for Iter<'_, T> {
    fn clone(&self) -> Self {
        Iter {
            tree: self.tree,
            front: self.front,
            back: self.back,
            remaining: self.remaining,
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for Iter<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.clone()).finish()
    }
}

impl<T> Iterator for IntoIter<T> {
    type Item = T;

    fn next(&mut self) -> Option<T> {
        self.inner.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<T> DoubleEndedIterator for IntoIter<T> {
    fn next_back(&mut self) -> Option<T> {
        self.inner.next_back()
    }
}

impl<T> ExactSizeIterator for IntoIter<T> {
    fn len(&self) -> usize {
        self.inner.len()
    }
}

impl<T> FusedIterator for IntoIter<T> {}

impl<T: fmt::Debug> fmt::Debug for IntoIter<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("IntoIter").field(&self.inner.as_slice()).finish()
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use alloc::vec::Vec;
    use proptest::prelude::*;

    #[derive(Clone, Debug)]
    enum Operation {
        Insert(i32),
        Erase(i32),
        PopFirst,
        PopLast,
        Clear,
    }

    fn operation() -> impl Strategy<Value = Operation> {
        prop_oneof![
            10 => (-200..200).prop_map(Operation::Insert),
            6 => (-200..200).prop_map(Operation::Erase),
            1 => Just(Operation::PopFirst),
            1 => Just(Operation::PopLast),
            1 => Just(Operation::Clear),
        ]
    }

    #[test]
    fn iter_meets_in_the_middle() {
        let tree = AvlTree::from([1, 2, 3, 4]);
        let mut iter = tree.iter();
        assert_eq!(iter.next(), Some(&1));
        assert_eq!(iter.next_back(), Some(&4));
        assert_eq!(iter.len(), 2);
        assert_eq!(iter.next_back(), Some(&3));
        assert_eq!(iter.next(), Some(&2));
        assert_eq!(iter.next(), None);
        assert_eq!(iter.next_back(), None);
    }

    #[test]
    fn clone_is_independent() {
        let mut original = AvlTree::from([1, 2, 3]);
        let copy = original.clone();
        original.erase(&2);
        original.raw.validate();
        copy.raw.validate();
        assert_eq!(copy.iter().copied().collect::<Vec<_>>(), [1, 2, 3]);
        assert_ne!(original, copy);
    }

    #[test]
    fn borrowed_lookup() {
        let mut tree: AvlTree<alloc::string::String> = AvlTree::new();
        tree.insert("pear".into());
        tree.insert("apple".into());
        assert!(tree.contains("pear"));
        assert_eq!(tree.get("apple").map(alloc::string::String::as_str), Some("apple"));
        assert!(tree.erase("pear"));
        assert!(!tree.contains("pear"));
    }

    proptest! {
        #[test]
        fn random_operations_keep_every_invariant(operations in prop::collection::vec(operation(), 0..300)) {
            let mut tree = AvlTree::new();
            let mut model = alloc::collections::BTreeSet::new();

            for operation in &operations {
                match *operation {
                    Operation::Insert(key) => prop_assert_eq!(tree.insert(key), model.insert(key)),
                    Operation::Erase(key) => prop_assert_eq!(tree.erase(&key), model.remove(&key)),
                    Operation::PopFirst => prop_assert_eq!(tree.pop_first(), model.pop_first()),
                    Operation::PopLast => prop_assert_eq!(tree.pop_last(), model.pop_last()),
                    Operation::Clear => {
                        tree.clear();
                        model.clear();
                    }
                }
                tree.raw.validate();
                prop_assert_eq!(tree.len(), model.len());
                prop_assert_eq!(tree.first(), model.first());
                prop_assert_eq!(tree.last(), model.last());
            }

            let forward: Vec<_> = tree.iter().copied().collect();
            let expected: Vec<_> = model.iter().copied().collect();
            prop_assert_eq!(forward, expected);
        }
    }
}
