use core::fmt;

use crate::raw::{Position, RawAvlTree};

/// Diagnostic rendering of an [`AvlTree`](crate::AvlTree)'s chain.
///
/// Prints the chain front to back on the first line and back to front on the
/// second, with the sentinels shown as `[front]` and `[back]`. Walking the links
/// in both directions makes a broken `prev` or `next` link visible.
///
/// This `struct` is created by [`AvlTree::chain_display`](crate::AvlTree::chain_display).
///
/// # Examples
///
/// ```
/// use threaded_avl::AvlTree;
///
/// let tree = AvlTree::from([2, 1, 3]);
/// assert_eq!(
///     tree.chain_display().to_string(),
///     "[front] -> 1 -> 2 -> 3 -> [back]\n[back] -> 3 -> 2 -> 1 -> [front]",
/// );
/// ```
#[must_use = "this only renders when formatted"]
pub struct ChainDisplay<'a, T> {
    tree: &'a RawAvlTree<T>,
}

impl<'a, T> ChainDisplay<'a, T> {
    pub(crate) const fn new(tree: &'a RawAvlTree<T>) -> Self {
        Self {
            tree,
        }
    }

    fn write_direction(
        &self,
        f: &mut fmt::Formatter<'_>,
        start: Position,
        step: impl Fn(&RawAvlTree<T>, Position) -> Position,
    ) -> fmt::Result
    where
        T: fmt::Display,
    {
        let mut position = step(self.tree, start);
        write!(f, "{}", Marker(start))?;
        while let Some(key) = self.tree.key_at(position) {
            write!(f, " -> {key}")?;
            position = step(self.tree, position);
        }
        write!(f, " -> {}", Marker(position))
    }
}

impl<T: fmt::Display> fmt::Display for ChainDisplay<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.write_direction(f, Position::Front, RawAvlTree::next)?;
        f.write_str("\n")?;
        self.write_direction(f, Position::Back, RawAvlTree::prev)
    }
}

struct Marker(Position);

impl fmt::Display for Marker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Position::Front => f.write_str("[front]"),
            Position::Back => f.write_str("[back]"),
            Position::Node(_) => f.write_str("[?]"),
        }
    }
}
