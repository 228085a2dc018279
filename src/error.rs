use thiserror::Error;

/// Returned by [`AvlTree::front`](crate::AvlTree::front) and
/// [`AvlTree::back`](crate::AvlTree::back) when the tree holds no keys.
///
/// Duplicate inserts and erasing an absent key are not errors; those report
/// `false` instead.
///
/// # Examples
///
/// ```
/// use threaded_avl::{AvlTree, Underflow};
///
/// let tree: AvlTree<u8> = AvlTree::new();
/// assert_eq!(tree.front(), Err(Underflow));
/// assert_eq!(Underflow.to_string(), "underflow: the tree is empty");
/// ```
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Error)]
#[error("underflow: the tree is empty")]
pub struct Underflow;
