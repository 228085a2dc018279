use core::num::NonZero;

#[cfg(test)]
type Repr = u16;
#[cfg(not(test))]
type Repr = u32;

/// Slot index of a tree node inside the [`Arena`](super::arena::Arena).
///
/// Stored off-by-one so that a child link (`Option<Handle>`) costs nothing
/// over the bare index.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[repr(transparent)]
pub(crate) struct Handle(NonZero<Repr>);

impl Handle {
    /// Largest slot index a handle can address.
    pub(crate) const MAX: usize = (Repr::MAX - 1) as usize;

    #[inline]
    #[allow(clippy::cast_possible_truncation)]
    pub(crate) const fn new(index: usize) -> Self {
        assert!(index <= Self::MAX, "`Handle::new()` - `index` > `Handle::MAX`!");
        match NonZero::new((index + 1) as Repr) {
            Some(raw) => Self(raw),
            None => unreachable!(),
        }
    }

    #[inline]
    pub(crate) const fn index(self) -> usize {
        (self.0.get() - 1) as usize
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use static_assertions::assert_eq_size;

    assert_eq_size!(Handle, Option<Handle>);
    assert_eq_size!(Handle, Repr);

    #[test]
    #[should_panic(expected = "`Handle::new()` - `index` > `Handle::MAX`!")]
    fn index_past_max_panics() {
        let _ = Handle::new(Handle::MAX + 1);
    }

    #[test]
    fn max_index_is_addressable() {
        assert_eq!(Handle::new(Handle::MAX).index(), Handle::MAX);
    }

    proptest! {
        #[test]
        fn index_survives_encoding(index in 0..=Handle::MAX) {
            prop_assert_eq!(Handle::new(index).index(), index);
        }
    }
}
