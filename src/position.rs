//! Node addressing in an implicit perfect binary Merkle tree.
//!
//! A node is addressed by `(height, index)`: height 0 is the leaf level and
//! `index` counts nodes left to right within a level. Navigation is pure bit
//! arithmetic on the index. Cases that would wrap around (children of a leaf,
//! a child index past `u64::MAX`, a parent above `u64::MAX`) are reported as
//! [`PositionError`]s.

use core::fmt;
use core::str::FromStr;

use crate::errors::PositionError;

/// Address of a node in a perfect binary tree.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Position {
    pub height: u64,
    pub index: u64,
}

impl Position {
    #[must_use]
    pub const fn new(height: u64, index: u64) -> Self {
        Self { height, index }
    }

    /// Leaf `index` at height 0.
    #[must_use]
    pub const fn leaf(index: u64) -> Self {
        Self { height: 0, index }
    }

    /// Root of a tree with `tree_height` levels above the leaves.
    #[must_use]
    pub const fn root(tree_height: u64) -> Self {
        Self { height: tree_height, index: 0 }
    }

    /// Same level, neighbouring index (`index ^ 1`).
    #[must_use]
    pub const fn sibling(self) -> Self {
        Self { height: self.height, index: self.index ^ 1 }
    }

    /// `(height + 1, index >> 1)`.
    pub const fn parent(self) -> Result<Self, PositionError> {
        match self.height.checked_add(1) {
            Some(height) => Ok(Self { height, index: self.index >> 1 }),
            None => Err(PositionError::HeightOverflow { height: self.height, index: self.index }),
        }
    }

    /// `(height - 1, index << 1)`.
    ///
    /// # Errors
    ///
    /// [`PositionError::LeafHasNoChildren`] at height 0, and
    /// [`PositionError::IndexOverflow`] when the top bit of `index` is set.
    pub const fn left_child(self) -> Result<Self, PositionError> {
        if self.height == 0 {
            return Err(PositionError::LeafHasNoChildren { height: self.height, index: self.index });
        }
        if self.index > (u64::MAX >> 1) {
            return Err(PositionError::IndexOverflow { height: self.height, index: self.index });
        }
        Ok(Self { height: self.height - 1, index: self.index << 1 })
    }

    pub fn right_child(self) -> Result<Self, PositionError> {
        self.left_child().map(Self::sibling)
    }

    /// Both children, left first.
    pub fn children(self) -> Result<(Self, Self), PositionError> {
        let left = self.left_child()?;
        Ok((left, left.sibling()))
    }

    #[must_use]
    pub const fn is_right_sibling(self) -> bool {
        self.index % 2 == 1
    }

    #[must_use]
    pub const fn is_leaf(self) -> bool {
        self.height == 0
    }

    /// True when the path from `descendant` up to the root passes through `self`.
    ///
    /// A node is its own ancestor. Height deltas of 64 or more shift every
    /// index down to 0.
    #[must_use]
    pub fn is_ancestor_of(self, descendant: Self) -> bool {
        if self.height < descendant.height {
            return false;
        }
        let delta = self.height - descendant.height;
        let shifted = u32::try_from(delta)
            .ok()
            .and_then(|d| descendant.index.checked_shr(d))
            .unwrap_or(0);
        self.index == shifted
    }

    /// True when the index fits the level in a tree of `tree_height`.
    #[must_use]
    pub fn is_within(self, tree_height: u64) -> bool {
        if self.height > tree_height {
            return false;
        }
        let width_log2 = tree_height - self.height;
        u32::try_from(width_log2)
            .ok()
            .and_then(|w| 1u64.checked_shl(w))
            .is_none_or(|width| self.index < width)
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.height, self.index)
    }
}

impl FromStr for Position {
    type Err = PositionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_node(s)
    }
}

fn parse_field(input: &str, field: &str) -> Result<u64, PositionError> {
    let malformed = |reason| PositionError::Parse { input: input.to_owned(), reason };
    if field.is_empty() {
        return Err(malformed("empty field"));
    }
    if !field.bytes().all(|b| b.is_ascii_digit()) {
        return Err(malformed("field is not an unsigned decimal integer"));
    }
    field.parse::<u64>().map_err(|_| malformed("field out of range for u64"))
}

/// Parse a node address of the form `height:index`.
///
/// # Errors
///
/// [`PositionError::Parse`] unless the text splits on `:` into exactly two
/// unsigned decimal integers.
pub fn parse_node(text: &str) -> Result<Position, PositionError> {
    let mut parts = text.split(':');
    let (Some(height), Some(index), None) = (parts.next(), parts.next(), parts.next()) else {
        return Err(PositionError::Parse {
            input: text.to_owned(),
            reason: "expected height:index",
        });
    };
    Ok(Position { height: parse_field(text, height)?, index: parse_field(text, index)? })
}

/// Levels above the leaves in the smallest perfect tree holding `leaf_count` leaves.
#[must_use]
pub const fn tree_height(leaf_count: u64) -> u64 {
    if leaf_count <= 1 {
        0
    } else {
        (u64::BITS - (leaf_count - 1).leading_zeros()) as u64
    }
}
