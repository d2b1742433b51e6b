use crate::error::InvalidDimension;
use std::fmt;

/// Mesh dimensionality.
///
/// Tensor-product tree meshes are supported in two dimensions (quadtree)
/// and three dimensions (octree).
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Ord, PartialOrd)]
#[repr(u8)]
#[allow(clippy::exhaustive_enums)] // Not gonna change any time soon.
pub enum Dimension {
    /// Two dimensions.
    Two = 2,
    /// Three dimensions.
    Three = 3,
}

impl Dimension {
    /// Number of children produced by splitting a cell (`2^d`).
    ///
    /// # Example
    ///
    /// ```
    /// use treemesh::Dimension;
    ///
    /// assert_eq!(Dimension::Two.children_per_cell(), 4);
    /// assert_eq!(Dimension::Three.children_per_cell(), 8);
    /// ```
    #[must_use]
    pub const fn children_per_cell(self) -> usize {
        1 << (self as usize)
    }

    /// Number of face directions of a cell (`2d`).
    #[must_use]
    pub const fn faces_per_cell(self) -> usize {
        2 * (self as usize)
    }
}

impl From<Dimension> for u8 {
    fn from(value: Dimension) -> Self {
        value as Self
    }
}

impl From<Dimension> for usize {
    fn from(value: Dimension) -> Self {
        value as Self
    }
}

impl TryFrom<usize> for Dimension {
    type Error = InvalidDimension;

    fn try_from(value: usize) -> Result<Self, Self::Error> {
        match value {
            2 => Ok(Self::Two),
            3 => Ok(Self::Three),
            _ => Err(Self::Error::new(value, "out of range")),
        }
    }
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", *self as u8)
    }
}
