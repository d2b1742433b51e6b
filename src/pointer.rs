use crate::{Axis, Dimension, Side};

/// Addresses a cell by its minimum corner and refinement level.
///
/// Coordinates are expressed in finest-level units: a cell at level `l` in
/// a mesh with `L` levels spans `2^(L - l)` units along every axis and its
/// coordinates are aligned to multiples of that width. The z coordinate is
/// always zero in two dimensions.
///
/// Pointers are validated against a specific mesh; obtain one through
/// [`TreeMesh::pointer`](crate::TreeMesh::pointer) or
/// [`TreeMesh::cell_pointer`](crate::TreeMesh::cell_pointer).
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub struct Pointer {
    coords: [u32; 3],
    level: u8,
}

impl Pointer {
    pub(crate) const fn new_unchecked(coords: [u32; 3], level: u8) -> Self {
        Self { coords, level }
    }

    /// Cell coordinates, in finest-level units.
    #[must_use]
    pub const fn coords(&self) -> [u32; 3] {
        self.coords
    }

    /// Coordinate along one axis, in finest-level units.
    #[must_use]
    pub const fn coord(&self, axis: Axis) -> u32 {
        self.coords[axis.index()]
    }

    /// Refinement level of the cell (0 is the root).
    #[must_use]
    pub const fn level(&self) -> u8 {
        self.level
    }

    /// Pointer to the parent cell.
    ///
    /// Coordinates snap down to the parent alignment:
    /// `c - (c mod 2^(L - l + 1))`.
    pub(crate) fn parent(&self, levels: u8) -> Self {
        debug_assert!(self.level > 0, "the root cell has no parent");
        let width = 1_u32 << (levels - self.level + 1);
        let mut coords = self.coords;
        for coord in &mut coords {
            *coord -= *coord % width;
        }
        Self { coords, level: self.level - 1 }
    }

    /// Child pointers, in Morton order (x varies fastest).
    pub(crate) fn children(
        &self,
        dim: Dimension,
        levels: u8,
    ) -> impl Iterator<Item = Self> {
        debug_assert!(self.level < levels, "cell is already at the finest level");
        let half = 1_u32 << (levels - self.level - 1);
        let base = self.coords;
        let level = self.level + 1;

        (0..dim.children_per_cell()).map(move |child| {
            let mut coords = base;
            for (bit, coord) in
                coords.iter_mut().enumerate().take(usize::from(dim))
            {
                if child >> bit & 1 == 1 {
                    *coord += half;
                }
            }
            Self { coords, level }
        })
    }

    /// Same pointer at another level (coordinates untouched).
    pub(crate) const fn at_level(&self, level: u8) -> Self {
        Self { coords: self.coords, level }
    }

    /// Pointer translated by `offset` units along `axis`.
    pub(crate) const fn translated(&self, axis: Axis, offset: u32) -> Self {
        let mut coords = self.coords;
        coords[axis.index()] += offset;
        Self { coords, level: self.level }
    }

    /// Pointer moved one cell width along `axis`, or `None` when the move
    /// leaves the `[0, extent)` coordinate range.
    pub(crate) fn shifted(
        &self,
        axis: Axis,
        side: Side,
        step: u32,
        extent: u32,
    ) -> Option<Self> {
        let mut coords = self.coords;
        let coord = &mut coords[axis.index()];
        match side {
            Side::Negative => *coord = coord.checked_sub(step)?,
            Side::Positive => {
                let moved = *coord + step;
                if moved >= extent {
                    return None;
                }
                *coord = moved;
            }
        }
        Some(Self { coords, level: self.level })
    }
}
