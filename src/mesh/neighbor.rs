//! Face-neighbor lookup across refinement levels.

use super::TreeMesh;
use crate::{error::NotLive, Axis, CellIndex, Pointer, Side};

/// Neighbor of a cell across one of its faces.
///
/// Under 2:1 balance a face-sharing neighbor is at most one level away,
/// which is exactly what the variants express; deeper refinement jumps
/// across a face are not representable and not supported.
#[derive(Clone, Debug, Eq, PartialEq)]
#[allow(clippy::exhaustive_enums)] // The four outcomes of the walk.
pub enum Neighbor {
    /// No neighbor: the face lies on the domain boundary.
    Boundary,
    /// Neighbor at the same level.
    Same(CellIndex),
    /// Neighbor one level coarser.
    Coarser(CellIndex),
    /// Face-sharing neighbors one level finer, in fixed anchor order:
    /// the orthogonal axes vary in increasing order, first axis fastest.
    Finer(Vec<CellIndex>),
}

impl TreeMesh {
    /// Neighbor of a live cell in the given direction.
    ///
    /// `axis` must belong to the mesh dimension. The result is only
    /// meaningful on a 2:1-balanced mesh (check with
    /// [`is_balanced`](Self::is_balanced)).
    ///
    /// # Errors
    ///
    /// [`NotLive`] when the cell is not in the live set.
    pub fn next_cell(
        &self,
        index: CellIndex,
        axis: Axis,
        side: Side,
    ) -> Result<Neighbor, NotLive> {
        if !self.contains(index) {
            return Err(NotLive::new(index));
        }
        Ok(self.neighbor_of(&self.encoding.decode(index), axis, side))
    }

    /// Walks to the face-sharing neighbor of `pointer`: same level first,
    /// then one level finer, then coarser ancestors.
    pub(crate) fn neighbor_of(
        &self,
        pointer: &Pointer,
        axis: Axis,
        side: Side,
    ) -> Neighbor {
        debug_assert!(
            axis.index() < usize::from(self.dim),
            "axis {axis} outside of a {}-dimensional mesh",
            self.dim,
        );
        let extent = self.extent();
        let width = self.level_width(pointer.level());

        let Some(candidate) = pointer.shifted(axis, side, width, extent)
        else {
            return Neighbor::Boundary;
        };

        // Same size as me?
        if self.contains_pointer(&candidate) {
            return Neighbor::Same(self.encoding.encode(&candidate));
        }

        // Smaller than me? Probe the face-adjacent corner child of the
        // would-be neighbor; when it is live, all face children are (2:1).
        if pointer.level() < self.levels {
            let half = width / 2;
            let mut anchor = candidate.at_level(pointer.level() + 1);
            if !side.is_positive() {
                // The far half of the candidate; move to the closer one.
                anchor = anchor.translated(axis, half);
            }
            if self.contains_pointer(&anchor) {
                let others = axis.others(self.dim);
                let mut finer = Vec::with_capacity(1 << others.len());
                for child in 0..1_usize << others.len() {
                    let mut next = anchor;
                    for (bit, &other) in others.iter().enumerate() {
                        if child >> bit & 1 == 1 {
                            next = next.translated(other, half);
                        }
                    }
                    finer.push(self.encoding.encode(&next));
                }
                return Neighbor::Finer(finer);
            }
        }

        // Bigger than me: climb to the ancestor whose same-level neighbor
        // is live.
        let mut current = *pointer;
        while current.level() > 0 {
            current = current.parent(self.levels);
            let step = self.level_width(current.level());
            let Some(next) = current.shifted(axis, side, step, extent) else {
                return Neighbor::Boundary;
            };
            if self.contains_pointer(&next) {
                return Neighbor::Coarser(self.encoding.encode(&next));
            }
        }

        // Only reachable when the neighbor across the face is more than
        // one level finer, i.e. the mesh is not 2:1 balanced.
        Neighbor::Boundary
    }

    /// Returns true when face-sharing neighbors never differ by more than
    /// one level, the precondition of neighbor lookups and numbering.
    #[must_use]
    pub fn is_balanced(&self) -> bool {
        let extent = self.extent();
        self.cells.iter().all(|&index| {
            let pointer = self.encoding.decode(index);
            let width = self.level_width(pointer.level());
            Axis::all(self.dim).iter().all(|&axis| {
                Side::BOTH.into_iter().all(|side| {
                    if pointer.shifted(axis, side, width, extent).is_none() {
                        // A true domain boundary.
                        return true;
                    }
                    match self.neighbor_of(&pointer, axis, side) {
                        // In-domain face with no representable neighbor.
                        Neighbor::Boundary => false,
                        Neighbor::Finer(ref cells) => {
                            cells.iter().all(|&cell| self.contains(cell))
                        }
                        Neighbor::Same(_) | Neighbor::Coarser(_) => true,
                    }
                })
            })
        })
    }

}

#[cfg(test)]
#[path = "./neighbor_tests.rs"]
mod tests;
