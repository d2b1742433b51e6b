//! Adaptive tree mesh: cell store, refinement, and derived tables.

use crate::{
    error::{
        InvalidCellIndex, InvalidPointer, InvalidShape, MaxLevel, NewMeshError,
        NotImplemented, NotLive, RefineError,
    },
    index::Encoding,
    Axis, CellIndex, Dimension, Pointer,
};
use ahash::{HashSet, HashSetExt};
use ndarray::{Array1, Array2};
use numbering::Numbering;
use sprs::CsMat;
use std::cell::OnceCell;

mod geometry;
mod neighbor;
mod numbering;
mod operators;
mod sort;

pub use neighbor::Neighbor;

/// Spacing specification for one axis of the mesh.
#[derive(Clone, Debug, PartialEq)]
#[allow(clippy::exhaustive_enums)] // The two input forms of the constructor.
pub enum AxisSpacing {
    /// `n` equal-width cells spanning the unit interval.
    Uniform(usize),
    /// Explicit widths for every finest-level cell.
    Widths(Vec<f64>),
}

impl From<usize> for AxisSpacing {
    fn from(value: usize) -> Self {
        Self::Uniform(value)
    }
}

impl From<Vec<f64>> for AxisSpacing {
    fn from(value: Vec<f64>) -> Self {
        Self::Widths(value)
    }
}

impl From<&[f64]> for AxisSpacing {
    fn from(value: &[f64]) -> Self {
        Self::Widths(value.to_vec())
    }
}

// -----------------------------------------------------------------------------

/// An adaptive quadtree/octree mesh over a tensor-product box.
///
/// The mesh starts as a single root cell and is refined cell by cell, each
/// split replacing a cell by its `2^d` children. Live cells are stored as
/// a set of packed [`CellIndex`] values; everything else (face numbering,
/// areas, volumes, the divergence operator) is derived lazily and thrown
/// away on the next mutation.
///
/// # Example
///
/// ```
/// use treemesh::TreeMesh;
///
/// let mut mesh = TreeMesh::uniform(&[4, 4], 2)?;
/// mesh.refine(|_| 1);
/// assert_eq!(mesh.n_cells(), 4);
/// # Ok::<(), treemesh::error::NewMeshError>(())
/// ```
#[derive(Debug)]
pub struct TreeMesh {
    dim: Dimension,
    levels: u8,
    /// Per-axis widths of the finest-level cells (each of length `2^L`).
    widths: Vec<Vec<f64>>,
    /// Per-axis cumulative widths (each of length `2^L + 1`).
    prefix: Vec<Vec<f64>>,
    encoding: Encoding,
    cells: HashSet<CellIndex>,
    numbering: OnceCell<Numbering>,
    face_div: OnceCell<CsMat<f64>>,
}

impl TreeMesh {
    /// Builds a mesh from per-axis spacings.
    ///
    /// `spacings` must hold one entry per axis (two or three axes) and
    /// every axis must resolve to `2^levels` strictly positive widths.
    ///
    /// # Errors
    ///
    /// [`NewMeshError::Dimension`] when the axis count is not 2 or 3,
    /// [`NewMeshError::Shape`] when an axis has the wrong length or a
    /// non-positive width, and [`NewMeshError::Level`] when `levels` is 0
    /// or too deep for 64-bit cell indices.
    pub fn new(
        spacings: Vec<AxisSpacing>,
        levels: u8,
    ) -> Result<Self, NewMeshError> {
        let dim = Dimension::try_from(spacings.len())?;
        let encoding = Encoding::new(dim, levels)?;
        let expected = 1_usize << levels;

        let mut widths = Vec::with_capacity(spacings.len());
        for (axis, spacing) in spacings.into_iter().enumerate() {
            let h = match spacing {
                AxisSpacing::Uniform(count) => {
                    if count != expected {
                        return Err(InvalidShape::new(
                            axis,
                            "cell count must equal 2^levels",
                        )
                        .into());
                    }
                    #[allow(clippy::cast_precision_loss)] // Small counts.
                    let width = 1.0 / count as f64;
                    vec![width; count]
                }
                AxisSpacing::Widths(h) => {
                    if h.len() != expected {
                        return Err(InvalidShape::new(
                            axis,
                            "widths length must equal 2^levels",
                        )
                        .into());
                    }
                    if h.iter().any(|&width| width <= 0.0) {
                        return Err(InvalidShape::new(
                            axis,
                            "cell widths must be positive",
                        )
                        .into());
                    }
                    h
                }
            };
            widths.push(h);
        }

        let prefix = widths
            .iter()
            .map(|h| {
                let mut sums = Vec::with_capacity(h.len() + 1);
                let mut acc = 0.0;
                sums.push(acc);
                for &width in h {
                    acc += width;
                    sums.push(acc);
                }
                sums
            })
            .collect();

        let mut cells = HashSet::new();
        cells.insert(encoding.encode(&Pointer::new_unchecked([0; 3], 0)));

        Ok(Self {
            dim,
            levels,
            widths,
            prefix,
            encoding,
            cells,
            numbering: OnceCell::new(),
            face_div: OnceCell::new(),
        })
    }

    /// Builds a mesh with `cells_per_axis[k]` equal cells along axis `k`.
    ///
    /// Every count must equal `2^levels`.
    ///
    /// # Errors
    ///
    /// Same failure modes as [`new`](Self::new).
    pub fn uniform(
        cells_per_axis: &[usize],
        levels: u8,
    ) -> Result<Self, NewMeshError> {
        Self::new(
            cells_per_axis.iter().copied().map(AxisSpacing::Uniform).collect(),
            levels,
        )
    }

    /// Mesh dimensionality.
    #[must_use]
    pub const fn dim(&self) -> Dimension {
        self.dim
    }

    /// Number of refinement levels (the root is level 0, `levels` is the
    /// finest).
    #[must_use]
    pub const fn levels(&self) -> u8 {
        self.levels
    }

    /// Per-axis widths of the finest-level cells.
    #[must_use]
    pub fn spacings(&self) -> &[Vec<f64>] {
        &self.widths
    }

    /// Number of live cells.
    #[must_use]
    pub fn n_cells(&self) -> usize {
        self.cells.len()
    }

    /// Returns true if the cell is in the live set.
    #[must_use]
    pub fn contains(&self, index: CellIndex) -> bool {
        self.cells.contains(&index)
    }

    /// Returns true if the cell addressed by `pointer` is in the live set.
    #[must_use]
    pub fn contains_pointer(&self, pointer: &Pointer) -> bool {
        self.cells.contains(&self.encoding.encode(pointer))
    }

    /// Live cell indices in canonical (ascending index) order.
    #[must_use]
    pub fn cell_indices(&self) -> &[CellIndex] {
        &self.numbering().sorted_cells
    }

    /// Validated pointer for this mesh.
    ///
    /// # Errors
    ///
    /// [`InvalidPointer`] when the arity does not match the dimension, a
    /// coordinate is out of range or misaligned for the level, or the
    /// level exceeds the mesh depth.
    pub fn pointer(
        &self,
        coords: &[u32],
        level: u8,
    ) -> Result<Pointer, InvalidPointer> {
        let mut padded = [0_u32; 3];
        for (slot, &coord) in padded.iter_mut().zip(coords) {
            *slot = coord;
        }
        let candidate = Pointer::new_unchecked(padded, level);
        if coords.len() != usize::from(self.dim) {
            return Err(InvalidPointer::new(
                candidate,
                "expected one coordinate per axis",
            ));
        }
        self.validate_pointer(&candidate)?;
        Ok(candidate)
    }

    /// Packs a pointer into its cell index.
    ///
    /// # Errors
    ///
    /// [`InvalidPointer`] when the pointer does not address a cell of this
    /// mesh (live or not).
    pub fn cell_index(
        &self,
        pointer: &Pointer,
    ) -> Result<CellIndex, InvalidPointer> {
        self.validate_pointer(pointer)?;
        Ok(self.encoding.encode(pointer))
    }

    /// Unpacks a cell index into its pointer.
    ///
    /// # Errors
    ///
    /// [`InvalidCellIndex`] when the index does not decode to a valid
    /// pointer of this mesh.
    pub fn cell_pointer(
        &self,
        index: CellIndex,
    ) -> Result<Pointer, InvalidCellIndex> {
        let pointer = self.encoding.decode(index);
        if self.validate_pointer(&pointer).is_err() {
            return Err(InvalidCellIndex::new(
                u64::from(index),
                "does not decode to a valid cell pointer",
            ));
        }
        Ok(pointer)
    }

    /// Physical center of a live cell.
    ///
    /// # Errors
    ///
    /// [`NotLive`] when the cell is not in the live set.
    pub fn cell_center(&self, index: CellIndex) -> Result<Vec<f64>, NotLive> {
        if !self.contains(index) {
            return Err(NotLive::new(index));
        }
        let center = self.cell_center_of(&self.encoding.decode(index));
        Ok(center[..usize::from(self.dim)].to_vec())
    }

    /// Splits a live cell into its `2^d` children.
    ///
    /// The split is atomic: on success the parent is gone and all children
    /// are live; on error the mesh is untouched. Returns the children in
    /// Morton order.
    ///
    /// # Errors
    ///
    /// [`RefineError::NotLive`] when the cell is not live and
    /// [`RefineError::MaxLevel`] when it sits at the finest level.
    pub fn refine_cell(
        &mut self,
        index: CellIndex,
    ) -> Result<Vec<CellIndex>, RefineError> {
        if !self.cells.contains(&index) {
            return Err(NotLive::new(index).into());
        }
        let pointer = self.encoding.decode(index);
        if pointer.level() == self.levels {
            return Err(MaxLevel::new(self.levels).into());
        }
        Ok(self.split(index, &pointer))
    }

    /// Splits the live cell addressed by `pointer`.
    ///
    /// # Errors
    ///
    /// Same as [`refine_cell`](Self::refine_cell), plus
    /// [`RefineError::Pointer`] when the pointer itself is invalid.
    pub fn refine_cell_at(
        &mut self,
        pointer: &Pointer,
    ) -> Result<Vec<CellIndex>, RefineError> {
        self.validate_pointer(pointer)?;
        self.refine_cell(self.encoding.encode(pointer))
    }

    /// Refines until `target_level(center) <= level` holds for every live
    /// cell.
    ///
    /// `target_level` is evaluated at the physical center of each cell
    /// (one coordinate per axis); a cell is split whenever the returned
    /// level exceeds its own, and the children are revisited recursively.
    /// Cells at the finest level are never split. Returns every cell
    /// created in the process.
    pub fn refine<F>(&mut self, mut target_level: F) -> Vec<CellIndex>
    where
        F: FnMut(&[f64]) -> u8,
    {
        let dim = usize::from(self.dim);
        let mut frontier: Vec<CellIndex> =
            self.cells.iter().copied().collect();
        frontier.sort_unstable();

        let mut created = Vec::new();
        while !frontier.is_empty() {
            let mut next = Vec::new();
            for index in frontier {
                let pointer = self.encoding.decode(index);
                if pointer.level() == self.levels {
                    continue;
                }
                let center = self.cell_center_of(&pointer);
                if target_level(&center[..dim]) > pointer.level() {
                    next.extend(self.split(index, &pointer));
                }
            }
            created.extend_from_slice(&next);
            frontier = next;
        }
        created
    }

    /// Merges a split cell back together.
    ///
    /// # Errors
    ///
    /// Always [`NotImplemented`]: coarsening is not supported yet.
    pub fn coarsen_cell(
        &mut self,
        _index: CellIndex,
    ) -> Result<Vec<CellIndex>, NotImplemented> {
        Err(NotImplemented::new("cell coarsening"))
    }

    /// Total number of nodes (distinct cell corners, hanging nodes
    /// included).
    #[must_use]
    pub fn n_nodes(&self) -> usize {
        self.numbering().n_nodes
    }

    /// Total number of faces across all axes.
    #[must_use]
    pub fn n_faces(&self) -> usize {
        self.numbering().n_faces.iter().sum()
    }

    /// Number of x-faces.
    #[must_use]
    pub fn n_faces_x(&self) -> usize {
        self.numbering().n_faces[0]
    }

    /// Number of y-faces.
    #[must_use]
    pub fn n_faces_y(&self) -> usize {
        self.numbering().n_faces[1]
    }

    /// Number of z-faces, or `None` in two dimensions.
    #[must_use]
    pub fn n_faces_z(&self) -> Option<usize> {
        (self.dim == Dimension::Three).then(|| self.numbering().n_faces[2])
    }

    /// Total number of edges.
    ///
    /// In two dimensions edges and faces coincide (rotated by 90°); in
    /// three dimensions distinct edge segments are counted, hanging
    /// segments included.
    #[must_use]
    pub fn n_edges(&self) -> usize {
        match self.dim {
            Dimension::Two => self.n_faces(),
            Dimension::Three => self.numbering().n_edges.iter().sum(),
        }
    }

    /// Number of x-edges.
    #[must_use]
    pub fn n_edges_x(&self) -> usize {
        match self.dim {
            Dimension::Two => self.numbering().n_faces[1],
            Dimension::Three => self.numbering().n_edges[0],
        }
    }

    /// Number of y-edges.
    #[must_use]
    pub fn n_edges_y(&self) -> usize {
        match self.dim {
            Dimension::Two => self.numbering().n_faces[0],
            Dimension::Three => self.numbering().n_edges[1],
        }
    }

    /// Number of z-edges, or `None` in two dimensions.
    #[must_use]
    pub fn n_edges_z(&self) -> Option<usize> {
        (self.dim == Dimension::Three).then(|| self.numbering().n_edges[2])
    }

    /// Cell volumes, one per cell in canonical cell order.
    #[must_use]
    pub fn cell_volumes(&self) -> &Array1<f64> {
        &self.numbering().vol
    }

    /// Face areas, x-faces first, then y, then z.
    #[must_use]
    pub fn face_areas(&self) -> &Array1<f64> {
        &self.numbering().area
    }

    /// Edge lengths in two dimensions (`None` in three).
    ///
    /// Edges are the faces rotated by 90°: y-face lengths first, then
    /// x-face lengths.
    #[must_use]
    pub fn edge_lengths(&self) -> Option<Array1<f64>> {
        (self.dim == Dimension::Two).then(|| {
            let numbering = self.numbering();
            let n_fx = numbering.n_faces[0];
            let mut lengths = Vec::with_capacity(numbering.area.len());
            lengths.extend(numbering.area.iter().skip(n_fx).copied());
            lengths.extend(numbering.area.iter().take(n_fx).copied());
            Array1::from_vec(lengths)
        })
    }

    /// Cell centers as an `(n_cells, dim)` array, in canonical cell
    /// order.
    #[must_use]
    pub fn cell_centers(&self) -> &Array2<f64> {
        &self.numbering().grid_cc
    }

    /// Face centers of one axis as an `(n, dim)` array, in face-id order.
    ///
    /// Returns `None` for [`Axis::Z`] in two dimensions.
    #[must_use]
    pub fn face_centers(&self, axis: Axis) -> Option<&Array2<f64>> {
        (axis.index() < usize::from(self.dim))
            .then(|| &self.numbering().grid_f[axis.index()])
    }

    /// Per-axis ids of the hanging faces (fine side of 2:1 interfaces).
    #[must_use]
    pub fn hanging_faces(&self, axis: Axis) -> &[usize] {
        &self.numbering().hanging[axis.index()]
    }

    /// Per-direction face ids of a live cell.
    ///
    /// Slots follow [`Axis::slot`]: `(-x, +x, -y, +y, -z, +z)`, ids are
    /// local to their axis. A slot holds one face against a boundary,
    /// same-level, or coarser neighbor, and `2^(d-1)` faces against finer
    /// neighbors. The z slots are empty in two dimensions.
    ///
    /// # Errors
    ///
    /// [`NotLive`] when the cell is not in the live set.
    pub fn cell_faces(
        &self,
        index: CellIndex,
    ) -> Result<&[Vec<usize>; 6], NotLive> {
        self.numbering().c2f.get(&index).ok_or_else(|| NotLive::new(index))
    }

    /// Derived tables, rebuilt on first access after a mutation.
    fn numbering(&self) -> &Numbering {
        self.numbering.get_or_init(|| Numbering::build(self))
    }

    /// Drops every derived table; the next access renumbers from scratch.
    fn invalidate(&mut self) {
        self.numbering = OnceCell::new();
        self.face_div = OnceCell::new();
    }

    /// Removes `index` and inserts its children. Callers have validated
    /// that the cell is live and not at the finest level.
    fn split(&mut self, index: CellIndex, pointer: &Pointer) -> Vec<CellIndex> {
        self.invalidate();
        let added: Vec<_> = pointer
            .children(self.dim, self.levels)
            .map(|child| {
                let child = self.encoding.encode(&child);
                self.cells.insert(child);
                child
            })
            .collect();
        self.cells.remove(&index);
        added
    }

    fn validate_pointer(&self, pointer: &Pointer) -> Result<(), InvalidPointer> {
        if pointer.level() > self.levels {
            return Err(InvalidPointer::new(
                *pointer,
                "level exceeds the mesh depth",
            ));
        }
        let extent = 1_u32 << self.levels;
        let width = self.level_width(pointer.level());
        let dim = usize::from(self.dim);
        for (k, &coord) in pointer.coords().iter().enumerate() {
            if k >= dim {
                if coord != 0 {
                    return Err(InvalidPointer::new(
                        *pointer,
                        "unused coordinate must be zero",
                    ));
                }
                continue;
            }
            if coord >= extent {
                return Err(InvalidPointer::new(
                    *pointer,
                    "coordinate out of range",
                ));
            }
            if coord % width != 0 {
                return Err(InvalidPointer::new(
                    *pointer,
                    "coordinate not aligned to the cell width",
                ));
            }
        }
        Ok(())
    }
}
