//! Face/node/edge numbering: one sweep over the sorted cells.

use super::{Neighbor, TreeMesh};
use crate::{Axis, CellIndex, Dimension, Pointer, Side};
use ahash::{HashMap, HashMapExt, HashSet, HashSetExt};
use ndarray::{Array1, Array2};

/// Derived tables of a mesh, valid until the next mutation.
///
/// Faces are numbered per axis, in the order they are first needed while
/// visiting cells in canonical index order: for each cell, a face on the
/// negative side is allocated only against the domain boundary, a face on
/// the positive side is allocated against the boundary or the (same,
/// coarser, or finer) neighbor and shared with it. Faces on the fine side
/// of a 2:1 interface are marked hanging.
#[derive(Debug)]
pub(crate) struct Numbering {
    /// Live cells in ascending index order; row `i` of every per-cell
    /// table below belongs to `sorted_cells[i]`.
    pub sorted_cells: Vec<CellIndex>,
    /// Per-direction face ids of each cell, slots per [`Axis::slot`],
    /// ids local to their axis.
    pub c2f: HashMap<CellIndex, [Vec<usize>; 6]>,
    /// Cell centers, `(n_cells, dim)`.
    pub grid_cc: Array2<f64>,
    /// Face centers per axis, `(n_faces[a], dim)` each.
    pub grid_f: [Array2<f64>; 3],
    /// Face areas, x-faces first, then y, then z.
    pub area: Array1<f64>,
    /// Cell volumes, in canonical cell order.
    pub vol: Array1<f64>,
    /// Hanging face ids per axis.
    pub hanging: [Vec<usize>; 3],
    /// Face counts per axis.
    pub n_faces: [usize; 3],
    /// Distinct cell corners, hanging nodes included.
    pub n_nodes: usize,
    /// Distinct edge segments per axis (three dimensions only).
    pub n_edges: [usize; 3],
}

/// Growing face table of one axis.
#[derive(Default)]
struct FaceTable {
    centers: Vec<[f64; 3]>,
    areas: Vec<f64>,
    hanging: Vec<usize>,
}

impl FaceTable {
    /// Allocates the face of `pointer` on `side` of `axis` and returns
    /// its id.
    fn push(&mut self, mesh: &TreeMesh, pointer: &Pointer, axis: Axis, side: Side) -> usize {
        let origin = mesh.cell_origin_of(pointer);
        let widths = mesh.cell_widths_of(pointer);
        let dim = usize::from(mesh.dim());

        let mut center = [0.0; 3];
        for k in 0..dim {
            center[k] = if k == axis.index() {
                origin[k] + if side.is_positive() { widths[k] } else { 0.0 }
            } else {
                origin[k] + widths[k] / 2.0
            };
        }
        self.centers.push(center);

        let area = axis
            .others(mesh.dim())
            .iter()
            .map(|other| widths[other.index()])
            .product();
        self.areas.push(area);
        self.areas.len() - 1
    }
}

impl Numbering {
    pub fn build(mesh: &TreeMesh) -> Self {
        let dim = usize::from(mesh.dim());
        let mut sorted_cells: Vec<CellIndex> =
            mesh.cells.iter().copied().collect();
        sorted_cells.sort_unstable();

        let mut c2f: HashMap<CellIndex, [Vec<usize>; 6]> =
            HashMap::with_capacity(sorted_cells.len());
        let mut tables: [FaceTable; 3] = Default::default();
        let mut vol = Vec::with_capacity(sorted_cells.len());
        let mut centers = Vec::with_capacity(sorted_cells.len() * dim);
        let mut corners: HashSet<[u32; 3]> = HashSet::new();
        let mut segments: [HashSet<([u32; 3], u32)>; 3] = Default::default();

        for &cell in &sorted_cells {
            let pointer = mesh.encoding.decode(cell);
            let center = mesh.cell_center_of(&pointer);
            centers.extend_from_slice(&center[..dim]);
            vol.push(mesh.cell_volume_of(&pointer));

            record_corners(&mut corners, &pointer, mesh);
            if mesh.dim() == Dimension::Three {
                record_segments(&mut segments, &pointer, mesh);
            }

            for &axis in Axis::all(mesh.dim()) {
                process_cell(
                    mesh,
                    cell,
                    &pointer,
                    axis,
                    &mut tables[axis.index()],
                    &mut c2f,
                );
            }
        }

        let n_faces =
            [tables[0].areas.len(), tables[1].areas.len(), tables[2].areas.len()];
        let mut area = Vec::with_capacity(n_faces.iter().sum());
        for table in &tables {
            area.extend_from_slice(&table.areas);
        }

        let grid_f = tables
            .each_ref()
            .map(|table| face_grid(&table.centers, dim));
        let hanging = tables.map(|table| table.hanging);

        Self {
            grid_cc: Array2::from_shape_vec((sorted_cells.len(), dim), centers)
                .expect("one center row per cell"),
            sorted_cells,
            c2f,
            grid_f,
            area: Array1::from_vec(area),
            vol: Array1::from_vec(vol),
            hanging,
            n_faces,
            n_nodes: corners.len(),
            n_edges: [segments[0].len(), segments[1].len(), segments[2].len()],
        }
    }
}

/// Numbers the faces of one cell along one axis.
fn process_cell(
    mesh: &TreeMesh,
    cell: CellIndex,
    pointer: &Pointer,
    axis: Axis,
    table: &mut FaceTable,
    c2f: &mut HashMap<CellIndex, [Vec<usize>; 6]>,
) {
    let slot_neg = axis.slot(Side::Negative);
    let slot_pos = axis.slot(Side::Positive);

    // Negative side: interior faces are allocated by the neighbor when it
    // handles its positive side, so only the domain boundary counts here.
    if mesh.neighbor_of(pointer, axis, Side::Negative) == Neighbor::Boundary {
        let face = table.push(mesh, pointer, axis, Side::Negative);
        c2f.entry(cell).or_default()[slot_neg].push(face);
    }

    match mesh.neighbor_of(pointer, axis, Side::Positive) {
        Neighbor::Boundary => {
            let face = table.push(mesh, pointer, axis, Side::Positive);
            c2f.entry(cell).or_default()[slot_pos].push(face);
        }
        Neighbor::Same(neighbor) => {
            let face = table.push(mesh, pointer, axis, Side::Positive);
            c2f.entry(cell).or_default()[slot_pos].push(face);
            c2f.entry(neighbor).or_default()[slot_neg].push(face);
        }
        Neighbor::Coarser(neighbor) => {
            // My face is the fine fraction of the neighbor's big face.
            let face = table.push(mesh, pointer, axis, Side::Positive);
            c2f.entry(cell).or_default()[slot_pos].push(face);
            c2f.entry(neighbor).or_default()[slot_neg].push(face);
            table.hanging.push(face);
        }
        Neighbor::Finer(finer) => {
            debug_assert!(
                finer.iter().all(|&cell| mesh.contains(cell)),
                "2:1 balance violated across a face",
            );
            // One face per finer child; together they tile my big face.
            for &neighbor in &finer {
                let neighbor_pointer = mesh.encoding.decode(neighbor);
                let face = table.push(
                    mesh,
                    &neighbor_pointer,
                    axis,
                    Side::Negative,
                );
                c2f.entry(neighbor).or_default()[slot_neg].push(face);
                c2f.entry(cell).or_default()[slot_pos].push(face);
                table.hanging.push(face);
            }
        }
    }
}

/// Collects the `2^d` corners of a cell.
fn record_corners(
    corners: &mut HashSet<[u32; 3]>,
    pointer: &Pointer,
    mesh: &TreeMesh,
) {
    let dim = usize::from(mesh.dim());
    let width = mesh.level_width(pointer.level());
    for corner in 0..1_usize << dim {
        let mut coords = pointer.coords();
        for (bit, coord) in coords.iter_mut().enumerate().take(dim) {
            if corner >> bit & 1 == 1 {
                *coord += width;
            }
        }
        corners.insert(coords);
    }
}

/// Collects the twelve edge segments of a 3-D cell, keyed by axis, start
/// corner, and length so that hanging segments stay distinct.
fn record_segments(
    segments: &mut [HashSet<([u32; 3], u32)>; 3],
    pointer: &Pointer,
    mesh: &TreeMesh,
) {
    let width = mesh.level_width(pointer.level());
    for &axis in Axis::all(Dimension::Three) {
        let others = axis.others(Dimension::Three);
        for corner in 0..4_usize {
            let mut start = pointer.coords();
            for (bit, &other) in others.iter().enumerate() {
                if corner >> bit & 1 == 1 {
                    start[other.index()] += width;
                }
            }
            segments[axis.index()].insert((start, width));
        }
    }
}

/// Materializes a face-center table as an `(n, dim)` array.
fn face_grid(centers: &[[f64; 3]], dim: usize) -> Array2<f64> {
    let mut flat = Vec::with_capacity(centers.len() * dim);
    for center in centers {
        flat.extend_from_slice(&center[..dim]);
    }
    Array2::from_shape_vec((centers.len(), dim), flat)
        .expect("one center row per face")
}

#[cfg(test)]
#[path = "./numbering_tests.rs"]
mod tests;
