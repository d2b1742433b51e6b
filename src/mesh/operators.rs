//! Discrete operators: face divergence and grid permutations.

use super::{sort::sort_grid, TreeMesh};
use crate::{error::NotImplemented, Dimension, Side};
use sprs::{CsMat, TriMat};

impl TreeMesh {
    /// Discrete face divergence as a sparse `(n_cells, n_faces)` matrix.
    ///
    /// Row `i` holds the signed, area-weighted incidence of cell `i`'s
    /// faces scaled by its inverse volume: `V⁻¹ · D · S`. Columns follow
    /// the global face numbering (x-faces, then y, then z); signs follow
    /// the face-slot order `(-x, +x, -y, +y, -z, +z)`.
    ///
    /// The matrix is cached until the next mutation.
    #[must_use]
    pub fn face_divergence(&self) -> &CsMat<f64> {
        self.face_div.get_or_init(|| {
            let numbering = self.numbering();
            let n_cells = numbering.sorted_cells.len();
            let n_faces: usize = numbering.n_faces.iter().sum();
            let [n_fx, n_fy, _] = numbering.n_faces;
            let offsets =
                [0, 0, n_fx, n_fx, n_fx + n_fy, n_fx + n_fy];
            let signs = [
                Side::Negative.signum(),
                Side::Positive.signum(),
                Side::Negative.signum(),
                Side::Positive.signum(),
                Side::Negative.signum(),
                Side::Positive.signum(),
            ];

            let mut incidence = TriMat::new((n_cells, n_faces));
            for (row, cell) in numbering.sorted_cells.iter().enumerate() {
                let slots = &numbering.c2f[cell];
                for slot in 0..self.dim.faces_per_cell() {
                    for &face in &slots[slot] {
                        incidence.add_triplet(
                            row,
                            offsets[slot] + face,
                            signs[slot],
                        );
                    }
                }
            }
            let incidence: CsMat<f64> = incidence.to_csr();

            let inv_vol =
                diagonal(numbering.vol.iter().map(|&volume| 1.0 / volume));
            let scale = diagonal(numbering.area.iter().copied());
            &(&inv_vol * &incidence) * &scale
        })
    }

    /// Permutation matrix reordering cells into lexicographic (z, y, x)
    /// order.
    #[must_use]
    pub fn permute_cells(&self) -> CsMat<f64> {
        let order = sort_grid(self.cell_centers().view(), 0);
        permutation(&order, self.n_cells())
    }

    /// Permutation matrix reordering faces into lexicographic order, one
    /// axis block after the other.
    #[must_use]
    pub fn permute_faces(&self) -> CsMat<f64> {
        let numbering = self.numbering();
        let [n_fx, n_fy, _] = numbering.n_faces;

        let mut order = sort_grid(numbering.grid_f[0].view(), 0);
        order.extend(sort_grid(numbering.grid_f[1].view(), n_fx));
        if self.dim == Dimension::Three {
            order.extend(sort_grid(numbering.grid_f[2].view(), n_fx + n_fy));
        }
        permutation(&order, self.n_faces())
    }

    /// Permutation matrix reordering edges into lexicographic order.
    ///
    /// In two dimensions edges are the faces rotated by 90°, so the
    /// blocks swap: y-faces first, then x-faces.
    ///
    /// # Errors
    ///
    /// [`NotImplemented`] in three dimensions (edges are only counted,
    /// not enumerated).
    pub fn permute_edges(&self) -> Result<CsMat<f64>, NotImplemented> {
        if self.dim == Dimension::Three {
            return Err(NotImplemented::new(
                "edge permutation in three dimensions",
            ));
        }
        let numbering = self.numbering();

        let mut order = sort_grid(numbering.grid_f[1].view(), 0);
        order.extend(sort_grid(
            numbering.grid_f[0].view(),
            numbering.n_faces[1],
        ));
        Ok(permutation(&order, self.n_edges()))
    }
}

/// Square diagonal matrix from the given values, in CSR form.
fn diagonal(values: impl Iterator<Item = f64>) -> CsMat<f64> {
    let data: Vec<f64> = values.collect();
    let n = data.len();
    CsMat::new((n, n), (0..=n).collect(), (0..n).collect(), data)
}

/// Rows of the `size × size` identity reordered by `order`: row `i` has
/// its one in column `order[i]`.
fn permutation(order: &[usize], size: usize) -> CsMat<f64> {
    debug_assert_eq!(order.len(), size);
    CsMat::new(
        (size, size),
        (0..=size).collect(),
        order.to_vec(),
        vec![1.0; size],
    )
}
