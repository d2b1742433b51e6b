use approx::assert_relative_eq;
use sprs::CsMat;
use treemesh::{Axis, TreeMesh};

/// Dense matrix-vector product against a sparse matrix.
fn apply(matrix: &CsMat<f64>, vector: &[f64]) -> Vec<f64> {
    let mut out = vec![0.0; matrix.rows()];
    for (&value, (row, col)) in matrix.iter() {
        out[row] += value * vector[col];
    }
    out
}

/// 2-D mesh with four level-1 cells, the lower-left one split once more.
fn graded_mesh() -> TreeMesh {
    let mut mesh = TreeMesh::uniform(&[4, 4], 2).expect("mesh");
    mesh.refine(|_| 1);
    let target = mesh.pointer(&[0, 0], 1).expect("pointer");
    mesh.refine_cell_at(&target).expect("split");
    mesh
}

#[test]
fn divergence_shape() {
    let mesh = graded_mesh();

    let div = mesh.face_divergence();
    assert_eq!(div.rows(), 7);
    assert_eq!(div.cols(), mesh.n_faces());
}

#[test]
fn divergence_of_a_uniform_flux_vanishes() {
    let mesh = graded_mesh();

    // Unit flux through every face: what flows in flows out, everywhere,
    // including across hanging faces.
    let flux = vec![1.0; mesh.n_faces()];
    for divergence in apply(mesh.face_divergence(), &flux) {
        assert_relative_eq!(divergence, 0.0, epsilon = 1e-12);
    }
}

#[test]
fn divergence_of_a_single_axis_flux_vanishes() {
    let mesh = graded_mesh();

    let mut flux = vec![0.0; mesh.n_faces()];
    for face in 0..mesh.n_faces_x() {
        flux[face] = 1.0;
    }
    for divergence in apply(mesh.face_divergence(), &flux) {
        assert_relative_eq!(divergence, 0.0, epsilon = 1e-12);
    }
}

#[test]
fn divergence_stencil_widths() {
    let mesh = graded_mesh();

    // Cells without finer neighbors touch 2d faces; each coarse cell at
    // the 2:1 interface sees (2d - 1) + 2^(d-1) faces.
    let coarse_right = mesh
        .cell_index(&mesh.pointer(&[2, 0], 1).expect("pointer"))
        .expect("index");
    let coarse_top = mesh
        .cell_index(&mesh.pointer(&[0, 2], 1).expect("pointer"))
        .expect("index");

    let div = mesh.face_divergence();
    for (row, &cell) in mesh.cell_indices().iter().enumerate() {
        let nnz = div.outer_view(row).expect("row in range").nnz();
        let expected =
            if cell == coarse_right || cell == coarse_top { 5 } else { 4 };
        assert_eq!(nnz, expected, "row {row}");
    }
}

#[test]
fn divergence_detects_a_source() {
    let mesh = graded_mesh();

    // Outflow through the right boundary only: the two right-boundary
    // cells report positive divergence.
    let n_fx = mesh.n_faces_x();
    let grid = mesh.face_centers(Axis::X).expect("2-D mesh");
    let mut flux = vec![0.0; mesh.n_faces()];
    for face in 0..n_fx {
        if (grid[[face, 0]] - 1.0).abs() < 1e-12 {
            flux[face] = 1.0;
        }
    }

    let divergence = apply(mesh.face_divergence(), &flux);
    let sources = divergence.iter().filter(|&&v| v > 1e-12).count();
    assert_eq!(sources, 2, "two cells touch the right boundary");
}

#[test]
fn cell_permutation_is_a_permutation() {
    let mesh = graded_mesh();

    let permute = mesh.permute_cells();
    assert_permutation(&permute, mesh.n_cells());
}

#[test]
fn face_permutation_is_a_permutation() {
    let mesh = graded_mesh();

    let permute = mesh.permute_faces();
    assert_permutation(&permute, mesh.n_faces());
}

#[test]
fn edge_permutation_in_2d_only() {
    let mesh = graded_mesh();
    let permute = mesh.permute_edges().expect("2-D mesh");
    assert_permutation(&permute, mesh.n_edges());

    let mut mesh = TreeMesh::uniform(&[2, 2, 2], 1).expect("mesh");
    mesh.refine(|_| 1);
    assert!(mesh.permute_edges().is_err(), "not implemented in 3-D");
}

#[test]
fn cell_permutation_sorts_lexicographically() {
    let mesh = graded_mesh();

    let permuted = apply_matrix(&mesh.permute_cells(), mesh.cell_centers());

    // Sorted by y (outer), then x (inner).
    for pair in permuted.windows(2) {
        let (a, b) = (&pair[0], &pair[1]);
        assert!(
            b[1] > a[1] - 1e-7 && (b[1] > a[1] + 1e-7 || b[0] > a[0]),
            "{a:?} before {b:?}"
        );
    }
}

/// Rows of `points` reordered by the permutation matrix.
fn apply_matrix(
    permute: &CsMat<f64>,
    points: &ndarray::Array2<f64>,
) -> Vec<Vec<f64>> {
    let mut out = vec![Vec::new(); permute.rows()];
    for (&value, (row, col)) in permute.iter() {
        assert_relative_eq!(value, 1.0);
        out[row] = points.row(col).to_vec();
    }
    out
}

/// A permutation matrix has exactly one unit entry per row, and its
/// columns cover `0..size` (hence `P · Pᵀ = I`).
fn assert_permutation(matrix: &CsMat<f64>, size: usize) {
    assert_eq!(matrix.rows(), size);
    assert_eq!(matrix.cols(), size);
    assert_eq!(matrix.nnz(), size);

    let mut seen = vec![false; size];
    for row in 0..size {
        let view = matrix.outer_view(row).expect("row in range");
        assert_eq!(view.nnz(), 1, "one entry per row");
        let (col, &value) = view.iter().next().expect("one entry");
        assert_relative_eq!(value, 1.0);
        assert!(!seen[col], "column {col} hit twice");
        seen[col] = true;
    }
    assert!(seen.into_iter().all(|hit| hit), "columns cover the range");
}
