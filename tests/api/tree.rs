use approx::assert_relative_eq;
use treemesh::{error::NewMeshError, Axis, AxisSpacing, TreeMesh};

#[test]
fn construction_validates_the_dimension() {
    let result = TreeMesh::uniform(&[4], 2);
    assert!(
        matches!(result, Err(NewMeshError::Dimension(_))),
        "one axis"
    );

    let result = TreeMesh::uniform(&[4, 4, 4, 4], 2);
    assert!(
        matches!(result, Err(NewMeshError::Dimension(_))),
        "four axes"
    );

    assert!(TreeMesh::uniform(&[4, 4], 2).is_ok(), "2-D");
    assert!(TreeMesh::uniform(&[4, 4, 4], 2).is_ok(), "3-D");
}

#[test]
fn construction_validates_the_shape() {
    let result = TreeMesh::uniform(&[4, 8], 2);
    assert!(matches!(result, Err(NewMeshError::Shape(_))), "2^L mismatch");

    let result = TreeMesh::new(
        vec![
            AxisSpacing::Widths(vec![0.25; 4]),
            AxisSpacing::Widths(vec![0.25; 8]),
        ],
        2,
    );
    assert!(matches!(result, Err(NewMeshError::Shape(_))), "wrong length");

    let result = TreeMesh::new(
        vec![
            AxisSpacing::Widths(vec![0.25, 0.25, -0.25, 0.25]),
            AxisSpacing::Widths(vec![0.25; 4]),
        ],
        2,
    );
    assert!(
        matches!(result, Err(NewMeshError::Shape(_))),
        "negative width"
    );
}

#[test]
fn construction_validates_the_levels() {
    let result = TreeMesh::uniform(&[1, 1], 0);
    assert!(matches!(result, Err(NewMeshError::Level(_))), "no levels");
}

#[test]
fn fresh_mesh_is_a_single_root_cell() {
    let mesh = TreeMesh::uniform(&[4, 4], 2).expect("mesh");

    assert_eq!(mesh.n_cells(), 1);
    assert_eq!(mesh.levels(), 2);
    assert_eq!(u8::from(mesh.dim()), 2);
    assert_eq!(mesh.n_faces(), 4, "one face per side");
    assert_relative_eq!(mesh.cell_volumes()[0], 1.0);
}

#[test]
fn uniform_refinement() {
    let mut mesh = TreeMesh::uniform(&[4, 4], 2).expect("mesh");
    let created = mesh.refine(|_| 1);

    assert_eq!(created.len(), 4);
    assert_eq!(mesh.n_cells(), 4);
    assert_eq!(mesh.n_faces_x(), 6);
    assert_eq!(mesh.n_faces_y(), 6);
    assert_eq!(mesh.n_faces(), 12);
    assert!(mesh.hanging_faces(Axis::X).is_empty());
    assert!(mesh.hanging_faces(Axis::Y).is_empty());

    for &volume in mesh.cell_volumes() {
        assert_relative_eq!(volume, 0.25);
    }
}

#[test]
fn pointer_index_round_trip() {
    let mut mesh = TreeMesh::uniform(&[4, 4], 2).expect("mesh");
    mesh.refine(|_| 1);

    for &index in mesh.cell_indices() {
        let pointer = mesh.cell_pointer(index).expect("valid index");
        let round = mesh.cell_index(&pointer).expect("valid pointer");
        assert_eq!(round, index);
    }
}

#[test]
fn pointer_validation() {
    let mesh = TreeMesh::uniform(&[4, 4], 2).expect("mesh");

    assert!(mesh.pointer(&[0, 0], 1).is_ok(), "aligned");
    assert!(mesh.pointer(&[2, 0], 1).is_ok(), "aligned");
    assert!(mesh.pointer(&[1, 0], 1).is_err(), "misaligned for level 1");
    assert!(mesh.pointer(&[4, 0], 1).is_err(), "out of range");
    assert!(mesh.pointer(&[0, 0], 3).is_err(), "level too deep");
    assert!(mesh.pointer(&[0, 0, 0], 1).is_err(), "wrong arity");
}

#[test]
fn refine_cell_errors() {
    let mut mesh = TreeMesh::uniform(&[4, 4], 2).expect("mesh");
    mesh.refine(|_| 2);

    // Every cell is at the finest level now.
    let finest = mesh.cell_indices()[0];
    assert!(mesh.refine_cell(finest).is_err(), "max level");

    let mut mesh = TreeMesh::uniform(&[4, 4], 2).expect("mesh");
    let root = mesh.cell_indices()[0];
    mesh.refine_cell(root).expect("split the root");
    assert!(mesh.refine_cell(root).is_err(), "split cells are not live");
}

#[test]
fn split_replaces_the_parent_by_four_children() {
    let mut mesh = TreeMesh::uniform(&[4, 4], 2).expect("mesh");
    let root = mesh.cell_indices()[0];

    let children = mesh.refine_cell(root).expect("split");

    assert_eq!(children.len(), 4);
    assert!(!mesh.contains(root));
    for child in children {
        assert!(mesh.contains(child));
        let pointer = mesh.cell_pointer(child).expect("valid");
        assert_eq!(pointer.level(), 1);
    }
}

#[test]
fn graded_refinement_reaches_the_requested_depth() {
    let mut mesh = TreeMesh::uniform(&[4, 4], 2).expect("mesh");
    mesh.refine(|xc| {
        let (dx, dy) = (xc[0] - 0.5, xc[1] - 0.5);
        if (dx * dx + dy * dy).sqrt() < 0.3 {
            2
        } else {
            0
        }
    });

    for &index in mesh.cell_indices() {
        let pointer = mesh.cell_pointer(index).expect("valid");
        let center = mesh.cell_center(index).expect("live");
        let (dx, dy) = (center[0] - 0.5, center[1] - 0.5);
        let wanted: u8 = if (dx * dx + dy * dy).sqrt() < 0.3 { 2 } else { 0 };
        assert!(
            pointer.level() >= wanted,
            "cell at {center:?} is too coarse"
        );
    }

    // The refined mesh still tiles the domain.
    assert_relative_eq!(mesh.cell_volumes().sum(), 1.0, max_relative = 1e-12);
    assert!(mesh.is_balanced());
}

#[test]
fn radial_refinement_is_graded() {
    let mut mesh = TreeMesh::uniform(&[8, 8], 3).expect("mesh");
    mesh.refine(|xc| {
        let (dx, dy) = (xc[0] - 0.5, xc[1] - 0.5);
        let dist = (dx * dx + dy * dy).sqrt();
        if dist < 0.3 {
            3
        } else if dist < 0.6 {
            2
        } else {
            1
        }
    });

    assert!(mesh.n_cells() > 16, "deeper than two uniform levels");
    assert!(
        !mesh.hanging_faces(Axis::X).is_empty(),
        "refinement interfaces exist"
    );
    assert!(mesh.is_balanced());
    assert_relative_eq!(mesh.cell_volumes().sum(), 1.0, max_relative = 1e-12);
}

#[test]
fn volumes_partition_arbitrary_boxes() {
    let mesh = TreeMesh::new(
        vec![
            AxisSpacing::Widths(vec![1.0, 2.0, 3.0, 4.0]),
            AxisSpacing::Widths(vec![0.5, 0.5, 1.0, 1.0]),
        ],
        2,
    )
    .expect("mesh");

    assert_relative_eq!(mesh.cell_volumes().sum(), 10.0 * 3.0);
}

#[test]
fn two_dimensional_edge_aliasing() {
    let mut mesh = TreeMesh::uniform(&[4, 4], 2).expect("mesh");
    mesh.refine(|_| 1);

    assert_eq!(mesh.n_edges(), mesh.n_faces());
    assert_eq!(mesh.n_edges_x(), mesh.n_faces_y());
    assert_eq!(mesh.n_edges_y(), mesh.n_faces_x());
    assert_eq!(mesh.n_edges_z(), None);

    let lengths = mesh.edge_lengths().expect("2-D");
    assert_eq!(lengths.len(), mesh.n_edges());
    // Uniform level-1 cells: every edge has length 0.5.
    for &length in &lengths {
        assert_relative_eq!(length, 0.5);
    }
}

#[test]
fn coarsening_is_not_implemented() {
    let mut mesh = TreeMesh::uniform(&[4, 4], 2).expect("mesh");
    let root = mesh.cell_indices()[0];
    assert!(mesh.coarsen_cell(root).is_err());
}

#[test]
fn spacings_are_preserved() {
    let widths = vec![1.0, 2.0, 3.0, 4.0];
    let mesh = TreeMesh::new(
        vec![
            AxisSpacing::Widths(widths.clone()),
            AxisSpacing::Uniform(4),
        ],
        2,
    )
    .expect("mesh");

    assert_eq!(mesh.spacings()[0], widths);
    assert_relative_eq!(mesh.spacings()[1][0], 0.25);
}
