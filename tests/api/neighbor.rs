use treemesh::{Axis, Neighbor, Side, TreeMesh};

/// Every neighbor relation must close: walking back from the neighbor
/// finds the original cell.
fn assert_closure(mesh: &TreeMesh) {
    for &cell in mesh.cell_indices() {
        for &axis in Axis::all(mesh.dim()) {
            for side in Side::BOTH {
                let back = match side {
                    Side::Negative => Side::Positive,
                    Side::Positive => Side::Negative,
                };
                match mesh.next_cell(cell, axis, side).expect("live") {
                    Neighbor::Boundary => {}
                    Neighbor::Same(neighbor) => {
                        let result = mesh
                            .next_cell(neighbor, axis, back)
                            .expect("live");
                        assert_eq!(
                            result,
                            Neighbor::Same(cell),
                            "same-level closure"
                        );
                    }
                    Neighbor::Coarser(neighbor) => {
                        let result = mesh
                            .next_cell(neighbor, axis, back)
                            .expect("live");
                        match result {
                            Neighbor::Finer(cells) => {
                                assert!(
                                    cells.contains(&cell),
                                    "coarser closure"
                                );
                            }
                            other => {
                                panic!("expected finer cells, got {other:?}")
                            }
                        }
                    }
                    Neighbor::Finer(cells) => {
                        for neighbor in cells {
                            let result = mesh
                                .next_cell(neighbor, axis, back)
                                .expect("live");
                            assert_eq!(
                                result,
                                Neighbor::Coarser(cell),
                                "finer closure"
                            );
                        }
                    }
                }
            }
        }
    }
}

#[test]
fn closure_on_a_graded_2d_mesh() {
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
    assert!(mesh.is_balanced());

    assert_closure(&mesh);
}

#[test]
fn closure_on_a_graded_3d_mesh() {
    let mut mesh = TreeMesh::uniform(&[4, 4, 4], 2).expect("mesh");
    mesh.refine(|_| 1);
    let target = mesh.pointer(&[0, 0, 0], 1).expect("pointer");
    mesh.refine_cell_at(&target).expect("split");
    assert!(mesh.is_balanced());

    assert_closure(&mesh);
}

#[test]
fn finer_lists_have_one_cell_per_shared_face() {
    let mut mesh = TreeMesh::uniform(&[4, 4, 4], 2).expect("mesh");
    mesh.refine(|_| 1);
    let target = mesh.pointer(&[0, 0, 0], 1).expect("pointer");
    mesh.refine_cell_at(&target).expect("split");

    let coarse = mesh
        .cell_index(&mesh.pointer(&[2, 0, 0], 1).expect("pointer"))
        .expect("index");
    match mesh.next_cell(coarse, Axis::X, Side::Negative).expect("live") {
        Neighbor::Finer(cells) => assert_eq!(cells.len(), 4),
        other => panic!("expected finer cells, got {other:?}"),
    }
}
