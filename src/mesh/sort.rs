//! Lexicographic grid ordering for permutation operators.

use float_eq::float_eq;
use ndarray::ArrayView2;

/// Tolerance for coordinate ties on all but the innermost axis.
const EPS: f64 = 1e-7;

/// Indices `[offset, offset + n)` ordered so that the rows of `grid` sort
/// lexicographically by last coordinate first (z, then y, then x).
///
/// Coordinates within `EPS` of each other tie and defer to the next inner
/// axis; the innermost axis compares raw values.
pub(crate) fn sort_grid(grid: ArrayView2<'_, f64>, offset: usize) -> Vec<usize> {
    let mut order: Vec<usize> = (offset..offset + grid.nrows()).collect();
    order.sort_by(|&a, &b| {
        let lhs = grid.row(a - offset);
        let rhs = grid.row(b - offset);
        for k in (1..lhs.len()).rev() {
            if !float_eq!(lhs[k], rhs[k], abs <= EPS) {
                return lhs[k].total_cmp(&rhs[k]);
            }
        }
        lhs[0].total_cmp(&rhs[0])
    });
    order
}

#[cfg(test)]
#[path = "./sort_tests.rs"]
mod tests;
