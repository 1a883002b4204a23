//! Real-valued Gaussian elimination with full pivoting.
//!
//! nalgebra's factorizations do not expose the column order as a plain index
//! permutation, which is the one output the variable partitioner needs, so
//! the elimination is done directly here.

use nalgebra::DMatrix;
use thiserror::Error;

/// Pivot magnitude below which a column is treated as dependent on the ones
/// already selected.
const PIVOT_MIN: f64 = 1e-10;

/// The matrix contains no invertible m x m submatrix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("matrix has no invertible {0}x{0} submatrix")]
pub struct SingularMatrix(pub usize);

/// Row and column permutations produced by the elimination. `cols[..m]` are
/// the pivot columns, in pivot order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pivots {
    pub rows: Vec<usize>,
    pub cols: Vec<usize>,
}

/// LU-factors an m x n matrix (m <= n) with full row/column pivoting,
/// returning the permutations. Fails when fewer than m linearly independent
/// columns exist.
pub fn lu_full_pivot(a: &DMatrix<f64>) -> Result<Pivots, SingularMatrix> {
    let m = a.nrows();
    let n = a.ncols();
    assert!(m <= n, "more equations than variables ({m} x {n})");

    let mut work = a.clone();
    let mut rows: Vec<usize> = (0..m).collect();
    let mut cols: Vec<usize> = (0..n).collect();

    for k in 0..m {
        let mut best = (k, k);
        let mut best_abs = 0.0;
        for i in k..m {
            for j in k..n {
                let v = work[(i, j)].abs();
                if v > best_abs {
                    best_abs = v;
                    best = (i, j);
                }
            }
        }
        if best_abs <= PIVOT_MIN {
            return Err(SingularMatrix(m));
        }

        let (pi, pj) = best;
        work.swap_rows(k, pi);
        rows.swap(k, pi);
        work.swap_columns(k, pj);
        cols.swap(k, pj);

        for i in k + 1..m {
            let factor = work[(i, k)] / work[(k, k)];
            for j in k..n {
                work[(i, j)] -= factor * work[(k, j)];
            }
        }
    }

    Ok(Pivots { rows, cols })
}
