//! Certified selection of a dependent-variable / parameter partition.

use nalgebra::DVector;

use super::ProofError;
use crate::interval::IntervalVector;
use crate::linear::lu_full_pivot;
use crate::system::ImplicitSystem;
use crate::vars::VarPartition;

/// Picks, from the Jacobian of `f` at `point`, the m variables for which the
/// system is locally solvable in terms of the rest. Indices in
/// `forced_params` can never be selected as dependent: their Jacobian
/// columns are zeroed before pivoting, so the elimination is constrained at
/// the candidate level rather than patched up afterwards.
pub fn select_partition<S: ImplicitSystem>(
    f: &S,
    point: &DVector<f64>,
    forced_params: &[usize],
) -> Result<VarPartition, ProofError> {
    let n = f.n_vars();
    let m = f.n_eqs();
    debug_assert_eq!(point.len(), n);
    debug_assert!(forced_params.iter().all(|&j| j < n));

    let mut a = f.jacobian(&IntervalVector::from_point(point)).mid();
    for &j in forced_params {
        for i in 0..m {
            a[(i, j)] = 0.0;
        }
    }

    let pivots = lu_full_pivot(&a).map_err(|_| ProofError::SingularPartition)?;
    let vars: Vec<usize> = pivots.cols[..m].to_vec();

    for &j in forced_params {
        assert!(
            !vars.contains(&j),
            "forced parameter {j} selected as dependent variable"
        );
    }

    Ok(VarPartition::new(n, vars))
}
