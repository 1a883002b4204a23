//! Combinatorial linear-programming proof that a boundary map is a
//! homeomorphism onto a half-ball.

use nalgebra::DVector;

use crate::interval::{IntervalMatrix, IntervalVector};
use crate::lp::{Cmp, LpProblem};

/// Certifies that the boundary solution mapping with image enclosure
/// `image_bound` and Jacobian enclosure `jacobian_bound` over `param_box` is
/// a homeomorphism onto a half-ball.
///
/// Every one of the 2^k sign patterns over the k Jacobian rows selects,
/// per row, either the lower bound row with a `>=` inequality or the upper
/// bound row with a `<=` inequality, all anchored at the lower corner of the
/// parameter box. The property holds on the whole boundary exactly when each
/// of the resulting linear programs is feasible, so the test returns `false`
/// the moment any pattern fails to come back optimal. Zero rows (k = 0)
/// constrain nothing and certify trivially.
pub fn is_homeomorph_half_ball(
    image_bound: &IntervalVector,
    jacobian_bound: &IntervalMatrix,
    param_box: &IntervalVector,
) -> bool {
    let p = param_box.len();
    let k = jacobian_bound.nrows();
    debug_assert_eq!(image_bound.len(), k);
    debug_assert_eq!(jacobian_bound.ncols(), p);
    assert!(k < usize::BITS as usize, "sign-pattern count 2^{k} overflows");

    if k == 0 {
        // The single empty sign pattern constrains nothing.
        return true;
    }
    if param_box.is_empty() {
        return false;
    }

    let pinf = param_box.lb();
    let jinf = jacobian_bound.lb();
    let jsup = jacobian_bound.ub();
    let jinf_pinf = &jinf * &pinf;
    let jsup_pinf = &jsup * &pinf;

    let mut lp = LpProblem::new(param_box);
    // Only feasibility matters; any strictly decreasing objective does.
    let objective = DVector::from_fn(p, |i, _| if i == 0 { 1.0 } else { 0.0 });

    for pattern in 0u64..(1u64 << k) {
        lp.clear_constraints();
        for i in 0..k {
            if (pattern >> i) & 1 == 1 {
                lp.add_constraint(
                    jinf.row(i).transpose(),
                    Cmp::Geq,
                    jinf_pinf[i] - image_bound[i].lo,
                );
            } else {
                lp.add_constraint(
                    jsup.row(i).transpose(),
                    Cmp::Leq,
                    jsup_pinf[i] - image_bound[i].hi,
                );
            }
        }

        if !lp.minimize(&objective).is_optimal() {
            return false;
        }
    }

    true
}
