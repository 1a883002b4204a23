//! Parametric interval Newton contraction.
//!
//! Contracts the dependent-variable components of a box while the parameter
//! components stay fixed as intervals, using the mean-value enclosure
//! `f(x, p) in f(x_mid, [p]) + Jx([x], [p]) (x - x_mid)` preconditioned by an
//! approximate inverse of the midpoint Jacobian. An inconsistent box becomes
//! empty; the operator itself cannot fail.

use nalgebra::DMatrix;
use num_traits::Zero;

use crate::interval::{Interval, IntervalMatrix, IntervalVector};
use crate::system::ImplicitSystem;
use crate::vars::VarPartition;

/// Default precision proving existence (tight).
pub const CERTIFY_PREC: f64 = 1e-12;

/// Default precision for constraint-propagation pruning (loose).
pub const CONTRACT_PREC: f64 = 1e-8;

/// Hard cap on Gauss-Seidel sweeps per call.
const MAX_SWEEPS: usize = 64;

/// Contracts the X-components of `boxv` in place. `prec` is the width
/// improvement below which iteration stops: the smaller the precision, the
/// longer the operator keeps contracting.
pub fn newton_contract<S: ImplicitSystem>(
    f: &S,
    vars: &VarPartition,
    boxv: &mut IntervalVector,
    prec: f64,
) {
    let m = vars.n_vars();
    debug_assert_eq!(f.n_eqs(), m);
    debug_assert_eq!(f.n_vars(), vars.dim());
    debug_assert_eq!(boxv.len(), vars.dim());

    for _ in 0..MAX_SWEEPS {
        if boxv.is_empty() {
            return;
        }

        let jx = f.jacobian(boxv).columns(vars.vars());
        let x = vars.var_box(boxv);
        let x_mid = x.mid();

        // Residual at the dependent midpoint, parameters kept as intervals.
        let mid_box = vars.full_box(
            &IntervalVector::from_point(&x_mid),
            &vars.param_box(boxv),
        );
        let fm = f.eval(&mid_box);

        let Some(pre) = jx.mid().try_inverse() else {
            // Midpoint Jacobian is singular: no preconditioner, no progress.
            return;
        };
        let m_mat = precondition_matrix(&pre, &jx);
        let r = precondition_vector(&pre, &fm);

        let mut new_x = x.clone();
        let mut gain: f64 = 0.0;
        for i in 0..m {
            let mii = m_mat[(i, i)];
            if mii.contains(0.0) {
                continue;
            }
            let mut acc = r[i];
            for j in 0..m {
                if j != i {
                    acc = acc + m_mat[(i, j)] * (new_x[j] - Interval::point(x_mid[j]));
                }
            }
            let cand = Interval::point(x_mid[i]) - acc / mii;
            let met = cand.intersect(new_x[i]);
            if met.is_empty() {
                boxv.set_empty();
                return;
            }
            gain = gain.max(new_x[i].diam() - met.diam());
            new_x[i] = met;
        }

        vars.write_var_box(boxv, &new_x);
        if gain <= prec {
            return;
        }
    }
}

/// `C * J` with a real preconditioner and an interval matrix.
fn precondition_matrix(c: &DMatrix<f64>, j: &IntervalMatrix) -> IntervalMatrix {
    let m = j.nrows();
    let n = j.ncols();
    debug_assert_eq!(c.ncols(), m);
    IntervalMatrix::from_fn(c.nrows(), n, |i, k| {
        let mut acc = Interval::zero();
        for l in 0..m {
            acc = acc + j[(l, k)] * c[(i, l)];
        }
        acc
    })
}

/// `C * v` with a real preconditioner and an interval vector.
fn precondition_vector(c: &DMatrix<f64>, v: &IntervalVector) -> IntervalVector {
    debug_assert_eq!(c.ncols(), v.len());
    IntervalVector::new(
        (0..c.nrows())
            .map(|i| {
                let mut acc = Interval::zero();
                for l in 0..v.len() {
                    acc = acc + v[l] * c[(i, l)];
                }
                acc
            })
            .collect(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interval::{Interval, IntervalMatrix, IntervalVector};

    /// f(x, y) = x^2 + y^2 - 1, the unit circle.
    struct Circle;

    impl ImplicitSystem for Circle {
        fn n_vars(&self) -> usize {
            2
        }

        fn n_eqs(&self) -> usize {
            1
        }

        fn eval(&self, x: &IntervalVector) -> IntervalVector {
            let v = x[0] * x[0] + x[1] * x[1] - Interval::point(1.0);
            IntervalVector::new(vec![v])
        }

        fn jacobian(&self, x: &IntervalVector) -> IntervalMatrix {
            IntervalMatrix::from_fn(1, 2, |_, j| x[j] * 2.0)
        }
    }

    #[test]
    fn test_contracts_onto_root() {
        // Solve x^2 + y^2 = 1 for x with y pinned to 0: root at x = 1.
        let vars = VarPartition::new(2, vec![0]);
        let mut boxv = IntervalVector::new(vec![
            Interval::new(0.5, 1.5),
            Interval::point(0.0),
        ]);

        newton_contract(&Circle, &vars, &mut boxv, CERTIFY_PREC);

        assert!(!boxv.is_empty());
        assert!(boxv[0].contains(1.0), "root must stay enclosed, got {:?}", boxv[0]);
        assert!(boxv[0].diam() < 1e-9, "certification precision should pin the root");
        assert_eq!(boxv[1], Interval::point(0.0), "parameters are never touched");
    }

    #[test]
    fn test_empties_rootless_box() {
        let vars = VarPartition::new(2, vec![0]);
        let mut boxv = IntervalVector::new(vec![
            Interval::new(2.0, 3.0),
            Interval::new(-0.1, 0.1),
        ]);

        newton_contract(&Circle, &vars, &mut boxv, CONTRACT_PREC);

        assert!(boxv.is_empty(), "no circle point has x in [2, 3]");
    }

    #[test]
    fn test_contraction_is_sound_over_parameter_range() {
        // With y ranging over [-0.1, 0.1] the x-solutions fill
        // [sqrt(0.99), 1]; the contracted box must still cover all of them.
        let vars = VarPartition::new(2, vec![0]);
        let mut boxv = IntervalVector::new(vec![
            Interval::new(0.5, 1.5),
            Interval::new(-0.1, 0.1),
        ]);

        newton_contract(&Circle, &vars, &mut boxv, CONTRACT_PREC);

        assert!(!boxv.is_empty());
        assert!(boxv[0].contains(0.99_f64.sqrt()));
        assert!(boxv[0].contains(1.0));
    }

    #[test]
    fn test_rerun_is_stable_at_fixpoint() {
        let vars = VarPartition::new(2, vec![0]);
        let mut boxv = IntervalVector::new(vec![
            Interval::new(0.5, 1.5),
            Interval::point(0.0),
        ]);
        newton_contract(&Circle, &vars, &mut boxv, CERTIFY_PREC);

        let before = boxv.clone();
        newton_contract(&Circle, &vars, &mut boxv, CERTIFY_PREC);
        assert!(boxv.is_subset(&before));
        assert!(
            (boxv[0].diam() - before[0].diam()).abs() <= CERTIFY_PREC,
            "a fully contracted box re-contracts below the precision floor"
        );
    }
}
