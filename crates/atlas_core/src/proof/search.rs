//! Certified search for a solution inside a facet.

use super::{ProofError, SearchSettings, Worklist};
use crate::interval::IntervalVector;
use crate::newton::newton_contract;
use crate::system::ImplicitSystem;
use crate::vars::VarPartition;

/// Either certifies a solution of `f = 0` inside `facet`, certifies that
/// none exists (emptying `facet` and returning an empty box), or fails with
/// `SearchInconclusive` when the budget runs out or some parameter region
/// stays ambiguous.
///
/// The parameter space is explored sub-box by sub-box: each candidate first
/// gets an existence attempt (tight Newton at the parameter midpoint,
/// looking for strict interior contraction of the X-part), then an absence
/// attempt (loose Newton over the whole sub-box), and is bisected along its
/// widest coordinate when both are inconclusive.
pub fn find_solution<S: ImplicitSystem>(
    f: &S,
    facet: &mut IntervalVector,
    vars: &VarPartition,
    settings: &SearchSettings,
) -> Result<IntervalVector, ProofError> {
    let n = facet.len();
    debug_assert_eq!(n, vars.dim());
    debug_assert_eq!(f.n_vars(), n);

    if facet.is_empty() || facet.max_diam() <= settings.resolved_tol {
        return Ok(facet.clone());
    }

    let x = vars.var_box(facet);
    let mut worklist = Worklist::new(settings.order);
    worklist.push(vars.param_box(facet));

    let mut sol_maybe_lost = 0usize;
    let mut iter = 0usize;

    while let Some(p) = worklist.pop() {
        if iter == settings.max_iter {
            return Err(ProofError::SearchInconclusive);
        }
        iter += 1;

        // Existence attempt: pin the parameters to the sample midpoint and
        // look for a strict interior contraction of the X-part.
        let mut boxv = vars.full_box(&x, &IntervalVector::from_point(&p.mid()));
        newton_contract(f, vars, &mut boxv, settings.certify_prec);
        if !boxv.is_empty() && vars.var_box(&boxv).is_interior_subset(&x) {
            // TODO: contract `facet` to the hull of the sub-boxes still on
            // the worklist before returning, so the caller keeps a tighter
            // facet alongside the certified solution.
            return Ok(boxv);
        }

        // Absence attempt: contract over the whole parameter sub-box.
        let mut boxv = vars.full_box(&x, &p);
        newton_contract(f, vars, &mut boxv, settings.contract_prec);
        if boxv.is_empty() {
            continue;
        }

        if p.max_diam() < settings.lost_tol {
            // Solutions for [p] may hug a bound of the x domain so closely
            // that the sampled Newton can neither contract to a strict
            // inclusion nor prune to the empty set. The search goes on, but
            // this facet can no longer be contracted to nothing.
            sol_maybe_lost += 1;
            continue;
        }

        let (left, right) = p.bisect(p.max_diam_index());
        worklist.push(left);
        worklist.push(right);
    }

    if sol_maybe_lost == 0 {
        facet.set_empty();
        Ok(IntervalVector::empty(n))
    } else {
        Err(ProofError::SearchInconclusive)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interval::{Interval, IntervalMatrix};
    use crate::proof::select_partition;
    use nalgebra::DVector;

    /// f(x, y) = x^2 + y^2 - 1.
    struct Circle;

    impl ImplicitSystem for Circle {
        fn n_vars(&self) -> usize {
            2
        }

        fn n_eqs(&self) -> usize {
            1
        }

        fn eval(&self, x: &IntervalVector) -> IntervalVector {
            IntervalVector::new(vec![x[0] * x[0] + x[1] * x[1] - Interval::point(1.0)])
        }

        fn jacobian(&self, x: &IntervalVector) -> IntervalMatrix {
            IntervalMatrix::from_fn(1, 2, |_, j| x[j] * 2.0)
        }
    }

    fn circle_partition() -> VarPartition {
        let p = select_partition(&Circle, &DVector::from_vec(vec![1.0, 0.0]), &[])
            .expect("circle Jacobian at (1, 0) is non-degenerate");
        assert_eq!((p.n_vars(), p.n_params()), (1, 1));
        p
    }

    fn facet_near_root() -> IntervalVector {
        IntervalVector::new(vec![Interval::new(0.5, 1.5), Interval::new(-0.1, 0.1)])
    }

    fn facet_far_from_root() -> IntervalVector {
        IntervalVector::new(vec![Interval::new(2.0, 3.0), Interval::new(-0.1, 0.1)])
    }

    #[test]
    fn test_certifies_solution_on_first_iteration() {
        let vars = circle_partition();
        let mut facet = facet_near_root();
        let original = facet.clone();

        // A budget of one iteration suffices: the midpoint sample already
        // contracts strictly inside the x bounds.
        let settings = SearchSettings {
            max_iter: 1,
            ..SearchSettings::default()
        };
        let sol = find_solution(&Circle, &mut facet, &vars, &settings)
            .expect("midpoint Newton certifies immediately");

        assert!(!sol.is_empty());
        assert!(sol.is_subset(&original));
        assert!(sol[0].contains(1.0), "the root x = 1 must be enclosed");
        assert!(!facet.is_empty(), "a certified facet is not emptied");
    }

    #[test]
    fn test_certified_box_is_newton_stable() {
        let vars = circle_partition();
        let mut facet = facet_near_root();
        let sol = find_solution(&Circle, &mut facet, &vars, &SearchSettings::default())
            .expect("solution exists");

        let mut again = sol.clone();
        newton_contract(&Circle, &vars, &mut again, SearchSettings::default().certify_prec);
        assert!(again.is_subset(&sol));
        assert!(
            (sol[0].diam() - again[0].diam()).abs() <= 1e-9,
            "re-contracting a certified box must be a fixpoint up to precision"
        );
    }

    #[test]
    fn test_certifies_absence_far_from_roots() {
        let vars = circle_partition();
        let mut facet = facet_far_from_root();

        let empty = find_solution(&Circle, &mut facet, &vars, &SearchSettings::default())
            .expect("absence is decidable here");

        assert!(empty.is_empty());
        assert!(facet.is_empty(), "a disproved facet is emptied in place");
    }

    #[test]
    fn test_absence_verdict_is_deterministic() {
        let vars = circle_partition();
        let original = facet_far_from_root();

        for _ in 0..2 {
            let mut facet = original.clone();
            let empty = find_solution(&Circle, &mut facet, &vars, &SearchSettings::default())
                .expect("absence is decidable here");
            assert!(empty.is_empty());
            assert!(facet.is_empty());
        }
    }

    /// f(x, y) = x^2 - 1: for every parameter value the root sits at x = 1.
    struct BoundaryRoot;

    impl ImplicitSystem for BoundaryRoot {
        fn n_vars(&self) -> usize {
            2
        }

        fn n_eqs(&self) -> usize {
            1
        }

        fn eval(&self, x: &IntervalVector) -> IntervalVector {
            IntervalVector::new(vec![x[0] * x[0] - Interval::point(1.0)])
        }

        fn jacobian(&self, x: &IntervalVector) -> IntervalMatrix {
            IntervalMatrix::from_fn(1, 2, |_, j| {
                if j == 0 {
                    x[0] * 2.0
                } else {
                    Interval::point(0.0)
                }
            })
        }
    }

    #[test]
    fn test_budget_exhaustion_is_inconclusive() {
        // The root hugs the upper x bound for every parameter value, so the
        // strict-interior test never passes, absence can never be proved,
        // and the search bisects until the budget runs out.
        let vars = VarPartition::new(2, vec![0]);
        let mut facet =
            IntervalVector::new(vec![Interval::new(0.5, 1.0), Interval::new(-0.1, 0.1)]);

        let settings = SearchSettings {
            max_iter: 50,
            ..SearchSettings::default()
        };
        assert_eq!(
            find_solution(&BoundaryRoot, &mut facet, &vars, &settings),
            Err(ProofError::SearchInconclusive)
        );
        assert!(!facet.is_empty(), "an inconclusive search must not empty the facet");
    }

    #[test]
    fn test_possibly_lost_region_is_inconclusive_within_budget() {
        // Same boundary-hugging root, but the parameter box is already below
        // the fine floor: the sub-box is counted as possibly lost and the
        // worklist drains without a verdict.
        let vars = VarPartition::new(2, vec![0]);
        let mut facet =
            IntervalVector::new(vec![Interval::new(0.5, 1.0), Interval::new(0.0, 1e-13)]);

        assert_eq!(
            find_solution(&BoundaryRoot, &mut facet, &vars, &SearchSettings::default()),
            Err(ProofError::SearchInconclusive)
        );
        assert!(!facet.is_empty());
    }

    #[test]
    fn test_empty_or_resolved_facet_returns_unchanged() {
        let vars = circle_partition();
        let settings = SearchSettings::default();

        let mut empty = IntervalVector::empty(2);
        let out = find_solution(&Circle, &mut empty, &vars, &settings).expect("trivial");
        assert!(out.is_empty());

        let mut tiny = IntervalVector::new(vec![
            Interval::new(1.0, 1.0 + 1e-12),
            Interval::point(0.0),
        ]);
        let out = find_solution(&Circle, &mut tiny, &vars, &settings).expect("trivial");
        assert_eq!(out, tiny, "a facet below the noise floor is already resolved");
    }

    #[test]
    fn test_breadth_first_order_reaches_the_same_verdicts() {
        let vars = circle_partition();
        let settings = SearchSettings {
            order: crate::proof::SearchOrder::BreadthFirst,
            ..SearchSettings::default()
        };

        let mut near = facet_near_root();
        assert!(find_solution(&Circle, &mut near, &vars, &settings).is_ok());

        let mut far = facet_far_from_root();
        let empty = find_solution(&Circle, &mut far, &vars, &settings).expect("absence");
        assert!(empty.is_empty() && far.is_empty());
    }
}
