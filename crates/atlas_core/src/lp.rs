//! Dense linear-programming engine for small feasibility queries.
//!
//! Variables carry box bounds, inequality constraints are added and cleared
//! incrementally, and `minimize` reports one of four statuses. The solver is
//! a two-phase tableau simplex with Bland's rule; the problems posed by the
//! homeomorphism certifier have a handful of variables and constraints, so
//! simplicity wins over sparsity here.

use nalgebra::DVector;

use crate::interval::IntervalVector;

const PIVOT_EPS: f64 = 1e-9;
const FEAS_EPS: f64 = 1e-9;
const MAX_PIVOTS: usize = 1000;

/// Direction of a linear inequality `row . x (cmp) rhs`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cmp {
    Leq,
    Geq,
}

/// Outcome of a `minimize` query.
#[derive(Debug, Clone)]
pub enum LpStatus {
    /// An optimal vertex, in the original (unshifted) variables.
    Optimal(DVector<f64>),
    Infeasible,
    Unbounded,
    IterLimit,
}

impl LpStatus {
    pub fn is_optimal(&self) -> bool {
        matches!(self, LpStatus::Optimal(_))
    }
}

/// A linear program over box-bounded variables.
///
/// Lower bounds must be finite (the internal shift to nonnegative variables
/// needs them); upper bounds may be infinite.
#[derive(Debug, Clone)]
pub struct LpProblem {
    lower: Vec<f64>,
    upper: Vec<f64>,
    rows: Vec<DVector<f64>>,
    cmps: Vec<Cmp>,
    rhs: Vec<f64>,
}

impl LpProblem {
    /// A problem whose variables are bounded by the given box.
    pub fn new(domain: &IntervalVector) -> Self {
        let lower: Vec<f64> = (0..domain.len()).map(|i| domain[i].lo).collect();
        let upper: Vec<f64> = (0..domain.len()).map(|i| domain[i].hi).collect();
        debug_assert!(
            lower.iter().all(|l| l.is_finite()),
            "variable lower bounds must be finite"
        );
        Self {
            lower,
            upper,
            rows: Vec::new(),
            cmps: Vec::new(),
            rhs: Vec::new(),
        }
    }

    pub fn n_vars(&self) -> usize {
        self.lower.len()
    }

    pub fn n_constraints(&self) -> usize {
        self.rows.len()
    }

    pub fn add_constraint(&mut self, row: DVector<f64>, cmp: Cmp, rhs: f64) {
        debug_assert_eq!(row.len(), self.lower.len());
        self.rows.push(row);
        self.cmps.push(cmp);
        self.rhs.push(rhs);
    }

    pub fn clear_constraints(&mut self) {
        self.rows.clear();
        self.cmps.clear();
        self.rhs.clear();
    }

    /// Minimizes `objective . x` over the bounds and current constraints.
    pub fn minimize(&self, objective: &DVector<f64>) -> LpStatus {
        let p = self.lower.len();
        debug_assert_eq!(objective.len(), p);

        if p == 0 {
            // No variables: every constraint is a sign check on its rhs.
            for i in 0..self.rows.len() {
                let ok = match self.cmps[i] {
                    Cmp::Leq => 0.0 <= self.rhs[i] + FEAS_EPS,
                    Cmp::Geq => 0.0 >= self.rhs[i] - FEAS_EPS,
                };
                if !ok {
                    return LpStatus::Infeasible;
                }
            }
            return LpStatus::Optimal(DVector::zeros(0));
        }

        // Shift to y = x - lower >= 0 and normalize every inequality to
        // `a . y <= b`; finite upper bounds become ordinary rows.
        let mut a_rows: Vec<Vec<f64>> = Vec::new();
        let mut b: Vec<f64> = Vec::new();
        for i in 0..self.rows.len() {
            let shift: f64 = (0..p).map(|j| self.rows[i][j] * self.lower[j]).sum();
            match self.cmps[i] {
                Cmp::Leq => {
                    a_rows.push(self.rows[i].iter().copied().collect());
                    b.push(self.rhs[i] - shift);
                }
                Cmp::Geq => {
                    a_rows.push(self.rows[i].iter().map(|v| -v).collect());
                    b.push(shift - self.rhs[i]);
                }
            }
        }
        for j in 0..p {
            if self.upper[j].is_finite() {
                let mut row = vec![0.0; p];
                row[j] = 1.0;
                a_rows.push(row);
                b.push(self.upper[j] - self.lower[j]);
            }
        }

        let cost: Vec<f64> = objective.iter().copied().collect();
        match Tableau::solve(p, &a_rows, &b, &cost) {
            SimplexOutcome::Optimal(y) => {
                let x = DVector::from_fn(p, |j, _| self.lower[j] + y[j]);
                LpStatus::Optimal(x)
            }
            SimplexOutcome::Infeasible => LpStatus::Infeasible,
            SimplexOutcome::Unbounded => LpStatus::Unbounded,
            SimplexOutcome::IterLimit => LpStatus::IterLimit,
        }
    }
}

enum SimplexOutcome {
    Optimal(Vec<f64>),
    Infeasible,
    Unbounded,
    IterLimit,
}

enum RunEnd {
    Optimal,
    Unbounded,
    IterLimit,
}

/// Full-tableau simplex state for `min c.y, A y <= b, y >= 0`.
struct Tableau {
    p: usize,
    n_slack: usize,
    n_art: usize,
    rows: Vec<Vec<f64>>,
    obj: Vec<f64>,
    basis: Vec<usize>,
    active: Vec<bool>,
    pivots_left: usize,
}

impl Tableau {
    fn solve(p: usize, a_rows: &[Vec<f64>], b: &[f64], cost: &[f64]) -> SimplexOutcome {
        let m = a_rows.len();
        let n_art = b.iter().filter(|&&bi| bi < 0.0).count();

        // Columns: p structural, m slacks, then artificials; one rhs slot.
        let width = p + m + n_art + 1;
        let mut rows = vec![vec![0.0; width]; m];
        let mut basis = vec![0usize; m];
        let mut art = p + m;
        for i in 0..m {
            for j in 0..p {
                rows[i][j] = a_rows[i][j];
            }
            rows[i][p + i] = 1.0;
            rows[i][width - 1] = b[i];
            if b[i] < 0.0 {
                // Negate the row so the rhs is nonnegative and give it an
                // artificial basic variable.
                for v in rows[i].iter_mut() {
                    *v = -*v;
                }
                rows[i][art] = 1.0;
                basis[i] = art;
                art += 1;
            } else {
                basis[i] = p + i;
            }
        }

        let mut tab = Tableau {
            p,
            n_slack: m,
            n_art,
            rows,
            obj: vec![0.0; width],
            basis,
            active: vec![true; m],
            pivots_left: MAX_PIVOTS,
        };

        if n_art > 0 {
            // Phase 1: drive the artificials to zero.
            let mut phase1 = vec![0.0; p + m + n_art];
            for j in p + m..p + m + n_art {
                phase1[j] = 1.0;
            }
            tab.install_objective(&phase1);
            match tab.run(true) {
                RunEnd::Optimal => {}
                // Phase 1 minimizes a sum of nonnegative variables, so an
                // unbounded ray here means the tableau lost feasibility.
                RunEnd::Unbounded => return SimplexOutcome::Infeasible,
                RunEnd::IterLimit => return SimplexOutcome::IterLimit,
            }
            if tab.objective_value() > FEAS_EPS {
                return SimplexOutcome::Infeasible;
            }
            tab.evict_artificials();
        }

        let mut phase2 = vec![0.0; p + m + n_art];
        phase2[..p].copy_from_slice(cost);
        tab.install_objective(&phase2);
        match tab.run(false) {
            RunEnd::Optimal => SimplexOutcome::Optimal(tab.solution()),
            RunEnd::Unbounded => SimplexOutcome::Unbounded,
            RunEnd::IterLimit => SimplexOutcome::IterLimit,
        }
    }

    fn width(&self) -> usize {
        self.p + self.n_slack + self.n_art + 1
    }

    fn rhs_col(&self) -> usize {
        self.width() - 1
    }

    fn first_art(&self) -> usize {
        self.p + self.n_slack
    }

    /// Resets the objective row to `cost` and prices out the basic columns.
    fn install_objective(&mut self, cost: &[f64]) {
        let rhs = self.rhs_col();
        self.obj = vec![0.0; self.width()];
        self.obj[..rhs].copy_from_slice(cost);
        for i in 0..self.rows.len() {
            if !self.active[i] {
                continue;
            }
            let cb = cost[self.basis[i]];
            if cb != 0.0 {
                for j in 0..self.width() {
                    self.obj[j] -= cb * self.rows[i][j];
                }
            }
        }
    }

    fn objective_value(&self) -> f64 {
        -self.obj[self.rhs_col()]
    }

    fn pivot(&mut self, r: usize, e: usize) {
        let inv = 1.0 / self.rows[r][e];
        for v in self.rows[r].iter_mut() {
            *v *= inv;
        }
        let pivot_row = self.rows[r].clone();
        for i in 0..self.rows.len() {
            if i == r || !self.active[i] {
                continue;
            }
            let f = self.rows[i][e];
            if f != 0.0 {
                for (v, &pv) in self.rows[i].iter_mut().zip(&pivot_row) {
                    *v -= f * pv;
                }
            }
        }
        let f = self.obj[e];
        if f != 0.0 {
            for (v, &pv) in self.obj.iter_mut().zip(&pivot_row) {
                *v -= f * pv;
            }
        }
        self.basis[r] = e;
    }

    /// Bland's rule simplex loop. `allow_art` admits artificial columns as
    /// entering candidates (phase 1 only).
    fn run(&mut self, allow_art: bool) -> RunEnd {
        let n_cols = if allow_art {
            self.first_art() + self.n_art
        } else {
            self.first_art()
        };
        let rhs = self.rhs_col();

        loop {
            if self.pivots_left == 0 {
                return RunEnd::IterLimit;
            }

            let entering = (0..n_cols).find(|&j| self.obj[j] < -PIVOT_EPS);
            let Some(e) = entering else {
                return RunEnd::Optimal;
            };

            let mut leave: Option<(usize, f64)> = None;
            for r in 0..self.rows.len() {
                if !self.active[r] || self.rows[r][e] <= PIVOT_EPS {
                    continue;
                }
                let ratio = (self.rows[r][rhs].max(0.0)) / self.rows[r][e];
                let better = match leave {
                    None => true,
                    Some((lr, lratio)) => {
                        ratio < lratio - PIVOT_EPS
                            || (ratio <= lratio + PIVOT_EPS && self.basis[r] < self.basis[lr])
                    }
                };
                if better {
                    leave = Some((r, ratio));
                }
            }
            let Some((r, _)) = leave else {
                return RunEnd::Unbounded;
            };

            self.pivot(r, e);
            self.pivots_left -= 1;
        }
    }

    /// Pivots basic artificials out of the basis after phase 1; a row whose
    /// non-artificial part vanished is redundant and gets deactivated.
    fn evict_artificials(&mut self) {
        let first_art = self.first_art();
        for r in 0..self.rows.len() {
            if !self.active[r] || self.basis[r] < first_art {
                continue;
            }
            let pivot_col = (0..first_art).find(|&j| self.rows[r][j].abs() > PIVOT_EPS);
            match pivot_col {
                Some(j) => self.pivot(r, j),
                None => self.active[r] = false,
            }
        }
    }

    fn solution(&self) -> Vec<f64> {
        let rhs = self.rhs_col();
        let mut y = vec![0.0; self.p];
        for r in 0..self.rows.len() {
            if self.active[r] && self.basis[r] < self.p {
                y[self.basis[r]] = self.rows[r][rhs].max(0.0);
            }
        }
        y
    }
}
