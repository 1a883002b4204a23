//! Partition of a system's input variables into dependent unknowns and
//! parameters, per the implicit function theorem.

use serde::{Deserialize, Serialize};

use crate::interval::IntervalVector;

/// An ordered pair of disjoint index sets covering `{0..n-1}`: the dependent
/// variables X (solved for, |X| = number of equations) and the parameters P
/// (treated as free inputs).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VarPartition {
    n: usize,
    vars: Vec<usize>,
    params: Vec<usize>,
}

impl VarPartition {
    /// Builds a partition from the dependent index set; the parameter set is
    /// its complement. Indices must be in range and free of duplicates.
    pub fn new(n: usize, mut vars: Vec<usize>) -> Self {
        vars.sort_unstable();
        assert!(
            vars.windows(2).all(|w| w[0] < w[1]),
            "duplicate dependent-variable index"
        );
        assert!(
            vars.last().is_none_or(|&i| i < n),
            "dependent-variable index out of range"
        );
        let params = (0..n).filter(|i| !vars.contains(i)).collect();
        Self { n, vars, params }
    }

    /// Total number of coordinates n.
    pub fn dim(&self) -> usize {
        self.n
    }

    pub fn n_vars(&self) -> usize {
        self.vars.len()
    }

    pub fn n_params(&self) -> usize {
        self.params.len()
    }

    /// Dependent-variable indices, ascending.
    pub fn vars(&self) -> &[usize] {
        &self.vars
    }

    /// Parameter indices, ascending.
    pub fn params(&self) -> &[usize] {
        &self.params
    }

    pub fn is_var(&self, i: usize) -> bool {
        self.vars.binary_search(&i).is_ok()
    }

    /// Projection of a full box onto the dependent-variable coordinates.
    pub fn var_box(&self, full: &IntervalVector) -> IntervalVector {
        debug_assert_eq!(full.len(), self.n);
        IntervalVector::new(self.vars.iter().map(|&i| full[i]).collect())
    }

    /// Projection of a full box onto the parameter coordinates.
    pub fn param_box(&self, full: &IntervalVector) -> IntervalVector {
        debug_assert_eq!(full.len(), self.n);
        IntervalVector::new(self.params.iter().map(|&i| full[i]).collect())
    }

    /// Reassembles a full box from its X-part and P-part.
    pub fn full_box(&self, var: &IntervalVector, param: &IntervalVector) -> IntervalVector {
        debug_assert_eq!(var.len(), self.vars.len());
        debug_assert_eq!(param.len(), self.params.len());
        let mut full = IntervalVector::empty(self.n);
        for (k, &i) in self.vars.iter().enumerate() {
            full[i] = var[k];
        }
        for (k, &i) in self.params.iter().enumerate() {
            full[i] = param[k];
        }
        full
    }

    /// Writes a contracted X-part back into a full box, leaving the
    /// parameter coordinates untouched.
    pub fn write_var_box(&self, full: &mut IntervalVector, var: &IntervalVector) {
        debug_assert_eq!(full.len(), self.n);
        debug_assert_eq!(var.len(), self.vars.len());
        for (k, &i) in self.vars.iter().enumerate() {
            full[i] = var[k];
        }
    }
}
