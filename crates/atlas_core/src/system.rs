use crate::interval::{IntervalMatrix, IntervalVector};

/// A system of nonlinear equations F: R^n -> R^m with interval-extended
/// evaluation. Point evaluation is evaluation on a degenerate box.
pub trait ImplicitSystem {
    /// Number of input variables n.
    fn n_vars(&self) -> usize;

    /// Number of equations m (the image dimension).
    fn n_eqs(&self) -> usize;

    /// Enclosure of the image F(x) over the box `x`.
    fn eval(&self, x: &IntervalVector) -> IntervalVector;

    /// Enclosure of the m x n Jacobian over the box `x`.
    fn jacobian(&self, x: &IntervalVector) -> IntervalMatrix;
}
