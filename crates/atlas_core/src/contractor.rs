use crate::interval::IntervalVector;
use crate::newton::{newton_contract, CERTIFY_PREC};
use crate::system::ImplicitSystem;
use crate::vars::VarPartition;

/// A capability that narrows a box in place. Contractors never fail: an
/// inconsistent box is reported by becoming empty.
pub trait Contractor {
    fn contract(&mut self, boxv: &mut IntervalVector);
}

/// The parametric interval Newton step behind the generic contractor
/// interface, with a fixed system, partition, and precision, so it composes
/// with other contractors in a proof pipeline.
pub struct ParamNewton<'a, S: ImplicitSystem> {
    system: &'a S,
    vars: VarPartition,
    prec: f64,
}

impl<'a, S: ImplicitSystem> ParamNewton<'a, S> {
    pub fn new(system: &'a S, vars: VarPartition) -> Self {
        Self {
            system,
            vars,
            prec: CERTIFY_PREC,
        }
    }

    /// Overrides the precision, e.g. to run the same step as a loose
    /// pruning contractor.
    pub fn with_prec(mut self, prec: f64) -> Self {
        self.prec = prec;
        self
    }
}

impl<S: ImplicitSystem> Contractor for ParamNewton<'_, S> {
    fn contract(&mut self, boxv: &mut IntervalVector) {
        newton_contract(self.system, &self.vars, boxv, self.prec);
    }
}
