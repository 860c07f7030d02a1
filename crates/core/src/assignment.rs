use crate::{
    lit::{Lit, Var},
    storage::KeyedVec,
};

/// The (partial) truth assignment of the variables.
#[derive(Default)]
pub struct Assignment {
    values: KeyedVec<Var, Option<bool>>,
}

impl Assignment {
    pub fn grow_to(&mut self, var: Var) {
        self.values.grow_to(var);
    }

    /// The number of variables known to the assignment.
    pub fn num_vars(&self) -> usize {
        self.values.len()
    }

    /// The truth value of `lit`, or `None` if its variable is unassigned.
    pub fn value(&self, lit: Lit) -> Option<bool> {
        self.values[lit.var()].map(|value| value == lit.is_positive())
    }

    pub fn is_assigned(&self, var: Var) -> bool {
        self.values[var].is_some()
    }

    /// Make `lit` true.
    pub fn assign(&mut self, lit: Lit) {
        self.values[lit.var()] = Some(lit.is_positive());
    }

    pub fn unassign(&mut self, var: Var) {
        self.values[var] = None;
    }
}
