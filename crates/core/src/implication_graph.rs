use crate::{clause::ClauseRef, lit::Var, storage::KeyedVec};

/// Why a variable received its value.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Reason {
    /// Decided by the brancher, or fixed at the root by a unit clause.
    #[default]
    Decision,
    /// Propagated by the given clause. The propagated literal is at position 0 of the clause.
    Clause(ClauseRef),
}

impl From<ClauseRef> for Reason {
    fn from(clause_ref: ClauseRef) -> Self {
        Reason::Clause(clause_ref)
    }
}

#[derive(Clone, Copy, Default)]
struct Node {
    reason: Reason,
    decision_level: usize,
}

/// For every assigned variable, the reason and the decision level of its assignment. Entries of
/// unassigned variables are stale.
#[derive(Default)]
pub struct ImplicationGraph {
    nodes: KeyedVec<Var, Node>,
}

impl ImplicationGraph {
    pub fn grow_to(&mut self, var: Var) {
        self.nodes.grow_to(var);
    }

    pub fn add(&mut self, var: Var, reason: Reason, decision_level: usize) {
        self.nodes[var] = Node {
            reason,
            decision_level,
        };
    }

    pub fn reason(&self, var: Var) -> Reason {
        self.nodes[var].reason
    }

    pub fn decision_level(&self, var: Var) -> usize {
        self.nodes[var].decision_level
    }
}
