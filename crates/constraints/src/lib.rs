//! Clause encodings of the cardinality and exclusion constraints used by the timetable model.

use classtable_core::{lit::Lit, solver::ExtendClausalSolver};

mod at_most_one;

/// Above this many literals, at-most-one switches from the pairwise to the sequential encoding.
pub const PAIRWISE_LIMIT: usize = 5;

/// Post `x_1 \/ ... \/ x_n`. With no literals this posts the empty clause.
pub fn at_least_one(solver: &mut impl ExtendClausalSolver, x: &[Lit]) {
    solver.add_clause(x.iter().copied());
}

/// Post `\sum x_i <= 1`.
pub fn at_most_one(solver: &mut impl ExtendClausalSolver, x: &[Lit]) {
    if x.len() <= PAIRWISE_LIMIT {
        at_most_one::pairwise(solver, x);
    } else {
        at_most_one::sequential(solver, x);
    }
}

/// Post `\sum x_i = 1`.
pub fn exactly_one(solver: &mut impl ExtendClausalSolver, x: &[Lit]) {
    at_least_one(solver, x);
    at_most_one(solver, x);
}

/// Post `!(x_1 /\ ... /\ x_n)`. With no literals this posts the empty clause, since the empty
/// conjunction is true.
pub fn not_all(solver: &mut impl ExtendClausalSolver, x: &[Lit]) {
    solver.add_clause(x.iter().map(|&x_i| !x_i));
}

/// Post `!x`.
pub fn forbid(solver: &mut impl ExtendClausalSolver, x: Lit) {
    solver.add_clause([!x]);
}
