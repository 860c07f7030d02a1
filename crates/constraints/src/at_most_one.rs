use classtable_core::{lit::Lit, solver::ExtendClausalSolver};
use log::trace;

/// One binary clause per pair of literals.
pub(crate) fn pairwise(solver: &mut impl ExtendClausalSolver, x: &[Lit]) {
    for (i, &x_i) in x.iter().enumerate() {
        for &x_j in &x[i + 1..] {
            solver.add_clause([!x_i, !x_j]);
        }
    }
}

/// The sequential counter encoding (Sinz, 2005). The auxiliary `s_i` is true when one of
/// `x_1..=x_i` is true; a true `x_i` then forbids any later `x_j`. Uses `n - 1` auxiliary variables
/// and `3n - 4` clauses.
pub(crate) fn sequential(solver: &mut impl ExtendClausalSolver, x: &[Lit]) {
    let n = x.len();
    if n < 2 {
        return;
    }

    trace!("sequential at-most-one over {n} literals");

    let s = (0..n - 1)
        .map(|_| Lit::positive(solver.new_var()))
        .collect::<Vec<_>>();

    solver.add_clause([!x[0], s[0]]);

    for i in 1..n - 1 {
        solver.add_clause([!x[i], s[i]]);
        solver.add_clause([!s[i - 1], s[i]]);
        solver.add_clause([!x[i], !s[i - 1]]);
    }

    solver.add_clause([!x[n - 1], !s[n - 2]]);
}
