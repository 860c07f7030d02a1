use classtable_constraints::{at_least_one, at_most_one, exactly_one, forbid, not_all};
use classtable_core::{
    brancher::VsidsBrancher,
    lit::Lit,
    solver::{SolveResult, Solver},
    termination::TimeBudget,
};

type Encoder = fn(&mut Solver<VsidsBrancher>, &[Lit]);

/// Fix the `n` inputs to the bits of `pattern`, post the encoding and report satisfiability.
fn is_satisfiable_with(encoder: Encoder, n: usize, pattern: u32) -> bool {
    let mut solver = Solver::new(VsidsBrancher::new(0.95));
    let x = (0..n)
        .map(|_| Lit::positive(solver.new_var()))
        .collect::<Vec<_>>();

    encoder(&mut solver, &x);

    for (i, &x_i) in x.iter().enumerate() {
        let lit = if pattern & (1 << i) != 0 { x_i } else { !x_i };
        solver.add_clause([lit]);
    }

    match solver.solve(TimeBudget::infinite()) {
        SolveResult::Satisfiable(_) => true,
        SolveResult::Unsatisfiable => false,
        SolveResult::Unknown => panic!("no budget was set"),
    }
}

fn check_exhaustively(encoder: Encoder, n: usize, allowed: impl Fn(u32) -> bool) {
    for pattern in 0..(1u32 << n) {
        assert_eq!(
            allowed(pattern.count_ones()),
            is_satisfiable_with(encoder, n, pattern),
            "pattern {pattern:b}",
        );
    }
}

fn at_most_one_encoder(solver: &mut Solver<VsidsBrancher>, x: &[Lit]) {
    at_most_one(solver, x);
}

fn exactly_one_encoder(solver: &mut Solver<VsidsBrancher>, x: &[Lit]) {
    exactly_one(solver, x);
}

fn at_least_one_encoder(solver: &mut Solver<VsidsBrancher>, x: &[Lit]) {
    at_least_one(solver, x);
}

fn not_all_encoder(solver: &mut Solver<VsidsBrancher>, x: &[Lit]) {
    not_all(solver, x);
}

#[test]
fn pairwise_at_most_one() {
    check_exhaustively(at_most_one_encoder, 4, |ones| ones <= 1);
}

#[test]
fn sequential_at_most_one() {
    check_exhaustively(at_most_one_encoder, 7, |ones| ones <= 1);
}

#[test]
fn exactly_one_in_both_encodings() {
    check_exhaustively(exactly_one_encoder, 3, |ones| ones == 1);
    check_exhaustively(exactly_one_encoder, 8, |ones| ones == 1);
}

#[test]
fn at_least_one_clause() {
    check_exhaustively(at_least_one_encoder, 3, |ones| ones >= 1);
}

#[test]
fn not_all_forbids_only_the_full_conjunction() {
    check_exhaustively(not_all_encoder, 3, |ones| ones < 3);
}

#[test]
fn empty_not_all_is_unsatisfiable() {
    assert!(!is_satisfiable_with(not_all_encoder, 0, 0));
}

#[test]
fn forbidden_literal_is_false_in_every_solution() {
    let mut solver = Solver::new(VsidsBrancher::new(0.95));
    let x = Lit::positive(solver.new_var());
    let y = Lit::positive(solver.new_var());

    forbid(&mut solver, x);
    at_least_one(&mut solver, &[x, y]);

    match solver.solve(TimeBudget::infinite()) {
        SolveResult::Satisfiable(solution) => {
            assert!(!solution.lit_value(x));
            assert!(solution.lit_value(y));
        }
        _ => panic!("expected a solution"),
    }
}
