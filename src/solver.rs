use classtable_core::{
    brancher::VsidsBrancher,
    lit::Lit,
    solver::{SolveResult, Solver},
    storage::KeyedVec,
    termination::Terminator,
};
use log::{debug, info};

use crate::model::{Assignment, Constraint, ConstraintModel, SectionVar};

pub enum Conclusion {
    Satisfiable(Assignment),
    Unsatisfiable,
    /// The terminator stopped the search before it concluded.
    Unknown,
}

/// Encode `model` as clauses and search for an assignment.
pub fn solve_model(model: &ConstraintModel, terminator: impl Terminator) -> Conclusion {
    let mut solver = Solver::new(VsidsBrancher::new(0.95));

    let lits: KeyedVec<SectionVar, Lit> = model
        .vars()
        .map(|_| Lit::positive(solver.new_var()))
        .collect();

    let to_lits = |vars: &[SectionVar]| vars.iter().map(|&var| lits[var]).collect::<Vec<_>>();

    for constraint in model.constraints() {
        match constraint {
            Constraint::AtMostOne(vars) => {
                classtable_constraints::at_most_one(&mut solver, &to_lits(vars))
            }
            Constraint::ExactlyOne(vars) => {
                classtable_constraints::exactly_one(&mut solver, &to_lits(vars))
            }
            Constraint::NotAll(vars) => classtable_constraints::not_all(&mut solver, &to_lits(vars)),
            Constraint::AtLeastOne(vars) => {
                classtable_constraints::at_least_one(&mut solver, &to_lits(vars))
            }
            Constraint::Forbidden(var) => classtable_constraints::forbid(&mut solver, lits[*var]),
        }
    }

    debug!(
        "encoded {} section variables into {} solver variables",
        model.num_vars(),
        solver.num_vars()
    );

    match solver.solve(terminator) {
        SolveResult::Satisfiable(solution) => {
            let assignment = model.assignment(|var| solution.lit_value(lits[var]));
            info!("found {assignment}");
            Conclusion::Satisfiable(assignment)
        }

        SolveResult::Unsatisfiable => {
            info!("no assignment exists");
            Conclusion::Unsatisfiable
        }

        SolveResult::Unknown => {
            info!("search stopped before reaching a conclusion");
            Conclusion::Unknown
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use classtable_core::termination::TimeBudget;

    use crate::{catalog::Section, grid::TermShape, model::ModelBuilder};

    use super::*;

    fn section(id: &str, places: &str) -> Section {
        Section {
            id: id.into(),
            term: "T".into(),
            course_code: id[..1].into(),
            course_name: id[..1].into(),
            instructor: None,
            weeks: "1-16".into(),
            places: places.into(),
            credits: None,
        }
    }

    fn solve(sections: &[Section], courses: &[&str], history: &[Assignment]) -> Conclusion {
        let requested = courses.iter().map(|&c| c.to_owned()).collect::<Vec<_>>();

        let mut candidates: HashMap<String, Vec<Section>> = HashMap::new();
        for section in sections {
            candidates
                .entry(section.course_code.clone())
                .or_default()
                .push(section.clone());
        }

        let model = ModelBuilder::new(TermShape::default())
            .build(&requested, &candidates, history, &[])
            .expect("valid model");

        solve_model(&model, TimeBudget::infinite())
    }

    #[test]
    fn conflicting_sections_are_avoided() {
        let sections = [
            section("X1", "A: 1(1)"),
            section("X2", "A: 2(1)"),
            section("Y1", "B: 1(1)"),
        ];

        match solve(&sections, &["X", "Y"], &[]) {
            Conclusion::Satisfiable(assignment) => {
                assert_eq!(
                    ["X2", "Y1"].map(String::from).into_iter().collect::<Assignment>(),
                    assignment
                );
            }
            _ => panic!("expected an assignment"),
        }
    }

    #[test]
    fn excluded_history_leaves_no_assignment() {
        let sections = [section("X1", "A: 1(1)")];
        let history = [["X1".to_owned()].into_iter().collect::<Assignment>()];

        assert!(matches!(
            solve(&sections, &["X"], &history),
            Conclusion::Unsatisfiable
        ));
    }

    #[test]
    fn large_slot_groups_use_the_sequential_encoding() {
        let sections = (1..=7)
            .map(|i| Section {
                course_code: format!("C{i}"),
                ..section(&format!("C{i}"), "A: 1(1)")
            })
            .collect::<Vec<_>>();

        let courses = (1..=7).map(|i| format!("C{i}")).collect::<Vec<_>>();
        let requested = courses.iter().map(String::as_str).collect::<Vec<_>>();

        assert!(matches!(
            solve(&sections, &requested, &[]),
            Conclusion::Unsatisfiable
        ));
    }
}
