use log::{debug, trace};

use crate::{
    analysis::ConflictAnalyzer,
    assignment::Assignment,
    brancher::Brancher,
    clause::{ClauseDb, ClauseRef},
    implication_graph::{ImplicationGraph, Reason},
    lit::{Lit, Var},
    preprocessor::{ClausePreProcessor, PreProcessedClause},
    storage::KeyedVec,
    termination::Terminator,
    trail::Trail,
};

/// A conflict-driven clause learning solver.
pub struct Solver<SearchProc> {
    brancher: SearchProc,

    preprocessor: ClausePreProcessor,
    analyzer: ConflictAnalyzer,
    clauses: ClauseDb,
    implication_graph: ImplicationGraph,
    state: State,

    trail: Trail,
    assignment: Assignment,

    next_propagation_idx: usize,
    watch_list: KeyedVec<Lit, Vec<ClauseRef>>,
    next_var_code: u32,

    num_conflicts: u64,
    num_decisions: u64,
}

/// Anything clauses can be posted to.
pub trait ExtendClausalSolver {
    fn new_var(&mut self) -> Var;
    fn add_clause(&mut self, lits: impl IntoIterator<Item = Lit>);
}

#[derive(Default, PartialEq, Eq)]
enum State {
    #[default]
    Consistent,
    ConflictAtRoot,
}

impl<SearchProc: Brancher> Solver<SearchProc> {
    pub fn new(brancher: SearchProc) -> Self {
        Solver {
            brancher,
            clauses: Default::default(),
            state: Default::default(),
            trail: Default::default(),
            assignment: Default::default(),
            next_propagation_idx: 0,
            watch_list: Default::default(),
            next_var_code: 0,
            preprocessor: Default::default(),
            analyzer: Default::default(),
            implication_graph: Default::default(),
            num_conflicts: 0,
            num_decisions: 0,
        }
    }

    pub fn num_vars(&self) -> usize {
        self.next_var_code as usize
    }

    pub fn num_conflicts(&self) -> u64 {
        self.num_conflicts
    }

    pub fn new_var(&mut self) -> Var {
        let var = Var::try_from(self.next_var_code).expect("valid var code");
        self.next_var_code += 1;

        self.assignment.grow_to(var);
        self.implication_graph.grow_to(var);
        self.analyzer.grow_to(var);
        self.watch_list.grow_to(Lit::positive(var));
        self.brancher.on_new_var(var);

        var
    }

    /// Add a clause to the formula. If the solver is in the middle of a search, it is reset to
    /// the root first.
    pub fn add_clause(&mut self, lits: impl IntoIterator<Item = Lit>) {
        if self.state == State::ConflictAtRoot {
            return;
        }

        if self.trail.decision_level() > 0 {
            self.backtrack_to(0);
        }

        let root_assignment = {
            let lits = match self.preprocessor.preprocess(lits, &self.assignment) {
                PreProcessedClause::Satisfiable => return,
                PreProcessedClause::Lits(lits) => lits,
            };

            if lits.is_empty() {
                trace!("adding the empty clause");
                self.state = State::ConflictAtRoot;
                return;
            }

            if lits.len() > 1 {
                let clause_ref = self.clauses.add_clause(lits);
                trace!("adding clause {lits:?} with id {clause_ref:?}");

                self.watch_clause(clause_ref);
                return;
            }

            lits[0]
        };

        trace!("adding clause [{root_assignment:?}] as assignment");

        if !self.enqueue(root_assignment, Reason::Decision) {
            self.state = State::ConflictAtRoot;
        }
    }

    pub fn solve(&mut self, terminator: impl Terminator) -> SolveResult<'_> {
        if self.state == State::ConflictAtRoot {
            return SolveResult::Unsatisfiable;
        }

        if self.trail.decision_level() > 0 {
            self.backtrack_to(0);
        }

        while !terminator.should_stop() {
            match self.propagate() {
                Err(conflict) => {
                    self.num_conflicts += 1;
                    trace!("conflict at dl {}", self.trail.decision_level());

                    if self.trail.decision_level() == 0 {
                        self.state = State::ConflictAtRoot;
                        debug!(
                            "unsatisfiable after {} conflicts, with {} clauses learned",
                            self.num_conflicts,
                            self.clauses.num_learned()
                        );
                        return SolveResult::Unsatisfiable;
                    }

                    self.learn(conflict);
                }

                Ok(()) => match self.brancher.next_decision(&self.assignment) {
                    Some(decision) => {
                        self.num_decisions += 1;
                        self.trail.push();
                        trace!("decided {decision:?}");

                        assert!(
                            self.enqueue(decision, Reason::Decision),
                            "decided already assigned literal"
                        );
                    }

                    None => {
                        debug!(
                            "satisfiable after {} decisions and {} conflicts, with {} of {} clauses learned",
                            self.num_decisions,
                            self.num_conflicts,
                            self.clauses.num_learned(),
                            self.clauses.len()
                        );

                        return SolveResult::Satisfiable(Solution {
                            assignment: &self.assignment,
                        });
                    }
                },
            }
        }

        SolveResult::Unknown
    }

    fn learn(&mut self, conflict: ClauseRef) {
        let (asserting_lit, reason, backjump_level) = {
            let analysis = self.analyzer.analyze(
                conflict,
                &self.clauses,
                &self.implication_graph,
                &self.trail,
                &mut self.brancher,
            );

            let reason = if analysis.learned_clause.len() > 1 {
                Reason::Clause(self.clauses.add_learned_clause(analysis.learned_clause))
            } else {
                Reason::Decision
            };

            (analysis.learned_clause[0], reason, analysis.backjump_level)
        };

        if let Reason::Clause(clause_ref) = reason {
            debug_assert!(self.clauses[clause_ref].is_learned());
            self.watch_clause(clause_ref);
        }

        self.backtrack_to(backjump_level);

        assert!(
            self.enqueue(asserting_lit, reason),
            "conflicting asserting literal"
        );

        self.brancher.on_conflict();
    }

    fn watch_clause(&mut self, clause_ref: ClauseRef) {
        trace!("setting up watchers for {clause_ref:?}");
        let clause = &self.clauses[clause_ref];
        self.watch_list[clause[0]].push(clause_ref);
        self.watch_list[clause[1]].push(clause_ref);
    }

    fn enqueue(&mut self, lit: Lit, reason: Reason) -> bool {
        match self.assignment.value(lit) {
            Some(false) => return false,
            Some(true) => return true,
            None => {}
        }

        self.trail.enqueue(lit);
        self.assignment.assign(lit);
        self.implication_graph
            .add(lit.var(), reason, self.trail.decision_level());

        true
    }

    fn backtrack_to(&mut self, decision_level: usize) {
        for lit in self.trail.backtrack_to(decision_level) {
            self.assignment.unassign(lit.var());
            self.brancher.on_variable_unassigned(lit);
        }

        self.next_propagation_idx = self.trail.len();
    }

    fn propagate(&mut self) -> Result<(), ClauseRef> {
        while self.next_propagation_idx < self.trail.len() {
            let trail_lit = self.trail[self.next_propagation_idx];
            let false_lit = !trail_lit;
            self.next_propagation_idx += 1;

            trace!("processing {trail_lit:?}");

            let watches = std::mem::take(&mut self.watch_list[false_lit]);

            for (i, &clause_ref) in watches.iter().enumerate() {
                if !self.propagate_clause(clause_ref, false_lit) {
                    // Copy the remaining watches back to the literal.
                    self.watch_list[false_lit].extend_from_slice(&watches[i + 1..]);
                    self.next_propagation_idx = self.trail.len();

                    return Err(clause_ref);
                }
            }
        }

        Ok(())
    }

    /// Visit a clause watching `false_lit`, which just became false. Returns false if the clause
    /// is conflicting.
    fn propagate_clause(&mut self, clause_ref: ClauseRef, false_lit: Lit) -> bool {
        let lit_to_propagate = {
            let clause = &mut self.clauses[clause_ref];

            // Make sure the false literal is at position 1 in the clause.
            if clause[0] == false_lit {
                clause.swap(0, 1);
            }

            // If the 0th watch is true, then clause is already satisfied.
            if self.assignment.value(clause[0]) == Some(true) {
                self.watch_list[false_lit].push(clause_ref);
                return true;
            }

            // Look for a new literal to watch.
            for idx in 2..clause.len() {
                if self.assignment.value(clause[idx]) != Some(false) {
                    clause.swap(1, idx);
                    self.watch_list[clause[1]].push(clause_ref);
                    return true;
                }
            }

            // The clause is unit or conflicting under the current assignment.
            self.watch_list[false_lit].push(clause_ref);
            clause[0]
        };

        trace!("propagating {lit_to_propagate:?} because of {clause_ref:?}");
        self.enqueue(lit_to_propagate, clause_ref.into())
    }
}

impl<SearchProc: Brancher> ExtendClausalSolver for Solver<SearchProc> {
    fn new_var(&mut self) -> Var {
        Solver::new_var(self)
    }

    fn add_clause(&mut self, lits: impl IntoIterator<Item = Lit>) {
        Solver::add_clause(self, lits)
    }
}

pub enum SolveResult<'solver> {
    /// A solution has been found for the formula.
    Satisfiable(Solution<'solver>),
    /// No solution exists for the formula.
    Unsatisfiable,
    /// The solver was interrupted before reaching a conclusion.
    Unknown,
}

/// A total assignment satisfying every clause.
pub struct Solution<'assignment> {
    assignment: &'assignment Assignment,
}

impl Solution<'_> {
    pub fn value(&self, var: Var) -> bool {
        self.assignment
            .value(Lit::positive(var))
            .expect("every variable is assigned in a solution")
    }

    pub fn lit_value(&self, lit: Lit) -> bool {
        self.value(lit.var()) == lit.is_positive()
    }
}
