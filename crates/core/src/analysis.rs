use bitvec::vec::BitVec;
use log::trace;

use crate::{
    brancher::Brancher,
    clause::{ClauseDb, ClauseRef},
    implication_graph::{ImplicationGraph, Reason},
    lit::{Lit, Var},
    trail::Trail,
};

/// Responsible for clause learning when a conflict is encountered. The analyzer uses the 1-UIP
/// learning strategy.
#[derive(Default)]
pub struct ConflictAnalyzer {
    /// The working buffer on which analysis is performed.
    buffer: Vec<Lit>,
    /// For every variable, indicate whether it has been encountered during the analysis.
    seen: BitVec,
}

/// The result of conflict analysis.
pub struct Analysis<'a> {
    /// The clause to learn. The asserting literal is at position 0, and if there are more
    /// literals, the one with the highest decision level is at position 1.
    pub learned_clause: &'a [Lit],
    /// The decision level to backjump to.
    pub backjump_level: usize,
}

impl ConflictAnalyzer {
    pub fn grow_to(&mut self, var: Var) {
        let minimum_len = var.code() as usize + 1;
        if self.seen.len() < minimum_len {
            self.seen.resize(minimum_len, false);
        }
    }

    /// Derive the first unique implication point clause from a clause that is falsified at the
    /// current decision level, which must be above the root.
    pub fn analyze(
        &mut self,
        conflict: ClauseRef,
        clauses: &ClauseDb,
        implication_graph: &ImplicationGraph,
        trail: &Trail,
        brancher: &mut impl Brancher,
    ) -> Analysis<'_> {
        trace!("analyzing conflict {conflict:?}");

        let current_level = trail.decision_level();
        assert!(current_level > 0, "conflicts at the root cannot be analyzed");

        self.buffer.clear();
        // Leave space for the asserting literal.
        self.buffer.push(trail[0]);

        let mut reason = conflict;
        let mut resolved: Option<Lit> = None;
        let mut trail_idx = trail.len();
        let mut open_at_current_level = 0;

        loop {
            for &lit in clauses[reason].lits() {
                if Some(lit) == resolved {
                    continue;
                }

                let var = lit.var();
                let level = implication_graph.decision_level(var);

                if self.seen[var.code() as usize] || level == 0 {
                    continue;
                }

                self.seen.set(var.code() as usize, true);
                brancher.on_variable_activated(var);

                if level == current_level {
                    open_at_current_level += 1;
                } else {
                    self.buffer.push(lit);
                }
            }

            // Walk back to the most recent literal that is part of the analysis.
            let next = loop {
                trail_idx -= 1;
                let candidate = trail[trail_idx];

                if self.seen[candidate.var().code() as usize] {
                    break candidate;
                }
            };

            self.seen.set(next.var().code() as usize, false);
            open_at_current_level -= 1;
            resolved = Some(next);

            if open_at_current_level == 0 {
                break;
            }

            reason = match implication_graph.reason(next.var()) {
                Reason::Clause(clause_ref) => clause_ref,
                Reason::Decision => unreachable!("only the first literal of a level is decided"),
            };
        }

        let uip = resolved.expect("the conflict contains a literal of the current level");
        self.buffer[0] = !uip;

        let mut backjump_level = 0;
        for idx in 1..self.buffer.len() {
            let var = self.buffer[idx].var();
            self.seen.set(var.code() as usize, false);

            let level = implication_graph.decision_level(var);
            if level > backjump_level {
                backjump_level = level;
                self.buffer.swap(1, idx);
            }
        }

        trace!(
            "learned clause = {:?}, backjumping to {backjump_level}",
            self.buffer
        );

        Analysis {
            learned_clause: &self.buffer,
            backjump_level,
        }
    }
}
