use log::trace;

use crate::{assignment::Assignment, lit::Lit};

/// Performs pre-processing on clauses that are added to the solver at the root.
#[derive(Default)]
pub struct ClausePreProcessor {
    /// The buffer on which preprocessing operates.
    buffer: Vec<Lit>,
}

#[derive(Debug, PartialEq, Eq)]
pub enum PreProcessedClause<'a> {
    /// The clause is already satisfied. Either because it contained a literal already assigned to
    /// true, or because it contained literals of opposite polarity.
    Satisfiable,
    /// The remaining unassigned literals. Note: there might be 0 literals remaining, in which
    /// case the problem is unsatisfiable.
    Lits(&'a [Lit]),
}

impl ClausePreProcessor {
    /// Simplify a clause against the root assignment. Literals that are false at the root can
    /// never become true again, so they are removed.
    pub fn preprocess(
        &mut self,
        lits: impl IntoIterator<Item = Lit>,
        assignment: &Assignment,
    ) -> PreProcessedClause<'_> {
        self.buffer.clear();
        self.buffer.extend(lits);

        let original_len = self.buffer.len();

        self.buffer.sort();
        self.buffer.dedup();

        // Due to sorting, literals of opposite polarity are next to each other.
        if self.buffer.windows(2).any(|pair| pair[0] == !pair[1]) {
            trace!("preprocessing found a tautology");
            return PreProcessedClause::Satisfiable;
        }

        if self
            .buffer
            .iter()
            .any(|&lit| assignment.value(lit) == Some(true))
        {
            trace!("preprocessing found a root-satisfied literal");
            return PreProcessedClause::Satisfiable;
        }

        self.buffer.retain(|&lit| assignment.value(lit).is_none());

        trace!(
            "preprocessing removed {} lits",
            original_len - self.buffer.len()
        );

        PreProcessedClause::Lits(&self.buffer)
    }
}

#[cfg(test)]
mod tests {
    use crate::lit;

    use super::*;

    fn assignment_up_to(code: u32) -> Assignment {
        let mut assignment = Assignment::default();
        assignment.grow_to(crate::lit::Var::try_from(code).unwrap());
        assignment
    }

    #[test]
    fn excluded_middle_preprocessed_to_true() {
        let mut preprocessor = ClausePreProcessor::default();
        let assignment = assignment_up_to(1);

        let result = preprocessor.preprocess([lit!(1), lit!(-1)], &assignment);

        assert_eq!(PreProcessedClause::Satisfiable, result);
    }

    #[test]
    fn duplicate_literals_are_removed() {
        let mut preprocessor = ClausePreProcessor::default();
        let assignment = assignment_up_to(3);

        let result = preprocessor.preprocess([lit!(1), lit!(2), lit!(3), lit!(1)], &assignment);

        assert_eq!(
            PreProcessedClause::Lits(&[lit!(1), lit!(2), lit!(3)]),
            result
        );
    }

    #[test]
    fn clauses_with_a_true_literal() {
        let mut preprocessor = ClausePreProcessor::default();
        let mut assignment = assignment_up_to(3);
        assignment.assign(lit!(-2));

        let result = preprocessor.preprocess([lit!(1), lit!(-2), lit!(3)], &assignment);

        assert_eq!(PreProcessedClause::Satisfiable, result);
    }

    #[test]
    fn root_false_literals_are_dropped() {
        let mut preprocessor = ClausePreProcessor::default();
        let mut assignment = assignment_up_to(3);
        assignment.assign(lit!(2));

        let result = preprocessor.preprocess([lit!(1), lit!(-2), lit!(3)], &assignment);

        assert_eq!(PreProcessedClause::Lits(&[lit!(1), lit!(3)]), result);
    }
}
