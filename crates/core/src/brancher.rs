use crate::{
    assignment::Assignment,
    lit::{Lit, Var},
    storage::KeyedVec,
};

/// Decides which literal to set next when propagation reaches a fixpoint.
pub trait Brancher {
    fn on_new_var(&mut self, var: Var);

    /// The next decision, or `None` when every variable is assigned.
    fn next_decision(&mut self, assignment: &Assignment) -> Option<Lit>;

    /// Called for every literal that is removed from the trail on backtracking.
    fn on_variable_unassigned(&mut self, _lit: Lit) {}

    /// Called for every variable that takes part in the analysis of a conflict.
    fn on_variable_activated(&mut self, _var: Var) {}

    /// Called once after every analysed conflict.
    fn on_conflict(&mut self) {}
}

/// Branches on the first unassigned variable, setting it to true.
#[derive(Default)]
pub struct NaiveBrancher {
    vars: Vec<Var>,
}

impl Brancher for NaiveBrancher {
    fn on_new_var(&mut self, var: Var) {
        self.vars.push(var);
    }

    fn next_decision(&mut self, assignment: &Assignment) -> Option<Lit> {
        self.vars
            .iter()
            .copied()
            .find(|&var| !assignment.is_assigned(var))
            .map(Lit::positive)
    }
}

/// Variable State Independent Decaying Sum: branch on the unassigned variable that took part in
/// the most recent conflicts. Values are taken from the last polarity the variable had, which is
/// false for variables that were never assigned.
pub struct VsidsBrancher {
    vars: Vec<Var>,
    activity: KeyedVec<Var, f64>,
    phase: KeyedVec<Var, bool>,
    increment: f64,
    decay: f64,
}

const RESCALE_THRESHOLD: f64 = 1e100;

impl VsidsBrancher {
    /// Create a brancher whose activities decay with the given factor after every conflict. The
    /// factor should be in `(0, 1]`.
    pub fn new(decay: f64) -> VsidsBrancher {
        VsidsBrancher {
            vars: vec![],
            activity: KeyedVec::default(),
            phase: KeyedVec::default(),
            increment: 1.0,
            decay,
        }
    }

    fn rescale(&mut self) {
        self.activity
            .iter_mut()
            .for_each(|activity| *activity /= RESCALE_THRESHOLD);
        self.increment /= RESCALE_THRESHOLD;
    }
}

impl Brancher for VsidsBrancher {
    fn on_new_var(&mut self, var: Var) {
        self.vars.push(var);
        self.activity.grow_to(var);
        self.phase.grow_to(var);
    }

    fn next_decision(&mut self, assignment: &Assignment) -> Option<Lit> {
        let mut best: Option<Var> = None;

        for &var in self.vars.iter() {
            if assignment.is_assigned(var) {
                continue;
            }

            match best {
                Some(current) if self.activity[current] >= self.activity[var] => {}
                _ => best = Some(var),
            }
        }

        best.map(|var| Lit::new(var, self.phase[var]))
    }

    fn on_variable_unassigned(&mut self, lit: Lit) {
        self.phase[lit.var()] = lit.is_positive();
    }

    fn on_variable_activated(&mut self, var: Var) {
        self.activity[var] += self.increment;

        if self.activity[var] > RESCALE_THRESHOLD {
            self.rescale();
        }
    }

    fn on_conflict(&mut self) {
        self.increment /= self.decay;
    }
}

#[cfg(test)]
mod tests {
    use crate::lit;

    use super::*;

    fn setup<B: Brancher>(brancher: &mut B, num_vars: u32) -> Assignment {
        let mut assignment = Assignment::default();
        for code in 0..num_vars {
            let var = Var::try_from(code).unwrap();
            brancher.on_new_var(var);
            assignment.grow_to(var);
        }
        assignment
    }

    #[test]
    fn naive_brancher_picks_first_unassigned_variable() {
        let mut brancher = NaiveBrancher::default();
        let mut assignment = setup(&mut brancher, 3);
        assignment.assign(lit!(0));

        assert_eq!(Some(lit!(1)), brancher.next_decision(&assignment));
    }

    #[test]
    fn vsids_prefers_active_variables_with_negative_default_phase() {
        let mut brancher = VsidsBrancher::new(0.95);
        let assignment = setup(&mut brancher, 3);

        brancher.on_variable_activated(lit!(2).var());

        assert_eq!(Some(lit!(-2)), brancher.next_decision(&assignment));
    }

    #[test]
    fn vsids_reuses_saved_phase() {
        let mut brancher = VsidsBrancher::new(0.95);
        let assignment = setup(&mut brancher, 1);

        brancher.on_variable_unassigned(lit!(0));

        assert_eq!(Some(lit!(0)), brancher.next_decision(&assignment));
    }

    #[test]
    fn vsids_is_exhausted_when_everything_is_assigned() {
        let mut brancher = VsidsBrancher::new(0.95);
        let mut assignment = setup(&mut brancher, 2);
        assignment.assign(lit!(0));
        assignment.assign(lit!(-1));

        assert_eq!(None, brancher.next_decision(&assignment));
    }
}
