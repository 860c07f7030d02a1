use std::{
    fmt::Debug,
    ops::{Index, IndexMut},
};

use crate::lit::Lit;

/// A clause of at least two literals. The first two positions hold the watched literals.
pub struct Clause {
    lits: Box<[Lit]>,
    is_learned: bool,
}

impl Clause {
    pub fn lits(&self) -> &[Lit] {
        &self.lits
    }

    #[allow(clippy::len_without_is_empty)]
    pub fn len(&self) -> usize {
        self.lits.len()
    }

    pub fn swap(&mut self, idx1: usize, idx2: usize) {
        self.lits.swap(idx1, idx2);
    }

    pub fn is_learned(&self) -> bool {
        self.is_learned
    }
}

impl Index<usize> for Clause {
    type Output = Lit;

    fn index(&self, index: usize) -> &Self::Output {
        &self.lits[index]
    }
}

impl Debug for Clause {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.lits.iter()).finish()
    }
}

#[derive(Default)]
pub struct ClauseDb {
    clauses: Vec<Clause>,
    num_learned: usize,
}

impl ClauseDb {
    /// Add a problem clause.
    pub fn add_clause(&mut self, lits: impl AsRef<[Lit]>) -> ClauseRef {
        self.push(lits.as_ref(), false)
    }

    /// Add a clause derived by conflict analysis.
    pub fn add_learned_clause(&mut self, lits: impl AsRef<[Lit]>) -> ClauseRef {
        self.num_learned += 1;
        self.push(lits.as_ref(), true)
    }

    pub fn num_learned(&self) -> usize {
        self.num_learned
    }

    #[allow(clippy::len_without_is_empty)]
    pub fn len(&self) -> usize {
        self.clauses.len()
    }

    fn push(&mut self, lits: &[Lit], is_learned: bool) -> ClauseRef {
        assert!(
            lits.len() > 1,
            "The clause db cannot add the empty clause or a unit clause."
        );

        self.clauses.push(Clause {
            lits: lits.into(),
            is_learned,
        });

        ClauseRef(self.clauses.len() as u32 - 1)
    }
}

impl Index<ClauseRef> for ClauseDb {
    type Output = Clause;

    fn index(&self, index: ClauseRef) -> &Self::Output {
        &self.clauses[index.0 as usize]
    }
}

impl IndexMut<ClauseRef> for ClauseDb {
    fn index_mut(&mut self, index: ClauseRef) -> &mut Self::Output {
        &mut self.clauses[index.0 as usize]
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[repr(transparent)]
pub struct ClauseRef(u32);

#[cfg(test)]
mod tests {
    use crate::lit;

    use super::*;

    #[test]
    fn clauses_keep_their_literals_in_order() {
        let mut db = ClauseDb::default();
        let lits = [lit!(1), lit!(2), lit!(-3)];

        let clause_ref = db.add_clause(lits);

        assert_eq!(&lits, db[clause_ref].lits());
        assert!(!db[clause_ref].is_learned());
    }

    #[test]
    fn learned_clauses_are_counted() {
        let mut db = ClauseDb::default();
        db.add_clause([lit!(1), lit!(2)]);
        let learned = db.add_learned_clause([lit!(-1), lit!(2)]);

        assert!(db[learned].is_learned());
        assert_eq!(1, db.num_learned());
        assert_eq!(2, db.len());
    }

    #[test]
    #[should_panic]
    fn unit_clauses_are_rejected() {
        let mut db = ClauseDb::default();
        db.add_clause([lit!(1)]);
    }
}
