use std::ops::Index;

use crate::lit::Lit;

/// The literals assigned so far, in assignment order, partitioned into decision levels.
#[derive(Default)]
pub struct Trail {
    trail: Vec<Lit>,
    trail_delim: Vec<usize>,
}

impl Trail {
    #[allow(clippy::len_without_is_empty)]
    pub fn len(&self) -> usize {
        self.trail.len()
    }

    /// The number of decision levels opened with [`Trail::push`].
    pub fn decision_level(&self) -> usize {
        self.trail_delim.len()
    }

    pub fn enqueue(&mut self, lit: Lit) {
        self.trail.push(lit);
    }

    /// Open a new decision level.
    pub fn push(&mut self) {
        self.trail_delim.push(self.trail.len());
    }

    /// Remove every literal above `decision_level`. The removed literals are yielded from the
    /// most recent one backwards. The trail is truncated when the iterator is dropped.
    pub fn backtrack_to(&mut self, decision_level: usize) -> impl Iterator<Item = Lit> + '_ {
        let target_len = self
            .trail_delim
            .get(decision_level)
            .copied()
            .unwrap_or(self.trail.len());
        self.trail_delim.truncate(decision_level);

        let current = self.trail.len();

        BacktrackingIterator {
            trail: self,
            target_len,
            current,
        }
    }
}

impl Index<usize> for Trail {
    type Output = Lit;

    fn index(&self, index: usize) -> &Self::Output {
        &self.trail[index]
    }
}

struct BacktrackingIterator<'a> {
    trail: &'a mut Trail,
    current: usize,
    target_len: usize,
}

impl Iterator for BacktrackingIterator<'_> {
    type Item = Lit;

    fn next(&mut self) -> Option<Self::Item> {
        if self.current > self.target_len {
            self.current -= 1;
            Some(self.trail.trail[self.current])
        } else {
            None
        }
    }
}

impl Drop for BacktrackingIterator<'_> {
    fn drop(&mut self) {
        self.trail.trail.truncate(self.target_len);
    }
}

#[cfg(test)]
mod tests {
    use crate::lit;

    use super::*;

    #[test]
    fn len_of_trail_is_number_of_enqueued_lits() {
        let mut trail = Trail::default();
        assert_eq!(0, trail.len());

        trail.enqueue(lit!(1));
        trail.enqueue(lit!(2));

        assert_eq!(2, trail.len());
    }

    #[test]
    fn backtracking_yields_removed_literals_latest_first() {
        let mut trail = Trail::default();

        trail.enqueue(lit!(1));
        trail.push();
        trail.enqueue(lit!(2));
        trail.enqueue(lit!(-3));
        trail.push();
        trail.enqueue(lit!(4));

        let removed = trail.backtrack_to(0).collect::<Vec<_>>();

        assert_eq!(vec![lit!(4), lit!(-3), lit!(2)], removed);
        assert_eq!(1, trail.len());
        assert_eq!(0, trail.decision_level());
    }

    #[test]
    fn backtracking_to_the_current_level_removes_nothing() {
        let mut trail = Trail::default();
        trail.push();
        trail.enqueue(lit!(1));

        assert_eq!(0, trail.backtrack_to(1).count());
        assert_eq!(1, trail.len());
    }
}
