//! A scheduling session: the requested courses, the schedules produced so far and the
//! preferences that restrict the next one.

use std::{
    collections::HashMap,
    fs::File,
    io::{BufReader, BufWriter},
    path::Path,
    sync::{atomic::AtomicBool, Arc},
    time::Duration,
};

use classtable_core::termination::TimeBudget;
use log::{error, info};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{
    catalog::CatalogProvider,
    error::ClasstableError,
    grid::{self, Grid, PlacementError, TermShape},
    model::{Assignment, ModelBuilder, ModelError, PreferenceGroup},
    solver::{self, Conclusion},
    termination::{OrTerminator, SignalTerminator},
};

#[derive(Clone, Debug, Default)]
pub struct SolveOptions {
    pub shape: TermShape,
    pub timeout: Option<Duration>,
    /// When raised, the running solve stops and reports a timeout.
    pub interrupt: Option<Arc<AtomicBool>>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Infeasibility {
    /// No schedule satisfies the constraints.
    Unsatisfiable,
    /// The solve was stopped before it concluded.
    TimedOut,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Outcome {
    Scheduled(Assignment),
    Infeasible(Infeasibility),
}

#[derive(Debug, Error)]
pub enum SessionError {
    #[error(transparent)]
    Model(#[from] ModelError),

    #[error("the solver produced a schedule that does not fit the grid")]
    Inconsistent(#[source] PlacementError),

    #[error("the session stopped after an earlier inconsistency")]
    Poisoned,
}

/// The part of a session that outlives the process.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionState {
    pub history: Vec<Assignment>,
    pub preferences: Vec<PreferenceGroup>,
}

impl SessionState {
    pub fn load(path: impl AsRef<Path>) -> Result<SessionState, ClasstableError> {
        let file = File::open(path)?;
        Ok(serde_json::from_reader(BufReader::new(file))?)
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ClasstableError> {
        let file = File::create(path)?;
        serde_json::to_writer_pretty(BufWriter::new(file), self)?;
        Ok(())
    }
}

pub struct ScheduleSession<Catalog> {
    catalog: Catalog,
    term: String,
    options: SolveOptions,

    requested: Vec<String>,
    history: Vec<Assignment>,
    preferences: Vec<PreferenceGroup>,

    latest: Option<Assignment>,
    grid: Option<Grid>,
    is_poisoned: bool,
}

impl<Catalog: CatalogProvider> ScheduleSession<Catalog> {
    pub fn new(catalog: Catalog, term: impl Into<String>, options: SolveOptions) -> Self {
        ScheduleSession {
            catalog,
            term: term.into(),
            options,
            requested: vec![],
            history: vec![],
            preferences: vec![],
            latest: None,
            grid: None,
            is_poisoned: false,
        }
    }

    pub fn term(&self) -> &str {
        &self.term
    }

    pub fn requested(&self) -> &[String] {
        &self.requested
    }

    pub fn set_requested<S: Into<String>>(&mut self, courses: impl IntoIterator<Item = S>) {
        self.requested = courses.into_iter().map(Into::into).collect();
    }

    pub fn history(&self) -> &[Assignment] {
        &self.history
    }

    pub fn preferences(&self) -> &[PreferenceGroup] {
        &self.preferences
    }

    pub fn add_preference(&mut self, group: PreferenceGroup) {
        self.preferences.push(group);
    }

    /// Replace every preference of the group's course with `group`.
    pub fn set_preference(&mut self, group: PreferenceGroup) {
        self.preferences.retain(|existing| existing.course != group.course);
        self.preferences.push(group);
    }

    /// Forget every produced schedule and every preference. The requested courses are kept.
    pub fn clear_history(&mut self) {
        info!(
            "clearing {} schedules and {} preferences",
            self.history.len(),
            self.preferences.len()
        );

        self.history.clear();
        self.preferences.clear();
    }

    /// The most recently produced schedule.
    pub fn latest(&self) -> Option<&Assignment> {
        self.latest.as_ref()
    }

    /// The grid of the most recently produced schedule.
    pub fn grid(&self) -> Option<&Grid> {
        self.grid.as_ref()
    }

    pub fn state(&self) -> SessionState {
        SessionState {
            history: self.history.clone(),
            preferences: self.preferences.clone(),
        }
    }

    pub fn restore(&mut self, state: SessionState) {
        self.history = state.history;
        self.preferences = state.preferences;
    }

    /// Produce a schedule that differs from every schedule produced before.
    pub fn solve(&mut self) -> Result<Outcome, SessionError> {
        if self.is_poisoned {
            return Err(SessionError::Poisoned);
        }

        let mut candidates = HashMap::new();
        for course in &self.requested {
            if !candidates.contains_key(course) {
                let sections = self.catalog.fetch_candidates(&self.term, course);
                candidates.insert(course.clone(), sections);
            }
        }

        let model = ModelBuilder::new(self.options.shape).build(
            &self.requested,
            &candidates,
            &self.history,
            &self.preferences,
        )?;

        let interrupt = self
            .options
            .interrupt
            .clone()
            .map(SignalTerminator::from_flag)
            .unwrap_or_default();
        let terminator =
            OrTerminator::new(TimeBudget::from_timeout(self.options.timeout), interrupt);

        let assignment = match solver::solve_model(&model, terminator) {
            Conclusion::Satisfiable(assignment) => assignment,
            Conclusion::Unsatisfiable => {
                return Ok(Outcome::Infeasible(Infeasibility::Unsatisfiable))
            }
            Conclusion::Unknown => return Ok(Outcome::Infeasible(Infeasibility::TimedOut)),
        };

        let grid = match grid::project(self.options.shape, &assignment, model.candidates()) {
            Ok(grid) => grid,
            Err(e) => {
                error!("{e}");
                self.is_poisoned = true;
                return Err(SessionError::Inconsistent(e));
            }
        };

        self.history.push(assignment.clone());
        self.latest = Some(assignment.clone());
        self.grid = Some(grid);

        info!(
            "schedule {} of this session: {assignment}",
            self.history.len()
        );

        Ok(Outcome::Scheduled(assignment))
    }
}
