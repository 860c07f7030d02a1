//! Conflict-free course timetables from a catalog of sections.
//!
//! A [`session::ScheduleSession`] fetches the candidate sections of every requested course from a
//! [`catalog::CatalogProvider`], builds a [`model::ConstraintModel`] over one boolean variable per
//! section, and solves it with the clause learning engine of `classtable-core`. Every schedule it
//! produces is remembered, so the next solve yields a different one.

pub mod catalog;
pub mod error;
pub mod grid;
pub mod model;
pub mod session;
pub mod solver;
pub mod termination;

pub use catalog::{CatalogProvider, JsonCatalog, MemoryCatalog, Section};
pub use error::ClasstableError;
pub use grid::{Grid, Placement, PlacementError, TermShape};
pub use model::{Assignment, PreferenceGroup};
pub use session::{Infeasibility, Outcome, ScheduleSession, SessionError, SessionState, SolveOptions};
