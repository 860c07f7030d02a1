//! A conflict-driven clause learning SAT engine.
//!
//! Clauses are posted through [`solver::ExtendClausalSolver`], and a search is started with
//! [`solver::Solver::solve`], bounded by a [`termination::Terminator`].

mod analysis;
pub mod assignment;
pub mod brancher;
pub mod clause;
mod implication_graph;
pub mod lit;
mod preprocessor;
pub mod solver;
pub mod storage;
pub mod termination;
pub mod trail;
