//! Constraint programming layer.
//!
//! A compact CP model covering what the booking formulation needs:
//! integer start variables, boolean assignment variables, (optional)
//! fixed-size intervals, `ExactlyOne`, `NoOverlap`, `Precedence` and
//! `WithinWindows` constraints, and a linear-plus-makespan objective.
//!
//! Build a [`CpModel`], then hand it to any [`CpSolver`]. The bundled
//! [`PumpkinCpSolver`] encodes the model for the `pumpkin_solver` crate and
//! searches within the [`SolverConfig`] time budget.
//!
//! # Reference
//! - Laborie et al. (2018), "IBM ILOG CP Optimizer for Scheduling"
//! - Baptiste et al. (2001), "Constraint-Based Scheduling"

mod model;
mod pumpkin;
mod solver;

pub use model::{
    BoolVar, BoolVarId, CpConstraint, CpModel, IntVar, IntVarId, IntervalId, IntervalVar, Literal,
    MakespanTerm, Objective,
};
pub use pumpkin::PumpkinCpSolver;
pub use solver::{
    CpSolution, CpSolver, CpStatus, SolverConfig, MAX_TIMEOUT_SECONDS, MIN_TIMEOUT_SECONDS,
};
