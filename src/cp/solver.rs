//! Solver seam: configuration, status and solution types.
//!
//! [`CpSolver`] is the boundary between the booking formulation and a
//! search backend. The bundled backend is [`super::PumpkinCpSolver`].

use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::model::{BoolVarId, CpModel, IntVarId, Literal};

/// Smallest accepted time budget (seconds).
pub const MIN_TIMEOUT_SECONDS: u64 = 5;
/// Largest accepted time budget (seconds).
pub const MAX_TIMEOUT_SECONDS: u64 = 300;

/// Search limits.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SolverConfig {
    /// Wall-clock budget (seconds).
    pub time_limit_seconds: u64,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            time_limit_seconds: 30,
        }
    }
}

impl SolverConfig {
    /// Sets the time budget, clamped to `[5, 300]` seconds.
    pub fn with_timeout_seconds(mut self, seconds: u64) -> Self {
        self.time_limit_seconds = seconds.clamp(MIN_TIMEOUT_SECONDS, MAX_TIMEOUT_SECONDS);
        self
    }

    pub fn time_limit(&self) -> Duration {
        Duration::from_secs(self.time_limit_seconds)
    }
}

/// Raw solver outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CpStatus {
    /// Best solution proven optimal.
    Optimal,
    /// Solution found, search cut short.
    Feasible,
    /// Proven to have no solution.
    Infeasible,
    /// Model rejected before search.
    ModelInvalid,
    /// Search cut short without a solution.
    Unknown,
}

/// Solver output: status plus variable values of the best solution.
#[derive(Debug, Clone)]
pub struct CpSolution {
    pub status: CpStatus,
    pub objective: Option<i64>,
    pub int_values: Vec<i64>,
    pub bool_values: Vec<bool>,
    pub wall_time: Duration,
    /// Explanation for `ModelInvalid` / root-level `Infeasible`.
    pub message: Option<String>,
}

impl CpSolution {
    /// A solution carrying no variable values.
    pub fn empty(status: CpStatus, wall_time: Duration, message: Option<String>) -> Self {
        Self {
            status,
            objective: None,
            int_values: Vec::new(),
            bool_values: Vec::new(),
            wall_time,
            message,
        }
    }

    /// Whether variable values are available.
    pub fn is_solution_found(&self) -> bool {
        matches!(self.status, CpStatus::Optimal | CpStatus::Feasible)
    }

    pub fn value(&self, var: IntVarId) -> i64 {
        self.int_values[var.0]
    }

    pub fn bool_value(&self, var: BoolVarId) -> bool {
        self.bool_values[var.0]
    }

    pub fn literal_value(&self, lit: Literal) -> bool {
        lit.eval(self.bool_value(lit.var))
    }

    pub fn wall_time_ms(&self) -> u64 {
        self.wall_time.as_millis() as u64
    }
}

/// A constraint solver.
pub trait CpSolver {
    fn solve(&self, model: &CpModel, config: &SolverConfig) -> CpSolution;
}
