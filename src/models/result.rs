//! Optimization result model.
//!
//! One result is produced per solve attempt and handed to the caller for
//! persistence. Domain outcomes (infeasible, timeout) are carried in the
//! status tag rather than raised as errors.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A concrete staff/resource/time assignment for one task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Assignment {
    /// Assigned task ID.
    pub task_id: String,
    /// Assigned staff ID.
    pub staff_id: String,
    /// Assigned resource ID (`None` if the task needs no resource).
    pub resource_id: Option<String>,
    /// Service start.
    pub scheduled_start: DateTime<Utc>,
    /// Service end (excludes buffer).
    pub scheduled_end: DateTime<Utc>,
}

/// Terminal status of a solve attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OptimizationStatus {
    /// Proven optimal within the time budget.
    Optimal,
    /// Valid plan found, optimality not proven.
    Feasible,
    /// No valid assignment exists.
    Infeasible,
    /// The constraint model was rejected as malformed.
    ModelInvalid,
    /// Budget exhausted with no conclusive answer.
    Timeout,
}

/// What the caller should do with the booking after a solve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BookingOutcome {
    /// Persist the assignments and confirm the booking.
    Confirmed,
    /// Leave pending and surface the message to an operator.
    NeedsAttention,
}

/// Result of one solve attempt.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OptimizationResult {
    /// Whether a plan was found.
    pub success: bool,
    /// Status tag.
    pub status: OptimizationStatus,
    /// Human-readable explanation.
    pub message: String,
    /// Solve wall time (ms).
    pub solve_time_ms: u64,
    /// One per task on success, empty otherwise.
    pub assignments: Vec<Assignment>,
}

impl OptimizationStatus {
    /// Whether this status carries a usable plan.
    pub fn is_success(self) -> bool {
        matches!(self, Self::Optimal | Self::Feasible)
    }

    /// Wire tag.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Optimal => "OPTIMAL",
            Self::Feasible => "FEASIBLE",
            Self::Infeasible => "INFEASIBLE",
            Self::ModelInvalid => "MODEL_INVALID",
            Self::Timeout => "TIMEOUT",
        }
    }
}

impl std::fmt::Display for OptimizationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Assignment {
    /// Creates a new assignment.
    pub fn new(
        task_id: impl Into<String>,
        staff_id: impl Into<String>,
        resource_id: Option<String>,
        scheduled_start: DateTime<Utc>,
        scheduled_end: DateTime<Utc>,
    ) -> Self {
        Self {
            task_id: task_id.into(),
            staff_id: staff_id.into(),
            resource_id,
            scheduled_start,
            scheduled_end,
        }
    }

    /// Service length in minutes.
    #[inline]
    pub fn duration_minutes(&self) -> i64 {
        (self.scheduled_end - self.scheduled_start).num_minutes()
    }
}

impl OptimizationResult {
    /// A successful result.
    pub fn solved(
        status: OptimizationStatus,
        message: impl Into<String>,
        solve_time_ms: u64,
        assignments: Vec<Assignment>,
    ) -> Self {
        Self {
            success: true,
            status,
            message: message.into(),
            solve_time_ms,
            assignments,
        }
    }

    /// A failed result with no assignments.
    pub fn failed(status: OptimizationStatus, message: impl Into<String>, solve_time_ms: u64) -> Self {
        Self {
            success: false,
            status,
            message: message.into(),
            solve_time_ms,
            assignments: Vec::new(),
        }
    }

    /// Whether the caller may commit this plan.
    pub fn should_commit(&self) -> bool {
        self.success && self.status.is_success()
    }

    /// Booking status transition implied by this result.
    pub fn booking_outcome(&self) -> BookingOutcome {
        if self.should_commit() {
            BookingOutcome::Confirmed
        } else {
            BookingOutcome::NeedsAttention
        }
    }

    /// Finds the assignment for a task.
    pub fn assignment_for_task(&self, task_id: &str) -> Option<&Assignment> {
        self.assignments.iter().find(|a| a.task_id == task_id)
    }

    /// All assignments for a staff member.
    pub fn assignments_for_staff(&self, staff_id: &str) -> Vec<&Assignment> {
        self.assignments
            .iter()
            .filter(|a| a.staff_id == staff_id)
            .collect()
    }

    /// All assignments on a resource.
    pub fn assignments_for_resource(&self, resource_id: &str) -> Vec<&Assignment> {
        self.assignments
            .iter()
            .filter(|a| a.resource_id.as_deref() == Some(resource_id))
            .collect()
    }

    /// Earliest service start across the plan.
    pub fn plan_start(&self) -> Option<DateTime<Utc>> {
        self.assignments.iter().map(|a| a.scheduled_start).min()
    }

    /// Latest service end across the plan.
    pub fn makespan_end(&self) -> Option<DateTime<Utc>> {
        self.assignments.iter().map(|a| a.scheduled_end).max()
    }
}
