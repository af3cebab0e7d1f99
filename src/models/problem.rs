//! Assembled optimization problem.
//!
//! Built fresh per optimization attempt from current booking, staff and
//! resource state. Has no persisted identity of its own.

use serde::{Deserialize, Serialize};

use super::{ResourceCandidate, ServiceTask, StaffCandidate, TimeSlot};

/// Upper bound of each objective weight.
pub const MAX_WEIGHT: i64 = 10;
/// Longest accepted booking window (two days).
pub const MAX_HORIZON_MINUTES: i64 = 2 * 24 * 60;
/// Largest accepted existing workload per staff member (31 days).
pub const MAX_WORKLOAD_MINUTES: i64 = 31 * 24 * 60;

/// Everything the optimizer needs for one booking.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OptimizationProblem {
    /// Booking being optimized.
    pub booking_id: String,
    /// Line items to schedule.
    pub tasks: Vec<ServiceTask>,
    /// Staff that may perform tasks.
    pub staff: Vec<StaffCandidate>,
    /// Physical resources that may be used.
    pub resources: Vec<ResourceCandidate>,
    /// Desired window bounding every scheduled time.
    pub window: TimeSlot,
    /// Staff the customer asked for (soft).
    pub preferred_staff_id: Option<String>,
    /// Objective weights.
    pub weights: ObjectiveWeights,
}

/// Objective weights, each in `0..=10`.
///
/// | Weight | Term |
/// |--------|------|
/// | `fairness` | Prefer staff with less existing workload |
/// | `preference` | Honor the customer's preferred staff |
/// | `idle_time` | Finish the booking as early as possible |
/// | `perturbation` | Stability against a previous plan |
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectiveWeights {
    pub fairness: i64,
    pub preference: i64,
    pub idle_time: i64,
    pub perturbation: i64,
}

impl Default for ObjectiveWeights {
    fn default() -> Self {
        Self {
            fairness: 5,
            preference: 7,
            idle_time: 3,
            perturbation: 2,
        }
    }
}

impl ObjectiveWeights {
    /// Creates a weight vector.
    pub fn new(fairness: i64, preference: i64, idle_time: i64, perturbation: i64) -> Self {
        Self {
            fairness,
            preference,
            idle_time,
            perturbation,
        }
    }

    /// Named weights, for validation messages.
    pub fn entries(&self) -> [(&'static str, i64); 4] {
        [
            ("fairness", self.fairness),
            ("preference", self.preference),
            ("idle_time", self.idle_time),
            ("perturbation", self.perturbation),
        ]
    }
}

impl OptimizationProblem {
    /// Creates a problem with no tasks or candidates.
    pub fn new(booking_id: impl Into<String>, window: TimeSlot) -> Self {
        Self {
            booking_id: booking_id.into(),
            tasks: Vec::new(),
            staff: Vec::new(),
            resources: Vec::new(),
            window,
            preferred_staff_id: None,
            weights: ObjectiveWeights::default(),
        }
    }

    /// Adds a task.
    pub fn with_task(mut self, task: ServiceTask) -> Self {
        self.tasks.push(task);
        self
    }

    /// Adds a staff candidate.
    pub fn with_staff(mut self, staff: StaffCandidate) -> Self {
        self.staff.push(staff);
        self
    }

    /// Adds a resource candidate.
    pub fn with_resource(mut self, resource: ResourceCandidate) -> Self {
        self.resources.push(resource);
        self
    }

    /// Sets the preferred staff member.
    pub fn with_preferred_staff(mut self, staff_id: impl Into<String>) -> Self {
        self.preferred_staff_id = Some(staff_id.into());
        self
    }

    /// Sets the objective weights.
    pub fn with_weights(mut self, weights: ObjectiveWeights) -> Self {
        self.weights = weights;
        self
    }

    /// Horizon length in whole minutes.
    pub fn horizon_minutes(&self) -> i64 {
        self.window.duration_minutes()
    }

    /// Sum of task occupancies (minutes).
    pub fn total_occupancy(&self) -> i64 {
        self.tasks.iter().map(ServiceTask::occupancy).sum()
    }

    pub fn staff_by_id(&self, id: &str) -> Option<&StaffCandidate> {
        self.staff.iter().find(|s| s.id == id)
    }

    pub fn resource_by_id(&self, id: &str) -> Option<&ResourceCandidate> {
        self.resources.iter().find(|r| r.id == id)
    }

    pub fn task_by_id(&self, id: &str) -> Option<&ServiceTask> {
        self.tasks.iter().find(|t| t.id == id)
    }
}
