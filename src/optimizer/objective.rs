//! Objective weighting.
//!
//! The objective mixes terms of different units: a count of tasks not
//! given to the preferred staff member, the existing workload (minutes) of
//! the chosen staff, and the booking's finishing minute. Each term is first
//! normalized to a share in `[0, 1]`:
//!
//! | Term | Share |
//! |------|-------|
//! | Preference | `violations / n` |
//! | Fairness | `sum(workload of chosen staff) / (L * n)` |
//! | Idle time | `max_end / H` |
//!
//! where `n` is the task count, `H` the horizon in minutes and `L` the
//! largest staff workload (at least 1). Every share is then multiplied by
//! `RESOLUTION * H` and by its weight, so the makespan coefficient is an
//! exact integer and the other two are rounded down. The terms are summed
//! with no lexicographic priority between them.
//!
//! A full share costs `weight * RESOLUTION * H`, which stays inside the
//! solver's 32-bit range for any window that passes validation.

use crate::models::{ObjectiveWeights, OptimizationProblem};

/// Objective units per unit of share, per horizon minute.
pub const RESOLUTION: i64 = 100;

/// Integer coefficients for each objective term.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ObjectiveScale {
    tasks: i64,
    horizon: i64,
    max_workload: i64,
    weights: ObjectiveWeights,
}

impl ObjectiveScale {
    pub fn new(problem: &OptimizationProblem) -> Self {
        let max_workload = problem
            .staff
            .iter()
            .map(|s| s.workload_minutes)
            .max()
            .unwrap_or(0)
            .max(1);
        Self {
            tasks: problem.tasks.len().max(1) as i64,
            horizon: problem.horizon_minutes().max(1),
            max_workload,
            weights: problem.weights,
        }
    }

    /// Cost of one full share at `weight`.
    fn full_share(&self, weight: i64) -> i64 {
        weight.saturating_mul(RESOLUTION).saturating_mul(self.horizon)
    }

    /// Cost of one task not going to the preferred staff member.
    pub fn preference_penalty(&self) -> i64 {
        self.full_share(self.weights.preference) / self.tasks
    }

    /// Cost of giving one task to staff with `workload_minutes` already booked.
    pub fn fairness_penalty(&self, workload_minutes: i64) -> i64 {
        let workload = i128::from(workload_minutes.clamp(0, self.max_workload));
        let full = i128::from(self.full_share(self.weights.fairness));
        // The quotient never exceeds `full`, so it fits back into i64.
        (full * workload / (i128::from(self.max_workload) * i128::from(self.tasks))) as i64
    }

    /// Cost per minute of the booking's finishing time.
    pub fn makespan_weight(&self) -> i64 {
        self.weights.idle_time.saturating_mul(RESOLUTION)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ServiceTask, StaffCandidate, TimeSlot};
    use chrono::{TimeZone, Utc};

    fn problem(weights: ObjectiveWeights) -> OptimizationProblem {
        let t0 = Utc.with_ymd_and_hms(2026, 3, 2, 9, 0, 0).unwrap();
        OptimizationProblem::new("B1", TimeSlot::from_minutes(t0, 120))
            .with_task(ServiceTask::new("I1", "a", 30))
            .with_task(ServiceTask::new("I2", "b", 30))
            .with_staff(StaffCandidate::new("S1").with_workload(240))
            .with_staff(StaffCandidate::new("S2").with_workload(60))
            .with_weights(weights)
    }

    #[test]
    fn test_coefficients() {
        let scale = ObjectiveScale::new(&problem(ObjectiveWeights::new(5, 7, 3, 2)));
        // n = 2, H = 120, L = 240
        assert_eq!(scale.preference_penalty(), 7 * 100 * 120 / 2);
        assert_eq!(scale.fairness_penalty(60), 5 * 100 * 120 * 60 / (240 * 2));
        assert_eq!(scale.makespan_weight(), 3 * 100);
    }

    #[test]
    fn test_full_shares_compare_by_weight() {
        // One unhonored preference out of n tasks, a full-load staff member for
        // every task, and a plan ending at the horizon all weigh the same
        // when their weights are equal.
        let scale = ObjectiveScale::new(&problem(ObjectiveWeights::new(4, 4, 4, 0)));
        let pref_share = 2 * scale.preference_penalty(); // n violations
        let fair_share = 2 * scale.fairness_penalty(240);
        let idle_share = 120 * scale.makespan_weight();
        assert_eq!(pref_share, fair_share);
        assert_eq!(fair_share, idle_share);
    }

    #[test]
    fn test_zero_weights_zero_costs() {
        let scale = ObjectiveScale::new(&problem(ObjectiveWeights::new(0, 0, 0, 0)));
        assert_eq!(scale.preference_penalty(), 0);
        assert_eq!(scale.fairness_penalty(100), 0);
        assert_eq!(scale.makespan_weight(), 0);
    }

    #[test]
    fn test_no_workload_data() {
        let t0 = Utc.with_ymd_and_hms(2026, 3, 2, 9, 0, 0).unwrap();
        let p = OptimizationProblem::new("B1", TimeSlot::from_minutes(t0, 60))
            .with_task(ServiceTask::new("I1", "a", 30))
            .with_staff(StaffCandidate::new("S1"));
        let scale = ObjectiveScale::new(&p);
        assert_eq!(scale.fairness_penalty(0), 0);
        assert_eq!(scale.makespan_weight(), 300);
    }

    #[test]
    fn test_huge_workload_does_not_overflow() {
        // Unvalidated input still yields exact, bounded coefficients.
        let t0 = Utc.with_ymd_and_hms(2026, 3, 2, 9, 0, 0).unwrap();
        let p = OptimizationProblem::new("B1", TimeSlot::from_minutes(t0, 120))
            .with_task(ServiceTask::new("I1", "a", 30))
            .with_staff(StaffCandidate::new("S1").with_workload(i64::MAX))
            .with_weights(ObjectiveWeights::new(10, 10, 10, 0));
        let scale = ObjectiveScale::new(&p);
        assert_eq!(scale.fairness_penalty(i64::MAX), 10 * 100 * 120);
        assert!(scale.fairness_penalty(i64::MAX / 2) < 10 * 100 * 120);
        assert_eq!(scale.fairness_penalty(-5), 0);
    }
}
