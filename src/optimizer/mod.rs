//! Booking optimization engine.
//!
//! Turns one [`OptimizationProblem`] into an [`OptimizationResult`]:
//!
//! 1. Validate the problem (malformed input is the only error path).
//! 2. Pre-check coverage: every task needs a qualified, available staff
//!    member and, if it uses one, an available resource; the booking must
//!    fit the window. Failures short-circuit to `INFEASIBLE` without
//!    spending the time budget.
//! 3. Build the CP model ([`BookingCpBuilder`]) and solve it.
//! 4. Map the solver status and read back assignments, converting horizon
//!    minutes to timestamps from the window start.
//!
//! A solve is synchronous and CPU-bound for up to the time budget. It
//! shares no state with other solves, so callers on an async runtime
//! should run it on a blocking worker thread.

mod builder;
mod objective;

pub use builder::{BookingCpBuilder, BookingModel, TaskVars};
pub use objective::ObjectiveScale;

use std::collections::BTreeSet;
use std::time::Instant;

use tracing::{info, warn};

use crate::cp::{CpSolution, CpSolver, CpStatus, PumpkinCpSolver, SolverConfig};
use crate::error::Result;
use crate::models::{
    minutes_to_time, Assignment, OptimizationProblem, OptimizationResult, OptimizationStatus,
};
use crate::validation::validate_problem;

/// Solves `problem` with the default solver and a clamped time budget.
///
/// # Example
/// ```
/// use chrono::{TimeZone, Utc};
/// use spa_booking_optimizer::models::{
///     OptimizationProblem, OptimizationStatus, ServiceTask, StaffCandidate, TimeSlot,
/// };
///
/// let t0 = Utc.with_ymd_and_hms(2026, 3, 2, 9, 0, 0).unwrap();
/// let window = TimeSlot::from_minutes(t0, 90);
/// let problem = OptimizationProblem::new("B1", window)
///     .with_task(ServiceTask::new("I1", "massage", 60).with_skill("massage"))
///     .with_staff(StaffCandidate::new("S1").with_skill("massage").with_availability(window));
///
/// let result = spa_booking_optimizer::optimizer::solve(&problem, 10).unwrap();
/// assert_eq!(result.status, OptimizationStatus::Optimal);
/// assert_eq!(result.assignments[0].staff_id, "S1");
/// ```
pub fn solve(problem: &OptimizationProblem, timeout_seconds: u64) -> Result<OptimizationResult> {
    let config = SolverConfig::default().with_timeout_seconds(timeout_seconds);
    BookingOptimizer::new(problem, config).solve()
}

/// Booking optimizer over a pluggable CP solver.
pub struct BookingOptimizer<'a, S = PumpkinCpSolver> {
    problem: &'a OptimizationProblem,
    config: SolverConfig,
    solver: S,
}

impl<'a> BookingOptimizer<'a> {
    /// Creates an optimizer using [`PumpkinCpSolver`].
    pub fn new(problem: &'a OptimizationProblem, config: SolverConfig) -> Self {
        Self {
            problem,
            config,
            solver: PumpkinCpSolver::new(),
        }
    }
}

impl<'a, S: CpSolver> BookingOptimizer<'a, S> {
    /// Swaps the CP backend.
    pub fn with_solver<T: CpSolver>(self, solver: T) -> BookingOptimizer<'a, T> {
        BookingOptimizer {
            problem: self.problem,
            config: self.config,
            solver,
        }
    }

    /// Runs one solve attempt.
    ///
    /// # Errors
    /// Returns [`crate::OptimizeError::InvalidProblem`] only for malformed
    /// input. Infeasibility, timeouts and rejected models are reported in
    /// the result's status.
    pub fn solve(&self) -> Result<OptimizationResult> {
        let started = Instant::now();
        validate_problem(self.problem)?;

        let builder = BookingCpBuilder::new(self.problem);
        if let Some(reason) = self.coverage_gap(&builder) {
            let elapsed = started.elapsed().as_millis() as u64;
            warn!(booking_id = %self.problem.booking_id, %reason, "pre-check failed");
            return Ok(OptimizationResult::failed(
                OptimizationStatus::Infeasible,
                reason,
                elapsed,
            ));
        }

        let built = builder.build();
        let solution = self.solver.solve(&built.model, &self.config);
        let elapsed = started.elapsed().as_millis() as u64;
        let result = self.to_result(&built, &solution, elapsed);

        if result.success {
            info!(
                booking_id = %self.problem.booking_id,
                status = %result.status,
                solve_time_ms = result.solve_time_ms,
                objective = solution.objective,
                "booking optimized"
            );
        } else {
            warn!(
                booking_id = %self.problem.booking_id,
                status = %result.status,
                solve_time_ms = result.solve_time_ms,
                message = %result.message,
                "booking not optimized"
            );
        }
        Ok(result)
    }

    /// First reason the booking cannot be planned, detectable without search.
    fn coverage_gap(&self, builder: &BookingCpBuilder<'_>) -> Option<String> {
        let problem = self.problem;
        let horizon = builder.horizon();

        for task in &problem.tasks {
            if task.occupancy() > horizon {
                return Some(format!(
                    "Service {} (task {}) needs {} minutes but the window is only {} minutes",
                    task.service_id,
                    task.id,
                    task.occupancy(),
                    horizon
                ));
            }

            if builder.qualified_staff(task).is_empty() {
                let held: BTreeSet<&str> = problem
                    .staff
                    .iter()
                    .flat_map(|s| s.skills.iter().map(String::as_str))
                    .collect();
                let unheld: Vec<&str> = task
                    .required_skills
                    .iter()
                    .map(String::as_str)
                    .filter(|skill| !held.contains(skill))
                    .collect();
                return Some(if unheld.is_empty() {
                    format!(
                        "No staff holds all of skills {} required by service {} (task {})",
                        join(task.required_skills.iter().map(String::as_str)),
                        task.service_id,
                        task.id
                    )
                } else {
                    format!(
                        "No staff holds skill {} required by service {} (task {})",
                        join(unheld.into_iter()),
                        task.service_id,
                        task.id
                    )
                });
            }

            if builder.eligible_staff(task).is_empty() {
                return Some(format!(
                    "No qualified staff is available for {} minutes within the window for service {} (task {})",
                    task.occupancy(),
                    task.service_id,
                    task.id
                ));
            }

            if task.needs_resource() && builder.eligible_resources(task).is_empty() {
                return Some(format!(
                    "No resource from group {} is available for service {} (task {})",
                    join(task.resource_groups.iter().map(|u| u.group_id.as_str())),
                    task.service_id,
                    task.id
                ));
            }
        }

        let total = problem.total_occupancy();
        if total > horizon {
            return Some(format!(
                "Booking needs {total} minutes of back-to-back services but the window is only {horizon} minutes"
            ));
        }
        None
    }

    /// Status mapping and assignment extraction.
    fn to_result(
        &self,
        built: &BookingModel,
        solution: &CpSolution,
        elapsed_ms: u64,
    ) -> OptimizationResult {
        let status = match solution.status {
            CpStatus::Optimal => OptimizationStatus::Optimal,
            CpStatus::Feasible => OptimizationStatus::Feasible,
            CpStatus::Infeasible => OptimizationStatus::Infeasible,
            CpStatus::ModelInvalid => OptimizationStatus::ModelInvalid,
            CpStatus::Unknown => OptimizationStatus::Timeout,
        };

        let message = match status {
            OptimizationStatus::Optimal => {
                format!("Found an optimal plan for {} services", built.tasks.len())
            }
            OptimizationStatus::Feasible => format!(
                "Found a valid plan for {} services; optimality not proven within {} seconds",
                built.tasks.len(),
                self.config.time_limit_seconds
            ),
            OptimizationStatus::Infeasible => match &solution.message {
                Some(detail) => format!("No valid assignment exists: {detail}"),
                None => "No assignment satisfies staff, resource and time-window constraints"
                    .to_string(),
            },
            OptimizationStatus::ModelInvalid => format!(
                "Constraint model was rejected: {}",
                solution.message.as_deref().unwrap_or("unspecified defect")
            ),
            OptimizationStatus::Timeout => format!(
                "No plan found within {} seconds; retry with a longer budget or relaxed input",
                self.config.time_limit_seconds
            ),
        };

        if !status.is_success() {
            return OptimizationResult::failed(status, message, elapsed_ms);
        }

        match self.extract_assignments(built, solution) {
            Some(assignments) => OptimizationResult::solved(status, message, elapsed_ms, assignments),
            None => OptimizationResult::failed(
                OptimizationStatus::ModelInvalid,
                "Solver reported a solution with an unassigned task",
                elapsed_ms,
            ),
        }
    }

    fn extract_assignments(
        &self,
        built: &BookingModel,
        solution: &CpSolution,
    ) -> Option<Vec<Assignment>> {
        let problem = self.problem;
        let origin = problem.window.start;
        if solution.int_values.len() < built.model.int_var_count()
            || solution.bool_values.len() < built.model.bool_var_count()
        {
            return None;
        }

        built
            .tasks
            .iter()
            .map(|vars| {
                let task = &problem.tasks[vars.task];
                let (staff, _) = vars
                    .staff
                    .iter()
                    .find(|&&(_, b)| solution.bool_value(b))?;
                let resource = vars
                    .resources
                    .iter()
                    .find(|&&(_, b)| solution.bool_value(b))
                    .map(|&(r, _)| problem.resources[r].id.clone());
                if task.needs_resource() && resource.is_none() {
                    return None;
                }

                let start = solution.value(vars.start);
                Some(Assignment::new(
                    &task.id,
                    &problem.staff[*staff].id,
                    resource,
                    minutes_to_time(origin, start),
                    minutes_to_time(origin, start + task.duration),
                ))
            })
            .collect()
    }
}

fn join<'s>(items: impl Iterator<Item = &'s str>) -> String {
    items.collect::<Vec<_>>().join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cp::CpModel;
    use crate::error::OptimizeError;
    use crate::models::{
        BookingOutcome, ObjectiveWeights, ResourceCandidate, ResourceUsage, ServiceTask,
        StaffCandidate, TimeSlot,
    };
    use crate::verify::verify_plan;
    use chrono::{DateTime, Duration, TimeZone, Utc};
    use std::time::Duration as StdDuration;

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 2, 9, 0, 0).unwrap()
    }

    fn at(minutes: i64) -> DateTime<Utc> {
        t0() + Duration::minutes(minutes)
    }

    fn window(minutes: i64) -> TimeSlot {
        TimeSlot::from_minutes(t0(), minutes)
    }

    fn run(problem: &OptimizationProblem) -> OptimizationResult {
        solve(problem, 5).unwrap()
    }

    #[test]
    fn test_trivial_single_task() {
        let p = OptimizationProblem::new("B1", window(90))
            .with_task(ServiceTask::new("I1", "massage", 60).with_skill("A"))
            .with_staff(StaffCandidate::new("S1").with_skill("A").with_availability(window(90)));

        let r = run(&p);
        assert!(r.success);
        assert!(r.status.is_success());
        assert_eq!(r.assignments.len(), 1);
        let a = &r.assignments[0];
        assert_eq!(a.staff_id, "S1");
        assert_eq!(a.resource_id, None);
        assert_eq!(a.duration_minutes(), 60);
        assert_eq!(a.scheduled_start, t0());
        assert!(verify_plan(&p, &r).is_empty());
    }

    #[test]
    fn test_resource_contention_infeasible() {
        let p = OptimizationProblem::new("B1", window(30))
            .with_task(ServiceTask::new("I1", "wrap", 30).with_resource_group("tub"))
            .with_task(ServiceTask::new("I2", "soak", 30).with_resource_group("tub").with_sequence(2))
            .with_staff(StaffCandidate::new("S1").with_availability(window(30)))
            .with_staff(StaffCandidate::new("S2").with_availability(window(30)))
            .with_resource(ResourceCandidate::new("T1", "tub").with_availability(window(30)));

        let r = run(&p);
        assert!(!r.success);
        assert_eq!(r.status, OptimizationStatus::Infeasible);
        assert!(r.assignments.is_empty());
        assert_eq!(r.booking_outcome(), BookingOutcome::NeedsAttention);
    }

    #[test]
    fn test_sequence_enforcement() {
        let p = OptimizationProblem::new("B1", window(40))
            .with_task(ServiceTask::new("I2", "scrub", 20).with_skill("A").with_sequence(2))
            .with_task(ServiceTask::new("I1", "wash", 20).with_skill("A").with_sequence(1))
            .with_staff(StaffCandidate::new("S1").with_skill("A").with_availability(window(40)));

        let r = run(&p);
        assert!(r.status.is_success());
        let first = r.assignment_for_task("I1").unwrap();
        let second = r.assignment_for_task("I2").unwrap();
        assert_eq!(second.scheduled_start, first.scheduled_end);
        assert_eq!(first.scheduled_start, t0());
        // Assignments follow the input task order.
        assert_eq!(r.assignments[0].task_id, "I2");
        assert!(verify_plan(&p, &r).is_empty());
    }

    #[test]
    fn test_preferred_staff_honored() {
        let p = OptimizationProblem::new("B1", window(120))
            .with_task(ServiceTask::new("I1", "massage", 60).with_skill("A"))
            .with_staff(StaffCandidate::new("S1").with_skill("A").with_availability(window(120)))
            .with_staff(StaffCandidate::new("S2").with_skill("A").with_availability(window(120)))
            .with_preferred_staff("S2")
            .with_weights(ObjectiveWeights::new(0, 9, 1, 0));

        let r = run(&p);
        assert_eq!(r.status, OptimizationStatus::Optimal);
        assert_eq!(r.assignments[0].staff_id, "S2");
    }

    #[test]
    fn test_preference_traded_against_idle_time() {
        // The preferred therapist is only free late; idle-time weight dominates.
        let p = OptimizationProblem::new("B1", window(240))
            .with_task(ServiceTask::new("I1", "massage", 60))
            .with_staff(StaffCandidate::new("S1").with_availability(window(240)))
            .with_staff(
                StaffCandidate::new("S2").with_availability(TimeSlot::new(at(180), at(240))),
            )
            .with_preferred_staff("S2")
            .with_weights(ObjectiveWeights::new(0, 1, 10, 0));
        let r = run(&p);
        assert_eq!(r.assignments[0].staff_id, "S1");
        assert_eq!(r.assignments[0].scheduled_start, t0());

        // With preference dominating, the customer waits for S2.
        let p = p.with_weights(ObjectiveWeights::new(0, 10, 1, 0));
        let r = run(&p);
        assert_eq!(r.assignments[0].staff_id, "S2");
        assert_eq!(r.assignments[0].scheduled_start, at(180));
    }

    #[test]
    fn test_fairness_prefers_lighter_workload() {
        let p = OptimizationProblem::new("B1", window(120))
            .with_task(ServiceTask::new("I1", "facial", 45))
            .with_staff(StaffCandidate::new("busy").with_availability(window(120)).with_workload(300))
            .with_staff(StaffCandidate::new("light").with_availability(window(120)).with_workload(30))
            .with_weights(ObjectiveWeights::new(10, 0, 1, 0));
        let r = run(&p);
        assert_eq!(r.assignments[0].staff_id, "light");
    }

    #[test]
    fn test_skill_short_circuit() {
        let p = OptimizationProblem::new("B1", window(120))
            .with_task(ServiceTask::new("I1", "hot-stone", 60).with_skill("stones"))
            .with_staff(StaffCandidate::new("S1").with_skill("swedish").with_availability(window(120)));

        let started = Instant::now();
        let r = solve(&p, 300).unwrap();
        assert_eq!(r.status, OptimizationStatus::Infeasible);
        assert!(r.message.contains("stones"));
        assert!(started.elapsed() < StdDuration::from_secs(1));
    }

    #[test]
    fn test_combined_skills_message() {
        let p = OptimizationProblem::new("B1", window(120))
            .with_task(ServiceTask::new("I1", "combo", 60).with_skill("a").with_skill("b"))
            .with_staff(StaffCandidate::new("S1").with_skill("a").with_availability(window(120)))
            .with_staff(StaffCandidate::new("S2").with_skill("b").with_availability(window(120)));
        let r = run(&p);
        assert_eq!(r.status, OptimizationStatus::Infeasible);
        assert!(r.message.contains("all of skills a, b"));
    }

    #[test]
    fn test_unavailable_staff_short_circuit() {
        let p = OptimizationProblem::new("B1", window(120))
            .with_task(ServiceTask::new("I1", "massage", 60).with_skill("A"))
            .with_staff(StaffCandidate::new("S1").with_skill("A"));
        let r = run(&p);
        assert_eq!(r.status, OptimizationStatus::Infeasible);
        assert!(r.message.contains("No qualified staff is available"));
    }

    #[test]
    fn test_missing_resource_group_short_circuit() {
        let p = OptimizationProblem::new("B1", window(120))
            .with_task(ServiceTask::new("I1", "massage", 60).with_resource_group("beds"))
            .with_staff(StaffCandidate::new("S1").with_availability(window(120)))
            .with_resource(ResourceCandidate::new("C1", "chairs").with_availability(window(120)));
        let r = run(&p);
        assert_eq!(r.status, OptimizationStatus::Infeasible);
        assert!(r.message.contains("beds"));
    }

    #[test]
    fn test_window_too_narrow() {
        let p = OptimizationProblem::new("B1", window(30))
            .with_task(ServiceTask::new("I1", "massage", 60))
            .with_staff(StaffCandidate::new("S1").with_availability(window(30)));
        let r = run(&p);
        assert_eq!(r.status, OptimizationStatus::Infeasible);
        assert!(r.message.contains("window is only 30 minutes"));
    }

    #[test]
    fn test_buffer_blocks_staff_but_not_customer_time() {
        let p = OptimizationProblem::new("B1", window(100))
            .with_task(ServiceTask::new("I1", "massage", 30).with_buffer(10))
            .with_task(ServiceTask::new("I2", "facial", 30).with_sequence(2))
            .with_staff(StaffCandidate::new("S1").with_availability(window(100)));
        let r = run(&p);
        let first = r.assignment_for_task("I1").unwrap();
        let second = r.assignment_for_task("I2").unwrap();
        assert_eq!(first.scheduled_end, at(30));
        assert_eq!(second.scheduled_start, at(40));
        assert!(verify_plan(&p, &r).is_empty());
    }

    #[test]
    fn test_resource_sub_interval_frees_resource() {
        // Two bookings' worth of contention folded into one booking: the
        // steam room is needed only for the first 20 minutes of each task,
        // so the second task can start as soon as the first task ends.
        let p = OptimizationProblem::new("B1", window(90))
            .with_task(
                ServiceTask::new("I1", "steam-massage", 40)
                    .with_resource_usage(ResourceUsage::partial("steam", 0, 20)),
            )
            .with_task(
                ServiceTask::new("I2", "steam-facial", 40)
                    .with_resource_usage(ResourceUsage::partial("steam", 0, 20))
                    .with_sequence(2),
            )
            .with_staff(StaffCandidate::new("S1").with_availability(window(90)))
            .with_resource(
                ResourceCandidate::new("R1", "steam")
                    .with_availability(TimeSlot::new(at(0), at(20)))
                    .with_availability(TimeSlot::new(at(40), at(60))),
            );
        let r = run(&p);
        assert_eq!(r.status, OptimizationStatus::Optimal);
        assert_eq!(r.assignment_for_task("I2").unwrap().scheduled_start, at(40));
        assert_eq!(r.assignments_for_resource("R1").len(), 2);
        assert!(verify_plan(&p, &r).is_empty());
    }

    #[test]
    fn test_staff_availability_gap_delays_start() {
        let p = OptimizationProblem::new("B1", window(180))
            .with_task(ServiceTask::new("I1", "massage", 60))
            .with_staff(
                StaffCandidate::new("S1")
                    .with_availability(TimeSlot::new(at(0), at(30)))
                    .with_availability(TimeSlot::new(at(90), at(180))),
            );
        let r = run(&p);
        assert_eq!(r.assignments[0].scheduled_start, at(90));
    }

    #[test]
    fn test_multi_task_multi_staff_plan_is_valid() {
        let p = OptimizationProblem::new("B1", window(240))
            .with_task(
                ServiceTask::new("I1", "massage", 60)
                    .with_buffer(10)
                    .with_skill("massage")
                    .with_resource_group("beds"),
            )
            .with_task(
                ServiceTask::new("I2", "facial", 45)
                    .with_skill("facial")
                    .with_resource_group("chairs")
                    .with_sequence(2),
            )
            .with_task(
                ServiceTask::new("I3", "manicure", 30)
                    .with_skill("nails")
                    .with_sequence(3),
            )
            .with_staff(
                StaffCandidate::new("S1")
                    .with_skill("massage")
                    .with_skill("facial")
                    .with_availability(window(240)),
            )
            .with_staff(
                StaffCandidate::new("S2")
                    .with_skill("facial")
                    .with_skill("nails")
                    .with_availability(TimeSlot::new(at(60), at(240))),
            )
            .with_resource(ResourceCandidate::new("B1", "beds").with_availability(window(240)))
            .with_resource(ResourceCandidate::new("B2", "beds").with_availability(window(240)))
            .with_resource(ResourceCandidate::new("C1", "chairs").with_availability(window(240)))
            .with_preferred_staff("S1");

        let r = run(&p);
        assert_eq!(r.status, OptimizationStatus::Optimal);
        assert_eq!(r.assignments.len(), 3);
        assert_eq!(r.assignment_for_task("I3").unwrap().staff_id, "S2");
        assert!(r.assignment_for_task("I1").unwrap().resource_id.is_some());
        assert_eq!(r.assignment_for_task("I2").unwrap().resource_id.as_deref(), Some("C1"));
        assert!(verify_plan(&p, &r).is_empty());
        assert_eq!(r.booking_outcome(), BookingOutcome::Confirmed);
    }

    #[test]
    fn test_malformed_problem_is_error() {
        let p = OptimizationProblem::new("B1", window(60));
        match solve(&p, 5) {
            Err(OptimizeError::InvalidProblem(errors)) => assert!(!errors.is_empty()),
            other => panic!("expected InvalidProblem, got {other:?}"),
        }
    }

    struct RejectingSolver;

    impl CpSolver for RejectingSolver {
        fn solve(&self, _model: &CpModel, _config: &SolverConfig) -> CpSolution {
            CpSolution {
                status: CpStatus::ModelInvalid,
                objective: None,
                int_values: Vec::new(),
                bool_values: Vec::new(),
                wall_time: StdDuration::ZERO,
                message: Some("interval 'x' has negative size -1".to_string()),
            }
        }
    }

    #[test]
    fn test_model_invalid_is_reported() {
        let p = OptimizationProblem::new("B1", window(90))
            .with_task(ServiceTask::new("I1", "massage", 60))
            .with_staff(StaffCandidate::new("S1").with_availability(window(90)));
        let r = BookingOptimizer::new(&p, SolverConfig::default())
            .with_solver(RejectingSolver)
            .solve()
            .unwrap();
        assert_eq!(r.status, OptimizationStatus::ModelInvalid);
        assert!(!r.success);
        assert!(r.message.starts_with("Constraint model was rejected"));
    }

    struct StalledSolver;

    impl CpSolver for StalledSolver {
        fn solve(&self, _model: &CpModel, config: &SolverConfig) -> CpSolution {
            CpSolution::empty(CpStatus::Unknown, config.time_limit(), None)
        }
    }

    #[test]
    fn test_exhausted_budget_maps_to_timeout() {
        let p = OptimizationProblem::new("B1", window(90))
            .with_task(ServiceTask::new("I1", "massage", 60))
            .with_staff(StaffCandidate::new("S1").with_availability(window(90)));
        let r = BookingOptimizer::new(&p, SolverConfig::default().with_timeout_seconds(5))
            .with_solver(StalledSolver)
            .solve()
            .unwrap();
        assert_eq!(r.status, OptimizationStatus::Timeout);
        assert!(r.assignments.is_empty());
        assert!(r.message.contains("within 5 seconds"));
    }

    #[test]
    fn test_late_opening_staff_proven_infeasible() {
        // Six back-to-back services fill the hour exactly, so the first must
        // start on the hour, yet every therapist clocks in five minutes late.
        // Each therapist passes the coverage pre-check; only search rules
        // the booking out.
        let late = TimeSlot::new(at(5), at(60));
        let mut p = OptimizationProblem::new("B1", window(60));
        for k in 1..=6 {
            p = p.with_task(
                ServiceTask::new(format!("I{k}"), "express", 10)
                    .with_skill("express")
                    .with_sequence(k),
            );
        }
        for k in 1..=12 {
            p = p.with_staff(
                StaffCandidate::new(format!("S{k}"))
                    .with_skill("express")
                    .with_availability(late),
            );
        }

        let started = Instant::now();
        let r = solve(&p, 30).unwrap();
        assert_eq!(r.status, OptimizationStatus::Infeasible);
        assert!(r.assignments.is_empty());
        assert!(started.elapsed() < StdDuration::from_secs(30));
    }

    #[test]
    fn test_result_serializes() {
        let p = OptimizationProblem::new("B1", window(90))
            .with_task(ServiceTask::new("I1", "massage", 60))
            .with_staff(StaffCandidate::new("S1").with_availability(window(90)));
        let r = run(&p);
        let json = serde_json::to_value(&r).unwrap();
        assert_eq!(json["status"], "OPTIMAL");
        assert_eq!(json["assignments"][0]["staff_id"], "S1");
        assert!(json["assignments"][0]["resource_id"].is_null());
    }
}
