//! Booking CP formulation.
//!
//! Translates an [`OptimizationProblem`] into a [`CpModel`]:
//! - A start variable and a mandatory occupancy interval per task
//! - One assignment boolean per (task, eligible staff) and per
//!   (task, eligible resource) pair, with `ExactlyOne` over each set
//! - One optional interval per pair, kept inside that candidate's
//!   availability, and `NoOverlap` per staff member and per resource
//! - Precedence between consecutive tasks by `sequence_order`
//! - Preference, fairness and makespan objective terms
//!
//! Resource intervals share the task start but carry the usage offset and
//! length of their group, so a resource needed for part of a service is
//! only blocked for that part.

use tracing::debug;

use super::objective::ObjectiveScale;
use crate::cp::{BoolVarId, CpModel, IntVarId, IntervalId, Literal};
use crate::models::{
    merge_slots, sequence_order, MinuteWindow, OptimizationProblem, ServiceTask, TimeSlot,
};

/// Variables created for one task.
#[derive(Debug, Clone)]
pub struct TaskVars {
    /// Index into `problem.tasks`.
    pub task: usize,
    pub start: IntVarId,
    pub occupancy: IntervalId,
    /// `(index into problem.staff, assignment var)`.
    pub staff: Vec<(usize, BoolVarId)>,
    /// `(index into problem.resources, assignment var)`.
    pub resources: Vec<(usize, BoolVarId)>,
}

/// A built model plus the handles needed to read a solution back.
#[derive(Debug, Clone)]
pub struct BookingModel {
    pub model: CpModel,
    /// One entry per task, in `problem.tasks` order.
    pub tasks: Vec<TaskVars>,
}

/// Builds the booking CP model.
///
/// # Example
/// ```
/// use chrono::{TimeZone, Utc};
/// use spa_booking_optimizer::models::{OptimizationProblem, ServiceTask, StaffCandidate, TimeSlot};
/// use spa_booking_optimizer::optimizer::BookingCpBuilder;
///
/// let t0 = Utc.with_ymd_and_hms(2026, 3, 2, 9, 0, 0).unwrap();
/// let window = TimeSlot::from_minutes(t0, 90);
/// let problem = OptimizationProblem::new("B1", window)
///     .with_task(ServiceTask::new("I1", "massage", 60).with_skill("massage"))
///     .with_staff(StaffCandidate::new("S1").with_skill("massage").with_availability(window));
///
/// let built = BookingCpBuilder::new(&problem).build();
/// assert_eq!(built.tasks.len(), 1);
/// assert_eq!(built.model.horizon, 90);
/// ```
pub struct BookingCpBuilder<'a> {
    problem: &'a OptimizationProblem,
    horizon: i64,
    staff_windows: Vec<Vec<MinuteWindow>>,
    resource_windows: Vec<Vec<MinuteWindow>>,
}

impl<'a> BookingCpBuilder<'a> {
    pub fn new(problem: &'a OptimizationProblem) -> Self {
        let horizon = problem.horizon_minutes();
        let origin = problem.window.start;
        let to_windows = |slots: &[TimeSlot]| -> Vec<MinuteWindow> {
            merge_slots(slots.to_vec())
                .iter()
                .filter_map(|s| s.to_minute_window(origin, horizon))
                .collect()
        };
        Self {
            problem,
            horizon,
            staff_windows: problem.staff.iter().map(|s| to_windows(&s.availability)).collect(),
            resource_windows: problem
                .resources
                .iter()
                .map(|r| to_windows(&r.availability))
                .collect(),
        }
    }

    pub fn horizon(&self) -> i64 {
        self.horizon
    }

    /// Staff holding every required skill, regardless of availability.
    pub fn qualified_staff(&self, task: &ServiceTask) -> Vec<usize> {
        self.problem
            .staff
            .iter()
            .enumerate()
            .filter(|(_, s)| s.is_qualified_for(task))
            .map(|(i, _)| i)
            .collect()
    }

    /// Qualified staff with a free window long enough for the task.
    pub fn eligible_staff(&self, task: &ServiceTask) -> Vec<usize> {
        self.qualified_staff(task)
            .into_iter()
            .filter(|&i| has_room(&self.staff_windows[i], task.occupancy()))
            .collect()
    }

    /// Resources of an acceptable group with a free window long enough for their usage.
    pub fn eligible_resources(&self, task: &ServiceTask) -> Vec<usize> {
        self.problem
            .resources
            .iter()
            .enumerate()
            .filter_map(|(i, r)| {
                let usage = task.usage_for_group(&r.group_id)?;
                let (_, length) = usage.span(task.occupancy());
                has_room(&self.resource_windows[i], length).then_some(i)
            })
            .collect()
    }

    /// Builds the model.
    pub fn build(&self) -> BookingModel {
        let problem = self.problem;
        let mut model = CpModel::new(format!("booking-{}", problem.booking_id), self.horizon);

        // Start, occupancy interval and assignment booleans per task.
        let mut tasks: Vec<TaskVars> = Vec::with_capacity(problem.tasks.len());
        for (t, task) in problem.tasks.iter().enumerate() {
            let occupancy = task.occupancy();
            let start = model.new_int_var(0, self.horizon - occupancy, format!("start_{}", task.id));
            let interval = model.new_interval(start, 0, occupancy, format!("interval_{}", task.id));

            let staff = self
                .eligible_staff(task)
                .into_iter()
                .map(|s| {
                    let var = model.new_bool_var(format!("assign_{}_{}", task.id, problem.staff[s].id));
                    (s, var)
                })
                .collect();
            let resources = if task.needs_resource() {
                self.eligible_resources(task)
                    .into_iter()
                    .map(|r| {
                        let var = model
                            .new_bool_var(format!("resource_{}_{}", task.id, problem.resources[r].id));
                        (r, var)
                    })
                    .collect()
            } else {
                Vec::new()
            };

            tasks.push(TaskVars {
                task: t,
                start,
                occupancy: interval,
                staff,
                resources,
            });
        }

        // Exactly one staff member, exactly one resource when needed.
        for vars in &tasks {
            model.add_exactly_one(vars.staff.iter().map(|&(_, b)| Literal::pos(b)).collect());
            if problem.tasks[vars.task].needs_resource() {
                model.add_exactly_one(vars.resources.iter().map(|&(_, b)| Literal::pos(b)).collect());
            }
        }

        // Optional intervals, availability and no-overlap per candidate.
        for (s, staff) in problem.staff.iter().enumerate() {
            let mut intervals = Vec::new();
            for vars in &tasks {
                let Some(&(_, assigned)) = vars.staff.iter().find(|(i, _)| *i == s) else {
                    continue;
                };
                let task = &problem.tasks[vars.task];
                let iv = model.new_optional_interval(
                    vars.start,
                    0,
                    task.occupancy(),
                    Literal::pos(assigned),
                    format!("opt_staff_{}_{}", task.id, staff.id),
                );
                model.add_within_windows(iv, self.staff_windows[s].clone());
                intervals.push(iv);
            }
            if !intervals.is_empty() {
                model.add_no_overlap(intervals);
            }
        }

        for (r, resource) in problem.resources.iter().enumerate() {
            let mut intervals = Vec::new();
            for vars in &tasks {
                let Some(&(_, assigned)) = vars.resources.iter().find(|(i, _)| *i == r) else {
                    continue;
                };
                let task = &problem.tasks[vars.task];
                let Some(usage) = task.usage_for_group(&resource.group_id) else {
                    continue;
                };
                let (offset, length) = usage.span(task.occupancy());
                let iv = model.new_optional_interval(
                    vars.start,
                    offset,
                    length,
                    Literal::pos(assigned),
                    format!("opt_resource_{}_{}", task.id, resource.id),
                );
                model.add_within_windows(iv, self.resource_windows[r].clone());
                intervals.push(iv);
            }
            if !intervals.is_empty() {
                model.add_no_overlap(intervals);
            }
        }

        // Consecutive tasks of the booking run in sequence order.
        let order = sequence_order(&problem.tasks);
        for pair in order.windows(2) {
            model.add_precedence(tasks[pair[0]].occupancy, tasks[pair[1]].occupancy, 0);
        }

        // Weighted objective.
        self.add_objective(&mut model, &tasks);

        debug!(
            booking_id = %problem.booking_id,
            horizon = self.horizon,
            tasks = tasks.len(),
            bool_vars = model.bool_var_count(),
            intervals = model.interval_count(),
            "built booking model"
        );

        BookingModel { model, tasks }
    }

    fn add_objective(&self, model: &mut CpModel, tasks: &[TaskVars]) {
        let problem = self.problem;
        let scale = ObjectiveScale::new(problem);

        if let Some(preferred) = problem.preferred_staff_id.as_deref() {
            for vars in tasks {
                // Tasks the preferred staff cannot take pay a constant penalty; leave it out.
                let pref = vars
                    .staff
                    .iter()
                    .find(|&&(s, _)| problem.staff[s].id == preferred);
                if let Some(&(_, assigned)) = pref {
                    model.add_objective_term(Literal::neg(assigned), scale.preference_penalty());
                }
            }
        }

        for vars in tasks {
            for &(s, assigned) in &vars.staff {
                let penalty = scale.fairness_penalty(problem.staff[s].workload_minutes);
                model.add_objective_term(Literal::pos(assigned), penalty);
            }
        }

        let ends = tasks.iter().map(|v| v.occupancy).collect();
        model.set_makespan_objective(ends, scale.makespan_weight());
    }
}

fn has_room(windows: &[MinuteWindow], length: i64) -> bool {
    windows.iter().any(|w| w.length() >= length)
}
