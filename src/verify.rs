//! Plan verification.
//!
//! Re-checks a produced plan against the problem it was solved for,
//! independently of the constraint model. Callers can run this before
//! persisting assignments; an empty list means the plan is valid.

use std::collections::HashMap;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::models::{
    merge_slots, sequence_order, Assignment, OptimizationProblem, OptimizationResult, TimeSlot,
};

/// A constraint violation found in a plan.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Violation {
    /// Type of violation.
    pub violation_type: ViolationType,
    /// Related entity ID (task, staff, or resource).
    pub entity_id: String,
    /// Human-readable description.
    pub message: String,
}

/// Classification of plan violations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ViolationType {
    /// A task has no assignment, several, or refers to unknown entities.
    MissingAssignment,
    /// Assigned staff lacks a required skill.
    SkillMismatch,
    /// A staff member works two tasks at once.
    StaffOverlap,
    /// A resource is used by two tasks at once.
    ResourceOverlap,
    /// A task starts before its predecessor in the booking finished.
    SequenceViolation,
    /// A task's occupancy leaves the booking window.
    OutsideWindow,
    /// A task falls outside the staff member's free time.
    StaffUnavailable,
    /// A resource is used outside its free time.
    ResourceUnavailable,
    /// The resource does not belong to an acceptable group, or is missing.
    WrongResourceGroup,
}

impl Violation {
    fn new(
        violation_type: ViolationType,
        entity_id: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            violation_type,
            entity_id: entity_id.into(),
            message: message.into(),
        }
    }
}

impl std::fmt::Display for Violation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{:?}] {}", self.violation_type, self.message)
    }
}

/// A booked span on a staff member or resource.
struct Busy<'a> {
    task_id: &'a str,
    slot: TimeSlot,
}

/// Checks every assignment in `result` against `problem`.
///
/// Occupancy (service plus buffer) is what must fit staff availability
/// and the window; resources are checked over their usage span only.
/// A failed result with no assignments yields no violations.
pub fn verify_plan(problem: &OptimizationProblem, result: &OptimizationResult) -> Vec<Violation> {
    let mut violations = Vec::new();
    if !result.success && result.assignments.is_empty() {
        return violations;
    }

    let mut by_task: HashMap<&str, Vec<&Assignment>> = HashMap::new();
    for a in &result.assignments {
        by_task.entry(a.task_id.as_str()).or_default().push(a);
    }
    for a in &result.assignments {
        if problem.task_by_id(&a.task_id).is_none() {
            violations.push(Violation::new(
                ViolationType::MissingAssignment,
                &a.task_id,
                format!("Assignment for unknown task {}", a.task_id),
            ));
        }
    }

    let mut staff_busy: HashMap<&str, Vec<Busy<'_>>> = HashMap::new();
    let mut resource_busy: HashMap<&str, Vec<Busy<'_>>> = HashMap::new();
    let mut starts: HashMap<&str, DateTime<Utc>> = HashMap::new();

    for task in &problem.tasks {
        let assigned = by_task.get(task.id.as_str()).map(Vec::as_slice).unwrap_or(&[]);
        let a = match assigned {
            [a] => *a,
            [] => {
                violations.push(Violation::new(
                    ViolationType::MissingAssignment,
                    &task.id,
                    format!("Task {} has no assignment", task.id),
                ));
                continue;
            }
            many => {
                violations.push(Violation::new(
                    ViolationType::MissingAssignment,
                    &task.id,
                    format!("Task {} has {} assignments", task.id, many.len()),
                ));
                continue;
            }
        };

        let start = a.scheduled_start;
        let occupied = TimeSlot::new(start, start + Duration::minutes(task.occupancy()));
        starts.insert(task.id.as_str(), start);

        if a.duration_minutes() != task.duration {
            violations.push(Violation::new(
                ViolationType::MissingAssignment,
                &task.id,
                format!(
                    "Task {} is scheduled for {} minutes instead of {}",
                    task.id,
                    a.duration_minutes(),
                    task.duration
                ),
            ));
        }

        if !problem.window.covers(&occupied) {
            violations.push(Violation::new(
                ViolationType::OutsideWindow,
                &task.id,
                format!("Task {} runs outside the booking window", task.id),
            ));
        }

        match problem.staff_by_id(&a.staff_id) {
            None => violations.push(Violation::new(
                ViolationType::MissingAssignment,
                &task.id,
                format!("Task {} is assigned to unknown staff {}", task.id, a.staff_id),
            )),
            Some(staff) => {
                let missing = staff.missing_skills(task);
                if !missing.is_empty() {
                    violations.push(Violation::new(
                        ViolationType::SkillMismatch,
                        &staff.id,
                        format!(
                            "Staff {} lacks skills {} for task {}",
                            staff.id,
                            missing.join(", "),
                            task.id
                        ),
                    ));
                }
                if !fits_free_time(&staff.availability, &occupied) {
                    violations.push(Violation::new(
                        ViolationType::StaffUnavailable,
                        &staff.id,
                        format!("Staff {} is not free for task {}", staff.id, task.id),
                    ));
                }
                staff_busy.entry(staff.id.as_str()).or_default().push(Busy {
                    task_id: task.id.as_str(),
                    slot: occupied,
                });
            }
        }

        match (&a.resource_id, task.needs_resource()) {
            (None, false) => {}
            (None, true) => violations.push(Violation::new(
                ViolationType::WrongResourceGroup,
                &task.id,
                format!("Task {} needs a resource but has none", task.id),
            )),
            (Some(resource_id), _) => {
                let Some(resource) = problem.resource_by_id(resource_id) else {
                    violations.push(Violation::new(
                        ViolationType::MissingAssignment,
                        &task.id,
                        format!("Task {} is assigned to unknown resource {}", task.id, resource_id),
                    ));
                    continue;
                };
                let Some(usage) = task.usage_for_group(&resource.group_id) else {
                    violations.push(Violation::new(
                        ViolationType::WrongResourceGroup,
                        &resource.id,
                        format!(
                            "Resource {} (group {}) is not acceptable for task {}",
                            resource.id, resource.group_id, task.id
                        ),
                    ));
                    continue;
                };
                let (offset, length) = usage.span(task.occupancy());
                let used_from = start + Duration::minutes(offset);
                let used = TimeSlot::new(used_from, used_from + Duration::minutes(length));
                if !fits_free_time(&resource.availability, &used) {
                    violations.push(Violation::new(
                        ViolationType::ResourceUnavailable,
                        &resource.id,
                        format!("Resource {} is not free for task {}", resource.id, task.id),
                    ));
                }
                resource_busy.entry(resource.id.as_str()).or_default().push(Busy {
                    task_id: task.id.as_str(),
                    slot: used,
                });
            }
        }
    }

    check_overlaps(&staff_busy, ViolationType::StaffOverlap, &mut violations);
    check_overlaps(&resource_busy, ViolationType::ResourceOverlap, &mut violations);

    let order = sequence_order(&problem.tasks);
    for pair in order.windows(2) {
        let (prev, next) = (&problem.tasks[pair[0]], &problem.tasks[pair[1]]);
        let (Some(&prev_start), Some(&next_start)) =
            (starts.get(prev.id.as_str()), starts.get(next.id.as_str()))
        else {
            continue;
        };
        if next_start < prev_start + Duration::minutes(prev.occupancy()) {
            violations.push(Violation::new(
                ViolationType::SequenceViolation,
                &next.id,
                format!("Task {} starts before task {} is finished", next.id, prev.id),
            ));
        }
    }

    violations
}

fn fits_free_time(availability: &[TimeSlot], span: &TimeSlot) -> bool {
    merge_slots(availability.to_vec())
        .iter()
        .any(|slot| slot.covers(span))
}

fn check_overlaps(
    busy: &HashMap<&str, Vec<Busy<'_>>>,
    violation_type: ViolationType,
    violations: &mut Vec<Violation>,
) {
    let mut owners: Vec<&&str> = busy.keys().collect();
    owners.sort();
    for owner in owners {
        let spans = &busy[*owner];
        for (i, a) in spans.iter().enumerate() {
            for b in &spans[i + 1..] {
                if a.slot.overlaps(&b.slot) {
                    violations.push(Violation::new(
                        violation_type,
                        *owner,
                        format!(
                            "{} is booked for tasks {} and {} at the same time",
                            owner, a.task_id, b.task_id
                        ),
                    ));
                }
            }
        }
    }
}
