//! Input validation for optimization problems.
//!
//! Checks structural integrity of an assembled problem before a model is
//! built. Detects:
//! - Empty task lists
//! - Duplicate IDs
//! - Degenerate windows, durations and availability slots
//! - Resource usage spans falling outside a task's occupancy
//! - Out-of-range objective weights
//! - Windows and workloads beyond the objective's integer range
//!
//! A problem that fails here is a caller bug, not an infeasible booking.
//! An unknown preferred staff ID is not an error: the
//! preference is soft and simply goes unhonored.

use std::collections::HashSet;

use crate::models::{
    OptimizationProblem, TimeSlot, MAX_HORIZON_MINUTES, MAX_WEIGHT, MAX_WORKLOAD_MINUTES,
};

/// Validation result.
pub type ValidationResult = Result<(), Vec<ValidationError>>;

/// A validation error.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationError {
    /// Error category.
    pub kind: ValidationErrorKind,
    /// Human-readable description.
    pub message: String,
}

/// Categories of validation errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationErrorKind {
    /// The problem has no tasks.
    EmptyProblem,
    /// Two entities share the same ID.
    DuplicateId,
    /// The time window is empty or longer than [`MAX_HORIZON_MINUTES`].
    InvalidWindow,
    /// A task has a non-positive duration or a negative buffer.
    InvalidDuration,
    /// A resource usage span lies outside the task occupancy.
    InvalidResourceUsage,
    /// An availability slot ends before it starts.
    InvalidAvailability,
    /// A staff workload is negative or above [`MAX_WORKLOAD_MINUTES`].
    InvalidWorkload,
    /// An objective weight is outside `0..=10`.
    WeightOutOfRange,
}

impl ValidationError {
    fn new(kind: ValidationErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message)
    }
}

/// Validates an assembled optimization problem.
///
/// Checks:
/// 1. At least one task
/// 2. No duplicate task, staff or resource IDs
/// 3. Window start before window end, at most two days long
/// 4. Positive durations, non-negative buffers
/// 5. Resource usage within `[0, duration + buffer]`
/// 6. No inverted availability slots
/// 7. Workloads within `0..=MAX_WORKLOAD_MINUTES`
/// 8. Weights within `0..=10`
///
/// # Returns
/// `Ok(())` if all checks pass, `Err(errors)` with all detected issues.
pub fn validate_problem(problem: &OptimizationProblem) -> ValidationResult {
    let mut errors = Vec::new();

    if problem.tasks.is_empty() {
        errors.push(ValidationError::new(
            ValidationErrorKind::EmptyProblem,
            format!("Booking '{}' has no tasks to schedule", problem.booking_id),
        ));
    }

    if problem.window.end <= problem.window.start {
        errors.push(ValidationError::new(
            ValidationErrorKind::InvalidWindow,
            format!(
                "Time window {} .. {} is empty",
                problem.window.start, problem.window.end
            ),
        ));
    } else if problem.horizon_minutes() > MAX_HORIZON_MINUTES {
        errors.push(ValidationError::new(
            ValidationErrorKind::InvalidWindow,
            format!(
                "Time window of {} minutes exceeds the {MAX_HORIZON_MINUTES} minute limit",
                problem.horizon_minutes()
            ),
        ));
    }

    let mut task_ids = HashSet::new();
    for task in &problem.tasks {
        if !task_ids.insert(task.id.as_str()) {
            errors.push(ValidationError::new(
                ValidationErrorKind::DuplicateId,
                format!("Duplicate task ID: {}", task.id),
            ));
        }

        if task.duration <= 0 || task.buffer < 0 {
            errors.push(ValidationError::new(
                ValidationErrorKind::InvalidDuration,
                format!(
                    "Task '{}' has duration {} and buffer {}",
                    task.id, task.duration, task.buffer
                ),
            ));
            continue;
        }

        for usage in &task.resource_groups {
            let (offset, length) = usage.span(task.occupancy());
            if offset < 0 || length <= 0 || offset + length > task.occupancy() {
                errors.push(ValidationError::new(
                    ValidationErrorKind::InvalidResourceUsage,
                    format!(
                        "Task '{}' uses group '{}' for [{}, {}) outside its {} minute occupancy",
                        task.id,
                        usage.group_id,
                        offset,
                        offset + length,
                        task.occupancy()
                    ),
                ));
            }
        }
    }

    let mut staff_ids = HashSet::new();
    for staff in &problem.staff {
        if !staff_ids.insert(staff.id.as_str()) {
            errors.push(ValidationError::new(
                ValidationErrorKind::DuplicateId,
                format!("Duplicate staff ID: {}", staff.id),
            ));
        }
        check_slots("staff", &staff.id, &staff.availability, &mut errors);
        if !(0..=MAX_WORKLOAD_MINUTES).contains(&staff.workload_minutes) {
            errors.push(ValidationError::new(
                ValidationErrorKind::InvalidWorkload,
                format!(
                    "Staff '{}' has workload {} minutes, expected 0..={MAX_WORKLOAD_MINUTES}",
                    staff.id, staff.workload_minutes
                ),
            ));
        }
    }

    let mut resource_ids = HashSet::new();
    for resource in &problem.resources {
        if !resource_ids.insert(resource.id.as_str()) {
            errors.push(ValidationError::new(
                ValidationErrorKind::DuplicateId,
                format!("Duplicate resource ID: {}", resource.id),
            ));
        }
        check_slots("resource", &resource.id, &resource.availability, &mut errors);
    }

    for (name, value) in problem.weights.entries() {
        if !(0..=MAX_WEIGHT).contains(&value) {
            errors.push(ValidationError::new(
                ValidationErrorKind::WeightOutOfRange,
                format!("Weight '{name}' is {value}, expected 0..={MAX_WEIGHT}"),
            ));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn check_slots(kind: &str, id: &str, slots: &[TimeSlot], errors: &mut Vec<ValidationError>) {
    for slot in slots {
        if slot.end < slot.start {
            errors.push(ValidationError::new(
                ValidationErrorKind::InvalidAvailability,
                format!(
                    "Availability of {kind} '{id}' ends ({}) before it starts ({})",
                    slot.end, slot.start
                ),
            ));
        }
    }
}
