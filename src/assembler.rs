//! Problem assembly from booking records.
//!
//! Callers load a booking, the service catalog, staff and resources from
//! their own store and hand plain records here. The assembler:
//!
//! - expands each line item into a [`ServiceTask`] using its service
//!   definition (duration, buffer, skills, resource requirements)
//! - treats a service's resource requirement rows as alternative groups:
//!   the task takes one resource from any listed group
//! - drops inactive staff and resources that are not `Active`
//! - clips shifts and resource availability to the booking window
//! - subtracts existing commitments and maintenance windows
//! - derives each staff member's existing workload from their commitments
//!
//! Candidates left with no free time are still included; the optimizer
//! reports them as unavailable rather than silently ignoring them.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::AssembleError;
use crate::models::{
    merge_slots, ObjectiveWeights, OptimizationProblem, ResourceCandidate, ResourceUsage,
    ServiceTask, StaffCandidate, TimeSlot,
};

/// A customer booking awaiting assignment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookingRecord {
    pub id: String,
    pub items: Vec<BookingItemRecord>,
    pub preferred_start: DateTime<Utc>,
    pub preferred_end: DateTime<Utc>,
    #[serde(default)]
    pub preferred_staff_id: Option<String>,
}

/// One service line of a booking.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookingItemRecord {
    pub id: String,
    pub service_id: String,
    #[serde(default)]
    pub sequence_order: i32,
}

/// Catalog entry for a service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceDefinition {
    pub id: String,
    /// Minutes.
    pub duration: i64,
    /// Minutes of cleanup after the service.
    #[serde(default)]
    pub buffer: i64,
    #[serde(default)]
    pub skill_ids: Vec<String>,
    #[serde(default)]
    pub resource_requirements: Vec<ResourceRequirementRecord>,
}

/// A resource group a service draws from.
///
/// Rows of one service are alternatives, not simultaneous needs. A task
/// holds exactly one resource, so `quantity` above 1 is rejected and a
/// `quantity` of 0 drops the row.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResourceRequirementRecord {
    pub group_id: String,
    #[serde(default = "default_quantity")]
    pub quantity: u32,
    #[serde(default)]
    pub start_delay: i64,
    /// `None` holds the resource until the end of the service and buffer.
    #[serde(default)]
    pub usage_duration: Option<i64>,
}

/// A staff member and their calendar.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StaffRecord {
    pub id: String,
    #[serde(default = "default_active")]
    pub is_active: bool,
    #[serde(default)]
    pub skill_ids: Vec<String>,
    /// Working shifts.
    #[serde(default)]
    pub shifts: Vec<TimeSlot>,
    /// Time already booked by other appointments.
    #[serde(default)]
    pub commitments: Vec<TimeSlot>,
}

/// Operational state of a resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ResourceStatus {
    #[default]
    Active,
    Maintenance,
    Inactive,
}

/// A physical resource and its calendar.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResourceRecord {
    pub id: String,
    pub group_id: String,
    #[serde(default)]
    pub status: ResourceStatus,
    #[serde(default)]
    pub maintenance: Vec<TimeSlot>,
    #[serde(default)]
    pub commitments: Vec<TimeSlot>,
}

fn default_active() -> bool {
    true
}

fn default_quantity() -> u32 {
    1
}

/// Builds the optimization problem for one booking.
///
/// Resources are available for the whole window unless a maintenance
/// window or commitment says otherwise. Staff are only available during
/// their shifts.
///
/// # Errors
/// Returns [`AssembleError`] if the booking has no items, its window is
/// empty, an item references a service missing from `services`, or a
/// service needs more than one unit of a resource group.
pub fn assemble(
    booking: &BookingRecord,
    services: &[ServiceDefinition],
    staff: &[StaffRecord],
    resources: &[ResourceRecord],
    weights: ObjectiveWeights,
) -> Result<OptimizationProblem, AssembleError> {
    if booking.items.is_empty() {
        return Err(AssembleError::EmptyBooking(booking.id.clone()));
    }
    if booking.preferred_end <= booking.preferred_start {
        return Err(AssembleError::InvalidWindow {
            booking_id: booking.id.clone(),
        });
    }

    let window = TimeSlot::new(booking.preferred_start, booking.preferred_end);
    let catalog: HashMap<&str, &ServiceDefinition> =
        services.iter().map(|s| (s.id.as_str(), s)).collect();

    let mut problem = OptimizationProblem::new(&booking.id, window).with_weights(weights);
    if let Some(preferred) = &booking.preferred_staff_id {
        problem = problem.with_preferred_staff(preferred);
    }

    for item in &booking.items {
        let service = catalog.get(item.service_id.as_str()).ok_or_else(|| {
            AssembleError::UnknownService {
                item_id: item.id.clone(),
                service_id: item.service_id.clone(),
            }
        })?;
        problem = problem.with_task(task_for(item, service)?);
    }

    let mut skipped_staff = 0;
    for record in staff {
        if !record.is_active {
            skipped_staff += 1;
            continue;
        }
        let mut candidate =
            StaffCandidate::new(&record.id).with_workload(booked_minutes(&record.commitments));
        for skill in &record.skill_ids {
            candidate = candidate.with_skill(skill);
        }
        for slot in free_slots(&window, &record.shifts, &record.commitments) {
            candidate = candidate.with_availability(slot);
        }
        problem = problem.with_staff(candidate);
    }

    let mut skipped_resources = 0;
    for record in resources {
        if record.status != ResourceStatus::Active {
            skipped_resources += 1;
            continue;
        }
        let blocked: Vec<TimeSlot> = record
            .maintenance
            .iter()
            .chain(&record.commitments)
            .copied()
            .collect();
        let mut candidate = ResourceCandidate::new(&record.id, &record.group_id);
        for slot in free_slots(&window, &[window], &blocked) {
            candidate = candidate.with_availability(slot);
        }
        problem = problem.with_resource(candidate);
    }

    debug!(
        booking_id = %booking.id,
        tasks = problem.tasks.len(),
        staff = problem.staff.len(),
        resources = problem.resources.len(),
        skipped_staff,
        skipped_resources,
        "assembled problem"
    );
    Ok(problem)
}

fn task_for(
    item: &BookingItemRecord,
    service: &ServiceDefinition,
) -> Result<ServiceTask, AssembleError> {
    let mut task = ServiceTask::new(&item.id, &service.id, service.duration)
        .with_buffer(service.buffer)
        .with_sequence(item.sequence_order);
    for skill in &service.skill_ids {
        task = task.with_skill(skill);
    }
    for req in &service.resource_requirements {
        match req.quantity {
            0 => continue,
            1 => {}
            quantity => {
                return Err(AssembleError::UnsupportedQuantity {
                    service_id: service.id.clone(),
                    group_id: req.group_id.clone(),
                    quantity,
                })
            }
        }
        let usage = match req.usage_duration {
            Some(minutes) => ResourceUsage::partial(&req.group_id, req.start_delay, minutes),
            None => ResourceUsage {
                group_id: req.group_id.clone(),
                start_delay: req.start_delay,
                usage_minutes: None,
            },
        };
        task = task.with_resource_usage(usage);
    }
    Ok(task)
}

/// `open` clipped to `window`, minus every `blocked` slot.
fn free_slots(window: &TimeSlot, open: &[TimeSlot], blocked: &[TimeSlot]) -> Vec<TimeSlot> {
    let mut free = merge_slots(open.iter().filter_map(|s| s.intersect(window)).collect());
    for b in blocked {
        free = free.iter().flat_map(|slot| slot.subtract(b)).collect();
    }
    free
}

fn booked_minutes(commitments: &[TimeSlot]) -> i64 {
    merge_slots(commitments.to_vec())
        .iter()
        .map(TimeSlot::duration_minutes)
        .sum()
}
