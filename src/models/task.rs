//! Service task model.
//!
//! A service task is one booking line item: a single service performed by
//! one staff member, optionally on one physical resource (bed, room,
//! equipment). Tasks of the same booking run back-to-back in
//! `sequence_order`.
//!
//! # Occupancy
//! A task occupies its staff member for `duration + buffer` minutes. The
//! buffer is rest/cleanup time after the service and is not part of the
//! customer-facing appointment, so the scheduled end excludes it.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// One unit of work to schedule.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceTask {
    /// Unique task identifier (booking line item).
    pub id: String,
    /// Abstract service definition this task instantiates.
    pub service_id: String,
    /// Service duration (minutes).
    pub duration: i64,
    /// Rest/cleanup time after the service (minutes).
    pub buffer: i64,
    /// Skills the assigned staff must hold (all of them).
    pub required_skills: BTreeSet<String>,
    /// Acceptable resource groups. Empty = no resource needed.
    pub resource_groups: Vec<ResourceUsage>,
    /// Position within the parent booking (1-based).
    pub sequence_order: i32,
}

/// How a task uses a resource from one acceptable group.
///
/// The resource is held from `start + start_delay` for `usage_minutes`.
/// `None` means until the end of the task's occupancy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceUsage {
    /// Resource group identifier.
    pub group_id: String,
    /// Minutes after the task start at which the resource is needed.
    pub start_delay: i64,
    /// Minutes the resource is held. `None` = to the end of occupancy.
    pub usage_minutes: Option<i64>,
}

impl ServiceTask {
    /// Creates a new task.
    pub fn new(id: impl Into<String>, service_id: impl Into<String>, duration: i64) -> Self {
        Self {
            id: id.into(),
            service_id: service_id.into(),
            duration,
            buffer: 0,
            required_skills: BTreeSet::new(),
            resource_groups: Vec::new(),
            sequence_order: 1,
        }
    }

    /// Sets the buffer time after the service.
    pub fn with_buffer(mut self, buffer: i64) -> Self {
        self.buffer = buffer;
        self
    }

    /// Adds a required skill.
    pub fn with_skill(mut self, skill_id: impl Into<String>) -> Self {
        self.required_skills.insert(skill_id.into());
        self
    }

    /// Adds an acceptable resource group used for the whole task.
    pub fn with_resource_group(mut self, group_id: impl Into<String>) -> Self {
        self.resource_groups.push(ResourceUsage::whole(group_id));
        self
    }

    /// Adds an acceptable resource group with explicit usage.
    pub fn with_resource_usage(mut self, usage: ResourceUsage) -> Self {
        self.resource_groups.push(usage);
        self
    }

    /// Sets the sequence position within the booking.
    pub fn with_sequence(mut self, sequence_order: i32) -> Self {
        self.sequence_order = sequence_order;
        self
    }

    /// Total minutes the task blocks its staff member.
    #[inline]
    pub fn occupancy(&self) -> i64 {
        self.duration + self.buffer
    }

    /// Whether the task needs a physical resource.
    #[inline]
    pub fn needs_resource(&self) -> bool {
        !self.resource_groups.is_empty()
    }

    /// Usage entry for a resource group, if the group is acceptable.
    pub fn usage_for_group(&self, group_id: &str) -> Option<&ResourceUsage> {
        self.resource_groups.iter().find(|u| u.group_id == group_id)
    }
}

impl ResourceUsage {
    /// Resource held for the task's whole occupancy.
    pub fn whole(group_id: impl Into<String>) -> Self {
        Self {
            group_id: group_id.into(),
            start_delay: 0,
            usage_minutes: None,
        }
    }

    /// Resource held for a sub-interval of the task.
    pub fn partial(group_id: impl Into<String>, start_delay: i64, usage_minutes: i64) -> Self {
        Self {
            group_id: group_id.into(),
            start_delay,
            usage_minutes: Some(usage_minutes),
        }
    }

    /// Resolves the usage to `(offset, length)` relative to the task start.
    pub fn span(&self, occupancy: i64) -> (i64, i64) {
        let length = self
            .usage_minutes
            .unwrap_or(occupancy - self.start_delay);
        (self.start_delay, length)
    }
}

/// Returns task indices ordered by `sequence_order`, ties by insertion order.
pub fn sequence_order(tasks: &[ServiceTask]) -> Vec<usize> {
    let mut order: Vec<usize> = (0..tasks.len()).collect();
    // Stable sort keeps insertion order among equal positions.
    order.sort_by_key(|&i| tasks[i].sequence_order);
    order
}
