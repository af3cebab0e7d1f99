//! Staff and resource candidate models.
//!
//! Candidates are the entities that can be assigned to service tasks:
//! therapists (matched by skills) and physical resources such as beds,
//! rooms and equipment (matched by group). Each carries the slots in which
//! it is free within the optimization window.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use super::{ServiceTask, TimeSlot};

/// A staff member eligible in principle to perform tasks.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StaffCandidate {
    /// Unique staff identifier.
    pub id: String,
    /// Skills held.
    pub skills: BTreeSet<String>,
    /// Free slots within the optimization window. Empty = never available.
    pub availability: Vec<TimeSlot>,
    /// Minutes already booked for this staff member (fairness input).
    pub workload_minutes: i64,
}

/// A physical resource instance. Fungible within its group.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResourceCandidate {
    /// Unique resource identifier.
    pub id: String,
    /// Resource group identifier.
    pub group_id: String,
    /// Free slots within the optimization window. Empty = never available.
    pub availability: Vec<TimeSlot>,
}

impl StaffCandidate {
    /// Creates a staff candidate with no skills and no availability.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            skills: BTreeSet::new(),
            availability: Vec::new(),
            workload_minutes: 0,
        }
    }

    /// Adds a skill.
    pub fn with_skill(mut self, skill_id: impl Into<String>) -> Self {
        self.skills.insert(skill_id.into());
        self
    }

    /// Adds an availability slot.
    pub fn with_availability(mut self, slot: TimeSlot) -> Self {
        self.availability.push(slot);
        self
    }

    /// Sets the existing workload.
    pub fn with_workload(mut self, minutes: i64) -> Self {
        self.workload_minutes = minutes;
        self
    }

    /// Whether this staff member holds every skill the task requires.
    pub fn is_qualified_for(&self, task: &ServiceTask) -> bool {
        task.required_skills.is_subset(&self.skills)
    }

    /// Required skills of `task` this staff member lacks.
    pub fn missing_skills<'a>(&'a self, task: &'a ServiceTask) -> Vec<&'a str> {
        task.required_skills
            .difference(&self.skills)
            .map(String::as_str)
            .collect()
    }
}

impl ResourceCandidate {
    /// Creates a resource candidate with no availability.
    pub fn new(id: impl Into<String>, group_id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            group_id: group_id.into(),
            availability: Vec::new(),
        }
    }

    /// Adds an availability slot.
    pub fn with_availability(mut self, slot: TimeSlot) -> Self {
        self.availability.push(slot);
        self
    }

    /// Whether this resource belongs to one of the task's acceptable groups.
    pub fn is_usable_for(&self, task: &ServiceTask) -> bool {
        task.usage_for_group(&self.group_id).is_some()
    }
}
