//! Booking optimization domain models.
//!
//! Provides the data types exchanged across the optimizer boundary: the
//! assembled problem going in and the result coming out.
//!
//! # Domain Mappings
//!
//! | Model | Spa domain |
//! |-------|-----------|
//! | ServiceTask | Booking line item (one service) |
//! | StaffCandidate | Therapist / technician |
//! | ResourceCandidate | Bed, room, equipment |
//! | OptimizationResult | Proposed appointment plan |

mod calendar;
mod problem;
mod resource;
mod result;
mod task;

pub use calendar::{merge_slots, minutes_to_time, MinuteWindow, TimeSlot};
pub use problem::{
    ObjectiveWeights, OptimizationProblem, MAX_HORIZON_MINUTES, MAX_WEIGHT, MAX_WORKLOAD_MINUTES,
};
pub use resource::{ResourceCandidate, StaffCandidate};
pub use result::{Assignment, BookingOutcome, OptimizationResult, OptimizationStatus};
pub use task::{sequence_order, ResourceUsage, ServiceTask};
