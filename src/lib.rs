//! Booking optimization engine for multi-service spa bookings.
//!
//! Given one booking (an ordered list of service tasks inside a customer's
//! preferred time window), the staff and resources that could serve it,
//! and their free time, the engine picks a staff member, a resource where
//! one is needed, and a start time for every task. Plans respect skills,
//! availability, no double-booking, service order and the window, and are
//! optimized for preferred staff, workload fairness and an early finish.
//!
//! # Modules
//!
//! - **`models`**: Problem and result types: `ServiceTask`, `StaffCandidate`,
//!   `ResourceCandidate`, `OptimizationProblem`, `OptimizationResult`, `TimeSlot`
//! - **`validation`**: Input integrity checks (duplicate IDs, durations, windows, weights)
//! - **`cp`**: Constraint model and its `pumpkin_solver` backend
//! - **`optimizer`**: Booking formulation, pre-checks and result extraction
//! - **`assembler`**: Builds a problem from booking, catalog, staff and resource records
//! - **`verify`**: Independent plan checks before persisting
//!
//! # Example
//! ```
//! use chrono::{TimeZone, Utc};
//! use spa_booking_optimizer::models::{
//!     OptimizationProblem, ResourceCandidate, ServiceTask, StaffCandidate, TimeSlot,
//! };
//! use spa_booking_optimizer::{verify::verify_plan, BookingOptimizer, SolverConfig};
//!
//! let t0 = Utc.with_ymd_and_hms(2026, 3, 2, 9, 0, 0).unwrap();
//! let window = TimeSlot::from_minutes(t0, 180);
//! let problem = OptimizationProblem::new("B1", window)
//!     .with_task(
//!         ServiceTask::new("I1", "massage", 60)
//!             .with_buffer(15)
//!             .with_skill("massage")
//!             .with_resource_group("beds"),
//!     )
//!     .with_task(ServiceTask::new("I2", "facial", 45).with_skill("facial").with_sequence(2))
//!     .with_staff(
//!         StaffCandidate::new("S1")
//!             .with_skill("massage")
//!             .with_skill("facial")
//!             .with_availability(window),
//!     )
//!     .with_resource(ResourceCandidate::new("R1", "beds").with_availability(window));
//!
//! let result = BookingOptimizer::new(&problem, SolverConfig::default().with_timeout_seconds(10))
//!     .solve()
//!     .unwrap();
//! assert!(result.should_commit());
//! assert!(verify_plan(&problem, &result).is_empty());
//! ```
//!
//! # References
//!
//! - Pinedo (2016), "Scheduling: Theory, Algorithms, and Systems"
//! - Brucker (2007), "Scheduling Algorithms"
//! - Laborie et al. (2018), "IBM ILOG CP Optimizer for Scheduling"

pub mod assembler;
pub mod cp;
pub mod error;
pub mod models;
pub mod optimizer;
pub mod validation;
pub mod verify;

pub use cp::SolverConfig;
pub use error::{AssembleError, OptimizeError};
pub use optimizer::{solve, BookingOptimizer};
