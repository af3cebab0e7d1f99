//! Error types crossing the optimizer boundary.
//!
//! Only caller bugs are errors. Infeasible bookings, timeouts and rejected
//! models are reported through [`crate::models::OptimizationResult`].

use crate::validation::ValidationError;

/// Error returned by the optimizer for malformed input.
#[derive(Debug, thiserror::Error)]
pub enum OptimizeError {
    #[error("Invalid optimization problem: {}", join_messages(.0))]
    InvalidProblem(Vec<ValidationError>),
}

/// Error returned by the input assembler.
#[derive(Debug, thiserror::Error)]
pub enum AssembleError {
    #[error("Booking '{0}' has no line items")]
    EmptyBooking(String),

    #[error("Line item '{item_id}' references unknown service '{service_id}'")]
    UnknownService { item_id: String, service_id: String },

    #[error("Booking '{booking_id}' window ends at or before it starts")]
    InvalidWindow { booking_id: String },

    #[error("Service '{service_id}' needs {quantity} units of group '{group_id}'; a task holds one resource")]
    UnsupportedQuantity {
        service_id: String,
        group_id: String,
        quantity: u32,
    },
}

pub type Result<T> = std::result::Result<T, OptimizeError>;

fn join_messages(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(|e| e.message.as_str())
        .collect::<Vec<_>>()
        .join("; ")
}

impl From<Vec<ValidationError>> for OptimizeError {
    fn from(errors: Vec<ValidationError>) -> Self {
        Self::InvalidProblem(errors)
    }
}
