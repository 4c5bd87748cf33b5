use thiserror::Error;

#[derive(Debug, Error)]
pub enum TrackerError {
    #[error("invalid input: {0}")]
    Validation(String),
    #[error("waybill '{waybill}' has already been received")]
    AlreadyReceived { waybill: String },
    #[error("{0} not found")]
    NotFound(String),
    #[error("adjusting '{name}' by {delta} would leave {on_hand} on hand below zero")]
    InvalidAdjustment {
        name: String,
        on_hand: u64,
        delta: i64,
    },
    #[error("storage error: {0}")]
    Persistence(#[from] psi_store::StoreError),
}

impl TrackerError {
    pub(crate) fn validation(msg: impl Into<String>) -> Self {
        TrackerError::Validation(msg.into())
    }

    /// Short stable code for machine-readable output.
    pub fn code(&self) -> &'static str {
        match self {
            TrackerError::Validation(_) => "validation",
            TrackerError::AlreadyReceived { .. } => "already_received",
            TrackerError::NotFound(_) => "not_found",
            TrackerError::InvalidAdjustment { .. } => "invalid_adjustment",
            TrackerError::Persistence(_) => "persistence",
        }
    }
}

pub type TrackerResult<T> = Result<T, TrackerError>;
