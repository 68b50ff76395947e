use thiserror::Error;

/// Errors from pool sizing and symbol placement
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CoordError {
    #[error("Unable to determine CPU count")]
    CpuCountUnavailable,

    #[error("Invalid worker count: {0}")]
    InvalidWorkerCount(usize),

    #[error("Random source drew worker {draw}, outside 0..{worker_count}")]
    DrawOutOfRange { draw: usize, worker_count: usize },

    #[error("Invalid load factor: {0} (must be a positive number)")]
    InvalidLoadFactor(f64),
}
