use thiserror::Error;

/// Hard failures raised while the simulation is running.
///
/// These are invariant violations, not recoverable conditions: a request that
/// could never be satisfied must abort the run instead of blocking forever.
#[derive(Debug, Error)]
pub enum SimulationError {
    #[error("container {container}: capacity must be greater than 0")]
    ZeroCapacity { container: String },

    #[error("container {container}: initial level {initial} exceeds capacity {capacity}")]
    InitialExceedsCapacity {
        container: String,
        initial: u64,
        capacity: u64,
    },

    #[error("process {process} issued a zero-amount request on container {container}")]
    ZeroAmount { process: String, container: String },

    #[error(
        "process {process} requested {amount} on container {container} \
         whose capacity is {capacity}; the request can never be satisfied"
    )]
    AmountExceedsCapacity {
        process: String,
        container: String,
        amount: u64,
        capacity: u64,
    },

    #[error("process {process} requested an invalid hold of {hours} hours")]
    InvalidHold { process: String, hours: f64 },
}
