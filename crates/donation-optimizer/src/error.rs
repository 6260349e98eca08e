use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DonationError {
    /// The portfolio or request is inconsistent (unknown asset, negative amount).
    #[error("Input error: {0}")]
    Input(String),

    #[error("Parse error: invalid decimal for {field}: {value:?}")]
    Parse { field: String, value: String },

    #[error("Overflow: {0}")]
    Overflow(String),

    #[error("Capacity exceeded: selection table needs {cells} cells, limit is {limit}")]
    CapacityExceeded { cells: u128, limit: u64 },
}

pub type Result<T> = std::result::Result<T, DonationError>;
