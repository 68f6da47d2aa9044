use thiserror::Error;

// Unified error type for pipelcg

#[derive(Error, Debug)]
pub enum KError {
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("solve error: {0}")]
    SolveError(String),
}
