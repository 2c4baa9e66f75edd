use thiserror::Error;

#[derive(Error, Debug)]
pub enum RlError {
    #[error("invalid configuration: {0}")]
    Configuration(String),
    #[error("episode mismatch: state window has {state} rows, observation window has {observation}")]
    EpisodeMismatch { state: usize, observation: usize },
    #[error("invalid action: expected {expected} elements, got {got}")]
    InvalidAction { expected: usize, got: usize },
    #[error("lifecycle violation: {0}")]
    Lifecycle(&'static str),
    #[error("batch shape mismatch: {0}")]
    BatchShape(String),
    #[error(transparent)]
    Policy(anyhow::Error),
    #[error(transparent)]
    Dynamics(anyhow::Error),
}

pub type Result<T, E = RlError> = std::result::Result<T, E>;
