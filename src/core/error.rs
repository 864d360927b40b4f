use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum ConfigError {
    #[error("step count must be > 0")]
    ZeroSteps,
    #[error("iteration count must be > 0")]
    ZeroIterations,
    #[error("start value must be a positive finite number, got {0}")]
    InvalidStartValue(f64),
    #[error("drift must be finite, got {0}")]
    InvalidDrift(f64),
    #[error("volatility must be between 0 and 1, got {0}")]
    InvalidVolatility(f64),
    #[error("shock probability must be between 0 and 1, got {0}")]
    InvalidShockProbability(f64),
}

#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum SimulationError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("path {path_index} diverged at step {step} (value {value})")]
    Divergence {
        path_index: u32,
        step: u32,
        value: f64,
    },
    #[error("simulation cancelled")]
    Cancelled,
}
