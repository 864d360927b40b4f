mod engine;
mod error;
mod policy;
mod risk;
mod stream;
mod types;

pub use engine::{
    config_fingerprint, draw_count, generate_ensemble, generate_path, path_seed,
    percentile_bands, run_simulation, run_simulation_with, validate_config,
};
pub use error::{ConfigError, SimulationError};
pub use policy::{RecommendationPolicy, RiskMetric, RiskRule, VALUE_AT_RISK_THRESHOLD};
pub use risk::{analyze_risk, analyze_sensitivity, risk_metrics, summarize_outcomes};
pub use stream::Lcg;
pub use types::{
    CancelToken, Ensemble, OutcomeSummary, Path, PercentileBand, Recommendation, RiskMetrics,
    RunOptions, SensitivityDriver, SensitivityImpact, SimulationConfig, SimulationResult,
};
