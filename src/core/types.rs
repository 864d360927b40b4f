use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use serde::Serialize;

use super::policy::RecommendationPolicy;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulationConfig {
    pub seed: u32,
    pub step_count: u32,
    pub start_value: f64,
    pub drift: f64,
    pub volatility: f64,
    pub shock_probability: f64,
    pub iteration_count: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Path {
    pub values: Vec<f64>,
    pub shocks: u32,
}

impl Path {
    pub fn terminal(&self) -> f64 {
        self.values.last().copied().unwrap_or(0.0)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Ensemble {
    pub paths: Vec<Path>,
}

impl Ensemble {
    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    pub fn terminal_values(&self) -> Vec<f64> {
        self.paths.iter().map(Path::terminal).collect()
    }

    pub fn total_shocks(&self) -> u64 {
        self.paths.iter().map(|p| p.shocks as u64).sum()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PercentileBand {
    pub step: u32,
    pub p05: f64,
    pub p50: f64,
    pub p95: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OutcomeSummary {
    pub best: f64,
    pub worst: f64,
    pub average: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RiskMetrics {
    pub value_at_risk_percent: f64,
    pub volatility_index: f64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Recommendation {
    pub title: String,
    pub rationale: String,
    pub priority: u8,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum SensitivityDriver {
    Drift,
    Volatility,
    ShockProbability,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SensitivityImpact {
    pub driver: SensitivityDriver,
    pub perturbed_value: f64,
    pub value_at_risk_percent: f64,
    pub value_at_risk_delta: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulationResult {
    pub fingerprint: String,
    pub path_count: usize,
    pub draws: u64,
    pub total_shocks: u64,
    pub paths: Vec<Path>,
    pub bands: Vec<PercentileBand>,
    pub outcome: OutcomeSummary,
    pub risk: RiskMetrics,
    pub recommendations: Vec<Recommendation>,
}

#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
    completed: Arc<AtomicUsize>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.flag.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::Relaxed)
    }

    pub fn paths_completed(&self) -> usize {
        self.completed.load(Ordering::Relaxed)
    }

    pub(crate) fn record_path(&self) {
        self.completed.fetch_add(1, Ordering::Relaxed);
    }
}

#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    pub parallel: bool,
    pub display_limit: Option<usize>,
    pub cancel: Option<CancelToken>,
    pub policy: RecommendationPolicy,
}
