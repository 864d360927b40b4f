use super::engine::generate_ensemble;
use super::error::SimulationError;
use super::types::{
    Ensemble, OutcomeSummary, RiskMetrics, RunOptions, SensitivityDriver, SensitivityImpact,
    SimulationConfig,
};

const DRIFT_SCALE: f64 = 1.2;
const ZERO_DRIFT_BUMP: f64 = 0.001;
const VOLATILITY_SCALE: f64 = 1.2;
const SHOCK_BUMP: f64 = 0.05;

pub fn analyze_risk(config: &SimulationConfig, ensemble: &Ensemble) -> (OutcomeSummary, RiskMetrics) {
    let outcome = summarize_outcomes(ensemble);
    let risk = risk_metrics(config, &outcome);
    (outcome, risk)
}

pub fn summarize_outcomes(ensemble: &Ensemble) -> OutcomeSummary {
    let mut terminal = ensemble.terminal_values();
    if terminal.is_empty() {
        return OutcomeSummary {
            best: 0.0,
            worst: 0.0,
            average: 0.0,
        };
    }

    terminal.sort_by(|a, b| a.total_cmp(b));
    let worst = terminal[0];
    let best = terminal[terminal.len() - 1];
    let mean = terminal.iter().sum::<f64>() / terminal.len() as f64;

    OutcomeSummary {
        best,
        worst,
        // Rounding in the sum can push a flat ensemble's mean past its extremes.
        average: mean.clamp(worst, best),
    }
}

pub fn risk_metrics(config: &SimulationConfig, outcome: &OutcomeSummary) -> RiskMetrics {
    RiskMetrics {
        value_at_risk_percent: 100.0 * (1.0 - outcome.worst / config.start_value),
        volatility_index: config.volatility * (config.step_count as f64).sqrt(),
    }
}

pub fn analyze_sensitivity(
    config: &SimulationConfig,
    options: &RunOptions,
) -> Result<Vec<SensitivityImpact>, SimulationError> {
    let baseline = value_at_risk(config, options)?;

    let drift = if config.drift == 0.0 {
        ZERO_DRIFT_BUMP
    } else {
        config.drift * DRIFT_SCALE
    };
    let perturbations = [
        (
            SensitivityDriver::Drift,
            drift,
            SimulationConfig { drift, ..*config },
        ),
        (
            SensitivityDriver::Volatility,
            (config.volatility * VOLATILITY_SCALE).min(1.0),
            SimulationConfig {
                volatility: (config.volatility * VOLATILITY_SCALE).min(1.0),
                ..*config
            },
        ),
        (
            SensitivityDriver::ShockProbability,
            (config.shock_probability + SHOCK_BUMP).min(1.0),
            SimulationConfig {
                shock_probability: (config.shock_probability + SHOCK_BUMP).min(1.0),
                ..*config
            },
        ),
    ];

    let mut impacts = Vec::with_capacity(perturbations.len());
    for (driver, perturbed_value, perturbed) in perturbations {
        let var = value_at_risk(&perturbed, options)?;
        impacts.push(SensitivityImpact {
            driver,
            perturbed_value,
            value_at_risk_percent: var,
            value_at_risk_delta: var - baseline,
        });
    }
    impacts.sort_by(|a, b| {
        b.value_at_risk_delta
            .abs()
            .total_cmp(&a.value_at_risk_delta.abs())
    });
    Ok(impacts)
}

fn value_at_risk(config: &SimulationConfig, options: &RunOptions) -> Result<f64, SimulationError> {
    let ensemble = generate_ensemble(config, options)?;
    let (_, risk) = analyze_risk(config, &ensemble);
    Ok(risk.value_at_risk_percent)
}
