use rayon::iter::{IntoParallelIterator, ParallelIterator};
use tracing::{debug, warn};

use super::error::{ConfigError, SimulationError};
use super::risk::analyze_risk;
use super::stream::Lcg;
use super::types::{
    CancelToken, Ensemble, Path, PercentileBand, RunOptions, SimulationConfig, SimulationResult,
};

const PATH_SEED_STRIDE: u32 = 789;
const SHOCK_FACTOR: f64 = 0.85;
const DRAWS_PER_STEP: u64 = 2;

pub fn run_simulation(config: &SimulationConfig) -> Result<SimulationResult, SimulationError> {
    run_simulation_with(config, &RunOptions::default())
}

pub fn run_simulation_with(
    config: &SimulationConfig,
    options: &RunOptions,
) -> Result<SimulationResult, SimulationError> {
    let fingerprint = config_fingerprint(config);
    debug!(
        %fingerprint,
        seed = config.seed,
        iterations = config.iteration_count,
        steps = config.step_count,
        parallel = options.parallel,
        "simulation started"
    );

    let ensemble = generate_ensemble(config, options)?;
    let bands = percentile_bands(&ensemble);
    let (outcome, risk) = analyze_risk(config, &ensemble);
    let recommendations = options.policy.recommend(&risk);

    let display_count = options
        .display_limit
        .map_or(ensemble.len(), |limit| limit.min(ensemble.len()));
    let total_shocks = ensemble.total_shocks();
    let path_count = ensemble.len();
    let mut paths = ensemble.paths;
    paths.truncate(display_count);

    debug!(
        %fingerprint,
        worst = outcome.worst,
        value_at_risk = risk.value_at_risk_percent,
        recommendations = recommendations.len(),
        "simulation finished"
    );

    Ok(SimulationResult {
        fingerprint,
        path_count,
        draws: draw_count(config),
        total_shocks,
        paths,
        bands,
        outcome,
        risk,
        recommendations,
    })
}

pub fn validate_config(config: &SimulationConfig) -> Result<(), ConfigError> {
    if config.step_count == 0 {
        return Err(ConfigError::ZeroSteps);
    }
    if config.iteration_count == 0 {
        return Err(ConfigError::ZeroIterations);
    }
    if !config.start_value.is_finite() || config.start_value <= 0.0 {
        return Err(ConfigError::InvalidStartValue(config.start_value));
    }
    if !config.drift.is_finite() {
        return Err(ConfigError::InvalidDrift(config.drift));
    }
    if !(0.0..=1.0).contains(&config.volatility) {
        return Err(ConfigError::InvalidVolatility(config.volatility));
    }
    if !(0.0..=1.0).contains(&config.shock_probability) {
        return Err(ConfigError::InvalidShockProbability(
            config.shock_probability,
        ));
    }
    Ok(())
}

pub fn path_seed(base_seed: u32, path_index: u32) -> u32 {
    base_seed.wrapping_add(path_index.wrapping_mul(PATH_SEED_STRIDE))
}

/// Generates the path at `path_index`. The value is never clamped, so a step
/// with `1 + drift + change < 0` drives the path negative.
pub fn generate_path(config: &SimulationConfig, path_index: u32) -> Result<Path, SimulationError> {
    let mut stream = Lcg::new(path_seed(config.seed, path_index));
    let mut values = Vec::with_capacity(config.step_count as usize + 1);
    let mut shocks = 0_u32;
    let mut current = config.start_value;
    values.push(current);

    for step in 1..=config.step_count {
        // Shock draw precedes the magnitude draw.
        let shock_factor = if stream.next_f64() < config.shock_probability {
            shocks += 1;
            SHOCK_FACTOR
        } else {
            1.0
        };
        let change = (stream.next_f64() - 0.5) * config.volatility;
        current = current * (1.0 + config.drift + change) * shock_factor;

        if !current.is_finite() {
            warn!(path_index, step, value = current, "path diverged");
            return Err(SimulationError::Divergence {
                path_index,
                step,
                value: current,
            });
        }
        values.push(current);
    }

    Ok(Path { values, shocks })
}

pub fn generate_ensemble(
    config: &SimulationConfig,
    options: &RunOptions,
) -> Result<Ensemble, SimulationError> {
    validate_config(config)?;

    let cancel = options.cancel.as_ref();
    let build = |path_index: u32| -> Result<Path, SimulationError> {
        if cancel.is_some_and(CancelToken::is_cancelled) {
            return Err(SimulationError::Cancelled);
        }
        let path = generate_path(config, path_index)?;
        if let Some(token) = cancel {
            token.record_path();
        }
        Ok(path)
    };

    let paths = if options.parallel {
        let outcomes: Vec<Result<Path, SimulationError>> = (0..config.iteration_count)
            .into_par_iter()
            .map(|path_index| build(path_index))
            .collect();
        // Index order keeps the reported error stable across thread schedules.
        outcomes.into_iter().collect::<Result<Vec<_>, _>>()
    } else {
        (0..config.iteration_count)
            .map(build)
            .collect::<Result<Vec<_>, _>>()
    };

    match paths {
        Ok(paths) => Ok(Ensemble { paths }),
        Err(SimulationError::Cancelled) => {
            warn!(seed = config.seed, "simulation cancelled");
            Err(SimulationError::Cancelled)
        }
        Err(err) => Err(err),
    }
}

pub fn percentile_bands(ensemble: &Ensemble) -> Vec<PercentileBand> {
    let step_len = ensemble
        .paths
        .iter()
        .map(|p| p.values.len())
        .min()
        .unwrap_or(0);

    let mut column = Vec::with_capacity(ensemble.len());
    (0..step_len)
        .map(|step| {
            column.clear();
            column.extend(ensemble.paths.iter().map(|p| p.values[step]));
            column.sort_by(|a, b| a.total_cmp(b));
            PercentileBand {
                step: step as u32,
                p05: order_statistic(&column, 0.05),
                p50: order_statistic(&column, 0.50),
                p95: order_statistic(&column, 0.95),
            }
        })
        .collect()
}

fn order_statistic(sorted: &[f64], q: f64) -> f64 {
    if sorted.is_empty() {
        return 0.0;
    }
    let index = (sorted.len() as f64 * q).floor() as usize;
    sorted[index.min(sorted.len() - 1)]
}

pub fn draw_count(config: &SimulationConfig) -> u64 {
    config.iteration_count as u64 * config.step_count as u64 * DRAWS_PER_STEP
}

// FNV-1a
pub fn config_fingerprint(config: &SimulationConfig) -> String {
    const OFFSET: u64 = 0xcbf2_9ce4_8422_2325;
    const PRIME: u64 = 0x0000_0100_0000_01b3;

    let mut hash = OFFSET;
    let mut feed = |bytes: &[u8]| {
        for byte in bytes {
            hash ^= *byte as u64;
            hash = hash.wrapping_mul(PRIME);
        }
    };
    feed(&config.seed.to_le_bytes());
    feed(&config.step_count.to_le_bytes());
    feed(&config.start_value.to_bits().to_le_bytes());
    feed(&config.drift.to_bits().to_le_bytes());
    feed(&config.volatility.to_bits().to_le_bytes());
    feed(&config.shock_probability.to_bits().to_le_bytes());
    feed(&config.iteration_count.to_le_bytes());

    format!("{hash:016x}")
}
