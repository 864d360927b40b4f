use axum::{
    Router,
    extract::{Json, Query},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::get,
};
use clap::{Args, Parser, Subcommand};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tracing::{error, info};

use crate::core::{
    RunOptions, SensitivityImpact, SimulationConfig, SimulationError, SimulationResult,
    analyze_sensitivity, config_fingerprint, run_simulation_with,
};

const MAX_STEPS: u32 = 3_650;

#[derive(Parser, Debug)]
#[command(
    name = "scenario-sim",
    about = "Deterministic Monte Carlo scenario simulator (percentile bands, risk metrics, mitigation advice)"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Serve the JSON API.
    Serve {
        #[arg(long, default_value_t = 8080)]
        port: u16,
    },
    /// Run one scenario and print the result as JSON.
    Run(ScenarioArgs),
}

#[derive(Args, Debug, Clone)]
pub struct ScenarioArgs {
    #[arg(long, default_value_t = 12_345)]
    seed: u32,
    #[arg(long, default_value_t = 30, help = "Number of time steps (days)")]
    steps: u32,
    #[arg(long, default_value_t = 1_000.0)]
    start_value: f64,
    #[arg(
        long,
        default_value_t = 0.2,
        allow_hyphen_values = true,
        help = "Expected return per step in percent, e.g. 0.2"
    )]
    drift: f64,
    #[arg(long, default_value_t = 5.0, help = "Per-step volatility in percent")]
    volatility: f64,
    #[arg(
        long,
        default_value_t = 1.0,
        help = "Chance of a 15% shock at each step, in percent"
    )]
    shock_probability: f64,
    #[arg(long, default_value_t = 20, help = "Number of simulated paths")]
    iterations: u32,
    #[arg(long, help = "Only include this many paths in the output")]
    display_paths: Option<usize>,
    #[arg(long, default_value_t = false)]
    parallel: bool,
    #[arg(long, default_value_t = false, help = "Add a driver sensitivity table")]
    sensitivity: bool,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct SimulatePayload {
    seed: Option<u32>,
    step_count: Option<u32>,
    start_value: Option<f64>,
    drift: Option<f64>,
    volatility: Option<f64>,
    shock_probability: Option<f64>,
    iteration_count: Option<u32>,
    display_paths: Option<usize>,
    parallel: Option<bool>,
    sensitivity: Option<bool>,
}

#[derive(Debug)]
struct ApiRequest {
    config: SimulationConfig,
    options: RunOptions,
    sensitivity: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SimulateResponse {
    config: SimulationConfig,
    #[serde(flatten)]
    result: SimulationResult,
    #[serde(skip_serializing_if = "Option::is_none")]
    sensitivity: Option<Vec<SensitivityImpact>>,
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
}

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
}

fn build_config(args: &ScenarioArgs) -> Result<SimulationConfig, String> {
    if !(1..=MAX_STEPS).contains(&args.steps) {
        return Err(format!("--steps must be between 1 and {MAX_STEPS}"));
    }

    if !(10..=100).contains(&args.iterations) {
        return Err("--iterations must be between 10 and 100".to_string());
    }

    if !args.start_value.is_finite() || args.start_value <= 0.0 {
        return Err("--start-value must be > 0".to_string());
    }

    if !(-2.0..=5.0).contains(&args.drift) {
        return Err("--drift must be between -2 and 5".to_string());
    }

    if !(1.0..=20.0).contains(&args.volatility) {
        return Err("--volatility must be between 1 and 20".to_string());
    }

    if !(0.0..=10.0).contains(&args.shock_probability) {
        return Err("--shock-probability must be between 0 and 10".to_string());
    }

    if args.display_paths == Some(0) {
        return Err("--display-paths must be > 0".to_string());
    }

    Ok(SimulationConfig {
        seed: args.seed,
        step_count: args.steps,
        start_value: args.start_value,
        drift: args.drift / 100.0,
        volatility: args.volatility / 100.0,
        shock_probability: args.shock_probability / 100.0,
        iteration_count: args.iterations,
    })
}

fn request_from_args(args: &ScenarioArgs) -> Result<ApiRequest, String> {
    let config = build_config(args)?;
    Ok(ApiRequest {
        config,
        options: RunOptions {
            parallel: args.parallel,
            display_limit: args.display_paths,
            ..RunOptions::default()
        },
        sensitivity: args.sensitivity,
    })
}

fn execute(request: &ApiRequest) -> Result<SimulateResponse, SimulationError> {
    let result = run_simulation_with(&request.config, &request.options)?;
    let sensitivity = if request.sensitivity {
        Some(analyze_sensitivity(&request.config, &request.options)?)
    } else {
        None
    };
    Ok(SimulateResponse {
        config: request.config,
        result,
        sensitivity,
    })
}

pub fn run_scenario_json(args: &ScenarioArgs) -> Result<String, String> {
    let request = request_from_args(args)?;
    let response = execute(&request).map_err(|e| e.to_string())?;
    serde_json::to_string_pretty(&response).map_err(|e| format!("Failed to encode result: {e}"))
}

pub async fn run_http_server(port: u16) -> std::io::Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let app = Router::new()
        .route("/api/health", get(health_handler))
        .route(
            "/api/simulate",
            get(simulate_get_handler).post(simulate_post_handler),
        )
        .fallback(not_found_handler);

    let listener = TcpListener::bind(addr).await?;
    info!(%addr, "scenario API listening");

    axum::serve(listener, app).await
}

async fn health_handler() -> Response {
    json_response(StatusCode::OK, HealthResponse { status: "ok" })
}

async fn not_found_handler() -> Response {
    error_response(StatusCode::NOT_FOUND, "Not found")
}

async fn simulate_get_handler(Query(payload): Query<SimulatePayload>) -> Response {
    simulate_handler_impl(payload).await
}

async fn simulate_post_handler(Json(payload): Json<SimulatePayload>) -> Response {
    simulate_handler_impl(payload).await
}

async fn simulate_handler_impl(payload: SimulatePayload) -> Response {
    let request = match api_request_from_payload(payload) {
        Ok(request) => request,
        Err(msg) => return error_response(StatusCode::BAD_REQUEST, &msg),
    };

    info!(
        fingerprint = %config_fingerprint(&request.config),
        iterations = request.config.iteration_count,
        steps = request.config.step_count,
        "simulate request"
    );

    let outcome = tokio::task::spawn_blocking(move || execute(&request)).await;
    match outcome {
        Ok(Ok(response)) => json_response(StatusCode::OK, response),
        Ok(Err(err)) => error_response(status_for(&err), &err.to_string()),
        Err(join_err) => {
            error!(error = %join_err, "simulation task failed");
            error_response(StatusCode::INTERNAL_SERVER_ERROR, "Simulation task failed")
        }
    }
}

fn status_for(err: &SimulationError) -> StatusCode {
    match err {
        SimulationError::Config(_) => StatusCode::BAD_REQUEST,
        SimulationError::Divergence { .. } => StatusCode::UNPROCESSABLE_ENTITY,
        SimulationError::Cancelled => StatusCode::SERVICE_UNAVAILABLE,
    }
}

fn json_response<T: Serialize>(status: StatusCode, body: T) -> Response {
    let mut response = (status, Json(body)).into_response();
    response.headers_mut().insert(
        header::CACHE_CONTROL,
        header::HeaderValue::from_static("no-store"),
    );
    response
}

fn error_response(status: StatusCode, msg: &str) -> Response {
    json_response(
        status,
        ErrorResponse {
            error: msg.to_string(),
        },
    )
}

#[cfg(test)]
fn api_request_from_json(json: &str) -> Result<ApiRequest, String> {
    let payload = serde_json::from_str::<SimulatePayload>(json)
        .map_err(|e| format!("Invalid API JSON payload: {e}"))?;
    api_request_from_payload(payload)
}

fn api_request_from_payload(payload: SimulatePayload) -> Result<ApiRequest, String> {
    let mut args = default_args();

    if let Some(v) = payload.seed {
        args.seed = v;
    }
    if let Some(v) = payload.step_count {
        args.steps = v;
    }
    if let Some(v) = payload.start_value {
        args.start_value = v;
    }
    if let Some(v) = payload.drift {
        args.drift = v;
    }
    if let Some(v) = payload.volatility {
        args.volatility = v;
    }
    if let Some(v) = payload.shock_probability {
        args.shock_probability = v;
    }
    if let Some(v) = payload.iteration_count {
        args.iterations = v;
    }
    if let Some(v) = payload.display_paths {
        args.display_paths = Some(v);
    }
    if let Some(v) = payload.parallel {
        args.parallel = v;
    }
    if let Some(v) = payload.sensitivity {
        args.sensitivity = v;
    }

    request_from_args(&args)
}

fn default_args() -> ScenarioArgs {
    ScenarioArgs {
        seed: 12_345,
        steps: 30,
        start_value: 1_000.0,
        drift: 0.2,
        volatility: 5.0,
        shock_probability: 1.0,
        iterations: 20,
        display_paths: None,
        parallel: false,
        sensitivity: false,
    }
}
