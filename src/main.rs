use clap::Parser;

use scenario_sim::api::{Cli, Command, run_http_server, run_scenario_json};

#[tokio::main]
async fn main() {
    scenario_sim::telemetry::init_tracing();

    match Cli::parse().command {
        Command::Serve { port } => {
            if let Err(e) = run_http_server(port).await {
                eprintln!("Server error: {e}");
                std::process::exit(1);
            }
        }
        Command::Run(args) => match run_scenario_json(&args) {
            Ok(json) => println!("{json}"),
            Err(msg) => {
                eprintln!("{msg}");
                std::process::exit(1);
            }
        },
    }
}
