//! Board API server
//!
//! ```bash
//! cargo run -p board-api
//! ```
//!
//! Configuration comes from the environment, with `.env` loaded first when
//! present. `APP_ENV` selects the log format.

use std::process::ExitCode;

use board_common::{try_init_tracing_with_config, AppConfig, TracingConfig};
use tracing::{error, info};

#[tokio::main]
async fn main() -> ExitCode {
    let config = match AppConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load configuration: {e}");
            return ExitCode::FAILURE;
        }
    };

    if let Err(e) = try_init_tracing_with_config(TracingConfig::for_environment(config.app.env)) {
        eprintln!("Warning: Failed to initialize tracing: {e}");
    }

    info!(
        env = ?config.app.env,
        address = %config.api.address(),
        rate_limit_rps = config.rate_limit.requests_per_second,
        agent = config.agent.is_active(),
        "Starting board server"
    );

    match board_api::run(config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "Server exited with an error");
            ExitCode::FAILURE
        }
    }
}
