use clap::Parser;
use std::process::ExitCode;
use tracing::{error, info};
use veil::app::App;
use veil::cli::Args;
use veil::config::Config;
use veil::logging::setup_logging;

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();

    let args = Args::parse();

    // Load config and setup logging before App::new() so startup logs are never silently dropped
    let early_config = Config::load().expect("Failed to load config for logging setup");
    setup_logging(&early_config, args.tracing);

    info!(
        version = env!("CARGO_PKG_VERSION"),
        commit = env!("GIT_COMMIT_SHORT"),
        environment = if cfg!(debug_assertions) {
            "development"
        } else {
            "production"
        },
        "starting veil"
    );

    let app = match App::new() {
        Ok(app) => app,
        Err(e) => {
            error!(error = ?e, "Failed to initialize application");
            return ExitCode::FAILURE;
        }
    };

    match app.run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = ?e, "Server exited with error");
            ExitCode::FAILURE
        }
    }
}
