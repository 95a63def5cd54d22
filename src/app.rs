use crate::config::Config;
use crate::state::AppState;
use crate::web::create_router;
use anyhow::Context;
use std::net::SocketAddr;
use tracing::info;

/// Main application struct containing all necessary components
pub struct App {
    state: AppState,
}

impl App {
    /// Create a new App instance with config loaded and upstream clients built.
    pub fn new() -> Result<Self, anyhow::Error> {
        let config = Config::load()?;

        info!(
            image_upstream = %config.image_upstream,
            api_upstream = %config.api_upstream,
            retry_max_attempts = config.retry_max_attempts,
            attempt_timeout = %format!("{}s", config.attempt_timeout_secs),
            request_timeout = %format!("{}s", config.request_timeout_secs),
            "proxy configuration loaded"
        );

        let state = AppState::new(config)?;
        Ok(Self { state })
    }

    /// Bind the listener and serve until a shutdown signal arrives.
    pub async fn run(self) -> Result<(), anyhow::Error> {
        let addr: SocketAddr = format!("{}:{}", self.state.config.host, self.state.config.port)
            .parse()
            .context("Invalid HOST/PORT combination")?;

        let router = create_router(self.state);

        let listener = tokio::net::TcpListener::bind(addr)
            .await
            .with_context(|| format!("Failed to bind {addr}"))?;

        info!(addr = %addr, "web server listening");

        axum::serve(
            listener,
            router.into_make_service_with_connect_info::<SocketAddr>(),
        )
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Web server error")
    }
}

/// Resolves when SIGINT or SIGTERM is received.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("shutdown signal received, draining connections");
}
