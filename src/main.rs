use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use tokio::net::TcpListener;
use tokio::signal;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use meetzen_backend::api;
use meetzen_backend::config::Config;
use meetzen_backend::dispatch::InviteDispatcher;
use meetzen_backend::mail::SendGridMailer;
use meetzen_backend::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Env files are loaded here, before logging reads RUST_LOG
    let config = Config::from_env()?;

    // Initialize logging (LOG_FORMAT=json for structured output)
    let json_logs = std::env::var("LOG_FORMAT").is_ok_and(|v| v.eq_ignore_ascii_case("json"));
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(json_logs.then(|| fmt::layer().json()))
        .with((!json_logs).then(fmt::layer))
        .init();

    tracing::info!("Starting MeetZen Backend...");

    tracing::info!(
        host = %config.server_host,
        port = %config.server_port,
        template_id = config.template_id.as_deref().unwrap_or("<unset>"),
        "Configuration loaded"
    );
    if config.template_id.is_none() {
        tracing::warn!("SENDGRID_TEMPLATE_ID not set, every invite delivery will fail");
    }
    if config.sendgrid_api_key.is_empty() {
        tracing::warn!("SENDGRID_API_KEY not set");
    }

    let mailer = SendGridMailer::new(&config);
    let dispatcher = InviteDispatcher::from_config(Arc::new(mailer), &config);
    let state = AppState::new(config.clone(), dispatcher);

    // Build router
    let app = Router::new()
        .merge(api::create_router(state))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http());

    // Start server
    let addr: SocketAddr = config.server_addr().parse()?;
    let listener = TcpListener::bind(addr).await?;

    tracing::info!(address = %addr, "Server listening");

    // Run server with graceful shutdown
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server shutdown complete");

    Ok(())
}

/// Handle shutdown signals
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install signal handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, shutting down...");
        },
        _ = terminate => {
            tracing::info!("Received terminate signal, shutting down...");
        },
    }
}
