//! Node entrypoint: configure a backend from the environment, wire the
//! routes, and serve until interrupted.

use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use polymath::providers::{AnthropicBackend, CompletionBackend, OpenAiBackend, OpenRouterBackend};
use polymath::service::CompletionService;
use polymath::settings::{AnthropicSettings, OpenAiSettings, OpenRouterSettings};
use polymath::{CompletionError, server};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let backend = backend_from_env()?;
    tracing::info!(model = %backend.model(), "backend configured");

    let service = Arc::new(CompletionService::new(backend));
    let app = server::router(service);

    let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
    let port = std::env::var("PORT").unwrap_or_else(|_| "8000".to_string());
    let listener = tokio::net::TcpListener::bind(format!("{host}:{port}")).await?;
    tracing::info!(address = %listener.local_addr()?, "serving");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

/// Select and construct the backend named by `BACKEND` (default
/// `anthropic`). Settings load from the backend's env prefix; a missing
/// credential fails here, at startup.
fn backend_from_env() -> Result<Arc<dyn CompletionBackend>, CompletionError> {
    let kind = std::env::var("BACKEND").unwrap_or_else(|_| "anthropic".to_string());
    match kind.as_str() {
        "anthropic" => Ok(Arc::new(AnthropicBackend::new(
            AnthropicSettings::from_env()?,
        )?)),
        "openrouter" => Ok(Arc::new(OpenRouterBackend::new(
            OpenRouterSettings::from_env()?,
        )?)),
        "openai" => Ok(Arc::new(OpenAiBackend::new(OpenAiSettings::from_env()?)?)),
        other => Err(CompletionError::Configuration(format!(
            "unknown backend {other}; expected anthropic, openrouter, or openai"
        ))),
    }
}

async fn shutdown_signal() {
    if let Err(error) = tokio::signal::ctrl_c().await {
        tracing::error!(%error, "failed to install shutdown handler");
    }
}
